pub mod tenant_table;

pub use tenant_table::TenantTable;
