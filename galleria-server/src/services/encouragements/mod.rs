pub mod encouragements_schema;
pub mod encouragements_service;
pub mod encouragements_shared;

pub use encouragements_service::EncouragementsService;
