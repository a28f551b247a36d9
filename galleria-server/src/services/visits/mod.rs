pub mod visits_service;

pub use visits_service::VisitsService;
