pub mod verifications_service;

pub use verifications_service::VerificationsService;
