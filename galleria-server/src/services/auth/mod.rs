pub mod auth_service;
pub mod passwords_service;

pub use auth_service::AuthService;
pub use passwords_service::PasswordsService;
