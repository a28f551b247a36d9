use galleria_core::errors::GalleryError;
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("auth.secret is not configured")]
    MissingSecret,

    #[error("No access token")]
    MissingToken,

    #[error("Invalid access token: {0}")]
    InvalidToken(String),

    #[error("Session belongs to tenant {actual}, not {expected}")]
    WrongTenant { expected: String, actual: String },

    #[error("Invalid password")]
    InvalidCredentials,

    #[error("Password must be at least {0} characters")]
    PasswordTooShort(usize),

    #[error("Invalid auth configuration: {0}")]
    Config(String),

    #[error("Password hashing failed: {0}")]
    Hash(#[from] bcrypt::BcryptError),
}

impl From<AuthError> for GalleryError {
    fn from(e: AuthError) -> Self {
        let message = e.to_string();
        match e {
            AuthError::MissingToken | AuthError::InvalidToken(_) | AuthError::InvalidCredentials => {
                GalleryError::not_authenticated(message)
            }
            AuthError::WrongTenant { .. } => GalleryError::forbidden(message),
            AuthError::PasswordTooShort(_) => {
                GalleryError::bad_request(message.clone()).with_errors(json!({"newPassword": [message]}))
            }
            AuthError::MissingSecret | AuthError::Config(_) | AuthError::Hash(_) => {
                GalleryError::general_error(message)
            }
        }
    }
}

impl AuthError {
    pub fn into_anyhow(self) -> anyhow::Error {
        GalleryError::from(self).into_anyhow()
    }
}
