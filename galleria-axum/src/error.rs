use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use galleria_core::errors::GalleryError;

#[derive(Debug)]
pub struct GalleryAxumError(pub anyhow::Error);

impl From<anyhow::Error> for GalleryAxumError {
    fn from(e: anyhow::Error) -> Self {
        Self(e)
    }
}

impl From<GalleryError> for GalleryAxumError {
    fn from(e: GalleryError) -> Self {
        Self(e.into_anyhow())
    }
}

impl IntoResponse for GalleryAxumError {
    fn into_response(self) -> Response {
        // Keep the structured fields even when wrapped in anyhow contexts.
        let safe = match GalleryError::find_in(&self.0) {
            Some(e) => e.sanitize_for_client(),
            None => GalleryError::general_error(self.0.to_string()),
        };

        if safe.code() >= 500 {
            tracing::error!(error = ?self.0, "request failed");
        } else {
            tracing::debug!(error = %self.0, "request rejected");
        }

        let status = StatusCode::from_u16(safe.code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(safe.to_json())).into_response()
    }
}
