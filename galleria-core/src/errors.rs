//! # Errors
//!
//! Structured errors with a stable HTTP-facing shape:
//! `{ name, message, code, className, errors? }`.
//!
//! A [`GalleryError`] travels inside `anyhow::Error` through services and
//! hooks; the HTTP adapter finds it again in the error chain. Anything
//! that is not a `GalleryError` is reported as `GeneralError`.

use std::fmt;

use anyhow::Error as AnyError;
use serde_json::{json, Value};

/// Convenience result type for Galleria core APIs.
pub type GalleryResult<T> = std::result::Result<T, AnyError>;

/// HTTP-facing error categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    BadRequest,
    NotAuthenticated,
    Forbidden,
    NotFound,
    MethodNotAllowed,
    Conflict,
    Gone,
    Unprocessable,
    TooManyRequests,
    GeneralError,
    BadGateway,
    Unavailable,
}

impl ErrorKind {
    /// `(status, name, className)`.
    const fn parts(self) -> (u16, &'static str, &'static str) {
        use ErrorKind::*;
        match self {
            BadRequest => (400, "BadRequest", "bad-request"),
            NotAuthenticated => (401, "NotAuthenticated", "not-authenticated"),
            Forbidden => (403, "Forbidden", "forbidden"),
            NotFound => (404, "NotFound", "not-found"),
            MethodNotAllowed => (405, "MethodNotAllowed", "method-not-allowed"),
            Conflict => (409, "Conflict", "conflict"),
            Gone => (410, "Gone", "gone"),
            Unprocessable => (422, "Unprocessable", "unprocessable"),
            TooManyRequests => (429, "TooManyRequests", "too-many-requests"),
            GeneralError => (500, "GeneralError", "general-error"),
            BadGateway => (502, "BadGateway", "bad-gateway"),
            Unavailable => (503, "Unavailable", "unavailable"),
        }
    }

    pub fn status_code(&self) -> u16 {
        self.parts().0
    }

    pub fn name(&self) -> &'static str {
        self.parts().1
    }

    /// Kebab-cased `className`.
    pub fn class_name(&self) -> &'static str {
        self.parts().2
    }
}

macro_rules! kind_constructors {
    ($($ctor:ident => $kind:ident),* $(,)?) => {
        $(
            pub fn $ctor(msg: impl Into<String>) -> Self {
                Self::new(ErrorKind::$kind, msg)
            }
        )*
    };
}

#[derive(Debug)]
pub struct GalleryError {
    pub kind: ErrorKind,
    pub message: String,
    pub errors: Option<Value>,
    pub source: Option<AnyError>,
}

impl GalleryError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            errors: None,
            source: None,
        }
    }

    /// Field level details, e.g. `{"title": ["required"]}`.
    pub fn with_errors(mut self, errors: Value) -> Self {
        self.errors = Some(errors);
        self
    }

    pub fn with_source(mut self, source: AnyError) -> Self {
        self.source = Some(source);
        self
    }

    pub fn code(&self) -> u16 {
        self.kind.status_code()
    }

    pub fn name(&self) -> &'static str {
        self.kind.name()
    }

    pub fn class_name(&self) -> &'static str {
        self.kind.class_name()
    }

    pub fn into_anyhow(self) -> AnyError {
        AnyError::new(self)
    }

    /// Find a `GalleryError` anywhere in an error chain.
    pub fn find_in(err: &AnyError) -> Option<&GalleryError> {
        err.chain().find_map(|e| e.downcast_ref::<GalleryError>())
    }

    /// Keep a `GalleryError` as is, wrap anything else as `GeneralError`.
    pub fn normalize(err: AnyError) -> GalleryError {
        match err.downcast::<GalleryError>() {
            Ok(e) => e,
            Err(other) => GalleryError::new(ErrorKind::GeneralError, other.to_string()).with_source(other),
        }
    }

    /// Client-facing copy without the inner `source`.
    pub fn sanitize_for_client(&self) -> GalleryError {
        GalleryError {
            kind: self.kind,
            message: self.message.clone(),
            errors: self.errors.clone(),
            source: None,
        }
    }

    pub fn to_json(&self) -> Value {
        let mut base = json!({
            "name": self.name(),
            "message": self.message,
            "code": self.code(),
            "className": self.class_name(),
        });
        if let Some(e) = &self.errors {
            base["errors"] = e.clone();
        }
        base
    }

    kind_constructors! {
        bad_request => BadRequest,
        not_authenticated => NotAuthenticated,
        forbidden => Forbidden,
        not_found => NotFound,
        method_not_allowed => MethodNotAllowed,
        conflict => Conflict,
        gone => Gone,
        unprocessable => Unprocessable,
        too_many_requests => TooManyRequests,
        general_error => GeneralError,
        bad_gateway => BadGateway,
        unavailable => Unavailable,
    }
}

impl fmt::Display for GalleryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}: {}", self.code(), self.name(), self.message)
    }
}

impl std::error::Error for GalleryError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        let inner: &(dyn std::error::Error + 'static) = self.source.as_ref()?.as_ref();
        Some(inner)
    }
}

/// Return early with a `GalleryError` wrapped in `anyhow`.
#[macro_export]
macro_rules! bail_gallery {
    ($ctor:ident, $msg:expr) => {
        return Err($crate::errors::GalleryError::$ctor($msg).into_anyhow())
    };
    ($ctor:ident, $fmt:expr, $($arg:tt)*) => {
        return Err($crate::errors::GalleryError::$ctor(format!($fmt, $($arg)*)).into_anyhow())
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fails() -> GalleryResult<()> {
        bail_gallery!(not_found, "Artwork not found: {}", "a-1");
    }

    #[test]
    fn json_shape_matches_client_contract() {
        let e = GalleryError::unprocessable("Invalid artwork")
            .with_errors(json!({"title": ["required"]}));
        let v = e.to_json();
        assert_eq!(v["name"], "Unprocessable");
        assert_eq!(v["code"], 422);
        assert_eq!(v["className"], "unprocessable");
        assert_eq!(v["errors"]["title"][0], "required");
    }

    #[test]
    fn error_survives_anyhow_context() {
        let err = fails().unwrap_err().context("loading artwork");
        let found = GalleryError::find_in(&err).expect("gallery error in chain");
        assert_eq!(found.kind, ErrorKind::NotFound);
        assert_eq!(found.message, "Artwork not found: a-1");
    }

    #[test]
    fn foreign_errors_normalize_to_general_error() {
        let e = GalleryError::normalize(anyhow::anyhow!("boom"));
        assert_eq!(e.code(), 500);
        assert!(e.sanitize_for_client().source.is_none());
    }
}
