use std::collections::BTreeMap;

use anyhow::Result;
use galleria_core::errors::GalleryError;
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use validator::{Validate, ValidationErrors, ValidationErrorsKind};

fn friendly_message(code: &str) -> Option<&'static str> {
    match code {
        "required" => Some("is required"),
        "email" => Some("must be a valid email"),
        "length" => Some("has invalid length"),
        "range" => Some("is out of range"),
        "url" => Some("must be a valid URL"),
        _ => None,
    }
}

/// Field errors keyed by dotted path.
#[derive(Debug, Default)]
pub struct FieldErrors(BTreeMap<String, Vec<String>>);

impl FieldErrors {
    pub fn push(&mut self, field: &str, message: impl Into<String>) {
        self.0.entry(field.to_string()).or_default().push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    fn collect(&mut self, prefix: &str, errs: &ValidationErrors) {
        for (field, kind) in errs.errors() {
            let key = if prefix.is_empty() {
                field.to_string()
            } else {
                format!("{prefix}.{field}")
            };
            match kind {
                ValidationErrorsKind::Field(list) => {
                    for e in list {
                        let msg = e
                            .message
                            .as_ref()
                            .map(|m| m.to_string())
                            .or_else(|| friendly_message(&e.code).map(str::to_string))
                            .unwrap_or_else(|| e.code.to_string());
                        self.push(&key, msg);
                    }
                }
                ValidationErrorsKind::Struct(nested) => self.collect(&key, nested),
                ValidationErrorsKind::List(items) => {
                    for (idx, nested) in items {
                        self.collect(&format!("{key}[{idx}]"), nested);
                    }
                }
            }
        }
    }

    /// `422 Unprocessable` with these errors, or `Ok` when there are none.
    pub fn into_result(self, message: &str) -> Result<()> {
        if self.is_empty() {
            return Ok(());
        }
        Err(GalleryError::unprocessable(message)
            .with_errors(json!(self.0))
            .into_anyhow())
    }
}

impl From<&ValidationErrors> for FieldErrors {
    fn from(errs: &ValidationErrors) -> Self {
        let mut out = FieldErrors::default();
        out.collect("", errs);
        out
    }
}

/// Deserialize and validate a request payload; both failures are 422.
pub fn validate<T>(data: &Value, message: &str) -> Result<T>
where
    T: DeserializeOwned + Validate,
{
    let parsed: T = serde_json::from_value(data.clone()).map_err(|e| {
        GalleryError::unprocessable(message)
            .with_errors(json!({"_schema": [e.to_string()]}))
            .into_anyhow()
    })?;

    if let Err(e) = parsed.validate() {
        FieldErrors::from(&e).into_result(message)?;
    }
    Ok(parsed)
}

#[cfg(test)]
mod tests {
    use galleria_core::errors::GalleryError;
    use serde::Deserialize;
    use serde_json::json;
    use validator::Validate;

    use super::validate;

    #[derive(Debug, Deserialize, Validate)]
    struct Note {
        #[validate(length(min = 1, message = "title must not be empty"))]
        title: String,
        #[validate(range(min = 1000, max = 2100))]
        year: Option<i32>,
    }

    #[test]
    fn field_errors_are_grouped_by_field() {
        let err = validate::<Note>(&json!({"title": "", "year": 99}), "Invalid note").unwrap_err();
        let e = GalleryError::find_in(&err).unwrap();
        assert_eq!(e.code(), 422);
        let errors = e.errors.as_ref().unwrap();
        assert_eq!(errors["title"][0], "title must not be empty");
        assert_eq!(errors["year"][0], "is out of range");
    }

    #[test]
    fn shape_errors_land_under_schema() {
        let err = validate::<Note>(&json!({"year": 2000}), "Invalid note").unwrap_err();
        let e = GalleryError::find_in(&err).unwrap();
        assert!(e.errors.as_ref().unwrap()["_schema"].is_array());
    }
}
