use anyhow::Result;
use serde::Deserialize;
use serde_json::{Map, Value};
use validator::Validate;

use crate::utils::validation::validate;

/// A visitor's note to the artist.
#[derive(Debug, Deserialize, Validate)]
pub struct NewEncouragement {
    #[validate(length(min = 1, max = 40, message = "name must be 1-40 characters"))]
    pub name: String,

    #[validate(length(min = 1, max = 500, message = "message must be 1-500 characters"))]
    pub message: String,
}

impl NewEncouragement {
    /// Trimmed before the length checks, so blank input is rejected.
    pub fn parse(data: &Value) -> Result<Map<String, Value>> {
        let mut trimmed = data.clone();
        if let Some(map) = trimmed.as_object_mut() {
            for key in ["name", "message"] {
                if let Some(Value::String(s)) = map.get_mut(key) {
                    *s = s.trim().to_string();
                }
            }
        }

        let input: NewEncouragement = validate(&trimmed, "Invalid encouragement")?;
        let mut row = Map::new();
        row.insert("name".into(), Value::String(input.name));
        row.insert("message".into(), Value::String(input.message));
        Ok(row)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use galleria_core::GalleryError;
    use serde_json::json;

    #[test]
    fn keeps_only_name_and_message() {
        let row = NewEncouragement::parse(&json!({
            "name": "  Mina ",
            "message": "Lovely colours",
            "artist_id": "someone-else"
        }))
        .unwrap();
        assert_eq!(row["name"], "Mina");
        assert!(row.get("artist_id").is_none());
    }

    #[test]
    fn blank_and_long_fields_are_unprocessable() {
        let err = NewEncouragement::parse(&json!({"name": "   ", "message": "x".repeat(501)})).unwrap_err();
        let found = GalleryError::find_in(&err).unwrap();
        assert_eq!(found.code(), 422);
        let errors = found.errors.as_ref().unwrap();
        assert!(errors.get("name").is_some());
        assert!(errors.get("message").is_some());
    }
}
