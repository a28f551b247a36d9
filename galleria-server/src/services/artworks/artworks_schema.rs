use anyhow::Result;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use validator::Validate;

use crate::utils::validation::{validate, FieldErrors};

const INVALID: &str = "Artwork validation failed";

#[derive(Debug, Default, Deserialize, Serialize, Validate)]
pub struct ArtworkData {
    #[validate(length(min = 1, max = 200, message = "title must be 1-200 characters"))]
    pub title: Option<String>,

    #[validate(range(min = 1000, max = 2100, message = "year must be between 1000 and 2100"))]
    pub year: Option<i32>,

    #[validate(length(max = 200))]
    pub medium: Option<String>,

    #[validate(length(max = 200))]
    pub dimensions: Option<String>,

    #[validate(length(max = 5000))]
    pub description: Option<String>,

    pub image_url: Option<String>,

    #[validate(range(min = 0.0, message = "price must not be negative"))]
    pub price: Option<f64>,

    pub sort_order: Option<i64>,
}

fn trim(v: Option<String>) -> Option<String> {
    v.map(|s| s.trim().to_string())
}

impl ArtworkData {
    fn parse(data: &Value) -> Result<Self> {
        let mut parsed: ArtworkData = validate(data, INVALID)?;
        parsed.title = trim(parsed.title);
        parsed.medium = trim(parsed.medium);
        parsed.dimensions = trim(parsed.dimensions);
        parsed.image_url = trim(parsed.image_url);
        // trimming can empty a title that passed the length check
        if let Err(e) = parsed.validate() {
            FieldErrors::from(&e).into_result(INVALID)?;
        }
        Ok(parsed)
    }

    fn into_map(self) -> Map<String, Value> {
        match serde_json::to_value(self) {
            Ok(Value::Object(map)) => map,
            _ => Map::new(),
        }
    }

    /// Full record for create and update; `title` is required.
    pub fn for_write(data: &Value) -> Result<Map<String, Value>> {
        let mut parsed = Self::parse(data)?;
        if parsed.title.is_none() {
            let mut errors = FieldErrors::default();
            errors.push("title", "is required");
            errors.into_result(INVALID)?;
        }
        parsed.sort_order.get_or_insert(0);
        Ok(parsed.into_map())
    }

    /// Only the supplied fields.
    pub fn for_patch(data: &Value) -> Result<Map<String, Value>> {
        let mut map = Self::parse(data)?.into_map();
        map.retain(|_, v| !v.is_null());
        Ok(map)
    }
}

#[cfg(test)]
mod tests {
    use galleria_core::errors::GalleryError;
    use serde_json::json;

    use super::*;

    fn errors(data: Value) -> Value {
        let err = ArtworkData::for_write(&data).unwrap_err();
        let e = GalleryError::find_in(&err).unwrap();
        assert_eq!(e.code(), 422);
        e.errors.clone().unwrap()
    }

    #[test]
    fn title_is_required_and_trimmed() {
        assert_eq!(errors(json!({"year": 2001}))["title"][0], "is required");
        assert!(errors(json!({"title": "   "}))["title"].is_array());

        let map = ArtworkData::for_write(&json!({"title": "  Dusk "})).unwrap();
        assert_eq!(map["title"], "Dusk");
        assert_eq!(map["sort_order"], 0);
        assert!(map["price"].is_null());
    }

    #[test]
    fn year_and_price_bounds() {
        assert!(errors(json!({"title": "x", "year": 999}))["year"].is_array());
        assert!(errors(json!({"title": "x", "year": 2101}))["year"].is_array());
        assert!(errors(json!({"title": "x", "price": -1}))["price"].is_array());
        assert!(ArtworkData::for_write(&json!({"title": "x", "year": 2100, "price": 0})).is_ok());
    }

    #[test]
    fn patch_keeps_only_supplied_fields() {
        let map = ArtworkData::for_patch(&json!({"price": 120.5})).unwrap();
        assert_eq!(map.len(), 1);
        assert_eq!(map["price"], 120.5);
    }
}
