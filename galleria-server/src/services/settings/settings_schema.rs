use anyhow::Result;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use validator::{Validate, ValidateEmail};

use crate::utils::validation::{validate, FieldErrors};

const INVALID: &str = "Settings validation failed";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
    Classic,
}

/// A tenant's gallery settings. Missing columns read as defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub gallery_title: String,
    pub artist_name: String,
    pub bio: String,
    pub contact_email: String,
    pub instagram: String,
    pub theme: Theme,
    pub show_prices: bool,
    pub show_encouragements: bool,
    pub show_news: bool,
    pub updated_at: Option<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            gallery_title: "Online Gallery".to_string(),
            artist_name: String::new(),
            bio: String::new(),
            contact_email: String::new(),
            instagram: String::new(),
            theme: Theme::Light,
            show_prices: false,
            show_encouragements: true,
            show_news: true,
            updated_at: None,
        }
    }
}

#[derive(Debug, Default, Deserialize, Validate)]
pub struct SettingsPatch {
    #[validate(length(max = 120))]
    pub gallery_title: Option<String>,
    #[validate(length(max = 120))]
    pub artist_name: Option<String>,
    #[validate(length(max = 5000))]
    pub bio: Option<String>,
    pub contact_email: Option<String>,
    #[validate(length(max = 60))]
    pub instagram: Option<String>,
    pub theme: Option<Theme>,
    pub show_prices: Option<bool>,
    pub show_encouragements: Option<bool>,
    pub show_news: Option<bool>,
}

impl SettingsPatch {
    pub fn parse(data: &Value) -> Result<Self> {
        let patch: SettingsPatch = validate(data, INVALID)?;

        // blank clears the address
        if let Some(email) = patch.contact_email.as_deref().map(str::trim) {
            if !email.is_empty() && !email.validate_email() {
                let mut errors = FieldErrors::default();
                errors.push("contact_email", "must be a valid email");
                errors.into_result(INVALID)?;
            }
        }
        Ok(patch)
    }

    pub fn apply(self, current: &mut Settings) {
        let text = |v: Option<String>, slot: &mut String| {
            if let Some(v) = v {
                *slot = v.trim().to_string();
            }
        };
        text(self.gallery_title, &mut current.gallery_title);
        text(self.artist_name, &mut current.artist_name);
        text(self.bio, &mut current.bio);
        text(self.contact_email, &mut current.contact_email);
        text(self.instagram.map(|s| s.trim().trim_start_matches('@').to_string()), &mut current.instagram);

        if let Some(theme) = self.theme {
            current.theme = theme;
        }
        if let Some(v) = self.show_prices {
            current.show_prices = v;
        }
        if let Some(v) = self.show_encouragements {
            current.show_encouragements = v;
        }
        if let Some(v) = self.show_news {
            current.show_news = v;
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn partial_rows_fill_in_defaults() {
        let s: Settings = serde_json::from_value(json!({"theme": "dark", "artist_id": "a"})).unwrap();
        assert_eq!(s.theme, Theme::Dark);
        assert_eq!(s.gallery_title, "Online Gallery");
        assert!(s.show_encouragements);
    }

    #[test]
    fn patch_merges_over_current() {
        let mut s = Settings::default();
        SettingsPatch::parse(&json!({"artist_name": " Moon ", "instagram": "@moon", "show_prices": true}))
            .unwrap()
            .apply(&mut s);
        assert_eq!(s.artist_name, "Moon");
        assert_eq!(s.instagram, "moon");
        assert!(s.show_prices);
        assert_eq!(s.theme, Theme::Light);
    }

    #[test]
    fn rejects_bad_email_and_theme() {
        assert!(SettingsPatch::parse(&json!({"contact_email": "nope"})).is_err());
        assert!(SettingsPatch::parse(&json!({"theme": "neon"})).is_err());
        assert!(SettingsPatch::parse(&json!({"contact_email": ""})).is_ok());
    }
}
