// Wire data model for the OpenHolidays API responses.

use serde::{Deserialize, Serialize};

// One entry of a localized name list. The API also sends a `language`
// field per entry; only the text is displayed, extra fields are ignored.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LocalizedText {
    pub text: String,
}

impl LocalizedText {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

// A selectable country as returned by `GET /Countries`.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Country {
    pub iso_code: String,
    #[serde(default)]
    pub name: Vec<LocalizedText>,
}

impl Country {
    pub fn new(iso_code: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            iso_code: iso_code.into(),
            name: vec![LocalizedText::new(display_name)],
        }
    }

    // First localized name entry; the wire contract says the list is
    // non-empty, but a missing name degrades to the ISO code instead of
    // taking the view down.
    pub fn display_name(&self) -> &str {
        self.name
            .first()
            .map(|entry| entry.text.as_str())
            .unwrap_or(&self.iso_code)
    }
}

// A public holiday as returned by `GET /PublicHolidays`.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Holiday {
    pub id: String,
    pub end_date: String,
    #[serde(default)]
    pub name: Vec<LocalizedText>,
}

impl Holiday {
    pub fn new(
        id: impl Into<String>,
        end_date: impl Into<String>,
        display_name: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            end_date: end_date.into(),
            name: vec![LocalizedText::new(display_name)],
        }
    }

    pub fn display_name(&self) -> &str {
        self.name
            .first()
            .map(|entry| entry.text.as_str())
            .unwrap_or("(unnamed)")
    }
}
