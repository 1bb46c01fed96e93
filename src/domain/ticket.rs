use serde::{Deserialize, Serialize};

/// Fixed prefix for values of the ticket-language custom field.
pub const LANG_FIELD_PREFIX: &str = "lang-";

#[derive(Debug, Clone, Deserialize)]
pub struct Ticket {
    pub id: u64,
    #[serde(default)]
    pub custom_fields: Vec<CustomField>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CustomField {
    pub id: u64,
    pub value: Option<String>,
}

impl Ticket {
    /// Language code stored in the given custom field, if any. Values that
    /// do not carry the `lang-` prefix are treated as no stored language.
    pub fn stored_language(&self, field_id: u64) -> Option<&str> {
        self.custom_fields
            .iter()
            .find(|field| field.id == field_id)
            .and_then(|field| field.value.as_deref())
            .and_then(|value| value.strip_prefix(LANG_FIELD_PREFIX))
    }
}

/// Formats a language code as a custom-field value, e.g. `lang-de`.
pub fn language_field_value(code: &str) -> String {
    format!("{LANG_FIELD_PREFIX}{code}")
}
