//! Persisted model-kind descriptors and the dropdown choice shape.

use correx_core::changes::EMPTY_CHOICE_LABEL;
use correx_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `content_types` table.
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize)]
pub struct ContentType {
    pub id: DbId,
    pub app_label: String,
    pub model: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl ContentType {
    /// `app_label.model`, as used in model references.
    pub fn natural_key(&self) -> String {
        format!("{}.{}", self.app_label, self.model)
    }
}

/// One `<option>` for a dependent select box, serialized as
/// `{"Text": ..., "Value": ...}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContentTypeChoice {
    #[serde(rename = "Text")]
    pub text: String,
    #[serde(rename = "Value")]
    pub value: String,
}

impl ContentTypeChoice {
    /// The leading "no selection" entry.
    pub fn empty() -> Self {
        Self {
            text: EMPTY_CHOICE_LABEL.to_string(),
            value: String::new(),
        }
    }
}

impl From<&ContentType> for ContentTypeChoice {
    fn from(ct: &ContentType) -> Self {
        Self {
            text: ct.model.clone(),
            value: ct.id.to_string(),
        }
    }
}
