//! Product documents.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::Extra;
use crate::DocumentId;

/// A catalogue product.
///
/// Products are only ever created through the admin insert route and keep
/// whatever shape the admin posted. Only `price` and `isBest` are read here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    /// Store-generated identifier (absent until inserted).
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<DocumentId>,
    /// Unit price exactly as posted (`30` stays `30`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<Value>,
    /// Featured on the "best products" listing when `true`.
    #[serde(rename = "isBest", default, skip_serializing_if = "Option::is_none")]
    pub is_best: Option<Value>,
    /// Descriptive fields (name, image, category, ...).
    #[serde(flatten)]
    pub extra: Extra,
}

impl Product {
    /// Field name of the best-product flag in stored documents.
    pub const IS_BEST_FIELD: &'static str = "isBest";
    /// Field name of the price in stored documents.
    pub const PRICE_FIELD: &'static str = "price";

    /// Whether the product is featured.
    #[must_use]
    pub fn is_best(&self) -> bool {
        matches!(self.is_best, Some(Value::Bool(true)))
    }
}
