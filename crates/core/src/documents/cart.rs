//! Cart documents.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::Extra;
use crate::{CartStatus, DocumentId, Email};

/// One product placed in a shopper's cart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartItem {
    /// Store-generated identifier (absent until inserted).
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<DocumentId>,
    /// Owner of the cart item.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<Email>,
    /// Referenced product, any JSON value. At most one cart item exists per
    /// product.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product_id: Option<Value>,
    /// Fulfilment status as written; absent while pending.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<Value>,
    /// Product snapshot fields (name, price, image, ...).
    #[serde(flatten)]
    pub extra: Extra,
}

impl CartItem {
    /// Field name of the owner email in stored documents.
    pub const EMAIL_FIELD: &'static str = "email";
    /// Field name of the product reference in stored documents.
    pub const PRODUCT_ID_FIELD: &'static str = "product_id";
    /// Field name of the status in stored documents.
    pub const STATUS_FIELD: &'static str = "status";

    /// The effective status.
    #[must_use]
    pub fn status(&self) -> CartStatus {
        self.status
            .as_ref()
            .and_then(Value::as_str)
            .map_or(CartStatus::Pending, CartStatus::from_stored)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_absent_status_is_pending() {
        let item: CartItem = serde_json::from_value(json!({
            "email": "c@fitlifenow.com",
            "product_id": "p-1",
            "name": "Kettlebell"
        }))
        .unwrap();
        assert_eq!(item.status(), CartStatus::Pending);
        assert_eq!(item.extra.get("name"), Some(&json!("Kettlebell")));
    }

    #[test]
    fn test_delivered_status() {
        let item: CartItem =
            serde_json::from_value(json!({ "product_id": "p-2", "status": "Delivered" })).unwrap();
        assert_eq!(item.status(), CartStatus::Delivered);
    }

    #[test]
    fn test_other_fields_are_kept_verbatim() {
        let raw = json!({ "email": "c@fitlifenow.com", "product_id": 7, "status": "Shipped" });
        let item: CartItem = serde_json::from_value(raw.clone()).unwrap();
        assert_eq!(item.status(), CartStatus::Pending);
        assert_eq!(item.product_id, Some(json!(7)));
        assert_eq!(serde_json::to_value(&item).unwrap(), raw);
    }
}
