//! User documents.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::Extra;
use crate::{DocumentId, Email, Role};

/// A registered shopper or administrator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    /// Store-generated identifier (absent until inserted).
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<DocumentId>,
    /// Unique login email.
    pub email: Email,
    /// Stored role, kept exactly as written; absent for ordinary users.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<Value>,
    /// Profile fields (name, photo, ...).
    #[serde(flatten)]
    pub extra: Extra,
}

impl User {
    /// Field name of the email in stored documents.
    pub const EMAIL_FIELD: &'static str = "email";
    /// Field name of the role in stored documents.
    pub const ROLE_FIELD: &'static str = "role";

    /// The effective role.
    #[must_use]
    pub fn role(&self) -> Role {
        self.role
            .as_ref()
            .and_then(Value::as_str)
            .map_or(Role::User, Role::from_stored)
    }

    /// Whether the user may call admin-only routes.
    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.role().is_admin()
    }
}
