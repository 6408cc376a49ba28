//! Interpretations of the `role` and `status` document fields.
//!
//! Documents keep whatever value the client sent. Only one value of each
//! carries meaning (`"admin"` and `"Delivered"`); every other value reads as
//! the default variant, so a misspelt role never grants administrator rights.

/// User role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Role {
    /// Ordinary shopper. Also what an absent or unknown role means.
    #[default]
    User,
    /// Store administrator.
    Admin,
}

impl Role {
    /// The string written to user documents.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Admin => "admin",
        }
    }

    /// Interpret a stored role string.
    #[must_use]
    pub fn from_stored(value: &str) -> Self {
        if value == "admin" {
            Self::Admin
        } else {
            Self::User
        }
    }

    /// Whether this role may call admin-only routes.
    #[must_use]
    pub const fn is_admin(self) -> bool {
        matches!(self, Self::Admin)
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(Self::User),
            "admin" => Ok(Self::Admin),
            _ => Err(format!("invalid role: {s}")),
        }
    }
}

/// Fulfilment status of a cart item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CartStatus {
    /// Not yet delivered. Also what an absent status means.
    #[default]
    Pending,
    /// Delivery confirmed.
    Delivered,
}

impl CartStatus {
    /// The string written to cart documents.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::Delivered => "Delivered",
        }
    }

    /// Interpret a stored status string.
    #[must_use]
    pub fn from_stored(value: &str) -> Self {
        if value == "Delivered" {
            Self::Delivered
        } else {
            Self::Pending
        }
    }
}

impl std::fmt::Display for CartStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
