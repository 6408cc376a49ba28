//! Documents stored in the three FitLifeNow collections.
//!
//! Each document type names the fields the API acts on and keeps everything
//! else in a flattened `extra` map, so a document survives a round trip
//! through the typed model unchanged.

pub mod ack;
pub mod cart;
pub mod product;
pub mod user;

pub use ack::{DeleteResult, InsertOneResult, UpdateResult};
pub use cart::CartItem;
pub use product::Product;
pub use user::User;

/// JSON object holding the fields a document type does not model.
pub type Extra = serde_json::Map<String, serde_json::Value>;

/// Key under which every document carries its identifier.
pub const ID_FIELD: &str = "_id";
