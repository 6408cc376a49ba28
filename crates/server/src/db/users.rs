//! User repository.

use fitlife_core::{DocumentId, Email, Role, UpdateResult, User};
use serde_json::Value;

use super::{
    Collection, Document, DocumentStore, Filter, FindOptions, InsertOutcome, StoreError,
    from_document, to_document,
};

/// Repository for user documents.
pub struct UserRepository<'a> {
    store: &'a dyn DocumentStore,
}

impl<'a> UserRepository<'a> {
    /// Create a new user repository.
    #[must_use]
    pub const fn new(store: &'a dyn DocumentStore) -> Self {
        Self { store }
    }

    /// Every registered user.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the store query fails or a document is malformed.
    pub async fn list_all(&self) -> Result<Vec<User>, StoreError> {
        self.store
            .find(Collection::Users, &Filter::all(), &FindOptions::default())
            .await?
            .into_iter()
            .map(|doc| from_document(Collection::Users, doc))
            .collect()
    }

    /// Get a user by their email address (exact match).
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the store query fails or the document is malformed.
    pub async fn get_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let filter = Filter::all().where_eq(User::EMAIL_FIELD, email);
        self.store
            .find_one(Collection::Users, &filter)
            .await?
            .map(|doc| from_document(Collection::Users, doc))
            .transpose()
    }

    /// Register a user unless the email is already taken.
    ///
    /// The lookup and the insert are separate operations; a concurrent
    /// registration that slips between them is caught by the store's unique
    /// key and reported as [`InsertOutcome::Duplicate`] as well.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the store fails.
    pub async fn register(&self, user: &User) -> Result<InsertOutcome, StoreError> {
        if self.get_by_email(user.email.as_str()).await?.is_some() {
            return Ok(InsertOutcome::Duplicate);
        }

        match self
            .store
            .insert_one(Collection::Users, to_document(user)?)
            .await
        {
            Ok(ack) => Ok(InsertOutcome::Inserted(ack)),
            Err(StoreError::Conflict(_)) => Ok(InsertOutcome::Duplicate),
            Err(e) => Err(e),
        }
    }

    /// Set the role of the user with the given identifier.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::InvalidId` if `id` is not a document identifier,
    /// or `StoreError` if the update fails.
    pub async fn set_role(&self, id: &str, role: Role) -> Result<UpdateResult, StoreError> {
        let id: DocumentId = id.parse()?;
        self.store
            .update_one(Collection::Users, &Filter::by_id(id), role_patch(role))
            .await
    }

    /// Set the role of the user with the given email.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the update fails.
    pub async fn set_role_by_email(
        &self,
        email: &Email,
        role: Role,
    ) -> Result<UpdateResult, StoreError> {
        let filter = Filter::all().where_eq(User::EMAIL_FIELD, email.as_str());
        self.store
            .update_one(Collection::Users, &filter, role_patch(role))
            .await
    }
}

fn role_patch(role: Role) -> Document {
    let mut set = Document::new();
    set.insert(
        User::ROLE_FIELD.to_owned(),
        Value::String(role.as_str().to_owned()),
    );
    set
}
