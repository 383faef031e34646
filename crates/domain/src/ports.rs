//! Ports the domain expects driven adapters to implement.
//!
//! The API layer holds these as trait objects so that the PostgreSQL adapter
//! and the in-memory store are interchangeable.

use async_trait::async_trait;
use thiserror::Error;

use crate::models::{Bathroom, BathroomQuery, Identity, NewBathroom, Review, User};

/// Failures raised by a store adapter.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// The backing store could not be reached.
    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// A query or write was rejected by the store.
    #[error("store query failed: {0}")]
    Query(String),

    /// A stored document could not be decoded.
    #[error("stored document is malformed: {0}")]
    Corrupt(String),
}

/// Result of an insert-or-merge by external identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertOutcome {
    /// No document existed; one was created.
    Inserted,
    /// A document existed and at least one field changed.
    Modified,
    /// A document existed with identical fields.
    Unchanged,
}

/// A change to one author's review on one bathroom.
#[derive(Debug, Clone, PartialEq)]
pub enum ReviewMutation {
    /// Replace the author's review (or add it if absent).
    Upsert(Review),
    /// Remove the author's review if present.
    Delete { user_email: String },
}

/// State of a bathroom after a review mutation.
#[derive(Debug, Clone, PartialEq)]
pub struct ReviewMutationOutcome {
    pub bathroom: Bathroom,
    /// `false` when a delete found nothing to remove.
    pub changed: bool,
}

/// Bathroom document collection.
#[async_trait]
pub trait BathroomStore: Send + Sync {
    /// Inserts a bathroom or merges location and tags into an existing one.
    async fn upsert_by_osm_id(&self, bathroom: NewBathroom) -> Result<UpsertOutcome, StoreError>;

    async fn find_by_osm_id(&self, osm_id: i64) -> Result<Option<Bathroom>, StoreError>;

    /// Filters, orders and limits. Without a sort, natural (insertion) order
    /// is kept.
    async fn find_many(&self, query: &BathroomQuery) -> Result<Vec<Bathroom>, StoreError>;

    /// Every bathroom in natural order.
    async fn find_all(&self) -> Result<Vec<Bathroom>, StoreError> {
        self.find_many(&BathroomQuery::default()).await
    }

    /// Applies a review mutation as one atomic read-modify-write on the
    /// bathroom document. Returns `None` when the bathroom does not exist.
    async fn apply_review_mutation(
        &self,
        osm_id: i64,
        mutation: ReviewMutation,
    ) -> Result<Option<ReviewMutationOutcome>, StoreError>;

    /// Appends an image reference. Returns `None` when the bathroom does not
    /// exist.
    async fn push_image(&self, osm_id: i64, image: String)
        -> Result<Option<Bathroom>, StoreError>;

    /// Bathrooms carrying a review by `email`, in natural order.
    async fn find_reviews_by_author(&self, email: &str) -> Result<Vec<Bathroom>, StoreError>;

    /// Cheap connectivity probe for health checks.
    async fn ping(&self) -> Result<(), StoreError>;
}

/// User collection and the favorites ledger.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Creates the user or refreshes the profile snapshot, keeping favorites.
    async fn upsert_profile(&self, identity: &Identity) -> Result<User, StoreError>;

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;

    /// Adds `osm_id` to the user's favorites and bumps the bathroom's
    /// `favorite_count`, atomically and only if it was not already present.
    ///
    /// Returns `true` when the set changed.
    async fn add_favorite(&self, email: &str, osm_id: i64) -> Result<bool, StoreError>;

    /// Removes `osm_id` from the user's favorites and decrements the
    /// bathroom's `favorite_count`, atomically and only if it was present.
    ///
    /// Returns `true` when the set changed.
    async fn remove_favorite(&self, email: &str, osm_id: i64) -> Result<bool, StoreError>;

    /// Favorited identifiers in ascending order; empty for unknown users.
    async fn list_favorites(&self, email: &str) -> Result<Vec<i64>, StoreError>;
}

/// Failures raised while verifying a login credential.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IdentityError {
    /// The credential was rejected or carried no email.
    #[error("identity rejected: {0}")]
    Rejected(String),

    /// The provider could not be reached or answered unexpectedly.
    #[error("identity provider unavailable: {0}")]
    Unavailable(String),
}

/// External OAuth identity provider.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Exchanges a provider credential for a verified identity.
    async fn verify(&self, credential: &str) -> Result<Identity, IdentityError>;
}
