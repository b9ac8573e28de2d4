//! Storage abstraction for contact rows.
//!
//! The [`ContactStore`] trait is the only thing the resolver and the query
//! service know about persistence. It owns no business logic: it appends
//! rows and answers lookups. Backends:
//!
//! | Backend | Crate |
//! |---------|-------|
//! | [`memory::InMemoryStore`] | this crate (tests, embedding) |
//! | `SqliteStore` | `contact-link` (sqlx) |
//!
//! Implementations must be `Send + Sync` so a single handle can be shared
//! by every request.

pub mod memory;

use async_trait::async_trait;

use crate::error::StoreResult;
use crate::models::{Contact, ContactCounts, MatchMode, NewContact};

/// Abstract storage backend over the `contacts` relation.
///
/// # Operations
///
/// | Method | Purpose |
/// |--------|---------|
/// | [`insert`](ContactStore::insert) | Append a row |
/// | [`insert_primary_if_absent`](ContactStore::insert_primary_if_absent) | Conditional primary insert |
/// | [`find_by_email`](ContactStore::find_by_email) | Oldest row with an exact email |
/// | [`find_matching`](ContactStore::find_matching) | Rows by email and/or phone, newest first |
/// | [`get`](ContactStore::get) | Row by id |
/// | [`counts`](ContactStore::counts) | Row counts per precedence |
#[async_trait]
pub trait ContactStore: Send + Sync {
    /// Append a row and return it with its assigned id.
    async fn insert(&self, contact: NewContact) -> StoreResult<Contact>;

    /// Append `contact` as a primary row unless a primary row with the same
    /// email already exists. The check and the insert are one atomic step.
    ///
    /// Returns `None` when an existing primary blocked the insert.
    async fn insert_primary_if_absent(&self, contact: NewContact) -> StoreResult<Option<Contact>>;

    /// The oldest row whose email equals `email` exactly.
    async fn find_by_email(&self, email: &str) -> StoreResult<Option<Contact>>;

    /// Every row matching `email`/`phone` under `mode`, ordered by
    /// `created_at` descending (ties broken by id descending).
    async fn find_matching(
        &self,
        email: Option<&str>,
        phone: Option<&str>,
        mode: MatchMode,
    ) -> StoreResult<Vec<Contact>>;

    async fn get(&self, id: i64) -> StoreResult<Option<Contact>>;

    async fn counts(&self) -> StoreResult<ContactCounts>;
}
