//! In-memory [`ContactStore`] for tests and embedding.
//!
//! Rows live in a `Vec` behind `std::sync::RwLock`. Each trait method takes
//! the lock once, so a single call is atomic, but nothing spans two calls.

use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;

use crate::error::{StoreError, StoreResult};
use crate::models::{Contact, ContactCounts, LinkPrecedence, MatchMode, NewContact};

use super::ContactStore;

#[derive(Default)]
struct Table {
    rows: Vec<Contact>,
    next_id: i64,
}

impl Table {
    fn append(&mut self, contact: NewContact) -> Contact {
        self.next_id += 1;
        let row = contact.into_contact(self.next_id);
        self.rows.push(row.clone());
        row
    }
}

/// In-memory store. Ids start at 1 and are never reused.
#[derive(Default)]
pub struct InMemoryStore {
    table: RwLock<Table>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of every row in insertion order.
    pub fn rows(&self) -> Vec<Contact> {
        self.read()
            .map(|t| t.rows.clone())
            .unwrap_or_default()
    }

    fn read(&self) -> StoreResult<RwLockReadGuard<'_, Table>> {
        self.table
            .read()
            .map_err(|_| StoreError::new("read lock", "contact table lock poisoned"))
    }

    fn write(&self) -> StoreResult<RwLockWriteGuard<'_, Table>> {
        self.table
            .write()
            .map_err(|_| StoreError::new("write lock", "contact table lock poisoned"))
    }
}

#[async_trait]
impl ContactStore for InMemoryStore {
    async fn insert(&self, contact: NewContact) -> StoreResult<Contact> {
        Ok(self.write()?.append(contact))
    }

    async fn insert_primary_if_absent(&self, contact: NewContact) -> StoreResult<Option<Contact>> {
        let mut table = self.write()?;
        let taken = contact.email.is_some()
            && table
                .rows
                .iter()
                .any(|r| r.is_primary() && r.email == contact.email);
        if taken {
            return Ok(None);
        }
        let mut contact = contact;
        contact.link_precedence = LinkPrecedence::Primary;
        contact.linked_id = None;
        Ok(Some(table.append(contact)))
    }

    async fn find_by_email(&self, email: &str) -> StoreResult<Option<Contact>> {
        let table = self.read()?;
        Ok(table
            .rows
            .iter()
            .find(|r| r.email.as_deref() == Some(email))
            .cloned())
    }

    async fn find_matching(
        &self,
        email: Option<&str>,
        phone: Option<&str>,
        mode: MatchMode,
    ) -> StoreResult<Vec<Contact>> {
        let table = self.read()?;
        let mut rows: Vec<Contact> = table
            .rows
            .iter()
            .filter(|r| mode.matches(r, email, phone))
            .cloned()
            .collect();
        rows.sort_by(|a, b| (b.created_at, b.id).cmp(&(a.created_at, a.id)));
        Ok(rows)
    }

    async fn get(&self, id: i64) -> StoreResult<Option<Contact>> {
        Ok(self.read()?.rows.iter().find(|r| r.id == id).cloned())
    }

    async fn counts(&self) -> StoreResult<ContactCounts> {
        let table = self.read()?;
        let primary = table.rows.iter().filter(|r| r.is_primary()).count() as i64;
        let total = table.rows.len() as i64;
        Ok(ContactCounts {
            total,
            primary,
            secondary: total - primary,
        })
    }
}
