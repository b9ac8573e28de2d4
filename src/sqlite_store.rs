//! SQLite-backed [`ContactStore`] implementation.
//!
//! Timestamps are stored as Unix milliseconds. Every method is a single SQL
//! statement, so SQLite serializes each one, but nothing spans two calls.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};

use contact_link_core::error::{StoreError, StoreResult};
use contact_link_core::models::{Contact, ContactCounts, LinkPrecedence, MatchMode, NewContact};
use contact_link_core::store::ContactStore;

const COLUMNS: &str =
    "id, email, phone_number, linked_id, link_precedence, created_at, updated_at, deleted_at";

/// SQLite implementation of the [`ContactStore`] trait.
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    async fn fetch_one_by_id(&self, op: &'static str, id: i64) -> StoreResult<Contact> {
        let row = sqlx::query(&format!("SELECT {} FROM contacts WHERE id = ?", COLUMNS))
            .bind(id)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| StoreError::new(op, e))?;
        row_to_contact(op, &row)
    }
}

fn to_millis(ts: &DateTime<Utc>) -> i64 {
    ts.timestamp_millis()
}

fn from_millis(op: &'static str, ms: i64) -> StoreResult<DateTime<Utc>> {
    DateTime::from_timestamp_millis(ms)
        .ok_or_else(|| StoreError::new(op, format!("timestamp out of range: {}", ms)))
}

fn row_to_contact(op: &'static str, row: &SqliteRow) -> StoreResult<Contact> {
    let get_err = |e: sqlx::Error| StoreError::new(op, e);

    let precedence: String = row.try_get("link_precedence").map_err(get_err)?;
    let link_precedence = precedence
        .parse::<LinkPrecedence>()
        .map_err(|e| StoreError::new(op, e))?;
    let deleted_at: Option<i64> = row.try_get("deleted_at").map_err(get_err)?;

    Ok(Contact {
        id: row.try_get("id").map_err(get_err)?,
        email: row.try_get("email").map_err(get_err)?,
        phone_number: row.try_get("phone_number").map_err(get_err)?,
        linked_id: row.try_get("linked_id").map_err(get_err)?,
        link_precedence,
        created_at: from_millis(op, row.try_get("created_at").map_err(get_err)?)?,
        updated_at: from_millis(op, row.try_get("updated_at").map_err(get_err)?)?,
        deleted_at: deleted_at.map(|ms| from_millis(op, ms)).transpose()?,
    })
}

#[async_trait]
impl ContactStore for SqliteStore {
    async fn insert(&self, contact: NewContact) -> StoreResult<Contact> {
        const OP: &str = "insert contact";
        let ts = to_millis(&contact.created_at);
        let result = sqlx::query(
            r#"
            INSERT INTO contacts (email, phone_number, linked_id, link_precedence,
                                  created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&contact.email)
        .bind(&contact.phone_number)
        .bind(contact.linked_id)
        .bind(contact.link_precedence.as_str())
        .bind(ts)
        .bind(ts)
        .execute(&self.pool)
        .await
        .map_err(|e| StoreError::new(OP, e))?;

        Ok(contact.into_contact(result.last_insert_rowid()))
    }

    async fn insert_primary_if_absent(&self, contact: NewContact) -> StoreResult<Option<Contact>> {
        const OP: &str = "insert primary contact";
        let ts = to_millis(&contact.created_at);
        // Single statement: the existence check and the insert cannot interleave
        // with another writer.
        let result = sqlx::query(
            r#"
            INSERT INTO contacts (email, phone_number, linked_id, link_precedence,
                                  created_at, updated_at)
            SELECT ?, ?, NULL, 'primary', ?, ?
            WHERE ? IS NULL OR NOT EXISTS (
                SELECT 1 FROM contacts WHERE email = ? AND link_precedence = 'primary'
            )
            "#,
        )
        .bind(&contact.email)
        .bind(&contact.phone_number)
        .bind(ts)
        .bind(ts)
        .bind(&contact.email)
        .bind(&contact.email)
        .execute(&self.pool)
        .await
        .map_err(|e| StoreError::new(OP, e))?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }
        let row = self.fetch_one_by_id(OP, result.last_insert_rowid()).await?;
        Ok(Some(row))
    }

    async fn find_by_email(&self, email: &str) -> StoreResult<Option<Contact>> {
        const OP: &str = "find contact by email";
        let row = sqlx::query(&format!(
            "SELECT {} FROM contacts WHERE email = ? ORDER BY id ASC LIMIT 1",
            COLUMNS
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| StoreError::new(OP, e))?;

        row.map(|r| row_to_contact(OP, &r)).transpose()
    }

    async fn find_matching(
        &self,
        email: Option<&str>,
        phone: Option<&str>,
        mode: MatchMode,
    ) -> StoreResult<Vec<Contact>> {
        const OP: &str = "find matching contacts";
        let predicate = match mode {
            MatchMode::Either => "email = ? OR phone_number = ?",
            MatchMode::Both => "email = ? AND phone_number = ?",
        };
        // NULL binds never compare equal, so an absent input matches nothing.
        let rows = sqlx::query(&format!(
            "SELECT {} FROM contacts WHERE {} ORDER BY created_at DESC, id DESC",
            COLUMNS, predicate
        ))
        .bind(email)
        .bind(phone)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| StoreError::new(OP, e))?;

        rows.iter().map(|r| row_to_contact(OP, r)).collect()
    }

    async fn get(&self, id: i64) -> StoreResult<Option<Contact>> {
        const OP: &str = "get contact";
        let row = sqlx::query(&format!("SELECT {} FROM contacts WHERE id = ?", COLUMNS))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| StoreError::new(OP, e))?;

        row.map(|r| row_to_contact(OP, &r)).transpose()
    }

    async fn counts(&self) -> StoreResult<ContactCounts> {
        const OP: &str = "count contacts";
        let row = sqlx::query(
            r#"
            SELECT COUNT(*) AS total,
                   COALESCE(SUM(CASE WHEN link_precedence = 'primary' THEN 1 ELSE 0 END), 0) AS primary_count
            FROM contacts
            "#,
        )
        .fetch_one(&self.pool)
        .await
        .map_err(|e| StoreError::new(OP, e))?;

        let total: i64 = row.try_get("total").map_err(|e| StoreError::new(OP, e))?;
        let primary: i64 = row
            .try_get("primary_count")
            .map_err(|e| StoreError::new(OP, e))?;
        Ok(ContactCounts {
            total,
            primary,
            secondary: total - primary,
        })
    }
}
