//! Identity resolution (the write path).
//!
//! Given an incoming (email, phone) pair the [`Resolver`] either seeds a new
//! `primary` row or appends a `secondary` row linked to the identity that
//! already owns the email.
//!
//! Matching is keyed on email only. A phone number already stored under a
//! different email is not recognised and seeds an unrelated primary.
//!
//! Repeating the same request appends another secondary row every time;
//! resolution is not idempotent.
//!
//! # Policies
//!
//! | Policy | Primary creation | Concurrent first sightings |
//! |--------|------------------|----------------------------|
//! | [`ResolvePolicy::Unguarded`] | lookup, then plain insert | may create two primaries |
//! | [`ResolvePolicy::Atomic`] | lookup, then conditional insert | loser links to the winner |

use std::sync::Arc;

use serde::Deserialize;

use crate::error::{ContactError, ContactResult};
use crate::models::{non_empty, Contact, NewContact};
use crate::store::ContactStore;

/// How the lookup-then-insert sequence is protected against concurrent writers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ResolvePolicy {
    /// Conditional primary insert; a lost race becomes a secondary row.
    #[default]
    Atomic,
    /// Separate read and write. Two concurrent requests for an unseen email
    /// can both insert a primary, fragmenting the identity.
    Unguarded,
}

/// What [`Resolver::resolve`] wrote.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolveOutcome {
    CreatedPrimary(Contact),
    CreatedSecondary { primary_id: i64, contact: Contact },
}

impl ResolveOutcome {
    pub fn contact(&self) -> &Contact {
        match self {
            ResolveOutcome::CreatedPrimary(c) => c,
            ResolveOutcome::CreatedSecondary { contact, .. } => contact,
        }
    }

    /// Id of the primary row the new row belongs to.
    pub fn primary_id(&self) -> i64 {
        match self {
            ResolveOutcome::CreatedPrimary(c) => c.id,
            ResolveOutcome::CreatedSecondary { primary_id, .. } => *primary_id,
        }
    }
}

pub struct Resolver {
    store: Arc<dyn ContactStore>,
    policy: ResolvePolicy,
}

impl Resolver {
    pub fn new(store: Arc<dyn ContactStore>, policy: ResolvePolicy) -> Self {
        Self { store, policy }
    }

    pub fn policy(&self) -> ResolvePolicy {
        self.policy
    }

    /// Record one observation of `email` and/or `phone`.
    ///
    /// Empty strings count as absent. Fails with
    /// [`ContactError::InvalidRequest`] before touching the store when both
    /// are absent.
    pub async fn resolve(
        &self,
        email: Option<&str>,
        phone: Option<&str>,
    ) -> ContactResult<ResolveOutcome> {
        let email = non_empty(email);
        let phone = non_empty(phone);
        if email.is_none() && phone.is_none() {
            return Err(ContactError::invalid(
                "either email or phone number must be provided",
            ));
        }

        let existing = match email {
            Some(e) => self.store.find_by_email(e).await?,
            None => None,
        };
        tracing::debug!(?email, matched = existing.as_ref().map(|c| c.id), "email lookup");

        if let Some(existing) = existing {
            return self.link(existing.root_id(), email, phone).await;
        }

        match self.policy {
            ResolvePolicy::Unguarded => {
                let row = self.store.insert(NewContact::primary(email, phone)).await?;
                tracing::info!(contact_id = row.id, "inserted primary contact");
                Ok(ResolveOutcome::CreatedPrimary(row))
            }
            ResolvePolicy::Atomic => {
                let candidate = NewContact::primary(email, phone);
                if let Some(row) = self.store.insert_primary_if_absent(candidate).await? {
                    tracing::info!(contact_id = row.id, "inserted primary contact");
                    return Ok(ResolveOutcome::CreatedPrimary(row));
                }
                // Another writer created the primary between our lookup and insert.
                let email = email.unwrap_or_default();
                let winner = self.store.find_by_email(email).await?.ok_or_else(|| {
                    ContactError::conflict(format!(
                        "primary for '{}' was created concurrently but could not be read back",
                        email
                    ))
                })?;
                tracing::warn!(
                    primary_id = winner.root_id(),
                    "lost primary insert race, linking as secondary"
                );
                self.link(winner.root_id(), Some(email), phone).await
            }
        }
    }

    async fn link(
        &self,
        primary_id: i64,
        email: Option<&str>,
        phone: Option<&str>,
    ) -> ContactResult<ResolveOutcome> {
        let row = self
            .store
            .insert(NewContact::secondary(email, phone, primary_id))
            .await?;
        tracing::info!(
            contact_id = row.id,
            linked_id = primary_id,
            "inserted secondary contact"
        );
        Ok(ResolveOutcome::CreatedSecondary {
            primary_id,
            contact: row,
        })
    }
}
