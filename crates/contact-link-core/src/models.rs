//! Contact data model.
//!
//! One [`Contact`] row is stored per observed (email, phone) association.
//! Rows are append-only: identity grows by adding `secondary` rows that
//! point at a `primary` root, never by updating existing rows.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Whether a row is the root of an identity or linked to one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LinkPrecedence {
    Primary,
    Secondary,
}

impl LinkPrecedence {
    pub fn as_str(&self) -> &'static str {
        match self {
            LinkPrecedence::Primary => "primary",
            LinkPrecedence::Secondary => "secondary",
        }
    }
}

impl fmt::Display for LinkPrecedence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown link precedence: '{0}'")]
pub struct ParseLinkPrecedenceError(pub String);

impl FromStr for LinkPrecedence {
    type Err = ParseLinkPrecedenceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "primary" => Ok(LinkPrecedence::Primary),
            "secondary" => Ok(LinkPrecedence::Secondary),
            other => Err(ParseLinkPrecedenceError(other.to_string())),
        }
    }
}

/// A stored contact row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Contact {
    /// Store-assigned, monotonically increasing, never reused.
    pub id: i64,
    pub email: Option<String>,
    pub phone_number: Option<String>,
    /// Present iff `link_precedence` is `Secondary`; always points at a primary.
    pub linked_id: Option<i64>,
    pub link_precedence: LinkPrecedence,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Soft-delete marker. Never set by the resolver.
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Contact {
    pub fn is_primary(&self) -> bool {
        self.link_precedence == LinkPrecedence::Primary
    }

    /// Id of the primary row this contact belongs to.
    pub fn root_id(&self) -> i64 {
        self.linked_id.unwrap_or(self.id)
    }
}

/// A row about to be inserted. The store assigns `id`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewContact {
    pub email: Option<String>,
    pub phone_number: Option<String>,
    pub linked_id: Option<i64>,
    pub link_precedence: LinkPrecedence,
    pub created_at: DateTime<Utc>,
}

impl NewContact {
    pub fn primary(email: Option<&str>, phone_number: Option<&str>) -> Self {
        Self {
            email: email.map(str::to_string),
            phone_number: phone_number.map(str::to_string),
            linked_id: None,
            link_precedence: LinkPrecedence::Primary,
            created_at: Utc::now(),
        }
    }

    pub fn secondary(email: Option<&str>, phone_number: Option<&str>, primary_id: i64) -> Self {
        Self {
            email: email.map(str::to_string),
            phone_number: phone_number.map(str::to_string),
            linked_id: Some(primary_id),
            link_precedence: LinkPrecedence::Secondary,
            created_at: Utc::now(),
        }
    }

    /// Materialize the row with a store-assigned id.
    pub fn into_contact(self, id: i64) -> Contact {
        Contact {
            id,
            email: self.email,
            phone_number: self.phone_number,
            linked_id: self.linked_id,
            link_precedence: self.link_precedence,
            created_at: self.created_at,
            updated_at: self.created_at,
            deleted_at: None,
        }
    }
}

/// How `email` and `phone` combine when selecting rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchMode {
    /// Rows matching the email or the phone.
    Either,
    /// Rows matching both the email and the phone.
    Both,
}

impl MatchMode {
    /// Row predicate shared by in-process stores. An absent input never matches.
    pub fn matches(&self, contact: &Contact, email: Option<&str>, phone: Option<&str>) -> bool {
        let email_hit = email.is_some() && contact.email.as_deref() == email;
        let phone_hit = phone.is_some() && contact.phone_number.as_deref() == phone;
        match self {
            MatchMode::Either => email_hit || phone_hit,
            MatchMode::Both => email_hit && phone_hit,
        }
    }
}

/// Row counts per precedence.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ContactCounts {
    pub total: i64,
    pub primary: i64,
    pub secondary: i64,
}

/// Treat empty strings as absent. Query parameters arrive as `""` when the
/// caller sends `?email=`.
pub fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn contact(email: Option<&str>, phone: Option<&str>) -> Contact {
        NewContact::primary(email, phone).into_contact(1)
    }

    #[test]
    fn test_link_precedence_round_trips_through_str() {
        assert_eq!("primary".parse(), Ok(LinkPrecedence::Primary));
        assert_eq!("secondary".parse(), Ok(LinkPrecedence::Secondary));
        assert_eq!(LinkPrecedence::Secondary.to_string(), "secondary");
    }

    #[test]
    fn test_link_precedence_rejects_unknown() {
        let err = "tertiary".parse::<LinkPrecedence>().unwrap_err();
        assert_eq!(err, ParseLinkPrecedenceError("tertiary".into()));
    }

    #[test]
    fn test_secondary_root_is_linked_id() {
        let c = NewContact::secondary(Some("a@x.com"), None, 7).into_contact(9);
        assert_eq!(c.root_id(), 7);
        assert!(!c.is_primary());
        assert_eq!(c.created_at, c.updated_at);
        assert!(c.deleted_at.is_none());
    }

    #[test]
    fn test_primary_root_is_self() {
        let c = contact(Some("a@x.com"), None);
        assert_eq!(c.root_id(), 1);
        assert!(c.linked_id.is_none());
    }

    #[test]
    fn test_match_mode_either() {
        let c = contact(Some("a@x.com"), Some("555"));
        assert!(MatchMode::Either.matches(&c, Some("a@x.com"), None));
        assert!(MatchMode::Either.matches(&c, None, Some("555")));
        assert!(MatchMode::Either.matches(&c, Some("b@x.com"), Some("555")));
        assert!(!MatchMode::Either.matches(&c, Some("b@x.com"), Some("666")));
    }

    #[test]
    fn test_match_mode_absent_input_never_matches_absent_column() {
        let c = contact(Some("a@x.com"), None);
        assert!(!MatchMode::Either.matches(&c, Some("b@x.com"), None));
        assert!(!MatchMode::Both.matches(&c, Some("a@x.com"), None));
    }

    #[test]
    fn test_match_mode_both() {
        let c = contact(Some("a@x.com"), Some("555"));
        assert!(MatchMode::Both.matches(&c, Some("a@x.com"), Some("555")));
        assert!(!MatchMode::Both.matches(&c, Some("a@x.com"), Some("666")));
    }

    #[test]
    fn test_non_empty() {
        assert_eq!(non_empty(Some("")), None);
        assert_eq!(non_empty(None), None);
        assert_eq!(non_empty(Some("a")), Some("a"));
    }
}
