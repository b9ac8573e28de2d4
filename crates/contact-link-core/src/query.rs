//! Identity lookup (the read path).

use std::sync::Arc;

use crate::error::{ContactError, ContactResult};
use crate::models::{non_empty, MatchMode};
use crate::store::ContactStore;
use crate::view::ContactView;

/// Assembles [`ContactView`]s from the rows sharing an email or phone.
pub struct QueryService {
    store: Arc<dyn ContactStore>,
}

impl QueryService {
    pub fn new(store: Arc<dyn ContactStore>) -> Self {
        Self { store }
    }

    /// View over every row whose email equals `email` or whose phone equals
    /// `phone`. At least one must be present.
    pub async fn lookup(
        &self,
        email: Option<&str>,
        phone: Option<&str>,
    ) -> ContactResult<ContactView> {
        let email = non_empty(email);
        let phone = non_empty(phone);
        if email.is_none() && phone.is_none() {
            return Err(ContactError::invalid(
                "either email or phone number must be provided",
            ));
        }
        self.assemble(email, phone, MatchMode::Either).await
    }

    /// Narrow diagnostic view: rows matching both `email` and `phone`.
    /// Both are required.
    pub async fn lookup_exact(
        &self,
        email: Option<&str>,
        phone: Option<&str>,
    ) -> ContactResult<ContactView> {
        let (Some(email), Some(phone)) = (non_empty(email), non_empty(phone)) else {
            return Err(ContactError::invalid(
                "both email and phone number must be provided",
            ));
        };
        self.assemble(Some(email), Some(phone), MatchMode::Both)
            .await
    }

    async fn assemble(
        &self,
        email: Option<&str>,
        phone: Option<&str>,
        mode: MatchMode,
    ) -> ContactResult<ContactView> {
        let rows = self.store.find_matching(email, phone, mode).await?;
        tracing::debug!(?email, ?phone, ?mode, rows = rows.len(), "contact lookup");
        ContactView::from_rows(&rows).ok_or(ContactError::NotFound)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{LinkPrecedence, NewContact};
    use crate::store::memory::InMemoryStore;

    async fn seeded() -> Arc<InMemoryStore> {
        let store = Arc::new(InMemoryStore::new());
        store
            .insert(NewContact::primary(Some("a@x.com"), Some("555")))
            .await
            .unwrap();
        store
            .insert(NewContact::secondary(Some("a@x.com"), Some("666"), 1))
            .await
            .unwrap();
        store
            .insert(NewContact::primary(Some("b@x.com"), Some("777")))
            .await
            .unwrap();
        store
    }

    #[tokio::test]
    async fn test_lookup_unknown_email_is_not_found() {
        let store = seeded().await;
        let err = QueryService::new(store)
            .lookup(Some("nobody@x.com"), None)
            .await
            .unwrap_err();
        assert!(matches!(err, ContactError::NotFound));
    }

    #[tokio::test]
    async fn test_lookup_requires_a_signal() {
        let store = seeded().await;
        let err = QueryService::new(store)
            .lookup(Some(""), None)
            .await
            .unwrap_err();
        assert!(matches!(err, ContactError::InvalidRequest(_)));
    }

    #[tokio::test]
    async fn test_lookup_by_email_newest_first() {
        let store = seeded().await;
        let view = QueryService::new(store)
            .lookup(Some("a@x.com"), None)
            .await
            .unwrap();
        assert_eq!(view.id, 2);
        assert_eq!(view.link_precedence, LinkPrecedence::Secondary);
        assert_eq!(view.phone_numbers, vec!["666", "555"]);
    }

    #[tokio::test]
    async fn test_lookup_spans_email_or_phone() {
        let store = seeded().await;
        let view = QueryService::new(store)
            .lookup(Some("a@x.com"), Some("777"))
            .await
            .unwrap();
        assert_eq!(view.id, 3);
        assert_eq!(view.email.as_deref(), Some("b@x.com"));
        assert_eq!(view.phone_numbers.len(), 3);
    }

    #[tokio::test]
    async fn test_lookup_exact() {
        let store = seeded().await;
        let service = QueryService::new(store);

        let view = service
            .lookup_exact(Some("a@x.com"), Some("555"))
            .await
            .unwrap();
        assert_eq!(view.id, 1);
        assert_eq!(view.phone_numbers, vec!["555"]);

        let err = service
            .lookup_exact(Some("a@x.com"), Some("777"))
            .await
            .unwrap_err();
        assert!(matches!(err, ContactError::NotFound));

        let err = service
            .lookup_exact(Some("a@x.com"), None)
            .await
            .unwrap_err();
        assert!(matches!(err, ContactError::InvalidRequest(_)));
    }
}
