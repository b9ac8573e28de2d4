//! The interaction flow: resolve, then look up.

use std::sync::Arc;

use crate::error::ContactResult;
use crate::query::QueryService;
use crate::resolve::{ResolveOutcome, ResolvePolicy, Resolver};
use crate::store::ContactStore;
use crate::view::ContactView;

/// Resolver and query service sharing one store handle.
pub struct IdentityService {
    store: Arc<dyn ContactStore>,
    resolver: Resolver,
    query: QueryService,
}

impl IdentityService {
    pub fn new(store: Arc<dyn ContactStore>, policy: ResolvePolicy) -> Self {
        Self {
            resolver: Resolver::new(store.clone(), policy),
            query: QueryService::new(store.clone()),
            store,
        }
    }

    pub fn store(&self) -> &Arc<dyn ContactStore> {
        &self.store
    }

    pub fn resolver(&self) -> &Resolver {
        &self.resolver
    }

    pub fn query(&self) -> &QueryService {
        &self.query
    }

    /// Record the signal, then return the identity it now belongs to.
    pub async fn interact(
        &self,
        email: Option<&str>,
        phone: Option<&str>,
    ) -> ContactResult<(ResolveOutcome, ContactView)> {
        let outcome = self.resolver.resolve(email, phone).await?;
        let view = self.query.lookup(email, phone).await?;
        Ok((outcome, view))
    }

    pub async fn details(
        &self,
        email: Option<&str>,
        phone: Option<&str>,
    ) -> ContactResult<ContactView> {
        self.query.lookup_exact(email, phone).await
    }
}
