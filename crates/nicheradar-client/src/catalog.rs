use std::future::Future;
use std::sync::Arc;

use nicheradar_core::ProductSummary;

use crate::error::InputError;
use crate::gateway::BackendGateway;
use crate::lifecycle::{LifecycleState, RequestLifecycle, RequestToken, Settled, StateReceiver};

/// Controller for the catalog view: one gateway, one lifecycle.
pub struct CatalogFetcher<G> {
    gateway: G,
    lifecycle: RequestLifecycle<Vec<ProductSummary>>,
}

impl<G: BackendGateway> CatalogFetcher<G> {
    pub fn new(gateway: G) -> Self {
        Self {
            gateway,
            lifecycle: RequestLifecycle::new(),
        }
    }

    /// Loads up to `limit` products for `country` and settles the lifecycle.
    ///
    /// Safe to call again while a previous load is outstanding: whichever
    /// call was triggered last owns the final state, regardless of which
    /// response arrives first. The trigger happens when the returned future
    /// is first polled; use [`CatalogFetcher::trigger`] to fix the order at
    /// call time instead.
    ///
    /// # Errors
    ///
    /// Returns [`InputError::NonPositiveLimit`] or [`InputError::EmptyCountry`]
    /// without touching the lifecycle or the network. Backend failures are
    /// not errors here; they land in the lifecycle's error phase.
    pub async fn load(&self, limit: u32, country: &str) -> Result<Settled, InputError> {
        let (token, country) = self.start(limit, country)?;
        Ok(self.finish(token, limit, &country).await)
    }

    /// Validates and triggers a load immediately, returning a `'static`
    /// future that performs the fetch and settles.
    ///
    /// The request token is taken before this returns, so loads triggered
    /// in sequence keep that order however the futures are later scheduled
    /// (e.g. each handed to `tokio::spawn`).
    ///
    /// # Errors
    ///
    /// Same input checks as [`CatalogFetcher::load`]; on error the lifecycle
    /// is left untouched.
    pub fn trigger(
        self: &Arc<Self>,
        limit: u32,
        country: &str,
    ) -> Result<impl Future<Output = Settled> + Send + 'static, InputError>
    where
        G: 'static,
    {
        let (token, country) = self.start(limit, country)?;
        let this = Arc::clone(self);
        Ok(async move { this.finish(token, limit, &country).await })
    }

    #[must_use]
    pub fn current(&self) -> LifecycleState<Vec<ProductSummary>> {
        self.lifecycle.current()
    }

    #[must_use]
    pub fn subscribe(&self) -> StateReceiver<Vec<ProductSummary>> {
        self.lifecycle.subscribe()
    }

    fn start(&self, limit: u32, country: &str) -> Result<(RequestToken, String), InputError> {
        if limit == 0 {
            return Err(InputError::NonPositiveLimit);
        }
        let country = country.trim();
        if country.is_empty() {
            return Err(InputError::EmptyCountry);
        }

        let token = self.lifecycle.begin();
        tracing::debug!(limit, country, sequence = token.sequence(), "catalog load");
        Ok((token, country.to_owned()))
    }

    async fn finish(&self, token: RequestToken, limit: u32, country: &str) -> Settled {
        let result = self.gateway.fetch_catalog(limit, country).await;
        self.lifecycle.settle(token, result)
    }
}
