use std::future::Future;
use std::sync::Arc;

use nicheradar_core::ProductDetail;

use crate::error::InputError;
use crate::gateway::BackendGateway;
use crate::lifecycle::{LifecycleState, RequestLifecycle, RequestToken, Settled, StateReceiver};

/// Controller for the paste-a-URL view.
pub struct DetailLookup<G> {
    gateway: G,
    lifecycle: RequestLifecycle<ProductDetail>,
}

impl<G: BackendGateway> DetailLookup<G> {
    pub fn new(gateway: G) -> Self {
        Self {
            gateway,
            lifecycle: RequestLifecycle::new(),
        }
    }

    /// Looks up the product at `url`. The previously displayed product is
    /// cleared as soon as the new request starts.
    ///
    /// # Errors
    ///
    /// Returns [`InputError::EmptyUrl`] for an empty or blank `url`; nothing
    /// is sent and the lifecycle keeps its current state.
    pub async fn lookup(&self, url: &str) -> Result<Settled, InputError> {
        let (token, url) = self.start(url)?;
        Ok(self.finish(token, &url).await)
    }

    /// Like [`DetailLookup::lookup`], but the lookup is triggered before
    /// this returns, so the caller may spawn the future without losing
    /// trigger order.
    ///
    /// # Errors
    ///
    /// Returns [`InputError::EmptyUrl`] for an empty or blank `url`.
    pub fn trigger(
        self: &Arc<Self>,
        url: &str,
    ) -> Result<impl Future<Output = Settled> + Send + 'static, InputError>
    where
        G: 'static,
    {
        let (token, url) = self.start(url)?;
        let this = Arc::clone(self);
        Ok(async move { this.finish(token, &url).await })
    }

    #[must_use]
    pub fn current(&self) -> LifecycleState<ProductDetail> {
        self.lifecycle.current()
    }

    #[must_use]
    pub fn subscribe(&self) -> StateReceiver<ProductDetail> {
        self.lifecycle.subscribe()
    }

    fn start(&self, url: &str) -> Result<(RequestToken, String), InputError> {
        let url = url.trim();
        if url.is_empty() {
            return Err(InputError::EmptyUrl);
        }

        let token = self.lifecycle.begin();
        tracing::debug!(url, sequence = token.sequence(), "detail lookup");
        Ok((token, url.to_owned()))
    }

    async fn finish(&self, token: RequestToken, url: &str) -> Settled {
        let result = self.gateway.fetch_by_url(url).await;
        self.lifecycle.settle(token, result)
    }
}
