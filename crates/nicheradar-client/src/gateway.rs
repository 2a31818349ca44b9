//! HTTP gateway to the NicheRadar scraping backend.
//!
//! One call is one round trip: no retry, no caching. Every outcome, including
//! transport failures, comes back as a [`FetchError`].

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use nicheradar_core::{ProductDetail, ProductSummary};
use reqwest::{Client, Url};

use crate::error::{BuildError, FetchError};
use crate::normalize::{parse_catalog, parse_detail};
use crate::types::{ErrorBody, PingResponse};

const CATALOG_PATH: &str = "api/scrape/notino";
const DETAIL_PATH: &str = "api/scrape/notino/product";
const PING_PATH: &str = "api/ping";

/// The seam the fetchers call through.
///
/// Implemented by [`HttpGateway`] in production and by scripted fakes in
/// tests.
pub trait BackendGateway: Send + Sync {
    /// Fetches up to `limit` catalog entries for `country`, in display order.
    fn fetch_catalog(
        &self,
        limit: u32,
        country: &str,
    ) -> impl Future<Output = Result<Vec<ProductSummary>, FetchError>> + Send;

    /// Fetches one product by its canonical page URL.
    fn fetch_by_url(
        &self,
        product_url: &str,
    ) -> impl Future<Output = Result<ProductDetail, FetchError>> + Send;
}

impl<G: BackendGateway> BackendGateway for Arc<G> {
    fn fetch_catalog(
        &self,
        limit: u32,
        country: &str,
    ) -> impl Future<Output = Result<Vec<ProductSummary>, FetchError>> + Send {
        (**self).fetch_catalog(limit, country)
    }

    fn fetch_by_url(
        &self,
        product_url: &str,
    ) -> impl Future<Output = Result<ProductDetail, FetchError>> + Send {
        (**self).fetch_by_url(product_url)
    }
}

/// [`BackendGateway`] over `reqwest`.
///
/// Use [`HttpGateway::new`] with the configured backend URL, or point it at a
/// wiremock server in tests.
pub struct HttpGateway {
    client: Client,
    endpoints: Endpoints,
}

/// Endpoint URLs resolved against the base URL once, at construction.
struct Endpoints {
    catalog: Url,
    detail: Url,
    ping: Url,
}

impl Endpoints {
    fn resolve(base: &Url, raw: &str) -> Result<Self, BuildError> {
        let join = |path: &str| {
            base.join(path).map_err(|e| BuildError::InvalidBaseUrl {
                url: raw.to_owned(),
                reason: format!("cannot resolve {path}: {e}"),
            })
        };
        Ok(Self {
            catalog: join(CATALOG_PATH)?,
            detail: join(DETAIL_PATH)?,
            ping: join(PING_PATH)?,
        })
    }
}

impl HttpGateway {
    /// Creates a gateway for the backend at `base_url`.
    ///
    /// `timeout_secs` bounds each whole request; there is no other timeout
    /// policy.
    ///
    /// # Errors
    ///
    /// Returns [`BuildError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed, or [`BuildError::InvalidBaseUrl`] if
    /// `base_url` is not an absolute http(s) URL.
    pub fn new(base_url: &str, timeout_secs: u64, user_agent: &str) -> Result<Self, BuildError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .build()?;

        // Exactly one trailing slash so `join` appends below the base path
        // instead of replacing its last segment.
        let normalised = format!("{}/", base_url.trim().trim_end_matches('/'));
        let parsed = Url::parse(&normalised).map_err(|e| BuildError::InvalidBaseUrl {
            url: base_url.to_owned(),
            reason: e.to_string(),
        })?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(BuildError::InvalidBaseUrl {
                url: base_url.to_owned(),
                reason: format!("unsupported scheme '{}'", parsed.scheme()),
            });
        }

        let endpoints = Endpoints::resolve(&parsed, base_url)?;

        Ok(Self { client, endpoints })
    }

    /// Checks that the backend is up, returning its greeting message.
    ///
    /// # Errors
    ///
    /// Same mapping as the fetch operations: [`FetchError::Http`],
    /// [`FetchError::Transport`], or [`FetchError::Parse`].
    pub async fn ping(&self) -> Result<String, FetchError> {
        let url = self.endpoints.ping.clone();
        let body = self.request_text(url).await?;
        let parsed: PingResponse = serde_json::from_str(&body).map_err(|e| FetchError::Parse {
            reason: format!("ping body: {e}"),
        })?;
        Ok(parsed.message)
    }

    /// Sends a GET and returns the body of a 2xx response.
    ///
    /// # Errors
    ///
    /// [`FetchError::Http`] on any non-2xx status, even if its body cannot
    /// be read; [`FetchError::Transport`] if the request cannot be sent or a
    /// 2xx body cannot be read.
    async fn request_text(&self, url: Url) -> Result<String, FetchError> {
        tracing::debug!(url = %url, "backend request");

        let response = self.client.get(url.clone()).send().await.map_err(|e| {
            tracing::warn!(url = %url, error = %e, "backend unreachable");
            transport_error(&e)
        })?;
        let status = response.status();

        if !status.is_success() {
            // The status alone decides the outcome; the body only adds detail.
            let body = response.text().await.unwrap_or_default();
            let detail = extract_detail(&body);
            tracing::warn!(
                url = %url,
                status = status.as_u16(),
                detail = detail.as_deref().unwrap_or(""),
                "backend returned error status"
            );
            return Err(FetchError::Http {
                status: status.as_u16(),
                detail,
            });
        }

        response.text().await.map_err(|e| transport_error(&e))
    }
}

impl BackendGateway for HttpGateway {
    async fn fetch_catalog(
        &self,
        limit: u32,
        country: &str,
    ) -> Result<Vec<ProductSummary>, FetchError> {
        let limit = limit.to_string();
        let url = with_query(&self.endpoints.catalog, &[("limit", &limit), ("country", country)]);
        let body = self.request_text(url).await?;
        let products = parse_catalog(&body)?;
        tracing::debug!(country, count = products.len(), "catalog fetched");
        Ok(products)
    }

    async fn fetch_by_url(&self, product_url: &str) -> Result<ProductDetail, FetchError> {
        let url = with_query(&self.endpoints.detail, &[("url", product_url)]);
        let body = self.request_text(url).await?;
        parse_detail(&body)
    }
}

/// Appends percent-encoded query parameters to an endpoint URL.
///
/// Values are passed raw; [`Url::query_pairs_mut`] encodes them exactly
/// once.
fn with_query(endpoint: &Url, query: &[(&str, &str)]) -> Url {
    let mut url = endpoint.clone();
    if !query.is_empty() {
        let mut pairs = url.query_pairs_mut();
        for (k, v) in query {
            pairs.append_pair(k, v);
        }
    }
    url
}

/// Flattens a `reqwest` error and its source chain into one message.
fn transport_error(err: &reqwest::Error) -> FetchError {
    let mut message = err.to_string();
    let mut source = std::error::Error::source(err);
    while let Some(inner) = source {
        message.push_str(": ");
        message.push_str(&inner.to_string());
        source = inner.source();
    }
    FetchError::Transport { message }
}

/// Best-effort read of a string `detail` field from an error body.
///
/// Returns `None` for non-JSON bodies, missing fields, non-string details
/// (FastAPI validation arrays), and blank strings.
pub(crate) fn extract_detail(body: &str) -> Option<String> {
    let parsed: ErrorBody = serde_json::from_str(body).ok()?;
    parsed
        .detail?
        .as_str()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_owned)
}

#[cfg(test)]
#[path = "gateway_test.rs"]
mod tests;
