//! Shared fixtures for the client integration tests.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::str::FromStr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use nicheradar_client::{BackendGateway, FetchError};
use nicheradar_core::{ProductDetail, ProductSummary};
use rust_decimal::Decimal;
use tokio::sync::oneshot;

pub type CatalogResult = Result<Vec<ProductSummary>, FetchError>;
pub type DetailResult = Result<ProductDetail, FetchError>;

pub fn product(name: &str, price: &str, url: &str) -> ProductSummary {
    ProductSummary {
        name: name.to_string(),
        price: Decimal::from_str(price).expect("valid decimal literal"),
        currency: "EUR".to_string(),
        url: url.to_string(),
        image: None,
    }
}

/// Gateway whose responses are released by the test through oneshot
/// senders, so resolution order is fully controlled.
///
/// Each call pops the next queued receiver; calling more times than
/// responses were scripted panics.
#[derive(Default)]
pub struct ScriptedGateway {
    catalog: Mutex<VecDeque<oneshot::Receiver<CatalogResult>>>,
    detail: Mutex<VecDeque<oneshot::Receiver<DetailResult>>>,
    pub catalog_calls: Mutex<Vec<(u32, String)>>,
    pub detail_calls: Mutex<Vec<String>>,
    total_calls: AtomicUsize,
}

impl ScriptedGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues one catalog response and returns the sender that releases it.
    pub fn script_catalog(&self) -> oneshot::Sender<CatalogResult> {
        let (tx, rx) = oneshot::channel();
        self.catalog.lock().unwrap().push_back(rx);
        tx
    }

    /// Queues one detail response and returns the sender that releases it.
    pub fn script_detail(&self) -> oneshot::Sender<DetailResult> {
        let (tx, rx) = oneshot::channel();
        self.detail.lock().unwrap().push_back(rx);
        tx
    }

    pub fn total_calls(&self) -> usize {
        self.total_calls.load(Ordering::SeqCst)
    }
}

impl BackendGateway for ScriptedGateway {
    async fn fetch_catalog(&self, limit: u32, country: &str) -> CatalogResult {
        self.total_calls.fetch_add(1, Ordering::SeqCst);
        self.catalog_calls
            .lock()
            .unwrap()
            .push((limit, country.to_string()));
        let rx = self
            .catalog
            .lock()
            .unwrap()
            .pop_front()
            .expect("unscripted catalog call");
        rx.await.expect("catalog sender dropped")
    }

    async fn fetch_by_url(&self, product_url: &str) -> DetailResult {
        self.total_calls.fetch_add(1, Ordering::SeqCst);
        self.detail_calls
            .lock()
            .unwrap()
            .push(product_url.to_string());
        let rx = self
            .detail
            .lock()
            .unwrap()
            .pop_front()
            .expect("unscripted detail call");
        rx.await.expect("detail sender dropped")
    }
}
