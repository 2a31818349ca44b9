//! Wire types for the scraping backend's JSON responses.
//!
//! ### `price`
//! The backend emits a JSON float (`45.5`), but older builds sent the
//! scraped text as a string (`"45.50"`). Kept as a raw [`serde_json::Value`]
//! and coerced in `normalize.rs` so a bad price surfaces as a mapping error
//! naming the product rather than an opaque serde message.
//!
//! ### `image`
//! Omitted, `null`, or `""` when the scraper found no `<img>` in the card.
//!
//! ### `source`
//! Every item carries `"source": "notino"`. Ignored.

use serde::Deserialize;

/// One product object from either scrape endpoint.
#[derive(Debug, Deserialize)]
pub struct RawProduct {
    pub name: String,
    pub price: serde_json::Value,
    pub currency: String,
    pub url: String,
    #[serde(default)]
    pub image: Option<String>,
}

/// Error body shape. FastAPI puts a string here for `HTTPException`s and an
/// array of validation issues for 422s; only the string form is used.
#[derive(Debug, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub detail: Option<serde_json::Value>,
}

/// Body of `GET /api/ping`.
#[derive(Debug, Deserialize)]
pub struct PingResponse {
    pub message: String,
}
