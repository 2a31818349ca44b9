//! Mapping from raw backend JSON to [`nicheradar_core::Product`].
//!
//! Every field is checked here so that invalid data never reaches the
//! presentation layer typed as valid.

use std::str::FromStr;

use nicheradar_core::{ProductDetail, ProductSummary};
use rust_decimal::Decimal;

use crate::error::FetchError;
use crate::types::RawProduct;

/// Parses a catalog body into summaries, preserving response order.
///
/// # Errors
///
/// Returns [`FetchError::Parse`] if the body is not a JSON array of product
/// objects or if any single item fails to map. A partially valid list is
/// never returned.
pub fn parse_catalog(body: &str) -> Result<Vec<ProductSummary>, FetchError> {
    let raw: Vec<RawProduct> = serde_json::from_str(body).map_err(|e| FetchError::Parse {
        reason: format!("catalog body: {e}"),
    })?;

    raw.into_iter()
        .enumerate()
        .map(|(idx, item)| {
            normalize_product(item).map_err(|e| match e {
                FetchError::Parse { reason } => FetchError::Parse {
                    reason: format!("catalog item {idx}: {reason}"),
                },
                other => other,
            })
        })
        .collect()
}

/// Parses a single-product body.
///
/// # Errors
///
/// Returns [`FetchError::Parse`] if the body is not a product object or a
/// field fails to map.
pub fn parse_detail(body: &str) -> Result<ProductDetail, FetchError> {
    let raw: RawProduct = serde_json::from_str(body).map_err(|e| FetchError::Parse {
        reason: format!("product body: {e}"),
    })?;
    normalize_product(raw)
}

/// Maps one [`RawProduct`] into a domain product.
///
/// # Errors
///
/// Returns [`FetchError::Parse`] if `price` is not a non-negative number or
/// `url` is empty.
pub fn normalize_product(raw: RawProduct) -> Result<ProductSummary, FetchError> {
    let url = raw.url.trim().to_owned();
    if url.is_empty() {
        return Err(FetchError::Parse {
            reason: format!("product \"{}\" has an empty url", raw.name),
        });
    }

    let price = coerce_price(&raw.price).ok_or_else(|| FetchError::Parse {
        reason: format!("price {} of {url} is not a number", raw.price),
    })?;
    if price < Decimal::ZERO {
        return Err(FetchError::Parse {
            reason: format!("price {price} of {url} is negative"),
        });
    }

    // Empty string means the scraper found no image.
    let image = raw
        .image
        .map(|s| s.trim().to_owned())
        .filter(|s| !s.is_empty());

    Ok(ProductSummary {
        name: raw.name,
        price,
        currency: raw.currency,
        url,
        image,
    })
}

/// Coerces a JSON number or numeric string into a [`Decimal`].
///
/// Numbers go through their textual form so `45.5` stays exactly `45.5`
/// rather than picking up binary float noise.
fn coerce_price(value: &serde_json::Value) -> Option<Decimal> {
    let text = match value {
        serde_json::Value::Number(n) => n.to_string(),
        serde_json::Value::String(s) => s.trim().to_owned(),
        _ => return None,
    };
    Decimal::from_str(&text)
        .or_else(|_| Decimal::from_scientific(&text))
        .ok()
}

#[cfg(test)]
#[path = "normalize_test.rs"]
mod tests;
