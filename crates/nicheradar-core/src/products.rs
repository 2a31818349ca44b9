use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A perfume product as returned by the scraping backend, after mapping.
///
/// Catalog listings and single-URL lookups share this shape. The two reads
/// are independent: a summary and a later detail for the same `url` may
/// disagree (e.g. the price changed between scrapes) and are never
/// reconciled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    /// Display name as scraped, e.g. `"Eau de Parfum X 100 ml"`.
    pub name: String,
    /// Non-negative price, exactly as the backend reported it.
    pub price: Decimal,
    /// Currency code passed through verbatim (e.g. `"EUR"`). No conversion.
    pub currency: String,
    /// Canonical product page URL. Never empty; used as the list identity.
    pub url: String,
    /// Product image URL, if the backend found one.
    pub image: Option<String>,
}

/// An entry of a catalog listing. Order within the listing is display order.
pub type ProductSummary = Product;

/// A product fetched individually by its URL.
pub type ProductDetail = Product;

impl Product {
    /// Price rendered for display, e.g. `"45.50 EUR"`.
    #[must_use]
    pub fn display_price(&self) -> String {
        format_price(self.price, &self.currency)
    }
}

/// Formats `price` with exactly two decimal places followed by `currency`.
///
/// Rounds half away from zero at the second decimal place, so `19.995`
/// renders as `"20.00"`.
#[must_use]
pub fn format_price(price: Decimal, currency: &str) -> String {
    let mut rounded =
        price.round_dp_with_strategy(2, rust_decimal::RoundingStrategy::MidpointAwayFromZero);
    // Pads `45.5` to `45.50`; already rounded, so this never truncates.
    rounded.rescale(2);
    format!("{rounded} {currency}")
}
