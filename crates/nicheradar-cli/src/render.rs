//! Plain-text rendering of lifecycle snapshots for the terminal.

use std::fmt::Write as _;

use nicheradar_client::LifecycleState;
use nicheradar_core::{ProductDetail, ProductSummary};

pub(crate) const LOADING: &str = "Loading…";

pub(crate) fn render_catalog(state: &LifecycleState<Vec<ProductSummary>>, country: &str) -> String {
    match state {
        LifecycleState::Idle => String::new(),
        LifecycleState::Loading => LOADING.to_string(),
        LifecycleState::Error(message) => format!("Error: {message}"),
        LifecycleState::Success(products) if products.is_empty() => {
            format!("No products found for {}.", country.to_ascii_uppercase())
        }
        LifecycleState::Success(products) => {
            let mut out = format!(
                "Notino {} ({} products)\n",
                country.to_ascii_uppercase(),
                products.len()
            );
            for (idx, product) in products.iter().enumerate() {
                let _ = writeln!(
                    out,
                    "{:>3}. {}  {}\n     {}",
                    idx + 1,
                    product.name,
                    product.display_price(),
                    product.url
                );
            }
            out.trim_end().to_string()
        }
    }
}

pub(crate) fn render_detail(state: &LifecycleState<ProductDetail>) -> String {
    match state {
        LifecycleState::Idle => String::new(),
        LifecycleState::Loading => LOADING.to_string(),
        LifecycleState::Error(message) => format!("Error: {message}"),
        LifecycleState::Success(product) => {
            let mut out = format!(
                "{}\n{}\n{}",
                product.name,
                product.display_price(),
                product.url
            );
            if let Some(image) = &product.image {
                let _ = write!(out, "\nimage: {image}");
            }
            out
        }
    }
}
