//! Interactive browse session.
//!
//! Each stdin line is one user intent. Intents are triggered as they are
//! read and then spawned rather than awaited inline, so typing `fr` right
//! after `es` starts a second catalog load while the first is still in
//! flight; the fetcher's staleness guard makes sure only the `fr` result is
//! ever shown. A single render task
//! redraws whenever either lifecycle changes.

use std::sync::{Arc, Mutex};

use nicheradar_client::{CatalogFetcher, DetailLookup, HttpGateway};
use nicheradar_core::AppConfig;
use tokio::io::{AsyncBufReadExt, BufReader};

use crate::render::{render_catalog, render_detail};

#[derive(Debug, PartialEq, Eq)]
pub(crate) enum Intent {
    SwitchCountry(String),
    Lookup(String),
    Quit,
    Ignore,
    Unknown(String),
}

pub(crate) fn parse_intent(line: &str, config: &AppConfig) -> Intent {
    let line = line.trim();
    if line.is_empty() {
        return Intent::Ignore;
    }
    if line.eq_ignore_ascii_case("quit") || line.eq_ignore_ascii_case("exit") {
        return Intent::Quit;
    }
    if line.starts_with("http://") || line.starts_with("https://") {
        return Intent::Lookup(line.to_owned());
    }
    if config.supports_country(line) {
        return Intent::SwitchCountry(line.to_ascii_lowercase());
    }
    Intent::Unknown(line.to_owned())
}

/// Runs the session until `quit` or end of input.
///
/// # Errors
///
/// Returns an error if stdin cannot be read.
pub(crate) async fn run_browse(config: &AppConfig, gateway: Arc<HttpGateway>) -> anyhow::Result<()> {
    let catalog = Arc::new(CatalogFetcher::new(Arc::clone(&gateway)));
    let lookup = Arc::new(DetailLookup::new(gateway));
    let country = Arc::new(Mutex::new(config.default_country.clone()));

    let renderer = {
        let mut catalog_rx = catalog.subscribe();
        let mut detail_rx = lookup.subscribe();
        let country = Arc::clone(&country);
        tokio::spawn(async move {
            loop {
                tokio::select! {
                    changed = catalog_rx.changed() => {
                        if changed.is_err() {
                            break;
                        }
                        let state = catalog_rx.latest();
                        let code = country.lock().map(|c| c.clone()).unwrap_or_default();
                        println!("\n== catalog ==\n{}", render_catalog(&state, &code));
                    }
                    changed = detail_rx.changed() => {
                        if changed.is_err() {
                            break;
                        }
                        let state = detail_rx.latest();
                        println!("\n== product ==\n{}", render_detail(&state));
                    }
                }
            }
        })
    };

    println!(
        "Countries: {}. Type a country code, paste a product URL, or `quit`.",
        config.countries.join(", ")
    );
    spawn_load(&catalog, &country, config.catalog_limit, config.default_country.clone());

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        match parse_intent(&line, config) {
            Intent::SwitchCountry(code) => {
                spawn_load(&catalog, &country, config.catalog_limit, code);
            }
            Intent::Lookup(url) => match lookup.trigger(&url) {
                Ok(pending) => {
                    tokio::spawn(pending);
                }
                Err(e) => println!("{e}"),
            },
            Intent::Quit => break,
            Intent::Ignore => {}
            Intent::Unknown(input) => {
                println!(
                    "Unrecognised input '{input}'. Use one of {} or a product URL.",
                    config.countries.join(", ")
                );
            }
        }
    }

    renderer.abort();
    Ok(())
}

/// Triggers the load before spawning it, so loads settle in the order the
/// intents were read.
fn spawn_load(
    catalog: &Arc<CatalogFetcher<Arc<HttpGateway>>>,
    country: &Arc<Mutex<String>>,
    limit: u32,
    code: String,
) {
    match catalog.trigger(limit, &code) {
        Ok(pending) => {
            if let Ok(mut current) = country.lock() {
                *current = code;
            }
            tokio::spawn(pending);
        }
        Err(e) => tracing::warn!(country = %code, error = %e, "catalog load rejected"),
    }
}
