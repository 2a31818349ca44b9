mod browse;
mod render;

use std::sync::Arc;

use clap::{Parser, Subcommand};
use nicheradar_client::{CatalogFetcher, DetailLookup, HttpGateway, LifecycleState};
use nicheradar_core::config::MAX_CATALOG_LIMIT;
use nicheradar_core::AppConfig;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "nicheradar")]
#[command(about = "Browse Notino perfume prices through the NicheRadar scraping backend")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Load one page of the catalog for a country
    Catalog {
        /// Country code; defaults to NICHERADAR_DEFAULT_COUNTRY
        #[arg(long)]
        country: Option<String>,
        /// Number of products; defaults to NICHERADAR_CATALOG_LIMIT
        #[arg(long, value_parser = clap::value_parser!(u32).range(1..=i64::from(MAX_CATALOG_LIMIT)))]
        limit: Option<u32>,
        /// Print the products as JSON instead of a table
        #[arg(long)]
        json: bool,
    },
    /// Look up one product by its Notino URL
    Lookup {
        url: String,
        #[arg(long)]
        json: bool,
    },
    /// Check that the backend is reachable
    Ping,
    /// Interactive session: type a country code or paste a product URL
    Browse,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = nicheradar_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    tracing::debug!(env = %config.env, backend = %config.backend_url, "starting");

    let gateway = Arc::new(HttpGateway::new(
        &config.backend_url,
        config.request_timeout_secs,
        &config.user_agent,
    )?);

    match cli.command {
        Commands::Catalog {
            country,
            limit,
            json,
        } => run_catalog(&config, gateway, country.as_deref(), limit, json).await,
        Commands::Lookup { url, json } => run_lookup(gateway, &url, json).await,
        Commands::Ping => {
            let message = gateway.ping().await?;
            println!("{message}");
            Ok(())
        }
        Commands::Browse => browse::run_browse(&config, gateway).await,
    }
}

/// Resolves the country to load: the explicit flag if given, else the
/// configured default. Rejects codes outside the configured set.
pub(crate) fn resolve_country(config: &AppConfig, requested: Option<&str>) -> anyhow::Result<String> {
    let code = requested
        .map(|c| c.trim().to_ascii_lowercase())
        .unwrap_or_else(|| config.default_country.clone());
    if !config.supports_country(&code) {
        anyhow::bail!(
            "unsupported country '{code}' (choose one of: {})",
            config.countries.join(", ")
        );
    }
    Ok(code)
}

async fn run_catalog(
    config: &AppConfig,
    gateway: Arc<HttpGateway>,
    country: Option<&str>,
    limit: Option<u32>,
    json: bool,
) -> anyhow::Result<()> {
    let country = resolve_country(config, country)?;
    let limit = limit.unwrap_or(config.catalog_limit);

    let fetcher = CatalogFetcher::new(gateway);
    fetcher.load(limit, &country).await?;

    match fetcher.current() {
        LifecycleState::Success(products) if json => {
            println!("{}", serde_json::to_string_pretty(&products)?);
            Ok(())
        }
        LifecycleState::Error(message) => anyhow::bail!(message),
        state => {
            println!("{}", render::render_catalog(&state, &country));
            Ok(())
        }
    }
}

async fn run_lookup(gateway: Arc<HttpGateway>, url: &str, json: bool) -> anyhow::Result<()> {
    let lookup = DetailLookup::new(gateway);
    lookup.lookup(url).await?;

    match lookup.current() {
        LifecycleState::Success(product) if json => {
            println!("{}", serde_json::to_string_pretty(&product)?);
            Ok(())
        }
        LifecycleState::Error(message) => anyhow::bail!(message),
        state => {
            println!("{}", render::render_detail(&state));
            Ok(())
        }
    }
}
