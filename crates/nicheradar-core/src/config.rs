use crate::app_config::{AppConfig, Environment};
use crate::ConfigError;

/// Largest page size the backend's catalog endpoint accepts.
pub const MAX_CATALOG_LIMIT: u32 = 50;

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if a value cannot be parsed or fails validation.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if a value cannot be parsed or fails validation.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Decoupled from the real environment so tests can pass a `HashMap` lookup.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        let raw = or_default(var, default);
        raw.trim()
            .parse::<u32>()
            .map_err(|e| ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: e.to_string(),
            })
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        let raw = or_default(var, default);
        raw.trim()
            .parse::<u64>()
            .map_err(|e| ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: e.to_string(),
            })
    };

    let env = parse_environment(&or_default("NICHERADAR_ENV", "development"))?;
    let log_level = or_default("NICHERADAR_LOG_LEVEL", "info");
    let backend_url = or_default("NICHERADAR_BACKEND_URL", "http://127.0.0.1:8000");
    let request_timeout_secs = parse_u64("NICHERADAR_REQUEST_TIMEOUT_SECS", "30")?;
    let user_agent = or_default("NICHERADAR_USER_AGENT", "nicheradar/0.1 (price-compare)");
    let countries = parse_countries(&or_default("NICHERADAR_COUNTRIES", "es,fr,de,it"));
    let default_country = or_default("NICHERADAR_DEFAULT_COUNTRY", "es")
        .trim()
        .to_ascii_lowercase();
    let catalog_limit = parse_u32("NICHERADAR_CATALOG_LIMIT", "12")?;

    let config = AppConfig {
        env,
        log_level,
        backend_url,
        request_timeout_secs,
        user_agent,
        countries,
        default_country,
        catalog_limit,
    };
    validate_app_config(&config)?;
    Ok(config)
}

fn validate_app_config(config: &AppConfig) -> Result<(), ConfigError> {
    if config.backend_url.trim().is_empty() {
        return Err(ConfigError::Validation(
            "NICHERADAR_BACKEND_URL must be non-empty".to_string(),
        ));
    }
    if config.request_timeout_secs == 0 {
        return Err(ConfigError::Validation(
            "NICHERADAR_REQUEST_TIMEOUT_SECS must be greater than zero".to_string(),
        ));
    }
    if config.countries.is_empty() {
        return Err(ConfigError::Validation(
            "NICHERADAR_COUNTRIES must list at least one country code".to_string(),
        ));
    }
    if !config.supports_country(&config.default_country) {
        return Err(ConfigError::Validation(format!(
            "default country '{}' is not in NICHERADAR_COUNTRIES ({})",
            config.default_country,
            config.countries.join(",")
        )));
    }
    if config.catalog_limit == 0 || config.catalog_limit > MAX_CATALOG_LIMIT {
        return Err(ConfigError::Validation(format!(
            "NICHERADAR_CATALOG_LIMIT must be between 1 and {MAX_CATALOG_LIMIT}, got {}",
            config.catalog_limit
        )));
    }
    Ok(())
}

/// Parse a string into an `Environment` variant.
///
/// # Errors
///
/// Returns `ConfigError::InvalidEnvVar` for anything other than
/// `development`, `test`, or `production`.
fn parse_environment(s: &str) -> Result<Environment, ConfigError> {
    match s.trim() {
        "development" => Ok(Environment::Development),
        "test" => Ok(Environment::Test),
        "production" => Ok(Environment::Production),
        other => Err(ConfigError::InvalidEnvVar {
            var: "NICHERADAR_ENV".to_string(),
            reason: format!("unknown environment '{other}'"),
        }),
    }
}

/// Splits a comma-separated country list, lowercasing and dropping blanks
/// and duplicates while keeping first-seen order.
fn parse_countries(raw: &str) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for code in raw.split(',').map(str::trim).filter(|c| !c.is_empty()) {
        let code = code.to_ascii_lowercase();
        if !out.contains(&code) {
            out.push(code);
        }
    }
    out
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
