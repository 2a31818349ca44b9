#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub env: Environment,
    pub log_level: String,
    /// Base URL of the scraping backend, e.g. `http://127.0.0.1:8000`.
    pub backend_url: String,
    pub request_timeout_secs: u64,
    pub user_agent: String,
    /// Country codes the presentation layer offers, lowercased, in menu order.
    pub countries: Vec<String>,
    pub default_country: String,
    pub catalog_limit: u32,
}

impl AppConfig {
    /// Returns `true` if `code` is one of the configured countries
    /// (case-insensitive).
    #[must_use]
    pub fn supports_country(&self, code: &str) -> bool {
        let code = code.trim();
        self.countries.iter().any(|c| c.eq_ignore_ascii_case(code))
    }
}
