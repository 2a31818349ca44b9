use thiserror::Error;

/// Failure of one backend round trip.
///
/// The `Display` output is the human-readable message shown while a
/// lifecycle sits in the error phase.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    /// The backend answered with a non-2xx status.
    #[error("{}", http_message(*status, detail.as_deref()))]
    Http { status: u16, detail: Option<String> },

    /// The body was not valid JSON of the expected shape, or a field could
    /// not be coerced to its domain type.
    #[error("invalid response: {reason}")]
    Parse { reason: String },

    /// The backend could not be reached or the body could not be read.
    #[error("network error: {message}")]
    Transport { message: String },
}

fn http_message(status: u16, detail: Option<&str>) -> String {
    match detail {
        Some(detail) => detail.to_owned(),
        None => format!("HTTP {status}"),
    }
}

/// Local validation failure. Raised before any request is sent; never moves
/// a lifecycle into loading.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InputError {
    #[error("no product URL given")]
    EmptyUrl,

    #[error("catalog limit must be a positive integer")]
    NonPositiveLimit,

    #[error("country code must be non-empty")]
    EmptyCountry,
}

/// Failure constructing an [`crate::HttpGateway`].
#[derive(Debug, Error)]
pub enum BuildError {
    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("invalid backend URL \"{url}\": {reason}")]
    InvalidBaseUrl { url: String, reason: String },
}
