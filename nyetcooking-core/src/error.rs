use thiserror::Error;

#[derive(Error, Debug)]
pub enum FetchError {
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Request timed out: {0}")]
    Timeout(String),

    #[error("Connection failed: {0}")]
    Connection(String),

    #[error("HTTP status {0}")]
    HttpStatus(u16),

    #[error("HTTP request failed: {0}")]
    Request(String),
}

impl From<reqwest::Error> for FetchError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            FetchError::Timeout(e.to_string())
        } else if e.is_connect() {
            FetchError::Connection(e.to_string())
        } else if let Some(status) = e.status() {
            FetchError::HttpStatus(status.as_u16())
        } else {
            FetchError::Request(e.to_string())
        }
    }
}

#[derive(Error, Debug)]
pub enum ExtractError {
    #[error("No JSON-LD found on page")]
    NoJsonLd,

    #[error("No Recipe found in JSON-LD")]
    NoRecipe,
}

/// Failure of a single fetch-then-extract attempt.
#[derive(Error, Debug)]
pub enum AcquireError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Extract(#[from] ExtractError),
}

/// Errors from an external cache backend. These never escape `RecipeCache`.
#[derive(Error, Debug)]
pub enum BackendError {
    #[error("Cache backend unavailable: {0}")]
    Unavailable(String),

    #[error("Cache entry could not be (de)serialized: {0}")]
    Serialization(String),
}

impl From<redis::RedisError> for BackendError {
    fn from(e: redis::RedisError) -> Self {
        BackendError::Unavailable(e.to_string())
    }
}

impl From<serde_json::Error> for BackendError {
    fn from(e: serde_json::Error) -> Self {
        BackendError::Serialization(e.to_string())
    }
}

#[derive(Error, Debug)]
pub enum ResolveError {
    #[error("Invalid recipe URL: {0}")]
    InvalidUrl(String),

    #[error(transparent)]
    Acquire(#[from] AcquireError),

    #[error("Recipe not found: {0}")]
    NotFound(String),
}
