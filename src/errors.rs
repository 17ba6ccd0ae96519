use astra::Response;
// errors.rs
use std::fmt;

/// Errors raised by the map/search layer and its outbound collaborators.
///
/// None of these are fatal: callers log them and fall back to a degraded
/// view (placeholder map, empty results, zero counts).
#[derive(Debug, Clone, PartialEq)]
pub enum MapError {
    Config(String),
    Network(String),
    Provider(String),
    Decode(String),
    InvalidInput(String),
}

pub type MapResult<T> = Result<T, MapError>;

impl fmt::Display for MapError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MapError::Config(msg) => write!(f, "Configuration error: {msg}"),
            MapError::Network(msg) => write!(f, "Network error: {msg}"),
            MapError::Provider(msg) => write!(f, "Provider error: {msg}"),
            MapError::Decode(msg) => write!(f, "Decode error: {msg}"),
            MapError::InvalidInput(msg) => write!(f, "Invalid input: {msg}"),
        }
    }
}

impl std::error::Error for MapError {}

/// Errors originating from the demo server's routing layer.
#[derive(Debug)]
pub enum ServerError {
    NotFound,
    BadRequest(String),
    Upstream(String),
    InternalError,
}

// Type alias commonly used by route handlers.
pub type ResultResp = Result<Response, ServerError>;

impl fmt::Display for ServerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ServerError::NotFound => write!(f, "Not Found"),
            ServerError::BadRequest(msg) => write!(f, "Bad Request: {msg}"),
            ServerError::Upstream(msg) => write!(f, "Upstream Error: {msg}"),
            ServerError::InternalError => write!(f, "Internal Server Error"),
        }
    }
}

impl std::error::Error for ServerError {}

impl From<MapError> for ServerError {
    fn from(err: MapError) -> Self {
        match err {
            MapError::InvalidInput(msg) => ServerError::BadRequest(msg),
            other => ServerError::Upstream(other.to_string()),
        }
    }
}
