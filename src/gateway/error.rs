//! Gateway error types
//!
//! Failures of the REST API client and of the live race channel.

use thiserror::Error;

/// Errors that can occur when talking to the Ponyracer backend
#[derive(Error, Debug)]
pub enum GatewayError {
    /// HTTP transport failure
    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Non-success response from the API
    #[error("API error {status}: {message}")]
    Api { status: u16, message: String },

    #[error("Request timeout")]
    Timeout,

    #[error("Ponyracer API unavailable")]
    Unavailable,

    /// Base URL cannot address the API
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// Requested resource does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// Opening a streaming subscription failed
    #[error("Subscription failed: {0}")]
    Subscribe(String),

    /// WebSocket transport failure
    #[error("WebSocket error: {0}")]
    WebSocket(String),

    /// Malformed STOMP frame
    #[error("Invalid frame: {0}")]
    Frame(String),

    /// Response or message body did not match the expected shape
    #[error("Decode error: {0}")]
    Decode(#[from] serde_json::Error),

    /// The current session could not be updated
    #[error("Session error: {0}")]
    Session(String),
}

impl GatewayError {
    /// Classify a reqwest failure the way callers care about
    pub(crate) fn from_transport(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            GatewayError::Timeout
        } else if err.is_connect() {
            GatewayError::Unavailable
        } else {
            GatewayError::Request(err)
        }
    }
}

impl From<tokio_tungstenite::tungstenite::Error> for GatewayError {
    fn from(err: tokio_tungstenite::tungstenite::Error) -> Self {
        GatewayError::WebSocket(err.to_string())
    }
}

/// Result type for gateway operations
pub type GatewayResult<T> = Result<T, GatewayError>;
