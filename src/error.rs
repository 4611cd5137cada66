//! Errors returned by the AbuseIPDB client.

use thiserror::Error;

/// Error from a reputation client operation.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Bad or missing input, detected before any I/O.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// The request could not complete and no response body is available.
    #[error("transport error: {0}")]
    Transport(String),

    /// The response body is not valid JSON. Holds the raw body.
    #[error("abuseipdb returned an invalid json response: \"{0}\"")]
    InvalidResponse(String),

    /// The service answered with an `errors` collection.
    #[error("{0}")]
    Service(String),

    /// Valid JSON, but the `data` member is missing or has the wrong shape.
    #[error("unexpected payload: {0}")]
    UnexpectedPayload(String),
}

impl ClientError {
    pub(crate) fn config(msg: impl Into<String>) -> Self {
        ClientError::Configuration(msg.into())
    }
}
