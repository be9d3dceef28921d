//! Error types for Objstamp

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    // Client input errors
    #[error("No Pub/Sub message received")]
    NoMessage,

    #[error("Invalid Pub/Sub message format")]
    InvalidMessageFormat,

    #[error("Data property is not valid base64 encoded JSON")]
    InvalidPayload,

    #[error("Expected name/bucket in notification")]
    MissingObjectFields,

    // Upstream errors
    #[error("Object store returned {status}: {message}")]
    Upstream { status: u16, message: String },

    #[error("Object store request failed: {0}")]
    Http(String),

    #[error("Failed to decode object store response: {0}")]
    Decode(String),

    // Setup errors
    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl Error {
    pub fn code(&self) -> &'static str {
        match self {
            Error::NoMessage => "NoMessage",
            Error::InvalidMessageFormat => "InvalidMessageFormat",
            Error::InvalidPayload => "InvalidPayload",
            Error::MissingObjectFields => "MissingObjectFields",
            Error::Upstream { .. } => "UpstreamError",
            Error::Http(_) => "UpstreamError",
            Error::Decode(_) => "UpstreamError",
            Error::Config(_) => "InvalidConfiguration",
            Error::Io(_) => "InternalError",
        }
    }

    /// Whether the error was caused by the request rather than by upstream.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Error::NoMessage
                | Error::InvalidMessageFormat
                | Error::InvalidPayload
                | Error::MissingObjectFields
        )
    }

    pub fn http_status(&self) -> u16 {
        if self.is_client_error() {
            400
        } else {
            500
        }
    }

    /// Response body sent to the push subscription.
    ///
    /// Upstream failures answer with an empty body so that nothing about the
    /// store leaks back to the caller.
    pub fn response_body(&self) -> String {
        if self.is_client_error() {
            format!("Bad Request: {}", self)
        } else {
            String::new()
        }
    }
}
