//! Error types for Graph API calls

/// Errors from tool invocations.
///
/// `Transport`, `Status` and `InvalidResponse` together make up the transport
/// failure class: they surface to the caller verbatim and are never retried.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("request failed: {0}")]
    Transport(String),

    #[error("Graph API returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("invalid response body: {0}")]
    InvalidResponse(String),

    #[error("invalid URL: {0}")]
    InvalidUrl(String),

    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}

/// Result alias for Graph API operations.
pub type Result<T> = std::result::Result<T, Error>;
