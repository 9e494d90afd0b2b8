//! Error types shared across the mkto-api workspace.
//!
//! The response envelope is the one cross-cutting contract of this API, so a
//! single taxonomy serves every layer: `mkto-rest` and `mkto-bulk` re-export
//! this type instead of wrapping it, keeping the vendor's `{code, message}`
//! list reachable wherever an error surfaces.

use crate::envelope::ApiError;

/// Result type alias for mkto-api operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for mkto-api operations.
#[derive(Debug, thiserror::Error)]
#[error("{kind}")]
pub struct Error {
    /// The kind of error that occurred.
    pub kind: ErrorKind,
    /// Optional source error.
    #[source]
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl Error {
    /// Create a new error with the given kind.
    pub fn new(kind: ErrorKind) -> Self {
        Self { kind, source: None }
    }

    /// Create a new error with the given kind and source.
    pub fn with_source(
        kind: ErrorKind,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self {
            kind,
            source: Some(Box::new(source)),
        }
    }

    /// The kind of this error.
    pub fn kind(&self) -> &ErrorKind {
        &self.kind
    }

    /// Returns true if this is a configuration error.
    pub fn is_config(&self) -> bool {
        matches!(self.kind, ErrorKind::Config(_))
    }

    /// Returns true if this request was refused before any network traffic.
    pub fn is_invalid_request(&self) -> bool {
        matches!(self.kind, ErrorKind::InvalidRequest(_))
    }

    /// Returns true if this is a timeout.
    pub fn is_timeout(&self) -> bool {
        matches!(self.kind, ErrorKind::Timeout)
    }

    /// Returns true if the API reported `success: false`.
    pub fn is_api(&self) -> bool {
        matches!(self.kind, ErrorKind::Api { .. })
    }

    /// The vendor's error list, empty for non-API errors.
    pub fn api_errors(&self) -> &[ApiError] {
        match &self.kind {
            ErrorKind::Api { errors, .. } => errors,
            _ => &[],
        }
    }

    /// Returns true if the vendor error list contains the given code.
    pub fn has_error_code(&self, code: &str) -> bool {
        self.api_errors().iter().any(|e| e.code == code)
    }
}

/// The kind of error that occurred.
#[derive(Debug, thiserror::Error)]
pub enum ErrorKind {
    /// Invalid or missing configuration.
    #[error("Configuration error: {0}")]
    Config(String),

    /// A request refused locally, before any network traffic.
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Network/IO failure (DNS, TLS, connect, broken transfer).
    #[error("Transport error: {0}")]
    Transport(String),

    /// Request timeout.
    #[error("Request timeout")]
    Timeout,

    /// The body could not be interpreted as a response envelope.
    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    /// The API answered with `success: false`.
    #[error("API error (request {request_id}): {}", errors.iter().map(|e| e.to_string()).collect::<Vec<_>>().join("; "))]
    Api {
        request_id: String,
        errors: Vec<ApiError>,
    },
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        // The bearer token rides in the query string, so the URL is dropped
        // before the error is stringified.
        let kind = if err.is_timeout() {
            ErrorKind::Timeout
        } else {
            ErrorKind::Transport(err.without_url().to_string())
        };

        Error::new(kind)
    }
}

impl From<mkto_auth::Error> for Error {
    fn from(err: mkto_auth::Error) -> Self {
        use mkto_auth::ErrorKind as Auth;

        let kind = match err.kind {
            Auth::Config(msg) => ErrorKind::Config(msg),
            Auth::Rejected { errors } => ErrorKind::Api {
                request_id: String::new(),
                errors: errors
                    .into_iter()
                    .map(|e| ApiError {
                        code: e.code,
                        message: e.message,
                    })
                    .collect(),
            },
            Auth::Timeout => ErrorKind::Timeout,
            Auth::Connection(msg) | Auth::Transport(msg) => ErrorKind::Transport(msg),
            Auth::MalformedResponse(msg) => ErrorKind::MalformedResponse(msg),
            Auth::Serialization(msg) => ErrorKind::InvalidRequest(msg),
        };

        Error { kind, source: err.source }
    }
}
