//! Error types for mkto-auth.

/// Result type alias for mkto-auth operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for mkto-auth operations.
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

    /// Returns true if this is a configuration error.
    pub fn is_config(&self) -> bool {
        matches!(self.kind, ErrorKind::Config(_))
    }

    /// Returns true if the identity endpoint rejected the credential exchange.
    pub fn is_rejected(&self) -> bool {
        matches!(self.kind, ErrorKind::Rejected { .. })
    }

    /// The error entries returned by the identity endpoint, if any.
    pub fn identity_errors(&self) -> &[IdentityError] {
        match &self.kind {
            ErrorKind::Rejected { errors } => errors,
            _ => &[],
        }
    }
}

/// One error entry from the identity endpoint.
///
/// Covers both the OAuth shape (`error` / `error_description`) and the
/// envelope shape (`errors: [{code, message}]`); either way the payload is
/// carried through verbatim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentityError {
    pub code: String,
    pub message: String,
}

impl std::fmt::Display for IdentityError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}

/// The kind of error that occurred.
#[derive(Debug, thiserror::Error)]
pub enum ErrorKind {
    /// Invalid or missing configuration (empty credentials, bad override URL).
    #[error("Configuration error: {0}")]
    Config(String),

    /// The identity endpoint refused to issue a token.
    #[error("Identity endpoint rejected credentials: {}", errors.iter().map(|e| e.to_string()).collect::<Vec<_>>().join("; "))]
    Rejected { errors: Vec<IdentityError> },

    /// Request timeout.
    #[error("Request timeout")]
    Timeout,

    /// Connection error (DNS, TLS, refused).
    #[error("Connection error: {0}")]
    Connection(String),

    /// Other transport-level failure.
    #[error("Transport error: {0}")]
    Transport(String),

    /// The identity endpoint returned a body we cannot interpret.
    #[error("Malformed identity response: {0}")]
    MalformedResponse(String),

    /// Form/JSON serialization failure.
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        // Drop the URL before stringifying so credentials in query strings
        // can never end up in error text.
        let kind = if err.is_timeout() {
            ErrorKind::Timeout
        } else if err.is_connect() {
            ErrorKind::Connection(err.without_url().to_string())
        } else {
            ErrorKind::Transport(err.without_url().to_string())
        };

        Error::new(kind)
    }
}

impl From<serde_urlencoded::ser::Error> for Error {
    fn from(err: serde_urlencoded::ser::Error) -> Self {
        Error::with_source(ErrorKind::Serialization(err.to_string()), err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejected_error_display_includes_entries() {
        let err = Error::new(ErrorKind::Rejected {
            errors: vec![IdentityError {
                code: "invalid_client".to_string(),
                message: "Bad client credentials".to_string(),
            }],
        });
        assert!(err.is_rejected());
        assert!(err.to_string().contains("invalid_client"));
        assert!(err.to_string().contains("Bad client credentials"));
        assert_eq!(err.identity_errors().len(), 1);
    }

    #[test]
    fn config_error_predicate() {
        let err = Error::new(ErrorKind::Config("client_id is empty".to_string()));
        assert!(err.is_config());
        assert!(!err.is_rejected());
        assert!(err.identity_errors().is_empty());
    }
}
