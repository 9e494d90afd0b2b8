//! Marketo instance credentials.
//!
//! A `Credentials` value carries the three coordinates of a Marketo instance
//! (client id, client secret, Munchkin account id) plus an optional base URL
//! override for pointing at a mock server in tests. There is no global
//! environment: every client is constructed from an explicit value.

use crate::error::{Error, ErrorKind, Result};

/// Environment variable holding the client id.
pub const ENV_CLIENT_ID: &str = "MKTO_CLIENT_ID";
/// Environment variable holding the client secret.
pub const ENV_CLIENT_SECRET: &str = "MKTO_CLIENT_SECRET";
/// Environment variable holding the Munchkin account id.
pub const ENV_MUNCHKIN_ID: &str = "MKTO_MUNCHKIN_ID";

/// Credentials for a Marketo instance.
///
/// The client secret is redacted in Debug output to prevent accidental
/// exposure in logs.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    client_id: String,
    client_secret: String,
    munchkin_id: String,
    base_url: Option<String>,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("client_id", &self.client_id)
            .field("client_secret", &"[REDACTED]")
            .field("munchkin_id", &self.munchkin_id)
            .field("base_url", &self.base_url)
            .finish()
    }
}

impl Credentials {
    /// Create credentials, validating that all three values are non-empty.
    ///
    /// Validation failures surface as configuration errors before any
    /// network traffic happens.
    pub fn new(
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        munchkin_id: impl Into<String>,
    ) -> Result<Self> {
        let client_id = client_id.into();
        let client_secret = client_secret.into();
        let munchkin_id = munchkin_id.into();

        for (name, value) in [
            ("client_id", &client_id),
            ("client_secret", &client_secret),
            ("munchkin_id", &munchkin_id),
        ] {
            if value.trim().is_empty() {
                return Err(Error::new(ErrorKind::Config(format!(
                    "{name} must not be empty"
                ))));
            }
        }

        Ok(Self {
            client_id,
            client_secret,
            munchkin_id,
            base_url: None,
        })
    }

    /// Load credentials from `MKTO_CLIENT_ID`, `MKTO_CLIENT_SECRET`, and
    /// `MKTO_MUNCHKIN_ID`.
    pub fn from_env() -> Result<Self> {
        let read = |name: &str| {
            std::env::var(name).map_err(|_| {
                Error::new(ErrorKind::Config(format!(
                    "environment variable {name} is not set"
                )))
            })
        };

        Self::new(
            read(ENV_CLIENT_ID)?,
            read(ENV_CLIENT_SECRET)?,
            read(ENV_MUNCHKIN_ID)?,
        )
    }

    /// Override the instance base URL (normally derived from the Munchkin
    /// id). Used to point at a local mock server in tests.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into().trim_end_matches('/').to_string());
        self
    }

    /// The client id.
    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    /// The client secret (for the token exchange only).
    pub fn client_secret(&self) -> &str {
        &self.client_secret
    }

    /// The Munchkin account id.
    pub fn munchkin_id(&self) -> &str {
        &self.munchkin_id
    }

    /// The instance base URL: the override if set, otherwise
    /// `https://{munchkin_id}.mktorest.com`.
    pub fn base_url(&self) -> String {
        match &self.base_url {
            Some(url) => url.clone(),
            None => format!("https://{}.mktorest.com", self.munchkin_id),
        }
    }

    /// The identity token endpoint.
    pub fn identity_url(&self) -> String {
        format!("{}/identity/oauth/token", self.base_url())
    }
}
