//! OAuth 2.0 client-credentials token exchange and caching.
//!
//! Marketo issues short-lived bearer tokens from a fixed identity endpoint.
//! `TokenProvider` performs the form-encoded exchange; `TokenCache` keeps the
//! token for its lifetime (minus a safety skew) so one token serves many API
//! calls instead of one identity round trip per call.

use std::time::{Duration, Instant};

use serde::Deserialize;
use tokio::sync::Mutex;
use tracing::{debug, instrument};

use crate::credentials::Credentials;
use crate::error::{Error, ErrorKind, IdentityError, Result};

/// Refresh this long before the advertised expiry.
const EXPIRY_SKEW: Duration = Duration::from_secs(60);

/// Ceiling on the advertised token lifetime. Identity tokens live about an
/// hour; a larger `expires_in` is clamped so the expiry arithmetic cannot
/// overflow.
const MAX_TOKEN_LIFETIME: Duration = Duration::from_secs(24 * 60 * 60);

/// A successful token grant from the identity endpoint.
///
/// The access token is redacted in Debug output.
#[derive(Clone, Deserialize)]
pub struct TokenResponse {
    /// The bearer token.
    pub access_token: String,
    /// Token type, always `bearer`.
    pub token_type: String,
    /// Lifetime in seconds.
    pub expires_in: u64,
    /// Granted scope (the API user's identity).
    #[serde(default)]
    pub scope: Option<String>,
}

impl std::fmt::Debug for TokenResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenResponse")
            .field("access_token", &"[REDACTED]")
            .field("token_type", &self.token_type)
            .field("expires_in", &self.expires_in)
            .field("scope", &self.scope)
            .finish()
    }
}

/// OAuth-style failure body: `{"error": ..., "error_description": ...}`.
#[derive(Debug, Deserialize)]
struct OAuthErrorResponse {
    error: String,
    #[serde(default)]
    error_description: String,
}

/// Envelope-style failure body: `{"success": false, "errors": [...]}`.
#[derive(Debug, Deserialize)]
struct IdentityEnvelope {
    success: bool,
    #[serde(default)]
    errors: Vec<IdentityEnvelopeError>,
}

#[derive(Debug, Deserialize)]
struct IdentityEnvelopeError {
    #[serde(deserialize_with = "code_as_string")]
    code: String,
    #[serde(default)]
    message: String,
}

/// The vendor sends error codes as either numbers or strings.
fn code_as_string<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Code {
        Number(i64),
        Text(String),
    }

    Ok(match Code::deserialize(deserializer)? {
        Code::Number(n) => n.to_string(),
        Code::Text(s) => s,
    })
}

/// Fetches bearer tokens from the identity endpoint.
#[derive(Clone)]
pub struct TokenProvider {
    credentials: Credentials,
    http: reqwest::Client,
}

impl std::fmt::Debug for TokenProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenProvider")
            .field("credentials", &self.credentials)
            .finish_non_exhaustive()
    }
}

impl TokenProvider {
    /// Create a provider for the given credentials.
    pub fn new(credentials: Credentials) -> Self {
        Self {
            credentials,
            http: reqwest::Client::new(),
        }
    }

    /// Create a provider using an existing HTTP client.
    pub fn with_http_client(credentials: Credentials, http: reqwest::Client) -> Self {
        Self { credentials, http }
    }

    /// The credentials this provider exchanges.
    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    /// Exchange the client credentials for a bearer token.
    ///
    /// Both failure shapes the identity endpoint produces are surfaced with
    /// their payloads intact: the OAuth `{error, error_description}` body and
    /// the envelope `{success: false, errors: [...]}` body.
    #[instrument(skip(self))]
    pub async fn fetch_token(&self) -> Result<TokenResponse> {
        let body = serde_urlencoded::to_string([
            ("grant_type", "client_credentials"),
            ("client_id", self.credentials.client_id()),
            ("client_secret", self.credentials.client_secret()),
        ])?;

        let response = self
            .http
            .post(self.credentials.identity_url())
            .header("Content-Type", "application/x-www-form-urlencoded")
            .body(body)
            .send()
            .await?;

        let status = response.status().as_u16();
        let bytes = response.bytes().await?;

        // The HTTP status is unreliable here: failures can arrive with 200
        // and an envelope body, or with 401 and an OAuth body. The body
        // shape is the signal.
        if let Ok(token) = serde_json::from_slice::<TokenResponse>(&bytes) {
            debug!(expires_in = token.expires_in, "Token issued");
            return Ok(token);
        }

        if let Ok(oauth) = serde_json::from_slice::<OAuthErrorResponse>(&bytes) {
            return Err(Error::new(ErrorKind::Rejected {
                errors: vec![IdentityError {
                    code: oauth.error,
                    message: oauth.error_description,
                }],
            }));
        }

        if let Ok(envelope) = serde_json::from_slice::<IdentityEnvelope>(&bytes) {
            if !envelope.success {
                return Err(Error::new(ErrorKind::Rejected {
                    errors: envelope
                        .errors
                        .into_iter()
                        .map(|e| IdentityError {
                            code: e.code,
                            message: e.message,
                        })
                        .collect(),
                }));
            }
        }

        Err(Error::new(ErrorKind::MalformedResponse(format!(
            "identity endpoint returned HTTP {status} with an unrecognized body"
        ))))
    }
}

struct CachedToken {
    token: String,
    expires_at: Instant,
}

/// Time-bounded cache in front of a `TokenProvider`.
///
/// `get_or_fetch` returns the cached token while it is fresh and refetches
/// once the advertised lifetime (minus [`EXPIRY_SKEW`]) has elapsed.
/// `invalidate` drops the cached token so the next call refetches; callers
/// use it when the API reports the token expired or invalid (codes 601/602).
pub struct TokenCache {
    provider: TokenProvider,
    slot: Mutex<Option<CachedToken>>,
    skew: Duration,
}

impl std::fmt::Debug for TokenCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenCache")
            .field("provider", &self.provider)
            .field("skew", &self.skew)
            .finish_non_exhaustive()
    }
}

impl TokenCache {
    /// Create a cache over the given provider with the default skew.
    pub fn new(provider: TokenProvider) -> Self {
        Self::with_skew(provider, EXPIRY_SKEW)
    }

    /// Create a cache with a custom refresh skew.
    pub fn with_skew(provider: TokenProvider, skew: Duration) -> Self {
        Self {
            provider,
            slot: Mutex::new(None),
            skew,
        }
    }

    /// The provider backing this cache.
    pub fn provider(&self) -> &TokenProvider {
        &self.provider
    }

    /// Return the cached token, fetching a fresh one if absent or expired.
    pub async fn get_or_fetch(&self) -> Result<String> {
        let mut slot = self.slot.lock().await;

        if let Some(cached) = slot.as_ref() {
            if Instant::now() < cached.expires_at {
                return Ok(cached.token.clone());
            }
        }

        let response = self.provider.fetch_token().await?;
        let lifetime = Duration::from_secs(response.expires_in).min(MAX_TOKEN_LIFETIME);
        let expires_at = Instant::now() + lifetime.saturating_sub(self.skew);

        let token = response.access_token;
        *slot = Some(CachedToken {
            token: token.clone(),
            expires_at,
        });

        Ok(token)
    }

    /// Drop the cached token so the next `get_or_fetch` refetches.
    pub async fn invalidate(&self) {
        let mut slot = self.slot.lock().await;
        *slot = None;
    }
}
