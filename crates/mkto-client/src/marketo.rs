//! High-level Marketo client: instance URLs, token cache, envelope decoding.
//!
//! `MarketoClient` is the piece the API-surface crates (mkto-rest,
//! mkto-bulk) build on. Every `send` resolves a bearer token from the cache,
//! appends it to the query string as `access_token` (the vendor convention),
//! executes the request, decodes the envelope, and turns `success: false`
//! into an API error.
//!
//! ## Security
//!
//! - Access tokens are never recorded in spans or Debug output
//! - Error text never includes request URLs (the token rides in the query)

use std::sync::Arc;

use bytes::Bytes;
use tracing::{debug, instrument};

use mkto_auth::{Credentials, TokenCache, TokenProvider};

use crate::config::ClientConfig;
use crate::envelope::ResponseEnvelope;
use crate::error::Result;
use crate::request::RequestBuilder;
use crate::transport::HttpTransport;

/// Vendor codes meaning the bearer token is invalid or expired. Seeing one
/// drops the cached token so the next call fetches a fresh one; the failed
/// call itself is not retried.
const TOKEN_ERROR_CODES: [&str; 2] = ["601", "602"];

/// High-level Marketo API client.
///
/// Cheap to clone; clones share the transport pool and the token cache.
///
/// # Example
///
/// ```rust,ignore
/// use mkto_auth::Credentials;
/// use mkto_client::MarketoClient;
///
/// let creds = Credentials::from_env()?;
/// let client = MarketoClient::new(creds)?;
///
/// let envelope = client
///     .send(client.get(client.rest_url("leads/describe.json")))
///     .await?;
/// ```
#[derive(Clone)]
pub struct MarketoClient {
    transport: HttpTransport,
    tokens: Arc<TokenCache>,
    base_url: String,
}

impl std::fmt::Debug for MarketoClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MarketoClient")
            .field("base_url", &self.base_url)
            .field("tokens", &self.tokens)
            .finish_non_exhaustive()
    }
}

impl MarketoClient {
    /// Create a client with default configuration.
    pub fn new(credentials: Credentials) -> Result<Self> {
        Self::with_config(credentials, ClientConfig::default())
    }

    /// Create a client with custom configuration.
    pub fn with_config(credentials: Credentials, config: ClientConfig) -> Result<Self> {
        let transport = HttpTransport::new(config)?;
        let base_url = credentials.base_url();
        let provider =
            TokenProvider::with_http_client(credentials, transport.http_client().clone());

        Ok(Self {
            transport,
            tokens: Arc::new(TokenCache::new(provider)),
            base_url,
        })
    }

    /// The instance base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// The token cache shared by clones of this client.
    pub fn token_cache(&self) -> &TokenCache {
        &self.tokens
    }

    /// Build a REST endpoint URL, e.g. `rest_url("leads.json")`.
    pub fn rest_url(&self, path: &str) -> String {
        format!("{}/rest/v1/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// Build an asset endpoint URL, e.g. `asset_url("folders.json")`.
    pub fn asset_url(&self, path: &str) -> String {
        format!(
            "{}/rest/asset/v1/{}",
            self.base_url,
            path.trim_start_matches('/')
        )
    }

    /// Build a bulk endpoint URL, e.g. `bulk_url("leads/export/create.json")`.
    pub fn bulk_url(&self, path: &str) -> String {
        format!("{}/bulk/v1/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// Create a GET request builder for a full URL.
    pub fn get(&self, url: impl Into<String>) -> RequestBuilder {
        self.transport.get(url)
    }

    /// Create a POST request builder for a full URL.
    pub fn post(&self, url: impl Into<String>) -> RequestBuilder {
        self.transport.post(url)
    }

    /// Create a DELETE request builder for a full URL.
    pub fn delete(&self, url: impl Into<String>) -> RequestBuilder {
        self.transport.delete(url)
    }

    /// Execute a request and decode the envelope, failing on
    /// `success: false`.
    #[instrument(skip(self, request), fields(method = ?request.method, url = %request.url))]
    pub async fn send(&self, request: RequestBuilder) -> Result<ResponseEnvelope> {
        let token = self.tokens.get_or_fetch().await?;
        let request = request.query("access_token", token);

        let response = self.transport.execute(request).await?;
        let envelope = ResponseEnvelope::decode(&response.body)?;

        if !envelope.success {
            self.handle_token_errors(&envelope).await;
        }

        envelope.into_result()
    }

    /// Execute a request and return the undecoded body.
    ///
    /// Used for bulk export file downloads, where a completed job answers
    /// with raw CSV text. A JSON error envelope still fails as usual.
    #[instrument(skip(self, request), fields(method = ?request.method, url = %request.url))]
    pub async fn send_raw(&self, request: RequestBuilder) -> Result<Bytes> {
        let token = self.tokens.get_or_fetch().await?;
        let request = request.query("access_token", token);

        let response = self.transport.execute(request).await?;

        // File bodies are not JSON; an envelope here means the call failed.
        if let Ok(envelope) = ResponseEnvelope::decode(&response.body) {
            if !envelope.success {
                self.handle_token_errors(&envelope).await;
                envelope.into_result()?;
            }
        }

        Ok(response.body)
    }

    async fn handle_token_errors(&self, envelope: &ResponseEnvelope) {
        for code in TOKEN_ERROR_CODES {
            if envelope.has_error_code(code) {
                debug!(code, "Token rejected, dropping cached token");
                self.tokens.invalidate().await;
                return;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn client_for(server: &MockServer) -> MarketoClient {
        let creds = Credentials::new("client-id", "client-secret", "000-AAA-000")
            .unwrap()
            .with_base_url(server.uri());
        MarketoClient::new(creds).unwrap()
    }

    fn mount_identity(server: &MockServer, expected_grants: u64) -> Mock {
        Mock::given(method("POST"))
            .and(path("/identity/oauth/token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "access_token": "tok-1",
                "token_type": "bearer",
                "expires_in": 3599
            })))
            .expect(expected_grants)
    }

    #[tokio::test]
    async fn send_appends_access_token_query_param() {
        let server = MockServer::start().await;
        mount_identity(&server, 1).mount(&server).await;
        Mock::given(method("GET"))
            .and(path("/rest/v1/leads/describe.json"))
            .and(query_param("access_token", "tok-1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "requestId": "r1",
                "success": true,
                "result": [{"id": 1}]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server).await;
        let env = client
            .send(client.get(client.rest_url("leads/describe.json")))
            .await
            .unwrap();
        assert_eq!(env.results().len(), 1);
    }

    #[tokio::test]
    async fn one_token_grant_serves_many_calls() {
        let server = MockServer::start().await;
        mount_identity(&server, 1).mount(&server).await;
        Mock::given(method("GET"))
            .and(path("/rest/v1/campaigns.json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": true})))
            .expect(3)
            .mount(&server)
            .await;

        let client = client_for(&server).await;
        for _ in 0..3 {
            client
                .send(client.get(client.rest_url("campaigns.json")))
                .await
                .unwrap();
        }
    }

    #[tokio::test]
    async fn empty_credentials_fail_before_any_network_call() {
        let err = Credentials::new("", "secret", "munchkin").unwrap_err();
        assert!(err.is_config());
    }

    #[tokio::test]
    async fn identity_rejection_short_circuits_resource_call() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/identity/oauth/token"))
            .respond_with(ResponseTemplate::new(401).set_body_json(json!({
                "error": "invalid_client",
                "error_description": "Bad client credentials"
            })))
            .mount(&server)
            .await;
        // Zero expected hits on the resource endpoint.
        Mock::given(method("GET"))
            .and(path("/rest/v1/leads.json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": true})))
            .expect(0)
            .mount(&server)
            .await;

        let client = client_for(&server).await;
        let err = client
            .send(client.get(client.rest_url("leads.json")))
            .await
            .unwrap_err();

        assert!(err.is_api());
        assert!(err.has_error_code("invalid_client"));
        assert_eq!(err.api_errors()[0].message, "Bad client credentials");
    }

    #[tokio::test]
    async fn expired_token_code_drops_cached_token() {
        let server = MockServer::start().await;
        // Two grants: the initial fetch and the refetch after 602.
        mount_identity(&server, 2).mount(&server).await;
        Mock::given(method("GET"))
            .and(path("/rest/v1/leads.json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "requestId": "r2",
                "success": false,
                "errors": [{"code": 602, "message": "Access token expired"}]
            })))
            .mount(&server)
            .await;

        let client = client_for(&server).await;

        let err = client
            .send(client.get(client.rest_url("leads.json")))
            .await
            .unwrap_err();
        assert!(err.has_error_code("602"));

        // The next call fetches a fresh token rather than reusing the
        // rejected one.
        let _ = client.send(client.get(client.rest_url("leads.json"))).await;
    }

    #[tokio::test]
    async fn send_raw_returns_file_bodies_untouched() {
        let server = MockServer::start().await;
        mount_identity(&server, 1).mount(&server).await;
        let csv = "firstName,lastName,email\nAda,Lovelace,ada@example.com\n";
        Mock::given(method("GET"))
            .and(path("/bulk/v1/leads/export/job-1/file.json"))
            .respond_with(ResponseTemplate::new(200).set_body_string(csv))
            .mount(&server)
            .await;

        let client = client_for(&server).await;
        let body = client
            .send_raw(client.get(client.bulk_url("leads/export/job-1/file.json")))
            .await
            .unwrap();
        assert_eq!(body.as_ref(), csv.as_bytes());
    }

    #[tokio::test]
    async fn send_raw_surfaces_error_envelopes() {
        let server = MockServer::start().await;
        mount_identity(&server, 1).mount(&server).await;
        Mock::given(method("GET"))
            .and(path("/bulk/v1/leads/export/job-1/file.json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "requestId": "r3",
                "success": false,
                "errors": [{"code": "1029", "message": "Export job not completed"}]
            })))
            .mount(&server)
            .await;

        let client = client_for(&server).await;
        let err = client
            .send_raw(client.get(client.bulk_url("leads/export/job-1/file.json")))
            .await
            .unwrap_err();
        assert!(err.has_error_code("1029"));
    }

    #[test]
    fn url_builders() {
        let creds = Credentials::new("id", "secret", "123-ABC-456").unwrap();
        let client = MarketoClient::new(creds).unwrap();
        assert_eq!(
            client.rest_url("leads.json"),
            "https://123-ABC-456.mktorest.com/rest/v1/leads.json"
        );
        assert_eq!(
            client.asset_url("/folders.json"),
            "https://123-ABC-456.mktorest.com/rest/asset/v1/folders.json"
        );
        assert_eq!(
            client.bulk_url("leads/export/create.json"),
            "https://123-ABC-456.mktorest.com/bulk/v1/leads/export/create.json"
        );
    }

    #[test]
    fn debug_output_never_contains_secrets() {
        let creds = Credentials::new("id", "super-secret", "123").unwrap();
        let client = MarketoClient::new(creds).unwrap();
        let debug = format!("{client:?}");
        assert!(!debug.contains("super-secret"));
    }
}
