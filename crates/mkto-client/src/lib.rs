//! # mkto-client
//!
//! Core HTTP client infrastructure for the Marketo REST API.
//!
//! This crate provides:
//! - The response envelope decoder (the API's one cross-cutting contract)
//! - A transport where HTTP status is carried but `success` is the outcome
//! - Token-cache wiring: one identity round trip per token lifetime
//! - The shared error taxonomy used by every mkto-api crate
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    Application Layer                        │
//! │              (mkto-rest, mkto-bulk)                         │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │                     MarketoClient                           │
//! │  - Holds instance URLs + token cache                        │
//! │  - Appends access_token, decodes envelopes                  │
//! │  - Turns success:false into Api errors                      │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │                     HttpTransport                           │
//! │  - Raw HTTP over reqwest, pooling, timeouts                 │
//! │  - No retry loop: transient failures surface directly       │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Example
//!
//! ```rust,ignore
//! use mkto_auth::Credentials;
//! use mkto_client::MarketoClient;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), mkto_client::Error> {
//!     let creds = Credentials::from_env()?;
//!     let client = MarketoClient::new(creds)?;
//!
//!     let envelope = client
//!         .send(client.get(client.rest_url("leads/describe.json")))
//!         .await?;
//!
//!     for record in envelope.records() {
//!         println!("{:?}", record.get_str("displayName"));
//!     }
//!     Ok(())
//! }
//! ```

mod config;
mod envelope;
mod error;
mod marketo;
mod request;
mod transport;

pub use config::{ClientConfig, ClientConfigBuilder};
pub use envelope::{ApiError, Record, ResponseEnvelope};
pub use error::{Error, ErrorKind, Result};
pub use marketo::MarketoClient;
pub use request::{RequestBody, RequestBuilder, RequestMethod};
pub use transport::{HttpTransport, RawResponse};

// Credential types live in mkto-auth; re-exported for convenience.
pub use mkto_auth as auth;

/// User-Agent string for the client
pub const USER_AGENT: &str = concat!("mkto-api/", env!("CARGO_PKG_VERSION"));
