//! # mkto-api
//!
//! A Marketo REST API client library for Rust.
//!
//! This library provides type-safe access to the Marketo REST API with
//! built-in OAuth 2.0 identity exchange, token caching, and error handling.
//!
//! ## Security
//!
//! This library is designed with security in mind:
//! - Sensitive data (tokens, secrets) are redacted in Debug output
//! - Tracing/logging skips credential parameters
//! - Error messages sanitize any credential data
//!
//! ## Crates
//!
//! - **mkto-client** - Core HTTP client: response envelope, transport, shared errors
//! - **mkto-auth** - Identity: OAuth 2.0 client-credentials exchange, token cache
//! - **mkto-rest** - REST API: leads, campaigns, activities, custom objects, assets, stats
//! - **mkto-bulk** - Bulk extract: lead and program member export jobs
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use mkto_api::auth::Credentials;
//! use mkto_api::MarketoRestClient;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Reads MKTO_CLIENT_ID, MKTO_CLIENT_SECRET, MKTO_MUNCHKIN_ID
//!     let creds = Credentials::from_env()?;
//!
//!     let client = MarketoRestClient::new(creds)?;
//!
//!     let page = client
//!         .get_leads_by_filter_type("email", &["kai@acme.test"], &[], None, None)
//!         .await?;
//!
//!     for lead in &page.items {
//!         println!("{:?} {:?}", lead.id, lead.email);
//!     }
//!
//!     Ok(())
//! }
//! ```

// Re-export all crates for convenient access
#[cfg(feature = "auth")]
pub use mkto_auth as auth;
#[cfg(feature = "bulk")]
pub use mkto_bulk as bulk;
#[cfg(feature = "client")]
pub use mkto_client as client;
#[cfg(feature = "rest")]
pub use mkto_rest as rest;

// Re-export commonly used types at the top level
#[cfg(feature = "auth")]
pub use mkto_auth::Credentials;
#[cfg(feature = "bulk")]
pub use mkto_bulk::BulkExportClient;
#[cfg(feature = "client")]
pub use mkto_client::{ClientConfig, MarketoClient};
#[cfg(feature = "rest")]
pub use mkto_rest::MarketoRestClient;
