//! # mkto-rest
//!
//! Marketo REST API bindings for leads, campaigns, activities, custom
//! objects, program members, opportunities, salespersons, assets, and
//! usage statistics.
//!
//! ## Features
//!
//! - **Leads** - Query by id or filter, batch upsert, delete, schema
//! - **Campaigns** - List, schedule batch runs, trigger with leads
//! - **Activities** - Paging-token reads, custom activity type lifecycle
//! - **Custom Objects** - Typed or dynamic records, compound-key lookup
//! - **Program Members** - Status and data sync, membership queries
//! - **Opportunities & Roles** - Full CRUD over both resources
//! - **Salespersons** - CRUD keyed by external salesperson id
//! - **Assets** - Folders, static lists, smart lists (offset pagination)
//! - **Stats** - Daily and trailing-week usage and error counts
//!
//! ## Example
//!
//! ```rust,ignore
//! use mkto_auth::Credentials;
//! use mkto_rest::{MarketoRestClient, SyncAction};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), mkto_rest::Error> {
//!     let client = MarketoRestClient::new(Credentials::from_env()?)?;
//!
//!     // Look up leads by email
//!     let page = client
//!         .get_leads_by_filter_type("email", &["kai@acme.test"], &[], None, None)
//!         .await?;
//!
//!     // Upsert a batch; each record carries its own outcome
//!     let input = vec![serde_json::json!({
//!         "email": "kai@acme.test",
//!         "firstName": "Kai"
//!     })];
//!     let outcomes = client
//!         .sync_leads(&input, SyncAction::CreateOrUpdate, Some("email"))
//!         .await?;
//!     for outcome in outcomes.iter().filter(|o| o.is_skipped()) {
//!         eprintln!("skipped: {:?}", outcome.reasons);
//!     }
//!
//!     Ok(())
//! }
//! ```

mod client;
mod types;

pub use client::*;
pub use types::{Page, SyncAction, SyncedRecord};

// Re-export mkto-client types that users might need
pub use mkto_client::{
    ApiError, ClientConfig, ClientConfigBuilder, Error, ErrorKind, MarketoClient, Record, Result,
};
