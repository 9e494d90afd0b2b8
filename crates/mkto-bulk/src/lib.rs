//! # mkto-bulk
//!
//! Marketo bulk extract client for lead and program member export jobs.
//!
//! ## Features
//!
//! - **Export Jobs** - Create, enqueue, cancel, and list export jobs
//! - **Polling** - Wait for completion with a configurable interval
//! - **File Download** - Fetch the finished file as raw bytes
//! - **CSV Parsing** - Turn downloaded files into typed rows
//!
//! ## Example
//!
//! ```rust,ignore
//! use mkto_auth::Credentials;
//! use mkto_bulk::{BulkExportClient, CreateExportJobRequest, ExportFilter};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), mkto_bulk::Error> {
//!     let client = BulkExportClient::new(Credentials::from_env()?)?;
//!
//!     let request = CreateExportJobRequest::new(
//!         &["email", "firstName", "lastName"],
//!         ExportFilter {
//!             smart_list_name: Some("Hot Leads".to_string()),
//!             ..Default::default()
//!         },
//!     );
//!
//!     let job = client.create_lead_export_job(&request).await?;
//!     client.enqueue_lead_export_job(&job.export_id).await?;
//!     let job = client.wait_for_lead_export_job(&job.export_id).await?;
//!
//!     let file = client.get_lead_export_file(&job.export_id).await?;
//!     println!("downloaded {} bytes", file.len());
//!
//!     Ok(())
//! }
//! ```

mod client;
mod types;

pub use client::BulkExportClient;
pub use types::{
    parse_export_file, CreateExportJobRequest, DateRange, ExportFilter, ExportFormat, ExportJob,
    ExportJobPage, ExportStatus,
};

// Re-export mkto-client types that users might need
pub use mkto_client::{ClientConfig, ClientConfigBuilder, Error, ErrorKind, Result};
