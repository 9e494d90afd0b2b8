//! Marketo REST API client.
//!
//! `MarketoRestClient` wraps `MarketoClient` from `mkto-client` and adds one
//! module per resource family. Cheap local constraints (batch sizes, list
//! lengths) are validated before any network traffic.

use mkto_auth::Credentials;
use mkto_client::{ClientConfig, Error, ErrorKind, MarketoClient, Result};

mod activities;
mod assets;
mod campaigns;
mod custom_objects;
mod leads;
mod opportunities;
mod program_members;
mod salespersons;
mod stats;

pub use activities::{
    Activity, ActivityType, ActivityTypeAttribute, CustomActivityType, CustomActivityTypeRequest,
    LeadChange,
};
pub use assets::{Folder, FolderRef, FolderType, SmartList, StaticList};
pub use campaigns::{
    Campaign, CampaignFilter, ScheduleCampaignRequest, TokenOverride, TriggerCampaignRequest,
};
pub use custom_objects::ObjectMetadata;
pub use leads::{Lead, LeadAttribute, LeadField, LeadPartition, LeadSchema};
pub use program_members::ProgramMember;
pub use stats::{ErrorStat, UsageStat};

/// Maximum records per batch call. The API caps `batchSize` at 300.
pub const MAX_BATCH_SIZE: usize = 300;

/// Maximum items per asset listing page. The API caps `maxReturn` at 200.
pub const MAX_ASSET_RETURN: usize = 200;

/// Maximum leads accepted by a trigger campaign request.
pub const MAX_TRIGGER_LEADS: usize = 100;

/// Maximum lead ids accepted as an activity filter.
pub const MAX_ACTIVITY_LEAD_IDS: usize = 30;

/// Marketo REST API client.
///
/// # Example
///
/// ```rust,ignore
/// use mkto_auth::Credentials;
/// use mkto_rest::MarketoRestClient;
///
/// let client = MarketoRestClient::new(Credentials::from_env()?)?;
///
/// let lead = client.get_lead_by_id(318581, &[]).await?;
///
/// let mut page = client.get_lead_fields(None, None).await?;
/// while page.more_result {
///     page = client.get_lead_fields(None, page.next_page_token.as_deref()).await?;
/// }
/// ```
#[derive(Debug, Clone)]
pub struct MarketoRestClient {
    client: MarketoClient,
}

impl MarketoRestClient {
    /// Create a REST client with default HTTP configuration.
    pub fn new(credentials: Credentials) -> Result<Self> {
        let client = MarketoClient::new(credentials)?;
        Ok(Self { client })
    }

    /// Create a REST client with custom HTTP configuration.
    pub fn with_config(credentials: Credentials, config: ClientConfig) -> Result<Self> {
        let client = MarketoClient::with_config(credentials, config)?;
        Ok(Self { client })
    }

    /// Create a REST client from an existing MarketoClient.
    pub fn from_client(client: MarketoClient) -> Self {
        Self { client }
    }

    /// Get the underlying MarketoClient.
    pub fn inner(&self) -> &MarketoClient {
        &self.client
    }

    pub(crate) fn check_batch_size(&self, batch_size: Option<usize>) -> Result<()> {
        if let Some(size) = batch_size {
            if size > MAX_BATCH_SIZE {
                return Err(Error::new(ErrorKind::InvalidRequest(format!(
                    "batch size {size} exceeds the maximum of {MAX_BATCH_SIZE}"
                ))));
            }
        }
        Ok(())
    }

    pub(crate) fn check_input_len(&self, what: &str, len: usize, max: usize) -> Result<()> {
        if len > max {
            return Err(Error::new(ErrorKind::InvalidRequest(format!(
                "{what}: {len} records exceed the maximum of {max}"
            ))));
        }
        Ok(())
    }
}
