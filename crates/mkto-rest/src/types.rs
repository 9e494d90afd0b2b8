//! Shared types for the REST bindings.

use serde::de::DeserializeOwned;
use serde::Deserialize;

use mkto_client::{ApiError, ResponseEnvelope, Result};

/// One page of a paginated listing.
///
/// Pagination is caller-driven: a listing method returns one page, and the
/// caller threads `next_page_token` into the next call until `more_result`
/// goes false.
#[derive(Debug, Clone)]
pub struct Page<T> {
    /// The records on this page.
    pub items: Vec<T>,
    /// Token for the next page, when the endpoint has more.
    pub next_page_token: Option<String>,
    /// Whether more records remain beyond this page.
    pub more_result: bool,
    /// Request id of the call that produced this page.
    pub request_id: String,
}

impl<T: DeserializeOwned> Page<T> {
    pub(crate) fn from_envelope(envelope: ResponseEnvelope) -> Result<Self> {
        let items = envelope.results_as()?;
        Ok(Self {
            items,
            next_page_token: envelope.next_page_token,
            more_result: envelope.more_result,
            request_id: envelope.request_id,
        })
    }
}

/// Sync operation for lead, custom object, and similar upsert endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SyncAction {
    CreateOnly,
    UpdateOnly,
    #[default]
    CreateOrUpdate,
    CreateDuplicate,
}

impl SyncAction {
    /// The wire name of this action.
    pub fn as_str(&self) -> &'static str {
        match self {
            SyncAction::CreateOnly => "createOnly",
            SyncAction::UpdateOnly => "updateOnly",
            SyncAction::CreateOrUpdate => "createOrUpdate",
            SyncAction::CreateDuplicate => "createDuplicate",
        }
    }
}

impl std::fmt::Display for SyncAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-record outcome of a sync or delete call.
///
/// Batch calls succeed as a whole even when individual records fail; each
/// record's `status` ("created", "updated", "deleted", "skipped") and
/// `reasons` carry its own outcome.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncedRecord {
    /// Record id, for id-keyed resources.
    #[serde(default)]
    pub id: Option<i64>,
    /// Marketo GUID, for GUID-keyed resources (custom objects etc).
    #[serde(default, rename = "marketoGUID")]
    pub marketo_guid: Option<String>,
    /// Position of this record in the submitted input.
    #[serde(default)]
    pub seq: Option<i64>,
    /// Outcome status for this record.
    #[serde(default)]
    pub status: Option<String>,
    /// Reasons when the record was skipped or failed.
    #[serde(default)]
    pub reasons: Vec<ApiError>,
}

impl SyncedRecord {
    /// Returns true if this record was skipped.
    pub fn is_skipped(&self) -> bool {
        self.status.as_deref() == Some("skipped")
    }
}
