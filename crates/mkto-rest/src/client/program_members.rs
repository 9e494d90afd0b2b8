//! Program member endpoints.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::instrument;

use mkto_client::Result;

use super::{custom_objects::ObjectMetadata, MarketoRestClient};
use crate::types::{Page, SyncedRecord};

/// Standard fields of a program membership record. Custom membership
/// fields land in `extra`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgramMember {
    #[serde(default)]
    pub lead_id: Option<i64>,
    #[serde(default)]
    pub program_id: Option<i64>,
    #[serde(default)]
    pub program_status: Option<String>,
    #[serde(default)]
    pub acquired_by: Option<bool>,
    #[serde(default)]
    pub is_exhausted: Option<bool>,
    #[serde(default)]
    pub membership_date: Option<String>,
    #[serde(default)]
    pub reached_success: Option<bool>,
    #[serde(default)]
    pub reached_success_date: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl MarketoRestClient {
    /// Retrieve the program membership schema.
    pub async fn describe_program_members(&self) -> Result<Option<ObjectMetadata>> {
        let url = self.inner().rest_url("programs/members/describe.json");
        let envelope = self.inner().send(self.inner().get(url)).await?;
        envelope.first_as()
    }

    /// Retrieve a page of program membership field definitions.
    pub async fn get_program_member_fields(
        &self,
        batch_size: Option<usize>,
        next_page_token: Option<&str>,
    ) -> Result<Page<serde_json::Value>> {
        self.check_batch_size(batch_size)?;

        let url = self.inner().rest_url("programs/members/schema/fields.json");
        let request = self
            .inner()
            .get(url)
            .query_opt("batchSize", batch_size)
            .query_opt("nextPageToken", next_page_token);
        let envelope = self.inner().send(request).await?;
        Page::from_envelope(envelope)
    }

    /// Retrieve a page of a program's members matching a single-field
    /// filter; `filter_type` is usually `leadId` or a membership field.
    pub async fn get_program_members<T: DeserializeOwned>(
        &self,
        program_id: i64,
        filter_type: &str,
        filter_values: &[&str],
        fields: &[&str],
        batch_size: Option<usize>,
        next_page_token: Option<&str>,
    ) -> Result<Page<T>> {
        self.check_batch_size(batch_size)?;

        let url = self
            .inner()
            .rest_url(&format!("programs/{program_id}/members.json"));
        let request = self
            .inner()
            .get(url)
            .query("filterType", filter_type)
            .query_list("filterValues", filter_values)
            .query_list("fields", fields)
            .query_opt("batchSize", batch_size)
            .query_opt("nextPageToken", next_page_token);

        let envelope = self.inner().send(request).await?;
        Page::from_envelope(envelope)
    }

    /// Set the program status of leads, adding them to the program when
    /// not already members.
    #[instrument(skip(self, lead_ids), fields(leads = lead_ids.len()))]
    pub async fn sync_program_member_status(
        &self,
        program_id: i64,
        status_name: &str,
        lead_ids: &[i64],
    ) -> Result<Vec<SyncedRecord>> {
        self.check_input_len(
            "sync_program_member_status",
            lead_ids.len(),
            super::MAX_BATCH_SIZE,
        )?;

        let input: Vec<_> = lead_ids.iter().map(|id| json!({"leadId": id})).collect();
        let url = self
            .inner()
            .rest_url(&format!("programs/{program_id}/members/status.json"));
        let request = self
            .inner()
            .post(url)
            .json_value(json!({"statusName": status_name, "input": input}));
        let envelope = self.inner().send(request).await?;
        envelope.results_as()
    }

    /// Update membership field data for leads that are already program
    /// members. Each input record carries a `leadId` plus the fields to set.
    #[instrument(skip(self, input), fields(records = input.len()))]
    pub async fn sync_program_member_data<T: Serialize>(
        &self,
        program_id: i64,
        lookup_field: Option<&str>,
        input: &[T],
    ) -> Result<Vec<SyncedRecord>> {
        self.check_input_len("sync_program_member_data", input.len(), super::MAX_BATCH_SIZE)?;

        let mut body = json!({"input": input});
        if let Some(lookup_field) = lookup_field {
            body["lookupField"] = json!(lookup_field);
        }

        let url = self
            .inner()
            .rest_url(&format!("programs/{program_id}/members.json"));
        let request = self.inner().post(url).json_value(body);
        let envelope = self.inner().send(request).await?;
        envelope.results_as()
    }

    /// Remove leads from a program.
    pub async fn delete_program_members(
        &self,
        program_id: i64,
        lead_ids: &[i64],
    ) -> Result<Vec<SyncedRecord>> {
        self.check_input_len("delete_program_members", lead_ids.len(), super::MAX_BATCH_SIZE)?;

        let input: Vec<_> = lead_ids.iter().map(|id| json!({"leadId": id})).collect();
        let url = self
            .inner()
            .rest_url(&format!("programs/{program_id}/members/delete.json"));
        let request = self.inner().post(url).json_value(json!({"input": input}));
        let envelope = self.inner().send(request).await?;
        envelope.results_as()
    }
}
