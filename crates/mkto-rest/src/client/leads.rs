//! Lead database endpoints.

use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::instrument;

use mkto_client::Result;

use super::{MarketoRestClient, MAX_BATCH_SIZE};
use crate::types::{Page, SyncAction, SyncedRecord};

/// A lead record.
///
/// Leads are open-schema: instances add custom fields freely. The declared
/// fields cover the standard identity columns; everything else stays
/// reachable through `extra`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Lead {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
    /// Custom and non-standard fields, keyed by their REST names.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// Metadata for one lead field, from the field schema endpoints.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeadField {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub data_type: Option<String>,
    #[serde(default)]
    pub length: Option<i64>,
    #[serde(default)]
    pub is_hidden: Option<bool>,
    #[serde(default)]
    pub is_html_encoding_in_email: Option<bool>,
    #[serde(default)]
    pub is_sensitive: Option<bool>,
    #[serde(default)]
    pub is_custom: Option<bool>,
    #[serde(default)]
    pub is_api_created: Option<bool>,
}

/// Metadata for one lead attribute, from the legacy describe endpoint.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeadAttribute {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub data_type: Option<String>,
    #[serde(default)]
    pub length: Option<i64>,
    #[serde(default)]
    pub rest: Option<serde_json::Value>,
    #[serde(default)]
    pub soap: Option<serde_json::Value>,
}

/// Lead object schema, from the describe2 endpoint.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeadSchema {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub searchable_fields: Option<serde_json::Value>,
    #[serde(default)]
    pub fields: Option<serde_json::Value>,
}

/// A lead partition.
#[derive(Debug, Clone, Deserialize)]
pub struct LeadPartition {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

impl MarketoRestClient {
    /// Retrieve a single lead by id, optionally restricting the returned
    /// fields.
    pub async fn get_lead_by_id(&self, lead_id: i64, fields: &[&str]) -> Result<Option<Lead>> {
        let url = self.inner().rest_url(&format!("lead/{lead_id}.json"));
        let request = self.inner().get(url).query_list("fields", fields);
        let envelope = self.inner().send(request).await?;
        envelope.first_as()
    }

    /// Retrieve a page of leads matching a filter, e.g. `("email",
    /// &["a@example.com"])`. The batch size is capped at 300 by the API.
    pub async fn get_leads_by_filter_type(
        &self,
        filter_type: &str,
        filter_values: &[impl ToString],
        fields: &[&str],
        batch_size: Option<usize>,
        next_page_token: Option<&str>,
    ) -> Result<Page<Lead>> {
        self.check_batch_size(batch_size)?;

        let url = self.inner().rest_url("leads.json");
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

    /// Lead attribute metadata (legacy describe endpoint).
    pub async fn describe_lead(&self) -> Result<Vec<LeadAttribute>> {
        let url = self.inner().rest_url("leads/describe.json");
        let envelope = self.inner().send(self.inner().get(url)).await?;
        envelope.results_as()
    }

    /// Lead object schema with searchable fields (describe2 endpoint).
    pub async fn describe_lead2(&self) -> Result<Vec<LeadSchema>> {
        let url = self.inner().rest_url("leads/describe2.json");
        let envelope = self.inner().send(self.inner().get(url)).await?;
        envelope.results_as()
    }

    /// Insert or update leads. Accepts up to 300 input records; each record
    /// reports its own outcome in the returned list, in submission order.
    #[instrument(skip(self, input), fields(records = input.len(), action = %action))]
    pub async fn sync_leads<T: Serialize>(
        &self,
        input: &[T],
        action: SyncAction,
        lookup_field: Option<&str>,
    ) -> Result<Vec<SyncedRecord>> {
        self.check_input_len("sync_leads", input.len(), MAX_BATCH_SIZE)?;

        let mut body = json!({
            "action": action.as_str(),
            "input": input,
        });
        if let Some(field) = lookup_field {
            body["lookupField"] = json!(field);
        }

        let url = self.inner().rest_url("leads.json");
        let request = self.inner().post(url).json_value(body);
        let envelope = self.inner().send(request).await?;
        envelope.results_as()
    }

    /// Delete leads by id. Accepts up to 300 ids.
    pub async fn delete_leads(&self, lead_ids: &[i64]) -> Result<Vec<SyncedRecord>> {
        self.check_input_len("delete_leads", lead_ids.len(), MAX_BATCH_SIZE)?;

        let input: Vec<_> = lead_ids.iter().map(|id| json!({"id": id})).collect();
        let url = self.inner().rest_url("leads/delete.json");
        let request = self.inner().post(url).json_value(json!({"input": input}));
        let envelope = self.inner().send(request).await?;
        envelope.results_as()
    }

    /// Retrieve a page of lead field metadata.
    pub async fn get_lead_fields(
        &self,
        batch_size: Option<usize>,
        next_page_token: Option<&str>,
    ) -> Result<Page<LeadField>> {
        self.check_batch_size(batch_size)?;

        let url = self.inner().rest_url("leads/schema/fields.json");
        let request = self
            .inner()
            .get(url)
            .query_opt("batchSize", batch_size)
            .query_opt("nextPageToken", next_page_token);

        let envelope = self.inner().send(request).await?;
        Page::from_envelope(envelope)
    }

    /// Retrieve metadata for a single lead field by API name.
    pub async fn get_lead_field_by_name(&self, field_api_name: &str) -> Result<Option<LeadField>> {
        let url = self
            .inner()
            .rest_url(&format!("leads/schema/fields/{field_api_name}.json"));
        let envelope = self.inner().send(self.inner().get(url)).await?;
        envelope.first_as()
    }

    /// List the lead partitions of the instance.
    pub async fn get_lead_partitions(&self) -> Result<Vec<LeadPartition>> {
        let url = self.inner().rest_url("leads/partitions.json");
        let envelope = self.inner().send(self.inner().get(url)).await?;
        envelope.results_as()
    }

    /// Change the program status of leads within a program.
    pub async fn change_lead_program_status(
        &self,
        program_id: i64,
        lead_ids: &[i64],
        status: &str,
    ) -> Result<Vec<SyncedRecord>> {
        self.check_input_len(
            "change_lead_program_status",
            lead_ids.len(),
            MAX_BATCH_SIZE,
        )?;

        let input: Vec<_> = lead_ids.iter().map(|id| json!({"id": id})).collect();
        let url = self
            .inner()
            .rest_url(&format!("leads/programs/{program_id}/status.json"));
        let request = self
            .inner()
            .post(url)
            .json_value(json!({"status": status, "input": input}));
        let envelope = self.inner().send(request).await?;
        envelope.results_as()
    }
}
