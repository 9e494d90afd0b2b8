//! Activity endpoints: the activity log, lead changes, deletions, and the
//! custom activity type lifecycle.
//!
//! Activity reads are driven by paging tokens anchored to a datetime: fetch
//! one with `get_paging_token`, then thread the returned token through
//! subsequent calls.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::instrument;

use mkto_client::{Error, ErrorKind, Result};

use super::{MarketoRestClient, MAX_ACTIVITY_LEAD_IDS};
use crate::types::{Page, SyncedRecord};

/// One activity log entry.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Activity {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default, rename = "marketoGUID")]
    pub marketo_guid: Option<String>,
    #[serde(default)]
    pub lead_id: Option<i64>,
    #[serde(default)]
    pub activity_date: Option<String>,
    #[serde(default)]
    pub activity_type_id: Option<i64>,
    #[serde(default)]
    pub campaign_id: Option<i64>,
    #[serde(default)]
    pub primary_attribute_value_id: Option<i64>,
    #[serde(default)]
    pub primary_attribute_value: Option<String>,
    #[serde(default)]
    pub attributes: Vec<serde_json::Value>,
}

/// A data value change or new-lead activity.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeadChange {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default, rename = "marketoGUID")]
    pub marketo_guid: Option<String>,
    #[serde(default)]
    pub lead_id: Option<i64>,
    #[serde(default)]
    pub activity_date: Option<String>,
    #[serde(default)]
    pub activity_type_id: Option<i64>,
    #[serde(default)]
    pub campaign_id: Option<i64>,
    #[serde(default)]
    pub fields: Vec<serde_json::Value>,
    #[serde(default)]
    pub attributes: Vec<serde_json::Value>,
}

/// Metadata for one built-in activity type.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityType {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub api_name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub primary_attribute: Option<serde_json::Value>,
    #[serde(default)]
    pub attributes: Vec<serde_json::Value>,
}

/// Metadata for a provisioned custom activity type.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomActivityType {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub api_name: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub filter_name: Option<String>,
    #[serde(default)]
    pub trigger_name: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub primary_attribute: Option<serde_json::Value>,
    #[serde(default)]
    pub attributes: Vec<serde_json::Value>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

/// One attribute of a custom activity type.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityTypeAttribute {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_name: Option<String>,
    pub data_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Parameters for creating or updating a custom activity type draft.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomActivityTypeRequest {
    pub api_name: String,
    pub name: String,
    pub filter_name: String,
    pub trigger_name: String,
    pub primary_attribute: ActivityTypeAttribute,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl MarketoRestClient {
    /// List the available activity types with their metadata.
    pub async fn get_activity_types(&self) -> Result<Vec<ActivityType>> {
        let url = self.inner().rest_url("activities/types.json");
        let envelope = self.inner().send(self.inner().get(url)).await?;
        envelope.results_as()
    }

    /// Get a paging token anchored to a datetime, for the activity and
    /// lead-change endpoints.
    pub async fn get_paging_token(&self, since: DateTime<Utc>) -> Result<String> {
        let url = self.inner().rest_url("activities/pagingtoken.json");
        let request = self.inner().get(url).query(
            "sinceDatetime",
            since.to_rfc3339_opts(SecondsFormat::Secs, true),
        );
        let envelope = self.inner().send(request).await?;
        envelope.next_page_token.ok_or_else(|| {
            Error::new(ErrorKind::MalformedResponse(
                "paging token endpoint returned no nextPageToken".to_string(),
            ))
        })
    }

    /// Retrieve a page of activities after the paging token's datetime,
    /// filtered by activity type and optionally by static list membership
    /// or up to 30 lead ids.
    #[instrument(skip(self, next_page_token, activity_type_ids, asset_ids, lead_ids))]
    pub async fn get_lead_activities(
        &self,
        next_page_token: &str,
        activity_type_ids: &[i64],
        asset_ids: &[i64],
        list_id: Option<i64>,
        lead_ids: &[i64],
        batch_size: Option<usize>,
    ) -> Result<Page<Activity>> {
        self.check_batch_size(batch_size)?;
        self.check_input_len(
            "get_lead_activities lead id filter",
            lead_ids.len(),
            MAX_ACTIVITY_LEAD_IDS,
        )?;

        let url = self.inner().rest_url("activities.json");
        let request = self
            .inner()
            .get(url)
            .query("nextPageToken", next_page_token)
            .query_list("activityTypeIds", activity_type_ids)
            .query_list("assetIds", asset_ids)
            .query_opt("listId", list_id)
            .query_list("leadIds", lead_ids)
            .query_opt("batchSize", batch_size);

        let envelope = self.inner().send(request).await?;
        Page::from_envelope(envelope)
    }

    /// Retrieve a page of data value changes and new-lead activities for
    /// the given fields.
    pub async fn get_lead_changes(
        &self,
        next_page_token: &str,
        fields: &[&str],
        list_id: Option<i64>,
        lead_ids: &[i64],
        batch_size: Option<usize>,
    ) -> Result<Page<LeadChange>> {
        self.check_batch_size(batch_size)?;
        self.check_input_len(
            "get_lead_changes lead id filter",
            lead_ids.len(),
            MAX_ACTIVITY_LEAD_IDS,
        )?;

        let url = self.inner().rest_url("activities/leadchanges.json");
        let request = self
            .inner()
            .get(url)
            .query("nextPageToken", next_page_token)
            .query_list("fields", fields)
            .query_opt("listId", list_id)
            .query_list("leadIds", lead_ids)
            .query_opt("batchSize", batch_size);

        let envelope = self.inner().send(request).await?;
        Page::from_envelope(envelope)
    }

    /// Retrieve a page of leads deleted after the paging token's datetime.
    /// Deletions older than 14 days may be pruned by the vendor.
    pub async fn get_deleted_leads(
        &self,
        next_page_token: &str,
        batch_size: Option<usize>,
    ) -> Result<Page<Activity>> {
        self.check_batch_size(batch_size)?;

        let url = self.inner().rest_url("deletedleads.json");
        let request = self
            .inner()
            .get(url)
            .query("nextPageToken", next_page_token)
            .query_opt("batchSize", batch_size);

        let envelope = self.inner().send(request).await?;
        Page::from_envelope(envelope)
    }

    /// Insert custom activities for existing leads. The activity types must
    /// already be provisioned.
    pub async fn add_custom_activities<T: Serialize>(
        &self,
        input: &[T],
    ) -> Result<Vec<SyncedRecord>> {
        let url = self.inner().rest_url("activities/external.json");
        let request = self.inner().post(url).json(&json!({"input": input}))?;
        let envelope = self.inner().send(request).await?;
        envelope.results_as()
    }

    /// List the custom activity types provisioned in the instance.
    pub async fn get_custom_activity_types(&self) -> Result<Vec<CustomActivityType>> {
        let url = self.inner().rest_url("activities/external/types.json");
        let envelope = self.inner().send(self.inner().get(url)).await?;
        envelope.results_as()
    }

    /// Create a new custom activity type draft.
    pub async fn create_custom_activity_type(
        &self,
        request: &CustomActivityTypeRequest,
    ) -> Result<Vec<CustomActivityType>> {
        let url = self.inner().rest_url("activities/external/type.json");
        let request = self.inner().post(url).json(request)?;
        let envelope = self.inner().send(request).await?;
        envelope.results_as()
    }

    /// Update a custom activity type; changes apply to the draft version.
    pub async fn update_custom_activity_type(
        &self,
        api_name: &str,
        request: &CustomActivityTypeRequest,
    ) -> Result<Vec<CustomActivityType>> {
        let url = self
            .inner()
            .rest_url(&format!("activities/external/type/{api_name}.json"));
        let request = self.inner().post(url).json(request)?;
        let envelope = self.inner().send(request).await?;
        envelope.results_as()
    }

    /// Approve the draft, making it the live version of the type.
    pub async fn approve_custom_activity_type(
        &self,
        api_name: &str,
    ) -> Result<Vec<CustomActivityType>> {
        self.custom_activity_type_action(api_name, "approve").await
    }

    /// Delete the custom activity type. It must first be removed from use
    /// by any triggers or filters.
    pub async fn delete_custom_activity_type(
        &self,
        api_name: &str,
    ) -> Result<Vec<CustomActivityType>> {
        self.custom_activity_type_action(api_name, "delete").await
    }

    /// Discard the current draft of the custom activity type.
    pub async fn discard_custom_activity_type_draft(
        &self,
        api_name: &str,
    ) -> Result<Vec<CustomActivityType>> {
        self.custom_activity_type_action(api_name, "discardDraft")
            .await
    }

    /// Retrieve metadata for one custom activity type, optionally its
    /// draft version.
    pub async fn describe_custom_activity_type(
        &self,
        api_name: &str,
        draft: bool,
    ) -> Result<Vec<CustomActivityType>> {
        let url = self
            .inner()
            .rest_url(&format!("activities/external/type/{api_name}/describe.json"));
        let request = self.inner().get(url).query("draft", draft);
        let envelope = self.inner().send(request).await?;
        envelope.results_as()
    }

    /// Add attributes to the custom activity type draft.
    pub async fn create_custom_activity_type_attributes(
        &self,
        api_name: &str,
        attributes: &[ActivityTypeAttribute],
    ) -> Result<Vec<CustomActivityType>> {
        self.custom_activity_type_attributes(api_name, "attributes/create", attributes)
            .await
    }

    /// Update attributes of the custom activity type draft, keyed by their
    /// API names.
    pub async fn update_custom_activity_type_attributes(
        &self,
        api_name: &str,
        attributes: &[ActivityTypeAttribute],
    ) -> Result<Vec<CustomActivityType>> {
        self.custom_activity_type_attributes(api_name, "attributes/update", attributes)
            .await
    }

    /// Delete attributes from the custom activity type draft, keyed by
    /// their API names.
    pub async fn delete_custom_activity_type_attributes(
        &self,
        api_name: &str,
        attributes: &[ActivityTypeAttribute],
    ) -> Result<Vec<CustomActivityType>> {
        self.custom_activity_type_attributes(api_name, "attributes/delete", attributes)
            .await
    }

    async fn custom_activity_type_action(
        &self,
        api_name: &str,
        action: &str,
    ) -> Result<Vec<CustomActivityType>> {
        let url = self
            .inner()
            .rest_url(&format!("activities/external/type/{api_name}/{action}.json"));
        let envelope = self.inner().send(self.inner().post(url)).await?;
        envelope.results_as()
    }

    async fn custom_activity_type_attributes(
        &self,
        api_name: &str,
        action: &str,
        attributes: &[ActivityTypeAttribute],
    ) -> Result<Vec<CustomActivityType>> {
        let url = self
            .inner()
            .rest_url(&format!("activities/external/type/{api_name}/{action}.json"));
        let request = self
            .inner()
            .post(url)
            .json(&json!({"attributes": attributes}))?;
        let envelope = self.inner().send(request).await?;
        envelope.results_as()
    }
}
