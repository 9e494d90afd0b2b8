//! Smart campaign endpoints.

use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::instrument;

use mkto_client::Result;

use super::{MarketoRestClient, MAX_TRIGGER_LEADS};
use crate::types::Page;

/// A smart campaign record.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Campaign {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default, rename = "type")]
    pub campaign_type: Option<String>,
    #[serde(default)]
    pub active: Option<bool>,
    #[serde(default)]
    pub program_id: Option<i64>,
    #[serde(default)]
    pub program_name: Option<String>,
    #[serde(default)]
    pub workspace_name: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

/// Filter for listing campaigns. Each list narrows the result set; empty
/// lists are omitted from the request.
#[derive(Debug, Clone, Default)]
pub struct CampaignFilter {
    pub ids: Vec<i64>,
    pub names: Vec<String>,
    pub program_names: Vec<String>,
    pub workspace_names: Vec<String>,
    pub is_triggerable: Option<bool>,
}

/// A "my token" override applied to a campaign run.
#[derive(Debug, Clone, Serialize)]
pub struct TokenOverride {
    pub name: String,
    pub value: String,
}

impl TokenOverride {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// Parameters for scheduling a batch campaign run.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleCampaignRequest {
    /// When to run, ISO-8601. Omitted means "now".
    #[serde(skip_serializing_if = "Option::is_none")]
    pub run_at: Option<String>,
    /// Clone the parent program under this name before the run. Calls using
    /// this are limited by the vendor to 20 per day.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub clone_to_program_name: Option<String>,
    /// My-token overrides local to the campaign's parent program.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tokens: Vec<TokenOverride>,
}

/// Parameters for passing leads to a trigger campaign.
#[derive(Debug, Clone, Default)]
pub struct TriggerCampaignRequest {
    /// Leads to run through the campaign flow. At most 100 per call.
    pub lead_ids: Vec<i64>,
    /// My-token overrides local to the campaign's parent program.
    pub tokens: Vec<TokenOverride>,
}

impl MarketoRestClient {
    /// Retrieve a page of campaign records matching the filter.
    pub async fn get_campaigns(
        &self,
        filter: &CampaignFilter,
        batch_size: Option<usize>,
        next_page_token: Option<&str>,
    ) -> Result<Page<Campaign>> {
        self.check_batch_size(batch_size)?;

        let url = self.inner().rest_url("campaigns.json");
        let mut request = self
            .inner()
            .get(url)
            .query_list("id", &filter.ids)
            .query_list("name", &filter.names)
            .query_list("programName", &filter.program_names)
            .query_list("workspaceName", &filter.workspace_names)
            .query_opt("batchSize", batch_size)
            .query_opt("nextPageToken", next_page_token);
        if let Some(triggerable) = filter.is_triggerable {
            request = request.query("isTriggerable", triggerable);
        }

        let envelope = self.inner().send(request).await?;
        Page::from_envelope(envelope)
    }

    /// Retrieve a single campaign by id.
    pub async fn get_campaign_by_id(&self, campaign_id: i64) -> Result<Option<Campaign>> {
        let url = self
            .inner()
            .rest_url(&format!("campaigns/{campaign_id}.json"));
        let envelope = self.inner().send(self.inner().get(url)).await?;
        envelope.first_as()
    }

    /// Schedule a batch campaign to run, optionally at a future time and
    /// with my-token overrides.
    #[instrument(skip(self, schedule))]
    pub async fn schedule_campaign(
        &self,
        campaign_id: i64,
        schedule: &ScheduleCampaignRequest,
    ) -> Result<Vec<Campaign>> {
        let url = self
            .inner()
            .rest_url(&format!("campaigns/{campaign_id}/schedule.json"));
        let request = self
            .inner()
            .post(url)
            .json(&json!({"input": schedule}))?;
        let envelope = self.inner().send(request).await?;
        envelope.results_as()
    }

    /// Pass leads to a trigger campaign. The campaign must be active and
    /// have a "Campaign is Requested: Web Service API" trigger; at most 100
    /// leads are accepted per call.
    #[instrument(skip(self, trigger), fields(leads = trigger.lead_ids.len()))]
    pub async fn request_campaign(
        &self,
        campaign_id: i64,
        trigger: &TriggerCampaignRequest,
    ) -> Result<Vec<Campaign>> {
        self.check_input_len(
            "request_campaign",
            trigger.lead_ids.len(),
            MAX_TRIGGER_LEADS,
        )?;

        let leads: Vec<_> = trigger.lead_ids.iter().map(|id| json!({"id": id})).collect();
        let mut input = json!({"leads": leads});
        if !trigger.tokens.is_empty() {
            input["tokens"] = json!(trigger.tokens);
        }

        let url = self
            .inner()
            .rest_url(&format!("campaigns/{campaign_id}/trigger.json"));
        let request = self.inner().post(url).json_value(json!({"input": input}));
        let envelope = self.inner().send(request).await?;
        envelope.results_as()
    }
}
