//! API usage and error statistics.

use serde::Deserialize;

use mkto_client::Result;

use super::MarketoRestClient;

/// Daily API call counts, broken down per user in `users`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageStat {
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub total: Option<i64>,
    #[serde(default)]
    pub users: Vec<serde_json::Value>,
}

/// Daily API error counts, broken down per error code in `errors`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorStat {
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub total: Option<i64>,
    #[serde(default)]
    pub errors: Vec<serde_json::Value>,
}

impl MarketoRestClient {
    /// API call counts for the current day.
    pub async fn get_daily_usage(&self) -> Result<Vec<UsageStat>> {
        let url = self.inner().rest_url("stats/usage.json");
        let envelope = self.inner().send(self.inner().get(url)).await?;
        envelope.results_as()
    }

    /// API call counts for each of the trailing seven days.
    pub async fn get_weekly_usage(&self) -> Result<Vec<UsageStat>> {
        let url = self.inner().rest_url("stats/usage/last7days.json");
        let envelope = self.inner().send(self.inner().get(url)).await?;
        envelope.results_as()
    }

    /// API error counts for the current day.
    pub async fn get_daily_errors(&self) -> Result<Vec<ErrorStat>> {
        let url = self.inner().rest_url("stats/errors.json");
        let envelope = self.inner().send(self.inner().get(url)).await?;
        envelope.results_as()
    }

    /// API error counts for each of the trailing seven days.
    pub async fn get_weekly_errors(&self) -> Result<Vec<ErrorStat>> {
        let url = self.inner().rest_url("stats/errors/last7days.json");
        let envelope = self.inner().send(self.inner().get(url)).await?;
        envelope.results_as()
    }
}
