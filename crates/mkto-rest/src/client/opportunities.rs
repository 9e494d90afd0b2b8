//! Opportunity and opportunity role endpoints.
//!
//! Both resources share the custom-object record model: instance-defined
//! schemas, GUID-keyed records, dedupe-field lookups.

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::json;
use tracing::instrument;

use mkto_client::Result;

use super::{custom_objects::ObjectMetadata, MarketoRestClient};
use crate::types::{Page, SyncAction, SyncedRecord};

impl MarketoRestClient {
    /// Retrieve the opportunity schema.
    pub async fn describe_opportunities(&self) -> Result<Option<ObjectMetadata>> {
        let url = self.inner().rest_url("opportunities/describe.json");
        let envelope = self.inner().send(self.inner().get(url)).await?;
        envelope.first_as()
    }

    /// Retrieve a page of opportunity field definitions.
    pub async fn get_opportunity_fields(
        &self,
        batch_size: Option<usize>,
        next_page_token: Option<&str>,
    ) -> Result<Page<serde_json::Value>> {
        self.check_batch_size(batch_size)?;

        let url = self.inner().rest_url("opportunities/schema/fields.json");
        let request = self
            .inner()
            .get(url)
            .query_opt("batchSize", batch_size)
            .query_opt("nextPageToken", next_page_token);
        let envelope = self.inner().send(request).await?;
        Page::from_envelope(envelope)
    }

    /// Retrieve one opportunity field definition by API name.
    pub async fn get_opportunity_field_by_name(
        &self,
        field_name: &str,
    ) -> Result<Option<serde_json::Value>> {
        let url = self
            .inner()
            .rest_url(&format!("opportunities/schema/fields/{field_name}.json"));
        let envelope = self.inner().send(self.inner().get(url)).await?;
        envelope.first_as()
    }

    /// Retrieve a page of opportunities matching a single-field filter.
    pub async fn get_opportunities<T: DeserializeOwned>(
        &self,
        filter_type: &str,
        filter_values: &[&str],
        fields: &[&str],
        batch_size: Option<usize>,
        next_page_token: Option<&str>,
    ) -> Result<Page<T>> {
        self.get_opportunity_resource("opportunities.json", filter_type, filter_values, fields, batch_size, next_page_token)
            .await
    }

    /// Insert or update opportunities.
    #[instrument(skip(self, input), fields(records = input.len()))]
    pub async fn sync_opportunities<T: Serialize>(
        &self,
        action: SyncAction,
        dedupe_by: Option<&str>,
        input: &[T],
    ) -> Result<Vec<SyncedRecord>> {
        self.sync_opportunity_resource("opportunities.json", action, dedupe_by, input)
            .await
    }

    /// Delete opportunities by id field or dedupe fields.
    pub async fn delete_opportunities<T: Serialize>(
        &self,
        delete_by: Option<&str>,
        input: &[T],
    ) -> Result<Vec<SyncedRecord>> {
        self.delete_opportunity_resource("opportunities/delete.json", delete_by, input)
            .await
    }

    /// Retrieve the opportunity role schema.
    pub async fn describe_opportunity_roles(&self) -> Result<Option<ObjectMetadata>> {
        let url = self.inner().rest_url("opportunities/roles/describe.json");
        let envelope = self.inner().send(self.inner().get(url)).await?;
        envelope.first_as()
    }

    /// Retrieve a page of opportunity roles matching a single-field filter.
    /// Roles join an opportunity to a lead, so the compound dedupe key is
    /// `externalOpportunityId` + `leadId` + `role`.
    pub async fn get_opportunity_roles<T: DeserializeOwned>(
        &self,
        filter_type: &str,
        filter_values: &[&str],
        fields: &[&str],
        batch_size: Option<usize>,
        next_page_token: Option<&str>,
    ) -> Result<Page<T>> {
        self.get_opportunity_resource("opportunities/roles.json", filter_type, filter_values, fields, batch_size, next_page_token)
            .await
    }

    /// Insert or update opportunity roles.
    #[instrument(skip(self, input), fields(records = input.len()))]
    pub async fn sync_opportunity_roles<T: Serialize>(
        &self,
        action: SyncAction,
        dedupe_by: Option<&str>,
        input: &[T],
    ) -> Result<Vec<SyncedRecord>> {
        self.sync_opportunity_resource("opportunities/roles.json", action, dedupe_by, input)
            .await
    }

    /// Delete opportunity roles.
    pub async fn delete_opportunity_roles<T: Serialize>(
        &self,
        delete_by: Option<&str>,
        input: &[T],
    ) -> Result<Vec<SyncedRecord>> {
        self.delete_opportunity_resource("opportunities/roles/delete.json", delete_by, input)
            .await
    }

    async fn get_opportunity_resource<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        filter_type: &str,
        filter_values: &[&str],
        fields: &[&str],
        batch_size: Option<usize>,
        next_page_token: Option<&str>,
    ) -> Result<Page<T>> {
        self.check_batch_size(batch_size)?;

        let url = self.inner().rest_url(endpoint);
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

    async fn sync_opportunity_resource<T: Serialize>(
        &self,
        endpoint: &str,
        action: SyncAction,
        dedupe_by: Option<&str>,
        input: &[T],
    ) -> Result<Vec<SyncedRecord>> {
        self.check_input_len(endpoint, input.len(), super::MAX_BATCH_SIZE)?;

        let mut body = json!({
            "action": action.as_str(),
            "input": input,
        });
        if let Some(dedupe_by) = dedupe_by {
            body["dedupeBy"] = json!(dedupe_by);
        }

        let url = self.inner().rest_url(endpoint);
        let request = self.inner().post(url).json_value(body);
        let envelope = self.inner().send(request).await?;
        envelope.results_as()
    }

    async fn delete_opportunity_resource<T: Serialize>(
        &self,
        endpoint: &str,
        delete_by: Option<&str>,
        input: &[T],
    ) -> Result<Vec<SyncedRecord>> {
        self.check_input_len(endpoint, input.len(), super::MAX_BATCH_SIZE)?;

        let mut body = json!({"input": input});
        if let Some(delete_by) = delete_by {
            body["deleteBy"] = json!(delete_by);
        }

        let url = self.inner().rest_url(endpoint);
        let request = self.inner().post(url).json_value(body);
        let envelope = self.inner().send(request).await?;
        envelope.results_as()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mkto_auth::Credentials;
    use wiremock::matchers::{body_json, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn client_for(server: &MockServer) -> MarketoRestClient {
        let creds = Credentials::new("id", "secret", "000-AAA-000")
            .unwrap()
            .with_base_url(server.uri());
        MarketoRestClient::new(creds).unwrap()
    }

    async fn mount_identity(server: &MockServer) {
        Mock::given(method("POST"))
            .and(path("/identity/oauth/token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "access_token": "tok",
                "token_type": "bearer",
                "expires_in": 3599
            })))
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn opportunity_query_rides_in_the_query_string() {
        let server = MockServer::start().await;
        mount_identity(&server).await;
        Mock::given(method("GET"))
            .and(path("/rest/v1/opportunities.json"))
            .and(query_param("filterType", "externalOpportunityId"))
            .and(query_param("filterValues", "19UYA31581L000000"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "requestId": "r",
                "success": true,
                "result": [{
                    "marketoGUID": "dff23271",
                    "externalOpportunityId": "19UYA31581L000000",
                    "amount": 5000.0
                }]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server).await;
        let page: Page<serde_json::Value> = client
            .get_opportunities(
                "externalOpportunityId",
                &["19UYA31581L000000"],
                &[],
                None,
                None,
            )
            .await
            .unwrap();
        assert_eq!(page.items[0]["amount"], 5000.0);
    }

    #[tokio::test]
    async fn role_sync_posts_action_and_input() {
        let server = MockServer::start().await;
        mount_identity(&server).await;
        Mock::given(method("POST"))
            .and(path("/rest/v1/opportunities/roles.json"))
            .and(body_json(json!({
                "action": "createOrUpdate",
                "dedupeBy": "dedupeFields",
                "input": [{
                    "externalOpportunityId": "19UYA31581L000000",
                    "leadId": 45,
                    "role": "Technical Buyer"
                }]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "requestId": "r",
                "success": true,
                "result": [{"seq": 0, "marketoGUID": "cff23271", "status": "created"}]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server).await;
        let input = vec![json!({
            "externalOpportunityId": "19UYA31581L000000",
            "leadId": 45,
            "role": "Technical Buyer"
        })];
        let records = client
            .sync_opportunity_roles(SyncAction::CreateOrUpdate, Some("dedupeFields"), &input)
            .await
            .unwrap();
        assert_eq!(records[0].status.as_deref(), Some("created"));
    }

    #[tokio::test]
    async fn field_listing_caps_batch_size_locally() {
        let server = MockServer::start().await;
        let client = client_for(&server).await;
        let err = client
            .get_opportunity_fields(Some(301), None)
            .await
            .unwrap_err();
        assert!(err.is_invalid_request());
        assert_eq!(server.received_requests().await.unwrap().len(), 0);
    }
}
