//! Salesperson endpoints. Salespersons are keyed by `externalSalesPersonId`
//! and linked to leads through the lead's owner fields.

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::json;
use tracing::instrument;

use mkto_client::Result;

use super::{custom_objects::ObjectMetadata, MarketoRestClient};
use crate::types::{Page, SyncAction, SyncedRecord};

impl MarketoRestClient {
    /// Retrieve the salesperson schema.
    pub async fn describe_salespersons(&self) -> Result<Option<ObjectMetadata>> {
        let url = self.inner().rest_url("salespersons/describe.json");
        let envelope = self.inner().send(self.inner().get(url)).await?;
        envelope.first_as()
    }

    /// Retrieve a page of salespersons matching a single-field filter.
    pub async fn get_salespersons<T: DeserializeOwned>(
        &self,
        filter_type: &str,
        filter_values: &[&str],
        fields: &[&str],
        batch_size: Option<usize>,
        next_page_token: Option<&str>,
    ) -> Result<Page<T>> {
        self.check_batch_size(batch_size)?;

        let url = self.inner().rest_url("salespersons.json");
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

    /// Insert or update salespersons. Each input record must carry
    /// `externalSalesPersonId`.
    #[instrument(skip(self, input), fields(records = input.len()))]
    pub async fn sync_salespersons<T: Serialize>(
        &self,
        action: SyncAction,
        dedupe_by: Option<&str>,
        input: &[T],
    ) -> Result<Vec<SyncedRecord>> {
        self.check_input_len("sync_salespersons", input.len(), super::MAX_BATCH_SIZE)?;

        let mut body = json!({
            "action": action.as_str(),
            "input": input,
        });
        if let Some(dedupe_by) = dedupe_by {
            body["dedupeBy"] = json!(dedupe_by);
        }

        let url = self.inner().rest_url("salespersons.json");
        let request = self.inner().post(url).json_value(body);
        let envelope = self.inner().send(request).await?;
        envelope.results_as()
    }

    /// Delete salespersons by id field or dedupe fields.
    pub async fn delete_salespersons<T: Serialize>(
        &self,
        delete_by: Option<&str>,
        input: &[T],
    ) -> Result<Vec<SyncedRecord>> {
        self.check_input_len("delete_salespersons", input.len(), super::MAX_BATCH_SIZE)?;

        let mut body = json!({"input": input});
        if let Some(delete_by) = delete_by {
            body["deleteBy"] = json!(delete_by);
        }

        let url = self.inner().rest_url("salespersons/delete.json");
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
    async fn listing_filters_by_external_id() {
        let server = MockServer::start().await;
        mount_identity(&server).await;
        Mock::given(method("GET"))
            .and(path("/rest/v1/salespersons.json"))
            .and(query_param("filterType", "externalSalesPersonId"))
            .and(query_param("filterValues", "sam@acme.test"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "requestId": "r",
                "success": true,
                "result": [{
                    "id": 11,
                    "externalSalesPersonId": "sam@acme.test",
                    "email": "sam@acme.test"
                }]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server).await;
        let page: Page<serde_json::Value> = client
            .get_salespersons("externalSalesPersonId", &["sam@acme.test"], &[], None, None)
            .await
            .unwrap();
        assert_eq!(page.items[0]["id"], 11);
    }

    #[tokio::test]
    async fn delete_posts_delete_by_and_input() {
        let server = MockServer::start().await;
        mount_identity(&server).await;
        Mock::given(method("POST"))
            .and(path("/rest/v1/salespersons/delete.json"))
            .and(body_json(json!({
                "deleteBy": "dedupeFields",
                "input": [{"externalSalesPersonId": "sam@acme.test"}]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "requestId": "r",
                "success": true,
                "result": [{"seq": 0, "status": "deleted"}]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server).await;
        let input = vec![json!({"externalSalesPersonId": "sam@acme.test"})];
        let records = client
            .delete_salespersons(Some("dedupeFields"), &input)
            .await
            .unwrap();
        assert_eq!(records[0].status.as_deref(), Some("deleted"));
    }
}
