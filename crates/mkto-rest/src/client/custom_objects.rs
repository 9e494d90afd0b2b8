//! Custom object endpoints.
//!
//! Custom objects carry instance-defined schemas, so record reads are
//! generic over the caller's type; `serde_json::Value` works when no typed
//! view exists.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::instrument;

use mkto_client::Result;

use super::MarketoRestClient;
use crate::types::{Page, SyncAction, SyncedRecord};

/// Schema metadata for a custom object type.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectMetadata {
    #[serde(default)]
    pub api_name: Option<String>,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub plural_name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub id_field: Option<String>,
    #[serde(default)]
    pub dedupe_fields: Vec<String>,
    #[serde(default)]
    pub searchable_fields: Vec<serde_json::Value>,
    #[serde(default)]
    pub fields: Vec<serde_json::Value>,
    #[serde(default)]
    pub relationships: Vec<serde_json::Value>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

impl MarketoRestClient {
    /// List the custom object types provisioned in the instance, optionally
    /// narrowed to specific API names or an approval state.
    pub async fn list_custom_object_types(
        &self,
        names: &[&str],
        state: Option<&str>,
    ) -> Result<Vec<ObjectMetadata>> {
        let url = self.inner().rest_url("customobjects/schema.json");
        let request = self
            .inner()
            .get(url)
            .query_list("names", names)
            .query_opt("state", state);
        let envelope = self.inner().send(request).await?;
        envelope.results_as()
    }

    /// Retrieve the full schema of one custom object type.
    pub async fn describe_custom_object(&self, name: &str) -> Result<Option<ObjectMetadata>> {
        let url = self
            .inner()
            .rest_url(&format!("customobjects/{name}/describe.json"));
        let envelope = self.inner().send(self.inner().get(url)).await?;
        envelope.first_as()
    }

    /// Retrieve a page of custom object records matching a single-field
    /// filter. The filter type must be the id field, a dedupe field, or a
    /// searchable field of the type.
    pub async fn get_custom_objects<T: DeserializeOwned>(
        &self,
        name: &str,
        filter_type: &str,
        filter_values: &[&str],
        fields: &[&str],
        batch_size: Option<usize>,
        next_page_token: Option<&str>,
    ) -> Result<Page<T>> {
        self.check_batch_size(batch_size)?;

        let url = self.inner().rest_url(&format!("customobjects/{name}.json"));
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

    /// Retrieve custom object records by compound key. Each input entry
    /// supplies all the fields of the key, so the query rides in a POST body
    /// with the `_method=GET` override.
    pub async fn get_custom_objects_by_compound_key<T, K>(
        &self,
        name: &str,
        filter_type: &str,
        fields: &[&str],
        input: &[K],
        batch_size: Option<usize>,
        next_page_token: Option<&str>,
    ) -> Result<Page<T>>
    where
        T: DeserializeOwned,
        K: Serialize,
    {
        self.check_batch_size(batch_size)?;

        let mut body = json!({
            "filterType": filter_type,
            "input": input,
        });
        if !fields.is_empty() {
            body["fields"] = json!(fields);
        }
        if let Some(size) = batch_size {
            body["batchSize"] = json!(size);
        }
        if let Some(token) = next_page_token {
            body["nextPageToken"] = json!(token);
        }

        let url = self.inner().rest_url(&format!("customobjects/{name}.json"));
        let request = self
            .inner()
            .post(url)
            .query("_method", "GET")
            .json_value(body);

        let envelope = self.inner().send(request).await?;
        Page::from_envelope(envelope)
    }

    /// Insert or update custom object records. At most 300 per call;
    /// per-record outcomes ride in the returned list.
    #[instrument(skip(self, input), fields(object = name, records = input.len()))]
    pub async fn sync_custom_objects<T: Serialize>(
        &self,
        name: &str,
        action: SyncAction,
        dedupe_by: Option<&str>,
        input: &[T],
    ) -> Result<Vec<SyncedRecord>> {
        self.check_input_len("sync_custom_objects", input.len(), super::MAX_BATCH_SIZE)?;

        let mut body = json!({
            "action": action.as_str(),
            "input": input,
        });
        if let Some(dedupe_by) = dedupe_by {
            body["dedupeBy"] = json!(dedupe_by);
        }

        let url = self.inner().rest_url(&format!("customobjects/{name}.json"));
        let request = self.inner().post(url).json_value(body);
        let envelope = self.inner().send(request).await?;
        envelope.results_as()
    }

    /// Delete custom object records by id field or dedupe fields.
    #[instrument(skip(self, input), fields(object = name, records = input.len()))]
    pub async fn delete_custom_objects<T: Serialize>(
        &self,
        name: &str,
        delete_by: Option<&str>,
        input: &[T],
    ) -> Result<Vec<SyncedRecord>> {
        self.check_input_len("delete_custom_objects", input.len(), super::MAX_BATCH_SIZE)?;

        let mut body = json!({"input": input});
        if let Some(delete_by) = delete_by {
            body["deleteBy"] = json!(delete_by);
        }

        let url = self
            .inner()
            .rest_url(&format!("customobjects/{name}/delete.json"));
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
    async fn record_query_rides_in_the_query_string() {
        let server = MockServer::start().await;
        mount_identity(&server).await;
        Mock::given(method("GET"))
            .and(path("/rest/v1/customobjects/car_c.json"))
            .and(query_param("filterType", "vin"))
            .and(query_param("filterValues", "1HGCM,2HGCM"))
            .and(query_param("fields", "vin,make"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "requestId": "r",
                "success": true,
                "result": [{"vin": "1HGCM", "make": "Honda"}]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server).await;
        let page: Page<serde_json::Value> = client
            .get_custom_objects("car_c", "vin", &["1HGCM", "2HGCM"], &["vin", "make"], None, None)
            .await
            .unwrap();
        assert_eq!(page.items[0]["make"], "Honda");
    }

    #[tokio::test]
    async fn compound_key_query_posts_with_method_override() {
        let server = MockServer::start().await;
        mount_identity(&server).await;
        Mock::given(method("POST"))
            .and(path("/rest/v1/customobjects/roster_c.json"))
            .and(query_param("_method", "GET"))
            .and(body_json(json!({
                "filterType": "dedupeFields",
                "input": [{"teamId": 5, "memberId": 12}]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "requestId": "r",
                "success": true,
                "result": [{"teamId": 5, "memberId": 12, "role": "captain"}]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server).await;
        let input = vec![json!({"teamId": 5, "memberId": 12})];
        let page: Page<serde_json::Value> = client
            .get_custom_objects_by_compound_key("roster_c", "dedupeFields", &[], &input, None, None)
            .await
            .unwrap();
        assert_eq!(page.items[0]["role"], "captain");
    }

    #[tokio::test]
    async fn sync_includes_dedupe_by_when_given() {
        let server = MockServer::start().await;
        mount_identity(&server).await;
        Mock::given(method("POST"))
            .and(path("/rest/v1/customobjects/car_c.json"))
            .and(body_json(json!({
                "action": "updateOnly",
                "dedupeBy": "dedupeFields",
                "input": [{"vin": "1HGCM", "color": "red"}]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "requestId": "r",
                "success": true,
                "result": [{"seq": 0, "marketoGUID": "abc123", "status": "updated"}]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server).await;
        let input = vec![json!({"vin": "1HGCM", "color": "red"})];
        let records = client
            .sync_custom_objects("car_c", SyncAction::UpdateOnly, Some("dedupeFields"), &input)
            .await
            .unwrap();
        assert_eq!(records[0].marketo_guid.as_deref(), Some("abc123"));
    }

    #[tokio::test]
    async fn type_listing_passes_names_and_state() {
        let server = MockServer::start().await;
        mount_identity(&server).await;
        Mock::given(method("GET"))
            .and(path("/rest/v1/customobjects/schema.json"))
            .and(query_param("names", "car_c"))
            .and(query_param("state", "approvedWithDraft"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "requestId": "r",
                "success": true,
                "result": [{
                    "apiName": "car_c",
                    "idField": "marketoGUID",
                    "dedupeFields": ["vin"],
                    "state": "approved"
                }]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server).await;
        let types = client
            .list_custom_object_types(&["car_c"], Some("approvedWithDraft"))
            .await
            .unwrap();
        assert_eq!(types[0].dedupe_fields, vec!["vin"]);
    }
}
