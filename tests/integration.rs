//! End-to-end tests against a mock Marketo instance.
//!
//! Run with:
//!   cargo test --test integration

use std::collections::HashMap;
use std::time::Duration;

use serde_json::json;
use wiremock::matchers::{body_string_contains, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use mkto_api::auth::Credentials;
use mkto_api::bulk::{
    parse_export_file, BulkExportClient, CreateExportJobRequest, ExportFilter, ExportFormat,
    ExportStatus,
};
use mkto_api::rest::MarketoRestClient;
use mkto_api::MarketoClient;

fn credentials_for(server: &MockServer) -> Credentials {
    Credentials::new("client-id", "client-secret", "000-AAA-000")
        .unwrap()
        .with_base_url(server.uri())
}

async fn mount_identity(server: &MockServer, expected_grants: u64) {
    Mock::given(method("POST"))
        .and(path("/identity/oauth/token"))
        .and(body_string_contains("grant_type=client_credentials"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "e3d4f9a1-token",
            "token_type": "bearer",
            "expires_in": 3599,
            "scope": "api@acme.test"
        })))
        .expect(expected_grants)
        .mount(server)
        .await;
}

#[tokio::test]
async fn one_identity_grant_serves_rest_and_bulk_clients() {
    let server = MockServer::start().await;
    mount_identity(&server, 1).await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/lead/318581.json"))
        .and(query_param("access_token", "e3d4f9a1-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "requestId": "ra",
            "success": true,
            "result": [{"id": 318581, "email": "kai@acme.test"}]
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/bulk/v1/leads/export.json"))
        .and(query_param("access_token", "e3d4f9a1-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "requestId": "rb",
            "success": true,
            "result": []
        })))
        .expect(1)
        .mount(&server)
        .await;

    // Both clients share one MarketoClient, so the token is fetched once.
    let core = MarketoClient::new(credentials_for(&server)).unwrap();
    let rest = MarketoRestClient::from_client(core.clone());
    let bulk = BulkExportClient::from_client(core);

    let lead = rest.get_lead_by_id(318581, &[]).await.unwrap().unwrap();
    assert_eq!(lead.email.as_deref(), Some("kai@acme.test"));

    let page = bulk.get_lead_export_jobs(&[], None, None).await.unwrap();
    assert!(page.jobs.is_empty());
}

#[tokio::test]
async fn identity_rejection_short_circuits_resource_calls() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/identity/oauth/token"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "error": "invalid_client",
            "error_description": "Bad client credentials"
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/rest/v1/lead/1.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "requestId": "r",
            "success": true,
            "result": []
        })))
        .expect(0)
        .mount(&server)
        .await;

    let rest = MarketoRestClient::new(credentials_for(&server)).unwrap();
    let err = rest.get_lead_by_id(1, &[]).await.unwrap_err();
    assert!(err.is_api());
}

#[tokio::test]
async fn pagination_walks_all_pages_and_stops() {
    let server = MockServer::start().await;
    mount_identity(&server, 1).await;

    let first: Vec<_> = (0..300).map(|i| json!({"id": i, "displayName": format!("f{i}")})).collect();
    let second: Vec<_> = (300..310).map(|i| json!({"id": i, "displayName": format!("f{i}")})).collect();

    Mock::given(method("GET"))
        .and(path("/rest/v1/leads/schema/fields.json"))
        .and(query_param("nextPageToken", "abc"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "requestId": "r2",
            "success": true,
            "result": second,
            "moreResult": false
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/rest/v1/leads/schema/fields.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "requestId": "r1",
            "success": true,
            "result": first,
            "nextPageToken": "abc",
            "moreResult": true
        })))
        .expect(1)
        .mount(&server)
        .await;

    let rest = MarketoRestClient::new(credentials_for(&server)).unwrap();

    let mut fields = Vec::new();
    let mut page = rest.get_lead_fields(None, None).await.unwrap();
    fields.extend(page.items);
    while page.more_result {
        page = rest
            .get_lead_fields(None, page.next_page_token.as_deref())
            .await
            .unwrap();
        fields.extend(page.items);
    }

    assert_eq!(fields.len(), 310);
    assert_eq!(fields[309].display_name.as_deref(), Some("f309"));
}

#[tokio::test]
async fn export_job_lifecycle_runs_to_file_download() {
    let server = MockServer::start().await;
    mount_identity(&server, 1).await;

    let export_id = "ce45a7a1-f19d-4ce2-882c-a3c795940a7d";
    let job = |status: &str| {
        json!({
            "requestId": "r",
            "success": true,
            "result": [{"exportId": export_id, "status": status, "format": "CSV"}]
        })
    };

    Mock::given(method("POST"))
        .and(path("/bulk/v1/leads/export/create.json"))
        .and(body_string_contains("smartListName"))
        .respond_with(ResponseTemplate::new(200).set_body_json(job("created")))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(format!("/bulk/v1/leads/export/{export_id}/enqueue.json")))
        .respond_with(ResponseTemplate::new(200).set_body_json(job("queued")))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(format!("/bulk/v1/leads/export/{export_id}/status.json")))
        .respond_with(ResponseTemplate::new(200).set_body_json(job("processing")))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(format!("/bulk/v1/leads/export/{export_id}/status.json")))
        .respond_with(ResponseTemplate::new(200).set_body_json(job("completed")))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(format!("/bulk/v1/leads/export/{export_id}/file.json")))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string("email,firstName\nkai@acme.test,Kai\nmei@acme.test,Mei\n")
                .insert_header("content-type", "text/csv"),
        )
        .expect(1)
        .mount(&server)
        .await;

    let bulk = BulkExportClient::new(credentials_for(&server))
        .unwrap()
        .with_poll_interval(Duration::from_millis(5));

    let request = CreateExportJobRequest::new(
        &["email", "firstName"],
        ExportFilter {
            smart_list_name: Some("Hot Leads".to_string()),
            ..Default::default()
        },
    );
    let created = bulk.create_lead_export_job(&request).await.unwrap();
    assert_eq!(created.status, Some(ExportStatus::Created));

    let queued = bulk.enqueue_lead_export_job(&created.export_id).await.unwrap();
    assert_eq!(queued.status, Some(ExportStatus::Queued));

    let done = bulk.wait_for_lead_export_job(&created.export_id).await.unwrap();
    assert_eq!(done.status, Some(ExportStatus::Completed));

    let file = bulk.get_lead_export_file(&created.export_id).await.unwrap();
    let rows: Vec<HashMap<String, String>> =
        parse_export_file(&file, ExportFormat::Csv.delimiter()).unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0]["firstName"], "Kai");
}
