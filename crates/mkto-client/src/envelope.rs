//! The Marketo response envelope.
//!
//! Every JSON endpoint answers with the same wrapper: `requestId`, `success`,
//! an optional `result` array, pagination hints, and an `errors` list. The
//! HTTP status is not the outcome signal; `success` is. Decoding normalizes
//! the vendor's loose typing (`1`/`true` booleans, numeric or string error
//! codes) at this boundary so the rest of the workspace sees one shape.

use serde::{Deserialize, Deserializer};
use serde::de::DeserializeOwned;

use crate::error::{Error, ErrorKind, Result};

/// One `{code, message}` entry from an envelope's `errors` array.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ApiError {
    /// Vendor error code, normalized to a string ("601", "1006", ...).
    #[serde(deserialize_with = "code_as_string")]
    pub code: String,
    /// Human-readable message.
    #[serde(default)]
    pub message: String,
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}

/// The decoded response envelope.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseEnvelope {
    /// Request id for support correlation. Defaulted if absent.
    #[serde(default)]
    pub request_id: String,
    /// Whether the call succeeded. Required; `1`/`0`/`true`/`false` all
    /// accepted on the wire.
    #[serde(deserialize_with = "flexible_bool")]
    pub success: bool,
    /// Result records. An absent `result` decodes to an empty vector.
    #[serde(default)]
    pub result: Vec<serde_json::Value>,
    /// Token for the next page, when the endpoint paginates.
    #[serde(default)]
    pub next_page_token: Option<String>,
    /// Whether more records remain beyond this page.
    #[serde(default, deserialize_with = "flexible_bool")]
    pub more_result: bool,
    /// Vendor error entries; populated when `success` is false.
    #[serde(default)]
    pub errors: Vec<ApiError>,
}

impl ResponseEnvelope {
    /// Decode an envelope from a response body.
    ///
    /// Non-JSON bodies and bodies missing the `success` field are refused as
    /// malformed rather than guessed at.
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        serde_json::from_slice(bytes).map_err(|e| {
            Error::with_source(ErrorKind::MalformedResponse(e.to_string()), e)
        })
    }

    /// The result records. Never null: an absent `result` reads as empty.
    pub fn results(&self) -> &[serde_json::Value] {
        &self.result
    }

    /// Tolerant views over the result records.
    pub fn records(&self) -> Vec<Record<'_>> {
        self.result.iter().map(Record::new).collect()
    }

    /// Project the result records into a typed view.
    pub fn results_as<T: DeserializeOwned>(&self) -> Result<Vec<T>> {
        self.result
            .iter()
            .map(|value| {
                serde_json::from_value(value.clone()).map_err(|e| {
                    Error::with_source(ErrorKind::MalformedResponse(e.to_string()), e)
                })
            })
            .collect()
    }

    /// Project the first result record into a typed view, if any.
    pub fn first_as<T: DeserializeOwned>(&self) -> Result<Option<T>> {
        match self.result.first() {
            Some(value) => serde_json::from_value(value.clone())
                .map(Some)
                .map_err(|e| {
                    Error::with_source(ErrorKind::MalformedResponse(e.to_string()), e)
                }),
            None => Ok(None),
        }
    }

    /// Returns true if the error list contains the given code.
    pub fn has_error_code(&self, code: &str) -> bool {
        self.errors.iter().any(|e| e.code == code)
    }

    /// Enforce the outcome: `success: false` becomes an API error carrying
    /// the vendor's error list verbatim.
    pub fn into_result(self) -> Result<Self> {
        if self.success {
            Ok(self)
        } else {
            Err(Error::new(ErrorKind::Api {
                request_id: self.request_id,
                errors: self.errors,
            }))
        }
    }
}

/// Tolerant read-only view over one result record.
///
/// Absent or null fields read as `None`, never an error. This is the escape
/// hatch for custom fields the typed views don't declare.
#[derive(Debug, Clone, Copy)]
pub struct Record<'a> {
    value: &'a serde_json::Value,
}

impl<'a> Record<'a> {
    /// Wrap a raw result record.
    pub fn new(value: &'a serde_json::Value) -> Self {
        Self { value }
    }

    /// The underlying JSON value.
    pub fn as_value(&self) -> &'a serde_json::Value {
        self.value
    }

    /// Read a field by name.
    pub fn get(&self, name: &str) -> Option<&'a serde_json::Value> {
        self.value.get(name).filter(|v| !v.is_null())
    }

    /// Read a field as a string slice.
    pub fn get_str(&self, name: &str) -> Option<&'a str> {
        self.get(name).and_then(|v| v.as_str())
    }

    /// Read a field as an integer.
    pub fn get_i64(&self, name: &str) -> Option<i64> {
        self.get(name).and_then(|v| v.as_i64())
    }

    /// Read a field as a boolean.
    pub fn get_bool(&self, name: &str) -> Option<bool> {
        self.get(name).and_then(|v| v.as_bool())
    }
}

/// The vendor renders booleans as `true`/`false`, `1`/`0`, or the same in
/// strings, depending on the endpoint.
fn flexible_bool<'de, D>(deserializer: D) -> std::result::Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Flexible {
        Bool(bool),
        Number(i64),
        Text(String),
    }

    match Flexible::deserialize(deserializer)? {
        Flexible::Bool(b) => Ok(b),
        Flexible::Number(n) => Ok(n != 0),
        Flexible::Text(s) => match s.as_str() {
            "true" | "1" => Ok(true),
            "false" | "0" => Ok(false),
            other => Err(serde::de::Error::custom(format!(
                "invalid boolean value: {other:?}"
            ))),
        },
    }
}

fn code_as_string<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Code {
        Number(i64),
        Text(String),
    }

    Ok(match Code::deserialize(deserializer)? {
        Code::Number(n) => n.to_string(),
        Code::Text(s) => s,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn decode(value: serde_json::Value) -> Result<ResponseEnvelope> {
        ResponseEnvelope::decode(&serde_json::to_vec(&value).unwrap())
    }

    #[test]
    fn decodes_successful_list_response() {
        let env = decode(json!({
            "requestId": "e42b#14272d07d78",
            "success": true,
            "result": [{"id": 318581, "email": "a@example.com"}],
            "nextPageToken": "WQV2VQVPPCKHC6AQYVK7JDSA3J3LCWXH",
            "moreResult": true
        }))
        .unwrap();

        assert_eq!(env.request_id, "e42b#14272d07d78");
        assert!(env.success);
        assert_eq!(env.results().len(), 1);
        assert_eq!(
            env.next_page_token.as_deref(),
            Some("WQV2VQVPPCKHC6AQYVK7JDSA3J3LCWXH")
        );
        assert!(env.more_result);
    }

    #[test]
    fn success_false_becomes_api_error_with_vendor_errors() {
        let env = decode(json!({
            "requestId": "req-9",
            "success": false,
            "errors": [{"code": "1006", "message": "Field 'foo' not found"}]
        }))
        .unwrap();

        let err = env.into_result().unwrap_err();
        assert!(err.is_api());
        assert!(err.has_error_code("1006"));
        assert_eq!(err.api_errors()[0].message, "Field 'foo' not found");
    }

    #[test]
    fn absent_result_decodes_to_empty_never_null() {
        let env = decode(json!({"requestId": "r", "success": true})).unwrap();
        assert!(env.results().is_empty());
        assert!(!env.more_result);
        assert!(env.next_page_token.is_none());
    }

    #[test]
    fn numeric_and_string_success_forms_decode_identically() {
        for success in [json!(1), json!(true), json!("1"), json!("true")] {
            let env = decode(json!({"success": success})).unwrap();
            assert!(env.success, "expected {success} to read as true");
        }
        for success in [json!(0), json!(false), json!("0"), json!("false")] {
            let env = decode(json!({"success": success})).unwrap();
            assert!(!env.success, "expected {success} to read as false");
        }
    }

    #[test]
    fn missing_success_is_malformed() {
        let err = decode(json!({"requestId": "r", "result": []})).unwrap_err();
        assert!(matches!(err.kind, ErrorKind::MalformedResponse(_)));
    }

    #[test]
    fn non_json_body_is_malformed() {
        let err = ResponseEnvelope::decode(b"<html>502</html>").unwrap_err();
        assert!(matches!(err.kind, ErrorKind::MalformedResponse(_)));
    }

    #[test]
    fn numeric_error_codes_normalize_to_strings() {
        let env = decode(json!({
            "success": false,
            "errors": [{"code": 601, "message": "Access token invalid"}]
        }))
        .unwrap();
        assert!(env.has_error_code("601"));
    }

    #[test]
    fn record_reads_are_tolerant() {
        let env = decode(json!({
            "success": true,
            "result": [{"id": 42, "email": "a@example.com", "custom": null}]
        }))
        .unwrap();

        let records = env.records();
        let record = &records[0];
        assert_eq!(record.get_i64("id"), Some(42));
        assert_eq!(record.get_str("email"), Some("a@example.com"));
        assert_eq!(record.get("custom"), None);
        assert_eq!(record.get_str("neverDeclared"), None);
        assert_eq!(record.get_bool("alsoAbsent"), None);
    }

    #[test]
    fn results_as_projects_typed_views() {
        #[derive(Debug, Deserialize)]
        struct Row {
            id: i64,
        }

        let env = decode(json!({
            "success": true,
            "result": [{"id": 1}, {"id": 2}]
        }))
        .unwrap();

        let rows: Vec<Row> = env.results_as().unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1].id, 2);

        let first: Option<Row> = env.first_as().unwrap();
        assert_eq!(first.map(|r| r.id), Some(1));
    }
}
