//! Export job types.

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use mkto_client::{Error, ErrorKind, Result};

/// Lifecycle state of an export job.
///
/// Jobs move `Created` -> `Queued` -> `Processing` -> `Completed`, with
/// `Cancelled` and `Failed` as the other exits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ExportStatus {
    Created,
    Queued,
    Processing,
    Cancelled,
    Completed,
    Failed,
}

impl ExportStatus {
    /// The wire name of this status.
    pub fn as_str(&self) -> &'static str {
        match self {
            ExportStatus::Created => "created",
            ExportStatus::Queued => "queued",
            ExportStatus::Processing => "processing",
            ExportStatus::Cancelled => "cancelled",
            ExportStatus::Completed => "completed",
            ExportStatus::Failed => "failed",
        }
    }

    /// Returns true if the job will make no further progress.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            ExportStatus::Cancelled | ExportStatus::Completed | ExportStatus::Failed
        )
    }
}

impl std::fmt::Display for ExportStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Delimiter of the export file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum ExportFormat {
    #[default]
    #[serde(rename = "CSV")]
    Csv,
    #[serde(rename = "TSV")]
    Tsv,
    #[serde(rename = "SSV")]
    Ssv,
}

impl ExportFormat {
    /// Delimiter byte for the format, for feeding a CSV reader.
    pub fn delimiter(&self) -> u8 {
        match self {
            ExportFormat::Csv => b',',
            ExportFormat::Tsv => b'\t',
            ExportFormat::Ssv => b';',
        }
    }
}

/// A closed datetime range filter.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DateRange {
    pub start_at: DateTime<Utc>,
    pub end_at: DateTime<Utc>,
}

/// Record filter for an export job. Exactly one filter is required by the
/// service; `program_id` applies only to program member exports.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportFilter {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateRange>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateRange>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub static_list_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub static_list_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub smart_list_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub smart_list_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub program_id: Option<i64>,
}

/// Parameters for creating an export job.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateExportJobRequest {
    pub fields: Vec<String>,
    pub filter: ExportFilter,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<ExportFormat>,
    /// Rename file columns, keyed by field API name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub column_header_names: Option<serde_json::Map<String, serde_json::Value>>,
}

impl CreateExportJobRequest {
    pub fn new(fields: &[&str], filter: ExportFilter) -> Self {
        Self {
            fields: fields.iter().map(|f| f.to_string()).collect(),
            filter,
            format: None,
            column_header_names: None,
        }
    }
}

/// An export job as reported by the job status endpoints.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportJob {
    pub export_id: String,
    #[serde(default)]
    pub status: Option<ExportStatus>,
    #[serde(default)]
    pub format: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub queued_at: Option<String>,
    #[serde(default)]
    pub started_at: Option<String>,
    #[serde(default)]
    pub finished_at: Option<String>,
    #[serde(default)]
    pub number_of_records: Option<i64>,
    #[serde(default)]
    pub file_size: Option<i64>,
    #[serde(default)]
    pub file_checksum: Option<String>,
    #[serde(default)]
    pub error_msg: Option<String>,
}

impl ExportJob {
    /// Returns true if the job will make no further progress.
    pub fn is_terminal(&self) -> bool {
        self.status.map(|s| s.is_terminal()).unwrap_or(false)
    }
}

/// One page of an export job listing.
#[derive(Debug, Clone)]
pub struct ExportJobPage {
    pub jobs: Vec<ExportJob>,
    pub next_page_token: Option<String>,
    pub more_result: bool,
}

/// Parse a downloaded export file into typed rows. The first line is the
/// header; `delimiter` must match the format the job was created with.
pub fn parse_export_file<T: DeserializeOwned>(data: &[u8], delimiter: u8) -> Result<Vec<T>> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .from_reader(data);

    let mut rows = Vec::new();
    for row in reader.deserialize() {
        let row = row.map_err(|e| {
            Error::with_source(
                ErrorKind::MalformedResponse(format!("bad row in export file: {e}")),
                e,
            )
        })?;
        rows.push(row);
    }
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;
    use std::collections::HashMap;

    #[test]
    fn status_terminality() {
        assert!(!ExportStatus::Created.is_terminal());
        assert!(!ExportStatus::Queued.is_terminal());
        assert!(!ExportStatus::Processing.is_terminal());
        assert!(ExportStatus::Cancelled.is_terminal());
        assert!(ExportStatus::Completed.is_terminal());
        assert!(ExportStatus::Failed.is_terminal());
    }

    #[test]
    fn create_request_serializes_camel_case() {
        let start = Utc.with_ymd_and_hms(2026, 8, 1, 0, 0, 0).unwrap();
        let end = Utc.with_ymd_and_hms(2026, 8, 15, 0, 0, 0).unwrap();
        let request = CreateExportJobRequest {
            fields: vec!["email".to_string()],
            filter: ExportFilter {
                created_at: Some(DateRange {
                    start_at: start,
                    end_at: end,
                }),
                ..ExportFilter::default()
            },
            format: Some(ExportFormat::Csv),
            column_header_names: None,
        };

        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["format"], "CSV");
        assert_eq!(
            value["filter"]["createdAt"]["startAt"],
            json!("2026-08-01T00:00:00Z")
        );
        assert!(value["filter"].get("staticListId").is_none());
        assert!(value.get("columnHeaderNames").is_none());
    }

    #[test]
    fn export_file_parses_with_header_row() {
        let data = b"email,firstName\nkai@acme.test,Kai\nmei@acme.test,Mei\n";
        let rows: Vec<HashMap<String, String>> =
            parse_export_file(data, ExportFormat::Csv.delimiter()).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1]["email"], "mei@acme.test");
    }

    #[test]
    fn malformed_export_file_is_reported() {
        let data = b"email,firstName\n\"unterminated\n";
        let err = parse_export_file::<HashMap<String, String>>(data, b',').unwrap_err();
        assert!(matches!(err.kind(), ErrorKind::MalformedResponse(_)));
    }
}
