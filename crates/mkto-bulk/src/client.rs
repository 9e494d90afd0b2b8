//! Bulk extract client.

use std::time::Duration;

use bytes::Bytes;
use tokio::time::sleep;
use tracing::instrument;

use mkto_auth::Credentials;
use mkto_client::{ClientConfig, Error, ErrorKind, MarketoClient, Result};

use crate::types::{CreateExportJobRequest, ExportJob, ExportJobPage, ExportStatus};

/// Default polling interval for job status checks.
const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(30);

/// Default maximum time to wait for job completion. Export jobs routinely
/// sit in the queue for minutes, so the ceiling is generous.
const DEFAULT_MAX_WAIT: Duration = Duration::from_secs(3600);

/// Client for the bulk extract endpoints.
///
/// Export jobs run through an explicit lifecycle: create the job, enqueue
/// it, poll its status until `completed`, then download the file.
///
/// # Example
///
/// ```rust,ignore
/// use mkto_auth::Credentials;
/// use mkto_bulk::{BulkExportClient, CreateExportJobRequest, ExportFilter};
///
/// let client = BulkExportClient::new(Credentials::from_env()?)?;
///
/// let request = CreateExportJobRequest::new(
///     &["email", "firstName"],
///     ExportFilter { static_list_id: Some(1001), ..Default::default() },
/// );
/// let job = client.create_lead_export_job(&request).await?;
/// let job = client.enqueue_lead_export_job(&job.export_id).await?;
/// let job = client.wait_for_lead_export_job(&job.export_id).await?;
/// let file = client.get_lead_export_file(&job.export_id).await?;
/// ```
#[derive(Debug, Clone)]
pub struct BulkExportClient {
    client: MarketoClient,
    poll_interval: Duration,
    max_wait: Duration,
}

impl BulkExportClient {
    /// Create a bulk client with default HTTP configuration.
    pub fn new(credentials: Credentials) -> Result<Self> {
        let client = MarketoClient::new(credentials)?;
        Ok(Self::from_client(client))
    }

    /// Create a bulk client with custom HTTP configuration.
    pub fn with_config(credentials: Credentials, config: ClientConfig) -> Result<Self> {
        let client = MarketoClient::with_config(credentials, config)?;
        Ok(Self::from_client(client))
    }

    /// Create a bulk client from an existing MarketoClient.
    pub fn from_client(client: MarketoClient) -> Self {
        Self {
            client,
            poll_interval: DEFAULT_POLL_INTERVAL,
            max_wait: DEFAULT_MAX_WAIT,
        }
    }

    /// Get the underlying MarketoClient.
    pub fn inner(&self) -> &MarketoClient {
        &self.client
    }

    /// Set the polling interval for job status checks.
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Set the maximum time to wait for job completion.
    pub fn with_max_wait(mut self, max_wait: Duration) -> Self {
        self.max_wait = max_wait;
        self
    }

    /// List lead export jobs, optionally narrowed to specific statuses.
    pub async fn get_lead_export_jobs(
        &self,
        statuses: &[ExportStatus],
        batch_size: Option<usize>,
        next_page_token: Option<&str>,
    ) -> Result<ExportJobPage> {
        self.get_export_jobs("leads/export", statuses, batch_size, next_page_token)
            .await
    }

    /// Create a lead export job. The job stays in `created` until enqueued.
    #[instrument(skip(self, request))]
    pub async fn create_lead_export_job(
        &self,
        request: &CreateExportJobRequest,
    ) -> Result<ExportJob> {
        self.create_export_job("leads/export", request).await
    }

    /// Move a lead export job into the processing queue.
    pub async fn enqueue_lead_export_job(&self, export_id: &str) -> Result<ExportJob> {
        self.export_job_action("leads/export", export_id, "enqueue")
            .await
    }

    /// Cancel a lead export job.
    pub async fn cancel_lead_export_job(&self, export_id: &str) -> Result<ExportJob> {
        self.export_job_action("leads/export", export_id, "cancel")
            .await
    }

    /// Retrieve the current status of a lead export job.
    pub async fn get_lead_export_job_status(&self, export_id: &str) -> Result<ExportJob> {
        self.get_export_job_status("leads/export", export_id).await
    }

    /// Poll a lead export job until it reaches a terminal status.
    #[instrument(skip(self))]
    pub async fn wait_for_lead_export_job(&self, export_id: &str) -> Result<ExportJob> {
        self.wait_for_export_job("leads/export", export_id).await
    }

    /// Download the file of a completed lead export job.
    pub async fn get_lead_export_file(&self, export_id: &str) -> Result<Bytes> {
        self.get_export_file("leads/export", export_id).await
    }

    /// List program member export jobs, optionally narrowed to specific
    /// statuses.
    pub async fn get_program_member_export_jobs(
        &self,
        statuses: &[ExportStatus],
        batch_size: Option<usize>,
        next_page_token: Option<&str>,
    ) -> Result<ExportJobPage> {
        self.get_export_jobs(
            "program/members/export",
            statuses,
            batch_size,
            next_page_token,
        )
        .await
    }

    /// Create a program member export job. The filter must carry the
    /// program id.
    #[instrument(skip(self, request))]
    pub async fn create_program_member_export_job(
        &self,
        request: &CreateExportJobRequest,
    ) -> Result<ExportJob> {
        self.create_export_job("program/members/export", request)
            .await
    }

    /// Move a program member export job into the processing queue.
    pub async fn enqueue_program_member_export_job(&self, export_id: &str) -> Result<ExportJob> {
        self.export_job_action("program/members/export", export_id, "enqueue")
            .await
    }

    /// Cancel a program member export job.
    pub async fn cancel_program_member_export_job(&self, export_id: &str) -> Result<ExportJob> {
        self.export_job_action("program/members/export", export_id, "cancel")
            .await
    }

    /// Retrieve the current status of a program member export job.
    pub async fn get_program_member_export_job_status(
        &self,
        export_id: &str,
    ) -> Result<ExportJob> {
        self.get_export_job_status("program/members/export", export_id)
            .await
    }

    /// Poll a program member export job until it reaches a terminal status.
    #[instrument(skip(self))]
    pub async fn wait_for_program_member_export_job(&self, export_id: &str) -> Result<ExportJob> {
        self.wait_for_export_job("program/members/export", export_id)
            .await
    }

    /// Download the file of a completed program member export job.
    pub async fn get_program_member_export_file(&self, export_id: &str) -> Result<Bytes> {
        self.get_export_file("program/members/export", export_id)
            .await
    }

    async fn get_export_jobs(
        &self,
        prefix: &str,
        statuses: &[ExportStatus],
        batch_size: Option<usize>,
        next_page_token: Option<&str>,
    ) -> Result<ExportJobPage> {
        let url = self.client.bulk_url(&format!("{prefix}.json"));
        let request = self
            .client
            .get(url)
            .query_list("status", statuses)
            .query_opt("batchSize", batch_size)
            .query_opt("nextPageToken", next_page_token);
        let envelope = self.client.send(request).await?;
        let jobs = envelope.results_as()?;
        Ok(ExportJobPage {
            jobs,
            next_page_token: envelope.next_page_token,
            more_result: envelope.more_result,
        })
    }

    async fn create_export_job(
        &self,
        prefix: &str,
        request: &CreateExportJobRequest,
    ) -> Result<ExportJob> {
        let url = self.client.bulk_url(&format!("{prefix}/create.json"));
        let request = self.client.post(url).json(request)?;
        let envelope = self.client.send(request).await?;
        self.single_job(envelope)
    }

    async fn export_job_action(
        &self,
        prefix: &str,
        export_id: &str,
        action: &str,
    ) -> Result<ExportJob> {
        let url = self
            .client
            .bulk_url(&format!("{prefix}/{export_id}/{action}.json"));
        let envelope = self.client.send(self.client.post(url)).await?;
        self.single_job(envelope)
    }

    async fn get_export_job_status(&self, prefix: &str, export_id: &str) -> Result<ExportJob> {
        let url = self
            .client
            .bulk_url(&format!("{prefix}/{export_id}/status.json"));
        let envelope = self.client.send(self.client.get(url)).await?;
        self.single_job(envelope)
    }

    async fn wait_for_export_job(&self, prefix: &str, export_id: &str) -> Result<ExportJob> {
        let start = std::time::Instant::now();

        loop {
            let job = self.get_export_job_status(prefix, export_id).await?;

            if job.is_terminal() {
                return Ok(job);
            }

            if start.elapsed() > self.max_wait {
                return Err(Error::new(ErrorKind::Timeout));
            }

            sleep(self.poll_interval).await;
        }
    }

    async fn get_export_file(&self, prefix: &str, export_id: &str) -> Result<Bytes> {
        let url = self
            .client
            .bulk_url(&format!("{prefix}/{export_id}/file.json"));
        self.client.send_raw(self.client.get(url)).await
    }

    fn single_job(&self, envelope: mkto_client::ResponseEnvelope) -> Result<ExportJob> {
        envelope.first_as()?.ok_or_else(|| {
            Error::new(ErrorKind::MalformedResponse(
                "export job endpoint returned an empty result".to_string(),
            ))
        })
    }
}
