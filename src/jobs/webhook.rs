//! Best-effort webhook delivery
//!
//! Delivery is a single POST of the final job snapshot. Failures are
//! logged and never affect the job itself; there are no retries.

use crate::jobs::JobRunner;
use crate::model::{JobSnapshot, JobStatus, WebhookConfig};
use serde::Serialize;
use std::collections::HashMap;
use std::time::Duration;

/// Deadline for the webhook POST
const WEBHOOK_TIMEOUT: Duration = Duration::from_secs(15);

/// Payload POSTed to a webhook when a job reaches a terminal state
#[derive(Debug, Serialize)]
struct WebhookPayload<'a> {
    success: bool,
    #[serde(rename = "type")]
    event: String,
    id: &'a str,
    data: JobSnapshot,
    #[serde(skip_serializing_if = "HashMap::is_empty")]
    metadata: HashMap<String, serde_json::Value>,
}

impl JobRunner {
    /// Sends the final snapshot of a batch job to its webhook
    pub(crate) async fn deliver_batch_webhook(&self, job_id: &str, webhook: &WebhookConfig) {
        if webhook.url.is_empty() {
            return;
        }

        let job = match self.store.get_batch_job(job_id).await {
            Ok(job) => job,
            Err(e) => {
                tracing::warn!("Webhook for job {} skipped, job unreadable: {}", job_id, e);
                return;
            }
        };

        let event = match job.status {
            JobStatus::Failed => "batch_scrape.failed".to_string(),
            _ => "batch_scrape.completed".to_string(),
        };
        let payload = WebhookPayload {
            success: job.status != JobStatus::Failed,
            event,
            id: job_id,
            data: JobSnapshot::of_batch(&job, &self.batch_status_url(job_id)),
            metadata: webhook.metadata.clone(),
        };

        let mut request = self
            .client
            .post(&webhook.url)
            .timeout(WEBHOOK_TIMEOUT)
            .json(&payload);
        for (name, value) in &webhook.headers {
            request = request.header(name.as_str(), value.as_str());
        }

        match request.send().await {
            Ok(response) if response.status().is_success() => {
                tracing::debug!("Webhook delivered for job {}", job_id);
            }
            Ok(response) => {
                tracing::warn!(
                    "Webhook for job {} answered HTTP {}",
                    job_id,
                    response.status()
                );
            }
            Err(e) => {
                tracing::warn!("Webhook delivery failed for job {}: {}", job_id, e);
            }
        }
    }
}
