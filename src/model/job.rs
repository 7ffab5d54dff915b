use crate::model::scrape::PageArtifact;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Lifecycle state of a background job.
///
/// `Completed`, `Failed` and `Cancelled` are terminal: once a job reaches
/// one of them, no later write may change its status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Pending,
    Processing,
    Scraping,
    Completed,
    Failed,
    Cancelled,
}

impl JobStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Failed | Self::Cancelled)
    }
}

/// A single per-URL failure recorded on a job
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScrapeError {
    pub id: String,
    pub timestamp: DateTime<Utc>,
    pub url: String,
    pub error: String,
}

impl ScrapeError {
    pub fn new(url: &str, error: String) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            timestamp: Utc::now(),
            url: url.to_string(),
            error,
        }
    }
}

/// Webhook notification settings attached to a job request
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct WebhookConfig {
    pub url: String,
    pub headers: HashMap<String, String>,
    pub metadata: HashMap<String, serde_json::Value>,
    pub events: Vec<String>,
}

/// Persisted state of a batch scrape job
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchJob {
    pub id: String,
    pub status: JobStatus,
    /// Best known URL count, including invalid URLs the request carried
    pub total: usize,
    /// Processed URL count; monotonically non-decreasing
    pub completed: usize,
    #[serde(default)]
    pub results: Vec<PageArtifact>,
    #[serde(default)]
    pub errors: Vec<ScrapeError>,
    #[serde(default)]
    pub robots_blocked: Vec<String>,
    #[serde(rename = "invalidURLs", default)]
    pub invalid_urls: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl BatchJob {
    pub fn new(id: String, total: usize, invalid_urls: Vec<String>, ttl: Duration) -> Self {
        let now = Utc::now();
        Self {
            id,
            status: JobStatus::Pending,
            total,
            completed: 0,
            results: Vec::new(),
            errors: Vec::new(),
            robots_blocked: Vec::new(),
            invalid_urls,
            created_at: now,
            updated_at: now,
            expires_at: now + ttl,
        }
    }

    /// Appends a result and advances the progress counter. When every URL
    /// has produced a result the job flips to `Completed`. Writes against a
    /// terminal job are ignored.
    pub fn record_result(&mut self, artifact: PageArtifact) {
        if self.status.is_terminal() {
            return;
        }
        self.results.push(artifact);
        self.completed += 1;
        if self.completed >= self.total {
            self.status = JobStatus::Completed;
        }
        self.touch();
    }

    /// Moves a pending job into its running state
    pub fn mark_processing(&mut self) {
        if !self.status.is_terminal() {
            self.status = JobStatus::Processing;
            self.touch();
        }
    }

    /// Attaches the final error lists and sets the terminal status.
    /// An already-terminal status is never replaced.
    pub fn finish(
        &mut self,
        status: JobStatus,
        errors: Vec<ScrapeError>,
        robots_blocked: Vec<String>,
    ) {
        self.errors = errors;
        self.robots_blocked = robots_blocked;
        if !self.status.is_terminal() {
            self.status = status;
        }
        self.touch();
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

/// Persisted state of a crawl job
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CrawlJob {
    pub id: String,
    pub status: JobStatus,
    pub total: usize,
    pub completed: usize,
    #[serde(default)]
    pub results: Vec<PageArtifact>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl CrawlJob {
    pub fn new(id: String, ttl: Duration) -> Self {
        let now = Utc::now();
        Self {
            id,
            status: JobStatus::Pending,
            total: 0,
            completed: 0,
            results: Vec::new(),
            created_at: now,
            updated_at: now,
            expires_at: now + ttl,
        }
    }

    /// Appends a result; the first result moves a pending job to
    /// `Scraping`. Writes against a terminal job are ignored.
    pub fn record_result(&mut self, artifact: PageArtifact) {
        if self.status.is_terminal() {
            return;
        }
        self.results.push(artifact);
        self.completed += 1;
        if self.status == JobStatus::Pending {
            self.status = JobStatus::Scraping;
        }
        self.touch();
    }

    /// Authoritative setter for status and total. A terminal status is
    /// never replaced; a zero total never shrinks the known count.
    pub fn apply_status(&mut self, status: JobStatus, total: usize) {
        if !self.status.is_terminal() {
            self.status = status;
        }
        if total > 0 {
            self.total = total;
        }
        self.touch();
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

/// Client-facing snapshot of a job, shared by the batch and crawl status
/// endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobSnapshot {
    pub status: JobStatus,
    pub total: usize,
    pub completed: usize,
    pub expires_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub next: Option<String>,
    pub data: Vec<PageArtifact>,
}

impl JobSnapshot {
    /// Builds a snapshot; `status_url` becomes `next` while the job is
    /// still running.
    fn build(
        status: JobStatus,
        total: usize,
        completed: usize,
        expires_at: DateTime<Utc>,
        data: Vec<PageArtifact>,
        status_url: &str,
    ) -> Self {
        let next = if status.is_terminal() {
            None
        } else {
            Some(status_url.to_string())
        };
        Self {
            status,
            total,
            completed,
            expires_at,
            next,
            data,
        }
    }

    pub fn of_batch(job: &BatchJob, status_url: &str) -> Self {
        Self::build(
            job.status,
            job.total,
            job.completed,
            job.expires_at,
            job.results.clone(),
            status_url,
        )
    }

    pub fn of_crawl(job: &CrawlJob, status_url: &str) -> Self {
        Self::build(
            job.status,
            job.total,
            job.completed,
            job.expires_at,
            job.results.clone(),
            status_url,
        )
    }
}

/// Response for the `{id}/errors` endpoints
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorsResponse {
    pub errors: Vec<ScrapeError>,
    pub robots_blocked: Vec<String>,
}
