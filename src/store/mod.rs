//! Job store: persisted batch/crawl job state with a TTL
//!
//! Jobs live in an external key-value store as JSON strings under
//! namespaced keys, each SET refreshing the configured expiration. The
//! `JobStore` trait is the narrow boundary orchestrators and handlers
//! talk to; behind it sit a Redis backend for production and an in-memory
//! backend for tests and Redis-less development.
//!
//! Updates are read-modify-write (GET, mutate, SET). The single
//! background task that owns a job is its only writer, so last-writer-wins
//! is safe; the mutation helpers on the job records themselves guarantee
//! that terminal statuses are never replaced.

mod memory;
mod redis;

pub use memory::MemoryJobStore;
pub use redis::RedisJobStore;

use crate::model::{BatchJob, CrawlJob, ErrorsResponse, JobStatus, PageArtifact, ScrapeError};
use async_trait::async_trait;
use thiserror::Error;

const BATCH_JOB_PREFIX: &str = "batch:job:";
const CRAWL_JOB_PREFIX: &str = "crawl:job:";
const CRAWL_ERRORS_PREFIX: &str = "crawl:errors:";
const CRAWL_ROBOTS_PREFIX: &str = "crawl:robots:";

/// Errors that can occur during job store operations
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Store connection error: {0}")]
    Connection(String),

    #[error("Store backend error: {0}")]
    Backend(String),

    #[error("Job not found: {0}")]
    NotFound(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type for job store operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Narrow persistence contract used by the orchestrators and HTTP layer
#[async_trait]
pub trait JobStore: Send + Sync {
    // ===== Batch jobs =====

    /// Creates a pending batch job covering the given URLs and returns its ID
    async fn create_batch_job(
        &self,
        urls: &[String],
        invalid_urls: &[String],
    ) -> StoreResult<String>;

    async fn get_batch_job(&self, id: &str) -> StoreResult<BatchJob>;

    /// Appends one result and advances progress, refreshing the TTL
    async fn update_batch_job(&self, id: &str, artifact: PageArtifact) -> StoreResult<()>;

    /// Moves a pending batch job into its running state
    async fn mark_batch_processing(&self, id: &str) -> StoreResult<()>;

    /// Attaches final error lists and sets the terminal status
    async fn finish_batch_job(
        &self,
        id: &str,
        status: JobStatus,
        errors: Vec<ScrapeError>,
        robots_blocked: Vec<String>,
    ) -> StoreResult<()>;

    // ===== Crawl jobs =====

    /// Creates a pending crawl job under the given ID
    async fn create_crawl_job(&self, id: &str) -> StoreResult<String>;

    async fn get_crawl_job(&self, id: &str) -> StoreResult<CrawlJob>;

    /// Appends one result; the first result moves the job to `scraping`
    async fn update_crawl_job(&self, id: &str, artifact: PageArtifact) -> StoreResult<()>;

    /// Authoritative setter for crawl status and total
    async fn update_crawl_job_status(
        &self,
        id: &str,
        status: JobStatus,
        total: usize,
    ) -> StoreResult<()>;

    async fn complete_crawl_job(&self, id: &str, total: usize) -> StoreResult<()> {
        self.update_crawl_job_status(id, JobStatus::Completed, total)
            .await
    }

    async fn cancel_crawl_job(&self, id: &str) -> StoreResult<()> {
        self.update_crawl_job_status(id, JobStatus::Cancelled, 0)
            .await
    }

    // ===== Crawl error side lists =====

    async fn store_crawl_error(&self, id: &str, error: ScrapeError) -> StoreResult<()>;

    async fn store_robots_blocked(&self, id: &str, url: &str) -> StoreResult<()>;

    async fn get_crawl_errors(&self, id: &str) -> StoreResult<ErrorsResponse>;
}

/// Raw string-keyed storage with TTL, the only thing a backend must provide
#[async_trait]
pub trait KvBackend: Send + Sync {
    async fn get_raw(&self, key: &str) -> StoreResult<Option<String>>;

    /// Stores a value, (re)applying the configured expiration
    async fn put_raw(&self, key: &str, value: String) -> StoreResult<()>;
}

/// `JobStore` implementation generic over the raw key-value backend.
///
/// All record semantics (progress counters, status transitions, terminal
/// protection) live in the job types; this layer only does keyed JSON
/// reads and writes.
pub struct KvJobStore<B> {
    backend: B,
    ttl: chrono::Duration,
}

impl<B: KvBackend> KvJobStore<B> {
    pub fn new(backend: B, ttl: std::time::Duration) -> Self {
        Self {
            backend,
            ttl: chrono::Duration::seconds(ttl.as_secs() as i64),
        }
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, key: &str) -> StoreResult<Option<T>> {
        match self.backend.get_raw(key).await? {
            Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
            None => Ok(None),
        }
    }

    async fn put_json<T: serde::Serialize>(&self, key: &str, value: &T) -> StoreResult<()> {
        let raw = serde_json::to_string(value)?;
        self.backend.put_raw(key, raw).await
    }

    async fn require_batch(&self, id: &str) -> StoreResult<BatchJob> {
        self.get_json(&format!("{}{}", BATCH_JOB_PREFIX, id))
            .await?
            .ok_or_else(|| StoreError::NotFound(id.to_string()))
    }

    async fn require_crawl(&self, id: &str) -> StoreResult<CrawlJob> {
        self.get_json(&format!("{}{}", CRAWL_JOB_PREFIX, id))
            .await?
            .ok_or_else(|| StoreError::NotFound(id.to_string()))
    }
}

#[async_trait]
impl<B: KvBackend> JobStore for KvJobStore<B> {
    async fn create_batch_job(
        &self,
        urls: &[String],
        invalid_urls: &[String],
    ) -> StoreResult<String> {
        let id = uuid::Uuid::new_v4().to_string();
        let total = urls.len() + invalid_urls.len();
        let job = BatchJob::new(id.clone(), total, invalid_urls.to_vec(), self.ttl);
        self.put_json(&format!("{}{}", BATCH_JOB_PREFIX, id), &job)
            .await?;
        Ok(id)
    }

    async fn get_batch_job(&self, id: &str) -> StoreResult<BatchJob> {
        self.require_batch(id).await
    }

    async fn update_batch_job(&self, id: &str, artifact: PageArtifact) -> StoreResult<()> {
        let mut job = self.require_batch(id).await?;
        job.record_result(artifact);
        self.put_json(&format!("{}{}", BATCH_JOB_PREFIX, id), &job)
            .await
    }

    async fn mark_batch_processing(&self, id: &str) -> StoreResult<()> {
        let mut job = self.require_batch(id).await?;
        job.mark_processing();
        self.put_json(&format!("{}{}", BATCH_JOB_PREFIX, id), &job)
            .await
    }

    async fn finish_batch_job(
        &self,
        id: &str,
        status: JobStatus,
        errors: Vec<ScrapeError>,
        robots_blocked: Vec<String>,
    ) -> StoreResult<()> {
        let mut job = self.require_batch(id).await?;
        job.finish(status, errors, robots_blocked);
        self.put_json(&format!("{}{}", BATCH_JOB_PREFIX, id), &job)
            .await
    }

    async fn create_crawl_job(&self, id: &str) -> StoreResult<String> {
        let job = CrawlJob::new(id.to_string(), self.ttl);
        self.put_json(&format!("{}{}", CRAWL_JOB_PREFIX, id), &job)
            .await?;
        Ok(id.to_string())
    }

    async fn get_crawl_job(&self, id: &str) -> StoreResult<CrawlJob> {
        self.require_crawl(id).await
    }

    async fn update_crawl_job(&self, id: &str, artifact: PageArtifact) -> StoreResult<()> {
        let mut job = self.require_crawl(id).await?;
        job.record_result(artifact);
        self.put_json(&format!("{}{}", CRAWL_JOB_PREFIX, id), &job)
            .await
    }

    async fn update_crawl_job_status(
        &self,
        id: &str,
        status: JobStatus,
        total: usize,
    ) -> StoreResult<()> {
        let mut job = self.require_crawl(id).await?;
        job.apply_status(status, total);
        self.put_json(&format!("{}{}", CRAWL_JOB_PREFIX, id), &job)
            .await
    }

    async fn store_crawl_error(&self, id: &str, error: ScrapeError) -> StoreResult<()> {
        let key = format!("{}{}", CRAWL_ERRORS_PREFIX, id);
        let mut errors: Vec<ScrapeError> = self.get_json(&key).await?.unwrap_or_default();
        errors.push(error);
        self.put_json(&key, &errors).await
    }

    async fn store_robots_blocked(&self, id: &str, url: &str) -> StoreResult<()> {
        let key = format!("{}{}", CRAWL_ROBOTS_PREFIX, id);
        let mut blocked: Vec<String> = self.get_json(&key).await?.unwrap_or_default();
        blocked.push(url.to_string());
        self.put_json(&key, &blocked).await
    }

    async fn get_crawl_errors(&self, id: &str) -> StoreResult<ErrorsResponse> {
        let errors = self
            .get_json(&format!("{}{}", CRAWL_ERRORS_PREFIX, id))
            .await?
            .unwrap_or_default();
        let robots_blocked = self
            .get_json(&format!("{}{}", CRAWL_ROBOTS_PREFIX, id))
            .await?
            .unwrap_or_default();
        Ok(ErrorsResponse {
            errors,
            robots_blocked,
        })
    }
}
