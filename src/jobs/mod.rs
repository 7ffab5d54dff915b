//! Background job orchestration
//!
//! One background task per job, each holding a permit from a global
//! semaphore sized by `scraper.max-concurrent-jobs`. Inside a job, work
//! fans out over a bounded pool of five workers. Per-URL failures are
//! recorded and never abort the job.

mod batch;
mod crawl;
mod webhook;

use crate::model::{PageArtifact, ScrapeError};
use crate::scrape::Extractor;
use crate::store::JobStore;
use crate::Config;
use reqwest::Client;
use std::sync::Arc;
use tokio::sync::Semaphore;

/// Fixed size of the per-job worker pool
pub(crate) const WORKER_POOL_SIZE: usize = 5;

/// Error-message marker for fetches refused by a robots policy
const ROBOTS_BLOCKED_MARKER: &str = "blocked by robots.txt";

/// Shared orchestrator for batch and crawl jobs
pub struct JobRunner {
    pub(crate) store: Arc<dyn JobStore>,
    pub(crate) extractor: Extractor,
    pub(crate) client: Client,
    pub(crate) base_url: String,
    /// Global cap on concurrently running background jobs
    pub(crate) job_slots: Arc<Semaphore>,
}

impl JobRunner {
    pub fn new(store: Arc<dyn JobStore>, client: Client, config: &Config) -> Self {
        Self {
            store,
            extractor: Extractor::new(client.clone(), &config.scraper),
            client,
            base_url: config.base_url(),
            job_slots: Arc::new(Semaphore::new(config.scraper.max_concurrent_jobs as usize)),
        }
    }

    /// Status URL for a batch job
    pub fn batch_status_url(&self, id: &str) -> String {
        format!("{}/v1/batch/scrape/{}", self.base_url, id)
    }

    /// Status URL for a crawl job
    pub fn crawl_status_url(&self, id: &str) -> String {
        format!("{}/v1/crawl/{}", self.base_url, id)
    }
}

/// How a single scraped URL turned out
pub(crate) enum Outcome {
    /// An artifact worth recording, including HTTP-status failures
    Success(PageArtifact),
    /// A transport failure, recorded as a scrape error
    Failure(ScrapeError),
    /// A transport failure attributed to a robots policy
    RobotsBlocked(String),
}

/// Classifies an extraction result for job bookkeeping.
///
/// Transport failures (no response at all) become errors, or robots
/// entries when the message carries the robots marker. Everything else,
/// including non-2xx responses, counts as a recordable artifact.
pub(crate) fn classify_outcome(url: &str, artifact: PageArtifact) -> Outcome {
    if artifact.is_transport_failure() {
        let message = artifact.metadata.error.clone().unwrap_or_default();
        if message.contains(ROBOTS_BLOCKED_MARKER) {
            return Outcome::RobotsBlocked(url.to_string());
        }
        return Outcome::Failure(ScrapeError::new(url, message));
    }
    Outcome::Success(artifact)
}
