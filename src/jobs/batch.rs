//! Batch scrape orchestration

use crate::jobs::{classify_outcome, JobRunner, Outcome, WORKER_POOL_SIZE};
use crate::model::{BatchScrapeRequest, JobStatus, ScrapeError, ScrapeOptions, WebhookConfig};
use crate::url::is_valid_absolute_url;
use crate::{Result, RummageError};
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

impl JobRunner {
    /// Validates a batch request, persists the pending job, and spawns the
    /// background processing task.
    ///
    /// Returns the job ID and the invalid URLs that were set aside. With
    /// `ignore_invalid_urls` unset, any invalid URL fails the whole
    /// request synchronously.
    pub async fn start_batch(
        self: &Arc<Self>,
        req: BatchScrapeRequest,
    ) -> Result<(String, Vec<String>)> {
        if req.urls.is_empty() {
            return Err(RummageError::InvalidRequest(
                "at least one URL is required".to_string(),
            ));
        }

        let mut valid_urls = Vec::with_capacity(req.urls.len());
        let mut invalid_urls = Vec::new();
        for url in &req.urls {
            if is_valid_absolute_url(url) {
                valid_urls.push(url.clone());
            } else {
                invalid_urls.push(url.clone());
            }
        }

        if !req.ignore_invalid_urls && !invalid_urls.is_empty() {
            return Err(RummageError::InvalidRequest(format!(
                "invalid URL: {}",
                invalid_urls[0]
            )));
        }
        if valid_urls.is_empty() {
            return Err(RummageError::InvalidRequest(
                "no valid URLs provided".to_string(),
            ));
        }

        let job_id = self.store.create_batch_job(&valid_urls, &invalid_urls).await?;

        let runner = Arc::clone(self);
        let id = job_id.clone();
        let options = req.options.clone();
        let webhook = req.webhook.clone();
        tokio::spawn(async move {
            runner.run_batch(id, valid_urls, options, webhook).await;
        });

        Ok((job_id, invalid_urls))
    }

    /// Background half of a batch job: a five-worker pool scrapes every
    /// URL, streaming artifacts into the store, then the terminal status
    /// and error lists are written and the webhook (if any) notified.
    async fn run_batch(
        self: Arc<Self>,
        job_id: String,
        urls: Vec<String>,
        options: ScrapeOptions,
        webhook: Option<WebhookConfig>,
    ) {
        let _slot = match self.job_slots.clone().acquire_owned().await {
            Ok(permit) => permit,
            Err(_) => return,
        };

        tracing::info!("Batch job {} starting with {} URLs", job_id, urls.len());

        if let Err(e) = self.store.mark_batch_processing(&job_id).await {
            tracing::warn!("Failed to mark batch job {} processing: {}", job_id, e);
        }

        let pool = Arc::new(Semaphore::new(WORKER_POOL_SIZE));
        let mut workers: JoinSet<Outcome> = JoinSet::new();

        for url in urls {
            let pool = Arc::clone(&pool);
            let extractor = self.extractor.clone();
            let scrape_req = options.to_request(&url);

            workers.spawn(async move {
                // Each worker waits its turn on the five-slot pool
                let _permit = pool.acquire_owned().await.ok();
                match extractor.extract(scrape_req).await {
                    Ok(artifact) => classify_outcome(&url, artifact),
                    Err(e) => Outcome::Failure(ScrapeError::new(&url, e.to_string())),
                }
            });
        }

        // The job record is read-modify-write, so this collector is its
        // only writer; workers hand their outcomes back instead of
        // touching the store themselves.
        let mut successes = 0usize;
        let mut errors: Vec<ScrapeError> = Vec::new();
        let mut robots_blocked: Vec<String> = Vec::new();

        while let Some(joined) = workers.join_next().await {
            match joined {
                Ok(Outcome::Success(artifact)) => {
                    successes += 1;
                    if let Err(e) = self.store.update_batch_job(&job_id, artifact).await {
                        tracing::warn!("Failed to record result for batch job {}: {}", job_id, e);
                    }
                }
                Ok(Outcome::Failure(error)) => errors.push(error),
                Ok(Outcome::RobotsBlocked(url)) => robots_blocked.push(url),
                Err(e) => tracing::warn!("Batch worker panicked for job {}: {}", job_id, e),
            }
        }

        let status = if successes == 0 && (!errors.is_empty() || !robots_blocked.is_empty()) {
            JobStatus::Failed
        } else {
            JobStatus::Completed
        };

        tracing::info!(
            "Batch job {} finished: {} ok, {} errors, {} robots-blocked",
            job_id,
            successes,
            errors.len(),
            robots_blocked.len()
        );

        if let Err(e) = self
            .store
            .finish_batch_job(&job_id, status, errors, robots_blocked)
            .await
        {
            tracing::warn!("Failed to finish batch job {}: {}", job_id, e);
        }

        if let Some(webhook) = webhook {
            self.deliver_batch_webhook(&job_id, &webhook).await;
        }
    }
}
