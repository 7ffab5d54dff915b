//! Crawl orchestration
//!
//! A crawl first tries to discover its URL population through the site
//! mapper, then scrapes each discovered URL in order. When discovery
//! fails it falls back to a recursive link-following crawl bounded by
//! depth, cap and the request's link filters.

use crate::jobs::{classify_outcome, JobRunner, Outcome, WORKER_POOL_SIZE};
use crate::mapper::{self, Discovery, DiscoveryFilter};
use crate::model::{CrawlRequest, JobStatus, MapRequest, ScrapeError, ScrapeOptions};
use crate::url::{is_backward_link, is_valid_absolute_url, matches_paths};
use crate::{Result, RummageError};
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinSet;
use url::Url;

/// How often the scrape pass refreshes the persisted progress snapshot
const STATUS_REFRESH_INTERVAL: usize = 10;

impl JobRunner {
    /// Validates a crawl request, persists the pending job, and spawns
    /// the background task. Returns the new job ID.
    pub async fn start_crawl(self: &Arc<Self>, req: CrawlRequest) -> Result<String> {
        if req.url.is_empty() {
            return Err(RummageError::InvalidRequest("URL is required".to_string()));
        }
        if !is_valid_absolute_url(&req.url) {
            return Err(RummageError::InvalidRequest(format!(
                "invalid URL: {}",
                req.url
            )));
        }

        let job_id = uuid::Uuid::new_v4().to_string();
        self.store.create_crawl_job(&job_id).await?;

        let runner = Arc::clone(self);
        let id = job_id.clone();
        tokio::spawn(async move {
            runner.run_crawl(id, req).await;
        });

        Ok(job_id)
    }

    async fn run_crawl(self: Arc<Self>, job_id: String, req: CrawlRequest) {
        let _slot = match self.job_slots.clone().acquire_owned().await {
            Ok(permit) => permit,
            Err(_) => return,
        };

        tracing::info!("Crawl job {} starting at {}", job_id, req.url);

        let map_req = MapRequest {
            url: req.url.clone(),
            ignore_sitemap: req.ignore_sitemap,
            include_subdomains: req.allow_external_links,
            limit: req.effective_limit(),
            include_paths: req.include_paths.clone(),
            exclude_paths: req.exclude_paths.clone(),
            ..Default::default()
        };

        match mapper::map(&self.client, &map_req).await {
            Ok(mapped) if !mapped.links.is_empty() => {
                self.scrape_pass(&job_id, mapped.links, &req).await;
            }
            Ok(_) | Err(_) => {
                tracing::debug!(
                    "Discovery yielded nothing for crawl job {}, using recursive fallback",
                    job_id
                );
                self.legacy_crawl(&job_id, &req).await;
            }
        }
    }

    /// Scrapes an already-discovered URL list in order, streaming results
    /// into the job record and refreshing the progress snapshot every few
    /// URLs. Stops as soon as the persisted status reads cancelled.
    async fn scrape_pass(&self, job_id: &str, links: Vec<String>, req: &CrawlRequest) {
        let total = links.len();
        if let Err(e) = self
            .store
            .update_crawl_job_status(job_id, JobStatus::Scraping, total)
            .await
        {
            tracing::warn!("Failed to start crawl job {}: {}", job_id, e);
        }

        let options = req.scrape_options();

        for (index, url) in links.iter().enumerate() {
            if self.is_cancelled(job_id).await {
                tracing::info!("Crawl job {} cancelled, stopping", job_id);
                return;
            }

            self.scrape_into_job(job_id, url, &options).await;

            if (index + 1) % STATUS_REFRESH_INTERVAL == 0 {
                if let Err(e) = self
                    .store
                    .update_crawl_job_status(job_id, JobStatus::Scraping, total)
                    .await
                {
                    tracing::warn!("Failed to refresh crawl job {}: {}", job_id, e);
                }
            }
        }

        if let Err(e) = self.store.complete_crawl_job(job_id, total).await {
            tracing::warn!("Failed to complete crawl job {}: {}", job_id, e);
        }
        tracing::info!("Crawl job {} completed ({} URLs)", job_id, total);
    }

    /// Recursive fallback crawl: breadth-first link following from the
    /// seed, bounded by depth and cap, scraping every visited page.
    /// Sitemap probing seeds the queue unless disabled.
    async fn legacy_crawl(&self, job_id: &str, req: &CrawlRequest) {
        // A malformed seed is fatal to the job; its status stays as-is.
        let base = match Url::parse(&req.url) {
            Ok(base) => base,
            Err(e) => {
                tracing::warn!("Crawl job {} has malformed seed URL: {}", job_id, e);
                return;
            }
        };

        let limit = req.effective_limit();
        let max_depth = req.effective_max_depth();
        let options = req.scrape_options();
        let filter = DiscoveryFilter {
            include_paths: req.include_paths.clone(),
            exclude_paths: req.exclude_paths.clone(),
            search: String::new(),
        };

        if let Err(e) = self
            .store
            .update_crawl_job_status(job_id, JobStatus::Scraping, 1)
            .await
        {
            tracing::warn!("Failed to start crawl job {}: {}", job_id, e);
        }

        let discovery = Discovery::seeded(&req.url, limit);
        if !req.ignore_sitemap {
            mapper::probe_sitemaps(&self.client, &base, &filter, &discovery).await;
        }

        // The queue starts with everything discovery already holds:
        // the seed plus any sitemap URLs.
        let mut queue: VecDeque<(String, u32)> = VecDeque::new();
        let mut scraped = 0usize;
        for url in discovery.snapshot() {
            queue.push_back((url, 0));
        }

        while !queue.is_empty() {
            if self.is_cancelled(job_id).await {
                tracing::info!("Crawl job {} cancelled, stopping", job_id);
                return;
            }

            let mut workers: JoinSet<(u32, Outcome, Vec<String>)> = JoinSet::new();
            for _ in 0..WORKER_POOL_SIZE {
                let Some((url, depth)) = queue.pop_front() else {
                    break;
                };
                scraped += 1;

                let client = self.client.clone();
                let extractor = self.extractor.clone();
                let options = options.clone();
                let base = base.clone();
                let req = req.clone();

                workers.spawn(async move {
                    // Fetch once for link harvesting; the extractor does its
                    // own fetch with the full per-request semantics.
                    let harvest_timeout = if options.timeout == 0 {
                        30_000
                    } else {
                        options.timeout
                    };
                    let body = fetch_page(&client, &url, harvest_timeout).await;

                    let scrape_req = options.to_request(&url);
                    let outcome = match extractor.extract(scrape_req).await {
                        Ok(artifact) => classify_outcome(&url, artifact),
                        Err(e) => Outcome::Failure(ScrapeError::new(&url, e.to_string())),
                    };

                    let candidates = match body {
                        Some(body) if depth < max_depth => harvest_candidates(&body, &base, &req),
                        _ => Vec::new(),
                    };
                    (depth, outcome, candidates)
                });
            }

            // Collector: the single writer of this job's records
            while let Some(joined) = workers.join_next().await {
                match joined {
                    Ok((depth, outcome, candidates)) => {
                        let written = match outcome {
                            Outcome::Success(artifact) => {
                                self.store.update_crawl_job(job_id, artifact).await
                            }
                            Outcome::Failure(error) => {
                                self.store.store_crawl_error(job_id, error).await
                            }
                            Outcome::RobotsBlocked(url) => {
                                self.store.store_robots_blocked(job_id, &url).await
                            }
                        };
                        if let Err(e) = written {
                            tracing::warn!("Store write failed for crawl job {}: {}", job_id, e);
                        }

                        for url in candidates {
                            if discovery.insert(&url) {
                                queue.push_back((url, depth + 1));
                            }
                        }
                    }
                    Err(e) => tracing::warn!("Crawl worker panicked for job {}: {}", job_id, e),
                }
            }
        }

        if let Err(e) = self.store.complete_crawl_job(job_id, scraped).await {
            tracing::warn!("Failed to complete crawl job {}: {}", job_id, e);
        }
        tracing::info!("Crawl job {} completed ({} URLs)", job_id, scraped);
    }

    async fn scrape_into_job(&self, job_id: &str, url: &str, options: &ScrapeOptions) {
        let scrape_req = options.to_request(url);
        let outcome = match self.extractor.extract(scrape_req).await {
            Ok(artifact) => classify_outcome(url, artifact),
            Err(e) => Outcome::Failure(ScrapeError::new(url, e.to_string())),
        };

        let written = match outcome {
            Outcome::Success(artifact) => self.store.update_crawl_job(job_id, artifact).await,
            Outcome::Failure(error) => self.store.store_crawl_error(job_id, error).await,
            Outcome::RobotsBlocked(url) => self.store.store_robots_blocked(job_id, &url).await,
        };
        if let Err(e) = written {
            tracing::warn!("Store write failed for crawl job {}: {}", job_id, e);
        }
    }

    async fn is_cancelled(&self, job_id: &str) -> bool {
        matches!(
            self.store.get_crawl_job(job_id).await,
            Ok(job) if job.status == JobStatus::Cancelled
        )
    }
}

/// Fetches a page body for link harvesting; failures simply yield nothing
async fn fetch_page(client: &reqwest::Client, url: &str, timeout_ms: u64) -> Option<String> {
    let response = client
        .get(url)
        .timeout(Duration::from_millis(timeout_ms))
        .send()
        .await
        .ok()?;
    response.text().await.ok()
}

/// Applies the crawl's per-anchor rules and returns the surviving URLs
fn harvest_candidates(body: &str, base: &Url, req: &CrawlRequest) -> Vec<String> {
    let mut out = Vec::new();

    for href in mapper::collect_hrefs(body) {
        let mut resolved = match base.join(&href) {
            Ok(url) => url,
            Err(_) => continue,
        };

        if !req.allow_external_links && resolved.host_str() != base.host_str() {
            continue;
        }
        if !req.allow_backward_links && is_backward_link(base.path(), resolved.path()) {
            continue;
        }
        if !matches_paths(resolved.as_str(), &req.include_paths, &req.exclude_paths) {
            continue;
        }
        if req.ignore_query_parameters {
            resolved.set_query(None);
        }

        out.push(resolved.to_string());
    }

    out
}
