//! Data model for Rummage
//!
//! Wire-facing request/response types plus the persisted job records.
//! Everything here serializes with the camelCase names clients see.

mod batch;
mod crawl;
mod job;
mod map;
mod scrape;

pub use batch::{BatchQueuedResponse, BatchScrapeRequest};
pub use crawl::{CrawlQueuedResponse, CrawlRequest, CRAWL_LIMIT_CAP, DEFAULT_MAX_DEPTH};
pub use job::{
    BatchJob, CrawlJob, ErrorsResponse, JobSnapshot, JobStatus, ScrapeError, WebhookConfig,
};
pub use map::{MapRequest, MapResponse, MAP_LIMIT_CAP};
pub use scrape::{
    Format, PageArtifact, PageMetadata, ScrapeOptions, ScrapeRequest, ScrapeResponse,
};
