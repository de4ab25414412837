// src/models/mod.rs

//! Domain models for the crawler.

mod categories;
mod config;
mod posting;

// Re-export all public types
pub use categories::Categories;
pub use config::{
    BrowserConfig, Config, CrawlerConfig, FilterConfig, MismatchPolicy, ParserConfig, SiteConfig,
};
pub use posting::JobPosting;

/// Postings per listing request. The endpoint is always asked for this many.
pub const PAGE_SIZE: u64 = 40;

/// Summary of a full listing crawl.
#[derive(Debug, Default)]
pub struct CrawlOutcome {
    pub postings: Vec<JobPosting>,
    pub total_count: u64,
    pub page_count: u32,
}

/// Body markup of one extracted detail-page frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameContent {
    pub name: String,
    pub html: String,
}
