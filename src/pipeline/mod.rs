//! Pipeline entry points for crawler operations.
//!
//! - `run_crawler`: Count, fetch and parse every listing page
//! - `run_frames`: Extract named iframes from a posting's detail page

pub mod crawl;
#[cfg(feature = "browser")]
pub mod frames;

pub use crawl::{fetch_listings, page_count, run_crawler};
#[cfg(feature = "browser")]
pub use frames::run_frames;
