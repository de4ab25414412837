//! Service layer for the crawler.
//!
//! This module contains the business logic for:
//! - Listing requests (`ListingClient`)
//! - Listing markup parsing (`ListingParser`)
//! - Date text normalization (`DateNormalizer`)
//! - Detail-page frame extraction (`FrameExtractor`, `ChromeLauncher`)

#[cfg(feature = "browser")]
mod browser;
mod dates;
mod frames;
mod listings;
mod parser;

#[cfg(feature = "browser")]
pub use browser::{ChromeLauncher, NetworkIdle};
pub use dates::{Clock, DateNormalizer, FixedClock, SystemClock};
pub use frames::{BrowserLauncher, BrowserPage, BrowserSession, FrameExtractor};
pub use listings::{ListingClient, ListingSource, count_form, page_form, parse_count};
pub use parser::ListingParser;
