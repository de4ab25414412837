// src/lib.rs

//! Job board crawler library.
//!
//! Fetches paginated job listings from gamejob.co.kr, parses them into
//! [`models::JobPosting`] records and extracts the rendered iframes of a
//! posting's detail page through a headless browser.

pub mod config;
pub mod error;
pub mod models;
pub mod pipeline;
pub mod services;
pub mod utils;
