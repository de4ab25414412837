// src/pipeline/frames.rs

//! Detail-frame extraction entry point.

use crate::error::{AppError, Result};
use crate::models::{Config, FrameContent};
use crate::services::{ChromeLauncher, FrameExtractor};
use crate::utils::log;

/// Extract the named frames of one detail page with a local Chrome.
///
/// Falls back to `browser.frame_names` when `frame_names` is empty.
pub async fn run_frames(
    config: &Config,
    detail_url: &str,
    frame_names: &[String],
) -> Result<Vec<FrameContent>> {
    let names = if frame_names.is_empty() {
        config.browser.frame_names.as_slice()
    } else {
        frame_names
    };
    if names.is_empty() {
        return Err(AppError::config(
            "No frame names given and browser.frame_names is empty",
        ));
    }

    log::header("Detail frame extraction");
    log::info(&format!("{detail_url} → [{}]", names.join(", ")));

    let extractor = FrameExtractor::new(ChromeLauncher::new(&config.browser), &config.browser);
    let frames = extractor.extract_named(detail_url, names).await?;

    log::summary(
        "Extraction complete",
        &[
            ("Requested", names.len().to_string()),
            ("Extracted", frames.len().to_string()),
        ],
    );
    Ok(frames)
}
