// src/services/frames.rs

//! Detail-page frame extraction.
//!
//! Posting detail pages fill their named iframes from client-side scripts, so
//! the frame sources only exist after the page has rendered. Extraction runs
//! in a real browser: one session per call, one page per requested frame.

use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use futures::future::join_all;

use crate::error::{AppError, ErrorKind, Result};
use crate::models::{BrowserConfig, FrameContent};

/// Starts browser sessions.
#[async_trait]
pub trait BrowserLauncher: Send + Sync {
    type Session: BrowserSession;

    async fn launch(&self) -> Result<Self::Session>;
}

/// A running browser. Must be closed explicitly.
#[async_trait]
pub trait BrowserSession: Send + Sync {
    type Page: BrowserPage;

    async fn new_page(&self) -> Result<Self::Page>;

    async fn close(&mut self) -> Result<()>;
}

/// One tab inside a session. Must be closed explicitly.
#[async_trait]
pub trait BrowserPage: Send + Sync {
    /// Navigate and wait until the network has gone quiet.
    async fn goto(&self, url: &str) -> Result<()>;

    /// Resolved `src` of the iframe with the given `name`, if any.
    async fn frame_src(&self, name: &str) -> Result<Option<String>>;

    /// Inner markup of the current document's body.
    async fn body_html(&self) -> Result<String>;

    async fn close(&self) -> Result<()>;
}

/// Extracts iframe bodies from posting detail pages.
pub struct FrameExtractor<L> {
    launcher: L,
    navigation_timeout: Duration,
}

impl<L: BrowserLauncher> FrameExtractor<L> {
    pub fn new(launcher: L, config: &BrowserConfig) -> Self {
        Self {
            launcher,
            navigation_timeout: Duration::from_secs(config.navigation_timeout_secs),
        }
    }

    /// Body markup of each requested frame that resolved, in request order.
    pub async fn extract_frames(
        &self,
        detail_url: &str,
        frame_names: &[String],
    ) -> Result<Vec<String>> {
        let frames = self.extract_named(detail_url, frame_names).await?;
        Ok(frames.into_iter().map(|frame| frame.html).collect())
    }

    /// Like [`extract_frames`](Self::extract_frames), keeping frame names.
    pub async fn extract_named(
        &self,
        detail_url: &str,
        frame_names: &[String],
    ) -> Result<Vec<FrameContent>> {
        let mut session = self.launcher.launch().await?;
        log::debug!("Browser session open for {detail_url}");

        let outcomes = join_all(
            frame_names
                .iter()
                .map(|name| self.extract_one(&session, detail_url, name)),
        )
        .await;

        session.close().await?;

        let mut frames = Vec::new();
        for (name, outcome) in frame_names.iter().zip(outcomes) {
            match outcome {
                Ok(html) => frames.push(FrameContent {
                    name: name.clone(),
                    html,
                }),
                Err(e) if e.kind() == ErrorKind::FrameNotFound => {
                    log::debug!("No content for frame '{name}' on {detail_url}");
                }
                Err(e) => log::warn!("Failed to extract frame '{name}' from {detail_url}: {e}"),
            }
        }
        Ok(frames)
    }

    async fn extract_one(
        &self,
        session: &L::Session,
        detail_url: &str,
        name: &str,
    ) -> Result<String> {
        let page = session.new_page().await?;
        let outcome = self.load_frame(&page, detail_url, name).await;
        if let Err(e) = page.close().await {
            log::warn!("Failed to close page for frame '{name}': {e}");
        }
        outcome
    }

    async fn load_frame(
        &self,
        page: &<L::Session as BrowserSession>::Page,
        detail_url: &str,
        name: &str,
    ) -> Result<String> {
        self.bounded(format!("navigation to {detail_url}"), page.goto(detail_url))
            .await?;

        let src = self
            .bounded(format!("lookup of frame '{name}'"), page.frame_src(name))
            .await?
            .filter(|src| !src.trim().is_empty())
            .ok_or_else(|| AppError::frame_not_found(name))?;

        self.bounded(format!("navigation to {src}"), page.goto(&src))
            .await?;
        self.bounded(format!("body of frame '{name}'"), page.body_html())
            .await
    }

    /// Every browser round-trip shares the navigation timeout.
    async fn bounded<T, F>(&self, context: String, step: F) -> Result<T>
    where
        F: Future<Output = Result<T>>,
    {
        tokio::time::timeout(self.navigation_timeout, step)
            .await
            .map_err(|_| AppError::timeout(context, self.navigation_timeout.as_secs()))?
    }
}
