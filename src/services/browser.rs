// src/services/browser.rs

//! Headless Chrome backend for frame extraction.

use std::collections::HashSet;
use std::time::Duration;

use async_trait::async_trait;
use chromiumoxide::Page;
use chromiumoxide::browser::{Browser, BrowserConfig as ChromeConfig};
use chromiumoxide::cdp::browser_protocol::network::{
    EventLoadingFailed, EventLoadingFinished, EventRequestWillBeSent,
};
use futures::stream::{self, BoxStream, Stream, StreamExt};
use tokio::task::JoinHandle;
use tokio::time::Instant;

use crate::error::{AppError, Result};
use crate::models::BrowserConfig;
use crate::services::frames::{BrowserLauncher, BrowserPage, BrowserSession};

/// When a navigation counts as finished: at most `max_inflight` requests
/// open for a full `settle` window.
#[derive(Debug, Clone, Copy)]
pub struct NetworkIdle {
    pub max_inflight: usize,
    pub settle: Duration,
}

impl From<&BrowserConfig> for NetworkIdle {
    fn from(config: &BrowserConfig) -> Self {
        Self {
            max_inflight: config.idle_max_inflight,
            settle: Duration::from_millis(config.idle_settle_ms),
        }
    }
}

/// Launches a local Chrome/Chromium per extraction call.
pub struct ChromeLauncher {
    headless: bool,
    request_timeout: Duration,
    idle: NetworkIdle,
}

impl ChromeLauncher {
    pub fn new(config: &BrowserConfig) -> Self {
        Self {
            headless: config.headless,
            request_timeout: Duration::from_secs(config.navigation_timeout_secs),
            idle: NetworkIdle::from(config),
        }
    }
}

#[async_trait]
impl BrowserLauncher for ChromeLauncher {
    type Session = ChromeSession;

    async fn launch(&self) -> Result<ChromeSession> {
        let mut builder = ChromeConfig::builder().request_timeout(self.request_timeout);
        if !self.headless {
            builder = builder.with_head();
        }
        let config = builder
            .build()
            .map_err(|e| AppError::browser("launch", e))?;

        let (browser, mut handler) = Browser::launch(config)
            .await
            .map_err(|e| AppError::browser("launch", e))?;

        // The CDP connection only makes progress while its handler is polled.
        let handler = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    log::debug!("Browser handler event error: {e}");
                }
            }
        });

        Ok(ChromeSession {
            browser,
            handler,
            idle: self.idle,
        })
    }
}

pub struct ChromeSession {
    browser: Browser,
    handler: JoinHandle<()>,
    idle: NetworkIdle,
}

#[async_trait]
impl BrowserSession for ChromeSession {
    type Page = ChromePage;

    async fn new_page(&self) -> Result<ChromePage> {
        let page = self
            .browser
            .new_page("about:blank")
            .await
            .map_err(|e| AppError::browser("open page", e))?;
        Ok(ChromePage {
            page,
            idle: self.idle,
        })
    }

    async fn close(&mut self) -> Result<()> {
        let closed = self
            .browser
            .close()
            .await
            .map(|_| ())
            .map_err(|e| AppError::browser("close browser", e));
        if let Err(e) = self.browser.wait().await {
            log::debug!("Browser process wait failed: {e}");
        }
        self.handler.abort();
        closed
    }
}

pub struct ChromePage {
    page: Page,
    idle: NetworkIdle,
}

#[async_trait]
impl BrowserPage for ChromePage {
    async fn goto(&self, url: &str) -> Result<()> {
        let context = format!("navigate to {url}");
        let started = self
            .page
            .event_listener::<EventRequestWillBeSent>()
            .await
            .map_err(|e| AppError::browser(&context, e))?
            .map(|e| NetEvent::Started(e.request_id.inner().clone()));
        let finished = self
            .page
            .event_listener::<EventLoadingFinished>()
            .await
            .map_err(|e| AppError::browser(&context, e))?
            .map(|e| NetEvent::Done(e.request_id.inner().clone()));
        let failed = self
            .page
            .event_listener::<EventLoadingFailed>()
            .await
            .map_err(|e| AppError::browser(&context, e))?
            .map(|e| NetEvent::Done(e.request_id.inner().clone()));

        self.page
            .goto(url)
            .await
            .map_err(|e| AppError::browser(&context, e))?;

        let events: BoxStream<'static, NetEvent> =
            stream::select(started, stream::select(finished, failed)).boxed();
        wait_for_idle(events, self.idle).await;
        Ok(())
    }

    async fn frame_src(&self, name: &str) -> Result<Option<String>> {
        let selector = format!("iframe[name=\"{}\"]", escape_attr(name));
        let frames = self
            .page
            .find_elements(selector)
            .await
            .map_err(|e| AppError::browser(format!("find frame {name}"), e))?;
        let Some(frame) = frames.into_iter().next() else {
            return Ok(None);
        };

        let src = frame
            .property("src")
            .await
            .map_err(|e| AppError::browser(format!("read src of frame {name}"), e))?;
        Ok(src.and_then(|value| value.as_str().map(str::to_string)))
    }

    async fn body_html(&self) -> Result<String> {
        self.page
            .evaluate("document.body ? document.body.innerHTML : ''")
            .await
            .map_err(|e| AppError::browser("read body", e))?
            .into_value::<String>()
            .map_err(|e| AppError::browser("read body", e))
    }

    async fn close(&self) -> Result<()> {
        self.page
            .clone()
            .close()
            .await
            .map_err(|e| AppError::browser("close page", e))
    }
}

#[derive(Debug)]
enum NetEvent {
    Started(String),
    Done(String),
}

/// Resolve once the open-request count has stayed at or below the limit for
/// the settle window. Returns early if the event source ends while busy.
async fn wait_for_idle<S>(mut events: S, idle: NetworkIdle)
where
    S: Stream<Item = NetEvent> + Unpin,
{
    let mut inflight: HashSet<String> = HashSet::new();
    let mut open = true;
    let settle = tokio::time::sleep(idle.settle);
    tokio::pin!(settle);

    loop {
        let quiet = inflight.len() <= idle.max_inflight;
        tokio::select! {
            event = events.next(), if open => match event {
                Some(NetEvent::Started(id)) => {
                    inflight.insert(id);
                }
                Some(NetEvent::Done(id)) => {
                    inflight.remove(&id);
                }
                None => open = false,
            },
            () = &mut settle, if quiet => return,
            else => return,
        }

        if !quiet && inflight.len() <= idle.max_inflight {
            settle.as_mut().reset(Instant::now() + idle.settle);
        }
    }
}

fn escape_attr(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn idle(max_inflight: usize) -> NetworkIdle {
        NetworkIdle {
            max_inflight,
            settle: Duration::from_millis(50),
        }
    }

    fn started(id: &str) -> NetEvent {
        NetEvent::Started(id.to_string())
    }

    fn done(id: &str) -> NetEvent {
        NetEvent::Done(id.to_string())
    }

    #[tokio::test]
    async fn settles_with_two_requests_open() {
        let events = stream::iter(vec![started("a"), started("b"), started("c"), done("a")])
            .chain(stream::pending());
        let waited = tokio::time::timeout(
            Duration::from_secs(2),
            wait_for_idle(Box::pin(events), idle(2)),
        )
        .await;
        assert!(waited.is_ok());
    }

    #[tokio::test]
    async fn stays_busy_above_limit() {
        let events = stream::iter(vec![started("a"), started("b"), started("c")])
            .chain(stream::pending());
        let waited = tokio::time::timeout(
            Duration::from_millis(300),
            wait_for_idle(Box::pin(events), idle(2)),
        )
        .await;
        assert!(waited.is_err());
    }

    #[tokio::test]
    async fn failed_requests_count_as_done() {
        let events = stream::iter(vec![started("a"), done("a")]).chain(stream::pending());
        let waited = tokio::time::timeout(
            Duration::from_secs(2),
            wait_for_idle(Box::pin(events), idle(0)),
        )
        .await;
        assert!(waited.is_ok());
    }

    #[test]
    fn escapes_frame_names() {
        assert_eq!(escape_attr(r#"a"b\c"#), r#"a\"b\\c"#);
        assert_eq!(escape_attr("GI_Work_Content"), "GI_Work_Content");
    }

    #[test]
    fn idle_from_config() {
        let idle = NetworkIdle::from(&BrowserConfig::default());
        assert_eq!(idle.max_inflight, 2);
        assert_eq!(idle.settle, Duration::from_millis(500));
    }
}
