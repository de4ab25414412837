// src/services/listings.rs

//! Listing endpoint client.
//!
//! Talks to the board's two AJAX endpoints: one answering how many postings
//! match a category filter, one returning a page of postings as an HTML
//! fragment.

use std::sync::Arc;

use async_trait::async_trait;
use url::form_urlencoded;

use crate::error::{AppError, Result};
use crate::models::{Categories, Config, PAGE_SIZE};
use crate::utils::http;

/// Anything that can answer listing count and page requests.
#[async_trait]
pub trait ListingSource: Send + Sync {
    /// Total number of postings matching `categories`.
    async fn fetch_count(&self, categories: &Categories) -> Result<u64>;

    /// Raw markup of one listing page (1-based).
    async fn fetch_page(&self, categories: &Categories, page: u32) -> Result<String>;
}

/// Form body for the count endpoint.
pub fn count_form(categories: &Categories) -> String {
    form_urlencoded::Serializer::new(String::new())
        .append_pair("condition[duty]", &categories.to_csv())
        .append_pair("condition[menucode]", "duty")
        .append_pair("condition[tabcode]", "1")
        .finish()
}

/// Form body for the listing endpoint.
pub fn page_form(categories: &Categories, page: u32) -> String {
    form_urlencoded::Serializer::new(String::new())
        .append_pair("page", &page.to_string())
        .append_pair("condition[duty]", &categories.to_csv())
        .append_pair("condition[menucode]", "")
        .append_pair("condition[tabcode]", "1")
        .append_pair("direct", "0")
        .append_pair("order", "3")
        .append_pair("pagesize", &PAGE_SIZE.to_string())
        .append_pair("tabcode", "1")
        .finish()
}

/// Interpret the count endpoint's plain-text answer.
pub fn parse_count(body: &str) -> Result<u64> {
    let trimmed = body.trim();
    trimmed
        .parse::<u64>()
        .map_err(|e| AppError::parse("count response", format!("{trimmed:?}: {e}")))
}

/// HTTP client for the listing endpoints.
pub struct ListingClient {
    config: Arc<Config>,
    client: reqwest::Client,
}

impl ListingClient {
    /// Create a new listing client with the given configuration.
    pub fn new(config: Arc<Config>) -> Result<Self> {
        let client = http::create_async_client(&config.crawler)?;
        Ok(Self { config, client })
    }

    /// Reuse an existing HTTP client.
    pub fn with_client(config: Arc<Config>, client: reqwest::Client) -> Self {
        Self { config, client }
    }

    async fn post(&self, url: &str, body: String) -> Result<String> {
        let secs = self.config.crawler.timeout_secs;
        let response = self
            .client
            .post(url)
            .body(body)
            .send()
            .await
            .map_err(|e| AppError::request(url, secs, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(AppError::HttpStatus {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        response
            .text()
            .await
            .map_err(|e| AppError::request(url, secs, e))
    }
}

#[async_trait]
impl ListingSource for ListingClient {
    async fn fetch_count(&self, categories: &Categories) -> Result<u64> {
        let url = self.config.site.count_url();
        log::debug!("Counting postings for categories [{}]", categories.to_csv());
        let body = self.post(&url, count_form(categories)).await?;
        parse_count(&body)
    }

    async fn fetch_page(&self, categories: &Categories, page: u32) -> Result<String> {
        let url = self.config.site.list_url();
        log::debug!("Fetching listing page {page}");
        self.post(&url, page_form(categories, page)).await
    }
}

#[cfg(test)]
mod tests {
    use std::net::SocketAddr;
    use std::sync::Mutex;
    use std::time::Duration;

    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::{TcpListener, TcpStream};

    use super::*;
    use crate::error::ErrorKind;

    #[derive(Clone, Copy)]
    enum Reply {
        Status(u16, &'static str),
        Stall,
    }

    /// Loopback board answering every request with `reply`.
    async fn serve(reply: Reply) -> (SocketAddr, Arc<Mutex<Vec<String>>>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let requests = Arc::new(Mutex::new(Vec::new()));
        let seen = Arc::clone(&requests);
        tokio::spawn(async move {
            while let Ok((mut socket, _)) = listener.accept().await {
                let seen = Arc::clone(&seen);
                tokio::spawn(async move {
                    let request = read_request(&mut socket).await;
                    seen.lock().unwrap().push(request);
                    match reply {
                        Reply::Status(status, body) => {
                            let response = format!(
                                "HTTP/1.1 {status} {}\r\n\
                                 Content-Type: text/html; charset=utf-8\r\n\
                                 Content-Length: {}\r\n\
                                 Connection: close\r\n\r\n{body}",
                                if status == 200 { "OK" } else { "Error" },
                                body.len()
                            );
                            let _ = socket.write_all(response.as_bytes()).await;
                            let _ = socket.shutdown().await;
                        }
                        Reply::Stall => tokio::time::sleep(Duration::from_secs(30)).await,
                    }
                });
            }
        });
        (addr, requests)
    }

    async fn read_request(socket: &mut TcpStream) -> String {
        let mut buf = Vec::new();
        let mut chunk = [0u8; 1024];
        loop {
            let n = socket.read(&mut chunk).await.unwrap_or(0);
            if n == 0 {
                break;
            }
            buf.extend_from_slice(&chunk[..n]);
            let text = String::from_utf8_lossy(&buf);
            if let Some(head_end) = text.find("\r\n\r\n") {
                let length = text[..head_end]
                    .lines()
                    .find_map(|line| {
                        let line = line.to_ascii_lowercase();
                        line.strip_prefix("content-length:")
                            .and_then(|v| v.trim().parse::<usize>().ok())
                    })
                    .unwrap_or(0);
                if buf.len() >= head_end + 4 + length {
                    break;
                }
            }
        }
        String::from_utf8_lossy(&buf).into_owned()
    }

    fn client_for(addr: SocketAddr, timeout_secs: u64) -> ListingClient {
        let mut config = Config::default();
        config.site.base_url = format!("http://{addr}");
        config.crawler.timeout_secs = timeout_secs;
        let client = reqwest::Client::builder()
            .no_proxy()
            .timeout(Duration::from_secs(timeout_secs))
            .default_headers(http::ajax_headers())
            .build()
            .unwrap();
        ListingClient::with_client(Arc::new(config), client)
    }

    #[tokio::test]
    async fn count_posts_form_and_reads_number() {
        let (addr, requests) = serve(Reply::Status(200, "85\n")).await;
        let count = client_for(addr, 5)
            .fetch_count(&Categories::from(vec![16, 17]))
            .await
            .unwrap();
        assert_eq!(count, 85);

        let requests = requests.lock().unwrap();
        let request = &requests[0];
        assert!(request.starts_with("POST /Recruit/_SearchCount/ HTTP/1.1"));
        assert!(request.to_ascii_lowercase().contains("x-requested-with: xmlhttprequest"));
        assert!(request.ends_with(
            "condition%5Bduty%5D=16%2C17&condition%5Bmenucode%5D=duty&condition%5Btabcode%5D=1"
        ));
    }

    #[tokio::test]
    async fn page_returns_raw_markup() {
        let markup = "<tr><td><strong>A</strong></td></tr>";
        let (addr, requests) = serve(Reply::Status(200, markup)).await;
        let body = client_for(addr, 5)
            .fetch_page(&Categories::from(vec![16]), 3)
            .await
            .unwrap();
        assert_eq!(body, markup);
        assert!(requests.lock().unwrap()[0].contains("page=3&"));
    }

    #[tokio::test]
    async fn error_status_is_network_error() {
        let (addr, _) = serve(Reply::Status(500, "oops")).await;
        let err = client_for(addr, 5)
            .fetch_count(&Categories::from(vec![16]))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Network);
        assert!(matches!(err, AppError::HttpStatus { status: 500, .. }));
    }

    #[tokio::test]
    async fn stalled_reply_is_timeout() {
        let (addr, _) = serve(Reply::Stall).await;
        let err = client_for(addr, 1)
            .fetch_page(&Categories::from(vec![16]), 1)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Timeout);
    }

    #[tokio::test]
    async fn non_numeric_count_is_parse_error() {
        let (addr, _) = serve(Reply::Status(200, "abc")).await;
        let err = client_for(addr, 5)
            .fetch_count(&Categories::from(vec![16]))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Parse);
    }

    #[test]
    fn count_form_matches_wire_format() {
        let categories = Categories::from(vec![16, 17]);
        assert_eq!(
            count_form(&categories),
            "condition%5Bduty%5D=16%2C17&condition%5Bmenucode%5D=duty&condition%5Btabcode%5D=1"
        );
    }

    #[test]
    fn page_form_matches_wire_format() {
        let categories = Categories::from(vec![16]);
        assert_eq!(
            page_form(&categories, 2),
            "page=2&condition%5Bduty%5D=16&condition%5Bmenucode%5D=&condition%5Btabcode%5D=1\
             &direct=0&order=3&pagesize=40&tabcode=1"
        );
    }

    #[test]
    fn parse_count_accepts_padded_number() {
        assert_eq!(parse_count(" 85\r\n").unwrap(), 85);
        assert_eq!(parse_count("0").unwrap(), 0);
    }

    #[test]
    fn parse_count_rejects_markup() {
        let err = parse_count("<html>error</html>").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Parse);
        assert!(parse_count("").is_err());
        assert!(parse_count("-3").is_err());
    }
}
