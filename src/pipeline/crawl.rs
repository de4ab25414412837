// src/pipeline/crawl.rs

//! Listing crawl: count, then every page in order.

use std::sync::Arc;

use chrono::Utc;
use futures::stream::{self, StreamExt, TryStreamExt};

use crate::error::{AppError, Result};
use crate::models::{Categories, Config, CrawlOutcome, JobPosting, PAGE_SIZE};
use crate::services::{DateNormalizer, ListingClient, ListingParser, ListingSource};
use crate::utils::log;

/// Run a full listing crawl against the configured site.
pub async fn run_crawler<F>(
    config: Arc<Config>,
    categories: &Categories,
    on_page: F,
) -> Result<CrawlOutcome>
where
    F: FnMut(u32, &[JobPosting]),
{
    let start_time = Utc::now();
    log::header("Job listing crawl");
    log::info(&format!("Categories: [{}]", categories.to_csv()));

    let parser = ListingParser::new(
        config.site.clone(),
        &config.parser,
        DateNormalizer::default(),
    )?;
    let client = ListingClient::new(Arc::clone(&config))?;

    let outcome = fetch_listings(
        &client,
        &parser,
        categories,
        config.crawler.max_concurrent,
        on_page,
    )
    .await?;

    let elapsed = Utc::now() - start_time;
    log::summary(
        "Crawl complete",
        &[
            ("Matching postings", outcome.total_count.to_string()),
            ("Pages fetched", outcome.page_count.to_string()),
            ("Postings parsed", outcome.postings.len().to_string()),
            ("Elapsed", format!("{}ms", elapsed.num_milliseconds())),
        ],
    );
    Ok(outcome)
}

/// Number of listing pages needed for `total` postings.
pub fn page_count(total: u64) -> u32 {
    u32::try_from(total.div_ceil(PAGE_SIZE)).unwrap_or(u32::MAX)
}

/// Fetch and parse every listing page for `categories`.
///
/// Pages are requested with at most `max_concurrent` in flight and handed to
/// `on_page` in page order, together with that page's postings. A failing
/// page aborts the crawl.
pub async fn fetch_listings<S, F>(
    source: &S,
    parser: &ListingParser,
    categories: &Categories,
    max_concurrent: usize,
    mut on_page: F,
) -> Result<CrawlOutcome>
where
    S: ListingSource + ?Sized,
    F: FnMut(u32, &[JobPosting]),
{
    let total_count = source.fetch_count(categories).await?;
    let pages = page_count(total_count);
    ::log::debug!("{total_count} postings across {pages} page(s)");

    let mut outcome = CrawlOutcome {
        total_count,
        page_count: pages,
        ..CrawlOutcome::default()
    };

    let mut page_stream = stream::iter(1..=pages)
        .map(|page| async move {
            let markup = source.fetch_page(categories, page).await?;
            Ok::<_, AppError>((page, markup))
        })
        .buffered(max_concurrent.max(1));

    while let Some((page, markup)) = page_stream.try_next().await? {
        let postings = parser.parse(&markup)?;
        log::step(page as usize, pages as usize, &format!("{} postings", postings.len()));
        on_page(page, &postings);
        outcome.postings.extend(postings);
    }

    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;

    use super::*;
    use crate::error::{AppError, ErrorKind};
    use crate::models::{ParserConfig, SiteConfig};
    use crate::services::DateNormalizer;

    /// Serves `total` postings split into pages of 40, recording requests.
    struct FakeBoard {
        total: u64,
        fail_page: Option<u32>,
        requested: Mutex<Vec<u32>>,
    }

    impl FakeBoard {
        fn new(total: u64) -> Self {
            Self {
                total,
                fail_page: None,
                requested: Mutex::new(Vec::new()),
            }
        }
    }

    fn row(id: u64) -> String {
        format!(
            r#"<tr><td><strong>회사{id}</strong><strong>공고{id}</strong>
               <span class="modifyDate">03/12(수) 등록</span></td>
               <td><button class="btnScrap" data-value="{id}|0">스크랩</button></td></tr>"#
        )
    }

    #[async_trait]
    impl ListingSource for FakeBoard {
        async fn fetch_count(&self, _categories: &Categories) -> Result<u64> {
            Ok(self.total)
        }

        async fn fetch_page(&self, _categories: &Categories, page: u32) -> Result<String> {
            self.requested.lock().unwrap().push(page);
            if self.fail_page == Some(page) {
                return Err(AppError::HttpStatus {
                    url: "https://www.gamejob.co.kr/Recruit/_GI_Job_List/".to_string(),
                    status: 500,
                });
            }
            let first = u64::from(page - 1) * PAGE_SIZE + 1;
            let last = (u64::from(page) * PAGE_SIZE).min(self.total);
            let rows: String = (first..=last).map(row).collect();
            Ok(format!("<table><tbody>{rows}</tbody></table>"))
        }
    }

    fn parser() -> ListingParser {
        ListingParser::new(
            SiteConfig::default(),
            &ParserConfig::default(),
            DateNormalizer::default(),
        )
        .unwrap()
    }

    #[test]
    fn page_count_rounds_up() {
        assert_eq!(page_count(0), 0);
        assert_eq!(page_count(1), 1);
        assert_eq!(page_count(40), 1);
        assert_eq!(page_count(41), 2);
        assert_eq!(page_count(85), 3);
    }

    #[tokio::test]
    async fn crawls_every_page_in_order() {
        let board = FakeBoard::new(85);
        let mut seen = Vec::new();
        let outcome = fetch_listings(&board, &parser(), &Categories::from(vec![16]), 1, |page, postings| {
            seen.push((page, postings.len()));
        })
        .await
        .unwrap();

        assert_eq!(outcome.total_count, 85);
        assert_eq!(outcome.page_count, 3);
        assert_eq!(*board.requested.lock().unwrap(), vec![1, 2, 3]);
        assert_eq!(seen, vec![(1, 40), (2, 40), (3, 5)]);
        assert_eq!(outcome.postings.len(), 85);
        assert_eq!(outcome.postings[0].id, "1");
        assert_eq!(outcome.postings[84].id, "85");
        assert_eq!(outcome.postings[84].registered_date, "3/12");
    }

    #[tokio::test]
    async fn concurrent_fetch_keeps_page_order() {
        let board = FakeBoard::new(200);
        let mut pages = Vec::new();
        let outcome = fetch_listings(&board, &parser(), &Categories::default(), 3, |page, _| {
            pages.push(page);
        })
        .await
        .unwrap();

        assert_eq!(pages, vec![1, 2, 3, 4, 5]);
        let ids: Vec<u64> = outcome
            .postings
            .iter()
            .map(|p| p.id.parse().unwrap())
            .collect();
        assert_eq!(ids, (1..=200).collect::<Vec<_>>());
    }

    #[tokio::test]
    async fn zero_count_fetches_nothing() {
        let board = FakeBoard::new(0);
        let outcome = fetch_listings(&board, &parser(), &Categories::default(), 1, |_, _| {})
            .await
            .unwrap();
        assert!(outcome.postings.is_empty());
        assert!(board.requested.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn failing_page_aborts_crawl() {
        let board = FakeBoard {
            fail_page: Some(2),
            ..FakeBoard::new(120)
        };
        let err = fetch_listings(&board, &parser(), &Categories::default(), 1, |_, _| {})
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Network);
        assert_eq!(*board.requested.lock().unwrap(), vec![1, 2]);
    }
}
