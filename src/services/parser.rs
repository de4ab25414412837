// src/services/parser.rs

//! Listing fragment parser.
//!
//! Each posting is read from inside its own container element: the id marker,
//! the company and title emphasis nodes and the date marker all have to come
//! from the same container, so a missing node can never shift fields onto the
//! neighbouring posting.

use std::borrow::Cow;

use lazy_regex::regex_is_match;
use scraper::{ElementRef, Html, Selector};

use crate::error::{AppError, Result};
use crate::models::{JobPosting, MismatchPolicy, ParserConfig, SiteConfig};
use crate::services::dates::DateNormalizer;

/// Parses listing markup into postings.
pub struct ListingParser {
    site: SiteConfig,
    row: Selector,
    emphasis: Selector,
    id: Selector,
    id_attr: String,
    date: Selector,
    policy: MismatchPolicy,
    dates: DateNormalizer,
}

impl ListingParser {
    /// Compile the configured selectors.
    pub fn new(site: SiteConfig, config: &ParserConfig, dates: DateNormalizer) -> Result<Self> {
        Ok(Self {
            site,
            row: parse_selector(&config.row_selector)?,
            emphasis: parse_selector(&config.emphasis_selector)?,
            id: parse_selector(&config.id_selector)?,
            id_attr: config.id_attr.clone(),
            date: parse_selector(&config.date_selector)?,
            policy: config.on_mismatch,
            dates,
        })
    }

    /// Parse one listing page. Empty markup yields no postings.
    pub fn parse(&self, markup: &str) -> Result<Vec<JobPosting>> {
        let document = Html::parse_fragment(&with_table_context(markup));
        let mut postings = Vec::new();
        let mut claimed_ids = 0;

        for (index, row) in document.select(&self.row).enumerate() {
            let markers: Vec<ElementRef> = row.select(&self.id).collect();
            if markers.is_empty() {
                continue;
            }
            claimed_ids += markers.len();

            match self.parse_row(index, row, &markers) {
                Ok(posting) => postings.push(posting),
                Err(e) => self.on_mismatch(e)?,
            }
        }

        let all_ids = document.select(&self.id).count();
        if all_ids > claimed_ids {
            self.on_mismatch(AppError::mismatch(
                postings.len(),
                format!(
                    "{} id marker(s) outside any posting container",
                    all_ids - claimed_ids
                ),
            ))?;
        }

        Ok(postings)
    }

    fn parse_row(
        &self,
        index: usize,
        row: ElementRef<'_>,
        markers: &[ElementRef<'_>],
    ) -> Result<JobPosting> {
        if markers.len() > 1 {
            return Err(AppError::mismatch(
                index,
                format!("{} id markers in one container", markers.len()),
            ));
        }

        let id = markers[0]
            .value()
            .attr(&self.id_attr)
            .and_then(|value| value.split('|').next())
            .map(str::trim)
            .unwrap_or_default();
        if id.is_empty() {
            return Err(AppError::mismatch(
                index,
                format!("id marker has no '{}' value", self.id_attr),
            ));
        }

        let mut emphasis = row.select(&self.emphasis).map(element_text);
        let (Some(company), Some(title)) = (emphasis.next(), emphasis.next()) else {
            return Err(AppError::mismatch(
                index,
                format!("posting {id} lacks company and title"),
            ));
        };

        let registered_date = row
            .select(&self.date)
            .next()
            .map(|el| self.dates.normalize(&element_text(el)))
            .unwrap_or_default();

        Ok(JobPosting {
            url: self.site.detail_url(id)?,
            id: id.to_string(),
            company,
            title,
            registered_date,
        })
    }

    fn on_mismatch(&self, error: AppError) -> Result<()> {
        match self.policy {
            MismatchPolicy::Fail => Err(error),
            MismatchPolicy::Skip => {
                log::warn!("Skipping listing markup: {error}");
                Ok(())
            }
        }
    }
}

/// The listing endpoint may answer with bare `<tr>` rows, which the HTML
/// parser drops unless an enclosing table is open.
fn with_table_context(markup: &str) -> Cow<'_, str> {
    if regex_is_match!(r"(?i)<tr[\s>]", markup) && !regex_is_match!(r"(?i)<table[\s>]", markup) {
        Cow::Owned(format!("<table>{markup}</table>"))
    } else {
        Cow::Borrowed(markup)
    }
}

fn element_text(el: ElementRef<'_>) -> String {
    el.text()
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

fn parse_selector(s: &str) -> Result<Selector> {
    Selector::parse(s).map_err(|e| AppError::selector(s, format!("{e:?}")))
}
