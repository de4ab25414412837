// src/services/dates.rs

//! Listing date normalization.
//!
//! The board prints registration dates either as `03/12(수) 등록` or relative to
//! the current day (`3일 전 등록`, `5시간 전 등록`). Both forms collapse to a
//! `month/day` string without leading zeros. Anything else becomes an empty
//! string, which callers treat as "date unknown".

use std::sync::Arc;

use chrono::{Datelike, Local, NaiveDateTime, TimeDelta};
use lazy_regex::regex_captures;

/// Source of the current local time.
pub trait Clock: Send + Sync {
    fn now(&self) -> NaiveDateTime;
}

/// Wall clock in the local timezone.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }
}

/// Clock pinned to a single instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub NaiveDateTime);

impl Clock for FixedClock {
    fn now(&self) -> NaiveDateTime {
        self.0
    }
}

/// Converts listing date text into `month/day`.
#[derive(Clone)]
pub struct DateNormalizer {
    clock: Arc<dyn Clock>,
}

impl Default for DateNormalizer {
    fn default() -> Self {
        Self::new(Arc::new(SystemClock))
    }
}

impl DateNormalizer {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self { clock }
    }

    /// Normalize one date text. Never fails; unreadable input yields `""`.
    pub fn normalize(&self, text: &str) -> String {
        if text.contains('/') {
            return Self::absolute(text).unwrap_or_default();
        }
        self.relative(text).unwrap_or_default()
    }

    fn absolute(text: &str) -> Option<String> {
        let (_, month, day) = regex_captures!(r"(\d{2})/(\d{2})", text)?;
        let month: u32 = month.parse().ok()?;
        let day: u32 = day.parse().ok()?;
        if !(1..=12).contains(&month) || !(1..=31).contains(&day) {
            return None;
        }
        Some(format!("{month}/{day}"))
    }

    fn relative(&self, text: &str) -> Option<String> {
        let now = self.clock.now();

        let offset = if let Some((_, n)) =
            regex_captures!(r"(?i)(\d+)\s*(?:일\s*전|days?\s+ago)", text)
        {
            TimeDelta::try_days(n.parse().ok()?)?
        } else if let Some((_, n)) =
            regex_captures!(r"(?i)(\d+)\s*(?:시간\s*전|hours?\s+ago)", text)
        {
            TimeDelta::try_hours(n.parse().ok()?)?
        } else if let Some((_, n)) =
            regex_captures!(r"(?i)(\d+)\s*(?:분\s*전|min(?:ute)?s?\s+ago)", text)
        {
            TimeDelta::try_minutes(n.parse().ok()?)?
        } else if regex_captures!(r"(?i)오늘|today", text).is_some() {
            TimeDelta::zero()
        } else {
            return None;
        };

        let then = now.checked_sub_signed(offset)?;
        Some(format!("{}/{}", then.month(), then.day()))
    }
}
