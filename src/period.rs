// Billing Periods - "YYYY-MM" month keys
// The dues ledger tags every payment to a calendar month; this is the one
// time concept the domain needs, made explicit as a value type.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;

// ============================================================================
// MONTH KEY
// ============================================================================

/// A single calendar month, ordered chronologically.
///
/// Formats and parses as `"YYYY-MM"`, the same key the persistence layer
/// stores in `treasury_movements.period_key`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct MonthKey {
    pub year: i32,
    pub month: u32,
}

impl MonthKey {
    /// Build from parts; `None` when month is outside 1..=12
    pub fn from_parts(year: i32, month: u32) -> Option<Self> {
        if (1..=12).contains(&month) {
            Some(MonthKey { year, month })
        } else {
            None
        }
    }

    /// Month containing the given calendar date
    pub fn from_date(date: NaiveDate) -> Self {
        MonthKey {
            year: date.year(),
            month: date.month(),
        }
    }

    /// Parse a `"YYYY-MM"` key (longer strings such as `"2026-03-01"` are
    /// accepted and truncated to their month)
    pub fn parse(key: &str) -> Option<Self> {
        let (year_str, rest) = key.split_once('-')?;
        let month_str = rest.get(0..2)?;

        let year: i32 = year_str.parse().ok()?;
        let month: u32 = month_str.parse().ok()?;

        MonthKey::from_parts(year, month)
    }

    /// Canonical `"YYYY-MM"` form
    pub fn key(&self) -> String {
        format!("{:04}-{:02}", self.year, self.month)
    }

    /// Whether the given date falls inside this month
    pub fn contains(&self, date: NaiveDate) -> bool {
        date.year() == self.year && date.month() == self.month
    }

    /// January through `through_month` of `year`, in order
    pub fn months_through(year: i32, through_month: u32) -> Vec<MonthKey> {
        (1..=through_month.min(12))
            .map(|month| MonthKey { year, month })
            .collect()
    }
}

impl fmt::Display for MonthKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

// ============================================================================
// TESTS
// ============================================================================
