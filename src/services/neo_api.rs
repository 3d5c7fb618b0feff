//! Trait and types for talking to a NEO data provider.

use chrono::NaiveDate;
use serde_json::{Map, Value};

use crate::error::SyncError;
use crate::feed::RawFeed;

/// Longest span, in days, the NeoWs feed accepts in one request.
pub const MAX_FEED_SPAN_DAYS: i64 = 7;

/// Inclusive calendar range for a feed query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    start: NaiveDate,
    end: NaiveDate,
}

impl DateRange {
    /// # Errors
    ///
    /// [`SyncError::InvalidRequest`] when `end` precedes `start` or the span
    /// exceeds [`MAX_FEED_SPAN_DAYS`].
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, SyncError> {
        if end < start {
            return Err(SyncError::InvalidRequest(format!(
                "end_date {end} is before start_date {start}"
            )));
        }
        if (end - start).num_days() > MAX_FEED_SPAN_DAYS {
            return Err(SyncError::InvalidRequest(format!(
                "date range {start}..{end} exceeds {MAX_FEED_SPAN_DAYS} days"
            )));
        }
        Ok(Self { start, end })
    }

    /// Parses `YYYY-MM-DD` strings, as they arrive in request bodies.
    pub fn parse(start: &str, end: &str) -> Result<Self, SyncError> {
        let parse = |field: &str, raw: &str| {
            NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                .map_err(|e| SyncError::InvalidRequest(format!("{field} {raw:?}: {e}")))
        };
        Self::new(parse("start_date", start)?, parse("end_date", end)?)
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }
}

/// Abstraction over a NEO provider (e.g., NASA NeoWs).
#[async_trait::async_trait]
pub trait NeoApi: Send + Sync {
    /// Returns the date-grouped feed of objects approaching within `range`.
    async fn feed(&self, range: DateRange) -> Result<RawFeed, SyncError>;

    /// Returns the full, un-normalized payload for one object.
    async fn lookup(&self, id: &str) -> Result<Map<String, Value>, SyncError>;
}
