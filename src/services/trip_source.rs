//! Trait for anything that can hand over a day's trip table.

use anyhow::Result;
use chrono::NaiveDate;

/// Abstraction over a trip-data provider (the scheduling backend, a file).
///
/// Implementations return the raw JSON payload; decoding happens in
/// [`crate::parser::parse_trips`] so every source shares one parser.
#[async_trait::async_trait]
pub trait TripSource: Send + Sync {
    /// Returns the trip table for the business day starting on `date`.
    async fn trips_for_date(&self, date: NaiveDate) -> Result<Vec<u8>>;
}
