use std::path::PathBuf;

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::NaiveDate;
use tracing::debug;

use crate::services::trip_source::TripSource;

/// Reads a saved trip table from disk. The file is returned as-is for any
/// date.
pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl TripSource for FileSource {
    async fn trips_for_date(&self, date: NaiveDate) -> Result<Vec<u8>> {
        debug!(path = %self.path.display(), %date, "Reading trip file");
        tokio::fs::read(&self.path)
            .await
            .with_context(|| format!("cannot read {}", self.path.display()))
    }
}
