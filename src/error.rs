//! Error types for the timeline engine.

/// Result type for timeline operations
pub type TimelineResult<T> = Result<T, TimelineError>;

/// Error type for timeline operations
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TimelineError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Invalid timestamp: {0:?}")]
    InvalidTimestamp(String),

    #[error("Unknown granularity: {0:?} (expected \"hourly\" or \"four-hour\")")]
    InvalidGranularity(String),

    #[error("Unknown clock format: {0:?} (expected \"24h\" or \"12h\")")]
    InvalidClockFormat(String),
}

impl TimelineError {
    pub fn start_hour(hour: u32) -> Self {
        TimelineError::InvalidArgument(format!("start hour {hour} is outside 0..=23"))
    }
}
