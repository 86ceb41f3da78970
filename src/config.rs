//! Configuration management

use anyhow::{Context, Result};

use crate::timeline::{ClockFormat, Granularity};

const DEFAULT_TRIPS_PATH: &str = "/calendar/trips";

/// Application settings, read from the environment (and `.env`).
#[derive(Debug, Clone)]
pub struct Settings {
    /// Hour the business day starts at (`TIMELINE_START_HOUR`)
    pub start_hour: u32,

    /// Slot size for reports (`TIMELINE_GRANULARITY`)
    pub granularity: Granularity,

    /// 12h/24h labels (`TIMELINE_CLOCK_FORMAT`)
    pub clock: ClockFormat,

    /// Scheduling backend base URL (`TIMELINE_API_URL`)
    pub api_url: Option<String>,

    /// Bearer token for the backend (`TIMELINE_API_TOKEN`)
    pub api_token: Option<String>,

    /// Path of the trip listing endpoint (`TIMELINE_TRIPS_PATH`)
    pub trips_path: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            start_hour: 0,
            granularity: Granularity::Hourly,
            clock: ClockFormat::TwentyFourHour,
            api_url: None,
            api_token: None,
            trips_path: DEFAULT_TRIPS_PATH.to_string(),
        }
    }
}

impl Settings {
    /// Load settings from environment variables
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds settings from any key lookup, so tests don't touch the process
    /// environment.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let defaults = Self::default();

        let start_hour = match lookup("TIMELINE_START_HOUR") {
            Some(raw) => {
                let hour: u32 = raw
                    .trim()
                    .parse()
                    .with_context(|| format!("TIMELINE_START_HOUR is not a number: {raw:?}"))?;
                if hour > 23 {
                    anyhow::bail!("TIMELINE_START_HOUR must be between 0 and 23 (got {hour})");
                }
                hour
            }
            None => defaults.start_hour,
        };

        let granularity = match lookup("TIMELINE_GRANULARITY") {
            Some(raw) => raw.parse().context("TIMELINE_GRANULARITY")?,
            None => defaults.granularity,
        };

        let clock = match lookup("TIMELINE_CLOCK_FORMAT") {
            Some(raw) => raw.parse().context("TIMELINE_CLOCK_FORMAT")?,
            None => defaults.clock,
        };

        let api_url = lookup("TIMELINE_API_URL")
            .filter(|s| !s.trim().is_empty())
            .map(|s| s.trim_end_matches('/').to_string());

        let api_token = lookup("TIMELINE_API_TOKEN").filter(|s| !s.is_empty());

        let trips_path = lookup("TIMELINE_TRIPS_PATH").unwrap_or(defaults.trips_path);

        Ok(Self {
            start_hour,
            granularity,
            clock,
            api_url,
            api_token,
            trips_path,
        })
    }
}
