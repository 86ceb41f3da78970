//! Human-readable slot labels.

use std::str::FromStr;

use chrono::NaiveTime;
use serde::Serialize;

use crate::error::TimelineError;
use crate::timeline::window::{Slot, WINDOW_HOURS};

/// 12-hour or 24-hour clock, the user's display preference.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub enum ClockFormat {
    #[default]
    #[serde(rename = "24h")]
    TwentyFourHour,
    #[serde(rename = "12h")]
    TwelveHour,
}

impl FromStr for ClockFormat {
    type Err = TimelineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "24h" | "24" => Ok(ClockFormat::TwentyFourHour),
            "12h" | "12" => Ok(ClockFormat::TwelveHour),
            other => Err(TimelineError::InvalidClockFormat(other.to_string())),
        }
    }
}

/// Formats an axis hour as a wall-clock time, e.g. `"07:30"` or `"7:30 AM"`.
pub fn format_hour(hour: f64, clock: ClockFormat) -> String {
    let seconds = (hour.rem_euclid(WINDOW_HOURS) * 3600.0).round() as u32 % 86_400;
    let time = NaiveTime::from_num_seconds_from_midnight_opt(seconds, 0).unwrap_or(NaiveTime::MIN);

    match clock {
        ClockFormat::TwentyFourHour => time.format("%H:%M").to_string(),
        ClockFormat::TwelveHour => time.format("%-I:%M %p").to_string(),
    }
}

/// `"start - end"` label for a slot.
pub fn slot_label(slot: &Slot, clock: ClockFormat) -> String {
    format!(
        "{} - {}",
        format_hour(slot.clock_start(), clock),
        format_hour(slot.clock_end(), clock)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timeline::window::{Granularity, TimeWindow};

    #[test]
    fn test_format_hour_24h() {
        assert_eq!(format_hour(7.0, ClockFormat::TwentyFourHour), "07:00");
        assert_eq!(format_hour(10.5, ClockFormat::TwentyFourHour), "10:30");
        assert_eq!(format_hour(25.25, ClockFormat::TwentyFourHour), "01:15");
    }

    #[test]
    fn test_format_hour_12h() {
        assert_eq!(format_hour(0.0, ClockFormat::TwelveHour), "12:00 AM");
        assert_eq!(format_hour(12.0, ClockFormat::TwelveHour), "12:00 PM");
        assert_eq!(format_hour(19.5, ClockFormat::TwelveHour), "7:30 PM");
    }

    #[test]
    fn test_slot_labels_wrap() {
        let window = TimeWindow::build(22, Granularity::FourHour).unwrap();
        let labels: Vec<_> = window
            .slots()
            .iter()
            .map(|s| slot_label(s, ClockFormat::TwentyFourHour))
            .collect();

        assert_eq!(labels[0], "22:00 - 02:00");
        assert_eq!(labels[5], "18:00 - 22:00");
    }

    #[test]
    fn test_clock_format_from_str() {
        assert_eq!("12H".parse::<ClockFormat>(), Ok(ClockFormat::TwelveHour));
        assert_eq!("24h".parse::<ClockFormat>(), Ok(ClockFormat::TwentyFourHour));
        assert!("ampm".parse::<ClockFormat>().is_err());
    }
}
