//! Slot grid for one business day.
//!
//! Slot boundaries live on an unwrapped hour axis whose origin is midnight of
//! the anchor date, so a window starting at 22:00 has slots `[22,23)`,
//! `[23,24)`, `[24,25)` … `[45,46)`. Wall-clock hours for labels come from
//! [`Slot::clock_start`] and [`Slot::clock_end`].

use std::fmt;
use std::str::FromStr;

use chrono::{NaiveDate, NaiveDateTime};
use serde::Serialize;

use crate::error::{TimelineError, TimelineResult};

/// Length of a business day in hours.
pub const WINDOW_HOURS: f64 = 24.0;

/// Slot size of a [`TimeWindow`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Granularity {
    /// 24 slots of one hour (calendar views).
    #[default]
    Hourly,
    /// 6 slots of four hours (truck-wise report).
    FourHour,
}

impl Granularity {
    pub fn slot_hours(self) -> u32 {
        match self {
            Granularity::Hourly => 1,
            Granularity::FourHour => 4,
        }
    }

    pub fn slot_count(self) -> usize {
        (24 / self.slot_hours()) as usize
    }
}

impl FromStr for Granularity {
    type Err = TimelineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "hourly" | "1h" => Ok(Granularity::Hourly),
            "four-hour" | "four_hour" | "4h" => Ok(Granularity::FourHour),
            other => Err(TimelineError::InvalidGranularity(other.to_string())),
        }
    }
}

impl fmt::Display for Granularity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Granularity::Hourly => f.write_str("hourly"),
            Granularity::FourHour => f.write_str("four-hour"),
        }
    }
}

/// One half-open interval `[start, end)` of the window, in axis hours.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Slot {
    pub start: f64,
    pub end: f64,
}

impl Slot {
    pub fn duration(&self) -> f64 {
        self.end - self.start
    }

    /// Wall-clock hour the slot starts at, in `[0, 24)`.
    pub fn clock_start(&self) -> f64 {
        self.start.rem_euclid(WINDOW_HOURS)
    }

    /// Wall-clock hour the slot ends at, in `[0, 24)`. A slot ending at
    /// midnight reports `0.0`.
    pub fn clock_end(&self) -> f64 {
        self.end.rem_euclid(WINDOW_HOURS)
    }
}

/// A 24-hour business day starting at a configured hour.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimeWindow {
    start_hour: u32,
    granularity: Granularity,
    anchor: Option<NaiveDate>,
    slots: Vec<Slot>,
}

impl TimeWindow {
    /// Builds the slot grid starting at `start_hour`.
    ///
    /// # Errors
    ///
    /// Returns [`TimelineError::InvalidArgument`] if `start_hour` is not in
    /// `0..=23`.
    pub fn build(start_hour: u32, granularity: Granularity) -> TimelineResult<Self> {
        if start_hour > 23 {
            return Err(TimelineError::start_hour(start_hour));
        }

        let step = granularity.slot_hours();
        let slots = (0..granularity.slot_count() as u32)
            .map(|i| {
                let start = start_hour + i * step;
                Slot {
                    start: f64::from(start),
                    end: f64::from(start + step),
                }
            })
            .collect();

        Ok(Self {
            start_hour,
            granularity,
            anchor: None,
            slots,
        })
    }

    /// Pins the window to the calendar date its business day starts on.
    /// Required to place absolute timestamps exactly.
    pub fn anchored_at(mut self, date: NaiveDate) -> Self {
        self.anchor = Some(date);
        self
    }

    pub fn start_hour(&self) -> u32 {
        self.start_hour
    }

    pub fn granularity(&self) -> Granularity {
        self.granularity
    }

    pub fn anchor(&self) -> Option<NaiveDate> {
        self.anchor
    }

    pub fn slots(&self) -> &[Slot] {
        &self.slots
    }

    /// First hour of the window on the axis.
    pub fn start(&self) -> f64 {
        f64::from(self.start_hour)
    }

    /// End of the window on the axis (always `start() + 24`).
    pub fn end(&self) -> f64 {
        self.start() + WINDOW_HOURS
    }

    /// Midnight of the anchor date, the origin of the hour axis.
    pub fn origin(&self) -> Option<NaiveDateTime> {
        self.anchor.and_then(|d| d.and_hms_opt(0, 0, 0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_start_hour_covers_a_full_day() {
        for granularity in [Granularity::Hourly, Granularity::FourHour] {
            for s in 0..24 {
                let window = TimeWindow::build(s, granularity).unwrap();
                let slots = window.slots();

                assert_eq!(slots.len(), granularity.slot_count());
                assert_eq!(slots[0].start, f64::from(s));
                assert_eq!(slots.iter().map(Slot::duration).sum::<f64>(), 24.0);
                for pair in slots.windows(2) {
                    assert_eq!(pair[0].end, pair[1].start);
                }
                assert_eq!(slots.last().unwrap().end, window.end());
            }
        }
    }

    #[test]
    fn test_hourly_window_wraps_past_midnight() {
        let window = TimeWindow::build(7, Granularity::Hourly).unwrap();
        let slots = window.slots();

        assert_eq!((slots[0].clock_start(), slots[0].clock_end()), (7.0, 8.0));
        assert_eq!((slots[16].clock_start(), slots[16].clock_end()), (23.0, 0.0));
        assert_eq!((slots[17].clock_start(), slots[17].clock_end()), (0.0, 1.0));
        let last = slots.last().unwrap();
        assert_eq!((last.clock_start(), last.clock_end()), (6.0, 7.0));
        assert_eq!((last.start, last.end), (30.0, 31.0));
    }

    #[test]
    fn test_four_hour_window() {
        let window = TimeWindow::build(6, Granularity::FourHour).unwrap();
        let clock: Vec<_> = window
            .slots()
            .iter()
            .map(|s| (s.clock_start(), s.clock_end()))
            .collect();

        assert_eq!(
            clock,
            vec![
                (6.0, 10.0),
                (10.0, 14.0),
                (14.0, 18.0),
                (18.0, 22.0),
                (22.0, 2.0),
                (2.0, 6.0)
            ]
        );
    }

    #[test]
    fn test_start_hour_out_of_range() {
        let err = TimelineError::start_hour(24);
        assert_eq!(TimeWindow::build(24, Granularity::Hourly), Err(err));
        assert!(TimeWindow::build(99, Granularity::FourHour).is_err());
    }

    #[test]
    fn test_granularity_from_str() {
        assert_eq!("hourly".parse::<Granularity>(), Ok(Granularity::Hourly));
        assert_eq!("4H".parse::<Granularity>(), Ok(Granularity::FourHour));
        assert_eq!(
            "four-hour".parse::<Granularity>(),
            Ok(Granularity::FourHour)
        );
        assert!("weekly".parse::<Granularity>().is_err());
    }

    #[test]
    fn test_origin_requires_anchor() {
        let window = TimeWindow::build(7, Granularity::Hourly).unwrap();
        assert_eq!(window.origin(), None);

        let date = NaiveDate::from_ymd_opt(2024, 3, 5).unwrap();
        let window = window.anchored_at(date);
        assert_eq!(window.origin(), date.and_hms_opt(0, 0, 0));
    }
}
