//! Data types shared by the aggregation pipeline.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDateTime;
use serde::Serialize;

use crate::error::TimelineError;
use crate::timeline::window::{TimeWindow, WINDOW_HOURS};

/// Kind of equipment a trip occupies.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum VehicleType {
    TransitMixer,
    LinePump,
    BoomPump,
    #[default]
    Unknown,
}

impl VehicleType {
    /// Lenient parse of the labels the backend uses. Anything unrecognised
    /// becomes [`VehicleType::Unknown`].
    pub fn parse(label: &str) -> Self {
        match label.trim().to_ascii_lowercase().replace([' ', '-'], "_").as_str() {
            "tm" | "transit_mixer" | "mixer" => VehicleType::TransitMixer,
            "lp" | "line_pump" => VehicleType::LinePump,
            "bp" | "boom_pump" => VehicleType::BoomPump,
            _ => VehicleType::Unknown,
        }
    }
}

/// Strict counterpart of [`VehicleType::parse`] for user input: a label that
/// names no known vehicle type is an error.
impl FromStr for VehicleType {
    type Err = TimelineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match VehicleType::parse(s) {
            VehicleType::Unknown => Err(TimelineError::InvalidArgument(format!(
                "unknown vehicle type {s:?} (expected TM, LP or BP)"
            ))),
            known => Ok(known),
        }
    }
}

impl fmt::Display for VehicleType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let code = match self {
            VehicleType::TransitMixer => "TM",
            VehicleType::LinePump => "LP",
            VehicleType::BoomPump => "BP",
            VehicleType::Unknown => "-",
        };
        f.write_str(code)
    }
}

/// When a trip happens, as delivered by the data source.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TripSpan {
    /// Absolute wall-clock timestamps.
    Timestamps {
        start: NaiveDateTime,
        end: NaiveDateTime,
    },
    /// Hour-of-day floats for sources that only carry a time of day. An end
    /// earlier than the start means the trip ran past midnight.
    ClockHours { start: f64, end: f64 },
}

/// One vehicle's occupied interval.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Trip {
    pub vehicle_id: String,
    pub vehicle_type: VehicleType,
    pub span: TripSpan,
    pub client: Option<String>,
    pub project: Option<String>,
    pub schedule_no: Option<String>,
}

impl Trip {
    pub fn new(vehicle_id: impl Into<String>, span: TripSpan) -> Self {
        Self {
            vehicle_id: vehicle_id.into(),
            vehicle_type: VehicleType::Unknown,
            span,
            client: None,
            project: None,
            schedule_no: None,
        }
    }

    pub fn timed(vehicle_id: impl Into<String>, start: NaiveDateTime, end: NaiveDateTime) -> Self {
        Self::new(vehicle_id, TripSpan::Timestamps { start, end })
    }

    pub fn clock(vehicle_id: impl Into<String>, start: f64, end: f64) -> Self {
        Self::new(vehicle_id, TripSpan::ClockHours { start, end })
    }

    pub fn with_type(mut self, vehicle_type: VehicleType) -> Self {
        self.vehicle_type = vehicle_type;
        self
    }

    pub fn with_schedule_no(mut self, schedule_no: impl Into<String>) -> Self {
        self.schedule_no = Some(schedule_no.into());
        self
    }

    pub fn with_labels(mut self, client: Option<String>, project: Option<String>) -> Self {
        self.client = client;
        self.project = project;
        self
    }
}

/// A trip as placed inside a [`TaskBlock`], in axis hours.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BlockMember {
    pub start: f64,
    pub end: f64,
    pub schedule_no: Option<String>,
    pub client: Option<String>,
    pub project: Option<String>,
}

/// Back-to-back trips drawn as a single bar.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TaskBlock {
    pub start: f64,
    pub end: f64,
    pub members: Vec<BlockMember>,
}

/// Horizontal position of a bar relative to the 24-hour window.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GanttPlacement {
    pub offset_percent: f64,
    pub width_percent: f64,
}

impl TaskBlock {
    /// Bar offset and width, clipped to the window.
    pub fn placement(&self, window: &TimeWindow) -> GanttPlacement {
        let start = self.start.max(window.start());
        let end = self.end.min(window.end());

        GanttPlacement {
            offset_percent: (start - window.start()) / WINDOW_HOURS * 100.0,
            width_percent: (end - start).max(0.0) / WINDOW_HOURS * 100.0,
        }
    }
}

/// Aggregation result for one vehicle over one [`TimeWindow`].
///
/// `free_hours`/`busy_hours` keep fractional precision. `total_free_hours` is
/// `free_hours` rounded to the nearest hour and `total_busy_hours` is
/// `24 - total_free_hours`, for report display.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VehicleSchedule {
    pub vehicle_id: String,
    pub vehicle_type: VehicleType,
    pub per_slot_free: Vec<f64>,
    pub free_hours: f64,
    pub busy_hours: f64,
    pub total_free_hours: u32,
    pub total_busy_hours: u32,
    pub grouped_tasks: Vec<TaskBlock>,
    pub skipped_trips: usize,
}

impl VehicleSchedule {
    /// Hours used per slot, the figure shown in the truck-wise table.
    pub fn per_slot_busy(&self, window: &TimeWindow) -> Vec<f64> {
        window
            .slots()
            .iter()
            .zip(&self.per_slot_free)
            .map(|(slot, free)| slot.duration() - free)
            .collect()
    }

    pub fn is_idle(&self) -> bool {
        self.busy_hours <= 0.0
    }

    /// Share of the window the vehicle was busy, in percent.
    pub fn utilization_percent(&self) -> f64 {
        self.busy_hours / WINDOW_HOURS * 100.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timeline::window::Granularity;

    #[test]
    fn test_vehicle_type_parse() {
        assert_eq!(VehicleType::parse("TM"), VehicleType::TransitMixer);
        assert_eq!(VehicleType::parse("Line Pump"), VehicleType::LinePump);
        assert_eq!(VehicleType::parse("boom-pump"), VehicleType::BoomPump);
        assert_eq!(VehicleType::parse("crane"), VehicleType::Unknown);
    }

    #[test]
    fn test_vehicle_type_from_str_rejects_unknown_labels() {
        assert_eq!("bp".parse::<VehicleType>(), Ok(VehicleType::BoomPump));
        assert_eq!("Transit Mixer".parse::<VehicleType>(), Ok(VehicleType::TransitMixer));
        assert!(matches!(
            "pmp".parse::<VehicleType>(),
            Err(TimelineError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_block_placement() {
        let window = TimeWindow::build(6, Granularity::Hourly).unwrap();
        let block = TaskBlock {
            start: 12.0,
            end: 18.0,
            members: vec![],
        };
        let placement = block.placement(&window);
        assert_eq!(placement.offset_percent, 25.0);
        assert_eq!(placement.width_percent, 25.0);
    }

    #[test]
    fn test_block_placement_clips_to_window() {
        let window = TimeWindow::build(6, Granularity::Hourly).unwrap();
        let block = TaskBlock {
            start: 4.0,
            end: 9.0,
            members: vec![],
        };
        let placement = block.placement(&window);
        assert_eq!(placement.offset_percent, 0.0);
        assert_eq!(placement.width_percent, 12.5);
    }
}
