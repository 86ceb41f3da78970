//! Data types produced by the report pipeline.

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;

use crate::parser::SkippedRecord;
use crate::timeline::{Granularity, Slot, VehicleSchedule};

/// Fleet-wide averages over one report.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FleetSummary {
    pub vehicles: usize,
    pub fully_idle: usize,
    pub skipped_trips: usize,
    pub avg_free_hours: f64,
    pub stddev_free_hours: f64,
    pub avg_utilization_percent: f64,
}

/// Every vehicle's schedule for one business day, ready for export.
#[derive(Debug, Clone, Serialize)]
pub struct FleetReport {
    pub schema_version: u8,
    pub generated_at: DateTime<Utc>,
    pub date: Option<NaiveDate>,
    pub start_hour: u32,
    pub granularity: Granularity,
    pub slots: Vec<Slot>,
    pub vehicles: Vec<VehicleSchedule>,
    pub skipped_records: Vec<SkippedRecord>,
    pub summary: FleetSummary,
}

impl FleetReport {
    pub fn vehicle(&self, vehicle_id: &str) -> Option<&VehicleSchedule> {
        self.vehicles.iter().find(|v| v.vehicle_id == vehicle_id)
    }
}
