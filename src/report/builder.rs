use std::collections::BTreeMap;

use chrono::Utc;
use tracing::{debug, info};

use crate::parser::ParsedTrips;
use crate::report::summary::summarize;
use crate::report::types::FleetReport;
use crate::timeline::{TimeWindow, Trip, VehicleType, aggregate_vehicle, infer_anchor};

const SCHEMA_VERSION: u8 = 1;

/// A vehicle that must appear in the report even without trips.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RosterVehicle {
    pub vehicle_id: String,
    pub vehicle_type: VehicleType,
}

/// Which vehicles a report covers.
#[derive(Debug, Clone, Default)]
pub struct ReportFilter {
    /// Keep only this kind of vehicle.
    pub vehicle_type: Option<VehicleType>,
    pub roster: Vec<RosterVehicle>,
}

impl ReportFilter {
    fn admits(&self, vehicle_type: VehicleType) -> bool {
        self.vehicle_type.is_none_or(|t| t == vehicle_type)
    }
}

/// Aggregates every vehicle in `parsed` over `window`.
///
/// Vehicles are reported in id order. Rostered vehicles without trips get a
/// fully idle schedule. Records the parser rejected are carried over so the
/// caller can show a data-quality warning.
///
/// An unanchored window is anchored on the earliest trip date of the whole
/// fleet, so every vehicle is measured against the same day.
pub fn build_report(parsed: ParsedTrips, window: &TimeWindow, filter: &ReportFilter) -> FleetReport {
    let window = match (window.anchor(), infer_anchor(&parsed.trips)) {
        (None, Some(date)) => {
            info!(%date, "No report date given, anchoring on the earliest trip");
            window.clone().anchored_at(date)
        }
        _ => window.clone(),
    };

    let mut per_vehicle: BTreeMap<String, (VehicleType, Vec<Trip>)> = BTreeMap::new();

    for vehicle in &filter.roster {
        per_vehicle
            .entry(vehicle.vehicle_id.clone())
            .or_insert_with(|| (vehicle.vehicle_type, Vec::new()));
    }

    for trip in parsed.trips {
        let entry = per_vehicle
            .entry(trip.vehicle_id.clone())
            .or_insert_with(|| (VehicleType::Unknown, Vec::new()));
        if entry.0 == VehicleType::Unknown {
            entry.0 = trip.vehicle_type;
        }
        entry.1.push(trip);
    }

    let vehicles: Vec<_> = per_vehicle
        .into_iter()
        .filter(|(_, (vehicle_type, _))| filter.admits(*vehicle_type))
        .map(|(vehicle_id, (vehicle_type, trips))| {
            debug!(vehicle_id = %vehicle_id, trips = trips.len(), "Aggregating vehicle");
            aggregate_vehicle(&vehicle_id, vehicle_type, &trips, &window)
        })
        .collect();

    let summary = summarize(&vehicles);
    info!(
        vehicles = summary.vehicles,
        fully_idle = summary.fully_idle,
        skipped_records = parsed.skipped.len(),
        skipped_trips = summary.skipped_trips,
        "Fleet report built"
    );

    FleetReport {
        schema_version: SCHEMA_VERSION,
        generated_at: Utc::now(),
        date: window.anchor(),
        start_hour: window.start_hour(),
        granularity: window.granularity(),
        slots: window.slots().to_vec(),
        vehicles,
        skipped_records: parsed.skipped,
        summary,
    }
}
