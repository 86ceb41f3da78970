//! Output formatting and persistence for fleet reports.
//!
//! Supports log output, the truck-wise CSV table, JSON export and gzip.

use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use csv::WriterBuilder;
use flate2::Compression;
use flate2::write::GzEncoder;
use tracing::{debug, info};

use crate::report::FleetReport;
use crate::timeline::{ClockFormat, slot_label};

/// Logs a report using Rust's debug pretty-print format.
pub fn print_pretty(report: &FleetReport) {
    debug!("{:#?}", report);
}

/// Logs a report as pretty-printed JSON.
pub fn print_json(report: &FleetReport) -> Result<()> {
    info!("{}", serde_json::to_string_pretty(report)?);
    Ok(())
}

/// Header row of the truck-wise table for `report`.
pub fn table_header(report: &FleetReport, clock: ClockFormat) -> Vec<String> {
    let mut header = vec!["vehicle_id".to_string(), "vehicle_type".to_string()];
    header.extend(report.slots.iter().map(|s| slot_label(s, clock)));
    header.extend(
        [
            "free_hours",
            "busy_hours",
            "total_free_hours",
            "total_busy_hours",
            "skipped_trips",
        ]
        .map(String::from),
    );
    header
}

/// Writes the truck-wise table: one row per vehicle with the hours used in
/// every slot, then the raw and rounded totals.
pub fn write_slot_table(path: impl AsRef<Path>, report: &FleetReport, clock: ClockFormat) -> Result<()> {
    let path = path.as_ref();
    debug!(path = %path.display(), vehicles = report.vehicles.len(), "Writing slot table");

    let mut writer = WriterBuilder::new()
        .from_path(path)
        .with_context(|| format!("cannot create {}", path.display()))?;

    writer.write_record(table_header(report, clock))?;

    for vehicle in &report.vehicles {
        let mut row = vec![vehicle.vehicle_id.clone(), vehicle.vehicle_type.to_string()];
        row.extend(
            report
                .slots
                .iter()
                .zip(&vehicle.per_slot_free)
                .map(|(slot, free)| format!("{:.2}", slot.duration() - free)),
        );
        row.push(format!("{:.2}", vehicle.free_hours));
        row.push(format!("{:.2}", vehicle.busy_hours));
        row.push(vehicle.total_free_hours.to_string());
        row.push(vehicle.total_busy_hours.to_string());
        row.push(vehicle.skipped_trips.to_string());
        writer.write_record(&row)?;
    }

    writer.flush()?;
    Ok(())
}

/// Writes the whole report as pretty-printed JSON.
pub fn write_json(path: impl AsRef<Path>, report: &FleetReport) -> Result<()> {
    let path = path.as_ref();
    let file = File::create(path).with_context(|| format!("cannot create {}", path.display()))?;
    serde_json::to_writer_pretty(file, report)?;
    debug!(path = %path.display(), "Report JSON written");
    Ok(())
}

/// Compresses `path` into `<path>.gz` next to it and returns the new path.
pub fn gzip_file(path: impl AsRef<Path>) -> Result<PathBuf> {
    let path = path.as_ref();
    let contents = std::fs::read(path)?;

    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(&contents)?;
    let compressed = encoder.finish()?;

    let mut target = path.as_os_str().to_owned();
    target.push(".gz");
    let target = PathBuf::from(target);
    std::fs::write(&target, compressed)?;

    Ok(target)
}
