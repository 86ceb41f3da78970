//! JSON parser for trip tables returned by the scheduling backend.

use anyhow::{Context, Result, bail};
use chrono::{DateTime, NaiveDateTime, NaiveTime, Timelike};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use crate::error::{TimelineError, TimelineResult};
use crate::timeline::{Trip, TripSpan, VehicleType};

/// Label used for trips whose record carries no vehicle id.
pub const UNASSIGNED_VEHICLE: &str = "unassigned";

/// A single trip row as it arrives over the wire.
///
/// Every field is optional here. Missing timestamps reject the row, a missing
/// vehicle id falls back to [`UNASSIGNED_VEHICLE`].
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TripRecord {
    #[serde(default)]
    pub vehicle_id: Option<String>,
    #[serde(default)]
    pub vehicle_type: Option<String>,
    #[serde(default)]
    pub start: Option<String>,
    #[serde(default)]
    pub end: Option<String>,
    #[serde(default)]
    pub client: Option<String>,
    #[serde(default)]
    pub project: Option<String>,
    #[serde(default)]
    pub schedule_no: Option<String>,
}

impl TripRecord {
    /// The vehicle id, or [`UNASSIGNED_VEHICLE`] when it is missing or blank.
    pub fn vehicle_label(&self) -> &str {
        self.vehicle_id
            .as_deref()
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .unwrap_or(UNASSIGNED_VEHICLE)
    }
}

/// A record that could not be turned into a [`Trip`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SkippedRecord {
    pub index: usize,
    pub vehicle_id: String,
    pub schedule_no: Option<String>,
    pub reason: String,
}

/// Trips decoded from one payload, plus the rows that were rejected.
#[derive(Debug, Default, Clone)]
pub struct ParsedTrips {
    pub trips: Vec<Trip>,
    pub skipped: Vec<SkippedRecord>,
}

impl ParsedTrips {
    fn reject(&mut self, index: usize, vehicle_id: &str, schedule_no: Option<String>, reason: String) {
        warn!(index, vehicle_id, reason = %reason, "Skipping unreadable trip record");
        self.skipped.push(SkippedRecord {
            index,
            vehicle_id: vehicle_id.to_string(),
            schedule_no,
            reason,
        });
    }
}

/// One endpoint of a trip.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TimePoint {
    At(NaiveDateTime),
    ClockHour(f64),
}

/// Decodes a JSON trip payload, either a bare array or `{ "data": [...] }`.
///
/// Rows that cannot be read (bad or missing timestamps, wrongly typed fields)
/// are reported in [`ParsedTrips::skipped`] instead of failing the whole
/// payload.
///
/// # Errors
///
/// Returns an error if the bytes are not JSON or not shaped like a trip table.
pub fn parse_trips(bytes: &[u8]) -> Result<ParsedTrips> {
    let payload: Value = serde_json::from_slice(bytes).context("trip payload is not valid JSON")?;

    let rows = match payload {
        Value::Array(rows) => rows,
        Value::Object(mut fields) => match fields.remove("data") {
            Some(Value::Array(rows)) => rows,
            Some(other) => bail!("trip payload `data` must be an array, got {}", json_kind(&other)),
            None => bail!("trip payload object has no `data` array"),
        },
        other => bail!(
            "trip payload must be an array or an object with `data`, got {}",
            json_kind(&other)
        ),
    };
    debug!(records = rows.len(), "Trip payload decoded");

    Ok(convert_rows(rows))
}

/// Decodes each row on its own, keeping the index of every rejected row.
pub fn convert_rows(rows: Vec<Value>) -> ParsedTrips {
    let mut parsed = ParsedTrips::default();

    for (index, row) in rows.into_iter().enumerate() {
        let vehicle_id = row
            .get("vehicleId")
            .and_then(Value::as_str)
            .filter(|id| !id.trim().is_empty())
            .unwrap_or(UNASSIGNED_VEHICLE)
            .to_string();

        match serde_json::from_value::<TripRecord>(row) {
            Ok(record) => convert_record(&mut parsed, index, record),
            Err(e) => parsed.reject(index, &vehicle_id, None, e.to_string()),
        }
    }

    parsed
}

fn convert_record(parsed: &mut ParsedTrips, index: usize, record: TripRecord) {
    match to_trip(&record) {
        Ok(trip) => parsed.trips.push(trip),
        Err(e) => {
            let vehicle_id = record.vehicle_label().to_string();
            parsed.reject(index, &vehicle_id, record.schedule_no, e.to_string());
        }
    }
}

fn to_trip(record: &TripRecord) -> TimelineResult<Trip> {
    let start = required(record.start.as_deref(), "start")?;
    let end = required(record.end.as_deref(), "end")?;

    let span = match (parse_timestamp(start)?, parse_timestamp(end)?) {
        (TimePoint::At(start), TimePoint::At(end)) => TripSpan::Timestamps { start, end },
        (TimePoint::ClockHour(start), TimePoint::ClockHour(end)) => TripSpan::ClockHours { start, end },
        _ => {
            return Err(TimelineError::InvalidTimestamp(format!(
                "{start} / {end} mix a date-time with a time of day"
            )));
        }
    };

    let vehicle_type = record
        .vehicle_type
        .as_deref()
        .map(VehicleType::parse)
        .unwrap_or_default();

    let trip = Trip::new(record.vehicle_label(), span)
        .with_type(vehicle_type)
        .with_labels(record.client.clone(), record.project.clone());

    Ok(match record.schedule_no.as_deref() {
        Some(no) => trip.with_schedule_no(no),
        None => trip,
    })
}

fn required<'a>(value: Option<&'a str>, field: &str) -> TimelineResult<&'a str> {
    value.ok_or_else(|| TimelineError::InvalidTimestamp(format!("missing {field}")))
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
];

const TIME_FORMATS: &[&str] = &["%H:%M:%S%.f", "%H:%M"];

/// Reads an RFC 3339 timestamp, a naive ISO-8601 date-time or a bare time of
/// day. Offsets are dropped in favour of the wall-clock time they carry.
pub fn parse_timestamp(raw: &str) -> TimelineResult<TimePoint> {
    let raw = raw.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Ok(TimePoint::At(dt.naive_local()));
    }

    for fmt in NAIVE_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Ok(TimePoint::At(dt));
        }
    }

    for fmt in TIME_FORMATS {
        if let Ok(t) = NaiveTime::parse_from_str(raw, fmt) {
            let hours = f64::from(t.num_seconds_from_midnight()) / 3600.0;
            return Ok(TimePoint::ClockHour(hours));
        }
    }

    Err(TimelineError::InvalidTimestamp(raw.to_string()))
}
