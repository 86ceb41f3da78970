//! Per-vehicle idle accounting and display grouping.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use tracing::{debug, warn};

use crate::timeline::overlap::{is_malformed, overlap_hours};
use crate::timeline::types::{BlockMember, TaskBlock, Trip, TripSpan, VehicleSchedule, VehicleType};
use crate::timeline::window::{TimeWindow, WINDOW_HOURS};

/// A trip placed on the window's hour axis.
#[derive(Debug, Clone, Copy)]
struct Projected<'a> {
    start: f64,
    end: f64,
    trip: &'a Trip,
}

/// Aggregates `trips` over `window`, taking the vehicle identity from the
/// first trip.
pub fn aggregate(trips: &[Trip], window: &TimeWindow) -> VehicleSchedule {
    let (vehicle_id, vehicle_type) = trips
        .first()
        .map(|t| (t.vehicle_id.as_str(), t.vehicle_type))
        .unwrap_or(("", VehicleType::Unknown));

    aggregate_vehicle(vehicle_id, vehicle_type, trips, window)
}

/// Aggregates one vehicle's trips over `window`.
///
/// Free time is computed from the union of the raw trips, so wall-clock time
/// booked twice is only counted once. Malformed trips (`end <= start` once
/// projected) are left out and counted in `skipped_trips`.
///
/// Timestamps are projected from midnight of the window's anchor date. An
/// unanchored window is anchored once, on [`infer_anchor`], so every trip in
/// the call shares one origin.
pub fn aggregate_vehicle(
    vehicle_id: &str,
    vehicle_type: VehicleType,
    trips: &[Trip],
    window: &TimeWindow,
) -> VehicleSchedule {
    let origin = window
        .origin()
        .or_else(|| infer_anchor(trips).map(|date| date.and_time(NaiveTime::MIN)))
        .unwrap_or_default();

    let mut projected = Vec::with_capacity(trips.len());
    let mut skipped_trips = 0;
    let mut outside_window = 0;

    for trip in trips {
        let (start, end) = project(&trip.span, origin, window);
        if is_malformed(start, end) {
            warn!(
                vehicle_id,
                schedule_no = trip.schedule_no.as_deref().unwrap_or("-"),
                start,
                end,
                "Skipping malformed trip"
            );
            skipped_trips += 1;
            continue;
        }
        if overlap_hours(start, end, window.start(), window.end()) <= 0.0 {
            outside_window += 1;
        }
        projected.push(Projected { start, end, trip });
    }

    if outside_window > 0 {
        warn!(
            vehicle_id,
            outside_window,
            origin = %origin,
            "Trips fall entirely outside the window"
        );
    }

    projected.sort_by(|a, b| {
        a.start
            .total_cmp(&b.start)
            .then(a.end.total_cmp(&b.end))
            .then_with(|| a.trip.schedule_no.cmp(&b.trip.schedule_no))
    });

    let busy = merge_overlapping(&projected);
    let per_slot_free: Vec<f64> = window
        .slots()
        .iter()
        .map(|slot| {
            let covered: f64 = busy
                .iter()
                .map(|&(start, end)| overlap_hours(start, end, slot.start, slot.end))
                .sum();
            (slot.duration() - covered).clamp(0.0, slot.duration())
        })
        .collect();

    let free_hours: f64 = per_slot_free.iter().sum();
    let total_free_hours = free_hours.round().clamp(0.0, WINDOW_HOURS) as u32;
    let grouped_tasks = group_back_to_back(&projected, window);

    debug!(
        vehicle_id,
        trips = projected.len(),
        skipped_trips,
        free_hours,
        blocks = grouped_tasks.len(),
        "Vehicle aggregated"
    );

    VehicleSchedule {
        vehicle_id: vehicle_id.to_string(),
        vehicle_type,
        per_slot_free,
        free_hours,
        busy_hours: WINDOW_HOURS - free_hours,
        total_free_hours,
        total_busy_hours: WINDOW_HOURS as u32 - total_free_hours,
        grouped_tasks,
        skipped_trips,
    }
}

/// Calendar date of the earliest timestamped trip, the anchor used when a
/// window has none. `None` when no trip carries a date.
pub fn infer_anchor(trips: &[Trip]) -> Option<NaiveDate> {
    trips
        .iter()
        .filter_map(|trip| match trip.span {
            TripSpan::Timestamps { start, .. } => Some(start),
            TripSpan::ClockHours { .. } => None,
        })
        .min()
        .map(|start| start.date())
}

/// Places a trip on the window's hour axis.
///
/// Timestamps are measured in hours from `origin`. Clock hours before the
/// window's start hour belong to the next calendar day.
pub fn project(span: &TripSpan, origin: NaiveDateTime, window: &TimeWindow) -> (f64, f64) {
    match *span {
        TripSpan::Timestamps { start, end } => (hours_since(origin, start), hours_since(origin, end)),
        TripSpan::ClockHours { start, end } => {
            let mut end = end;
            if end < start {
                end += WINDOW_HOURS;
            }
            if start < window.start() {
                (start + WINDOW_HOURS, end + WINDOW_HOURS)
            } else {
                (start, end)
            }
        }
    }
}

fn hours_since(origin: NaiveDateTime, at: NaiveDateTime) -> f64 {
    (at - origin).num_seconds() as f64 / 3600.0
}

/// Union of sorted trip intervals.
fn merge_overlapping(sorted: &[Projected<'_>]) -> Vec<(f64, f64)> {
    let mut busy: Vec<(f64, f64)> = Vec::with_capacity(sorted.len());
    for p in sorted {
        match busy.last_mut() {
            Some(last) if p.start <= last.1 => last.1 = last.1.max(p.end),
            _ => busy.push((p.start, p.end)),
        }
    }
    busy
}

/// Chains trips where one starts exactly when the previous one ends.
fn group_back_to_back(sorted: &[Projected<'_>], window: &TimeWindow) -> Vec<TaskBlock> {
    let mut blocks: Vec<TaskBlock> = Vec::new();

    for p in sorted {
        if overlap_hours(p.start, p.end, window.start(), window.end()) <= 0.0 {
            continue;
        }

        let member = BlockMember {
            start: p.start,
            end: p.end,
            schedule_no: p.trip.schedule_no.clone(),
            client: p.trip.client.clone(),
            project: p.trip.project.clone(),
        };

        match blocks.last_mut() {
            Some(block) if block.end == p.start => {
                block.end = p.end;
                block.members.push(member);
            }
            _ => blocks.push(TaskBlock {
                start: p.start,
                end: p.end,
                members: vec![member],
            }),
        }
    }

    blocks
}
