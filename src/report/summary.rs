use crate::report::types::FleetSummary;
use crate::timeline::VehicleSchedule;

/// Arithmetic mean, `0.0` for an empty fleet.
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Population standard deviation around a known mean, `0.0` when empty.
pub fn stddev(values: &[f64], mean: f64) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / values.len() as f64;

    variance.sqrt()
}

/// Averages free time and utilisation across the fleet.
pub fn summarize(vehicles: &[VehicleSchedule]) -> FleetSummary {
    let free: Vec<f64> = vehicles.iter().map(|v| v.free_hours).collect();
    let utilization: Vec<f64> = vehicles.iter().map(VehicleSchedule::utilization_percent).collect();
    let avg_free_hours = mean(&free);

    FleetSummary {
        vehicles: vehicles.len(),
        fully_idle: vehicles.iter().filter(|v| v.is_idle()).count(),
        skipped_trips: vehicles.iter().map(|v| v.skipped_trips).sum(),
        avg_free_hours,
        stddev_free_hours: stddev(&free, avg_free_hours),
        avg_utilization_percent: mean(&utilization),
    }
}
