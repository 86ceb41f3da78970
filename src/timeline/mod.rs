//! Interval aggregation and idle-time engine.
//!
//! [`window`] builds the slot grid for a business day, [`overlap`] measures
//! how much of a trip falls in a slot, and [`aggregate`] reduces a vehicle's
//! trips into free/busy totals and display blocks. Everything here is pure;
//! vehicles can be aggregated independently and in parallel.

pub mod aggregate;
pub mod label;
pub mod overlap;
pub mod types;
pub mod window;

pub use aggregate::{aggregate, aggregate_vehicle, infer_anchor};
pub use label::{ClockFormat, format_hour, slot_label};
pub use overlap::overlap_hours;
pub use types::{GanttPlacement, TaskBlock, Trip, TripSpan, VehicleSchedule, VehicleType};
pub use window::{Granularity, Slot, TimeWindow};
