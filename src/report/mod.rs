//! Fleet-level reports.
//!
//! Splits a day's trips per vehicle, runs the timeline engine for each one and
//! summarises the fleet for the calendar views and the truck-wise table.

pub mod builder;
pub mod summary;
pub mod types;

pub use builder::{ReportFilter, RosterVehicle, build_report};
pub use types::{FleetReport, FleetSummary};
