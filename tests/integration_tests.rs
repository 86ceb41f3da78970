use chrono::NaiveDate;
use mixer_timeline::TimelineError;
use mixer_timeline::parser::parse_trips;
use mixer_timeline::report::{ReportFilter, build_report};
use mixer_timeline::timeline::{Granularity, TimeWindow, VehicleType};

fn window(start_hour: u32) -> TimeWindow {
    TimeWindow::build(start_hour, Granularity::Hourly)
        .unwrap()
        .anchored_at(NaiveDate::from_ymd_opt(2024, 6, 10).unwrap())
}

#[test]
fn test_full_pipeline() {
    let bytes = include_bytes!("fixtures/sample_trips.json");
    let parsed = parse_trips(bytes).expect("Failed to parse trips");
    let report = build_report(parsed, &window(7), &ReportFilter::default());

    assert_eq!(report.vehicles.len(), 5);
    assert_eq!(report.skipped_records.len(), 1);
    assert_eq!(report.summary.skipped_trips, 1);

    // one trip 08:00-10:30 on a day starting at 07:00
    let tm1 = report.vehicle("TM-01").unwrap();
    assert_eq!(&tm1.per_slot_free[..4], &[1.0, 0.0, 0.0, 0.5]);
    assert_eq!(tm1.free_hours, 21.5);
    assert_eq!(tm1.total_free_hours, 22);
    assert_eq!(tm1.total_busy_hours, 2);

    // back-to-back trips become one bar
    let tm2 = report.vehicle("TM-02").unwrap();
    assert_eq!(tm2.grouped_tasks.len(), 1);
    assert_eq!(
        (tm2.grouped_tasks[0].start, tm2.grouped_tasks[0].end),
        (9.0, 11.0)
    );
    assert_eq!(tm2.total_free_hours, 22);

    // overlapping trips: 09:00-12:00 busy once
    let tm3 = report.vehicle("TM-03").unwrap();
    assert_eq!(tm3.free_hours, 21.0);
    assert_eq!(tm3.total_free_hours, 21);

    // the pump runs past midnight into the next calendar day
    let bp1 = report.vehicle("BP-01").unwrap();
    assert_eq!(bp1.vehicle_type, VehicleType::BoomPump);
    assert_eq!(bp1.per_slot_free[16], 0.0);
    assert_eq!(bp1.per_slot_free[17], 0.0);
    assert_eq!(bp1.free_hours, 22.0);

    // one reversed trip, one unreadable record: nothing busy
    let lp1 = report.vehicle("LP-01").unwrap();
    assert_eq!(lp1.skipped_trips, 1);
    assert_eq!(lp1.total_free_hours, 24);
    assert!(lp1.grouped_tasks.is_empty());
}

#[test]
fn test_pump_filter() {
    let bytes = include_bytes!("fixtures/sample_trips.json");
    let filter = ReportFilter {
        vehicle_type: Some(VehicleType::BoomPump),
        roster: vec![],
    };
    let report = build_report(parse_trips(bytes).unwrap(), &window(7), &filter);

    assert_eq!(report.vehicles.len(), 1);
    let placement = report.vehicles[0].grouped_tasks[0].placement(&window(7));
    // 23:00 is 16 hours into a day that starts at 07:00
    assert!((placement.offset_percent - 16.0 / 24.0 * 100.0).abs() < 1e-9);
    assert!((placement.width_percent - 2.0 / 24.0 * 100.0).abs() < 1e-9);
}

#[test]
fn test_report_is_reproducible() {
    let bytes = include_bytes!("fixtures/sample_trips.json");
    let first = build_report(parse_trips(bytes).unwrap(), &window(5), &ReportFilter::default());
    let second = build_report(parse_trips(bytes).unwrap(), &window(5), &ReportFilter::default());

    assert_eq!(first.vehicles, second.vehicles);
    assert_eq!(first.summary, second.summary);
}

#[test]
fn test_invalid_start_hour() {
    let err = TimeWindow::build(24, Granularity::Hourly).unwrap_err();
    assert!(matches!(err, TimelineError::InvalidArgument(_)));
}
