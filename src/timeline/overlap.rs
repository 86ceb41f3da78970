//! Interval intersection on the window's hour axis.

/// Hours shared by a trip `[trip_start, trip_end)` and a slot
/// `[slot_start, slot_end)`.
///
/// All four values are axis hours (origin: midnight of the anchor date), so
/// an end past midnight is `> 24`. Degenerate or reversed ranges and
/// non-finite inputs yield `0.0`. The result is always within
/// `[0, min(trip_end - trip_start, slot_end - slot_start)]`.
pub fn overlap_hours(trip_start: f64, trip_end: f64, slot_start: f64, slot_end: f64) -> f64 {
    if is_malformed(trip_start, trip_end) || is_malformed(slot_start, slot_end) {
        return 0.0;
    }

    let overlap = trip_end.min(slot_end) - trip_start.max(slot_start);
    overlap.max(0.0)
}

/// True when `[start, end)` cannot contribute busy time.
pub fn is_malformed(start: f64, end: f64) -> bool {
    !start.is_finite() || !end.is_finite() || end <= start
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_trip_inside_slot() {
        assert_eq!(overlap_hours(9.25, 9.75, 9.0, 10.0), 0.5);
    }

    #[test]
    fn test_slot_inside_trip() {
        assert_eq!(overlap_hours(8.0, 12.0, 9.0, 10.0), 1.0);
    }

    #[test]
    fn test_partial_overlaps_are_clamped() {
        assert_eq!(overlap_hours(6.5, 7.5, 7.0, 8.0), 0.5);
        assert_eq!(overlap_hours(7.5, 9.0, 7.0, 8.0), 0.5);
        assert_eq!(overlap_hours(3.0, 5.0, 7.0, 8.0), 0.0);
        assert_eq!(overlap_hours(8.0, 9.0, 7.0, 8.0), 0.0);
    }

    #[test]
    fn test_degenerate_trips_contribute_nothing() {
        assert_eq!(overlap_hours(9.0, 9.0, 8.0, 10.0), 0.0);
        assert_eq!(overlap_hours(10.0, 9.0, 8.0, 11.0), 0.0);
        assert_eq!(overlap_hours(f64::NAN, 9.0, 8.0, 11.0), 0.0);
        assert_eq!(overlap_hours(8.0, f64::INFINITY, 8.0, 11.0), 0.0);
    }

    #[test]
    fn test_next_day_hours() {
        // 23:00 to 01:00 against the 00:00-01:00 slot of a window that began the day before
        assert_eq!(overlap_hours(23.0, 25.0, 24.0, 25.0), 1.0);
        assert_eq!(overlap_hours(23.0, 25.0, 23.0, 24.0), 1.0);
        assert_eq!(overlap_hours(23.0, 25.0, 22.0, 23.0), 0.0);
    }

    #[test]
    fn test_spanning_trip_shares_sum_to_duration() {
        let total: f64 = (0..24)
            .map(|h| {
                let s = f64::from(7 + h);
                overlap_hours(8.0, 10.5, s, s + 1.0)
            })
            .sum();
        assert_eq!(total, 2.5);
    }

    proptest! {
        #[test]
        fn prop_overlap_is_bounded(
            a in -48.0..72.0f64,
            b in -48.0..72.0f64,
            c in -48.0..72.0f64,
            d in -48.0..72.0f64,
        ) {
            let o = overlap_hours(a, b, c, d);
            prop_assert!(o >= 0.0);
            let bound = (b - a).min(d - c).max(0.0);
            prop_assert!(o <= bound);
        }

        #[test]
        fn prop_shares_sum_to_clamped_duration(
            start in 0.0..24.0f64,
            len in 0.0..30.0f64,
            window_start in 0u32..24,
        ) {
            let end = start + len;
            let ws = f64::from(window_start);
            let total: f64 = (0..24)
                .map(|h| {
                    let s = ws + f64::from(h);
                    overlap_hours(start, end, s, s + 1.0)
                })
                .sum();
            let expected = overlap_hours(start, end, ws, ws + 24.0);
            prop_assert!((total - expected).abs() < 1e-9);
            prop_assert!(expected <= len.min(24.0) + 1e-9);
        }
    }
}
