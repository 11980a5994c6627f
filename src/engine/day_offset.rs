use chrono::{Duration, NaiveDate};

/// Whole-day difference `a - b`.
///
/// With only one side known the caller's `default_diff` is returned, which
/// bar sizing uses as the minimum span; with neither side it is `0`.
/// Calendar dates carry no time of day, so the difference is already floored
/// and negative spans need no extra adjustment.
pub fn day_diff(a: Option<NaiveDate>, b: Option<NaiveDate>, default_diff: i64) -> i64 {
    match (a, b) {
        (Some(a), Some(b)) => (a - b).num_days(),
        (Some(_), None) | (None, Some(_)) => default_diff,
        (None, None) => 0,
    }
}

/// Column index of `date` relative to `origin`.
pub fn day_offset(date: NaiveDate, origin: NaiveDate) -> i64 {
    day_diff(Some(date), Some(origin), 0)
}

/// Date under a pixel offset measured from `origin`.
pub fn offset_to_date(pixel_offset: f32, cell_width: f32, origin: NaiveDate) -> NaiveDate {
    let days = (pixel_offset / cell_width).floor() as i64;
    origin + Duration::days(days)
}

pub fn days_to_pixels(days: i64, cell_width: f32) -> f32 {
    days as f32 * cell_width
}

/// Pointer travel converted to whole days, rounded to the nearest day.
pub fn pixels_to_days(delta_px: f32, cell_width: f32) -> i64 {
    (delta_px / cell_width).round() as i64
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn diff_handles_missing_sides() {
        let a = Some(date(2024, 6, 3));
        let b = Some(date(2024, 6, 1));
        assert_eq!(day_diff(a, b, 5), 2);
        assert_eq!(day_diff(b, a, 5), -2);
        assert_eq!(day_diff(a, None, 5), 5);
        assert_eq!(day_diff(None, b, 5), 5);
        assert_eq!(day_diff(None, None, 5), 0);
    }

    #[test]
    fn offsets_round_trip_for_every_day() {
        let origin = date(2024, 1, 15);
        for cell_width in [1.0_f32, 7.5, 40.0] {
            for d in date(2023, 12, 1).iter_days().take(120) {
                let px = days_to_pixels(day_offset(d, origin), cell_width);
                assert_eq!(offset_to_date(px, cell_width, origin), d);
            }
        }
    }

    #[test]
    fn offsets_are_strictly_monotonic() {
        let origin = date(2024, 3, 1);
        let days: Vec<_> = date(2024, 2, 1).iter_days().take(90).collect();
        for pair in days.windows(2) {
            assert!(day_offset(pair[0], origin) < day_offset(pair[1], origin));
        }
    }

    #[test]
    fn offset_inside_a_cell_maps_to_that_day() {
        let origin = date(2024, 1, 1);
        assert_eq!(offset_to_date(79.9, 40.0, origin), date(2024, 1, 2));
        assert_eq!(offset_to_date(-0.1, 40.0, origin), date(2023, 12, 31));
        assert_eq!(pixels_to_days(-61.0, 40.0), -2);
        assert_eq!(pixels_to_days(19.0, 40.0), 0);
    }
}
