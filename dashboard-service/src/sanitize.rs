use meter_client::domain::Reading;

/// Parse a numeric field that may carry comma grouping or placeholder text,
/// as the catalog exports do ("1,234.5", "nan", "").
///
/// Returns `None` for empty, non-numeric, or non-finite input; downstream
/// code never re-checks.
pub fn clean_numeric(raw: &str) -> Option<f64> {
    let cleaned = raw.replace(',', "");
    let cleaned = cleaned.trim();
    if cleaned.is_empty() || cleaned.eq_ignore_ascii_case("nan") {
        return None;
    }
    cleaned.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Normalize one joined row before it reaches aggregation.
///
/// Rules:
/// - negative or non-finite consumption becomes `None` (meter rollovers and
///   telemetry glitches must not subtract from window totals),
/// - non-finite register values become `None`,
/// - a coordinate pair with any non-finite member is dropped whole; the
///   row itself is always kept.
pub fn sanitize_reading(mut r: Reading) -> Reading {
    if let Some(c) = r.consumption {
        if !c.is_finite() || c < 0.0 {
            r.consumption = None;
        }
    }
    if let Some(v) = r.reading_value {
        if !v.is_finite() {
            r.reading_value = None;
        }
    }
    let coords_usable = matches!(
        (r.latitude, r.longitude),
        (Some(lat), Some(lon)) if lat.is_finite() && lon.is_finite()
    );
    if !coords_usable {
        r.latitude = None;
        r.longitude = None;
    }
    r
}

/// Sanitize a whole window, counting what was cleaned.
pub fn sanitize_all(rows: Vec<Reading>) -> Vec<Reading> {
    let mut cleaned_consumption: u64 = 0;
    let mut cleaned_coords: u64 = 0;

    let out: Vec<Reading> = rows
        .into_iter()
        .map(|r| {
            let had_consumption = r.consumption.is_some();
            let had_coords = r.latitude.is_some() || r.longitude.is_some();
            let r = sanitize_reading(r);
            if had_consumption && r.consumption.is_none() {
                cleaned_consumption += 1;
            }
            if had_coords && r.latitude.is_none() {
                cleaned_coords += 1;
            }
            r
        })
        .collect();

    if cleaned_consumption > 0 {
        metrics::counter!("sanitize_consumption_cleaned_total").increment(cleaned_consumption);
        tracing::debug!(count = cleaned_consumption, "cleaned unusable consumption values");
    }
    if cleaned_coords > 0 {
        metrics::counter!("sanitize_coordinates_cleaned_total").increment(cleaned_coords);
        tracing::debug!(count = cleaned_coords, "cleaned unusable coordinates");
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    fn reading(consumption: Option<f64>) -> Reading {
        Reading {
            meter_id: "m-1".to_string(),
            ts: datetime!(2026-02-01 00:00:00 UTC),
            consumption,
            reading_value: None,
            customer_id: None,
            property_id: None,
            name: None,
            address: None,
            district: None,
            tariff_class: None,
            activity: None,
            comm_method: None,
            installed_on: None,
            latitude: None,
            longitude: None,
        }
    }

    #[test]
    fn clean_numeric_strips_comma_grouping() {
        assert_eq!(clean_numeric("1,234.5"), Some(1234.5));
        assert_eq!(clean_numeric(" 42 "), Some(42.0));
        assert_eq!(clean_numeric("-0.5"), Some(-0.5));
    }

    #[test]
    fn clean_numeric_rejects_placeholders_and_garbage() {
        assert_eq!(clean_numeric(""), None);
        assert_eq!(clean_numeric("   "), None);
        assert_eq!(clean_numeric("nan"), None);
        assert_eq!(clean_numeric("NaN"), None);
        assert_eq!(clean_numeric("sin dato"), None);
    }

    #[test]
    fn negative_consumption_is_cleaned_to_null() {
        let r = sanitize_reading(reading(Some(-3.0)));
        assert_eq!(r.consumption, None);
        // Zero is a real value, not a glitch.
        let r = sanitize_reading(reading(Some(0.0)));
        assert_eq!(r.consumption, Some(0.0));
    }

    #[test]
    fn non_finite_values_are_cleaned_to_null() {
        let mut raw = reading(Some(f64::NAN));
        raw.reading_value = Some(f64::INFINITY);
        let r = sanitize_reading(raw);
        assert_eq!(r.consumption, None);
        assert_eq!(r.reading_value, None);
    }

    #[test]
    fn half_missing_coordinates_are_dropped_whole() {
        let mut raw = reading(Some(1.0));
        raw.latitude = Some(21.88);
        let r = sanitize_reading(raw);
        assert_eq!(r.latitude, None);
        assert_eq!(r.longitude, None);

        let mut raw = reading(Some(1.0));
        raw.latitude = Some(21.88);
        raw.longitude = Some(f64::NAN);
        let r = sanitize_reading(raw);
        assert_eq!(r.latitude, None);
        assert_eq!(r.longitude, None);
    }

    #[test]
    fn usable_rows_pass_through_unchanged() {
        let mut raw = reading(Some(2.5));
        raw.reading_value = Some(120.0);
        raw.latitude = Some(21.88);
        raw.longitude = Some(-102.29);
        let r = sanitize_reading(raw.clone());
        assert_eq!(r.consumption, raw.consumption);
        assert_eq!(r.reading_value, raw.reading_value);
        assert_eq!(r.latitude, raw.latitude);
        assert_eq!(r.longitude, raw.longitude);
    }

    #[test]
    fn sanitize_all_keeps_every_row() {
        let rows = vec![reading(Some(-1.0)), reading(None), reading(Some(3.0))];
        let out = sanitize_all(rows);
        assert_eq!(out.len(), 3);
        let total: f64 = out.iter().filter_map(|r| r.consumption).sum();
        assert_eq!(total, 3.0);
    }
}
