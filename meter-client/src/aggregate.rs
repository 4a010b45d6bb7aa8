use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::domain::{MeterSummary, Reading};

/// Which group member supplies a summary's static descriptors (name,
/// address, tariff class, coordinates, ...).
///
/// The historical dashboards silently took the first row the database
/// happened to return, which picks an arbitrary value whenever the
/// descriptors actually vary within the window. The strategy is explicit
/// here so deployments can opt into the newest row instead.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StaticFieldReducer {
    /// First reading encountered in input order wins. Matches the observed
    /// behavior of the dashboards being replaced.
    #[default]
    FirstSeen,
    /// The reading with the newest timestamp wins.
    MostRecent,
}

struct Group<'a> {
    first: &'a Reading,
    newest: &'a Reading,
    consumption_total: f64,
    reading_count: usize,
}

impl<'a> Group<'a> {
    fn into_summary(self, reducer: StaticFieldReducer) -> MeterSummary {
        let descriptors = match reducer {
            StaticFieldReducer::FirstSeen => self.first,
            StaticFieldReducer::MostRecent => self.newest,
        };
        MeterSummary {
            meter_id: descriptors.meter_id.clone(),
            consumption_total: self.consumption_total,
            reading_count: self.reading_count,
            last_reading_value: self.newest.reading_value,
            last_reading_at: Some(self.newest.ts),
            customer_id: descriptors.customer_id.clone(),
            property_id: descriptors.property_id.clone(),
            name: descriptors.name.clone(),
            address: descriptors.address.clone(),
            district: descriptors.district.clone(),
            tariff_class: descriptors.tariff_class.clone(),
            activity: descriptors.activity.clone(),
            comm_method: descriptors.comm_method.clone(),
            installed_on: descriptors.installed_on,
            latitude: descriptors.latitude,
            longitude: descriptors.longitude,
        }
    }
}

/// Collapse a window of readings into one summary per meter.
///
/// - Grouping keys on the meter identifier exactly as stored; no case or
///   whitespace normalization.
/// - `consumption_total` sums the group with missing or non-finite values
///   counting as zero, so the total over all summaries equals the total
///   over the input.
/// - The `last_reading_*` pair comes from the group's newest timestamp;
///   readings sharing that timestamp are broken arbitrarily.
/// - Rows without usable coordinates are kept; map consumers filter via
///   `MeterSummary::map_position`.
/// - Output order is unspecified. Empty input yields empty output.
pub fn aggregate(readings: &[Reading], reducer: StaticFieldReducer) -> Vec<MeterSummary> {
    let mut groups: HashMap<&str, Group<'_>> = HashMap::new();

    for r in readings {
        let g = groups.entry(r.meter_id.as_str()).or_insert_with(|| Group {
            first: r,
            newest: r,
            consumption_total: 0.0,
            reading_count: 0,
        });
        g.consumption_total += r.consumption.filter(|v| v.is_finite()).unwrap_or(0.0);
        g.reading_count += 1;
        if r.ts > g.newest.ts {
            g.newest = r;
        }
    }

    groups.into_values().map(|g| g.into_summary(reducer)).collect()
}

/// The `n` highest-consumption summaries, descending. Feeds the ranking
/// widget next to the map.
pub fn top_consumers(summaries: &[MeterSummary], n: usize) -> Vec<MeterSummary> {
    let mut ranked = summaries.to_vec();
    ranked.sort_by(|a, b| b.consumption_total.total_cmp(&a.consumption_total));
    ranked.truncate(n);
    ranked
}
