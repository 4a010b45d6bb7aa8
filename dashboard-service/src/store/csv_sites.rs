use std::{fs::File, path::Path};

use csv::StringRecord;
use meter_client::db::SiteRow;
use time::macros::format_description;
use time::Date;

use crate::sanitize::clean_numeric;

#[derive(thiserror::Error, Debug)]
pub enum CatalogError {
    #[error("failed to open site catalog: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to read site catalog: {0}")]
    Csv(#[from] csv::Error),
    #[error("site catalog is missing the '{0}' column")]
    MissingColumn(&'static str),
}

/// In-memory site catalog loaded from a CSV export of the billing sheet.
///
/// Expected header columns (by name):
/// - meter_id (required; rows with an empty or "nan" id are skipped)
/// - customer_id, property_id, name, address, district, tariff_class,
///   activity, comm_method (optional text)
/// - installed_on (optional, YYYY-MM-DD)
/// - latitude, longitude (optional; comma grouping tolerated)
pub struct CsvSiteCatalog {
    rows: Vec<SiteRow>,
}

impl CsvSiteCatalog {
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self, CatalogError> {
        let file = File::open(path.as_ref())?;
        Self::from_reader(file)
    }

    pub fn from_reader<R: std::io::Read>(reader: R) -> Result<Self, CatalogError> {
        let mut rdr = csv::Reader::from_reader(reader);
        let headers = rdr.headers()?.clone();
        if !headers.iter().any(|h| h == "meter_id") {
            return Err(CatalogError::MissingColumn("meter_id"));
        }

        let mut rows = Vec::new();
        for result in rdr.records() {
            let record = result?;
            if let Some(row) = record_to_site(&record, &headers) {
                rows.push(row);
            }
        }
        Ok(Self { rows })
    }

    pub fn rows(&self) -> &[SiteRow] {
        &self.rows
    }
}

fn parse_optional_string(s: &str) -> Option<String> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

fn record_to_site(record: &StringRecord, headers: &StringRecord) -> Option<SiteRow> {
    let get = |name: &str| -> Option<&str> {
        headers
            .iter()
            .position(|h| h == name)
            .and_then(|idx| record.get(idx))
    };

    let meter_id = get("meter_id")?.trim();
    // Sheet exports write "nan" into cells the upstream tool left blank.
    if meter_id.is_empty() || meter_id.eq_ignore_ascii_case("nan") {
        return None;
    }

    let text = |name: &str| get(name).and_then(parse_optional_string);
    let number = |name: &str| get(name).and_then(clean_numeric);

    let date_format = format_description!("[year]-[month]-[day]");
    let installed_on = get("installed_on").and_then(|s| Date::parse(s.trim(), &date_format).ok());

    Some(SiteRow {
        meter_id: meter_id.to_string(),
        customer_id: text("customer_id"),
        property_id: text("property_id"),
        name: text("name"),
        address: text("address"),
        district: text("district"),
        tariff_class: text("tariff_class"),
        activity: text("activity"),
        comm_method: text("comm_method"),
        installed_on,
        latitude: number("latitude"),
        longitude: number("longitude"),
    })
}
