use chrono::{NaiveDate, NaiveDateTime};
use serde::Deserialize;

/// Raw record from CSV ingestion.
///
/// Every cell is kept as optional text so a bad value never rejects the row;
/// coercion happens in [`CsvRecord::to_event`].
#[derive(Debug, Default, Deserialize)]
pub struct CsvRecord {
    pub pdt: Option<String>,
    pub estimated_delivery_date: Option<String>,
    pub center_code: Option<String>,
    pub worker_id: Option<String>,
    pub region_group_code: Option<String>,
    pub delivery_completion_round: Option<String>,
    pub full_address_hash: Option<String>,
    pub org_delivery_round: Option<String>,
    pub is_delayed: Option<String>,
    pub is_misdelivered: Option<String>,
    pub box_cnt: Option<String>,
}

/// One normalized delivery row
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DeliveryEvent {
    pub pdt: Option<NaiveDateTime>,
    pub estimated_delivery_date: Option<NaiveDate>,
    pub center_code: Option<String>,
    pub worker_id: Option<String>,
    pub region_group_code: Option<String>,
    pub delivery_completion_round: i64,
    pub full_address_hash: Option<String>,
    pub org_delivery_round: i64,
    pub is_delayed: i64,
    pub is_misdelivered: i64,
    pub box_cnt: i64,
}

impl DeliveryEvent {
    pub fn delayed(&self) -> bool {
        self.is_delayed == 1
    }

    pub fn misdelivered(&self) -> bool {
        self.is_misdelivered == 1
    }

    /// Scheduled for round 1, completed on round 2.
    pub fn round_1_to_2(&self) -> bool {
        self.org_delivery_round == 1 && self.delivery_completion_round == 2
    }

    /// Scheduled for round 1, completed on round 3.
    pub fn round_1_to_3(&self) -> bool {
        self.org_delivery_round == 1 && self.delivery_completion_round == 3
    }
}

const DATE_FORMATS: [&str; 3] = ["%Y-%m-%d", "%Y/%m/%d", "%Y%m%d"];
const DATETIME_FORMATS: [&str; 4] = [
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y/%m/%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
];

/// Parse a date-time cell; bare dates become midnight. Unparsable → `None`.
pub fn parse_datetime(raw: Option<&str>) -> Option<NaiveDateTime> {
    let s = raw?.trim();
    if s.is_empty() {
        return None;
    }
    DATETIME_FORMATS
        .iter()
        .find_map(|f| NaiveDateTime::parse_from_str(s, f).ok())
        .or_else(|| {
            DATE_FORMATS
                .iter()
                .find_map(|f| NaiveDate::parse_from_str(s, f).ok())
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}

/// Parse a date cell, dropping any time component. Unparsable → `None`.
pub fn parse_date(raw: Option<&str>) -> Option<NaiveDate> {
    parse_datetime(raw).map(|dt| dt.date())
}

/// Parse an integer cell. Decimal text truncates toward zero, anything else → 0.
pub fn parse_int(raw: Option<&str>) -> i64 {
    let Some(s) = raw.map(str::trim).filter(|s| !s.is_empty()) else {
        return 0;
    };
    if let Ok(v) = s.parse::<i64>() {
        return v;
    }
    match s.parse::<f64>() {
        Ok(v) if v.is_finite() => v.trunc() as i64,
        _ => 0,
    }
}

/// Trimmed text; blank cells are missing.
pub fn parse_text(raw: Option<&str>) -> Option<String> {
    raw.map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

impl CsvRecord {
    pub fn to_event(&self) -> DeliveryEvent {
        DeliveryEvent {
            pdt: parse_datetime(self.pdt.as_deref()),
            estimated_delivery_date: parse_date(self.estimated_delivery_date.as_deref()),
            center_code: parse_text(self.center_code.as_deref()),
            worker_id: parse_text(self.worker_id.as_deref()),
            region_group_code: parse_text(self.region_group_code.as_deref()),
            delivery_completion_round: parse_int(self.delivery_completion_round.as_deref()),
            full_address_hash: parse_text(self.full_address_hash.as_deref()),
            org_delivery_round: parse_int(self.org_delivery_round.as_deref()),
            is_delayed: parse_int(self.is_delayed.as_deref()),
            is_misdelivered: parse_int(self.is_misdelivered.as_deref()),
            box_cnt: parse_int(self.box_cnt.as_deref()),
        }
    }
}
