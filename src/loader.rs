//! CSV loading and normalization of delivery rows.

use anyhow::{bail, Context, Result};
use csv::{ReaderBuilder, Trim};
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::{info, warn};

use crate::models::{CsvRecord, DeliveryEvent};

/// Header columns every input file must carry
pub const REQUIRED_COLUMNS: [&str; 9] = [
    "estimated_delivery_date",
    "worker_id",
    "region_group_code",
    "delivery_completion_round",
    "full_address_hash",
    "org_delivery_round",
    "is_delayed",
    "is_misdelivered",
    "box_cnt",
];

const MAX_LOGGED_ERRORS: usize = 5;

/// Normalized rows plus the number of rows the reader could not decode
#[derive(Debug, Default)]
pub struct LoadedEvents {
    pub events: Vec<DeliveryEvent>,
    pub skipped: usize,
}

/// Load and normalize a deliveries CSV file
pub fn load_events(path: impl AsRef<Path>) -> Result<LoadedEvents> {
    let path = path.as_ref();
    info!("Reading CSV from {:?}", path);
    let file = File::open(path).with_context(|| format!("failed to open {}", path.display()))?;
    read_events(file).with_context(|| format!("failed to read {}", path.display()))
}

/// Read deliveries CSV from any reader.
///
/// Cell-level problems are coerced (bad dates → null, bad integers → 0);
/// rows the CSV reader itself rejects are skipped and counted.
pub fn read_events<R: Read>(reader: R) -> Result<LoadedEvents> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(Trim::Headers)
        .from_reader(reader);

    let headers = reader.headers().context("failed to read CSV header")?.clone();
    let missing: Vec<&str> = REQUIRED_COLUMNS
        .iter()
        .copied()
        .filter(|col| !headers.iter().any(|h| h == *col))
        .collect();
    if !missing.is_empty() {
        bail!("missing required columns: {}", missing.join(", "));
    }

    let mut loaded = LoadedEvents::default();
    for (i, result) in reader.deserialize::<CsvRecord>().enumerate() {
        match result {
            Ok(record) => loaded.events.push(record.to_event()),
            Err(e) => {
                if loaded.skipped < MAX_LOGGED_ERRORS {
                    warn!("Failed to parse record {}: {}", i, e);
                }
                loaded.skipped += 1;
            }
        }
    }

    if loaded.skipped > 0 {
        warn!("Skipped {} unreadable rows", loaded.skipped);
    }
    info!("Parsed {} records from CSV", loaded.events.len());

    Ok(loaded)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    const HEADER: &str = "pdt,estimated_delivery_date,center_code,worker_id,region_group_code,\
delivery_completion_round,full_address_hash,org_delivery_round,is_delayed,is_misdelivered,box_cnt\n";

    #[test]
    fn test_read_and_coerce() {
        let data = format!(
            "{HEADER}\
2024-01-01 07:00:00,2024-01-01,C1,W1,R1,1,A1,1,0,0,2\n\
bad,garbage,,W2,R1,x,A2,1,1,0,1.0\n"
        );
        let loaded = read_events(data.as_bytes()).unwrap();

        assert_eq!(loaded.skipped, 0);
        assert_eq!(loaded.events.len(), 2);

        let first = &loaded.events[0];
        assert_eq!(first.estimated_delivery_date, NaiveDate::from_ymd_opt(2024, 1, 1));
        assert!(first.pdt.is_some());
        assert_eq!(first.center_code.as_deref(), Some("C1"));

        let second = &loaded.events[1];
        assert_eq!(second.pdt, None);
        assert_eq!(second.estimated_delivery_date, None);
        assert_eq!(second.center_code, None);
        assert_eq!(second.delivery_completion_round, 0);
        assert_eq!(second.is_delayed, 1);
        assert_eq!(second.box_cnt, 1);
    }

    #[test]
    fn test_optional_columns_may_be_absent() {
        let data = "estimated_delivery_date,worker_id,region_group_code,delivery_completion_round,\
full_address_hash,org_delivery_round,is_delayed,is_misdelivered,box_cnt,extra\n\
2024-01-01,W1,R1,2,A1,1,0,1,3,ignored\n";
        let loaded = read_events(data.as_bytes()).unwrap();

        assert_eq!(loaded.events.len(), 1);
        assert_eq!(loaded.events[0].pdt, None);
        assert_eq!(loaded.events[0].is_misdelivered, 1);
        assert!(loaded.events[0].round_1_to_2());
    }

    #[test]
    fn test_undecodable_row_is_skipped_and_counted() {
        let mut data = HEADER.as_bytes().to_vec();
        data.extend_from_slice(b"2024-01-01 07:00:00,2024-01-01,C1,W1,R1,1,A1,1,0,0,2\n");
        data.extend_from_slice(b"2024-01-01 07:00:00,2024-01-01,C1,W\xff\xfe,R1,1,A2,1,0,0,2\n");
        data.extend_from_slice(b"2024-01-02 07:00:00,2024-01-02,C1,W3,R2,2,A3,1,1,0,4\n");

        let loaded = read_events(data.as_slice()).unwrap();
        assert_eq!(loaded.skipped, 1);
        assert_eq!(loaded.events.len(), 2);
        assert_eq!(loaded.events[1].worker_id.as_deref(), Some("W3"));
    }

    #[test]
    fn test_missing_required_column_is_fatal() {
        let data = "estimated_delivery_date,worker_id\n2024-01-01,W1\n";
        let err = read_events(data.as_bytes()).unwrap_err();
        assert!(err.to_string().contains("box_cnt"));
    }

    #[test]
    fn test_missing_file_is_fatal() {
        let err = load_events("does/not/exist.csv").unwrap_err();
        assert!(err.to_string().contains("does/not/exist.csv"));
    }
}
