//! Identity of a logical order.
//!
//! Raw rows are not one-per-order: the same order can appear several times
//! (one row per box, re-scans, ...). An order is identified by the tuple
//! `(estimated_delivery_date, worker_id, region_group_code,
//! delivery_completion_round, full_address_hash)` compared structurally.

use chrono::NaiveDate;
use std::fmt::Write;

use crate::models::DeliveryEvent;

/// Sentinel written for a missing estimated delivery date
pub const NULL_DATE: &str = "NaT";
/// Sentinel written for a missing text field
pub const NULL_TEXT: &str = "NaN";

/// Composite dedup key of one order
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct OrderKey {
    pub estimated_delivery_date: Option<NaiveDate>,
    pub worker_id: Option<String>,
    pub region_group_code: Option<String>,
    pub delivery_completion_round: i64,
    pub full_address_hash: Option<String>,
}

impl OrderKey {
    pub fn from_event(event: &DeliveryEvent) -> Self {
        Self {
            estimated_delivery_date: event.estimated_delivery_date,
            worker_id: event.worker_id.clone(),
            region_group_code: event.region_group_code.clone(),
            delivery_completion_round: event.delivery_completion_round,
            full_address_hash: event.full_address_hash.clone(),
        }
    }

    /// Canonical text form: fields joined by `|`, each present field written as
    /// `<len>:<text>`, missing fields as a bare sentinel (`NaT` / `NaN`).
    ///
    /// Length prefixes keep the encoding injective even when a field contains `|`.
    pub fn canonical(&self) -> String {
        let date = self
            .estimated_delivery_date
            .map(|d| d.format("%Y-%m-%d").to_string());
        let round = self.delivery_completion_round.to_string();
        let fields = [
            (date.as_deref(), NULL_DATE),
            (self.worker_id.as_deref(), NULL_TEXT),
            (self.region_group_code.as_deref(), NULL_TEXT),
            (Some(round.as_str()), NULL_TEXT),
            (self.full_address_hash.as_deref(), NULL_TEXT),
        ];

        let mut out = String::new();
        for (i, (field, sentinel)) in fields.into_iter().enumerate() {
            if i > 0 {
                out.push('|');
            }
            match field {
                Some(text) => {
                    let _ = write!(out, "{}:{}", text.len(), text);
                }
                None => out.push_str(sentinel),
            }
        }
        out
    }
}
