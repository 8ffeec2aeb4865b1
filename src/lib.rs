//! Delivery KPI aggregation
//!
//! Turns per-package delivery events into per-dimension logistics KPIs:
//! order volume, box volume, delay rate, misdelivery rate and round-change rate.

pub mod aggregate;
pub mod chart;
pub mod grouping;
pub mod loader;
pub mod models;
pub mod order_key;
pub mod rate;
pub mod report;

pub use aggregate::{summarize, summarize_group, GroupSummary, KpiReport};
pub use grouping::{GroupDimension, GroupLabel, GroupValue, Grouping, UnknownDimension};
pub use models::DeliveryEvent;
pub use order_key::OrderKey;
