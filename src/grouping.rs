//! Grouping policy: which column to partition by, and the partitioning itself.

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use tracing::{debug, warn};

use crate::models::DeliveryEvent;

/// Label used for the ungrouped case
pub const ALL_LABEL: &str = "ALL";

/// Columns of [`DeliveryEvent`] that can be grouped on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GroupDimension {
    Pdt,
    EstimatedDeliveryDate,
    CenterCode,
    WorkerId,
    RegionGroupCode,
    DeliveryCompletionRound,
    FullAddressHash,
    OrgDeliveryRound,
    IsDelayed,
    IsMisdelivered,
    BoxCnt,
}

impl GroupDimension {
    pub const ALL: [GroupDimension; 11] = [
        GroupDimension::Pdt,
        GroupDimension::EstimatedDeliveryDate,
        GroupDimension::CenterCode,
        GroupDimension::WorkerId,
        GroupDimension::RegionGroupCode,
        GroupDimension::DeliveryCompletionRound,
        GroupDimension::FullAddressHash,
        GroupDimension::OrgDeliveryRound,
        GroupDimension::IsDelayed,
        GroupDimension::IsMisdelivered,
        GroupDimension::BoxCnt,
    ];

    /// Column name as it appears in the input header
    pub fn column(&self) -> &'static str {
        match self {
            GroupDimension::Pdt => "pdt",
            GroupDimension::EstimatedDeliveryDate => "estimated_delivery_date",
            GroupDimension::CenterCode => "center_code",
            GroupDimension::WorkerId => "worker_id",
            GroupDimension::RegionGroupCode => "region_group_code",
            GroupDimension::DeliveryCompletionRound => "delivery_completion_round",
            GroupDimension::FullAddressHash => "full_address_hash",
            GroupDimension::OrgDeliveryRound => "org_delivery_round",
            GroupDimension::IsDelayed => "is_delayed",
            GroupDimension::IsMisdelivered => "is_misdelivered",
            GroupDimension::BoxCnt => "box_cnt",
        }
    }

    /// Value of this column on `event`, `None` when missing
    pub fn value(&self, event: &DeliveryEvent) -> Option<GroupValue> {
        let text = |s: &Option<String>| s.clone().map(GroupValue::Text);
        match self {
            GroupDimension::Pdt => event.pdt.map(GroupValue::DateTime),
            GroupDimension::EstimatedDeliveryDate => event.estimated_delivery_date.map(GroupValue::Date),
            GroupDimension::CenterCode => text(&event.center_code),
            GroupDimension::WorkerId => text(&event.worker_id),
            GroupDimension::RegionGroupCode => text(&event.region_group_code),
            GroupDimension::FullAddressHash => text(&event.full_address_hash),
            GroupDimension::DeliveryCompletionRound => Some(GroupValue::Int(event.delivery_completion_round)),
            GroupDimension::OrgDeliveryRound => Some(GroupValue::Int(event.org_delivery_round)),
            GroupDimension::IsDelayed => Some(GroupValue::Int(event.is_delayed)),
            GroupDimension::IsMisdelivered => Some(GroupValue::Int(event.is_misdelivered)),
            GroupDimension::BoxCnt => Some(GroupValue::Int(event.box_cnt)),
        }
    }
}

impl fmt::Display for GroupDimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column())
    }
}

/// Requested group-by column is not part of the record schema
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("group-by='{requested}' not found (known columns: {})", known_columns())]
pub struct UnknownDimension {
    pub requested: String,
}

fn known_columns() -> String {
    GroupDimension::ALL
        .iter()
        .map(|d| d.column())
        .collect::<Vec<_>>()
        .join(", ")
}

impl FromStr for GroupDimension {
    type Err = UnknownDimension;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        GroupDimension::ALL
            .into_iter()
            .find(|d| d.column() == s)
            .ok_or_else(|| UnknownDimension {
                requested: s.to_string(),
            })
    }
}

/// A concrete, non-missing value of a grouping column.
///
/// Within one dimension only one variant occurs, so the derived ordering is the
/// natural one: dates chronologically, text lexicographically, integers numerically.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum GroupValue {
    Date(NaiveDate),
    DateTime(NaiveDateTime),
    Int(i64),
    Text(String),
}

impl fmt::Display for GroupValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GroupValue::Date(d) => write!(f, "{}", d.format("%Y-%m-%d")),
            GroupValue::DateTime(dt) => write!(f, "{}", dt.format("%Y-%m-%d %H:%M:%S")),
            GroupValue::Int(v) => write!(f, "{}", v),
            GroupValue::Text(s) => f.write_str(s),
        }
    }
}

/// Label of one output group. Variant order gives the output order:
/// `Missing` sorts after every value.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum GroupLabel {
    All,
    Value(GroupValue),
    Missing,
}

impl From<Option<GroupValue>> for GroupLabel {
    fn from(value: Option<GroupValue>) -> Self {
        value.map(GroupLabel::Value).unwrap_or(GroupLabel::Missing)
    }
}

impl fmt::Display for GroupLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GroupLabel::All => f.write_str(ALL_LABEL),
            GroupLabel::Value(v) => v.fmt(f),
            GroupLabel::Missing => f.write_str("<missing>"),
        }
    }
}

impl Serialize for GroupLabel {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            GroupLabel::Value(GroupValue::Int(v)) => serializer.serialize_i64(*v),
            GroupLabel::Missing => serializer.serialize_none(),
            other => serializer.collect_str(other),
        }
    }
}

/// How events are partitioned before aggregation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Grouping {
    /// One implicit group holding every event
    #[default]
    All,
    By(GroupDimension),
}

impl Grouping {
    /// Column name used, or `ALL`
    pub fn dimension_name(&self) -> &'static str {
        match self {
            Grouping::All => ALL_LABEL,
            Grouping::By(dim) => dim.column(),
        }
    }

    /// Caller-side policy turning a requested column name into a grouping.
    ///
    /// Absent, empty or `ALL` selects the overall summary. An unknown column
    /// falls back to [`Grouping::All`] and is reported back as the warning.
    pub fn resolve(requested: Option<&str>) -> Resolution {
        let requested = requested.map(str::trim).unwrap_or_default();
        if requested.is_empty() || requested.eq_ignore_ascii_case(ALL_LABEL) {
            return Resolution {
                grouping: Grouping::All,
                warning: None,
            };
        }

        match requested.parse::<GroupDimension>() {
            Ok(dim) => Resolution {
                grouping: Grouping::By(dim),
                warning: None,
            },
            Err(e) => {
                warn!("{}. Using overall summary.", e);
                Resolution {
                    grouping: Grouping::All,
                    warning: Some(e),
                }
            }
        }
    }
}

/// Outcome of [`Grouping::resolve`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub grouping: Grouping,
    pub warning: Option<UnknownDimension>,
}

/// Events sharing one label
#[derive(Debug, Clone)]
pub struct Group<'a> {
    pub label: GroupLabel,
    pub events: Vec<&'a DeliveryEvent>,
}

/// Partition `events` according to `grouping`.
///
/// `Grouping::All` always yields exactly one group, even for empty input.
/// A dimension yields one group per distinct value in ascending order, plus a
/// trailing `Missing` group when some events lack the value.
pub fn partition<'a>(events: &'a [DeliveryEvent], grouping: &Grouping) -> Vec<Group<'a>> {
    let dim = match grouping {
        Grouping::All => {
            return vec![Group {
                label: GroupLabel::All,
                events: events.iter().collect(),
            }]
        }
        Grouping::By(dim) => dim,
    };

    let mut buckets: BTreeMap<GroupLabel, Vec<&'a DeliveryEvent>> = BTreeMap::new();
    for event in events {
        buckets
            .entry(GroupLabel::from(dim.value(event)))
            .or_default()
            .push(event);
    }
    debug!("Partitioned {} events into {} groups by {}", events.len(), buckets.len(), dim);

    buckets
        .into_iter()
        .map(|(label, events)| Group { label, events })
        .collect()
}
