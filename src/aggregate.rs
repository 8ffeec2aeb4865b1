//! Per-group KPI aggregation.
//!
//! Box volume is a raw row sum. Every other count is a number of distinct
//! [`OrderKey`]s, so duplicate rows of one order inflate `boxes` only.

use serde::Serialize;
use std::collections::HashSet;
use tracing::{debug, info};

use crate::grouping::{partition, GroupLabel, Grouping};
use crate::models::DeliveryEvent;
use crate::order_key::OrderKey;
use crate::rate::rate;

/// KPIs of one group
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupSummary {
    #[serde(rename = "group")]
    pub label: GroupLabel,
    pub orders: u64,
    pub boxes: i64,
    pub delay_orders: u64,
    pub delay_rate: f64,
    pub mis_orders: u64,
    pub mis_rate: f64,
    pub r1_to_2: u64,
    pub r1_to_3: u64,
    pub round_change_orders: u64,
    pub round_change_rate: f64,
}

/// Output of one aggregation run
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KpiReport {
    /// Column grouped on, or `ALL`
    pub dimension: String,
    pub groups: Vec<GroupSummary>,
}

impl KpiReport {
    pub fn is_grouped(&self) -> bool {
        self.groups.iter().any(|g| g.label != GroupLabel::All)
    }
}

#[derive(Default)]
struct OrderSets {
    all: HashSet<OrderKey>,
    delayed: HashSet<OrderKey>,
    misdelivered: HashSet<OrderKey>,
    r1_to_2: HashSet<OrderKey>,
    r1_to_3: HashSet<OrderKey>,
}

/// Compute the summary of one group's events
pub fn summarize_group(label: GroupLabel, events: &[&DeliveryEvent]) -> GroupSummary {
    let mut sets = OrderSets::default();
    let mut boxes: i64 = 0;

    for event in events {
        let key = OrderKey::from_event(event);
        boxes = boxes.saturating_add(event.box_cnt);

        if event.delayed() {
            sets.delayed.insert(key.clone());
        }
        if event.misdelivered() {
            sets.misdelivered.insert(key.clone());
        }
        if event.round_1_to_2() {
            sets.r1_to_2.insert(key.clone());
        }
        if event.round_1_to_3() {
            sets.r1_to_3.insert(key.clone());
        }
        sets.all.insert(key);
    }

    let orders = sets.all.len() as u64;
    let delay_orders = sets.delayed.len() as u64;
    let mis_orders = sets.misdelivered.len() as u64;
    let r1_to_2 = sets.r1_to_2.len() as u64;
    let r1_to_3 = sets.r1_to_3.len() as u64;
    // An order present in both sets counts twice here; not deduplicated.
    let round_change_orders = r1_to_2 + r1_to_3;

    GroupSummary {
        label,
        orders,
        boxes,
        delay_orders,
        delay_rate: rate(delay_orders, orders),
        mis_orders,
        mis_rate: rate(mis_orders, orders),
        r1_to_2,
        r1_to_3,
        round_change_orders,
        round_change_rate: rate(round_change_orders, orders),
    }
}

/// Partition `events` by `grouping` and summarize every group in output order
pub fn summarize(events: &[DeliveryEvent], grouping: &Grouping) -> KpiReport {
    let groups: Vec<GroupSummary> = partition(events, grouping)
        .into_iter()
        .map(|group| {
            let summary = summarize_group(group.label, &group.events);
            debug!(
                "Group {}: {} rows, {} orders, {} boxes",
                summary.label,
                group.events.len(),
                summary.orders,
                summary.boxes
            );
            summary
        })
        .collect();

    info!(
        "Summarized {} events into {} groups by {}",
        events.len(),
        groups.len(),
        grouping.dimension_name()
    );

    KpiReport {
        dimension: grouping.dimension_name().to_string(),
        groups,
    }
}
