//! Text, JSON and CSV renderings of a [`KpiReport`].

use anyhow::{Context, Result};
use csv::WriterBuilder;
use std::fmt::Write as _;
use std::io::Write;

use crate::aggregate::{GroupSummary, KpiReport};
use crate::rate::as_percent;

const COLUMNS: [&str; 10] = [
    "orders",
    "boxes",
    "delay_orders",
    "delay_rate",
    "mis_orders",
    "mis_rate",
    "r1_to_2",
    "r1_to_3",
    "round_change_orders",
    "round_change_rate",
];

/// Render the report as a fixed-width table, rates shown in percent.
pub fn render_table(report: &KpiReport) -> String {
    let label_width = report
        .groups
        .iter()
        .map(|g| g.label.to_string().chars().count())
        .chain(std::iter::once(report.dimension.len()))
        .max()
        .unwrap_or(0);

    let mut out = String::new();
    let _ = writeln!(out, "\n=== KPI REPORT ===");

    let _ = write!(out, "{:<width$}", report.dimension, width = label_width);
    for col in COLUMNS {
        let _ = write!(out, "  {:>w$}", col, w = col.len());
    }
    out.push('\n');

    for g in &report.groups {
        let cells = [
            g.orders.to_string(),
            g.boxes.to_string(),
            g.delay_orders.to_string(),
            format!("{:.2}", as_percent(g.delay_rate)),
            g.mis_orders.to_string(),
            format!("{:.2}", as_percent(g.mis_rate)),
            g.r1_to_2.to_string(),
            g.r1_to_3.to_string(),
            g.round_change_orders.to_string(),
            format!("{:.2}", as_percent(g.round_change_rate)),
        ];
        let _ = write!(out, "{:<width$}", g.label.to_string(), width = label_width);
        for (col, cell) in COLUMNS.iter().zip(cells) {
            let _ = write!(out, "  {:>w$}", cell, w = col.len());
        }
        out.push('\n');
    }

    let _ = writeln!(out, "==================");
    out
}

/// Pretty JSON of `{ dimension, groups }`
pub fn to_json(report: &KpiReport) -> Result<String> {
    serde_json::to_string_pretty(report).context("failed to serialize KPI report")
}

/// Write one CSV row per group; rates stay fractions.
pub fn write_csv<W: Write>(report: &KpiReport, writer: W) -> Result<()> {
    let mut wtr = WriterBuilder::new().from_writer(writer);

    let mut header = vec![report.dimension.as_str()];
    header.extend(COLUMNS);
    wtr.write_record(&header)?;

    for g in &report.groups {
        wtr.write_record(csv_cells(g))?;
    }
    wtr.flush()?;
    Ok(())
}

fn csv_cells(g: &GroupSummary) -> [String; 11] {
    [
        g.label.to_string(),
        g.orders.to_string(),
        g.boxes.to_string(),
        g.delay_orders.to_string(),
        g.delay_rate.to_string(),
        g.mis_orders.to_string(),
        g.mis_rate.to_string(),
        g.r1_to_2.to_string(),
        g.r1_to_3.to_string(),
        g.round_change_orders.to_string(),
        g.round_change_rate.to_string(),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grouping::{GroupLabel, GroupValue};

    fn summary(label: GroupLabel, orders: u64, delay_orders: u64) -> GroupSummary {
        GroupSummary {
            label,
            orders,
            boxes: orders as i64 * 2,
            delay_orders,
            delay_rate: crate::rate::rate(delay_orders, orders),
            mis_orders: 0,
            mis_rate: 0.0,
            r1_to_2: 0,
            r1_to_3: 0,
            round_change_orders: 0,
            round_change_rate: 0.0,
        }
    }

    fn grouped_report() -> KpiReport {
        KpiReport {
            dimension: "region_group_code".to_string(),
            groups: vec![
                summary(GroupLabel::Value(GroupValue::Text("R1".into())), 3, 1),
                summary(GroupLabel::Missing, 2, 2),
            ],
        }
    }

    #[test]
    fn test_table_shows_percentages() {
        let table = render_table(&grouped_report());
        let lines: Vec<&str> = table.lines().collect();

        assert_eq!(lines[1], "=== KPI REPORT ===");
        assert!(lines[2].starts_with("region_group_code  orders  boxes"));
        assert!(lines[3].starts_with("R1 "));
        assert!(lines[3].contains("33.33"));
        assert!(lines[4].starts_with("<missing>"));
        assert!(lines[4].contains("100.00"));
        assert_eq!(lines[5], "==================");
    }

    #[test]
    fn test_json_output() {
        let json = to_json(&grouped_report()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["dimension"], "region_group_code");
        assert_eq!(value["groups"][0]["group"], "R1");
        assert_eq!(value["groups"][0]["orders"], 3);
        assert!(value["groups"][1]["group"].is_null());
        assert_eq!(value["groups"][1]["delay_rate"], 1.0);
    }

    #[test]
    fn test_csv_output() {
        let mut buf = Vec::new();
        write_csv(&grouped_report(), &mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(
            lines[0],
            "region_group_code,orders,boxes,delay_orders,delay_rate,mis_orders,mis_rate,\
r1_to_2,r1_to_3,round_change_orders,round_change_rate"
        );
        assert_eq!(lines[2], "<missing>,2,4,2,1,0,0,0,0,0,0");
        assert_eq!(lines.len(), 3);
    }
}
