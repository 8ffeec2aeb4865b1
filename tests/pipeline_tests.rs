use delivery_kpi::{chart, loader, report, summarize, GroupLabel, Grouping};
use std::fs;

const DELIVERIES: &str = "\
pdt,estimated_delivery_date,center_code,worker_id,region_group_code,delivery_completion_round,full_address_hash,org_delivery_round,is_delayed,is_misdelivered,box_cnt
2023-12-31 19:10:00,2024-01-01,C01,W1,R1,1,A1,1,0,0,2
2023-12-31 19:10:00,2024-01-01,C01,W1,R1,1,A1,1,0,0,3
2024-01-01 20:00:00,2024-01-02,C01,W2,R1,2,A2,1,1,0,1
2024-01-01 21:30:00,2024-01-02,C02,W3,R2,3,A3,1,0,1,5
";

#[test]
fn test_csv_to_report() {
    let dir = tempfile::tempdir().unwrap();
    let csv_path = dir.path().join("deliveries.csv");
    fs::write(&csv_path, DELIVERIES).unwrap();

    let loaded = loader::load_events(&csv_path).unwrap();
    assert_eq!(loaded.events.len(), 4);
    assert_eq!(loaded.skipped, 0);

    let resolution = Grouping::resolve(Some("estimated_delivery_date"));
    assert!(resolution.warning.is_none());

    let summary = summarize(&loaded.events, &resolution.grouping);
    assert_eq!(summary.groups.len(), 2);
    assert_eq!(summary.groups[0].orders, 1);
    assert_eq!(summary.groups[0].boxes, 5);
    assert_eq!(summary.groups[1].orders, 2);
    assert_eq!(summary.groups[1].delay_rate, 0.5);
    assert_eq!(summary.groups[1].mis_rate, 0.5);
    assert_eq!(summary.groups[1].round_change_rate, 1.0);

    let table = report::render_table(&summary);
    assert!(table.contains("estimated_delivery_date"));
    assert!(table.contains("2024-01-02"));

    let out_dir = dir.path().join("out");
    let chart_path = chart::export_delay_rate_chart(&summary, &out_dir)
        .unwrap()
        .expect("two groups produce a chart");
    assert!(chart_path.ends_with("delay_rate_by_estimated_delivery_date.svg"));
    assert!(chart_path.exists());
}

#[test]
fn test_overall_report_has_no_chart() {
    let dir = tempfile::tempdir().unwrap();
    let csv_path = dir.path().join("deliveries.csv");
    fs::write(&csv_path, DELIVERIES).unwrap();

    let loaded = loader::load_events(&csv_path).unwrap();
    let resolution = Grouping::resolve(Some("no_such_column"));
    assert!(resolution.warning.is_some());

    let summary = summarize(&loaded.events, &resolution.grouping);
    assert_eq!(summary.groups.len(), 1);
    assert_eq!(summary.groups[0].label, GroupLabel::All);
    assert_eq!(summary.groups[0].orders, 3);
    assert_eq!(summary.groups[0].boxes, 11);

    let out_dir = dir.path().join("out");
    assert!(chart::export_delay_rate_chart(&summary, &out_dir).unwrap().is_none());
    assert!(!out_dir.exists());
}

#[test]
fn test_huge_box_counts_do_not_overflow() {
    let data = "\
estimated_delivery_date,worker_id,region_group_code,delivery_completion_round,full_address_hash,org_delivery_round,is_delayed,is_misdelivered,box_cnt
2024-01-01,W1,R1,1,A1,1,0,0,9223372036854775807
2024-01-01,W2,R1,1,A2,1,0,0,1
";
    let loaded = loader::read_events(data.as_bytes()).unwrap();
    let summary = summarize(&loaded.events, &Grouping::All);

    assert_eq!(summary.groups[0].orders, 2);
    assert_eq!(summary.groups[0].boxes, i64::MAX);
}
