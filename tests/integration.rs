//! Integration tests for SegmentScope

use segmentscope::insights::{InsightPanel, NO_SEGMENT_NOTICE};
use segmentscope::kpi::PLACEHOLDER;
use segmentscope::segments::segment_counts;
use segmentscope::{
    load_customer_table, render_load_failure, render_page, select, LoadError, PageOptions,
    Report, SegmentFilter,
};
use std::io::Write;
use tempfile::NamedTempFile;

/// Create a test CSV file with the given header and rows
fn create_test_csv(header: &str, rows: &[&str]) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "{}", header).unwrap();
    for row in rows {
        writeln!(file, "{}", row).unwrap();
    }
    file
}

fn segmented_csv() -> NamedTempFile {
    create_test_csv(
        "CustomerID,Recency,Frequency,Monetary,Segment",
        &[
            "17850,10,2,100,VIP Customers",
            "13047,50,1,20,Lost Customers",
        ],
    )
}

fn larger_csv() -> NamedTempFile {
    create_test_csv(
        "CustomerID,Recency,Frequency,Monetary,Segment",
        &[
            "1,3,12,5400.50,VVIP Customers",
            "2,15,6,1200,VIP Customers",
            "3,40,2,310.25,Regular Customers",
            "4,200,1,45,Lost Customers",
            "5,8,9,3900,VVIP Customers",
            "6,25,4,800,VIP Customers",
            "7,60,3,150,Regular Customers",
            "8,320,1,12.5,Lost Customers",
            "9,90,2,99,Champions",
        ],
    )
}

#[test]
fn test_all_filter_keeps_every_customer() {
    let file = larger_csv();
    let table = load_customer_table(file.path()).unwrap();

    let selection = select(&table, &SegmentFilter::All).unwrap();
    assert_eq!(selection.rows.len(), table.len());
}

#[test]
fn test_each_segment_filter_is_a_subset() {
    let file = larger_csv();
    let table = load_customer_table(file.path()).unwrap();

    let report = Report::build(&table, &SegmentFilter::All).unwrap();
    let options = report.options.unwrap();
    let mut filtered_total = 0;
    for option in options.iter().skip(1) {
        let selection = select(&table, &SegmentFilter::parse(option)).unwrap();
        assert!(selection.rows.len() <= table.len());
        assert_eq!(selection.filter.label(), option.as_str());
        filtered_total += selection.rows.len();
    }
    assert_eq!(filtered_total, table.len());
}

#[test]
fn test_two_customer_scenario_all() {
    let file = segmented_csv();
    let table = load_customer_table(file.path()).unwrap();
    let report = Report::build(&table, &SegmentFilter::All).unwrap();

    assert_eq!(report.kpis.total_customers, 2);
    assert_eq!(report.kpis.customer_value_display(), "60");
    assert_eq!(report.kpis.frequency_display(), "1.5");
    assert_eq!(report.kpis.recency_display(), "30 days");

    let overview = report.segment_overview.as_ref().unwrap();
    assert_eq!(overview.len(), 2);
    assert!(overview.iter().all(|slice| slice.count == 1));

    let stats = report.segment_stats.as_ref().unwrap();
    let revenue: Vec<f64> = stats.iter().map(|s| s.total_revenue).collect();
    assert_eq!(revenue, vec![100.0, 20.0]);

    let html = render_page(&report, &PageOptions::default()).unwrap();
    assert!(html.contains("Segment Distribution"));
    assert!(html.contains("Recency Distribution"));
}

#[test]
fn test_two_customer_scenario_vip() {
    let file = segmented_csv();
    let table = load_customer_table(file.path()).unwrap();
    let report = Report::build(&table, &SegmentFilter::parse("VIP Customers")).unwrap();

    assert_eq!(report.dataset.filtered_customers, 1);
    assert_eq!(report.kpis.customer_value_display(), "100");
    let recency = &report.distributions.as_ref().unwrap().recency;
    assert_eq!(recency.total(), 1);
    assert!(recency.lower <= 10.0 && 10.0 <= recency.upper);
}

#[test]
fn test_total_revenue_matches_segment_sums() {
    let file = larger_csv();
    let table = load_customer_table(file.path()).unwrap();
    let report = Report::build(&table, &SegmentFilter::All).unwrap();

    for summary in report.segment_stats.unwrap() {
        let selection = select(&table, &SegmentFilter::parse(&summary.segment)).unwrap();
        let expected: f64 = selection
            .rows
            .numeric_values("Monetary")
            .unwrap()
            .unwrap()
            .iter()
            .sum();
        assert!(
            (summary.total_revenue - expected).abs() <= 0.005,
            "{}: {} vs {}",
            summary.segment,
            summary.total_revenue,
            expected
        );
        assert_eq!(summary.customers, selection.rows.len());
    }
}

#[test]
fn test_insight_grid_follows_first_seen_order() {
    let file = larger_csv();
    let table = load_customer_table(file.path()).unwrap();
    let report = Report::build(&table, &SegmentFilter::parse("Lost Customers")).unwrap();

    let InsightPanel::Grid(rows) = report.insights else {
        panic!("expected insight grid");
    };
    let labels: Vec<&str> = rows.iter().flatten().map(|c| c.segment.as_str()).collect();
    assert_eq!(
        labels,
        vec![
            "VVIP Customers",
            "VIP Customers",
            "Regular Customers",
            "Lost Customers",
            "Champions"
        ]
    );
    assert_eq!(rows[0].len(), 3);
    assert_eq!(rows[1].len(), 2);
    assert_eq!(rows[1][1].advisory.text(), "Analyze this segment further.");
}

#[test]
fn test_missing_segment_column_scenario() {
    let file = create_test_csv(
        "Recency,Frequency,Monetary",
        &["10,2,100", "50,1,20", "30,5,70"],
    );
    let table = load_customer_table(file.path()).unwrap();
    let report = Report::build(&table, &SegmentFilter::parse("VIP Customers")).unwrap();

    assert!(report.options.is_none());
    assert!(report.filter.is_all());
    assert!(report.warning.is_some());
    assert_eq!(report.insights, InsightPanel::Notice(NO_SEGMENT_NOTICE));
    assert!(report.segment_overview.is_none());
    assert!(report.segment_stats.is_none());
    let distributions = report.distributions.as_ref().unwrap();
    assert!(distributions.iter().all(|h| h.total() == table.len()));

    let html = render_page(&report, &PageOptions::default()).unwrap();
    assert!(!html.contains("<select"));
    assert!(html.contains(NO_SEGMENT_NOTICE));
}

#[test]
fn test_missing_monetary_column_degrades_kpi() {
    let file = create_test_csv(
        "Recency,Frequency,Segment",
        &["10,2,VIP Customers", "50,1,Lost Customers"],
    );
    let table = load_customer_table(file.path()).unwrap();
    let report = Report::build(&table, &SegmentFilter::All).unwrap();

    assert_eq!(report.kpis.customer_value_display(), PLACEHOLDER);
    assert_eq!(report.kpis.frequency_display(), "1.5");
    assert!(report.distributions.is_none());
    assert!(report.segment_stats.is_none());
    assert!(report.segment_overview.is_some());
}

#[test]
fn test_unresolvable_path_renders_single_notice() {
    let dir = tempfile::tempdir().unwrap();
    let err = load_customer_table(dir.path().join("finalRFM_data.csv")).unwrap_err();
    assert!(matches!(err, LoadError::NotFound(_)));

    let html = render_load_failure(&err, &PageOptions::default());
    assert!(html.contains("Data loading failed"));
    assert!(!html.contains("Key Performance Indicators"));
    assert!(!html.contains("<svg"));
}

#[test]
fn test_blank_segment_counts_only_toward_all() {
    let file = create_test_csv(
        "CustomerID,Recency,Frequency,Monetary,Segment",
        &[
            "1,10,2,100,VIP Customers",
            "2,50,1,20,",
            "3,30,4,60,Lost Customers",
        ],
    );
    let table = load_customer_table(file.path()).unwrap();
    let report = Report::build(&table, &SegmentFilter::All).unwrap();

    assert_eq!(report.kpis.total_customers, 3);
    assert_eq!(
        report.options.as_deref().unwrap(),
        ["All", "VIP Customers", "Lost Customers"]
    );

    let counts = segment_counts(&table).unwrap();
    let labels: Vec<&str> = counts.iter().map(|c| c.segment.as_str()).collect();
    assert_eq!(labels, vec!["VIP Customers", "Lost Customers"]);
    assert_eq!(counts.iter().map(|c| c.count).sum::<usize>(), 2);

    let InsightPanel::Grid(rows) = report.insights else {
        panic!("expected insight grid");
    };
    let cards: Vec<&str> = rows.iter().flatten().map(|c| c.segment.as_str()).collect();
    assert_eq!(cards, vec!["VIP Customers", "Lost Customers"]);
}
