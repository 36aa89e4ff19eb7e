//! Assembly of one dashboard render from a table and a selection

use crate::data::{Capabilities, CustomerTable};
use crate::filter::{distinct_segments, segment_options, select, SegmentFilter};
use crate::insights::InsightPanel;
use crate::kpi::Kpis;
use crate::segments::{
    segment_counts, segment_summaries, Distributions, SegmentCount, SegmentSummary,
};
use polars::prelude::*;

/// Rows shown in the raw data preview
pub const PREVIEW_ROWS: usize = 10;

/// Sizes and head of the filtered table
#[derive(Debug, Clone, PartialEq)]
pub struct DatasetInfo {
    pub total_customers: usize,
    pub filtered_customers: usize,
    pub features: usize,
    pub columns: Vec<String>,
    pub preview: Vec<Vec<String>>,
}

impl DatasetInfo {
    fn compute(table: &CustomerTable, rows: &CustomerTable) -> PolarsResult<Self> {
        let head = rows.frame().head(Some(PREVIEW_ROWS));
        let columns = rows.column_names();

        let mut preview = Vec::with_capacity(head.height());
        for idx in 0..head.height() {
            let mut row = Vec::with_capacity(columns.len());
            for name in &columns {
                row.push(head.column(name)?.str_value(idx)?.into_owned());
            }
            preview.push(row);
        }

        Ok(Self {
            total_customers: table.len(),
            filtered_customers: rows.len(),
            features: table.feature_count(),
            columns,
            preview,
        })
    }
}

/// Everything one render pass shows, in page order.
///
/// Blocks whose capability guard is false are `None` and are not rendered.
#[derive(Debug, Clone, PartialEq)]
pub struct Report {
    pub capabilities: Capabilities,
    pub filter: SegmentFilter,
    /// Selector values; `None` hides the selector
    pub options: Option<Vec<String>>,
    pub warning: Option<String>,
    pub dataset: DatasetInfo,
    pub kpis: Kpis,
    /// Customer counts per segment over the full table
    pub segment_overview: Option<Vec<SegmentCount>>,
    /// Metric histograms over the filtered rows
    pub distributions: Option<Distributions>,
    /// Per-segment statistics over the full table
    pub segment_stats: Option<Vec<SegmentSummary>>,
    pub insights: InsightPanel,
}

impl Report {
    /// Run one render pass
    ///
    /// # Arguments
    /// * `table` - Full customer table, never modified
    /// * `requested` - Segment filter chosen by the user
    ///
    /// # Returns
    /// * `Report` holding every panel's data
    pub fn build(table: &CustomerTable, requested: &SegmentFilter) -> crate::Result<Self> {
        let capabilities = table.capabilities();
        let selection = select(table, requested)?;

        let segments = if capabilities.has_segment {
            Some(distinct_segments(table)?)
        } else {
            None
        };

        let segment_overview = if capabilities.has_segment {
            Some(segment_counts(table)?)
        } else {
            None
        };

        let distributions = if capabilities.has_rfm {
            Some(Distributions::compute(&selection.rows)?)
        } else {
            None
        };

        let segment_stats = if capabilities.has_segment && capabilities.has_rfm {
            Some(segment_summaries(table)?)
        } else {
            None
        };

        Ok(Self {
            capabilities,
            options: segment_options(table)?,
            dataset: DatasetInfo::compute(table, &selection.rows)?,
            kpis: Kpis::compute(&selection),
            filter: selection.filter,
            warning: selection.warning,
            segment_overview,
            distributions,
            segment_stats,
            insights: InsightPanel::build(segments.as_deref()),
        })
    }
}

/// Print the report to the console
pub fn print_report_summary(report: &Report) {
    println!("\n=== Dataset ===");
    if let Some(warning) = &report.warning {
        println!("Warning: {}", warning);
    }
    println!("Total customers: {}", report.dataset.total_customers);
    println!("Filtered customers: {}", report.dataset.filtered_customers);
    println!("Features: {}", report.dataset.features);

    println!("\n=== Key Performance Indicators ({}) ===", report.filter);
    for tile in report.kpis.tiles() {
        println!("  {:<24} {}", tile.label, tile.value);
    }

    if let Some(counts) = &report.segment_overview {
        let total: usize = counts.iter().map(|c| c.count).sum();
        println!("\n=== Customers per Segment ===");
        for count in counts {
            let percentage = if total == 0 {
                0.0
            } else {
                count.count as f64 / total as f64 * 100.0
            };
            println!(
                "  {}: {} customers ({:.1}%)",
                count.segment, count.count, percentage
            );
        }
    }

    if let Some(stats) = &report.segment_stats {
        println!("\n=== Segment Statistics ===");
        println!(
            "  {:<20} | {:>11} | {:>13} | {:>12} | {:>13} | {:>9}",
            "Segment", "Avg Recency", "Avg Frequency", "Avg Monetary", "Total Revenue", "Customers"
        );
        for s in stats {
            println!(
                "  {:<20} | {:>11.2} | {:>13.2} | {:>12.2} | {:>13.2} | {:>9}",
                s.segment, s.avg_recency, s.avg_frequency, s.avg_monetary, s.total_revenue, s.customers
            );
        }
    }

    println!("\n=== Key Insights & Recommendations ===");
    match &report.insights {
        InsightPanel::Grid(rows) => {
            for card in rows.iter().flatten() {
                println!(
                    "  {} {}: {}",
                    card.advisory.marker(),
                    card.segment,
                    card.advisory.text()
                );
            }
        }
        InsightPanel::Notice(notice) => println!("  {}", notice),
    }
}
