//! Per-segment aggregation and metric distributions

use crate::data::{CustomerTable, FREQUENCY, MONETARY, RECENCY, SEGMENT};
use polars::prelude::*;

/// Number of equal-width bins in every metric histogram
pub const HISTOGRAM_BINS: usize = 50;

/// Customer count for one segment
#[derive(Debug, Clone, PartialEq)]
pub struct SegmentCount {
    pub segment: String,
    pub count: usize,
}

/// Aggregate statistics of one segment, rounded to 2 decimals
#[derive(Debug, Clone, PartialEq)]
pub struct SegmentSummary {
    pub segment: String,
    pub avg_recency: f64,
    pub avg_frequency: f64,
    pub avg_monetary: f64,
    pub total_revenue: f64,
    pub customers: usize,
}

impl SegmentSummary {
    /// The three mean metrics compared in the grouped chart
    pub fn profile(&self) -> [(&'static str, f64); 3] {
        [
            ("Avg Recency", self.avg_recency),
            ("Avg Frequency", self.avg_frequency),
            ("Avg Monetary", self.avg_monetary),
        ]
    }
}

/// Equal-width frequency distribution of one metric
#[derive(Debug, Clone, PartialEq)]
pub struct Histogram {
    pub metric: &'static str,
    pub lower: f64,
    pub upper: f64,
    pub counts: Vec<usize>,
}

impl Histogram {
    /// Bin `values` into `bins` equal-width buckets spanning their range.
    ///
    /// The last bucket is closed so the maximum lands inside it. A degenerate
    /// range (single distinct value) is widened by 0.5 on each side.
    pub fn build(metric: &'static str, values: &[f64], bins: usize) -> Self {
        let bins = bins.max(1);
        let finite = values.iter().copied().filter(|v| v.is_finite());
        let (min, max) = finite.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
            (lo.min(v), hi.max(v))
        });

        if min > max {
            return Self {
                metric,
                lower: 0.0,
                upper: 1.0,
                counts: vec![0; bins],
            };
        }

        let (lower, upper) = if min == max {
            (min - 0.5, max + 0.5)
        } else {
            (min, max)
        };
        let width = (upper - lower) / bins as f64;

        let mut counts = vec![0; bins];
        for v in values.iter().copied().filter(|v| v.is_finite()) {
            let idx = (((v - lower) / width) as usize).min(bins - 1);
            counts[idx] += 1;
        }

        Self {
            metric,
            lower,
            upper,
            counts,
        }
    }

    pub fn bin_width(&self) -> f64 {
        (self.upper - self.lower) / self.counts.len() as f64
    }

    /// Lower and upper edge of bin `idx`
    pub fn bin_edges(&self, idx: usize) -> (f64, f64) {
        let width = self.bin_width();
        let start = self.lower + width * idx as f64;
        (start, start + width)
    }

    pub fn total(&self) -> usize {
        self.counts.iter().sum()
    }
}

/// Histograms of Recency, Frequency and Monetary over the given rows
#[derive(Debug, Clone, PartialEq)]
pub struct Distributions {
    pub recency: Histogram,
    pub frequency: Histogram,
    pub monetary: Histogram,
}

impl Distributions {
    pub fn compute(rows: &CustomerTable) -> PolarsResult<Self> {
        let histogram = |metric: &'static str| -> PolarsResult<Histogram> {
            let values = rows.numeric_values(metric)?.unwrap_or_default();
            Ok(Histogram::build(metric, &values, HISTOGRAM_BINS))
        };
        Ok(Self {
            recency: histogram(RECENCY)?,
            frequency: histogram(FREQUENCY)?,
            monetary: histogram(MONETARY)?,
        })
    }

    pub fn iter(&self) -> impl Iterator<Item = &Histogram> {
        [&self.recency, &self.frequency, &self.monetary].into_iter()
    }
}

/// Customers per segment, segments in first-seen order
pub fn segment_counts(table: &CustomerTable) -> PolarsResult<Vec<SegmentCount>> {
    let counts = table
        .frame()
        .clone()
        .lazy()
        .filter(col(SEGMENT).is_not_null())
        .group_by_stable([col(SEGMENT)])
        .agg([col(SEGMENT).count().alias("count")])
        .collect()?;

    let labels = counts.column(SEGMENT)?.str()?;
    let sizes = counts.column("count")?.cast(&DataType::UInt64)?;
    let sizes = sizes.u64()?;

    Ok(labels
        .into_iter()
        .zip(sizes)
        .filter_map(|(label, count)| {
            Some(SegmentCount {
                segment: label?.to_string(),
                count: count.unwrap_or(0) as usize,
            })
        })
        .collect())
}

/// Aggregate statistics per segment, segments in first-seen order
///
/// # Arguments
/// * `table` - Full customer table with RFM and Segment columns
///
/// # Returns
/// * One `SegmentSummary` per distinct segment
pub fn segment_summaries(table: &CustomerTable) -> PolarsResult<Vec<SegmentSummary>> {
    let stats = table
        .frame()
        .clone()
        .lazy()
        .filter(col(SEGMENT).is_not_null())
        .group_by_stable([col(SEGMENT)])
        .agg([
            col(RECENCY).mean().alias("avg_recency"),
            col(FREQUENCY).mean().alias("avg_frequency"),
            col(MONETARY).mean().alias("avg_monetary"),
            col(MONETARY).sum().alias("total_revenue"),
            col(SEGMENT).count().alias("customers"),
        ])
        .collect()?;

    let labels = stats.column(SEGMENT)?.str()?;
    let avg_recency = stats.column("avg_recency")?.f64()?;
    let avg_frequency = stats.column("avg_frequency")?.f64()?;
    let avg_monetary = stats.column("avg_monetary")?.f64()?;
    let total_revenue = stats.column("total_revenue")?.f64()?;
    let customers = stats.column("customers")?.cast(&DataType::UInt64)?;
    let customers = customers.u64()?;

    let mut summaries = Vec::with_capacity(stats.height());
    for idx in 0..stats.height() {
        let Some(segment) = labels.get(idx) else {
            continue;
        };
        summaries.push(SegmentSummary {
            segment: segment.to_string(),
            avg_recency: round2(avg_recency.get(idx)),
            avg_frequency: round2(avg_frequency.get(idx)),
            avg_monetary: round2(avg_monetary.get(idx)),
            total_revenue: round2(total_revenue.get(idx)),
            customers: customers.get(idx).unwrap_or(0) as usize,
        });
    }
    Ok(summaries)
}

/// Round to 2 decimals; a missing aggregate becomes NaN
fn round2(value: Option<f64>) -> f64 {
    value.map_or(f64::NAN, |v| (v * 100.0).round() / 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_table() -> CustomerTable {
        let frame = df!(
            RECENCY => [10.0, 50.0, 20.0, 90.0, 5.0],
            FREQUENCY => [2.0, 1.0, 4.0, 1.0, 9.0],
            MONETARY => [100.0, 20.0, 250.556, 10.0, 999.0],
            SEGMENT => [
                "VIP Customers",
                "Lost Customers",
                "VIP Customers",
                "Lost Customers",
                "VVIP Customers",
            ],
        )
        .unwrap();
        CustomerTable::from_frame(frame).unwrap()
    }

    #[test]
    fn test_segment_counts_first_seen_order() {
        let counts = segment_counts(&sample_table()).unwrap();

        let pairs: Vec<(&str, usize)> = counts
            .iter()
            .map(|c| (c.segment.as_str(), c.count))
            .collect();
        assert_eq!(
            pairs,
            vec![
                ("VIP Customers", 2),
                ("Lost Customers", 2),
                ("VVIP Customers", 1)
            ]
        );
    }

    #[test]
    fn test_segment_summaries() {
        let summaries = segment_summaries(&sample_table()).unwrap();
        assert_eq!(summaries.len(), 3);

        let vip = &summaries[0];
        assert_eq!(vip.segment, "VIP Customers");
        assert_eq!(vip.avg_recency, 15.0);
        assert_eq!(vip.avg_frequency, 3.0);
        assert_eq!(vip.avg_monetary, 175.28);
        assert_eq!(vip.total_revenue, 350.56);
        assert_eq!(vip.customers, 2);
    }

    #[test]
    fn test_total_revenue_matches_row_sums() {
        let table = sample_table();
        let summaries = segment_summaries(&table).unwrap();

        let labels = table.frame().column(SEGMENT).unwrap().str().unwrap().clone();
        let monetary = table.numeric_values(MONETARY).unwrap().unwrap();
        for summary in &summaries {
            let expected: f64 = (&labels)
                .into_iter()
                .zip(&monetary)
                .filter(|(label, _)| *label == Some(summary.segment.as_str()))
                .map(|(_, m)| m)
                .sum();
            assert!((summary.total_revenue - expected).abs() <= 0.005);
        }
    }

    #[test]
    fn test_histogram_bins_span_range() {
        let values: Vec<f64> = (0..=100).map(f64::from).collect();
        let histogram = Histogram::build(RECENCY, &values, HISTOGRAM_BINS);

        assert_eq!(histogram.counts.len(), HISTOGRAM_BINS);
        assert_eq!(histogram.total(), values.len());
        assert_eq!(histogram.lower, 0.0);
        assert_eq!(histogram.upper, 100.0);
        assert_eq!(histogram.bin_width(), 2.0);
        // maximum lands in the closed last bin
        assert_eq!(histogram.counts[HISTOGRAM_BINS - 1], 3);
    }

    #[test]
    fn test_histogram_single_value() {
        let histogram = Histogram::build(RECENCY, &[10.0], HISTOGRAM_BINS);

        assert_eq!(histogram.total(), 1);
        assert_eq!(histogram.lower, 9.5);
        assert_eq!(histogram.upper, 10.5);
        let filled = histogram.counts.iter().position(|&c| c == 1).unwrap();
        let (lo, hi) = histogram.bin_edges(filled);
        assert!(lo - 1e-9 <= 10.0 && 10.0 <= hi + 1e-9);
    }

    #[test]
    fn test_histogram_empty() {
        let histogram = Histogram::build(MONETARY, &[], HISTOGRAM_BINS);

        assert_eq!(histogram.total(), 0);
        assert_eq!(histogram.counts.len(), HISTOGRAM_BINS);
    }
}
