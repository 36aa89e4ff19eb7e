//! Chart rendering to inline SVG using Plotters

use crate::segments::{Histogram, SegmentCount, SegmentSummary};
use plotters::element::Pie;
use plotters::prelude::*;

const CHART_SIZE: (u32, u32) = (640, 420);

/// Qualitative Set3 palette for the segment proportion chart
const SET3: [RGBColor; 12] = [
    RGBColor(141, 211, 199),
    RGBColor(255, 255, 179),
    RGBColor(190, 186, 218),
    RGBColor(251, 128, 114),
    RGBColor(128, 177, 211),
    RGBColor(253, 180, 98),
    RGBColor(179, 222, 105),
    RGBColor(252, 205, 229),
    RGBColor(217, 217, 217),
    RGBColor(188, 128, 189),
    RGBColor(204, 235, 197),
    RGBColor(255, 237, 111),
];

/// Qualitative Set2 palette for the per-segment count chart
const SET2: [RGBColor; 8] = [
    RGBColor(102, 194, 165),
    RGBColor(252, 141, 98),
    RGBColor(141, 160, 203),
    RGBColor(231, 138, 195),
    RGBColor(166, 216, 84),
    RGBColor(255, 217, 47),
    RGBColor(229, 196, 148),
    RGBColor(179, 179, 179),
];

/// One color per mean metric in the comparison chart
const PROFILE_COLORS: [RGBColor; 3] = [
    RGBColor(99, 110, 250),
    RGBColor(239, 85, 59),
    RGBColor(0, 204, 150),
];

/// Fill color of each metric histogram
pub fn histogram_color(metric: &str) -> RGBColor {
    match metric {
        "Recency" => RGBColor(0xE2, 0x6A, 0xEF),
        "Frequency" => RGBColor(0x6A, 0xBC, 0xEF),
        "Monetary" => RGBColor(0x6A, 0xEF, 0x7C),
        _ => BLUE,
    }
}

/// Label for the bar centered on `x`, or nothing between categories
fn category_label(names: &[String], x: f64) -> String {
    let idx = x.round();
    if idx < 0.0 || (x - idx).abs() > 1e-6 {
        return String::new();
    }
    names.get(idx as usize).cloned().unwrap_or_default()
}

/// Pie chart of customer share per segment
pub fn segment_share_chart(counts: &[SegmentCount]) -> crate::Result<String> {
    let mut svg = String::new();
    {
        let root = SVGBackend::with_string(&mut svg, CHART_SIZE).into_drawing_area();
        root.fill(&WHITE)?;
        let area = root.titled("Segment Distribution", ("sans-serif", 22))?;

        let total: usize = counts.iter().map(|c| c.count).sum();
        if total > 0 {
            let (width, height) = area.dim_in_pixel();
            let center = (width as i32 / 2, height as i32 / 2);
            let radius = f64::from(width.min(height)) * 0.35;
            let sizes: Vec<f64> = counts.iter().map(|c| c.count as f64).collect();
            let colors: Vec<RGBColor> = (0..counts.len()).map(|i| SET3[i % SET3.len()]).collect();
            let labels: Vec<&str> = counts.iter().map(|c| c.segment.as_str()).collect();

            let mut pie = Pie::new(&center, &radius, &sizes, &colors, &labels);
            pie.label_style(("sans-serif", 14).into_font().color(&BLACK));
            pie.percentages(("sans-serif", 13).into_font().color(&BLACK));
            area.draw(&pie)?;
        }

        root.present()?;
    }
    Ok(svg)
}

/// Bar chart of customers per segment
pub fn segment_count_chart(counts: &[SegmentCount]) -> crate::Result<String> {
    let names: Vec<String> = counts.iter().map(|c| c.segment.clone()).collect();
    let max_count = counts.iter().map(|c| c.count).max().unwrap_or(1).max(1) as f64;

    let mut svg = String::new();
    {
        let root = SVGBackend::with_string(&mut svg, CHART_SIZE).into_drawing_area();
        root.fill(&WHITE)?;

        let mut chart = ChartBuilder::on(&root)
            .caption("Number of customers by segment", ("sans-serif", 22))
            .margin(10)
            .x_label_area_size(40)
            .y_label_area_size(50)
            .build_cartesian_2d(-0.5f64..(names.len().max(1) as f64 - 0.5), 0f64..(max_count * 1.1))?;

        chart
            .configure_mesh()
            .disable_x_mesh()
            .x_labels(names.len().max(1))
            .x_label_formatter(&|x| category_label(&names, *x))
            .x_desc("Segment")
            .y_desc("Count")
            .axis_desc_style(("sans-serif", 15))
            .draw()?;

        for (idx, count) in counts.iter().enumerate() {
            let color = SET2[idx % SET2.len()];
            let x = idx as f64;
            chart.draw_series(std::iter::once(Rectangle::new(
                [(x - 0.4, 0.0), (x + 0.4, count.count as f64)],
                color.filled(),
            )))?;
        }

        root.present()?;
    }
    Ok(svg)
}

/// Histogram of one metric over the filtered customers
pub fn histogram_chart(histogram: &Histogram) -> crate::Result<String> {
    let max_count = histogram.counts.iter().copied().max().unwrap_or(0).max(1) as f64;
    let color = histogram_color(histogram.metric);
    let title = format!("{} Distribution", histogram.metric);

    let mut svg = String::new();
    {
        let root = SVGBackend::with_string(&mut svg, CHART_SIZE).into_drawing_area();
        root.fill(&WHITE)?;

        let mut chart = ChartBuilder::on(&root)
            .caption(&title, ("sans-serif", 22))
            .margin(10)
            .x_label_area_size(40)
            .y_label_area_size(50)
            .build_cartesian_2d(histogram.lower..histogram.upper, 0f64..(max_count * 1.1))?;

        chart
            .configure_mesh()
            .disable_x_mesh()
            .x_desc(histogram.metric)
            .y_desc("count")
            .axis_desc_style(("sans-serif", 15))
            .draw()?;

        chart.draw_series(
            histogram
                .counts
                .iter()
                .enumerate()
                .filter(|&(_, &count)| count > 0)
                .map(|(idx, &count)| {
                    let (start, end) = histogram.bin_edges(idx);
                    Rectangle::new([(start, 0.0), (end, count as f64)], color.filled())
                }),
        )?;

        root.present()?;
    }
    Ok(svg)
}

/// Grouped bars of the three mean metrics, one group per segment
pub fn segment_profile_chart(stats: &[SegmentSummary]) -> crate::Result<String> {
    let names: Vec<String> = stats.iter().map(|s| s.segment.clone()).collect();
    let max_value = stats
        .iter()
        .flat_map(|s| s.profile())
        .map(|(_, v)| v)
        .filter(|v| v.is_finite())
        .fold(0f64, f64::max)
        .max(1.0);

    let mut svg = String::new();
    {
        let root = SVGBackend::with_string(&mut svg, (960, 460)).into_drawing_area();
        root.fill(&WHITE)?;

        // Layout is configured once; each metric only adds a series.
        let mut chart = ChartBuilder::on(&root)
            .caption("Average RFM Values by segment", ("sans-serif", 22))
            .margin(10)
            .x_label_area_size(40)
            .y_label_area_size(60)
            .build_cartesian_2d(-0.5f64..(names.len().max(1) as f64 - 0.5), 0f64..(max_value * 1.1))?;

        chart
            .configure_mesh()
            .disable_x_mesh()
            .x_labels(names.len().max(1))
            .x_label_formatter(&|x| category_label(&names, *x))
            .x_desc("Segment")
            .y_desc("Value")
            .axis_desc_style(("sans-serif", 15))
            .draw()?;

        let bar_width = 0.8 / PROFILE_COLORS.len() as f64;
        for (metric_idx, color) in PROFILE_COLORS.iter().copied().enumerate() {
            let Some((metric, _)) = stats.first().map(|s| s.profile()[metric_idx]) else {
                break;
            };
            chart
                .draw_series(stats.iter().enumerate().map(|(seg_idx, s)| {
                    let value = s.profile()[metric_idx].1;
                    let value = if value.is_finite() { value } else { 0.0 };
                    let start = seg_idx as f64 - 0.4 + bar_width * metric_idx as f64;
                    Rectangle::new([(start, 0.0), (start + bar_width, value)], color.filled())
                }))?
                .label(metric)
                .legend(move |(x, y)| Rectangle::new([(x, y - 5), (x + 10, y + 5)], color.filled()));
        }

        chart
            .configure_series_labels()
            .background_style(&WHITE.mix(0.8))
            .border_style(&BLACK)
            .draw()?;

        root.present()?;
    }
    Ok(svg)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::segments::HISTOGRAM_BINS;

    fn counts() -> Vec<SegmentCount> {
        vec![
            SegmentCount {
                segment: "VIP Customers".to_string(),
                count: 1,
            },
            SegmentCount {
                segment: "Lost Customers".to_string(),
                count: 1,
            },
        ]
    }

    #[test]
    fn test_segment_share_chart() {
        let svg = segment_share_chart(&counts()).unwrap();
        assert!(svg.contains("<svg"));
        assert!(svg.contains("Segment Distribution"));
        assert!(svg.contains("Lost Customers"));
    }

    #[test]
    fn test_segment_count_chart() {
        let svg = segment_count_chart(&counts()).unwrap();
        assert!(svg.contains("Number of customers by segment"));
    }

    #[test]
    fn test_histogram_chart() {
        let histogram = Histogram::build("Recency", &[10.0, 12.0, 40.0], HISTOGRAM_BINS);

        let svg = histogram_chart(&histogram).unwrap();
        assert!(svg.contains("Recency Distribution"));
    }

    #[test]
    fn test_segment_profile_chart() {
        let stats = vec![SegmentSummary {
            segment: "VIP Customers".to_string(),
            avg_recency: 10.0,
            avg_frequency: 2.0,
            avg_monetary: 100.0,
            total_revenue: 100.0,
            customers: 1,
        }];

        let svg = segment_profile_chart(&stats).unwrap();
        assert!(svg.contains("Average RFM Values by segment"));
        assert!(svg.contains("Avg Monetary"));
    }

    #[test]
    fn test_category_label() {
        let names = vec!["A".to_string(), "B".to_string()];
        assert_eq!(category_label(&names, 1.0), "B");
        assert_eq!(category_label(&names, 0.5), "");
        assert_eq!(category_label(&names, -1.0), "");
    }
}
