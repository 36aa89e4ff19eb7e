//! Self-contained HTML dashboard page
//!
//! Charts are inlined as SVG so a page works offline as a single file.

use crate::data::LoadError;
use crate::filter::SegmentFilter;
use crate::insights::InsightPanel;
use crate::kpi::Kpis;
use crate::report::{DatasetInfo, Report};
use crate::segments::{Distributions, SegmentCount, SegmentSummary};
use crate::viz;

pub const DEFAULT_TITLE: &str = "Customer Segmentation Analysis Dashboard";

pub const LOAD_FAILED: &str = "Data loading failed";

const INTRO: &str = "This dashboard analyzes customer behaviour using RFM scores and segments customers into distinct groups for targeted marketing strategies.";

/// Page-level settings owned by the host
#[derive(Debug, Clone)]
pub struct PageOptions {
    pub title: String,
    /// Whether the segment selector submits back to a server
    pub interactive: bool,
}

impl Default for PageOptions {
    fn default() -> Self {
        Self {
            title: DEFAULT_TITLE.to_string(),
            interactive: false,
        }
    }
}

pub fn escape_html(raw: &str) -> String {
    raw.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

fn page(title: &str, body: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="UTF-8">
<meta name="viewport" content="width=device-width, initial-scale=1.0">
<title>{title}</title>
<style>{css}</style>
</head>
<body>
<div class="container">
{body}
</div>
</body>
</html>
"#,
        title = escape_html(title),
        css = inline_css(),
        body = body,
    )
}

fn inline_css() -> &'static str {
    r#"
body{font-family:system-ui,-apple-system,Segoe UI,Helvetica,Arial,sans-serif;margin:0;background:#fafafa;color:#222;line-height:1.5;}
.container{max-width:1400px;margin:0 auto;padding:24px;}
h1,h2,h3{margin-bottom:0.3em;}
hr{border:none;border-top:1px solid #ddd;margin:24px 0;}
table{border-collapse:collapse;width:100%;margin:0.5em 0;background:#fff;}
th,td{border:1px solid #ddd;padding:6px 8px;font-size:14px;text-align:left;}
th{background:#f5f5f5;}
.notice{padding:10px 14px;border-radius:6px;margin:8px 0;}
.notice.success{background:#e8f5e9;color:#1b5e20;}
.notice.error{background:#ffebee;color:#b71c1c;}
.notice.warning{background:#fff8e1;color:#8d6e00;}
.notice.info{background:#e3f2fd;color:#0d47a1;}
.filters{display:flex;gap:12px;align-items:center;margin:12px 0;}
.grid{display:grid;gap:16px;}
.grid.cols-2{grid-template-columns:repeat(2,1fr);}
.grid.cols-3{grid-template-columns:repeat(3,1fr);}
.grid.cols-4{grid-template-columns:repeat(4,1fr);}
.tile{background:#fff;border:1px solid #e0e0e0;border-radius:8px;padding:12px 16px;}
.tile .label{font-size:13px;color:#666;}
.tile .value{font-size:28px;font-weight:600;}
.tile .caption{font-size:12px;color:#2e7d32;}
.chart{background:#fff;border:1px solid #e0e0e0;border-radius:8px;padding:8px;}
.chart svg{width:100%;height:auto;}
.insight h3{margin-top:0;}
footer{color:#777;font-size:13px;text-align:center;}
"#
}

/// Render the single failure notice shown when the table cannot be loaded
pub fn render_load_failure(err: &LoadError, options: &PageOptions) -> String {
    let body = format!(
        r#"<div class="notice error"><strong>{}</strong><br><code>{}</code></div>"#,
        LOAD_FAILED,
        escape_html(&err.to_string())
    );
    page(&options.title, &body)
}

/// Render the full dashboard for one report
///
/// # Arguments
/// * `report` - Computed panels for the active selection
/// * `options` - Title and selector behavior
///
/// # Returns
/// * Complete HTML document
pub fn render_page(report: &Report, options: &PageOptions) -> crate::Result<String> {
    let mut body = String::new();

    body.push_str(r#"<div class="notice success">Data loaded successfully</div>"#);
    body.push_str(&format!(
        "<h1>{}</h1>\n<p>{}</p>\n<hr>\n",
        escape_html(&options.title),
        INTRO
    ));

    body.push_str(&render_filters(report, options));
    body.push_str(&render_dataset(&report.dataset));
    body.push_str("<hr>\n");
    body.push_str(&render_kpis(&report.kpis));
    body.push_str("<hr>\n<h2>Customer Segmentation Visualization</h2>\n");

    if let Some(counts) = &report.segment_overview {
        body.push_str(&render_segment_overview(counts)?);
    }
    if let Some(distributions) = &report.distributions {
        body.push_str(&render_distributions(distributions)?);
    }
    if let Some(stats) = &report.segment_stats {
        body.push_str(&render_segment_stats(stats)?);
    }

    body.push_str("<hr>\n");
    body.push_str(&render_insights(&report.insights));
    body.push_str("<hr>\n<footer>Customer Segmentation Analysis Project</footer>\n");

    Ok(page(&options.title, &body))
}

fn render_filters(report: &Report, options: &PageOptions) -> String {
    let mut out = String::from("<section class=\"filters\">\n<h3>Filters</h3>\n");

    if let Some(segment_options) = &report.options {
        let items: String = segment_options
            .iter()
            .map(|value| {
                let selected = SegmentFilter::parse(value) == report.filter;
                format!(
                    "<option value=\"{v}\"{sel}>{v}</option>",
                    v = escape_html(value),
                    sel = if selected { " selected" } else { "" }
                )
            })
            .collect();

        if options.interactive {
            out.push_str(&format!(
                r#"<form method="get" action="/"><label for="segment">Select segment</label> <select id="segment" name="segment" onchange="this.form.submit()">{}</select> <noscript><button type="submit">Apply</button></noscript></form>"#,
                items
            ));
        } else {
            out.push_str(&format!(
                r#"<label for="segment">Select segment</label> <select id="segment" disabled>{}</select>"#,
                items
            ));
        }
    }

    if let Some(warning) = &report.warning {
        out.push_str(&format!(
            "<div class=\"notice warning\">{}</div>",
            escape_html(warning)
        ));
    }

    out.push_str("</section>\n");
    out
}

fn render_dataset(dataset: &DatasetInfo) -> String {
    let header: String = dataset
        .columns
        .iter()
        .map(|c| format!("<th>{}</th>", escape_html(c)))
        .collect();
    let rows: String = dataset
        .preview
        .iter()
        .map(|row| {
            let cells: String = row
                .iter()
                .map(|v| format!("<td>{}</td>", escape_html(v)))
                .collect();
            format!("<tr>{}</tr>\n", cells)
        })
        .collect();

    format!(
        r#"<details id="dataset-info">
<summary>Dataset Information</summary>
<div class="grid cols-3">
{total}
{filtered}
{features}
</div>
<table>
<thead><tr>{header}</tr></thead>
<tbody>
{rows}</tbody>
</table>
</details>
"#,
        total = tile("Total customers", &dataset.total_customers.to_string(), None),
        filtered = tile(
            "Filtered Customers",
            &dataset.filtered_customers.to_string(),
            None
        ),
        features = tile("Features", &dataset.features.to_string(), None),
        header = header,
        rows = rows,
    )
}

fn tile(label: &str, value: &str, caption: Option<&str>) -> String {
    let caption = caption
        .map(|c| format!("<div class=\"caption\">{}</div>", escape_html(c)))
        .unwrap_or_default();
    format!(
        "<div class=\"tile\"><div class=\"label\">{}</div><div class=\"value\">{}</div>{}</div>",
        escape_html(label),
        escape_html(value),
        caption
    )
}

fn render_kpis(kpis: &Kpis) -> String {
    let tiles: String = kpis
        .tiles()
        .iter()
        .map(|t| tile(t.label, &t.value, t.caption.as_deref()))
        .collect();
    format!(
        "<h2>Key Performance Indicators</h2>\n<section id=\"kpis\" class=\"grid cols-4\">{}</section>\n",
        tiles
    )
}

fn chart(svg: &str) -> String {
    format!("<div class=\"chart\">{}</div>", svg)
}

fn render_segment_overview(counts: &[SegmentCount]) -> crate::Result<String> {
    Ok(format!(
        r#"<section id="segment-overview" class="grid cols-2">
<div><h3>Customer Distribution by Segment</h3>{share}</div>
<div><h3>Customers per segment</h3>{count}</div>
</section>
"#,
        share = chart(&viz::segment_share_chart(counts)?),
        count = chart(&viz::segment_count_chart(counts)?),
    ))
}

fn render_distributions(distributions: &Distributions) -> crate::Result<String> {
    let mut charts = String::new();
    for histogram in distributions.iter() {
        charts.push_str(&chart(&viz::histogram_chart(histogram)?));
    }
    Ok(format!(
        "<hr>\n<h3>RFM Metrics Distribution</h3>\n<section id=\"distributions\" class=\"grid cols-3\">{}</section>\n",
        charts
    ))
}

fn fmt2(value: f64) -> String {
    if value.is_finite() {
        format!("{:.2}", value)
    } else {
        crate::kpi::PLACEHOLDER.to_string()
    }
}

fn render_segment_stats(stats: &[SegmentSummary]) -> crate::Result<String> {
    let rows: String = stats
        .iter()
        .map(|s| {
            format!(
                "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>\n",
                escape_html(&s.segment),
                fmt2(s.avg_recency),
                fmt2(s.avg_frequency),
                fmt2(s.avg_monetary),
                fmt2(s.total_revenue),
                s.customers
            )
        })
        .collect();

    Ok(format!(
        r#"<hr>
<h3>Segment Statistics</h3>
<table id="segment-stats">
<thead><tr><th>Segment</th><th>Avg Recency</th><th>Avg Frequency</th><th>Avg Monetary</th><th>Total Revenue</th><th>Customer Count</th></tr></thead>
<tbody>
{rows}</tbody>
</table>
<hr>
<h3>Segment Profile Comparison</h3>
{chart}
"#,
        rows = rows,
        chart = chart(&viz::segment_profile_chart(stats)?),
    ))
}

fn render_insights(panel: &InsightPanel) -> String {
    let mut out = String::from("<h2>Key Insights &amp; Recommendations</h2>\n<section id=\"insights\">\n");
    match panel {
        InsightPanel::Grid(rows) => {
            for row in rows {
                out.push_str("<div class=\"grid cols-3\">");
                for card in row {
                    out.push_str(&format!(
                        "<div class=\"insight\"><h3>{} {}</h3><p style=\"color:{}\">{}</p></div>",
                        card.advisory.marker(),
                        escape_html(&card.segment),
                        card.advisory.tone().css_color(),
                        card.advisory.text()
                    ));
                }
                out.push_str("</div>\n");
            }
        }
        InsightPanel::Notice(notice) => {
            out.push_str(&format!("<div class=\"notice info\">{}</div>\n", notice));
        }
    }
    out.push_str("</section>\n");
    out
}
