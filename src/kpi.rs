//! Headline metrics over the filtered customer set

use crate::data::{FREQUENCY, MONETARY, RECENCY};
use crate::filter::Selection;

/// Shown in place of a metric whose source column is missing
pub const PLACEHOLDER: &str = "N/A";

/// The four KPI tiles
#[derive(Debug, Clone, PartialEq)]
pub struct Kpis {
    pub total_customers: usize,
    /// Active filter label shown under the customer count
    pub filter_label: String,
    pub avg_monetary: Option<f64>,
    pub avg_frequency: Option<f64>,
    pub avg_recency: Option<f64>,
}

/// A rendered tile: label, value and optional caption
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KpiTile {
    pub label: &'static str,
    pub value: String,
    pub caption: Option<String>,
}

impl Kpis {
    /// Compute every metric independently over the selected rows
    pub fn compute(selection: &Selection) -> Self {
        let rows = &selection.rows;
        Self {
            total_customers: rows.len(),
            filter_label: selection.filter.label().to_string(),
            avg_monetary: rows.mean(MONETARY),
            avg_frequency: rows.mean(FREQUENCY),
            avg_recency: rows.mean(RECENCY),
        }
    }

    pub fn customer_value_display(&self) -> String {
        self.avg_monetary
            .map(group_thousands)
            .unwrap_or_else(|| PLACEHOLDER.to_string())
    }

    pub fn frequency_display(&self) -> String {
        self.avg_frequency
            .map(|v| format!("{:.1}", v))
            .unwrap_or_else(|| PLACEHOLDER.to_string())
    }

    pub fn recency_display(&self) -> String {
        self.avg_recency
            .map(|v| format!("{:.0} days", v))
            .unwrap_or_else(|| PLACEHOLDER.to_string())
    }

    pub fn tiles(&self) -> [KpiTile; 4] {
        [
            KpiTile {
                label: "Total Customers",
                value: self.total_customers.to_string(),
                caption: Some(self.filter_label.clone()),
            },
            KpiTile {
                label: "Avg Customer Value",
                value: self.customer_value_display(),
                caption: None,
            },
            KpiTile {
                label: "Avg Purchase Frequency",
                value: self.frequency_display(),
                caption: None,
            },
            KpiTile {
                label: "Avg Recency",
                value: self.recency_display(),
                caption: None,
            },
        ]
    }
}

/// Format a whole number with comma thousands separators
pub fn group_thousands(value: f64) -> String {
    let digits = format!("{:.0}", value.abs());
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    if value < 0.0 && digits != "0" {
        grouped.insert(0, '-');
    }
    grouped
}
