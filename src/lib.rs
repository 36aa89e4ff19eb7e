//! SegmentScope: a customer segmentation dashboard over precomputed RFM data
//!
//! This library loads a customer table that already carries Recency, Frequency,
//! Monetary and Segment columns, computes KPIs and per-segment statistics for a
//! selected segment, and renders them as an HTML page with inline SVG charts.

pub mod cli;
pub mod data;
pub mod filter;
pub mod html;
pub mod insights;
pub mod kpi;
pub mod report;
pub mod segments;
pub mod server;
pub mod viz;

// Re-export public items for easier access
pub use cli::Args;
pub use data::{load_customer_table, Capabilities, CustomerTable, LoadError};
pub use filter::{select, SegmentFilter, Selection};
pub use html::{render_load_failure, render_page, PageOptions};
pub use report::Report;

/// Common result type used throughout the application
pub type Result<T> = anyhow::Result<T>;
