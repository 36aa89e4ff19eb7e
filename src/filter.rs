//! Segment filter selection over a customer table

use crate::data::{CustomerTable, SEGMENT};
use polars::prelude::*;
use std::fmt;
use tracing::warn;

/// Label of the catch-all filter value
pub const ALL: &str = "All";

pub const NO_SEGMENT_WARNING: &str = "No segment column found";

/// The user's segment choice
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SegmentFilter {
    #[default]
    All,
    Segment(String),
}

impl SegmentFilter {
    /// Interpret a raw control value; empty or "All" means no filter
    pub fn parse(raw: &str) -> Self {
        let raw = raw.trim();
        if raw.is_empty() || raw == ALL {
            Self::All
        } else {
            Self::Segment(raw.to_string())
        }
    }

    pub fn label(&self) -> &str {
        match self {
            Self::All => ALL,
            Self::Segment(name) => name,
        }
    }

    pub fn is_all(&self) -> bool {
        matches!(self, Self::All)
    }
}

impl fmt::Display for SegmentFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// The effective filter and the rows it selects
#[derive(Debug, Clone)]
pub struct Selection {
    /// Filter actually applied, which may differ from the requested one
    pub filter: SegmentFilter,
    pub rows: CustomerTable,
    /// User-visible warning when the request could not be honored
    pub warning: Option<String>,
}

/// Distinct non-null segment labels in first-seen order
pub fn distinct_segments(table: &CustomerTable) -> PolarsResult<Vec<String>> {
    let Ok(series) = table.frame().column(SEGMENT) else {
        return Ok(Vec::new());
    };

    let mut seen: Vec<String> = Vec::new();
    for label in series.str()?.into_iter().flatten() {
        if !seen.iter().any(|s| s == label) {
            seen.push(label.to_string());
        }
    }
    Ok(seen)
}

/// Values offered by the selector: "All" followed by each segment.
///
/// Returns `None` when the table has no Segment column, so no selector is shown.
pub fn segment_options(table: &CustomerTable) -> PolarsResult<Option<Vec<String>>> {
    if !table.capabilities().has_segment {
        return Ok(None);
    }
    let mut options = vec![ALL.to_string()];
    options.extend(distinct_segments(table)?);
    Ok(Some(options))
}

/// Apply the requested filter to the table
///
/// # Arguments
/// * `table` - Full customer table
/// * `requested` - Filter chosen by the user
///
/// # Returns
/// * `Selection` whose rows are a subset of `table`, equal to it for "All"
pub fn select(table: &CustomerTable, requested: &SegmentFilter) -> PolarsResult<Selection> {
    if !table.capabilities().has_segment {
        warn!("{}", NO_SEGMENT_WARNING);
        return Ok(Selection {
            filter: SegmentFilter::All,
            rows: table.clone(),
            warning: Some(NO_SEGMENT_WARNING.to_string()),
        });
    }

    let SegmentFilter::Segment(name) = requested else {
        return Ok(Selection {
            filter: SegmentFilter::All,
            rows: table.clone(),
            warning: None,
        });
    };

    if !distinct_segments(table)?.iter().any(|s| s == name) {
        warn!(segment = %name, "requested segment not present, showing all");
        return Ok(Selection {
            filter: SegmentFilter::All,
            rows: table.clone(),
            warning: Some(format!("Segment '{}' not found in data, showing all", name)),
        });
    }

    let rows = table
        .frame()
        .clone()
        .lazy()
        .filter(col(SEGMENT).eq(lit(name.as_str())))
        .collect()?;

    Ok(Selection {
        filter: requested.clone(),
        rows: table.with_rows(rows),
        warning: None,
    })
}
