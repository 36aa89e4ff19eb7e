//! Customer table loading and schema capabilities using Polars

use polars::prelude::*;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

pub const RECENCY: &str = "Recency";
pub const FREQUENCY: &str = "Frequency";
pub const MONETARY: &str = "Monetary";
pub const SEGMENT: &str = "Segment";

/// The three behavioral metric columns, in display order
pub const RFM_COLUMNS: [&str; 3] = [RECENCY, FREQUENCY, MONETARY];

/// Failure to produce a customer table from the source file.
///
/// Any of these aborts the whole render; the host shows a single notice.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("data file not found: {}", .0.display())]
    NotFound(PathBuf),
    #[error("failed to read {}: {source}", path.display())]
    Unreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse {}: {source}", path.display())]
    Malformed {
        path: PathBuf,
        #[source]
        source: PolarsError,
    },
}

impl LoadError {
    /// Classify a filesystem error for `path`
    pub fn from_io(path: &Path, source: std::io::Error) -> Self {
        if source.kind() == std::io::ErrorKind::NotFound {
            LoadError::NotFound(path.to_path_buf())
        } else {
            LoadError::Unreadable {
                path: path.to_path_buf(),
                source,
            }
        }
    }
}

/// Which optional column groups the loaded schema provides.
///
/// Computed once per table and handed to every rendering step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Capabilities {
    /// All of Recency, Frequency and Monetary are present
    pub has_rfm: bool,
    /// The Segment column is present
    pub has_segment: bool,
}

impl Capabilities {
    pub fn from_frame(frame: &DataFrame) -> Self {
        Self {
            has_rfm: RFM_COLUMNS.iter().all(|name| frame.column(name).is_ok()),
            has_segment: frame.column(SEGMENT).is_ok(),
        }
    }
}

/// Immutable customer table with its schema capabilities
#[derive(Debug, Clone)]
pub struct CustomerTable {
    frame: DataFrame,
    capabilities: Capabilities,
}

impl CustomerTable {
    /// Wrap a raw frame, normalizing the recognized columns.
    ///
    /// RFM columns are cast strictly to `Float64` so a non-numeric value is an
    /// error rather than a silent null. Segment is cast to a string column.
    pub fn from_frame(frame: DataFrame) -> PolarsResult<Self> {
        let mut casts = Vec::new();
        for name in RFM_COLUMNS {
            if frame.column(name).is_ok() {
                casts.push(col(name).strict_cast(DataType::Float64));
            }
        }
        if frame.column(SEGMENT).is_ok() {
            casts.push(col(SEGMENT).cast(DataType::String));
        }

        let frame = if casts.is_empty() {
            frame
        } else {
            frame.lazy().with_columns(casts).collect()?
        };

        let capabilities = Capabilities::from_frame(&frame);
        Ok(Self {
            frame,
            capabilities,
        })
    }

    /// Build a table sharing this table's capabilities over a subset of rows
    pub(crate) fn with_rows(&self, frame: DataFrame) -> Self {
        Self {
            frame,
            capabilities: self.capabilities,
        }
    }

    pub fn frame(&self) -> &DataFrame {
        &self.frame
    }

    pub fn capabilities(&self) -> Capabilities {
        self.capabilities
    }

    /// Number of customer rows
    pub fn len(&self) -> usize {
        self.frame.height()
    }

    pub fn is_empty(&self) -> bool {
        self.frame.height() == 0
    }

    /// Number of columns in the source file
    pub fn feature_count(&self) -> usize {
        self.frame.width()
    }

    pub fn column_names(&self) -> Vec<String> {
        self.frame
            .get_column_names()
            .into_iter()
            .map(|name| name.to_string())
            .collect()
    }

    /// Non-null values of a numeric column, or `None` if the column is absent
    pub fn numeric_values(&self, name: &str) -> PolarsResult<Option<Vec<f64>>> {
        let Ok(series) = self.frame.column(name) else {
            return Ok(None);
        };
        let values = series.f64()?.into_iter().flatten().collect();
        Ok(Some(values))
    }

    /// Mean of a numeric column; `None` if the column is absent or has no values
    pub fn mean(&self, name: &str) -> Option<f64> {
        self.frame.column(name).ok().and_then(|series| series.mean())
    }
}

/// Load a customer CSV file into an immutable table
///
/// # Arguments
/// * `path` - Path to a CSV file with a header row
///
/// # Returns
/// * `CustomerTable` with RFM columns normalized to floats
pub fn load_customer_table(path: impl AsRef<Path>) -> Result<CustomerTable, LoadError> {
    let path = path.as_ref();
    if let Err(source) = std::fs::metadata(path) {
        return Err(LoadError::from_io(path, source));
    }

    let malformed = |source| LoadError::Malformed {
        path: path.to_path_buf(),
        source,
    };

    // Infer over every row so a late decimal widens a column to Float64
    let raw = CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(None)
        .try_into_reader_with_file_path(Some(path.to_path_buf()))
        .and_then(|reader| reader.finish())
        .map_err(malformed)?;
    debug!(rows = raw.height(), "parsed csv");

    let table = CustomerTable::from_frame(raw).map_err(malformed)?;
    info!(
        path = %path.display(),
        rows = table.len(),
        columns = table.feature_count(),
        has_rfm = table.capabilities().has_rfm,
        has_segment = table.capabilities().has_segment,
        "customer table loaded"
    );

    Ok(table)
}
