//! Interactive dashboard server
//!
//! Every request re-runs the full render for the requested segment. Loading is
//! memoized by source identity; the cache belongs to the server, not to the
//! report computation.

use crate::data::{load_customer_table, CustomerTable, LoadError};
use crate::filter::SegmentFilter;
use crate::html::{render_load_failure, render_page, PageOptions};
use crate::report::Report;
use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::Html,
    routing::get,
    Router,
};
use serde::Deserialize;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::{Instant, SystemTime};
use tower_http::trace::TraceLayer;
use tracing::{debug, error, info};

/// Identity of the source file at load time
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceSignature {
    pub path: PathBuf,
    pub modified: Option<SystemTime>,
    pub len: u64,
}

impl SourceSignature {
    pub fn probe(path: &Path) -> Result<Self, LoadError> {
        let meta = std::fs::metadata(path).map_err(|source| LoadError::from_io(path, source))?;
        Ok(Self {
            path: path.to_path_buf(),
            modified: meta.modified().ok(),
            len: meta.len(),
        })
    }
}

/// Memoized table keyed by source signature.
///
/// A changed signature replaces the entry; a cached table is never mutated.
#[derive(Debug, Default)]
pub struct TableCache {
    entry: Mutex<Option<(SourceSignature, Arc<CustomerTable>)>>,
}

impl TableCache {
    pub fn get_or_load(&self, path: &Path) -> Result<Arc<CustomerTable>, LoadError> {
        let signature = SourceSignature::probe(path)?;

        let mut entry = self
            .entry
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        if let Some((cached, table)) = entry.as_ref() {
            if *cached == signature {
                debug!(path = %path.display(), "table cache hit");
                return Ok(Arc::clone(table));
            }
        }

        let table = Arc::new(load_customer_table(path)?);
        *entry = Some((signature, Arc::clone(&table)));
        Ok(table)
    }
}

/// Shared server state
pub struct AppState {
    pub source: PathBuf,
    pub page: PageOptions,
    /// Filter used when a request names no segment
    pub default_filter: SegmentFilter,
    /// `None` reloads the file on every request
    pub cache: Option<TableCache>,
}

impl AppState {
    pub fn new(source: PathBuf, title: String, use_cache: bool) -> Self {
        Self {
            source,
            page: PageOptions {
                title,
                interactive: true,
            },
            default_filter: SegmentFilter::All,
            cache: use_cache.then(TableCache::default),
        }
    }

    pub fn with_default_filter(mut self, filter: SegmentFilter) -> Self {
        self.default_filter = filter;
        self
    }

    fn load(&self) -> Result<Arc<CustomerTable>, LoadError> {
        match &self.cache {
            Some(cache) => cache.get_or_load(&self.source),
            None => load_customer_table(&self.source).map(Arc::new),
        }
    }

    /// Load, compute and render one page for the requested filter
    pub fn render(&self, requested: &SegmentFilter) -> crate::Result<String> {
        let start = Instant::now();
        let table = match self.load() {
            Ok(table) => table,
            Err(err) => {
                error!(error = %err, "data loading failed");
                return Ok(render_load_failure(&err, &self.page));
            }
        };

        let report = Report::build(&table, requested)?;
        let html = render_page(&report, &self.page)?;
        debug!(
            segment = %report.filter,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "page rendered"
        );
        Ok(html)
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct DashboardQuery {
    pub segment: Option<String>,
}

async fn health_check() -> &'static str {
    "ok"
}

async fn dashboard(
    State(state): State<Arc<AppState>>,
    Query(query): Query<DashboardQuery>,
) -> Result<Html<String>, (StatusCode, String)> {
    let requested = match query.segment.as_deref() {
        Some(raw) => SegmentFilter::parse(raw),
        None => state.default_filter.clone(),
    };

    let rendered = tokio::task::spawn_blocking(move || state.render(&requested))
        .await
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?;

    match rendered {
        Ok(html) => Ok(Html(html)),
        Err(e) => {
            error!(error = %e, "render failed");
            Err((StatusCode::INTERNAL_SERVER_ERROR, format!("{:#}", e)))
        }
    }
}

pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(dashboard))
        .route("/health", get(health_check))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Serve the dashboard until the process is stopped
pub async fn serve(state: AppState, addr: SocketAddr) -> crate::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Serving {} on http://{}", state.source.display(), listener.local_addr()?);
    axum::serve(listener, build_router(Arc::new(state))).await?;
    Ok(())
}
