//! SegmentScope: customer segmentation dashboard
//!
//! This is the main entrypoint that wires configuration, logging and the
//! render, summary and serve commands.

use anyhow::{Context, Result};
use clap::Parser;
use segmentscope::cli::{Command, SourceArgs};
use segmentscope::report::print_report_summary;
use segmentscope::server::{self, AppState};
use segmentscope::{load_customer_table, render_load_failure, render_page, Args, PageOptions, Report};
use std::path::Path;
use std::time::Instant;
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command-line arguments
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| args.log_level.parse().unwrap_or_default()),
        )
        .init();

    if args.verbose {
        println!("SegmentScope - Customer Segmentation Dashboard");
        println!("==============================================\n");
    }

    match &args.command {
        Command::Render { source, output } => run_render(source, output, args.verbose),
        Command::Summary { source } => run_summary(source, args.verbose),
        Command::Serve {
            source,
            bind,
            no_cache,
        } => {
            let state = AppState::new(source.data.clone(), source.title.clone(), !no_cache)
                .with_default_filter(source.filter());
            server::serve(state, *bind).await
        }
    }
}

/// Render one page to disk
fn run_render(source: &SourceArgs, output: &Path, verbose: bool) -> Result<()> {
    let start_time = Instant::now();
    let options = PageOptions {
        title: source.title.clone(),
        interactive: false,
    };

    if verbose {
        println!("Loading data from: {}", source.data.display());
    }

    let table = match load_customer_table(&source.data) {
        Ok(table) => table,
        Err(err) => {
            error!(error = %err, "data loading failed");
            std::fs::write(output, render_load_failure(&err, &options))
                .with_context(|| format!("writing {}", output.display()))?;
            return Err(err).context("Data loading failed");
        }
    };
    println!("✓ Data loaded: {} customers", table.len());

    let report = Report::build(&table, &source.filter())?;
    if let Some(warning) = &report.warning {
        println!("Warning: {}", warning);
    }

    let html = render_page(&report, &options)?;
    std::fs::write(output, html).with_context(|| format!("writing {}", output.display()))?;

    info!(segment = %report.filter, output = %output.display(), "dashboard written");
    println!("✓ Dashboard saved to: {}", output.display());
    if verbose {
        println!(
            "  Processing time: {:.2}s",
            start_time.elapsed().as_secs_f64()
        );
    }

    Ok(())
}

/// Print the report to the console
fn run_summary(source: &SourceArgs, verbose: bool) -> Result<()> {
    let start_time = Instant::now();

    let table = load_customer_table(&source.data).context("Data loading failed")?;
    let report = Report::build(&table, &source.filter())?;
    print_report_summary(&report);

    if verbose {
        println!(
            "\nProcessing time: {:.2}s",
            start_time.elapsed().as_secs_f64()
        );
    }

    Ok(())
}
