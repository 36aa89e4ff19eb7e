//! Command-line interface definitions and argument parsing

use crate::filter::SegmentFilter;
use crate::html::DEFAULT_TITLE;
use clap::{Args as ClapArgs, Parser, Subcommand};
use std::net::SocketAddr;
use std::path::PathBuf;

/// Customer segmentation dashboard over precomputed RFM data
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,

    /// Log level (trace, debug, info, warn, error); RUST_LOG takes precedence
    #[arg(long, global = true, env = "SEGMENTSCOPE_LOG", default_value = "info")]
    pub log_level: String,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Write the dashboard for one segment to an HTML file
    Render {
        #[command(flatten)]
        source: SourceArgs,

        /// Output path for the HTML page
        #[arg(short, long, default_value = "dashboard.html")]
        output: PathBuf,
    },
    /// Print KPIs and segment statistics to the console
    Summary {
        #[command(flatten)]
        source: SourceArgs,
    },
    /// Serve the dashboard with a live segment selector
    Serve {
        #[command(flatten)]
        source: SourceArgs,

        /// Address to listen on
        #[arg(short, long, env = "SEGMENTSCOPE_BIND", default_value = "127.0.0.1:8501")]
        bind: SocketAddr,

        /// Reload the data file on every request instead of caching it
        #[arg(long)]
        no_cache: bool,
    },
}

/// Input options shared by every subcommand
#[derive(ClapArgs, Debug, Clone)]
pub struct SourceArgs {
    /// Path to the customer CSV file
    #[arg(short, long, env = "SEGMENTSCOPE_DATA", default_value = "data/finalRFM_data.csv")]
    pub data: PathBuf,

    /// Segment to show, or "All"; for serve, the default when a request names none
    #[arg(short, long, default_value = "All")]
    pub segment: String,

    /// Page title
    #[arg(long, default_value = DEFAULT_TITLE)]
    pub title: String,
}

impl SourceArgs {
    pub fn filter(&self) -> SegmentFilter {
        SegmentFilter::parse(&self.segment)
    }
}
