//! CLI argument definitions using clap derive macros.

use std::path::PathBuf;

use clap::{Args as ClapArgs, Parser, Subcommand};

/// Fetch and cache web font files.
#[derive(Parser, Debug)]
#[command(name = "font-cache")]
#[command(author, version, about)]
pub struct Args {
    /// Increase output verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Cache directory (overrides FONT_CACHE_DIR)
    #[arg(long, global = true)]
    pub cache_dir: Option<PathBuf>,

    /// Maximum concurrent downloads (1-100, overrides FONT_CACHE_CONCURRENCY)
    #[arg(short = 'c', long, global = true, value_parser = clap::value_parser!(u8).range(1..=100))]
    pub concurrency: Option<u8>,

    /// Attempts per font file (1-10, overrides FONT_CACHE_MAX_ATTEMPTS)
    #[arg(short = 'r', long, global = true, value_parser = clap::value_parser!(u8).range(1..=10))]
    pub max_attempts: Option<u8>,

    /// Treat duplicate cache writes as errors
    #[arg(long, global = true)]
    pub strict: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// List fonts known to the metadata file
    List(ListArgs),
    /// Download the files of one font and print the result as JSON
    Fetch(FetchArgs),
    /// Load the metadata file and print store statistics as JSON
    Stats(StatsArgs),
}

#[derive(ClapArgs, Debug)]
pub struct ListArgs {
    /// JSON array of font descriptors
    #[arg(long)]
    pub fonts: PathBuf,
}

#[derive(ClapArgs, Debug)]
pub struct StatsArgs {
    /// JSON array of font descriptors
    #[arg(long)]
    pub fonts: PathBuf,
}

#[derive(ClapArgs, Debug)]
pub struct FetchArgs {
    /// JSON array of font descriptors
    #[arg(long)]
    pub fonts: PathBuf,

    /// JSON object mapping font ids to variant candidates
    #[arg(long)]
    pub manifest: PathBuf,

    /// Font id to fetch
    pub font_id: String,

    /// Comma-separated subsets (default subset of the font when omitted)
    #[arg(short, long, value_delimiter = ',')]
    pub subsets: Vec<String>,
}
