//! CLI entry point for the font cache.

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use font_cache_core::download::FontFileClient;
use font_cache_core::source::{JsonFileMetadataSource, ManifestResolver};
use font_cache_core::{CacheConfig, FetchPipeline, FontService, FontStore, RetryPolicy};
use serde::Serialize;
use tracing::{debug, info};

mod cli;

use cli::{Args, Command, FetchArgs, ListArgs, StatsArgs};

#[derive(Serialize)]
struct FailureOutput {
    variant: String,
    format: String,
    url: String,
    error: String,
}

#[derive(Serialize)]
struct FetchOutput<'a> {
    store_key: &'a str,
    subsets: &'a [String],
    from_cache: bool,
    files: &'a [font_cache_core::ResolvedFile],
    failures: Vec<FailureOutput>,
    stats: font_cache_core::StoreStats,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Parse CLI arguments first (before tracing, so --help works without logs)
    let args = Args::parse();

    // Priority: RUST_LOG env var > quiet flag > verbose flag > default (info)
    let default_level = if args.quiet {
        "error"
    } else {
        match args.verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    };

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    debug!(?args, "CLI arguments parsed");

    let config = build_config(&args)?;
    info!(
        cache_dir = %config.cache_dir.display(),
        mode = config.mode.as_str(),
        strict = config.strict_mode(),
        "font cache starting"
    );

    match args.command {
        Command::List(list) => run_list(&config, list).await,
        Command::Fetch(fetch) => run_fetch(&config, fetch).await,
        Command::Stats(stats) => run_stats(&config, stats).await,
    }
}

fn build_config(args: &Args) -> Result<CacheConfig> {
    let mut config = CacheConfig::from_env().context("invalid FONT_CACHE_* environment")?;
    if let Some(cache_dir) = &args.cache_dir {
        config.cache_dir.clone_from(cache_dir);
    }
    if let Some(concurrency) = args.concurrency {
        config.concurrency = usize::from(concurrency);
    }
    if let Some(max_attempts) = args.max_attempts {
        config.max_attempts = u32::from(max_attempts);
    }
    if args.strict {
        config.strict = Some(true);
    }
    config.validate()?;
    Ok(config)
}

async fn run_list(config: &CacheConfig, list: ListArgs) -> Result<()> {
    let store = FontStore::new(config);
    store
        .initialize(&JsonFileMetadataSource::new(list.fonts))
        .await?;

    let fonts = store.list_fonts();
    println!("{}", serde_json::to_string_pretty(&fonts)?);
    Ok(())
}

async fn run_stats(config: &CacheConfig, stats: StatsArgs) -> Result<()> {
    let store = FontStore::new(config);
    store
        .initialize(&JsonFileMetadataSource::new(stats.fonts))
        .await?;

    println!("{}", serde_json::to_string_pretty(&store.stats())?);
    Ok(())
}

async fn run_fetch(config: &CacheConfig, fetch: FetchArgs) -> Result<()> {
    let store = Arc::new(FontStore::new(config));
    store
        .initialize(&JsonFileMetadataSource::new(fetch.fonts))
        .await?;

    let resolver = ManifestResolver::from_json_file(&fetch.manifest).await?;
    let client = FontFileClient::with_timeouts(config.connect_timeout_secs, config.read_timeout_secs)
        .with_retry_policy(RetryPolicy::with_max_attempts(config.max_attempts));
    let pipeline = FetchPipeline::new(client, &config.cache_dir, config.concurrency)?;
    let service = FontService::new(Arc::clone(&store), Arc::new(resolver), pipeline);

    let loaded = service
        .load(&fetch.font_id, fetch.subsets.as_slice())
        .await?
        .with_context(|| {
            format!(
                "font {:?} not found for subsets {:?}",
                fetch.font_id, fetch.subsets
            )
        })?;

    let output = FetchOutput {
        store_key: loaded.bundle.store_key(),
        subsets: loaded.bundle.subsets(),
        from_cache: loaded.from_cache,
        files: &loaded.files,
        failures: loaded
            .failures
            .iter()
            .map(|failed| FailureOutput {
                variant: failed.variant.clone(),
                format: failed.format.clone(),
                url: failed.url.clone(),
                error: failed.error.to_string(),
            })
            .collect(),
        stats: store.stats(),
    };
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
