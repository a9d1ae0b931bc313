//! bgg-enricher - BoardGameGeek batch enrichment tool
//!
//! Reads a ranked candidate list (data dump archive or saved JSON), enriches
//! it through the XML API in paced batches and writes the detailed records.

use std::fs::OpenOptions;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Instant;

use anyhow::{Context, Result};
use bgg_common::config::{load_toml_config, resolve_config_path, TomlConfig, CONFIG_ENV_VAR};
use bgg_common::human_time::format_elapsed;
use bgg_common::persistence::{load_basic_records, save_basic_records, save_detailed_records};
use bgg_common::{BasicRecord, ErrorJournal};
use bgg_enricher::config::{resolve_bearer_token, BEARER_TOKEN_ENV_VAR};
use bgg_enricher::services::{
    BatchEnricher, BggApiClient, DataDumpReader, EnrichSettings, JsonCheckpointSink,
    XmlPayloadParser,
};
use bgg_enricher::RunSummary;
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Command-line arguments for bgg-enricher
#[derive(Parser, Debug)]
#[command(name = "bgg-enricher")]
#[command(about = "Enrich ranked BoardGameGeek games with detailed API data")]
#[command(version)]
struct Args {
    /// TOML config file
    #[arg(short, long, env = CONFIG_ENV_VAR)]
    config: Option<PathBuf>,

    /// API bearer token
    #[arg(long, env = BEARER_TOKEN_ENV_VAR, hide_env_values = true)]
    bearer_token: Option<String>,

    /// Number of games to read from the data dump
    #[arg(short = 'n', long)]
    count: Option<usize>,

    /// 0-based index in the candidate list to resume from
    #[arg(short, long)]
    start_position: Option<usize>,

    /// IDs per API request
    #[arg(short, long)]
    batch_size: Option<usize>,

    /// Initial delay between batches, in milliseconds
    #[arg(short, long)]
    delay_ms: Option<u64>,

    /// Detailed output JSON file
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Data dump archive to read candidates from
    #[arg(long, conflicts_with = "load_from_file")]
    data_dump: Option<PathBuf>,

    /// Read candidates from a saved basic JSON file instead of the data dump
    #[arg(long)]
    load_from_file: Option<PathBuf>,

    /// Only build the candidate list, do not call the API
    #[arg(long)]
    skip_details: bool,

    /// Log level (trace, debug, info, warn, error); RUST_LOG takes precedence
    #[arg(long)]
    log_level: Option<String>,
}

impl Args {
    /// Overlay command-line values on the file configuration
    fn apply_to(&self, config: &mut TomlConfig) {
        let settings = &mut config.settings;
        if let Some(count) = self.count {
            settings.count = count;
        }
        if let Some(start) = self.start_position {
            settings.start_position = start;
        }
        if let Some(output) = &self.output {
            settings.save_detailed_file = output.clone();
        }
        if let Some(dump) = &self.data_dump {
            settings.load_from_file = false;
            settings.data_dump_file = dump.clone();
        }
        if let Some(file) = &self.load_from_file {
            settings.load_from_file = true;
            settings.load_file = file.clone();
        }
        if self.skip_details {
            settings.fetch_details = false;
        }

        if let Some(batch_size) = self.batch_size {
            config.enrichment.batch_size = batch_size;
        }
        if let Some(delay_ms) = self.delay_ms {
            config.enrichment.delay_ms = delay_ms;
        }
        if let Some(level) = &self.log_level {
            config.logging.level = level.clone();
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let started = Instant::now();
    let args = Args::parse();

    let config_path = resolve_config_path(args.config.as_deref());
    let mut config = load_toml_config(&config_path).context("Failed to load configuration")?;
    args.apply_to(&mut config);
    config.validate().context("Invalid configuration")?;

    init_tracing(&config)?;

    info!("Starting bgg-enricher v{}", env!("CARGO_PKG_VERSION"));
    info!(
        git = env!("GIT_HASH"),
        built = env!("BUILD_TIMESTAMP"),
        profile = env!("BUILD_PROFILE"),
        "Build"
    );
    if config_path.exists() {
        info!(file = %config_path.display(), "Configuration loaded");
    } else {
        warn!(file = %config_path.display(), "Config file not found, running with defaults");
    }

    let basic_records = load_candidates(&config)?;

    if !config.settings.fetch_details {
        info!(count = basic_records.len(), "Detail fetching disabled, done");
        info!(elapsed = %format_elapsed(started.elapsed()), "Total execution time");
        return Ok(());
    }

    let start_position = config.settings.start_position;
    if start_position >= basic_records.len() {
        warn!(
            start_position,
            candidates = basic_records.len(),
            "Start position is past the end of the candidate list, nothing to fetch"
        );
    }

    let token = resolve_bearer_token(args.bearer_token.as_deref(), &config)
        .context("Failed to resolve API bearer token")?;
    let client = BggApiClient::new(&config.api.base_url, token, config.api.request_timeout())
        .context("Failed to create API client")?;

    let output_file = config.settings.save_detailed_file.clone();
    let enricher = BatchEnricher::new(
        Arc::new(client),
        Arc::new(XmlPayloadParser::new()),
        Arc::new(JsonCheckpointSink::new(&output_file)),
        Arc::new(ErrorJournal::new(&config.enrichment.error_log_file)),
        EnrichSettings::from(&config.enrichment),
    );

    let report = enricher.enrich(&basic_records, start_position).await;

    save_detailed_records(&report.records, &output_file)
        .with_context(|| format!("Failed to save {}", output_file.display()))?;
    info!(
        file = %output_file.display(),
        count = report.records.len(),
        "Saved detailed games"
    );

    if !report.dropped_ids.is_empty() || !report.skipped_ids.is_empty() {
        warn!(
            dropped = report.dropped_ids.len(),
            skipped = report.skipped_ids.len(),
            journal = %config.enrichment.error_log_file.display(),
            "Some games were not enriched, see error journal"
        );
    }

    RunSummary::from_records(&report.records).log();
    info!(elapsed = %format_elapsed(started.elapsed()), "Total execution time");

    Ok(())
}

/// Stderr layer plus an optional plain-text file layer
fn init_tracing(config: &TomlConfig) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.logging.level))
        .context("Invalid log level")?;

    let file_layer = match &config.logging.file {
        Some(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("Failed to open log file {}", path.display()))?;
            Some(
                tracing_subscriber::fmt::layer()
                    .with_ansi(false)
                    .with_writer(Mutex::new(file)),
            )
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(file_layer)
        .init();

    Ok(())
}

/// Candidate list from a saved basic file, or from the data dump (then saved)
fn load_candidates(config: &TomlConfig) -> Result<Vec<BasicRecord>> {
    let settings = &config.settings;

    if settings.load_from_file {
        let records = load_basic_records(&settings.load_file)
            .with_context(|| format!("Failed to load {}", settings.load_file.display()))?;
        info!(
            file = %settings.load_file.display(),
            count = records.len(),
            "Loaded games from file"
        );
        return Ok(records);
    }

    let records = DataDumpReader::new()
        .read(&settings.data_dump_file, settings.count)
        .with_context(|| format!("Failed to read {}", settings.data_dump_file.display()))?;

    save_basic_records(&records, &settings.save_basic_file)
        .with_context(|| format!("Failed to save {}", settings.save_basic_file.display()))?;
    info!(
        file = %settings.save_basic_file.display(),
        count = records.len(),
        "Saved basic games"
    );

    Ok(records)
}
