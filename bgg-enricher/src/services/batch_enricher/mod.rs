//! Batch enrichment orchestrator
//!
//! Drives the candidate list through the API in fixed-size batches, one
//! request in flight at a time.
//!
//! # Batch states
//! `Pending → Fetching → {Parsed, ParseFailed, RateLimited, TransportFailed}`
//!
//! - **Parsed**: records merged with their basic record and accumulated
//! - **ParseFailed**: batch bisected until the unparseable IDs are isolated
//!   as singletons, which are dropped (see `bisection.rs`)
//! - **RateLimited**: cooldown, permanent pacing increase, same batch retried
//!   (see `pacing.rs`)
//! - **TransportFailed**: logged and skipped, never retried in this run
//!
//! Completed batches are separated by the current inter-batch delay, and a
//! full snapshot is checkpointed each time the processed count crosses a
//! multiple of the checkpoint interval (see `checkpoint.rs`).
//!
//! All per-run mutable state lives in [`RunState`], which is threaded through
//! the loop explicitly; the enricher itself only holds its collaborators.

use crate::services::bgg_client::DetailGateway;
use crate::services::xml_parser::PayloadParser;
use bgg_common::config::EnrichmentConfig;
use bgg_common::{BasicRecord, DetailedRecord, ErrorJournal};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

mod bisection;
mod checkpoint;
mod pacing;

pub use checkpoint::{CheckpointSink, JsonCheckpointSink};
use checkpoint::CheckpointTracker;

/// Pacing, backoff and checkpoint tuning for one run
#[derive(Debug, Clone, PartialEq)]
pub struct EnrichSettings {
    /// IDs per API call
    pub batch_size: usize,
    /// Pause between completed batches at the start of the run
    pub initial_delay: Duration,
    /// Cooldown after a 429 response
    pub rate_limit_pause: Duration,
    /// Added to the inter-batch delay after every 429; never taken back
    pub delay_increment: Duration,
    /// Checkpoint every this many processed records
    pub checkpoint_interval: usize,
}

impl Default for EnrichSettings {
    fn default() -> Self {
        Self::from(&EnrichmentConfig::default())
    }
}

impl From<&EnrichmentConfig> for EnrichSettings {
    fn from(config: &EnrichmentConfig) -> Self {
        Self {
            batch_size: config.batch_size,
            initial_delay: Duration::from_millis(config.delay_ms),
            rate_limit_pause: Duration::from_millis(config.rate_limit_pause_ms),
            delay_increment: Duration::from_millis(config.delay_increment_ms),
            checkpoint_interval: config.checkpoint_interval,
        }
    }
}

/// Result of one enrichment run
#[derive(Debug, Clone, Default)]
pub struct EnrichmentReport {
    /// Enriched records in resolution order
    pub records: Vec<DetailedRecord>,
    /// Start offset plus records enriched in this run
    pub processed_count: usize,
    /// Inter-batch delay in effect when the run ended
    pub final_delay: Duration,
    /// Number of 429 responses absorbed
    pub rate_limit_hits: u32,
    /// IDs whose payload never parsed, even on their own
    pub dropped_ids: Vec<String>,
    /// IDs skipped because their request failed
    pub skipped_ids: Vec<String>,
    /// Checkpoint files written
    pub checkpoints: Vec<PathBuf>,
}

/// Accumulators for one run
#[derive(Debug)]
pub(super) struct RunState {
    records: Vec<DetailedRecord>,
    processed: usize,
    delay: Duration,
    rate_limit_hits: u32,
    dropped_ids: Vec<String>,
    skipped_ids: Vec<String>,
    checkpoint: CheckpointTracker,
    checkpoints: Vec<PathBuf>,
}

impl RunState {
    fn new(settings: &EnrichSettings, start_position: usize) -> Self {
        Self {
            records: Vec::new(),
            processed: start_position,
            delay: settings.initial_delay,
            rate_limit_hits: 0,
            dropped_ids: Vec::new(),
            skipped_ids: Vec::new(),
            checkpoint: CheckpointTracker::new(settings.checkpoint_interval, start_position),
            checkpoints: Vec::new(),
        }
    }

    fn into_report(self) -> EnrichmentReport {
        EnrichmentReport {
            records: self.records,
            processed_count: self.processed,
            final_delay: self.delay,
            rate_limit_hits: self.rate_limit_hits,
            dropped_ids: self.dropped_ids,
            skipped_ids: self.skipped_ids,
            checkpoints: self.checkpoints,
        }
    }
}

/// Position of the top-level batch being worked on, for log lines
#[derive(Debug, Clone, Copy)]
pub(super) struct BatchContext {
    number: usize,
    total: usize,
    first: usize,
    last: usize,
}

/// How a top-level batch ended
#[derive(Debug)]
pub(super) enum BatchOutcome {
    /// Every sub-batch reached a terminal state; records may be partial
    Completed(Vec<DetailedRecord>),
    /// The batch request itself failed in transport; nothing to merge
    TransportFailed,
}

/// Batch enrichment service
pub struct BatchEnricher {
    gateway: Arc<dyn DetailGateway>,
    parser: Arc<dyn PayloadParser>,
    checkpoints: Arc<dyn CheckpointSink>,
    journal: Arc<ErrorJournal>,
    settings: EnrichSettings,
}

impl BatchEnricher {
    pub fn new(
        gateway: Arc<dyn DetailGateway>,
        parser: Arc<dyn PayloadParser>,
        checkpoints: Arc<dyn CheckpointSink>,
        journal: Arc<ErrorJournal>,
        settings: EnrichSettings,
    ) -> Self {
        Self {
            gateway,
            parser,
            checkpoints,
            journal,
            settings,
        }
    }

    /// Enrich `basic_records[start_position..]`.
    ///
    /// Never fails: per-batch errors are logged, journaled and reflected in
    /// the report. Checkpoint write failures are logged and the run goes on.
    pub async fn enrich(
        &self,
        basic_records: &[BasicRecord],
        start_position: usize,
    ) -> EnrichmentReport {
        let batch_size = self.settings.batch_size.max(1);
        let pending = basic_records.get(start_position..).unwrap_or_default();
        let batches: Vec<&[BasicRecord]> = pending.chunks(batch_size).collect();
        let total = batches.len();

        info!(
            candidates = pending.len(),
            batches = total,
            batch_size,
            start_position,
            "Fetching detailed game information"
        );

        let mut run = RunState::new(&self.settings, start_position);

        for (index, batch) in batches.iter().enumerate() {
            let ctx = BatchContext {
                number: index + 1,
                total,
                first: start_position + index * batch_size + 1,
                last: (start_position + (index + 1) * batch_size).min(basic_records.len()),
            };

            info!(
                batch = ctx.number,
                total = ctx.total,
                first = ctx.first,
                last = ctx.last,
                "Fetching batch"
            );

            match self.resolve_batch(batch, ctx, &mut run).await {
                BatchOutcome::Completed(mut fetched) => {
                    merge_basic_info(&mut fetched, batch);
                    let count = fetched.len();
                    run.records.extend(fetched);
                    run.processed += count;

                    info!(
                        batch = ctx.number,
                        fetched = count,
                        processed = run.processed,
                        "Batch complete"
                    );

                    self.checkpoint_if_due(&mut run);

                    if ctx.number < ctx.total {
                        self.pace(&run).await;
                    }
                }
                BatchOutcome::TransportFailed => {
                    if let Some(path) = self.journal.path() {
                        info!(file = %path.display(), "Batch failure recorded in error journal");
                    }
                }
            }
        }

        info!(
            processed = run.processed,
            enriched = run.records.len(),
            dropped = run.dropped_ids.len(),
            skipped = run.skipped_ids.len(),
            rate_limit_hits = run.rate_limit_hits,
            "Detailed enrichment completed"
        );
        if start_position > 0 {
            info!(
                start_position,
                "Run resumed mid-list; merge with earlier progress files for the complete set"
            );
        }

        run.into_report()
    }

    fn checkpoint_if_due(&self, run: &mut RunState) {
        if !run.checkpoint.crossed(run.processed) {
            return;
        }

        match self.checkpoints.save_checkpoint(&run.records, run.processed) {
            Ok(path) => {
                info!(
                    file = %path.display(),
                    processed = run.processed,
                    "Progress saved"
                );
                run.checkpoints.push(path);
            }
            Err(e) => {
                warn!(
                    processed = run.processed,
                    error = %e,
                    "Checkpoint write failed, continuing run"
                );
                self.journal.record(&format!(
                    "Checkpoint write failed at {} processed: {}",
                    run.processed, e
                ));
            }
        }
    }
}

/// Fill gaps in fetched records from the basic record with the same ID
fn merge_basic_info(fetched: &mut [DetailedRecord], batch: &[BasicRecord]) {
    let by_id: HashMap<&str, &BasicRecord> = batch.iter().map(|b| (b.id.as_str(), b)).collect();
    for record in fetched.iter_mut() {
        if let Some(basic) = by_id.get(record.id.as_str()) {
            record.merge_basic(basic);
        }
    }
}
