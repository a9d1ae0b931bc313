//! Batch resolution with bisection on unparseable payloads
//!
//! Some ID combinations make the API return a body that is not well-formed
//! XML. When that happens the batch is split at its midpoint and each half is
//! fetched on its own, first half fully resolved before the second, down to
//! single IDs. A single ID that still fails to parse is dropped for the run.
//!
//! The split tree is walked with an explicit stack of ID slices instead of
//! recursion. Each split halves the slice, so the stack never holds more than
//! `log2(batch size) + 1` entries.

use super::{BatchContext, BatchEnricher, BatchOutcome, RunState};
use crate::error::{GatewayError, ItemExtractionError};
use bgg_common::BasicRecord;
use tracing::{info, warn};

impl BatchEnricher {
    /// Fetch and parse one top-level batch until every part of it is terminal
    pub(super) async fn resolve_batch(
        &self,
        batch: &[BasicRecord],
        ctx: BatchContext,
        run: &mut RunState,
    ) -> BatchOutcome {
        let ids: Vec<String> = batch.iter().map(|b| b.id.clone()).collect();
        let mut fetched = Vec::new();
        let mut pending: Vec<&[String]> = vec![&ids];

        while let Some(chunk) = pending.pop() {
            let is_whole_batch = chunk.len() == ids.len();

            let body = match self.gateway.fetch_details(chunk).await {
                Ok(body) => body,
                Err(err) if err.is_rate_limited() => {
                    self.back_off(ctx, chunk, run).await;
                    pending.push(chunk);
                    continue;
                }
                Err(err) => {
                    self.record_transport_failure(ctx, chunk, &err);
                    run.skipped_ids.extend(chunk.iter().cloned());
                    if is_whole_batch {
                        return BatchOutcome::TransportFailed;
                    }
                    continue;
                }
            };

            let journal = &self.journal;
            let mut on_item_error = |err: ItemExtractionError| {
                journal.record(&err.to_string());
                warn!(item_id = %err.item_id, reason = %err.reason, "Failed to process item");
            };

            match self.parser.parse(&body, &mut on_item_error) {
                Ok(records) => fetched.extend(records),
                Err(err) if chunk.len() == 1 => {
                    journal.record(&format!(
                        "XML parsing error for game ID {}: {}",
                        chunk[0], err
                    ));
                    warn!(
                        game_id = %chunk[0],
                        error = %err,
                        "Skipping game ID: payload never parses"
                    );
                    run.dropped_ids.push(chunk[0].clone());
                }
                Err(err) => {
                    journal.record(&format!(
                        "XML parsing error for game IDs [{}]: {}",
                        chunk.join(", "),
                        err
                    ));

                    let (first, second) = chunk.split_at(chunk.len() / 2);

                    warn!(
                        batch = ctx.number,
                        count = chunk.len(),
                        ids = %chunk.join(","),
                        "XML parsing failed, splitting batch"
                    );
                    info!(
                        first_half = first.len(),
                        second_half = second.len(),
                        "Splitting batch"
                    );

                    // LIFO: first half resolves completely before the second starts
                    pending.push(second);
                    pending.push(first);
                }
            }
        }

        BatchOutcome::Completed(fetched)
    }

    fn record_transport_failure(&self, ctx: BatchContext, ids: &[String], err: &GatewayError) {
        self.journal.record(&format!(
            "Failed to fetch batch {}/{}, game IDs [{}]: {}",
            ctx.number,
            ctx.total,
            ids.join(", "),
            err
        ));
        warn!(
            batch = ctx.number,
            count = ids.len(),
            error = %err,
            "Could not fetch detailed data, skipping IDs for this run"
        );
    }
}
