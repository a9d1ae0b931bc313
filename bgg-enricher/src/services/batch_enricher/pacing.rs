//! Inter-batch pacing and rate-limit backoff
//!
//! The inter-batch delay only ever grows: each 429 adds a fixed increment
//! that stays in effect for the rest of the run.

use super::{BatchContext, BatchEnricher, RunState};
use tracing::{debug, info, warn};

impl BatchEnricher {
    /// Sleep between two completed batches
    pub(super) async fn pace(&self, run: &RunState) {
        debug!(delay_ms = run.delay.as_millis() as u64, "Pacing before next batch");
        tokio::time::sleep(run.delay).await;
    }

    /// Cool down after a 429 and slow the pace for the remaining batches
    pub(super) async fn back_off(&self, ctx: BatchContext, ids: &[String], run: &mut RunState) {
        run.rate_limit_hits += 1;

        self.journal.record(&format!(
            "Rate limited (429) at batch {}/{}, games {} to {} ({} IDs in request)",
            ctx.number,
            ctx.total,
            ctx.first,
            ctx.last,
            ids.len()
        ));
        warn!(
            batch = ctx.number,
            pause_ms = self.settings.rate_limit_pause.as_millis() as u64,
            "Rate limited (429), pausing"
        );

        tokio::time::sleep(self.settings.rate_limit_pause).await;

        run.delay += self.settings.delay_increment;
        info!(
            delay_ms = run.delay.as_millis() as u64,
            "Increased delay for subsequent requests"
        );
    }
}
