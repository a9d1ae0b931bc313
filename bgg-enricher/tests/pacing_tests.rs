//! Inter-batch pacing on a paused clock
//!
//! With the tokio clock paused every sleep auto-advances virtual time to its
//! deadline, so elapsed time counts the sleeps taken. Deadlines land on the
//! timer's millisecond ticks, hence the small tolerance.

mod helpers;

use bgg_common::ErrorJournal;
use bgg_enricher::services::{BatchEnricher, DetailGateway, EnrichSettings, XmlPayloadParser};
use bgg_enricher::GatewayError;
use helpers::*;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;

const DELAY: Duration = Duration::from_millis(200);

fn paced_settings(batch_size: usize) -> EnrichSettings {
    EnrichSettings {
        batch_size,
        initial_delay: DELAY,
        rate_limit_pause: Duration::from_millis(1000),
        delay_increment: Duration::from_millis(100),
        checkpoint_interval: 300,
    }
}

/// Virtual time since `started` is `expected`, up to timer tick rounding
fn assert_slept(started: Instant, expected: Duration) {
    let elapsed = started.elapsed();
    assert!(
        elapsed >= expected && elapsed < expected + Duration::from_millis(10),
        "expected ~{:?} of sleeping, got {:?}",
        expected,
        elapsed
    );
}

fn enricher(gateway: ScriptedGateway, settings: EnrichSettings) -> BatchEnricher {
    let gateway: Arc<dyn DetailGateway> = Arc::new(gateway);
    BatchEnricher::new(
        gateway,
        Arc::new(XmlPayloadParser::new()),
        Arc::new(RecordingSink::default()),
        Arc::new(ErrorJournal::disabled()),
        settings,
    )
}

#[tokio::test(start_paused = true)]
async fn test_sleeps_between_batches_but_not_after_last() {
    let enricher = enricher(ScriptedGateway::healthy(), paced_settings(2));

    let started = Instant::now();
    let report = enricher.enrich(&basic_records(6), 0).await;

    // 3 batches, 2 gaps
    assert_slept(started, DELAY * 2);
    assert_eq!(report.records.len(), 6);
}

#[tokio::test(start_paused = true)]
async fn test_single_batch_never_sleeps() {
    let enricher = enricher(ScriptedGateway::healthy(), paced_settings(10));

    let started = Instant::now();
    enricher.enrich(&basic_records(4), 0).await;

    assert_slept(started, Duration::ZERO);
}

#[tokio::test(start_paused = true)]
async fn test_no_sleep_after_transport_failed_batch() {
    let gateway = ScriptedGateway::new(|ids, _| {
        if ids.iter().any(|id| id == "3") {
            Err(GatewayError::Network("timed out".to_string()))
        } else {
            Ok(thing_xml(ids))
        }
    });
    let enricher = enricher(gateway, paced_settings(2));

    let started = Instant::now();
    let report = enricher.enrich(&basic_records(6), 0).await;

    // Only the gap after batch 1; batch 2 failed and batch 3 is last
    assert_slept(started, DELAY);
    assert_eq!(report.skipped_ids.len(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_rate_limit_cooldown_then_slower_pace() {
    let gateway = ScriptedGateway::new(|ids, call| {
        if call == 0 {
            Err(GatewayError::RateLimited)
        } else {
            Ok(thing_xml(ids))
        }
    });
    let enricher = enricher(gateway, paced_settings(2));

    let started = Instant::now();
    let report = enricher.enrich(&basic_records(4), 0).await;

    // 1000ms cooldown, then one gap at the raised 300ms delay
    assert_slept(started, Duration::from_millis(1300));
    assert_eq!(report.final_delay, Duration::from_millis(300));
    assert_eq!(report.rate_limit_hits, 1);
}
