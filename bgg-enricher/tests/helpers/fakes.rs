//! Fake gateway and checkpoint sinks

use async_trait::async_trait;
use bgg_common::{BasicRecord, DetailedRecord, Error};
use bgg_enricher::services::{CheckpointSink, DetailGateway, EnrichSettings};
use bgg_enricher::GatewayError;
use std::path::PathBuf;
use std::sync::Mutex;
use std::time::Duration;

/// Body that roxmltree rejects (unclosed element)
pub const MALFORMED_XML: &str = "<items><item id=\"0\"><name type=\"primary\" value=\"broken\"></items";

type Handler = dyn Fn(&[String], usize) -> Result<String, GatewayError> + Send + Sync;

/// Gateway answering from a closure of (requested ids, call index)
pub struct ScriptedGateway {
    handler: Box<Handler>,
    requests: Mutex<Vec<Vec<String>>>,
}

impl ScriptedGateway {
    pub fn new(
        handler: impl Fn(&[String], usize) -> Result<String, GatewayError> + Send + Sync + 'static,
    ) -> Self {
        Self {
            handler: Box::new(handler),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Every request answered with a well-formed payload
    pub fn healthy() -> Self {
        Self::new(|ids, _| Ok(thing_xml(ids)))
    }

    /// Malformed body whenever a request contains one of `poisoned`
    pub fn poisoned(poisoned: &[&str]) -> Self {
        let poisoned: Vec<String> = poisoned.iter().map(|s| s.to_string()).collect();
        Self::new(move |ids, _| {
            if ids.iter().any(|id| poisoned.contains(id)) {
                Ok(MALFORMED_XML.to_string())
            } else {
                Ok(thing_xml(ids))
            }
        })
    }

    pub fn requests(&self) -> Vec<Vec<String>> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl DetailGateway for ScriptedGateway {
    async fn fetch_details(&self, ids: &[String]) -> Result<String, GatewayError> {
        let call = {
            let mut requests = self.requests.lock().unwrap();
            requests.push(ids.to_vec());
            requests.len() - 1
        };
        (self.handler)(ids, call)
    }
}

/// Minimal thing payload with one item per id
pub fn thing_xml(ids: &[String]) -> String {
    let items: String = ids
        .iter()
        .map(|id| {
            format!(
                r#"<item type="boardgame" id="{id}">
  <name type="primary" sortindex="1" value="Detailed {id}"/>
  <minplayers value="1"/>
  <maxplayers value="4"/>
  <link type="boardgamecategory" id="1" value="Strategy"/>
</item>"#
            )
        })
        .collect();
    format!(r#"<?xml version="1.0" encoding="utf-8"?><items termsofuse="https://boardgamegeek.com/xmlapi/termsofuse">{items}</items>"#)
}

/// Basic records with ids `1..=count`, ranked in order
pub fn basic_records(count: usize) -> Vec<BasicRecord> {
    (1..=count)
        .map(|n| BasicRecord {
            id: n.to_string(),
            numeric_id: n as i64,
            name: format!("Basic {}", n),
            year_published: 2000 + (n % 20) as i32,
            rank: Some(n as u32),
            bayes_average: Some(8.0 - n as f64 / 1000.0),
        })
        .collect()
}

/// No sleeps anywhere; increments still visible in the final delay
pub fn fast_settings(batch_size: usize, checkpoint_interval: usize) -> EnrichSettings {
    EnrichSettings {
        batch_size,
        initial_delay: Duration::ZERO,
        rate_limit_pause: Duration::ZERO,
        delay_increment: Duration::from_millis(1),
        checkpoint_interval,
    }
}

/// Checkpoint sink that remembers (processed, snapshot size)
#[derive(Default)]
pub struct RecordingSink {
    saved: Mutex<Vec<(usize, usize)>>,
}

impl RecordingSink {
    pub fn saved(&self) -> Vec<(usize, usize)> {
        self.saved.lock().unwrap().clone()
    }
}

impl CheckpointSink for RecordingSink {
    fn save_checkpoint(
        &self,
        records: &[DetailedRecord],
        processed: usize,
    ) -> bgg_common::Result<PathBuf> {
        self.saved.lock().unwrap().push((processed, records.len()));
        Ok(PathBuf::from(format!("progress_{}.json", processed)))
    }
}

/// Checkpoint sink whose every write fails
#[derive(Default)]
pub struct FailingSink;

impl CheckpointSink for FailingSink {
    fn save_checkpoint(
        &self,
        _records: &[DetailedRecord],
        _processed: usize,
    ) -> bgg_common::Result<PathBuf> {
        Err(Error::Io(std::io::Error::new(
            std::io::ErrorKind::PermissionDenied,
            "read-only volume",
        )))
    }
}
