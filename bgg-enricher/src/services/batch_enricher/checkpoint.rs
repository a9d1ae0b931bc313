//! Progress checkpoints
//!
//! A checkpoint is a full snapshot of the records accumulated so far, written
//! whenever the processed count crosses a multiple of the checkpoint interval.
//! The count includes the run's start offset, so a resumed run keeps the same
//! boundaries as the run it continues.

use bgg_common::persistence::{progress_file_name, save_detailed_records};
use bgg_common::DetailedRecord;
use std::path::PathBuf;

/// Checkpoint persistence seam used by the batch enricher
pub trait CheckpointSink: Send + Sync {
    /// Persist `records` as the snapshot for `processed` records; returns where it went
    fn save_checkpoint(
        &self,
        records: &[DetailedRecord],
        processed: usize,
    ) -> bgg_common::Result<PathBuf>;
}

/// Writes `<output stem>_progress_<processed>.json` next to the final output file
#[derive(Debug, Clone)]
pub struct JsonCheckpointSink {
    output_file: PathBuf,
}

impl JsonCheckpointSink {
    pub fn new(output_file: impl Into<PathBuf>) -> Self {
        Self {
            output_file: output_file.into(),
        }
    }
}

impl CheckpointSink for JsonCheckpointSink {
    fn save_checkpoint(
        &self,
        records: &[DetailedRecord],
        processed: usize,
    ) -> bgg_common::Result<PathBuf> {
        let path = progress_file_name(&self.output_file, processed);
        save_detailed_records(records, &path)?;
        Ok(path)
    }
}

/// Tracks which interval boundary was last checkpointed
#[derive(Debug, Clone)]
pub(super) struct CheckpointTracker {
    interval: usize,
    last_boundary: usize,
}

impl CheckpointTracker {
    pub(super) fn new(interval: usize, start_position: usize) -> Self {
        let interval = interval.max(1);
        Self {
            interval,
            last_boundary: start_position / interval,
        }
    }

    /// True at most once per boundary crossed since the last call that returned true
    pub(super) fn crossed(&mut self, processed: usize) -> bool {
        let boundary = processed / self.interval;
        if boundary > self.last_boundary {
            self.last_boundary = boundary;
            true
        } else {
            false
        }
    }
}
