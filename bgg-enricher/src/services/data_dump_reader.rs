//! Ranks data dump reader
//!
//! Reads the candidate list from the zipped `boardgames_ranks.csv` snapshot.
//! Rows are `id,name,yearpublished,rank,bayesaverage,average,usersrated,...`
//! with quoted names that may contain commas. Bad rows are skipped with a
//! warning; only a missing archive or CSV entry is an error.

use bgg_common::{BasicRecord, Error, Result};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use tracing::{info, warn};

/// CSV entry inside the data dump archive
pub const CSV_FILE_NAME: &str = "boardgames_ranks.csv";

const MIN_FIELDS: usize = 7;

/// Data dump reader
#[derive(Debug, Default, Clone, Copy)]
pub struct DataDumpReader;

impl DataDumpReader {
    pub fn new() -> Self {
        Self
    }

    /// Read up to `count` basic records from the archive at `zip_path`
    pub fn read(&self, zip_path: &Path, count: usize) -> Result<Vec<BasicRecord>> {
        if zip_path.as_os_str().is_empty() {
            return Err(Error::InvalidInput("Data dump path is empty".to_string()));
        }
        if !zip_path.exists() {
            return Err(Error::NotFound(format!(
                "Data dump file not found: {}",
                zip_path.display()
            )));
        }

        info!(file = %zip_path.display(), count, "Reading from data dump");

        let file = File::open(zip_path)?;
        let mut archive = zip::ZipArchive::new(file)
            .map_err(|e| Error::DataDump(format!("Open {} failed: {}", zip_path.display(), e)))?;
        let entry = archive.by_name(CSV_FILE_NAME).map_err(|_| {
            Error::DataDump(format!("CSV file '{}' not found in archive", CSV_FILE_NAME))
        })?;

        let records = read_csv(BufReader::new(entry), count)?;

        info!(count = records.len(), "Read games from data dump");
        Ok(records)
    }
}

/// Parse CSV rows (header first) into at most `count` records
pub fn read_csv<R: BufRead>(reader: R, count: usize) -> Result<Vec<BasicRecord>> {
    let mut records = Vec::new();

    // Header is line 1
    for (index, line) in reader.lines().enumerate().skip(1) {
        if records.len() >= count {
            break;
        }

        let line = line?;
        if line.trim().is_empty() {
            continue;
        }

        match parse_row(&line) {
            Some(record) => records.push(record),
            None => warn!(line_number = index + 1, "Failed to parse data dump line"),
        }
    }

    Ok(records)
}

/// Parse one data dump row; `None` if it is short or has an unparseable field
fn parse_row(line: &str) -> Option<BasicRecord> {
    let fields = split_fields(line);
    if fields.len() < MIN_FIELDS {
        return None;
    }

    let id = fields[0].trim().to_string();
    let numeric_id = id.parse().ok()?;
    let year_published = fields[2].trim().parse().ok()?;
    let rank = optional_field(&fields[3])?;
    let bayes_average = optional_field(&fields[4])?;

    Some(BasicRecord {
        id,
        numeric_id,
        name: fields[1].clone(),
        year_published,
        rank,
        bayes_average,
    })
}

/// Empty → `Some(None)`; unparseable → `None` (row rejected)
fn optional_field<T: std::str::FromStr>(raw: &str) -> Option<Option<T>> {
    let raw = raw.trim();
    if raw.is_empty() {
        Some(None)
    } else {
        raw.parse().ok().map(Some)
    }
}

/// Split on commas outside quotes; `""` inside quotes is a literal quote
fn split_fields(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;
    let mut chars = line.chars().peekable();

    while let Some(ch) = chars.next() {
        match ch {
            '"' => {
                if in_quotes && matches!(chars.peek(), Some('"')) {
                    chars.next();
                    field.push('"');
                } else {
                    in_quotes = !in_quotes;
                }
            }
            ',' if !in_quotes => fields.push(std::mem::take(&mut field)),
            '\r' if !in_quotes => {}
            _ => field.push(ch),
        }
    }
    fields.push(field);

    fields
}
