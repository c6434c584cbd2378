//! CSV export of a watch session's series.
//!
//! Files are named `<process>_<start>-<end>.csv` with start and end stamps
//! in local time (`YYYYMMDDTHHMM`). The body is a `timestamp,cpu,memory`
//! header followed by one row per sample in series order.

use std::fs;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use chrono::{DateTime, Local, SecondsFormat};
use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;
use tracing::info;

use crate::error::{Result, WatchError};
use crate::watch::Sample;

pub const HEADER: &str = "timestamp,cpu,memory";
const FILE_STAMP: &str = "%Y%m%dT%H%M";

pub fn file_name(process_name: &str, samples: &[Sample]) -> Result<String> {
    let start = samples
        .iter()
        .map(|s| s.timestamp)
        .min()
        .ok_or(WatchError::NoDataToExport)?;
    let end = samples
        .iter()
        .map(|s| s.timestamp)
        .max()
        .ok_or(WatchError::NoDataToExport)?;
    Ok(format!(
        "{}_{}-{}.csv",
        sanitize_name(process_name),
        start.format(FILE_STAMP),
        end.format(FILE_STAMP)
    ))
}

/// Writes `samples` into `dir` and returns the generated file name.
///
/// The file appears under its final name only once fully written.
pub fn export(dir: &Path, process_name: &str, samples: &[Sample]) -> Result<String> {
    if samples.is_empty() {
        return Err(WatchError::NoDataToExport);
    }
    let name = file_name(process_name, samples)?;
    let path = dir.join(&name);

    write_atomically(dir, &path, samples).map_err(|source| WatchError::ExportIo {
        path: path.clone(),
        source,
    })?;

    info!(path = %path.display(), rows = samples.len(), "series exported");
    Ok(name)
}

fn write_atomically(dir: &Path, path: &Path, samples: &[Sample]) -> io::Result<()> {
    let mut file = NamedTempFile::new_in(dir)?;
    {
        let mut writer = BufWriter::new(file.as_file_mut());
        write_csv(&mut writer, samples)?;
        writer.flush()?;
    }
    file.as_file().sync_all()?;
    file.persist(path).map_err(|e| e.error)?;
    Ok(())
}

/// Serialized form of one sample.
#[derive(Debug, Serialize, Deserialize)]
struct Row {
    timestamp: String,
    cpu: Option<f32>,
    memory: u64,
}

impl From<&Sample> for Row {
    fn from(sample: &Sample) -> Self {
        Row {
            timestamp: sample
                .timestamp
                .to_rfc3339_opts(SecondsFormat::AutoSi, false),
            cpu: sample.cpu,
            memory: sample.memory,
        }
    }
}

pub fn write_csv<W: Write>(writer: &mut W, samples: &[Sample]) -> io::Result<()> {
    let mut csv = csv::Writer::from_writer(writer);
    if samples.is_empty() {
        csv.write_record(HEADER.split(','))?;
    }
    for sample in samples {
        csv.serialize(Row::from(sample))?;
    }
    csv.flush()?;
    Ok(())
}

/// Reads a file produced by [`export`] back into samples.
pub fn read_export(path: &Path) -> Result<Vec<Sample>> {
    let contents = fs::read_to_string(path).map_err(|source| WatchError::ExportIo {
        path: path.to_path_buf(),
        source,
    })?;
    parse_csv(&contents)
}

/// Parses export text. Quoted fields, CRLF line ends and a leading BOM are
/// accepted.
pub fn parse_csv(contents: &str) -> Result<Vec<Sample>> {
    let contents = contents.strip_prefix('\u{feff}').unwrap_or(contents);
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(contents.as_bytes());

    let headers = reader.headers().map_err(|e| malformed(line_of(&e, 1), e))?.clone();
    if !headers.iter().eq(HEADER.split(',')) {
        return Err(WatchError::MalformedRow {
            line: 1,
            reason: format!("expected header `{HEADER}`"),
        });
    }

    let mut samples = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|e| {
            let line = line_of(&e, 0);
            malformed(line, e)
        })?;
        let line = record.position().map_or(0, |p| p.line() as usize);
        let row: Row = record
            .deserialize(Some(&headers))
            .map_err(|e| malformed(line, e))?;
        samples.push(parse_row(line, row)?);
    }
    Ok(samples)
}

fn line_of(err: &csv::Error, fallback: usize) -> usize {
    err.position().map_or(fallback, |p| p.line() as usize)
}

fn malformed(line: usize, reason: impl std::fmt::Display) -> WatchError {
    WatchError::MalformedRow {
        line,
        reason: reason.to_string(),
    }
}

fn parse_row(line: usize, row: Row) -> Result<Sample> {
    let timestamp = DateTime::parse_from_rfc3339(&row.timestamp)
        .map_err(|e| malformed(line, format!("timestamp: {e}")))?
        .with_timezone(&Local);
    Ok(Sample::new(timestamp, row.memory, row.cpu))
}

fn sanitize_name(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();
    let trimmed = cleaned.trim().trim_matches('.');
    if trimmed.is_empty() {
        "process".to_string()
    } else {
        trimmed.to_string()
    }
}
