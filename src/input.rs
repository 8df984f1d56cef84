//! Raw song table reader.
//!
//! Streams the CSV file, deserializes each row into `RawSong` and coerces it
//! into a `SongRecord`. Header names select the columns. Cells of any other
//! column are kept verbatim so de-duplication still sees the whole row.
//! Short rows are accepted and their missing cells read as blank.

use csv::{ReaderBuilder, StringRecord};
use std::io::Read;
use std::path::Path;
use tracing::info;

use crate::error::{Result, StatsError};
use crate::models::{RawSong, SongRecord};
use crate::progress::{create_spinner, log_progress};

const LOG_INTERVAL: u64 = 10_000;

/// Columns coerced into `SongRecord` fields. The header must name all of them.
pub const MODELLED_COLUMNS: &[&str] = &[
    "song",
    "artist",
    "genre",
    "duration_ms",
    "explicit",
    "year",
    "popularity",
    "danceability",
    "speechiness",
];

/// Indices of the header columns not in `MODELLED_COLUMNS`.
fn extra_columns(headers: &StringRecord) -> Result<Vec<usize>> {
    if let Some(missing) = MODELLED_COLUMNS
        .iter()
        .find(|c| !headers.iter().any(|h| h == **c))
    {
        return Err(StatsError::InvalidInput(format!(
            "song table has no '{}' column",
            missing
        )));
    }
    Ok(headers
        .iter()
        .enumerate()
        .filter(|(_, h)| !MODELLED_COLUMNS.contains(h))
        .map(|(i, _)| i)
        .collect())
}

pub fn read_records(path: &Path) -> Result<Vec<SongRecord>> {
    let file = std::fs::File::open(path)?;
    let records = read_records_from(file)?;
    info!(path = %path.display(), rows = records.len(), "read raw song table");
    Ok(records)
}

pub fn read_records_from<R: Read>(reader: R) -> Result<Vec<SongRecord>> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);
    let headers = rdr.headers()?.clone();
    let extras = extra_columns(&headers)?;
    let spinner = create_spinner("Reading songs");

    let mut records = Vec::new();
    for row in rdr.records() {
        let mut row = row?;
        while row.len() < headers.len() {
            row.push_field("");
        }
        let raw: RawSong = row.deserialize(Some(&headers))?;
        let mut record = SongRecord::from(raw);
        record.extras = extras
            .iter()
            .map(|&i| row.get(i).unwrap_or_default().to_string())
            .collect();
        records.push(record);
        spinner.inc(1);
        log_progress("read", records.len() as u64, LOG_INTERVAL);
    }

    spinner.finish_with_message(format!("Read {} songs", records.len()));
    Ok(records)
}
