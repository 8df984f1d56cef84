//! Record cleaning: duration cleanup, range filters and de-duplication.
//!
//! The catalog build runs these in a fixed order (see `clean_records`).
//! Filters are independent per-row predicates, but all of them must run
//! before the global de-duplication.

use rustc_hash::FxHashSet;
use serde::Deserialize;
use tracing::debug;

use crate::models::{NumericField, SongRecord, TrackLength};
use crate::stats::round_to;

/// Thresholds of the catalog's filter stage. Bounds are exclusive.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct FilterPolicy {
    pub min_popularity: f64,
    pub min_speechiness: f64,
    pub max_speechiness: f64,
    pub min_danceability: f64,
}

impl Default for FilterPolicy {
    fn default() -> Self {
        Self {
            min_popularity: 50.0,
            min_speechiness: 0.33,
            max_speechiness: 0.66,
            min_danceability: 0.2,
        }
    }
}

/// Convert millisecond durations to whole seconds.
/// Missing durations become 0; halves round to even.
pub fn normalize_duration(records: Vec<SongRecord>) -> Vec<SongRecord> {
    records
        .into_iter()
        .map(|mut r| {
            if let TrackLength::Millis(ms) = r.length {
                let secs = round_to(ms.unwrap_or(0.0) / 1000.0, 0);
                r.length = TrackLength::Seconds(secs as i64);
            }
            r
        })
        .collect()
}

/// Keep rows whose `field` lies strictly between `lower` and `upper`.
///
/// Absent values are coerced to 0 before comparing, and the coerced value
/// is written back into the returned rows.
pub fn range_filter(
    records: Vec<SongRecord>,
    field: NumericField,
    lower: f64,
    upper: f64,
) -> Vec<SongRecord> {
    let before = records.len();
    let kept: Vec<SongRecord> = records
        .into_iter()
        .filter_map(|mut r| {
            let value = r.field(field).unwrap_or(0.0);
            *r.field_mut(field) = Some(value);
            (lower < value && value < upper).then_some(r)
        })
        .collect();
    debug!(
        field = field.name(),
        lower,
        upper,
        before,
        after = kept.len(),
        "range filter applied"
    );
    kept
}

/// Full-row key over every input column; floats compare by bit pattern.
type RowKey = (
    String,
    String,
    String,
    (u8, u64),
    bool,
    Option<u64>,
    Option<u64>,
    Option<u64>,
    Option<u64>,
    Vec<String>,
);

fn row_key(r: &SongRecord) -> RowKey {
    let length = match r.length {
        TrackLength::Millis(ms) => (0, ms.map_or(u64::MAX, f64::to_bits)),
        TrackLength::Seconds(s) => (1, s as u64),
    };
    (
        r.title.clone(),
        r.artist.clone(),
        r.genre.clone(),
        length,
        r.explicit,
        r.year.map(f64::to_bits),
        r.popularity.map(f64::to_bits),
        r.danceability.map(f64::to_bits),
        r.speechiness.map(f64::to_bits),
        r.extras.clone(),
    )
}

/// Drop exact full-row duplicates, keeping the first occurrence.
pub fn dedup_records(records: Vec<SongRecord>) -> Vec<SongRecord> {
    let mut seen: FxHashSet<RowKey> = FxHashSet::default();
    records
        .into_iter()
        .filter(|r| seen.insert(row_key(r)))
        .collect()
}

/// Run the catalog's cleaning pipeline:
/// duration → popularity → speechiness → danceability → de-duplication.
pub fn clean_records(records: Vec<SongRecord>, policy: &FilterPolicy) -> Vec<SongRecord> {
    let records = normalize_duration(records);
    let records = range_filter(
        records,
        NumericField::Popularity,
        policy.min_popularity,
        f64::INFINITY,
    );
    let records = range_filter(
        records,
        NumericField::Speechiness,
        policy.min_speechiness,
        policy.max_speechiness,
    );
    let records = range_filter(
        records,
        NumericField::Danceability,
        policy.min_danceability,
        f64::INFINITY,
    );
    dedup_records(records)
}
