//! Core data models for the song catalog.
//!
//! This module contains the raw input row, the cleaner's working record,
//! the three catalog entities and the row shapes returned by the store.

use serde::{Deserialize, Serialize};

// ============================================================================
// Raw Input
// ============================================================================

/// One row of the raw song table, exactly as read from the CSV file.
/// Numeric cells stay textual here; coercion happens in `SongRecord::from`.
#[derive(Clone, Debug, Deserialize)]
pub struct RawSong {
    pub song: String,
    pub artist: String,
    pub genre: String,
    pub duration_ms: Option<String>,
    pub explicit: Option<String>,
    pub year: Option<String>,
    pub popularity: Option<String>,
    pub danceability: Option<String>,
    pub speechiness: Option<String>,
}

// ============================================================================
// Cleaner Records
// ============================================================================

/// Track length before and after duration cleanup.
/// `Millis` is the raw input unit; `Seconds` replaces it once normalized.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum TrackLength {
    Millis(Option<f64>),
    Seconds(i64),
}

/// Numeric columns a range filter can be applied to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NumericField {
    Year,
    Popularity,
    Danceability,
    Speechiness,
}

impl NumericField {
    pub fn name(self) -> &'static str {
        match self {
            NumericField::Year => "year",
            NumericField::Popularity => "popularity",
            NumericField::Danceability => "danceability",
            NumericField::Speechiness => "speechiness",
        }
    }
}

/// Working row of the cleaning pipeline.
/// `None` marks an absent or malformed numeric cell.
#[derive(Clone, Debug, PartialEq)]
pub struct SongRecord {
    pub title: String,
    pub artist: String,
    pub genre: String,
    pub length: TrackLength,
    pub explicit: bool,
    pub year: Option<f64>,
    pub popularity: Option<f64>,
    pub danceability: Option<f64>,
    pub speechiness: Option<f64>,
    /// Verbatim cells of the columns not modelled above, in header order.
    /// They take part in row equality only.
    pub extras: Vec<String>,
}

impl SongRecord {
    pub fn field(&self, field: NumericField) -> Option<f64> {
        match field {
            NumericField::Year => self.year,
            NumericField::Popularity => self.popularity,
            NumericField::Danceability => self.danceability,
            NumericField::Speechiness => self.speechiness,
        }
    }

    pub fn field_mut(&mut self, field: NumericField) -> &mut Option<f64> {
        match field {
            NumericField::Year => &mut self.year,
            NumericField::Popularity => &mut self.popularity,
            NumericField::Danceability => &mut self.danceability,
            NumericField::Speechiness => &mut self.speechiness,
        }
    }

    /// Duration in seconds, or `None` while still in milliseconds.
    pub fn duration_secs(&self) -> Option<i64> {
        match self.length {
            TrackLength::Seconds(s) => Some(s),
            TrackLength::Millis(_) => None,
        }
    }
}

impl From<RawSong> for SongRecord {
    fn from(raw: RawSong) -> Self {
        Self {
            title: raw.song,
            artist: raw.artist,
            genre: raw.genre,
            length: TrackLength::Millis(parse_numeric(raw.duration_ms.as_deref())),
            explicit: parse_flag(raw.explicit.as_deref()),
            year: parse_numeric(raw.year.as_deref()),
            popularity: parse_numeric(raw.popularity.as_deref()),
            danceability: parse_numeric(raw.danceability.as_deref()),
            speechiness: parse_numeric(raw.speechiness.as_deref()),
            extras: Vec::new(),
        }
    }
}

/// Coerce a cell to a number. Blank, unparsable and NaN cells are absent.
pub fn parse_numeric(cell: Option<&str>) -> Option<f64> {
    let value: f64 = cell?.trim().parse().ok()?;
    if value.is_nan() {
        None
    } else {
        Some(value)
    }
}

/// Coerce a cell to a boolean flag. Anything unrecognized is `false`.
pub fn parse_flag(cell: Option<&str>) -> bool {
    match cell.map(|c| c.trim().to_ascii_lowercase()) {
        Some(c) => matches!(c.as_str(), "true" | "1" | "1.0" | "yes" | "t" | "y"),
        None => false,
    }
}

// ============================================================================
// Catalog Entities
// ============================================================================

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Artist {
    pub id: i64,
    pub name: String,
}

/// Genre label as stored. A label like "pop, Dance/Electronic" denotes
/// membership in every atomic genre it lists.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Genre {
    pub id: i64,
    pub label: String,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Song {
    pub title: String,
    pub duration: i64,
    pub explicit: bool,
    pub year: i64,
    pub popularity: i64,
    pub danceability: f64,
    pub speechiness: f64,
    pub artist_id: i64,
    pub genre_id: i64,
}

/// The normalized Artist/Genre/Song dataset produced by one build.
#[derive(Clone, Debug, Default, Serialize)]
pub struct Catalog {
    pub artists: Vec<Artist>,
    pub genres: Vec<Genre>,
    pub songs: Vec<Song>,
}

// ============================================================================
// Query Rows
// ============================================================================

/// A (genre label, popularity) pair for one song.
#[derive(Clone, Debug, PartialEq)]
pub struct GenrePopularity {
    pub genre: String,
    pub popularity: f64,
}

/// A song of a single year joined with its genre label.
#[derive(Clone, Debug, PartialEq)]
pub struct YearSong {
    pub title: String,
    pub duration: i64,
    pub explicit: bool,
    pub year: i64,
    pub popularity: f64,
    pub danceability: f64,
    pub speechiness: f64,
    pub genre: String,
}

/// Per-(artist, year) aggregate fetched for the ranking.
#[derive(Clone, Debug, PartialEq)]
pub struct ArtistYearSummary {
    pub artist: String,
    pub year: i64,
    pub song_count: i64,
    pub avg_popularity: f64,
    pub avg_danceability: f64,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct CatalogCounts {
    pub artists: usize,
    pub genres: usize,
    pub songs: usize,
}
