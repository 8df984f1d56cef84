//! Catalog construction: surrogate ids, foreign-key rewrite and persistence.
//!
//! Artist and genre ids are 1-based and follow first appearance in the
//! cleaned records. Genre labels are keyed verbatim (not split). Songs only
//! ever reference rows created in the same build; anything else is a
//! `DataIntegrity` error.

use rustc_hash::{FxHashMap, FxHashSet};
use serde::Serialize;
use std::path::Path;
use std::time::Instant;
use tracing::info;

use crate::clean::{clean_records, FilterPolicy};
use crate::error::{Result, StatsError};
use crate::input::read_records;
use crate::models::{Artist, Catalog, Genre, Song, SongRecord};
use crate::store::CatalogStore;

/// Outcome of one catalog build.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct BuildSummary {
    pub rows_read: usize,
    pub rows_retained: usize,
    pub artists: usize,
    pub genres: usize,
    pub songs: usize,
    pub elapsed_seconds: f64,
}

/// Assigns sequential 1-based ids to distinct keys in first-appearance order.
struct IdAssigner {
    ids: FxHashMap<String, i64>,
    order: Vec<String>,
}

impl IdAssigner {
    fn new() -> Self {
        Self {
            ids: FxHashMap::default(),
            order: Vec::new(),
        }
    }

    fn assign(&mut self, key: &str) {
        if !self.ids.contains_key(key) {
            self.order.push(key.to_string());
            self.ids.insert(key.to_string(), self.order.len() as i64);
        }
    }

    fn get(&self, key: &str) -> Option<i64> {
        self.ids.get(key).copied()
    }
}

/// Build the three catalog tables from cleaned records.
pub fn build_catalog(records: &[SongRecord]) -> Result<Catalog> {
    let mut artist_ids = IdAssigner::new();
    let mut genre_ids = IdAssigner::new();
    for record in records {
        artist_ids.assign(&record.artist);
        genre_ids.assign(&record.genre);
    }

    let mut songs = Vec::with_capacity(records.len());
    for record in records {
        let duration = record.duration_secs().ok_or_else(|| {
            StatsError::DataIntegrity(format!(
                "song '{}' still has a millisecond duration",
                record.title
            ))
        })?;
        let artist_id = artist_ids.get(&record.artist).ok_or_else(|| {
            StatsError::DataIntegrity(format!("artist '{}' has no id", record.artist))
        })?;
        let genre_id = genre_ids.get(&record.genre).ok_or_else(|| {
            StatsError::DataIntegrity(format!("genre '{}' has no id", record.genre))
        })?;

        songs.push(Song {
            title: record.title.clone(),
            duration,
            explicit: record.explicit,
            year: record.year.unwrap_or(0.0) as i64,
            // Stored as INTEGER: fractional popularity is rounded, not kept.
            popularity: record.popularity.unwrap_or(0.0).round() as i64,
            danceability: record.danceability.unwrap_or(0.0),
            speechiness: record.speechiness.unwrap_or(0.0),
            artist_id,
            genre_id,
        });
    }

    let artists = artist_ids
        .order
        .into_iter()
        .enumerate()
        .map(|(i, name)| Artist { id: i as i64 + 1, name })
        .collect();
    let genres = genre_ids
        .order
        .into_iter()
        .enumerate()
        .map(|(i, label)| Genre { id: i as i64 + 1, label })
        .collect();

    Ok(Catalog {
        artists,
        genres,
        songs,
    })
}

impl Catalog {
    /// Check id uniqueness and that every song resolves to an artist and a genre.
    pub fn verify(&self) -> Result<()> {
        let mut artist_ids = FxHashSet::default();
        for artist in &self.artists {
            if !artist_ids.insert(artist.id) {
                return Err(StatsError::DataIntegrity(format!(
                    "duplicate artist id {}",
                    artist.id
                )));
            }
        }
        let mut genre_ids = FxHashSet::default();
        for genre in &self.genres {
            if !genre_ids.insert(genre.id) {
                return Err(StatsError::DataIntegrity(format!(
                    "duplicate genre id {}",
                    genre.id
                )));
            }
        }

        for song in &self.songs {
            if !artist_ids.contains(&song.artist_id) {
                return Err(StatsError::DataIntegrity(format!(
                    "song '{}' references missing artist id {}",
                    song.title, song.artist_id
                )));
            }
            if !genre_ids.contains(&song.genre_id) {
                return Err(StatsError::DataIntegrity(format!(
                    "song '{}' references missing genre id {}",
                    song.title, song.genre_id
                )));
            }
        }
        Ok(())
    }
}

/// Clean `records`, build the catalog and replace whatever `store` holds.
pub fn build_and_store<S: CatalogStore + ?Sized>(
    records: Vec<SongRecord>,
    store: &S,
    policy: &FilterPolicy,
) -> Result<BuildSummary> {
    let start = Instant::now();
    let rows_read = records.len();

    let cleaned = clean_records(records, policy);
    info!(rows_read, rows_retained = cleaned.len(), "records cleaned");

    let catalog = build_catalog(&cleaned)?;
    catalog.verify()?;
    store.replace_catalog(&catalog)?;

    Ok(BuildSummary {
        rows_read,
        rows_retained: cleaned.len(),
        artists: catalog.artists.len(),
        genres: catalog.genres.len(),
        songs: catalog.songs.len(),
        elapsed_seconds: start.elapsed().as_secs_f64(),
    })
}

/// Read the raw table at `csv_path` and rebuild the catalog from it.
pub fn build_from_csv<S: CatalogStore + ?Sized>(
    csv_path: &Path,
    store: &S,
    policy: &FilterPolicy,
) -> Result<BuildSummary> {
    let records = read_records(csv_path)?;
    build_and_store(records, store, policy)
}
