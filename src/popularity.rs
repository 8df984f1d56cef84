//! Artist-vs-genre popularity comparison.
//!
//! An artist's mean popularity per atomic genre is set against the mean of
//! every song in that genre. The table always lists the full global genre
//! list; genres the artist never released in have no artist value.

use serde::Serialize;
use std::collections::BTreeMap;
use tracing::info;

use crate::error::{Result, StatsError};
use crate::genres::explode_genres;
use crate::models::GenrePopularity;
use crate::report::{ChartSeries, NamedSeries};
use crate::stats::Mean;
use crate::store::CatalogStore;

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct GenrePopularityRow {
    pub genre: String,
    pub overall_popularity: f64,
    pub overall_song_count: usize,
    /// `None` when the artist has no song in this genre.
    pub artist_popularity: Option<f64>,
    pub artist_song_count: usize,
    /// Artist mean strictly above the genre mean.
    pub highlight: bool,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PopularityComparison {
    pub artist: String,
    pub rows: Vec<GenrePopularityRow>,
}

/// Mean popularity per atomic genre, ordered by genre.
fn popularity_by_genre(rows: &[GenrePopularity]) -> BTreeMap<String, Mean> {
    let mut groups: BTreeMap<String, Mean> = BTreeMap::new();
    for row in explode_genres(rows) {
        groups.entry(row.genre).or_default().push(row.popularity);
    }
    groups
}

/// Left-join the artist's genre stats onto the global ones.
pub fn compute_comparison(
    artist: &str,
    artist_rows: &[GenrePopularity],
    global_rows: &[GenrePopularity],
) -> PopularityComparison {
    let artist_stats = popularity_by_genre(artist_rows);
    let global_stats = popularity_by_genre(global_rows);

    let rows = global_stats
        .into_iter()
        .filter_map(|(genre, overall)| {
            let overall_popularity = overall.value()?;
            let mine = artist_stats.get(&genre);
            let artist_popularity = mine.and_then(Mean::value);
            Some(GenrePopularityRow {
                highlight: artist_popularity.is_some_and(|a| a > overall_popularity),
                overall_song_count: overall.count(),
                artist_song_count: mine.map_or(0, Mean::count),
                genre,
                overall_popularity,
                artist_popularity,
            })
        })
        .collect();

    PopularityComparison {
        artist: artist.to_string(),
        rows,
    }
}

/// Compare `artist` against the catalog's per-genre popularity.
/// An unknown artist is reported as `NotFound` before anything else is read.
pub fn compare_artist_popularity<S: CatalogStore + ?Sized>(
    store: &S,
    artist: &str,
) -> Result<PopularityComparison> {
    if !store.artist_exists(artist)? {
        return Err(StatsError::NotFound(format!(
            "'{}' is not an artist in the dataset",
            artist
        )));
    }
    info!(artist, "artist found in the catalog");

    let artist_rows = store.artist_genre_popularity(artist)?;
    let global_rows = store.genre_popularity()?;
    Ok(compute_comparison(artist, &artist_rows, &global_rows))
}

impl PopularityComparison {
    pub fn highlighted(&self) -> impl Iterator<Item = &GenrePopularityRow> {
        self.rows.iter().filter(|r| r.highlight)
    }

    /// Grouped bar chart: overall popularity next to the artist's (absent → 0).
    pub fn chart(&self) -> ChartSeries {
        ChartSeries {
            title: format!("Popularity Comparison for {}", self.artist),
            labels: self.rows.iter().map(|r| r.genre.clone()).collect(),
            series: vec![
                NamedSeries {
                    name: "Overall Popularity".to_string(),
                    values: self.rows.iter().map(|r| Some(r.overall_popularity)).collect(),
                },
                NamedSeries {
                    name: format!("{}'s Popularity", self.artist),
                    values: self
                        .rows
                        .iter()
                        .map(|r| Some(r.artist_popularity.unwrap_or(0.0)))
                        .collect(),
                },
            ],
        }
    }
}
