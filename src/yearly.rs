//! Per-genre statistics for a single year.
//!
//! Songs of the year are exploded per atomic genre and aggregated, then
//! left-joined onto the full atomic genre universe so genres without songs
//! that year still appear (count 0, no means).

use rustc_hash::FxHashMap;
use serde::Serialize;

use crate::error::{Result, StatsError};
use crate::genres::{explode_genres, genre_universe};
use crate::models::YearSong;
use crate::report::{ChartSeries, NamedSeries};
use crate::stats::{round_to, Mean};
use crate::store::CatalogStore;
use crate::validate::{YearInput, YearValidator};

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct GenreYearRow {
    pub genre: String,
    pub avg_danceability: Option<f64>,
    pub avg_popularity: Option<f64>,
    pub explicit_pct: Option<f64>,
    pub song_count: usize,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct GenreYearStats {
    pub year: i64,
    pub rows: Vec<GenreYearRow>,
}

#[derive(Default)]
struct GenreAccumulator {
    danceability: Mean,
    popularity: Mean,
    explicit: Mean,
}

/// Aggregate `songs` per atomic genre over `universe`, in universe order.
pub fn compute_genre_year_stats(year: i64, songs: &[YearSong], universe: &[String]) -> GenreYearStats {
    let mut groups: FxHashMap<String, GenreAccumulator> = FxHashMap::default();
    for song in explode_genres(songs) {
        let acc = groups.entry(song.genre).or_default();
        acc.danceability.push(song.danceability);
        acc.popularity.push(song.popularity);
        acc.explicit.push(if song.explicit { 1.0 } else { 0.0 });
    }

    let rows = universe
        .iter()
        .map(|genre| match groups.get(genre) {
            Some(acc) => GenreYearRow {
                genre: genre.clone(),
                avg_danceability: acc.danceability.value().map(|v| round_to(v, 2)),
                avg_popularity: acc.popularity.value().map(|v| round_to(v, 2)),
                explicit_pct: acc.explicit.value().map(|v| round_to(v * 100.0, 2)),
                song_count: acc.popularity.count(),
            },
            None => GenreYearRow {
                genre: genre.clone(),
                avg_danceability: None,
                avg_popularity: None,
                explicit_pct: None,
                song_count: 0,
            },
        })
        .collect();

    GenreYearStats { year, rows }
}

/// Per-genre statistics for `year`.
///
/// The year is validated before the store is touched; a valid year without
/// songs is reported as `NotFound`.
pub fn genre_stats_for_year<S, Y>(
    store: &S,
    validator: &YearValidator,
    year: &Y,
) -> Result<GenreYearStats>
where
    S: CatalogStore + ?Sized,
    Y: YearInput + ?Sized,
{
    let year = validator.valid_year(year).ok_or_else(|| {
        StatsError::InvalidInput(format!(
            "this is not a valid year, enter a year in the range {}-{}",
            validator.first, validator.last
        ))
    })?;

    let songs = store.songs_in_year(year)?;
    if songs.is_empty() {
        return Err(StatsError::NotFound(format!(
            "There is no data available for the year {}.",
            year
        )));
    }

    let universe = genre_universe(&store.genre_labels()?);
    Ok(compute_genre_year_stats(year, &songs, &universe))
}

impl GenreYearStats {
    /// Genres with at least one song that year.
    pub fn active_rows(&self) -> impl Iterator<Item = &GenreYearRow> {
        self.rows.iter().filter(|r| r.song_count > 0)
    }

    /// Song distribution (pie) and average popularity (bar) for active genres.
    pub fn chart(&self) -> ChartSeries {
        ChartSeries {
            title: format!("Songs and Average Popularity per Genre ({})", self.year),
            labels: self.active_rows().map(|r| r.genre.clone()).collect(),
            series: vec![
                NamedSeries {
                    name: "Song Count".to_string(),
                    values: self.active_rows().map(|r| Some(r.song_count as f64)).collect(),
                },
                NamedSeries {
                    name: "Average Popularity".to_string(),
                    values: self.active_rows().map(|r| r.avg_popularity).collect(),
                },
            ],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn song(genre: &str, popularity: f64, danceability: f64, explicit: bool) -> YearSong {
        YearSong {
            title: "t".to_string(),
            duration: 200,
            explicit,
            year: 2019,
            popularity,
            danceability,
            speechiness: 0.4,
            genre: genre.to_string(),
        }
    }

    fn universe() -> Vec<String> {
        genre_universe(&["pop", "hip hop, pop", "rock", "latin"])
    }

    #[test]
    fn test_rows_cover_universe_in_order() {
        let songs = vec![song("pop", 60.0, 0.5, false)];
        let stats = compute_genre_year_stats(2019, &songs, &universe());
        let genres: Vec<&str> = stats.rows.iter().map(|r| r.genre.as_str()).collect();
        assert_eq!(genres, vec!["pop", "hip hop", "rock", "latin"]);
    }

    #[test]
    fn test_aggregates() {
        let songs = vec![
            song("hip hop, pop", 70.0, 0.8, true),
            song("pop", 61.0, 0.55, false),
            song("pop", 62.0, 0.6, true),
        ];
        let stats = compute_genre_year_stats(2019, &songs, &universe());

        let pop = &stats.rows[0];
        assert_eq!(pop.song_count, 3);
        assert_eq!(pop.avg_popularity, Some(64.33));
        assert_eq!(pop.avg_danceability, Some(0.65));
        assert_eq!(pop.explicit_pct, Some(66.67));

        let hip_hop = &stats.rows[1];
        assert_eq!(hip_hop.song_count, 1);
        assert_eq!(hip_hop.explicit_pct, Some(100.0));

        let rock = &stats.rows[2];
        assert_eq!(rock.song_count, 0);
        assert_eq!(rock.avg_popularity, None);
        assert_eq!(rock.avg_danceability, None);
        assert_eq!(rock.explicit_pct, None);
    }

    #[test]
    fn test_chart_skips_empty_genres() {
        let songs = vec![song("rock", 60.0, 0.5, false), song("rock", 70.0, 0.5, false)];
        let chart = compute_genre_year_stats(2019, &songs, &universe()).chart();
        assert_eq!(chart.labels, vec!["rock"]);
        assert_eq!(chart.series[0].values, vec![Some(2.0)]);
        assert_eq!(chart.series[1].values, vec![Some(65.0)]);
    }
}
