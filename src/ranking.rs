//! Composite artist ranking over a year range.
//!
//! Each (artist, year) pair gets a weighted rank value built from its song
//! count, mean popularity and mean danceability. Artists are ranked by their
//! mean rank value and the top entries are pivoted into a year × artist table.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;
use tracing::debug;

use crate::error::{Result, StatsError};
use crate::models::ArtistYearSummary;
use crate::report::{ChartSeries, NamedSeries};
use crate::stats::{mean_present, Mean};
use crate::store::CatalogStore;
use crate::validate::YearValidator;

// ============================================================================
// Configuration
// ============================================================================

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RankWeights {
    pub songs: f64,
    pub popularity: f64,
    pub danceability: f64,
}

impl Default for RankWeights {
    fn default() -> Self {
        Self {
            songs: 10.0,
            popularity: 0.7,
            danceability: 50.0,
        }
    }
}

impl RankWeights {
    pub fn rank_value(&self, summary: &ArtistYearSummary) -> f64 {
        summary.song_count as f64 * self.songs
            + summary.avg_popularity * self.popularity
            + summary.avg_danceability * self.danceability
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RankingConfig {
    pub weights: RankWeights,
    pub top_n: usize,
}

impl Default for RankingConfig {
    fn default() -> Self {
        Self {
            weights: RankWeights::default(),
            top_n: 5,
        }
    }
}

// ============================================================================
// Result Table
// ============================================================================

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ArtistScore {
    pub artist: String,
    pub mean_rank_value: f64,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum RowLabel {
    Year(i64),
    #[serde(rename = "Overall Avg")]
    OverallAvg,
}

impl fmt::Display for RowLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RowLabel::Year(year) => write!(f, "{}", year),
            RowLabel::OverallAvg => f.write_str("Overall Avg"),
        }
    }
}

/// One table row. `values` and `highlight` are aligned with `RankTable::artists`.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct RankRow {
    pub label: RowLabel,
    pub values: Vec<Option<f64>>,
    pub yearly_avg: Option<f64>,
    pub highlight: Vec<bool>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct RankTable {
    pub start_year: i64,
    pub end_year: i64,
    /// Top artists, best first.
    pub ranking: Vec<ArtistScore>,
    /// Column order: top artists sorted by name.
    pub artists: Vec<String>,
    pub rows: Vec<RankRow>,
}

/// Flags every present cell equal to the row maximum.
fn highlight_max(values: &[Option<f64>]) -> Vec<bool> {
    let max = values
        .iter()
        .flatten()
        .copied()
        .fold(None, |acc: Option<f64>, v| Some(acc.map_or(v, |m| m.max(v))));
    values
        .iter()
        .map(|v| matches!((v, max), (Some(v), Some(m)) if *v == m))
        .collect()
}

fn rank_row(label: RowLabel, values: Vec<Option<f64>>, yearly_avg: Option<f64>) -> RankRow {
    RankRow {
        highlight: highlight_max(&values),
        label,
        values,
        yearly_avg,
    }
}

/// Rank artists and pivot the top `config.top_n` into a year table.
pub fn compute_rank_table(
    start_year: i64,
    end_year: i64,
    summaries: &[ArtistYearSummary],
    config: &RankingConfig,
) -> RankTable {
    let weights = &config.weights;

    let mut per_artist: BTreeMap<&str, Mean> = BTreeMap::new();
    for summary in summaries {
        per_artist
            .entry(summary.artist.as_str())
            .or_default()
            .push(weights.rank_value(summary));
    }

    let mut ranking: Vec<ArtistScore> = per_artist
        .into_iter()
        .filter_map(|(artist, mean)| {
            Some(ArtistScore {
                artist: artist.to_string(),
                mean_rank_value: mean.value()?,
            })
        })
        .collect();
    ranking.sort_by(|a, b| {
        b.mean_rank_value
            .partial_cmp(&a.mean_rank_value)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.artist.cmp(&b.artist))
    });
    ranking.truncate(config.top_n);

    let mut artists: Vec<String> = ranking.iter().map(|s| s.artist.clone()).collect();
    artists.sort();

    let mut cells: BTreeMap<i64, BTreeMap<&str, Mean>> = BTreeMap::new();
    for summary in summaries {
        if artists.iter().any(|a| a == &summary.artist) {
            cells
                .entry(summary.year)
                .or_default()
                .entry(summary.artist.as_str())
                .or_default()
                .push(weights.rank_value(summary));
        }
    }

    let mut rows: Vec<RankRow> = cells
        .into_iter()
        .map(|(year, by_artist)| {
            let values: Vec<Option<f64>> = artists
                .iter()
                .map(|a| by_artist.get(a.as_str()).and_then(Mean::value))
                .collect();
            let yearly_avg = mean_present(values.iter().copied());
            rank_row(RowLabel::Year(year), values, yearly_avg)
        })
        .collect();

    if !rows.is_empty() {
        let overall: Vec<Option<f64>> = (0..artists.len())
            .map(|col| mean_present(rows.iter().map(|r| r.values[col])))
            .collect();
        let overall_yearly = mean_present(rows.iter().map(|r| r.yearly_avg));
        rows.push(rank_row(RowLabel::OverallAvg, overall, overall_yearly));
    }

    debug!(
        start_year,
        end_year,
        candidates = summaries.len(),
        years = rows.len(),
        "rank table computed"
    );

    RankTable {
        start_year,
        end_year,
        ranking,
        artists,
        rows,
    }
}

/// Rank the top artists between `start` and `end` inclusive.
pub fn top_artists<S: CatalogStore + ?Sized>(
    store: &S,
    validator: &YearValidator,
    start: i64,
    end: i64,
    config: &RankingConfig,
) -> Result<RankTable> {
    if !validator.is_valid_range(start, end) {
        return Err(StatsError::InvalidInput(format!(
            "invalid year range, the start year must be no later than the end year and both in {}-{}",
            validator.first, validator.last
        )));
    }

    let summaries = store.artist_year_summaries(start, end)?;
    if summaries.is_empty() {
        return Err(StatsError::NotFound(
            "No data found for the specified year range.".to_string(),
        ));
    }

    Ok(compute_rank_table(start, end, &summaries, config))
}

impl RankTable {
    pub fn year_rows(&self) -> impl Iterator<Item = &RankRow> {
        self.rows
            .iter()
            .filter(|r| matches!(r.label, RowLabel::Year(_)))
    }

    pub fn overall(&self) -> Option<&RankRow> {
        self.rows
            .iter()
            .find(|r| r.label == RowLabel::OverallAvg)
    }

    /// Yearly rank value lines per artist plus the yearly average.
    pub fn chart(&self) -> ChartSeries {
        let mut series: Vec<NamedSeries> = self
            .artists
            .iter()
            .enumerate()
            .map(|(col, artist)| NamedSeries {
                name: artist.clone(),
                values: self.year_rows().map(|r| r.values[col]).collect(),
            })
            .collect();
        series.push(NamedSeries {
            name: "Yearly Avg".to_string(),
            values: self.year_rows().map(|r| r.yearly_avg).collect(),
        });

        ChartSeries {
            title: format!(
                "Top {} Artists' Yearly Rank Values ({}-{})",
                self.artists.len(),
                self.start_year,
                self.end_year
            ),
            labels: self.year_rows().map(|r| r.label.to_string()).collect(),
            series,
        }
    }
}
