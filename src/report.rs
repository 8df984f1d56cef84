//! Presentation helpers: chart series and plain-text tables.
//!
//! Engine results stay numeric. Absent values only become "Null" here, and
//! highlighted cells get a trailing `*`.

use serde::Serialize;
use std::fmt;

use crate::popularity::PopularityComparison;
use crate::ranking::RankTable;
use crate::yearly::GenreYearStats;

pub const NULL_CELL: &str = "Null";

/// Data needed to draw one chart, independent of any plotting backend.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ChartSeries {
    pub title: String,
    pub labels: Vec<String>,
    pub series: Vec<NamedSeries>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct NamedSeries {
    pub name: String,
    /// Aligned with `ChartSeries::labels`; `None` is a gap.
    pub values: Vec<Option<f64>>,
}

pub fn format_value(value: Option<f64>) -> String {
    match value {
        Some(v) => format!("{:.2}", v),
        None => NULL_CELL.to_string(),
    }
}

fn mark(cell: String, highlight: bool) -> String {
    if highlight {
        format!("{}*", cell)
    } else {
        cell
    }
}

/// Column-aligned text table.
struct TextTable {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl TextTable {
    fn new<I, S>(headers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            headers: headers.into_iter().map(Into::into).collect(),
            rows: Vec::new(),
        }
    }

    fn push(&mut self, row: Vec<String>) {
        self.rows.push(row);
    }

    fn widths(&self) -> Vec<usize> {
        let mut widths: Vec<usize> = self.headers.iter().map(|h| h.chars().count()).collect();
        for row in &self.rows {
            for (i, cell) in row.iter().enumerate() {
                if let Some(w) = widths.get_mut(i) {
                    *w = (*w).max(cell.chars().count());
                }
            }
        }
        widths
    }
}

impl fmt::Display for TextTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let widths = self.widths();
        let write_row = |f: &mut fmt::Formatter<'_>, cells: &[String]| -> fmt::Result {
            let line: Vec<String> = cells
                .iter()
                .zip(&widths)
                .map(|(cell, w)| format!("{:<width$}", cell, width = *w))
                .collect();
            writeln!(f, "{}", line.join("  ").trim_end())
        };

        write_row(f, &self.headers)?;
        let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
        writeln!(f, "{}", rule.join("  "))?;
        for row in &self.rows {
            write_row(f, row)?;
        }
        Ok(())
    }
}

impl fmt::Display for PopularityComparison {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Genre popularity for {}", self.artist)?;
        let mut table = TextTable::new([
            "Genre",
            "Artist Popularity",
            "Artist Song Count",
            "Overall Popularity",
            "Overall Song Count",
        ]);
        for row in &self.rows {
            table.push(vec![
                row.genre.clone(),
                mark(format_value(row.artist_popularity), row.highlight),
                row.artist_song_count.to_string(),
                format_value(Some(row.overall_popularity)),
                row.overall_song_count.to_string(),
            ]);
        }
        write!(f, "{}", table)
    }
}

impl fmt::Display for GenreYearStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Genre statistics for {}", self.year)?;
        let mut table = TextTable::new([
            "Genre",
            "Avg Danceability",
            "Avg Popularity",
            "Explicit %",
            "Song Count",
        ]);
        for row in &self.rows {
            table.push(vec![
                row.genre.clone(),
                format_value(row.avg_danceability),
                format_value(row.avg_popularity),
                format_value(row.explicit_pct),
                row.song_count.to_string(),
            ]);
        }
        write!(f, "{}", table)
    }
}

impl fmt::Display for RankTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Top {} Artists Rank Table ({}-{}):",
            self.artists.len(),
            self.start_year,
            self.end_year
        )?;
        let headers = std::iter::once("Year".to_string())
            .chain(self.artists.iter().cloned())
            .chain(std::iter::once("Yearly Avg".to_string()));
        let mut table = TextTable::new(headers);
        for row in &self.rows {
            let mut cells = vec![row.label.to_string()];
            cells.extend(
                row.values
                    .iter()
                    .zip(&row.highlight)
                    .map(|(v, h)| mark(format_value(*v), *h)),
            );
            cells.push(format_value(row.yearly_avg));
            table.push(cells);
        }
        write!(f, "{}", table)
    }
}
