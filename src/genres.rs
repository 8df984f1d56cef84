//! Genre expansion: stored genre labels may list several atomic genres
//! joined by `GENRE_DELIMITER`. Every aggregation explodes them first.

use rustc_hash::FxHashSet;

use crate::models::{GenrePopularity, YearSong};

pub const GENRE_DELIMITER: &str = ", ";

/// Rows carrying a genre label column.
pub trait GenreLabeled: Clone {
    fn genre(&self) -> &str;

    /// Copy of this row with the label replaced.
    fn with_genre(&self, genre: &str) -> Self;
}

impl GenreLabeled for GenrePopularity {
    fn genre(&self) -> &str {
        &self.genre
    }

    fn with_genre(&self, genre: &str) -> Self {
        Self {
            genre: genre.to_string(),
            ..self.clone()
        }
    }
}

impl GenreLabeled for YearSong {
    fn genre(&self) -> &str {
        &self.genre
    }

    fn with_genre(&self, genre: &str) -> Self {
        Self {
            genre: genre.to_string(),
            ..self.clone()
        }
    }
}

impl GenreLabeled for String {
    fn genre(&self) -> &str {
        self
    }

    fn with_genre(&self, genre: &str) -> Self {
        genre.to_string()
    }
}

/// Atomic genres of a label, in label order.
pub fn split_genres(label: &str) -> impl Iterator<Item = &str> {
    label.split(GENRE_DELIMITER)
}

/// One output row per (row, atomic genre), in insertion order.
pub fn explode_genres<T: GenreLabeled>(rows: &[T]) -> Vec<T> {
    let mut out = Vec::with_capacity(rows.len());
    for row in rows {
        for genre in split_genres(row.genre()) {
            out.push(row.with_genre(genre));
        }
    }
    out
}

/// Distinct atomic genres over all labels, first appearance first.
pub fn genre_universe<S: AsRef<str>>(labels: &[S]) -> Vec<String> {
    let mut seen: FxHashSet<&str> = FxHashSet::default();
    let mut universe = Vec::new();
    for label in labels {
        for genre in split_genres(label.as_ref()) {
            if seen.insert(genre) {
                universe.push(genre.to_string());
            }
        }
    }
    universe
}
