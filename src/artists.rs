//! Artist listing and "did you mean" suggestions for unknown names.

use std::cmp::Ordering;
use strsim::jaro_winkler;

use crate::error::Result;
use crate::normalize::{normalize_name, primary_artist};
use crate::store::CatalogStore;

/// Minimum Jaro-Winkler similarity for a suggestion.
pub const SUGGESTION_THRESHOLD: f64 = 0.80;

/// Every artist in the catalog, alphabetical.
pub fn artist_list<S: CatalogStore + ?Sized>(store: &S) -> Result<Vec<String>> {
    store.artist_names()
}

fn similarity(query_key: &str, name: &str) -> f64 {
    let key = normalize_name(name);
    let direct = jaro_winkler(query_key, &key);
    match primary_artist(&key) {
        Some(primary) => direct.max(jaro_winkler(query_key, primary)),
        None => direct,
    }
}

/// Up to `limit` names resembling `query`, best match first.
pub fn suggest_artists<S: AsRef<str>>(names: &[S], query: &str, limit: usize) -> Vec<String> {
    let query_key = normalize_name(query);
    if query_key.is_empty() {
        return Vec::new();
    }

    let mut scored: Vec<(f64, &str)> = names
        .iter()
        .map(|n| n.as_ref())
        .map(|n| (similarity(&query_key, n), n))
        .filter(|(score, _)| *score >= SUGGESTION_THRESHOLD)
        .collect();
    scored.sort_by(|a, b| {
        b.0.partial_cmp(&a.0)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.1.cmp(b.1))
    });

    scored
        .into_iter()
        .take(limit)
        .map(|(_, n)| n.to_string())
        .collect()
}
