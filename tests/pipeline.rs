use std::path::PathBuf;
use tempfile::{tempdir, TempDir};

use songstats::artists::{artist_list, suggest_artists};
use songstats::catalog::build_from_csv;
use songstats::clean::FilterPolicy;
use songstats::genres::{explode_genres, genre_universe};
use songstats::popularity::compare_artist_popularity;
use songstats::ranking::{top_artists, RankingConfig, RowLabel};
use songstats::store::{CatalogStore, SqliteCatalog};
use songstats::validate::YearValidator;
use songstats::yearly::genre_stats_for_year;
use songstats::{settle, StatsError};

const SONGS_CSV: &str = "\
artist,song,duration_ms,explicit,year,popularity,danceability,energy,speechiness,genre
Usher,Hit A,240000,True,2004,70,0.8,0.9,0.4,\"hip hop, R&B\"
Eminem,Hit B,200000,True,2004,80,0.7,0.8,0.5,hip hop
Eminem,Hit C,180000,False,2005,62,0.6,0.7,0.4,hip hop
Usher,Low,200000,False,2004,30,0.5,0.6,0.4,pop
Eminem,Hit B,200000,True,2004,80,0.7,0.8,0.5,hip hop
Dido,Talky,200000,False,2004,65,0.5,0.5,0.9,pop
Dido,Slow,200000,False,2005,65,0.1,0.5,0.4,pop
Dido,Pop One,210000,False,2005,66,0.6,0.5,0.35,pop
";

fn built_catalog() -> (TempDir, SqliteCatalog) {
    let dir = tempdir().unwrap();
    let csv_path = dir.path().join("songs.csv");
    std::fs::write(&csv_path, SONGS_CSV).unwrap();

    let store = SqliteCatalog::new(dir.path().join("MusicDatabase.db"));
    let summary = build_from_csv(&csv_path, &store, &FilterPolicy::default()).unwrap();
    assert_eq!(summary.rows_read, 8);
    assert_eq!(summary.rows_retained, 4);
    (dir, store)
}

#[test]
fn test_build_round_trip() {
    let (_dir, store) = built_catalog();

    let counts = store.counts().unwrap();
    assert_eq!(counts.songs, 4);
    assert_eq!(counts.artists, 3);
    assert_eq!(counts.genres, 3);

    let songs = store.songs().unwrap();
    assert_eq!(songs[0].duration, 240);
    assert_eq!(songs[2].duration, 180);
    assert_eq!(artist_list(&store).unwrap(), vec!["Dido", "Eminem", "Usher"]);
}

#[test]
fn test_rows_differing_only_in_extra_column_are_kept() {
    let dir = tempdir().unwrap();
    let csv_path = dir.path().join("songs.csv");
    std::fs::write(
        &csv_path,
        "\
artist,song,duration_ms,explicit,year,popularity,danceability,energy,speechiness,genre
Usher,Yeah!,250000,False,2004,80,0.9,0.9,0.4,pop
Usher,Yeah!,250000,False,2004,80,0.9,0.1,0.4,pop
Usher,Yeah!,250000,False,2004,80,0.9,0.1,0.4,pop
",
    )
    .unwrap();

    let store = SqliteCatalog::new(dir.path().join("MusicDatabase.db"));
    let summary = build_from_csv(&csv_path, &store, &FilterPolicy::default()).unwrap();
    assert_eq!(summary.rows_retained, 2);
    assert_eq!(store.counts().unwrap().songs, 2);
}

#[test]
fn test_short_row_does_not_abort_build() {
    let dir = tempdir().unwrap();
    let csv_path = dir.path().join("songs.csv");
    std::fs::write(
        &csv_path,
        "\
song,artist,genre,duration_ms,explicit,year,popularity,danceability,speechiness
Yeah!,Usher,pop,250000,False,2004,80,0.9,0.4
Burn,Usher,pop,230000,False,2004,70,0.8
",
    )
    .unwrap();

    let store = SqliteCatalog::new(dir.path().join("MusicDatabase.db"));
    let summary = build_from_csv(&csv_path, &store, &FilterPolicy::default()).unwrap();
    assert_eq!(summary.rows_read, 2);
    // the missing speechiness counts as 0 and fails the speechiness filter
    assert_eq!(summary.rows_retained, 1);
}

#[test]
fn test_rebuild_replaces_catalog() {
    let (dir, store) = built_catalog();
    let smaller = dir.path().join("smaller.csv");
    let first_two: Vec<&str> = SONGS_CSV.lines().take(2).collect();
    std::fs::write(&smaller, first_two.join("\n")).unwrap();

    build_from_csv(&smaller, &store, &FilterPolicy::default()).unwrap();
    assert_eq!(store.counts().unwrap().songs, 1);
    assert_eq!(artist_list(&store).unwrap(), vec!["Usher"]);
}

#[test]
fn test_popularity_comparison() {
    let (_dir, store) = built_catalog();

    let cmp = compare_artist_popularity(&store, "Eminem").unwrap();
    let universe: Vec<String> = {
        let labels = store.genre_labels().unwrap();
        let mut genres = genre_universe(&labels);
        genres.sort();
        genres
    };
    let listed: Vec<String> = cmp.rows.iter().map(|r| r.genre.clone()).collect();
    assert_eq!(listed, universe);

    let hip_hop = cmp.rows.iter().find(|r| r.genre == "hip hop").unwrap();
    assert_eq!(hip_hop.artist_popularity, Some(71.0));
    assert_eq!(hip_hop.artist_song_count, 2);
    assert_eq!(hip_hop.overall_song_count, 3);
    assert!(hip_hop.highlight);

    for row in cmp.highlighted() {
        assert!(row.artist_popularity.unwrap() > row.overall_popularity);
    }

    let pop = cmp.rows.iter().find(|r| r.genre == "pop").unwrap();
    assert_eq!(pop.artist_popularity, None);
    assert!(!pop.highlight);
}

#[test]
fn test_unknown_artist() {
    let (_dir, store) = built_catalog();
    let err = compare_artist_popularity(&store, "Eminen").unwrap_err();
    assert!(matches!(err, StatsError::NotFound(_)));
    assert_eq!(err.to_string(), "'Eminen' is not an artist in the dataset");

    let names = artist_list(&store).unwrap();
    assert_eq!(suggest_artists(&names, "Eminen", 5), vec!["Eminem"]);
}

#[test]
fn test_yearly_stats_cover_universe() {
    let (_dir, store) = built_catalog();
    let validator = YearValidator::default();

    let stats = genre_stats_for_year(&store, &validator, &2004).unwrap();
    let genres: Vec<&str> = stats.rows.iter().map(|r| r.genre.as_str()).collect();
    assert_eq!(genres, vec!["hip hop", "R&B", "pop"]);

    assert_eq!(stats.rows[0].song_count, 2);
    assert_eq!(stats.rows[0].avg_popularity, Some(75.0));
    assert_eq!(stats.rows[0].explicit_pct, Some(100.0));
    assert_eq!(stats.rows[1].song_count, 1);
    assert_eq!(stats.rows[2].song_count, 0);
    assert_eq!(stats.rows[2].avg_popularity, None);

    let exploded = explode_genres(&store.genre_labels().unwrap());
    assert!(exploded.iter().all(|g| genres.contains(&g.as_str())));
}

#[test]
fn test_yearly_stats_errors() {
    let (_dir, store) = built_catalog();
    let validator = YearValidator::default();

    let err = genre_stats_for_year(&store, &validator, "abc").unwrap_err();
    assert!(matches!(err, StatsError::InvalidInput(_)));

    let err = genre_stats_for_year(&store, &validator, &1999).unwrap_err();
    assert_eq!(err.to_string(), "There is no data available for the year 1999.");
    assert!(settle(Err::<(), _>(err)).is_none());
}

#[test]
fn test_invalid_year_skips_storage() {
    let missing = SqliteCatalog::new(PathBuf::from("/nonexistent/dir/MusicDatabase.db"));
    let validator = YearValidator::default();

    let err = genre_stats_for_year(&missing, &validator, &1997).unwrap_err();
    assert!(matches!(err, StatsError::InvalidInput(_)));
    let err = top_artists(&missing, &validator, 2010, 2005, &RankingConfig::default()).unwrap_err();
    assert!(matches!(err, StatsError::InvalidInput(_)));

    let err = genre_stats_for_year(&missing, &validator, &2004).unwrap_err();
    assert!(matches!(err, StatsError::Storage(_)));
}

#[test]
fn test_top_artists() {
    let (_dir, store) = built_catalog();
    let validator = YearValidator::default();

    let table = top_artists(&store, &validator, 2004, 2005, &RankingConfig::default()).unwrap();
    let ranked: Vec<&str> = table.ranking.iter().map(|s| s.artist.as_str()).collect();
    assert_eq!(ranked, vec!["Usher", "Eminem", "Dido"]);
    assert_eq!(table.artists, vec!["Dido", "Eminem", "Usher"]);

    let labels: Vec<RowLabel> = table.rows.iter().map(|r| r.label).collect();
    assert_eq!(labels, vec![RowLabel::Year(2004), RowLabel::Year(2005), RowLabel::OverallAvg]);
    assert_eq!(table.rows[0].values, vec![None, Some(101.0), Some(99.0)]);
    assert_eq!(table.rows[0].highlight, vec![false, true, false]);

    let err = top_artists(&store, &validator, 1998, 2000, &RankingConfig::default()).unwrap_err();
    assert_eq!(err.to_string(), "No data found for the specified year range.");
}
