//! Catalog persistence.
//!
//! The analyses depend only on the `CatalogStore` trait. `SqliteCatalog`
//! implements it on a SQLite file, opening one connection per operation and
//! releasing it on every exit path (the connection is dropped with the scope).
//!
//! ## Schema
//!
//! ```sql
//! CREATE TABLE Artist (artist TEXT NOT NULL UNIQUE, Artist_ID INTEGER PRIMARY KEY);
//! CREATE TABLE Genre  (genre  TEXT NOT NULL UNIQUE, Genre_ID  INTEGER PRIMARY KEY);
//! CREATE TABLE Song (
//!     Song TEXT, Duration INTEGER, Explicit BOOLEAN, Year INTEGER,
//!     Popularity INTEGER, Danceability REAL, Speechiness REAL,
//!     Artist_ID INTEGER NOT NULL REFERENCES Artist(Artist_ID),
//!     Genre_ID  INTEGER NOT NULL REFERENCES Genre(Genre_ID)
//! );
//! ```
//!
//! Replacing the catalog is single-writer, single-process: it drops and
//! recreates all three tables inside one transaction.

use rusqlite::{params, Connection, OpenFlags};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::error::Result;
use crate::models::{
    ArtistYearSummary, Catalog, CatalogCounts, GenrePopularity, Song, YearSong,
};
use crate::progress::create_progress_bar;

const CREATE_TABLES: &str = "
    CREATE TABLE IF NOT EXISTS Artist (
        artist TEXT NOT NULL UNIQUE,
        Artist_ID INTEGER PRIMARY KEY
    );
    CREATE TABLE IF NOT EXISTS Genre (
        genre TEXT NOT NULL UNIQUE,
        Genre_ID INTEGER PRIMARY KEY
    );
    CREATE TABLE IF NOT EXISTS Song (
        Song TEXT,
        Duration INTEGER,
        Explicit BOOLEAN,
        Year INTEGER,
        Popularity INTEGER,
        Danceability REAL,
        Speechiness REAL,
        Artist_ID INTEGER NOT NULL REFERENCES Artist(Artist_ID),
        Genre_ID INTEGER NOT NULL REFERENCES Genre(Genre_ID)
    );
    CREATE INDEX IF NOT EXISTS idx_song_year ON Song(Year);
    CREATE INDEX IF NOT EXISTS idx_song_artist ON Song(Artist_ID);";

const DROP_TABLES: &str = "
    DROP TABLE IF EXISTS Song;
    DROP TABLE IF EXISTS Artist;
    DROP TABLE IF EXISTS Genre;";

/// Storage operations the pipeline and the analyses need.
pub trait CatalogStore {
    // === Schema / Build ===

    /// Create the three tables if they do not exist yet.
    fn ensure_schema(&self) -> Result<()>;

    /// Replace any stored catalog with `catalog` (drop, recreate, bulk insert).
    fn replace_catalog(&self, catalog: &Catalog) -> Result<()>;

    // === Lookups ===

    fn artist_exists(&self, name: &str) -> Result<bool>;

    /// All artist names, alphabetical.
    fn artist_names(&self) -> Result<Vec<String>>;

    /// Distinct stored genre labels in id order (not split).
    fn genre_labels(&self) -> Result<Vec<String>>;

    fn counts(&self) -> Result<CatalogCounts>;

    /// Every stored song, in insertion order.
    fn songs(&self) -> Result<Vec<Song>>;

    // === Analysis Queries ===

    /// (genre label, popularity) for every song of `artist`.
    fn artist_genre_popularity(&self, artist: &str) -> Result<Vec<GenrePopularity>>;

    /// (genre label, popularity) for every song.
    fn genre_popularity(&self) -> Result<Vec<GenrePopularity>>;

    /// Songs released in exactly `year`, joined with their genre label.
    fn songs_in_year(&self, year: i64) -> Result<Vec<YearSong>>;

    /// Per-(artist, year) song count and means over the inclusive range,
    /// ordered by year then artist.
    fn artist_year_summaries(&self, start: i64, end: i64) -> Result<Vec<ArtistYearSummary>>;
}

/// SQLite-backed catalog.
pub struct SqliteCatalog {
    path: PathBuf,
}

impl SqliteCatalog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Writable connection, creating the file when needed.
    fn open_rw(&self) -> Result<Connection> {
        let conn = Connection::open(&self.path)?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        Ok(conn)
    }

    /// Read-only connection; a missing database is an error, not a new file.
    fn open_ro(&self) -> Result<Connection> {
        let conn = Connection::open_with_flags(
            &self.path,
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )?;
        Ok(conn)
    }
}

impl CatalogStore for SqliteCatalog {
    fn ensure_schema(&self) -> Result<()> {
        let conn = self.open_rw()?;
        conn.execute_batch(CREATE_TABLES)?;
        Ok(())
    }

    fn replace_catalog(&self, catalog: &Catalog) -> Result<()> {
        let mut conn = self.open_rw()?;
        conn.execute_batch(
            "PRAGMA synchronous = NORMAL;
             PRAGMA temp_store = MEMORY;",
        )?;

        let pb = create_progress_bar(catalog.songs.len() as u64, "Writing catalog");
        let tx = conn.transaction()?;
        tx.execute_batch(DROP_TABLES)?;
        tx.execute_batch(CREATE_TABLES)?;
        {
            let mut stmt = tx.prepare_cached("INSERT INTO Artist (artist, Artist_ID) VALUES (?1, ?2)")?;
            for artist in &catalog.artists {
                stmt.execute(params![artist.name, artist.id])?;
            }

            let mut stmt = tx.prepare_cached("INSERT INTO Genre (genre, Genre_ID) VALUES (?1, ?2)")?;
            for genre in &catalog.genres {
                stmt.execute(params![genre.label, genre.id])?;
            }

            let mut stmt = tx.prepare_cached(
                "INSERT INTO Song (Song, Duration, Explicit, Year, Popularity, Danceability, Speechiness, Artist_ID, Genre_ID)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            )?;
            for song in &catalog.songs {
                stmt.execute(params![
                    song.title,
                    song.duration,
                    song.explicit,
                    song.year,
                    song.popularity,
                    song.danceability,
                    song.speechiness,
                    song.artist_id,
                    song.genre_id,
                ])?;
                pb.inc(1);
            }
        }
        tx.commit()?;
        pb.finish_with_message(format!("Wrote {} songs", catalog.songs.len()));

        info!(
            path = %self.path.display(),
            artists = catalog.artists.len(),
            genres = catalog.genres.len(),
            songs = catalog.songs.len(),
            "catalog replaced"
        );
        Ok(())
    }

    fn artist_exists(&self, name: &str) -> Result<bool> {
        let conn = self.open_ro()?;
        let exists: bool = conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM Artist WHERE artist = ?1)",
            [name],
            |row| row.get(0),
        )?;
        Ok(exists)
    }

    fn artist_names(&self) -> Result<Vec<String>> {
        let conn = self.open_ro()?;
        let mut stmt = conn.prepare("SELECT artist FROM Artist ORDER BY artist")?;
        let names = stmt
            .query_map([], |row| row.get(0))?
            .collect::<rusqlite::Result<Vec<String>>>()?;
        Ok(names)
    }

    fn genre_labels(&self) -> Result<Vec<String>> {
        let conn = self.open_ro()?;
        let mut stmt = conn.prepare("SELECT DISTINCT genre FROM Genre ORDER BY Genre_ID")?;
        let labels = stmt
            .query_map([], |row| row.get(0))?
            .collect::<rusqlite::Result<Vec<String>>>()?;
        Ok(labels)
    }

    fn counts(&self) -> Result<CatalogCounts> {
        let conn = self.open_ro()?;
        let count = |table: &str| -> rusqlite::Result<usize> {
            let n: i64 = conn.query_row(&format!("SELECT COUNT(*) FROM {}", table), [], |row| row.get(0))?;
            Ok(n as usize)
        };
        Ok(CatalogCounts {
            artists: count("Artist")?,
            genres: count("Genre")?,
            songs: count("Song")?,
        })
    }

    fn songs(&self) -> Result<Vec<Song>> {
        let conn = self.open_ro()?;
        let mut stmt = conn.prepare(
            "SELECT Song, Duration, Explicit, Year, Popularity, Danceability, Speechiness, Artist_ID, Genre_ID
             FROM Song ORDER BY rowid",
        )?;
        let songs = stmt
            .query_map([], |row| {
                Ok(Song {
                    title: row.get(0)?,
                    duration: row.get(1)?,
                    explicit: row.get(2)?,
                    year: row.get(3)?,
                    popularity: row.get(4)?,
                    danceability: row.get(5)?,
                    speechiness: row.get(6)?,
                    artist_id: row.get(7)?,
                    genre_id: row.get(8)?,
                })
            })?
            .collect::<rusqlite::Result<Vec<Song>>>()?;
        Ok(songs)
    }

    fn artist_genre_popularity(&self, artist: &str) -> Result<Vec<GenrePopularity>> {
        let conn = self.open_ro()?;
        let mut stmt = conn.prepare(
            "SELECT Genre.genre, Song.Popularity
             FROM Song
             JOIN Artist ON Song.Artist_ID = Artist.Artist_ID
             JOIN Genre ON Song.Genre_ID = Genre.Genre_ID
             WHERE Artist.artist = ?1
             ORDER BY Song.rowid",
        )?;
        let rows = stmt
            .query_map([artist], |row| {
                Ok(GenrePopularity {
                    genre: row.get(0)?,
                    popularity: row.get(1)?,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        debug!(artist, rows = rows.len(), "fetched artist genre popularity");
        Ok(rows)
    }

    fn genre_popularity(&self) -> Result<Vec<GenrePopularity>> {
        let conn = self.open_ro()?;
        let mut stmt = conn.prepare(
            "SELECT Genre.genre, Song.Popularity
             FROM Song
             JOIN Genre ON Song.Genre_ID = Genre.Genre_ID
             ORDER BY Song.rowid",
        )?;
        let rows = stmt
            .query_map([], |row| {
                Ok(GenrePopularity {
                    genre: row.get(0)?,
                    popularity: row.get(1)?,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        debug!(rows = rows.len(), "fetched global genre popularity");
        Ok(rows)
    }

    fn songs_in_year(&self, year: i64) -> Result<Vec<YearSong>> {
        let conn = self.open_ro()?;
        let mut stmt = conn.prepare(
            "SELECT Song.Song, Song.Duration, Song.Explicit, Song.Year, Song.Popularity,
                    Song.Danceability, Song.Speechiness, Genre.genre
             FROM Song
             JOIN Genre ON Song.Genre_ID = Genre.Genre_ID
             WHERE Song.Year = ?1
             ORDER BY Song.rowid",
        )?;
        let rows = stmt
            .query_map([year], |row| {
                Ok(YearSong {
                    title: row.get(0)?,
                    duration: row.get(1)?,
                    explicit: row.get(2)?,
                    year: row.get(3)?,
                    popularity: row.get(4)?,
                    danceability: row.get(5)?,
                    speechiness: row.get(6)?,
                    genre: row.get(7)?,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        debug!(year, rows = rows.len(), "fetched songs for year");
        Ok(rows)
    }

    fn artist_year_summaries(&self, start: i64, end: i64) -> Result<Vec<ArtistYearSummary>> {
        let conn = self.open_ro()?;
        let mut stmt = conn.prepare(
            "SELECT Artist.artist, Song.Year,
                    COUNT(Song.Song), AVG(Song.Popularity), AVG(Song.Danceability)
             FROM Song
             JOIN Artist ON Song.Artist_ID = Artist.Artist_ID
             WHERE Song.Year BETWEEN ?1 AND ?2
             GROUP BY Artist.artist, Song.Year
             ORDER BY Song.Year, Artist.artist",
        )?;
        let rows = stmt
            .query_map(params![start, end], |row| {
                Ok(ArtistYearSummary {
                    artist: row.get(0)?,
                    year: row.get(1)?,
                    song_count: row.get(2)?,
                    avg_popularity: row.get(3)?,
                    avg_danceability: row.get(4)?,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        debug!(start, end, rows = rows.len(), "fetched artist-year summaries");
        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Artist, Genre};
    use tempfile::tempdir;

    fn sample_catalog() -> Catalog {
        Catalog {
            artists: vec![
                Artist { id: 1, name: "Eminem".into() },
                Artist { id: 2, name: "DMX".into() },
            ],
            genres: vec![
                Genre { id: 1, label: "hip hop".into() },
                Genre { id: 2, label: "hip hop, pop".into() },
            ],
            songs: vec![
                song("Lose Yourself", 2002, 80, 1, 1),
                song("Without Me", 2002, 70, 1, 2),
                song("X Gon' Give It to Ya", 2003, 60, 2, 1),
            ],
        }
    }

    fn song(title: &str, year: i64, popularity: i64, artist_id: i64, genre_id: i64) -> Song {
        Song {
            title: title.into(),
            duration: 300,
            explicit: true,
            year,
            popularity,
            danceability: 0.7,
            speechiness: 0.4,
            artist_id,
            genre_id,
        }
    }

    #[test]
    fn test_replace_and_read_back() {
        let dir = tempdir().unwrap();
        let store = SqliteCatalog::new(dir.path().join("music.db"));
        let catalog = sample_catalog();
        store.replace_catalog(&catalog).unwrap();

        assert_eq!(store.songs().unwrap(), catalog.songs);
        assert_eq!(
            store.counts().unwrap(),
            CatalogCounts { artists: 2, genres: 2, songs: 3 }
        );
        assert_eq!(store.artist_names().unwrap(), vec!["DMX", "Eminem"]);
        assert_eq!(store.genre_labels().unwrap(), vec!["hip hop", "hip hop, pop"]);
    }

    #[test]
    fn test_replace_is_not_a_merge() {
        let dir = tempdir().unwrap();
        let store = SqliteCatalog::new(dir.path().join("music.db"));
        store.replace_catalog(&sample_catalog()).unwrap();

        let smaller = Catalog {
            artists: vec![Artist { id: 1, name: "Solo".into() }],
            genres: vec![Genre { id: 1, label: "rock".into() }],
            songs: vec![song("Only", 2010, 55, 1, 1)],
        };
        store.replace_catalog(&smaller).unwrap();
        assert_eq!(
            store.counts().unwrap(),
            CatalogCounts { artists: 1, genres: 1, songs: 1 }
        );
        assert!(!store.artist_exists("Eminem").unwrap());
        assert!(store.artist_exists("Solo").unwrap());
    }

    #[test]
    fn test_queries() {
        let dir = tempdir().unwrap();
        let store = SqliteCatalog::new(dir.path().join("music.db"));
        store.replace_catalog(&sample_catalog()).unwrap();

        let eminem = store.artist_genre_popularity("Eminem").unwrap();
        assert_eq!(eminem.len(), 2);
        assert_eq!(eminem[1].genre, "hip hop, pop");
        assert_eq!(eminem[1].popularity, 70.0);
        assert_eq!(store.genre_popularity().unwrap().len(), 3);

        let year = store.songs_in_year(2002).unwrap();
        assert_eq!(year.len(), 2);
        assert!(year.iter().all(|s| s.year == 2002 && s.explicit));
        assert!(store.songs_in_year(1999).unwrap().is_empty());

        let summaries = store.artist_year_summaries(2002, 2003).unwrap();
        assert_eq!(summaries.len(), 2);
        assert_eq!(summaries[0].artist, "Eminem");
        assert_eq!(summaries[0].song_count, 2);
        assert_eq!(summaries[0].avg_popularity, 75.0);
        assert_eq!(summaries[1].artist, "DMX");
        assert_eq!(summaries[1].year, 2003);
    }

    #[test]
    fn test_missing_database_is_storage_failure() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("absent.db");
        let store = SqliteCatalog::new(&path);
        let err = store.artist_names().unwrap_err();
        assert!(matches!(err, crate::error::StatsError::Storage(_)));
        assert!(!path.exists());
    }

    #[test]
    fn test_path() {
        let store = SqliteCatalog::new("catalog/MusicDatabase.db");
        assert_eq!(store.path(), Path::new("catalog/MusicDatabase.db"));
    }

    #[test]
    fn test_ensure_schema_is_idempotent() {
        let dir = tempdir().unwrap();
        let store = SqliteCatalog::new(dir.path().join("music.db"));
        store.ensure_schema().unwrap();
        store.ensure_schema().unwrap();
        assert_eq!(store.counts().unwrap(), CatalogCounts::default());
    }
}
