//! Safety checks before a catalog build replaces the database.
//!
//! A build drops and recreates every catalog table, so the target path is
//! validated first to avoid clobbering the input table or a stray file.

use std::path::Path;

use crate::error::{Result, StatsError};

/// File extensions accepted for the catalog database.
pub const DATABASE_EXTENSIONS: &[&str] = &["db", "sqlite", "sqlite3"];

/// Validates that `database` is safe to replace with a freshly built catalog.
///
/// Checks:
/// - the path is not a directory
/// - the extension is one of `DATABASE_EXTENSIONS`
/// - the path is not any of the source files
pub fn validate_catalog_path(database: &Path, source_paths: &[&Path]) -> Result<()> {
    if database.is_dir() {
        return Err(StatsError::InvalidInput(format!(
            "catalog path '{}' is a directory",
            database.display()
        )));
    }

    let extension = database
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_default();
    if !DATABASE_EXTENSIONS.contains(&extension.as_str()) {
        return Err(StatsError::InvalidInput(format!(
            "catalog path '{}' must end in one of: {}",
            database.display(),
            DATABASE_EXTENSIONS.join(", ")
        )));
    }

    for source in source_paths {
        if database == *source {
            return Err(StatsError::InvalidInput(format!(
                "catalog path '{}' cannot be the same as source '{}'",
                database.display(),
                source.display()
            )));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_valid_catalog_path() {
        let output = PathBuf::from("/tmp/MusicDatabase.db");
        let source = PathBuf::from("/data/songs.csv");
        assert!(validate_catalog_path(&output, &[&source]).is_ok());
        let output = PathBuf::from("/tmp/catalog.SQLITE3");
        assert!(validate_catalog_path(&output, &[&source]).is_ok());
    }

    #[test]
    fn test_wrong_extension() {
        let output = PathBuf::from("/tmp/songs.csv");
        let source = PathBuf::from("/data/other.csv");
        let err = validate_catalog_path(&output, &[&source]).unwrap_err();
        assert!(err.to_string().contains("must end in one of"));
    }

    #[test]
    fn test_output_equals_source() {
        let path = PathBuf::from("/data/songs.db");
        let err = validate_catalog_path(&path, &[&path]).unwrap_err();
        assert!(err.to_string().contains("cannot be the same as source"));
    }

    #[test]
    fn test_directory_rejected() {
        let dir = std::env::temp_dir();
        assert!(validate_catalog_path(&dir, &[]).is_err());
    }
}
