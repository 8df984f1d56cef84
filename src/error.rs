//! Error taxonomy shared by the pipeline and the analyses.
//!
//! `NotFound` and `InvalidInput` are informational outcomes: the request is
//! answered with a diagnostic and no partial table. `Storage` wraps any
//! connection or query failure. `DataIntegrity` is raised only while building
//! the catalog and is always fatal to the build.

use thiserror::Error;
use tracing::{error, info, warn};

#[derive(Debug, Error)]
pub enum StatsError {
    #[error("{0}")]
    NotFound(String),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("storage failure: {0}")]
    Storage(#[from] rusqlite::Error),

    #[error("data integrity violation: {0}")]
    DataIntegrity(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("reading input: {0}")]
    Csv(#[from] csv::Error),

    #[error("config error: {0}")]
    Config(#[from] toml::de::Error),
}

pub type Result<T> = std::result::Result<T, StatsError>;

impl StatsError {
    /// True for outcomes that describe the request rather than a failure.
    pub fn is_informational(&self) -> bool {
        matches!(self, StatsError::NotFound(_) | StatsError::InvalidInput(_))
    }
}

/// Resolve an analysis result at the caller boundary.
///
/// Informational errors and storage failures are logged and turned into
/// `None` so the caller performs a graceful no-op instead of unwinding.
pub fn settle<T>(result: Result<T>) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(e) if e.is_informational() => {
            if matches!(e, StatsError::NotFound(_)) {
                info!("{}", e);
            } else {
                warn!("{}", e);
            }
            None
        }
        Err(e) => {
            error!(error = %e, "analysis failed, returning an empty result");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_informational_kinds() {
        assert!(StatsError::NotFound("x".into()).is_informational());
        assert!(StatsError::InvalidInput("x".into()).is_informational());
        assert!(!StatsError::DataIntegrity("x".into()).is_informational());
    }

    #[test]
    fn test_settle_swallows_failures() {
        assert_eq!(settle(Ok(3)), Some(3));
        assert_eq!(settle::<i32>(Err(StatsError::NotFound("none".into()))), None);
        assert_eq!(settle::<i32>(Err(StatsError::InvalidInput("1997".into()))), None);
        let storage = StatsError::Storage(rusqlite::Error::InvalidQuery);
        assert_eq!(settle::<i32>(Err(storage)), None);
    }

    #[test]
    fn test_error_messages() {
        let e = StatsError::InvalidInput("year 1997 outside 1998-2020".into());
        assert_eq!(e.to_string(), "invalid input: year 1997 outside 1998-2020");
        let e = StatsError::NotFound("There is no data available for the year 2000.".into());
        assert_eq!(e.to_string(), "There is no data available for the year 2000.");
    }

    #[test]
    fn test_csv_message_not_doubled() {
        let data = "a,b\n1\n";
        let err = csv::Reader::from_reader(data.as_bytes())
            .records()
            .find_map(|r| r.err())
            .map(StatsError::from)
            .unwrap();
        let message = err.to_string();
        assert!(message.starts_with("reading input: "));
        assert_eq!(message.matches("CSV error").count(), 1);
    }
}
