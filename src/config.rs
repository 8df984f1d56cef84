//! Tool configuration, loaded from an optional TOML file.
//!
//! Every section is optional; missing keys keep their defaults. Command-line
//! flags are applied on top by the binary.

use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::clean::FilterPolicy;
use crate::error::Result;
use crate::ranking::RankingConfig;
use crate::validate::YearValidator;

pub const DEFAULT_DATABASE: &str = "MusicDatabase.db";

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct Config {
    pub database: PathBuf,
    pub years: YearValidator,
    pub filters: FilterPolicy,
    pub ranking: RankingConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database: PathBuf::from(DEFAULT_DATABASE),
            years: YearValidator::default(),
            filters: FilterPolicy::default(),
            ranking: RankingConfig::default(),
        }
    }
}

impl Config {
    pub fn from_toml(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Read `path`, or fall back to defaults when no file is given.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::from_toml(&std::fs::read_to_string(path)?),
            None => Ok(Self::default()),
        }
    }
}
