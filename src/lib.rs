//! Song catalog statistics library: catalog build pipeline and analyses.

pub mod artists;
pub mod catalog;
pub mod clean;
pub mod config;
pub mod error;
pub mod genres;
pub mod input;
pub mod models;
pub mod normalize;
pub mod popularity;
pub mod progress;
pub mod ranking;
pub mod report;
pub mod safety;
pub mod stats;
pub mod store;
pub mod validate;
pub mod yearly;

pub use error::{settle, Result, StatsError};
