// src/lib.rs
pub mod config;
pub mod enrich;
pub mod error;
pub mod matching;
pub mod models;
pub mod normalize;
pub mod results;
pub mod similarity;
pub mod tables;

// Re-export common types for easier access
pub use config::{MatchConfig, PipelineConfig};
pub use error::PipelineError;
pub use models::{MatchOutcome, MatchType, NormalizedName, Resolution};
pub use tables::Table;
