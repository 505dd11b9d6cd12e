// src/error.rs

use thiserror::Error;

/// Fatal configuration problems detected before any row is processed.
///
/// Data-quality problems (empty or unusable names) are deliberately not in
/// this taxonomy: those rows are annotated as unmatched, never rejected.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("required column '{column}' is missing from the '{table}' table")]
    MissingColumn { table: String, column: String },
}
