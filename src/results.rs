// src/results.rs

use std::path::Path;

use anyhow::{Context, Result};
use chrono::NaiveDateTime;
use log::info;
use serde::Serialize;

use crate::models::{MatchOutcome, Resolution};

/// Statistics for one matching run.
#[derive(Debug, Clone, Serialize)]
pub struct MatchStats {
    /// One output row per primary record, so this is also the output length.
    pub total_primary: usize,
    pub exact_matches: usize,
    pub fuzzy_matches: usize,
    pub unmatched: usize,
    /// Primary rows whose name normalized to the empty string.
    pub empty_primary_names: usize,
    /// Average score of accepted fuzzy matches (0.0 when there were none).
    pub avg_fuzzy_score: f64,
    /// Total fuzzy comparisons performed across all rows.
    pub fuzzy_comparisons: usize,
}

impl MatchStats {
    pub fn from_resolutions(resolutions: &[Resolution], empty_primary_names: usize) -> Self {
        let mut exact_matches = 0usize;
        let mut fuzzy_matches = 0usize;
        let mut fuzzy_comparisons = 0usize;
        let mut fuzzy_score_sum = 0.0f64;

        for resolution in resolutions {
            fuzzy_comparisons += resolution.fuzzy_comparisons;
            match resolution.outcome {
                MatchOutcome::Exact { .. } => exact_matches += 1,
                MatchOutcome::Fuzzy { score, .. } => {
                    fuzzy_matches += 1;
                    fuzzy_score_sum += score;
                }
                MatchOutcome::Unmatched => {}
            }
        }

        let avg_fuzzy_score = if fuzzy_matches > 0 {
            fuzzy_score_sum / fuzzy_matches as f64
        } else {
            0.0
        };

        MatchStats {
            total_primary: resolutions.len(),
            exact_matches,
            fuzzy_matches,
            unmatched: resolutions.len() - exact_matches - fuzzy_matches,
            empty_primary_names,
            avg_fuzzy_score,
            fuzzy_comparisons,
        }
    }
}

/// Complete pipeline run statistics, serialized as the run report.
#[derive(Debug, Clone, Serialize)]
pub struct PipelineStats {
    pub run_id: String,
    pub run_timestamp: NaiveDateTime,

    pub total_primary: usize,
    pub total_secondary: usize,

    pub load_time: f64,
    pub normalize_time: f64,
    pub matching_time: f64,
    pub write_time: f64,
    pub total_processing_time: f64,

    pub match_stats: MatchStats,
}

/// Writes the run report as JSON next to the enriched table.
pub fn generate_report(stats: &PipelineStats, path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(stats).context("Failed to serialize pipeline stats")?;
    std::fs::write(path, json)
        .with_context(|| format!("Failed to write run report to {}", path.display()))?;
    info!("Run report written to {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stats_partition_the_primary_rows() {
        let resolutions = vec![
            Resolution {
                outcome: MatchOutcome::Exact { secondary: 0 },
                fuzzy_comparisons: 0,
            },
            Resolution {
                outcome: MatchOutcome::Fuzzy {
                    secondary: 2,
                    score: 0.9,
                },
                fuzzy_comparisons: 5,
            },
            Resolution::default(),
        ];
        let stats = MatchStats::from_resolutions(&resolutions, 1);
        assert_eq!(stats.total_primary, 3);
        assert_eq!(stats.exact_matches, 1);
        assert_eq!(stats.fuzzy_matches, 1);
        assert_eq!(stats.unmatched, 1);
        assert_eq!(stats.empty_primary_names, 1);
        assert_eq!(stats.fuzzy_comparisons, 5);
        assert_eq!(stats.avg_fuzzy_score, 0.9);
    }
}
