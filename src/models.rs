// src/models.rs

use serde::{Deserialize, Serialize};

//------------------------------------------------------------------------------
// VALUE TYPES
//------------------------------------------------------------------------------

/// Canonical token form of a business name used for comparison.
///
/// An ordered sequence of uppercase, diacritic-free, stopword-filtered,
/// singularized tokens re-joined with single spaces. The empty string is a
/// valid value (the record has no usable name) and never matches anything,
/// including another empty string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NormalizedName(pub String);

impl NormalizedName {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Match classification as it appears in the output table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchType {
    /// Normalized names are identical; score is always 1.0.
    Exact,
    /// Best-scoring candidate at or above the fuzzy threshold.
    Fuzzy,
}

impl MatchType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MatchType::Exact => "exact",
            MatchType::Fuzzy => "fuzzy",
        }
    }
}

/// Terminal state of one primary record's resolution against its candidate
/// set.
///
/// A tagged variant carrying the winning candidate's row index and score, so
/// calling code never deals in sentinel nulls.
#[derive(Debug, Clone, PartialEq)]
pub enum MatchOutcome {
    /// First candidate in source order whose normalized name is identical.
    Exact { secondary: usize },
    /// Best fuzzy candidate; score is in [threshold, 1.0).
    Fuzzy { secondary: usize, score: f64 },
    /// No candidate met the criteria.
    Unmatched,
}

impl MatchOutcome {
    pub fn match_type(&self) -> Option<MatchType> {
        match self {
            MatchOutcome::Exact { .. } => Some(MatchType::Exact),
            MatchOutcome::Fuzzy { .. } => Some(MatchType::Fuzzy),
            MatchOutcome::Unmatched => None,
        }
    }

    pub fn score(&self) -> Option<f64> {
        match self {
            MatchOutcome::Exact { .. } => Some(1.0),
            MatchOutcome::Fuzzy { score, .. } => Some(*score),
            MatchOutcome::Unmatched => None,
        }
    }

    /// Row index of the secondary record this primary row was linked to.
    pub fn secondary(&self) -> Option<usize> {
        match self {
            MatchOutcome::Exact { secondary } | MatchOutcome::Fuzzy { secondary, .. } => {
                Some(*secondary)
            }
            MatchOutcome::Unmatched => None,
        }
    }

    pub fn is_matched(&self) -> bool {
        !matches!(self, MatchOutcome::Unmatched)
    }
}

/// Outcome of one primary row plus instrumentation about how it was reached.
#[derive(Debug, Clone)]
pub struct Resolution {
    pub outcome: MatchOutcome,
    /// Number of fuzzy comparisons performed for this row. Zero when the
    /// exact pass hit or the row had no usable name.
    pub fuzzy_comparisons: usize,
}

impl Default for Resolution {
    fn default() -> Self {
        Resolution {
            outcome: MatchOutcome::Unmatched,
            fuzzy_comparisons: 0,
        }
    }
}
