// src/matching/name.rs

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};
use futures::future::try_join_all;
use log::info;
use tokio::task::JoinHandle;

use crate::config::MatchConfig;
use crate::models::{MatchOutcome, Resolution};
use crate::similarity::sequence_ratio;
use crate::tables::Table;

/// Number of concurrent tasks the primary table is sharded across. Each
/// shard resolves an independent row range against the shared immutable
/// candidate index, so no coordination is needed.
const INTERNAL_WORKERS_NAME_STRATEGY: usize = 4;

/// Column bindings for one matching run.
#[derive(Debug, Clone)]
pub struct NameMatchParams {
    /// Partition (province) column on the primary table.
    pub primary_partition: String,
    /// Partition (province) column on the secondary table.
    pub secondary_partition: String,
    /// Normalized-name column, present on both tables after the normalize
    /// phase.
    pub normalized_column: String,
}

/// Per-row key material extracted once, up front.
#[derive(Debug)]
struct RowKey {
    normalized: String,
    /// Uppercased partition value; partition comparison is case-insensitive.
    partition: String,
}

fn row_keys(table: &Table, partition_column: &str, normalized_column: &str) -> Result<Vec<RowKey>> {
    let partition_idx = table.column_index(partition_column)?;
    let normalized_idx = table.column_index(normalized_column)?;
    Ok((0..table.len())
        .map(|row| RowKey {
            normalized: table.value(row, normalized_idx).to_string(),
            partition: table.value(row, partition_idx).to_uppercase(),
        })
        .collect())
}

/// Secondary rows grouped by partition, excluding rows whose normalized name
/// is empty. Bounds the candidate scan per primary row.
#[derive(Debug, Default)]
struct CandidateIndex {
    by_partition: HashMap<String, Vec<usize>>,
}

impl CandidateIndex {
    fn build(keys: &[RowKey]) -> Self {
        let mut by_partition: HashMap<String, Vec<usize>> = HashMap::new();
        for (idx, key) in keys.iter().enumerate() {
            if key.normalized.is_empty() {
                continue;
            }
            by_partition
                .entry(key.partition.clone())
                .or_default()
                .push(idx);
        }
        CandidateIndex { by_partition }
    }

    fn candidates(&self, partition: &str) -> &[usize] {
        self.by_partition
            .get(partition)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}

/// Resolves a single primary record against its partition's candidate slice.
///
/// The exact pass takes the first identical candidate in source order and
/// short-circuits the fuzzy pass entirely. The fuzzy pass is a fold with
/// strict-improvement replacement, so the earliest-seen candidate wins ties;
/// candidates scoring below the threshold are never accepted.
pub fn resolve_record<'a, I>(primary_normalized: &str, candidates: I, threshold: f64) -> Resolution
where
    I: IntoIterator<Item = (usize, &'a str)>,
{
    if primary_normalized.is_empty() {
        return Resolution::default();
    }

    let candidates: Vec<(usize, &str)> = candidates.into_iter().collect();

    if let Some(&(secondary, _)) = candidates
        .iter()
        .find(|(_, name)| *name == primary_normalized)
    {
        return Resolution {
            outcome: MatchOutcome::Exact { secondary },
            fuzzy_comparisons: 0,
        };
    }

    let mut fuzzy_comparisons = 0usize;
    let best = candidates
        .iter()
        .copied()
        .fold(None::<(usize, f64)>, |best, (idx, name)| {
            fuzzy_comparisons += 1;
            let score = sequence_ratio(primary_normalized, name);
            if score < threshold {
                return best;
            }
            match best {
                Some((_, best_score)) if score <= best_score => best,
                _ => Some((idx, score)),
            }
        });

    match best {
        Some((secondary, score)) => Resolution {
            outcome: MatchOutcome::Fuzzy { secondary, score },
            fuzzy_comparisons,
        },
        None => Resolution {
            outcome: MatchOutcome::Unmatched,
            fuzzy_comparisons,
        },
    }
}

/// Matches every primary row against its same-partition secondary
/// candidates. Returns one resolution per primary row, order-preserving.
///
/// Missing partition or normalized-name columns on either table are fatal
/// and reported before any row is processed.
pub async fn find_matches(
    primary: &Table,
    secondary: &Table,
    params: &NameMatchParams,
    cfg: &MatchConfig,
) -> Result<Vec<Resolution>> {
    info!(
        "Starting name matching: {} primary row(s) against {} secondary row(s)",
        primary.len(),
        secondary.len()
    );
    let start_time = Instant::now();

    // Fail-fast column validation happens inside row_keys.
    let primary_keys = Arc::new(row_keys(
        primary,
        &params.primary_partition,
        &params.normalized_column,
    )?);
    let secondary_keys = row_keys(
        secondary,
        &params.secondary_partition,
        &params.normalized_column,
    )?;
    let index = Arc::new(CandidateIndex::build(&secondary_keys));
    let secondary_keys = Arc::new(secondary_keys);

    let total = primary_keys.len();
    if total == 0 {
        info!("Primary table is empty; nothing to match.");
        return Ok(Vec::new());
    }

    let threshold = cfg.fuzzy_threshold;
    let chunk_size = (total + INTERNAL_WORKERS_NAME_STRATEGY - 1) / INTERNAL_WORKERS_NAME_STRATEGY;

    let mut tasks: Vec<JoinHandle<(usize, Vec<Resolution>)>> = Vec::new();
    for chunk_start in (0..total).step_by(chunk_size) {
        let chunk_end = usize::min(chunk_start + chunk_size, total);
        let primary_keys = Arc::clone(&primary_keys);
        let secondary_keys = Arc::clone(&secondary_keys);
        let index = Arc::clone(&index);

        tasks.push(tokio::spawn(async move {
            let mut shard = Vec::with_capacity(chunk_end - chunk_start);
            for row in chunk_start..chunk_end {
                let key = &primary_keys[row];
                let candidates = index
                    .candidates(&key.partition)
                    .iter()
                    .map(|&idx| (idx, secondary_keys[idx].normalized.as_str()));
                shard.push(resolve_record(&key.normalized, candidates, threshold));
            }
            (chunk_start, shard)
        }));
    }

    let shards = try_join_all(tasks)
        .await
        .context("A name matching task panicked or was cancelled")?;

    // Re-splice shards so output order strictly follows primary input order.
    let mut resolutions: Vec<Resolution> = vec![Resolution::default(); total];
    for (chunk_start, shard) in shards {
        for (offset, resolution) in shard.into_iter().enumerate() {
            resolutions[chunk_start + offset] = resolution;
        }
    }

    let matched = resolutions
        .iter()
        .filter(|r| r.outcome.is_matched())
        .count();
    info!(
        "Name matching completed in {:.2?}: {}/{} primary row(s) matched",
        start_time.elapsed(),
        matched,
        total
    );

    Ok(resolutions)
}
