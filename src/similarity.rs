// src/similarity.rs

//! Matching-block similarity ratio used by the fuzzy pass.
//!
//! Greedy Ratcliff/Obershelp scheme: repeatedly take the longest contiguous
//! matching block (preferring the earliest start in `a`, then in `b`) and
//! recurse on the pieces to either side. The ratio is `2 * M / T` where `M`
//! is the total matched length and `T` the combined length of both strings.
//! Not an edit distance.

use std::collections::HashMap;

/// Similarity ratio in [0.0, 1.0]; 1.0 means identical strings.
pub fn sequence_ratio(a: &str, b: &str) -> f64 {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let total = a.len() + b.len();
    if total == 0 {
        return 1.0;
    }
    2.0 * matched_length(&a, &b) as f64 / total as f64
}

/// Total length of all matching blocks between `a` and `b`.
fn matched_length(a: &[char], b: &[char]) -> usize {
    // Positions of each character in b, ascending.
    let mut b2j: HashMap<char, Vec<usize>> = HashMap::new();
    for (j, c) in b.iter().enumerate() {
        b2j.entry(*c).or_default().push(j);
    }

    let mut matched = 0usize;
    // Worklist of (alo, ahi, blo, bhi) slices still to be examined.
    let mut queue = vec![(0usize, a.len(), 0usize, b.len())];
    while let Some((alo, ahi, blo, bhi)) = queue.pop() {
        let (i, j, size) = longest_match(a, &b2j, alo, ahi, blo, bhi);
        if size > 0 {
            matched += size;
            queue.push((alo, i, blo, j));
            queue.push((i + size, ahi, j + size, bhi));
        }
    }
    matched
}

/// Longest contiguous matching block inside the given slices.
fn longest_match(
    a: &[char],
    b2j: &HashMap<char, Vec<usize>>,
    alo: usize,
    ahi: usize,
    blo: usize,
    bhi: usize,
) -> (usize, usize, usize) {
    let (mut best_i, mut best_j, mut best_size) = (alo, blo, 0usize);
    // j2len[j] = length of the longest match ending at a[i - 1], b[j].
    let mut j2len: HashMap<usize, usize> = HashMap::new();
    for i in alo..ahi {
        let mut new_j2len: HashMap<usize, usize> = HashMap::new();
        if let Some(positions) = b2j.get(&a[i]) {
            for &j in positions {
                if j < blo {
                    continue;
                }
                if j >= bhi {
                    break;
                }
                let k = if j > 0 {
                    j2len.get(&(j - 1)).copied().unwrap_or(0) + 1
                } else {
                    1
                };
                new_j2len.insert(j, k);
                // Strict improvement only, so the earliest block wins ties.
                if k > best_size {
                    best_i = i + 1 - k;
                    best_j = j + 1 - k;
                    best_size = k;
                }
            }
        }
        j2len = new_j2len;
    }
    (best_i, best_j, best_size)
}
