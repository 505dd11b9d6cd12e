// src/enrich.rs

use log::debug;

use crate::models::MatchOutcome;
use crate::tables::Table;

/// Builds the enriched output table: exactly one row per primary record, in
/// primary input order.
///
/// Primary columns pass through untouched (minus the derived normalized
/// column), followed by `match_type` and `match_score`, followed by every
/// secondary enrichment column. Secondary values are empty when the row is
/// unmatched; a secondary row may be referenced zero or one times per
/// primary row, never fanned out.
pub fn build_enriched(
    primary: &Table,
    secondary: &Table,
    outcomes: &[MatchOutcome],
    normalized_column: &str,
) -> Table {
    debug_assert_eq!(outcomes.len(), primary.len());

    let primary_cols: Vec<usize> = passthrough_columns(primary, normalized_column);
    let secondary_cols: Vec<usize> = passthrough_columns(secondary, normalized_column);

    let mut headers: Vec<String> = primary_cols
        .iter()
        .map(|&idx| primary.headers()[idx].clone())
        .collect();
    headers.push("match_type".to_string());
    headers.push("match_score".to_string());
    // Secondary headers keep their names unless they collide with one
    // already emitted; collisions get the secondary table identity as a
    // suffix (e.g. "nombre" -> "nombre_sri").
    for &idx in &secondary_cols {
        let header = &secondary.headers()[idx];
        if headers.iter().any(|h| h == header) {
            headers.push(format!("{}_{}", header, secondary.name));
        } else {
            headers.push(header.clone());
        }
    }

    let mut enriched = Table::new(&format!("{}_enriched", primary.name), headers);
    for (row, outcome) in outcomes.iter().enumerate() {
        let mut values: Vec<String> = primary_cols
            .iter()
            .map(|&idx| primary.value(row, idx).to_string())
            .collect();

        values.push(
            outcome
                .match_type()
                .map(|t| t.as_str().to_string())
                .unwrap_or_default(),
        );
        values.push(
            outcome
                .score()
                .map(|score| format!("{:.3}", score))
                .unwrap_or_default(),
        );

        match outcome.secondary() {
            Some(sec) => {
                for &idx in &secondary_cols {
                    values.push(secondary.value(sec, idx).to_string());
                }
            }
            None => values.extend(secondary_cols.iter().map(|_| String::new())),
        }

        enriched.push_row(values);
    }

    debug!("Assembled {} enriched row(s)", enriched.len());
    enriched
}

fn passthrough_columns(table: &Table, normalized_column: &str) -> Vec<usize> {
    table
        .headers()
        .iter()
        .enumerate()
        .filter(|(_, header)| header.as_str() != normalized_column)
        .map(|(idx, _)| idx)
        .collect()
}
