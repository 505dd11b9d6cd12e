// src/normalize.rs

use anyhow::Result;
use log::{debug, warn};
use once_cell::sync::Lazy;
use regex::Regex;
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

use crate::config::MatchConfig;
use crate::models::NormalizedName;
use crate::tables::Table;

// Everything that is not an uppercase Latin letter or whitespace collapses
// to a separator before tokenization.
static NON_LETTER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^A-Z\s]").expect("literal pattern compiles"));

impl NormalizedName {
    /// Canonicalizes a raw business name into its comparable token form.
    ///
    /// Missing, empty, or whitespace-only input normalizes to the empty
    /// string, which is excluded from candidacy on both sides of the match.
    pub fn from_raw(raw: Option<&str>, cfg: &MatchConfig) -> NormalizedName {
        let raw = match raw {
            Some(text) if !text.trim().is_empty() => text,
            _ => return NormalizedName(String::new()),
        };

        let upper = raw.to_uppercase();
        // NFD, then drop combining marks so accented letters keep their base.
        let folded: String = upper.nfd().filter(|c| !is_combining_mark(*c)).collect();
        let letters_only = NON_LETTER.replace_all(&folded, " ");

        let tokens: Vec<String> = letters_only
            .split_whitespace()
            .filter(|t| !cfg.stopwords.contains(*t) && t.len() > cfg.min_token_length)
            .map(|t| singularize(t, cfg))
            .collect();

        NormalizedName(tokens.join(" "))
    }
}

/// Naive plural collapse for Spanish business names. Tokens at or below the
/// length floor are left alone. Surviving tokens are ASCII `A-Z` only, so
/// byte length equals character length here.
fn singularize(token: &str, cfg: &MatchConfig) -> String {
    if token.ends_with("ES") && token.len() > cfg.depluralize_min_length {
        token[..token.len() - 2].to_string()
    } else if token.ends_with('S') && token.len() > cfg.depluralize_min_length {
        token[..token.len() - 1].to_string()
    } else {
        token.to_string()
    }
}

/// Appends the normalized-name column to a table, one value per row.
///
/// Fails fast when the raw name column is absent. Rows whose name normalizes
/// to the empty string are kept (they are annotated as unmatched later, never
/// dropped); returns how many there were.
pub fn normalize_table(
    table: &mut Table,
    name_column: &str,
    normalized_column: &str,
    cfg: &MatchConfig,
) -> Result<usize> {
    let name_idx = table.column_index(name_column)?;

    let mut empty_names = 0usize;
    let mut normalized: Vec<String> = Vec::with_capacity(table.len());
    for row in 0..table.len() {
        let norm = NormalizedName::from_raw(Some(table.value(row, name_idx)), cfg);
        if norm.is_empty() {
            empty_names += 1;
        }
        normalized.push(norm.0);
    }

    if empty_names > 0 {
        warn!(
            "{} row(s) in the '{}' table normalize to an empty name and will never match",
            empty_names, table.name
        );
    }
    debug!(
        "Normalized {} name(s) in the '{}' table",
        table.len(),
        table.name
    );

    table.push_column(normalized_column, normalized);
    Ok(empty_names)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn normalize(raw: &str) -> String {
        NormalizedName::from_raw(Some(raw), &MatchConfig::default()).0
    }

    #[test]
    fn missing_and_blank_input_normalize_to_empty() {
        let cfg = MatchConfig::default();
        assert_eq!(NormalizedName::from_raw(None, &cfg).as_str(), "");
        assert_eq!(normalize(""), "");
        assert_eq!(normalize("   \t  "), "");
    }

    #[test]
    fn stopwords_and_short_tokens_are_dropped() {
        assert_eq!(normalize("LIBRERIA EL SABER"), "SABER");
        assert_eq!(normalize("Papeleria y Libreria La Union"), "UNION");
    }

    #[test]
    fn all_stopword_names_collapse_to_empty() {
        assert_eq!(normalize("LIBROS ARTES"), "");
        assert_eq!(normalize("Su Feria del Libro"), "");
    }

    #[test]
    fn diacritics_fold_to_base_letters() {
        assert_eq!(normalize("Librería San José"), "SAN JOSE");
        assert_eq!(normalize("Almacén Cañón"), "CANON");
    }

    #[test]
    fn punctuation_and_digits_become_separators() {
        assert_eq!(normalize("  ¡Librería 2000! — El Quijote & Cía.  "), "QUIJOTE CIA");
    }

    #[test]
    fn depluralization_respects_the_length_floor() {
        // FELICES loses the trailing ES; CUADERNOS the trailing S.
        assert_eq!(normalize("Mundo Felices"), "MUNDO FELIC");
        assert_eq!(normalize("Cuadernos Rosas"), "CUADERNO ROSA");
        // TRES ends in ES but is too short to strip.
        assert_eq!(normalize("Mundo Tres"), "MUNDO TRES");
    }

    #[test]
    fn output_charset_is_uppercase_letters_and_single_spaces() {
        for raw in [
            "Libreria San Jose",
            "SAN JOSE LIBRERIA Y PAPELERIA",
            "  ¡Librería 2000! — El Quijote & Cía.  ",
            "Papeleria Mundo Feliz",
        ] {
            let norm = normalize(raw);
            assert!(
                norm.chars().all(|c| c.is_ascii_uppercase() || c == ' '),
                "unexpected characters in '{}'",
                norm
            );
            assert_eq!(norm, norm.trim());
            assert!(!norm.contains("  "), "double space in '{}'", norm);
        }
    }

    #[test]
    fn renormalizing_is_a_no_op_on_realistic_names() {
        for raw in [
            "Libreria San Jose",
            "Papeleria Mundo Feliz",
            "Mundo Felices",
            "El Quijote",
        ] {
            let once = normalize(raw);
            assert_eq!(normalize(&once), once, "second pass changed '{}'", raw);
        }
    }
}
