// src/config.rs

use std::collections::HashSet;
use std::env;
use std::path::PathBuf;

use anyhow::{Context, Result};

/// Minimum similarity for a fuzzy candidate to be accepted.
pub const MIN_FUZZY_SIMILARITY_THRESHOLD: f64 = 0.85;

/// Tokens at or below this length are dropped during normalization.
pub const MIN_TOKEN_LENGTH: usize = 2;

/// Tokens at or below this length are exempt from depluralization so short
/// legitimate words are not corrupted.
pub const DEPLURALIZE_MIN_LENGTH: usize = 4;

/// Generic business-type words, noise words observed in the source
/// registries, and short Spanish connectors. Compared after uppercasing and
/// diacritic stripping, so the set is uppercase ASCII only.
pub const STOPWORDS: [&str; 19] = [
    // rubro
    "LIBRERIA",
    "PAPELERIA",
    // genéricas comerciales
    "COMERCIAL",
    "ALMACEN",
    "DISTRIBUIDORA",
    "DISTRIBUIDOR",
    // ruido detectado en datos reales
    "FERIA",
    "LIBRO",
    "LIBROS",
    "ARTE",
    "ARTES",
    "SU",
    // conectores
    "Y",
    "DE",
    "DEL",
    "LA",
    "EL",
    "LOS",
    "LAS",
];

/// Immutable knobs shared by the normalizer and the matcher.
///
/// Passed explicitly into both so runs with different thresholds can execute
/// concurrently without interference.
#[derive(Debug, Clone)]
pub struct MatchConfig {
    pub fuzzy_threshold: f64,
    pub stopwords: HashSet<&'static str>,
    pub min_token_length: usize,
    pub depluralize_min_length: usize,
}

impl Default for MatchConfig {
    fn default() -> Self {
        MatchConfig {
            fuzzy_threshold: MIN_FUZZY_SIMILARITY_THRESHOLD,
            stopwords: STOPWORDS.iter().copied().collect(),
            min_token_length: MIN_TOKEN_LENGTH,
            depluralize_min_length: DEPLURALIZE_MIN_LENGTH,
        }
    }
}

/// Runtime configuration resolved from environment variables (optionally via
/// a `.env` file). File paths and column names only; there is no CLI surface.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Primary (Places) CSV. Its cardinality is preserved in the output.
    pub primary_path: PathBuf,
    /// Secondary (SRI) CSV, consulted for enrichment only.
    pub secondary_path: PathBuf,
    /// Directory the enriched table and the run report are written to.
    pub output_dir: PathBuf,
    /// Directory the normalized copies of both tables are written to.
    pub normalized_dir: PathBuf,
    pub primary_name_column: String,
    pub secondary_name_column: String,
    pub primary_partition_column: String,
    pub secondary_partition_column: String,
    /// Derived column appended to both tables by the normalize phase.
    pub normalized_column: String,
    pub match_config: MatchConfig,
}

impl PipelineConfig {
    pub fn from_env() -> Result<Self> {
        let mut match_config = MatchConfig::default();
        if let Ok(raw) = env::var("MATCH_SCORE_MIN") {
            match_config.fuzzy_threshold = raw
                .parse::<f64>()
                .with_context(|| format!("MATCH_SCORE_MIN must be a float, got '{}'", raw))?;
        }

        Ok(PipelineConfig {
            primary_path: env_or("PLACES_FILE", "data/scrapped/librerias_places.csv").into(),
            secondary_path: env_or("SRI_FILE", "data/cleaned/librerias_georef_all.csv").into(),
            output_dir: env_or("OUT_DIR", "data/matched").into(),
            normalized_dir: env_or("NORMALIZED_DIR", "data/normalized").into(),
            primary_name_column: env_or("PLACES_NAME_COLUMN", "nombre"),
            secondary_name_column: env_or("SRI_NAME_COLUMN", "nombre"),
            primary_partition_column: env_or("PLACES_PROVINCE_COLUMN", "provincia"),
            secondary_partition_column: env_or("SRI_PROVINCE_COLUMN", "DESCRIPCION_PROVINCIA_EST"),
            normalized_column: env_or("NORMALIZED_COLUMN", "nombre_norm"),
            match_config,
        })
    }
}

fn env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}
