// src/main.rs
use anyhow::{Context, Result};
use chrono::Utc;
use log::info;
use std::time::Instant;
use uuid::Uuid;

use enlace_lib::{
    config::PipelineConfig,
    enrich, matching,
    matching::name::NameMatchParams,
    normalize,
    results::{self, MatchStats, PipelineStats},
    tables::Table,
};

const ENRICHED_FILE: &str = "places_enriched_with_sri.csv";
const REPORT_FILE: &str = "match_report.json";

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));

    // Pick up file paths and column overrides from .env if present.
    dotenv::dotenv().ok();

    info!("Starting SRI/Places record-linkage pipeline");
    let start_time = Instant::now();

    let config = PipelineConfig::from_env().context("Failed to resolve pipeline configuration")?;
    let run_id = Uuid::new_v4().to_string();
    let run_timestamp = Utc::now().naive_utc();
    info!("Run ID: {}", run_id);

    // Phase 1: load both tables fully into memory before any matching.
    info!("Phase 1: Loading input tables");
    let phase1_start = Instant::now();
    let mut primary = Table::from_csv_path(&config.primary_path, "places")?;
    let mut secondary = Table::from_csv_path(&config.secondary_path, "sri")?;
    let load_time = phase1_start.elapsed();
    info!(
        "Loaded {} places row(s) and {} sri row(s) in {:.2?}",
        primary.len(),
        secondary.len(),
        load_time
    );
    info!("Pipeline progress: [1/4] phases (25%)");

    // Phase 2: normalization, applied independently to each table.
    info!("Phase 2: Normalizing business names");
    let phase2_start = Instant::now();
    let empty_primary_names = normalize::normalize_table(
        &mut primary,
        &config.primary_name_column,
        &config.normalized_column,
        &config.match_config,
    )?;
    normalize::normalize_table(
        &mut secondary,
        &config.secondary_name_column,
        &config.normalized_column,
        &config.match_config,
    )?;
    primary.write_csv_path(&config.normalized_dir.join("places_normalized.csv"))?;
    secondary.write_csv_path(&config.normalized_dir.join("sri_normalized.csv"))?;
    let normalize_time = phase2_start.elapsed();
    info!("Normalization complete in {:.2?}", normalize_time);
    info!("Pipeline progress: [2/4] phases (50%)");

    // Phase 3: matching under the province partition.
    info!("Phase 3: Matching places rows against sri candidates");
    let phase3_start = Instant::now();
    let params = NameMatchParams {
        primary_partition: config.primary_partition_column.clone(),
        secondary_partition: config.secondary_partition_column.clone(),
        normalized_column: config.normalized_column.clone(),
    };
    let resolutions =
        matching::name::find_matches(&primary, &secondary, &params, &config.match_config).await?;
    let matching_time = phase3_start.elapsed();
    info!("Pipeline progress: [3/4] phases (75%)");

    // Phase 4: enriched output table plus the run report.
    info!("Phase 4: Writing enriched table");
    let phase4_start = Instant::now();
    let outcomes: Vec<_> = resolutions.iter().map(|r| r.outcome.clone()).collect();
    let enriched = enrich::build_enriched(&primary, &secondary, &outcomes, &config.normalized_column);
    let out_path = config.output_dir.join(ENRICHED_FILE);
    enriched.write_csv_path(&out_path)?;
    let write_time = phase4_start.elapsed();

    let match_stats = MatchStats::from_resolutions(&resolutions, empty_primary_names);
    let stats = PipelineStats {
        run_id,
        run_timestamp,
        total_primary: primary.len(),
        total_secondary: secondary.len(),
        load_time: load_time.as_secs_f64(),
        normalize_time: normalize_time.as_secs_f64(),
        matching_time: matching_time.as_secs_f64(),
        write_time: write_time.as_secs_f64(),
        total_processing_time: start_time.elapsed().as_secs_f64(),
        match_stats,
    };
    results::generate_report(&stats, &config.output_dir.join(REPORT_FILE))?;
    info!("Pipeline progress: [4/4] phases (100%)");

    info!(
        "Pipeline completed in {:.2?}. Total places: {}, exact: {}, fuzzy: {}, unmatched: {}. Output: {}",
        start_time.elapsed(),
        stats.match_stats.total_primary,
        stats.match_stats.exact_matches,
        stats.match_stats.fuzzy_matches,
        stats.match_stats.unmatched,
        out_path.display()
    );

    Ok(())
}
