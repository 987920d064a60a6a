// Builds a ready engine from configuration and reads draft files.

use std::path::Path;
use std::sync::Arc;

use tracing::{info, warn};

use draftline_core::catalog::load_catalog;
use draftline_core::config::EngineConfig;
use draftline_core::oracle::{load_priors, PriorOracle};
use draftline_core::recommend::RecommendationEngine;
use draftline_core::state::DraftParts;
use draftline_core::tables::load_pair_tables;
use draftline_core::DataError;

/// Load the catalog, pair tables and priors named in `config.data` and wire
/// them into an engine backed by the prior oracle.
pub fn load_engine(config: &EngineConfig) -> Result<RecommendationEngine, DataError> {
    let catalog = load_catalog(&config.data.champions, config.pool)?;
    info!(
        "Loaded {} champions from {}",
        catalog.len(),
        config.data.champions.display()
    );

    let tables = load_pair_tables(&config.data.pair_stats)?;
    if tables.is_empty() {
        warn!("pair table is empty; synergy and counter hints are disabled");
    } else {
        info!("Loaded {} pair statistics", tables.len());
    }

    let priors = load_priors(&config.data.priors)?;
    info!("Loaded priors for {} champions", priors.len());

    let oracle = PriorOracle::new(&catalog, &priors, tables.clone());
    Ok(RecommendationEngine::from_config(
        config,
        Arc::new(catalog),
        Arc::new(tables),
        Arc::new(oracle),
    ))
}

/// Read a draft description (teams plus per-side picks and bans) from JSON.
pub fn read_draft(path: &Path) -> Result<DraftParts, DataError> {
    let text = std::fs::read_to_string(path).map_err(|source| DataError::Io {
        path: path.display().to_string(),
        source,
    })?;
    serde_json::from_str(&text).map_err(|source| DataError::Json {
        path: path.display().to_string(),
        source,
    })
}
