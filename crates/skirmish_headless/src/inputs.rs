//! Match input loading.
//!
//! Balance tables are RON; obstacle layouts come from an external map
//! generator and may be RON or JSON, picked by file extension.

use std::fs;
use std::path::Path;

use skirmish_core::data::BalanceConfig;
use skirmish_core::obstacles::Obstacle;

use crate::error::{HeadlessError, Result};

/// Load a balance file, or the embedded defaults when `path` is `None`.
pub fn load_balance(path: Option<&Path>) -> Result<BalanceConfig> {
    let Some(path) = path else {
        return Ok(BalanceConfig::default());
    };
    let config = BalanceConfig::load(path)?;
    tracing::info!("Loaded balance from {:?}", path);
    Ok(config)
}

/// Load an obstacle list, or an open field when `path` is `None`.
pub fn load_obstacles(path: Option<&Path>) -> Result<Vec<Obstacle>> {
    let Some(path) = path else {
        return Ok(Vec::new());
    };
    let content = fs::read_to_string(path).map_err(|e| HeadlessError::io(path, e))?;
    let obstacles = parse_obstacles(path, &content)?;
    tracing::info!("Loaded {} obstacles from {:?}", obstacles.len(), path);
    Ok(obstacles)
}

fn parse_obstacles(path: &Path, content: &str) -> Result<Vec<Obstacle>> {
    match path.extension().and_then(|ext| ext.to_str()) {
        Some("ron") => ron::from_str(content).map_err(|source| HeadlessError::Ron {
            path: path.to_path_buf(),
            source,
        }),
        Some("json") => serde_json::from_str(content).map_err(|e| HeadlessError::json(path, e)),
        _ => Err(HeadlessError::UnsupportedFormat(path.to_path_buf())),
    }
}
