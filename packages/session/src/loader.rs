//! Loading the topology and metrics datasets.
//!
//! Both files are read and decoded concurrently; the load succeeds only if
//! both do. A session is never built from one dataset alone.

use std::path::{Path, PathBuf};

use serde::Deserialize as _;
use vaxmap_metrics_models::{MetricRecord, RegionGeometry, RegionId};

/// Name of the `TopoJSON` object holding country geometries.
const COUNTRIES_OBJECT: &str = "countries";

/// Errors that can occur while loading the datasets.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    /// A dataset file could not be read.
    #[error("Failed to read {}: {source}", path.display())]
    Io {
        /// Dataset path.
        path: PathBuf,
        /// Underlying error.
        source: std::io::Error,
    },

    /// A dataset file is not valid JSON of the expected shape.
    #[error("Failed to parse {}: {source}", path.display())]
    Json {
        /// Dataset path.
        path: PathBuf,
        /// Underlying error.
        source: serde_json::Error,
    },

    /// The topology document has no usable geometry collection.
    #[error("Invalid topology: {message}")]
    Topology {
        /// Description of what went wrong.
        message: String,
    },
}

/// Both input datasets, decoded.
#[derive(Debug, Clone, Default)]
pub struct Datasets {
    /// Region geometries, before exclusion.
    pub regions: Vec<RegionGeometry>,
    /// Flat metric records in source order.
    pub records: Vec<MetricRecord>,
}

/// Loads both datasets concurrently.
///
/// # Errors
///
/// Returns the first [`LoadError`] from either dataset.
pub async fn load_datasets(topology: &Path, records: &Path) -> Result<Datasets, LoadError> {
    log::info!(
        "Loading topology from {} and records from {}",
        topology.display(),
        records.display()
    );

    let (regions, records) = tokio::try_join!(load_topology(topology), load_records(records))?;

    log::info!(
        "Loaded {} regions and {} metric records",
        regions.len(),
        records.len()
    );

    Ok(Datasets { regions, records })
}

/// Loads and decodes the topology file.
///
/// # Errors
///
/// Returns [`LoadError`] if the file cannot be read or decoded.
pub async fn load_topology(path: &Path) -> Result<Vec<RegionGeometry>, LoadError> {
    let bytes = read(path).await?;
    let document: serde_json::Value =
        serde_json::from_slice(&bytes).map_err(|source| LoadError::Json {
            path: path.to_path_buf(),
            source,
        })?;
    decode_topology(&document)
}

/// Loads and decodes the metrics file.
///
/// # Errors
///
/// Returns [`LoadError`] if the file cannot be read or decoded.
pub async fn load_records(path: &Path) -> Result<Vec<MetricRecord>, LoadError> {
    let bytes = read(path).await?;
    serde_json::from_slice(&bytes).map_err(|source| LoadError::Json {
        path: path.to_path_buf(),
        source,
    })
}

async fn read(path: &Path) -> Result<Vec<u8>, LoadError> {
    tokio::fs::read(path).await.map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Extracts region geometries from a topology document.
///
/// Accepts a `TopoJSON` topology (geometries under `objects.countries`) or
/// a plain array of `{ "id", "shape" }` objects. Geometries without a
/// numeric id are skipped.
///
/// # Errors
///
/// Returns [`LoadError::Topology`] if neither shape matches.
pub fn decode_topology(document: &serde_json::Value) -> Result<Vec<RegionGeometry>, LoadError> {
    if let Some(entries) = document.as_array() {
        return Ok(entries
            .iter()
            .filter_map(|entry| {
                let id = region_id(entry)?;
                let shape = entry.get("shape").cloned().unwrap_or_default();
                Some(RegionGeometry { id, shape })
            })
            .collect());
    }

    let geometries = document
        .get("objects")
        .and_then(|objects| objects.get(COUNTRIES_OBJECT))
        .and_then(|countries| countries.get("geometries"))
        .and_then(serde_json::Value::as_array)
        .ok_or_else(|| LoadError::Topology {
            message: format!("missing objects.{COUNTRIES_OBJECT}.geometries"),
        })?;

    Ok(geometries
        .iter()
        .filter_map(|geometry| {
            let id = region_id(geometry)?;
            Some(RegionGeometry {
                id,
                shape: geometry.clone(),
            })
        })
        .collect())
}

fn region_id(entry: &serde_json::Value) -> Option<RegionId> {
    let raw = entry.get("id")?;
    match RegionId::deserialize(raw) {
        Ok(id) => Some(id),
        Err(e) => {
            log::warn!("Skipping geometry with unusable id {raw}: {e}");
            None
        }
    }
}

/// Drops every region whose id is in `excluded`.
#[must_use]
pub fn exclude_regions(regions: Vec<RegionGeometry>, excluded: &[RegionId]) -> Vec<RegionGeometry> {
    let before = regions.len();
    let kept: Vec<RegionGeometry> = regions
        .into_iter()
        .filter(|region| !excluded.contains(&region.id))
        .collect();
    log::debug!("Excluded {} of {before} regions", before - kept.len());
    kept
}
