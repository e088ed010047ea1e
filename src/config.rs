//! # Config Module
//!
//! Tunables of the mesh-build workers, loaded from JSON. Every field has a
//! default, so an empty object (or no file at all) yields the stock setup.

use std::{fs, io, path::Path};

use log::debug;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::engine_state::rendering::meshing::{
    IndexType, DEFAULT_GROWTH_SLACK, DEFAULT_OCCLUSION_CACHE_CAPACITY,
};

/// Errors raised while loading a [`MeshingConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The config file could not be read.
    #[error("failed to read meshing config: {0}")]
    Io(#[from] io::Error),
    /// The config file is not valid JSON for [`MeshingConfig`].
    #[error("failed to parse meshing config: {0}")]
    Parse(#[from] serde_json::Error),
    /// A field holds a value the mesher cannot work with.
    #[error("invalid meshing config: {0}")]
    Invalid(&'static str),
}

/// Settings shared by all mesh-build workers.
///
/// # Examples
///
/// ```
/// use voxel_mesh_core::{IndexType, MeshingConfig};
///
/// let config = MeshingConfig::from_json(r#"{ "index_type": "integer" }"#).unwrap();
/// assert_eq!(config.index_type, IndexType::Integer);
/// assert_eq!(config.occlusion_cache_capacity, 512);
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MeshingConfig {
    /// Number of shape comparisons each worker memoizes.
    pub occlusion_cache_capacity: usize,
    /// Width of the shared quad index buffer.
    pub index_type: IndexType,
    /// Extra quads reserved whenever the index buffer grows.
    pub index_growth_slack: usize,
}

impl Default for MeshingConfig {
    fn default() -> Self {
        Self {
            occlusion_cache_capacity: DEFAULT_OCCLUSION_CACHE_CAPACITY,
            index_type: IndexType::Short,
            index_growth_slack: DEFAULT_GROWTH_SLACK,
        }
    }
}

impl MeshingConfig {
    /// Parses and validates a config from JSON.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: MeshingConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let config = Self::from_json(&fs::read_to_string(path)?)?;

        debug!("Loaded meshing config from {}: {:?}", path.display(), config);
        Ok(config)
    }

    /// Serializes the config as pretty-printed JSON.
    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Checks that every field is usable.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.occlusion_cache_capacity == 0 {
            return Err(ConfigError::Invalid("occlusion_cache_capacity must be at least 1"));
        }

        if self.index_growth_slack > self.index_type.max_primitive_count() {
            return Err(ConfigError::Invalid(
                "index_growth_slack exceeds the quads the index type can address",
            ));
        }

        Ok(())
    }
}
