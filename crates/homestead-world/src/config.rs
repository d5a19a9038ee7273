//! Streaming configuration.

use homestead_common::ConfigError;
use serde::{Deserialize, Serialize};

/// How many chunks stay resident around the observer.
///
/// ```toml
/// load_radius = 3
/// unload_radius = 5
/// max_loaded_chunks = 100
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StreamingConfig {
    /// Chebyshev radius (in chunks) loaded around the observer
    pub load_radius: u32,
    /// Chunks farther than this are evicted
    pub unload_radius: u32,
    /// Upper bound on resident chunks
    pub max_loaded_chunks: usize,
}

impl Default for StreamingConfig {
    fn default() -> Self {
        Self {
            load_radius: 3,
            unload_radius: 5,
            max_loaded_chunks: 100,
        }
    }
}

impl StreamingConfig {
    /// Number of chunks in the square around the observer.
    #[must_use]
    pub const fn load_area(&self) -> usize {
        let side = 2 * self.load_radius as usize + 1;
        side * side
    }

    /// Rejects settings that would thrash or never evict.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.unload_radius < self.load_radius {
            return Err(ConfigError::UnloadRadiusTooSmall {
                load: self.load_radius,
                unload: self.unload_radius,
            });
        }
        if self.max_loaded_chunks == 0 {
            return Err(ConfigError::ZeroChunkBudget);
        }
        if self.max_loaded_chunks < self.load_area() {
            return Err(ConfigError::BudgetBelowLoadArea {
                max: self.max_loaded_chunks,
                required: self.load_area(),
            });
        }
        Ok(())
    }

    /// Parses and validates a TOML document; missing keys take defaults.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }
}
