use crate::error::{BrandboardError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Runtime configuration for the board model
///
/// Loaded from `config.toml` in the store directory. Every section is
/// optional in the file and falls back to its defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BoardsConfig {
    pub limits: LimitsConfig,
    pub boards: BoardDefaults,
}

/// Display-driven caps on sibling groups
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LimitsConfig {
    pub max_slots_per_board: usize,
    pub max_items_per_slot: usize,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_slots_per_board: 50,
            max_items_per_slot: 500,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BoardDefaults {
    /// Seed a new board with the default slots of its kind
    pub seed_default_slots: bool,
}

impl Default for BoardDefaults {
    fn default() -> Self {
        Self {
            seed_default_slots: true,
        }
    }
}

impl BoardsConfig {
    /// Parses and validates a TOML document
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads a config file, falling back to defaults when it is absent
    pub async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            tracing::debug!(path = %path.display(), "no config file, using defaults");
            return Ok(Self::default());
        }
        let content = tokio::fs::read_to_string(path).await?;
        Self::from_toml_str(&content)
    }

    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| BrandboardError::ConfigError(e.to_string()))
    }

    fn validate(&self) -> Result<()> {
        if self.limits.max_slots_per_board == 0 {
            return Err(BrandboardError::ConfigError(
                "limits.max_slots_per_board must be at least 1".to_string(),
            ));
        }
        if self.limits.max_items_per_slot == 0 {
            return Err(BrandboardError::ConfigError(
                "limits.max_items_per_slot must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}
