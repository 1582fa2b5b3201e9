//! Configuration system for planforge.
//!
//! Load simplifier configuration from TOML or YAML files to control
//! abstraction, composition and refinement without code changes.
//!
//! # Examples
//!
//! Load configuration from TOML string:
//!
//! ```
//! use planforge_config::SimplifierConfig;
//!
//! let config = SimplifierConfig::from_toml_str(r#"
//!     max_layers = 8
//!
//!     [composition]
//!     max_chain_length = 3
//!     require_causal_decoupling = true
//! "#).unwrap();
//!
//! assert_eq!(config.max_layers, 8);
//! assert_eq!(config.composition.max_chain_length, 3);
//! assert!(config.abstraction.enabled);
//! ```
//!
//! Use default config when file is missing:
//!
//! ```
//! use planforge_config::SimplifierConfig;
//!
//! let config = SimplifierConfig::load("planforge.toml").unwrap_or_default();
//! // Proceeds with defaults if file doesn't exist
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default bound on simplification layers.
pub const DEFAULT_MAX_LAYERS: usize = 32;

/// Default bound on operators per composite chain.
pub const DEFAULT_MAX_CHAIN_LENGTH: usize = 4;

/// Configuration error
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Main simplifier configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct SimplifierConfig {
    /// Upper bound on abstraction/composition layers.
    #[serde(default = "default_max_layers")]
    pub max_layers: usize,

    /// Safe abstraction settings.
    #[serde(default)]
    pub abstraction: AbstractionConfig,

    /// Operator composition settings.
    #[serde(default)]
    pub composition: CompositionConfig,

    /// Plan refinement settings.
    #[serde(default)]
    pub refinement: RefinementConfig,
}

fn default_max_layers() -> usize {
    DEFAULT_MAX_LAYERS
}

fn default_max_chain_length() -> usize {
    DEFAULT_MAX_CHAIN_LENGTH
}

fn default_true() -> bool {
    true
}

impl Default for SimplifierConfig {
    fn default() -> Self {
        Self {
            max_layers: DEFAULT_MAX_LAYERS,
            abstraction: AbstractionConfig::default(),
            composition: CompositionConfig::default(),
            refinement: RefinementConfig::default(),
        }
    }
}

impl SimplifierConfig {
    /// Creates a new default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns error if file doesn't exist or contains invalid TOML.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        Self::from_toml_file(path)
    }

    /// Loads configuration from a TOML file.
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    /// Parses configuration from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    /// Loads configuration from a YAML file.
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&contents)
    }

    /// Parses configuration from a YAML string.
    pub fn from_yaml_str(s: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yaml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    /// Rejects settings no run can use.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_layers == 0 {
            return Err(ConfigError::Invalid("max_layers must be at least 1".into()));
        }
        if self.composition.max_chain_length < 2 {
            return Err(ConfigError::Invalid(format!(
                "max_chain_length must be at least 2, got {}",
                self.composition.max_chain_length
            )));
        }
        Ok(())
    }

    /// Sets the layer bound.
    pub fn with_max_layers(mut self, max_layers: usize) -> Self {
        self.max_layers = max_layers;
        self
    }

    /// Enables or disables safe abstraction.
    pub fn with_abstraction(mut self, enabled: bool) -> Self {
        self.abstraction.enabled = enabled;
        self
    }

    /// Replaces the composition settings.
    pub fn with_composition(mut self, composition: CompositionConfig) -> Self {
        self.composition = composition;
        self
    }

    /// Disables operator composition.
    pub fn without_composition(mut self) -> Self {
        self.composition.enabled = false;
        self
    }

    /// Enables or disables verification of refined plans.
    pub fn with_plan_verification(mut self, verify: bool) -> Self {
        self.refinement.verify_plan = verify;
        self
    }
}

/// Safe abstraction configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct AbstractionConfig {
    /// Whether safe variables are abstracted away.
    #[serde(default = "default_true")]
    pub enabled: bool,
}

impl Default for AbstractionConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

/// Operator composition configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct CompositionConfig {
    /// Whether operator chains are composed.
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Maximum number of original operators in one composite.
    #[serde(default = "default_max_chain_length")]
    pub max_chain_length: usize,

    /// Harsh mode: accept a batch of composites only if it decouples
    /// the variable pair it was generated for.
    #[serde(default)]
    pub require_causal_decoupling: bool,
}

impl Default for CompositionConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            max_chain_length: DEFAULT_MAX_CHAIN_LENGTH,
            require_causal_decoupling: false,
        }
    }
}

impl CompositionConfig {
    /// Creates an enabled configuration with the given chain bound.
    pub fn with_max_chain_length(max_chain_length: usize) -> Self {
        Self {
            max_chain_length,
            ..Self::default()
        }
    }

    /// Switches harsh mode on.
    pub fn harsh(mut self) -> Self {
        self.require_causal_decoupling = true;
        self
    }
}

/// Plan refinement configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct RefinementConfig {
    /// Re-check the refined plan against the original task.
    #[serde(default = "default_true")]
    pub verify_plan: bool,
}

impl Default for RefinementConfig {
    fn default() -> Self {
        Self { verify_plan: true }
    }
}
