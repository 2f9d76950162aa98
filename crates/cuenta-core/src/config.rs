//! Engine configuration
//!
//! Everything a caller may vary about categorization lives here: placeholder
//! sentinels, structural transaction types, the stopword set, token and amount
//! bin parameters, and the explicit rule table.
//!
//! ## Configuration Resolution
//!
//! Config is loaded with a three-layer resolution:
//! 1. An explicit path passed by the caller (must exist)
//! 2. An override in the data dir (~/.local/share/cuenta/config/engine.toml)
//! 3. Embedded defaults (compiled into binary)
//!
//! Sections missing from an override file keep their embedded values.

use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Error, Result};
use crate::models::PatternType;

/// Embedded default config (compiled into binary)
const DEFAULT_CONFIG: &str = include_str!("../../../config/engine.toml");

/// Sentinel values meaning "not yet assigned"
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Placeholders {
    pub category: String,
    pub subcategory: String,
}

impl Default for Placeholders {
    fn default() -> Self {
        Self {
            category: "SIN CATEGORÍA".to_string(),
            subcategory: "SIN SUBCATEGORÍA".to_string(),
        }
    }
}

/// A transaction type whose category is fixed by convention
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StructuralType {
    #[serde(rename = "type")]
    pub kind: String,
    pub category: String,
    pub subcategory: String,
}

/// One entry of the explicit rule table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleConfig {
    pub pattern: String,
    #[serde(default)]
    pub pattern_type: PatternType,
    pub category: String,
    pub subcategory: String,
    /// Rule only applies when the row's current subcategory contains this text
    #[serde(default)]
    pub subcategory_guard: Option<String>,
}

/// Engine configuration
#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    pub placeholders: Placeholders,
    /// Structural types, excluded from learning and tagged by the pre-pass
    pub structural: Vec<StructuralType>,
    /// Lower-cased tokens never used for learning or lookup
    pub stopwords: BTreeSet<String>,
    /// Tokens shorter than this (in characters) are dropped
    pub min_token_len: usize,
    /// Width of the amount bins used as a coarse amount fingerprint
    pub amount_bin_width: u32,
    /// Subcategory used for a merchant default when its category has none
    pub default_subcategory: String,
    /// Ordered explicit rules; the first match wins
    pub rules: Vec<RuleConfig>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            placeholders: Placeholders::default(),
            structural: Vec::new(),
            stopwords: BTreeSet::new(),
            min_token_len: 4,
            amount_bin_width: 10,
            default_subcategory: "GENERAL".to_string(),
            rules: Vec::new(),
        }
    }
}

impl EngineConfig {
    /// Configuration from the embedded defaults only
    pub fn embedded() -> Result<Self> {
        parse_config(DEFAULT_CONFIG)
    }

    /// Load configuration (explicit path, then data dir override, then embedded)
    pub fn load(path: Option<&Path>) -> Result<Self> {
        load_config(path)
    }

    /// Parse a configuration from TOML text, overlaying the embedded defaults
    pub fn from_toml(content: &str) -> Result<Self> {
        let mut config = parse_config(DEFAULT_CONFIG)?;
        apply_raw(&mut config, parse_raw(content)?);
        config.validate()?;
        Ok(config)
    }

    /// Check value constraints
    pub fn validate(&self) -> Result<()> {
        if self.placeholders.category.trim().is_empty()
            || self.placeholders.subcategory.trim().is_empty()
        {
            return Err(Error::Config("placeholders must not be empty".into()));
        }
        if self.amount_bin_width == 0 {
            return Err(Error::Config("amount_bin_width must be greater than 0".into()));
        }
        if self.min_token_len == 0 {
            return Err(Error::Config("min_token_len must be at least 1".into()));
        }
        for st in &self.structural {
            if st.kind.trim().is_empty() {
                return Err(Error::Config("structural type must not be empty".into()));
            }
        }
        for rule in &self.rules {
            if rule.pattern.is_empty() {
                return Err(Error::Config(format!(
                    "rule for '{}' has an empty pattern",
                    rule.category
                )));
            }
        }
        Ok(())
    }

    pub fn is_placeholder_category(&self, category: &str) -> bool {
        category == self.placeholders.category
    }

    pub fn is_placeholder_subcategory(&self, subcategory: &str) -> bool {
        subcategory == self.placeholders.subcategory
    }

    /// Fixed assignment for a structural type (trimmed, case-insensitive)
    pub fn structural_for(&self, kind: &str) -> Option<&StructuralType> {
        let kind = kind.trim().to_lowercase();
        if kind.is_empty() {
            return None;
        }
        self.structural
            .iter()
            .find(|st| st.kind.trim().to_lowercase() == kind)
    }

    pub fn is_structural(&self, kind: &str) -> bool {
        self.structural_for(kind).is_some()
    }
}

/// Default config override path
pub fn default_config_path() -> Option<PathBuf> {
    dirs::data_local_dir().map(|d| d.join("cuenta").join("config").join("engine.toml"))
}

fn load_config(explicit: Option<&Path>) -> Result<EngineConfig> {
    let override_content = if let Some(path) = explicit {
        let content = fs::read_to_string(path).map_err(|e| {
            Error::Config(format!("Failed to read config {}: {}", path.display(), e))
        })?;
        Some(content)
    } else if let Some(default_path) = default_config_path() {
        if default_path.exists() {
            debug!("Loading config override from {}", default_path.display());
            Some(fs::read_to_string(&default_path).map_err(|e| {
                Error::Config(format!("Failed to read config: {}", e))
            })?)
        } else {
            None
        }
    } else {
        None
    };

    match override_content {
        Some(content) => EngineConfig::from_toml(&content),
        None => EngineConfig::embedded(),
    }
}

/// Raw config structure for TOML parsing
#[derive(Debug, Deserialize)]
struct RawConfig {
    placeholders: Option<RawPlaceholders>,
    learning: Option<RawLearning>,
    structural: Option<Vec<StructuralType>>,
    rules: Option<Vec<RuleConfig>>,
}

#[derive(Debug, Deserialize)]
struct RawPlaceholders {
    category: Option<String>,
    subcategory: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawLearning {
    min_token_len: Option<usize>,
    amount_bin_width: Option<u32>,
    default_subcategory: Option<String>,
    /// Replaces the stopword set
    stopwords: Option<Vec<String>>,
    /// Added to the stopword set
    extra_stopwords: Option<Vec<String>>,
}

fn parse_raw(content: &str) -> Result<RawConfig> {
    toml::from_str(content).map_err(|e| Error::Config(format!("Invalid config TOML: {}", e)))
}

/// Parse config from TOML content on top of the hardcoded defaults
fn parse_config(content: &str) -> Result<EngineConfig> {
    let mut config = EngineConfig::default();
    apply_raw(&mut config, parse_raw(content)?);
    config.validate()?;
    Ok(config)
}

fn apply_raw(config: &mut EngineConfig, raw: RawConfig) {
    if let Some(placeholders) = raw.placeholders {
        if let Some(category) = placeholders.category {
            config.placeholders.category = category;
        }
        if let Some(subcategory) = placeholders.subcategory {
            config.placeholders.subcategory = subcategory;
        }
    }

    if let Some(learning) = raw.learning {
        if let Some(len) = learning.min_token_len {
            config.min_token_len = len;
        }
        if let Some(width) = learning.amount_bin_width {
            config.amount_bin_width = width;
        }
        if let Some(sub) = learning.default_subcategory {
            config.default_subcategory = sub;
        }
        if let Some(words) = learning.stopwords {
            config.stopwords = words.iter().map(|w| w.trim().to_lowercase()).collect();
        }
        if let Some(words) = learning.extra_stopwords {
            config
                .stopwords
                .extend(words.iter().map(|w| w.trim().to_lowercase()));
        }
    }

    if let Some(structural) = raw.structural {
        config.structural = structural;
    }

    if let Some(rules) = raw.rules {
        config.rules = rules;
    }
}
