//! Analysis configuration.
//!
//! Every field has a default, so an empty JSON object (or no config file at
//! all) gives the standard thresholds.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};

use crate::lookup::FingerprintEntry;
use crate::tree::DEFAULT_SEPARATOR;

/// Current configuration format version.
pub const CONFIG_VERSION: &str = "0.1.0";

/// Confidence required before a candidate name is compared against the rules.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatcherThresholds {
    pub min_match_count: u64,
    pub min_match_ratio: f64,
}

impl Default for MatcherThresholds {
    fn default() -> Self {
        Self { min_match_count: 8, min_match_ratio: 0.3 }
    }
}

impl MatcherThresholds {
    /// True when the entry is trustworthy enough to match against rules.
    ///
    /// Callers must have rejected zero-population entries already.
    pub fn is_confident(&self, entry: &FingerprintEntry, ratio: f64) -> bool {
        entry.match_count >= self.min_match_count && ratio >= self.min_match_ratio
    }
}

/// Popularity required before an unlabelled namespace is reported.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UntaggedThresholds {
    pub min_match_count: u64,
    pub min_match_ratio: f64,
    pub min_weight: u64,
    pub min_global_count: u64,
}

impl Default for UntaggedThresholds {
    fn default() -> Self {
        Self { min_match_count: 100, min_match_ratio: 0.5, min_weight: 50, min_global_count: 20 }
    }
}

impl UntaggedThresholds {
    pub fn is_popular(&self, entry: &FingerprintEntry, ratio: f64, weight: u64) -> bool {
        entry.match_count >= self.min_match_count
            && ratio >= self.min_match_ratio
            && weight >= self.min_weight
            && entry.global_count >= self.min_global_count
    }
}

/// Serializable configuration for one analysis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Schema/config version. This is about the config format, not the fingerprint data.
    pub config_version: String,
    /// Namespace path separator.
    pub separator: char,
    pub matcher: MatcherThresholds,
    pub untagged: UntaggedThresholds,
    /// Rule table path; relative paths resolve against the config file's directory.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rules: Option<PathBuf>,
    /// Fingerprint database path; relative paths resolve against the config file's directory.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fingerprint_db: Option<PathBuf>,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            config_version: CONFIG_VERSION.to_string(),
            separator: DEFAULT_SEPARATOR,
            matcher: MatcherThresholds::default(),
            untagged: UntaggedThresholds::default(),
            rules: None,
            fingerprint_db: None,
        }
    }
}

impl AnalysisConfig {
    /// Reject values that would make every namespace match or none.
    pub fn validate(&self) -> Result<()> {
        if self.separator.is_whitespace() {
            return Err(anyhow!("Invalid separator {:?}: must not be whitespace", self.separator));
        }
        for (name, ratio) in [
            ("matcher.min_match_ratio", self.matcher.min_match_ratio),
            ("untagged.min_match_ratio", self.untagged.min_match_ratio),
        ] {
            if !ratio.is_finite() || ratio < 0.0 {
                return Err(anyhow!("Invalid {name} {ratio}: must be a non-negative number"));
            }
        }
        Ok(())
    }

    fn resolve_paths(&mut self, base: &Path) {
        for path in [&mut self.rules, &mut self.fingerprint_db].into_iter().flatten() {
            if path.is_relative() {
                *path = base.join(&*path);
            }
        }
    }
}

/// Load a configuration file (JSON, or YAML for `.yaml`/`.yml`).
pub fn load_config(path: &Path) -> Result<AnalysisConfig> {
    let body = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config at {}", path.display()))?;
    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or_default();
    let mut config: AnalysisConfig = if matches!(ext, "yaml" | "yml") {
        serde_yaml::from_str(&body).context("Failed to parse config YAML")?
    } else {
        serde_json::from_str(&body).context("Failed to parse config JSON")?
    };
    config.validate()?;
    if let Some(base) = path.parent() {
        config.resolve_paths(base);
    }
    Ok(config)
}
