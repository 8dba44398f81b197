// ⚙️ Resolver Configuration
// Where to search, how many name hits to ask for, how range codes look.
//
// Sources, lowest to highest precedence: defaults → JSON file → environment.

use crate::employment::DEFAULT_CODE_PREFIX;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Public distribution endpoint of the registry
pub const DEFAULT_LIVE_ENDPOINT: &str = "http://distribution.virk.dk/cvr-permanent/_search";

/// Result cap for free-text name searches
pub const DEFAULT_NAME_SEARCH_SIZE: u32 = 50;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolverConfig {
    /// Preferred search endpoint (tried first when set)
    pub endpoint: Option<String>,

    /// Fallback endpoint (tried when the preferred one yields nothing)
    pub live_endpoint: Option<String>,

    pub name_search_size: u32,

    /// Prefix of employment interval codes ("<prefix>_<from>_<to>")
    pub employment_code_prefix: String,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        ResolverConfig {
            endpoint: None,
            live_endpoint: Some(DEFAULT_LIVE_ENDPOINT.to_string()),
            name_search_size: DEFAULT_NAME_SEARCH_SIZE,
            employment_code_prefix: DEFAULT_CODE_PREFIX.to_string(),
        }
    }
}

impl ResolverConfig {
    /// Load config from a JSON file (missing keys keep their defaults)
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {:?}", path.as_ref()))?;

        let config: ResolverConfig =
            serde_json::from_str(&content).context("Failed to parse config JSON")?;

        Ok(config)
    }

    /// Defaults overlaid with CVR_* environment variables
    pub fn from_env() -> Result<Self> {
        ResolverConfig::default().with_overrides(|key| std::env::var(key).ok())
    }

    /// Apply overrides from a key → value lookup (environment in production)
    pub fn with_overrides<F>(mut self, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(endpoint) = lookup("CVR_ENDPOINT") {
            self.endpoint = Some(endpoint);
        }
        if let Some(endpoint) = lookup("CVR_LIVE_ENDPOINT") {
            self.live_endpoint = Some(endpoint);
        }
        if let Some(size) = lookup("CVR_NAME_SEARCH_SIZE") {
            self.name_search_size = size
                .trim()
                .parse()
                .with_context(|| format!("CVR_NAME_SEARCH_SIZE is not a number: {:?}", size))?;
        }
        if let Some(prefix) = lookup("CVR_EMPLOYMENT_CODE_PREFIX") {
            self.employment_code_prefix = prefix;
        }
        Ok(self)
    }

    /// Endpoints in the order they should be tried; blank entries are skipped
    pub fn endpoints(&self) -> Vec<&str> {
        [self.endpoint.as_deref(), self.live_endpoint.as_deref()]
            .into_iter()
            .flatten()
            .map(str::trim)
            .filter(|e| !e.is_empty())
            .collect()
    }
}

// ============================================================================
// TESTS
// ============================================================================
