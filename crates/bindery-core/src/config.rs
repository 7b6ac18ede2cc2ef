//! Runtime configuration, loadable from JSON.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Environment variable that prepends an asset search root.
pub const ASSET_ROOT_ENV: &str = "BINDERY_ASSET_ROOT";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    /// Directories searched, in order, for relative asset paths.
    pub asset_roots: Vec<PathBuf>,
    /// Family used by `Font(height)` when no name is given.
    pub default_font: String,
    /// Upper bound on script operations; unlimited when unset.
    pub max_operations: Option<u64>,
    /// Upper bound on script call depth.
    pub max_call_depth: Option<usize>,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            asset_roots: vec![PathBuf::from("assets")],
            default_font: "Sans Serif".to_string(),
            max_operations: None,
            max_call_depth: None,
        }
    }
}

impl RuntimeConfig {
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).context("invalid runtime config")
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        Self::from_json(&json)
    }

    /// Applies `BINDERY_ASSET_ROOT` if it is set.
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(root) = std::env::var(ASSET_ROOT_ENV) {
            if !root.is_empty() {
                self.asset_roots.insert(0, PathBuf::from(root));
            }
        }
        self
    }
}
