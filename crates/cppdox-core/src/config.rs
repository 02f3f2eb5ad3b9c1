//! Indexer configuration.
//!
//! Read-only after the executor starts; loads/saves as TOML.

use crate::CppdoxError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Options recognized by the indexing core.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Path to the compile_commands.json compilation database.
    pub compile_commands_json: PathBuf,
    /// Project root. Declaring files are stored relative to this directory
    /// and ignore-path matching happens on the relative form.
    pub root_dir: PathBuf,
    /// Extra include directories, passed to the front-end as system includes.
    /// Non-existent entries are warned about and skipped at executor start.
    pub include_paths: Vec<PathBuf>,
    /// Literal, case-sensitive substrings of repo-relative paths whose
    /// declarations are excluded from the index.
    pub ignore_paths: Vec<String>,
    /// Literal, case-sensitive substrings of namespace names whose contents
    /// are excluded from the index.
    pub ignore_namespaces: Vec<String>,
    /// Drop private members entirely.
    pub ignore_private_members: bool,
    /// Debug cap: index only the first N entries of the compile database,
    /// in the database's listing order.
    pub debug_limit_num_indexed_files: Option<usize>,
}

impl Config {
    /// Load configuration from the given path.
    pub fn load(path: &Path) -> Result<Self, CppdoxError> {
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| CppdoxError::Config(e.to_string()))
    }

    /// Save configuration to the given path.
    pub fn save(&self, path: &Path) -> Result<(), CppdoxError> {
        let content =
            toml::to_string_pretty(self).map_err(|e| CppdoxError::Config(e.to_string()))?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Load from `path`, or return defaults if the file doesn't exist.
    pub fn load_or_default(path: &Path) -> Self {
        if path.exists() {
            Self::load(path).unwrap_or_default()
        } else {
            Self::default()
        }
    }
}
