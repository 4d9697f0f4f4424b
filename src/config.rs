use crate::extract::aliases::{AliasTable, Field};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

pub const CONFIGS_PATH_ENV: &str = "CONFIGS_PATH";
pub const CONFIG_FILE_NAME: &str = "analyzer.json";
const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalyzerConfig {
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,
    /// Extra local names per field, tried after the built-in aliases.
    #[serde(default)]
    pub extra_aliases: BTreeMap<Field, Vec<String>>,
}

fn default_bind_addr() -> String {
    DEFAULT_BIND_ADDR.to_string()
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
            extra_aliases: BTreeMap::new(),
        }
    }
}

impl AnalyzerConfig {
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, String> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .map_err(|e| format!("Failed to read {}: {e}", path.display()))?;
        serde_json::from_str(&content)
            .map_err(|e| format!("Failed to parse {}: {e}", path.display()))
    }

    /// Reads `analyzer.json` from `$CONFIGS_PATH`. Defaults apply when the
    /// variable is unset or the file does not exist.
    pub fn load_default() -> Result<Self, String> {
        let Some(dir) = std::env::var_os(CONFIGS_PATH_ENV) else {
            return Ok(Self::default());
        };
        let path = PathBuf::from(dir).join(CONFIG_FILE_NAME);
        if !path.exists() {
            tracing::debug!("[Analyzer] No {} found, using defaults", path.display());
            return Ok(Self::default());
        }
        Self::load_from_file(path)
    }

    pub fn alias_table(&self) -> AliasTable {
        AliasTable::with_extra(&self.extra_aliases)
    }
}
