use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::CompressorError;

// ── Defaults ────────────────────────────────────────────────────────────────

pub const DEFAULT_MODEL_NAME: &str = "BAAI/bge-reranker-v2-m3";
pub const DEFAULT_TOP_N: usize = 3;

pub fn get_default_cache_dir() -> PathBuf {
    std::env::temp_dir()
}

// ── CompressorConfig ────────────────────────────────────────────────────────

/// User-supplied configuration. Every key is optional; unknown keys are rejected.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CompressorConfig {
    pub model: Option<String>,
    pub cache_dir: Option<PathBuf>,
    pub top_n: Option<usize>,
}

impl CompressorConfig {
    pub fn from_toml_str(content: &str) -> Result<Self, CompressorError> {
        Ok(toml::from_str(content)?)
    }

    pub fn from_json_str(content: &str) -> Result<Self, CompressorError> {
        Ok(serde_json::from_str(content)?)
    }

    pub fn from_json_value(value: serde_json::Value) -> Result<Self, CompressorError> {
        Ok(serde_json::from_value(value)?)
    }

    /// Load a config file. `.json` files are parsed as JSON, anything else as TOML.
    pub fn load(path: &Path) -> Result<Self, CompressorError> {
        let content = std::fs::read_to_string(path)?;
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => Self::from_json_str(&content),
            _ => Self::from_toml_str(&content),
        }
    }

    /// Fill unset keys with defaults.
    pub fn into_settings(self) -> Settings {
        Settings {
            model: self
                .model
                .unwrap_or_else(|| DEFAULT_MODEL_NAME.to_string()),
            cache_dir: self.cache_dir.unwrap_or_else(get_default_cache_dir),
            top_n: self.top_n.unwrap_or(DEFAULT_TOP_N),
        }
    }
}

// ── Settings ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub model: String,
    pub cache_dir: PathBuf,
    pub top_n: usize,
}

impl Default for Settings {
    fn default() -> Self {
        CompressorConfig::default().into_settings()
    }
}

impl Settings {
    pub fn with_top_n(mut self, top_n: usize) -> Self {
        self.top_n = top_n;
        self
    }
}
