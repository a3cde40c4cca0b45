// Thu Oct 15 2026 - Alex

use crate::discovery::ScanOptions;
use crate::object::ReadMode;
use crate::orchestrator::DEFAULT_MAX_CHUNK_SIZE;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("config file not found: {0}")]
    NotFound(PathBuf),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("parse error: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("unsupported config format: {0}")]
    UnsupportedFormat(String),
    #[error("invalid config: {0}")]
    Validation(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub find_all: bool,
    pub concurrency: usize,
    pub max_chunk_size: usize,
    pub read_mode: ReadMode,
    pub name_pattern: String,
    pub follow_symlinks: bool,
}

impl Default for Config {
    fn default() -> Self {
        let scan = ScanOptions::default();
        Self {
            find_all: false,
            concurrency: 1,
            max_chunk_size: DEFAULT_MAX_CHUNK_SIZE,
            read_mode: ReadMode::Buffered,
            name_pattern: scan.name_pattern,
            follow_symlinks: scan.follow_symlinks,
        }
    }
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_find_all(mut self, find_all: bool) -> Self {
        self.find_all = find_all;
        self
    }

    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency;
        self
    }

    pub fn with_max_chunk_size(mut self, max_chunk_size: usize) -> Self {
        self.max_chunk_size = max_chunk_size;
        self
    }

    pub fn with_read_mode(mut self, read_mode: ReadMode) -> Self {
        self.read_mode = read_mode;
        self
    }

    pub fn with_name_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.name_pattern = pattern.into();
        self
    }

    pub fn with_follow_symlinks(mut self, follow: bool) -> Self {
        self.follow_symlinks = follow;
        self
    }

    pub fn scan_options(&self) -> ScanOptions {
        ScanOptions {
            name_pattern: self.name_pattern.clone(),
            follow_symlinks: self.follow_symlinks,
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.concurrency == 0 {
            return Err(ConfigError::Validation("concurrency must be at least 1".to_string()));
        }
        if self.max_chunk_size == 0 {
            return Err(ConfigError::Validation("max_chunk_size must be at least 1".to_string()));
        }
        if self.name_pattern.is_empty() {
            return Err(ConfigError::Validation("name_pattern must not be empty".to_string()));
        }
        Ok(())
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ConfigError::NotFound(path.to_path_buf()));
        }
        Self::check_extension(path)?;

        let contents = fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let path = path.as_ref();
        Self::check_extension(path)?;

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }

    fn check_extension(path: &Path) -> Result<(), ConfigError> {
        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
        if ext.eq_ignore_ascii_case("json") {
            Ok(())
        } else {
            Err(ConfigError::UnsupportedFormat(ext.to_string()))
        }
    }
}
