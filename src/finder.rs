// Thu Oct 15 2026 - Alex

use crate::config::{Config, ConfigError};
use crate::discovery::{scan_directory, DiscoveryError};
use crate::orchestrator::{SearchRequest, SearchResultSet, SymbolSearch};
use crate::search::{Diagnostics, LogDiagnostics, StopSignal};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;

/// Failures that keep a search from running at all. Problems with individual
/// files never end up here.
#[derive(Error, Debug)]
pub enum SearchError {
    #[error(transparent)]
    Discovery(#[from] DiscoveryError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("symbol name must not be empty")]
    EmptySymbol,
}

/// Finds which shared objects under a directory export a function.
pub struct SymbolFinder {
    config: Config,
    diagnostics: Arc<dyn Diagnostics>,
    cancel: StopSignal,
}

impl SymbolFinder {
    pub fn new(config: Config) -> Result<Self, SearchError> {
        config.validate()?;
        Ok(Self {
            config,
            diagnostics: Arc::new(LogDiagnostics::new()),
            cancel: StopSignal::new(),
        })
    }

    pub fn with_diagnostics(mut self, diagnostics: Arc<dyn Diagnostics>) -> Self {
        self.diagnostics = diagnostics;
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Token that aborts a running search from another thread.
    pub fn cancel_token(&self) -> StopSignal {
        self.cancel.clone()
    }

    pub fn candidates(&self, dir: &Path) -> Result<Vec<PathBuf>, SearchError> {
        Ok(scan_directory(dir, &self.config.scan_options())?)
    }

    pub fn find_symbol(&self, dir: &Path, symbol: &str) -> Result<SearchResultSet, SearchError> {
        let files = self.candidates(dir)?;
        self.find_symbol_in(files, symbol)
    }

    pub fn find_symbol_in(&self, files: Vec<PathBuf>, symbol: &str) -> Result<SearchResultSet, SearchError> {
        if symbol.is_empty() {
            return Err(SearchError::EmptySymbol);
        }

        let request = SearchRequest::new(files, symbol)
            .with_find_all(self.config.find_all)
            .with_concurrency(self.config.concurrency)
            .with_max_chunk_size(self.config.max_chunk_size)
            .with_read_mode(self.config.read_mode)
            .with_cancel(self.cancel.clone());

        Ok(SymbolSearch::new(self.diagnostics.clone()).run(&request))
    }
}
