// Thu Oct 15 2026 - Alex

use crate::object::{BinaryObject, ParseError, ReadMode};
use crate::search::{Diagnostics, FileEvent, MatchRecord, StopSignal};
use crate::symbol::{is_export_match, locate_dynsym, SymbolError};
use std::path::Path;
use std::sync::Arc;

/// Looks for one exported function in one file at a time.
#[derive(Clone)]
pub struct FileSearch {
    target: String,
    find_all: bool,
    read_mode: ReadMode,
    diagnostics: Arc<dyn Diagnostics>,
}

impl FileSearch {
    pub fn new(target: impl Into<String>, find_all: bool, diagnostics: Arc<dyn Diagnostics>) -> Self {
        Self {
            target: target.into(),
            find_all,
            read_mode: ReadMode::default(),
            diagnostics,
        }
    }

    pub fn with_read_mode(mut self, read_mode: ReadMode) -> Self {
        self.read_mode = read_mode;
        self
    }

    pub fn target(&self) -> &str {
        &self.target
    }

    pub fn find_all(&self) -> bool {
        self.find_all
    }

    /// Searches `path` for the target symbol.
    ///
    /// Never fails: unreadable or malformed files are reported and come back
    /// empty. A file contributes at most one record, even when its table holds
    /// the name more than once. In first-match mode a hit also raises `stop`.
    pub fn search_file(&self, path: &Path, stop: &StopSignal) -> Vec<MatchRecord> {
        let object = match BinaryObject::open(path, self.read_mode) {
            Ok(object) => object,
            Err(err) => {
                self.report_open_failure(path, err);
                return Vec::new();
            }
        };

        let Some(symbols) = locate_dynsym(&object) else {
            self.diagnostics.report(FileEvent::NoDynamicSymbols {
                path: path.to_path_buf(),
            });
            return Vec::new();
        };

        let mut records = Vec::new();
        for entry in symbols.entries() {
            if stop.is_raised() {
                self.diagnostics.report(FileEvent::Interrupted {
                    path: path.to_path_buf(),
                });
                return records;
            }

            let entry = match entry {
                Ok(entry) => entry,
                Err(SymbolError::Corrupt { index, reason }) => {
                    self.diagnostics.report(FileEvent::CorruptEntry {
                        path: path.to_path_buf(),
                        index,
                        reason,
                    });
                    return records;
                }
            };

            if is_export_match(&entry, &self.target) {
                self.diagnostics.report(FileEvent::Matched {
                    path: path.to_path_buf(),
                    symbol: self.target.clone(),
                });
                records.push(MatchRecord::new(path));
                if !self.find_all {
                    stop.raise();
                }
                return records;
            }
        }

        self.diagnostics.report(FileEvent::NoMatch {
            path: path.to_path_buf(),
            symbol: self.target.clone(),
        });
        records
    }

    fn report_open_failure(&self, path: &Path, err: ParseError) {
        let event = match err {
            ParseError::Unreadable { source, .. } => FileEvent::Unreadable {
                path: path.to_path_buf(),
                reason: source.to_string(),
            },
            ParseError::Malformed { reason, .. } => FileEvent::Malformed {
                path: path.to_path_buf(),
                reason,
            },
        };
        self.diagnostics.report(event);
    }
}
