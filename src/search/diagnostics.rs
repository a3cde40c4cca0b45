// Thu Oct 15 2026 - Alex

use log::Level;
use parking_lot::Mutex;
use serde::Serialize;
use std::fmt;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};

pub const LOG_TARGET: &str = "findso::search";

/// Per-file outcome of a symbol lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileEvent {
    Matched { path: PathBuf, symbol: String },
    NoMatch { path: PathBuf, symbol: String },
    NoDynamicSymbols { path: PathBuf },
    Malformed { path: PathBuf, reason: String },
    Unreadable { path: PathBuf, reason: String },
    CorruptEntry { path: PathBuf, index: usize, reason: String },
    Interrupted { path: PathBuf },
}

impl FileEvent {
    pub fn path(&self) -> &PathBuf {
        match self {
            FileEvent::Matched { path, .. }
            | FileEvent::NoMatch { path, .. }
            | FileEvent::NoDynamicSymbols { path }
            | FileEvent::Malformed { path, .. }
            | FileEvent::Unreadable { path, .. }
            | FileEvent::CorruptEntry { path, .. }
            | FileEvent::Interrupted { path } => path,
        }
    }

    pub fn level(&self) -> Level {
        match self {
            FileEvent::Matched { .. } => Level::Info,
            FileEvent::Malformed { .. } | FileEvent::Unreadable { .. } | FileEvent::CorruptEntry { .. } => {
                Level::Warn
            }
            FileEvent::NoMatch { .. } | FileEvent::NoDynamicSymbols { .. } | FileEvent::Interrupted { .. } => {
                Level::Debug
            }
        }
    }
}

impl fmt::Display for FileEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FileEvent::Matched { path, symbol } => write!(f, "Found {} in {}", symbol, path.display()),
            FileEvent::NoMatch { path, symbol } => write!(f, "No {} in {}", symbol, path.display()),
            FileEvent::NoDynamicSymbols { path } => {
                write!(f, "No dynamic symbol table in {}", path.display())
            }
            FileEvent::Malformed { path, reason } => {
                write!(f, "Skipping malformed {}: {}", path.display(), reason)
            }
            FileEvent::Unreadable { path, reason } => {
                write!(f, "Skipping unreadable {}: {}", path.display(), reason)
            }
            FileEvent::CorruptEntry { path, index, reason } => write!(
                f,
                "Stopped reading {} at dynamic symbol #{}: {}",
                path.display(),
                index,
                reason
            ),
            FileEvent::Interrupted { path } => write!(f, "Interrupted while reading {}", path.display()),
        }
    }
}

/// Sink for per-file events, handed to every search component explicitly.
pub trait Diagnostics: Send + Sync {
    fn report(&self, event: FileEvent);
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SearchStats {
    pub files_scanned: usize,
    pub files_matched: usize,
    pub files_without_symbols: usize,
    pub files_skipped: usize,
    pub files_interrupted: usize,
}

#[derive(Default)]
struct StatCounters {
    scanned: AtomicUsize,
    matched: AtomicUsize,
    without_symbols: AtomicUsize,
    skipped: AtomicUsize,
    interrupted: AtomicUsize,
}

impl StatCounters {
    fn record(&self, event: &FileEvent) {
        self.scanned.fetch_add(1, Ordering::Relaxed);
        let counter = match event {
            FileEvent::Matched { .. } => &self.matched,
            FileEvent::NoDynamicSymbols { .. } => &self.without_symbols,
            FileEvent::Malformed { .. } | FileEvent::Unreadable { .. } | FileEvent::CorruptEntry { .. } => {
                &self.skipped
            }
            FileEvent::Interrupted { .. } => &self.interrupted,
            FileEvent::NoMatch { .. } => return,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    fn snapshot(&self) -> SearchStats {
        SearchStats {
            files_scanned: self.scanned.load(Ordering::Relaxed),
            files_matched: self.matched.load(Ordering::Relaxed),
            files_without_symbols: self.without_symbols.load(Ordering::Relaxed),
            files_skipped: self.skipped.load(Ordering::Relaxed),
            files_interrupted: self.interrupted.load(Ordering::Relaxed),
        }
    }
}

/// Forwards events to the `log` facade and keeps running totals.
#[derive(Default)]
pub struct LogDiagnostics {
    counters: StatCounters,
}

impl LogDiagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stats(&self) -> SearchStats {
        self.counters.snapshot()
    }
}

impl Diagnostics for LogDiagnostics {
    fn report(&self, event: FileEvent) {
        self.counters.record(&event);
        log::log!(target: LOG_TARGET, event.level(), "{}", event);
    }
}

/// Keeps every event in memory.
#[derive(Default)]
pub struct CollectingDiagnostics {
    events: Mutex<Vec<FileEvent>>,
    counters: StatCounters,
}

impl CollectingDiagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<FileEvent> {
        self.events.lock().clone()
    }

    pub fn stats(&self) -> SearchStats {
        self.counters.snapshot()
    }

    pub fn count_where<F: Fn(&FileEvent) -> bool>(&self, predicate: F) -> usize {
        self.events.lock().iter().filter(|e| predicate(e)).count()
    }
}

impl Diagnostics for CollectingDiagnostics {
    fn report(&self, event: FileEvent) {
        self.counters.record(&event);
        self.events.lock().push(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_levels() {
        let path = PathBuf::from("libc.so.6");
        assert_eq!(
            FileEvent::Matched { path: path.clone(), symbol: "puts".into() }.level(),
            Level::Info
        );
        assert_eq!(
            FileEvent::Malformed { path: path.clone(), reason: "bad magic".into() }.level(),
            Level::Warn
        );
        assert_eq!(FileEvent::NoDynamicSymbols { path }.level(), Level::Debug);
    }

    #[test]
    fn test_stats_tally() {
        let diagnostics = CollectingDiagnostics::new();
        diagnostics.report(FileEvent::Matched { path: "a.so".into(), symbol: "puts".into() });
        diagnostics.report(FileEvent::NoMatch { path: "b.so".into(), symbol: "puts".into() });
        diagnostics.report(FileEvent::Unreadable { path: "c.so".into(), reason: "denied".into() });

        let stats = diagnostics.stats();
        assert_eq!(stats.files_scanned, 3);
        assert_eq!(stats.files_matched, 1);
        assert_eq!(stats.files_skipped, 1);
        assert_eq!(diagnostics.events().len(), 3);
    }

    #[test]
    fn test_display() {
        let event = FileEvent::CorruptEntry { path: "x.so".into(), index: 7, reason: "bad name".into() };
        assert_eq!(event.to_string(), "Stopped reading x.so at dynamic symbol #7: bad name");
    }
}
