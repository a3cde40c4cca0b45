// Thu Oct 15 2026 - Alex

use crate::search::MatchRecord;
use serde::Serialize;
use std::fmt;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Termination {
    /// First-match mode found its match.
    Stopped,
    /// Every candidate was looked at.
    Exhausted,
    /// The caller's cancellation token was raised.
    Cancelled,
}

impl fmt::Display for Termination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Termination::Stopped => "stopped",
            Termination::Exhausted => "exhausted",
            Termination::Cancelled => "cancelled",
        };
        write!(f, "{}", name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchState {
    Idle,
    Scanning,
    Finished(Termination),
}

impl SearchState {
    pub fn is_terminal(self) -> bool {
        matches!(self, SearchState::Finished(_))
    }

    pub fn advance(self, next: SearchState) -> SearchState {
        let legal = matches!(
            (self, next),
            (SearchState::Idle, SearchState::Scanning) | (SearchState::Scanning, SearchState::Finished(_))
        );
        if legal {
            log::trace!(target: crate::search::diagnostics::LOG_TARGET, "search state {:?} -> {:?}", self, next);
            next
        } else {
            log::debug!(
                target: crate::search::diagnostics::LOG_TARGET,
                "ignoring search state change {:?} -> {:?}",
                self,
                next
            );
            self
        }
    }
}

/// Matched files in the order they were collected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchResultSet {
    records: Vec<MatchRecord>,
    termination: Termination,
}

impl SearchResultSet {
    pub fn new(records: Vec<MatchRecord>, termination: Termination) -> Self {
        Self { records, termination }
    }

    pub fn records(&self) -> &[MatchRecord] {
        &self.records
    }

    pub fn paths(&self) -> impl Iterator<Item = &Path> {
        self.records.iter().map(|r| r.path())
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn termination(&self) -> Termination {
        self.termination
    }

    pub fn into_records(self) -> Vec<MatchRecord> {
        self.records
    }
}

impl<'a> IntoIterator for &'a SearchResultSet {
    type Item = &'a MatchRecord;
    type IntoIter = std::slice::Iter<'a, MatchRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}
