// Thu Oct 15 2026 - Alex

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ParseError {
    #[error("cannot read {path}: {source}")]
    Unreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed ELF object {path}: {reason}")]
    Malformed { path: PathBuf, reason: String },
}

impl ParseError {
    pub fn path(&self) -> &std::path::Path {
        match self {
            ParseError::Unreadable { path, .. } => path,
            ParseError::Malformed { path, .. } => path,
        }
    }

    pub fn is_malformed(&self) -> bool {
        matches!(self, ParseError::Malformed { .. })
    }
}
