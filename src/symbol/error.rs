// Thu Oct 15 2026 - Alex

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SymbolError {
    #[error("corrupt dynamic symbol #{index}: {reason}")]
    Corrupt { index: usize, reason: String },
}

impl SymbolError {
    pub fn index(&self) -> usize {
        match self {
            SymbolError::Corrupt { index, .. } => *index,
        }
    }
}
