// Thu Oct 15 2026 - Alex

pub mod error;
pub mod matcher;
pub mod table;

pub use error::SymbolError;
pub use matcher::is_export_match;
pub use table::{
    locate_dynsym, DynamicSymbolEntry, DynamicSymbols, SymbolBinding, SymbolEntries, SymbolKind,
};
