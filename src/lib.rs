// Thu Oct 15 2026 - Alex

pub mod config;
pub mod discovery;
pub mod finder;
pub mod object;
pub mod orchestrator;
pub mod search;
pub mod symbol;
pub mod ui;
pub mod utils;

pub use config::Config;
pub use discovery::scan_directory;
pub use finder::{SearchError, SymbolFinder};
pub use object::{BinaryObject, ElfFormat, ReadMode};
pub use orchestrator::{search, SearchRequest, SearchResultSet, SymbolSearch, Termination};
pub use search::{FileSearch, MatchRecord, StopSignal};
pub use symbol::{is_export_match, locate_dynsym, DynamicSymbolEntry, DynamicSymbols};
