// Thu Oct 15 2026 - Alex

pub mod diagnostics;
pub mod file;
pub mod result;
pub mod signal;

pub use diagnostics::{CollectingDiagnostics, Diagnostics, FileEvent, LogDiagnostics, SearchStats};
pub use file::FileSearch;
pub use result::MatchRecord;
pub use signal::StopSignal;
