// Thu Oct 15 2026 - Alex

pub mod error;
pub mod scanner;

pub use error::DiscoveryError;
pub use scanner::{has_elf_magic, scan_directory, ScanOptions};
