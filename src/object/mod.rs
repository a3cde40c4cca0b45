// Thu Oct 15 2026 - Alex

pub mod error;
pub mod format;
pub mod reader;

pub use error::ParseError;
pub use format::ElfFormat;
pub use reader::{BinaryObject, ReadMode, Section};
