// Thu Oct 15 2026 - Alex

pub mod collector;
pub mod coordinator;
pub mod scheduler;

pub use collector::{SearchResultSet, SearchState, Termination};
pub use coordinator::{search, SearchRequest, SymbolSearch};
pub use scheduler::{chunk_size_for, ChunkScheduler, DEFAULT_MAX_CHUNK_SIZE};
