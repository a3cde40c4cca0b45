// Thu Oct 15 2026 - Alex

use crate::search::{FileSearch, MatchRecord, StopSignal};
use rayon::{ThreadPool, ThreadPoolBuilder};
use std::path::PathBuf;
use std::sync::mpsc::{channel, Receiver};
use std::sync::Arc;

pub const DEFAULT_MAX_CHUNK_SIZE: usize = 50;

/// Chunks per worker the partitioning aims for, so a slow chunk does not
/// leave the other workers idle.
const CHUNKS_PER_WORKER: usize = 4;

/// Files per chunk: enough chunks for every worker to take several, capped at `max_chunk_size`.
pub fn chunk_size_for(file_count: usize, workers: usize, max_chunk_size: usize) -> usize {
    let workers = workers.max(1);
    file_count
        .div_ceil(workers * CHUNKS_PER_WORKER)
        .clamp(1, max_chunk_size.max(1))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChunkStatus {
    Completed,
    Stopped,
    Cancelled,
    Skipped,
}

#[derive(Debug)]
pub struct ChunkOutcome {
    pub index: usize,
    pub records: Vec<MatchRecord>,
    pub status: ChunkStatus,
}

impl ChunkOutcome {
    fn skipped(index: usize) -> Self {
        Self {
            index,
            records: Vec::new(),
            status: ChunkStatus::Skipped,
        }
    }

    pub fn matched(&self) -> bool {
        !self.records.is_empty()
    }
}

/// Walks `files` in order with one stop token for the whole run.
pub fn run_chunk(index: usize, files: &[PathBuf], search: &FileSearch, stop: &StopSignal) -> ChunkOutcome {
    let mut records = Vec::new();

    for path in files {
        if stop.is_raised() {
            let status = if records.is_empty() {
                ChunkStatus::Cancelled
            } else {
                ChunkStatus::Stopped
            };
            return ChunkOutcome { index, records, status };
        }

        let found = search.search_file(path, stop);
        let matched = !found.is_empty();
        records.extend(found);

        if matched && !search.find_all() {
            return ChunkOutcome {
                index,
                records,
                status: ChunkStatus::Stopped,
            };
        }
    }

    // a cancellation that landed during the last file still counts
    let status = if stop.is_raised() && records.is_empty() {
        ChunkStatus::Cancelled
    } else {
        ChunkStatus::Completed
    };
    ChunkOutcome { index, records, status }
}

/// Fixed-size worker pool running chunks of the candidate list.
pub struct ChunkScheduler {
    pool: ThreadPool,
    workers: usize,
}

impl ChunkScheduler {
    pub fn new(workers: usize) -> Result<Self, rayon::ThreadPoolBuildError> {
        let workers = workers.max(1);
        let pool = ThreadPoolBuilder::new()
            .num_threads(workers)
            .thread_name(|id| format!("findso-worker-{}", id))
            .build()?;
        Ok(Self { pool, workers })
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Queues every chunk and returns the channel their outcomes arrive on.
    ///
    /// A chunk that has not started when `dispatch` is raised is skipped.
    /// Chunks already running only watch their own token, a child of `cancel`,
    /// so a sibling's match does not cut them short.
    pub fn dispatch(
        &self,
        chunks: Vec<Vec<PathBuf>>,
        search: Arc<FileSearch>,
        dispatch: &StopSignal,
        cancel: &StopSignal,
    ) -> Receiver<ChunkOutcome> {
        let (sender, receiver) = channel();

        for (index, chunk) in chunks.into_iter().enumerate() {
            let sender = sender.clone();
            let search = Arc::clone(&search);
            let dispatch = dispatch.clone();
            let stop = cancel.child();

            self.pool.spawn(move || {
                let outcome = if dispatch.is_raised() {
                    ChunkOutcome::skipped(index)
                } else {
                    run_chunk(index, &chunk, &search, &stop)
                };
                // the receiver is gone once the search has settled
                let _ = sender.send(outcome);
            });
        }

        receiver
    }
}
