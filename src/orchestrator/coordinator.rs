// Thu Oct 15 2026 - Alex

use crate::object::ReadMode;
use crate::orchestrator::collector::{SearchResultSet, SearchState, Termination};
use crate::orchestrator::scheduler::{chunk_size_for, run_chunk, ChunkScheduler, ChunkStatus, DEFAULT_MAX_CHUNK_SIZE};
use crate::search::diagnostics::LOG_TARGET;
use crate::search::{Diagnostics, FileSearch, LogDiagnostics, StopSignal};
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Debug, Clone)]
pub struct SearchRequest {
    pub files: Vec<PathBuf>,
    pub target: String,
    pub find_all: bool,
    pub concurrency: usize,
    pub max_chunk_size: usize,
    pub read_mode: ReadMode,
    pub cancel: Option<StopSignal>,
}

impl SearchRequest {
    pub fn new(files: Vec<PathBuf>, target: impl Into<String>) -> Self {
        Self {
            files,
            target: target.into(),
            find_all: false,
            concurrency: 1,
            max_chunk_size: DEFAULT_MAX_CHUNK_SIZE,
            read_mode: ReadMode::default(),
            cancel: None,
        }
    }

    pub fn with_find_all(mut self, find_all: bool) -> Self {
        self.find_all = find_all;
        self
    }

    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency;
        self
    }

    pub fn with_max_chunk_size(mut self, max_chunk_size: usize) -> Self {
        self.max_chunk_size = max_chunk_size;
        self
    }

    pub fn with_read_mode(mut self, read_mode: ReadMode) -> Self {
        self.read_mode = read_mode;
        self
    }

    pub fn with_cancel(mut self, cancel: StopSignal) -> Self {
        self.cancel = Some(cancel);
        self
    }
}

/// Runs a symbol search over a candidate list, sequentially or on a worker pool.
pub struct SymbolSearch {
    diagnostics: Arc<dyn Diagnostics>,
}

impl SymbolSearch {
    pub fn new(diagnostics: Arc<dyn Diagnostics>) -> Self {
        Self { diagnostics }
    }

    pub fn run(&self, request: &SearchRequest) -> SearchResultSet {
        let cancel = request.cancel.clone().unwrap_or_default();
        let search = FileSearch::new(request.target.clone(), request.find_all, self.diagnostics.clone())
            .with_read_mode(request.read_mode);

        let state = SearchState::Idle.advance(SearchState::Scanning);
        log::debug!(
            target: LOG_TARGET,
            "searching {} files for {} (find_all={}, concurrency={})",
            request.files.len(),
            request.target,
            request.find_all,
            request.concurrency
        );

        let result = if request.concurrency <= 1 || request.files.len() <= 1 {
            self.run_sequential(request, &search, &cancel)
        } else {
            match ChunkScheduler::new(request.concurrency) {
                Ok(scheduler) => self.run_parallel(request, search, &scheduler, &cancel),
                Err(err) => {
                    log::warn!(
                        target: LOG_TARGET,
                        "cannot start {} workers ({}), searching sequentially",
                        request.concurrency,
                        err
                    );
                    self.run_sequential(request, &search, &cancel)
                }
            }
        };

        let state = state.advance(SearchState::Finished(result.termination()));
        log::debug!(
            target: LOG_TARGET,
            "search for {} finished: {:?} with {} matches",
            request.target,
            state,
            result.len()
        );
        result
    }

    fn run_sequential(&self, request: &SearchRequest, search: &FileSearch, cancel: &StopSignal) -> SearchResultSet {
        let stop = cancel.child();
        let outcome = run_chunk(0, &request.files, search, &stop);

        let termination = match outcome.status {
            ChunkStatus::Stopped if !request.find_all => Termination::Stopped,
            _ if cancel.is_raised() => Termination::Cancelled,
            _ => Termination::Exhausted,
        };
        SearchResultSet::new(outcome.records, termination)
    }

    fn run_parallel(
        &self,
        request: &SearchRequest,
        search: FileSearch,
        scheduler: &ChunkScheduler,
        cancel: &StopSignal,
    ) -> SearchResultSet {
        let chunk_size = chunk_size_for(request.files.len(), scheduler.workers(), request.max_chunk_size);
        let chunks: Vec<Vec<PathBuf>> = request.files.chunks(chunk_size).map(<[PathBuf]>::to_vec).collect();
        let chunk_count = chunks.len();
        log::debug!(
            target: LOG_TARGET,
            "dispatching {} chunks of up to {} files to {} workers",
            chunk_count,
            chunk_size,
            scheduler.workers()
        );

        let dispatch = cancel.child();
        let receiver = scheduler.dispatch(chunks, Arc::new(search), &dispatch, cancel);

        let mut completed = Vec::with_capacity(chunk_count);
        let mut termination = Termination::Exhausted;
        let mut outcomes = receiver.iter();
        for outcome in outcomes.by_ref() {
            let matched = outcome.matched();
            completed.push(outcome);

            if matched && !request.find_all {
                dispatch.raise();
                termination = Termination::Stopped;
                break;
            }
            if cancel.is_raised() {
                termination = Termination::Cancelled;
                break;
            }
        }

        // queued chunks now skip; chunks already running finish their files so
        // nothing reports after the search has returned
        let mut skipped = 0;
        for outcome in outcomes {
            if outcome.status == ChunkStatus::Skipped {
                skipped += 1;
            } else if request.find_all {
                completed.push(outcome);
            }
        }
        if skipped > 0 {
            log::debug!(target: LOG_TARGET, "{} of {} chunks skipped", skipped, chunk_count);
        }

        completed.sort_by_key(|o| o.index);
        let records = completed.into_iter().flat_map(|o| o.records).collect();
        SearchResultSet::new(records, termination)
    }
}

/// Searches `files` for an exported function named `target`, reporting
/// per-file outcomes through the `log` facade.
pub fn search(files: &[PathBuf], target: &str, find_all: bool, concurrency: usize) -> SearchResultSet {
    let request = SearchRequest::new(files.to_vec(), target)
        .with_find_all(find_all)
        .with_concurrency(concurrency);
    SymbolSearch::new(Arc::new(LogDiagnostics::new())).run(&request)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::{CollectingDiagnostics, FileEvent, MatchRecord};
    use crate::utils::testing::{ElfBuilder, TestSymbol};
    use parking_lot::{Condvar, Mutex};
    use std::path::Path;
    use std::time::Duration;
    use tempfile::TempDir;

    struct Corpus {
        dir: TempDir,
        files: Vec<PathBuf>,
    }

    impl Corpus {
        fn new() -> Self {
            Self {
                dir: tempfile::tempdir().unwrap(),
                files: Vec::new(),
            }
        }

        fn add(&mut self, name: &str, builder: ElfBuilder) -> PathBuf {
            let path = self.dir.path().join(name);
            builder.write_to(&path).unwrap();
            self.files.push(path.clone());
            path
        }

        fn add_raw(&mut self, name: &str, data: &[u8]) -> PathBuf {
            let path = self.dir.path().join(name);
            std::fs::write(&path, data).unwrap();
            self.files.push(path.clone());
            path
        }

        fn exporting(&mut self, name: &str) -> PathBuf {
            self.add(name, ElfBuilder::shared_object().symbol(TestSymbol::function("puts", 0x1040)))
        }

        fn filler(&mut self, name: &str) -> PathBuf {
            self.add(name, ElfBuilder::shared_object().symbol(TestSymbol::function("other", 0x1040)))
        }
    }

    fn run(request: SearchRequest) -> (SearchResultSet, Arc<CollectingDiagnostics>) {
        let diagnostics = Arc::new(CollectingDiagnostics::new());
        let result = SymbolSearch::new(diagnostics.clone()).run(&request);
        (result, diagnostics)
    }

    #[test]
    fn test_sequential_first_match_stops_walk() {
        let mut corpus = Corpus::new();
        corpus.filler("liba.so");
        let first = corpus.exporting("libb.so");
        corpus.exporting("libc.so");
        corpus.filler("libd.so");

        let (result, diagnostics) = run(SearchRequest::new(corpus.files.clone(), "puts"));
        assert_eq!(result.records(), &[MatchRecord::new(first)]);
        assert_eq!(result.termination(), Termination::Stopped);
        // libc.so and libd.so were never opened
        assert_eq!(diagnostics.stats().files_scanned, 2);
    }

    #[test]
    fn test_sequential_find_all_in_order() {
        let mut corpus = Corpus::new();
        let a = corpus.exporting("liba.so");
        corpus.filler("libb.so");
        let c = corpus.exporting("libc.so");

        let (result, _) = run(SearchRequest::new(corpus.files.clone(), "puts").with_find_all(true));
        assert_eq!(result.records(), &[MatchRecord::new(a), MatchRecord::new(c)]);
        assert_eq!(result.termination(), Termination::Exhausted);
    }

    #[test]
    fn test_parallel_find_all_keeps_dispatch_order() {
        let mut corpus = Corpus::new();
        let mut expected = Vec::new();
        for i in 0..24 {
            if i % 3 == 0 {
                expected.push(MatchRecord::new(corpus.exporting(&format!("lib{:02}.so", i))));
            } else {
                corpus.filler(&format!("lib{:02}.so", i));
            }
        }

        let request = SearchRequest::new(corpus.files.clone(), "puts")
            .with_find_all(true)
            .with_concurrency(4)
            .with_max_chunk_size(2);
        let (result, diagnostics) = run(request);

        assert_eq!(result.records(), expected.as_slice());
        assert_eq!(result.termination(), Termination::Exhausted);
        assert_eq!(diagnostics.stats().files_scanned, 24);
    }

    #[test]
    fn test_parallel_first_match_returns_one() {
        let mut corpus = Corpus::new();
        let mut exporters = Vec::new();
        for i in 0..40 {
            if i % 10 == 9 {
                exporters.push(corpus.exporting(&format!("lib{:02}.so", i)));
            } else {
                corpus.filler(&format!("lib{:02}.so", i));
            }
        }

        let request = SearchRequest::new(corpus.files.clone(), "puts")
            .with_concurrency(4)
            .with_max_chunk_size(5);
        let (result, _) = run(request);

        assert_eq!(result.len(), 1);
        assert!(exporters.contains(&result.records()[0].path));
        assert_eq!(result.termination(), Termination::Stopped);
    }

    #[test]
    fn test_parallel_nothing_found() {
        let mut corpus = Corpus::new();
        for i in 0..10 {
            corpus.filler(&format!("lib{}.so", i));
        }

        let (result, _) = run(SearchRequest::new(corpus.files.clone(), "puts").with_concurrency(3));
        assert!(result.is_empty());
        assert_eq!(result.termination(), Termination::Exhausted);
    }

    #[test]
    fn test_mixed_corpus() {
        let mut corpus = Corpus::new();
        let lib_a = corpus.exporting("libA.so");
        corpus.add("libB.so", ElfBuilder::shared_object().symbol(TestSymbol::import("puts")));
        corpus.add_raw("corrupt.so", &[0x5a; 19]);

        for find_all in [false, true] {
            for concurrency in [1, 2] {
                let request = SearchRequest::new(corpus.files.clone(), "puts")
                    .with_find_all(find_all)
                    .with_concurrency(concurrency);
                let (result, _) = run(request);
                assert_eq!(result.records(), &[MatchRecord::new(&lib_a)]);
            }
        }

        let request = SearchRequest::new(corpus.files.clone(), "puts").with_find_all(true);
        let (_, diagnostics) = run(request);
        assert_eq!(diagnostics.count_where(|e| matches!(e, FileEvent::Malformed { .. })), 1);
    }

    #[test]
    fn test_cancelled_before_start() {
        let mut corpus = Corpus::new();
        corpus.exporting("liba.so");
        corpus.exporting("libb.so");
        corpus.exporting("libc.so");
        let cancel = StopSignal::new();
        cancel.raise();

        for concurrency in [1, 2] {
            let request = SearchRequest::new(corpus.files.clone(), "puts")
                .with_find_all(true)
                .with_concurrency(concurrency)
                .with_cancel(cancel.clone());
            let (result, _) = run(request);
            assert!(result.is_empty());
            assert_eq!(result.termination(), Termination::Cancelled);
        }
    }

    /// Raises `cancel` from whichever worker reports first.
    struct CancelOnFirstReport {
        inner: CollectingDiagnostics,
        cancel: StopSignal,
    }

    impl Diagnostics for CancelOnFirstReport {
        fn report(&self, event: FileEvent) {
            self.cancel.raise();
            self.inner.report(event);
        }
    }

    #[test]
    fn test_cancelled_while_running() {
        let mut corpus = Corpus::new();
        for i in 0..40 {
            corpus.exporting(&format!("lib{:02}.so", i));
        }
        let cancel = StopSignal::new();
        let diagnostics = Arc::new(CancelOnFirstReport {
            inner: CollectingDiagnostics::new(),
            cancel: cancel.clone(),
        });

        let request = SearchRequest::new(corpus.files.clone(), "puts")
            .with_find_all(true)
            .with_concurrency(2)
            .with_max_chunk_size(1)
            .with_cancel(cancel);
        let result = SymbolSearch::new(diagnostics.clone()).run(&request);

        assert_eq!(result.termination(), Termination::Cancelled);
        // only the chunks already running when the token went up got to open a file
        let scanned = diagnostics.inner.stats().files_scanned;
        assert!(scanned <= 2, "scanned {} files after cancel", scanned);
        assert!(result.len() <= scanned);
    }

    /// Holds the report for `held` until `release` has been reported.
    struct Gate {
        inner: CollectingDiagnostics,
        held: PathBuf,
        release: PathBuf,
        released: Mutex<bool>,
        signal: Condvar,
    }

    impl Gate {
        fn events_for(&self, path: &Path) -> Vec<FileEvent> {
            self.inner.events().into_iter().filter(|e| e.path() == path).collect()
        }
    }

    impl Diagnostics for Gate {
        fn report(&self, event: FileEvent) {
            if event.path() == &self.release {
                *self.released.lock() = true;
                self.signal.notify_all();
            }
            if event.path() == &self.held {
                let mut released = self.released.lock();
                while !*released {
                    if self.signal.wait_for(&mut released, Duration::from_secs(5)).timed_out() {
                        break;
                    }
                }
            }
            self.inner.report(event);
        }
    }

    #[test]
    fn test_sibling_match_does_not_interrupt_running_chunk() {
        let mut corpus = Corpus::new();
        // 16 files over 2 workers make chunks of two
        let first = corpus.exporting("lib00.so");
        corpus.filler("lib01.so");
        let running = corpus.filler("lib02.so");
        let late = corpus.exporting("lib03.so");
        for i in 4..16 {
            corpus.filler(&format!("lib{:02}.so", i));
        }

        let gate = Arc::new(Gate {
            inner: CollectingDiagnostics::new(),
            held: first.clone(),
            release: running,
            released: Mutex::new(false),
            signal: Condvar::new(),
        });
        let request = SearchRequest::new(corpus.files.clone(), "puts").with_concurrency(2);
        let result = SymbolSearch::new(gate.clone()).run(&request);

        assert_eq!(result.records(), &[MatchRecord::new(&first)]);
        assert_eq!(result.termination(), Termination::Stopped);
        assert_eq!(
            gate.events_for(&late),
            vec![FileEvent::Matched {
                path: late.clone(),
                symbol: "puts".to_string(),
            }]
        );
    }

    #[test]
    fn test_repeat_runs_are_identical() {
        let mut corpus = Corpus::new();
        for i in 0..6 {
            corpus.exporting(&format!("lib{}.so", i));
        }

        let request = SearchRequest::new(corpus.files.clone(), "puts").with_find_all(true);
        let (first, _) = run(request.clone());
        let (second, _) = run(request);
        assert_eq!(first, second);
        assert_eq!(first.len(), 6);
    }

    #[test]
    fn test_empty_candidate_list() {
        let result = search(&[], "puts", true, 4);
        assert!(result.is_empty());
        assert_eq!(result.termination(), Termination::Exhausted);
    }
}
