// Thu Oct 15 2026 - Alex

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Cooperative stop token. Clones share one flag; once raised it stays raised.
///
/// A child token observes every ancestor, but raising the child leaves the
/// ancestors alone. Workers get children of the caller's cancellation token so
/// a first-match stop inside one worker never leaks out of it.
#[derive(Debug, Clone, Default)]
pub struct StopSignal {
    raised: Arc<AtomicBool>,
    ancestors: Vec<Arc<AtomicBool>>,
}

impl StopSignal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn child(&self) -> Self {
        let mut ancestors = self.ancestors.clone();
        ancestors.push(self.raised.clone());
        Self {
            raised: Arc::new(AtomicBool::new(false)),
            ancestors,
        }
    }

    pub fn raise(&self) {
        self.raised.store(true, Ordering::Release);
    }

    pub fn is_raised(&self) -> bool {
        self.raised.load(Ordering::Acquire)
            || self.ancestors.iter().any(|flag| flag.load(Ordering::Acquire))
    }
}
