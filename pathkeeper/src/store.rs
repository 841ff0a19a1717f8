//! `PathStore`: the shared state behind the two-lock discipline.
//!
//! `path_lock` is always acquired before `calc_lock`, never the reverse —
//! every method here that needs both takes them in that order.

use std::sync::Arc;

use parking_lot::{Mutex, MutexGuard};
use pathkeeper_core::BlockPos;

use crate::executor::PathExecutor;
use crate::goal::Goal;
use crate::searcher::Searcher;

/// Everything guarded by `path_lock`.
pub(crate) struct PathFields {
    pub current: Option<Box<dyn PathExecutor>>,
    pub next: Option<Box<dyn PathExecutor>>,
    pub expected_start: Option<BlockPos>,
    pub goal: Option<Goal>,
}

/// A running (or just-finished, not-yet-reaped) search. Guarded by
/// `calc_lock`.
pub(crate) struct ActiveSearch {
    pub searcher: Arc<dyn Searcher>,
    /// The position this search was launched against, captured at launch
    /// time. Compared against the *current* `expected_start` at commit time
    /// to decide whether a result is an orphan.
    pub expected_start_of_search: BlockPos,
    pub primary: bool,
}

pub(crate) struct PathStore {
    path: Mutex<PathFields>,
    calc: Mutex<Option<ActiveSearch>>,
}

impl PathStore {
    pub fn new() -> Self {
        Self {
            path: Mutex::new(PathFields {
                current: None,
                next: None,
                expected_start: None,
                goal: None,
            }),
            calc: Mutex::new(None),
        }
    }

    pub fn lock_path(&self) -> MutexGuard<'_, PathFields> {
        self.path.lock()
    }

    pub fn lock_calc(&self) -> MutexGuard<'_, Option<ActiveSearch>> {
        self.calc.lock()
    }

    /// Clears `current`/`next`, cancels any active search, and resets
    /// `expected_start` to the player's current block. Input-override
    /// release is the caller's job (it needs the `InputSink`, which the
    /// store doesn't hold).
    pub fn handle_pause_resume(&self, player_block: BlockPos) {
        let mut path = self.path.lock();
        path.current = None;
        path.next = None;
        path.expected_start = Some(player_block);
        drop(path);

        let mut calc = self.calc.lock();
        if let Some(search) = calc.take() {
            search.searcher.cancel();
        }
    }
}

impl Default for PathStore {
    fn default() -> Self {
        Self::new()
    }
}
