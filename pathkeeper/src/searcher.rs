//! The `Searcher` contract and the context a search runs under.
//!
//! The A* search itself is owned by the embedder; this module only shapes
//! the contract a background search must satisfy and the value `calculate`
//! hands back.

use std::time::Duration;

use pathkeeper_core::BlockPos;

use crate::goal::Goal;
use crate::path::Path;

/// Snapshot handed to a search. Only contexts with `safe_for_threaded_use`
/// set may be passed to [`SearcherFactory::build`] for a background search
/// (enforced in `PathingCore::launch_search`).
#[derive(Debug, Clone)]
pub struct CalculationContext {
    pub safe_for_threaded_use: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchFailure {
    /// The search ran out of time without finding a path and has no
    /// best-so-far worth reporting.
    NoPath,
    /// `SearchHandle::cancel()` was observed mid-search.
    Cancellation,
    /// The search task itself errored out (panicked, world desynced, etc).
    Exception,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SearchResult {
    Success(Path),
    Failure(SearchFailure),
}

/// A single in-flight or finished background search. Implementors must be
/// safe to query (`best_so_far`, `cancel`) from the tick thread while
/// `calculate` runs on the worker thread.
pub trait Searcher: Send + Sync {
    fn start(&self) -> BlockPos;
    fn goal(&self) -> Goal;

    /// The best path found so far, if any; used by
    /// `PathingCore::validate_active_search` to decide whether an
    /// in-flight search is still useful even though `expected_start` moved.
    fn best_so_far(&self) -> Option<Path>;

    /// Idempotent; the worker observes this between A* iterations.
    fn cancel(&self);

    /// Run (or resume) the search, spending at most `primary_timeout`
    /// before returning a best-so-far path if one exists, and at most
    /// `failure_timeout` total before giving up entirely.
    fn calculate(&self, primary_timeout: Duration, failure_timeout: Duration) -> SearchResult;
}

/// Constructs a [`Searcher`] from `(start, goal, previous, context)` when
/// the core dispatches a new search.
pub trait SearcherFactory: Send + Sync {
    fn build(
        &self,
        start: BlockPos,
        goal: Goal,
        previous: Option<Path>,
        context: CalculationContext,
    ) -> Box<dyn Searcher>;
}
