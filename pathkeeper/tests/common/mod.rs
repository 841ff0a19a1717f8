//! Shared fixtures for the integration suite (`tests/scenarios.rs`).
//!
//! Integration test binaries only see `pathkeeper`'s public API, so these
//! fakes are a separate, smaller set from `src/testutil.rs` (which is
//! `cfg(test)`-only and invisible outside the crate's own unit tests).

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use parking_lot::Mutex;
use pathkeeper::context::{ElytraSafety, GameEventHandler, InputSink, PlayerContext, WorldView};
use pathkeeper::event::PathEvent;
use pathkeeper::executor::{PathExecutor, PathExecutorFactory};
use pathkeeper::goal::Goal;
use pathkeeper::path::Path;
use pathkeeper::process::{PathingCommand, Process};
use pathkeeper::searcher::{CalculationContext, SearchFailure, SearchResult, Searcher, SearcherFactory};
use pathkeeper_core::{BlockPos, Vec3};

#[derive(Default)]
pub struct FakeWorld {
    walkable: Mutex<HashMap<BlockPos, bool>>,
    passable: Mutex<HashMap<BlockPos, bool>>,
}

impl WorldView for FakeWorld {
    fn is_walkable(&self, pos: BlockPos) -> bool {
        self.walkable.lock().get(&pos).copied().unwrap_or(true)
    }

    fn is_passable(&self, pos: BlockPos) -> bool {
        self.passable.lock().get(&pos).copied().unwrap_or(true)
    }
}

pub struct FakePlayer {
    pub feet: Mutex<BlockPos>,
}

impl FakePlayer {
    pub fn at(feet: BlockPos) -> Self {
        Self {
            feet: Mutex::new(feet),
        }
    }
}

impl PlayerContext for FakePlayer {
    fn player_feet(&self) -> BlockPos {
        *self.feet.lock()
    }

    fn position(&self) -> Vec3 {
        self.feet.lock().center()
    }

    fn on_ground(&self) -> bool {
        true
    }

    fn is_chunk_loaded(&self, _x: i32, _z: i32) -> bool {
        true
    }

    fn disconnect(&self) {}

    fn calculation_context(&self) -> CalculationContext {
        CalculationContext {
            safe_for_threaded_use: true,
        }
    }
}

#[derive(Default)]
pub struct NullInputSink;

impl InputSink for NullInputSink {
    fn clear_all_keys(&self) {}
    fn stop_breaking_block(&self) {}
}

pub struct InactiveElytra;

impl ElytraSafety for InactiveElytra {
    fn is_active(&self) -> bool {
        false
    }

    fn is_safe_to_cancel(&self) -> bool {
        true
    }
}

#[derive(Default)]
pub struct RecordingEventHandler {
    events: Mutex<Vec<PathEvent>>,
}

impl RecordingEventHandler {
    pub fn events(&self) -> Vec<PathEvent> {
        self.events.lock().clone()
    }

    /// Polls `events()` until `predicate` matches or `timeout` elapses —
    /// the background search worker commits its result on its own thread,
    /// so tests can't just assert synchronously after one `tick` call.
    pub fn wait_until(&self, timeout: Duration, predicate: impl Fn(&[PathEvent]) -> bool) -> bool {
        let start = std::time::Instant::now();
        loop {
            if predicate(&self.events()) {
                return true;
            }
            if start.elapsed() > timeout {
                return false;
            }
            std::thread::sleep(Duration::from_millis(10));
        }
    }
}

impl GameEventHandler for RecordingEventHandler {
    fn handle(&self, event: PathEvent) {
        self.events.lock().push(event);
    }
}

pub struct ScriptedExecutor {
    pub src: BlockPos,
    pub dest: BlockPos,
    pub positions: Vec<BlockPos>,
    pub goal: Goal,
    pub finished: bool,
    pub failed: bool,
    pub safe_to_cancel: bool,
    pub ticks_remaining: u32,
}

impl ScriptedExecutor {
    pub fn from_path(path: Path) -> Self {
        Self {
            src: path.src,
            dest: path.dest,
            positions: path.nodes,
            goal: path.goal,
            finished: false,
            failed: false,
            safe_to_cancel: true,
            ticks_remaining: 4,
        }
    }
}

impl PathExecutor for ScriptedExecutor {
    fn tick(&mut self) -> bool {
        self.ticks_remaining = self.ticks_remaining.saturating_sub(1);
        if self.ticks_remaining == 0 {
            self.finished = true;
        }
        self.safe_to_cancel
    }

    fn failed(&self) -> bool {
        self.failed
    }

    fn finished(&self) -> bool {
        self.finished
    }

    fn sprinting(&self) -> bool {
        false
    }

    fn src(&self) -> BlockPos {
        self.src
    }

    fn dest(&self) -> BlockPos {
        self.dest
    }

    fn goal(&self) -> Goal {
        self.goal.clone()
    }

    fn positions(&self) -> &[BlockPos] {
        &self.positions
    }

    fn ticks_remaining(&self) -> u32 {
        self.ticks_remaining
    }

    fn snipsnap_if_possible(&self) -> bool {
        false
    }

    fn try_splice(self: Box<Self>, _next: Option<&dyn PathExecutor>) -> Box<dyn PathExecutor> {
        self
    }
}

pub struct ScriptedExecutorFactory;

impl PathExecutorFactory for ScriptedExecutorFactory {
    fn build(&self, path: Path) -> Box<dyn PathExecutor> {
        Box::new(ScriptedExecutor::from_path(path))
    }
}

pub struct ScriptedSearcher {
    start: BlockPos,
    goal: Goal,
    result: Mutex<Option<SearchResult>>,
    cancelled: AtomicBool,
}

impl ScriptedSearcher {
    pub fn new(start: BlockPos, goal: Goal, result: SearchResult) -> Self {
        Self {
            start,
            goal,
            result: Mutex::new(Some(result)),
            cancelled: AtomicBool::new(false),
        }
    }
}

impl Searcher for ScriptedSearcher {
    fn start(&self) -> BlockPos {
        self.start
    }

    fn goal(&self) -> Goal {
        self.goal.clone()
    }

    fn best_so_far(&self) -> Option<Path> {
        None
    }

    fn cancel(&self) {
        self.cancelled.store(true, Ordering::Relaxed);
    }

    fn calculate(&self, _primary_timeout: Duration, _failure_timeout: Duration) -> SearchResult {
        self.result
            .lock()
            .take()
            .unwrap_or(SearchResult::Failure(SearchFailure::NoPath))
    }
}

/// Hands out queued results in order, one per `build` call.
#[derive(Default)]
pub struct ScriptedSearcherFactory {
    results: Mutex<Vec<SearchResult>>,
}

impl ScriptedSearcherFactory {
    pub fn new(mut results: Vec<SearchResult>) -> Self {
        results.reverse();
        Self {
            results: Mutex::new(results),
        }
    }
}

impl SearcherFactory for ScriptedSearcherFactory {
    fn build(
        &self,
        start: BlockPos,
        goal: Goal,
        _previous: Option<Path>,
        _context: CalculationContext,
    ) -> Box<dyn Searcher> {
        let result = self
            .results
            .lock()
            .pop()
            .unwrap_or(SearchResult::Failure(SearchFailure::NoPath));
        Box::new(ScriptedSearcher::new(start, goal, result))
    }
}

/// A process that issues the same fixed command every tick it's active,
/// like a real process that keeps asserting its goal until something else
/// changes its mind.
pub struct StandingProcess {
    name: &'static str,
    priority: f64,
    command: PathingCommand,
    release_calls: AtomicBool,
}

impl StandingProcess {
    pub fn new(name: &'static str, priority: f64, command: PathingCommand) -> Self {
        Self {
            name,
            priority,
            command,
            release_calls: AtomicBool::new(false),
        }
    }

    pub fn was_released(&self) -> bool {
        self.release_calls.load(Ordering::Relaxed)
    }
}

impl Process for StandingProcess {
    fn is_active(&self) -> bool {
        true
    }

    fn is_temporary(&self) -> bool {
        false
    }

    fn priority(&self) -> f64 {
        self.priority
    }

    fn on_tick(&self, _calc_failed_last_tick: bool, _safe_to_cancel: bool) -> Option<PathingCommand> {
        Some(self.command.clone())
    }

    fn release(&self) {
        self.release_calls.store(true, Ordering::Relaxed);
    }

    fn display_name(&self) -> &str {
        self.name
    }
}
