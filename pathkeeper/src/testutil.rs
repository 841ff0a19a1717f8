//! Fakes for every external-collaborator trait, shared by the inline
//! `#[cfg(test)]` modules across this crate. Kept deliberately dumb: each
//! fake stores whatever its owning test configured and nothing more, rather
//! than a full mock framework.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use parking_lot::Mutex;
use pathkeeper_core::{BlockPos, Vec3};

use crate::context::{ElytraSafety, GameEventHandler, InputSink, PlayerContext, WorldView};
use crate::executor::{PathExecutor, PathExecutorFactory};
use crate::event::PathEvent;
use crate::goal::Goal;
use crate::path::Path;
use crate::process::{PathingCommand, Process};
use crate::searcher::{CalculationContext, SearchResult, Searcher, SearcherFactory};

#[derive(Default)]
pub(crate) struct FakeWorld {
    walkable: HashMap<BlockPos, bool>,
    passable: HashMap<BlockPos, bool>,
}

impl FakeWorld {
    pub fn set_walkable(&mut self, pos: BlockPos, walkable: bool) {
        self.walkable.insert(pos, walkable);
    }

    pub fn set_passable(&mut self, pos: BlockPos, passable: bool) {
        self.passable.insert(pos, passable);
    }
}

impl WorldView for FakeWorld {
    fn is_walkable(&self, pos: BlockPos) -> bool {
        self.walkable.get(&pos).copied().unwrap_or(false)
    }

    fn is_passable(&self, pos: BlockPos) -> bool {
        self.passable.get(&pos).copied().unwrap_or(false)
    }
}

pub(crate) struct FakePlayerContext {
    pub feet: BlockPos,
    pub pos: Vec3,
    pub on_ground: bool,
    pub chunk_loaded: bool,
    pub safe_for_threaded_use: bool,
    disconnected: AtomicBool,
}

impl FakePlayerContext {
    pub fn standing_at(feet: BlockPos) -> Self {
        Self {
            feet,
            pos: feet.center(),
            on_ground: true,
            chunk_loaded: true,
            safe_for_threaded_use: true,
            disconnected: AtomicBool::new(false),
        }
    }

    pub fn did_disconnect(&self) -> bool {
        self.disconnected.load(Ordering::Relaxed)
    }
}

impl PlayerContext for FakePlayerContext {
    fn player_feet(&self) -> BlockPos {
        self.feet
    }

    fn position(&self) -> Vec3 {
        self.pos
    }

    fn on_ground(&self) -> bool {
        self.on_ground
    }

    fn is_chunk_loaded(&self, _x: i32, _z: i32) -> bool {
        self.chunk_loaded
    }

    fn disconnect(&self) {
        self.disconnected.store(true, Ordering::Relaxed);
    }

    fn calculation_context(&self) -> CalculationContext {
        CalculationContext {
            safe_for_threaded_use: self.safe_for_threaded_use,
        }
    }
}

#[derive(Default)]
pub(crate) struct FakeInputSink {
    clear_calls: AtomicUsize,
    stop_breaking_calls: AtomicUsize,
}

impl FakeInputSink {
    pub fn clear_calls(&self) -> usize {
        self.clear_calls.load(Ordering::Relaxed)
    }
}

impl InputSink for FakeInputSink {
    fn clear_all_keys(&self) {
        self.clear_calls.fetch_add(1, Ordering::Relaxed);
    }

    fn stop_breaking_block(&self) {
        self.stop_breaking_calls.fetch_add(1, Ordering::Relaxed);
    }
}

pub(crate) struct FakeElytraSafety {
    pub active: bool,
    pub safe_to_cancel: bool,
}

impl ElytraSafety for FakeElytraSafety {
    fn is_active(&self) -> bool {
        self.active
    }

    fn is_safe_to_cancel(&self) -> bool {
        self.safe_to_cancel
    }
}

#[derive(Default)]
pub(crate) struct FakeGameEventHandler {
    events: Mutex<Vec<PathEvent>>,
}

impl FakeGameEventHandler {
    pub fn events(&self) -> Vec<PathEvent> {
        self.events.lock().clone()
    }
}

impl GameEventHandler for FakeGameEventHandler {
    fn handle(&self, event: PathEvent) {
        self.events.lock().push(event);
    }
}

/// A [`PathExecutor`] whose every answer is pre-scripted by the test that
/// built it.
pub(crate) struct FakeExecutor {
    pub src: BlockPos,
    pub dest: BlockPos,
    pub positions: Vec<BlockPos>,
    pub goal: Goal,
    pub failed: bool,
    pub finished: bool,
    pub sprinting: bool,
    pub safe_to_cancel: bool,
    pub ticks_remaining: u32,
    pub snipsnap: bool,
    /// Whether `try_splice` grafts `next` onto this executor.
    pub spliceable: bool,
    pub tick_calls: usize,
}

impl FakeExecutor {
    pub fn new(src: BlockPos, dest: BlockPos, positions: Vec<BlockPos>) -> Self {
        Self {
            src,
            dest,
            positions,
            goal: Goal::Block(dest),
            failed: false,
            finished: false,
            sprinting: false,
            safe_to_cancel: true,
            ticks_remaining: u32::MAX,
            snipsnap: false,
            spliceable: false,
            tick_calls: 0,
        }
    }
}

impl PathExecutor for FakeExecutor {
    fn tick(&mut self) -> bool {
        self.tick_calls += 1;
        self.ticks_remaining = self.ticks_remaining.saturating_sub(1);
        self.safe_to_cancel
    }

    fn failed(&self) -> bool {
        self.failed
    }

    fn finished(&self) -> bool {
        self.finished
    }

    fn sprinting(&self) -> bool {
        self.sprinting
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
        self.snipsnap
    }

    fn try_splice(self: Box<Self>, next: Option<&dyn PathExecutor>) -> Box<dyn PathExecutor> {
        if let (true, Some(next)) = (self.spliceable, next) {
            return Box::new(FakeExecutor {
                src: self.src,
                dest: next.dest(),
                positions: next.positions().to_vec(),
                goal: next.goal(),
                failed: self.failed,
                finished: self.finished,
                sprinting: self.sprinting,
                safe_to_cancel: self.safe_to_cancel,
                ticks_remaining: next.ticks_remaining(),
                snipsnap: false,
                spliceable: false,
                tick_calls: self.tick_calls,
            });
        }
        self
    }
}

pub(crate) struct FakeExecutorFactory;

impl PathExecutorFactory for FakeExecutorFactory {
    fn build(&self, path: Path) -> Box<dyn PathExecutor> {
        let mut executor = FakeExecutor::new(path.src, path.dest, path.nodes);
        executor.goal = path.goal;
        Box::new(executor)
    }
}

/// A [`Searcher`] that returns a single pre-scripted [`SearchResult`] the
/// first time `calculate` is called.
pub(crate) struct FakeSearcher {
    start: BlockPos,
    goal: Goal,
    best_so_far: Mutex<Option<Path>>,
    result: Mutex<Option<SearchResult>>,
    cancelled: AtomicBool,
}

impl FakeSearcher {
    pub fn new(start: BlockPos, goal: Goal, result: SearchResult) -> Self {
        Self {
            start,
            goal,
            best_so_far: Mutex::new(None),
            result: Mutex::new(Some(result)),
            cancelled: AtomicBool::new(false),
        }
    }

    pub fn with_best_so_far(self, best: Path) -> Self {
        *self.best_so_far.lock() = Some(best);
        self
    }

    pub fn was_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Relaxed)
    }
}

impl Searcher for FakeSearcher {
    fn start(&self) -> BlockPos {
        self.start
    }

    fn goal(&self) -> Goal {
        self.goal.clone()
    }

    fn best_so_far(&self) -> Option<Path> {
        self.best_so_far.lock().clone()
    }

    fn cancel(&self) {
        self.cancelled.store(true, Ordering::Relaxed);
    }

    fn calculate(&self, _primary_timeout: Duration, _failure_timeout: Duration) -> SearchResult {
        self.result
            .lock()
            .take()
            .unwrap_or(SearchResult::Failure(crate::searcher::SearchFailure::NoPath))
    }
}

/// Hands out one pre-scripted [`SearchResult`] per `build` call, in the
/// order they were queued; panics if exhausted (every test should queue
/// exactly as many as it expects searches to be launched).
#[derive(Default)]
pub(crate) struct FakeSearcherFactory {
    results: Mutex<Vec<SearchResult>>,
}

impl FakeSearcherFactory {
    pub fn new(results: Vec<SearchResult>) -> Self {
        // Queued front-to-back; `pop()` takes from the back, so reverse.
        let mut results = results;
        results.reverse();
        Self {
            results: Mutex::new(results),
        }
    }
}

impl SearcherFactory for FakeSearcherFactory {
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
            .unwrap_or(SearchResult::Failure(crate::searcher::SearchFailure::NoPath));
        Box::new(FakeSearcher::new(start, goal, result))
    }
}

/// A [`Process`] whose `on_tick` answer is pre-scripted per call (cycling
/// the last entry once exhausted, so a test can queue `[Defer]` for a
/// process that should always defer).
pub(crate) struct FakeProcess {
    pub name: String,
    pub active: bool,
    pub temporary: bool,
    pub priority: f64,
    commands: Mutex<Vec<Option<PathingCommand>>>,
    call_count: AtomicUsize,
    release_calls: AtomicUsize,
}

impl FakeProcess {
    pub fn new(name: &str, priority: f64, commands: Vec<Option<PathingCommand>>) -> Self {
        Self {
            name: name.to_string(),
            active: true,
            temporary: false,
            priority,
            commands: Mutex::new(commands),
            call_count: AtomicUsize::new(0),
            release_calls: AtomicUsize::new(0),
        }
    }

    pub fn temporary(mut self) -> Self {
        self.temporary = true;
        self
    }

    pub fn release_calls(&self) -> usize {
        self.release_calls.load(Ordering::Relaxed)
    }

    pub fn call_count(&self) -> usize {
        self.call_count.load(Ordering::Relaxed)
    }
}

impl Process for FakeProcess {
    fn is_active(&self) -> bool {
        self.active
    }

    fn is_temporary(&self) -> bool {
        self.temporary
    }

    fn priority(&self) -> f64 {
        self.priority
    }

    fn on_tick(&self, _calc_failed_last_tick: bool, _safe_to_cancel: bool) -> Option<PathingCommand> {
        self.call_count.fetch_add(1, Ordering::Relaxed);
        let mut commands = self.commands.lock();
        if commands.is_empty() {
            return None;
        }
        if commands.len() == 1 {
            commands[0].clone()
        } else {
            commands.remove(0)
        }
    }

    fn release(&self) {
        self.release_calls.fetch_add(1, Ordering::Relaxed);
    }

    fn display_name(&self) -> &str {
        &self.name
    }
}
