//! `PathingCore`: the per-tick state machine that owns `PathStore`
//! and drives searches, executors, and the `EventBus`.
//!
//! Methods that may spawn a worker-thread search take `self: &Arc<Self>` —
//! the spawned task needs a `'static` handle back into the store and event
//! sender, and threading an `Arc` through is simpler than giving
//! `PathingCore` a self-referential weak pointer. The arbiter is never
//! stored on `PathingCore` — that would create a reference cycle — it's
//! passed in by reference at each tick instead.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use bevy_tasks::{AsyncComputeTaskPool, TaskPool};
use parking_lot::Mutex;
use pathkeeper_core::BlockPos;

use crate::context::{ElytraSafety, GameEventHandler, InputSink, PlayerContext, WorldView};
use crate::errors::{fail_fast, ContractViolation};
use crate::event::{EventBus, PathEvent};
use crate::executor::PathExecutorFactory;
use crate::goal::Goal;
use crate::path::Path;
use crate::searcher::{SearchFailure, SearchResult, SearcherFactory};
use crate::settings::{Settings, SettingsSnapshot};
use crate::start_resolver::StartResolver;
use crate::store::{ActiveSearch, PathFields, PathStore};

/// Whether this tick belongs to a loaded/connected world (`In`) or the game
/// loop is tearing down (`Out`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickPhase {
    In,
    Out,
}

struct EtaBaseline {
    start: BlockPos,
}

pub struct PathingCore {
    pub(crate) store: PathStore,
    events: EventBus,
    settings: Arc<Settings>,

    player: Arc<dyn PlayerContext>,
    world: Arc<dyn WorldView>,
    input: Arc<dyn InputSink>,
    elytra: Arc<dyn ElytraSafety>,
    searcher_factory: Arc<dyn SearcherFactory>,
    executor_factory: Arc<dyn PathExecutorFactory>,
    game_handler: Arc<dyn GameEventHandler>,

    pause_requested: AtomicBool,
    cancel_requested: AtomicBool,
    was_unpaused_last_tick: AtomicBool,
    calc_failed_last_tick: AtomicBool,
    safe_to_cancel_last: AtomicBool,
    ticks_since_eta_baseline: AtomicU64,
    eta_baseline: Mutex<Option<EtaBaseline>>,
}

impl PathingCore {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        settings: Arc<Settings>,
        player: Arc<dyn PlayerContext>,
        world: Arc<dyn WorldView>,
        input: Arc<dyn InputSink>,
        elytra: Arc<dyn ElytraSafety>,
        searcher_factory: Arc<dyn SearcherFactory>,
        executor_factory: Arc<dyn PathExecutorFactory>,
        game_handler: Arc<dyn GameEventHandler>,
    ) -> Arc<Self> {
        Arc::new(Self {
            store: PathStore::new(),
            events: EventBus::new(),
            settings,
            player,
            world,
            input,
            elytra,
            searcher_factory,
            executor_factory,
            game_handler,
            pause_requested: AtomicBool::new(false),
            cancel_requested: AtomicBool::new(false),
            was_unpaused_last_tick: AtomicBool::new(true),
            calc_failed_last_tick: AtomicBool::new(false),
            safe_to_cancel_last: AtomicBool::new(true),
            ticks_since_eta_baseline: AtomicU64::new(0),
            eta_baseline: Mutex::new(None),
        })
    }

    // ---- Accessors used by ControlArbiter and tests ------------------

    pub fn goal(&self) -> Option<Goal> {
        self.store.lock_path().goal.clone()
    }

    pub fn set_goal(&self, goal: Option<Goal>) {
        self.store.lock_path().goal = goal;
    }

    pub fn current_dest(&self) -> Option<BlockPos> {
        self.store.lock_path().current.as_ref().map(|c| c.dest())
    }

    pub fn request_pause(&self) {
        self.pause_requested.store(true, Ordering::Relaxed);
    }

    pub fn calc_failed_last_tick(&self) -> bool {
        self.calc_failed_last_tick.load(Ordering::Relaxed)
    }

    pub fn settings_snapshot(&self) -> SettingsSnapshot {
        self.settings.snapshot()
    }

    /// The last executor-reported value if a
    /// `current` executor exists, otherwise deferred to the elytra
    /// subsystem's own flag.
    pub fn is_safe_to_cancel(&self) -> bool {
        if self.store.lock_path().current.is_some() {
            self.safe_to_cancel_last.load(Ordering::Relaxed)
        } else {
            !self.elytra.is_active() || self.elytra.is_safe_to_cancel()
        }
    }

    /// Soft cancel: only takes effect once `is_safe_to_cancel` is true.
    pub fn soft_cancel_if_safe(&self) {
        if self.is_safe_to_cancel() {
            self.cancel_requested.store(true, Ordering::Relaxed);
        }
    }

    /// Force cancel: ignores the safety predicate.
    pub fn force_cancel(&self) {
        self.cancel_requested.store(true, Ordering::Relaxed);
    }

    /// Revalidation formulas, exposed directly so they're testable without driving
    /// a whole tick.
    pub fn requires_force_revalidation(&self, new_goal: &Goal) -> bool {
        let path = self.store.lock_path();
        match &path.current {
            Some(current) => {
                !new_goal.is_in_goal(current.dest()) && *new_goal != current.goal()
            }
            None => false,
        }
    }

    pub fn requires_goal_revalidation(&self, new_goal: &Goal) -> bool {
        let path = self.store.lock_path();
        match &path.current {
            Some(current) => {
                current.goal().is_in_goal(current.dest()) && !new_goal.is_in_goal(current.dest())
            }
            None => false,
        }
    }

    /// Estimated ticks to goal: `None` if no baseline, no elapsed ticks, or a zero
    /// denominator.
    pub fn estimated_ticks_to_goal(&self) -> Option<f64> {
        let elapsed = self.ticks_since_eta_baseline.load(Ordering::Relaxed);
        if elapsed == 0 {
            return None;
        }
        let baseline = self.eta_baseline.lock();
        let baseline = baseline.as_ref()?;
        let goal = self.store.lock_path().goal.clone()?;

        let feet = self.player.player_feet();
        if goal.is_in_goal(feet) {
            return Some(0.0);
        }
        let h_feet = goal.heuristic(feet);
        let h_residual = goal.residual_cost();
        let h_start = goal.heuristic(baseline.start);
        let denom = h_start - h_feet;
        if denom == 0.0 {
            return None;
        }
        Some((h_feet - h_residual).abs() * elapsed as f64 / denom.abs())
    }

    fn emit(&self, event: PathEvent) {
        let _ = self.events.sender().send(event);
    }

    // ---- Per-tick algorithm -------------------------------------------

    pub fn tick(self: &Arc<Self>, arbiter: &crate::arbiter::ControlArbiter, phase: TickPhase) {
        let first_drain_had_failure = self.drain_and_dispatch();

        if phase == TickPhase::Out {
            self.cancel_segment();
            arbiter.terminate_all_processes();
            self.calc_failed_last_tick
                .store(first_drain_had_failure, Ordering::Relaxed);
            return;
        }

        let player_block = StartResolver::path_start(self.world.as_ref(), self.player.as_ref());
        self.store.lock_path().expected_start = Some(player_block);

        arbiter.pre_tick(self);

        self.update_path();

        self.ticks_since_eta_baseline
            .fetch_add(1, Ordering::Relaxed);

        let second_drain_had_failure = self.drain_and_dispatch();
        self.calc_failed_last_tick.store(
            first_drain_had_failure || second_drain_had_failure,
            Ordering::Relaxed,
        );
    }

    pub fn post_tick(self: &Arc<Self>, arbiter: &crate::arbiter::ControlArbiter) {
        arbiter.post_tick(self);
    }

    /// Drains the `EventBus`, forwards every event to the game handler, and
    /// reports whether `CALC_FAILED` was among them.
    fn drain_and_dispatch(&self) -> bool {
        let drained = self.events.drain();
        let had_failure = drained.iter().any(|e| *e == PathEvent::CalcFailed);
        for event in drained {
            self.game_handler.handle(event);
        }
        had_failure
    }

    /// Tick-phase OUT: synchronous, unconditional teardown (no
    /// `update_path` call will run this tick to react to `cancel_requested`,
    /// so everything happens right here).
    fn cancel_segment(&self) {
        self.clear_segment_state();
    }

    fn clear_segment_state(&self) {
        let mut path = self.store.lock_path();
        let had_current = path.current.is_some();
        path.current = None;
        path.next = None;
        drop(path);

        let mut calc = self.store.lock_calc();
        if let Some(search) = calc.take() {
            search.searcher.cancel();
        }
        drop(calc);

        self.input.clear_all_keys();
        self.input.stop_breaking_block();

        if had_current {
            self.emit(PathEvent::Canceled);
        }
    }

    fn update_path(self: &Arc<Self>) {
        if self.cancel_requested.swap(false, Ordering::Relaxed) {
            self.clear_segment_state();
            return;
        }

        if self.pause_requested.load(Ordering::Relaxed) {
            if self.is_safe_to_cancel() {
                self.pause_requested.store(false, Ordering::Relaxed);
                if self.was_unpaused_last_tick.swap(false, Ordering::Relaxed) {
                    self.input.clear_all_keys();
                    self.input.stop_breaking_block();
                    let player_block = self.player.player_feet();
                    self.store.handle_pause_resume(player_block);
                }
                return;
            }
        }
        self.was_unpaused_last_tick.store(true, Ordering::Relaxed);

        let snapshot = self.settings.snapshot();

        let mut path = self.store.lock_path();
        self.validate_active_search(&mut path);

        if path.current.is_none() {
            self.maybe_launch_fresh_search(&mut path, &snapshot);
            return;
        }

        let safe_to_cancel = path.current.as_mut().unwrap().tick();
        self.safe_to_cancel_last
            .store(safe_to_cancel, Ordering::Relaxed);
        self.dispatch_completion(&mut path, safe_to_cancel, &snapshot);
    }

    /// Enforced actively: the only state in which a fresh
    /// (non-plan-ahead) search may be launched.
    fn maybe_launch_fresh_search(self: &Arc<Self>, path: &mut PathFields, snapshot: &SettingsSnapshot) {
        if self.store.lock_calc().is_some() {
            return;
        }
        let Some(goal) = path.goal.clone() else {
            return;
        };
        let Some(expected_start) = path.expected_start else {
            return;
        };
        if goal.is_in_goal(expected_start) {
            return;
        }
        self.launch_search(Some(expected_start), true, None, snapshot);
    }

    /// Lock ordering: `path` is already locked; `validate_active_search`
    /// acquires `calc_lock` second.
    fn validate_active_search(&self, path: &mut PathFields) {
        let feet = self.player.player_feet();
        let mut calc = self.store.lock_calc();
        let Some(search) = calc.as_ref() else {
            return;
        };
        let search_start = search.expected_start_of_search;

        let current_dest_mismatches = match &path.current {
            None => true,
            Some(exec) => exec.dest() != search_start,
        };
        if !current_dest_mismatches {
            return;
        }
        if search_start == feet {
            return;
        }
        if Some(search_start) == path.expected_start {
            return;
        }
        let best_so_far_has_anchor = search
            .searcher
            .best_so_far()
            .map(|p| {
                p.contains(feet) || path.expected_start.map(|es| p.contains(es)).unwrap_or(false)
            })
            .unwrap_or(false);
        if best_so_far_has_anchor {
            return;
        }

        let search = calc.take().expect("Some checked above");
        search.searcher.cancel();
    }

    /// Completion handling for the current executor, run once
    /// `current` is known to exist.
    fn dispatch_completion(
        self: &Arc<Self>,
        path: &mut PathFields,
        safe_to_cancel: bool,
        snapshot: &SettingsSnapshot,
    ) {
        loop {
            let current = path
                .current
                .as_ref()
                .expect("dispatch_completion requires current");
            if !current.failed() && !current.finished() {
                self.handle_ongoing(path, safe_to_cancel, snapshot);
                return;
            }

            let feet = self.player.player_feet();
            let goal_reached = match &path.goal {
                None => true,
                Some(g) => g.is_in_goal(feet),
            };
            if goal_reached {
                self.reached_goal(path, snapshot);
                return;
            }

            let next_valid = path.next.as_ref().map(|n| {
                n.positions().contains(&feet)
                    || path
                        .expected_start
                        .map(|es| n.positions().contains(&es))
                        .unwrap_or(false)
            });

            match next_valid {
                Some(false) => {
                    path.next = None;
                    self.emit(PathEvent::DiscardNext);
                    continue;
                }
                Some(true) => {
                    self.continue_to_next(path);
                    return;
                }
                None => {
                    path.current = None;
                    self.input.clear_all_keys();
                    self.input.stop_breaking_block();
                    let start = path.expected_start;
                    self.launch_search(start, true, None, snapshot);
                    return;
                }
            }
        }
    }

    fn reached_goal(&self, path: &mut PathFields, snapshot: &SettingsSnapshot) {
        self.emit(PathEvent::AtGoal);
        path.current = None;
        path.next = None;
        self.input.clear_all_keys();
        self.input.stop_breaking_block();
        if snapshot.disconnect_on_arrival {
            self.player.disconnect();
        }
    }

    fn continue_to_next(&self, path: &mut PathFields) {
        self.emit(PathEvent::ContinuingOntoPlannedNext);
        path.current = path.next.take();
        // The original assigns `current := current` here
        // after promoting `next`; treated as a no-op, same as upstream.
        if let Some(current) = path.current.as_mut() {
            let safe = current.tick();
            self.safe_to_cancel_last.store(safe, Ordering::Relaxed);
        }
        self.reset_eta_baseline(path);
    }

    fn reset_eta_baseline(&self, path: &PathFields) {
        if let Some(current) = &path.current {
            *self.eta_baseline.lock() = Some(EtaBaseline { start: current.src() });
            self.ticks_since_eta_baseline.store(0, Ordering::Relaxed);
        }
    }

    /// Handling an ongoing executor: early splice, lazy splice, next
    /// deduplication, and plan-ahead dispatch.
    fn handle_ongoing(
        self: &Arc<Self>,
        path: &mut PathFields,
        safe_to_cancel: bool,
        snapshot: &SettingsSnapshot,
    ) {
        if safe_to_cancel {
            if let Some(next) = path.next.as_ref() {
                if next.snipsnap_if_possible() {
                    self.emit(PathEvent::SplicingOntoNextEarly);
                    path.current = path.next.take();
                    if let Some(current) = path.current.as_mut() {
                        let safe = current.tick();
                        self.safe_to_cancel_last.store(safe, Ordering::Relaxed);
                    }
                    self.reset_eta_baseline(path);
                    return;
                }
            }
        }

        if snapshot.splice_path {
            if let Some(current) = path.current.take() {
                let next_ref = path.next.as_deref();
                path.current = Some(current.try_splice(next_ref));
            }
        }

        if let (Some(current), Some(next)) = (path.current.as_ref(), path.next.as_ref()) {
            if next.dest() == current.dest() {
                path.next = None;
            }
        }

        let Some(goal) = path.goal.clone() else {
            return;
        };
        let Some(current) = path.current.as_ref() else {
            return;
        };
        if path.next.is_some() || goal.is_in_goal(current.dest()) {
            return;
        }
        if self.store.lock_calc().is_some() {
            return;
        }
        let ticks_remaining = current.ticks_remaining();
        if (ticks_remaining as i32) >= snapshot.planning_tick_lookahead {
            return;
        }

        let previous = Path {
            nodes: current.positions().to_vec(),
            src: current.src(),
            dest: current.dest(),
            goal: goal.clone(),
            num_nodes_considered: 0,
        };
        let from = current.dest();
        self.launch_search(Some(from), false, Some(previous), snapshot);
    }

    // ---- Launching and completing searches ----------------------------

    fn launch_search(
        self: &Arc<Self>,
        from: Option<BlockPos>,
        primary: bool,
        previous: Option<Path>,
        snapshot: &SettingsSnapshot,
    ) {
        let Some(start) = from else {
            return;
        };
        let Some(goal) = self.store.lock_path().goal.clone() else {
            return;
        };

        let mut calc = self.store.lock_calc();
        if calc.is_some() {
            if primary {
                self.emit(PathEvent::PathFinishedNextStillCalculating);
            }
            return;
        }

        let context = self.player.calculation_context();
        if !context.safe_for_threaded_use {
            fail_fast(ContractViolation::UnsafeCalculationContext);
        }

        let chunk_loaded = self.player.is_chunk_loaded(start.x >> 4, start.z >> 4);
        let search_goal = goal.simplify_for_search(chunk_loaded, snapshot.simplify_unloaded_y);

        self.emit(if primary {
            PathEvent::CalcStarted
        } else {
            PathEvent::NextSegmentCalcStarted
        });

        let (primary_timeout, failure_timeout) = if primary {
            (
                Duration::from_millis(snapshot.primary_timeout_ms),
                Duration::from_millis(snapshot.failure_timeout_ms),
            )
        } else {
            (
                Duration::from_millis(snapshot.plan_ahead_primary_timeout_ms),
                Duration::from_millis(snapshot.plan_ahead_failure_timeout_ms),
            )
        };

        let searcher: Arc<dyn crate::searcher::Searcher> =
            Arc::from(self.searcher_factory.build(start, search_goal, previous, context));

        *calc = Some(ActiveSearch {
            searcher: searcher.clone(),
            expected_start_of_search: start,
            primary,
        });
        drop(calc);

        self.dispatch_search(searcher, start, primary, primary_timeout, failure_timeout);
    }

    fn dispatch_search(
        self: &Arc<Self>,
        searcher: Arc<dyn crate::searcher::Searcher>,
        launch_start: BlockPos,
        primary: bool,
        primary_timeout: Duration,
        failure_timeout: Duration,
    ) {
        let core = Arc::clone(self);
        let executor_factory = Arc::clone(&self.executor_factory);
        // This crate is handed to arbitrary embedders rather than running
        // only inside a full Bevy `App` (whose `TaskPoolPlugin` would
        // initialize this at startup), so the pool is lazily initialized
        // here rather than assumed to already exist.
        let pool = AsyncComputeTaskPool::get_or_init(TaskPool::new);
        pool.spawn(async move {
            let result = searcher.calculate(primary_timeout, failure_timeout);
            core.complete_search(result, launch_start, primary, executor_factory.as_ref());
        })
        .detach();
    }

    /// Completion handler, run on the worker thread. Locks `path_lock`
    /// then `calc_lock`, same order as every other entry point.
    fn complete_search(
        &self,
        result: SearchResult,
        launch_start: BlockPos,
        primary: bool,
        executor_factory: &dyn PathExecutorFactory,
    ) {
        let mut path = self.store.lock_path();
        let mut calc = self.store.lock_calc();

        if primary {
            if path.current.is_some() {
                log::warn!("orphaned initial search result: current already set");
            } else {
                match result {
                    SearchResult::Success(found) if Some(found.src) == path.expected_start => {
                        log::debug!(
                            "path found, {} nodes considered",
                            found.num_nodes_considered
                        );
                        self.emit(PathEvent::CalcFinishedNowExecuting);
                        let start = found.src;
                        path.current = Some(executor_factory.build(found));
                        self.eta_baseline_store(start);
                    }
                    SearchResult::Success(found) => {
                        log::warn!(
                            "discarding orphaned initial path: src {:?} != expected_start {:?}",
                            found.src,
                            path.expected_start
                        );
                    }
                    SearchResult::Failure(SearchFailure::Cancellation) => {
                        log::debug!("initial search cancelled");
                    }
                    SearchResult::Failure(failure) => {
                        log::debug!("initial search failed: {failure:?}");
                        self.emit(PathEvent::CalcFailed);
                    }
                }
            }
        } else {
            match (&path.current, path.next.is_some()) {
                (Some(current), false) => match result {
                    SearchResult::Success(found) if found.src == current.dest() => {
                        log::debug!(
                            "plan-ahead path found, {} nodes considered",
                            found.num_nodes_considered
                        );
                        self.emit(PathEvent::NextSegmentCalcFinished);
                        path.next = Some(executor_factory.build(found));
                    }
                    SearchResult::Success(found) => {
                        log::warn!(
                            "discarding orphaned plan-ahead path: src {:?} != current.dest {:?}",
                            found.src,
                            current.dest()
                        );
                    }
                    SearchResult::Failure(SearchFailure::Cancellation) => {
                        log::debug!("plan-ahead search cancelled");
                    }
                    SearchResult::Failure(failure) => {
                        log::debug!("plan-ahead search failed: {failure:?}");
                        self.emit(PathEvent::NextCalcFailed);
                    }
                },
                (Some(_), true) => {
                    fail_fast(ContractViolation::DuplicatePlanAheadResult);
                }
                (None, _) => {
                    log::warn!("plan-ahead result arrived with no current executor; discarding");
                }
            }
        }

        // The active_search slot belongs to this completion regardless of
        // outcome (only one search is ever in flight at a time).
        *calc = None;
    }

    fn eta_baseline_store(&self, start: BlockPos) {
        *self.eta_baseline.lock() = Some(EtaBaseline { start });
        self.ticks_since_eta_baseline.store(0, Ordering::Relaxed);
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use pathkeeper_core::BlockPos;

    use super::*;
    use crate::goal::Goal;
    use crate::searcher::{SearchFailure, SearchResult};
    use crate::testutil::{
        FakeElytraSafety, FakeExecutor, FakeExecutorFactory, FakeGameEventHandler, FakeInputSink,
        FakePlayerContext, FakeSearcherFactory, FakeWorld,
    };

    fn build_core(player: FakePlayerContext) -> (Arc<PathingCore>, Arc<FakeGameEventHandler>) {
        let settings = Arc::new(Settings::default());
        let world: Arc<dyn WorldView> = Arc::new(FakeWorld::default());
        let input: Arc<dyn InputSink> = Arc::new(FakeInputSink::default());
        let elytra: Arc<dyn ElytraSafety> = Arc::new(FakeElytraSafety {
            active: false,
            safe_to_cancel: true,
        });
        let searcher_factory: Arc<dyn SearcherFactory> = Arc::new(FakeSearcherFactory::new(vec![]));
        let executor_factory: Arc<dyn PathExecutorFactory> = Arc::new(FakeExecutorFactory);
        let game_handler = Arc::new(FakeGameEventHandler::default());
        let core = PathingCore::new(
            settings,
            Arc::new(player),
            world,
            input,
            elytra,
            searcher_factory,
            executor_factory,
            Arc::clone(&game_handler) as Arc<dyn GameEventHandler>,
        );
        (core, game_handler)
    }

    /// Goal already satisfied at the expected start, so no
    /// search is launched and `current` stays `None`.
    #[test]
    fn goal_already_reached_launches_no_search() {
        let feet = BlockPos::new(0, 0, 0);
        let (core, _events) = build_core(FakePlayerContext::standing_at(feet));
        core.set_goal(Some(Goal::Block(feet)));
        core.store.lock_path().expected_start = Some(feet);

        core.update_path();

        assert!(core.store.lock_path().current.is_none());
        assert!(core.store.lock_calc().is_none());
    }

    /// A search result whose `src` disagrees with
    /// `expected_start` is discarded, `current` stays `None`, and no
    /// `CALC_FINISHED_NOW_EXECUTING` is emitted.
    #[test]
    fn orphan_initial_result_is_discarded() {
        let feet = BlockPos::new(5, 64, 5);
        let (core, events) = build_core(FakePlayerContext::standing_at(feet));
        core.store.lock_path().expected_start = Some(BlockPos::new(5, 64, 5));

        let orphan = Path {
            nodes: vec![BlockPos::new(6, 64, 5), BlockPos::new(7, 64, 5)],
            src: BlockPos::new(6, 64, 5),
            dest: BlockPos::new(7, 64, 5),
            goal: Goal::Block(BlockPos::new(10, 64, 5)),
            num_nodes_considered: 4,
        };
        core.complete_search(
            SearchResult::Success(orphan),
            BlockPos::new(5, 64, 5),
            true,
            &FakeExecutorFactory,
        );

        assert!(core.store.lock_path().current.is_none());
        assert!(core.store.lock_calc().is_none());
        core.drain_and_dispatch();
        assert!(!events
            .events()
            .contains(&PathEvent::CalcFinishedNowExecuting));
    }

    /// A search result matching `expected_start` is
    /// accepted and emits `CALC_FINISHED_NOW_EXECUTING`.
    #[test]
    fn matching_initial_result_becomes_current() {
        let feet = BlockPos::new(5, 64, 5);
        let (core, events) = build_core(FakePlayerContext::standing_at(feet));
        core.store.lock_path().expected_start = Some(BlockPos::new(5, 64, 5));

        let found = Path {
            nodes: vec![BlockPos::new(5, 64, 5), BlockPos::new(10, 64, 5)],
            src: BlockPos::new(5, 64, 5),
            dest: BlockPos::new(10, 64, 5),
            goal: Goal::Block(BlockPos::new(10, 64, 5)),
            num_nodes_considered: 4,
        };
        core.complete_search(
            SearchResult::Success(found),
            BlockPos::new(5, 64, 5),
            true,
            &FakeExecutorFactory,
        );

        assert!(core.store.lock_path().current.is_some());
        core.drain_and_dispatch();
        assert!(events
            .events()
            .contains(&PathEvent::CalcFinishedNowExecuting));
    }

    /// A plan-ahead search's successful result is
    /// installed as `next` once `current.dest` matches its `src`.
    #[test]
    fn plan_ahead_result_becomes_next_and_then_continues() {
        let feet = BlockPos::new(0, 64, 0);
        let (core, events) = build_core(FakePlayerContext::standing_at(feet));

        let mut current = FakeExecutor::new(
            BlockPos::new(0, 64, 0),
            BlockPos::new(20, 64, 5),
            vec![BlockPos::new(20, 64, 5)],
        );
        current.finished = true;
        core.store.lock_path().current = Some(Box::new(current));
        core.store.lock_path().goal = Some(Goal::Block(BlockPos::new(30, 64, 5)));
        // `next`'s positions include the segment boundary, not the
        // player's actual feet, so `next_is_valid` needs `expected_start`
        // to be the anchor that makes it valid.
        core.store.lock_path().expected_start = Some(BlockPos::new(20, 64, 5));

        let planned = Path {
            nodes: vec![BlockPos::new(20, 64, 5), BlockPos::new(30, 64, 5)],
            src: BlockPos::new(20, 64, 5),
            dest: BlockPos::new(30, 64, 5),
            goal: Goal::Block(BlockPos::new(30, 64, 5)),
            num_nodes_considered: 9,
        };
        core.complete_search(
            SearchResult::Success(planned),
            BlockPos::new(20, 64, 5),
            false,
            &FakeExecutorFactory,
        );

        assert!(core.store.lock_path().next.is_some());
        core.drain_and_dispatch();
        assert!(events
            .events()
            .contains(&PathEvent::NextSegmentCalcFinished));

        // The current segment is finished; dispatch_completion should
        // promote `next` to `current`.
        let snapshot = core.settings.snapshot();
        let mut path = core.store.lock_path();
        core.dispatch_completion(&mut path, true, &snapshot);
        drop(path);

        let path = core.store.lock_path();
        assert_eq!(path.current.as_ref().unwrap().dest(), BlockPos::new(30, 64, 5));
        assert!(path.next.is_none());
        drop(path);
        core.drain_and_dispatch();
        assert!(events
            .events()
            .contains(&PathEvent::ContinuingOntoPlannedNext));
    }

    /// While paused and safe to cancel, `current`/`next`
    /// clear, the active search is cancelled, and `expected_start` resets
    /// to the player's block.
    #[test]
    fn pause_clears_segment_state_and_resets_expected_start() {
        let feet = BlockPos::new(7, 64, 5);
        let (core, _events) = build_core(FakePlayerContext::standing_at(feet));

        let current = FakeExecutor::new(
            BlockPos::new(0, 64, 0),
            BlockPos::new(20, 64, 5),
            vec![BlockPos::new(20, 64, 5)],
        );
        let next = FakeExecutor::new(
            BlockPos::new(20, 64, 5),
            BlockPos::new(30, 64, 5),
            vec![BlockPos::new(30, 64, 5)],
        );
        core.store.lock_path().current = Some(Box::new(current));
        core.store.lock_path().next = Some(Box::new(next));

        core.request_pause();
        core.update_path();

        let path = core.store.lock_path();
        assert!(path.current.is_none());
        assert!(path.next.is_none());
        assert_eq!(path.expected_start, Some(feet));
        drop(path);
        assert!(core.store.lock_calc().is_none());
    }

    /// With no `current` executor, `is_safe_to_cancel` defers
    /// entirely to the elytra subsystem's own flag.
    #[test]
    fn safe_to_cancel_defers_to_elytra_when_no_current() {
        let feet = BlockPos::new(0, 64, 0);
        let settings = Arc::new(Settings::default());
        let world: Arc<dyn WorldView> = Arc::new(FakeWorld::default());
        let input: Arc<dyn InputSink> = Arc::new(FakeInputSink::default());
        let elytra: Arc<dyn ElytraSafety> = Arc::new(FakeElytraSafety {
            active: true,
            safe_to_cancel: false,
        });
        let searcher_factory: Arc<dyn SearcherFactory> = Arc::new(FakeSearcherFactory::new(vec![]));
        let executor_factory: Arc<dyn PathExecutorFactory> = Arc::new(FakeExecutorFactory);
        let game_handler: Arc<dyn GameEventHandler> = Arc::new(FakeGameEventHandler::default());
        let core = PathingCore::new(
            settings,
            Arc::new(FakePlayerContext::standing_at(feet)),
            world,
            input,
            elytra,
            searcher_factory,
            executor_factory,
            game_handler,
        );

        assert!(!core.is_safe_to_cancel());
    }

    /// ETA: no baseline yet means `None`.
    #[test]
    fn eta_is_none_before_any_elapsed_ticks() {
        let feet = BlockPos::new(0, 64, 0);
        let (core, _events) = build_core(FakePlayerContext::standing_at(feet));
        core.set_goal(Some(Goal::Block(BlockPos::new(10, 64, 0))));

        assert_eq!(core.estimated_ticks_to_goal(), None);
    }

    /// ETA: once in the goal, ETA is exactly zero.
    #[test]
    fn eta_is_zero_once_in_goal() {
        let feet = BlockPos::new(10, 64, 0);
        let (core, _events) = build_core(FakePlayerContext::standing_at(feet));
        core.set_goal(Some(Goal::Block(feet)));
        core.eta_baseline_store(BlockPos::new(0, 64, 0));
        core.ticks_since_eta_baseline.store(5, Ordering::Relaxed);

        assert_eq!(core.estimated_ticks_to_goal(), Some(0.0));
    }
}
