//! `ControlArbiter`: per-tick selection of the controlling process and
//! translation of its [`PathingCommand`] into core operations.
//!
//! Active-process ordering uses `priority_queue::PriorityQueue` with a
//! `Weight` newtype (`Ord` via `partial_cmp`) for an `f64`-like weight that
//! isn't itself `Ord`. Ties are broken by front-of-list position so the
//! result is a genuinely stable descending sort, rather than the arbitrary
//! tie order a bare `BinaryHeap` would give.

use std::cmp::Reverse;
use std::fmt::Debug;
use std::sync::Arc;

use parking_lot::Mutex;
use priority_queue::PriorityQueue;

use crate::core::PathingCore;
use crate::errors::{fail_fast, ContractViolation};
use crate::goal::Goal;
use crate::process::{PathingCommand, Process};

/// `f64`-backed priority, made `Ord` by falling back to `Equal` on NaN
/// rather than panicking, since `Ord` can't be implemented honestly for
/// floats that admit NaN.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Weight(f64);

impl Eq for Weight {}

impl PartialOrd for Weight {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        self.0.partial_cmp(&other.0)
    }
}

impl Ord for Weight {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.0.partial_cmp(&other.0).unwrap_or(std::cmp::Ordering::Equal)
    }
}

struct PendingRevalidation {
    new_goal: Goal,
    force: bool,
}

/// Maintains the set of registered processes and, each tick, arbitrates
/// which one is in control.
pub struct ControlArbiter {
    processes: Mutex<Vec<Arc<dyn Process>>>,
    /// The ordered active list, front-to-back, as of the most recent
    /// `pre_tick` (after step 2's insert-at-front and step 3's stable sort).
    active: Mutex<Vec<Arc<dyn Process>>>,
    previous_controlling: Mutex<Option<Arc<dyn Process>>>,
    current_controlling: Mutex<Option<Arc<dyn Process>>>,
    pending_revalidation: Mutex<Option<PendingRevalidation>>,
}

impl ControlArbiter {
    pub fn new() -> Self {
        Self {
            processes: Mutex::new(Vec::new()),
            active: Mutex::new(Vec::new()),
            previous_controlling: Mutex::new(None),
            current_controlling: Mutex::new(None),
            pending_revalidation: Mutex::new(None),
        }
    }

    /// Registers a process as a competitor for control. Registration is
    /// permanent for the arbiter's lifetime; `Process::is_active` governs
    /// whether it's considered each tick.
    pub fn register(&self, process: Arc<dyn Process>) {
        self.processes.lock().push(process);
    }

    /// The process presently in control, if any.
    pub fn current_controlling(&self) -> Option<Arc<dyn Process>> {
        self.current_controlling.lock().clone()
    }

    /// Runs before `PathingCore::update_path` each `In`-phase tick.
    pub fn pre_tick(&self, core: &PathingCore) {
        // Step 1.
        let previous = self.current_controlling.lock().take();
        *self.previous_controlling.lock() = previous.clone();

        self.update_active_list();
        let ordered = self.sort_active_by_priority();

        // Step 4.
        let calc_failed_last_tick = core.calc_failed_last_tick();
        let safe_to_cancel = core.is_safe_to_cancel();

        let mut winner: Option<(usize, Arc<dyn Process>, PathingCommand)> = None;
        for (index, process) in ordered.iter().enumerate() {
            let was_in_control_last_tick = previous
                .as_ref()
                .is_some_and(|p| Arc::ptr_eq(p, process));
            let command = process.on_tick(
                was_in_control_last_tick && calc_failed_last_tick,
                safe_to_cancel,
            );
            match command {
                None => {
                    if process.is_active() {
                        fail_fast(ContractViolation::ActiveProcessReturnedNone(
                            process.display_name().to_string(),
                        ));
                    }
                }
                Some(PathingCommand::Defer) => continue,
                Some(command) => {
                    winner = Some((index, Arc::clone(process), command));
                    break;
                }
            }
        }

        *self.active.lock() = ordered.clone();

        let Some((winner_index, winning_process, command)) = winner else {
            // Step 5: nobody wants control this tick.
            core.soft_cancel_if_safe();
            core.set_goal(None);
            return;
        };

        if !winning_process.is_temporary() {
            for process in ordered.iter().skip(winner_index + 1) {
                process.release();
            }
        }

        *self.current_controlling.lock() = Some(Arc::clone(&winning_process));

        // Step 6: displacing a different non-temporary incumbent cancels
        // its segment, unless the new command is just a pause request.
        let controlling_changed = match &previous {
            Some(prev) => !Arc::ptr_eq(prev, &winning_process),
            None => true,
        };
        if controlling_changed
            && !matches!(command, PathingCommand::RequestPause)
            && previous.as_ref().is_some_and(|p| !p.is_temporary())
        {
            core.soft_cancel_if_safe();
        }

        // Step 7.
        self.dispatch(core, command);
    }

    /// Post-tick: re-validate a pending `REVALIDATE_GOAL_AND_PATH` /
    /// `FORCE_REVALIDATE_GOAL_AND_PATH` against the path the tick just
    /// produced.
    pub fn post_tick(&self, core: &PathingCore) {
        let Some(pending) = self.pending_revalidation.lock().take() else {
            return;
        };
        let mismatched = core.requires_force_revalidation(&pending.new_goal);
        if pending.force {
            if mismatched {
                core.soft_cancel_if_safe();
            }
        } else if mismatched && core.settings_snapshot().cancel_on_goal_invalidation {
            core.soft_cancel_if_safe();
        }
    }

    /// Tick-phase `Out` teardown: release every registered process and
    /// reset arbitration state.
    pub fn terminate_all_processes(&self) {
        for process in self.processes.lock().iter() {
            process.release();
        }
        self.active.lock().clear();
        *self.previous_controlling.lock() = None;
        *self.current_controlling.lock() = None;
        *self.pending_revalidation.lock() = None;
    }

    fn dispatch(&self, core: &PathingCore, command: PathingCommand) {
        match command {
            PathingCommand::SetGoalAndPath(goal) => {
                core.set_goal(Some(goal));
            }
            PathingCommand::SetGoalAndPause(goal) => {
                core.set_goal(Some(goal));
                core.request_pause();
            }
            PathingCommand::RequestPause => {
                core.request_pause();
            }
            PathingCommand::CancelAndSetGoal(goal) => {
                core.set_goal(Some(goal));
                core.soft_cancel_if_safe();
            }
            PathingCommand::RevalidateGoalAndPath(goal) => {
                core.set_goal(Some(goal.clone()));
                *self.pending_revalidation.lock() = Some(PendingRevalidation {
                    new_goal: goal,
                    force: false,
                });
            }
            PathingCommand::ForceRevalidateGoalAndPath(goal) => {
                core.set_goal(Some(goal.clone()));
                *self.pending_revalidation.lock() = Some(PendingRevalidation {
                    new_goal: goal,
                    force: true,
                });
            }
            PathingCommand::Defer => {
                // Unreachable: `pre_tick` never calls `dispatch` with the
                // command that made a process lose consideration.
            }
        }
    }

    /// Activates newly-active registered processes at the front of the
    /// list, drops ones that stopped being active.
    fn update_active_list(&self) {
        let processes = self.processes.lock();
        let mut active = self.active.lock();
        active.retain(|process| process.is_active());
        for process in processes.iter() {
            if process.is_active() && !active.iter().any(|a| Arc::ptr_eq(a, process)) {
                active.insert(0, Arc::clone(process));
            }
        }
    }

    /// Stable descending-priority sort. `seq` is each process's position in
    /// the pre-sort front-to-back list, used as a tie-break so processes
    /// with equal priority keep that relative order — the exact behavior a
    /// stable `sort_by` would give, expressed through `priority_queue`
    /// instead.
    fn sort_active_by_priority(&self) -> Vec<Arc<dyn Process>> {
        let active = self.active.lock();
        let mut queue: PriorityQueue<usize, (Weight, Reverse<usize>)> = PriorityQueue::new();
        for (seq, process) in active.iter().enumerate() {
            queue.push(seq, (Weight(process.priority()), Reverse(seq)));
        }
        let mut ordered = Vec::with_capacity(active.len());
        while let Some((seq, _)) = queue.pop() {
            ordered.push(Arc::clone(&active[seq]));
        }
        ordered
    }
}

impl Default for ControlArbiter {
    fn default() -> Self {
        Self::new()
    }
}
