//! The `Process` contract and `PathingCommand`.

use crate::goal::Goal;

#[derive(Debug, Clone, PartialEq)]
pub enum PathingCommand {
    SetGoalAndPath(Goal),
    SetGoalAndPause(Goal),
    RequestPause,
    CancelAndSetGoal(Goal),
    RevalidateGoalAndPath(Goal),
    ForceRevalidateGoalAndPath(Goal),
    /// Skip this process, try the next one in priority order.
    Defer,
}

/// A registered competitor for control of the agent.
///
/// `on_tick` returning `None` while [`Process::is_active`] is true is a
/// contract violation — the arbiter fails fast rather than silently
/// treating it as `Defer`, since a process that claims to be active but
/// issues nothing is a bug in that process, not a legitimate "nothing to do
/// right now" (`Defer` exists for that).
pub trait Process: Send + Sync {
    fn is_active(&self) -> bool;
    fn is_temporary(&self) -> bool;
    fn priority(&self) -> f64;
    fn on_tick(&self, calc_failed_last_tick: bool, safe_to_cancel: bool) -> Option<PathingCommand>;
    fn release(&self);
    fn display_name(&self) -> &str;
}
