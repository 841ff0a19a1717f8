//! The `PathExecutor` contract. The executor itself — the thing that drives
//! a [`crate::path::Path`] tick-by-tick and emits low-level input commands —
//! is owned by the embedder; this crate only defines the narrow interface
//! the core drives it through.

use pathkeeper_core::BlockPos;

use crate::goal::Goal;

pub trait PathExecutor: Send {
    /// Advance one game tick. Returns whether it is currently safe to
    /// cancel this executor without leaving the agent somewhere unsafe
    /// (mid-air over a drop, mid-parkour jump, etc).
    fn tick(&mut self) -> bool;

    /// Mutually exclusive with `finished`; once either is true the executor
    /// is done and should not be ticked again.
    fn failed(&self) -> bool;
    fn finished(&self) -> bool;

    fn sprinting(&self) -> bool;

    fn src(&self) -> BlockPos;
    fn dest(&self) -> BlockPos;

    /// The goal this executor's segment was launched to satisfy, carried
    /// over from the `Path` it was built from — distinct from whatever
    /// `PathingCore`'s own goal field holds right now, which may have moved
    /// on without replacing this executor.
    fn goal(&self) -> Goal;

    /// Every block position this executor's underlying path still visits,
    /// used by orphan/validity checks to test whether a position is still
    /// reachable without replanning.
    fn positions(&self) -> &[BlockPos];

    /// Ticks remaining before this executor finishes its segment, used by
    /// `PathingCore`'s plan-ahead lookahead check.
    fn ticks_remaining(&self) -> u32;

    /// Called on the *next* executor: whether it can be entered early from
    /// wherever `current` is right now.
    fn snipsnap_if_possible(&self) -> bool;

    /// Called on `current`: attempt to graft `next`'s path onto this
    /// executor's tail. Returns a spliced executor if grafting succeeded;
    /// otherwise returns `self` unchanged. Idempotent when `next` can't be
    /// grafted.
    fn try_splice(self: Box<Self>, next: Option<&dyn PathExecutor>) -> Box<dyn PathExecutor>;
}

/// Builds a [`PathExecutor`] from a completed [`crate::path::Path`]. The
/// executor's own construction is owned by the embedder, same as the
/// executor itself — this is the symmetric counterpart to `SearcherFactory`
/// on the output side.
pub trait PathExecutorFactory: Send + Sync {
    fn build(&self, path: crate::path::Path) -> Box<dyn PathExecutor>;
}
