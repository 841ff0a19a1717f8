//! Narrow collaborator interfaces.
//!
//! The player, the world, the input layer, and the elytra subsystem's own
//! safety flag are all owned elsewhere. The core only ever talks to them
//! through these traits.

use pathkeeper_core::{BlockPos, Vec3};

use crate::event::PathEvent;
use crate::searcher::CalculationContext;

pub trait PlayerContext: Send + Sync {
    fn player_feet(&self) -> BlockPos;
    fn position(&self) -> Vec3;
    fn on_ground(&self) -> bool;
    fn is_chunk_loaded(&self, x: i32, z: i32) -> bool;
    fn disconnect(&self);

    /// A fresh snapshot for a search about to be dispatched. Whatever owns
    /// the player/world state decides whether it's currently safe to hand
    /// off to a background thread.
    fn calculation_context(&self) -> CalculationContext;
}

/// The rendering/game-event hook events are forwarded to after being
/// drained off the `EventBus` each tick.
pub trait GameEventHandler: Send + Sync {
    fn handle(&self, event: PathEvent);
}

pub trait InputSink: Send + Sync {
    fn clear_all_keys(&self);
    fn stop_breaking_block(&self);
}

/// Block-grid queries the [`crate::start_resolver::StartResolver`] needs.
/// Not the real world model (block state, chunk loading, entity collision —
/// all owned elsewhere) — just the two walkability predicates the resolver's
/// rules need.
pub trait WorldView: Send + Sync {
    /// Can the agent stand *on top of* this block (it's solid).
    fn is_walkable(&self, pos: BlockPos) -> bool;
    /// Can the agent occupy this block (it's air-like / walk-throughable).
    fn is_passable(&self, pos: BlockPos) -> bool;
}

/// The elytra subsystem's own cancellation-safety flag:
/// `is_safe_to_cancel()` defers to this only when there is no `current`
/// executor to ask.
pub trait ElytraSafety: Send + Sync {
    fn is_active(&self) -> bool;
    fn is_safe_to_cancel(&self) -> bool;
}
