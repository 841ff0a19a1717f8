//! The `Goal` value type: an opaque predicate over positions plus a
//! heuristic, with value equality.
//!
//! Modeled as a closed enum rather than a `Goal` trait with one struct per
//! kind (`BlockPosGoal`, `RadiusGoal`, `InverseGoal`, `OrGoal`, `AndGoal`, ...)
//! so `PartialEq` falls out of `#[derive]` instead of needing a hand-rolled
//! dynamic-equality shim for trait objects, and so `ControlArbiter`/
//! `PathingCore` can match on it directly.

use pathkeeper_core::BlockPos;

#[derive(Debug, Clone, PartialEq)]
pub enum Goal {
    /// Reach this exact block.
    Block(BlockPos),
    /// Reach any block within `radius` (Euclidean) of `pos`.
    Radius { pos: BlockPos, radius: f64 },
    /// Reach any block at this `x`/`z`, any `y`. What a render-goal
    /// simplifies to when its chunk is unloaded.
    Xz { x: i32, z: i32 },
    /// Reach any block at this `y`, any `x`/`z`.
    Y(i32),
    /// A goal tied to a specific renderable block; simplified to `Xz` by
    /// [`Goal::simplify_for_search`] when that block's chunk isn't loaded.
    Render(BlockPos),
    /// Succeeds wherever `goal` fails.
    Inverse(Box<Goal>),
    /// Succeeds wherever both goals succeed; heuristic is the max of both
    /// (the more pessimistic distance estimate).
    And(Box<Goal>, Box<Goal>),
    /// Succeeds wherever either goal succeeds; heuristic is the min of both.
    Or(Box<Goal>, Box<Goal>),
}

impl Goal {
    pub fn is_in_goal(&self, pos: BlockPos) -> bool {
        match self {
            Goal::Block(target) => pos == *target,
            Goal::Radius { pos: center, radius } => {
                (pos.distance_squared_to(center) as f64) <= radius * radius
            }
            Goal::Xz { x, z } => pos.x == *x && pos.z == *z,
            Goal::Y(y) => pos.y == *y,
            Goal::Render(target) => pos == *target,
            Goal::Inverse(inner) => !inner.is_in_goal(pos),
            Goal::And(a, b) => a.is_in_goal(pos) && b.is_in_goal(pos),
            Goal::Or(a, b) => a.is_in_goal(pos) || b.is_in_goal(pos),
        }
    }

    /// Estimated cost from `pos` to this goal; used by the external
    /// `Searcher` as its A* heuristic, not by the core itself.
    pub fn heuristic(&self, pos: BlockPos) -> f64 {
        match self {
            Goal::Block(target) | Goal::Render(target) => {
                (pos.distance_squared_to(target) as f64).sqrt()
            }
            Goal::Radius { pos: center, .. } => (pos.distance_squared_to(center) as f64).sqrt(),
            Goal::Xz { x, z } => {
                let dx = (pos.x - x) as f64;
                let dz = (pos.z - z) as f64;
                (dx * dx + dz * dz).sqrt()
            }
            Goal::Y(y) => (pos.y - y).unsigned_abs() as f64,
            Goal::Inverse(inner) => -inner.heuristic(pos),
            Goal::And(a, b) => a.heuristic(pos).max(b.heuristic(pos)),
            Goal::Or(a, b) => a.heuristic(pos).min(b.heuristic(pos)),
        }
    }

    /// The residual cost once already in the goal (spec's zero-arg
    /// `heuristic()`). Always zero for the plain goals; radius goals still
    /// carry zero residual since any point inside the radius is a success.
    pub fn residual_cost(&self) -> f64 {
        match self {
            Goal::Inverse(inner) => -inner.residual_cost(),
            Goal::And(a, b) => a.residual_cost().max(b.residual_cost()),
            Goal::Or(a, b) => a.residual_cost().min(b.residual_cost()),
            _ => 0.0,
        }
    }

    /// Simplify a [`Goal::Render`] to the [`Goal::Xz`] it degrades to when
    /// its chunk isn't loaded, per the `simplify_unloaded_y` setting. Any
    /// other variant is returned unchanged.
    #[must_use]
    pub fn simplify_for_search(&self, chunk_loaded: bool, simplify_unloaded_y: bool) -> Goal {
        match self {
            Goal::Render(pos) if !chunk_loaded && simplify_unloaded_y => Goal::Xz {
                x: pos.x,
                z: pos.z,
            },
            other => other.clone(),
        }
    }
}
