//! `StartResolver`: picks the logical block a new search should start from,
//! given the agent's physical position.

use pathkeeper_core::BlockPos;

use crate::context::{PlayerContext, WorldView};

/// Within this distance on at least one horizontal axis, a candidate is
/// considered reachable by sneaking to the edge of the current block.
/// `or` is preserved here for behavioral compatibility even though `and` —
/// a true L∞ ball — was likely intended.
const SNEAK_REACH: f64 = 0.8;

pub struct StartResolver;

impl StartResolver {
    /// The logical block the next search should originate from.
    pub fn path_start(world: &dyn WorldView, player: &dyn PlayerContext) -> BlockPos {
        let feet = player.player_feet();

        // Rule 1: standing on solid ground.
        if world.is_walkable(feet.below()) {
            return feet;
        }

        if !player.on_ground() {
            // Rule 2: airborne.
            return if world.is_walkable(feet.down(2)) {
                feet.below()
            } else {
                feet
            };
        }

        // Rule 3: on ground but floating over air (e.g. sneaking off an
        // edge). Look at the nearest standable neighbor.
        Self::nearest_standable_neighbor(world, player).unwrap_or(feet)
    }

    fn nearest_standable_neighbor(
        world: &dyn WorldView,
        player: &dyn PlayerContext,
    ) -> Option<BlockPos> {
        let feet = player.player_feet();
        let pos = player.position();

        let mut candidates: Vec<BlockPos> = Vec::with_capacity(9);
        for dx in -1..=1 {
            for dz in -1..=1 {
                candidates.push(BlockPos::new(feet.x + dx, feet.y, feet.z + dz));
            }
        }
        candidates.sort_by(|a, b| {
            let da = pos.horizontal_distance_squared_to(a.x as f64 + 0.5, a.z as f64 + 0.5);
            let db = pos.horizontal_distance_squared_to(b.x as f64 + 0.5, b.z as f64 + 0.5);
            da.partial_cmp(&db).unwrap_or(std::cmp::Ordering::Equal)
        });

        for candidate in candidates.into_iter().take(4) {
            let cx = candidate.x as f64 + 0.5;
            let cz = candidate.z as f64 + 0.5;
            let within_sneak_reach =
                (cx - pos.x).abs() <= SNEAK_REACH || (cz - pos.z).abs() <= SNEAK_REACH;
            if !within_sneak_reach {
                continue;
            }
            let standable = world.is_walkable(candidate.below())
                && world.is_passable(candidate)
                && world.is_passable(candidate.above());
            if standable {
                return Some(candidate);
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::{FakePlayerContext, FakeWorld};

    #[test]
    fn rule1_returns_feet_when_standing_on_solid_ground() {
        let mut world = FakeWorld::default();
        let feet = BlockPos::new(0, 64, 0);
        world.set_walkable(feet.below(), true);
        let player = FakePlayerContext::standing_at(feet);

        assert_eq!(StartResolver::path_start(&world, &player), feet);
    }

    #[test]
    fn rule2_airborne_with_two_block_drop_returns_feet_below() {
        let mut world = FakeWorld::default();
        let feet = BlockPos::new(0, 64, 0);
        world.set_walkable(feet.down(2), true);
        let mut player = FakePlayerContext::standing_at(feet);
        player.on_ground = false;

        assert_eq!(StartResolver::path_start(&world, &player), feet.below());
    }

    #[test]
    fn rule2_airborne_without_two_block_drop_returns_feet() {
        let world = FakeWorld::default();
        let feet = BlockPos::new(0, 64, 0);
        let mut player = FakePlayerContext::standing_at(feet);
        player.on_ground = false;

        assert_eq!(StartResolver::path_start(&world, &player), feet);
    }

    #[test]
    fn rule3_picks_nearest_standable_neighbor_within_sneak_reach() {
        let mut world = FakeWorld::default();
        let feet = BlockPos::new(0, 64, 0);
        // feet itself floats: below isn't walkable.
        let neighbor = BlockPos::new(1, 64, 0);
        world.set_walkable(neighbor.below(), true);
        world.set_passable(neighbor, true);
        world.set_passable(neighbor.above(), true);

        let mut player = FakePlayerContext::standing_at(feet);
        // continuous position near the edge towards the neighbor.
        player.pos = pathkeeper_core::Vec3::new(0.7, 64.0, 0.5);

        assert_eq!(StartResolver::path_start(&world, &player), neighbor);
    }

    #[test]
    fn rule3_falls_back_to_feet_when_no_neighbor_qualifies() {
        let world = FakeWorld::default();
        let feet = BlockPos::new(0, 64, 0);
        let mut player = FakePlayerContext::standing_at(feet);
        player.pos = pathkeeper_core::Vec3::new(0.5, 64.0, 0.5);

        assert_eq!(StartResolver::path_start(&world, &player), feet);
    }
}
