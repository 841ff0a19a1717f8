//! Geometry primitives used across the pathing control core: a block-grid
//! coordinate (`BlockPos`) and a continuous-space coordinate (`Vec3`).
//!
//! This crate is deliberately tiny — it holds only what `pathkeeper` needs to
//! talk about positions. World data, chunks, and block state all live behind
//! the `WorldView` trait in `pathkeeper`, not here.

use std::ops::{Add, Sub};

/// A block-grid coordinate. Equality is component-wise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct BlockPos {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl BlockPos {
    pub fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    #[must_use]
    pub fn up(&self, amount: i32) -> Self {
        Self::new(self.x, self.y + amount, self.z)
    }

    #[must_use]
    pub fn down(&self, amount: i32) -> Self {
        Self::new(self.x, self.y - amount, self.z)
    }

    /// The block directly below this one.
    #[must_use]
    pub fn below(&self) -> Self {
        self.down(1)
    }

    /// The block directly above this one.
    #[must_use]
    pub fn above(&self) -> Self {
        self.up(1)
    }

    /// The continuous-space point at the center of this block.
    #[must_use]
    pub fn center(&self) -> Vec3 {
        Vec3 {
            x: self.x as f64 + 0.5,
            y: self.y as f64 + 0.5,
            z: self.z as f64 + 0.5,
        }
    }

    #[must_use]
    pub fn distance_squared_to(&self, other: &BlockPos) -> i64 {
        let dx = (self.x - other.x) as i64;
        let dy = (self.y - other.y) as i64;
        let dz = (self.z - other.z) as i64;
        dx * dx + dy * dy + dz * dz
    }
}

impl Add for BlockPos {
    type Output = BlockPos;
    fn add(self, rhs: BlockPos) -> BlockPos {
        BlockPos::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl Sub for BlockPos {
    type Output = BlockPos;
    fn sub(self, rhs: BlockPos) -> BlockPos {
        BlockPos::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

impl From<Vec3> for BlockPos {
    /// Truncates (floors) each continuous coordinate down to its block.
    fn from(vec: Vec3) -> Self {
        BlockPos::new(
            vec.x.floor() as i32,
            vec.y.floor() as i32,
            vec.z.floor() as i32,
        )
    }
}

/// A continuous-space coordinate, as reported by a player's physical position.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Vec3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Vec3 {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    #[must_use]
    pub fn horizontal_distance_squared_to(&self, x: f64, z: f64) -> f64 {
        let dx = self.x - x;
        let dz = self.z - z;
        dx * dx + dz * dz
    }
}

impl From<(f64, f64, f64)> for Vec3 {
    fn from((x, y, z): (f64, f64, f64)) -> Self {
        Vec3::new(x, y, z)
    }
}
