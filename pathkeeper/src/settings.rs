//! Live-tunable knobs consumed by the pathing core.
//!
//! Each field is a plain atomic with a relaxed getter/setter; a setter *is*
//! the live-update channel, so no separate channel type is needed.
//! [`Settings::snapshot`] copies every field into a [`SettingsSnapshot`] so
//! one tick observes a single consistent set of values even if another
//! thread is mid-update.

use std::sync::atomic::{AtomicBool, AtomicI32, AtomicU64, Ordering};

pub struct Settings {
    primary_timeout_ms: AtomicU64,
    failure_timeout_ms: AtomicU64,
    plan_ahead_primary_timeout_ms: AtomicU64,
    plan_ahead_failure_timeout_ms: AtomicU64,
    planning_tick_lookahead: AtomicI32,
    splice_path: AtomicBool,
    simplify_unloaded_y: AtomicBool,
    cancel_on_goal_invalidation: AtomicBool,
    disconnect_on_arrival: AtomicBool,
}

/// A consistent, point-in-time copy of [`Settings`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SettingsSnapshot {
    pub primary_timeout_ms: u64,
    pub failure_timeout_ms: u64,
    pub plan_ahead_primary_timeout_ms: u64,
    pub plan_ahead_failure_timeout_ms: u64,
    pub planning_tick_lookahead: i32,
    pub splice_path: bool,
    pub simplify_unloaded_y: bool,
    pub cancel_on_goal_invalidation: bool,
    pub disconnect_on_arrival: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            primary_timeout_ms: AtomicU64::new(1000),
            failure_timeout_ms: AtomicU64::new(2000),
            plan_ahead_primary_timeout_ms: AtomicU64::new(250),
            plan_ahead_failure_timeout_ms: AtomicU64::new(500),
            planning_tick_lookahead: AtomicI32::new(10),
            splice_path: AtomicBool::new(true),
            simplify_unloaded_y: AtomicBool::new(true),
            cancel_on_goal_invalidation: AtomicBool::new(true),
            disconnect_on_arrival: AtomicBool::new(false),
        }
    }
}

macro_rules! atomic_accessor {
    ($field:ident, $get:ident, $set:ident, $ty:ty) => {
        pub fn $get(&self) -> $ty {
            self.$field.load(Ordering::Relaxed)
        }
        pub fn $set(&self, value: $ty) {
            self.$field.store(value, Ordering::Relaxed);
        }
    };
}

impl Settings {
    atomic_accessor!(
        primary_timeout_ms,
        primary_timeout_ms,
        set_primary_timeout_ms,
        u64
    );
    atomic_accessor!(
        failure_timeout_ms,
        failure_timeout_ms,
        set_failure_timeout_ms,
        u64
    );
    atomic_accessor!(
        plan_ahead_primary_timeout_ms,
        plan_ahead_primary_timeout_ms,
        set_plan_ahead_primary_timeout_ms,
        u64
    );
    atomic_accessor!(
        plan_ahead_failure_timeout_ms,
        plan_ahead_failure_timeout_ms,
        set_plan_ahead_failure_timeout_ms,
        u64
    );
    atomic_accessor!(
        planning_tick_lookahead,
        planning_tick_lookahead,
        set_planning_tick_lookahead,
        i32
    );
    atomic_accessor!(splice_path, splice_path, set_splice_path, bool);
    atomic_accessor!(
        simplify_unloaded_y,
        simplify_unloaded_y,
        set_simplify_unloaded_y,
        bool
    );
    atomic_accessor!(
        cancel_on_goal_invalidation,
        cancel_on_goal_invalidation,
        set_cancel_on_goal_invalidation,
        bool
    );
    atomic_accessor!(
        disconnect_on_arrival,
        disconnect_on_arrival,
        set_disconnect_on_arrival,
        bool
    );

    pub fn snapshot(&self) -> SettingsSnapshot {
        SettingsSnapshot {
            primary_timeout_ms: self.primary_timeout_ms(),
            failure_timeout_ms: self.failure_timeout_ms(),
            plan_ahead_primary_timeout_ms: self.plan_ahead_primary_timeout_ms(),
            plan_ahead_failure_timeout_ms: self.plan_ahead_failure_timeout_ms(),
            planning_tick_lookahead: self.planning_tick_lookahead(),
            splice_path: self.splice_path(),
            simplify_unloaded_y: self.simplify_unloaded_y(),
            cancel_on_goal_invalidation: self.cancel_on_goal_invalidation(),
            disconnect_on_arrival: self.disconnect_on_arrival(),
        }
    }
}
