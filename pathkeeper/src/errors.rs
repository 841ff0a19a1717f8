//! Programmer-contract violations.
//!
//! These are never recoverable and never surface as a `Result` to a caller:
//! they're logged and then the tick aborts, rather than propagated deep out
//! of a hot tick loop.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ContractViolation {
    #[error("process {0:?} returned no command while is_active() is true")]
    ActiveProcessReturnedNone(String),

    #[error("plan-ahead search completed but `next` was already set")]
    DuplicatePlanAheadResult,

    #[error(
        "refusing to launch a search with a CalculationContext that isn't safe_for_threaded_use"
    )]
    UnsafeCalculationContext,
}

/// Logs `violation` at `error` level and then panics, unwinding the tick.
///
/// This is the one place the core deliberately aborts instead of degrading;
/// everything else (search failure, cancellation, orphan paths) is handled
/// as ordinary tick-local state.
pub fn fail_fast(violation: ContractViolation) -> ! {
    log::error!("pathing core contract violation: {violation}");
    panic!("pathing core contract violation: {violation}");
}
