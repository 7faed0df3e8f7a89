//! Clock ports - time source for the trigger cooldown
//!
//! The trigger task never reads a global clock. It is handed the current
//! instant by its caller, which gets it from a [`Clock`]; the async runner
//! additionally sleeps through a [`Timebase`]. Tests substitute a virtual
//! clock for both.

use core::future::Future;

use embassy_time::Instant;

/// Source of the current instant
pub trait Clock {
    /// Current instant
    fn now(&self) -> Instant;
}

/// Clock that can also suspend the calling task until a deadline
pub trait Timebase: Clock {
    /// Resolve once `deadline` has been reached
    fn wait_until(&self, deadline: Instant) -> impl Future<Output = ()>;
}
