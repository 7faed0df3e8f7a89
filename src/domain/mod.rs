//! Domain layer - pure logic independent of infrastructure
//!
//! This module contains the measurement slot, the set of tracked
//! quantities and the aggregate snapshot they form.

pub mod quantity;
pub mod slot;
pub mod state;

pub use quantity::Quantity;
pub use slot::{Slot, SlotState};
pub use state::{AggregateState, SharedState};
