//! Sensor reading slot
//!
//! A slot is the single measurement cell for one physical quantity. It is
//! overwritten in place by its owning handler on every extraction attempt,
//! whether the attempt succeeded or not.

use serde::{Deserialize, Serialize};

/// What the last extraction attempt left in a slot.
///
/// `Unsampled` and `Failed` are both invalid for every consumer; they are
/// kept apart only for diagnostics.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SlotState {
    /// No extraction has been attempted since startup
    #[default]
    Unsampled,
    /// The most recent extraction failed
    Failed,
    /// The most recent extraction produced this value
    Valid(f32),
}

/// A single optionally-valid measurement cell.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Slot {
    state: SlotState,
}

impl Slot {
    /// Create an invalid, never-sampled slot
    pub const fn new() -> Self {
        Self {
            state: SlotState::Unsampled,
        }
    }

    /// Create a slot holding a valid value
    pub const fn with_value(value: f32) -> Self {
        Self {
            state: SlotState::Valid(value),
        }
    }

    /// Store a successfully extracted value
    #[inline]
    pub fn set(&mut self, value: f32) {
        self.state = SlotState::Valid(value);
    }

    /// Mark the slot invalid after a failed extraction
    #[inline]
    pub fn fail(&mut self) {
        self.state = SlotState::Failed;
    }

    /// Apply the outcome of one extraction attempt.
    ///
    /// Returns whether the slot is valid afterwards.
    pub fn record<E>(&mut self, outcome: Result<f32, E>) -> bool {
        match outcome {
            Ok(value) => self.set(value),
            Err(_) => self.fail(),
        }
        self.is_valid()
    }

    /// Whether the slot holds a value a consumer may interpret
    #[inline]
    pub const fn is_valid(&self) -> bool {
        matches!(self.state, SlotState::Valid(_))
    }

    /// The value, if valid
    #[inline]
    pub const fn value(&self) -> Option<f32> {
        match self.state {
            SlotState::Valid(value) => Some(value),
            _ => None,
        }
    }

    /// The raw three-valued state (diagnostics)
    pub const fn state(&self) -> SlotState {
        self.state
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_slot_is_unsampled() {
        let slot = Slot::new();
        assert!(!slot.is_valid());
        assert_eq!(slot.value(), None);
        assert_eq!(slot.state(), SlotState::Unsampled);
    }

    #[test]
    fn test_failure_clears_previous_value() {
        let mut slot = Slot::new();
        assert!(slot.record::<()>(Ok(21.5)));
        assert_eq!(slot.value(), Some(21.5));

        assert!(!slot.record(Err(())));
        assert_eq!(slot.value(), None);
        assert_eq!(slot.state(), SlotState::Failed);
    }

    #[test]
    fn test_success_after_failure() {
        let mut slot = Slot::new();
        slot.fail();
        slot.set(-3.25);
        assert_eq!(slot.state(), SlotState::Valid(-3.25));
    }
}
