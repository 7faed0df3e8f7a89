//! Aggregate state
//!
//! The node snapshot: one [`Slot`] per [`Quantity`]. Each slot has exactly
//! one owning handler, so slots never have concurrent writers.

use core::cell::RefCell;

use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_sync::blocking_mutex::Mutex;
use serde::{Deserialize, Serialize};

use crate::domain::{Quantity, Slot};

/// The full set of slots representing the node's current snapshot.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct AggregateState {
    slots: [Slot; Quantity::COUNT],
}

impl AggregateState {
    /// Create a snapshot with every slot invalid
    pub const fn new() -> Self {
        Self {
            slots: [Slot::new(); Quantity::COUNT],
        }
    }

    /// Slot for a quantity
    #[inline]
    pub fn slot(&self, quantity: Quantity) -> &Slot {
        &self.slots[quantity.index()]
    }

    /// Mutable slot for a quantity
    #[inline]
    pub fn slot_mut(&mut self, quantity: Quantity) -> &mut Slot {
        &mut self.slots[quantity.index()]
    }

    /// Iterate slots in report order
    pub fn iter(&self) -> impl Iterator<Item = (Quantity, &Slot)> {
        Quantity::ALL.into_iter().zip(self.slots.iter())
    }

    /// Number of slots currently holding a valid value
    pub fn valid_count(&self) -> usize {
        self.slots.iter().filter(|slot| slot.is_valid()).count()
    }
}

/// Handle to the aggregate state shared by handlers and the trigger task.
///
/// `M` selects the locking discipline: `NoopRawMutex` when every handler
/// and the trigger run on one cooperative executor, `CriticalSectionRawMutex`
/// when handlers may run from interrupts or another core.
///
/// Closures passed to [`read`](Self::read) and [`update`](Self::update)
/// must not re-enter the same `SharedState`.
pub struct SharedState<M: RawMutex> {
    inner: Mutex<M, RefCell<AggregateState>>,
}

impl<M: RawMutex> SharedState<M> {
    /// Create shared state with every slot invalid
    pub const fn new() -> Self {
        Self {
            inner: Mutex::new(RefCell::new(AggregateState::new())),
        }
    }

    /// Run `f` with read access to the snapshot
    pub fn read<R>(&self, f: impl FnOnce(&AggregateState) -> R) -> R {
        self.inner.lock(|cell| f(&cell.borrow()))
    }

    /// Run `f` with write access to the snapshot
    pub fn update<R>(&self, f: impl FnOnce(&mut AggregateState) -> R) -> R {
        self.inner.lock(|cell| f(&mut cell.borrow_mut()))
    }

    /// Copy of the current snapshot
    pub fn snapshot(&self) -> AggregateState {
        self.read(|state| *state)
    }
}

impl<M: RawMutex> Default for SharedState<M> {
    fn default() -> Self {
        Self::new()
    }
}
