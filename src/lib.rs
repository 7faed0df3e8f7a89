//! Sensor Node Reporting Library
//!
//! This library provides a hexagonal architecture for a battery-powered
//! multi-sensor node: independently timed sensor drivers feed one shared
//! snapshot, and a button-armed trigger task prints that snapshot as a
//! line-oriented text report over USB serial.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                     Domain Layer                                 │
//! │  - Slot: one optionally-valid measurement                       │
//! │  - Quantity: the eight tracked quantities, in report order      │
//! │  - AggregateState / SharedState: the node snapshot             │
//! └─────────────────────────────────────────────────────────────────┘
//!                               │
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                     Ports (Traits)                               │
//! │  - Thermometer, Hygrometer, LuxMeter, Barometer, Accelerometer  │
//! │  - OutputSink: fire-and-forget byte output                      │
//! │  - Indicator: acknowledgment pulse                              │
//! │  - Clock / Timebase: time source for the trigger cooldown       │
//! └─────────────────────────────────────────────────────────────────┘
//!                               │
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                Handlers and Trigger                              │
//! │  - one SensorHandler per driver, writing its own slots          │
//! │  - ReportTrigger: Idle / Cooldown state machine + report writer │
//! └─────────────────────────────────────────────────────────────────┘
//!                               │
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                     Adapters                                     │
//! │  - PipeSink + drain_to_usb: USB CDC serial                      │
//! │  - SignalIndicator + led_task: LED pulse                        │
//! │  - EmbassyTimebase: embassy-time clock                          │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The report format itself lives in [`report_protocol`], which is shared
//! with the host-side `readout_host` CLI.

#![cfg_attr(not(any(test, feature = "std")), no_std)]

#[macro_use]
mod log;

// ============================================================================
// Protocol (shared between host and device)
// ============================================================================

pub mod report_protocol;

pub use report_protocol::{
    ParseError, ReportBlock, ReportParser, END_DELIMITER, START_DELIMITER, VALUE_PRECISION,
};

// ============================================================================
// Hexagonal Architecture
// ============================================================================

/// Domain layer - slots and the aggregate snapshot
pub mod domain;

/// Ports - traits defining boundaries
pub mod ports;

/// Sensor update handlers - driver results into slots
pub mod handlers;

/// Report trigger task - Idle/Cooldown state machine
pub mod trigger;

/// Cooperative trigger loop
pub mod runner;

/// Adapters - concrete implementations
pub mod adapters;

/// Node configuration
pub mod config;

#[cfg(test)]
pub(crate) mod testing;

// Re-export key domain types
pub use domain::{AggregateState, Quantity, SharedState, Slot, SlotState};

// Re-export key port traits
pub use ports::{
    Accelerometer, Barometer, Clock, Hygrometer, Indicator, LuxMeter, OutputSink, SensorDriver,
    SensorError, SensorEvent, SinkError, Thermometer, Timebase,
};

pub use config::{NodeConfig, SensorConfig, TriggerConfig};
pub use handlers::{Handlers, SensorHandler};
pub use trigger::{Activation, ReportSummary, ReportTrigger, TriggerState};
