//! Ports (interfaces) defining the boundaries of the application
//!
//! Ports are traits that define how the core interacts with external
//! systems. They allow the aggregation and reporting logic to remain
//! independent of specific drivers and transports.
//!
//! # Hexagonal Architecture
//!
//! - **Sensor ports**: capability traits of the sensor drivers
//! - **OutputSink**: where report bytes go (USB CDC, UART, test buffer)
//! - **Indicator**: acknowledgment pulse (LED, mock)
//! - **Clock / Timebase**: time source for the cooldown (embassy, virtual)

pub mod clock;
pub mod indicator;
pub mod sensor;
pub mod sink;

pub use clock::{Clock, Timebase};
pub use indicator::Indicator;
pub use sensor::{
    Acceleration, Accelerometer, Barometer, Hygrometer, LuxMeter, SensorDriver, SensorError,
    SensorEvent, Thermometer,
};
pub use sink::{OutputSink, SinkError};
