//! Sensor ports - capabilities of the external sensor drivers
//!
//! Drivers are external collaborators. Each one measures on its own
//! update interval, notifies the core with a [`SensorEvent`], and exposes
//! a pull accessor for its latest decoded value. The core never polls a
//! driver on its own; it only pulls in reaction to an event.

use embassy_time::Duration;
use thiserror::Error;

/// Error type for pulling a decoded value from a driver
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SensorError {
    /// No measurement has completed yet
    #[error("no measurement available yet")]
    NotReady,
    /// Bus transaction with the sensor failed
    #[error("sensor bus error")]
    Bus,
    /// The sensor returned data that could not be decoded
    #[error("sensor returned invalid data")]
    InvalidData,
}

/// Kind of notification a driver delivers to its handler
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SensorEvent {
    /// A new measurement has been decoded
    Update,
    /// The last measurement cycle failed
    Error,
    /// Threshold alarm (accelerometer only)
    Alarm,
}

/// Common driver capability: periodic measurement scheduling
pub trait SensorDriver {
    /// Set how often the driver measures and notifies its handler
    fn set_update_interval(&mut self, interval: Duration);
}

/// Temperature sensor
pub trait Thermometer: SensorDriver {
    /// Latest temperature in degrees Celsius
    fn temperature_celsius(&mut self) -> Result<f32, SensorError>;
}

/// Relative humidity sensor
pub trait Hygrometer: SensorDriver {
    /// Latest relative humidity in percent
    fn humidity_percentage(&mut self) -> Result<f32, SensorError>;
}

/// Ambient light sensor
pub trait LuxMeter: SensorDriver {
    /// Latest luminosity in lux
    fn luminosity_lux(&mut self) -> Result<f32, SensorError>;
}

/// Barometric sensor.
///
/// Altitude and pressure come from the same physical reading but are
/// decoded, and can fail, independently.
pub trait Barometer: SensorDriver {
    /// Latest altitude in meters
    fn altitude_meter(&mut self) -> Result<f32, SensorError>;

    /// Latest pressure in pascal
    fn pressure_pascal(&mut self) -> Result<f32, SensorError>;
}

/// Three-axis acceleration in g
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Acceleration {
    /// X axis
    pub x: f32,
    /// Y axis
    pub y: f32,
    /// Z axis
    pub z: f32,
}

impl Acceleration {
    /// Create an acceleration triple
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }
}

/// Three-axis accelerometer
pub trait Accelerometer: SensorDriver {
    /// Latest acceleration on all three axes, decoded as one unit
    fn acceleration_g(&mut self) -> Result<Acceleration, SensorError>;
}
