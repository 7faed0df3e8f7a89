//! Tracked quantities
//!
//! The node tracks a fixed set of eight quantities. Their order in
//! [`Quantity::ALL`] is the order in which they appear in a report.

use serde::{Deserialize, Serialize};

/// One physical quantity tracked by the node.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Quantity {
    /// Temperature in degrees Celsius
    Temperature,
    /// Relative humidity in percent
    Humidity,
    /// Luminosity in lux
    Luminosity,
    /// Altitude in meters
    Altitude,
    /// Barometric pressure in pascal
    Pressure,
    /// Acceleration along X in g
    AccelerationX,
    /// Acceleration along Y in g
    AccelerationY,
    /// Acceleration along Z in g
    AccelerationZ,
}

impl Quantity {
    /// Number of tracked quantities
    pub const COUNT: usize = 8;

    /// All quantities in report order
    pub const ALL: [Quantity; Self::COUNT] = [
        Quantity::Temperature,
        Quantity::Humidity,
        Quantity::Luminosity,
        Quantity::Altitude,
        Quantity::Pressure,
        Quantity::AccelerationX,
        Quantity::AccelerationY,
        Quantity::AccelerationZ,
    ];

    /// The three acceleration axes, always updated together
    pub const ACCELERATION: [Quantity; 3] = [
        Quantity::AccelerationX,
        Quantity::AccelerationY,
        Quantity::AccelerationZ,
    ];

    /// Position in [`Quantity::ALL`], also the slot index
    pub const fn index(self) -> usize {
        match self {
            Quantity::Temperature => 0,
            Quantity::Humidity => 1,
            Quantity::Luminosity => 2,
            Quantity::Altitude => 3,
            Quantity::Pressure => 4,
            Quantity::AccelerationX => 5,
            Quantity::AccelerationY => 6,
            Quantity::AccelerationZ => 7,
        }
    }

    /// Short mnemonic used as the report line tag
    pub const fn tag(self) -> &'static str {
        match self {
            Quantity::Temperature => "t",
            Quantity::Humidity => "h",
            Quantity::Luminosity => "l",
            Quantity::Altitude => "a",
            Quantity::Pressure => "p",
            Quantity::AccelerationX => "ax",
            Quantity::AccelerationY => "ay",
            Quantity::AccelerationZ => "az",
        }
    }

    /// Look up a quantity by its report tag
    pub fn from_tag(tag: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|q| q.tag() == tag)
    }

    /// Field name used when exporting to a time-series database.
    ///
    /// Acceleration axes keep their short tags.
    pub const fn field_name(self) -> &'static str {
        match self {
            Quantity::Temperature => "temperature",
            Quantity::Humidity => "humidity",
            Quantity::Luminosity => "luminosity",
            Quantity::Altitude => "altitude",
            Quantity::Pressure => "pressure",
            Quantity::AccelerationX => "ax",
            Quantity::AccelerationY => "ay",
            Quantity::AccelerationZ => "az",
        }
    }
}
