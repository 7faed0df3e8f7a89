//! Node configuration
//!
//! Update intervals for the sensor drivers and timing of the report
//! trigger. Every struct is const-constructible so a firmware can keep its
//! configuration in a `static`.

use embassy_time::Duration;

use crate::ports::SensorDriver;

/// How often each sensor driver measures
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SensorConfig {
    /// Temperature tag interval
    pub temperature_interval: Duration,
    /// Humidity tag interval
    pub humidity_interval: Duration,
    /// Lux meter interval
    pub luminosity_interval: Duration,
    /// Barometer tag interval
    pub barometer_interval: Duration,
    /// Accelerometer interval
    pub accelerometer_interval: Duration,
}

impl SensorConfig {
    /// Every sensor on the same interval
    pub const fn uniform(interval: Duration) -> Self {
        Self {
            temperature_interval: interval,
            humidity_interval: interval,
            luminosity_interval: interval,
            barometer_interval: interval,
            accelerometer_interval: interval,
        }
    }

    /// Register the temperature interval with its driver
    pub fn apply_temperature<D: SensorDriver + ?Sized>(&self, driver: &mut D) {
        driver.set_update_interval(self.temperature_interval);
    }

    /// Register the humidity interval with its driver
    pub fn apply_humidity<D: SensorDriver + ?Sized>(&self, driver: &mut D) {
        driver.set_update_interval(self.humidity_interval);
    }

    /// Register the luminosity interval with its driver
    pub fn apply_luminosity<D: SensorDriver + ?Sized>(&self, driver: &mut D) {
        driver.set_update_interval(self.luminosity_interval);
    }

    /// Register the barometer interval with its driver
    pub fn apply_barometer<D: SensorDriver + ?Sized>(&self, driver: &mut D) {
        driver.set_update_interval(self.barometer_interval);
    }

    /// Register the accelerometer interval with its driver
    pub fn apply_accelerometer<D: SensorDriver + ?Sized>(&self, driver: &mut D) {
        driver.set_update_interval(self.accelerometer_interval);
    }
}

impl Default for SensorConfig {
    fn default() -> Self {
        Self::uniform(Duration::from_millis(1000))
    }
}

/// Timing of the report trigger
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TriggerConfig {
    /// Quiet period after a report during which activations are ignored
    pub cooldown: Duration,
    /// Length of the acknowledgment pulse
    pub indicator_pulse: Duration,
}

impl TriggerConfig {
    /// 5 s cooldown, 10 ms pulse
    pub const DEFAULT: Self = Self {
        cooldown: Duration::from_millis(5000),
        indicator_pulse: Duration::from_millis(10),
    };
}

impl Default for TriggerConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Complete node configuration
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct NodeConfig {
    /// Sensor update intervals
    pub sensors: SensorConfig,
    /// Trigger timing
    pub trigger: TriggerConfig,
}

impl NodeConfig {
    /// Create config for low-power operation
    pub const fn low_power() -> Self {
        Self {
            sensors: SensorConfig::uniform(Duration::from_secs(60)),
            trigger: TriggerConfig::DEFAULT,
        }
    }

    /// Create config for bench testing: fast sampling, short cooldown
    pub const fn fast() -> Self {
        Self {
            sensors: SensorConfig::uniform(Duration::from_millis(100)),
            trigger: TriggerConfig {
                cooldown: Duration::from_millis(500),
                indicator_pulse: Duration::from_millis(10),
            },
        }
    }
}
