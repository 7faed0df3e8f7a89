//! Test doubles for the ports

use core::cell::Cell;
use core::future::{ready, Future};

use embassy_time::{Duration, Instant};

use crate::ports::{
    Acceleration, Accelerometer, Barometer, Clock, Hygrometer, Indicator, LuxMeter, OutputSink,
    SensorDriver, SensorError, SinkError, Thermometer, Timebase,
};

/// Driver implementing every sensor capability with scripted results
pub struct MockDriver {
    pub temperature: Result<f32, SensorError>,
    pub humidity: Result<f32, SensorError>,
    pub luminosity: Result<f32, SensorError>,
    pub altitude: Result<f32, SensorError>,
    pub pressure: Result<f32, SensorError>,
    pub acceleration: Result<Acceleration, SensorError>,
    pub interval: Option<Duration>,
    pub pulls: usize,
}

impl MockDriver {
    pub fn new() -> Self {
        Self {
            temperature: Err(SensorError::NotReady),
            humidity: Err(SensorError::NotReady),
            luminosity: Err(SensorError::NotReady),
            altitude: Err(SensorError::NotReady),
            pressure: Err(SensorError::NotReady),
            acceleration: Err(SensorError::NotReady),
            interval: None,
            pulls: 0,
        }
    }

    fn pull<T: Copy>(&mut self, value: Result<T, SensorError>) -> Result<T, SensorError> {
        self.pulls += 1;
        value
    }
}

impl SensorDriver for MockDriver {
    fn set_update_interval(&mut self, interval: Duration) {
        self.interval = Some(interval);
    }
}

impl Thermometer for MockDriver {
    fn temperature_celsius(&mut self) -> Result<f32, SensorError> {
        self.pull(self.temperature)
    }
}

impl Hygrometer for MockDriver {
    fn humidity_percentage(&mut self) -> Result<f32, SensorError> {
        self.pull(self.humidity)
    }
}

impl LuxMeter for MockDriver {
    fn luminosity_lux(&mut self) -> Result<f32, SensorError> {
        self.pull(self.luminosity)
    }
}

impl Barometer for MockDriver {
    fn altitude_meter(&mut self) -> Result<f32, SensorError> {
        self.pull(self.altitude)
    }

    fn pressure_pascal(&mut self) -> Result<f32, SensorError> {
        self.pull(self.pressure)
    }
}

impl Accelerometer for MockDriver {
    fn acceleration_g(&mut self) -> Result<Acceleration, SensorError> {
        self.pull(self.acceleration)
    }
}

/// Sink recording every accepted write; optionally rejects everything
#[derive(Default)]
pub struct RecordingSink {
    pub bytes: Vec<u8>,
    pub writes: usize,
    pub reject: bool,
}

impl RecordingSink {
    pub fn rejecting() -> Self {
        Self {
            reject: true,
            ..Default::default()
        }
    }

    pub fn text(&self) -> &str {
        core::str::from_utf8(&self.bytes).expect("report is ASCII")
    }
}

impl OutputSink for RecordingSink {
    fn write(&mut self, bytes: &[u8]) -> Result<(), SinkError> {
        self.writes += 1;
        if self.reject {
            return Err(SinkError::Full);
        }
        self.bytes.extend_from_slice(bytes);
        Ok(())
    }
}

/// Indicator remembering each pulse
#[derive(Default)]
pub struct CountingIndicator {
    pub pulses: Vec<Duration>,
}

impl Indicator for CountingIndicator {
    fn pulse(&mut self, duration: Duration) {
        self.pulses.push(duration);
    }
}

/// Manually advanced clock; waiting jumps straight to the deadline
pub struct VirtualClock {
    now: Cell<Instant>,
}

impl VirtualClock {
    pub fn new() -> Self {
        Self {
            now: Cell::new(Instant::from_millis(0)),
        }
    }

    pub fn advance(&self, by: Duration) {
        self.now.set(self.now.get() + by);
    }
}

impl Clock for VirtualClock {
    fn now(&self) -> Instant {
        self.now.get()
    }
}

impl Timebase for VirtualClock {
    fn wait_until(&self, deadline: Instant) -> impl Future<Output = ()> {
        if deadline > self.now.get() {
            self.now.set(deadline);
        }
        ready(())
    }
}
