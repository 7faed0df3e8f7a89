//! Sensor update handlers
//!
//! One handler per driver. A handler is invoked by the driver layer with an
//! event and the driver itself, pulls the latest decoded value and writes
//! it into the slot(s) it owns. Extraction failure is not an error for the
//! caller: it only clears the slot's validity.
//!
//! The driver is pulled before the shared state is locked, so the lock is
//! held only for the slot writes.

use embassy_sync::blocking_mutex::raw::RawMutex;

use crate::domain::{Quantity, SharedState};
use crate::ports::{Accelerometer, Barometer, Hygrometer, LuxMeter, SensorEvent, Thermometer};

/// Reaction of one handler to one driver notification
pub trait SensorHandler<D: ?Sized> {
    /// Project the driver's latest result into the owned slot(s).
    ///
    /// Never blocks and never fails.
    fn on_event(&self, driver: &mut D, event: SensorEvent);
}

/// Record a single-slot extraction outcome
fn record<M: RawMutex, E>(state: &SharedState<M>, quantity: Quantity, outcome: Result<f32, E>) {
    let valid = state.update(|s| s.slot_mut(quantity).record(outcome));
    if !valid {
        debug!("{} extraction failed", quantity.tag());
    }
}

/// Owns the temperature slot
pub struct TemperatureHandler<'a, M: RawMutex> {
    state: &'a SharedState<M>,
}

impl<'a, M: RawMutex> TemperatureHandler<'a, M> {
    /// Create a handler writing into `state`
    pub const fn new(state: &'a SharedState<M>) -> Self {
        Self { state }
    }
}

impl<M: RawMutex, D: Thermometer + ?Sized> SensorHandler<D> for TemperatureHandler<'_, M> {
    fn on_event(&self, driver: &mut D, _event: SensorEvent) {
        record(self.state, Quantity::Temperature, driver.temperature_celsius());
    }
}

/// Owns the humidity slot
pub struct HumidityHandler<'a, M: RawMutex> {
    state: &'a SharedState<M>,
}

impl<'a, M: RawMutex> HumidityHandler<'a, M> {
    /// Create a handler writing into `state`
    pub const fn new(state: &'a SharedState<M>) -> Self {
        Self { state }
    }
}

impl<M: RawMutex, D: Hygrometer + ?Sized> SensorHandler<D> for HumidityHandler<'_, M> {
    fn on_event(&self, driver: &mut D, _event: SensorEvent) {
        record(self.state, Quantity::Humidity, driver.humidity_percentage());
    }
}

/// Owns the luminosity slot
pub struct LuxHandler<'a, M: RawMutex> {
    state: &'a SharedState<M>,
}

impl<'a, M: RawMutex> LuxHandler<'a, M> {
    /// Create a handler writing into `state`
    pub const fn new(state: &'a SharedState<M>) -> Self {
        Self { state }
    }
}

impl<M: RawMutex, D: LuxMeter + ?Sized> SensorHandler<D> for LuxHandler<'_, M> {
    fn on_event(&self, driver: &mut D, _event: SensorEvent) {
        record(self.state, Quantity::Luminosity, driver.luminosity_lux());
    }
}

/// Owns the altitude and pressure slots.
///
/// Both slots are written from the same event, each according to its own
/// extraction outcome.
pub struct BarometerHandler<'a, M: RawMutex> {
    state: &'a SharedState<M>,
}

impl<'a, M: RawMutex> BarometerHandler<'a, M> {
    /// Create a handler writing into `state`
    pub const fn new(state: &'a SharedState<M>) -> Self {
        Self { state }
    }
}

impl<M: RawMutex, D: Barometer + ?Sized> SensorHandler<D> for BarometerHandler<'_, M> {
    fn on_event(&self, driver: &mut D, _event: SensorEvent) {
        let altitude = driver.altitude_meter();
        let pressure = driver.pressure_pascal();

        let (altitude_valid, pressure_valid) = self.state.update(|s| {
            (
                s.slot_mut(Quantity::Altitude).record(altitude),
                s.slot_mut(Quantity::Pressure).record(pressure),
            )
        });

        if !altitude_valid || !pressure_valid {
            debug!(
                "barometer extraction: altitude {}, pressure {}",
                altitude_valid, pressure_valid
            );
        }
    }
}

/// Owns the three acceleration slots.
///
/// Only [`SensorEvent::Update`] is acted on. One read sets all three axes
/// valid or marks all three invalid.
pub struct AccelerometerHandler<'a, M: RawMutex> {
    state: &'a SharedState<M>,
}

impl<'a, M: RawMutex> AccelerometerHandler<'a, M> {
    /// Create a handler writing into `state`
    pub const fn new(state: &'a SharedState<M>) -> Self {
        Self { state }
    }
}

impl<M: RawMutex, D: Accelerometer + ?Sized> SensorHandler<D> for AccelerometerHandler<'_, M> {
    fn on_event(&self, driver: &mut D, event: SensorEvent) {
        if event != SensorEvent::Update {
            return;
        }

        match driver.acceleration_g() {
            Ok(g) => self.state.update(|s| {
                s.slot_mut(Quantity::AccelerationX).set(g.x);
                s.slot_mut(Quantity::AccelerationY).set(g.y);
                s.slot_mut(Quantity::AccelerationZ).set(g.z);
            }),
            Err(_) => {
                self.state.update(|s| {
                    for axis in Quantity::ACCELERATION {
                        s.slot_mut(axis).fail();
                    }
                });
                debug!("acceleration extraction failed");
            }
        }
    }
}

/// All handlers of the node, bound to one shared state
pub struct Handlers<'a, M: RawMutex> {
    /// Temperature tag handler
    pub temperature: TemperatureHandler<'a, M>,
    /// Humidity tag handler
    pub humidity: HumidityHandler<'a, M>,
    /// Lux meter handler
    pub luminosity: LuxHandler<'a, M>,
    /// Barometer tag handler
    pub barometer: BarometerHandler<'a, M>,
    /// Accelerometer handler
    pub accelerometer: AccelerometerHandler<'a, M>,
}

impl<'a, M: RawMutex> Handlers<'a, M> {
    /// Bind one handler per sensor to `state`
    pub const fn new(state: &'a SharedState<M>) -> Self {
        Self {
            temperature: TemperatureHandler::new(state),
            humidity: HumidityHandler::new(state),
            luminosity: LuxHandler::new(state),
            barometer: BarometerHandler::new(state),
            accelerometer: AccelerometerHandler::new(state),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::{Acceleration, SensorError};
    use crate::testing::MockDriver;
    use embassy_sync::blocking_mutex::raw::NoopRawMutex;

    fn valid(state: &SharedState<NoopRawMutex>, quantity: Quantity) -> bool {
        state.read(|s| s.slot(quantity).is_valid())
    }

    #[test]
    fn test_temperature_follows_latest_attempt() {
        let state = SharedState::<NoopRawMutex>::new();
        let handlers = Handlers::new(&state);
        let mut driver = MockDriver::new();

        driver.temperature = Ok(23.4567);
        handlers.temperature.on_event(&mut driver, SensorEvent::Update);
        assert_eq!(
            state.read(|s| s.slot(Quantity::Temperature).value()),
            Some(23.4567)
        );

        driver.temperature = Err(SensorError::Bus);
        handlers.temperature.on_event(&mut driver, SensorEvent::Error);
        assert!(!valid(&state, Quantity::Temperature));

        driver.temperature = Ok(19.0);
        handlers.temperature.on_event(&mut driver, SensorEvent::Update);
        assert!(valid(&state, Quantity::Temperature));
    }

    #[test]
    fn test_single_slot_handlers_touch_only_their_slot() {
        let state = SharedState::<NoopRawMutex>::new();
        let handlers = Handlers::new(&state);
        let mut driver = MockDriver::new();
        driver.humidity = Ok(48.5);
        driver.luminosity = Ok(120.0);

        handlers.humidity.on_event(&mut driver, SensorEvent::Update);
        assert!(valid(&state, Quantity::Humidity));
        assert_eq!(state.snapshot().valid_count(), 1);

        handlers.luminosity.on_event(&mut driver, SensorEvent::Update);
        assert!(valid(&state, Quantity::Luminosity));
        assert_eq!(state.snapshot().valid_count(), 2);
        assert_eq!(driver.pulls, 2);
    }

    #[test]
    fn test_humidity_and_lux_failure_clears_previous_value() {
        let state = SharedState::<NoopRawMutex>::new();
        let handlers = Handlers::new(&state);
        let mut driver = MockDriver::new();

        driver.humidity = Ok(52.0);
        driver.luminosity = Ok(830.5);
        handlers.humidity.on_event(&mut driver, SensorEvent::Update);
        handlers.luminosity.on_event(&mut driver, SensorEvent::Update);
        assert_eq!(state.snapshot().valid_count(), 2);

        driver.humidity = Err(SensorError::NotReady);
        handlers.humidity.on_event(&mut driver, SensorEvent::Error);
        assert!(!valid(&state, Quantity::Humidity));
        assert!(valid(&state, Quantity::Luminosity));

        driver.luminosity = Err(SensorError::InvalidData);
        handlers.luminosity.on_event(&mut driver, SensorEvent::Update);
        assert!(!valid(&state, Quantity::Luminosity));
        assert_eq!(state.snapshot().valid_count(), 0);
    }

    #[test]
    fn test_barometer_slots_validate_independently() {
        let state = SharedState::<NoopRawMutex>::new();
        let handlers = Handlers::new(&state);
        let mut driver = MockDriver::new();

        driver.altitude = Ok(312.0);
        driver.pressure = Err(SensorError::InvalidData);
        handlers.barometer.on_event(&mut driver, SensorEvent::Update);
        assert!(valid(&state, Quantity::Altitude));
        assert!(!valid(&state, Quantity::Pressure));

        driver.altitude = Err(SensorError::InvalidData);
        driver.pressure = Ok(98_123.0);
        handlers.barometer.on_event(&mut driver, SensorEvent::Update);
        assert!(!valid(&state, Quantity::Altitude));
        assert_eq!(
            state.read(|s| s.slot(Quantity::Pressure).value()),
            Some(98_123.0)
        );
    }

    #[test]
    fn test_acceleration_all_or_nothing() {
        let state = SharedState::<NoopRawMutex>::new();
        let handlers = Handlers::new(&state);
        let mut driver = MockDriver::new();

        driver.acceleration = Ok(Acceleration::new(0.01, -0.02, 1.0));
        handlers.accelerometer.on_event(&mut driver, SensorEvent::Update);
        for axis in Quantity::ACCELERATION {
            assert!(valid(&state, axis));
        }
        assert_eq!(
            state.read(|s| s.slot(Quantity::AccelerationZ).value()),
            Some(1.0)
        );

        driver.acceleration = Err(SensorError::Bus);
        handlers.accelerometer.on_event(&mut driver, SensorEvent::Update);
        for axis in Quantity::ACCELERATION {
            assert!(!valid(&state, axis));
        }
    }

    #[test]
    fn test_acceleration_ignores_non_update_events() {
        let state = SharedState::<NoopRawMutex>::new();
        let handlers = Handlers::new(&state);
        let mut driver = MockDriver::new();

        driver.acceleration = Ok(Acceleration::new(0.0, 0.0, 1.0));
        handlers.accelerometer.on_event(&mut driver, SensorEvent::Update);

        driver.acceleration = Err(SensorError::Bus);
        handlers.accelerometer.on_event(&mut driver, SensorEvent::Error);
        handlers.accelerometer.on_event(&mut driver, SensorEvent::Alarm);

        assert_eq!(driver.pulls, 1);
        for axis in Quantity::ACCELERATION {
            assert!(valid(&state, axis));
        }
    }
}
