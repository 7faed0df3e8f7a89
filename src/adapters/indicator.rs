//! LED indicator adapter
//!
//! [`SignalIndicator`] implements the [`Indicator`] port by posting the
//! pulse length to a [`Signal`]; [`led_task`] owns the pin and performs the
//! timed on/off, so the reporting code never waits for the LED.

use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_sync::signal::Signal;
use embassy_time::Duration;

use crate::ports::indicator::Indicator;

/// Indicator that hands pulses to a separate LED task
pub struct SignalIndicator<'s, M: RawMutex> {
    signal: &'s Signal<M, Duration>,
}

impl<'s, M: RawMutex> SignalIndicator<'s, M> {
    /// Create an indicator posting to `signal`
    pub const fn new(signal: &'s Signal<M, Duration>) -> Self {
        Self { signal }
    }
}

impl<M: RawMutex> Indicator for SignalIndicator<'_, M> {
    fn pulse(&mut self, duration: Duration) {
        self.signal.signal(duration);
    }
}

/// Which pin level lights the LED
#[cfg(feature = "device")]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LedPolarity {
    /// LED on when the pin is high
    ActiveHigh,
    /// LED on when the pin is low
    ActiveLow,
}

/// Drive an LED from pulse requests. Never returns.
///
/// A request arriving while the LED is lit is served after the current
/// pulse ends.
#[cfg(feature = "device")]
pub async fn led_task<M, P>(signal: &Signal<M, Duration>, mut pin: P, polarity: LedPolarity) -> !
where
    M: RawMutex,
    P: embedded_hal::digital::OutputPin,
{
    use embedded_hal::digital::PinState;

    let (on, off) = match polarity {
        LedPolarity::ActiveHigh => (PinState::High, PinState::Low),
        LedPolarity::ActiveLow => (PinState::Low, PinState::High),
    };

    let _ = pin.set_state(off);
    loop {
        let duration = signal.wait().await;
        let _ = pin.set_state(on);
        embassy_time::Timer::after(duration).await;
        let _ = pin.set_state(off);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embassy_sync::blocking_mutex::raw::NoopRawMutex;

    #[test]
    fn test_pulse_posts_duration() {
        let signal = Signal::<NoopRawMutex, Duration>::new();
        let mut indicator = SignalIndicator::new(&signal);

        indicator.pulse(Duration::from_millis(10));
        assert_eq!(signal.try_take(), Some(Duration::from_millis(10)));
        assert_eq!(signal.try_take(), None);
    }
}
