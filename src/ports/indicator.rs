//! Indicator port - visible acknowledgment of a report

use embassy_time::Duration;

/// Port for a fire-and-forget acknowledgment pulse (typically an LED)
pub trait Indicator {
    /// Turn the indicator on for `duration`, then off again.
    ///
    /// Must return immediately; switching off is the adapter's job.
    fn pulse(&mut self, duration: Duration);
}

impl<I: Indicator + ?Sized> Indicator for &mut I {
    fn pulse(&mut self, duration: Duration) {
        (**self).pulse(duration)
    }
}
