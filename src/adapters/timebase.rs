//! Embassy time adapter

use core::future::Future;

use embassy_time::{Instant, Timer};

use crate::ports::clock::{Clock, Timebase};

/// Clock and timebase backed by the embassy time driver
#[derive(Clone, Copy, Debug, Default)]
pub struct EmbassyTimebase;

impl Clock for EmbassyTimebase {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

impl Timebase for EmbassyTimebase {
    fn wait_until(&self, deadline: Instant) -> impl Future<Output = ()> {
        Timer::at(deadline)
    }
}
