//! Cooperative trigger loop
//!
//! Drives a [`ReportTrigger`] on an async executor: wait for an activation,
//! report, sleep until the cooldown deadline, re-arm. Activations that
//! arrive while cooling down are dropped when the trigger re-arms, so a
//! press during the cooldown never produces a delayed report.

use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_sync::signal::Signal;

use crate::domain::SharedState;
use crate::ports::{Indicator, OutputSink, Timebase};
use crate::trigger::{Activation, ReportTrigger};

/// Everything one trigger loop needs, borrowed for the task's lifetime
pub struct TriggerTask<'a, M, A, T, S, I>
where
    M: RawMutex,
    A: RawMutex,
{
    /// The state machine being driven
    pub trigger: ReportTrigger,
    /// Snapshot to report
    pub state: &'a SharedState<M>,
    /// Raised once per debounced button press
    pub activations: &'a Signal<A, ()>,
    /// Time source for the cooldown
    pub timebase: T,
    /// Report output
    pub sink: S,
    /// Acknowledgment pulse
    pub indicator: I,
}

impl<M, A, T, S, I> TriggerTask<'_, M, A, T, S, I>
where
    M: RawMutex,
    A: RawMutex,
    T: Timebase,
    S: OutputSink,
    I: Indicator,
{
    /// One Idle → Cooldown → Idle cycle
    pub async fn run_once(&mut self) -> Activation {
        self.activations.wait().await;

        let outcome = self.trigger.activate(
            self.timebase.now(),
            self.state,
            &mut self.sink,
            &mut self.indicator,
        );

        if let Some(deadline) = self.trigger.deadline() {
            self.timebase.wait_until(deadline).await;
            self.trigger.poll(self.timebase.now());
        }

        self.activations.reset();
        outcome
    }

    /// Run forever
    pub async fn run(&mut self) -> ! {
        info!("report trigger task started");
        loop {
            self.run_once().await;
        }
    }
}
