//! Report trigger task
//!
//! The trigger is a two-state machine. In [`TriggerState::Idle`] an
//! activation (a debounced button press) writes a report of the current
//! snapshot and moves the trigger to [`TriggerState::Cooldown`]. Once the
//! cooldown deadline has passed the trigger is idle again. Activations
//! arriving during the cooldown are ignored.
//!
//! The deadline is stored in the trigger itself; whoever drives it (the
//! [`runner`](crate::runner), or a test) reads it through
//! [`ReportTrigger::deadline`] and passes the current instant in.

use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_time::{Duration, Instant};
use heapless::String;

use crate::config::TriggerConfig;
use crate::domain::{AggregateState, SharedState};
use crate::ports::{Indicator, OutputSink};
use crate::report_protocol::{write_line, END_DELIMITER, MAX_LINE_LEN, START_DELIMITER};

/// State of the trigger
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TriggerState {
    /// Waiting for an activation
    Idle,
    /// Just fired; activations are ignored until `until`
    Cooldown {
        /// Instant at which the trigger becomes idle again
        until: Instant,
    },
}

/// What a fired report did
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ReportSummary {
    /// Quantity lines in the report (valid slots)
    pub lines: usize,
    /// Sink writes that failed; the report went on regardless
    pub failed_writes: usize,
}

/// Result of one activation
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Activation {
    /// The trigger was idle and wrote a report
    Reported(ReportSummary),
    /// The trigger was cooling down; nothing was written
    Ignored {
        /// Time left until the trigger is idle again
        remaining: Duration,
    },
}

/// The report trigger task
#[derive(Clone, Debug)]
pub struct ReportTrigger {
    config: TriggerConfig,
    state: TriggerState,
}

impl ReportTrigger {
    /// Create an idle trigger
    pub const fn new(config: TriggerConfig) -> Self {
        Self {
            config,
            state: TriggerState::Idle,
        }
    }

    /// Current state
    pub fn state(&self) -> TriggerState {
        self.state
    }

    /// Timing configuration
    pub fn config(&self) -> &TriggerConfig {
        &self.config
    }

    /// Whether the next activation would produce a report (as of the last poll)
    pub fn is_armed(&self) -> bool {
        self.state == TriggerState::Idle
    }

    /// Instant at which the scheduler must re-invoke [`poll`](Self::poll)
    pub fn deadline(&self) -> Option<Instant> {
        match self.state {
            TriggerState::Idle => None,
            TriggerState::Cooldown { until } => Some(until),
        }
    }

    /// Re-arm the trigger if its cooldown has elapsed at `now`.
    ///
    /// Returns `true` when this call moved the trigger back to idle.
    pub fn poll(&mut self, now: Instant) -> bool {
        match self.state {
            TriggerState::Cooldown { until } if now >= until => {
                self.state = TriggerState::Idle;
                debug!("report trigger re-armed");
                true
            }
            _ => false,
        }
    }

    /// Handle one activation at `now`.
    ///
    /// When idle, writes a report of `state` to `sink`, pulses `indicator`
    /// and starts the cooldown. The cooldown starts even if every sink
    /// write failed.
    pub fn activate<M, S, I>(
        &mut self,
        now: Instant,
        state: &SharedState<M>,
        sink: &mut S,
        indicator: &mut I,
    ) -> Activation
    where
        M: RawMutex,
        S: OutputSink + ?Sized,
        I: Indicator + ?Sized,
    {
        self.poll(now);

        if let TriggerState::Cooldown { until } = self.state {
            let remaining = until.saturating_duration_since(now);
            debug!("activation ignored, {} ms of cooldown left", remaining.as_millis());
            return Activation::Ignored { remaining };
        }

        let snapshot = state.snapshot();
        let summary = write_report(&snapshot, sink, indicator, self.config.indicator_pulse);

        let until = now.checked_add(self.config.cooldown).unwrap_or(Instant::MAX);
        self.state = TriggerState::Cooldown { until };

        if summary.failed_writes > 0 {
            warn!("report written with {} failed writes", summary.failed_writes);
        }
        info!("report sent: {} lines", summary.lines);

        Activation::Reported(summary)
    }
}

/// Write one complete report of `snapshot`.
///
/// Start delimiter, one line per valid slot in report order, indicator
/// pulse, end delimiter. Each line is formatted whole into a
/// [`MAX_LINE_LEN`] buffer and handed to the sink in one write, so a
/// failing sink drops lines but never splits one.
pub fn write_report<S, I>(
    snapshot: &AggregateState,
    sink: &mut S,
    indicator: &mut I,
    pulse: Duration,
) -> ReportSummary
where
    S: OutputSink + ?Sized,
    I: Indicator + ?Sized,
{
    write_report_buffered::<MAX_LINE_LEN, S, I>(snapshot, sink, indicator, pulse)
}

/// [`write_report`] with an explicit line buffer size.
///
/// A line that does not fit is not written and counts as a failed write.
fn write_report_buffered<const L: usize, S, I>(
    snapshot: &AggregateState,
    sink: &mut S,
    indicator: &mut I,
    pulse: Duration,
) -> ReportSummary
where
    S: OutputSink + ?Sized,
    I: Indicator + ?Sized,
{
    let mut summary = ReportSummary::default();
    let mut emit = |bytes: &[u8], summary: &mut ReportSummary| {
        if sink.write(bytes).is_err() {
            summary.failed_writes += 1;
        }
    };

    emit(START_DELIMITER.as_bytes(), &mut summary);

    for (quantity, slot) in snapshot.iter() {
        let Some(value) = slot.value() else {
            continue;
        };

        summary.lines += 1;
        let mut line: String<L> = String::new();
        if write_line(&mut line, quantity, value).is_err() {
            warn!("{} line does not fit the line buffer", quantity.tag());
            summary.failed_writes += 1;
            continue;
        }
        emit(line.as_bytes(), &mut summary);
    }

    indicator.pulse(pulse);

    emit(END_DELIMITER.as_bytes(), &mut summary);

    summary
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Quantity;
    use crate::handlers::{Handlers, SensorHandler};
    use crate::ports::{Acceleration, SensorError, SensorEvent};
    use crate::testing::{CountingIndicator, MockDriver, RecordingSink};
    use embassy_sync::blocking_mutex::raw::NoopRawMutex;

    const COOLDOWN: Duration = Duration::from_millis(5000);

    fn at(ms: u64) -> Instant {
        Instant::from_millis(ms)
    }

    #[test]
    fn test_empty_state_reports_only_delimiters() {
        let state = SharedState::<NoopRawMutex>::new();
        let mut trigger = ReportTrigger::new(TriggerConfig::default());
        let mut sink = RecordingSink::default();
        let mut led = CountingIndicator::default();

        let outcome = trigger.activate(at(0), &state, &mut sink, &mut led);
        assert_eq!(
            outcome,
            Activation::Reported(ReportSummary {
                lines: 0,
                failed_writes: 0
            })
        );
        assert_eq!(sink.text(), "---\r\n===\r\n");
        assert_eq!(led.pulses, [Duration::from_millis(10)]);
    }

    #[test]
    fn test_single_temperature_report() {
        let state = SharedState::<NoopRawMutex>::new();
        state.update(|s| s.slot_mut(Quantity::Temperature).set(23.4567));
        let mut trigger = ReportTrigger::new(TriggerConfig::default());
        let mut sink = RecordingSink::default();
        let mut led = CountingIndicator::default();

        trigger.activate(at(0), &state, &mut sink, &mut led);
        assert_eq!(sink.text(), "---\r\nt:23.4567\r\n===\r\n");
    }

    #[test]
    fn test_full_report_order_and_skips() {
        let mut snapshot = AggregateState::new();
        snapshot.slot_mut(Quantity::AccelerationZ).set(0.98);
        snapshot.slot_mut(Quantity::Temperature).set(21.0);
        snapshot.slot_mut(Quantity::Pressure).set(101_325.0);
        snapshot.slot_mut(Quantity::Altitude).fail();
        snapshot.slot_mut(Quantity::Humidity).set(55.25);
        snapshot.slot_mut(Quantity::AccelerationX).set(-0.01);
        snapshot.slot_mut(Quantity::AccelerationY).set(0.02);

        let mut sink = RecordingSink::default();
        let mut led = CountingIndicator::default();
        let summary = write_report(&snapshot, &mut sink, &mut led, Duration::from_millis(10));

        assert_eq!(summary.lines, 6);
        assert_eq!(
            sink.text(),
            "---\r\n\
             t:21.0000\r\n\
             h:55.2500\r\n\
             p:101325.0000\r\n\
             ax:-0.0100\r\n\
             ay:0.0200\r\n\
             az:0.9800\r\n\
             ===\r\n"
        );
    }

    #[test]
    fn test_report_is_deterministic() {
        let mut snapshot = AggregateState::new();
        snapshot.slot_mut(Quantity::Luminosity).set(412.75);
        snapshot.slot_mut(Quantity::Altitude).set(245.5);

        let mut first = RecordingSink::default();
        let mut second = RecordingSink::default();
        let mut led = CountingIndicator::default();
        write_report(&snapshot, &mut first, &mut led, Duration::from_millis(10));
        write_report(&snapshot, &mut second, &mut led, Duration::from_millis(10));

        assert_eq!(first.bytes, second.bytes);
    }

    #[test]
    fn test_second_activation_within_cooldown_is_ignored() {
        let state = SharedState::<NoopRawMutex>::new();
        let mut trigger = ReportTrigger::new(TriggerConfig::default());
        let mut sink = RecordingSink::default();
        let mut led = CountingIndicator::default();

        assert!(matches!(
            trigger.activate(at(1000), &state, &mut sink, &mut led),
            Activation::Reported(_)
        ));
        assert_eq!(trigger.deadline(), Some(at(6000)));

        let outcome = trigger.activate(at(3500), &state, &mut sink, &mut led);
        assert_eq!(
            outcome,
            Activation::Ignored {
                remaining: Duration::from_millis(2500)
            }
        );
        assert_eq!(sink.text(), "---\r\n===\r\n");
        assert_eq!(led.pulses.len(), 1);
    }

    #[test]
    fn test_rearms_exactly_when_cooldown_elapses() {
        let state = SharedState::<NoopRawMutex>::new();
        let mut trigger = ReportTrigger::new(TriggerConfig::default());
        let mut sink = RecordingSink::default();
        let mut led = CountingIndicator::default();

        trigger.activate(at(0), &state, &mut sink, &mut led);
        assert!(!trigger.poll(at(4999)));
        assert!(!trigger.is_armed());

        assert!(trigger.poll(at(5000)));
        assert!(trigger.is_armed());
        assert_eq!(trigger.deadline(), None);

        assert!(matches!(
            trigger.activate(at(5000), &state, &mut sink, &mut led),
            Activation::Reported(_)
        ));
        assert_eq!(trigger.deadline(), Some(at(5000) + COOLDOWN));
    }

    #[test]
    fn test_activation_after_deadline_without_poll_reports() {
        let state = SharedState::<NoopRawMutex>::new();
        let mut trigger = ReportTrigger::new(TriggerConfig::default());
        let mut sink = RecordingSink::default();
        let mut led = CountingIndicator::default();

        trigger.activate(at(0), &state, &mut sink, &mut led);
        assert!(matches!(
            trigger.activate(at(7000), &state, &mut sink, &mut led),
            Activation::Reported(_)
        ));
        assert_eq!(led.pulses.len(), 2);
    }

    #[test]
    fn test_failing_sink_still_completes_and_rearms() {
        let state = SharedState::<NoopRawMutex>::new();
        state.update(|s| {
            s.slot_mut(Quantity::Temperature).set(20.0);
            s.slot_mut(Quantity::Humidity).set(40.0);
        });
        let mut trigger = ReportTrigger::new(TriggerConfig::default());
        let mut sink = RecordingSink::rejecting();
        let mut led = CountingIndicator::default();

        let outcome = trigger.activate(at(0), &state, &mut sink, &mut led);
        assert_eq!(
            outcome,
            Activation::Reported(ReportSummary {
                lines: 2,
                failed_writes: 4
            })
        );
        assert_eq!(sink.writes, 4);
        assert_eq!(led.pulses.len(), 1);
        assert_eq!(trigger.deadline(), Some(at(5000)));
        assert!(trigger.poll(at(5000)));
    }

    #[test]
    fn test_oversized_line_counts_as_failed_write() {
        let mut snapshot = AggregateState::new();
        snapshot.slot_mut(Quantity::Temperature).set(21.0);
        snapshot.slot_mut(Quantity::AccelerationX).set(0.5);

        let mut sink = RecordingSink::default();
        let mut led = CountingIndicator::default();
        // "t:21.0000\r\n" needs 11 bytes, "ax:0.5000\r\n" needs 11
        let summary = write_report_buffered::<10, _, _>(
            &snapshot,
            &mut sink,
            &mut led,
            Duration::from_millis(10),
        );

        assert_eq!(
            summary,
            ReportSummary {
                lines: 2,
                failed_writes: 2
            }
        );
        assert_eq!(sink.text(), "---\r\n===\r\n");
    }

    #[test]
    fn test_failed_accelerometer_drops_axes_from_report() {
        let state = SharedState::<NoopRawMutex>::new();
        let handlers = Handlers::new(&state);
        let mut driver = MockDriver::new();
        let mut trigger = ReportTrigger::new(TriggerConfig::default());
        let mut led = CountingIndicator::default();

        driver.acceleration = Ok(Acceleration::new(0.1, -0.2, 1.0));
        handlers.accelerometer.on_event(&mut driver, SensorEvent::Update);

        let mut before = RecordingSink::default();
        trigger.activate(at(0), &state, &mut before, &mut led);
        assert_eq!(
            before.text(),
            "---\r\nax:0.1000\r\nay:-0.2000\r\naz:1.0000\r\n===\r\n"
        );

        driver.acceleration = Err(SensorError::Bus);
        handlers.accelerometer.on_event(&mut driver, SensorEvent::Update);

        let mut after = RecordingSink::default();
        trigger.activate(at(5000), &state, &mut after, &mut led);
        assert_eq!(after.text(), "---\r\n===\r\n");
    }
}
