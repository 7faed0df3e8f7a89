//! Sensor Node with Button-Triggered USB Reports
//!
//! Wires the reporting core onto an RP2040 board with embassy. Every press of
//! the button prints one report of the latest sensor snapshot over USB serial
//! and blinks the LED; presses during the following cooldown are ignored.
//!
//! # Tasks
//!
//! ```text
//! ┌──────────────┐   SensorEvent   ┌──────────────┐
//! │ sensor tasks │ ───────────────►│ SharedState  │
//! └──────────────┘   (handlers)    └──────┬───────┘
//!                                         │ snapshot
//! ┌──────────────┐    Signal<()>   ┌──────▼───────┐   Pipe    ┌────────────┐
//! │ button task  │ ───────────────►│ trigger task │ ─────────►│ usb drain  │
//! └──────────────┘                 └──────┬───────┘           └────────────┘
//!                                         │ Signal<Duration>
//!                                  ┌──────▼───────┐
//!                                  │   led task   │
//!                                  └──────────────┘
//! ```
//!
//! The only sensor on a bare board is the RP2040's on-die thermometer; the
//! other handlers are ready for external drivers implementing the matching
//! capability traits.
//!
//! ```bash
//! cargo run --release --features rp2040 --example report_node
//! cargo run --features std --bin readout_host -- --location desk
//! ```

#![no_std]
#![no_main]

use defmt::*;
use embassy_executor::Spawner;
use embassy_rp::adc::{self, Adc};
use embassy_rp::bind_interrupts;
use embassy_rp::gpio::{Input, Level, Output, Pull};
use embassy_rp::peripherals::USB;
use embassy_rp::usb::{Driver, InterruptHandler as UsbInterruptHandler};
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::pipe::Pipe;
use embassy_sync::signal::Signal;
use embassy_time::{Duration, Timer};
use embassy_usb::class::cdc_acm::{CdcAcmClass, State};
use embassy_usb::{Builder, Config, UsbDevice};
use static_cell::StaticCell;
use {defmt_rtt as _, panic_probe as _};

use sensor_node::adapters::usb_cdc::USB_PACKET_SIZE;
use sensor_node::adapters::{
    drain_to_usb, led_task, EmbassyTimebase, LedPolarity, PipeSink, SignalIndicator,
};
use sensor_node::runner::TriggerTask;
use sensor_node::{
    Handlers, NodeConfig, ReportTrigger, SensorDriver, SensorError, SensorEvent, SensorHandler,
    SharedState, Thermometer, TriggerConfig,
};

// ============================================================================
// Configuration
// ============================================================================

const CONFIG: NodeConfig = NodeConfig::low_power();

/// Button settle time after a falling edge
const DEBOUNCE: Duration = Duration::from_millis(20);

/// Report bytes buffered while no host is attached
const PIPE_SIZE: usize = 1024;

// ============================================================================
// Shared State
// ============================================================================

type Mutex = CriticalSectionRawMutex;

static STATE: SharedState<Mutex> = SharedState::new();
static HANDLERS: Handlers<'static, Mutex> = Handlers::new(&STATE);

static REPORT_PIPE: Pipe<Mutex, PIPE_SIZE> = Pipe::new();
static BUTTON: Signal<Mutex, ()> = Signal::new();
static LED: Signal<Mutex, Duration> = Signal::new();

bind_interrupts!(struct Irqs {
    USBCTRL_IRQ => UsbInterruptHandler<USB>;
});

// ============================================================================
// Onboard Thermometer
// ============================================================================

/// RP2040 on-die temperature sensor read through the ADC
///
/// `T = 27 - (V - 0.706) / 0.001721` with `V = raw * 3.3 / 4096`.
struct OnboardThermometer<'d> {
    adc: Adc<'d, adc::Blocking>,
    channel: adc::Channel<'d>,
    interval: Duration,
}

impl<'d> OnboardThermometer<'d> {
    const VREF: f32 = 3.3;
    const FULL_SCALE: f32 = 4096.0;

    fn new(adc: Adc<'d, adc::Blocking>, channel: adc::Channel<'d>) -> Self {
        Self {
            adc,
            channel,
            interval: Duration::from_secs(1),
        }
    }

    fn celsius(raw: u16) -> f32 {
        let volts = raw as f32 * Self::VREF / Self::FULL_SCALE;
        27.0 - (volts - 0.706) / 0.001721
    }
}

impl SensorDriver for OnboardThermometer<'_> {
    fn set_update_interval(&mut self, interval: Duration) {
        self.interval = interval;
    }
}

impl Thermometer for OnboardThermometer<'_> {
    fn temperature_celsius(&mut self) -> Result<f32, SensorError> {
        let raw = self
            .adc
            .blocking_read(&mut self.channel)
            .map_err(|_| SensorError::Bus)?;
        Ok(Self::celsius(raw))
    }
}

// ============================================================================
// Main Entry Point
// ============================================================================

#[embassy_executor::main]
async fn main(spawner: Spawner) {
    info!("=== Sensor Node ===");
    let p = embassy_rp::init(Default::default());

    let adc = Adc::new_blocking(p.ADC, adc::Config::default());
    let mut thermometer =
        OnboardThermometer::new(adc, adc::Channel::new_temp_sensor(p.ADC_TEMP_SENSOR));
    CONFIG.sensors.apply_temperature(&mut thermometer);

    let (usb, class) = setup_usb(Driver::new(p.USB, Irqs));

    unwrap!(spawner.spawn(usb_device_task(usb)));
    unwrap!(spawner.spawn(usb_drain_task(class)));
    unwrap!(spawner.spawn(led_pulse_task(Output::new(p.PIN_25, Level::Low))));
    unwrap!(spawner.spawn(button_task(Input::new(p.PIN_15, Pull::Up))));
    unwrap!(spawner.spawn(thermometer_task(thermometer)));
    unwrap!(spawner.spawn(trigger_task(CONFIG.trigger)));

    info!("All tasks spawned");
}

// ============================================================================
// USB Setup
// ============================================================================

fn setup_usb(
    driver: Driver<'static, USB>,
) -> (
    UsbDevice<'static, Driver<'static, USB>>,
    CdcAcmClass<'static, Driver<'static, USB>>,
) {
    let mut config = Config::new(0x2e8a, 0x000a);
    config.manufacturer = Some("Sensor Node");
    config.product = Some("Environment Reporter");
    config.serial_number = Some("NODE0001");
    config.max_power = 100;
    config.max_packet_size_0 = 64;

    static CONFIG_DESCRIPTOR: StaticCell<[u8; 256]> = StaticCell::new();
    static BOS_DESCRIPTOR: StaticCell<[u8; 256]> = StaticCell::new();
    static CONTROL_BUF: StaticCell<[u8; 64]> = StaticCell::new();
    static CDC_STATE: StaticCell<State> = StaticCell::new();

    let mut builder = Builder::new(
        driver,
        config,
        CONFIG_DESCRIPTOR.init([0; 256]),
        BOS_DESCRIPTOR.init([0; 256]),
        &mut [],
        CONTROL_BUF.init([0; 64]),
    );

    let class = CdcAcmClass::new(
        &mut builder,
        CDC_STATE.init(State::new()),
        USB_PACKET_SIZE as u16,
    );
    (builder.build(), class)
}

// ============================================================================
// Tasks
// ============================================================================

#[embassy_executor::task]
async fn usb_device_task(mut usb: UsbDevice<'static, Driver<'static, USB>>) -> ! {
    usb.run().await
}

#[embassy_executor::task]
async fn usb_drain_task(mut class: CdcAcmClass<'static, Driver<'static, USB>>) -> ! {
    drain_to_usb(&REPORT_PIPE, &mut class).await
}

#[embassy_executor::task]
async fn led_pulse_task(pin: Output<'static>) -> ! {
    led_task(&LED, pin, LedPolarity::ActiveHigh).await
}

/// Debounced falling edge raises one activation
#[embassy_executor::task]
async fn button_task(mut button: Input<'static>) -> ! {
    loop {
        button.wait_for_falling_edge().await;
        Timer::after(DEBOUNCE).await;
        if button.is_low() {
            debug!("button pressed");
            BUTTON.signal(());
        }
        button.wait_for_high().await;
    }
}

#[embassy_executor::task]
async fn thermometer_task(mut thermometer: OnboardThermometer<'static>) -> ! {
    loop {
        Timer::after(thermometer.interval).await;
        HANDLERS
            .temperature
            .on_event(&mut thermometer, SensorEvent::Update);
    }
}

#[embassy_executor::task]
async fn trigger_task(config: TriggerConfig) -> ! {
    let mut task = TriggerTask {
        trigger: ReportTrigger::new(config),
        state: &STATE,
        activations: &BUTTON,
        timebase: EmbassyTimebase,
        sink: PipeSink::new(&REPORT_PIPE),
        indicator: SignalIndicator::new(&LED),
    };
    task.run().await
}
