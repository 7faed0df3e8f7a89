//! Adapters - concrete implementations of ports
//!
//! Adapters connect the core to the outside world by implementing the port
//! traits. Each adapter knows how to work with a specific technology.
//!
//! # Available Adapters
//!
//! - **pipe_sink**: output sink writing into an embassy byte pipe
//! - **usb_cdc**: task draining that pipe to USB CDC serial (`device`)
//! - **indicator**: LED pulse via a signal and an LED task
//! - **timebase**: embassy-time clock and timer (`device`)

pub mod indicator;
pub mod pipe_sink;
#[cfg(feature = "device")]
pub mod timebase;
#[cfg(feature = "device")]
pub mod usb_cdc;

pub use indicator::SignalIndicator;
#[cfg(feature = "device")]
pub use indicator::{led_task, LedPolarity};
pub use pipe_sink::PipeSink;
#[cfg(feature = "device")]
pub use timebase::EmbassyTimebase;
#[cfg(feature = "device")]
pub use usb_cdc::drain_to_usb;
