//! Output sink port - where report bytes go
//!
//! This trait lets the trigger task emit its report without knowing the
//! transport (USB CDC, UART, a test buffer). Writes are fire-and-forget:
//! the core never retries and never waits on backpressure.

use thiserror::Error;

/// Error type for sink writes
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SinkError {
    /// The transport buffer cannot take the bytes right now
    #[error("output buffer full")]
    Full,
    /// No host is connected
    #[error("output not connected")]
    Disconnected,
}

/// Port for emitting report bytes
///
/// # Example Implementation
///
/// ```ignore
/// struct UartSink<'d> {
///     uart: BufferedUartTx<'d>,
/// }
///
/// impl OutputSink for UartSink<'_> {
///     fn write(&mut self, bytes: &[u8]) -> Result<(), SinkError> {
///         self.uart.blocking_write(bytes).map_err(|_| SinkError::Disconnected)?;
///         Ok(())
///     }
/// }
/// ```
pub trait OutputSink {
    /// Write all of `bytes`, or report why they could not be written.
    ///
    /// Must not block.
    fn write(&mut self, bytes: &[u8]) -> Result<(), SinkError>;
}

impl<S: OutputSink + ?Sized> OutputSink for &mut S {
    fn write(&mut self, bytes: &[u8]) -> Result<(), SinkError> {
        (**self).write(bytes)
    }
}
