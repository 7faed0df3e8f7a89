//! Pipe-backed output sink
//!
//! The trigger task must not wait on USB, so report bytes go into an
//! in-memory [`Pipe`] and a separate task (see
//! [`drain_to_usb`](crate::adapters::usb_cdc::drain_to_usb)) moves them to
//! the host at the transport's pace.

use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_sync::pipe::Pipe;

use crate::ports::sink::{OutputSink, SinkError};

/// Output sink writing into a byte pipe.
///
/// A write is all-or-nothing: if the pipe cannot take every byte, nothing
/// is written and [`SinkError::Full`] is returned.
pub struct PipeSink<'p, M: RawMutex, const N: usize> {
    pipe: &'p Pipe<M, N>,
}

impl<'p, M: RawMutex, const N: usize> PipeSink<'p, M, N> {
    /// Create a sink feeding `pipe`
    pub const fn new(pipe: &'p Pipe<M, N>) -> Self {
        Self { pipe }
    }

    /// Bytes waiting to be drained
    pub fn pending(&self) -> usize {
        self.pipe.len()
    }
}

impl<M: RawMutex, const N: usize> OutputSink for PipeSink<'_, M, N> {
    fn write(&mut self, bytes: &[u8]) -> Result<(), SinkError> {
        if bytes.len() > self.pipe.free_capacity() {
            return Err(SinkError::Full);
        }

        // The ring buffer may accept a write in two pieces when it wraps.
        let mut rest = bytes;
        while !rest.is_empty() {
            let n = self.pipe.try_write(rest).map_err(|_| SinkError::Full)?;
            rest = &rest[n..];
        }
        Ok(())
    }
}
