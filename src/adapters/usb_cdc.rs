//! USB CDC output adapter
//!
//! Moves report bytes from the [`PipeSink`](super::PipeSink) pipe to the
//! host over CDC ACM (serial over USB), in 64-byte packets.

use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_sync::pipe::Pipe;
use embassy_usb::class::cdc_acm::CdcAcmClass;
use embassy_usb::driver::Driver;

/// USB packet size (CDC ACM max)
pub const USB_PACKET_SIZE: usize = 64;

/// Drain `pipe` into `class` forever.
///
/// While no host is attached the pipe keeps filling; once it is full,
/// report lines are dropped by the sink instead of blocking the trigger.
pub async fn drain_to_usb<'d, D, M, const N: usize>(
    pipe: &Pipe<M, N>,
    class: &mut CdcAcmClass<'d, D>,
) -> !
where
    D: Driver<'d>,
    M: RawMutex,
{
    let mut packet = [0u8; USB_PACKET_SIZE];

    loop {
        class.wait_connection().await;
        info!("USB connected");

        loop {
            let n = pipe.read(&mut packet).await;
            if let Err(e) = class.write_packet(&packet[..n]).await {
                warn!("USB write failed: {:?}", e);
                break;
            }

            // A full packet only completes the host's read once a short
            // packet follows.
            if n == USB_PACKET_SIZE && pipe.is_empty() {
                if let Err(e) = class.write_packet(&[]).await {
                    warn!("USB write failed: {:?}", e);
                    break;
                }
            }
        }

        info!("USB disconnected");
    }
}
