//! Command dispatcher
//!
//! Turns one validated frame into exactly one response frame. Stateless:
//! everything it touches is passed in per call.

use trochil_protocol::{Frame, Reply, Request};

use crate::params::Registry;
use crate::state::SharedState;
use crate::traits::{Platform, SerialTx};

/// Pause between the reboot ACK and the actual reset, long enough for
/// the ACK to drain out of the transmitter
pub const REBOOT_DELAY_MS: u32 = 500;

/// Process one validated frame and send its response
///
/// Every frame gets exactly one reply. A read or write naming an
/// unknown code answers with the command and code and no data; the
/// wire has no distinct error shape for a miss. The reboot command
/// ACKs first, then delays and resets through the platform.
pub fn process<T, P>(
    frame: &Frame,
    registry: &Registry,
    ctx: &mut SharedState,
    tx: &mut T,
    platform: &mut P,
) -> Result<(), T::Error>
where
    T: SerialTx,
    P: Platform,
{
    match Request::from_frame(frame) {
        Some(Request::ReadValue { code }) => match registry.read_value(code, ctx) {
            Ok(data) => send(tx, &Reply::ReadValue { code, data: &data }),
            Err(_) => send(tx, &Reply::ReadValue { code, data: &[] }),
        },
        Some(Request::WriteValue { code, content }) => {
            // A failed write (unknown code, wrong length) is not
            // distinguishable on the wire; the reply shape is the same.
            let _ = registry.write_value(code, ctx, content);
            send(tx, &Reply::WriteValue { code })
        }
        Some(Request::Reboot) => {
            send(tx, &Reply::Ack)?;
            platform.delay_ms(REBOOT_DELAY_MS);
            platform.system_reset();
            Ok(())
        }
        None => send(tx, &Reply::Unknown),
    }
}

/// Encode a reply and push it out the transport
pub fn send<T: SerialTx>(tx: &mut T, reply: &Reply<'_>) -> Result<(), T::Error> {
    // Reply payloads are bounded well inside the frame capacity, so
    // encoding cannot fail for any reply this crate builds.
    if let Ok(frame) = reply.to_frame() {
        if let Ok(bytes) = frame.encode_to_vec() {
            tx.write_blocking(&bytes)?;
        }
    }
    Ok(())
}
