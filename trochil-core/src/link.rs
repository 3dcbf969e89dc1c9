//! Comm link front end
//!
//! One [`CommLink`] owns the frame decoder, the console, and the
//! parameter registry, and is the single entry point for received
//! bytes. The firmware's receive path calls [`CommLink::feed`] for
//! every byte the transport delivers.

use trochil_protocol::{DecodeEvent, FrameDecoder, Reply};

use crate::console::Console;
use crate::dispatch;
use crate::params::Registry;
use crate::state::SharedState;
use crate::traits::{Platform, SerialTx};

/// The board's serial intake: decoder, console, and registry in one place
#[derive(Debug, Clone)]
pub struct CommLink {
    decoder: FrameDecoder,
    console: Console,
    registry: Registry,
}

impl CommLink {
    /// Create a link around the given parameter table
    pub fn new(registry: Registry) -> Self {
        Self {
            decoder: FrameDecoder::new(),
            console: Console::new(),
            registry,
        }
    }

    /// Create a link with the board's standard parameter table
    pub fn with_standard_table() -> Self {
        Self::new(Registry::standard())
    }

    /// The parameter table behind this link
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Process one received byte to completion
    ///
    /// Binary framing wins whenever the start marker appears while the
    /// decoder is idle; every other idle byte goes to the console.
    /// Rejected frames are answered with a NACK. Only transport errors
    /// propagate to the caller.
    pub fn feed<T, P>(
        &mut self,
        byte: u8,
        ctx: &mut SharedState,
        tx: &mut T,
        platform: &mut P,
    ) -> Result<(), T::Error>
    where
        T: SerialTx,
        P: Platform,
    {
        match self.decoder.feed(byte) {
            DecodeEvent::Pending => Ok(()),
            DecodeEvent::Console(byte) => self.console.feed(byte, ctx, tx),
            DecodeEvent::Frame(frame) => {
                dispatch::process(&frame, &self.registry, ctx, tx, platform)
            }
            DecodeEvent::Reject(_) => dispatch::send(tx, &Reply::Nack),
        }
    }
}
