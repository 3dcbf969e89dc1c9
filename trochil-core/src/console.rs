//! ASCII console fallback
//!
//! Bytes the frame decoder classifies as non-framing land here. The
//! console buffers one line, echoes each accepted character back over
//! the link (the remote end is a dumb terminal), and interprets the
//! line at the terminator. Single-character commands, case-insensitive.

use core::fmt::Write as _;

use heapless::{String, Vec};

use crate::state::SharedState;
use crate::traits::SerialTx;

/// Line buffer capacity; bytes beyond this are rejected
pub const MAX_LINE_LEN: usize = 20;

/// Echoed in place of a byte that did not fit in the line buffer
pub const OVERFLOW_MARKER: u8 = b'#';

/// Sent after every interpreted line
pub const PROMPT: u8 = b'>';

const MAX_REPLY_LEN: usize = 32;

const HELP_TEXT: &str = "Trochil Mk1\r\n\
Cmds:\r\n\
 E -Enable Debug\r\n\
 D -Disable Debug\r\n\
 S -Enable Sensor control\r\n\
 T -Disable Sensor control\r\n\
 F/B/X -Faster/Slower/Stop\r\n\
 ? -show this\r\n";

/// Line-buffered text command interpreter
#[derive(Debug, Clone, Default)]
pub struct Console {
    line: Vec<u8, MAX_LINE_LEN>,
}

impl Console {
    /// Create a console with an empty line buffer
    pub const fn new() -> Self {
        Self { line: Vec::new() }
    }

    /// Handle one non-framing byte
    ///
    /// A terminator (CR or LF) is echoed, the buffered line is
    /// interpreted and cleared, and the prompt follows. Any other byte
    /// is stored and echoed while the buffer has room; once it is full
    /// the overflow marker is echoed instead and the byte is dropped.
    pub fn feed<T: SerialTx>(
        &mut self,
        byte: u8,
        ctx: &mut SharedState,
        tx: &mut T,
    ) -> Result<(), T::Error> {
        if byte == b'\r' || byte == b'\n' {
            tx.write_blocking(&[byte])?;
            self.interpret(ctx, tx)?;
            self.line.clear();
            tx.write_blocking(&[PROMPT])?;
        } else if self.line.push(byte).is_ok() {
            tx.write_blocking(&[byte])?;
        } else {
            tx.write_blocking(&[OVERFLOW_MARKER])?;
        }
        Ok(())
    }

    /// Interpret the buffered line; empty lines produce no reply text
    fn interpret<T: SerialTx>(&self, ctx: &mut SharedState, tx: &mut T) -> Result<(), T::Error> {
        let Some(&cmd) = self.line.first() else {
            return Ok(());
        };

        let mut reply = String::<MAX_REPLY_LEN>::new();
        match cmd.to_ascii_uppercase() {
            b'?' => return tx.write_blocking(HELP_TEXT.as_bytes()),
            b'E' => {
                ctx.debug_output = true;
                let _ = write!(reply, "Debug now {}\r\n", ctx.debug_output as u8);
            }
            b'D' => {
                ctx.debug_output = false;
                let _ = write!(reply, "Debug now {}\r\n", ctx.debug_output as u8);
            }
            b'S' => {
                ctx.sensor_control = true;
                let _ = write!(reply, "Sensor control now {}\r\n", ctx.sensor_control as u8);
            }
            b'T' => {
                ctx.sensor_control = false;
                let _ = write!(reply, "Sensor control now {}\r\n", ctx.sensor_control as u8);
            }
            b'F' => {
                self.step_manual(ctx, 10);
                let _ = write!(reply, "Forward 10 set\r\n");
            }
            b'B' => {
                self.step_manual(ctx, -10);
                let _ = write!(reply, "Backward 10 set\r\n");
            }
            b'X' => {
                ctx.manual_setpoint = 0;
                self.step_manual(ctx, 0);
                let _ = write!(reply, "Stop set\r\n");
            }
            _ => {
                let _ = write!(reply, "Unknown cmd {}\r\n", cmd as char);
            }
        }
        tx.write_blocking(reply.as_bytes())
    }

    /// Step the manual setpoint and force manual control
    ///
    /// The setpoint restarts from zero when the drive was disabled, so
    /// the first command after a stop always yields ±10, not a step
    /// from a stale value.
    fn step_manual(&self, ctx: &mut SharedState, delta: i32) {
        if !ctx.drive_enabled {
            ctx.manual_setpoint = 0;
        }
        ctx.manual_setpoint += delta;
        ctx.speed_left = ctx.manual_setpoint;
        ctx.speed_right = ctx.manual_setpoint;
        ctx.sensor_control = false;
        ctx.drive_enabled = true;
    }
}
