//! End-to-end byte-level scenarios over the full comm link
//!
//! Every test feeds raw wire bytes into a [`CommLink`] and checks the
//! raw bytes (and platform calls) that come back out.

use std::cell::RefCell;
use std::rc::Rc;

use proptest::prelude::*;

use trochil_core::dispatch::REBOOT_DELAY_MS;
use trochil_core::params::codes;
use trochil_core::state::SpeedPair;
use trochil_core::traits::{Platform, SerialTx};
use trochil_core::{CommLink, SharedState};
use trochil_protocol::{Frame, Request, CMD_READ_VALUE, CMD_REBOOT, FRAME_START};

/// Everything the board did, in order
#[derive(Debug, Clone, PartialEq, Eq)]
enum Event {
    Sent(Vec<u8>),
    Delay(u32),
    Reset,
}

#[derive(Clone, Default)]
struct EventLog(Rc<RefCell<Vec<Event>>>);

impl EventLog {
    fn push(&self, event: Event) {
        self.0.borrow_mut().push(event);
    }

    fn take(&self) -> Vec<Event> {
        self.0.borrow_mut().drain(..).collect()
    }

    /// All transmitted bytes, concatenated
    fn sent(&self) -> Vec<u8> {
        self.0
            .borrow()
            .iter()
            .filter_map(|e| match e {
                Event::Sent(bytes) => Some(bytes.clone()),
                _ => None,
            })
            .flatten()
            .collect()
    }
}

struct LogTx(EventLog);

impl SerialTx for LogTx {
    type Error = std::convert::Infallible;

    fn write_blocking(&mut self, data: &[u8]) -> Result<(), Self::Error> {
        self.0.push(Event::Sent(data.to_vec()));
        Ok(())
    }
}

struct LogPlatform(EventLog);

impl Platform for LogPlatform {
    fn delay_ms(&mut self, ms: u32) {
        self.0.push(Event::Delay(ms));
    }

    fn system_reset(&mut self) {
        self.0.push(Event::Reset);
    }
}

/// A board with the standard table, a recording transport, and a
/// recording platform
struct Board {
    link: CommLink,
    ctx: SharedState,
    tx: LogTx,
    platform: LogPlatform,
    log: EventLog,
}

impl Board {
    fn new() -> Self {
        let log = EventLog::default();
        Self {
            link: CommLink::with_standard_table(),
            ctx: SharedState::new(),
            tx: LogTx(log.clone()),
            platform: LogPlatform(log.clone()),
            log,
        }
    }

    fn feed(&mut self, bytes: &[u8]) {
        for &byte in bytes {
            self.link
                .feed(byte, &mut self.ctx, &mut self.tx, &mut self.platform)
                .unwrap();
        }
    }
}

fn encode(request: &Request) -> Vec<u8> {
    request.to_frame().unwrap().encode_to_vec().unwrap().to_vec()
}

#[test]
fn read_version_returns_the_documented_bytes() {
    let mut board = Board::new();
    board.feed(&[0x02, 0x03, 0x01, 0x00, 0xFC]);
    assert_eq!(
        board.log.sent(),
        [0x02, 0x07, 0x01, 0x00, 0x01, 0x00, 0x00, 0x00, 0xF7]
    );
}

#[test]
fn read_unknown_code_echoes_command_and_code_with_no_data() {
    let mut board = Board::new();
    board.feed(&encode(&Request::ReadValue { code: 0x55 }));
    // LENGTH 3: command, code, checksum; no data bytes
    assert_eq!(board.log.sent(), [0x02, 0x03, 0x01, 0x55, 0xA7]);
}

#[test]
fn write_speed_applies_and_reads_back() {
    let mut board = Board::new();
    let pair = SpeedPair {
        left: 120,
        right: -45,
    };

    board.feed(&encode(&Request::WriteValue {
        code: codes::SPEED_SETPOINTS,
        content: &pair.to_le_bytes(),
    }));
    // Write reply is command + code only
    assert_eq!(board.log.take().len(), 1);
    assert_eq!(board.ctx.speed_left, 120);
    assert_eq!(board.ctx.speed_right, -45);

    board.feed(&encode(&Request::ReadValue {
        code: codes::SPEED_SETPOINTS,
    }));
    let sent = board.log.sent();
    // [START][LEN][CMD][CODE][8 data bytes][CS]
    assert_eq!(sent.len(), 13);
    assert_eq!(&sent[4..12], &pair.to_le_bytes());
}

#[test]
fn write_reply_carries_no_data() {
    let mut board = Board::new();
    board.feed(&encode(&Request::WriteValue {
        code: codes::SPEED_SETPOINTS,
        content: &[0u8; 8],
    }));
    assert_eq!(board.log.sent(), [0x02, 0x03, 0x02, 0x03, 0xF8]);
}

#[test]
fn wrong_length_write_replies_normally_but_writes_nothing() {
    let mut board = Board::new();
    board.feed(&encode(&Request::WriteValue {
        code: codes::SPEED_SETPOINTS,
        content: &[1, 2, 3],
    }));
    assert_eq!(board.log.sent(), [0x02, 0x03, 0x02, 0x03, 0xF8]);
    assert_eq!(board.ctx.speed_left, 0);
    assert_eq!(board.ctx.speed_right, 0);
}

#[test]
fn corrupted_checksum_gets_one_nack() {
    let mut board = Board::new();
    let mut bytes = encode(&Request::ReadValue { code: 0x00 });
    let last = bytes.len() - 1;
    bytes[last] ^= 0x01;

    board.feed(&bytes);
    assert_eq!(board.log.sent(), [0x02, 0x02, 0x04, 0xFA]);
}

#[test]
fn oversized_declared_length_gets_nack_at_the_length_byte() {
    let mut board = Board::new();
    board.feed(&[FRAME_START, 0xFF]);
    assert_eq!(board.log.sent(), [0x02, 0x02, 0x04, 0xFA]);

    // Decoder is idle again: a good frame still works
    board.log.take();
    board.feed(&[0x02, 0x03, 0x01, 0x00, 0xFC]);
    assert_eq!(board.log.sent().len(), 9);
}

#[test]
fn unrecognized_command_gets_unknown_marker() {
    let mut board = Board::new();
    let bytes = Frame::empty(0x7F).encode_to_vec().unwrap();
    board.feed(&bytes);
    assert_eq!(board.log.sent(), [0x02, 0x02, 0x06, 0xF8]);
}

#[test]
fn runt_read_without_code_gets_unknown_marker() {
    let mut board = Board::new();
    let bytes = Frame::empty(CMD_READ_VALUE).encode_to_vec().unwrap();
    board.feed(&bytes);
    assert_eq!(board.log.sent(), [0x02, 0x02, 0x06, 0xF8]);
}

#[test]
fn reboot_acks_then_delays_then_resets() {
    let mut board = Board::new();
    let bytes = Frame::empty(CMD_REBOOT).encode_to_vec().unwrap();
    board.feed(&bytes);
    assert_eq!(
        board.log.take(),
        vec![
            Event::Sent(vec![0x02, 0x02, 0x03, 0xFB]),
            Event::Delay(REBOOT_DELAY_MS),
            Event::Reset,
        ]
    );
}

#[test]
fn console_line_survives_an_interleaved_frame() {
    let mut board = Board::new();

    // Start typing a console command...
    board.feed(b"E");
    // ...a binary frame barges in...
    board.feed(&[0x02, 0x03, 0x01, 0x00, 0xFC]);
    // ...and the typed line still finishes normally.
    board.feed(b"\n");

    assert!(board.ctx.debug_output);
    let sent = board.log.sent();
    assert!(sent.ends_with(b"Debug now 1\r\n>"));
}

#[test]
fn console_f_command_over_the_link() {
    let mut board = Board::new();
    board.feed(b"F\n");
    assert_eq!(board.ctx.manual_setpoint, 10);
    assert!(!board.ctx.sensor_control);
    assert_eq!(board.log.sent(), b"F\nForward 10 set\r\n>");
}

proptest! {
    /// Writing any speed pair and reading it back returns the same bytes.
    #[test]
    fn speed_roundtrip(left in any::<i32>(), right in any::<i32>()) {
        let mut board = Board::new();
        let pair = SpeedPair { left, right };

        board.feed(&encode(&Request::WriteValue {
            code: codes::SPEED_SETPOINTS,
            content: &pair.to_le_bytes(),
        }));
        board.log.take();

        board.feed(&encode(&Request::ReadValue {
            code: codes::SPEED_SETPOINTS,
        }));
        let sent = board.log.sent();
        prop_assert_eq!(&sent[4..12], &pair.to_le_bytes());
        prop_assert_eq!(board.ctx.speed_left, left);
        prop_assert_eq!(board.ctx.speed_right, right);
    }
}
