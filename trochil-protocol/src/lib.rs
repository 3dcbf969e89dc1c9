//! Remote-link wire protocol for the Trochil drive board.
//!
//! This crate defines the framed binary protocol spoken between the drive
//! board and remote tooling over its serial link. The same byte stream
//! doubles as a human console: bytes that arrive while no frame is in
//! progress are handed back to the caller for line-oriented handling.
//!
//! # Protocol Overview
//!
//! All messages use a simple binary frame format:
//! ```text
//! ┌───────┬────────┬─────────┬──────────────┬──────────┐
//! │ START │ LENGTH │ COMMAND │ PAYLOAD      │ CHECKSUM │
//! │ 1B    │ 1B     │ 1B      │ 0–29B        │ 1B       │
//! └───────┴────────┴─────────┴──────────────┴──────────┘
//! ```
//!
//! LENGTH counts every byte after itself, command through checksum
//! inclusive. The checksum makes the whole run from LENGTH through
//! CHECKSUM sum to zero modulo 256, so one accumulator both validates
//! inbound frames and seals outbound ones.

#![no_std]
#![deny(unsafe_code)]

pub mod checksum;
pub mod frame;
pub mod messages;

pub use checksum::Checksum;
pub use frame::{
    DecodeEvent, Frame, FrameDecoder, FrameError, FRAME_START, MAX_FRAME_LEN, MAX_FRAME_SIZE,
    MAX_PAYLOAD_SIZE, MIN_FRAME_LEN,
};
pub use messages::{
    Reply, Request, CMD_ACK, CMD_NACK, CMD_READ_VALUE, CMD_REBOOT, CMD_UNKNOWN, CMD_WRITE_VALUE,
};
