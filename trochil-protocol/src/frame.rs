//! Frame encoding and the byte-at-a-time frame decoder.
//!
//! Frame format:
//! - START (1 byte): 0x02 synchronization byte
//! - LENGTH (1 byte): count of bytes after itself, command through
//!   checksum inclusive (2..=32)
//! - COMMAND (1 byte): command code
//! - PAYLOAD (0-29 bytes): command-specific data
//! - CHECKSUM (1 byte): balances the additive sum of LENGTH..CHECKSUM
//!   to zero modulo 256
//!
//! The decoder consumes one byte at a time and never errors to its
//! caller: bytes outside a frame are handed back for console handling,
//! and bad frames come back as [`DecodeEvent::Reject`] so the caller can
//! answer with a NACK.

use heapless::Vec;

use crate::checksum::Checksum;

/// Frame synchronization byte
pub const FRAME_START: u8 = 0x02;

/// Largest LENGTH value a peer may declare (command..checksum)
pub const MAX_FRAME_LEN: usize = 32;

/// Smallest usable LENGTH value: a command byte plus the checksum
pub const MIN_FRAME_LEN: usize = 2;

/// Maximum payload size in bytes (LENGTH minus command and checksum)
pub const MAX_PAYLOAD_SIZE: usize = MAX_FRAME_LEN - 2;

/// Maximum complete frame size (START + LENGTH + command..checksum)
pub const MAX_FRAME_SIZE: usize = 2 + MAX_FRAME_LEN;

/// Errors that can occur during frame decoding or encoding
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FrameError {
    /// Declared length exceeds [`MAX_FRAME_LEN`]
    LengthTooLong,
    /// Declared length cannot cover a command and checksum byte
    LengthTooShort,
    /// Frame bytes did not sum to zero
    ChecksumMismatch,
    /// Payload exceeds maximum allowed size
    PayloadTooLarge,
    /// Buffer too small for encoding
    BufferTooSmall,
}

/// A decoded or constructed frame
///
/// `payload` holds the bytes between the command and the checksum; the
/// framing bytes themselves are recreated on encode.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Frame {
    /// Command code
    pub command: u8,
    /// Payload data
    pub payload: Vec<u8, MAX_PAYLOAD_SIZE>,
}

impl Frame {
    /// Create a new frame with the given command and payload
    pub fn new(command: u8, payload: &[u8]) -> Result<Self, FrameError> {
        let mut payload_vec = Vec::new();
        payload_vec
            .extend_from_slice(payload)
            .map_err(|_| FrameError::PayloadTooLarge)?;

        Ok(Self {
            command,
            payload: payload_vec,
        })
    }

    /// Create a frame with no payload
    pub fn empty(command: u8) -> Self {
        Self {
            command,
            payload: Vec::new(),
        }
    }

    /// LENGTH field value for this frame (command..checksum)
    pub fn wire_len(&self) -> u8 {
        (self.payload.len() + 2) as u8
    }

    /// Encode this frame into a byte buffer
    ///
    /// Returns the number of bytes written
    pub fn encode(&self, buffer: &mut [u8]) -> Result<usize, FrameError> {
        let total = self.payload.len() + 4; // START + LENGTH + COMMAND + payload + CHECKSUM
        if buffer.len() < total {
            return Err(FrameError::BufferTooSmall);
        }

        let length = self.wire_len();
        let mut cs = Checksum::new();
        cs.add(length);
        cs.add(self.command);
        for &byte in &self.payload {
            cs.add(byte);
        }

        buffer[0] = FRAME_START;
        buffer[1] = length;
        buffer[2] = self.command;
        buffer[3..3 + self.payload.len()].copy_from_slice(&self.payload);
        buffer[3 + self.payload.len()] = cs.seal();

        Ok(total)
    }

    /// Encode this frame into a heapless Vec
    pub fn encode_to_vec(&self) -> Result<Vec<u8, MAX_FRAME_SIZE>, FrameError> {
        let mut buffer = [0u8; MAX_FRAME_SIZE];
        let len = self.encode(&mut buffer)?;
        let mut vec = Vec::new();
        vec.extend_from_slice(&buffer[..len])
            .map_err(|_| FrameError::BufferTooSmall)?;
        Ok(vec)
    }
}

/// Outcome of feeding one byte to the decoder
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DecodeEvent {
    /// Byte consumed toward an in-progress frame
    Pending,
    /// Byte is not framing; it belongs to the text console
    Console(u8),
    /// A complete frame passed validation
    Frame(Frame),
    /// A frame was dropped; the peer should be answered with a NACK
    Reject(FrameError),
}

/// State machine that assembles frames from a raw byte stream
#[derive(Debug, Clone)]
pub struct FrameDecoder {
    state: DecodeState,
    /// Bytes received after the length field, checksum included
    buf: Vec<u8, MAX_FRAME_LEN>,
    declared_len: u8,
    checksum: Checksum,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DecodeState {
    /// Scanning for the start marker; other bytes go to the console
    Idle,
    /// Got the marker, waiting for LENGTH
    AwaitLength,
    /// Accumulating command..checksum
    AwaitPayload,
}

impl Default for FrameDecoder {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameDecoder {
    /// Create a new frame decoder
    pub fn new() -> Self {
        Self {
            state: DecodeState::Idle,
            buf: Vec::new(),
            declared_len: 0,
            checksum: Checksum::new(),
        }
    }

    /// Drop any in-progress frame and return to idle
    pub fn reset(&mut self) {
        self.state = DecodeState::Idle;
        self.buf.clear();
        self.declared_len = 0;
        self.checksum = Checksum::new();
    }

    /// Feed a single received byte
    ///
    /// Frames complete (or fail) only at the byte that finishes them; a
    /// partial frame sits in its state until later bytes resolve it.
    pub fn feed(&mut self, byte: u8) -> DecodeEvent {
        match self.state {
            DecodeState::Idle => {
                if byte == FRAME_START {
                    self.buf.clear();
                    self.checksum = Checksum::new();
                    self.state = DecodeState::AwaitLength;
                    DecodeEvent::Pending
                } else {
                    // Framing wins only when the marker appears; every
                    // other idle byte is console input.
                    DecodeEvent::Console(byte)
                }
            }
            DecodeState::AwaitLength => {
                if (byte as usize) > MAX_FRAME_LEN {
                    self.reset();
                    return DecodeEvent::Reject(FrameError::LengthTooLong);
                }
                if (byte as usize) < MIN_FRAME_LEN {
                    self.reset();
                    return DecodeEvent::Reject(FrameError::LengthTooShort);
                }
                self.declared_len = byte;
                self.checksum.add(byte);
                self.state = DecodeState::AwaitPayload;
                DecodeEvent::Pending
            }
            DecodeState::AwaitPayload => {
                // Cannot overflow: declared_len was bounded at the length byte
                let _ = self.buf.push(byte);
                self.checksum.add(byte);
                if self.buf.len() < self.declared_len as usize {
                    return DecodeEvent::Pending;
                }

                let event = if self.checksum.is_balanced() {
                    let mut payload = Vec::new();
                    // Fits: at most MAX_FRAME_LEN - 2 bytes sit between
                    // command and checksum
                    let _ = payload.extend_from_slice(&self.buf[1..self.buf.len() - 1]);
                    DecodeEvent::Frame(Frame {
                        command: self.buf[0],
                        payload,
                    })
                } else {
                    DecodeEvent::Reject(FrameError::ChecksumMismatch)
                };
                self.reset();
                event
            }
        }
    }
}
