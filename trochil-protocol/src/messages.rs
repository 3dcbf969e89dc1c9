//! Command codes and typed request/reply messages.
//!
//! Message flow is asymmetric:
//! - Remote → board: read, write, reboot requests
//! - Board → remote: read/write echoes, ACK/NACK, unknown-command marker
//!
//! Every reply is built as a fresh frame; the board never reuses the
//! request buffer for its response.

use heapless::Vec;

use crate::frame::{Frame, FrameError, MAX_PAYLOAD_SIZE};

// Command codes: remote → board
pub const CMD_READ_VALUE: u8 = 0x01;
pub const CMD_WRITE_VALUE: u8 = 0x02;
pub const CMD_REBOOT: u8 = 0x05;

// Command codes: board → remote
pub const CMD_ACK: u8 = 0x03;
pub const CMD_NACK: u8 = 0x04;
pub const CMD_UNKNOWN: u8 = 0x06;

/// Requests decoded from remote-originated frames
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Request<'a> {
    /// Read the parameter registered under `code`
    ReadValue { code: u8 },
    /// Write `content` into the parameter registered under `code`
    WriteValue { code: u8, content: &'a [u8] },
    /// Acknowledge, then restart the board
    Reboot,
}

impl<'a> Request<'a> {
    /// Decode a request from a validated frame
    ///
    /// Returns `None` for an unrecognized command byte, and for
    /// read/write frames too short to carry their parameter code; the
    /// caller answers both with the unknown-command marker.
    pub fn from_frame(frame: &'a Frame) -> Option<Self> {
        match frame.command {
            CMD_READ_VALUE => {
                let code = *frame.payload.first()?;
                Some(Request::ReadValue { code })
            }
            CMD_WRITE_VALUE => {
                let code = *frame.payload.first()?;
                Some(Request::WriteValue {
                    code,
                    content: &frame.payload[1..],
                })
            }
            CMD_REBOOT => Some(Request::Reboot),
            _ => None,
        }
    }

    /// Encode this request into a frame (for host tooling and tests)
    pub fn to_frame(&self) -> Result<Frame, FrameError> {
        match self {
            Request::ReadValue { code } => Frame::new(CMD_READ_VALUE, &[*code]),
            Request::WriteValue { code, content } => {
                let mut payload = Vec::<u8, MAX_PAYLOAD_SIZE>::new();
                payload.push(*code).map_err(|_| FrameError::PayloadTooLarge)?;
                payload
                    .extend_from_slice(content)
                    .map_err(|_| FrameError::PayloadTooLarge)?;
                Frame::new(CMD_WRITE_VALUE, &payload)
            }
            Request::Reboot => Ok(Frame::empty(CMD_REBOOT)),
        }
    }
}

/// Replies sent by the board
///
/// Read and write replies echo the request's command and code; a read
/// hit additionally carries the parameter bytes. A miss on either is
/// shaped exactly like a hit with zero-length data, so the wire carries
/// no distinct error signal for an unknown code.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Reply<'a> {
    /// Echo of a read request, with the value bytes (empty on miss)
    ReadValue { code: u8, data: &'a [u8] },
    /// Echo of a write request, never carries data
    WriteValue { code: u8 },
    /// Positive acknowledgment
    Ack,
    /// Negative acknowledgment (bad frame)
    Nack,
    /// Unknown-command marker
    Unknown,
}

impl Reply<'_> {
    /// Encode this reply into a frame
    pub fn to_frame(&self) -> Result<Frame, FrameError> {
        match self {
            Reply::ReadValue { code, data } => {
                let mut payload = Vec::<u8, MAX_PAYLOAD_SIZE>::new();
                payload.push(*code).map_err(|_| FrameError::PayloadTooLarge)?;
                payload
                    .extend_from_slice(data)
                    .map_err(|_| FrameError::PayloadTooLarge)?;
                Frame::new(CMD_READ_VALUE, &payload)
            }
            Reply::WriteValue { code } => Frame::new(CMD_WRITE_VALUE, &[*code]),
            Reply::Ack => Ok(Frame::empty(CMD_ACK)),
            Reply::Nack => Ok(Frame::empty(CMD_NACK)),
            Reply::Unknown => Ok(Frame::empty(CMD_UNKNOWN)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_read_value() {
        let frame = Frame::new(CMD_READ_VALUE, &[0x03]).unwrap();
        let req = Request::from_frame(&frame).unwrap();
        assert_eq!(req, Request::ReadValue { code: 0x03 });
    }

    #[test]
    fn test_request_write_value() {
        let frame = Frame::new(CMD_WRITE_VALUE, &[0x03, 1, 2, 3, 4]).unwrap();
        let req = Request::from_frame(&frame).unwrap();
        assert_eq!(
            req,
            Request::WriteValue {
                code: 0x03,
                content: &[1, 2, 3, 4],
            }
        );
    }

    #[test]
    fn test_request_reboot() {
        let frame = Frame::empty(CMD_REBOOT);
        assert_eq!(Request::from_frame(&frame), Some(Request::Reboot));
    }

    #[test]
    fn test_request_unrecognized_command() {
        let frame = Frame::empty(0x7F);
        assert_eq!(Request::from_frame(&frame), None);
    }

    #[test]
    fn test_request_runt_read_missing_code() {
        let frame = Frame::empty(CMD_READ_VALUE);
        assert_eq!(Request::from_frame(&frame), None);
    }

    #[test]
    fn test_request_roundtrip() {
        let original = Request::WriteValue {
            code: 0x03,
            content: &[0x0A, 0x00, 0x00, 0x00],
        };
        let frame = original.to_frame().unwrap();
        let parsed = Request::from_frame(&frame).unwrap();
        assert_eq!(original, parsed);
    }

    #[test]
    fn test_reply_read_value_echoes_code_and_data() {
        let reply = Reply::ReadValue {
            code: 0x00,
            data: &[0x01, 0x00, 0x00, 0x00],
        };
        let frame = reply.to_frame().unwrap();
        assert_eq!(frame.command, CMD_READ_VALUE);
        assert_eq!(&frame.payload[..], &[0x00, 0x01, 0x00, 0x00, 0x00]);
    }

    #[test]
    fn test_reply_read_miss_has_no_data() {
        let reply = Reply::ReadValue {
            code: 0x55,
            data: &[],
        };
        let frame = reply.to_frame().unwrap();
        assert_eq!(&frame.payload[..], &[0x55]);
    }

    #[test]
    fn test_reply_write_value_has_no_data() {
        let frame = Reply::WriteValue { code: 0x03 }.to_frame().unwrap();
        assert_eq!(frame.command, CMD_WRITE_VALUE);
        assert_eq!(&frame.payload[..], &[0x03]);
    }

    #[test]
    fn test_reply_markers_are_bare_frames() {
        for (reply, cmd) in [
            (Reply::Ack, CMD_ACK),
            (Reply::Nack, CMD_NACK),
            (Reply::Unknown, CMD_UNKNOWN),
        ] {
            let frame = reply.to_frame().unwrap();
            assert_eq!(frame.command, cmd);
            assert!(frame.payload.is_empty());
            assert_eq!(frame.wire_len(), 2);
        }
    }
}
