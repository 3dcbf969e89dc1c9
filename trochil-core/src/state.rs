//! Shared-state context between the comm layer and the control loop
//!
//! One [`SharedState`] instance replaces the scattered globals a board
//! like this traditionally uses. Every field documents its single
//! logical writer; nothing here is touched from more than one flow.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Firmware revision reported under parameter code 0x00
pub const FIRMWARE_REVISION: u32 = 1;

/// Left/right speed setpoints gathered into one remotely addressable value
///
/// Wire layout: `left` then `right`, each a little-endian `i32` (8 bytes).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SpeedPair {
    /// Left wheel setpoint
    pub left: i32,
    /// Right wheel setpoint
    pub right: i32,
}

impl SpeedPair {
    /// Size of the wire representation in bytes
    pub const WIRE_LEN: usize = 8;

    /// Serialize to the wire layout
    pub fn to_le_bytes(self) -> [u8; Self::WIRE_LEN] {
        let mut out = [0u8; Self::WIRE_LEN];
        out[..4].copy_from_slice(&self.left.to_le_bytes());
        out[4..].copy_from_slice(&self.right.to_le_bytes());
        out
    }

    /// Deserialize from the wire layout
    pub fn from_le_bytes(bytes: &[u8; Self::WIRE_LEN]) -> Self {
        Self {
            left: i32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]),
            right: i32::from_le_bytes([bytes[4], bytes[5], bytes[6], bytes[7]]),
        }
    }
}

/// One snapshot from an external balance sensor
///
/// Wire layout (6 bytes, little-endian): `angle: i16`, `roll: i16`,
/// `seq: u8`, `flags: u8`.
#[cfg(feature = "sensor-link")]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SensorFrame {
    /// Board tilt angle, raw sensor units
    pub angle: i16,
    /// Roll axis reading, raw sensor units
    pub roll: i16,
    /// Rolling sequence counter from the sensor
    pub seq: u8,
    /// Sensor status flags
    pub flags: u8,
}

#[cfg(feature = "sensor-link")]
impl SensorFrame {
    /// Size of the wire representation in bytes
    pub const WIRE_LEN: usize = 6;

    /// Serialize to the wire layout
    pub fn to_le_bytes(self) -> [u8; Self::WIRE_LEN] {
        let mut out = [0u8; Self::WIRE_LEN];
        out[..2].copy_from_slice(&self.angle.to_le_bytes());
        out[2..4].copy_from_slice(&self.roll.to_le_bytes());
        out[4] = self.seq;
        out[5] = self.flags;
        out
    }

    /// Deserialize from the wire layout
    pub fn from_le_bytes(bytes: &[u8; Self::WIRE_LEN]) -> Self {
        Self {
            angle: i16::from_le_bytes([bytes[0], bytes[1]]),
            roll: i16::from_le_bytes([bytes[2], bytes[3]]),
            seq: bytes[4],
            flags: bytes[5],
        }
    }
}

/// Every variable the comm layer shares with the rest of the firmware
///
/// Constructed once at startup and passed by mutable reference into
/// [`CommLink::feed`]; the control loop borrows it between bytes. No
/// field has two logical writers.
///
/// [`CommLink::feed`]: crate::link::CommLink::feed
#[derive(Debug, Clone)]
pub struct SharedState {
    /// Reported firmware revision. Writer: board init (and remote writes,
    /// which the registry does not currently block; see the params tests).
    pub firmware_revision: u32,
    /// Motor drive enable. Writer: comm layer (console commands).
    pub drive_enabled: bool,
    /// Live left wheel setpoint. Writer: comm layer; the control loop
    /// only reads it.
    pub speed_left: i32,
    /// Live right wheel setpoint. Writer: comm layer.
    pub speed_right: i32,
    /// Manual setpoint stepped by the console F/B/X commands.
    /// Writer: comm layer.
    pub manual_setpoint: i32,
    /// Diagnostic output enable. Writer: comm layer.
    pub debug_output: bool,
    /// Sensor-driven speed control enable. Writer: comm layer.
    pub sensor_control: bool,
    /// Staging pair for remote speed access; synchronized with the live
    /// setpoints by the speed parameter's lifecycle hooks.
    /// Writer: comm layer.
    pub speeds: SpeedPair,
    /// Latest snapshot per balance sensor. Writer: sensor acquisition.
    #[cfg(feature = "sensor-link")]
    pub sensor: [SensorFrame; 2],
    /// Hall-sensor position counters. Writer: hall interrupt handler.
    #[cfg(feature = "hall-feedback")]
    pub hall_counts: [i32; 2],
}

impl SharedState {
    /// Create the startup state
    pub const fn new() -> Self {
        Self {
            firmware_revision: FIRMWARE_REVISION,
            drive_enabled: false,
            speed_left: 0,
            speed_right: 0,
            manual_setpoint: 0,
            debug_output: false,
            sensor_control: false,
            speeds: SpeedPair { left: 0, right: 0 },
            #[cfg(feature = "sensor-link")]
            sensor: [
                SensorFrame {
                    angle: 0,
                    roll: 0,
                    seq: 0,
                    flags: 0,
                },
                SensorFrame {
                    angle: 0,
                    roll: 0,
                    seq: 0,
                    flags: 0,
                },
            ],
            #[cfg(feature = "hall-feedback")]
            hall_counts: [0, 0],
        }
    }

    /// Copy the live setpoints into the staging pair (speed pre-read hook)
    pub fn gather_speeds(&mut self) {
        self.speeds.left = self.speed_left;
        self.speeds.right = self.speed_right;
    }

    /// Copy the staging pair into the live setpoints (speed post-write hook)
    pub fn apply_speeds(&mut self) {
        self.speed_left = self.speeds.left;
        self.speed_right = self.speeds.right;
    }
}

impl Default for SharedState {
    fn default() -> Self {
        Self::new()
    }
}
