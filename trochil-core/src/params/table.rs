//! Deployment parameter table
//!
//! The concrete variables this board exposes, and the tagged descriptors
//! that resolve each one against [`SharedState`] without raw addresses.
//! Which entries exist follows the board build options (`sensor-link`,
//! `hall-feedback`), mirroring the hardware fit.

use heapless::Vec;

#[cfg(feature = "sensor-link")]
use crate::state::SensorFrame;
use crate::state::{SharedState, SpeedPair};

use super::{Access, Hooks, Owner, ParamEntry, Registry, MAX_VALUE_LEN};

/// Protocol codes of the deployment parameters
pub mod codes {
    /// Firmware revision, `u32` little-endian, read-only
    pub const FIRMWARE_REVISION: u8 = 0x00;
    /// Latest balance-sensor snapshots, read-only
    pub const SENSOR_SNAPSHOT: u8 = 0x01;
    /// Hall position counters, `[i32; 2]` little-endian, read-only
    pub const HALL_COUNTERS: u8 = 0x02;
    /// Left/right speed setpoints, read-write
    pub const SPEED_SETPOINTS: u8 = 0x03;
}

/// Descriptor of a backing variable in [`SharedState`]
///
/// One variant per exposed variable; the value length is derived from
/// the variant, so an entry can never claim a size its backing variable
/// does not have.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ParamTarget {
    /// `SharedState::firmware_revision`
    FirmwareRevision,
    /// `SharedState::sensor`, both snapshots back to back
    #[cfg(feature = "sensor-link")]
    SensorSnapshot,
    /// `SharedState::hall_counts`
    #[cfg(feature = "hall-feedback")]
    HallCounters,
    /// `SharedState::speeds` staging pair
    SpeedSetpoints,
}

impl ParamTarget {
    /// Exact size of the backing value in bytes
    pub fn value_len(&self) -> usize {
        match self {
            ParamTarget::FirmwareRevision => 4,
            #[cfg(feature = "sensor-link")]
            ParamTarget::SensorSnapshot => 2 * SensorFrame::WIRE_LEN,
            #[cfg(feature = "hall-feedback")]
            ParamTarget::HallCounters => 8,
            ParamTarget::SpeedSetpoints => SpeedPair::WIRE_LEN,
        }
    }

    /// Copy the backing value out of the context
    pub(crate) fn load(&self, ctx: &SharedState) -> Vec<u8, MAX_VALUE_LEN> {
        let mut out = Vec::new();
        // Fits: every target is at most MAX_VALUE_LEN bytes
        match self {
            ParamTarget::FirmwareRevision => {
                let _ = out.extend_from_slice(&ctx.firmware_revision.to_le_bytes());
            }
            #[cfg(feature = "sensor-link")]
            ParamTarget::SensorSnapshot => {
                for frame in &ctx.sensor {
                    let _ = out.extend_from_slice(&frame.to_le_bytes());
                }
            }
            #[cfg(feature = "hall-feedback")]
            ParamTarget::HallCounters => {
                for count in &ctx.hall_counts {
                    let _ = out.extend_from_slice(&count.to_le_bytes());
                }
            }
            ParamTarget::SpeedSetpoints => {
                let _ = out.extend_from_slice(&ctx.speeds.to_le_bytes());
            }
        }
        out
    }

    /// Copy new bytes into the backing variable
    ///
    /// Caller guarantees `bytes.len() == self.value_len()`.
    pub(crate) fn store(&self, ctx: &mut SharedState, bytes: &[u8]) {
        match self {
            ParamTarget::FirmwareRevision => {
                ctx.firmware_revision =
                    u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]);
            }
            #[cfg(feature = "sensor-link")]
            ParamTarget::SensorSnapshot => {
                for (slot, chunk) in ctx
                    .sensor
                    .iter_mut()
                    .zip(bytes.chunks_exact(SensorFrame::WIRE_LEN))
                {
                    let mut raw = [0u8; SensorFrame::WIRE_LEN];
                    raw.copy_from_slice(chunk);
                    *slot = SensorFrame::from_le_bytes(&raw);
                }
            }
            #[cfg(feature = "hall-feedback")]
            ParamTarget::HallCounters => {
                for (slot, chunk) in ctx.hall_counts.iter_mut().zip(bytes.chunks_exact(4)) {
                    *slot = i32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]);
                }
            }
            ParamTarget::SpeedSetpoints => {
                let mut raw = [0u8; SpeedPair::WIRE_LEN];
                raw.copy_from_slice(bytes);
                ctx.speeds = SpeedPair::from_le_bytes(&raw);
            }
        }
    }
}

impl Registry {
    /// The board's standard parameter table
    pub fn standard() -> Self {
        let mut registry = Self::empty();

        // Codes are unique and the capacity covers every deployment
        // entry, so registration cannot fail here.
        let _ = registry.register(ParamEntry {
            code: codes::FIRMWARE_REVISION,
            owner: Owner::Board,
            access: Access::ReadOnly,
            target: ParamTarget::FirmwareRevision,
            hooks: Hooks::NONE,
        });
        #[cfg(feature = "sensor-link")]
        let _ = registry.register(ParamEntry {
            code: codes::SENSOR_SNAPSHOT,
            owner: Owner::SensorLink,
            access: Access::ReadOnly,
            target: ParamTarget::SensorSnapshot,
            hooks: Hooks::NONE,
        });
        #[cfg(feature = "hall-feedback")]
        let _ = registry.register(ParamEntry {
            code: codes::HALL_COUNTERS,
            owner: Owner::HallFeedback,
            access: Access::ReadOnly,
            target: ParamTarget::HallCounters,
            hooks: Hooks::NONE,
        });
        let _ = registry.register(ParamEntry {
            code: codes::SPEED_SETPOINTS,
            owner: Owner::Drive,
            access: Access::ReadWrite,
            target: ParamTarget::SpeedSetpoints,
            hooks: Hooks {
                before_read: Some(SharedState::gather_speeds),
                after_write: Some(SharedState::apply_speeds),
                ..Hooks::NONE
            },
        });

        registry
    }
}
