//! Parameter registry
//!
//! A static table of every variable the board exposes for remote read
//! and write: one-byte codes, an owner handle, access rights, a tagged
//! descriptor for the backing variable, and optional lifecycle hooks
//! that let the owner synchronize state around each access. The
//! registry never owns a value; everything it reads and writes lives in
//! [`SharedState`].

mod table;

pub use table::{codes, ParamTarget};

use heapless::Vec;

use crate::state::SharedState;

/// Maximum number of registry entries
pub const MAX_PARAMS: usize = 8;

/// Largest backing value in bytes (bounds the read buffer)
pub const MAX_VALUE_LEN: usize = 16;

/// Access right recorded for an entry
///
/// Introspectable via [`Registry::entries`], but not consulted by the
/// write path; see [`ParamEntry::write`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Access {
    /// Remote reads only
    ReadOnly,
    /// Remote reads and writes
    ReadWrite,
}

/// Subsystem that owns an entry's backing variable
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Owner {
    /// Board-level identity (firmware revision)
    Board,
    /// The wheel drive control loop
    Drive,
    /// External balance sensor acquisition
    SensorLink,
    /// Hall-sensor position counting
    HallFeedback,
}

/// Lifecycle hook set for one entry
///
/// Hooks run synchronously inside the byte-processing path and must not
/// block. A pre-read hook typically refreshes derived state before the
/// copy out; a post-write hook propagates the newly written value into
/// the owning subsystem.
#[derive(Debug, Clone, Copy)]
pub struct Hooks {
    /// Runs before the value is copied out
    pub before_read: Option<fn(&mut SharedState)>,
    /// Runs after the value is copied out
    pub after_read: Option<fn(&mut SharedState)>,
    /// Runs before new bytes are copied in
    pub before_write: Option<fn(&mut SharedState)>,
    /// Runs after new bytes are copied in
    pub after_write: Option<fn(&mut SharedState)>,
}

impl Hooks {
    /// No hooks registered
    pub const NONE: Self = Self {
        before_read: None,
        after_read: None,
        before_write: None,
        after_write: None,
    };
}

/// One exposed variable
#[derive(Debug, Clone, Copy)]
pub struct ParamEntry {
    /// Protocol code for this entry, unique within the table
    pub code: u8,
    /// Owning subsystem
    pub owner: Owner,
    /// Recorded access right
    pub access: Access,
    /// Descriptor of the backing variable
    pub target: ParamTarget,
    /// Lifecycle hooks
    pub hooks: Hooks,
}

impl ParamEntry {
    /// Exact size of the backing value in bytes
    pub fn value_len(&self) -> usize {
        self.target.value_len()
    }

    /// Read the backing value, running the read hooks around the copy
    pub fn read(&self, ctx: &mut SharedState) -> Vec<u8, MAX_VALUE_LEN> {
        if let Some(hook) = self.hooks.before_read {
            hook(ctx);
        }
        let data = self.target.load(ctx);
        if let Some(hook) = self.hooks.after_read {
            hook(ctx);
        }
        data
    }

    /// Write the backing value, running the write hooks around the copy
    ///
    /// Fails with [`ParamError::LengthMismatch`] unless `bytes` is
    /// exactly [`value_len`] long; nothing is written in that case.
    /// The access flag is not checked here: remote tooling in the field
    /// relies on writes to nominally read-only codes going through.
    ///
    /// [`value_len`]: ParamEntry::value_len
    pub fn write(&self, ctx: &mut SharedState, bytes: &[u8]) -> Result<(), ParamError> {
        if bytes.len() != self.value_len() {
            return Err(ParamError::LengthMismatch);
        }
        if let Some(hook) = self.hooks.before_write {
            hook(ctx);
        }
        self.target.store(ctx, bytes);
        if let Some(hook) = self.hooks.after_write {
            hook(ctx);
        }
        Ok(())
    }
}

/// Errors from by-code parameter access
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ParamError {
    /// No entry registered under the requested code
    UnknownCode,
    /// Write payload does not match the backing value's size
    LengthMismatch,
}

/// Errors from building a registry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RegisterError {
    /// An entry with the same code already exists
    DuplicateCode,
    /// The table already holds [`MAX_PARAMS`] entries
    TableFull,
}

/// The parameter table
///
/// Built once at startup, then only read. Lookup is a linear scan;
/// tables are small and a scan avoids any indexing assumptions about
/// the code space.
#[derive(Debug, Clone)]
pub struct Registry {
    entries: Vec<ParamEntry, MAX_PARAMS>,
}

impl Registry {
    /// Create an empty registry
    pub const fn empty() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Add an entry, enforcing code uniqueness
    pub fn register(&mut self, entry: ParamEntry) -> Result<(), RegisterError> {
        if self.lookup(entry.code).is_some() {
            return Err(RegisterError::DuplicateCode);
        }
        self.entries
            .push(entry)
            .map_err(|_| RegisterError::TableFull)
    }

    /// Find the entry registered under `code`
    pub fn lookup(&self, code: u8) -> Option<&ParamEntry> {
        self.entries.iter().find(|entry| entry.code == code)
    }

    /// All registered entries, for introspection
    pub fn entries(&self) -> &[ParamEntry] {
        &self.entries
    }

    /// Read the parameter registered under `code`
    pub fn read_value(
        &self,
        code: u8,
        ctx: &mut SharedState,
    ) -> Result<Vec<u8, MAX_VALUE_LEN>, ParamError> {
        let entry = self.lookup(code).ok_or(ParamError::UnknownCode)?;
        Ok(entry.read(ctx))
    }

    /// Write the parameter registered under `code`
    pub fn write_value(
        &self,
        code: u8,
        ctx: &mut SharedState,
        bytes: &[u8],
    ) -> Result<(), ParamError> {
        let entry = self.lookup(code).ok_or(ParamError::UnknownCode)?;
        entry.write(ctx, bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn revision_entry(code: u8) -> ParamEntry {
        ParamEntry {
            code,
            owner: Owner::Board,
            access: Access::ReadOnly,
            target: ParamTarget::FirmwareRevision,
            hooks: Hooks::NONE,
        }
    }

    fn mark_before(ctx: &mut SharedState) {
        ctx.manual_setpoint = 42;
    }

    fn mark_after(ctx: &mut SharedState) {
        ctx.manual_setpoint *= 10;
    }

    #[test]
    fn test_register_rejects_duplicate_code() {
        let mut registry = Registry::empty();
        registry.register(revision_entry(0x10)).unwrap();
        assert_eq!(
            registry.register(revision_entry(0x10)),
            Err(RegisterError::DuplicateCode)
        );
    }

    #[test]
    fn test_register_rejects_full_table() {
        let mut registry = Registry::empty();
        for code in 0..MAX_PARAMS as u8 {
            registry.register(revision_entry(code)).unwrap();
        }
        assert_eq!(
            registry.register(revision_entry(0xFF)),
            Err(RegisterError::TableFull)
        );
    }

    #[test]
    fn test_lookup_miss() {
        let registry = Registry::empty();
        assert!(registry.lookup(0x00).is_none());

        let mut ctx = SharedState::new();
        assert_eq!(
            registry.read_value(0x00, &mut ctx),
            Err(ParamError::UnknownCode)
        );
        assert_eq!(
            registry.write_value(0x00, &mut ctx, &[0; 4]),
            Err(ParamError::UnknownCode)
        );
    }

    #[test]
    fn test_write_length_mismatch_writes_nothing() {
        let mut registry = Registry::empty();
        registry.register(revision_entry(0x00)).unwrap();

        let mut ctx = SharedState::new();
        let before = ctx.firmware_revision;
        assert_eq!(
            registry.write_value(0x00, &mut ctx, &[1, 2, 3]),
            Err(ParamError::LengthMismatch)
        );
        assert_eq!(ctx.firmware_revision, before);
    }

    #[test]
    fn test_read_runs_hooks_around_copy() {
        let mut registry = Registry::empty();
        let mut entry = revision_entry(0x00);
        entry.hooks = Hooks {
            before_read: Some(mark_before),
            after_read: Some(mark_after),
            ..Hooks::NONE
        };
        registry.register(entry).unwrap();

        let mut ctx = SharedState::new();
        let data = registry.read_value(0x00, &mut ctx).unwrap();
        assert_eq!(&data[..], &1u32.to_le_bytes());
        // before set 42, after multiplied it: both ran, in order
        assert_eq!(ctx.manual_setpoint, 420);
    }

    #[test]
    fn test_write_runs_hooks_around_copy() {
        let mut registry = Registry::empty();
        let mut entry = revision_entry(0x00);
        entry.hooks = Hooks {
            before_write: Some(mark_before),
            after_write: Some(mark_after),
            ..Hooks::NONE
        };
        registry.register(entry).unwrap();

        let mut ctx = SharedState::new();
        registry
            .write_value(0x00, &mut ctx, &7u32.to_le_bytes())
            .unwrap();
        assert_eq!(ctx.firmware_revision, 7);
        assert_eq!(ctx.manual_setpoint, 420);
    }

    #[test]
    fn test_hooks_skipped_on_length_mismatch() {
        let mut registry = Registry::empty();
        let mut entry = revision_entry(0x00);
        entry.hooks = Hooks {
            before_write: Some(mark_before),
            ..Hooks::NONE
        };
        registry.register(entry).unwrap();

        let mut ctx = SharedState::new();
        let _ = registry.write_value(0x00, &mut ctx, &[0xAA]);
        assert_eq!(ctx.manual_setpoint, 0);
    }
}
