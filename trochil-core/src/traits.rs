//! Collaborator traits for the comm layer
//!
//! The transport and the platform reset path are external to this crate;
//! these traits are the seams a board crate implements over its HAL.

/// Serial transmit primitive
///
/// The link's single send path: frames, console echo, and reply text all
/// go through one implementation of this trait.
pub trait SerialTx {
    /// Error type for transmit operations
    type Error;

    /// Write data to the serial link
    ///
    /// Blocks until all data has been written or an error occurs.
    fn write_blocking(&mut self, data: &[u8]) -> Result<(), Self::Error>;
}

/// Platform services the dispatcher needs for the reboot command
pub trait Platform {
    /// Busy-wait for the given number of milliseconds
    fn delay_ms(&mut self, ms: u32);

    /// Restart the device; does not return on real hardware
    fn system_reset(&mut self);
}
