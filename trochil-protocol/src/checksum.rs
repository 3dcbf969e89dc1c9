//! Additive two's-complement frame checksum.
//!
//! Both ends fold every byte from the length field through the checksum
//! byte into a one-byte wrapping sum. A frame is intact when that sum is
//! zero; sealing an outgoing frame means storing the value that forces
//! the sum to zero. One accumulator type serves both directions.

/// Running checksum accumulator.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Checksum {
    sum: u8,
}

impl Checksum {
    /// Create an empty accumulator.
    pub const fn new() -> Self {
        Self { sum: 0 }
    }

    /// Fold one byte into the running sum.
    pub fn add(&mut self, byte: u8) {
        self.sum = self.sum.wrapping_add(byte);
    }

    /// Checksum byte that balances everything fed so far.
    ///
    /// Appending this value to the run makes [`is_balanced`] true on the
    /// receiving side.
    ///
    /// [`is_balanced`]: Checksum::is_balanced
    pub fn seal(&self) -> u8 {
        self.sum.wrapping_neg()
    }

    /// True when the bytes fed so far (checksum byte included) sum to
    /// zero modulo 256.
    pub fn is_balanced(&self) -> bool {
        self.sum == 0
    }
}
