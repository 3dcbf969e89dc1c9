//! Board-agnostic communication layer for the Trochil drive board
//!
//! This crate contains everything between the raw serial byte stream and
//! the board state it exposes, with no dependency on a specific target:
//!
//! - Collaborator traits for the transport and the platform (reset/delay)
//! - The shared-state context the comm layer and the control loop share
//! - The parameter registry (codes, access rights, lifecycle hooks)
//! - The command dispatcher for validated frames
//! - The ASCII console fallback
//! - The [`CommLink`] front end that routes each received byte
//!
//! Wire framing itself lives in `trochil-protocol`.

#![no_std]
#![deny(unsafe_code)]

pub mod console;
pub mod dispatch;
pub mod link;
pub mod params;
pub mod state;
pub mod traits;

pub use link::CommLink;
pub use params::Registry;
pub use state::SharedState;
