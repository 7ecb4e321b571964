//! Domain value types for btkbd.
//!
//! Pure data with no infrastructure dependencies; the server crate builds on
//! these at its Bluetooth and session boundaries.

/// Bluetooth device address of the local adapter.
pub mod address;

/// Press/release ordering rules for a single keyboard.
pub mod key_state;
