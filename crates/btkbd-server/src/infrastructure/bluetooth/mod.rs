//! Bluetooth stacks implementing the `establish` and `session` traits.
//!
//! - `bluez` – the real stack: bluetoothd over D-Bus plus kernel L2CAP sockets
//!   (Linux only).
//! - `mock` – an in-memory stack that records every socket operation.

#[cfg(target_os = "linux")]
pub mod bluez;
pub mod mock;
