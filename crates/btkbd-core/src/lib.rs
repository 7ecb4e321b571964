//! # btkbd-core
//!
//! Shared library for btkbd containing the HID keyboard report encoder,
//! the character-to-key-code table, and the Bluetooth HID protocol constants.
//!
//! It has zero dependencies on OS APIs, D-Bus, or sockets, so everything in
//! here can be unit-tested on any machine.
//!
//! # Architecture overview (for beginners)
//!
//! btkbd makes a Linux computer with a Bluetooth radio look like a Bluetooth
//! keyboard to another computer (the "host").  Text typed into btkbd is
//! replayed on the host as if someone were pressing the keys.
//!
//! This crate (`btkbd-core`) is the pure foundation.  It defines:
//!
//! - **`keymap`** – Which physical key (a USB HID Usage ID) and whether Shift
//!   is needed to produce a given character on a US layout.
//!
//! - **`protocol`** – How a key press travels over the air.  Each press and
//!   each release is a fixed 10-byte HID boot-protocol input report sent on
//!   the L2CAP interrupt channel.
//!
//! - **`domain`** – Small value types shared by the server: the adapter
//!   address and the press/release state machine that guarantees no two keys
//!   are ever "down" at the same time.

pub mod domain;
pub mod keymap;
pub mod protocol;

pub use domain::address::AdapterAddress;
pub use domain::key_state::{KeyState, KeyStateError};
pub use keymap::hid::HidKeyCode;
pub use keymap::{char_to_keycode, KeyStroke};
pub use protocol::report::{
    decode_report, encode_press, encode_release, KeyboardReport, ReportBytes, ReportError,
};
