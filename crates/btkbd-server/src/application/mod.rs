//! Application layer: the keyboard use cases.
//!
//! # Sub-modules (for beginners)
//!
//! - **`establish`** – Registers the HID profile and accepts the host's
//!   control and interrupt connections.  Defines the traits the
//!   infrastructure layer implements for BlueZ and for the in-memory mock.
//!
//! - **`session`** – Owns the two connected channels and writes one
//!   press/release report pair per character.
//!
//! - **`dictation`** – Ties the two together: connect once, then type every
//!   input line followed by Enter until input ends.
//!
//! Nothing here touches D-Bus or sockets directly, so every use case is
//! tested against [`crate::infrastructure::bluetooth::mock`].

pub mod dictation;
pub mod establish;
pub mod session;
