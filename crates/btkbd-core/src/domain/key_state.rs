//! Key-down / key-up state machine.
//!
//! The host treats the sequence of reports as the truth about which keys are
//! held.  Only one key is modeled at a time, so the rule is simple: a press
//! must be followed by a release before the next press.
//!
//! ```text
//!            press(k)
//!   Released ────────▶ Pressed(k)
//!       ▲                  │
//!       └──────────────────┘
//!            release()
//! ```

use thiserror::Error;

/// Whether a key is currently held on the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum KeyState {
    #[default]
    Released,
    /// Holds the key code of the key that is down.
    Pressed(u8),
}

/// An out-of-order press or release.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum KeyStateError {
    #[error("key 0x{held:02X} is still down; release it before pressing 0x{next:02X}")]
    AlreadyPressed { held: u8, next: u8 },
    #[error("release without a preceding press")]
    NotPressed,
}

impl KeyState {
    /// Transition for sending a press report.
    ///
    /// # Errors
    ///
    /// [`KeyStateError::AlreadyPressed`] if a key is already down.
    pub fn press(self, keycode: u8) -> Result<KeyState, KeyStateError> {
        match self {
            KeyState::Released => Ok(KeyState::Pressed(keycode)),
            KeyState::Pressed(held) => Err(KeyStateError::AlreadyPressed { held, next: keycode }),
        }
    }

    /// Transition for sending a release report.
    ///
    /// # Errors
    ///
    /// [`KeyStateError::NotPressed`] if no key is down.
    pub fn release(self) -> Result<KeyState, KeyStateError> {
        match self {
            KeyState::Pressed(_) => Ok(KeyState::Released),
            KeyState::Released => Err(KeyStateError::NotPressed),
        }
    }
}
