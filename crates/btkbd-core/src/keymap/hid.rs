//! USB HID Usage IDs (page 0x07, Keyboard/Keypad page).
//!
//! The boot-protocol keyboard report carries key codes as single bytes, so
//! this module only covers the part of the page that a text stream can
//! produce: letters, digits, whitespace/editing keys, and US punctuation.
//!
//! Reference: USB HID Usage Tables 1.3, Section 10 (Keyboard/Keypad page 0x07).
//!
//! # What is a HID Usage ID? (for beginners)
//!
//! The **USB Human Interface Device (HID)** standard assigns a unique number to
//! every key on a keyboard.  These numbers are called *Usage IDs* and they are
//! grouped by *Usage Page*.  All keyboard keys are on page 0x07 ("Keyboard/Keypad").
//!
//! | Key          | HID Usage ID |
//! |--------------|-------------|
//! | Letter A     | 0x04        |
//! | Letter B     | 0x05        |
//! | Enter        | 0x28        |
//! | Space        | 0x2C        |
//!
//! HID codes name **physical key positions**, not characters.  Whether the
//! key at position 0x04 types `a` or `A` depends on the Shift modifier, which
//! travels separately in the report's modifier byte.
//!
//! # The `NoKey` sentinel
//!
//! Usage ID 0x00 means "no key pressed".  [`HidKeyCode::NoKey`] is what an
//! empty key slot in a report decodes to, and what an unmappable character is
//! sent as.

/// USB HID Usage ID for keyboard keys (page 0x07).
///
/// The numeric value of each variant is its HID Usage ID on the keyboard/keypad page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum HidKeyCode {
    /// No key (empty report slot).
    NoKey = 0x00,

    // Letters (HID 0x04–0x1D)
    KeyA = 0x04,
    KeyB = 0x05,
    KeyC = 0x06,
    KeyD = 0x07,
    KeyE = 0x08,
    KeyF = 0x09,
    KeyG = 0x0A,
    KeyH = 0x0B,
    KeyI = 0x0C,
    KeyJ = 0x0D,
    KeyK = 0x0E,
    KeyL = 0x0F,
    KeyM = 0x10,
    KeyN = 0x11,
    KeyO = 0x12,
    KeyP = 0x13,
    KeyQ = 0x14,
    KeyR = 0x15,
    KeyS = 0x16,
    KeyT = 0x17,
    KeyU = 0x18,
    KeyV = 0x19,
    KeyW = 0x1A,
    KeyX = 0x1B,
    KeyY = 0x1C,
    KeyZ = 0x1D,

    // Digits (HID 0x1E–0x27)
    Digit1 = 0x1E,
    Digit2 = 0x1F,
    Digit3 = 0x20,
    Digit4 = 0x21,
    Digit5 = 0x22,
    Digit6 = 0x23,
    Digit7 = 0x24,
    Digit8 = 0x25,
    Digit9 = 0x26,
    Digit0 = 0x27,

    // Control keys (HID 0x28–0x38)
    Enter = 0x28,
    Escape = 0x29,
    Backspace = 0x2A,
    Tab = 0x2B,
    Space = 0x2C,
    Minus = 0x2D,
    Equal = 0x2E,
    BracketLeft = 0x2F,
    BracketRight = 0x30,
    Backslash = 0x31,
    Semicolon = 0x33,
    Quote = 0x34,
    Backquote = 0x35,
    Comma = 0x36,
    Period = 0x37,
    Slash = 0x38,

    Delete = 0x4C,
}

impl HidKeyCode {
    /// Every key code this crate can produce, in Usage ID order.
    pub const ALL: [HidKeyCode; 54] = {
        use HidKeyCode::*;
        [
            NoKey, KeyA, KeyB, KeyC, KeyD, KeyE, KeyF, KeyG, KeyH, KeyI, KeyJ, KeyK, KeyL, KeyM,
            KeyN, KeyO, KeyP, KeyQ, KeyR, KeyS, KeyT, KeyU, KeyV, KeyW, KeyX, KeyY, KeyZ, Digit1,
            Digit2, Digit3, Digit4, Digit5, Digit6, Digit7, Digit8, Digit9, Digit0, Enter, Escape,
            Backspace, Tab, Space, Minus, Equal, BracketLeft, BracketRight, Backslash, Semicolon,
            Quote, Backquote, Comma, Period, Slash, Delete,
        ]
    };

    /// Converts a raw report byte to a [`HidKeyCode`].
    ///
    /// Returns `None` if the byte is not one of the key codes this crate
    /// can produce.
    pub fn from_u8(value: u8) -> Option<Self> {
        Self::ALL
            .binary_search_by_key(&value, |code| code.as_u8())
            .ok()
            .map(|index| Self::ALL[index])
    }

    /// Returns the raw USB HID Usage ID byte for this key code.
    pub fn as_u8(self) -> u8 {
        self as u8
    }
}
