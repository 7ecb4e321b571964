//! HID boot-protocol keyboard input report codec.
//!
//! # Wire format
//!
//! Every report on the interrupt channel is exactly 10 bytes:
//!
//! ```text
//! Offset  Size  Field
//! ──────  ────  ─────────────────────────────────────────
//!   0      1    HIDP transaction header (0xA1 = DATA | Input)
//!   1      1    Report ID (always 1, matches the descriptor)
//!   2      1    Modifier bitmask (0x40 = Shift, else 0)
//!   3      1    Reserved (0)
//!   4      1    Key code of the pressed key (0 = none)
//!   5      5    Remaining key slots (always 0; one key at a time)
//! ```
//!
//! A press report carries the modifier and the key code; the matching release
//! report is all zeros after the header and report ID.

use thiserror::Error;

use crate::keymap::{HidKeyCode, KeyStroke};

/// Size of every keyboard report on the wire.
pub const REPORT_LEN: usize = 10;

/// HIDP header byte: transaction type DATA (0xA) with parameter Input (0x1).
pub const INPUT_REPORT_HEADER: u8 = 0xA1;

/// Report ID declared for the keyboard collection in the service record.
pub const KEYBOARD_REPORT_ID: u8 = 0x01;

/// Modifier bit sent when a key stroke needs Shift.
pub const SHIFT_MODIFIER: u8 = 1 << 6;

/// One encoded keyboard report.
pub type ReportBytes = [u8; REPORT_LEN];

const MODIFIER_OFFSET: usize = 2;
const KEYCODE_OFFSET: usize = 4;

/// Errors produced when a byte buffer is not a keyboard report.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ReportError {
    #[error("keyboard report must be 10 bytes, got {0}")]
    WrongLength(usize),
    #[error("unexpected HIDP header 0x{0:02X}")]
    BadHeader(u8),
    #[error("unexpected report id {0}")]
    BadReportId(u8),
}

/// Builds the press report for `keycode`, with Shift held when `shift` is set.
pub fn encode_press(keycode: u8, shift: bool) -> ReportBytes {
    let mut report = encode_release();
    report[MODIFIER_OFFSET] = if shift { SHIFT_MODIFIER } else { 0 };
    report[KEYCODE_OFFSET] = keycode;
    report
}

/// Builds the report that releases every key.
pub fn encode_release() -> ReportBytes {
    let mut report = [0u8; REPORT_LEN];
    report[0] = INPUT_REPORT_HEADER;
    report[1] = KEYBOARD_REPORT_ID;
    report
}

/// The decoded content of a keyboard report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyboardReport {
    pub modifiers: u8,
    pub keycode: u8,
}

impl KeyboardReport {
    /// Press report for a translated key stroke.
    pub fn press(stroke: KeyStroke) -> Self {
        Self {
            modifiers: if stroke.shift { SHIFT_MODIFIER } else { 0 },
            keycode: stroke.key.as_u8(),
        }
    }

    /// The all-keys-up report.
    pub fn release() -> Self {
        Self { modifiers: 0, keycode: 0 }
    }

    pub fn shift(&self) -> bool {
        self.modifiers & SHIFT_MODIFIER != 0
    }

    /// `true` when no key and no modifier is held.
    pub fn is_release(&self) -> bool {
        self.modifiers == 0 && self.keycode == 0
    }

    /// Key code as a [`HidKeyCode`], if it is one this crate knows.
    pub fn key(&self) -> Option<HidKeyCode> {
        HidKeyCode::from_u8(self.keycode)
    }
}

/// Parses a 10-byte keyboard report.
///
/// # Errors
///
/// Returns [`ReportError`] if the length, HIDP header, or report ID do not match.
pub fn decode_report(bytes: &[u8]) -> Result<KeyboardReport, ReportError> {
    if bytes.len() != REPORT_LEN {
        return Err(ReportError::WrongLength(bytes.len()));
    }
    if bytes[0] != INPUT_REPORT_HEADER {
        return Err(ReportError::BadHeader(bytes[0]));
    }
    if bytes[1] != KEYBOARD_REPORT_ID {
        return Err(ReportError::BadReportId(bytes[1]));
    }
    Ok(KeyboardReport {
        modifiers: bytes[MODIFIER_OFFSET],
        keycode: bytes[KEYCODE_OFFSET],
    })
}
