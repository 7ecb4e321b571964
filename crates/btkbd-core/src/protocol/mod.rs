//! Bluetooth HID protocol constants and the keyboard report codec.
//!
//! # Two channels (for beginners)
//!
//! A classic Bluetooth HID device talks to the host over two L2CAP channels,
//! identified by their PSM ("Protocol/Service Multiplexer", the L2CAP
//! equivalent of a TCP port):
//!
//! | Channel   | PSM  | Used for                                   |
//! |-----------|------|--------------------------------------------|
//! | Control   | 0x11 | HID handshakes; must exist, carries nothing here |
//! | Interrupt | 0x13 | Input reports (one per key press/release)  |
//!
//! The host always opens the control channel first.

pub mod report;

use std::time::Duration;

use uuid::Uuid;

pub use report::{decode_report, encode_press, encode_release, KeyboardReport, ReportError};

/// L2CAP PSM of the HID control channel.
pub const CONTROL_PSM: u16 = 17;

/// L2CAP PSM of the HID interrupt channel.
pub const INTERRUPT_PSM: u16 = 19;

/// Bluetooth SIG assigned UUID of the Human Interface Device service (0x1124).
pub const HID_SERVICE_UUID: Uuid = Uuid::from_u128(0x0000_1124_0000_1000_8000_0080_5f9b_34fb);

/// Pause after every report.
///
/// Host HID stacks sample input at a fixed interval; sending the release
/// sooner than this risks the press being coalesced away.
pub const REPORT_INTERVAL: Duration = Duration::from_millis(10);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hid_service_uuid_string_form() {
        assert_eq!(
            HID_SERVICE_UUID.to_string(),
            "00001124-0000-1000-8000-00805f9b34fb"
        );
    }

    #[test]
    fn test_channel_psms() {
        assert_eq!(CONTROL_PSM, 0x11);
        assert_eq!(INTERRUPT_PSM, 0x13);
    }

    #[test]
    fn test_report_interval_is_ten_milliseconds() {
        assert_eq!(REPORT_INTERVAL, Duration::from_millis(10));
    }
}
