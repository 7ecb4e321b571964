//! Bluetooth device address (BD_ADDR).
//!
//! A BD_ADDR is 48 bits, written most significant byte first as six
//! colon-separated hex pairs: `00:1A:7D:DA:71:13`.  The adapter's address is
//! looked up once at startup and both L2CAP listeners are bound to it.

use std::fmt;

/// Address of a local Bluetooth adapter or a connected peer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct AdapterAddress(pub [u8; 6]);

impl AdapterAddress {
    pub fn new(bytes: [u8; 6]) -> Self {
        Self(bytes)
    }

    pub fn octets(&self) -> [u8; 6] {
        self.0
    }
}

impl fmt::Display for AdapterAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let b = self.0;
        write!(
            f,
            "{:02X}:{:02X}:{:02X}:{:02X}:{:02X}:{:02X}",
            b[0], b[1], b[2], b[3], b[4], b[5]
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_is_uppercase_colon_separated() {
        let addr = AdapterAddress::new([0x00, 0x1a, 0x7d, 0xda, 0x71, 0x13]);
        assert_eq!(addr.to_string(), "00:1A:7D:DA:71:13");
    }

    #[test]
    fn test_display_pads_single_digit_octets() {
        // Arrange
        let addr = AdapterAddress::new([0x01, 0x02, 0x03, 0x0a, 0x0b, 0x0c]);

        // Act
        let text = addr.to_string();

        // Assert
        assert_eq!(text, "01:02:03:0A:0B:0C");
        assert_eq!(addr.octets(), [0x01, 0x02, 0x03, 0x0A, 0x0B, 0x0C]);
    }
}
