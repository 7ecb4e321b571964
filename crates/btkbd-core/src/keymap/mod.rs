//! Character to key code translation.
//!
//! The host interprets reports using its own keyboard layout.  The table here
//! assumes the host is configured for a US layout, which is what the HID boot
//! protocol's key positions are named after.

pub mod hid;

pub use hid::HidKeyCode;

/// One physical key stroke: the key position plus whether Shift is held.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KeyStroke {
    pub key: HidKeyCode,
    pub shift: bool,
}

impl KeyStroke {
    /// A stroke that presses nothing.  Used for characters with no mapping.
    pub const NONE: KeyStroke = KeyStroke::plain(HidKeyCode::NoKey);

    pub const fn plain(key: HidKeyCode) -> Self {
        Self { key, shift: false }
    }

    pub const fn shifted(key: HidKeyCode) -> Self {
        Self { key, shift: true }
    }
}

/// Translates a character to the key stroke that types it on a US layout.
///
/// Returns `None` for characters that cannot be typed with a single key plus
/// an optional Shift (anything outside printable ASCII and a handful of
/// control characters).
pub fn char_to_keycode(c: char) -> Option<KeyStroke> {
    use HidKeyCode as K;

    if c.is_ascii_lowercase() {
        return letter(c as u8 - b'a').map(KeyStroke::plain);
    }
    if c.is_ascii_uppercase() {
        return letter(c as u8 - b'A').map(KeyStroke::shifted);
    }

    let stroke = match c {
        '1' => KeyStroke::plain(K::Digit1),
        '2' => KeyStroke::plain(K::Digit2),
        '3' => KeyStroke::plain(K::Digit3),
        '4' => KeyStroke::plain(K::Digit4),
        '5' => KeyStroke::plain(K::Digit5),
        '6' => KeyStroke::plain(K::Digit6),
        '7' => KeyStroke::plain(K::Digit7),
        '8' => KeyStroke::plain(K::Digit8),
        '9' => KeyStroke::plain(K::Digit9),
        '0' => KeyStroke::plain(K::Digit0),
        '!' => KeyStroke::shifted(K::Digit1),
        '@' => KeyStroke::shifted(K::Digit2),
        '#' => KeyStroke::shifted(K::Digit3),
        '$' => KeyStroke::shifted(K::Digit4),
        '%' => KeyStroke::shifted(K::Digit5),
        '^' => KeyStroke::shifted(K::Digit6),
        '&' => KeyStroke::shifted(K::Digit7),
        '*' => KeyStroke::shifted(K::Digit8),
        '(' => KeyStroke::shifted(K::Digit9),
        ')' => KeyStroke::shifted(K::Digit0),

        '\n' | '\r' => KeyStroke::plain(K::Enter),
        '\x1b' => KeyStroke::plain(K::Escape),
        '\x08' => KeyStroke::plain(K::Backspace),
        '\t' => KeyStroke::plain(K::Tab),
        ' ' => KeyStroke::plain(K::Space),
        '\x7f' => KeyStroke::plain(K::Delete),

        '-' => KeyStroke::plain(K::Minus),
        '_' => KeyStroke::shifted(K::Minus),
        '=' => KeyStroke::plain(K::Equal),
        '+' => KeyStroke::shifted(K::Equal),
        '[' => KeyStroke::plain(K::BracketLeft),
        '{' => KeyStroke::shifted(K::BracketLeft),
        ']' => KeyStroke::plain(K::BracketRight),
        '}' => KeyStroke::shifted(K::BracketRight),
        '\\' => KeyStroke::plain(K::Backslash),
        '|' => KeyStroke::shifted(K::Backslash),
        ';' => KeyStroke::plain(K::Semicolon),
        ':' => KeyStroke::shifted(K::Semicolon),
        '\'' => KeyStroke::plain(K::Quote),
        '"' => KeyStroke::shifted(K::Quote),
        '`' => KeyStroke::plain(K::Backquote),
        '~' => KeyStroke::shifted(K::Backquote),
        ',' => KeyStroke::plain(K::Comma),
        '<' => KeyStroke::shifted(K::Comma),
        '.' => KeyStroke::plain(K::Period),
        '>' => KeyStroke::shifted(K::Period),
        '/' => KeyStroke::plain(K::Slash),
        '?' => KeyStroke::shifted(K::Slash),

        _ => return None,
    };
    Some(stroke)
}

/// Letter keys are contiguous on the HID page starting at KeyA.
fn letter(index: u8) -> Option<HidKeyCode> {
    HidKeyCode::from_u8(HidKeyCode::KeyA.as_u8() + index)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lowercase_letters_are_unshifted() {
        for c in 'a'..='z' {
            let stroke = char_to_keycode(c).expect("letter must map");
            assert!(!stroke.shift, "{c:?} must not need shift");
            assert_eq!(stroke.key.as_u8(), 0x04 + (c as u8 - b'a'));
        }
    }

    #[test]
    fn test_uppercase_letters_share_key_with_lowercase_and_need_shift() {
        for c in 'A'..='Z' {
            let upper = char_to_keycode(c).expect("letter must map");
            let lower = char_to_keycode(c.to_ascii_lowercase()).expect("letter must map");
            assert!(upper.shift);
            assert_eq!(upper.key, lower.key);
        }
    }

    #[test]
    fn test_newline_maps_to_enter() {
        assert_eq!(char_to_keycode('\n'), Some(KeyStroke::plain(HidKeyCode::Enter)));
    }

    #[test]
    fn test_shifted_digit_row_symbols() {
        // Arrange
        let pairs = [
            ('!', HidKeyCode::Digit1),
            ('@', HidKeyCode::Digit2),
            ('#', HidKeyCode::Digit3),
            ('(', HidKeyCode::Digit9),
            (')', HidKeyCode::Digit0),
        ];

        // Act / Assert
        for (c, key) in pairs {
            assert_eq!(char_to_keycode(c), Some(KeyStroke::shifted(key)), "{c:?}");
        }
    }

    #[test]
    fn test_every_printable_ascii_character_maps() {
        for byte in 0x20u8..0x7F {
            let c = byte as char;
            assert!(char_to_keycode(c).is_some(), "{c:?} has no mapping");
        }
    }

    #[test]
    fn test_non_ascii_characters_have_no_mapping() {
        for c in ['é', 'ß', '€', '\u{0}', '\u{7}'] {
            assert_eq!(char_to_keycode(c), None, "{c:?} should not map");
        }
    }

    #[test]
    fn test_none_stroke_is_empty_key() {
        assert_eq!(KeyStroke::NONE.key, HidKeyCode::NoKey);
        assert!(!KeyStroke::NONE.shift);
    }
}
