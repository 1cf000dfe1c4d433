//! Special-key mapping
//!
//! Windows consoles report arrow, navigation and numpad keys as two bytes:
//! an indicator (`224`, or `0` for the numpad) followed by the key's scan
//! code. The line editor binds emacs-style control codes, so each key is
//! translated to the control code it conventionally stands for.

/// Logical control codes produced for special keys.
pub mod ctrl {
    pub const CTRL_A: u32 = 0x01;
    pub const CTRL_B: u32 = 0x02;
    pub const CTRL_C: u32 = 0x03;
    pub const CTRL_E: u32 = 0x05;
    pub const CTRL_F: u32 = 0x06;
    pub const CTRL_K: u32 = 0x0B;
    pub const CTRL_L: u32 = 0x0C;
    pub const CTRL_N: u32 = 0x0E;
    pub const CTRL_P: u32 = 0x10;
    /// Ctrl+[ (ESC)
    pub const CTRL_OB: u32 = 0x1B;
    /// Ctrl+? (DEL)
    pub const CTRL_QM: u32 = 0x7F;
}

/// Indicator byte for arrow and navigation keys.
pub const SPECIAL_KEY_INDICATOR: u8 = 224;

/// Indicator byte for numpad keys.
pub const NUMPAD_KEY_INDICATOR: u8 = 0;

/// Neutral code for an unmapped follow byte.
pub const NO_EVENT: u32 = 0;

// Scan codes following an indicator
pub const HOME_KEY: u8 = 71;
pub const UP_ARROW_KEY: u8 = 72;
pub const PAGE_UP_KEY: u8 = 73;
pub const LEFT_ARROW_KEY: u8 = 75;
pub const RIGHT_ARROW_KEY: u8 = 77;
pub const END_KEY: u8 = 79;
pub const DOWN_ARROW_KEY: u8 = 80;
pub const PAGE_DOWN_KEY: u8 = 81;
pub const INSERT_KEY: u8 = 82;
pub const DELETE_KEY: u8 = 83;
pub const ESCAPE_KEY: u8 = 0;

/// Static (indicator, follow) -> control code table.
pub struct KeyMapping;

impl KeyMapping {
    /// True for the two indicator bytes that start a special-key sequence.
    pub fn is_indicator(byte: u8) -> bool {
        byte == SPECIAL_KEY_INDICATOR || byte == NUMPAD_KEY_INDICATOR
    }

    /// Control code for a special-key sequence, [`NO_EVENT`] if unmapped.
    pub fn lookup(indicator: u8, follow: u8) -> u32 {
        if !Self::is_indicator(indicator) {
            return NO_EVENT;
        }

        // Both indicators share one table
        match follow {
            UP_ARROW_KEY => ctrl::CTRL_P,
            LEFT_ARROW_KEY => ctrl::CTRL_B,
            RIGHT_ARROW_KEY => ctrl::CTRL_F,
            DOWN_ARROW_KEY => ctrl::CTRL_N,
            DELETE_KEY => ctrl::CTRL_QM,
            HOME_KEY => ctrl::CTRL_A,
            END_KEY => ctrl::CTRL_E,
            PAGE_UP_KEY => ctrl::CTRL_K,
            PAGE_DOWN_KEY => ctrl::CTRL_L,
            ESCAPE_KEY => ctrl::CTRL_OB,
            INSERT_KEY => ctrl::CTRL_C,
            _ => NO_EVENT,
        }
    }
}
