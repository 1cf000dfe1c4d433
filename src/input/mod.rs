//! Keystroke decoding.
//!
//! - **keymap**: two-byte special-key table
//! - **decoder**: per-keystroke classification into plain bytes, special
//!   keys and replayed multi-byte characters

pub mod decoder;
pub mod keymap;

pub use decoder::{InputError, KeyDecoder};
pub use keymap::{ctrl, KeyMapping, NO_EVENT, NUMPAD_KEY_INDICATOR, SPECIAL_KEY_INDICATOR};
