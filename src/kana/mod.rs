//! Kana reading to keystroke transliteration.
//!
//! The romanizer works one mora at a time so the key hint mapper can show
//! the keys for the next mora, and the whole-string forms are used for
//! counting the keystrokes a practice text needs.

pub mod romaji;
pub mod table;
pub mod width;

pub use romaji::{Mora, Romanizer, hyphenize};
pub use width::{katakana_to_hiragana, to_hankaku, to_zenkaku};
