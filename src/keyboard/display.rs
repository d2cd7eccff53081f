//! Legends and symbols shared between the transliterator, the key hint
//! mapper and whatever paints the keyboard.
//!
//! The rendering layer receives these as plain chars and should go through
//! [`key_display_name`] instead of matching the raw legend.

/// Hint symbol for a line break in the target text.
pub const RETURN: char = '⏎';
/// Legend of the backspace key.
pub const BACKSPACE: char = '⌫';
/// Legend of a shift key (and of the space bar on prefix-shift layouts).
pub const SHIFT: char = '⇧';
/// Space bar legend on kana layouts.
pub const IDEOGRAPHIC_SPACE: char = '\u{3000}';
/// Voiced sound mark typed after the base kana.
pub const DAKUTEN: char = '゛';
/// Semi-voiced sound mark typed after the base kana.
pub const HANDAKUTEN: char = '゜';

/// Human-readable name for legends that do not read well on a key cap.
/// Returns `""` for ordinary legends.
pub fn key_display_name(legend: char) -> &'static str {
    match legend {
        IDEOGRAPHIC_SPACE => "空白",
        SHIFT => "シフト",
        RETURN => "Enter",
        BACKSPACE => "Backspace",
        _ => "",
    }
}
