//! Full-width / half-width folding and katakana normalization.

const FULLWIDTH_OFFSET: u32 = 0xFF01 - 0x21;
const KATAKANA_OFFSET: u32 = 0x30A1 - 0x3041;

const IDEOGRAPHIC_SPACE: char = '\u{3000}';
const FULLWIDTH_YEN: char = '\u{FFE5}';

/// Half-width counterpart of a full-width character, if it has one.
pub fn half_width(c: char) -> Option<char> {
    match c {
        '\u{FF01}'..='\u{FF5E}' => char::from_u32(c as u32 - FULLWIDTH_OFFSET),
        IDEOGRAPHIC_SPACE => Some(' '),
        FULLWIDTH_YEN => Some('¥'),
        _ => None,
    }
}

/// Full-width counterpart of a printable ASCII character, space or yen sign.
pub fn full_width(c: char) -> Option<char> {
    match c {
        '\u{21}'..='\u{7E}' => char::from_u32(c as u32 + FULLWIDTH_OFFSET),
        ' ' => Some(IDEOGRAPHIC_SPACE),
        '¥' => Some(FULLWIDTH_YEN),
        _ => None,
    }
}

pub fn to_hankaku(s: &str) -> String {
    s.chars().map(|c| half_width(c).unwrap_or(c)).collect()
}

pub fn to_zenkaku(s: &str) -> String {
    s.chars().map(|c| full_width(c).unwrap_or(c)).collect()
}

/// Katakana (ァ..ヶ, ヽ, ヾ) to hiragana; `・` and `ー` are shared and kept.
pub fn katakana_to_hiragana(s: &str) -> String {
    s.chars()
        .map(|c| match c {
            '\u{30A1}'..='\u{30F6}' | '\u{30FD}' | '\u{30FE}' => {
                char::from_u32(c as u32 - KATAKANA_OFFSET).unwrap_or(c)
            }
            _ => c,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zenkaku_round_trips_ascii() {
        let ascii = "Hello, World! 123 ¥";
        assert_eq!(to_hankaku(&to_zenkaku(ascii)), ascii);
        assert_eq!(to_zenkaku("a b"), "ａ\u{3000}ｂ");
    }

    #[test]
    fn hankaku_leaves_kana_alone() {
        assert_eq!(to_hankaku("かな！"), "かな!");
    }

    #[test]
    fn katakana_folds_to_hiragana() {
        assert_eq!(katakana_to_hiragana("カタカナ"), "かたかな");
        assert_eq!(katakana_to_hiragana("ラーメン・ヴ"), "らーめん・ゔ");
        assert_eq!(katakana_to_hiragana("ヽヾ"), "ゝゞ");
        assert_eq!(katakana_to_hiragana("abc漢字"), "abc漢字");
    }
}
