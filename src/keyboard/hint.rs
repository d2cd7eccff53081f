use crate::kana::{Romanizer, hyphenize};
use crate::keyboard::display::{DAKUTEN, HANDAKUTEN, RETURN, SHIFT};
use crate::keyboard::finger::{Hand, hand_for_column};
use crate::keyboard::layout::KeyboardLayout;

const DAKU: &str = "がぎぐげござじずぜぞだぢづでどばびぶべぼゔ";
const NON_DAKU: &str = "かきくけこさしすせそたちつてとはひふへほう";
const HANDAKU: &str = "ぱぴぷぺぽ";
const NON_HANDAKU: &str = "はひふへほ";
const SMALL: &str = "ぁぃぅぇぉゃゅょっ";
const NON_SMALL: &str = "あいうえおやゆよつ";

fn counterpart(c: char, from: &str, to: &str) -> Option<char> {
    from.chars()
        .position(|f| f == c)
        .and_then(|i| to.chars().nth(i))
}

/// Splits a voiced, semi-voiced or small kana into the key typed first and
/// the modifier typed after it. Small kana listed in `small_kana` go
/// through the dakuten key; others are on a key of their own.
pub fn decompose(c: char, small_kana: &[char]) -> Option<(char, char)> {
    if let Some(base) = counterpart(c, DAKU, NON_DAKU) {
        return Some((base, DAKUTEN));
    }
    if let Some(base) = counterpart(c, HANDAKU, NON_HANDAKU) {
        return Some((base, HANDAKUTEN));
    }
    if small_kana.contains(&c) {
        return counterpart(c, SMALL, NON_SMALL).map(|base| (base, DAKUTEN));
    }
    None
}

/// Key to press for a hint character, at `row`/`column` of the layout model.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct KeyPosition {
    pub row: usize,
    pub column: usize,
    pub shifted: bool,
}

/// What to type next for the front of the remaining text.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct KeyHint {
    /// Chars of the remaining text this hint covers, newline shown as `⏎`.
    pub literal: String,
    pub consumed: usize,
    /// Keys in typing order: hyphenized romaji, or decomposed kana.
    pub sequence: String,
    pub keys: Vec<KeyPosition>,
    /// Shift keys to hold, opposite the hand typing a shifted key.
    pub shift_keys: Vec<(usize, usize)>,
}

/// Maps reading text onto the keys of the current layout, for hints and
/// for counting the keystrokes a practice text needs.
#[derive(Clone, Debug, Default)]
pub struct KeyHintMapper {
    romanizer: Romanizer,
    layout: KeyboardLayout,
}

impl KeyHintMapper {
    pub fn new(romanizer: Romanizer, layout: KeyboardLayout) -> Self {
        Self { romanizer, layout }
    }

    pub fn layout(&self) -> &KeyboardLayout {
        &self.layout
    }

    pub fn set_layout(&mut self, layout: KeyboardLayout) {
        self.layout = layout;
    }

    pub fn romanizer(&self) -> &Romanizer {
        &self.romanizer
    }

    pub fn set_x4063(&mut self, value: bool) {
        self.romanizer.set_x4063(value);
    }

    /// Decomposed kana keystrokes for the first char of `chars`.
    fn next_kana(&self, chars: &[char]) -> Option<String> {
        let c = *chars.first()?;
        if c == '\n' {
            return Some(RETURN.to_string());
        }
        Some(match decompose(c, &self.layout.small_kana) {
            Some((base, modifier)) => [base, modifier].iter().collect(),
            None => c.to_string(),
        })
    }

    /// Returns (chars consumed, key sequence) for the front of `chars`.
    fn next_sequence(&self, chars: &[char]) -> Option<(usize, String)> {
        if self.layout.is_romaji() {
            let mora = self.romanizer.next_mora(chars)?;
            Some((mora.consumed, hyphenize(&mora.romaji)))
        } else {
            self.next_kana(chars).map(|seq| (1, seq))
        }
    }

    pub fn next_hint(&self, remaining: &str) -> KeyHint {
        let chars: Vec<char> = remaining.chars().collect();
        let Some((consumed, sequence)) = self.next_sequence(&chars) else {
            return KeyHint::default();
        };
        let literal = chars[..consumed]
            .iter()
            .map(|&c| if c == '\n' { RETURN } else { c })
            .collect();
        let (keys, shift_keys) = self.locate(&sequence);
        KeyHint {
            literal,
            consumed,
            sequence,
            keys,
            shift_keys,
        }
    }

    fn locate(&self, sequence: &str) -> (Vec<KeyPosition>, Vec<(usize, usize)>) {
        let mut keys: Vec<KeyPosition> = Vec::new();
        let mut shift_left = false;
        let mut shift_right = false;
        for c in sequence.chars() {
            for (row, physical) in self.layout.model.rows.iter().enumerate() {
                for (column, key) in physical.iter().enumerate() {
                    let shifted = if key.base.contains(c) {
                        false
                    } else if key.shifted.contains(c) {
                        true
                    } else {
                        continue;
                    };
                    if shifted {
                        match hand_for_column(column).opposite() {
                            Hand::Left => shift_left = true,
                            Hand::Right => shift_right = true,
                        }
                    }
                    let position = KeyPosition {
                        row,
                        column,
                        shifted,
                    };
                    if !keys.contains(&position) {
                        keys.push(position);
                    }
                }
            }
        }

        let shifts = self.layout.model.positions_of(&SHIFT.to_string());
        let mut shift_keys = Vec::new();
        if let Some(&left) = shifts.first() {
            if shift_right {
                shift_keys.push(*shifts.get(1).unwrap_or(&left));
            }
            if shift_left && !shift_keys.contains(&left) {
                shift_keys.push(left);
            }
        }
        (keys, shift_keys)
    }

    /// Keystrokes needed to type `reading` on this layout.
    pub fn key_count(&self, reading: &str) -> usize {
        if self.layout.is_romaji() {
            return self.romanizer.key_count(reading);
        }
        let chars: Vec<char> = reading.chars().collect();
        chars
            .iter()
            .enumerate()
            .filter_map(|(i, _)| self.next_kana(&chars[i..]))
            .map(|seq| seq.chars().count())
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keyboard::layout::{LayoutDescriptor, SMALL_KANA};
    use crate::keyboard::model::KeyboardModel;

    fn kana_mapper(json: &str) -> KeyHintMapper {
        let desc = LayoutDescriptor::from_json(json).unwrap();
        let layout = KeyboardLayout::from_descriptor(KeyboardModel::jis_109(), &desc);
        KeyHintMapper::new(Romanizer::default(), layout)
    }

    #[test]
    fn test_decompose_marks() {
        let all_small: Vec<char> = SMALL_KANA.chars().collect();
        assert_eq!(decompose('が', &all_small), Some(('か', DAKUTEN)));
        assert_eq!(decompose('ゔ', &all_small), Some(('う', DAKUTEN)));
        assert_eq!(decompose('ぽ', &all_small), Some(('ほ', HANDAKUTEN)));
        assert_eq!(decompose('ゃ', &all_small), Some(('や', DAKUTEN)));
        assert_eq!(decompose('ゃ', &[]), None);
        assert_eq!(decompose('か', &all_small), None);
    }

    #[test]
    fn test_romaji_hint_for_next_mora() {
        let mapper = KeyHintMapper::default();
        let hint = mapper.next_hint("きょうは");
        assert_eq!(hint.literal, "きょ");
        assert_eq!(hint.consumed, 2);
        assert_eq!(hint.sequence, "kyo");
        // k, y, o on the 104 model, unshifted
        assert_eq!(hint.keys.len(), 3);
        assert!(hint.keys.iter().all(|k| !k.shifted));
        assert!(hint.shift_keys.is_empty());
    }

    #[test]
    fn test_romaji_hint_hyphenizes_long_vowel() {
        let mapper = KeyHintMapper::default();
        let hint = mapper.next_hint("らーめん");
        assert_eq!(hint.literal, "らー");
        assert_eq!(hint.sequence, "ra-");
    }

    #[test]
    fn test_nasal_before_vowel_hint() {
        let mapper = KeyHintMapper::default();
        let hint = mapper.next_hint("んあ");
        assert_eq!(hint.literal, "ん");
        assert_eq!(hint.sequence, "n'");
    }

    #[test]
    fn test_shifted_key_asks_for_opposite_shift() {
        let mapper = KeyHintMapper::default();
        // '!' is shifted 1, typed by the left hand
        let hint = mapper.next_hint("！");
        assert_eq!(hint.sequence, "!");
        assert_eq!(
            hint.keys,
            vec![KeyPosition {
                row: 0,
                column: 1,
                shifted: true
            }]
        );
        assert_eq!(hint.shift_keys, vec![(3, 11)]);
    }

    #[test]
    fn test_newline_hint() {
        let mapper = KeyHintMapper::default();
        let hint = mapper.next_hint("\nあ");
        assert_eq!(hint.literal, RETURN.to_string());
        assert_eq!(hint.sequence, RETURN.to_string());
        assert_eq!(hint.keys.len(), 1);
    }

    #[test]
    fn test_kana_hint_and_count() {
        let mapper = kana_mapper(r#"{"Type": "Kana", "Normal": {"q": "か", "w": "ゃ"}}"#);
        assert!(!mapper.layout().is_romaji());

        let hint = mapper.next_hint("がっこう");
        assert_eq!(hint.literal, "が");
        assert_eq!(hint.sequence, format!("か{DAKUTEN}"));
        assert_eq!(hint.keys[0], KeyPosition { row: 1, column: 1, shifted: false });

        // ゃ has its own key here, っ does not
        assert_eq!(mapper.key_count("ゃ"), 1);
        assert_eq!(mapper.key_count("がっこう"), 2 + 2 + 1 + 1);
        assert_eq!(mapper.key_count("あ\n"), 2);
    }

    #[test]
    fn test_romaji_count_delegates_to_romanizer() {
        let mapper = KeyHintMapper::default();
        assert_eq!(mapper.key_count("たべる"), 6);
        assert_eq!(mapper.key_count("ほん"), 4);
    }
}
