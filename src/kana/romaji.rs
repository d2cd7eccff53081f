use tracing::debug;

use crate::kana::table::{self, gemination_consonant};
use crate::kana::width::half_width;
use crate::keyboard::display::RETURN;

const MORAIC_NASAL: char = 'ん';
const SOKUON: char = 'っ';
const LONG_VOWEL_MARK: char = 'ー';

/// Kana after which a moraic nasal must be typed as `n'`.
const NASAL_APOSTROPHE_BEFORE: &str = "あいうえおやゆよ";
/// Extra kana that need `n'` under JIS X 4063 (`nn` then `a` would read as んあ).
const NASAL_APOSTROPHE_BEFORE_X4063: &str = "なにぬねの";

/// One mora taken from the front of a kana string.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Mora {
    /// Number of input chars consumed.
    pub consumed: usize,
    pub romaji: String,
}

/// Kana to romaji keystroke transliteration.
#[derive(Clone, Copy, Debug)]
pub struct Romanizer {
    x4063: bool,
}

impl Default for Romanizer {
    fn default() -> Self {
        Self { x4063: true }
    }
}

impl Romanizer {
    pub fn new(x4063: bool) -> Self {
        Self { x4063 }
    }

    pub fn x4063(&self) -> bool {
        self.x4063
    }

    pub fn set_x4063(&mut self, value: bool) {
        self.x4063 = value;
        debug!(x4063 = value, "moraic nasal disambiguation changed");
    }

    /// Romanizes the first mora of `chars`, folding a following long vowel
    /// mark into the vowel as a circumflex.
    pub fn next_mora(&self, chars: &[char]) -> Option<Mora> {
        let mut mora = self.next_mora_without_long_vowel(chars)?;
        if chars.get(mora.consumed) == Some(&LONG_VOWEL_MARK) {
            if let Some(long) = mora.romaji.chars().last().and_then(lengthen) {
                mora.romaji.pop();
                mora.romaji.push(long);
                mora.consumed += 1;
            }
        }
        Some(mora)
    }

    fn next_mora_without_long_vowel(&self, chars: &[char]) -> Option<Mora> {
        let first = *chars.first()?;

        if first == MORAIC_NASAL && chars.get(1).is_some_and(|&next| self.needs_apostrophe(next)) {
            return Some(Mora {
                consumed: 1,
                romaji: "n'".to_string(),
            });
        }

        if first == SOKUON {
            let consonant = chars.get(1).copied().and_then(gemination_consonant);
            if let Some(consonant) = consonant {
                if let Some(rest) = self.next_mora_without_long_vowel(&chars[1..]) {
                    let mut romaji = String::with_capacity(rest.romaji.len() + 1);
                    romaji.push(consonant);
                    romaji.push_str(&rest.romaji);
                    return Some(Mora {
                        consumed: rest.consumed + 1,
                        romaji,
                    });
                }
            }
        }

        if chars.len() >= 2 {
            let digraph: String = chars[..2].iter().collect();
            if let Some(romaji) = table::lookup(&digraph) {
                return Some(Mora {
                    consumed: 2,
                    romaji: romaji.to_string(),
                });
            }
        }

        let mut buf = [0u8; 4];
        if let Some(romaji) = table::lookup(first.encode_utf8(&mut buf)) {
            if first == MORAIC_NASAL {
                // A plain `n` is only complete once the next mora is typed.
                return Some(match self.next_mora(&chars[1..]) {
                    Some(next) => Mora {
                        consumed: next.consumed + 1,
                        romaji: format!("n{}", next.romaji),
                    },
                    None => Mora {
                        consumed: 1,
                        romaji: romaji.to_string(),
                    },
                });
            }
            return Some(Mora {
                consumed: 1,
                romaji: romaji.to_string(),
            });
        }

        let romaji = match first {
            '\n' => RETURN.to_string(),
            c => half_width(c).unwrap_or(c).to_string(),
        };
        Some(Mora {
            consumed: 1,
            romaji,
        })
    }

    fn needs_apostrophe(&self, next: char) -> bool {
        NASAL_APOSTROPHE_BEFORE.contains(next)
            || (self.x4063 && NASAL_APOSTROPHE_BEFORE_X4063.contains(next))
    }

    pub fn romanize(&self, s: &str) -> String {
        let chars: Vec<char> = s.chars().collect();
        let mut rest = chars.as_slice();
        let mut romaji = String::new();
        while let Some(mora) = self.next_mora(rest) {
            romaji.push_str(&mora.romaji);
            rest = &rest[mora.consumed..];
        }
        romaji
    }

    /// Keystrokes needed to type `reading`, counting the key that still
    /// has to settle a trailing `n`.
    pub fn key_count(&self, reading: &str) -> usize {
        let keys = hyphenize(&self.romanize(reading));
        let mut count = keys.chars().count();
        if keys.ends_with('n') {
            count += 1;
        }
        count
    }
}

fn lengthen(vowel: char) -> Option<char> {
    match vowel {
        'a' => Some('â'),
        'i' => Some('î'),
        'u' => Some('û'),
        'e' => Some('ê'),
        'o' => Some('ô'),
        _ => None,
    }
}

fn shorten(vowel: char) -> Option<char> {
    match vowel {
        'â' => Some('a'),
        'î' => Some('i'),
        'û' => Some('u'),
        'ê' => Some('e'),
        'ô' => Some('o'),
        _ => None,
    }
}

/// Spells every lengthened vowel as the plain vowel followed by `-`, the
/// way it is actually typed.
pub fn hyphenize(romaji: &str) -> String {
    let mut out = String::with_capacity(romaji.len());
    for c in romaji.chars() {
        match shorten(c) {
            Some(plain) => {
                out.push(plain);
                out.push('-');
            }
            None => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn romanize(s: &str) -> String {
        Romanizer::default().romanize(s)
    }

    #[test]
    fn every_mora_romanizes_to_something() {
        let romanizer = Romanizer::default();
        for mora in table::morae() {
            let first = romanizer.romanize(mora);
            assert!(!first.is_empty(), "{mora}");
            assert_eq!(first, romanizer.romanize(mora), "{mora}");
            assert!(hyphenize(&first).chars().count() >= first.chars().count());
        }
    }

    #[test]
    fn digraph_wins_over_single() {
        assert_eq!(romanize("きょう"), "kyou");
        assert_eq!(romanize("しゃしん"), "syasin");
    }

    #[test]
    fn nasal_before_vowel_takes_apostrophe() {
        assert_eq!(romanize("んあ"), "n'a");
        assert!(romanize("んあ").starts_with("n'"));
        assert_eq!(romanize("きんよう"), "kin'you");
    }

    #[test]
    fn nasal_before_na_row_depends_on_x4063() {
        assert_eq!(Romanizer::new(true).romanize("こんにちは"), "kon'nitiha");
        assert_eq!(Romanizer::new(false).romanize("こんにちは"), "konnitiha");
    }

    #[test]
    fn nasal_before_consonant_merges_with_next_mora() {
        let chars: Vec<char> = "んか".chars().collect();
        let mora = Romanizer::default().next_mora(&chars).unwrap();
        assert_eq!(mora.consumed, 2);
        assert_eq!(mora.romaji, "nka");
    }

    #[test]
    fn sokuon_doubles_consonant() {
        assert_eq!(romanize("った"), "tta");
        assert_eq!(romanize("た"), "ta");
        assert_eq!(romanize("きっぷ"), "kippu");
        assert_eq!(romanize("まっちゃ"), "mattya");
    }

    #[test]
    fn unmapped_sokuon_is_typed_explicitly() {
        assert_eq!(romanize("っあ"), "xtua");
        assert_eq!(romanize("あっ"), "axtu");
    }

    #[test]
    fn long_vowel_folds_into_circumflex() {
        assert_eq!(romanize("らーめん"), "râmen");
        assert_eq!(hyphenize(&romanize("らーめん")), "ra-men");
        assert_eq!(romanize("ーあ"), "-a");
        assert_eq!(romanize("んー"), "n-");
    }

    #[test]
    fn full_width_and_newline() {
        assert_eq!(romanize("ＡＢ！"), "AB!");
        assert_eq!(romanize("あ\nい"), format!("a{RETURN}i"));
        assert_eq!(romanize("漢"), "漢");
        assert_eq!(romanize("、。"), ",.");
    }

    #[test]
    fn key_count_adds_pending_nasal_key() {
        let romanizer = Romanizer::default();
        assert_eq!(romanizer.key_count("たべる"), "taberu".len());
        assert_eq!(romanizer.key_count("ほん"), 4);
        assert_eq!(romanizer.key_count("らーめん"), "ra-men".len() + 1);
        assert_eq!(romanizer.key_count(""), 0);
    }

    #[test]
    fn key_count_never_decreases_when_appending() {
        let romanizer = Romanizer::default();
        let samples = ["か", "ほん", "きっ", "らー", "こん", "ん"];
        let tails = ['あ', 'ん', 'ー', 'っ', 'ゃ', 'な', 'ｎ', '\n'];
        for base in samples {
            for tail in tails {
                let longer = format!("{base}{tail}");
                assert!(
                    romanizer.key_count(&longer) >= romanizer.key_count(base),
                    "{base} + {tail}"
                );
            }
        }
    }
}
