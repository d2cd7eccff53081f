use crate::keyboard::KeyHintMapper;
use crate::ruby;

/// Target of one practice round, fixed once selected.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PracticeText {
    /// What the learner has to type, annotations removed.
    pub plain: String,
    /// Hiragana reading, used for counting keystrokes.
    pub reading: String,
    /// Keystrokes the reading takes on the current layout.
    pub correct_count: usize,
}

impl PracticeText {
    pub fn new(text: &str, mapper: &KeyHintMapper) -> Self {
        let (plain, reading) = ruby::parse_plain(text);
        let correct_count = mapper.key_count(&reading);
        Self {
            plain,
            reading,
            correct_count,
        }
    }

    /// Part of the plain text after its common prefix with `typed`.
    pub fn remaining(&self, typed: &str) -> &str {
        let matched: usize = self
            .plain
            .chars()
            .zip(typed.chars())
            .take_while(|(a, b)| a == b)
            .map(|(a, _)| a.len_utf8())
            .sum();
        &self.plain[matched..]
    }
}
