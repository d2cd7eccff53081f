/// Named (non-character) keys the engine needs to tell apart.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum NamedKey {
    BackSpace,
    CapsLock,
    Henkan,
    Muhenkan,
    HiraganaKatakana,
    ShiftL,
    ShiftR,
    Space,
    Return,
    VoidSymbol,
    Other,
}

impl NamedKey {
    /// Parses an X keysym name as used in layout descriptions.
    pub fn from_name(name: &str) -> Self {
        match name {
            "BackSpace" => NamedKey::BackSpace,
            "Caps_Lock" => NamedKey::CapsLock,
            "Henkan" | "Henkan_Mode" => NamedKey::Henkan,
            "Muhenkan" => NamedKey::Muhenkan,
            "Hiragana_Katakana" => NamedKey::HiraganaKatakana,
            "Shift_L" => NamedKey::ShiftL,
            "Shift_R" => NamedKey::ShiftR,
            "space" => NamedKey::Space,
            "Return" => NamedKey::Return,
            "VoidSymbol" => NamedKey::VoidSymbol,
            _ => NamedKey::Other,
        }
    }

    /// Legend of the physical key producing this keysym, if it has one.
    pub fn legend(self) -> Option<&'static str> {
        match self {
            NamedKey::Henkan => Some("変換"),
            NamedKey::Muhenkan => Some("無変換"),
            NamedKey::HiraganaKatakana => Some("カタカナ"),
            NamedKey::Space => Some(" "),
            NamedKey::BackSpace => Some("⌫"),
            NamedKey::Return => Some("⏎"),
            _ => None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Key {
    Char(char),
    Named(NamedKey),
}

/// Raw key press delivered by the windowing layer, used only for counting
/// keystrokes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct KeyPress {
    pub key: Key,
    /// Set for events re-injected by an input method rather than typed.
    pub synthetic: bool,
}

impl KeyPress {
    pub fn char(c: char) -> Self {
        Self {
            key: Key::Char(c),
            synthetic: false,
        }
    }

    pub fn named(key: NamedKey) -> Self {
        Self {
            key: Key::Named(key),
            synthetic: false,
        }
    }
}

/// Keys that never count as a keystroke: editing, shifting and IME toggles.
pub const ALWAYS_IGNORED: &[NamedKey] = &[
    NamedKey::BackSpace,
    NamedKey::CapsLock,
    NamedKey::Henkan,
    NamedKey::HiraganaKatakana,
    NamedKey::ShiftL,
    NamedKey::ShiftR,
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_keysym_names() {
        assert_eq!(NamedKey::from_name("Henkan"), NamedKey::Henkan);
        assert_eq!(NamedKey::from_name("Shift_R"), NamedKey::ShiftR);
        assert_eq!(NamedKey::from_name("F13"), NamedKey::Other);
        assert_eq!(NamedKey::Muhenkan.legend(), Some("無変換"));
        assert_eq!(NamedKey::ShiftL.legend(), None);
    }
}
