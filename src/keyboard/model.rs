/// Physical key: width in hundredths of a key unit, unshifted and shifted
/// legends. Legends are strings because modifier and IME keys carry words
/// (`変換`) and remapped kana layouts may blank a legend entirely.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PhysicalKey {
    pub width: u16,
    pub base: String,
    pub shifted: String,
}

impl PhysicalKey {
    pub fn new(width: u16, base: &str, shifted: &str) -> Self {
        Self {
            width,
            base: base.to_string(),
            shifted: shifted.to_string(),
        }
    }
}

type RowSpec = &'static [(u16, &'static str, &'static str)];

const ANSI_104: &[RowSpec] = &[
    &[
        (100, "`", "~"),
        (100, "1", "!"),
        (100, "2", "@"),
        (100, "3", "#"),
        (100, "4", "$"),
        (100, "5", "%"),
        (100, "6", "^"),
        (100, "7", "&"),
        (100, "8", "*"),
        (100, "9", "("),
        (100, "0", ")"),
        (100, "-", "_"),
        (100, "=", "+"),
        (200, "⌫", ""),
    ],
    &[
        (150, "⇥", ""),
        (100, "q", "Q"),
        (100, "w", "W"),
        (100, "e", "E"),
        (100, "r", "R"),
        (100, "t", "T"),
        (100, "y", "Y"),
        (100, "u", "U"),
        (100, "i", "I"),
        (100, "o", "O"),
        (100, "p", "P"),
        (100, "[", "{"),
        (100, "]", "}"),
        (150, "\\", "|"),
    ],
    &[
        (175, "⇪", ""),
        (100, "a", "A"),
        (100, "s", "S"),
        (100, "d", "D"),
        (100, "f", "F"),
        (100, "g", "G"),
        (100, "h", "H"),
        (100, "j", "J"),
        (100, "k", "K"),
        (100, "l", "L"),
        (100, ";", ":"),
        (100, "'", "\""),
        (225, "⏎", ""),
    ],
    &[
        (225, "⇧", ""),
        (100, "z", "Z"),
        (100, "x", "X"),
        (100, "c", "C"),
        (100, "v", "V"),
        (100, "b", "B"),
        (100, "n", "N"),
        (100, "m", "M"),
        (100, ",", "<"),
        (100, ".", ">"),
        (100, "/", "?"),
        (275, "⇧", ""),
    ],
    &[
        (125, "⌃", ""),
        (125, "❖", ""),
        (125, "⌥", ""),
        (625, " ", ""),
        (125, "⌥", ""),
        (125, "❖", ""),
        (125, "☰", ""),
        (125, "⌃", ""),
    ],
];

const JIS_109: &[RowSpec] = &[
    &[
        (100, "🌍", ""),
        (100, "1", "!"),
        (100, "2", "\""),
        (100, "3", "#"),
        (100, "4", "$"),
        (100, "5", "%"),
        (100, "6", "&"),
        (100, "7", "'"),
        (100, "8", "("),
        (100, "9", ")"),
        (100, "0", "_"),
        (100, "-", "="),
        (100, "^", "~"),
        (100, "¥", "|"),
        (100, "⌫", ""),
    ],
    &[
        (150, "⇥", ""),
        (100, "q", "Q"),
        (100, "w", "W"),
        (100, "e", "E"),
        (100, "r", "R"),
        (100, "t", "T"),
        (100, "y", "Y"),
        (100, "u", "U"),
        (100, "i", "I"),
        (100, "o", "O"),
        (100, "p", "P"),
        (100, "@", "`"),
        (100, "[", "{"),
        (150, "⏎", ""),
    ],
    &[
        (175, "⇪", ""),
        (100, "a", "A"),
        (100, "s", "S"),
        (100, "d", "D"),
        (100, "f", "F"),
        (100, "g", "G"),
        (100, "h", "H"),
        (100, "j", "J"),
        (100, "k", "K"),
        (100, "l", "L"),
        (100, ";", "+"),
        (100, ":", "*"),
        (100, "]", "}"),
    ],
    &[
        (225, "⇧", ""),
        (100, "z", "Z"),
        (100, "x", "X"),
        (100, "c", "C"),
        (100, "v", "V"),
        (100, "b", "B"),
        (100, "n", "N"),
        (100, "m", "M"),
        (100, ",", "<"),
        (100, ".", ">"),
        (100, "/", "?"),
        (100, "\\", "_"),
        (175, "⇧", ""),
    ],
    &[
        (150, "⌃", ""),
        (125, "❖", ""),
        (125, "⌥", ""),
        (150, "無変換", ""),
        (250, " ", ""),
        (150, "変換", ""),
        (125, "カタカナ", ""),
        (100, "⌥", ""),
        (100, "❖", ""),
        (100, "☰", ""),
        (125, "⌃", ""),
    ],
];

#[derive(Clone, Debug)]
pub struct KeyboardModel {
    pub name: &'static str,
    pub rows: Vec<Vec<PhysicalKey>>,
}

impl KeyboardModel {
    fn from_spec(name: &'static str, spec: &[RowSpec]) -> Self {
        let rows = spec
            .iter()
            .map(|row| {
                row.iter()
                    .map(|&(width, base, shifted)| PhysicalKey::new(width, base, shifted))
                    .collect()
            })
            .collect();
        Self { name, rows }
    }

    pub fn ansi_104() -> Self {
        Self::from_spec("104", ANSI_104)
    }

    pub fn jis_109() -> Self {
        Self::from_spec("109", JIS_109)
    }

    /// Base model for a layout description file: `*.109.json` describes a
    /// JIS keyboard, anything else an ANSI one.
    pub fn for_layout_path(path: &str) -> Self {
        if path.ends_with(".109.json") {
            Self::jis_109()
        } else {
            Self::ansi_104()
        }
    }

    pub fn key(&self, row: usize, column: usize) -> Option<&PhysicalKey> {
        self.rows.get(row).and_then(|keys| keys.get(column))
    }

    /// Positions of every key whose unshifted legend is `legend`.
    pub fn positions_of(&self, legend: &str) -> Vec<(usize, usize)> {
        let mut found = Vec::new();
        for (row_idx, row) in self.rows.iter().enumerate() {
            for (col_idx, key) in row.iter().enumerate() {
                if key.base == legend {
                    found.push((row_idx, col_idx));
                }
            }
        }
        found
    }
}

impl Default for KeyboardModel {
    fn default() -> Self {
        Self::ansi_104()
    }
}

/// Key-role name (`Shift_L`, `Alt_R`...) of a modifier legend. The first
/// four keys of a row count as the left-hand modifiers.
pub fn modifier_role(legend: &str, column: usize) -> Option<String> {
    let role = match legend {
        "⌃" => "Control_",
        "❖" => "Super_",
        "⌥" => "Alt_",
        "⇧" => "Shift_",
        _ => return None,
    };
    let side = if column >= 4 { 'R' } else { 'L' };
    Some(format!("{role}{side}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_shapes() {
        let ansi = KeyboardModel::ansi_104();
        let lengths: Vec<usize> = ansi.rows.iter().map(Vec::len).collect();
        assert_eq!(lengths, vec![14, 14, 13, 12, 8]);

        let jis = KeyboardModel::jis_109();
        let lengths: Vec<usize> = jis.rows.iter().map(Vec::len).collect();
        assert_eq!(lengths, vec![15, 14, 13, 13, 11]);
    }

    #[test]
    fn test_layout_path_selects_model() {
        assert_eq!(KeyboardModel::for_layout_path("/x/kana.109.json").name, "109");
        assert_eq!(KeyboardModel::for_layout_path("/x/roomazi.json").name, "104");
        assert_eq!(KeyboardModel::for_layout_path("").name, "104");
    }

    #[test]
    fn test_modifier_roles_by_side() {
        let ansi = KeyboardModel::ansi_104();
        let shifts = ansi.positions_of("⇧");
        assert_eq!(shifts, vec![(3, 0), (3, 11)]);
        assert_eq!(modifier_role("⇧", 0).as_deref(), Some("Shift_L"));
        assert_eq!(modifier_role("⇧", 11).as_deref(), Some("Shift_R"));
        assert_eq!(modifier_role("⌥", 4).as_deref(), Some("Alt_R"));
        assert_eq!(modifier_role("a", 1), None);
    }
}
