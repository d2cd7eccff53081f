use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde_json::{Map, Value};
use tracing::{error, info, warn};

use crate::error::{EngineError, Result};
use crate::event::NamedKey;
use crate::keyboard::display::{IDEOGRAPHIC_SPACE, SHIFT};
use crate::keyboard::model::{KeyboardModel, PhysicalKey, modifier_role};

/// Small kana typed as their full-size key plus a modifier unless the
/// layout has a key of their own.
pub const SMALL_KANA: &str = "ぁぃぅぇぉゃゅょっ";

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum LayoutKind {
    #[default]
    Romaji,
    Kana,
}

/// Typed view of a layout description file (a JSON object).
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LayoutDescriptor {
    /// Modifier role (`Alt_R`, `Shift_R`...) whose key acts as the space bar.
    pub space: Option<String>,
    /// Keysym name of the conversion key.
    pub henkan: Option<NamedKey>,
    /// Keysym name of the non-conversion key.
    pub muhenkan: Option<NamedKey>,
    /// The space bar is a prefix shift.
    pub prefix: bool,
    pub kind: LayoutKind,
    pub normal: BTreeMap<String, String>,
    pub shift: BTreeMap<String, String>,
}

impl LayoutDescriptor {
    /// Parses a description. The top level must be a JSON object; entries
    /// of the wrong type are skipped one by one.
    pub fn from_json(json: &str) -> std::result::Result<Self, serde_json::Error> {
        let object: Map<String, Value> = serde_json::from_str(json)?;
        Ok(Self::from_object(&object))
    }

    fn from_object(object: &Map<String, Value>) -> Self {
        let mut desc = LayoutDescriptor::default();
        for (key, value) in object {
            match (key.as_str(), value) {
                ("Space", Value::String(s)) => desc.space = Some(s.clone()),
                ("Henkan", Value::String(s)) => desc.henkan = Some(NamedKey::from_name(s)),
                ("Muhenkan", Value::String(s)) => desc.muhenkan = Some(NamedKey::from_name(s)),
                ("Prefix", Value::Bool(b)) => desc.prefix = *b,
                ("Type", Value::String(s)) => {
                    desc.kind = if s == "Kana" {
                        LayoutKind::Kana
                    } else {
                        LayoutKind::Romaji
                    };
                }
                ("Normal", Value::Object(map)) => desc.normal = string_entries(key, map),
                ("Shift", Value::Object(map)) => desc.shift = string_entries(key, map),
                ("Space" | "Henkan" | "Muhenkan" | "Prefix" | "Type" | "Normal" | "Shift", _) => {
                    warn!(entry = %key, "skipping malformed layout entry");
                }
                _ => {}
            }
        }
        desc
    }
}

fn string_entries(section: &str, map: &Map<String, Value>) -> BTreeMap<String, String> {
    map.iter()
        .filter_map(|(legend, value)| match value {
            Value::String(s) => Some((legend.clone(), s.clone())),
            _ => {
                warn!(%section, %legend, "skipping non-string remap entry");
                None
            }
        })
        .collect()
}

/// Keyboard as the learner sees it: legends after remapping, the small
/// kana still typed through a modifier, and the keys that do not count as
/// keystrokes.
#[derive(Clone, Debug)]
pub struct KeyboardLayout {
    pub kind: LayoutKind,
    pub model: KeyboardModel,
    pub small_kana: Vec<char>,
    pub ignored: Vec<NamedKey>,
}

impl Default for KeyboardLayout {
    fn default() -> Self {
        Self::romaji(KeyboardModel::default())
    }
}

impl KeyboardLayout {
    /// Plain romaji typing on an unmodified model.
    pub fn romaji(model: KeyboardModel) -> Self {
        Self {
            kind: LayoutKind::Romaji,
            model,
            small_kana: SMALL_KANA.chars().collect(),
            ignored: vec![NamedKey::VoidSymbol],
        }
    }

    pub fn load(path: &Path) -> Result<Self> {
        let json = fs::read_to_string(path).map_err(|source| EngineError::LayoutNotFound {
            path: path.to_path_buf(),
            source,
        })?;
        let desc =
            LayoutDescriptor::from_json(&json).map_err(|source| EngineError::MalformedLayout {
                path: path.to_path_buf(),
                source,
            })?;
        let model = KeyboardModel::for_layout_path(&path.to_string_lossy());
        info!(path = %path.display(), kind = ?desc.kind, "keyboard layout loaded");
        Ok(Self::from_descriptor(model, &desc))
    }

    /// Loads `path`, falling back to romaji on the matching base model if it
    /// cannot be read. An empty path selects the default layout.
    pub fn load_or_default(path: &str) -> Self {
        if path.is_empty() {
            return Self::default();
        }
        match Self::load(Path::new(path)) {
            Ok(layout) => layout,
            Err(err) => {
                error!("could not load keyboard layout: {err}");
                Self::romaji(KeyboardModel::for_layout_path(path))
            }
        }
    }

    pub fn from_descriptor(model: KeyboardModel, desc: &LayoutDescriptor) -> Self {
        match desc.kind {
            LayoutKind::Romaji => Self::build_romaji(model, desc),
            LayoutKind::Kana => Self::build_kana(model, desc),
        }
    }

    fn build_romaji(mut model: KeyboardModel, desc: &LayoutDescriptor) -> Self {
        let henkan = desc.henkan.and_then(NamedKey::legend);
        for row in &mut model.rows {
            for (column, key) in row.iter_mut().enumerate() {
                let role = modifier_role(&key.base, column);
                key.shifted = key.shifted.to_lowercase();
                if henkan == Some(key.base.as_str()) {
                    key.base.clear();
                }
                if role.is_some() && role == desc.space {
                    key.base = " ".to_string();
                }
            }
        }
        let mut layout = Self::romaji(model);
        layout.ignored.extend(desc.henkan);
        layout
    }

    fn build_kana(mut model: KeyboardModel, desc: &LayoutDescriptor) -> Self {
        let henkan = desc.henkan.and_then(NamedKey::legend);
        let muhenkan = desc.muhenkan.and_then(NamedKey::legend);
        let is_ime_key = |legend: &str| Some(legend) == henkan || Some(legend) == muhenkan;
        let mut small_kana: Vec<char> = SMALL_KANA.chars().collect();
        let mut seen_underscore = false;

        for row in &mut model.rows {
            for (column, key) in row.iter_mut().enumerate() {
                let role = modifier_role(&key.base, column);
                let PhysicalKey { base, shifted, .. } = key;
                let mut n = base.clone();
                let mut s = shifted.to_lowercase();

                // Only the first underscore keeps its legend.
                if s == "_" {
                    if seen_underscore {
                        s.clear();
                    } else {
                        seen_underscore = true;
                    }
                }
                if role.is_some() && role == desc.space {
                    n = IDEOGRAPHIC_SPACE.to_string();
                }
                if n == " " && desc.prefix {
                    n = SHIFT.to_string();
                    s.clear();
                } else if n == SHIFT.to_string() && desc.prefix {
                    n.clear();
                } else if is_ime_key(&n) {
                    n.clear();
                } else if let Some(kana) = desc.normal.get(&n) {
                    n = kana.clone();
                }
                if is_ime_key(&s) {
                    s.clear();
                } else if let Some(kana) = desc.shift.get(&s) {
                    s = kana.clone();
                }

                small_kana.retain(|c| !n.contains(*c) && !s.contains(*c));
                *base = n;
                *shifted = s;
            }
        }

        let mut ignored = vec![NamedKey::VoidSymbol];
        if desc.prefix {
            ignored.push(NamedKey::Space);
        }
        ignored.extend(desc.henkan);
        Self {
            kind: LayoutKind::Kana,
            model,
            small_kana,
            ignored,
        }
    }

    pub fn is_romaji(&self) -> bool {
        self.kind == LayoutKind::Romaji
    }

    pub fn is_ignored(&self, key: NamedKey) -> bool {
        self.ignored.contains(&key)
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    const KANA_JSON: &str = r#"{
        "Type": "Kana",
        "Space": "Alt_R",
        "Prefix": true,
        "Henkan": "Henkan",
        "Muhenkan": "Muhenkan",
        "Normal": { "q": "た", "w": "て", "a": "ち", "z": "っ" },
        "Shift": { "q": "ぁ" }
    }"#;

    #[test]
    fn test_descriptor_reads_known_entries() {
        let desc = LayoutDescriptor::from_json(KANA_JSON).unwrap();
        assert_eq!(desc.kind, LayoutKind::Kana);
        assert_eq!(desc.space.as_deref(), Some("Alt_R"));
        assert!(desc.prefix);
        assert_eq!(desc.henkan, Some(NamedKey::Henkan));
        assert_eq!(desc.normal.get("q").map(String::as_str), Some("た"));
    }

    #[test]
    fn test_descriptor_skips_malformed_entries() {
        let desc =
            LayoutDescriptor::from_json(r#"{"Prefix": "yes", "Normal": {"q": 3, "w": "て"}}"#)
                .unwrap();
        assert!(!desc.prefix);
        assert_eq!(desc.normal.len(), 1);
        assert_eq!(desc.kind, LayoutKind::Romaji);
    }

    #[test]
    fn test_descriptor_rejects_non_object() {
        assert!(LayoutDescriptor::from_json("[1, 2]").is_err());
        assert!(LayoutDescriptor::from_json("not json").is_err());
    }

    #[test]
    fn test_kana_layout_remaps_and_excludes_small_kana() {
        let desc = LayoutDescriptor::from_json(KANA_JSON).unwrap();
        let layout = KeyboardLayout::from_descriptor(KeyboardModel::ansi_104(), &desc);
        assert_eq!(layout.kind, LayoutKind::Kana);
        assert_eq!(layout.model.rows[1][1].base, "た");
        assert_eq!(layout.model.rows[1][1].shifted, "ぁ");
        // っ and ぁ have keys of their own now
        assert!(!layout.small_kana.contains(&'っ'));
        assert!(!layout.small_kana.contains(&'ぁ'));
        assert!(layout.small_kana.contains(&'ゃ'));
        // prefix shift moves onto the space bar
        assert_eq!(layout.model.rows[4][3].base, "⇧");
        assert_eq!(layout.model.rows[3][0].base, "");
        // right alt became the space bar
        assert_eq!(layout.model.rows[4][4].base, "\u{3000}");
        assert!(layout.is_ignored(NamedKey::Space));
        assert!(layout.is_ignored(NamedKey::Henkan));
    }

    #[test]
    fn test_romaji_layout_lowercases_shifted_legends() {
        let desc = LayoutDescriptor::from_json(r#"{"Space": "Shift_R"}"#).unwrap();
        let layout = KeyboardLayout::from_descriptor(KeyboardModel::ansi_104(), &desc);
        assert!(layout.is_romaji());
        assert_eq!(layout.model.rows[1][1].shifted, "q");
        assert_eq!(layout.model.rows[3][11].base, " ");
        assert!(!layout.is_ignored(NamedKey::Space));
    }

    #[test]
    fn test_missing_file_falls_back_to_romaji() {
        let layout = KeyboardLayout::load_or_default("/nonexistent/kana.109.json");
        assert!(layout.is_romaji());
        assert_eq!(layout.model.name, "109");
        assert!(matches!(
            KeyboardLayout::load(Path::new("/nonexistent/x.json")),
            Err(EngineError::LayoutNotFound { .. })
        ));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("stickney.109.json");
        let mut file = fs::File::create(&path).unwrap();
        file.write_all(KANA_JSON.as_bytes()).unwrap();

        let layout = KeyboardLayout::load(&path).unwrap();
        assert_eq!(layout.kind, LayoutKind::Kana);
        assert_eq!(layout.model.name, "109");
    }
}
