use std::collections::HashMap;
use std::sync::OnceLock;

/// Kunrei-style romaji for every single mora and yōon digraph.
const KANA_TO_ROMAJI: &[(&str, &str)] = &[
    ("あ", "a"),
    ("い", "i"),
    ("う", "u"),
    ("え", "e"),
    ("お", "o"),
    ("か", "ka"),
    ("き", "ki"),
    ("きゃ", "kya"),
    ("きゅ", "kyu"),
    ("きょ", "kyo"),
    ("く", "ku"),
    ("け", "ke"),
    ("こ", "ko"),
    ("が", "ga"),
    ("ぎ", "gi"),
    ("ぎゃ", "gya"),
    ("ぎゅ", "gyu"),
    ("ぎょ", "gyo"),
    ("ぐ", "gu"),
    ("げ", "ge"),
    ("ご", "go"),
    ("さ", "sa"),
    ("し", "si"),
    ("しゃ", "sya"),
    ("しゅ", "syu"),
    ("しょ", "syo"),
    ("す", "su"),
    ("せ", "se"),
    ("そ", "so"),
    ("ざ", "za"),
    ("じ", "zi"),
    ("じゃ", "zya"),
    ("じゅ", "zyu"),
    ("じょ", "zyo"),
    ("ず", "zu"),
    ("ぜ", "ze"),
    ("ぞ", "zo"),
    ("た", "ta"),
    ("ち", "ti"),
    ("ちゃ", "tya"),
    ("ちゅ", "tyu"),
    ("ちょ", "tyo"),
    ("つ", "tu"),
    ("て", "te"),
    ("と", "to"),
    ("だ", "da"),
    ("ぢ", "di"),
    ("ぢゃ", "dya"),
    ("ぢゅ", "dyu"),
    ("ぢょ", "dyo"),
    ("づ", "du"),
    ("で", "de"),
    ("ど", "do"),
    ("な", "na"),
    ("に", "ni"),
    ("にゃ", "nya"),
    ("にゅ", "nyu"),
    ("にょ", "nyo"),
    ("ぬ", "nu"),
    ("ね", "ne"),
    ("の", "no"),
    ("は", "ha"),
    ("ひ", "hi"),
    ("ひゃ", "hya"),
    ("ひゅ", "hyu"),
    ("ひょ", "hyo"),
    ("ふ", "hu"),
    ("へ", "he"),
    ("ほ", "ho"),
    ("ば", "ba"),
    ("び", "bi"),
    ("びゃ", "bya"),
    ("びゅ", "byu"),
    ("びょ", "byo"),
    ("ぶ", "bu"),
    ("べ", "be"),
    ("ぼ", "bo"),
    ("ぱ", "pa"),
    ("ぴ", "pi"),
    ("ぴゃ", "pya"),
    ("ぴゅ", "pyu"),
    ("ぴょ", "pyo"),
    ("ぷ", "pu"),
    ("ぺ", "pe"),
    ("ぽ", "po"),
    ("ま", "ma"),
    ("み", "mi"),
    ("みゃ", "mya"),
    ("みゅ", "myu"),
    ("みょ", "myo"),
    ("む", "mu"),
    ("め", "me"),
    ("も", "mo"),
    ("や", "ya"),
    ("ゆ", "yu"),
    ("よ", "yo"),
    ("ら", "ra"),
    ("り", "ri"),
    ("りゃ", "rya"),
    ("りゅ", "ryu"),
    ("りょ", "ryo"),
    ("る", "ru"),
    ("れ", "re"),
    ("ろ", "ro"),
    ("わ", "wa"),
    ("を", "wo"),
    ("ん", "n"),
    ("ぁ", "xa"),
    ("ぃ", "xi"),
    ("ぅ", "xu"),
    ("ぇ", "xe"),
    ("ぉ", "xo"),
    ("っ", "xtu"),
    ("ゃ", "xya"),
    ("ゅ", "xyu"),
    ("ょ", "xyo"),
    ("ー", "-"),
    ("、", ","),
    ("。", "."),
    ("「", "["),
    ("」", "]"),
    ("『", "{"),
    ("』", "}"),
    ("・", "/"),
];

/// Leading consonant typed for a sokuon before each kana row.
/// Rows absent here (vowels, な-row, ん) keep the explicit `xtu`.
const GEMINATION_ROWS: &[(&str, char)] = &[
    ("かきくけこ", 'k'),
    ("がぎぐげご", 'g'),
    ("さしすせそ", 's'),
    ("ざじずぜぞ", 'z'),
    ("たちつてと", 't'),
    ("だぢづでど", 'd'),
    ("はひふへほ", 'h'),
    ("ばびぶべぼ", 'b'),
    ("ぱぴぷぺぽ", 'p'),
    ("まみむめも", 'm'),
    ("やゆよ", 'y'),
    ("らりるれろ", 'r'),
    ("わを", 'w'),
];

fn table() -> &'static HashMap<&'static str, &'static str> {
    static TABLE: OnceLock<HashMap<&'static str, &'static str>> = OnceLock::new();
    TABLE.get_or_init(|| KANA_TO_ROMAJI.iter().copied().collect())
}

/// Romaji for a one- or two-character kana key.
pub fn lookup(kana: &str) -> Option<&'static str> {
    table().get(kana).copied()
}

/// Every mora key in the table, in table order.
pub fn morae() -> impl Iterator<Item = &'static str> {
    KANA_TO_ROMAJI.iter().map(|(kana, _)| *kana)
}

/// The consonant a sokuon doubles when it precedes `next`.
pub fn gemination_consonant(next: char) -> Option<char> {
    GEMINATION_ROWS
        .iter()
        .find(|(row, _)| row.contains(next))
        .map(|(_, consonant)| *consonant)
}
