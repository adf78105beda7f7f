//! ASCII punctuation to full-width glyph translation.
//!
//! While composing, plain punctuation keys produce the CJK full-width
//! glyphs instead of their ASCII characters. The table is fixed, so it is
//! a compile-time map rather than something built at startup.

use phf::phf_map;

static FULLWIDTH: phf::Map<char, &'static str> = phf_map! {
    '!' => "！",
    '"' => "“",
    '#' => "＃",
    '$' => "￥",
    '%' => "％",
    '&' => "＆",
    '\'' => "‘",
    '(' => "（",
    ')' => "）",
    '*' => "＊",
    '+' => "＋",
    ',' => "，",
    '-' => "－",
    '.' => "。",
    '/' => "／",
    ':' => "：",
    ';' => "；",
    '<' => "《",
    '=' => "＝",
    '>' => "》",
    '?' => "？",
    '@' => "＠",
    '[' => "「",
    '\\' => "、",
    ']' => "」",
    '^' => "……",
    '_' => "——",
    '`' => "｀",
    '{' => "『",
    '|' => "｜",
    '}' => "』",
    '~' => "～",
};

/// The full-width glyph for an ASCII punctuation character, if mapped.
pub fn localized(ch: char) -> Option<&'static str> {
    FULLWIDTH.get(&ch).copied()
}

/// Whether `ch` has a full-width translation.
pub fn is_mapped(ch: char) -> bool {
    FULLWIDTH.contains_key(&ch)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn common_marks() {
        assert_eq!(localized(','), Some("，"));
        assert_eq!(localized('.'), Some("。"));
        assert_eq!(localized('?'), Some("？"));
        assert_eq!(localized('\\'), Some("、"));
        assert_eq!(localized('$'), Some("￥"));
    }

    #[test]
    fn multi_char_glyphs() {
        assert_eq!(localized('^'), Some("……"));
        assert_eq!(localized('_'), Some("——"));
    }

    #[test]
    fn every_ascii_punctuation_is_mapped() {
        for ch in r##"!"#$%&'()*+,-./:;<=>?@[\]^_`{|}~"##.chars() {
            assert!(is_mapped(ch), "missing translation for {:?}", ch);
        }
    }

    #[test]
    fn letters_digits_and_space_are_not_mapped() {
        assert!(!is_mapped('a'));
        assert!(!is_mapped('Z'));
        assert!(!is_mapped('5'));
        assert!(!is_mapped(' '));
    }
}
