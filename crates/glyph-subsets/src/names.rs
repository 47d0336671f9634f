//! Glyph naming for subsets.

use crate::alloc::{format, BTreeSet, String, ToString, Vec};

const NOTDEF: &str = ".notdef";

/// Adobe standard glyph names for Latin text, sorted by char. Names are unique.
const STANDARD_NAMES: &[(char, &str)] = &[
    (' ', "space"),
    ('!', "exclam"),
    ('"', "quotedbl"),
    ('#', "numbersign"),
    ('$', "dollar"),
    ('%', "percent"),
    ('&', "ampersand"),
    ('\'', "quotesingle"),
    ('(', "parenleft"),
    (')', "parenright"),
    ('*', "asterisk"),
    ('+', "plus"),
    (',', "comma"),
    ('-', "hyphen"),
    ('.', "period"),
    ('/', "slash"),
    ('0', "zero"),
    ('1', "one"),
    ('2', "two"),
    ('3', "three"),
    ('4', "four"),
    ('5', "five"),
    ('6', "six"),
    ('7', "seven"),
    ('8', "eight"),
    ('9', "nine"),
    (':', "colon"),
    (';', "semicolon"),
    ('<', "less"),
    ('=', "equal"),
    ('>', "greater"),
    ('?', "question"),
    ('@', "at"),
    ('A', "A"),
    ('B', "B"),
    ('C', "C"),
    ('D', "D"),
    ('E', "E"),
    ('F', "F"),
    ('G', "G"),
    ('H', "H"),
    ('I', "I"),
    ('J', "J"),
    ('K', "K"),
    ('L', "L"),
    ('M', "M"),
    ('N', "N"),
    ('O', "O"),
    ('P', "P"),
    ('Q', "Q"),
    ('R', "R"),
    ('S', "S"),
    ('T', "T"),
    ('U', "U"),
    ('V', "V"),
    ('W', "W"),
    ('X', "X"),
    ('Y', "Y"),
    ('Z', "Z"),
    ('[', "bracketleft"),
    ('\\', "backslash"),
    (']', "bracketright"),
    ('^', "asciicircum"),
    ('_', "underscore"),
    ('`', "grave"),
    ('a', "a"),
    ('b', "b"),
    ('c', "c"),
    ('d', "d"),
    ('e', "e"),
    ('f', "f"),
    ('g', "g"),
    ('h', "h"),
    ('i', "i"),
    ('j', "j"),
    ('k', "k"),
    ('l', "l"),
    ('m', "m"),
    ('n', "n"),
    ('o', "o"),
    ('p', "p"),
    ('q', "q"),
    ('r', "r"),
    ('s', "s"),
    ('t', "t"),
    ('u', "u"),
    ('v', "v"),
    ('w', "w"),
    ('x', "x"),
    ('y', "y"),
    ('z', "z"),
    ('{', "braceleft"),
    ('|', "bar"),
    ('}', "braceright"),
    ('~', "asciitilde"),
    ('\u{a1}', "exclamdown"),
    ('\u{a2}', "cent"),
    ('\u{a3}', "sterling"),
    ('\u{a4}', "currency"),
    ('\u{a5}', "yen"),
    ('\u{a6}', "brokenbar"),
    ('\u{a7}', "section"),
    ('\u{a8}', "dieresis"),
    ('\u{a9}', "copyright"),
    ('\u{aa}', "ordfeminine"),
    ('\u{ab}', "guillemotleft"),
    ('\u{ac}', "logicalnot"),
    ('\u{ae}', "registered"),
    ('\u{af}', "macron"),
    ('\u{b0}', "degree"),
    ('\u{b1}', "plusminus"),
    ('\u{b2}', "twosuperior"),
    ('\u{b3}', "threesuperior"),
    ('\u{b4}', "acute"),
    ('\u{b5}', "mu"),
    ('\u{b6}', "paragraph"),
    ('\u{b7}', "periodcentered"),
    ('\u{b8}', "cedilla"),
    ('\u{b9}', "onesuperior"),
    ('\u{ba}', "ordmasculine"),
    ('\u{bb}', "guillemotright"),
    ('\u{bc}', "onequarter"),
    ('\u{bd}', "onehalf"),
    ('\u{be}', "threequarters"),
    ('\u{bf}', "questiondown"),
    ('\u{c0}', "Agrave"),
    ('\u{c1}', "Aacute"),
    ('\u{c2}', "Acircumflex"),
    ('\u{c3}', "Atilde"),
    ('\u{c4}', "Adieresis"),
    ('\u{c5}', "Aring"),
    ('\u{c6}', "AE"),
    ('\u{c7}', "Ccedilla"),
    ('\u{c8}', "Egrave"),
    ('\u{c9}', "Eacute"),
    ('\u{ca}', "Ecircumflex"),
    ('\u{cb}', "Edieresis"),
    ('\u{cc}', "Igrave"),
    ('\u{cd}', "Iacute"),
    ('\u{ce}', "Icircumflex"),
    ('\u{cf}', "Idieresis"),
    ('\u{d0}', "Eth"),
    ('\u{d1}', "Ntilde"),
    ('\u{d2}', "Ograve"),
    ('\u{d3}', "Oacute"),
    ('\u{d4}', "Ocircumflex"),
    ('\u{d5}', "Otilde"),
    ('\u{d6}', "Odieresis"),
    ('\u{d7}', "multiply"),
    ('\u{d8}', "Oslash"),
    ('\u{d9}', "Ugrave"),
    ('\u{da}', "Uacute"),
    ('\u{db}', "Ucircumflex"),
    ('\u{dc}', "Udieresis"),
    ('\u{dd}', "Yacute"),
    ('\u{de}', "Thorn"),
    ('\u{df}', "germandbls"),
    ('\u{e0}', "agrave"),
    ('\u{e1}', "aacute"),
    ('\u{e2}', "acircumflex"),
    ('\u{e3}', "atilde"),
    ('\u{e4}', "adieresis"),
    ('\u{e5}', "aring"),
    ('\u{e6}', "ae"),
    ('\u{e7}', "ccedilla"),
    ('\u{e8}', "egrave"),
    ('\u{e9}', "eacute"),
    ('\u{ea}', "ecircumflex"),
    ('\u{eb}', "edieresis"),
    ('\u{ec}', "igrave"),
    ('\u{ed}', "iacute"),
    ('\u{ee}', "icircumflex"),
    ('\u{ef}', "idieresis"),
    ('\u{f0}', "eth"),
    ('\u{f1}', "ntilde"),
    ('\u{f2}', "ograve"),
    ('\u{f3}', "oacute"),
    ('\u{f4}', "ocircumflex"),
    ('\u{f5}', "otilde"),
    ('\u{f6}', "odieresis"),
    ('\u{f7}', "divide"),
    ('\u{f8}', "oslash"),
    ('\u{f9}', "ugrave"),
    ('\u{fa}', "uacute"),
    ('\u{fb}', "ucircumflex"),
    ('\u{fc}', "udieresis"),
    ('\u{fd}', "yacute"),
    ('\u{fe}', "thorn"),
    ('\u{ff}', "ydieresis"),
    ('\u{131}', "dotlessi"),
    ('\u{141}', "Lslash"),
    ('\u{142}', "lslash"),
    ('\u{152}', "OE"),
    ('\u{153}', "oe"),
    ('\u{160}', "Scaron"),
    ('\u{161}', "scaron"),
    ('\u{178}', "Ydieresis"),
    ('\u{17d}', "Zcaron"),
    ('\u{17e}', "zcaron"),
    ('\u{192}', "florin"),
    ('\u{2c6}', "circumflex"),
    ('\u{2c7}', "caron"),
    ('\u{2d8}', "breve"),
    ('\u{2d9}', "dotaccent"),
    ('\u{2da}', "ring"),
    ('\u{2db}', "ogonek"),
    ('\u{2dc}', "tilde"),
    ('\u{2dd}', "hungarumlaut"),
    ('\u{2013}', "endash"),
    ('\u{2014}', "emdash"),
    ('\u{2018}', "quoteleft"),
    ('\u{2019}', "quoteright"),
    ('\u{201a}', "quotesinglbase"),
    ('\u{201c}', "quotedblleft"),
    ('\u{201d}', "quotedblright"),
    ('\u{201e}', "quotedblbase"),
    ('\u{2020}', "dagger"),
    ('\u{2021}', "daggerdbl"),
    ('\u{2022}', "bullet"),
    ('\u{2026}', "ellipsis"),
    ('\u{2030}', "perthousand"),
    ('\u{2039}', "guilsinglleft"),
    ('\u{203a}', "guilsinglright"),
    ('\u{2044}', "fraction"),
    ('\u{20ac}', "Euro"),
    ('\u{2122}', "trademark"),
    ('\u{2212}', "minus"),
    ('\u{fb01}', "fi"),
    ('\u{fb02}', "fl"),
];

/// Returns the standard Adobe glyph name for the specified char, e.g. `"eacute"` for `'é'`.
///
/// Only Latin chars covered by standard 8-bit encodings (ASCII, Latin-1 and the extra
/// chars of the WinAnsi encoding) have standard names.
///
/// # Examples
///
/// ```
/// # use glyph_subsets::standard_glyph_name;
/// assert_eq!(standard_glyph_name('A'), Some("A"));
/// assert_eq!(standard_glyph_name(' '), Some("space"));
/// assert_eq!(standard_glyph_name('€'), Some("Euro"));
/// assert_eq!(standard_glyph_name('Ж'), None);
/// ```
pub fn standard_glyph_name(ch: char) -> Option<&'static str> {
    let idx = STANDARD_NAMES
        .binary_search_by_key(&ch, |&(ch, _)| ch)
        .ok()?;
    Some(STANDARD_NAMES[idx].1)
}

/// Returns the char if `text` consists of exactly one char.
pub(crate) fn single_char(text: &str) -> Option<char> {
    let mut chars = text.chars();
    let ch = chars.next()?;
    chars.next().is_none().then_some(ch)
}

fn char_name(ch: char) -> String {
    if let Some(name) = standard_glyph_name(ch) {
        name.to_string()
    } else if u32::from(ch) <= 0xffff {
        format!("uni{:04X}", u32::from(ch))
    } else {
        format!("u{:05X}", u32::from(ch))
    }
}

/// Names glyphs of a subset given the chars they represent. `chars[0]` is ignored; the 0th glyph
/// is always `.notdef`. Glyphs without a char, or with a char already named earlier in the subset,
/// get a synthetic name.
pub(crate) fn glyph_names(font_id: u32, subset_id: u32, chars: &[Option<char>]) -> Vec<String> {
    let mut named_chars = BTreeSet::new();
    chars
        .iter()
        .enumerate()
        .map(|(i, &ch)| match ch {
            _ if i == 0 => NOTDEF.to_string(),
            Some(ch) if named_chars.insert(ch) => char_name(ch),
            _ => format!("g{font_id}_{subset_id}_{i}"),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_names_are_sorted_and_unique() {
        for window in STANDARD_NAMES.windows(2) {
            assert!(window[0].0 < window[1].0, "{window:?}");
        }
        let names: BTreeSet<_> = STANDARD_NAMES.iter().map(|&(_, name)| name).collect();
        assert_eq!(names.len(), STANDARD_NAMES.len());
    }

    #[test]
    fn naming_chars() {
        assert_eq!(char_name('a'), "a");
        assert_eq!(char_name('0'), "zero");
        assert_eq!(char_name('\u{fb01}'), "fi");
        assert_eq!(char_name('Ж'), "uni0416");
        assert_eq!(char_name('\u{1f600}'), "u1F600");
    }

    #[test]
    fn single_char_detection() {
        assert_eq!(single_char("A"), Some('A'));
        assert_eq!(single_char("ﬁ"), Some('ﬁ'));
        assert_eq!(single_char("fi"), None);
        assert_eq!(single_char(""), None);
    }

    #[test]
    fn naming_subset_glyphs() {
        let chars = [Some('x'), Some('A'), None, Some('é'), Some('A'), Some('я')];
        let names = glyph_names(2, 1, &chars);
        assert_eq!(
            names,
            [".notdef", "A", "g2_1_2", "eacute", "g2_1_4", "uni044F"]
        );
    }
}
