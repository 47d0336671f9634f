//! CFF output with Type 2 charstrings.
//!
//! The generated font contains a single non-CID font with a custom charset naming each glyph.
//! Widths are encoded in charstrings relative to a zero `nominalWidthX`.

use core::iter;

use super::{round_to_i32, CharstringOutline, Segment, SubsetSource};
use crate::{
    alloc::{vec, BTreeMap, Vec},
    errors::GenerateError,
};

/// Limits the number of custom strings so that all SIDs fit into `u16`.
const MAX_GLYPHS: usize = 65_000;

mod ops {
    pub(super) const FONT_BBOX: u8 = 5;
    pub(super) const CHARSET: u8 = 15;
    pub(super) const CHAR_STRINGS: u8 = 17;
    pub(super) const PRIVATE: u8 = 18;
    pub(super) const DEFAULT_WIDTH_X: u8 = 20;
    pub(super) const NOMINAL_WIDTH_X: u8 = 21;

    pub(super) const RLINETO: u8 = 5;
    pub(super) const RRCURVETO: u8 = 8;
    pub(super) const ENDCHAR: u8 = 14;
    pub(super) const RMOVETO: u8 = 21;
}

pub(super) fn write(source: &SubsetSource<'_>) -> Result<Vec<u8>, GenerateError> {
    const HEADER: [u8; 4] = [1, 0, 4, 4]; // major, minor, hdrSize, offSize

    let glyph_count = source.glyphs.len();
    if glyph_count > MAX_GLYPHS {
        return Err(GenerateError::TooManyGlyphs {
            count: glyph_count,
            max: MAX_GLYPHS,
        });
    }

    let mut charstrings = Vec::with_capacity(glyph_count);
    for i in 0..glyph_count {
        let outline = source.charstring_outline(i)?;
        charstrings.push(encode_charstring(&outline));
    }

    let mut strings = StringTable::default();
    let mut charset = vec![0]; // format 0
    for name in source.names.iter().skip(1) {
        let sid = strings.sid(name);
        charset.extend_from_slice(&sid.to_be_bytes());
    }

    let font = source.font;
    let scale = 1000.0 / f64::from(font.units_per_em());
    let bbox = font
        .bbox()
        .map(|value| round_to_i32(f64::from(value) * scale));
    let font_name = source.font_name();

    let mut name_index = vec![];
    write_index(&[font_name.as_bytes()], &mut name_index);
    let custom_strings: Vec<_> = strings.custom.iter().map(|s| s.as_bytes()).collect();
    let mut string_index = vec![];
    write_index(&custom_strings, &mut string_index);
    let mut global_subr_index = vec![];
    write_index(&[], &mut global_subr_index);
    let charstring_refs: Vec<_> = charstrings.iter().map(Vec::as_slice).collect();
    let mut charstrings_index = vec![];
    write_index(&charstring_refs, &mut charstrings_index);
    let private_dict = private_dict();

    // Offsets in the top DICT are always encoded with 5 bytes, so its length doesn't depend on them.
    let top_dict_len = top_dict(bbox, TopDictOffsets::default()).len();
    let top_dict_index_len = index_len(&[top_dict_len]);
    let charset_offset = HEADER.len()
        + name_index.len()
        + top_dict_index_len
        + string_index.len()
        + global_subr_index.len();
    let charstrings_offset = charset_offset + charset.len();
    let private_offset = charstrings_offset + charstrings_index.len();
    let offsets = TopDictOffsets {
        charset: charset_offset,
        charstrings: charstrings_offset,
        private_len: private_dict.len(),
        private: private_offset,
    };
    let top_dict = top_dict(bbox, offsets);
    debug_assert_eq!(top_dict.len(), top_dict_len);

    let mut buffer = Vec::with_capacity(private_offset + private_dict.len());
    buffer.extend_from_slice(&HEADER);
    buffer.extend_from_slice(&name_index);
    write_index(&[&top_dict], &mut buffer);
    buffer.extend_from_slice(&string_index);
    buffer.extend_from_slice(&global_subr_index);
    debug_assert_eq!(buffer.len(), charset_offset);
    buffer.extend_from_slice(&charset);
    buffer.extend_from_slice(&charstrings_index);
    debug_assert_eq!(buffer.len(), private_offset);
    buffer.extend_from_slice(&private_dict);
    Ok(buffer)
}

/// Custom strings (i.e., ones not in the standard string set) used in the font.
#[derive(Debug, Default)]
struct StringTable<'a> {
    custom: Vec<&'a str>,
    sids: BTreeMap<&'a str, u16>,
}

impl<'a> StringTable<'a> {
    #[allow(clippy::cast_possible_truncation)] // bounded by `MAX_GLYPHS`
    fn sid(&mut self, name: &'a str) -> u16 {
        if let Some(sid) = STANDARD_STRINGS.iter().position(|&s| s == name) {
            return sid as u16;
        }
        if let Some(&sid) = self.sids.get(name) {
            return sid;
        }
        let sid = (STANDARD_STRINGS.len() + self.custom.len()) as u16;
        self.custom.push(name);
        self.sids.insert(name, sid);
        sid
    }
}

#[derive(Debug, Default, Clone, Copy)]
struct TopDictOffsets {
    charset: usize,
    charstrings: usize,
    private_len: usize,
    private: usize,
}

fn top_dict(bbox: [i32; 4], offsets: TopDictOffsets) -> Vec<u8> {
    let mut dict = vec![];
    for value in bbox {
        write_dict_integer(&mut dict, value);
    }
    dict.push(ops::FONT_BBOX);
    write_dict_offset(&mut dict, offsets.charset);
    dict.push(ops::CHARSET);
    write_dict_offset(&mut dict, offsets.charstrings);
    dict.push(ops::CHAR_STRINGS);
    write_dict_offset(&mut dict, offsets.private_len);
    write_dict_offset(&mut dict, offsets.private);
    dict.push(ops::PRIVATE);
    dict
}

fn private_dict() -> Vec<u8> {
    let mut dict = vec![];
    write_dict_integer(&mut dict, 0);
    dict.push(ops::DEFAULT_WIDTH_X);
    write_dict_integer(&mut dict, 0);
    dict.push(ops::NOMINAL_WIDTH_X);
    dict
}

fn encode_charstring(outline: &CharstringOutline) -> Vec<u8> {
    let mut charstring = Vec::new();
    // The width must precede the first stack-clearing operator. It's omitted if it equals
    // `defaultWidthX`; otherwise, it's encoded relative to `nominalWidthX`.
    if outline.width != 0 {
        write_charstring_number(&mut charstring, outline.width);
    }

    for segment in outline.relative_segments() {
        match segment {
            Segment::MoveTo([dx, dy]) => {
                write_charstring_number(&mut charstring, dx);
                write_charstring_number(&mut charstring, dy);
                charstring.push(ops::RMOVETO);
            }
            Segment::LineTo([dx, dy]) => {
                write_charstring_number(&mut charstring, dx);
                write_charstring_number(&mut charstring, dy);
                charstring.push(ops::RLINETO);
            }
            Segment::CurveTo(c1, c2, end) => {
                for value in c1.into_iter().chain(c2).chain(end) {
                    write_charstring_number(&mut charstring, value);
                }
                charstring.push(ops::RRCURVETO);
            }
            // Contours are closed implicitly.
            Segment::Close => {}
        }
    }
    charstring.push(ops::ENDCHAR);
    charstring
}

/// Writes a number in one of the compact encodings shared by DICTs and Type 2 charstrings.
/// Returns `false` if the number doesn't fit.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)] // ranges are checked
fn write_compact_number(buffer: &mut Vec<u8>, value: i32) -> bool {
    match value {
        -107..=107 => buffer.push((value + 139) as u8),
        108..=1131 => {
            let value = value - 108;
            buffer.extend_from_slice(&[((value >> 8) + 247) as u8, value as u8]);
        }
        -1131..=-108 => {
            let value = -value - 108;
            buffer.extend_from_slice(&[((value >> 8) + 251) as u8, value as u8]);
        }
        _ => {
            if let Ok(value) = i16::try_from(value) {
                buffer.push(28);
                buffer.extend_from_slice(&value.to_be_bytes());
            } else {
                return false;
            }
        }
    }
    true
}

fn write_dict_integer(buffer: &mut Vec<u8>, value: i32) {
    if !write_compact_number(buffer, value) {
        buffer.push(29);
        buffer.extend_from_slice(&value.to_be_bytes());
    }
}

/// Writes an offset or a length in the fixed-size 5-byte form.
fn write_dict_offset(buffer: &mut Vec<u8>, value: usize) {
    let value = i32::try_from(value).expect("CFF offset overflow");
    buffer.push(29);
    buffer.extend_from_slice(&value.to_be_bytes());
}

fn write_charstring_number(buffer: &mut Vec<u8>, value: i32) {
    // Larger values would need the 16.16 fixed form, which cannot hold them either.
    let clamped = value.clamp(i16::MIN.into(), i16::MAX.into());
    let is_written = write_compact_number(buffer, clamped);
    debug_assert!(is_written);
}

/// Returns the number of bytes required to encode `max_offset`.
#[allow(clippy::cast_possible_truncation)] // the value is in 1..=4
fn offset_size(max_offset: usize) -> u8 {
    let significant_bits = usize::BITS - max_offset.leading_zeros();
    significant_bits.div_ceil(8).max(1) as u8
}

fn index_len(item_lens: &[usize]) -> usize {
    if item_lens.is_empty() {
        return 2;
    }
    let data_len: usize = item_lens.iter().sum();
    let off_size = usize::from(offset_size(data_len + 1));
    2 + 1 + off_size * (item_lens.len() + 1) + data_len
}

fn write_index(items: &[&[u8]], buffer: &mut Vec<u8>) {
    let count = u16::try_from(items.len()).expect("INDEX count overflow");
    buffer.extend_from_slice(&count.to_be_bytes());
    if items.is_empty() {
        return;
    }

    let data_len: usize = items.iter().map(|item| item.len()).sum();
    let off_size = offset_size(data_len + 1);
    buffer.push(off_size);
    // Offsets are 1-based.
    let mut offset = 1_usize;
    for item_len in iter::once(0).chain(items.iter().map(|item| item.len())) {
        offset += item_len;
        let bytes = offset.to_be_bytes();
        buffer.extend_from_slice(&bytes[bytes.len() - usize::from(off_size)..]);
    }
    for item in items {
        buffer.extend_from_slice(item);
    }
}

const STANDARD_STRINGS: [&str; 391] = [
    ".notdef", "space", "exclam", "quotedbl", "numbersign", "dollar", "percent", "ampersand",
    "quoteright", "parenleft", "parenright", "asterisk", "plus", "comma", "hyphen", "period",
    "slash", "zero", "one", "two", "three", "four", "five", "six", "seven", "eight", "nine",
    "colon", "semicolon", "less", "equal", "greater", "question", "at", "A", "B", "C", "D", "E",
    "F", "G", "H", "I", "J", "K", "L", "M", "N", "O", "P", "Q", "R", "S", "T", "U", "V", "W", "X",
    "Y", "Z", "bracketleft", "backslash", "bracketright", "asciicircum", "underscore", "quoteleft",
    "a", "b", "c", "d", "e", "f", "g", "h", "i", "j", "k", "l", "m", "n", "o", "p", "q", "r", "s",
    "t", "u", "v", "w", "x", "y", "z", "braceleft", "bar", "braceright", "asciitilde",
    "exclamdown", "cent", "sterling", "fraction", "yen", "florin", "section", "currency",
    "quotesingle", "quotedblleft", "guillemotleft", "guilsinglleft", "guilsinglright", "fi", "fl",
    "endash", "dagger", "daggerdbl", "periodcentered", "paragraph", "bullet", "quotesinglbase",
    "quotedblbase", "quotedblright", "guillemotright", "ellipsis", "perthousand", "questiondown",
    "grave", "acute", "circumflex", "tilde", "macron", "breve", "dotaccent", "dieresis", "ring",
    "cedilla", "hungarumlaut", "ogonek", "caron", "emdash", "AE", "ordfeminine", "Lslash",
    "Oslash", "OE", "ordmasculine", "ae", "dotlessi", "lslash", "oslash", "oe", "germandbls",
    "onesuperior", "logicalnot", "mu", "trademark", "Eth", "onehalf", "plusminus", "Thorn",
    "onequarter", "divide", "brokenbar", "degree", "thorn", "threequarters", "twosuperior",
    "registered", "minus", "eth", "multiply", "threesuperior", "copyright", "Aacute",
    "Acircumflex", "Adieresis", "Agrave", "Aring", "Atilde", "Ccedilla", "Eacute", "Ecircumflex",
    "Edieresis", "Egrave", "Iacute", "Icircumflex", "Idieresis", "Igrave", "Ntilde", "Oacute",
    "Ocircumflex", "Odieresis", "Ograve", "Otilde", "Scaron", "Uacute", "Ucircumflex", "Udieresis",
    "Ugrave", "Yacute", "Ydieresis", "Zcaron", "aacute", "acircumflex", "adieresis", "agrave",
    "aring", "atilde", "ccedilla", "eacute", "ecircumflex", "edieresis", "egrave", "iacute",
    "icircumflex", "idieresis", "igrave", "ntilde", "oacute", "ocircumflex", "odieresis", "ograve",
    "otilde", "scaron", "uacute", "ucircumflex", "udieresis", "ugrave", "yacute", "ydieresis",
    "zcaron", "exclamsmall", "Hungarumlautsmall", "dollaroldstyle", "dollarsuperior",
    "ampersandsmall", "Acutesmall", "parenleftsuperior", "parenrightsuperior", "twodotenleader",
    "onedotenleader", "zerooldstyle", "oneoldstyle", "twooldstyle", "threeoldstyle",
    "fouroldstyle", "fiveoldstyle", "sixoldstyle", "sevenoldstyle", "eightoldstyle",
    "nineoldstyle", "commasuperior", "threequartersemdash", "periodsuperior", "questionsmall",
    "asuperior", "bsuperior", "centsuperior", "dsuperior", "esuperior", "isuperior", "lsuperior",
    "msuperior", "nsuperior", "osuperior", "rsuperior", "ssuperior", "tsuperior", "ff", "ffi",
    "ffl", "parenleftinferior", "parenrightinferior", "Circumflexsmall", "hyphensuperior",
    "Gravesmall", "Asmall", "Bsmall", "Csmall", "Dsmall", "Esmall", "Fsmall", "Gsmall", "Hsmall",
    "Ismall", "Jsmall", "Ksmall", "Lsmall", "Msmall", "Nsmall", "Osmall", "Psmall", "Qsmall",
    "Rsmall", "Ssmall", "Tsmall", "Usmall", "Vsmall", "Wsmall", "Xsmall", "Ysmall", "Zsmall",
    "colonmonetary", "onefitted", "rupiah", "Tildesmall", "exclamdownsmall", "centoldstyle",
    "Lslashsmall", "Scaronsmall", "Zcaronsmall", "Dieresissmall", "Brevesmall", "Caronsmall",
    "Dotaccentsmall", "Macronsmall", "figuredash", "hypheninferior", "Ogoneksmall", "Ringsmall",
    "Cedillasmall", "questiondownsmall", "oneeighth", "threeeighths", "fiveeighths",
    "seveneighths", "onethird", "twothirds", "zerosuperior", "foursuperior", "fivesuperior",
    "sixsuperior", "sevensuperior", "eightsuperior", "ninesuperior", "zeroinferior", "oneinferior",
    "twoinferior", "threeinferior", "fourinferior", "fiveinferior", "sixinferior", "seveninferior",
    "eightinferior", "nineinferior", "centinferior", "dollarinferior", "periodinferior",
    "commainferior", "Agravesmall", "Aacutesmall", "Acircumflexsmall", "Atildesmall",
    "Adieresissmall", "Aringsmall", "AEsmall", "Ccedillasmall", "Egravesmall", "Eacutesmall",
    "Ecircumflexsmall", "Edieresissmall", "Igravesmall", "Iacutesmall", "Icircumflexsmall",
    "Idieresissmall", "Ethsmall", "Ntildesmall", "Ogravesmall", "Oacutesmall", "Ocircumflexsmall",
    "Otildesmall", "Odieresissmall", "OEsmall", "Oslashsmall", "Ugravesmall", "Uacutesmall",
    "Ucircumflexsmall", "Udieresissmall", "Yacutesmall", "Thornsmall", "Ydieresissmall", "001.000",
    "001.001", "001.002", "001.003", "Black", "Bold", "Book", "Light", "Medium", "Regular",
    "Roman", "Semibold",
];
