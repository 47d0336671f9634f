//! Type 1 output with a built-in encoding.
//!
//! The font program consists of three parts: a cleartext header with the encoding, an
//! `eexec`-encrypted private dictionary with charstrings, and a trailer of zeros.

use super::{round_to_i32, CharstringOutline, EexecEncoding, Segment, SubsetSource, Type1Segments};
use crate::{
    alloc::{format, Vec},
    errors::GenerateError,
};

const MAX_GLYPHS: usize = 256;
const EEXEC_KEY: u16 = 55_665;
const CHARSTRING_KEY: u16 = 4_330;
const ENCRYPTION_C1: u16 = 52_845;
const ENCRYPTION_C2: u16 = 22_719;
/// Number of random bytes prepended to encrypted data.
const LEN_IV: usize = 4;
const HEX_LINE_LEN: usize = 64;

mod ops {
    pub(super) const CLOSEPATH: u8 = 9;
    pub(super) const HSBW: u8 = 13;
    pub(super) const ENDCHAR: u8 = 14;
    pub(super) const RLINETO: u8 = 5;
    pub(super) const RMOVETO: u8 = 21;
    pub(super) const RRCURVETO: u8 = 8;
}

pub(super) fn write(
    source: &SubsetSource<'_>,
    encoding: EexecEncoding,
) -> Result<(Vec<u8>, Type1Segments), GenerateError> {
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

    let mut data = cleartext(source);
    let cleartext_len = data.len();

    let private = private_dict(source, &charstrings);
    let mut encrypted = Vec::with_capacity(LEN_IV + private.len());
    encrypt(&[0; LEN_IV], &private, EEXEC_KEY, &mut encrypted);
    match encoding {
        EexecEncoding::Binary => data.extend_from_slice(&encrypted),
        EexecEncoding::Hex => write_hex(&encrypted, &mut data),
    }
    let encrypted_len = data.len() - cleartext_len;

    if encoding == EexecEncoding::Binary {
        data.push(b'\n');
    }
    for _ in 0..8 {
        data.extend_from_slice(&[b'0'; HEX_LINE_LEN]);
        data.push(b'\n');
    }
    data.extend_from_slice(b"cleartomark\n");
    let trailer_len = data.len() - cleartext_len - encrypted_len;

    let segments = Type1Segments {
        cleartext_len,
        encrypted_len,
        trailer_len,
    };
    Ok((data, segments))
}

fn cleartext(source: &SubsetSource<'_>) -> Vec<u8> {
    let font = source.font;
    let scale = 1000.0 / f64::from(font.units_per_em());
    let [x_min, y_min, x_max, y_max] = font
        .bbox()
        .map(|value| round_to_i32(f64::from(value) * scale));
    let font_name = source.font_name();

    let mut text = format!(
        "%!FontType1-1.1: {font_name} 001.000\n\
         11 dict begin\n\
         /FontName /{font_name} def\n\
         /FontType 1 def\n\
         /PaintType 0 def\n\
         /FontMatrix [0.001 0 0 0.001 0 0] readonly def\n\
         /FontBBox {{{x_min} {y_min} {x_max} {y_max}}} readonly def\n\
         /Encoding 256 array\n\
         0 1 255 {{1 index exch /.notdef put}} for\n"
    );
    for (code, name) in source.names.iter().enumerate().skip(1) {
        text.push_str(&format!("dup {code} /{name} put\n"));
    }
    text.push_str("readonly def\ncurrentdict end\ncurrentfile eexec\n");
    text.into_bytes()
}

fn private_dict(source: &SubsetSource<'_>, charstrings: &[Vec<u8>]) -> Vec<u8> {
    let mut dict = format!(
        "dup /Private 8 dict dup begin\n\
         /RD {{string currentfile exch readstring pop}} executeonly def\n\
         /ND {{noaccess def}} executeonly def\n\
         /NP {{noaccess put}} executeonly def\n\
         /BlueValues [] def\n\
         /MinFeature {{16 16}} def\n\
         /lenIV {LEN_IV} def\n\
         /password 5839 def\n\
         2 index /CharStrings {} dict dup begin\n",
        charstrings.len()
    )
    .into_bytes();

    for (name, charstring) in source.names.iter().zip(charstrings) {
        let mut encrypted = Vec::with_capacity(LEN_IV + charstring.len());
        encrypt(&[0; LEN_IV], charstring, CHARSTRING_KEY, &mut encrypted);
        dict.extend_from_slice(format!("/{name} {} RD ", encrypted.len()).as_bytes());
        dict.extend_from_slice(&encrypted);
        dict.extend_from_slice(b" ND\n");
    }

    dict.extend_from_slice(
        b"end\n\
          end\n\
          readonly put\n\
          noaccess put\n\
          dup /FontName get exch definefont pop\n\
          mark currentfile closefile\n",
    );
    dict
}

fn encode_charstring(outline: &CharstringOutline) -> Vec<u8> {
    let mut charstring = Vec::new();
    write_number(&mut charstring, 0);
    write_number(&mut charstring, outline.width);
    charstring.push(ops::HSBW);

    for segment in outline.relative_segments() {
        match segment {
            Segment::MoveTo([dx, dy]) => {
                write_number(&mut charstring, dx);
                write_number(&mut charstring, dy);
                charstring.push(ops::RMOVETO);
            }
            Segment::LineTo([dx, dy]) => {
                write_number(&mut charstring, dx);
                write_number(&mut charstring, dy);
                charstring.push(ops::RLINETO);
            }
            Segment::CurveTo(c1, c2, end) => {
                for value in c1.into_iter().chain(c2).chain(end) {
                    write_number(&mut charstring, value);
                }
                charstring.push(ops::RRCURVETO);
            }
            Segment::Close => charstring.push(ops::CLOSEPATH),
        }
    }
    charstring.push(ops::ENDCHAR);
    charstring
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)] // ranges are checked
fn write_number(buffer: &mut Vec<u8>, value: i32) {
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
            buffer.push(255);
            buffer.extend_from_slice(&value.to_be_bytes());
        }
    }
}

/// Encrypts `prefix` followed by `data` with the Type 1 encryption algorithm.
#[allow(clippy::cast_possible_truncation)] // intentional
fn encrypt(prefix: &[u8], data: &[u8], mut key: u16, output: &mut Vec<u8>) {
    for &plain in prefix.iter().chain(data) {
        let cipher = plain ^ (key >> 8) as u8;
        key = u16::from(cipher)
            .wrapping_add(key)
            .wrapping_mul(ENCRYPTION_C1)
            .wrapping_add(ENCRYPTION_C2);
        output.push(cipher);
    }
}

fn write_hex(data: &[u8], output: &mut Vec<u8>) {
    const HEX_DIGITS: &[u8; 16] = b"0123456789abcdef";

    for line in data.chunks(HEX_LINE_LEN / 2) {
        for &byte in line {
            output.push(HEX_DIGITS[usize::from(byte >> 4)]);
            output.push(HEX_DIGITS[usize::from(byte & 15)]);
        }
        output.push(b'\n');
    }
}
