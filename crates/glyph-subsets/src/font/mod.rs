//! OpenType parsing logic.

use core::{fmt, ops};

use log::warn;

pub(crate) use self::{
    cmap::{CmapTable, SegmentDeltas, SegmentWithDelta, SegmentedCoverage, SequentialMapGroup},
    glyph::{
        Glyph, GlyphComponent, GlyphComponentArgs, GlyphWithMetrics, PathElement, Point,
        TransformData,
    },
};
pub use self::scaled::ScaledFont;
use crate::{
    alloc::{BTreeMap, String, Vec},
    errors::{ParseError, ParseErrorKind},
};

mod cmap;
mod glyph;
mod name;
mod scaled;

/// OpenType table tag.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TableTag(pub [u8; 4]);

impl fmt::Debug for TableTag {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, formatter)
    }
}

impl fmt::Display for TableTag {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        for &byte in &self.0 {
            fmt::Write::write_char(formatter, char::from(byte))?;
        }
        Ok(())
    }
}

impl TableTag {
    /// Character to glyph mapping.
    pub const CMAP: Self = Self(*b"cmap");
    /// Font header.
    pub const HEAD: Self = Self(*b"head");
    /// Horizontal header.
    pub const HHEA: Self = Self(*b"hhea");
    /// Horizontal metrics.
    pub const HMTX: Self = Self(*b"hmtx");
    /// Maximum profile.
    pub const MAXP: Self = Self(*b"maxp");
    /// Naming table.
    pub const NAME: Self = Self(*b"name");
    /// OS/2 and Windows specific metrics.
    pub const OS2: Self = Self(*b"OS/2");
    /// PostScript information.
    pub const POST: Self = Self(*b"post");
    /// Index to location.
    pub const LOCA: Self = Self(*b"loca");
    /// Glyph data.
    pub const GLYF: Self = Self(*b"glyf");
    /// Control value table.
    pub const CVT: Self = Self(*b"cvt ");
    /// Font program.
    pub const FPGM: Self = Self(*b"fpgm");
    /// Control value program.
    pub const PREP: Self = Self(*b"prep");
}

/// Byte cursor with position tracking for error reporting.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Cursor<'a> {
    pub(crate) bytes: &'a [u8],
    pub(crate) offset: usize,
}

impl<'a> Cursor<'a> {
    pub(crate) const fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, offset: 0 }
    }

    pub(crate) fn err(&self, kind: ParseErrorKind) -> ParseError {
        ParseError {
            kind,
            offset: self.offset,
            table: None,
        }
    }

    pub(crate) fn skip(&mut self, len: usize) -> Result<(), ParseError> {
        self.split_at(len).map(drop)
    }

    /// Splits off the first `len` bytes, advancing this cursor past them.
    pub(crate) fn split_at(&mut self, len: usize) -> Result<Self, ParseError> {
        if self.bytes.len() < len {
            return Err(self.err(ParseErrorKind::UnexpectedEof));
        }
        let (head, tail) = self.bytes.split_at(len);
        let head = Self {
            bytes: head,
            offset: self.offset,
        };
        self.bytes = tail;
        self.offset += len;
        Ok(head)
    }

    /// Returns a cursor over the specified range relative to the current position.
    pub(crate) fn range(&self, range: ops::Range<usize>) -> Result<Self, ParseError> {
        let Some(bytes) = self.bytes.get(range.clone()) else {
            let len = self.bytes.len();
            return Err(self.err(ParseErrorKind::RangeOutOfBounds { range, len }));
        };
        Ok(Self {
            bytes,
            offset: self.offset + range.start,
        })
    }

    pub(crate) fn read_byte_array<const N: usize>(&mut self) -> Result<[u8; N], ParseError> {
        let head = self.split_at(N)?;
        let mut array = [0; N];
        array.copy_from_slice(head.bytes);
        Ok(array)
    }

    pub(crate) fn read_u8(&mut self) -> Result<u8, ParseError> {
        let [byte] = self.read_byte_array()?;
        Ok(byte)
    }

    pub(crate) fn read_u16(&mut self) -> Result<u16, ParseError> {
        self.read_byte_array().map(u16::from_be_bytes)
    }

    pub(crate) fn read_i16(&mut self) -> Result<i16, ParseError> {
        self.read_byte_array().map(i16::from_be_bytes)
    }

    pub(crate) fn read_u32(&mut self) -> Result<u32, ParseError> {
        self.read_byte_array().map(u32::from_be_bytes)
    }

    pub(crate) fn read_u16_checked<T>(
        &mut self,
        check: impl FnOnce(u16) -> Result<T, ParseErrorKind>,
    ) -> Result<T, ParseError> {
        let offset = self.offset;
        let value = self.read_u16()?;
        check(value).map_err(|kind| ParseError {
            kind,
            offset,
            table: None,
        })
    }

    pub(crate) fn read_u32_checked<T>(
        &mut self,
        check: impl FnOnce(u32) -> Result<T, ParseErrorKind>,
    ) -> Result<T, ParseError> {
        let offset = self.offset;
        let value = self.read_u32()?;
        check(value).map_err(|kind| ParseError {
            kind,
            offset,
            table: None,
        })
    }
}

#[derive(Debug, Clone, Copy)]
pub(crate) struct HheaTable<'a> {
    pub(crate) raw: &'a [u8],
    pub(crate) ascender: i16,
    pub(crate) descender: i16,
    pub(crate) number_of_h_metrics: u16,
}

impl<'a> HheaTable<'a> {
    pub(crate) const EXPECTED_LEN: usize = 36; // 18 words as per spec

    fn parse(mut cursor: Cursor<'a>) -> Result<Self, ParseError> {
        if cursor.bytes.len() != Self::EXPECTED_LEN {
            return Err(cursor.err(ParseErrorKind::UnexpectedTableLen {
                expected: Self::EXPECTED_LEN,
                actual: cursor.bytes.len(),
            }));
        }
        let raw = cursor.bytes;
        cursor.skip(4)?; // version
        let ascender = cursor.read_i16()?;
        let descender = cursor.read_i16()?;
        cursor.skip(Self::EXPECTED_LEN - 10)?;
        let number_of_h_metrics = cursor.read_u16()?;
        Ok(Self {
            raw,
            ascender,
            descender,
            number_of_h_metrics,
        })
    }
}

#[derive(Debug)]
pub(crate) struct HmtxTable<'a> {
    raw: Cursor<'a>,
    number_of_h_metrics: u16,
}

impl HmtxTable<'_> {
    fn advance_and_lsb(&self, glyph_idx: u16) -> Result<(u16, u16), ParseError> {
        let (advance, lsb);
        if glyph_idx < self.number_of_h_metrics {
            let offset = usize::from(glyph_idx) * 4;
            let mut cursor = self.raw;
            cursor.skip(offset)?;
            advance = cursor.read_u16()?;
            lsb = cursor.read_u16()?;
        } else {
            let last_metric = self
                .number_of_h_metrics
                .checked_sub(1)
                .ok_or_else(|| self.raw.err(ParseErrorKind::UnexpectedEof))?;
            let mut cursor = self.raw;
            cursor.skip(usize::from(last_metric) * 4)?;
            advance = cursor.read_u16()?;

            let lsb_offset = usize::from(self.number_of_h_metrics) * 4
                + usize::from(glyph_idx - self.number_of_h_metrics) * 2;
            let mut cursor = self.raw;
            cursor.skip(lsb_offset)?;
            lsb = cursor.read_u16()?;
        }
        Ok((advance, lsb))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum LocaFormat {
    Short,
    Long,
}

impl LocaFormat {
    const fn bytes_per_offset(self) -> usize {
        match self {
            Self::Short => 2,
            Self::Long => 4,
        }
    }
}

#[derive(Debug)]
pub(crate) struct LocaTable<'a> {
    format: LocaFormat,
    cursor: Cursor<'a>,
}

impl<'a> LocaTable<'a> {
    fn new(format: LocaFormat, glyph_count: u16, cursor: Cursor<'a>) -> Result<Self, ParseError> {
        let expected_len = format.bytes_per_offset() * (usize::from(glyph_count) + 1);
        // Some fonts have excess bytes in `loca`; they are ignored.
        if cursor.bytes.len() < expected_len {
            Err(cursor.err(ParseErrorKind::UnexpectedTableLen {
                expected: expected_len,
                actual: cursor.bytes.len(),
            }))
        } else {
            Ok(Self { format, cursor })
        }
    }

    fn glyph_range(&self, glyph_idx: u16) -> Result<ops::Range<usize>, ParseError> {
        let glyph_idx = usize::from(glyph_idx);
        let mut cursor = self.cursor;
        Ok(match self.format {
            LocaFormat::Short => {
                cursor.skip(glyph_idx * 2)?;
                let start_offset = usize::from(cursor.read_u16()?) * 2;
                let end_offset = usize::from(cursor.read_u16()?) * 2;
                start_offset..end_offset
            }
            LocaFormat::Long => {
                cursor.skip(glyph_idx * 4)?;
                let start_offset = cursor.read_u32()? as usize;
                let end_offset = cursor.read_u32()? as usize;
                start_offset..end_offset
            }
        })
    }
}

/// OpenType font with TrueType outlines.
#[derive(Debug)]
pub struct Font<'a> {
    pub(crate) cmap: CmapTable<'a>,
    pub(crate) head: &'a [u8],
    pub(crate) hhea: HheaTable<'a>,
    pub(crate) hmtx: HmtxTable<'a>,
    pub(crate) maxp: &'a [u8],
    pub(crate) name: &'a [u8],
    pub(crate) os2: &'a [u8],
    pub(crate) post: &'a [u8],
    pub(crate) loca: LocaTable<'a>,
    pub(crate) glyf: Cursor<'a>,
    pub(crate) cvt: Option<&'a [u8]>,
    pub(crate) fpgm: Option<&'a [u8]>,
    pub(crate) prep: Option<&'a [u8]>,
    glyph_count: u16,
    units_per_em: u16,
    bbox: [i16; 4],
    ps_name: Option<String>,
    full_name: Option<String>,
    chars_by_glyph: BTreeMap<u16, char>,
}

impl<'a> Font<'a> {
    pub(crate) const SFNT_VERSION: u32 = 0x_0001_0000;
    pub(crate) const SFNT_CHECKSUM: u32 = 0x_b1b0_afba;
    pub(crate) const HEAD_CHECKSUM_OFFSET: usize = 8;

    /// Parses a font from the provided bytes.
    ///
    /// # Errors
    ///
    /// Returns an error if the font is malformed, or does not have TrueType outlines.
    pub fn new(bytes: &'a [u8]) -> Result<Self, ParseError> {
        let font_cursor = Cursor::new(bytes);
        let mut cursor = font_cursor;
        cursor.read_u32_checked(|version| {
            if version != Self::SFNT_VERSION {
                return Err(ParseErrorKind::UnexpectedFontVersion);
            }
            Ok(())
        })?;
        let table_count = cursor.read_u16()?;
        cursor.skip(6)?; // searchRange, entrySelector, rangeShift

        let (mut cmap, mut head, mut hhea, mut maxp, mut hmtx) = (None, None, None, None, None);
        let (mut name, mut os2, mut post, mut loca, mut glyf) = (None, None, None, None, None);
        let (mut cvt, mut fpgm, mut prep) = (None, None, None);
        for _ in 0..table_count {
            let (tag, table) = Self::parse_table_record(&mut cursor, font_cursor)?;
            match tag {
                TableTag::CMAP => cmap = Some(table),
                TableTag::HEAD => head = Some(table),
                TableTag::HHEA => hhea = Some(table),
                TableTag::HMTX => hmtx = Some(table),
                TableTag::MAXP => maxp = Some(table),
                TableTag::NAME => name = Some(table),
                TableTag::OS2 => os2 = Some(table),
                TableTag::POST => post = Some(table),
                TableTag::LOCA => loca = Some(table),
                TableTag::GLYF => glyf = Some(table),
                TableTag::CVT => cvt = Some(table.bytes),
                TableTag::FPGM => fpgm = Some(table.bytes),
                TableTag::PREP => prep = Some(table.bytes),
                _ => { /* skip table */ }
            }
        }

        let head = head.ok_or_else(|| ParseError::missing_table(TableTag::HEAD))?;
        let header = Self::parse_head(head).map_err(|err| err.with_table(TableTag::HEAD))?;
        let maxp = maxp.ok_or_else(|| ParseError::missing_table(TableTag::MAXP))?;
        let glyph_count =
            Self::parse_glyph_count(maxp).map_err(|err| err.with_table(TableTag::MAXP))?;
        let loca = loca.ok_or_else(|| ParseError::missing_table(TableTag::LOCA))?;
        let loca = LocaTable::new(header.loca_format, glyph_count, loca)
            .map_err(|err| err.with_table(TableTag::LOCA))?;
        let hhea = hhea.ok_or_else(|| ParseError::missing_table(TableTag::HHEA))?;
        let hhea = HheaTable::parse(hhea).map_err(|err| err.with_table(TableTag::HHEA))?;
        let hmtx = HmtxTable {
            raw: hmtx.ok_or_else(|| ParseError::missing_table(TableTag::HMTX))?,
            number_of_h_metrics: hhea.number_of_h_metrics,
        };
        let cmap = cmap.ok_or_else(|| ParseError::missing_table(TableTag::CMAP))?;
        let cmap = CmapTable::parse(cmap).map_err(|err| err.with_table(TableTag::CMAP))?;
        let chars_by_glyph = cmap.chars_by_glyph(glyph_count);
        let name = name.ok_or_else(|| ParseError::missing_table(TableTag::NAME))?;
        let names = name::NameTable::parse(name).map_err(|err| err.with_table(TableTag::NAME))?;

        Ok(Self {
            cmap,
            head: head.bytes,
            hhea,
            hmtx,
            maxp: maxp.bytes,
            name: name.bytes,
            os2: os2
                .ok_or_else(|| ParseError::missing_table(TableTag::OS2))?
                .bytes,
            post: post
                .ok_or_else(|| ParseError::missing_table(TableTag::POST))?
                .bytes,
            loca,
            glyf: glyf.ok_or_else(|| ParseError::missing_table(TableTag::GLYF))?,
            cvt,
            fpgm,
            prep,
            glyph_count,
            units_per_em: header.units_per_em,
            bbox: header.bbox,
            ps_name: names.ps_name,
            full_name: names.full_name,
            chars_by_glyph,
        })
    }

    fn parse_table_record(
        header: &mut Cursor<'_>,
        font: Cursor<'a>,
    ) -> Result<(TableTag, Cursor<'a>), ParseError> {
        let tag = TableTag(header.read_byte_array()?);
        header.skip(4)?; // checksum
        let offset = header.read_u32()? as usize;
        let len = header.read_u32()? as usize;
        let table = font
            .range(offset..offset.saturating_add(len))
            .map_err(|err| err.with_table(tag))?;
        Ok((tag, table))
    }

    fn parse_head(mut cursor: Cursor<'_>) -> Result<FontHeader, ParseError> {
        cursor.read_u32_checked(|version| {
            if version != 0x_0001_0000 {
                return Err(ParseErrorKind::UnexpectedTableVersion { version });
            }
            Ok(())
        })?;
        cursor.skip(14)?; // fontRevision, checksumAdjustment, magicNumber, flags
        let units_per_em = cursor.read_u16_checked(|units_per_em| {
            if units_per_em == 0 {
                return Err(ParseErrorKind::UnexpectedUnitsPerEm(units_per_em));
            }
            Ok(units_per_em)
        })?;
        cursor.skip(16)?; // created, modified
        let bbox = [
            cursor.read_i16()?,
            cursor.read_i16()?,
            cursor.read_i16()?,
            cursor.read_i16()?,
        ];
        cursor.skip(6)?; // macStyle, lowestRecPPEM, fontDirectionHint

        let loca_format = cursor.read_u16_checked(|raw_format| match raw_format {
            0 => Ok(LocaFormat::Short),
            1 => Ok(LocaFormat::Long),
            _ => Err(ParseErrorKind::UnexpectedLocaFormat(raw_format)),
        })?;
        Ok(FontHeader {
            units_per_em,
            bbox,
            loca_format,
        })
    }

    fn parse_glyph_count(mut cursor: Cursor<'_>) -> Result<u16, ParseError> {
        cursor.read_u32_checked(|version| {
            if version != 0x_0000_5000 && version != 0x_0001_0000 {
                return Err(ParseErrorKind::UnexpectedTableVersion { version });
            }
            Ok(())
        })?;
        cursor.read_u16()
    }

    /// Computes the OpenType checksum of the provided data, padding it with zeros if necessary.
    pub(crate) fn checksum(data: &[u8]) -> u32 {
        let mut chunks = data.chunks_exact(4);
        let mut checksum = chunks.by_ref().fold(0_u32, |acc, chunk| {
            acc.wrapping_add(u32::from_be_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
        });
        let remainder = chunks.remainder();
        if !remainder.is_empty() {
            let mut last_word = [0_u8; 4];
            last_word[..remainder.len()].copy_from_slice(remainder);
            checksum = checksum.wrapping_add(u32::from_be_bytes(last_word));
        }
        checksum
    }

    /// Returns the number of glyphs in the font.
    pub fn glyph_count(&self) -> u16 {
        self.glyph_count
    }

    /// Returns the number of font units per em.
    pub fn units_per_em(&self) -> u16 {
        self.units_per_em
    }

    /// Returns the font bounding box `[x_min, y_min, x_max, y_max]` in font units.
    pub fn bbox(&self) -> [i16; 4] {
        self.bbox
    }

    /// Returns the typographic ascent from the `hhea` table in font units.
    pub fn ascent(&self) -> i16 {
        self.hhea.ascender
    }

    /// Returns the typographic descent from the `hhea` table in font units. Usually negative.
    pub fn descent(&self) -> i16 {
        self.hhea.descender
    }

    /// Returns the PostScript name of the font (name ID 6), with chars disallowed
    /// in PostScript names removed.
    pub fn ps_name(&self) -> Option<&str> {
        self.ps_name.as_deref()
    }

    /// Returns the full name of the font (name ID 4).
    pub fn full_name(&self) -> Option<&str> {
        self.full_name.as_deref()
    }

    /// Maps a char to a glyph index. Returns 0 (the missing glyph) for unmapped chars.
    ///
    /// # Errors
    ///
    /// Returns an error if the `cmap` table is malformed.
    pub fn map_char(&self, ch: char) -> Result<u16, ParseError> {
        self.cmap
            .map_char(ch)
            .map_err(|err| err.with_table(TableTag::CMAP))
    }

    /// Returns the smallest char mapped to the glyph by the `cmap` table.
    pub fn glyph_char(&self, glyph: u32) -> Option<char> {
        let glyph = u16::try_from(glyph).ok()?;
        self.chars_by_glyph.get(&glyph).copied()
    }

    pub(crate) fn check_glyph(&self, glyph: u32) -> Result<u16, ParseError> {
        match u16::try_from(glyph) {
            Ok(idx) if idx < self.glyph_count => Ok(idx),
            _ => Err(ParseError::new(ParseErrorKind::GlyphOutOfRange {
                glyph,
                glyph_count: self.glyph_count,
            })),
        }
    }

    /// Returns the advance width and left side bearing of the glyph in font units.
    #[allow(clippy::cast_possible_wrap)] // `lsb` is an `i16` stored as `u16`
    pub(crate) fn h_metrics(&self, glyph: u32) -> Result<(u16, i16), ParseError> {
        let glyph_idx = self.check_glyph(glyph)?;
        let (advance, lsb) = self
            .hmtx
            .advance_and_lsb(glyph_idx)
            .map_err(|err| err.with_table(TableTag::HMTX))?;
        Ok((advance, lsb as i16))
    }

    pub(crate) fn glyph(&self, glyph: u32) -> Result<GlyphWithMetrics<'a>, ParseError> {
        let glyph_idx = self.check_glyph(glyph)?;
        let range = self
            .loca
            .glyph_range(glyph_idx)
            .map_err(|err| err.with_table(TableTag::LOCA))?;
        let raw = self
            .glyf
            .range(range)
            .map_err(|err| err.with_table(TableTag::GLYF))?;
        let inner = Glyph::new(raw).map_err(|err| err.with_table(TableTag::GLYF))?;
        let (advance, lsb) = self
            .hmtx
            .advance_and_lsb(glyph_idx)
            .map_err(|err| err.with_table(TableTag::HMTX))?;
        Ok(GlyphWithMetrics {
            inner,
            advance,
            lsb,
        })
    }

    /// Returns the outline of the glyph in font units, with quadratic curves converted to cubic ones.
    pub(crate) fn outline(&self, glyph: u32) -> Result<Vec<PathElement>, ParseError> {
        let mut path = Vec::new();
        self.append_outline(glyph, glyph::Transform::IDENTITY, 0, &mut path)?;
        Ok(path)
    }

    fn append_outline(
        &self,
        glyph: u32,
        transform: glyph::Transform,
        depth: usize,
        path: &mut Vec<PathElement>,
    ) -> Result<(), ParseError> {
        const MAX_COMPOSITE_DEPTH: usize = 8;

        if depth > MAX_COMPOSITE_DEPTH {
            return Err(ParseError::new(ParseErrorKind::CompositeTooDeep).with_table(TableTag::GLYF));
        }
        match self.glyph(glyph)?.inner {
            Glyph::Empty => {}
            Glyph::Simple(raw) => {
                glyph::append_simple_outline(raw, transform, path)
                    .map_err(|err| err.with_table(TableTag::GLYF))?;
            }
            Glyph::Composite { components, .. } => {
                for component in &components {
                    let component_transform = component.transform().unwrap_or_else(|| {
                        warn!(
                            "glyph {glyph}: component {} is positioned by point matching; using zero offset",
                            component.glyph_idx
                        );
                        component.transform_without_offset()
                    });
                    let transform = transform.compose(component_transform);
                    self.append_outline(component.glyph_idx.into(), transform, depth + 1, path)?;
                }
            }
        }
        Ok(())
    }
}

#[derive(Debug)]
struct FontHeader {
    units_per_em: u16,
    bbox: [i16; 4],
    loca_format: LocaFormat,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_tag_display() {
        assert_eq!(TableTag::OS2.to_string(), "OS/2");
        assert_eq!(format!("{:?}", TableTag::CVT), "cvt ");
    }

    #[test]
    fn checksum_pads_data() {
        assert_eq!(Font::checksum(&[]), 0);
        assert_eq!(Font::checksum(&[0, 0, 0, 1, 0, 0, 0, 2]), 3);
        assert_eq!(Font::checksum(&[1]), 0x_0100_0000);
        assert_eq!(
            Font::checksum(&[0xff, 0xff, 0xff, 0xff, 0, 0, 0, 2]),
            1,
            "checksum must wrap"
        );
    }

    #[test]
    fn cursor_errors_record_offsets() {
        let mut cursor = Cursor::new(&[0, 1, 2, 3, 4]);
        assert_eq!(cursor.read_u16().unwrap(), 1);
        let err = cursor.read_u32().unwrap_err();
        assert!(matches!(err.kind(), ParseErrorKind::UnexpectedEof));
        assert_eq!(err.offset(), 2);

        let err = cursor.range(1..10).unwrap_err();
        assert!(matches!(
            err.kind(),
            ParseErrorKind::RangeOutOfBounds { len: 3, .. }
        ));
        let sub = cursor.range(1..3).unwrap();
        assert_eq!(sub.offset, 3);
        assert_eq!(sub.bytes, [3, 4]);
    }
}
