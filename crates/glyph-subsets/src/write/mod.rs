//! Generating embeddable font programs for subsets.
//!
//! All programs are produced from TrueType outlines of a [`Font`]. TrueType and WOFF2 output
//! keeps the original outlines and hinting; Type 1 and CFF output converts outlines to cubic
//! charstrings in a 1000-unit em.

use core::{fmt, iter};

use log::debug;

use crate::{
    alloc::{format, vec, String, Vec},
    errors::GenerateError,
    font::{Font, PathElement, Point, ScaledFont, TableTag},
    index::Subset,
    FontBackend, MetricSpace, ParseError,
};

mod brotli;
mod cff;
mod truetype;
mod type1;

pub(crate) fn write_u16(writer: &mut Vec<u8>, value: u16) {
    writer.extend_from_slice(&value.to_be_bytes());
}

pub(crate) fn write_u32(writer: &mut Vec<u8>, value: u32) {
    writer.extend_from_slice(&value.to_be_bytes());
}

fn uint_base128_len(val: u32) -> usize {
    if val == 0 {
        1
    } else {
        val.ilog2() as usize / 7 + 1
    }
}

#[allow(clippy::cast_possible_truncation)] // intentional
fn write_uint_base128(buffer: &mut Vec<u8>, val: u32) {
    if val >= 1 << 28 {
        buffer.push(0x80 | (val >> 28) as u8);
    }
    if val >= 1 << 21 {
        buffer.push(0x80 | (val >> 21) as u8);
    }
    if val >= 1 << 14 {
        buffer.push(0x80 | (val >> 14) as u8);
    }
    if val >= 1 << 7 {
        buffer.push(0x80 | (val >> 7) as u8);
    }
    buffer.push((val & 127) as u8);
}

/// Rounds to the nearest integer, with halves rounded away from zero.
#[allow(clippy::cast_possible_truncation)] // values are bounded by font coordinates
pub(crate) fn round_to_i32(value: f64) -> i32 {
    if value >= 0.0 {
        (value + 0.5) as i32
    } else {
        (value - 0.5) as i32
    }
}

/// Encoding of the encrypted (`eexec`) portion of a Type 1 font program.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EexecEncoding {
    /// Raw encrypted bytes. This is the form embedded into PDF files.
    Binary,
    /// Hex-encoded encrypted bytes, 64 hex digits per line.
    Hex,
}

/// Format of a generated font program.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum FontProgramKind {
    /// Type 1 font with a built-in encoding mapping code `i` to subset glyph `i`.
    /// Supports subsets with up to 256 glyphs.
    Type1 {
        /// Encoding of the encrypted portion.
        encoding: EexecEncoding,
    },
    /// Bare CFF font with Type 2 charstrings (as embedded with the `FontFile3` / `Type1C` subtype
    /// in PDF).
    Cff,
    /// OpenType font with TrueType outlines, in which glyph `i` is subset glyph `i`.
    TrueType,
    /// [`Self::TrueType`] packaged as a WOFF2 file.
    Woff2,
}

/// Lengths of the three parts of a Type 1 font program, as required by the `Length1`, `Length2`
/// and `Length3` entries of a PDF font stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Type1Segments {
    /// Length of the cleartext part, including the `currentfile eexec` line.
    pub cleartext_len: usize,
    /// Length of the encrypted part.
    pub encrypted_len: usize,
    /// Length of the trailer with zeros and `cleartomark`.
    pub trailer_len: usize,
}

/// Font program generated for a [`Subset`].
#[derive(Clone, PartialEq)]
pub struct FontProgram {
    /// Font name with a subset tag, e.g. `ABCDEF+TestSans-Regular`.
    pub font_name: String,
    /// PostScript name of the source font.
    pub ps_name: String,
    /// Advance widths of subset glyphs in em units, indexed by subset glyph index.
    pub widths: Vec<f64>,
    /// Font bounding box `[x_min, y_min, x_max, y_max]` in em units.
    pub bbox: [f64; 4],
    /// Ascent in em units.
    pub ascent: f64,
    /// Descent in em units (usually negative).
    pub descent: f64,
    /// Program data.
    pub data: Vec<u8>,
    /// Segment lengths; only present for Type 1 programs.
    pub type1_segments: Option<Type1Segments>,
}

impl fmt::Debug for FontProgram {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("FontProgram")
            .field("font_name", &self.font_name)
            .field("ps_name", &self.ps_name)
            .field("widths", &self.widths)
            .field("bbox", &self.bbox)
            .field("ascent", &self.ascent)
            .field("descent", &self.descent)
            .field("data.len", &self.data.len())
            .field("type1_segments", &self.type1_segments)
            .finish()
    }
}

impl FontProgramKind {
    /// Generates a font program for the specified subset.
    ///
    /// # Errors
    ///
    /// - Returns [`GenerateError::Unsupported`] for scaled subsets (including user-font subsets),
    ///   which have no outlines in font units.
    /// - Returns [`GenerateError::TooManyGlyphs`] if the subset doesn't fit into the format.
    /// - Returns [`GenerateError::Parse`] if reading glyph data from the source font fails.
    pub fn generate(
        &self,
        subset: &Subset<'_, '_, ScaledFont<'_>>,
    ) -> Result<FontProgram, GenerateError> {
        if subset.is_user() {
            return Err(GenerateError::Unsupported("user fonts have no font program"));
        }
        if subset.is_scaled() {
            return Err(GenerateError::Unsupported(
                "scaled subsets have no outlines in font units",
            ));
        }

        let source = SubsetSource::new(subset);
        let (data, type1_segments) = match *self {
            Self::Type1 { encoding } => {
                let (data, segments) = type1::write(&source, encoding)?;
                (data, Some(segments))
            }
            Self::Cff => (cff::write(&source)?, None),
            Self::TrueType => (truetype::write(&source)?.into_opentype(), None),
            Self::Woff2 => (truetype::write(&source)?.into_woff2(), None),
        };
        debug!(
            "generated {self:?} program for subset {}/{}: {} glyphs, {} bytes",
            source.font_id,
            source.subset_id,
            source.glyphs.len(),
            data.len()
        );

        let font = source.font;
        let units_per_em = f64::from(font.units_per_em());
        let widths = (0..source.glyphs.len())
            .map(|i| source.width(subset, i))
            .collect::<Result<_, _>>()?;
        let [x_min, y_min, x_max, y_max] = font.bbox().map(|value| f64::from(value) / units_per_em);
        Ok(FontProgram {
            font_name: source.font_name(),
            ps_name: source.ps_name,
            widths,
            bbox: [x_min, y_min, x_max, y_max],
            ascent: f64::from(font.ascent()) / units_per_em,
            descent: f64::from(font.descent()) / units_per_em,
            data,
            type1_segments,
        })
    }
}

/// Data shared by all generators.
#[derive(Debug)]
pub(crate) struct SubsetSource<'s> {
    font: &'s Font<'s>,
    font_id: u32,
    subset_id: u32,
    glyphs: &'s [u32],
    chars: Vec<Option<char>>,
    names: Vec<String>,
    ps_name: String,
}

impl<'s> SubsetSource<'s> {
    fn new<'f: 's>(subset: &Subset<'s, '_, ScaledFont<'f>>) -> Self {
        let font_id = subset.font_id();
        let subset_id = subset.subset_id();
        let chars = (0..subset.glyph_count()).map(|i| subset.char_at(i)).collect();
        let font = subset.font().font();
        let ps_name = font
            .ps_name()
            .map_or_else(|| format!("Subset{font_id}_{subset_id}"), String::from);
        Self {
            font,
            font_id,
            subset_id,
            glyphs: subset.glyphs(),
            chars,
            names: subset.names_or_derived(),
            ps_name,
        }
    }

    /// Returns the PostScript name prefixed with a subset tag.
    fn font_name(&self) -> String {
        format!("{}+{}", subset_tag(self.font_id, self.subset_id), self.ps_name)
    }

    /// Width in em units. Uses the advance recorded when mapping the glyph if available.
    fn width(
        &self,
        subset: &Subset<'_, '_, ScaledFont<'_>>,
        index: usize,
    ) -> Result<f64, ParseError> {
        if let Some(advance) = subset.advance(index) {
            return Ok(advance.x);
        }
        // Only `.notdef` in subsets other than the first one gets here.
        Ok(subset
            .font()
            .advance(self.glyphs[index], MetricSpace::Unit)?
            .x)
    }

    /// Converts a glyph outline to integer coordinates in a 1000-unit em.
    fn charstring_outline(&self, index: usize) -> Result<CharstringOutline, ParseError> {
        let scale = 1000.0 / f64::from(self.font.units_per_em());
        let glyph = self.glyphs[index];
        let (advance, _) = self.font.h_metrics(glyph)?;
        let scaled = |point: Point| [round_to_i32(point.x * scale), round_to_i32(point.y * scale)];
        let segments = self
            .font
            .outline(glyph)?
            .into_iter()
            .map(|element| match element {
                PathElement::MoveTo(point) => Segment::MoveTo(scaled(point)),
                PathElement::LineTo(point) => Segment::LineTo(scaled(point)),
                PathElement::CurveTo(c1, c2, end) => {
                    Segment::CurveTo(scaled(c1), scaled(c2), scaled(end))
                }
                PathElement::Close => Segment::Close,
            })
            .collect();
        Ok(CharstringOutline {
            width: round_to_i32(f64::from(advance) * scale),
            segments,
        })
    }
}

/// Path segment with absolute coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Segment {
    MoveTo([i32; 2]),
    LineTo([i32; 2]),
    CurveTo([i32; 2], [i32; 2], [i32; 2]),
    Close,
}

#[derive(Debug)]
pub(crate) struct CharstringOutline {
    pub(crate) width: i32,
    pub(crate) segments: Vec<Segment>,
}

impl CharstringOutline {
    /// Iterates over segments with coordinates relative to the previous point, which is what
    /// charstring operators take.
    pub(crate) fn relative_segments(&self) -> impl Iterator<Item = Segment> + '_ {
        let mut current = [0, 0];
        let mut delta = move |point: [i32; 2]| {
            let delta = [point[0] - current[0], point[1] - current[1]];
            current = point;
            delta
        };
        self.segments.iter().map(move |segment| match *segment {
            Segment::MoveTo(point) => Segment::MoveTo(delta(point)),
            Segment::LineTo(point) => Segment::LineTo(delta(point)),
            Segment::CurveTo(c1, c2, end) => Segment::CurveTo(delta(c1), delta(c2), delta(end)),
            Segment::Close => Segment::Close,
        })
    }
}

/// Returns a 6-letter tag distinguishing subsets of the same font, e.g. `BCDEFG`.
#[allow(clippy::cast_possible_truncation)] // `hash % 26` always fits
fn subset_tag(font_id: u32, subset_id: u32) -> String {
    let mut hash = ((u64::from(font_id) << 32) | u64::from(subset_id))
        .wrapping_add(1)
        .wrapping_mul(0x_9e37_79b9_7f4a_7c15);
    hash ^= hash >> 29;
    iter::repeat_with(|| {
        let ch = char::from(b'A' + (hash % 26) as u8);
        hash /= 26;
        ch
    })
    .take(6)
    .collect()
}

#[derive(Debug, Clone, Copy)]
#[cfg_attr(test, derive(PartialEq))]
struct TableRecord {
    tag: TableTag,
    checksum: u32,
    /// Offset is initially recorded relative to the table data start. It's always 4-byte aligned.
    offset: u32,
    length: u32,
}

impl TableRecord {
    const BYTE_LEN: usize = 16;

    fn write_opentype(&self, writer: &mut Vec<u8>) {
        writer.extend_from_slice(&self.tag.0);
        write_u32(writer, self.checksum);
        write_u32(writer, self.offset);
        write_u32(writer, self.length);
    }

    fn self_checksum(&self) -> u32 {
        u32::from_be_bytes(self.tag.0)
            .wrapping_add(self.checksum)
            .wrapping_add(self.offset)
            .wrapping_add(self.length)
    }

    fn woff2_len(&self) -> usize {
        1 /* flags */ + uint_base128_len(self.length)
    }

    fn write_woff2(&self, buffer: &mut Vec<u8>) {
        const NULL_TRANSFORM: u8 = 0b_1100_0000;

        let flags = match self.tag {
            TableTag::CMAP => 0,
            TableTag::HEAD => 1,
            TableTag::HHEA => 2,
            TableTag::HMTX => 3,
            TableTag::MAXP => 4,
            TableTag::NAME => 5,
            TableTag::OS2 => 6,
            TableTag::POST => 7,
            TableTag::CVT => 8,
            TableTag::FPGM => 9,
            TableTag::GLYF => 10 | NULL_TRANSFORM,
            TableTag::LOCA => 11 | NULL_TRANSFORM,
            TableTag::PREP => 12,
            _ => unreachable!("subsetting only produces well-known tables"),
        };
        buffer.push(flags);
        write_uint_base128(buffer, self.length);
    }
}

#[derive(Debug, Clone, Default)]
pub(crate) struct FontWriter {
    tables: Vec<TableRecord>,
    /// Contains *aligned* table data
    table_data: Vec<u8>,
}

impl FontWriter {
    const SFNT_HEADER_LEN: usize = 12;
    const WOFF2_HEADER_LEN: usize = 48;

    pub(crate) fn write_table<T>(&mut self, tag: TableTag, with: impl FnOnce(&mut Vec<u8>) -> T) -> T {
        let offset = self.table_data.len();
        debug_assert_eq!(offset % 4, 0, "unaligned offset: {offset}");

        let output = with(&mut self.table_data);
        let length = self.table_data.len() - offset;
        // Pad the table heap to a 4-byte boundary.
        if length % 4 > 0 {
            let zero_padding = 4 - length % 4;
            self.table_data.extend(iter::repeat_n(0_u8, zero_padding));
        }

        let checksum = Font::checksum(&self.table_data[offset..]);
        self.tables.push(TableRecord {
            tag,
            checksum,
            offset: u32::try_from(offset).expect("table offset overflow"),
            length: u32::try_from(length).expect("table length overflow"),
        });
        output
    }

    pub(crate) fn write_raw_table(&mut self, tag: TableTag, content: &[u8]) {
        self.write_table(tag, |buffer| buffer.extend_from_slice(content));
    }

    fn write_sfnt_header(&self) -> Vec<u8> {
        let mut buffer = vec![];
        write_u32(&mut buffer, Font::SFNT_VERSION);

        // `unwrap()`s are safe: we don't have many tables written.
        let table_count = u16::try_from(self.tables.len()).unwrap();
        write_u16(&mut buffer, table_count);
        let entry_selector = u16::try_from(table_count.ilog2()).unwrap();
        let search_range = 1 << (4 + entry_selector);
        write_u16(&mut buffer, search_range);
        write_u16(&mut buffer, entry_selector);
        let range_shift = 16 * table_count - search_range;
        write_u16(&mut buffer, range_shift);

        debug_assert_eq!(buffer.len(), Self::SFNT_HEADER_LEN);
        buffer
    }

    /// Returns the starting offset of table data.
    fn data_offset(&self) -> usize {
        Self::SFNT_HEADER_LEN + self.tables.len() * TableRecord::BYTE_LEN
    }

    pub(crate) fn into_opentype(mut self) -> Vec<u8> {
        let mut buffer = self.write_sfnt_header();
        self.adjust_data(Font::checksum(&buffer));

        self.tables.sort_unstable_by_key(|record| record.tag.0);
        for record in &self.tables {
            record.write_opentype(&mut buffer);
        }
        buffer.extend(self.table_data);
        buffer
    }

    fn adjust_data(&mut self, sfnt_header_checksum: u32) {
        let data_offset = self.data_offset();
        let data_offset_u32 = u32::try_from(data_offset).expect("data_offset overflow");

        let mut file_checksum = sfnt_header_checksum;
        for record in &mut self.tables {
            record.offset += data_offset_u32;
            file_checksum = file_checksum
                .wrapping_add(record.self_checksum())
                .wrapping_add(record.checksum);
        }
        self.patch_head_table(file_checksum, data_offset);
    }

    fn checksum_adjustment_offset(&self) -> usize {
        let head_table = self
            .tables
            .iter()
            .find(|record| record.tag == TableTag::HEAD)
            .expect("head table is always present");
        head_table.offset as usize + Font::HEAD_CHECKSUM_OFFSET
    }

    fn patch_head_table(&mut self, file_checksum: u32, data_offset: usize) {
        let checksum_adjustment = Font::SFNT_CHECKSUM.wrapping_sub(file_checksum);

        // At this point, the table offset already includes the heap offset, so we need to subtract it.
        let offset = self.checksum_adjustment_offset() - data_offset;
        self.table_data[offset..offset + 4].copy_from_slice(&checksum_adjustment.to_be_bytes());
    }

    pub(crate) fn into_woff2(mut self) -> Vec<u8> {
        const WOFF2_SIGNATURE: u32 = 0x_774f_4632;

        self.adjust_data(Font::checksum(&self.write_sfnt_header()));

        let compressed_data = self.compress_data();
        let tables_len = self
            .tables
            .iter()
            .map(TableRecord::woff2_len)
            .sum::<usize>();
        let mut file_len = Self::WOFF2_HEADER_LEN + tables_len + compressed_data.len();
        if file_len % 4 != 0 {
            file_len += 4 - file_len % 4;
        }

        let mut buffer = vec![];
        write_u32(&mut buffer, WOFF2_SIGNATURE);
        write_u32(&mut buffer, Font::SFNT_VERSION);
        write_u32(
            &mut buffer,
            file_len.try_into().expect("file length overflow"),
        );
        // `unwrap()` is safe: we don't write many tables
        write_u16(&mut buffer, self.tables.len().try_into().unwrap());
        write_u16(&mut buffer, 0); // reserved

        let decompressed_len = self.data_offset() + self.table_data.len();
        // `unwrap`s are safe, since `file_len` fits into u32.
        write_u32(&mut buffer, decompressed_len.try_into().unwrap());
        write_u32(&mut buffer, compressed_data.len().try_into().unwrap());
        write_u32(&mut buffer, 0); // WOFF version
        write_u32(&mut buffer, 0); // metadata offset
        write_u32(&mut buffer, 0); // metadata length
        write_u32(&mut buffer, 0); // original metadata length
        write_u32(&mut buffer, 0); // private block offset
        write_u32(&mut buffer, 0); // private block length
        debug_assert_eq!(buffer.len(), Self::WOFF2_HEADER_LEN);

        for record in &self.tables {
            record.write_woff2(&mut buffer);
        }
        debug_assert_eq!(buffer.len(), Self::WOFF2_HEADER_LEN + tables_len);
        buffer.extend(compressed_data);

        // Pad `buffer` to be 4-byte aligned. This is required even though we don't have metadata or private blocks.
        if buffer.len() % 4 != 0 {
            let padding = 4 - buffer.len() % 4;
            buffer.extend(iter::repeat_n(0, padding));
        }
        buffer
    }
}

#[cfg(test)]
mod tests {
    use allsorts::{binary::read::ReadScope, font_data::FontData, tables::FontTableProvider};
    use test_casing::test_casing;

    use super::*;
    use crate::{
        tests::{test_font, TestFont},
        FaceId, FontMatrix, SubsetFlavor, SubsetIndex,
    };

    #[test]
    fn leb128_encoding() {
        let samples = &[
            (0_u32, &[0_u8] as &[u8]),
            (1, &[1]),
            (127, &[127]),
            (128, &[0x81, 0]),
            (129, &[0x81, 1]),
            (16_383, &[0xff, 0x7f]),
            (16_384, &[0x81, 0x80, 0]),
        ];
        for &(val, expected) in samples {
            assert_eq!(uint_base128_len(val), expected.len());
            let mut buffer = vec![];
            write_uint_base128(&mut buffer, val);
            assert_eq!(buffer, expected);
        }
    }

    #[test]
    fn rounding() {
        assert_eq!(round_to_i32(0.4), 0);
        assert_eq!(round_to_i32(0.5), 1);
        assert_eq!(round_to_i32(-0.5), -1);
        assert_eq!(round_to_i32(-1.4), -1);
    }

    #[test]
    fn subset_tags() {
        let tags: Vec<_> = (0..4)
            .flat_map(|font_id| (0..4).map(move |subset_id| subset_tag(font_id, subset_id)))
            .collect();
        for tag in &tags {
            assert_eq!(tag.len(), 6);
            assert!(tag.bytes().all(|byte| byte.is_ascii_uppercase()), "{tag}");
        }
        let mut unique_tags = tags.clone();
        unique_tags.sort();
        unique_tags.dedup();
        assert_eq!(unique_tags.len(), tags.len());
        assert_eq!(subset_tag(1, 2), subset_tag(1, 2));
    }

    #[test]
    fn relative_segments() {
        let outline = CharstringOutline {
            width: 500,
            segments: vec![
                Segment::MoveTo([10, 20]),
                Segment::LineTo([110, 20]),
                Segment::CurveTo([120, 30], [120, 40], [110, 50]),
                Segment::Close,
                Segment::MoveTo([0, 0]),
            ],
        };
        let relative: Vec<_> = outline.relative_segments().collect();
        assert_eq!(
            relative,
            [
                Segment::MoveTo([10, 20]),
                Segment::LineTo([100, 0]),
                Segment::CurveTo([10, 10], [0, 10], [-10, 10]),
                Segment::Close,
                Segment::MoveTo([-110, -50]),
            ]
        );
    }

    const ALL_KINDS: [FontProgramKind; 5] = [
        FontProgramKind::Type1 {
            encoding: EexecEncoding::Binary,
        },
        FontProgramKind::Type1 {
            encoding: EexecEncoding::Hex,
        },
        FontProgramKind::Cff,
        FontProgramKind::TrueType,
        FontProgramKind::Woff2,
    ];

    #[test_casing(5, ALL_KINDS)]
    fn generating_program_metadata(kind: FontProgramKind) {
        let font = test_font();
        let scaled = ScaledFont::new(&font, FaceId(1), FontMatrix::scale(10.0));
        let mut index = SubsetIndex::simple();
        for ch in "Hil".chars() {
            let glyph = font.map_char(ch).unwrap();
            index.map_glyph(&scaled, glyph.into(), None).unwrap();
        }
        let subset = index.subsets(SubsetFlavor::Unscaled).next().unwrap();
        let program = kind.generate(&subset).unwrap();

        assert_eq!(program.ps_name, TestFont::PS_NAME);
        let (tag, ps_name) = program.font_name.split_once('+').unwrap();
        assert_eq!(tag.len(), 6);
        assert_eq!(ps_name, TestFont::PS_NAME);
        assert_eq!(program.widths.len(), 4);
        assert_eq!(program.widths[0], f64::from(TestFont::NOTDEF_ADVANCE) / 1000.0);
        assert_eq!(program.widths[1], f64::from(TestFont::ADVANCE) / 1000.0);
        assert_eq!(program.ascent, 0.8);
        assert_eq!(program.descent, -0.2);
        assert!(!program.data.is_empty());
        assert_eq!(
            program.type1_segments.is_some(),
            matches!(kind, FontProgramKind::Type1 { .. })
        );
    }

    #[test_casing(5, ALL_KINDS)]
    fn scaled_subsets_are_not_supported(kind: FontProgramKind) {
        let font = test_font();
        let scaled = ScaledFont::new(&font, FaceId(1), FontMatrix::scale(10.0));
        let mut index = SubsetIndex::scaled();
        index.map_glyph(&scaled, 1, None).unwrap();
        let subset = index.subsets(SubsetFlavor::Scaled).next().unwrap();
        let err = kind.generate(&subset).unwrap_err();
        assert!(matches!(err, GenerateError::Unsupported(_)), "{err:?}");
    }

    #[test_casing(2, ["Woff", "Woff\u{c5}\u{f8} "])]
    fn truetype_and_woff2_programs_have_same_tables(text: &str) {
        const TAGS: [TableTag; 10] = [
            TableTag::CMAP,
            TableTag::HEAD,
            TableTag::HHEA,
            TableTag::HMTX,
            TableTag::MAXP,
            TableTag::NAME,
            TableTag::OS2,
            TableTag::POST,
            TableTag::LOCA,
            TableTag::GLYF,
        ];

        let font = test_font();
        let scaled = ScaledFont::new(&font, FaceId(1), FontMatrix::IDENTITY);
        let mut index = SubsetIndex::composite();
        for ch in text.chars() {
            let glyph = font.map_char(ch).unwrap();
            index.map_glyph(&scaled, glyph.into(), None).unwrap();
        }
        let subset = index.subsets(SubsetFlavor::Unscaled).next().unwrap();
        let ttf = FontProgramKind::TrueType.generate(&subset).unwrap().data;
        let woff2 = FontProgramKind::Woff2.generate(&subset).unwrap().data;

        let ttf = ReadScope::new(&ttf).read::<FontData<'_>>().unwrap();
        let ttf = ttf.table_provider(0).unwrap();
        let woff2 = ReadScope::new(&woff2).read::<FontData<'_>>().unwrap();
        let woff2 = woff2.table_provider(0).unwrap();
        for tag in TAGS {
            println!("Testing table: {tag}");
            let raw_tag = u32::from_be_bytes(tag.0);
            let mut ttf_table = ttf.read_table_data(raw_tag).unwrap().into_owned();
            let mut woff2_table = woff2.read_table_data(raw_tag).unwrap().into_owned();
            if tag == TableTag::HEAD {
                let checksum_range = Font::HEAD_CHECKSUM_OFFSET..Font::HEAD_CHECKSUM_OFFSET + 4;
                ttf_table[checksum_range.clone()].copy_from_slice(&[0; 4]);
                woff2_table[checksum_range].copy_from_slice(&[0; 4]);
            }
            assert_eq!(ttf_table, woff2_table);
        }
        allsorts::Font::new(woff2).unwrap();
    }
}
