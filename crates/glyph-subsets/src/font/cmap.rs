//! `cmap` table processing.

use log::warn;

use super::Cursor;
use crate::{
    alloc::{BTreeMap, Vec},
    errors::ParseErrorKind,
    ParseError,
};

#[derive(Debug)]
enum CmapTableFormat {
    /// Segment mapping to delta values (format 4).
    SegmentDeltas,
    /// Segmented coverage (format 12).
    SegmentedCoverage,
}

#[derive(Debug, Clone, Copy)]
pub(crate) struct SegmentWithDelta {
    pub(crate) start_code: u16,
    pub(crate) end_code: u16,
    pub(crate) id_delta: u16,
    pub(crate) id_range_offset: u16,
}

/// Segment mapping to delta values (format 4) subtable of the `cmap` table.
#[derive(Debug, Clone)]
pub(crate) struct SegmentDeltas<'a> {
    pub(crate) segments: Vec<SegmentWithDelta>,
    pub(crate) glyph_id_array: Cursor<'a>,
}

impl<'a> SegmentDeltas<'a> {
    fn parse(mut cursor: Cursor<'a>) -> Result<Self, ParseError> {
        cursor.read_u16_checked(|format| {
            if format != 4 {
                return Err(ParseErrorKind::UnexpectedTableFormat { format });
            }
            Ok(())
        })?;

        let remaining_len = cursor.read_u16_checked(|subtable_len| {
            Ok(subtable_len
                .checked_sub(4)
                .ok_or(ParseErrorKind::UnexpectedEof)? as usize)
        })?;
        cursor = cursor.range(0..remaining_len)?;

        cursor.skip(2)?; // language
        let segment_count = cursor.read_u16()? / 2;
        cursor.skip(6)?; // searchRange, entrySelector, rangeShift

        let vec_len = 2 * usize::from(segment_count);
        let mut end_codes = cursor.split_at(vec_len)?;
        cursor.skip(2)?; // reserved padding
        let mut start_codes = cursor.split_at(vec_len)?;
        let mut id_deltas = cursor.split_at(vec_len)?;
        let mut id_range_offsets = cursor.split_at(vec_len)?;

        let segments = (0..segment_count).map(|_| {
            Ok(SegmentWithDelta {
                start_code: start_codes.read_u16()?,
                end_code: end_codes.read_u16()?,
                id_delta: id_deltas.read_u16()?,
                id_range_offset: id_range_offsets.read_u16()?,
            })
        });

        Ok(Self {
            segments: segments.collect::<Result<_, ParseError>>()?,
            glyph_id_array: cursor,
        })
    }

    fn map_char(&self, ch: char) -> Result<u16, ParseError> {
        let Ok(code) = u16::try_from(u32::from(ch)) else {
            return Ok(0); // format 4 only covers the BMP
        };

        let segment_idx = self
            .segments
            .binary_search_by_key(&code, |segment| segment.end_code)
            .unwrap_or_else(|pos| pos);
        match self.segments.get(segment_idx) {
            Some(segment) if segment.start_code <= code => self.map_code(segment_idx, code),
            _ => Ok(0), // missing glyph
        }
    }

    fn map_code(&self, segment_idx: usize, code: u16) -> Result<u16, ParseError> {
        let segment = &self.segments[segment_idx];
        if segment.id_range_offset == 0 {
            return Ok(segment.id_delta.wrapping_add(code));
        }

        // Offset is counted from the position of the `idRangeOffset` entry
        let mut byte_offset = 2 * segment_idx;
        byte_offset += usize::from(segment.id_range_offset);
        byte_offset += 2 * usize::from(code - segment.start_code);

        let array_start = 2 * self.segments.len();
        if byte_offset < array_start {
            return Err(self
                .glyph_id_array
                .err(ParseErrorKind::OffsetOutOfBounds(byte_offset)));
        }
        // Shift the offset to count from the start of `glyphIdArray`
        byte_offset -= array_start;
        let mut glyph_id_bytes = self.glyph_id_array.range(byte_offset..byte_offset + 2)?;
        let glyph_id = glyph_id_bytes.read_u16()?;
        if glyph_id == 0 {
            Ok(0)
        } else {
            Ok(segment.id_delta.wrapping_add(glyph_id))
        }
    }

    /// Visits each code at most once: a code belongs to the first segment (by `end_code`)
    /// covering it, same as in [`Self::map_char()`].
    fn collect_chars(&self, glyph_count: u16, chars_by_glyph: &mut BTreeMap<u16, char>) {
        let mut next_code = 0_u16;
        for (segment_idx, segment) in self.segments.iter().enumerate() {
            let start_code = segment.start_code.max(next_code);
            // The final `0xffff` segment maps nothing.
            let end_code = segment.end_code.min(u16::MAX - 1);
            if start_code > end_code {
                continue;
            }
            next_code = end_code + 1;

            let mut reported_error = false;
            for code in start_code..=end_code {
                let Some(ch) = char::from_u32(code.into()) else {
                    continue; // surrogate code points
                };
                let glyph = match self.map_code(segment_idx, code) {
                    Ok(glyph) => glyph,
                    Err(err) => {
                        if !reported_error {
                            warn!("cmap segment #{segment_idx}: cannot map code {code:#06x}: {err}");
                            reported_error = true;
                        }
                        continue;
                    }
                };
                if glyph != 0 && glyph < glyph_count {
                    insert_char(chars_by_glyph, glyph, ch);
                }
            }
        }
    }
}

fn insert_char(chars_by_glyph: &mut BTreeMap<u16, char>, glyph: u16, ch: char) {
    chars_by_glyph
        .entry(glyph)
        .and_modify(|existing| *existing = (*existing).min(ch))
        .or_insert(ch);
}

#[derive(Debug, Clone, Copy)]
pub(crate) struct SequentialMapGroup {
    pub(crate) start_char_code: u32,
    pub(crate) end_char_code: u32,
    pub(crate) start_glyph_id: u32,
}

impl SequentialMapGroup {
    pub(crate) fn map_unchecked(&self, ch: char) -> u32 {
        u32::from(ch) - self.start_char_code + self.start_glyph_id
    }
}

/// Segmented coverage (format 12) subtable of the `cmap` table.
#[derive(Debug, Default, Clone)]
pub(crate) struct SegmentedCoverage {
    pub(crate) groups: Vec<SequentialMapGroup>,
}

impl SegmentedCoverage {
    fn parse(mut cursor: Cursor<'_>) -> Result<Self, ParseError> {
        cursor.read_u16_checked(|format| {
            if format != 12 {
                return Err(ParseErrorKind::UnexpectedTableFormat { format });
            }
            Ok(())
        })?;

        cursor.skip(2)?; // reserved

        let remaining_len = cursor.read_u32_checked(|subtable_len| {
            Ok(subtable_len
                .checked_sub(8)
                .ok_or(ParseErrorKind::UnexpectedEof)? as usize)
        })?;
        cursor = cursor.range(0..remaining_len)?;

        cursor.skip(4)?; // language
        let num_groups = cursor.read_u32()?;
        let groups = (0..num_groups).map(|_| {
            Ok(SequentialMapGroup {
                start_char_code: cursor.read_u32()?,
                end_char_code: cursor.read_u32()?,
                start_glyph_id: cursor.read_u32()?,
            })
        });

        Ok(Self {
            groups: groups.collect::<Result<_, ParseError>>()?,
        })
    }

    fn map_char(&self, ch: char) -> u16 {
        let ch = u32::from(ch);
        let group_idx = self
            .groups
            .binary_search_by_key(&ch, |group| group.end_char_code)
            .unwrap_or_else(|pos| pos);
        let Some(group) = self.groups.get(group_idx) else {
            return 0; // `ch` exceeds `end_char_code` for the last segment
        };
        if group.start_char_code > ch {
            return 0; // missing glyph
        }
        let glyph_id = ch - group.start_char_code + group.start_glyph_id;
        u16::try_from(glyph_id).unwrap_or(0)
    }

    /// Like [`SegmentDeltas::collect_chars()`], codes covered by several groups are only
    /// attributed to the first one.
    fn collect_chars(&self, glyph_count: u16, chars_by_glyph: &mut BTreeMap<u16, char>) {
        let mut next_code = 0_u32;
        for group in &self.groups {
            let start_char_code = group.start_char_code.max(next_code);
            let end_char_code = group.end_char_code.min(u32::from(char::MAX));
            if start_char_code > end_char_code {
                continue;
            }
            next_code = end_char_code + 1;

            for code in start_char_code..=end_char_code {
                let glyph_id = group
                    .start_glyph_id
                    .saturating_add(code - group.start_char_code);
                let Ok(glyph) = u16::try_from(glyph_id) else {
                    break;
                };
                if glyph >= glyph_count {
                    break; // the following codes map to even larger glyph IDs
                }
                let Some(ch) = char::from_u32(code) else {
                    continue;
                };
                if glyph != 0 {
                    insert_char(chars_by_glyph, glyph, ch);
                }
            }
        }
    }
}

#[derive(Debug, Clone)]
pub(crate) enum CmapTable<'a> {
    Deltas(SegmentDeltas<'a>),
    Coverage(SegmentedCoverage),
}

impl<'a> CmapTable<'a> {
    pub(crate) const UNICODE_PLATFORM: u16 = 0;
    const WINDOWS_PLATFORM: u16 = 3;

    pub(super) fn parse(mut cursor: Cursor<'a>) -> Result<Self, ParseError> {
        let table_cursor = cursor;
        cursor.read_u16_checked(|version| {
            if version != 0 {
                return Err(ParseErrorKind::UnexpectedTableVersion {
                    version: version.into(),
                });
            }
            Ok(())
        })?;

        let num_tables = cursor.read_u16()?;
        let mut deltas = None;
        let mut coverage = None;
        for _ in 0..num_tables {
            let platform_id = cursor.read_u16()?;
            let encoding_id = cursor.read_u16()?;
            let offset = cursor.read_u32()?;
            let expected_table_format = match (platform_id, encoding_id) {
                (Self::UNICODE_PLATFORM, 3) | (Self::WINDOWS_PLATFORM, 1) => {
                    CmapTableFormat::SegmentDeltas
                }
                (Self::UNICODE_PLATFORM, 4) | (Self::WINDOWS_PLATFORM, 10) => {
                    CmapTableFormat::SegmentedCoverage
                }
                _ => continue, // unsupported table format
            };

            let mut subtable = table_cursor;
            subtable.skip(offset as usize)?;
            match expected_table_format {
                CmapTableFormat::SegmentDeltas if deltas.is_none() => {
                    deltas = Some(SegmentDeltas::parse(subtable)?);
                }
                CmapTableFormat::SegmentedCoverage if coverage.is_none() => {
                    coverage = Some(SegmentedCoverage::parse(subtable)?);
                }
                _ => { /* We've already got a necessary table; do nothing */ }
            }
        }

        // Full-repertoire subtables take precedence over BMP-only ones.
        coverage
            .map(Self::Coverage)
            .or_else(|| deltas.map(Self::Deltas))
            .ok_or_else(|| cursor.err(ParseErrorKind::NoSupportedCmap))
    }

    pub(super) fn map_char(&self, ch: char) -> Result<u16, ParseError> {
        match self {
            Self::Deltas(deltas) => deltas.map_char(ch),
            Self::Coverage(coverage) => Ok(coverage.map_char(ch)),
        }
    }

    /// Builds the reverse mapping. If several chars map to the same glyph, the smallest one wins.
    /// Codes that cannot be mapped are skipped.
    pub(super) fn chars_by_glyph(&self, glyph_count: u16) -> BTreeMap<u16, char> {
        let mut chars_by_glyph = BTreeMap::new();
        match self {
            Self::Deltas(deltas) => deltas.collect_chars(glyph_count, &mut chars_by_glyph),
            Self::Coverage(coverage) => coverage.collect_chars(glyph_count, &mut chars_by_glyph),
        }
        chars_by_glyph
    }
}
