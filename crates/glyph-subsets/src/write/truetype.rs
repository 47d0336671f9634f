//! TrueType output: a standalone OpenType font in which glyph `i` is subset glyph `i`.

use core::mem;

use super::{write_u16, write_u32, FontWriter, SubsetSource};
use crate::{
    alloc::{vec, BTreeMap, Vec},
    errors::{GenerateError, ParseErrorKind},
    font::{
        CmapTable, Cursor, Font, Glyph, GlyphComponent, GlyphComponentArgs, GlyphWithMetrics,
        HheaTable, HmtxTable, LocaFormat, LocaTable, SegmentDeltas, SegmentWithDelta,
        SegmentedCoverage, SequentialMapGroup, TableTag, TransformData,
    },
    ParseError,
};

/// Maximum number of glyphs in a TrueType font (`maxp.numGlyphs` is a `u16`).
const MAX_GLYPHS: usize = u16::MAX as usize;
const POST_HEADER_LEN: usize = 32;

pub(super) fn write(source: &SubsetSource<'_>) -> Result<FontWriter, GenerateError> {
    let subset = TrueTypeSubset::new(source)?;
    subset.to_writer()
}

/// Glyphs of a subset together with composite glyph components they depend on.
#[derive(Debug)]
struct TrueTypeSubset<'a> {
    font: &'a Font<'a>,
    char_map: Vec<(char, u16)>,
    old_to_new_glyph_idx: BTreeMap<u16, u16>,
    glyphs: Vec<GlyphWithMetrics<'a>>,
}

impl<'a> TrueTypeSubset<'a> {
    fn new(source: &SubsetSource<'a>) -> Result<Self, GenerateError> {
        let font = source.font;
        if source.glyphs.len() > MAX_GLYPHS {
            return Err(GenerateError::TooManyGlyphs {
                count: source.glyphs.len(),
                max: MAX_GLYPHS,
            });
        }

        let mut this = Self {
            font,
            char_map: vec![],
            old_to_new_glyph_idx: BTreeMap::new(),
            glyphs: Vec::with_capacity(source.glyphs.len()),
        };
        // Subset glyphs keep their indices; component glyphs are appended after them.
        for (new_idx, &glyph) in (0_u16..).zip(source.glyphs) {
            let old_idx = font.check_glyph(glyph)?;
            this.old_to_new_glyph_idx.entry(old_idx).or_insert(new_idx);
            this.glyphs.push(font.glyph(glyph)?);
        }

        let mut glyph_idx = 0;
        while glyph_idx < this.glyphs.len() {
            this.remap_components(glyph_idx)?;
            glyph_idx += 1;
        }

        this.char_map = (0_u16..)
            .zip(&source.chars)
            .skip(1)
            .filter_map(|(new_idx, ch)| Some(((*ch)?, new_idx)))
            .collect();
        this.char_map.sort_unstable();
        this.char_map.dedup_by_key(|(ch, _)| *ch);
        Ok(this)
    }

    fn remap_components(&mut self, glyph_idx: usize) -> Result<(), GenerateError> {
        let Glyph::Composite { components, .. } = &self.glyphs[glyph_idx].inner else {
            return Ok(());
        };
        let old_indices: Vec<_> = components.iter().map(|component| component.glyph_idx).collect();
        let mut new_indices = Vec::with_capacity(old_indices.len());
        for old_idx in old_indices {
            new_indices.push(self.ensure_glyph(old_idx)?);
        }

        if let Glyph::Composite { components, .. } = &mut self.glyphs[glyph_idx].inner {
            for (component, new_idx) in components.iter_mut().zip(new_indices) {
                component.glyph_idx = new_idx;
            }
        }
        Ok(())
    }

    /// Appends a component glyph if it's not in the subset yet. Components of the appended glyph
    /// are handled when the glyph is reached by `remap_components()`.
    fn ensure_glyph(&mut self, old_idx: u16) -> Result<u16, GenerateError> {
        if let Some(new_idx) = self.old_to_new_glyph_idx.get(&old_idx) {
            return Ok(*new_idx);
        }

        let count = self.glyphs.len() + 1;
        let new_idx = u16::try_from(self.glyphs.len())
            .ok()
            .filter(|_| count <= MAX_GLYPHS)
            .ok_or(GenerateError::TooManyGlyphs {
                count,
                max: MAX_GLYPHS,
            })?;
        self.glyphs.push(self.font.glyph(old_idx.into())?);
        self.old_to_new_glyph_idx.insert(old_idx, new_idx);
        Ok(new_idx)
    }

    fn to_writer(&self) -> Result<FontWriter, GenerateError> {
        let post = self.font.post.get(4..POST_HEADER_LEN).ok_or_else(|| {
            ParseError::new(ParseErrorKind::UnexpectedTableLen {
                expected: POST_HEADER_LEN,
                actual: self.font.post.len(),
            })
            .with_table(TableTag::POST)
        })?;
        let cmap = CmapTable::from_map(&self.char_map);

        let mut writer = FontWriter::default();
        writer.write_table(TableTag::CMAP, |buffer| cmap.write(buffer));
        if let Some(cvt) = self.font.cvt {
            writer.write_raw_table(TableTag::CVT, cvt);
        }
        if let Some(fpgm) = self.font.fpgm {
            writer.write_raw_table(TableTag::FPGM, fpgm);
        }

        let number_of_h_metrics = writer.write_table(TableTag::HMTX, |buffer| {
            HmtxTable::write_for_glyphs(&self.glyphs, buffer)
        });
        let mut hhea = self.font.hhea;
        hhea.number_of_h_metrics = number_of_h_metrics;
        writer.write_table(TableTag::HHEA, |buffer| {
            hhea.write(buffer);
        });

        let maxp = self.font.maxp;
        // Checked when creating the subset.
        let glyph_count = u16::try_from(self.glyphs.len()).unwrap_or(u16::MAX);
        writer.write_table(TableTag::MAXP, |buffer| {
            // Patch the number of glyphs (u16 at bytes 4..6), and leave other bytes intact.
            buffer.extend_from_slice(&maxp[..4]);
            write_u16(buffer, glyph_count);
            buffer.extend_from_slice(&maxp[6..]);
        });

        writer.write_raw_table(TableTag::NAME, self.font.name);
        writer.write_raw_table(TableTag::OS2, self.font.os2);
        writer.write_table(TableTag::POST, |buffer| {
            // Truncate the `post` table to not contain glyph names
            write_u32(buffer, 0x_0003_0000); // version
            buffer.extend_from_slice(post);
        });

        if let Some(prep) = self.font.prep {
            writer.write_raw_table(TableTag::PREP, prep);
        }

        let locations = writer.write_table(TableTag::GLYF, |buffer| {
            let mut locations = vec![0];
            let initial_offset = buffer.len();
            for glyph in &self.glyphs {
                glyph.inner.write(buffer);
                locations.push(buffer.len() - initial_offset);
            }
            locations
        });

        let loca_format = writer.write_table(TableTag::LOCA, |buffer| {
            LocaTable::write(&locations, buffer)
        });
        writer.write_table(TableTag::HEAD, |buffer| {
            write_head_table(self.font.head, loca_format, buffer);
        });

        Ok(writer)
    }
}

fn write_head_table(original: &[u8], loca_format: LocaFormat, writer: &mut Vec<u8>) {
    const LOCA_FORMAT_OFFSET: usize = 50;

    writer.extend_from_slice(&original[..Font::HEAD_CHECKSUM_OFFSET]);
    write_u32(writer, 0); // Zero the checksum as per spec. It will be adjusted later
    writer.extend_from_slice(&original[Font::HEAD_CHECKSUM_OFFSET + 4..LOCA_FORMAT_OFFSET]);
    write_u16(
        writer,
        match loca_format {
            LocaFormat::Short => 0,
            LocaFormat::Long => 1,
        },
    );
    writer.extend_from_slice(&original[LOCA_FORMAT_OFFSET + 2..]);
}

impl CmapTable<'static> {
    fn from_map(map: &[(char, u16)]) -> Self {
        let coverage = Self::create_coverage(map);
        let can_be_encoded_as_deltas = map
            .last()
            .is_none_or(|&(ch, _)| u32::from(ch) < u32::from(u16::MAX));
        if can_be_encoded_as_deltas {
            #[allow(clippy::cast_possible_truncation)]
            // `_ as u16` is safe due to the `can_be_encoded_as_deltas` check
            let delta_segments = coverage.groups.iter().map(|group| {
                let start_code = group.start_char_code as u16;
                SegmentWithDelta {
                    start_code,
                    end_code: group.end_char_code as u16,
                    id_delta: (group.start_glyph_id as u16).wrapping_sub(start_code),
                    id_range_offset: 0,
                }
            });
            // Add an empty segment with `start_code == end_code == 0xffff` as per spec.
            let delta_segments = delta_segments.chain([SegmentWithDelta {
                start_code: u16::MAX,
                end_code: u16::MAX,
                id_delta: 1, // will map `start_code` to glyph #0 (the missing glyph) as recommended
                id_range_offset: 0,
            }]);
            Self::Deltas(SegmentDeltas {
                segments: delta_segments.collect(),
                glyph_id_array: Cursor::new(&[]),
            })
        } else {
            Self::Coverage(coverage)
        }
    }

    fn create_coverage(map: &[(char, u16)]) -> SegmentedCoverage {
        let mut groups = vec![];
        let [(first_char, first_idx), rest @ ..] = map else {
            return SegmentedCoverage::default();
        };
        let mut current_group = SequentialMapGroup {
            start_char_code: (*first_char).into(),
            end_char_code: (*first_char).into(),
            start_glyph_id: (*first_idx).into(),
        };

        for &(ch, glyph_idx) in rest {
            if u32::from(ch) == current_group.end_char_code + 1
                && u32::from(glyph_idx) == current_group.map_unchecked(ch)
            {
                current_group.end_char_code += 1;
            } else {
                let prev_group = mem::replace(
                    &mut current_group,
                    SequentialMapGroup {
                        start_char_code: ch.into(),
                        end_char_code: ch.into(),
                        start_glyph_id: glyph_idx.into(),
                    },
                );
                groups.push(prev_group);
            }
        }

        groups.push(current_group);
        SegmentedCoverage { groups }
    }
}

impl CmapTable<'_> {
    fn write(&self, writer: &mut Vec<u8>) {
        write_u16(writer, 0); // table version
        write_u16(writer, 1); // num_tables

        write_u16(writer, CmapTable::UNICODE_PLATFORM);
        let encoding_id = match self {
            Self::Deltas(_) => 3,
            Self::Coverage(_) => 4,
        };
        write_u16(writer, encoding_id);
        write_u32(writer, 12); // subtable_offset

        match self {
            Self::Deltas(deltas) => deltas.write(writer),
            Self::Coverage(coverage) => coverage.write(writer),
        }
    }
}

impl SegmentDeltas<'_> {
    fn subtable_len(&self) -> usize {
        16 + 8 * self.segments.len()
    }

    fn write(&self, writer: &mut Vec<u8>) {
        write_u16(writer, 4); // subtable format
        write_u16(
            writer,
            self.subtable_len()
                .try_into()
                .expect("subtable_len overflow"),
        );
        write_u16(writer, 0); // language

        let segment_count = u16::try_from(self.segments.len()).expect("segments.len() overflow");
        write_u16(writer, 2 * segment_count);
        let entry_selector = u16::try_from(segment_count.ilog2()).unwrap();
        let search_range = 1 << (entry_selector + 1);
        write_u16(writer, search_range);
        write_u16(writer, entry_selector);
        let range_shift = 2 * segment_count - search_range;
        write_u16(writer, range_shift);

        for segment in &self.segments {
            write_u16(writer, segment.end_code);
        }
        write_u16(writer, 0); // reserved padding
        for segment in &self.segments {
            write_u16(writer, segment.start_code);
        }
        for segment in &self.segments {
            write_u16(writer, segment.id_delta);
        }
        for segment in &self.segments {
            write_u16(writer, segment.id_range_offset);
        }
        writer.extend_from_slice(self.glyph_id_array.bytes);
    }
}

impl SegmentedCoverage {
    fn subtable_len(&self) -> usize {
        16 + 12 * self.groups.len()
    }

    fn write(&self, writer: &mut Vec<u8>) {
        write_u16(writer, 12); // subtable format
        write_u16(writer, 0); // reserved

        write_u32(
            writer,
            self.subtable_len()
                .try_into()
                .expect("subtable_len overflow"),
        );
        write_u32(writer, 0); // language
        write_u32(
            writer,
            self.groups.len().try_into().expect("groups.len() overflow"),
        );
        for group in &self.groups {
            write_u32(writer, group.start_char_code);
            write_u32(writer, group.end_char_code);
            write_u32(writer, group.start_glyph_id);
        }
    }
}

impl HmtxTable<'_> {
    fn write_for_glyphs(glyphs: &[GlyphWithMetrics<'_>], writer: &mut Vec<u8>) -> u16 {
        let mut number_of_h_metrics = glyphs.len();
        while let Some([prev, current]) = glyphs[..number_of_h_metrics].last_chunk::<2>() {
            if prev.advance != current.advance {
                break;
            }
            number_of_h_metrics -= 1;
        }

        for (i, glyph) in glyphs.iter().enumerate() {
            if i < number_of_h_metrics {
                write_u16(writer, glyph.advance);
                write_u16(writer, glyph.lsb);
            } else {
                write_u16(writer, glyph.lsb);
            }
        }

        // `unwrap()` should be safe: `number_of_h_metrics` <= number of glyphs, which doesn't exceed u16::MAX
        number_of_h_metrics.try_into().unwrap()
    }
}

impl HheaTable<'_> {
    fn write(&self, writer: &mut Vec<u8>) {
        writer.extend_from_slice(&self.raw[..Self::EXPECTED_LEN - 2]);
        write_u16(writer, self.number_of_h_metrics);
    }
}

impl LocaTable<'_> {
    fn write(locations: &[usize], writer: &mut Vec<u8>) -> LocaFormat {
        let all_even = locations.iter().all(|&loc| loc % 2 == 0);
        let in_bounds = locations
            .last()
            .is_none_or(|&loc| loc <= usize::from(u16::MAX) * 2);
        if all_even && in_bounds {
            for &loc in locations {
                #[allow(clippy::cast_possible_truncation)]
                // doesn't happen due to the preceding check
                write_u16(writer, (loc / 2) as u16);
            }
            LocaFormat::Short
        } else {
            for &loc in locations {
                write_u32(writer, u32::try_from(loc).expect("glyph location overflow"));
            }
            LocaFormat::Long
        }
    }
}

impl Glyph<'_> {
    fn write(&self, writer: &mut Vec<u8>) {
        match self {
            Self::Empty => { /* do nothing */ }
            Self::Simple(bytes) => {
                writer.extend_from_slice(bytes);
            }
            Self::Composite {
                header,
                components,
                instructions,
            } => {
                write_u16(writer, u16::MAX); // numberOfContours = -1
                writer.extend_from_slice(header);
                for component in components {
                    component.write(writer);
                }
                writer.extend_from_slice(instructions);
            }
        }
    }
}

impl GlyphComponent {
    fn write(&self, writer: &mut Vec<u8>) {
        write_u16(writer, self.flags);
        write_u16(writer, self.glyph_idx);
        match self.args {
            GlyphComponentArgs::U16(args) => write_u16(writer, args),
            GlyphComponentArgs::U32(args) => write_u32(writer, args),
        }
        match self.transform {
            TransformData::None => { /* do nothing */ }
            TransformData::Scale(val) => write_u16(writer, val),
            TransformData::TwoScales([x, y]) => {
                write_u16(writer, x);
                write_u16(writer, y);
            }
            TransformData::Affine([xx, xy, yx, yy]) => {
                write_u16(writer, xx);
                write_u16(writer, xy);
                write_u16(writer, yx);
                write_u16(writer, yy);
            }
        }
    }
}
