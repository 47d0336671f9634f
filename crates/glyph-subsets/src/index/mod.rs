//! Glyph subsetting index: maps glyphs of scaled fonts to bounded-size font subsets.

use core::fmt;

use log::{debug, trace};

pub use self::subset::{Subset, SubsetFlavor, Subsets};
use crate::{
    alloc::{BTreeMap, String, TryReserveError, Vec},
    backend::{Advance, FaceId, FontBackend, FontKind, MetricSpace},
    errors::IndexError,
    names,
};

mod subset;

/// Maximum number of glyphs in a subset of a simple (8-bit encoded) font.
const MAX_GLYPHS_PER_SIMPLE_FONT: u32 = 256;
/// Maximum number of glyphs in a subset of a composite (CID-keyed) font.
const MAX_GLYPHS_PER_COMPOSITE_FONT: u32 = 65_536;

/// Subsetting mode of a [`SubsetIndex`]. Fixed at creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubsetMode {
    /// Every scaled font (a face together with its scale) gets its own family of subsets.
    /// Each subset holds up to 256 glyphs.
    Scaled,
    /// Glyphs with outlines are subset per face regardless of scale, with up to 256 glyphs
    /// per subset, for simple (8-bit) encodings. Glyphs without outlines are subset per scaled font.
    Simple,
    /// Glyphs with outlines are subset per face regardless of scale, with up to 65,536 glyphs
    /// per subset (256 for legacy Type 1 fonts), for composite encodings. Glyphs without outlines
    /// are subset per scaled font with up to 256 glyphs per subset.
    Composite,
}

/// Result of mapping a glyph with [`SubsetIndex::map_glyph()`].
#[derive(Debug, Clone, PartialEq)]
pub struct SubsetGlyph {
    /// ID of the sub-font the glyph belongs to. Sub-fonts are identified by a face
    /// (for glyphs with outlines) or by a scaled font (for other glyphs).
    pub font_id: u32,
    /// ID of the subset within the sub-font.
    pub subset_id: u32,
    /// Index of the glyph within the subset. Index 0 is reserved for `.notdef`.
    pub subset_glyph_index: u32,
    /// Whether the glyph is subset per scaled font (i.e., it has no scalable outline).
    pub is_scaled: bool,
    /// Whether the subset is meant for a composite font encoding.
    pub is_composite: bool,
    /// Horizontal advance: in device space if `is_scaled`, otherwise for an unhinted font
    /// with 1 unit per em.
    pub x_advance: f64,
    /// Vertical advance, in the same space as `x_advance`.
    pub y_advance: f64,
    /// Unicode char mapped to the glyph by the font backend.
    pub unicode: Option<char>,
    /// `true` if the text supplied to `map_glyph()` is (or already was) associated with the glyph.
    /// `false` if no text was supplied, or if the glyph is associated with different text.
    pub utf8_is_mapped: bool,
}

#[derive(Debug)]
struct MappedGlyph {
    subset_id: u32,
    subset_glyph_index: u32,
    advance: Advance,
    unicode: Option<char>,
    /// Text associated with the glyph. Once set, never changes.
    text: Option<String>,
}

#[derive(Debug)]
pub(crate) struct SubsetData {
    /// Source glyph indices. The 0th entry is always the `.notdef` glyph of the source font.
    glyphs: Vec<u32>,
    names: Option<Vec<String>>,
}

impl SubsetData {
    /// Creates a subset with the reserved `.notdef` slot and room for one more glyph.
    fn new() -> Result<Self, TryReserveError> {
        let mut glyphs = Vec::new();
        glyphs.try_reserve(2)?;
        glyphs.push(0);
        Ok(Self {
            glyphs,
            names: None,
        })
    }

    #[allow(clippy::cast_possible_truncation)] // glyph count is bounded by `max_glyphs: u32`
    fn len(&self) -> u32 {
        self.glyphs.len() as u32
    }
}

/// Family of subsets sharing a `font_id`.
pub(crate) struct SubFont<'a, F: ?Sized> {
    font: &'a F,
    font_id: u32,
    is_scaled: bool,
    is_composite: bool,
    is_user: bool,
    max_glyphs: u32,
    subsets: Vec<SubsetData>,
    glyphs: BTreeMap<u32, MappedGlyph>,
}

impl<F: ?Sized> fmt::Debug for SubFont<'_, F> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("SubFont")
            .field("font_id", &self.font_id)
            .field("is_scaled", &self.is_scaled)
            .field("is_composite", &self.is_composite)
            .field("is_user", &self.is_user)
            .field("max_glyphs", &self.max_glyphs)
            .field("subsets", &self.subsets)
            .finish_non_exhaustive()
    }
}

impl<'a, F: FontBackend + ?Sized> SubFont<'a, F> {
    fn new(
        font: &'a F,
        font_id: u32,
        is_scaled: bool,
        is_composite: bool,
        max_glyphs: u32,
    ) -> Result<Self, TryReserveError> {
        let mut subsets = Vec::new();
        subsets.try_reserve(1)?;
        subsets.push(SubsetData::new()?);
        Ok(Self {
            font,
            font_id,
            is_scaled,
            is_composite,
            is_user: font.kind() == FontKind::User,
            max_glyphs,
            subsets,
            glyphs: BTreeMap::new(),
        })
    }

    fn flavor(&self) -> SubsetFlavor {
        if !self.is_scaled {
            SubsetFlavor::Unscaled
        } else if self.is_user {
            SubsetFlavor::User
        } else {
            SubsetFlavor::Scaled
        }
    }

    /// Allocates a slot for a glyph that is not mapped yet. Either allocates the slot
    /// and records the glyph, or fails without changing anything.
    #[allow(clippy::cast_possible_truncation)] // subset count is bounded by the number of glyphs
    fn insert(
        &mut self,
        glyph: u32,
        advance: Advance,
        unicode: Option<char>,
        text: Option<String>,
    ) -> Result<(), TryReserveError> {
        let (subset_id, subset_glyph_index) = if glyph == 0 {
            // The source `.notdef` glyph occupies the reserved slot of the first subset.
            (0, 0)
        } else {
            let max_glyphs = self.max_glyphs;
            let free_subset = self
                .subsets
                .iter()
                .position(|subset| subset.len() < max_glyphs);
            if let Some(subset_id) = free_subset {
                let subset = &mut self.subsets[subset_id];
                subset.glyphs.try_reserve(1)?;
                let subset_glyph_index = subset.len();
                subset.glyphs.push(glyph);
                subset.names = None;
                (subset_id as u32, subset_glyph_index)
            } else {
                self.subsets.try_reserve(1)?;
                let mut subset = SubsetData::new()?;
                subset.glyphs.push(glyph);
                self.subsets.push(subset);
                debug!(
                    "created subset #{} for font #{}",
                    self.subsets.len() - 1,
                    self.font_id
                );
                (self.subsets.len() as u32 - 1, 1)
            }
        };

        trace!(
            "mapped glyph {glyph} to font #{}, subset #{subset_id}, index {subset_glyph_index}",
            self.font_id
        );
        let mapped = MappedGlyph {
            subset_id,
            subset_glyph_index,
            advance,
            unicode,
            text,
        };
        self.glyphs.insert(glyph, mapped);
        Ok(())
    }

    /// Associates `text` with an already mapped glyph if it has no association yet.
    fn map_text(&mut self, glyph: u32, text: Option<&str>) -> Result<bool, TryReserveError> {
        let Some(text) = text else {
            return Ok(false);
        };
        let Some(mapped) = self.glyphs.get_mut(&glyph) else {
            return Ok(false);
        };
        match &mapped.text {
            Some(existing) => Ok(existing == text),
            None => {
                mapped.text = Some(try_to_owned(text)?);
                // The glyph name may be derived from the text.
                self.subsets[mapped.subset_id as usize].names = None;
                Ok(true)
            }
        }
    }

    fn entry(&self, mapped: &MappedGlyph, utf8_is_mapped: bool) -> SubsetGlyph {
        SubsetGlyph {
            font_id: self.font_id,
            subset_id: mapped.subset_id,
            subset_glyph_index: mapped.subset_glyph_index,
            is_scaled: self.is_scaled,
            is_composite: self.is_composite,
            x_advance: mapped.advance.x,
            y_advance: mapped.advance.y,
            unicode: mapped.unicode,
            utf8_is_mapped,
        }
    }

    /// Returns the char a subset glyph represents according to the associated text or unicode.
    fn char_for(&self, source_glyph: u32) -> Option<char> {
        let mapped = self.glyphs.get(&source_glyph)?;
        mapped
            .text
            .as_deref()
            .and_then(names::single_char)
            .or(mapped.unicode)
    }

    fn build_names(&self, subset_id: usize) -> Result<Vec<String>, TryReserveError> {
        let subset = &self.subsets[subset_id];
        let mut chars = Vec::new();
        chars.try_reserve(subset.glyphs.len())?;
        chars.push(None);
        chars.extend(subset.glyphs[1..].iter().map(|&glyph| self.char_for(glyph)));
        #[allow(clippy::cast_possible_truncation)] // subset count is bounded by the number of glyphs
        let subset_id = subset_id as u32;
        Ok(names::glyph_names(self.font_id, subset_id, &chars))
    }
}

type ScaledFontKey = (FaceId, [u64; 4]);

/// Index mapping glyphs of scaled fonts to font subsets.
///
/// The index maps `(font, glyph)` pairs to `(font_id, subset_id, subset_glyph_index)` triples.
/// The mapping is 1:1 and memoized. For a new glyph:
///
/// 1. The glyph is routed to a *sub-font*: the face of the font if the glyph has an outline
///    (and the mode is not [`SubsetMode::Scaled`]), otherwise the scaled font itself.
///    Each sub-font gets the smallest unused `font_id` when first encountered.
/// 2. Within the sub-font, the smallest `subset_id` with a free slot is chosen;
///    if all subsets are full, a new one is created.
/// 3. The glyph gets the smallest unused `subset_glyph_index` in the subset. Index 0
///    of every subset is reserved for the `.notdef` glyph.
///
/// Subsets can then be enumerated with [`Self::subsets()`] and converted into font programs.
///
/// # Failures
///
/// All backend queries for a new glyph are performed before anything is allocated,
/// and the required capacity is reserved before the index is modified. Thus, a failed
/// [`Self::map_glyph()`] call leaves no partially allocated IDs behind.
pub struct SubsetIndex<'a, F: ?Sized> {
    mode: SubsetMode,
    max_glyphs_per_subset: Option<u32>,
    sub_fonts: Vec<SubFont<'a, F>>,
    unscaled_fonts: BTreeMap<FaceId, usize>,
    scaled_fonts: BTreeMap<ScaledFontKey, usize>,
}

impl<F: ?Sized> fmt::Debug for SubsetIndex<'_, F> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("SubsetIndex")
            .field("mode", &self.mode)
            .field("max_glyphs_per_subset", &self.max_glyphs_per_subset)
            .field("sub_fonts", &self.sub_fonts)
            .finish_non_exhaustive()
    }
}

impl<'a, F: FontBackend + ?Sized> SubsetIndex<'a, F> {
    /// Creates an empty index with the specified mode.
    pub fn new(mode: SubsetMode) -> Self {
        Self {
            mode,
            max_glyphs_per_subset: None,
            sub_fonts: Vec::new(),
            unscaled_fonts: BTreeMap::new(),
            scaled_fonts: BTreeMap::new(),
        }
    }

    /// Creates an index with subsets for every scaled font.
    pub fn scaled() -> Self {
        Self::new(SubsetMode::Scaled)
    }

    /// Creates an index with subsets suitable for embedding as simple fonts.
    pub fn simple() -> Self {
        Self::new(SubsetMode::Simple)
    }

    /// Creates an index with subsets suitable for embedding as composite fonts.
    pub fn composite() -> Self {
        Self::new(SubsetMode::Composite)
    }

    /// Overrides the maximum number of glyphs per subset (including the reserved `.notdef` slot)
    /// for all sub-fonts.
    ///
    /// # Panics
    ///
    /// Panics if `max_glyphs` is less than 2: such subsets could not hold any glyphs.
    #[must_use]
    pub fn with_max_glyphs_per_subset(mut self, max_glyphs: u32) -> Self {
        assert!(
            max_glyphs >= 2,
            "subsets must have room for at least 1 glyph besides .notdef"
        );
        self.max_glyphs_per_subset = Some(max_glyphs);
        self
    }

    /// Returns the subsetting mode.
    pub fn mode(&self) -> SubsetMode {
        self.mode
    }

    /// Returns the number of sub-fonts, i.e. the number of distinct `font_id`s assigned so far.
    pub fn font_count(&self) -> usize {
        self.sub_fonts.len()
    }

    /// Returns the number of subsets for the specified `font_id`, or `None` if the ID is not assigned.
    pub fn subset_count(&self, font_id: u32) -> Option<usize> {
        let sub_font = self.sub_fonts.get(font_id as usize)?;
        Some(sub_font.subsets.len())
    }

    /// Returns the total number of mapped glyphs.
    pub fn glyph_count(&self) -> usize {
        self.sub_fonts
            .iter()
            .map(|sub_font| sub_font.glyphs.len())
            .sum()
    }

    /// Checks whether the glyph of the font was mapped before.
    pub fn contains(&self, font: &F, glyph: u32) -> bool {
        self.find_mapped(font, glyph).is_some()
    }

    fn find_mapped(&self, font: &F, glyph: u32) -> Option<usize> {
        let face_id = font.face_id();
        if self.mode != SubsetMode::Scaled {
            if let Some(&idx) = self.unscaled_fonts.get(&face_id) {
                if self.sub_fonts[idx].glyphs.contains_key(&glyph) {
                    return Some(idx);
                }
            }
        }
        let &idx = self.scaled_fonts.get(&(face_id, font.matrix().key()))?;
        self.sub_fonts[idx].glyphs.contains_key(&glyph).then_some(idx)
    }

    fn max_glyphs(&self, kind: FontKind, is_scaled: bool) -> u32 {
        if let Some(max_glyphs) = self.max_glyphs_per_subset {
            max_glyphs
        } else if !is_scaled && self.mode == SubsetMode::Composite && kind != FontKind::Type1 {
            MAX_GLYPHS_PER_COMPOSITE_FONT
        } else {
            MAX_GLYPHS_PER_SIMPLE_FONT
        }
    }

    /// Maps a glyph of a scaled font to a subset.
    ///
    /// If the glyph was mapped before, returns the same mapping as before. In this case,
    /// `text` only influences the returned [`SubsetGlyph::utf8_is_mapped`] flag: a glyph keeps
    /// the first text associated with it.
    ///
    /// Otherwise, the glyph is assigned the next free slot as described in the [type docs](Self).
    /// If `text` is non-empty, it becomes the text associated with the glyph. If no text is supplied,
    /// the unicode char reported by the backend (if any) is associated with the glyph instead.
    ///
    /// # Errors
    ///
    /// - Returns [`IndexError::OutOfMemory`] if memory allocation fails.
    /// - Returns [`IndexError::Backend`] if a backend query fails.
    ///
    /// In both cases, the index is left unchanged.
    pub fn map_glyph(
        &mut self,
        font: &'a F,
        glyph: u32,
        text: Option<&str>,
    ) -> Result<SubsetGlyph, IndexError<F::Error>> {
        let text = text.filter(|text| !text.is_empty());
        if let Some(idx) = self.find_mapped(font, glyph) {
            let sub_font = &mut self.sub_fonts[idx];
            let utf8_is_mapped = sub_font.map_text(glyph, text)?;
            let mapped = &sub_font.glyphs[&glyph];
            return Ok(sub_font.entry(mapped, utf8_is_mapped));
        }

        let kind = font.kind();
        let is_scaled = self.mode == SubsetMode::Scaled
            || kind == FontKind::User
            || (glyph != 0 && !font.has_outline(glyph).map_err(IndexError::Backend)?);
        let space = if is_scaled {
            MetricSpace::Device
        } else {
            MetricSpace::Unit
        };
        let advance = font.advance(glyph, space).map_err(IndexError::Backend)?;
        let unicode = font.unicode(glyph).map_err(IndexError::Backend)?;

        let (text, utf8_is_mapped) = if let Some(text) = text {
            (Some(try_to_owned(text)?), true)
        } else if let Some(ch) = unicode {
            (Some(try_to_owned(ch.encode_utf8(&mut [0; 4]))?), false)
        } else {
            (None, false)
        };

        let face_id = font.face_id();
        let existing_idx = if is_scaled {
            self.scaled_fonts
                .get(&(face_id, font.matrix().key()))
                .copied()
        } else {
            self.unscaled_fonts.get(&face_id).copied()
        };

        let idx = if let Some(idx) = existing_idx {
            let sub_font = &mut self.sub_fonts[idx];
            sub_font.insert(glyph, advance, unicode, text)?;
            idx
        } else {
            self.sub_fonts.try_reserve(1)?;
            let idx = self.sub_fonts.len();
            let font_id = u32::try_from(idx).map_err(|_| IndexError::OutOfMemory)?;
            let is_composite = !is_scaled && self.mode == SubsetMode::Composite;
            let max_glyphs = self.max_glyphs(kind, is_scaled);
            let mut sub_font = SubFont::new(font, font_id, is_scaled, is_composite, max_glyphs)?;
            sub_font.insert(glyph, advance, unicode, text)?;

            debug!(
                "created {} font #{font_id} for face {face_id:?} (max glyphs per subset: {max_glyphs})",
                if is_scaled { "scaled" } else { "unscaled" }
            );
            self.sub_fonts.push(sub_font);
            if is_scaled {
                self.scaled_fonts
                    .insert((face_id, font.matrix().key()), idx);
            } else {
                self.unscaled_fonts.insert(face_id, idx);
            }
            idx
        };

        let sub_font = &self.sub_fonts[idx];
        Ok(sub_font.entry(&sub_font.glyphs[&glyph], utf8_is_mapped))
    }

    /// Enumerates subsets of the specified flavor, ordered by `font_id` and then by `subset_id`.
    ///
    /// The returned iterator is lazy; it can be created any number of times and yields
    /// the same subsets as long as the index is not modified in between.
    pub fn subsets(&self, flavor: SubsetFlavor) -> Subsets<'_, 'a, F> {
        Subsets::new(&self.sub_fonts, flavor)
    }

    /// Builds glyph names for all glyphs in all subsets. The names can then be accessed
    /// via [`Subset::glyph_names()`].
    ///
    /// Index 0 of each subset is named `.notdef`. Other glyphs are named after the char
    /// they represent (the associated text if it is a single char, or the char reported by
    /// the backend when the glyph was mapped): the standard Adobe name if there is one (e.g., `A`, `space` or `eacute`),
    /// otherwise `uniXXXX` (or `uXXXXX` outside the Basic Multilingual Plane). Glyphs without
    /// a char, or with a char already named in the subset, are named
    /// `g{font_id}_{subset_id}_{subset_glyph_index}`.
    ///
    /// Building names is idempotent. Mapping new glyphs invalidates names of the affected subsets.
    ///
    /// # Errors
    ///
    /// - Returns [`IndexError::Unsupported`] if a font backend does not support
    ///   mapping glyphs to unicode.
    /// - Returns [`IndexError::OutOfMemory`] if memory allocation fails.
    ///
    /// On error, no names are changed.
    pub fn build_glyph_names(&mut self) -> Result<(), IndexError<F::Error>> {
        if let Some(sub_font) = self
            .sub_fonts
            .iter()
            .find(|sub_font| !sub_font.font.supports_unicode_mapping())
        {
            debug!(
                "font #{} does not support glyph-to-unicode mapping",
                sub_font.font_id
            );
            return Err(IndexError::Unsupported);
        }

        let mut all_names = Vec::new();
        all_names.try_reserve(self.sub_fonts.len())?;
        for sub_font in &self.sub_fonts {
            let mut font_names = Vec::new();
            font_names.try_reserve(sub_font.subsets.len())?;
            for subset_id in 0..sub_font.subsets.len() {
                font_names.push(sub_font.build_names(subset_id)?);
            }
            all_names.push(font_names);
        }

        for (sub_font, font_names) in self.sub_fonts.iter_mut().zip(all_names) {
            for (subset, names) in sub_font.subsets.iter_mut().zip(font_names) {
                subset.names = Some(names);
            }
        }
        debug!("built glyph names for {} fonts", self.sub_fonts.len());
        Ok(())
    }
}

fn try_to_owned(text: &str) -> Result<String, TryReserveError> {
    let mut owned = String::new();
    owned.try_reserve(text.len())?;
    owned.push_str(text);
    Ok(owned)
}
