//! Enumeration of subsets in a `SubsetIndex`.

use core::{fmt, iter};

use super::{MappedGlyph, SubFont, SubsetData};
use crate::{
    alloc::{String, Vec},
    backend::{Advance, FontBackend},
    names,
};

/// Flavor of subsets enumerated by [`SubsetIndex::subsets()`](crate::SubsetIndex::subsets()).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubsetFlavor {
    /// Subsets of scaled fonts, except for user fonts.
    Scaled,
    /// Subsets of font faces (i.e., of glyphs with outlines).
    Unscaled,
    /// Subsets of user fonts.
    User,
}

/// View of a single subset in a [`SubsetIndex`](crate::SubsetIndex).
pub struct Subset<'i, 'a, F: ?Sized> {
    sub_font: &'i SubFont<'a, F>,
    subset_id: u32,
    data: &'i SubsetData,
}

impl<F: ?Sized> Clone for Subset<'_, '_, F> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<F: ?Sized> Copy for Subset<'_, '_, F> {}

impl<F: ?Sized> fmt::Debug for Subset<'_, '_, F> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("Subset")
            .field("font_id", &self.sub_font.font_id)
            .field("subset_id", &self.subset_id)
            .field("glyphs", &self.data.glyphs)
            .finish_non_exhaustive()
    }
}

impl<'i, 'a, F: FontBackend + ?Sized> Subset<'i, 'a, F> {
    /// Returns the font this subset was created for. For unscaled subsets, this is the first
    /// scaled font of the face passed to the index.
    pub fn font(&self) -> &'a F {
        self.sub_font.font
    }

    /// Returns the ID of the sub-font.
    pub fn font_id(&self) -> u32 {
        self.sub_font.font_id
    }

    /// Returns the ID of this subset within the sub-font.
    pub fn subset_id(&self) -> u32 {
        self.subset_id
    }

    /// Checks whether glyphs in this subset are tied to a particular scaled font.
    pub fn is_scaled(&self) -> bool {
        self.sub_font.is_scaled
    }

    /// Checks whether this subset is meant for a composite font encoding.
    pub fn is_composite(&self) -> bool {
        self.sub_font.is_composite
    }

    /// Checks whether this subset belongs to a user font.
    pub fn is_user(&self) -> bool {
        self.sub_font.is_user
    }

    /// Returns the maximum number of glyphs this subset can hold (including `.notdef`).
    pub fn max_glyphs(&self) -> u32 {
        self.sub_font.max_glyphs
    }

    /// Returns source glyph indices, ordered by the subset glyph index. The 0th glyph
    /// is always the `.notdef` glyph (source glyph 0).
    pub fn glyphs(&self) -> &'i [u32] {
        &self.data.glyphs
    }

    /// Returns the number of glyphs in this subset (including `.notdef`). Always positive.
    pub fn glyph_count(&self) -> usize {
        self.data.glyphs.len()
    }

    fn mapped(&self, index: usize) -> Option<&'i MappedGlyph> {
        let source_glyph = *self.data.glyphs.get(index)?;
        let mapped = self.sub_font.glyphs.get(&source_glyph)?;
        (mapped.subset_id == self.subset_id).then_some(mapped)
    }

    /// Returns the unicode char reported by the backend for the glyph with the specified
    /// subset index.
    pub fn unicode(&self, index: usize) -> Option<char> {
        self.mapped(index)?.unicode
    }

    /// Returns text associated with the glyph with the specified subset index.
    pub fn text(&self, index: usize) -> Option<&'i str> {
        self.mapped(index)?.text.as_deref()
    }

    /// Returns the advance of the glyph with the specified subset index, as it was returned
    /// when mapping the glyph.
    pub fn advance(&self, index: usize) -> Option<Advance> {
        Some(self.mapped(index)?.advance)
    }

    /// Returns the char the glyph with the specified subset index represents: the associated
    /// text if it consists of a single char, otherwise the unicode char reported by the backend.
    pub fn char_at(&self, index: usize) -> Option<char> {
        if index == 0 {
            return None;
        }
        let source_glyph = *self.data.glyphs.get(index)?;
        self.sub_font.char_for(source_glyph)
    }

    /// Returns glyph names built by [`SubsetIndex::build_glyph_names()`](crate::SubsetIndex::build_glyph_names()),
    /// or `None` if names were not built or were invalidated by mapping new glyphs.
    pub fn glyph_names(&self) -> Option<&'i [String]> {
        self.data.names.as_deref()
    }

    /// Returns glyph names for this subset: either built ones, or names derived from
    /// chars recorded when mapping glyphs.
    pub(crate) fn names_or_derived(&self) -> Vec<String> {
        if let Some(names) = self.glyph_names() {
            return names.to_vec();
        }
        let chars: Vec<_> = (0..self.glyph_count()).map(|i| self.char_at(i)).collect();
        names::glyph_names(self.font_id(), self.subset_id, &chars)
    }
}

/// Iterator over subsets returned by [`SubsetIndex::subsets()`](crate::SubsetIndex::subsets()).
pub struct Subsets<'i, 'a, F: ?Sized> {
    sub_fonts: &'i [SubFont<'a, F>],
    flavor: SubsetFlavor,
    font_idx: usize,
    subset_idx: usize,
}

impl<F: ?Sized> fmt::Debug for Subsets<'_, '_, F> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("Subsets")
            .field("flavor", &self.flavor)
            .field("font_idx", &self.font_idx)
            .field("subset_idx", &self.subset_idx)
            .finish_non_exhaustive()
    }
}

impl<'i, 'a, F: FontBackend + ?Sized> Subsets<'i, 'a, F> {
    pub(super) fn new(sub_fonts: &'i [SubFont<'a, F>], flavor: SubsetFlavor) -> Self {
        Self {
            sub_fonts,
            flavor,
            font_idx: 0,
            subset_idx: 0,
        }
    }
}

impl<'i, 'a, F: FontBackend + ?Sized> Iterator for Subsets<'i, 'a, F> {
    type Item = Subset<'i, 'a, F>;

    #[allow(clippy::cast_possible_truncation)] // subset count is bounded by the number of glyphs
    fn next(&mut self) -> Option<Self::Item> {
        while let Some(sub_font) = self.sub_fonts.get(self.font_idx) {
            if sub_font.flavor() == self.flavor {
                if let Some(data) = sub_font.subsets.get(self.subset_idx) {
                    let subset_id = self.subset_idx as u32;
                    self.subset_idx += 1;
                    return Some(Subset {
                        sub_font,
                        subset_id,
                        data,
                    });
                }
            }
            self.font_idx += 1;
            self.subset_idx = 0;
        }
        None
    }
}

impl<F: FontBackend + ?Sized> iter::FusedIterator for Subsets<'_, '_, F> {}
