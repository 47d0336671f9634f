//! `FontBackend` implementation for OpenType fonts.

use super::Font;
use crate::{
    backend::{Advance, FaceId, FontBackend, FontKind, FontMatrix, MetricSpace},
    ParseError,
};

/// [`Font`] instantiated at a particular scale. Implements [`FontBackend`], so it can be used
/// with [`SubsetIndex`](crate::SubsetIndex).
///
/// Several `ScaledFont`s may share a face (i.e., a [`Font`] together with its [`FaceId`]).
/// Glyphs of such fonts are placed into the same subsets.
#[derive(Debug, Clone, Copy)]
pub struct ScaledFont<'a> {
    font: &'a Font<'a>,
    face_id: FaceId,
    matrix: FontMatrix,
}

impl<'a> ScaledFont<'a> {
    /// Creates a scaled font. `face_id` must uniquely identify `font` among the fonts
    /// passed to the same index.
    pub fn new(font: &'a Font<'a>, face_id: FaceId, matrix: FontMatrix) -> Self {
        Self {
            font,
            face_id,
            matrix,
        }
    }

    /// Returns the underlying font.
    pub fn font(&self) -> &'a Font<'a> {
        self.font
    }
}

impl FontBackend for ScaledFont<'_> {
    type Error = ParseError;

    fn face_id(&self) -> FaceId {
        self.face_id
    }

    fn matrix(&self) -> FontMatrix {
        self.matrix
    }

    fn kind(&self) -> FontKind {
        FontKind::Outline
    }

    fn has_outline(&self, glyph: u32) -> Result<bool, Self::Error> {
        self.font.check_glyph(glyph)?;
        Ok(true)
    }

    fn advance(&self, glyph: u32, space: MetricSpace) -> Result<Advance, Self::Error> {
        let (advance, _) = self.font.h_metrics(glyph)?;
        let x = f64::from(advance) / f64::from(self.font.units_per_em());
        Ok(match space {
            MetricSpace::Unit => Advance { x, y: 0.0 },
            MetricSpace::Device => {
                let (x, y) = self.matrix.transform_distance(x, 0.0);
                Advance { x, y }
            }
        })
    }

    fn unicode(&self, glyph: u32) -> Result<Option<char>, Self::Error> {
        self.font.check_glyph(glyph)?;
        Ok(self.font.glyph_char(glyph))
    }

    fn supports_unicode_mapping(&self) -> bool {
        true
    }
}
