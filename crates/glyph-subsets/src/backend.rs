//! Font backend interface used by the subsetting index.

use core::fmt;

/// Identifier of a font face, shared by all scaled instances of the face.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FaceId(pub u64);

/// Linear part of the font-space to device-space transform of a scaled font.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FontMatrix {
    /// `xx` component.
    pub xx: f64,
    /// `yx` component.
    pub yx: f64,
    /// `xy` component.
    pub xy: f64,
    /// `yy` component.
    pub yy: f64,
}

impl FontMatrix {
    /// Identity transform (a font with 1 unit per em).
    pub const IDENTITY: Self = Self::scale(1.0);

    /// Creates a uniform scale transform for the specified font size.
    pub const fn scale(size: f64) -> Self {
        Self {
            xx: size,
            yx: 0.0,
            xy: 0.0,
            yy: size,
        }
    }

    /// Transforms a distance vector.
    pub fn transform_distance(&self, x: f64, y: f64) -> (f64, f64) {
        (self.xx * x + self.xy * y, self.yx * x + self.yy * y)
    }

    /// Bitwise key used to compare scaled fonts. `-0.0` and `0.0` are considered equal.
    pub(crate) fn key(&self) -> [u64; 4] {
        [self.xx, self.yx, self.xy, self.yy].map(|val| (val + 0.0).to_bits())
    }
}

/// Category of a font as reported by its backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FontKind {
    /// Font with scalable glyph outlines.
    Outline,
    /// Legacy Type 1 font with scalable outlines. Composite subsets of such fonts
    /// are capped at 256 glyphs.
    Type1,
    /// Bitmap font; glyphs are tied to a specific scale.
    Bitmap,
    /// Font with glyphs supplied by user code. Always subset per scaled font.
    User,
}

/// Coordinate space for glyph advances.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricSpace {
    /// Device space of the scaled font.
    Device,
    /// Unhinted font space with 1 unit per em.
    Unit,
}

/// Glyph advance.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Advance {
    /// Horizontal component.
    pub x: f64,
    /// Vertical component.
    pub y: f64,
}

/// Font backend queried by the [`SubsetIndex`](crate::SubsetIndex).
///
/// An implementation represents a single *scaled* font: a face together with its scale.
/// Two fonts are subset together iff they have the same [`face_id()`](Self::face_id)
/// and, for glyphs subset per scaled font, the same [`matrix()`](Self::matrix).
pub trait FontBackend {
    /// Error returned by backend queries. Passed through the index unchanged.
    type Error: fmt::Debug + fmt::Display;

    /// Returns the identifier of the font face.
    fn face_id(&self) -> FaceId;

    /// Returns the font matrix of this scaled font.
    fn matrix(&self) -> FontMatrix;

    /// Returns the category of the font.
    fn kind(&self) -> FontKind;

    /// Checks whether the glyph has a scalable outline. Glyphs without an outline
    /// are subset per scaled font.
    ///
    /// The default implementation returns `true` for [`FontKind::Outline`] and [`FontKind::Type1`]
    /// fonts.
    ///
    /// # Errors
    ///
    /// Returns a backend error if the glyph cannot be loaded.
    fn has_outline(&self, glyph: u32) -> Result<bool, Self::Error> {
        let _ = glyph;
        Ok(matches!(self.kind(), FontKind::Outline | FontKind::Type1))
    }

    /// Returns the advance of the glyph in the specified space.
    ///
    /// # Errors
    ///
    /// Returns a backend error if the glyph metrics cannot be loaded.
    fn advance(&self, glyph: u32, space: MetricSpace) -> Result<Advance, Self::Error>;

    /// Returns the unicode char rendered by the glyph, if known.
    ///
    /// The default implementation returns `Ok(None)`.
    ///
    /// # Errors
    ///
    /// Returns a backend error if the font data cannot be read.
    fn unicode(&self, glyph: u32) -> Result<Option<char>, Self::Error> {
        let _ = glyph;
        Ok(None)
    }

    /// Checks whether [`unicode()`](Self::unicode) provides a glyph-to-unicode mapping.
    /// If not, building glyph names is unsupported.
    ///
    /// The default implementation returns `false`.
    fn supports_unicode_mapping(&self) -> bool {
        false
    }
}
