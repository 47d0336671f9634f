//! Glyph subsetting for embedding fonts into documents.
//!
//! Document formats such as PDF and PostScript address glyphs of embedded fonts with small,
//! dense indices, and "simple" fonts can only hold 256 glyphs at all. This crate maps glyphs
//! of any number of fonts (addressed by arbitrarily large and sparse glyph indices) onto a
//! sequence of bounded-size font subsets, and produces embeddable font programs for them.
//!
//! # Overview
//!
//! - [`SubsetIndex`] owns the mapping from `(font, glyph)` pairs to
//!   `(font_id, subset_id, subset_glyph_index)` triples. Slot 0 of every subset is reserved
//!   for the `.notdef` glyph.
//! - [`FontBackend`] is the interface the index uses to query fonts (identity, advances,
//!   unicode mapping).
//! - [`Font`] reads OpenType fonts with TrueType outlines; [`ScaledFont`] wraps it into
//!   a [`FontBackend`].
//! - [`FontProgramKind`] generates Type 1, CFF, TrueType or WOFF2 font programs for
//!   enumerated [`Subset`]s.
//!
//! # Crate features
//!
//! ## `std`
//!
//! *(On by default)*
//!
//! Enables [`Error`](std::error::Error) implementations for the error types. Without this feature,
//! the crate is `no_std`-compatible (but requires an allocator).
//!
//! # Examples
//!
//! ```
//! use glyph_subsets::{
//!     Advance, FaceId, FontBackend, FontKind, FontMatrix, MetricSpace, SubsetFlavor, SubsetIndex,
//! };
//!
//! /// Monospace outline font where glyph `n` renders `'A' + n - 1`.
//! struct MonoFont;
//!
//! impl FontBackend for MonoFont {
//!     type Error = core::convert::Infallible;
//!
//!     fn face_id(&self) -> FaceId {
//!         FaceId(1)
//!     }
//!
//!     fn matrix(&self) -> FontMatrix {
//!         FontMatrix::scale(12.0)
//!     }
//!
//!     fn kind(&self) -> FontKind {
//!         FontKind::Outline
//!     }
//!
//!     fn advance(&self, _glyph: u32, space: MetricSpace) -> Result<Advance, Self::Error> {
//!         Ok(match space {
//!             MetricSpace::Unit => Advance { x: 0.6, y: 0.0 },
//!             MetricSpace::Device => Advance { x: 7.2, y: 0.0 },
//!         })
//!     }
//! }
//!
//! let font = MonoFont;
//! let mut index = SubsetIndex::simple();
//! let a = index.map_glyph(&font, 1, Some("A"))?;
//! assert_eq!((a.font_id, a.subset_id, a.subset_glyph_index), (0, 0, 1));
//! assert!(a.utf8_is_mapped);
//! // Mapping is memoized.
//! assert_eq!(index.map_glyph(&font, 1, Some("A"))?, a);
//!
//! let subsets: Vec<_> = index.subsets(SubsetFlavor::Unscaled).collect();
//! assert_eq!(subsets.len(), 1);
//! assert_eq!(subsets[0].glyphs(), [0, 1]);
//! # Ok::<_, glyph_subsets::IndexError<core::convert::Infallible>>(())
//! ```

#![cfg_attr(not(feature = "std"), no_std)]
#![doc(html_root_url = "https://docs.rs/glyph-subsets/0.1.0")]

extern crate alloc as std_alloc;

mod backend;
mod errors;
mod font;
mod index;
mod names;
#[cfg(test)]
pub(crate) mod tests;
mod write;

/// Items re-exported from the `alloc` crate, so that the crate reads the same with and without `std`.
mod alloc {
    pub(crate) use std_alloc::{
        boxed::Box,
        collections::{BTreeMap, BTreeSet, TryReserveError},
        format,
        string::{String, ToString},
        vec,
        vec::Vec,
    };
}

pub use crate::{
    backend::{Advance, FaceId, FontBackend, FontKind, FontMatrix, MetricSpace},
    errors::{GenerateError, IndexError, ParseError, ParseErrorKind},
    font::{Font, ScaledFont, TableTag},
    index::{Subset, SubsetFlavor, SubsetGlyph, SubsetIndex, SubsetMode, Subsets},
    names::standard_glyph_name,
    write::{EexecEncoding, FontProgram, FontProgramKind, Type1Segments},
};

#[cfg(doctest)]
doc_comment::doctest!("../README.md");
