use core::{fmt, ops};

use crate::{alloc::TryReserveError, TableTag};

/// Kind of a font [`ParseError`].
#[derive(Debug)]
#[non_exhaustive]
pub enum ParseErrorKind {
    /// Unexpected end of the font data.
    UnexpectedEof,
    /// Unexpected font version.
    UnexpectedFontVersion,
    /// Missing required font table (e.g., `head`).
    MissingTable,
    /// No supported subtable in the `cmap` table.
    NoSupportedCmap,
    /// Offset inferred from the table data is out of bounds.
    OffsetOutOfBounds(usize),
    /// Range inferred from the table data is out of bounds.
    RangeOutOfBounds {
        /// Inferred range.
        range: ops::Range<usize>,
        /// Length of the indexed data.
        len: usize,
    },
    /// Unexpected table version.
    UnexpectedTableVersion {
        /// Version read from the table.
        version: u32,
    },
    /// Unexpected table length.
    UnexpectedTableLen {
        /// Expected length.
        expected: usize,
        /// Actual length.
        actual: usize,
    },
    /// Unexpected table format (e.g., for a `cmap` subtable).
    UnexpectedTableFormat {
        /// Format read from the table.
        format: u16,
    },
    /// Unexpected `indexToLocFormat` value in the `head` table.
    UnexpectedLocaFormat(u16),
    /// Glyph index is not less than the number of glyphs in the font.
    GlyphOutOfRange {
        /// Requested glyph index.
        glyph: u32,
        /// Number of glyphs in the font.
        glyph_count: u16,
    },
    /// Composite glyphs are nested too deeply (or form a cycle).
    CompositeTooDeep,
    /// Unexpected `unitsPerEm` value in the `head` table.
    UnexpectedUnitsPerEm(u16),
}

impl fmt::Display for ParseErrorKind {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnexpectedEof => formatter.write_str("unexpected end of the font data"),
            Self::UnexpectedFontVersion => formatter.write_str("unexpected font version"),
            Self::MissingTable => formatter.write_str("missing required font table"),
            Self::NoSupportedCmap => {
                formatter.write_str("no supported subtable in the `cmap` table")
            }
            Self::OffsetOutOfBounds(val) => {
                write!(
                    formatter,
                    "offset ({val}) inferred from the table data is out of bounds"
                )
            }
            Self::RangeOutOfBounds { range, len } => {
                write!(
                    formatter,
                    "range ({range:?}) inferred from the table data is out of bounds (..{len})"
                )
            }
            Self::UnexpectedTableVersion { version } => {
                write!(formatter, "unexpected table version ({version})")
            }
            Self::UnexpectedTableLen { expected, actual } => {
                write!(
                    formatter,
                    "unexpected table length: expected {expected}, got {actual}"
                )
            }
            Self::UnexpectedTableFormat { format } => {
                write!(formatter, "unexpected table format ({format})")
            }
            Self::UnexpectedLocaFormat(val) => {
                write!(formatter, "unexpected `indexToLocFormat` ({val})")
            }
            Self::GlyphOutOfRange { glyph, glyph_count } => {
                write!(
                    formatter,
                    "glyph {glyph} is out of range (the font has {glyph_count} glyphs)"
                )
            }
            Self::CompositeTooDeep => {
                formatter.write_str("composite glyphs are nested too deeply")
            }
            Self::UnexpectedUnitsPerEm(val) => {
                write!(formatter, "unexpected `unitsPerEm` ({val})")
            }
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for ParseErrorKind {}

/// Errors that can occur when parsing an OpenType [`Font`](crate::Font).
#[derive(Debug)]
pub struct ParseError {
    pub(crate) kind: ParseErrorKind,
    pub(crate) offset: usize,
    pub(crate) table: Option<TableTag>,
}

impl fmt::Display for ParseError {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(table) = self.table {
            write!(formatter, "[{table}] ")?;
        }
        if self.offset > 0 {
            write!(formatter, "{}: ", self.offset)?;
        }
        fmt::Display::fmt(&self.kind, formatter)
    }
}

#[cfg(feature = "std")]
impl std::error::Error for ParseError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.kind)
    }
}

impl ParseError {
    pub(crate) fn new(kind: ParseErrorKind) -> Self {
        Self {
            kind,
            offset: 0,
            table: None,
        }
    }

    pub(crate) fn missing_table(tag: TableTag) -> Self {
        Self {
            kind: ParseErrorKind::MissingTable,
            offset: 0,
            table: Some(tag),
        }
    }

    pub(crate) fn with_table(mut self, tag: TableTag) -> Self {
        self.table.get_or_insert(tag);
        self
    }

    /// Gets the error kind.
    pub fn kind(&self) -> &ParseErrorKind {
        &self.kind
    }

    /// Gets the table this error relates to.
    pub fn table(&self) -> Option<TableTag> {
        self.table
    }

    /// Gets the offset in the font data.
    pub fn offset(&self) -> usize {
        self.offset
    }
}

/// Errors returned by [`SubsetIndex`](crate::SubsetIndex) operations.
///
/// A failed operation never corrupts mappings committed before it; retrying the operation
/// with the same inputs is safe.
#[derive(Debug)]
#[non_exhaustive]
pub enum IndexError<E> {
    /// Memory allocation failed while growing the index.
    OutOfMemory,
    /// The font backend lacks a capability required by the operation
    /// (e.g., mapping glyph indices to unicode).
    Unsupported,
    /// Error returned by the font backend, passed through unchanged.
    Backend(E),
}

impl<E> From<TryReserveError> for IndexError<E> {
    fn from(_: TryReserveError) -> Self {
        Self::OutOfMemory
    }
}

impl<E: fmt::Display> fmt::Display for IndexError<E> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OutOfMemory => formatter.write_str("out of memory"),
            Self::Unsupported => {
                formatter.write_str("operation is not supported by the font backend")
            }
            Self::Backend(err) => write!(formatter, "font backend error: {err}"),
        }
    }
}

#[cfg(feature = "std")]
impl<E: std::error::Error + 'static> std::error::Error for IndexError<E> {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Backend(err) => Some(err),
            Self::OutOfMemory | Self::Unsupported => None,
        }
    }
}

/// Errors that can occur when generating a [`FontProgram`](crate::FontProgram) for a subset.
#[derive(Debug)]
#[non_exhaustive]
pub enum GenerateError {
    /// The subset cannot be represented in the requested format.
    Unsupported(&'static str),
    /// The subset has more glyphs than the requested format can hold.
    TooManyGlyphs {
        /// Number of glyphs in the subset (including `.notdef`).
        count: usize,
        /// Maximum number of glyphs supported by the format.
        max: usize,
    },
    /// Error reading the source font.
    Parse(ParseError),
}

impl From<ParseError> for GenerateError {
    fn from(err: ParseError) -> Self {
        Self::Parse(err)
    }
}

impl fmt::Display for GenerateError {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unsupported(reason) => write!(formatter, "unsupported subset: {reason}"),
            Self::TooManyGlyphs { count, max } => {
                write!(
                    formatter,
                    "subset has {count} glyphs, while the format supports at most {max}"
                )
            }
            Self::Parse(err) => write!(formatter, "failed reading font: {err}"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for GenerateError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Parse(err) => Some(err),
            Self::Unsupported(_) | Self::TooManyGlyphs { .. } => None,
        }
    }
}
