//! `Glyph` and related types.

use super::Cursor;
use crate::{alloc::Vec, errors::ParseErrorKind, ParseError};

#[derive(Debug)]
pub(crate) enum Glyph<'a> {
    Empty,
    Simple(&'a [u8]),
    Composite {
        /// xMin, yMin, xMax, yMax
        header: [u8; 8],
        components: Vec<GlyphComponent>,
        /// Optional instructions after the last component descriptor
        instructions: &'a [u8],
    },
}

impl<'a> Glyph<'a> {
    pub(super) fn new(raw: Cursor<'a>) -> Result<Self, ParseError> {
        if raw.bytes.is_empty() {
            return Ok(Self::Empty);
        }

        let mut cursor = raw;
        let number_of_contours = cursor.read_u16()?;
        if number_of_contours > i16::MAX as u16 {
            // Composite glyph
            let header = cursor.read_byte_array::<8>()?;
            let mut has_more_components = true;
            let mut components = Vec::with_capacity(1);
            while has_more_components {
                let (component, new_has_more_components) = GlyphComponent::new(&mut cursor)?;
                components.push(component);
                has_more_components = new_has_more_components;
            }
            Ok(Self::Composite {
                header,
                components,
                instructions: cursor.bytes,
            })
        } else {
            // Simple glyph
            Ok(Self::Simple(raw.bytes))
        }
    }
}

#[derive(Debug)]
pub(crate) struct GlyphComponent {
    pub(crate) flags: u16,
    pub(crate) glyph_idx: u16,
    pub(crate) args: GlyphComponentArgs,
    pub(crate) transform: TransformData,
}

impl GlyphComponent {
    const ARG_1_AND_2_ARE_WORDS: u16 = 0x0001;
    const ARGS_ARE_XY_VALUES: u16 = 0x0002;

    fn new(cursor: &mut Cursor<'_>) -> Result<(Self, bool), ParseError> {
        const WE_HAVE_A_SCALE: u16 = 0x008;
        const MORE_COMPONENTS: u16 = 0x0020;
        const WE_HAVE_AN_X_AND_Y_SCALE: u16 = 0x0040;
        const WE_HAVE_A_TWO_BY_TWO: u16 = 0x0080;

        let flags = cursor.read_u16()?;
        let glyph_idx = cursor.read_u16()?;
        let args = if flags & Self::ARG_1_AND_2_ARE_WORDS != 0 {
            GlyphComponentArgs::U32(cursor.read_u32()?)
        } else {
            GlyphComponentArgs::U16(cursor.read_u16()?)
        };
        let transform = if flags & WE_HAVE_A_SCALE != 0 {
            TransformData::Scale(cursor.read_u16()?)
        } else if flags & WE_HAVE_AN_X_AND_Y_SCALE != 0 {
            TransformData::TwoScales([cursor.read_u16()?, cursor.read_u16()?])
        } else if flags & WE_HAVE_A_TWO_BY_TWO != 0 {
            TransformData::Affine([
                cursor.read_u16()?,
                cursor.read_u16()?,
                cursor.read_u16()?,
                cursor.read_u16()?,
            ])
        } else {
            TransformData::None
        };
        let this = Self {
            flags,
            glyph_idx,
            args,
            transform,
        };

        let has_more_components = flags & MORE_COMPONENTS != 0;
        Ok((this, has_more_components))
    }

    /// Returns the component transform, or `None` if the component is positioned by matching points.
    #[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)] // intentional
    pub(super) fn transform(&self) -> Option<Transform> {
        if self.flags & Self::ARGS_ARE_XY_VALUES == 0 {
            return None;
        }
        let (dx, dy) = match self.args {
            GlyphComponentArgs::U32(args) => ((args >> 16) as u16 as i16, args as u16 as i16),
            GlyphComponentArgs::U16(args) => {
                let [x, y] = args.to_be_bytes();
                (i16::from(x as i8), i16::from(y as i8))
            }
        };
        Some(Transform {
            dx: dx.into(),
            dy: dy.into(),
            ..self.transform_without_offset()
        })
    }

    pub(super) fn transform_without_offset(&self) -> Transform {
        let [xx, yx, xy, yy] = match self.transform {
            TransformData::None => [1.0, 0.0, 0.0, 1.0],
            TransformData::Scale(scale) => {
                let scale = f2dot14(scale);
                [scale, 0.0, 0.0, scale]
            }
            TransformData::TwoScales([x, y]) => [f2dot14(x), 0.0, 0.0, f2dot14(y)],
            TransformData::Affine([xx, yx, xy, yy]) => {
                [f2dot14(xx), f2dot14(yx), f2dot14(xy), f2dot14(yy)]
            }
        };
        Transform {
            xx,
            yx,
            xy,
            yy,
            dx: 0.0,
            dy: 0.0,
        }
    }
}

#[allow(clippy::cast_possible_wrap)] // intentional
fn f2dot14(raw: u16) -> f64 {
    f64::from(raw as i16) / 16_384.0
}

#[derive(Debug)]
pub(crate) enum GlyphComponentArgs {
    U16(u16),
    U32(u32),
}

#[derive(Debug)]
pub(crate) enum TransformData {
    None,
    Scale(u16),
    TwoScales([u16; 2]),
    /// `xscale`, `scale01`, `scale10`, `yscale`
    Affine([u16; 4]),
}

/// [`Glyph`] together with metrics read from the `hmtx` table.
#[derive(Debug)]
pub(crate) struct GlyphWithMetrics<'a> {
    pub(crate) inner: Glyph<'a>,
    pub(crate) advance: u16,
    pub(crate) lsb: u16,
}

/// Affine transform applied to composite glyph components.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(super) struct Transform {
    xx: f64,
    yx: f64,
    xy: f64,
    yy: f64,
    dx: f64,
    dy: f64,
}

impl Transform {
    pub(super) const IDENTITY: Self = Self {
        xx: 1.0,
        yx: 0.0,
        xy: 0.0,
        yy: 1.0,
        dx: 0.0,
        dy: 0.0,
    };

    /// Returns a transform equivalent to applying `inner` and then `self`.
    pub(super) fn compose(&self, inner: Self) -> Self {
        Self {
            xx: self.xx * inner.xx + self.xy * inner.yx,
            yx: self.yx * inner.xx + self.yy * inner.yx,
            xy: self.xx * inner.xy + self.xy * inner.yy,
            yy: self.yx * inner.xy + self.yy * inner.yy,
            dx: self.xx * inner.dx + self.xy * inner.dy + self.dx,
            dy: self.yx * inner.dx + self.yy * inner.dy + self.dy,
        }
    }

    fn apply(&self, x: f64, y: f64) -> Point {
        Point {
            x: self.xx * x + self.xy * y + self.dx,
            y: self.yx * x + self.yy * y + self.dy,
        }
    }
}

/// Point in font units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Point {
    pub(crate) x: f64,
    pub(crate) y: f64,
}

impl Point {
    fn midpoint(self, other: Self) -> Self {
        Self {
            x: (self.x + other.x) / 2.0,
            y: (self.y + other.y) / 2.0,
        }
    }

    /// Moves this point 2/3 of the way towards `target`.
    fn lerp_two_thirds(self, target: Self) -> Self {
        Self {
            x: self.x + (target.x - self.x) * 2.0 / 3.0,
            y: self.y + (target.y - self.y) * 2.0 / 3.0,
        }
    }
}

/// Single element of a glyph path. Curves are cubic.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum PathElement {
    MoveTo(Point),
    LineTo(Point),
    CurveTo(Point, Point, Point),
    Close,
}

#[derive(Debug, Clone, Copy)]
struct ContourPoint {
    point: Point,
    on_curve: bool,
}

/// Decodes the points of a simple glyph.
fn simple_glyph_contours(raw: &[u8]) -> Result<(Vec<u16>, Vec<ContourPoint>), ParseError> {
    const ON_CURVE_POINT: u8 = 0x01;
    const X_SHORT_VECTOR: u8 = 0x02;
    const Y_SHORT_VECTOR: u8 = 0x04;
    const REPEAT_FLAG: u8 = 0x08;
    const X_IS_SAME_OR_POSITIVE: u8 = 0x10;
    const Y_IS_SAME_OR_POSITIVE: u8 = 0x20;

    let mut cursor = Cursor::new(raw);
    let contour_count = cursor.read_u16()?;
    cursor.skip(8)?; // bounding box
    let end_points = (0..contour_count)
        .map(|_| cursor.read_u16())
        .collect::<Result<Vec<_>, _>>()?;
    let Some(&last_point) = end_points.last() else {
        return Ok((end_points, Vec::new()));
    };
    let point_count = usize::from(last_point) + 1;
    let instructions_len = usize::from(cursor.read_u16()?);
    cursor.skip(instructions_len)?;

    let mut flags = Vec::with_capacity(point_count);
    while flags.len() < point_count {
        let flag = cursor.read_u8()?;
        let repeat_count = if flag & REPEAT_FLAG != 0 {
            usize::from(cursor.read_u8()?) + 1
        } else {
            1
        };
        if flags.len() + repeat_count > point_count {
            return Err(cursor.err(ParseErrorKind::UnexpectedTableLen {
                expected: point_count,
                actual: flags.len() + repeat_count,
            }));
        }
        flags.extend(core::iter::repeat_n(flag, repeat_count));
    }

    let mut read_coordinates = |short_flag: u8, same_flag: u8| {
        let mut value = 0_i32;
        flags
            .iter()
            .map(|&flag| {
                let delta = if flag & short_flag != 0 {
                    let magnitude = i32::from(cursor.read_u8()?);
                    if flag & same_flag != 0 {
                        magnitude
                    } else {
                        -magnitude
                    }
                } else if flag & same_flag != 0 {
                    0
                } else {
                    i32::from(cursor.read_i16()?)
                };
                value += delta;
                Ok(value)
            })
            .collect::<Result<Vec<_>, ParseError>>()
    };
    let xs = read_coordinates(X_SHORT_VECTOR, X_IS_SAME_OR_POSITIVE)?;
    let ys = read_coordinates(Y_SHORT_VECTOR, Y_IS_SAME_OR_POSITIVE)?;

    let points = flags
        .iter()
        .zip(xs.into_iter().zip(ys))
        .map(|(&flag, (x, y))| ContourPoint {
            point: Point {
                x: x.into(),
                y: y.into(),
            },
            on_curve: flag & ON_CURVE_POINT != 0,
        })
        .collect();
    Ok((end_points, points))
}

/// Appends the outline of a simple glyph to `path`, converting quadratic curves to cubic ones.
pub(super) fn append_simple_outline(
    raw: &[u8],
    transform: Transform,
    path: &mut Vec<PathElement>,
) -> Result<(), ParseError> {
    let (end_points, points) = simple_glyph_contours(raw)?;
    let mut start = 0;
    for &end in &end_points {
        let end = usize::from(end) + 1;
        let contour = points.get(start..end).ok_or_else(|| {
            ParseError::new(ParseErrorKind::RangeOutOfBounds {
                range: start..end,
                len: points.len(),
            })
        })?;
        append_contour(contour, transform, path);
        start = end;
    }
    Ok(())
}

/// Appends a quadratic curve elevated to a cubic one.
fn push_quad(path: &mut Vec<PathElement>, current: &mut Point, control: Point, end: Point) {
    path.push(PathElement::CurveTo(
        current.lerp_two_thirds(control),
        end.lerp_two_thirds(control),
        end,
    ));
    *current = end;
}

fn append_contour(contour: &[ContourPoint], transform: Transform, path: &mut Vec<PathElement>) {
    if contour.is_empty() {
        return;
    }
    let points: Vec<_> = contour
        .iter()
        .map(|point| ContourPoint {
            point: transform.apply(point.point.x, point.point.y),
            on_curve: point.on_curve,
        })
        .collect();
    let (first_point, last_point) = (points[0], points[points.len() - 1]);

    // Choose the starting on-curve point the same way FreeType does.
    let (start, rest) = if first_point.on_curve {
        (first_point.point, &points[1..])
    } else if last_point.on_curve {
        (last_point.point, &points[..points.len() - 1])
    } else {
        (first_point.point.midpoint(last_point.point), &points[..])
    };

    path.push(PathElement::MoveTo(start));
    let mut current = start;
    let mut pending_control: Option<Point> = None;
    for point in rest {
        match (pending_control, point.on_curve) {
            (Some(control), true) => {
                push_quad(path, &mut current, control, point.point);
                pending_control = None;
            }
            (Some(control), false) => {
                push_quad(path, &mut current, control, control.midpoint(point.point));
                pending_control = Some(point.point);
            }
            (None, true) => {
                path.push(PathElement::LineTo(point.point));
                current = point.point;
            }
            (None, false) => pending_control = Some(point.point),
        }
    }
    if let Some(control) = pending_control {
        push_quad(path, &mut current, control, start);
    } else if current != start {
        path.push(PathElement::LineTo(start));
    }
    path.push(PathElement::Close);
}
