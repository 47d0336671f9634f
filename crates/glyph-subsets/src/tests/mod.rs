//! Test fixtures shared by unit tests: a synthetic TrueType font and a mock font backend.

use std::{
    collections::BTreeSet, env, fmt, io::Write, process::Command, string::String, sync::OnceLock,
    vec, vec::Vec,
};

use allsorts::{binary::read::ReadScope, font::MatchingPresentation, font_data::FontData};

use crate::{
    font::{PathElement, Point},
    Advance, FaceId, Font, FontBackend, FontKind, FontMatrix, MetricSpace,
};

/// Synthetic font with TrueType outlines. Glyphs:
///
/// - 0: `.notdef` (a box)
/// - 1..=26: `A`..=`Z` (boxes); glyph 1 is also mapped from U+0391 GREEK CAPITAL LETTER ALPHA
/// - 27..=52: `a`..=`z` (smaller boxes)
/// - 53: space (empty)
/// - 54: `Å`, a composite of glyph 1 and a scaled glyph 27
/// - 55: `ø`, a contour consisting of off-curve points only
/// - 56: a box not mapped from any char
#[derive(Debug)]
pub(crate) struct TestFont;

impl TestFont {
    pub(crate) const PS_NAME: &'static str = "TestSans-Regular";
    pub(crate) const FULL_NAME: &'static str = "Test Sans Regular";
    pub(crate) const UNITS_PER_EM: u16 = 1_000;
    pub(crate) const ADVANCE: u16 = 600;
    pub(crate) const NOTDEF_ADVANCE: u16 = 500;
    pub(crate) const SPACE_ADVANCE: u16 = 250;
    pub(crate) const SPACE_GLYPH: u32 = 53;
    pub(crate) const COMPOSITE_GLYPH: u32 = 54;
    pub(crate) const OFF_CURVE_GLYPH: u32 = 55;
    pub(crate) const UNMAPPED_GLYPH: u32 = 56;
    pub(crate) const GLYPH_COUNT: u16 = 57;

    fn glyphs() -> Vec<TestGlyph> {
        let mut glyphs = vec![TestGlyph::Box {
            x: [50, 450],
            y: [0, 700],
            advance: Self::NOTDEF_ADVANCE,
        }];
        glyphs.extend((0..26).map(|_| TestGlyph::Box {
            x: [50, 550],
            y: [0, 700],
            advance: Self::ADVANCE,
        }));
        glyphs.extend((0..26).map(|_| TestGlyph::Box {
            x: [50, 450],
            y: [0, 500],
            advance: Self::ADVANCE,
        }));
        glyphs.push(TestGlyph::Empty {
            advance: Self::SPACE_ADVANCE,
        });
        glyphs.push(TestGlyph::Composite);
        glyphs.push(TestGlyph::OffCurve);
        glyphs.push(TestGlyph::Box {
            x: [100, 500],
            y: [-100, 600],
            advance: Self::ADVANCE,
        });
        assert_eq!(glyphs.len(), usize::from(Self::GLYPH_COUNT));
        glyphs
    }

    /// `(start_code, end_code, first_glyph)` segments of the `cmap` table.
    const CMAP_SEGMENTS: [(u16, u16, u16); 6] = [
        (0x20, 0x20, 53),
        (0x41, 0x5a, 1),
        (0x61, 0x7a, 27),
        (0xc5, 0xc5, 54),
        (0xf8, 0xf8, 55),
        (0x391, 0x391, 1),
    ];

    pub(crate) fn bytes() -> &'static [u8] {
        static BYTES: OnceLock<Vec<u8>> = OnceLock::new();
        BYTES.get_or_init(Self::build)
    }

    fn build() -> Vec<u8> {
        let glyphs = Self::glyphs();
        let mut glyf = vec![];
        let mut loca = vec![];
        let mut hmtx = vec![];
        for glyph in &glyphs {
            write_u16(&mut loca, u16::try_from(glyf.len() / 2).unwrap());
            glyph.write(&mut glyf);
            while glyf.len() % 4 != 0 {
                glyf.push(0);
            }
            write_u16(&mut hmtx, glyph.advance());
            write_i16(&mut hmtx, glyph.lsb());
        }
        write_u16(&mut loca, u16::try_from(glyf.len() / 2).unwrap());

        let tables = [
            (*b"OS/2", Self::os2_table()),
            (*b"cmap", Self::cmap_table()),
            (*b"glyf", glyf),
            (*b"head", Self::head_table()),
            (*b"hhea", Self::hhea_table()),
            (*b"hmtx", hmtx),
            (*b"loca", loca),
            (*b"maxp", Self::maxp_table()),
            (*b"name", Self::name_table()),
            (*b"post", Self::post_table()),
        ];

        let mut font = vec![];
        write_u32(&mut font, 0x_0001_0000);
        let table_count = u16::try_from(tables.len()).unwrap();
        write_u16(&mut font, table_count);
        write_u16(&mut font, 128); // searchRange
        write_u16(&mut font, 3); // entrySelector
        write_u16(&mut font, table_count * 16 - 128); // rangeShift

        let mut offset = 12 + 16 * tables.len();
        let mut data = vec![];
        for (tag, table) in &tables {
            font.extend_from_slice(tag);
            write_u32(&mut font, Font::checksum(table));
            write_u32(&mut font, u32::try_from(offset).unwrap());
            write_u32(&mut font, u32::try_from(table.len()).unwrap());
            data.extend_from_slice(table);
            while data.len() % 4 != 0 {
                data.push(0);
            }
            offset = 12 + 16 * tables.len() + data.len();
        }
        font.extend_from_slice(&data);
        font
    }

    fn cmap_table() -> Vec<u8> {
        let segments: Vec<_> = Self::CMAP_SEGMENTS
            .iter()
            .map(|&(start, end, glyph)| (start, end, glyph.wrapping_sub(start)))
            .chain([(0xffff, 0xffff, 1)])
            .collect();
        let segment_count = u16::try_from(segments.len()).unwrap();

        let mut table = vec![];
        write_u16(&mut table, 0); // version
        write_u16(&mut table, 1); // numTables
        write_u16(&mut table, 3); // platform: Windows
        write_u16(&mut table, 1); // encoding: Unicode BMP
        write_u32(&mut table, 12);

        write_u16(&mut table, 4); // format
        write_u16(&mut table, 16 + 8 * segment_count);
        write_u16(&mut table, 0); // language
        write_u16(&mut table, 2 * segment_count);
        write_u16(&mut table, 8); // searchRange
        write_u16(&mut table, 2); // entrySelector
        write_u16(&mut table, 2 * segment_count - 8); // rangeShift
        for &(_, end, _) in &segments {
            write_u16(&mut table, end);
        }
        write_u16(&mut table, 0); // reserved
        for &(start, ..) in &segments {
            write_u16(&mut table, start);
        }
        for &(.., delta) in &segments {
            write_u16(&mut table, delta);
        }
        for _ in &segments {
            write_u16(&mut table, 0); // idRangeOffset
        }
        table
    }

    fn head_table() -> Vec<u8> {
        let mut table = vec![];
        write_u32(&mut table, 0x_0001_0000); // version
        write_u32(&mut table, 0x_0001_0000); // fontRevision
        write_u32(&mut table, 0); // checksumAdjustment
        write_u32(&mut table, 0x_5f0f_3cf5); // magicNumber
        write_u16(&mut table, 0b_1011); // flags
        write_u16(&mut table, Self::UNITS_PER_EM);
        table.extend_from_slice(&[0; 16]); // created, modified
        for value in [0, -200, 1_000, 1_000] {
            write_i16(&mut table, value); // bbox
        }
        write_u16(&mut table, 0); // macStyle
        write_u16(&mut table, 8); // lowestRecPPEM
        write_i16(&mut table, 2); // fontDirectionHint
        write_i16(&mut table, 0); // indexToLocFormat
        write_i16(&mut table, 0); // glyphDataFormat
        assert_eq!(table.len(), 54);
        table
    }

    fn hhea_table() -> Vec<u8> {
        let mut table = vec![];
        write_u32(&mut table, 0x_0001_0000);
        write_i16(&mut table, 800); // ascender
        write_i16(&mut table, -200); // descender
        write_i16(&mut table, 0); // lineGap
        write_u16(&mut table, Self::ADVANCE); // advanceWidthMax
        write_i16(&mut table, 0); // minLeftSideBearing
        write_i16(&mut table, 0); // minRightSideBearing
        write_i16(&mut table, 550); // xMaxExtent
        write_i16(&mut table, 1); // caretSlopeRise
        write_i16(&mut table, 0); // caretSlopeRun
        write_i16(&mut table, 0); // caretOffset
        table.extend_from_slice(&[0; 8]); // reserved
        write_i16(&mut table, 0); // metricDataFormat
        write_u16(&mut table, Self::GLYPH_COUNT); // numberOfHMetrics
        assert_eq!(table.len(), 36);
        table
    }

    fn maxp_table() -> Vec<u8> {
        let mut table = vec![];
        write_u32(&mut table, 0x_0001_0000);
        write_u16(&mut table, Self::GLYPH_COUNT);
        // maxPoints, maxContours, maxCompositePoints, maxCompositeContours, maxZones,
        // maxTwilightPoints, maxStorage, maxFunctionDefs, maxInstructionDefs, maxStackElements,
        // maxSizeOfInstructions, maxComponentElements, maxComponentDepth
        for value in [4, 1, 8, 2, 2, 0, 0, 0, 0, 0, 0, 2, 1] {
            write_u16(&mut table, value);
        }
        assert_eq!(table.len(), 32);
        table
    }

    fn name_table() -> Vec<u8> {
        let records = [
            (1, "Test Sans"),
            (2, "Regular"),
            (4, Self::FULL_NAME),
            (6, Self::PS_NAME),
        ];
        let mut table = vec![];
        write_u16(&mut table, 0); // version
        write_u16(&mut table, records.len().try_into().unwrap());
        write_u16(&mut table, (6 + 12 * records.len()).try_into().unwrap());

        let mut storage = vec![];
        for (name_id, name) in records {
            let encoded: Vec<u8> = name.encode_utf16().flat_map(u16::to_be_bytes).collect();
            for value in [3, 1, 0x409, name_id] {
                write_u16(&mut table, value);
            }
            write_u16(&mut table, encoded.len().try_into().unwrap());
            write_u16(&mut table, storage.len().try_into().unwrap());
            storage.extend_from_slice(&encoded);
        }
        table.extend_from_slice(&storage);
        table
    }

    fn os2_table() -> Vec<u8> {
        let mut table = vec![];
        write_u16(&mut table, 4); // version
        write_i16(&mut table, 580); // xAvgCharWidth
        write_u16(&mut table, 400); // usWeightClass
        write_u16(&mut table, 5); // usWidthClass
        write_u16(&mut table, 0); // fsType
        // Subscript and superscript sizes / offsets
        for value in [650, 600, 0, 75, 650, 600, 0, 350] {
            write_i16(&mut table, value);
        }
        write_i16(&mut table, 50); // yStrikeoutSize
        write_i16(&mut table, 300); // yStrikeoutPosition
        write_i16(&mut table, 0); // sFamilyClass
        table.extend_from_slice(&[0; 10]); // panose
        for value in [0b_11, 0, 0, 0] {
            write_u32(&mut table, value); // ulUnicodeRange1..4
        }
        table.extend_from_slice(b"NONE"); // achVendID
        write_u16(&mut table, 0x40); // fsSelection: REGULAR
        write_u16(&mut table, 0x20); // usFirstCharIndex
        write_u16(&mut table, 0x391); // usLastCharIndex
        write_i16(&mut table, 800); // sTypoAscender
        write_i16(&mut table, -200); // sTypoDescender
        write_i16(&mut table, 0); // sTypoLineGap
        write_u16(&mut table, 1_000); // usWinAscent
        write_u16(&mut table, 200); // usWinDescent
        write_u32(&mut table, 1); // ulCodePageRange1
        write_u32(&mut table, 0); // ulCodePageRange2
        write_i16(&mut table, 500); // sxHeight
        write_i16(&mut table, 700); // sCapHeight
        write_u16(&mut table, 0); // usDefaultChar
        write_u16(&mut table, 0x20); // usBreakChar
        write_u16(&mut table, 2); // usMaxContext
        assert_eq!(table.len(), 96);
        table
    }

    fn post_table() -> Vec<u8> {
        let mut table = vec![];
        write_u32(&mut table, 0x_0003_0000); // version
        write_u32(&mut table, 0); // italicAngle
        write_i16(&mut table, -100); // underlinePosition
        write_i16(&mut table, 50); // underlineThickness
        table.extend_from_slice(&[0; 20]); // isFixedPitch, memory usage
        assert_eq!(table.len(), 32);
        table
    }
}

#[derive(Debug, Clone, Copy)]
enum TestGlyph {
    Empty { advance: u16 },
    Box { x: [i16; 2], y: [i16; 2], advance: u16 },
    Composite,
    OffCurve,
}

impl TestGlyph {
    const OFF_CURVE_POINTS: [(i16, i16); 4] = [(300, 0), (50, 250), (300, 500), (550, 250)];

    fn advance(self) -> u16 {
        match self {
            Self::Empty { advance } | Self::Box { advance, .. } => advance,
            Self::Composite | Self::OffCurve => TestFont::ADVANCE,
        }
    }

    fn lsb(self) -> i16 {
        match self {
            Self::Empty { .. } => 0,
            Self::Box { x, .. } => x[0],
            Self::Composite | Self::OffCurve => 50,
        }
    }

    fn write(self, buffer: &mut Vec<u8>) {
        match self {
            Self::Empty { .. } => { /* empty glyphs have no data */ }
            Self::Box { x: [x0, x1], y: [y0, y1], .. } => {
                // Outer contours are clockwise.
                let points = [(x0, y0, true), (x0, y1, true), (x1, y1, true), (x1, y0, true)];
                write_simple_glyph(buffer, [x0, y0, x1, y1], &points);
            }
            Self::OffCurve => {
                let points = Self::OFF_CURVE_POINTS.map(|(x, y)| (x, y, false));
                write_simple_glyph(buffer, [50, 0, 550, 500], &points);
            }
            Self::Composite => {
                const ARG_1_AND_2_ARE_WORDS: u16 = 0x0001;
                const ARGS_ARE_XY_VALUES: u16 = 0x0002;
                const WE_HAVE_A_SCALE: u16 = 0x0008;
                const MORE_COMPONENTS: u16 = 0x0020;

                write_i16(buffer, -1);
                for value in [50, 0, 550, 1_000] {
                    write_i16(buffer, value);
                }
                write_u16(
                    buffer,
                    ARG_1_AND_2_ARE_WORDS | ARGS_ARE_XY_VALUES | MORE_COMPONENTS,
                );
                write_u16(buffer, 1);
                write_i16(buffer, 0);
                write_i16(buffer, 0);

                write_u16(buffer, ARG_1_AND_2_ARE_WORDS | ARGS_ARE_XY_VALUES | WE_HAVE_A_SCALE);
                write_u16(buffer, 27);
                write_i16(buffer, 100);
                write_i16(buffer, 750);
                write_u16(buffer, 0x2000); // 0.5 in F2Dot14
            }
        }
    }
}

fn write_simple_glyph(buffer: &mut Vec<u8>, bbox: [i16; 4], points: &[(i16, i16, bool)]) {
    write_i16(buffer, 1); // numberOfContours
    for value in bbox {
        write_i16(buffer, value);
    }
    write_u16(buffer, u16::try_from(points.len() - 1).unwrap()); // endPtsOfContours
    write_u16(buffer, 0); // instructionLength
    for &(_, _, on_curve) in points {
        buffer.push(u8::from(on_curve));
    }
    let mut prev_x = 0;
    for &(x, ..) in points {
        write_i16(buffer, x - prev_x);
        prev_x = x;
    }
    let mut prev_y = 0;
    for &(_, y, _) in points {
        write_i16(buffer, y - prev_y);
        prev_y = y;
    }
}

fn write_u16(buffer: &mut Vec<u8>, value: u16) {
    buffer.extend_from_slice(&value.to_be_bytes());
}

fn write_i16(buffer: &mut Vec<u8>, value: i16) {
    buffer.extend_from_slice(&value.to_be_bytes());
}

fn write_u32(buffer: &mut Vec<u8>, value: u32) {
    buffer.extend_from_slice(&value.to_be_bytes());
}

pub(crate) fn test_font() -> Font<'static> {
    Font::new(TestFont::bytes()).unwrap()
}

/// Error returned by [`MockFont`] for failing glyphs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct MockError(pub(crate) u32);

impl fmt::Display for MockError {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "cannot load glyph {}", self.0)
    }
}

/// Font backend with synthetic metrics. Glyph `1..=26` represents `'A'..='Z'`.
#[derive(Debug, Clone)]
pub(crate) struct MockFont {
    face_id: FaceId,
    matrix: FontMatrix,
    kind: FontKind,
    failing_glyphs: BTreeSet<u32>,
    supports_unicode_mapping: bool,
}

impl MockFont {
    pub(crate) fn new(face_id: u64) -> Self {
        Self {
            face_id: FaceId(face_id),
            matrix: FontMatrix::IDENTITY,
            kind: FontKind::Outline,
            failing_glyphs: BTreeSet::new(),
            supports_unicode_mapping: true,
        }
    }

    pub(crate) fn with_size(mut self, size: f64) -> Self {
        self.matrix = FontMatrix::scale(size);
        self
    }

    pub(crate) fn with_kind(mut self, kind: FontKind) -> Self {
        self.kind = kind;
        self
    }

    pub(crate) fn with_failing_glyphs(mut self, glyphs: impl IntoIterator<Item = u32>) -> Self {
        self.failing_glyphs.extend(glyphs);
        self
    }

    pub(crate) fn without_unicode_mapping(mut self) -> Self {
        self.supports_unicode_mapping = false;
        self
    }

    pub(crate) fn unit_advance(glyph: u32) -> f64 {
        0.5 + f64::from(glyph % 100) / 1_000.0
    }

    pub(crate) fn char_for(glyph: u32) -> Option<char> {
        if (1..=26).contains(&glyph) {
            char::from_u32(u32::from('A') + glyph - 1)
        } else {
            None
        }
    }

    fn check(&self, glyph: u32) -> Result<(), MockError> {
        if self.failing_glyphs.contains(&glyph) {
            Err(MockError(glyph))
        } else {
            Ok(())
        }
    }
}

impl FontBackend for MockFont {
    type Error = MockError;

    fn face_id(&self) -> FaceId {
        self.face_id
    }

    fn matrix(&self) -> FontMatrix {
        self.matrix
    }

    fn kind(&self) -> FontKind {
        self.kind
    }

    fn advance(&self, glyph: u32, space: MetricSpace) -> Result<Advance, Self::Error> {
        self.check(glyph)?;
        let x = Self::unit_advance(glyph);
        Ok(match space {
            MetricSpace::Unit => Advance { x, y: 0.0 },
            MetricSpace::Device => {
                let (x, y) = self.matrix.transform_distance(x, 0.0);
                Advance { x, y }
            }
        })
    }

    fn unicode(&self, glyph: u32) -> Result<Option<char>, Self::Error> {
        self.check(glyph)?;
        Ok(Self::char_for(glyph))
    }

    fn supports_unicode_mapping(&self) -> bool {
        self.supports_unicode_mapping
    }
}

#[derive(Debug)]
struct OpenTypeSanitizer {
    path: Option<String>,
}

impl Default for OpenTypeSanitizer {
    fn default() -> Self {
        let Ok(path) = env::var("OTS_SANITIZER") else {
            return Self { path: None };
        };
        let output = Command::new(&path)
            .arg("--version")
            .output()
            .unwrap_or_else(|err| {
                panic!("failed getting version for ots-sanitize at {path}: {err}");
            });
        assert!(
            output.status.success(),
            "failed getting version for ots-sanitize at {path}: non-zero exit code"
        );
        let version = String::from_utf8(output.stdout).unwrap_or_else(|err| {
            panic!("failed getting version for ots-sanitize at {path}: {err}");
        });
        println!("ots-sanitize version: {version}");
        Self { path: Some(path) }
    }
}

impl OpenTypeSanitizer {
    fn get() -> &'static Self {
        static SANITIZER: OnceLock<OpenTypeSanitizer> = OnceLock::new();
        SANITIZER.get_or_init(Self::default)
    }

    fn validate(&self, content: &[u8]) {
        let Some(path) = &self.path else {
            println!("OTS_SANITIZER env var is missing; skipping checks");
            return;
        };

        // Save content to the temporary file.
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.as_file_mut().write_all(content).unwrap();
        file.as_file_mut().flush().unwrap();
        let file_path = file.into_temp_path();

        let output = Command::new(path)
            .arg(&file_path)
            .output()
            .expect("failed running ots-sanitize");
        if !output.status.success() {
            let stdout = String::from_utf8_lossy(&output.stdout);
            let stderr = String::from_utf8_lossy(&output.stderr);
            panic!("ots-sanitize failed:\n--- stdout ---\n{stdout}\n--- stderr ---\n{stderr}");
        }
    }
}

/// Checks that the generated TrueType font is readable both by this crate and by `allsorts`,
/// and passes `ots-sanitize` if it's available.
pub(crate) fn assert_valid_font(raw: &[u8]) {
    let font = Font::new(raw).unwrap();

    let font_file = ReadScope::new(raw).read::<FontData<'_>>().unwrap();
    let font_provider = font_file.table_provider(0).unwrap();
    let mut reference_font = allsorts::Font::new(font_provider).unwrap();
    for glyph in 1..u32::from(font.glyph_count()) {
        let Some(ch) = font.glyph_char(glyph) else {
            continue;
        };
        let (glyph_id, _) =
            reference_font.lookup_glyph_index(ch, MatchingPresentation::NotRequired, None);
        assert_eq!(u32::from(glyph_id), glyph, "{ch:?}");
    }

    OpenTypeSanitizer::get().validate(raw);
}

#[test]
fn reading_font() {
    let font = test_font();
    assert_eq!(font.glyph_count(), TestFont::GLYPH_COUNT);
    assert_eq!(font.units_per_em(), TestFont::UNITS_PER_EM);
    assert_eq!(font.ps_name(), Some(TestFont::PS_NAME));
    assert_eq!(font.full_name(), Some(TestFont::FULL_NAME));
    assert_eq!(font.bbox(), [0, -200, 1_000, 1_000]);
    assert_eq!((font.ascent(), font.descent()), (800, -200));

    let font_file = ReadScope::new(TestFont::bytes())
        .read::<FontData<'_>>()
        .unwrap();
    let font_provider = font_file.table_provider(0).unwrap();
    let mut reference_font = allsorts::Font::new(font_provider).unwrap();

    for ch in "Hello, world! \u{c5}\u{f8}\u{391}".chars() {
        let id = font.map_char(ch).unwrap();
        let (expected_idx, _) =
            reference_font.lookup_glyph_index(ch, MatchingPresentation::NotRequired, None);
        assert_eq!(id, expected_idx, "{ch:?}");
    }
}

#[test]
fn reverse_char_mapping() {
    let font = test_font();
    assert_eq!(font.glyph_char(0), None);
    // U+0391 is mapped to the same glyph, but the smaller char wins.
    assert_eq!(font.glyph_char(1), Some('A'));
    assert_eq!(font.glyph_char(27), Some('a'));
    assert_eq!(font.glyph_char(TestFont::SPACE_GLYPH), Some(' '));
    assert_eq!(font.glyph_char(TestFont::COMPOSITE_GLYPH), Some('\u{c5}'));
    assert_eq!(font.glyph_char(TestFont::UNMAPPED_GLYPH), None);
    assert_eq!(font.glyph_char(1_000), None);
}

#[test]
fn reading_outlines() {
    let font = test_font();
    let point = |x, y| Point { x, y };

    let outline = font.outline(1).unwrap();
    assert_eq!(
        outline,
        [
            PathElement::MoveTo(point(50.0, 0.0)),
            PathElement::LineTo(point(50.0, 700.0)),
            PathElement::LineTo(point(550.0, 700.0)),
            PathElement::LineTo(point(550.0, 0.0)),
            PathElement::LineTo(point(50.0, 0.0)),
            PathElement::Close,
        ]
    );
    assert!(font.outline(TestFont::SPACE_GLYPH).unwrap().is_empty());

    // The composite glyph consists of glyph 1 and glyph 27 scaled by 0.5 and shifted by (100, 750).
    let composite = font.outline(TestFont::COMPOSITE_GLYPH).unwrap();
    assert_eq!(composite[..outline.len()], outline);
    assert_eq!(
        composite[outline.len()],
        PathElement::MoveTo(point(125.0, 750.0))
    );

    let off_curve = font.outline(TestFont::OFF_CURVE_GLYPH).unwrap();
    let curve_count = off_curve
        .iter()
        .filter(|element| matches!(element, PathElement::CurveTo(..)))
        .count();
    assert_eq!(curve_count, 4);
    assert_eq!(off_curve.last(), Some(&PathElement::Close));
}
