//! Text measurement: the provider interface, two providers, and the line
//! measurer that fits paragraph text into widths.
//!
//! A [`TextMeasurer`] only ever sees a run of text in a single style. The
//! [`LineMeasurer`] splits a paragraph into such runs, asks the provider
//! for each, and uses the paragraph's cached line breaks to find the
//! longest prefix that fits.

use std::fmt::Debug;
use std::ops::Range;

use unicode_width::UnicodeWidthStr;

use crate::breaks::ParagraphBreaks;
use crate::style::{ResolvedStyle, StyledRun};

/// Widths and vertical extent of one measured run.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct RunMetrics {
    pub advance: f32,
    /// Advance without trailing whitespace.
    pub visible_advance: f32,
    pub ascent: f32,
    pub descent: f32,
}

/// Measures single-style runs of text.
pub trait TextMeasurer: Debug {
    fn measure(&self, text: &str, style: &ResolvedStyle, scale: f32) -> RunMetrics;

    /// How far a superscript or subscript run is raised (negative lowers).
    fn baseline_shift(&self, style: &ResolvedStyle, scale: f32) -> f32 {
        f32::from(style.superscript) * style.size * scale * 0.4
    }

    /// Points per horizontal and per vertical layout unit, used to size
    /// inline objects given in points.
    fn points_per_unit(&self) -> (f32, f32) {
        (1.0, 1.0)
    }
}

/// Terminal cells: one unit per column, one line per row. Size and scale
/// have no effect.
#[derive(Debug, Default, Clone, Copy)]
pub struct CellMetrics;

impl TextMeasurer for CellMetrics {
    fn measure(&self, text: &str, _style: &ResolvedStyle, _scale: f32) -> RunMetrics {
        RunMetrics {
            advance: text.width() as f32,
            visible_advance: text.trim_end().width() as f32,
            ascent: 1.0,
            descent: 0.0,
        }
    }

    fn baseline_shift(&self, _style: &ResolvedStyle, _scale: f32) -> f32 {
        0.0
    }

    fn points_per_unit(&self) -> (f32, f32) {
        // Ten columns and five rows to the inch.
        (7.2, 14.4)
    }
}

/// A fixed-pitch model scaled by font size: every column is `em_ratio`
/// of the size wide.
#[derive(Debug, Clone, Copy)]
pub struct FixedPitchMetrics {
    pub em_ratio: f32,
}

impl Default for FixedPitchMetrics {
    fn default() -> Self {
        Self { em_ratio: 0.5 }
    }
}

impl FixedPitchMetrics {
    fn width_of(&self, text: &str, style: &ResolvedStyle, scale: f32) -> f32 {
        let size = style.size * scale;
        let columns = text.width() as f32;
        let tracking = style.tracking * size * text.chars().count() as f32;
        columns * size * self.em_ratio * style.width + tracking
    }
}

impl TextMeasurer for FixedPitchMetrics {
    fn measure(&self, text: &str, style: &ResolvedStyle, scale: f32) -> RunMetrics {
        let size = style.size * scale;
        RunMetrics {
            advance: self.width_of(text, style, scale),
            visible_advance: self.width_of(text.trim_end(), style, scale),
            ascent: size * 0.8,
            descent: size * 0.2,
        }
    }
}

/// Run direction of a line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Direction {
    #[default]
    LeftToRight,
    RightToLeft,
}

fn is_rtl(c: char) -> bool {
    matches!(c,
        '\u{0590}'..='\u{08FF}'
        | '\u{FB1D}'..='\u{FDFF}'
        | '\u{FE70}'..='\u{FEFF}')
}

/// Direction of the first strong character; left-to-right if none.
pub fn direction_of(text: &str) -> Direction {
    text.chars()
        .find(|c| c.is_alphabetic())
        .map_or(Direction::LeftToRight, |c| {
            if is_rtl(c) {
                Direction::RightToLeft
            } else {
                Direction::LeftToRight
            }
        })
}

/// A single-style slice of a line.
#[derive(Debug, Clone, PartialEq)]
pub struct RunPiece {
    pub range: Range<usize>,
    pub style: ResolvedStyle,
    /// Offset from the start of the segment.
    pub x: f32,
    pub advance: f32,
    pub ascent: f32,
    pub descent: f32,
    /// Upward baseline shift.
    pub rise: f32,
    /// Size of the inline object this piece stands for, in layout units.
    pub object: Option<(f32, f32)>,
}

/// The part of a line between two forced boundaries (line ends or tabs).
#[derive(Debug, Clone, PartialEq)]
pub struct LineSegment {
    pub range: Range<usize>,
    pub advance: f32,
    pub visible_advance: f32,
    pub ascent: f32,
    pub descent: f32,
    pub direction: Direction,
    /// Extra width added to every space by justification.
    pub word_spacing: f32,
    spaces: usize,
    pieces: Vec<RunPiece>,
}

impl LineSegment {
    pub fn pieces(&self) -> &[RunPiece] {
        &self.pieces
    }

    pub fn is_empty(&self) -> bool {
        self.range.is_empty()
    }

    /// Spreads the width missing up to `target` over the spaces inside the
    /// visible text. A segment that already fills the target, or has no
    /// spaces to stretch, is left alone.
    pub fn justify(&mut self, target: f32) {
        let extra = target - self.visible_advance;
        if extra <= 0.0 || self.spaces == 0 {
            return;
        }
        self.word_spacing = extra / self.spaces as f32;
        self.visible_advance = target;
        self.advance += extra;
    }
}

/// Lays one paragraph out segment by segment.
#[derive(Debug)]
pub struct LineMeasurer<'m> {
    text: String,
    runs: Vec<StyledRun>,
    breaks: ParagraphBreaks,
    measurer: &'m dyn TextMeasurer,
    scale: f32,
    position: usize,
}

const FIT_EPSILON: f32 = 1e-3;

/// How many leading entries of `ends` satisfy `fits`, which must hold for a
/// prefix of them. Probes 1, 2, 4, ... entries before bisecting, so a short
/// line costs little even when the paragraph is long.
fn fitting_prefix(ends: &[usize], fits: impl Fn(usize) -> bool) -> usize {
    let mut probe = 1;
    while probe <= ends.len() && fits(ends[probe - 1]) {
        probe *= 2;
    }
    let known = probe / 2;
    let bound = (probe - 1).min(ends.len());
    known + ends[known..bound].partition_point(|&end| fits(end))
}

impl<'m> LineMeasurer<'m> {
    /// `runs` must cover `text`, as produced by [`crate::style::StyledText::runs`].
    pub fn new(
        text: &str,
        runs: Vec<StyledRun>,
        measurer: &'m dyn TextMeasurer,
        scale: f32,
    ) -> Self {
        Self::with_breaks(text, runs, ParagraphBreaks::for_text(text), measurer, scale)
    }

    /// Like [`LineMeasurer::new`], reusing breaks already found for `text`.
    pub fn with_breaks(
        text: &str,
        runs: Vec<StyledRun>,
        breaks: ParagraphBreaks,
        measurer: &'m dyn TextMeasurer,
        scale: f32,
    ) -> Self {
        Self {
            text: text.to_string(),
            runs,
            breaks,
            measurer,
            scale,
            position: 0,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn position(&self) -> usize {
        self.position
    }

    pub fn set_position(&mut self, position: usize) {
        self.position = position.min(self.text.len());
    }

    pub fn is_done(&self) -> bool {
        self.position >= self.text.len()
    }

    /// Lays out the longest prefix of `position..limit` whose visible width
    /// fits in `width`, and moves past it.
    ///
    /// At `position == limit` the result is an empty segment. When not even
    /// one break fits, a segment is forced at character level if
    /// `require_progress` is set (the line is empty so far); otherwise the
    /// result is `None` and the position does not move.
    pub fn next_layout(
        &mut self,
        width: f32,
        limit: usize,
        require_progress: bool,
    ) -> Option<LineSegment> {
        let start = self.position;
        let limit = limit.clamp(start, self.text.len());
        if start == limit {
            return Some(self.measure_range(start..limit));
        }

        let boundaries = self.breaks.boundaries();
        let from = boundaries.partition_point(|&b| b <= start);
        let to = boundaries.partition_point(|&b| b < limit).max(from);
        let inner = &boundaries[from..to];

        let fits = |end: usize| self.visible_width(start..end) <= width + FIT_EPSILON;
        let fitting = fitting_prefix(inner, &fits);
        let end = if fitting == inner.len() && fits(limit) {
            limit
        } else if fitting > 0 {
            inner[fitting - 1]
        } else if require_progress {
            self.emergency_break(start, limit, width)
        } else {
            return None;
        };

        self.position = end;
        Some(self.measure_range(start..end))
    }

    /// The furthest character boundary that fits, and at least one
    /// character.
    fn emergency_break(&self, start: usize, limit: usize, width: f32) -> usize {
        let slice = &self.text[start..limit];
        let mut ends = slice
            .char_indices()
            .skip(1)
            .map(|(i, _)| start + i)
            .chain(std::iter::once(limit));
        let first = ends.next().unwrap_or(limit);
        ends.take_while(|&end| self.visible_width(start..end) <= width + FIT_EPSILON)
            .last()
            .unwrap_or(first)
    }

    fn visible_width(&self, range: Range<usize>) -> f32 {
        let trimmed = self.text[range.clone()].trim_end().len();
        self.span(range.start..range.start + trimmed).1
    }

    /// Pieces and total advance of a range.
    fn span(&self, range: Range<usize>) -> (Vec<RunPiece>, f32) {
        let mut pieces = Vec::new();
        let mut x = 0.0;
        for run in &self.runs {
            let start = run.range.start.max(range.start);
            let end = run.range.end.min(range.end);
            if start >= end {
                continue;
            }
            let piece = self.piece(start..end, &run.style, x);
            x += piece.advance;
            pieces.push(piece);
        }
        (pieces, x)
    }

    fn piece(&self, range: Range<usize>, style: &ResolvedStyle, x: f32) -> RunPiece {
        let metrics = self
            .measurer
            .measure(&self.text[range.clone()], style, self.scale);
        let rise = self.measurer.baseline_shift(style, self.scale);
        let (advance, ascent, descent, object) = match &style.replacement {
            Some(image) => {
                let (per_x, per_y) = self.measurer.points_per_unit();
                let width = image.width * self.scale / per_x;
                let height = image.height * self.scale / per_y;
                let offset = image.offset * self.scale / per_y;
                let (ascent, descent) =
                    image.placement(height, offset, metrics.ascent, metrics.descent);
                (width, ascent, descent, Some((width, height)))
            }
            None => (
                metrics.advance,
                metrics.ascent + rise,
                (metrics.descent - rise).max(0.0),
                None,
            ),
        };
        RunPiece {
            range,
            style: style.clone(),
            x,
            advance,
            ascent,
            descent,
            rise,
            object,
        }
    }

    fn style_at(&self, offset: usize) -> Option<&ResolvedStyle> {
        self.runs
            .iter()
            .find(|run| run.range.contains(&offset))
            .or(self.runs.last())
            .map(|run| &run.style)
    }

    /// Measures `range` as one segment without moving the position.
    pub fn measure_range(&self, range: Range<usize>) -> LineSegment {
        let (pieces, advance) = self.span(range.clone());
        let spaces = self.text[range.clone()].trim_end().matches(' ').count();
        let visible_advance = self.visible_width(range.clone());
        let (mut ascent, mut descent) = pieces
            .iter()
            .fold((0.0_f32, 0.0_f32), |(a, d), p| (a.max(p.ascent), d.max(p.descent)));
        if pieces.is_empty() {
            if let Some(style) = self.style_at(range.start) {
                let metrics = self.measurer.measure("", style, self.scale);
                ascent = metrics.ascent;
                descent = metrics.descent;
            }
        }
        LineSegment {
            direction: direction_of(&self.text[range.clone()]),
            range,
            advance,
            visible_advance,
            ascent,
            descent,
            word_spacing: 0.0,
            spaces,
            pieces,
        }
    }

    /// The pieces of `segment` with final x offsets: word spacing applied
    /// (splitting pieces after each space) and right-to-left lines laid out
    /// from the right.
    pub fn place(&self, segment: &LineSegment) -> Vec<RunPiece> {
        let mut placed: Vec<RunPiece> = if segment.word_spacing > 0.0 {
            let mut x = 0.0;
            let mut out = Vec::new();
            for piece in &segment.pieces {
                for chunk in split_after_spaces(&self.text, piece.range.clone()) {
                    let mut part = self.piece(chunk.clone(), &piece.style, x);
                    let spaces = self.text[chunk].matches(' ').count() as f32;
                    x += part.advance + spaces * segment.word_spacing;
                    part.rise = piece.rise;
                    out.push(part);
                }
            }
            out
        } else {
            segment.pieces.clone()
        };
        if segment.direction == Direction::RightToLeft {
            for piece in &mut placed {
                piece.x = segment.advance - piece.x - piece.advance;
            }
        }
        placed
    }
}

/// Splits `range` of `text` into chunks that each end after a run of spaces.
fn split_after_spaces(text: &str, range: Range<usize>) -> Vec<Range<usize>> {
    let mut chunks = Vec::new();
    let mut start = range.start;
    let mut in_spaces = false;
    for (i, c) in text[range.clone()].char_indices() {
        let offset = range.start + i;
        if c == ' ' {
            in_spaces = true;
        } else if in_spaces {
            chunks.push(start..offset);
            start = offset;
            in_spaces = false;
        }
    }
    if start < range.end {
        chunks.push(start..range.end);
    }
    chunks
}

#[cfg(test)]
#[path = "measure_tests.rs"]
mod tests;
