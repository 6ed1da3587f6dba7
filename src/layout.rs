//! Line layout: flows interpreted paragraphs into a rectangle whose margins
//! follow a page shape, and fits oversized text by tightening or scaling.
//!
//! Every pass goes through [`layout_paragraphs`]. What happens to the laid
//! out runs depends on the [`LayoutSink`]: nothing (measuring), painting
//! onto a [`Surface`], or collecting [`PositionedRun`]s.

use std::ops::Range;

use serde::{Deserialize, Serialize};

use crate::breaks::ParagraphBreaks;
use crate::interpret::{Paragraph, ParagraphFlags};
use crate::measure::{Direction, LineMeasurer, LineSegment, TextMeasurer};
use crate::shape::{LayoutRect, PageShape};
use crate::style::{ResolvedStyle, StyledRun};
use crate::surface::Surface;

/// Horizontal alignment of a paragraph's lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Alignment {
    #[default]
    Left,
    Center,
    Right,
    /// Stretch spaces to fill the line; the last line is left aligned.
    Justify,
}

/// Where the text block sits inside a taller rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VerticalAlignment {
    #[default]
    Top,
    Middle,
    Bottom,
}

impl VerticalAlignment {
    /// Offset from the top of a `available`-tall area for a block `content`
    /// tall. Overflowing content is never pushed upwards.
    pub fn offset(self, available: f32, content: f32) -> f32 {
        let spare = (available - content).max(0.0);
        match self {
            Self::Top => 0.0,
            Self::Middle => spare / 2.0,
            Self::Bottom => spare,
        }
    }
}

/// How text that overflows its rectangle is made to fit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FitStrategy {
    #[default]
    None,
    /// Reduce line spacing, down to the minimum tightness.
    Tighten,
    /// Shrink everything uniformly, down to the minimum scale.
    Scale,
    /// Tighten first, then scale if that was not enough.
    Both,
}

impl FitStrategy {
    pub fn tightens(self) -> bool {
        matches!(self, Self::Tighten | Self::Both)
    }

    pub fn scales(self) -> bool {
        matches!(self, Self::Scale | Self::Both)
    }
}

/// Line spacing is never tighter than this.
pub const MIN_TIGHTNESS: f32 = 0.1;

/// Lines too narrow to hold text are skipped at most this many times in a
/// row before text is forced in anyway.
pub const MAX_LINE_SKIPS: usize = 64;

/// Default tab stops are this many spaces apart.
pub const DEFAULT_TAB_SPACES: f32 = 8.0;

/// Resolution of the scale search.
pub const SCALE_PRECISION: i32 = 1000;

/// A run of text with its final position. The y coordinate is the
/// baseline, already adjusted for superscripts.
#[derive(Debug, Clone, PartialEq)]
pub struct PositionedRun {
    pub paragraph: usize,
    pub range: Range<usize>,
    pub text: String,
    pub style: ResolvedStyle,
    pub x: f32,
    pub baseline: f32,
    pub advance: f32,
    pub ascent: f32,
    pub descent: f32,
    pub direction: Direction,
    /// Where the inline object stands, for runs that replace one.
    pub object: Option<LayoutRect>,
}

impl PositionedRun {
    /// Moves the run down by `dy`, as when a laid-out block is placed on a
    /// different page.
    pub fn translate(&mut self, dx: f32, dy: f32) {
        self.x += dx;
        self.baseline += dy;
        if let Some(area) = &mut self.object {
            area.x += dx;
            area.y += dy;
        }
    }

    /// The line box this run occupies.
    pub fn bounds(&self) -> LayoutRect {
        LayoutRect::new(
            self.x,
            self.baseline - self.ascent,
            self.advance,
            self.ascent + self.descent,
        )
    }
}

/// Where laid-out runs go.
pub enum LayoutSink<'s> {
    Measure,
    Draw(&'s mut dyn Surface),
    Segments(&'s mut Vec<PositionedRun>),
}

impl LayoutSink<'_> {
    fn accept(&mut self, run: PositionedRun) {
        match self {
            Self::Measure => {}
            Self::Draw(surface) => match (&run.object, &run.style.replacement) {
                (Some(area), Some(image)) => surface.draw_image(image, *area),
                _ => surface.draw_run(&run),
            },
            Self::Segments(out) => out.push(run),
        }
    }
}

/// A paragraph with its styles resolved into runs and its line breaks
/// found, ready for any number of layout passes.
#[derive(Debug, Clone)]
pub struct PreparedParagraph {
    pub text: String,
    pub runs: Vec<StyledRun>,
    pub flags: ParagraphFlags,
    pub tabs: Vec<usize>,
    pub breaks: ParagraphBreaks,
}

impl PreparedParagraph {
    pub fn new(paragraph: &Paragraph, default: &ResolvedStyle) -> Self {
        Self {
            text: paragraph.text.clone(),
            runs: paragraph.styled_text().runs(default),
            flags: paragraph.flags.clone(),
            tabs: paragraph.tabs.clone(),
            breaks: ParagraphBreaks::for_text(&paragraph.text),
        }
    }
}

/// Tab stops of one paragraph, relative to the line start.
#[derive(Debug, Clone, PartialEq)]
pub struct TabStops {
    widths: Vec<f32>,
    fallback: f32,
}

impl TabStops {
    /// Stops at the running sums of `widths`, then every last width after
    /// that. Without widths, stops are `fallback` apart.
    pub fn new(widths: &[f32], fallback: f32) -> Self {
        Self {
            widths: widths.iter().copied().filter(|w| *w > 0.0).collect(),
            fallback: if fallback > 0.0 { fallback } else { 1.0 },
        }
    }

    /// The first stop strictly after `x`.
    pub fn next_stop(&self, x: f32) -> f32 {
        let mut stop = 0.0;
        for width in &self.widths {
            stop += width;
            if stop > x {
                return stop;
            }
        }
        let repeat = self.widths.last().copied().unwrap_or(self.fallback);
        let steps = ((x - stop) / repeat).floor() + 1.0;
        let next = stop + steps.max(1.0) * repeat;
        if next > x { next } else { next + repeat }
    }
}

/// Everything a layout pass needs besides the paragraphs and the sink.
#[derive(Debug, Clone, Copy)]
pub struct LayoutParams<'a> {
    pub measurer: &'a dyn TextMeasurer,
    pub shape: &'a dyn PageShape,
    pub tightness: f32,
    pub scale: f32,
}

struct PlacedSegment {
    segment: LineSegment,
    x: f32,
    at_tab: bool,
}

/// Lays `paragraphs` out inside `rect`, starting `y_offset` below its top,
/// and returns the height the text occupies.
pub fn layout_paragraphs(
    paragraphs: &[PreparedParagraph],
    rect: LayoutRect,
    params: &LayoutParams<'_>,
    y_offset: f32,
    sink: &mut LayoutSink<'_>,
) -> f32 {
    let top = rect.y + y_offset;
    let mut y = top;
    for (index, paragraph) in paragraphs.iter().enumerate() {
        y = layout_paragraph(index, paragraph, rect, params, y, sink);
    }
    y - top
}

fn layout_paragraph(
    index: usize,
    paragraph: &PreparedParagraph,
    rect: LayoutRect,
    params: &LayoutParams<'_>,
    mut y: f32,
    sink: &mut LayoutSink<'_>,
) -> f32 {
    let tightness = (params.tightness + paragraph.flags.tightness_delta).max(MIN_TIGHTNESS);
    let mut lines = LineMeasurer::with_breaks(
        &paragraph.text,
        paragraph.runs.clone(),
        paragraph.breaks.clone(),
        params.measurer,
        params.scale,
    );
    let space = paragraph
        .runs
        .first()
        .map(|run| params.measurer.measure(" ", &run.style, params.scale).advance)
        .unwrap_or(1.0);
    let scaled_widths: Vec<f32> = paragraph
        .flags
        .tab_widths
        .iter()
        .map(|w| w * params.scale)
        .collect();
    let stops = TabStops::new(&scaled_widths, space * DEFAULT_TAB_SPACES);

    let mut skips = 0;
    let mut last_height = 0.0;
    while !lines.is_done() {
        let probe = lines.measure_range(lines.position()..lines.position());
        let estimate = probe.ascent + probe.descent;
        let left = rect.x + params.shape.left_inset(y, y + estimate);
        let right = rect.right() - params.shape.right_inset(y, y + estimate);
        if right - left <= 0.0 && skips < MAX_LINE_SKIPS {
            skips += 1;
            y += estimate.max(MIN_TIGHTNESS);
            continue;
        }
        skips = 0;
        let right = right.max(left);

        let mut placed: Vec<PlacedSegment> = Vec::new();
        let mut pen = left;
        loop {
            let next_tab = paragraph
                .tabs
                .iter()
                .copied()
                .find(|&tab| tab >= lines.position());
            let limit = next_tab.unwrap_or(paragraph.text.len());
            let Some(segment) = lines.next_layout(right - pen, limit, placed.is_empty()) else {
                break;
            };
            let at_tab = next_tab.is_some() && segment.range.end == limit;
            let advance = segment.advance;
            placed.push(PlacedSegment {
                segment,
                x: pen,
                at_tab,
            });
            if !at_tab {
                break;
            }
            lines.set_position(limit + '\t'.len_utf8());
            pen = left + stops.next_stop(pen + advance - left);
            if pen >= right || lines.is_done() {
                break;
            }
        }

        let ascent = placed
            .iter()
            .map(|p| p.segment.ascent)
            .fold(0.0_f32, f32::max);
        let descent = placed
            .iter()
            .map(|p| p.segment.descent)
            .fold(0.0_f32, f32::max);
        let last_line = lines.is_done();
        let alignment = paragraph.flags.alignment;

        if alignment == Alignment::Justify && !last_line {
            if let Some(last) = placed.last_mut() {
                if !last.at_tab {
                    last.segment.justify(right - last.x);
                }
            }
        }
        let used = placed
            .last()
            .map_or(0.0, |p| p.x + p.segment.visible_advance - left);
        let offset = match alignment {
            Alignment::Left | Alignment::Justify => 0.0,
            Alignment::Center => ((right - left - used) / 2.0).max(0.0),
            Alignment::Right => (right - left - used).max(0.0),
        };

        let baseline = y + ascent;
        for entry in &placed {
            let direction = entry.segment.direction;
            for piece in lines.place(&entry.segment) {
                let x = entry.x + offset + piece.x;
                let run_baseline = baseline - piece.rise;
                let object = piece.object.map(|(width, height)| {
                    LayoutRect::new(x, baseline - piece.ascent, width, height)
                });
                sink.accept(PositionedRun {
                    paragraph: index,
                    text: paragraph.text[piece.range.clone()].to_string(),
                    range: piece.range,
                    style: piece.style,
                    x,
                    baseline: run_baseline,
                    advance: piece.advance,
                    ascent: piece.ascent,
                    descent: piece.descent,
                    direction,
                    object,
                });
            }
        }

        last_height = (ascent + descent) * tightness;
        y += last_height;
    }

    if paragraph.flags.heading.is_some() {
        y += last_height / 2.0;
    }
    y
}

/// The fitting search space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FitSettings {
    pub strategy: FitStrategy,
    /// Line spacing used when not tightening.
    pub tightness: f32,
    pub min_tightness: f32,
    pub max_tightness: f32,
    pub min_scale: f32,
}

impl Default for FitSettings {
    fn default() -> Self {
        Self {
            strategy: FitStrategy::None,
            tightness: 1.0,
            min_tightness: 0.6,
            max_tightness: 1.0,
            min_scale: 0.5,
        }
    }
}

/// The outcome of fitting text to a rectangle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Fit {
    pub tightness: f32,
    pub scale: f32,
    /// Height of the text at the chosen tightness and scale.
    pub height: f32,
}

const FIT_EPSILON: f32 = 1e-3;

fn checked_scale(scale: f32) -> f32 {
    if scale > 0.0 && scale.is_finite() {
        scale
    } else {
        tracing::warn!(scale, "degenerate scale candidate, using 1");
        1.0
    }
}

/// Chooses the tightness and scale at which `paragraphs` fit in `rect`.
///
/// Tightening searches downward from the maximum tightness in steps of
/// 0.1 and then 0.01, keeping the largest value that fits. Scaling runs a
/// binary search over `[min_scale, 1]` at a resolution of 1/1000 for the
/// smallest scale that still overflows, and takes the step below it.
pub fn fit(
    paragraphs: &[PreparedParagraph],
    rect: LayoutRect,
    measurer: &dyn TextMeasurer,
    shape: &dyn PageShape,
    settings: &FitSettings,
) -> Fit {
    let height_at = |tightness: f32, scale: f32| {
        let params = LayoutParams {
            measurer,
            shape,
            tightness,
            scale: checked_scale(scale),
        };
        layout_paragraphs(paragraphs, rect, &params, 0.0, &mut LayoutSink::Measure)
    };
    let fits = |height: f32| height <= rect.height + FIT_EPSILON;

    let mut tightness = settings.tightness;
    if settings.strategy.tightens() {
        tightness = fit_tightness(settings, |t| fits(height_at(t, 1.0)));
    }

    let mut scale = 1.0;
    let mut height = height_at(tightness, scale);
    if settings.strategy.scales() && !fits(height) {
        let floor = ((settings.min_scale * SCALE_PRECISION as f32).round() as i32)
            .clamp(1, SCALE_PRECISION);
        let mut lo = floor;
        let mut hi = SCALE_PRECISION;
        while lo < hi {
            let mid = lo + (hi - lo) / 2;
            if fits(height_at(tightness, mid as f32 / SCALE_PRECISION as f32)) {
                lo = mid + 1;
            } else {
                hi = mid;
            }
        }
        let chosen = (lo - 1).max(floor);
        scale = checked_scale(chosen as f32 / SCALE_PRECISION as f32);
        height = height_at(tightness, scale);
    }
    tracing::debug!(tightness, scale, height, "fitted text");
    Fit {
        tightness,
        scale,
        height,
    }
}

/// Largest tightness in `[min, max]` for which `fits` holds, or the
/// minimum when none does.
fn fit_tightness(settings: &FitSettings, fits: impl Fn(f32) -> bool) -> f32 {
    let (min, max) = (settings.min_tightness, settings.max_tightness);
    if fits(max) {
        return max;
    }
    let mut coarse = None;
    let mut step = 1;
    loop {
        let candidate = max - 0.1 * step as f32;
        if candidate <= min {
            break;
        }
        if fits(candidate) {
            coarse = Some(candidate);
            break;
        }
        step += 1;
    }
    // Refine between the first fitting coarse step (or the minimum) and
    // the coarse step above it, which did not fit.
    let base = coarse.unwrap_or(min);
    if coarse.is_none() && !fits(min) {
        return min;
    }
    let upper = (base + 0.1).min(max);
    let mut best = base;
    for fine in 1..10 {
        let candidate = base + 0.01 * fine as f32;
        if candidate >= upper {
            break;
        }
        if fits(candidate) {
            best = candidate;
        } else {
            break;
        }
    }
    best
}

#[cfg(test)]
#[path = "layout_tests.rs"]
mod tests;
