//! Page shapes: per-Y margin insets for laying text out inside
//! non-rectangular regions.
//!
//! An inset is measured from the nominal margin of the target rectangle.
//! Positive values narrow the line, negative values widen it, and zero
//! is the plain rectangle. Every query covers a band `y1..=y2` (the
//! vertical extent of the line being fitted), and composed shapes always
//! report the narrowest inset found across their parts.

use std::fmt::Debug;
use std::sync::Arc;

/// An axis-aligned rectangle in layout units.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct LayoutRect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl LayoutRect {
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }
}

/// A margin shape queried over a vertical band.
pub trait PageShape: Debug + Send + Sync {
    fn left_inset(&self, y1: f32, y2: f32) -> f32;
    fn right_inset(&self, y1: f32, y2: f32) -> f32;
}

/// The plain rectangle: no insets anywhere.
#[derive(Debug, Default, Clone, Copy)]
pub struct RectangleShape;

impl PageShape for RectangleShape {
    fn left_inset(&self, _y1: f32, _y2: f32) -> f32 {
        0.0
    }

    fn right_inset(&self, _y1: f32, _y2: f32) -> f32 {
        0.0
    }
}

/// Constant insets at every Y.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct InsetShape {
    pub left: f32,
    pub right: f32,
}

impl InsetShape {
    pub fn new(left: f32, right: f32) -> Self {
        Self { left, right }
    }
}

impl PageShape for InsetShape {
    fn left_inset(&self, _y1: f32, _y2: f32) -> f32 {
        self.left
    }

    fn right_inset(&self, _y1: f32, _y2: f32) -> f32 {
        self.right
    }
}

/// Uses `above` for lines ending before `threshold` and `below` for lines
/// starting at or after it. A line straddling the threshold gets the
/// larger inset of the two.
#[derive(Debug, Clone)]
pub struct ThresholdShape {
    threshold: f32,
    above: Arc<dyn PageShape>,
    below: Arc<dyn PageShape>,
}

impl ThresholdShape {
    pub fn new(threshold: f32, above: Arc<dyn PageShape>, below: Arc<dyn PageShape>) -> Self {
        Self {
            threshold,
            above,
            below,
        }
    }

    fn pick(&self, y1: f32, y2: f32, inset: impl Fn(&dyn PageShape) -> f32) -> f32 {
        if y2 < self.threshold {
            inset(self.above.as_ref())
        } else if y1 >= self.threshold {
            inset(self.below.as_ref())
        } else {
            inset(self.above.as_ref()).max(inset(self.below.as_ref()))
        }
    }
}

impl PageShape for ThresholdShape {
    fn left_inset(&self, y1: f32, y2: f32) -> f32 {
        self.pick(y1, y2, |shape| shape.left_inset(y1, y2))
    }

    fn right_inset(&self, y1: f32, y2: f32) -> f32 {
        self.pick(y1, y2, |shape| shape.right_inset(y1, y2))
    }
}

/// Steps in to `inner` between `top` and `bottom`, and uses `outer`
/// everywhere else.
#[derive(Debug, Clone)]
pub struct CupShape {
    shape: ThresholdShape,
}

impl CupShape {
    pub fn new(top: f32, bottom: f32, outer: Arc<dyn PageShape>, inner: Arc<dyn PageShape>) -> Self {
        let lower = Arc::new(ThresholdShape::new(bottom, inner, outer.clone()));
        Self {
            shape: ThresholdShape::new(top, outer, lower),
        }
    }
}

impl PageShape for CupShape {
    fn left_inset(&self, y1: f32, y2: f32) -> f32 {
        self.shape.left_inset(y1, y2)
    }

    fn right_inset(&self, y1: f32, y2: f32) -> f32 {
        self.shape.right_inset(y1, y2)
    }
}

/// Element-wise maximum of two shapes' insets. Typically clamps a
/// generated shape against a hard rectangle.
#[derive(Debug, Clone)]
pub struct MergedShape {
    first: Arc<dyn PageShape>,
    second: Arc<dyn PageShape>,
}

impl MergedShape {
    pub fn new(first: Arc<dyn PageShape>, second: Arc<dyn PageShape>) -> Self {
        Self { first, second }
    }
}

impl PageShape for MergedShape {
    fn left_inset(&self, y1: f32, y2: f32) -> f32 {
        self.first
            .left_inset(y1, y2)
            .max(self.second.left_inset(y1, y2))
    }

    fn right_inset(&self, y1: f32, y2: f32) -> f32 {
        self.first
            .right_inset(y1, y2)
            .max(self.second.right_inset(y1, y2))
    }
}

/// A closed 2D outline that can report the horizontal extent of its
/// interior along a horizontal line.
pub trait Outline {
    /// Leftmost and rightmost interior X at `y`, or `None` if the line
    /// misses the interior.
    fn span_at(&self, y: f32) -> Option<(f32, f32)>;
}

/// A simple polygon, filled with the even-odd rule.
#[derive(Debug, Clone, PartialEq)]
pub struct Polygon {
    points: Vec<(f32, f32)>,
}

impl Polygon {
    pub fn new(points: Vec<(f32, f32)>) -> Self {
        Self { points }
    }
}

impl Outline for Polygon {
    fn span_at(&self, y: f32) -> Option<(f32, f32)> {
        let n = self.points.len();
        if n < 3 {
            return None;
        }
        let mut span: Option<(f32, f32)> = None;
        for i in 0..n {
            let (x1, y1) = self.points[i];
            let (x2, y2) = self.points[(i + 1) % n];
            // Half-open on Y so shared vertices count once.
            if (y1 <= y && y < y2) || (y2 <= y && y < y1) {
                let x = x1 + (y - y1) / (y2 - y1) * (x2 - x1);
                span = Some(match span {
                    Some((left, right)) => (left.min(x), right.max(x)),
                    None => (x, x),
                });
            }
        }
        span
    }
}

/// Approximates an arbitrary outline by slicing it into horizontal bands
/// and recording each band's interior extent as insets from `bounds`.
#[derive(Debug, Clone)]
pub struct RasterShape {
    bounds: LayoutRect,
    band_height: f32,
    /// Per band: (left inset, right inset).
    bands: Vec<(f32, f32)>,
}

impl RasterShape {
    /// Samples `outline` inside `bounds` with `bands` horizontal slices.
    ///
    /// A band that misses the interior entirely is closed off: its left
    /// inset spans the whole width.
    pub fn sample(outline: &dyn Outline, bounds: LayoutRect, bands: usize) -> Self {
        let bands = bands.max(1);
        let band_height = bounds.height / bands as f32;
        let samples = (0..bands)
            .map(|band| {
                let top = bounds.y + band as f32 * band_height;
                // Top, middle and just above the bottom of the band.
                let probes = [top, top + band_height / 2.0, top + band_height * 0.999];
                let extent = probes
                    .iter()
                    .filter_map(|&y| outline.span_at(y))
                    .reduce(|(l1, r1), (l2, r2)| (l1.min(l2), r1.max(r2)));
                match extent {
                    Some((left, right)) => (left - bounds.x, bounds.right() - right),
                    None => (bounds.width, 0.0),
                }
            })
            .collect();
        Self {
            bounds,
            band_height,
            bands: samples,
        }
    }

    fn band_range(&self, y1: f32, y2: f32) -> Option<std::ops::RangeInclusive<usize>> {
        if y2 < self.bounds.y || y1 >= self.bounds.bottom() || self.band_height <= 0.0 {
            return None;
        }
        let last = self.bands.len() - 1;
        let first = (((y1 - self.bounds.y) / self.band_height).floor().max(0.0) as usize).min(last);
        let end = (((y2 - self.bounds.y) / self.band_height).floor().max(0.0) as usize).min(last);
        Some(first..=end)
    }
}

impl PageShape for RasterShape {
    fn left_inset(&self, y1: f32, y2: f32) -> f32 {
        self.band_range(y1, y2).map_or(0.0, |range| {
            self.bands[range]
                .iter()
                .map(|&(left, _)| left)
                .fold(f32::MIN, f32::max)
        })
    }

    fn right_inset(&self, y1: f32, y2: f32) -> f32 {
        self.band_range(y1, y2).map_or(0.0, |range| {
            self.bands[range]
                .iter()
                .map(|&(_, right)| right)
                .fold(f32::MIN, f32::max)
        })
    }
}

/// One debug sample of a shape's effective edges.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EdgeSample {
    pub y: f32,
    pub left: f32,
    pub right: f32,
}

/// Samples the effective left/right edges of `shape` inside `rect` every
/// `step` units, for diagnostic drawing.
pub fn sample_edges(shape: &dyn PageShape, rect: LayoutRect, step: f32) -> Vec<EdgeSample> {
    let step = if step > 0.0 { step } else { 1.0 };
    let count = (rect.height / step).ceil().max(0.0) as usize;
    (0..count)
        .map(|i| {
            let y = rect.y + i as f32 * step;
            EdgeSample {
                y,
                left: rect.x + shape.left_inset(y, y + step),
                right: rect.right() - shape.right_inset(y, y + step),
            }
        })
        .collect()
}

#[cfg(test)]
#[path = "shape_tests.rs"]
mod tests;
