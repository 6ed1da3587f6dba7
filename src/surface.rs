//! Drawing targets for laid-out text.
//!
//! The layout engine never paints directly. It hands [`PositionedRun`]s and
//! inline images to a [`Surface`]; [`BufferSurface`] is the one that paints
//! terminal cells into a ratatui [`Buffer`].

use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};

use crate::image::InlineImage;
use crate::layout::PositionedRun;
use crate::measure::Direction;
use crate::shape::LayoutRect;

/// Something laid-out text can be painted onto. Coordinates are layout
/// units; what a unit means is up to the surface.
pub trait Surface {
    fn draw_run(&mut self, run: &PositionedRun);

    /// Paints an inline image into the box reserved for it.
    fn draw_image(&mut self, image: &InlineImage, area: LayoutRect);

    /// Fills `area` with a single glyph.
    fn fill(&mut self, area: LayoutRect, glyph: char);

    /// Outlines `area` with a dashed line, as for an overflowing text box.
    fn draw_dashed_rect(&mut self, area: LayoutRect);

    /// Marks one sampled margin edge point.
    fn draw_edge_marker(&mut self, x: f32, y: f32);
}

/// Paints into a ratatui buffer, one layout unit per cell.
#[derive(Debug)]
pub struct BufferSurface<'b> {
    buffer: &'b mut Buffer,
}

impl<'b> BufferSurface<'b> {
    pub fn new(buffer: &'b mut Buffer) -> Self {
        Self { buffer }
    }

    fn area(&self) -> Rect {
        self.buffer.area
    }

    /// The cell under a layout position, if it lies inside the buffer.
    fn cell_at(&self, x: f32, y: f32) -> Option<(u16, u16)> {
        let (x, y) = (x.round(), y.round());
        if x < 0.0 || y < 0.0 {
            return None;
        }
        let area = self.area();
        let (col, row) = (area.x as f32 + x, area.y as f32 + y);
        let inside = col < area.right() as f32 && row < area.bottom() as f32;
        inside.then_some((col as u16, row as u16))
    }

    fn put(&mut self, x: f32, y: f32, glyph: char, style: Style) {
        if let Some(position) = self.cell_at(x, y) {
            if let Some(cell) = self.buffer.cell_mut(position) {
                cell.set_char(glyph).set_style(style);
            }
        }
    }

    /// Cell span `(first, last)` covered by `area` along one axis, both
    /// inclusive, or `None` when the area is empty.
    fn span(start: f32, length: f32) -> Option<(f32, f32)> {
        let first = start.round();
        let last = (start + length).round() - 1.0;
        (last >= first).then_some((first, last))
    }
}

impl Surface for BufferSurface<'_> {
    fn draw_run(&mut self, run: &PositionedRun) {
        let Some((col, row)) = self.cell_at(run.x, run.baseline - run.ascent) else {
            return;
        };
        let text: String = match run.direction {
            Direction::LeftToRight => run.text.clone(),
            Direction::RightToLeft => run.text.chars().rev().collect(),
        };
        let room = (self.area().right() - col) as usize;
        self.buffer
            .set_stringn(col, row, &text, room, run.style.to_ratatui());
    }

    fn draw_image(&mut self, image: &InlineImage, area: LayoutRect) {
        image.source.paint(self, area);
    }

    fn fill(&mut self, area: LayoutRect, glyph: char) {
        let (Some((left, right)), Some((top, bottom))) = (
            Self::span(area.x, area.width),
            Self::span(area.y, area.height),
        ) else {
            return;
        };
        let mut y = top;
        while y <= bottom {
            let mut x = left;
            while x <= right {
                self.put(x, y, glyph, Style::default());
                x += 1.0;
            }
            y += 1.0;
        }
    }

    fn draw_dashed_rect(&mut self, area: LayoutRect) {
        let (Some((left, right)), Some((top, bottom))) = (
            Self::span(area.x, area.width),
            Self::span(area.y, area.height),
        ) else {
            return;
        };
        let style = Style::default().add_modifier(Modifier::DIM);
        let mut x = left;
        while x <= right {
            self.put(x, top, '┄', style);
            self.put(x, bottom, '┄', style);
            x += 1.0;
        }
        let mut y = top;
        while y <= bottom {
            self.put(left, y, '┆', style);
            self.put(right, y, '┆', style);
            y += 1.0;
        }
    }

    fn draw_edge_marker(&mut self, x: f32, y: f32) {
        self.put(x, y, '·', Style::default().add_modifier(Modifier::DIM));
    }
}

#[cfg(test)]
#[path = "surface_tests.rs"]
mod tests;
