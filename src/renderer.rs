//! Renderer: lays the document out into an off-screen buffer once, then
//! copies the visible rows of that buffer into each frame.
//!
//! Layout only reruns when the terminal is resized, so scrolling is a plain
//! row copy.

use markset::{BufferSurface, LayoutRect, MarkupEngine};
use ratatui::Frame;
use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;

use crate::app::App;

/// The whole document painted at one width.
pub struct RenderedPage {
    /// One row per layout unit, at least as tall as the target box.
    pub buffer: Buffer,
    /// Rows occupied by text.
    pub total_height: usize,
}

/// Lays the engine's markup out `width` columns wide, fitting it to
/// `height` rows when the engine's fit strategy asks for it.
pub fn render_page(engine: &mut MarkupEngine, width: u16, height: u16) -> RenderedPage {
    let rect = LayoutRect::new(0.0, 0.0, width.into(), height.into());
    let text_height = engine.measure(rect).ceil().max(0.0);
    let rows = text_height.max(f32::from(height)).clamp(1.0, f32::from(u16::MAX)) as u16;
    let mut buffer = Buffer::empty(Rect::new(0, 0, width, rows));
    let bottom = engine.draw(rect, &mut BufferSurface::new(&mut buffer));
    RenderedPage {
        buffer,
        total_height: bottom.ceil().max(text_height).min(f32::from(rows)) as usize,
    }
}

/// Draws the current view of the document and status bar to the frame.
///
/// The content area occupies all rows except the last, which is reserved
/// for the status bar.
pub fn draw(frame: &mut Frame, app: &App) {
    let area = frame.area();
    let content_height = area.height.saturating_sub(1);
    let source = &app.page.buffer;
    let width = area.width.min(source.area.width);

    for (i, row) in app.visible_range().enumerate() {
        if i >= content_height as usize {
            break;
        }
        let y = area.y.saturating_add(i as u16);
        for x in 0..width {
            let Some(cell) = source.cell((x, row as u16)) else {
                continue;
            };
            if let Some(target) = frame.buffer_mut().cell_mut((area.x + x, y)) {
                *target = cell.clone();
            }
        }
    }

    draw_status_bar(frame, app, area);
}

/// Renders the status bar at the bottom row of the given area.
fn draw_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    let status_area = Rect {
        x: area.x,
        y: area.y + area.height.saturating_sub(1),
        width: area.width,
        height: 1,
    };

    let total_lines = app.page.total_height;
    let current_line = if total_lines == 0 {
        0
    } else {
        app.scroll_offset + 1
    };
    let status_text = format!(
        " {} | {}% | {}/{} ",
        app.filename,
        app.scroll_percent(),
        current_line,
        total_lines
    );

    let status_style = Style::default()
        .fg(Color::Black)
        .bg(Color::White)
        .add_modifier(Modifier::BOLD);

    // Pad the status text to fill the entire width.
    let padded = format!("{:<width$}", status_text, width = area.width as usize);
    let paragraph = Paragraph::new(Line::from(Span::styled(padded, status_style)));
    frame.render_widget(paragraph, status_area);
}
