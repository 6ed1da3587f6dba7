//! Viewer state: the laid-out page, scroll position and quit flag.
//!
//! `App` never touches the terminal. The renderer reads it to decide which
//! page rows to copy into the frame.

use std::ops::Range;

use ratatui::crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::renderer::RenderedPage;

pub struct App {
    pub page: RenderedPage,
    /// First page row shown.
    pub scroll_offset: usize,
    /// Rows available for the page (the status bar excluded).
    pub viewport_height: usize,
    /// Shown in the status bar.
    pub filename: String,
    pub quit: bool,
}

impl App {
    /// Starts at the top. `viewport_height` is filled in by the event loop
    /// before the first draw.
    pub fn new(page: RenderedPage, filename: String) -> Self {
        Self {
            page,
            scroll_offset: 0,
            viewport_height: 0,
            filename,
            quit: false,
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent) {
        let half_page = (self.viewport_height / 2).max(1) as isize;
        match key.code {
            KeyCode::Char('j') | KeyCode::Down => self.scroll_by(1),
            KeyCode::Char('k') | KeyCode::Up => self.scroll_by(-1),
            KeyCode::Char('d') | KeyCode::PageDown => self.scroll_by(half_page),
            KeyCode::Char('u') | KeyCode::PageUp => self.scroll_by(-half_page),
            KeyCode::Char('g') | KeyCode::Home => self.scroll_offset = 0,
            KeyCode::Char('G') | KeyCode::End => self.scroll_offset = self.max_scroll(),
            KeyCode::Char('q') | KeyCode::Esc => self.quit = true,
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.quit = true;
            }
            _ => {}
        }
    }

    /// Moves by `rows`, staying within `0..=max_scroll()`.
    pub fn scroll_by(&mut self, rows: isize) {
        let target = self.scroll_offset.saturating_add_signed(rows);
        self.scroll_offset = target.min(self.max_scroll());
    }

    /// Page rows currently on screen.
    pub fn visible_range(&self) -> Range<usize> {
        let end = (self.scroll_offset + self.viewport_height).min(self.page.total_height);
        self.scroll_offset..end.max(self.scroll_offset)
    }

    /// Zero when the whole page fits.
    pub fn max_scroll(&self) -> usize {
        self.page.total_height.saturating_sub(self.viewport_height)
    }

    /// Scroll position as 0–100; a page that fits is at 100.
    pub fn scroll_percent(&self) -> u16 {
        match self.max_scroll() {
            0 => 100,
            max => (self.scroll_offset * 100 / max) as u16,
        }
    }
}

#[cfg(test)]
#[path = "app_tests.rs"]
mod tests;
