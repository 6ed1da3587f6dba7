//! Line-break iterators: a UAX #14 base classifier plus two adapters.
//!
//! The base classifier re-scans the text on every cursor move, but can list
//! every boundary in one pass with [`LineBreaks::scan`]. `FilteredBreaks`
//! rejects candidates a language rule forbids, and `CachedBreaks` collects
//! every boundary once so that the layout engine can probe line-fit
//! candidates with index arithmetic and binary search.
//!
//! Boundaries are byte offsets. Every text has a boundary at 0 and at its
//! length; `None` plays the role of the "no more breaks" sentinel.

use textwrap::WordSeparator;

/// A bidirectional cursor over the line-break boundaries of one text.
pub trait LineBreaks {
    /// Replaces the text and resets the cursor to the first boundary.
    fn set_text(&mut self, text: &str);

    /// The text currently being iterated.
    fn text(&self) -> &str;

    /// The boundary the cursor rests on.
    fn current(&self) -> usize;

    /// Moves to the first boundary (always 0).
    fn first(&mut self) -> usize;

    /// Moves to the last boundary (always the text length).
    fn last(&mut self) -> usize;

    /// Advances to the next boundary, or returns `None` at the end.
    fn next(&mut self) -> Option<usize>;

    /// Steps back to the previous boundary, or returns `None` at the start.
    fn previous(&mut self) -> Option<usize>;

    /// Moves to the first boundary strictly after `offset`.
    fn following(&mut self, offset: usize) -> Option<usize>;

    /// Moves to the last boundary strictly before `offset`.
    fn preceding(&mut self, offset: usize) -> Option<usize>;

    /// Every boundary after the first, in increasing order, leaving the
    /// cursor on the last one.
    fn scan(&mut self) -> Vec<usize> {
        let mut found = Vec::new();
        self.first();
        while let Some(offset) = self.next() {
            found.push(offset);
        }
        found
    }
}

/// Break opportunities after each word and its trailing whitespace, as
/// found by textwrap's Unicode line-breaking word separator.
fn opportunities(text: &str) -> impl Iterator<Item = usize> + '_ {
    let mut end = 0;
    WordSeparator::UnicodeBreakProperties
        .find_words(text)
        .map(move |word| {
            end += word.word.len() + word.whitespace.len();
            end
        })
}

/// Base classifier following the Unicode line-breaking algorithm.
///
/// Holds no break table: each movement re-scans the text from the start.
#[derive(Debug, Clone, Default)]
pub struct UnicodeBreaks {
    text: String,
    pos: usize,
}

impl UnicodeBreaks {
    pub fn new() -> Self {
        Self::default()
    }
}

impl LineBreaks for UnicodeBreaks {
    fn set_text(&mut self, text: &str) {
        self.text = text.to_string();
        self.pos = 0;
    }

    fn text(&self) -> &str {
        &self.text
    }

    fn current(&self) -> usize {
        self.pos
    }

    fn first(&mut self) -> usize {
        self.pos = 0;
        0
    }

    fn last(&mut self) -> usize {
        self.pos = self.text.len();
        self.pos
    }

    fn next(&mut self) -> Option<usize> {
        let pos = self.pos;
        let found = opportunities(&self.text).find(|&end| end > pos)?;
        self.pos = found;
        Some(found)
    }

    fn previous(&mut self) -> Option<usize> {
        if self.pos == 0 {
            return None;
        }
        let pos = self.pos;
        let found = opportunities(&self.text)
            .take_while(|&end| end < pos)
            .last()
            .unwrap_or(0);
        self.pos = found;
        Some(found)
    }

    fn following(&mut self, offset: usize) -> Option<usize> {
        self.pos = offset.min(self.text.len());
        let found = self.next();
        if found.is_none() {
            self.pos = self.text.len();
        }
        found
    }

    fn preceding(&mut self, offset: usize) -> Option<usize> {
        self.pos = offset.min(self.text.len());
        let found = self.previous();
        if found.is_none() {
            self.pos = 0;
        }
        found
    }

    fn scan(&mut self) -> Vec<usize> {
        let mut found: Vec<usize> = opportunities(&self.text).filter(|&end| end > 0).collect();
        found.dedup();
        self.pos = self.text.len();
        found
    }
}

/// Decides whether a candidate break at `offset` is acceptable.
pub type BreakRule = fn(text: &str, offset: usize) -> bool;

/// Forbids a break right after a right single quotation mark (used as an
/// apostrophe) unless whitespace follows it.
pub fn apostrophe_rule(text: &str, offset: usize) -> bool {
    if text[..offset].chars().next_back() != Some('\u{2019}') {
        return true;
    }
    text[offset..].chars().next().is_none_or(char::is_whitespace)
}

/// Wraps a base classifier and skips candidates rejected by a [`BreakRule`].
#[derive(Debug, Clone)]
pub struct FilteredBreaks<B> {
    base: B,
    rule: BreakRule,
}

impl<B: LineBreaks> FilteredBreaks<B> {
    /// Filters `base` with [`apostrophe_rule`].
    pub fn new(base: B) -> Self {
        Self::with_rule(base, apostrophe_rule)
    }

    pub fn with_rule(base: B, rule: BreakRule) -> Self {
        Self { base, rule }
    }

    fn accepts(&self, offset: usize) -> bool {
        let text = self.base.text();
        offset == 0 || offset >= text.len() || (self.rule)(text, offset)
    }

    fn forward_from(&mut self, mut candidate: Option<usize>) -> Option<usize> {
        while let Some(offset) = candidate {
            if self.accepts(offset) {
                return Some(offset);
            }
            candidate = self.base.next();
        }
        None
    }

    fn backward_from(&mut self, mut candidate: Option<usize>) -> Option<usize> {
        while let Some(offset) = candidate {
            if self.accepts(offset) {
                return Some(offset);
            }
            candidate = self.base.previous();
        }
        None
    }
}

impl<B: LineBreaks> LineBreaks for FilteredBreaks<B> {
    fn set_text(&mut self, text: &str) {
        self.base.set_text(text);
    }

    fn text(&self) -> &str {
        self.base.text()
    }

    fn current(&self) -> usize {
        self.base.current()
    }

    fn first(&mut self) -> usize {
        self.base.first()
    }

    fn last(&mut self) -> usize {
        self.base.last()
    }

    fn next(&mut self) -> Option<usize> {
        let candidate = self.base.next();
        self.forward_from(candidate)
    }

    fn previous(&mut self) -> Option<usize> {
        let candidate = self.base.previous();
        self.backward_from(candidate)
    }

    fn following(&mut self, offset: usize) -> Option<usize> {
        let candidate = self.base.following(offset);
        self.forward_from(candidate)
    }

    fn preceding(&mut self, offset: usize) -> Option<usize> {
        let candidate = self.base.preceding(offset);
        self.backward_from(candidate)
    }

    fn scan(&mut self) -> Vec<usize> {
        let mut found = self.base.scan();
        found.retain(|&offset| self.accepts(offset));
        found
    }
}

/// Precomputes every boundary of the wrapped classifier once per text.
///
/// Costs one full scan and `O(n)` memory per `set_text`; every query after
/// that is `O(1)` or `O(log n)`.
#[derive(Debug, Clone)]
pub struct CachedBreaks<B> {
    base: B,
    boundaries: Vec<usize>,
    index: usize,
}

/// The break iterator used for paragraph layout.
pub type ParagraphBreaks = CachedBreaks<FilteredBreaks<UnicodeBreaks>>;

impl ParagraphBreaks {
    /// Builds the standard filtered, cached iterator for `text`.
    pub fn for_text(text: &str) -> Self {
        let mut breaks = CachedBreaks::new(FilteredBreaks::new(UnicodeBreaks::new()));
        breaks.set_text(text);
        breaks
    }
}

impl<B: LineBreaks> CachedBreaks<B> {
    pub fn new(base: B) -> Self {
        Self {
            base,
            boundaries: vec![0],
            index: 0,
        }
    }

    /// All boundaries in increasing order, including 0 and the text length.
    pub fn boundaries(&self) -> &[usize] {
        &self.boundaries
    }

    /// Returns true if `offset` is one of the cached boundaries.
    pub fn is_boundary(&self, offset: usize) -> bool {
        self.boundaries.binary_search(&offset).is_ok()
    }

    /// Moves `n` boundaries forward (or backward when negative).
    ///
    /// Returns `None` when the move would pass either end; the cursor is
    /// then left on that end.
    pub fn next_by(&mut self, n: isize) -> Option<usize> {
        let last = self.boundaries.len() - 1;
        let target = self.index as isize + n;
        if target < 0 {
            self.index = 0;
            return None;
        }
        if target as usize > last {
            self.index = last;
            return None;
        }
        self.index = target as usize;
        Some(self.boundaries[self.index])
    }
}

impl<B: LineBreaks> LineBreaks for CachedBreaks<B> {
    fn set_text(&mut self, text: &str) {
        self.base.set_text(text);
        self.boundaries.clear();
        self.boundaries.push(self.base.first());
        let rest = self.base.scan();
        self.boundaries.extend(rest);
        // Boundaries always close at the text length.
        if self.boundaries.last() != Some(&text.len()) {
            self.boundaries.push(text.len());
        }
        self.index = 0;
    }

    fn text(&self) -> &str {
        self.base.text()
    }

    fn current(&self) -> usize {
        self.boundaries[self.index]
    }

    fn first(&mut self) -> usize {
        self.index = 0;
        self.boundaries[0]
    }

    fn last(&mut self) -> usize {
        self.index = self.boundaries.len() - 1;
        self.boundaries[self.index]
    }

    fn next(&mut self) -> Option<usize> {
        self.next_by(1)
    }

    fn previous(&mut self) -> Option<usize> {
        self.next_by(-1)
    }

    fn following(&mut self, offset: usize) -> Option<usize> {
        let idx = self.boundaries.partition_point(|&b| b <= offset);
        if idx >= self.boundaries.len() {
            self.index = self.boundaries.len() - 1;
            return None;
        }
        self.index = idx;
        Some(self.boundaries[idx])
    }

    fn preceding(&mut self, offset: usize) -> Option<usize> {
        let idx = self.boundaries.partition_point(|&b| b < offset);
        if idx == 0 {
            self.index = 0;
            return None;
        }
        self.index = idx - 1;
        Some(self.boundaries[self.index])
    }
}

#[cfg(test)]
#[path = "breaks_tests.rs"]
mod tests;
