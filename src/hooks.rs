//! Override points injected into the engine.
//!
//! Each hook is a small trait with a default implementation. The engine
//! holds them as `Rc<dyn ...>`, so a caller can swap one behaviour (say,
//! unknown-tag handling for HTML export) without touching the others.
//!
//! Hooks run in the middle of a parse. They must not call back into the
//! engine in a way that invalidates its paragraph cache.

use std::rc::Rc;
use std::sync::Arc;

use crate::factory::StyleContext;
use crate::segment::segment;
use crate::style::TextStyle;

/// Called for any tag that no other dispatch step recognised.
pub trait UnknownTagHandler {
    /// `tag` is the full tag text between `<` and `>` folded to lowercase,
    /// `original` the same text as written. Returning `Some` replaces the
    /// tag with markup that is parsed in place; `None` drops the tag.
    fn handle_unknown_tag(&self, tag: &str, original: &str) -> Option<String>;
}

/// Silently drops every unknown tag.
#[derive(Debug, Default, Clone, Copy)]
pub struct DropUnknownTags;

impl UnknownTagHandler for DropUnknownTags {
    fn handle_unknown_tag(&self, _tag: &str, _original: &str) -> Option<String> {
        None
    }
}

/// Evaluates `<eval>` and `<script>` tags.
///
/// The result is parsed in place as markup. `None` counts as empty text.
pub trait ScriptEvaluator {
    /// `<eval expression>`: the raw text after the tag name.
    fn evaluate(&self, expression: &str) -> Option<String>;

    /// `<script p1 p2 ...>`: the split parameter list.
    fn call(&self, params: &[String]) -> Option<String>;
}

/// Adjusts a style at the moment its tag opens.
pub trait StyleAdjuster {
    fn adjust_style(
        &self,
        tag: &str,
        style: Arc<TextStyle>,
        context: &dyn StyleContext,
    ) -> Arc<TextStyle>;
}

/// Returns every style unchanged.
#[derive(Debug, Default, Clone, Copy)]
pub struct KeepStyle;

impl StyleAdjuster for KeepStyle {
    fn adjust_style(
        &self,
        _tag: &str,
        style: Arc<TextStyle>,
        _context: &dyn StyleContext,
    ) -> Arc<TextStyle> {
        style
    }
}

/// Breaks a markup document into paragraph sources.
pub trait ParagraphSplitter {
    fn split(&self, markup: &str) -> Vec<String>;
}

/// The standard splitter, see [`segment`].
#[derive(Debug, Default, Clone, Copy)]
pub struct SegmentSplitter;

impl ParagraphSplitter for SegmentSplitter {
    fn split(&self, markup: &str) -> Vec<String> {
        segment(markup)
    }
}

/// The full set of hooks one engine uses.
#[derive(Clone)]
pub struct Hooks {
    pub unknown_tags: Rc<dyn UnknownTagHandler>,
    pub script: Option<Rc<dyn ScriptEvaluator>>,
    pub style_adjuster: Rc<dyn StyleAdjuster>,
    pub splitter: Rc<dyn ParagraphSplitter>,
}

impl Default for Hooks {
    fn default() -> Self {
        Self {
            unknown_tags: Rc::new(DropUnknownTags),
            script: None,
            style_adjuster: Rc::new(KeepStyle),
            splitter: Rc::new(SegmentSplitter),
        }
    }
}
