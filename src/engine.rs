//! The engine: owns markup, configuration, hooks and caches, and runs the
//! segment → interpret → layout pipeline on demand.
//!
//! Parsed paragraphs are cached until something that affects parsing
//! changes. The chosen fit is cached per rectangle until any setter
//! runs. Both caches belong to one engine; it is not meant to be shared
//! across threads.

use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::sync::Arc;

use crate::error::{MarkupError, Result};
use crate::factory::ParametricStyle;
use crate::hooks::{Hooks, ParagraphSplitter, ScriptEvaluator, StyleAdjuster, UnknownTagHandler};
use crate::image::{FileImageResolver, ImageResolver};
use crate::interpret::{
    DEFAULT_EXPANSION_LIMIT, Definitions, Document, DocumentState, Interpreter, Paragraph,
    TagRegistry,
};
use crate::layout::{
    self, Alignment, Fit, FitSettings, FitStrategy, LayoutParams, LayoutSink, PositionedRun,
    PreparedParagraph, VerticalAlignment,
};
use crate::measure::TextMeasurer;
use crate::shape::{LayoutRect, PageShape, RectangleShape, sample_edges};
use crate::style::{ResolvedStyle, TextStyle};
use crate::surface::Surface;

/// Overflow beyond this is reported by the bad-box diagnostic.
const OVERFLOW_EPSILON: f32 = 1e-3;

#[derive(Debug)]
struct Parsed {
    document: Document,
    prepared: Vec<PreparedParagraph>,
}

#[derive(Debug, Clone, Copy)]
struct CachedFit {
    rect: LayoutRect,
    fit: Fit,
}

/// Lays out markup inside rectangles.
pub struct MarkupEngine {
    measurer: Box<dyn TextMeasurer>,
    markup: String,
    default_style: ResolvedStyle,
    shape: Arc<dyn PageShape>,
    registry: TagRegistry,
    hooks: Hooks,
    image_resolver: Rc<dyn ImageResolver>,
    base_path: Option<PathBuf>,
    library: Definitions,
    alignment: Alignment,
    vertical: VerticalAlignment,
    fit_settings: FitSettings,
    punctuation: bool,
    autoclose: bool,
    expansion_limit: usize,
    tab_widths: Vec<f32>,
    bad_box: bool,
    shape_debug: bool,
    parsed: Option<Rc<Parsed>>,
    fit_cache: Option<CachedFit>,
}

impl MarkupEngine {
    pub fn new(measurer: impl TextMeasurer + 'static) -> Self {
        Self {
            measurer: Box::new(measurer),
            markup: String::new(),
            default_style: ResolvedStyle::default(),
            shape: Arc::new(RectangleShape),
            registry: TagRegistry::default(),
            hooks: Hooks::default(),
            image_resolver: Rc::new(FileImageResolver),
            base_path: None,
            library: Definitions::new(),
            alignment: Alignment::default(),
            vertical: VerticalAlignment::default(),
            fit_settings: FitSettings::default(),
            punctuation: true,
            autoclose: true,
            expansion_limit: DEFAULT_EXPANSION_LIMIT,
            tab_widths: Vec::new(),
            bad_box: false,
            shape_debug: false,
            parsed: None,
            fit_cache: None,
        }
    }

    fn invalidate_paragraphs(&mut self) {
        if self.parsed.take().is_some() {
            tracing::debug!("paragraph cache invalidated");
        }
        self.invalidate_fit();
    }

    fn invalidate_fit(&mut self) {
        if self.fit_cache.take().is_some() {
            tracing::debug!("fit cache invalidated");
        }
    }

    pub fn set_markup_text(&mut self, markup: impl Into<String>) {
        let markup = markup.into();
        if markup != self.markup {
            self.markup = markup;
            self.invalidate_paragraphs();
        }
    }

    pub fn markup_text(&self) -> &str {
        &self.markup
    }

    pub fn default_style(&self) -> &ResolvedStyle {
        &self.default_style
    }

    pub fn set_default_style(&mut self, style: ResolvedStyle) {
        self.default_style = style;
        self.invalidate_paragraphs();
    }

    pub fn set_page_shape(&mut self, shape: Arc<dyn PageShape>) {
        self.shape = shape;
        self.invalidate_fit();
    }

    pub fn registry(&self) -> &TagRegistry {
        &self.registry
    }

    pub fn set_style_for_tag(&mut self, tag: &str, style: Arc<TextStyle>) -> Result<()> {
        self.registry.set_style(tag, style)?;
        self.invalidate_paragraphs();
        Ok(())
    }

    pub fn set_parametric_style_for_tag(
        &mut self,
        tag: &str,
        factory: Arc<dyn ParametricStyle>,
    ) -> Result<()> {
        self.registry.set_parametric(tag, factory)?;
        self.invalidate_paragraphs();
        Ok(())
    }

    pub fn set_replacement_for_tag(&mut self, tag: &str, template: &str) -> Result<()> {
        self.registry.set_replacement(tag, template)?;
        self.invalidate_paragraphs();
        Ok(())
    }

    /// Forgets every meaning of `tag`. Returns whether it had one.
    pub fn remove_tag(&mut self, tag: &str) -> bool {
        let removed = self.registry.remove(tag);
        if removed {
            self.invalidate_paragraphs();
        }
        removed
    }

    pub fn set_alignment(&mut self, alignment: Alignment) {
        self.alignment = alignment;
        self.invalidate_paragraphs();
    }

    pub fn set_vertical_alignment(&mut self, vertical: VerticalAlignment) {
        self.vertical = vertical;
        self.invalidate_paragraphs();
    }

    pub fn fit_settings(&self) -> &FitSettings {
        &self.fit_settings
    }

    pub fn set_fit_strategy(&mut self, strategy: FitStrategy) {
        self.fit_settings.strategy = strategy;
        self.invalidate_fit();
    }

    /// Line spacing used when the fit strategy does not tighten.
    pub fn set_tightness(&mut self, tightness: f32) -> Result<()> {
        if !(tightness > 0.0 && tightness.is_finite()) {
            return Err(MarkupError::InvalidTightness {
                min: tightness,
                max: tightness,
            });
        }
        self.fit_settings.tightness = tightness;
        self.invalidate_fit();
        Ok(())
    }

    pub fn set_tightness_range(&mut self, min: f32, max: f32) -> Result<()> {
        if !(min > 0.0 && min <= max && max.is_finite()) {
            return Err(MarkupError::InvalidTightness { min, max });
        }
        self.fit_settings.min_tightness = min;
        self.fit_settings.max_tightness = max;
        self.invalidate_fit();
        Ok(())
    }

    pub fn set_min_scale(&mut self, scale: f32) -> Result<()> {
        if !(scale > 0.0 && scale <= 1.0) {
            return Err(MarkupError::InvalidScale(scale));
        }
        self.fit_settings.min_scale = scale;
        self.invalidate_fit();
        Ok(())
    }

    pub fn set_punctuation_replacement(&mut self, enabled: bool) {
        self.punctuation = enabled;
        self.invalidate_paragraphs();
    }

    pub fn set_autoclose(&mut self, enabled: bool) {
        self.autoclose = enabled;
        self.invalidate_paragraphs();
    }

    /// Multiple of a paragraph's source length that macro expansion may
    /// produce before the paragraph is abandoned.
    pub fn set_expansion_limit(&mut self, limit: usize) -> Result<()> {
        if limit == 0 {
            return Err(MarkupError::InvalidExpansionLimit);
        }
        self.expansion_limit = limit;
        self.invalidate_paragraphs();
        Ok(())
    }

    pub fn set_tab_widths(&mut self, widths: Vec<f32>) {
        self.tab_widths = widths;
        self.invalidate_paragraphs();
    }

    /// Outline the target rectangle when text still overflows it after
    /// fitting.
    pub fn set_bad_box_diagnostics(&mut self, enabled: bool) {
        self.bad_box = enabled;
    }

    /// Mark the effective page-shape margins when drawing.
    pub fn set_shape_debug(&mut self, enabled: bool) {
        self.shape_debug = enabled;
    }

    pub fn set_unknown_tag_handler(&mut self, handler: Rc<dyn UnknownTagHandler>) {
        self.hooks.unknown_tags = handler;
        self.invalidate_paragraphs();
    }

    pub fn set_script_evaluator(&mut self, evaluator: Option<Rc<dyn ScriptEvaluator>>) {
        self.hooks.script = evaluator;
        self.invalidate_paragraphs();
    }

    pub fn set_style_adjuster(&mut self, adjuster: Rc<dyn StyleAdjuster>) {
        self.hooks.style_adjuster = adjuster;
        self.invalidate_paragraphs();
    }

    pub fn set_paragraph_splitter(&mut self, splitter: Rc<dyn ParagraphSplitter>) {
        self.hooks.splitter = splitter;
        self.invalidate_paragraphs();
    }

    pub fn set_image_resolver(&mut self, resolver: Rc<dyn ImageResolver>) {
        self.image_resolver = resolver;
        self.invalidate_paragraphs();
    }

    /// Directory that relative image paths are resolved against.
    pub fn set_base_path(&mut self, base: Option<PathBuf>) {
        self.base_path = base;
        self.invalidate_paragraphs();
    }

    pub fn base_path(&self) -> Option<&Path> {
        self.base_path.as_deref()
    }

    pub fn hooks(&self) -> &Hooks {
        &self.hooks
    }

    /// Definitions kept across parses.
    pub fn library(&self) -> &Definitions {
        &self.library
    }

    /// Adds one definition to the library, as a `<define>` in a library
    /// file would.
    pub fn define(&mut self, name: &str, template: impl Into<String>) {
        self.library.define(name, template);
        self.invalidate_paragraphs();
    }

    /// Parses `markup` only for its definitions, which join the library.
    /// Whatever text it contains is discarded.
    pub fn parse_library(&mut self, markup: &str) {
        let sources = self.hooks.splitter.split(markup);
        let state = self.document_state();
        let mut library = std::mem::take(&mut self.library);
        let document = self
            .interpreter(&self.hooks)
            .document(&sources, &mut library, state);
        tracing::debug!(
            definitions = library.len(),
            discarded = document.paragraphs.len(),
            "parsed library"
        );
        self.library = library;
        self.invalidate_paragraphs();
    }

    fn document_state(&self) -> DocumentState {
        DocumentState::new(
            self.alignment,
            self.vertical,
            self.tab_widths.clone(),
            self.autoclose,
        )
    }

    fn interpreter<'a>(&'a self, hooks: &'a Hooks) -> Interpreter<'a> {
        Interpreter {
            registry: &self.registry,
            hooks,
            default_style: &self.default_style,
            base_path: self.base_path.as_deref(),
            image_resolver: self.image_resolver.as_ref(),
            punctuation: self.punctuation,
            expansion_limit: self.expansion_limit,
        }
    }

    /// Interprets `markup` with this engine's settings, without touching the
    /// current markup or its caches. Definitions made inside `markup` are
    /// dropped afterwards.
    pub fn interpret(&self, markup: &str) -> Document {
        self.interpret_with(markup, &self.hooks)
    }

    /// As [`interpret`](Self::interpret), with a different set of hooks.
    pub fn interpret_with(&self, markup: &str, hooks: &Hooks) -> Document {
        let sources = hooks.splitter.split(markup);
        let mut definitions = self.library.clone();
        self.interpreter(hooks)
            .document(&sources, &mut definitions, self.document_state())
    }

    fn parsed(&mut self) -> Rc<Parsed> {
        if let Some(parsed) = &self.parsed {
            return Rc::clone(parsed);
        }
        let document = self.interpret(&self.markup);
        let prepared = document
            .paragraphs
            .iter()
            .map(|paragraph| PreparedParagraph::new(paragraph, &self.default_style))
            .collect();
        tracing::debug!(paragraphs = document.paragraphs.len(), "parsed markup");
        let parsed = Rc::new(Parsed { document, prepared });
        self.parsed = Some(Rc::clone(&parsed));
        parsed
    }

    /// The interpreted paragraphs of the current markup.
    pub fn paragraphs(&mut self) -> Vec<Paragraph> {
        self.parsed().document.paragraphs.clone()
    }

    /// Chooses tightness and scale for `rect` under the current fit
    /// strategy.
    pub fn fit(&mut self, rect: LayoutRect) -> Fit {
        if let Some(cached) = self.fit_cache {
            if cached.rect == rect {
                return cached.fit;
            }
        }
        let parsed = self.parsed();
        let fit = layout::fit(
            &parsed.prepared,
            rect,
            self.measurer.as_ref(),
            self.shape.as_ref(),
            &self.fit_settings,
        );
        self.fit_cache = Some(CachedFit { rect, fit });
        fit
    }

    /// Height the text needs in `rect` once fitted.
    pub fn measure(&mut self, rect: LayoutRect) -> f32 {
        self.fit(rect).height
    }

    /// Paints the text into `rect` and returns the y just below it.
    pub fn draw(&mut self, rect: LayoutRect, surface: &mut dyn Surface) -> f32 {
        let bottom = self.run_layout(rect, &mut LayoutSink::Draw(&mut *surface));
        if self.bad_box && self.fit(rect).height > rect.height + OVERFLOW_EPSILON {
            surface.draw_dashed_rect(rect);
        }
        if self.shape_debug {
            for edge in sample_edges(self.shape.as_ref(), rect, 1.0) {
                surface.draw_edge_marker(edge.left, edge.y);
                surface.draw_edge_marker(edge.right - 1.0, edge.y);
            }
        }
        bottom
    }

    /// Appends the laid-out runs to `out` instead of painting them, and
    /// returns the y just below the text.
    pub fn append_segments(&mut self, rect: LayoutRect, out: &mut Vec<PositionedRun>) -> f32 {
        self.run_layout(rect, &mut LayoutSink::Segments(out))
    }

    fn run_layout(&mut self, rect: LayoutRect, sink: &mut LayoutSink<'_>) -> f32 {
        let fit = self.fit(rect);
        let parsed = self.parsed();
        let offset = parsed.document.vertical.offset(rect.height, fit.height);
        let params = LayoutParams {
            measurer: self.measurer.as_ref(),
            shape: self.shape.as_ref(),
            tightness: fit.tightness,
            scale: fit.scale,
        };
        let height = layout::layout_paragraphs(&parsed.prepared, rect, &params, offset, sink);
        rect.y + offset + height
    }
}

impl std::fmt::Debug for MarkupEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MarkupEngine")
            .field("measurer", &self.measurer)
            .field("markup", &self.markup)
            .field("shape", &self.shape)
            .field("fit_settings", &self.fit_settings)
            .field("library", &self.library.len())
            .field("cached", &self.parsed.is_some())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[path = "engine_tests.rs"]
mod tests;
