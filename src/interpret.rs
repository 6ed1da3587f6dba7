//! Tag interpreter: turns one paragraph of markup into plain text, style
//! ranges, and paragraph-level layout flags.
//!
//! The input is held as a work list (a reversed character stack). Macro
//! expansions, script results, and unknown-tag replacements are pushed back
//! onto the list and parsed in place, each push charged against an
//! [`ExpansionBudget`] so that a recursive definition fails with
//! [`MarkupError::ExpansionLimit`] instead of running away.
//!
//! A tag's text is dispatched in a fixed order: macros, script hooks,
//! `<define>`, style tags, `<nopunc>`, parametric styles, layout controls,
//! and finally the unknown-tag hook.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use crate::error::{MarkupError, Result};
use crate::factory::{
    ParametricStyle, StyleContext, default_parametric_styles, parse_measure, split_parameters,
};
use crate::hooks::Hooks;
use crate::image::ImageResolver;
use crate::layout::{Alignment, VerticalAlignment};
use crate::segment::heading_level;
use crate::style::{
    self, AttrKey, Attribute, HEADING_LEVELS, ResolvedStyle, StyleRange, StyledText, TextStyle,
    heading_style,
};

/// The character an inline image stands on.
pub const OBJECT_REPLACEMENT: char = '\u{FFFC}';

/// Default expansion limit, as a multiple of a paragraph's source length.
pub const DEFAULT_EXPANSION_LIMIT: usize = 32;

/// No paragraph gets a smaller expansion budget than this, however short
/// its source.
pub const MIN_EXPANSION_BUDGET: usize = 1024;

/// Checks a tag name for registration and folds it to lowercase.
pub fn normalize_tag_name(name: &str) -> Result<String> {
    let invalid = name.is_empty()
        || name.starts_with('/')
        || name
            .chars()
            .any(|c| c.is_whitespace() || matches!(c, '<' | '>' | '"'));
    if invalid {
        return Err(MarkupError::InvalidTagName(name.to_string()));
    }
    Ok(name.to_lowercase())
}

/// Tag name → meaning. A name has at most one meaning: registering it in
/// one table removes it from the others.
#[derive(Debug, Clone)]
pub struct TagRegistry {
    styles: HashMap<String, Arc<TextStyle>>,
    parametric: HashMap<String, Arc<dyn ParametricStyle>>,
    replacements: HashMap<String, String>,
}

impl Default for TagRegistry {
    fn default() -> Self {
        let mut styles = HashMap::new();
        for (name, shared) in [
            ("b", &style::BOLD),
            ("i", &style::ITALIC),
            ("u", &style::UNDERLINE),
            ("del", &style::STRIKETHROUGH),
            ("s", &style::STRIKETHROUGH),
            ("sup", &style::SUPERSCRIPT),
            ("sub", &style::SUBSCRIPT),
            ("tt", &style::MONOSPACE),
        ] {
            styles.insert(name.to_string(), Arc::clone(&**shared));
        }
        for level in 1..=HEADING_LEVELS {
            styles.insert(format!("h{level}"), Arc::new(heading_style(level)));
        }
        let parametric = default_parametric_styles()
            .into_iter()
            .map(|(name, factory)| (name.to_string(), factory))
            .collect();
        Self {
            styles,
            parametric,
            replacements: HashMap::new(),
        }
    }
}

impl TagRegistry {
    /// An empty registry with no tags at all.
    pub fn empty() -> Self {
        Self {
            styles: HashMap::new(),
            parametric: HashMap::new(),
            replacements: HashMap::new(),
        }
    }

    pub fn set_style(&mut self, tag: &str, style: Arc<TextStyle>) -> Result<()> {
        let tag = normalize_tag_name(tag)?;
        self.forget(&tag);
        self.styles.insert(tag, style);
        Ok(())
    }

    pub fn set_parametric(&mut self, tag: &str, factory: Arc<dyn ParametricStyle>) -> Result<()> {
        let tag = normalize_tag_name(tag)?;
        self.forget(&tag);
        self.parametric.insert(tag, factory);
        Ok(())
    }

    /// Registers replacement markup for `tag`. The template may use `@n;`
    /// parameter references.
    pub fn set_replacement(&mut self, tag: &str, template: &str) -> Result<()> {
        let tag = normalize_tag_name(tag)?;
        self.forget(&tag);
        self.replacements.insert(tag, template.to_string());
        Ok(())
    }

    /// Removes any meaning `tag` has. Returns whether it had one.
    pub fn remove(&mut self, tag: &str) -> bool {
        self.forget(&tag.to_lowercase())
    }

    fn forget(&mut self, tag: &str) -> bool {
        let style = self.styles.remove(tag).is_some();
        let parametric = self.parametric.remove(tag).is_some();
        let replacement = self.replacements.remove(tag).is_some();
        style || parametric || replacement
    }

    pub fn style(&self, tag: &str) -> Option<&Arc<TextStyle>> {
        self.styles.get(tag)
    }

    pub fn parametric(&self, tag: &str) -> Option<&Arc<dyn ParametricStyle>> {
        self.parametric.get(tag)
    }

    pub fn replacement(&self, tag: &str) -> Option<&str> {
        self.replacements.get(tag).map(String::as_str)
    }
}

/// Macro table filled by `<define name "template">`. Names are case-folded.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Definitions {
    table: HashMap<String, String>,
}

impl Definitions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn define(&mut self, name: &str, template: impl Into<String>) {
        self.table.insert(name.to_lowercase(), template.into());
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.table.get(&name.to_lowercase()).map(String::as_str)
    }

    pub fn remove(&mut self, name: &str) -> Option<String> {
        self.table.remove(&name.to_lowercase())
    }

    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    pub fn clear(&mut self) {
        self.table.clear();
    }
}

/// Replaces `@n;` in `template` with the n-th parameter (1-based).
/// References past the end of `params`, or to `@0;`, become `?n?`.
pub fn expand_template(template: &str, params: &[String]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(at) = rest.find('@') {
        out.push_str(&rest[..at]);
        let after = &rest[at + 1..];
        let digits = after.len() - after.trim_start_matches(|c: char| c.is_ascii_digit()).len();
        if digits > 0 && after[digits..].starts_with(';') {
            let index: usize = after[..digits].parse().unwrap_or(0);
            match index.checked_sub(1).and_then(|i| params.get(i)) {
                Some(param) => out.push_str(param),
                None => out.push_str(&format!("?{index}?")),
            }
            rest = &after[digits + 1..];
        } else {
            out.push('@');
            rest = after;
        }
    }
    out.push_str(rest);
    out
}

/// Bounds the characters a paragraph may push back onto its work list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExpansionBudget {
    limit: usize,
    used: usize,
}

impl ExpansionBudget {
    /// `multiple` × the source length, at least [`MIN_EXPANSION_BUDGET`].
    pub fn new(source_len: usize, multiple: usize) -> Self {
        let limit = source_len
            .max(1)
            .saturating_mul(multiple)
            .max(MIN_EXPANSION_BUDGET);
        Self { limit, used: 0 }
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    pub fn remaining(&self) -> usize {
        self.limit.saturating_sub(self.used)
    }

    pub fn charge(&mut self, chars: usize) -> Result<()> {
        self.used = self.used.saturating_add(chars);
        if self.used > self.limit {
            return Err(MarkupError::ExpansionLimit { limit: self.limit });
        }
        Ok(())
    }
}

/// Layout state that tags change and that persists from one paragraph to
/// the next within a single parse.
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentState {
    pub alignment: Alignment,
    pub vertical: VerticalAlignment,
    pub tightness_delta: f32,
    pub tab_widths: Vec<f32>,
    pub autoclose: bool,
    /// Punctuation substitution runs while this is zero or more.
    pub punctuation_counter: i32,
    base_alignment: Alignment,
    base_vertical: VerticalAlignment,
    base_tab_widths: Vec<f32>,
}

impl DocumentState {
    /// State at the start of a document. Closing a layout tag returns to
    /// these values.
    pub fn new(
        alignment: Alignment,
        vertical: VerticalAlignment,
        tab_widths: Vec<f32>,
        autoclose: bool,
    ) -> Self {
        Self {
            alignment,
            vertical,
            tightness_delta: 0.0,
            tab_widths: tab_widths.clone(),
            autoclose,
            punctuation_counter: 0,
            base_alignment: alignment,
            base_vertical: vertical,
            base_tab_widths: tab_widths,
        }
    }
}

impl Default for DocumentState {
    fn default() -> Self {
        Self::new(Alignment::Left, VerticalAlignment::Top, Vec::new(), true)
    }
}

/// Per-paragraph layout flags, captured when the paragraph ends.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ParagraphFlags {
    pub alignment: Alignment,
    /// Level of the heading tag opened in this paragraph, if any.
    pub heading: Option<u8>,
    pub tightness_delta: f32,
    /// Tab stop widths; empty means the layout default.
    pub tab_widths: Vec<f32>,
}

/// One interpreted paragraph. `text` is never empty.
#[derive(Debug, Clone, PartialEq)]
pub struct Paragraph {
    pub text: String,
    pub styles: Vec<StyleRange>,
    pub flags: ParagraphFlags,
    /// Byte offsets of the tab characters in `text`.
    pub tabs: Vec<usize>,
}

impl Paragraph {
    pub fn is_heading(&self) -> bool {
        self.flags.heading.is_some()
    }

    /// The text with every range applied, in the order the ranges opened.
    pub fn styled_text(&self) -> StyledText {
        let mut styled = StyledText::new(self.text.clone());
        for range in &self.styles {
            if let Err(err) = styled.apply(range.clone()) {
                tracing::warn!(%err, "dropping style range");
            }
        }
        styled
    }
}

/// The result of interpreting a whole document.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Document {
    pub paragraphs: Vec<Paragraph>,
    /// Vertical anchor in effect when the document ended.
    pub vertical: VerticalAlignment,
}

#[derive(Debug, Clone)]
struct Frame {
    style: Arc<TextStyle>,
    start: usize,
    seq: usize,
}

/// A style still open at the end of a paragraph, reopened at offset 0 of
/// the next one.
#[derive(Debug, Clone)]
struct CarriedStyle {
    tag: String,
    style: Arc<TextStyle>,
}

/// Open style frames of one paragraph parse: tag name → stack of frames.
#[derive(Debug, Default)]
struct OpenStyles {
    stacks: HashMap<String, Vec<Frame>>,
    next_seq: usize,
}

impl OpenStyles {
    fn next_seq(&mut self) -> usize {
        self.next_seq += 1;
        self.next_seq
    }

    fn open(&mut self, tag: &str, style: Arc<TextStyle>, start: usize) {
        let seq = self.next_seq();
        self.stacks
            .entry(tag.to_string())
            .or_default()
            .push(Frame { style, start, seq });
    }

    fn close(&mut self, tag: &str) -> Option<Frame> {
        self.stacks.get_mut(tag).and_then(Vec::pop)
    }

    /// The default style with every open frame applied, oldest first.
    fn resolve(&self, default: &ResolvedStyle) -> ResolvedStyle {
        let mut frames: Vec<&Frame> = self.stacks.values().flatten().collect();
        frames.sort_by_key(|frame| frame.seq);
        let mut resolved = default.clone();
        for frame in frames {
            resolved.apply(&frame.style);
        }
        resolved
    }

    /// Removes every open frame, oldest first.
    fn drain(&mut self) -> Vec<(String, Frame)> {
        let mut frames: Vec<(String, Frame)> = self
            .stacks
            .drain()
            .flat_map(|(tag, stack)| stack.into_iter().map(move |frame| (tag.clone(), frame)))
            .collect();
        frames.sort_by_key(|(_, frame)| frame.seq);
        frames
    }
}

/// What a factory sees while a paragraph is being parsed.
struct OpenContext<'c> {
    resolved: ResolvedStyle,
    base_path: Option<&'c Path>,
    resolver: &'c dyn ImageResolver,
}

impl StyleContext for OpenContext<'_> {
    fn current(&self, key: AttrKey) -> Option<Attribute> {
        self.resolved.attribute(key)
    }

    fn base_path(&self) -> Option<&Path> {
        self.base_path
    }

    fn image_resolver(&self) -> &dyn ImageResolver {
        self.resolver
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Text,
    TagStart,
    TagBody,
    TagQuoted,
    TagQuotedEscape,
}

/// Everything an interpretation pass reads but never changes.
#[derive(Clone, Copy)]
pub struct Interpreter<'a> {
    pub registry: &'a TagRegistry,
    pub hooks: &'a Hooks,
    pub default_style: &'a ResolvedStyle,
    pub base_path: Option<&'a Path>,
    pub image_resolver: &'a dyn ImageResolver,
    pub punctuation: bool,
    pub expansion_limit: usize,
}

impl Interpreter<'_> {
    /// Interprets every paragraph source in order.
    ///
    /// A paragraph that exceeds its expansion budget is replaced by the
    /// error message; the paragraphs after it are unaffected, and still
    /// see any styles carried over from before it.
    pub fn document(
        &self,
        sources: &[String],
        definitions: &mut Definitions,
        mut state: DocumentState,
    ) -> Document {
        let mut paragraphs = Vec::with_capacity(sources.len());
        let mut carried = Vec::new();
        for (index, source) in sources.iter().enumerate() {
            let is_last = index + 1 == sources.len();
            let parser = ParagraphParser::new(self, definitions, &mut state, source);
            // A failed paragraph passes its carried styles on untouched.
            match parser.run(carried.clone(), is_last) {
                Ok((paragraph, carry)) => {
                    paragraphs.push(paragraph);
                    carried = carry;
                }
                Err(err) => {
                    tracing::warn!(paragraph = index, %err, "paragraph expansion failed");
                    paragraphs.push(Paragraph {
                        text: err.to_string(),
                        styles: Vec::new(),
                        flags: flags_from(&state, None),
                        tabs: Vec::new(),
                    });
                }
            }
        }
        Document {
            paragraphs,
            vertical: state.vertical,
        }
    }

    /// Interprets a single paragraph source as the last paragraph of a
    /// document, so nothing carries over.
    pub fn paragraph(
        &self,
        source: &str,
        definitions: &mut Definitions,
        state: &mut DocumentState,
    ) -> Result<Paragraph> {
        ParagraphParser::new(self, definitions, state, source)
            .run(Vec::new(), true)
            .map(|(paragraph, _)| paragraph)
    }
}

fn flags_from(state: &DocumentState, heading: Option<u8>) -> ParagraphFlags {
    ParagraphFlags {
        alignment: state.alignment,
        heading,
        tightness_delta: state.tightness_delta,
        tab_widths: state.tab_widths.clone(),
    }
}

fn is_opening_context(c: Option<char>) -> bool {
    match c {
        None => true,
        Some(c) => c.is_whitespace() || matches!(c, '(' | '[' | '{' | '“' | '‘' | '—' | '–'),
    }
}

struct ParagraphParser<'p, 'a> {
    interpreter: &'p Interpreter<'a>,
    definitions: &'p mut Definitions,
    state: &'p mut DocumentState,
    input: Vec<char>,
    budget: ExpansionBudget,
    text: String,
    /// Finished ranges tagged with the sequence number of their opening.
    ranges: Vec<(usize, StyleRange)>,
    open: OpenStyles,
    tabs: Vec<usize>,
    heading: Option<u8>,
    quote_depth: usize,
    /// Punctuation substitution never looks at text before this offset.
    protect_from: usize,
}

impl<'p, 'a> ParagraphParser<'p, 'a> {
    fn new(
        interpreter: &'p Interpreter<'a>,
        definitions: &'p mut Definitions,
        state: &'p mut DocumentState,
        source: &str,
    ) -> Self {
        let input: Vec<char> = source.chars().rev().collect();
        let budget = ExpansionBudget::new(input.len(), interpreter.expansion_limit);
        Self {
            interpreter,
            definitions,
            state,
            input,
            budget,
            text: String::with_capacity(source.len()),
            ranges: Vec::new(),
            open: OpenStyles::default(),
            tabs: Vec::new(),
            heading: None,
            quote_depth: 0,
            protect_from: 0,
        }
    }

    fn run(mut self, carried: Vec<CarriedStyle>, is_last: bool) -> Result<(Paragraph, Vec<CarriedStyle>)> {
        for carry in carried {
            self.open.open(&carry.tag, carry.style, 0);
        }

        let mut state = State::Text;
        let mut tag = String::new();
        while let Some(c) = self.input.pop() {
            state = match state {
                State::Text => match c {
                    '<' => {
                        tag.clear();
                        State::TagStart
                    }
                    '\t' => {
                        self.tabs.push(self.text.len());
                        self.emit_literal("\t");
                        State::Text
                    }
                    _ => {
                        self.emit(c);
                        State::Text
                    }
                },
                State::TagStart if c.is_whitespace() => {
                    self.emit('<');
                    self.input.push(c);
                    State::Text
                }
                State::TagStart if c == '>' => {
                    self.emit_literal("<>");
                    State::Text
                }
                State::TagStart | State::TagBody => match c {
                    '>' => {
                        let body = std::mem::take(&mut tag);
                        self.dispatch(&body)?;
                        self.protect_from = self.text.len();
                        State::Text
                    }
                    '"' => {
                        tag.push(c);
                        State::TagQuoted
                    }
                    _ => {
                        tag.push(c);
                        State::TagBody
                    }
                },
                State::TagQuoted => {
                    tag.push(c);
                    match c {
                        '\\' => State::TagQuotedEscape,
                        '"' => State::TagBody,
                        _ => State::TagQuoted,
                    }
                }
                State::TagQuotedEscape => {
                    tag.push(c);
                    State::TagQuoted
                }
            };
        }
        if state != State::Text {
            // An unterminated tag is plain text.
            self.emit_literal(&format!("<{tag}"));
        }

        Ok(self.finish(is_last))
    }

    fn finish(mut self, is_last: bool) -> (Paragraph, Vec<CarriedStyle>) {
        let len = self.text.len();
        let autoclose = self.state.autoclose;
        let mut carried = Vec::new();
        for (tag, frame) in self.open.drain() {
            if autoclose || !is_last {
                if let Some(range) = StyleRange::new(Arc::clone(&frame.style), frame.start, len) {
                    self.ranges.push((frame.seq, range));
                }
            }
            if !autoclose && !is_last {
                carried.push(CarriedStyle {
                    tag,
                    style: frame.style,
                });
            }
        }
        self.ranges.sort_by_key(|(seq, _)| *seq);

        if self.text.is_empty() {
            self.text.push(' ');
        }
        let paragraph = Paragraph {
            text: self.text,
            styles: self.ranges.into_iter().map(|(_, range)| range).collect(),
            flags: flags_from(self.state, self.heading),
            tabs: self.tabs,
        };
        (paragraph, carried)
    }

    fn push_back(&mut self, markup: &str) -> Result<()> {
        self.budget.charge(markup.chars().count())?;
        self.input.extend(markup.chars().rev());
        Ok(())
    }

    /// Appends text that punctuation substitution must never rewrite.
    fn emit_literal(&mut self, literal: &str) {
        self.text.push_str(literal);
        self.protect_from = self.text.len();
    }

    fn punctuation_enabled(&self) -> bool {
        self.interpreter.punctuation && self.state.punctuation_counter >= 0
    }

    /// The last character written so far. Tags in between do not hide it,
    /// so quotes around styled words still pair up.
    fn previous_char(&self) -> Option<char> {
        self.text.chars().next_back()
    }

    fn ends_with_unprotected(&self, suffix: &str) -> bool {
        self.text[self.protect_from..].ends_with(suffix)
    }

    fn replace_tail(&mut self, tail_len: usize, with: char) {
        self.text.truncate(self.text.len() - tail_len);
        self.text.push(with);
    }

    fn emit(&mut self, c: char) {
        if !self.punctuation_enabled() {
            self.text.push(c);
            return;
        }
        match c {
            '"' => {
                let previous = self.previous_char();
                if self.quote_depth > 0 && !is_opening_context(previous) {
                    self.quote_depth -= 1;
                    self.text.push('”');
                } else {
                    self.quote_depth += 1;
                    self.text.push('“');
                }
            }
            '\'' => {
                let previous = self.previous_char();
                if is_opening_context(previous) {
                    self.text.push('‘');
                } else {
                    self.text.push('’');
                }
            }
            '-' if self.ends_with_unprotected("-") => self.replace_tail(1, '–'),
            '-' if self.ends_with_unprotected("–") => self.replace_tail('–'.len_utf8(), '—'),
            '.' if self.ends_with_unprotected("..") => self.replace_tail(2, '…'),
            _ => self.text.push(c),
        }
    }

    fn context(&self) -> OpenContext<'a> {
        OpenContext {
            resolved: self.open.resolve(self.interpreter.default_style),
            base_path: self.interpreter.base_path,
            resolver: self.interpreter.image_resolver,
        }
    }

    fn close_frame(&mut self, tag: &str) {
        if let Some(frame) = self.open.close(tag) {
            if let Some(range) = StyleRange::new(frame.style, frame.start, self.text.len()) {
                self.ranges.push((frame.seq, range));
            }
        }
    }

    fn open_frame(&mut self, tag: &str, style: Arc<TextStyle>) {
        let context = self.context();
        let style = self
            .interpreter
            .hooks
            .style_adjuster
            .adjust_style(tag, style, &context);
        self.open.open(tag, style, self.text.len());
    }

    fn dispatch(&mut self, body: &str) -> Result<()> {
        let (name_raw, rest) = match body.find(char::is_whitespace) {
            Some(split) => (&body[..split], body[split..].trim_start()),
            None => (body, ""),
        };
        let name = name_raw.to_lowercase();
        let bare = name.strip_prefix('/').unwrap_or(&name);
        let closing = bare.len() != name.len();
        let interpreter = self.interpreter;

        // 1. macros
        let template = self
            .definitions
            .get(&name)
            .or_else(|| interpreter.registry.replacement(&name))
            .map(str::to_owned);
        if let Some(template) = template {
            let expanded = expand_template(&template, &split_parameters(rest));
            return self.push_back(&expanded);
        }

        // 2. script hooks
        if bare == "eval" || bare == "script" {
            if closing {
                return Ok(());
            }
            let result = interpreter.hooks.script.as_ref().and_then(|script| {
                if bare == "eval" {
                    script.evaluate(rest)
                } else {
                    script.call(&split_parameters(rest))
                }
            });
            return self.push_back(&result.unwrap_or_default());
        }

        // 3. definitions
        if bare == "define" {
            if !closing {
                let params = split_parameters(rest);
                if let Some(macro_name) = params.first() {
                    let template = params.get(1).cloned().unwrap_or_default();
                    self.definitions.define(macro_name, template);
                }
            }
            return Ok(());
        }

        // 4. style tags
        if let Some(shared) = interpreter.registry.style(bare) {
            if closing {
                self.close_frame(bare);
            } else {
                if let Some(level) = heading_level(bare) {
                    self.heading = Some(level);
                }
                self.open_frame(bare, Arc::clone(shared));
            }
            return Ok(());
        }

        // 5. punctuation toggle
        if bare == "nopunc" {
            self.state.punctuation_counter += if closing { 1 } else { -1 };
            return Ok(());
        }

        // 6. parametric styles
        if let Some(factory) = interpreter.registry.parametric(bare) {
            if closing {
                self.close_frame(bare);
                return Ok(());
            }
            let context = self.context();
            let created = Arc::new(factory.create_style(&context, &split_parameters(rest)));
            if created.replacement().is_some() {
                let style = interpreter
                    .hooks
                    .style_adjuster
                    .adjust_style(bare, created, &context);
                self.emit_object(style);
            } else {
                self.open_frame(bare, created);
            }
            return Ok(());
        }

        // 7. layout controls
        if self.layout_control(bare, closing, rest)? {
            return Ok(());
        }

        // 8. unknown
        match interpreter
            .hooks
            .unknown_tags
            .handle_unknown_tag(&body.to_lowercase(), body)
        {
            Some(replacement) => self.push_back(&replacement),
            None => {
                tracing::debug!(tag = body, "dropping unknown tag");
                Ok(())
            }
        }
    }

    /// Places an inline object with its style applied immediately.
    fn emit_object(&mut self, style: Arc<TextStyle>) {
        let start = self.text.len();
        self.emit_literal(&OBJECT_REPLACEMENT.to_string());
        let seq = self.open.next_seq();
        if let Some(range) = StyleRange::new(style, start, self.text.len()) {
            self.ranges.push((seq, range));
        }
    }

    /// Handles the tags that change layout state. Returns `false` if `bare`
    /// is not one of them.
    fn layout_control(&mut self, bare: &str, closing: bool, rest: &str) -> Result<bool> {
        let state = &mut *self.state;
        match bare {
            "left" | "center" | "right" | "justify" => {
                state.alignment = if closing {
                    state.base_alignment
                } else {
                    match bare {
                        "center" => Alignment::Center,
                        "right" => Alignment::Right,
                        "justify" => Alignment::Justify,
                        _ => Alignment::Left,
                    }
                };
            }
            "top" | "middle" | "bottom" => {
                state.vertical = if closing {
                    state.base_vertical
                } else {
                    match bare {
                        "middle" => VerticalAlignment::Middle,
                        "bottom" => VerticalAlignment::Bottom,
                        _ => VerticalAlignment::Top,
                    }
                };
            }
            "tabwidth" => {
                let widths: Vec<f32> = split_parameters(rest)
                    .iter()
                    .filter_map(|p| parse_measure(p))
                    .filter(|w| *w > 0.0)
                    .collect();
                state.tab_widths = if closing || widths.is_empty() {
                    state.base_tab_widths.clone()
                } else {
                    widths
                };
            }
            "tighten" | "loosen" => {
                if closing {
                    state.tightness_delta = 0.0;
                } else {
                    let delta = split_parameters(rest)
                        .first()
                        .and_then(|p| p.parse::<f32>().ok())
                        .filter(|d| d.is_finite())
                        .unwrap_or(0.1);
                    if bare == "tighten" {
                        state.tightness_delta -= delta;
                    } else {
                        state.tightness_delta += delta;
                    }
                }
            }
            "autoclose" => {
                state.autoclose = !closing
                    && !split_parameters(rest).first().is_some_and(|p| {
                        matches!(p.to_ascii_lowercase().as_str(), "off" | "no" | "false" | "0")
                    });
            }
            "repeat" => {
                if !closing {
                    let params = split_parameters(rest);
                    let count = params
                        .first()
                        .and_then(|p| p.parse::<usize>().ok())
                        .unwrap_or(0);
                    let unit = params.get(1).map(String::as_str).unwrap_or_default();
                    self.budget
                        .charge(unit.chars().count().saturating_mul(count))?;
                    self.input.extend(unit.repeat(count).chars().rev());
                }
            }
            "lt" | "gt" => {
                if !closing {
                    self.emit_literal(if bare == "lt" { "<" } else { ">" });
                }
            }
            _ => return Ok(false),
        }
        Ok(true)
    }
}

#[cfg(test)]
#[path = "interpret_tests.rs"]
mod tests;
