//! Style model: attribute bags, fully resolved styles, and style ranges.
//!
//! A [`TextStyle`] only names the attributes it changes. Ranges apply their
//! styles over a default [`ResolvedStyle`] to produce the concrete style of
//! each run of text.

use std::collections::BTreeMap;
use std::ops::Range;
use std::sync::{Arc, LazyLock};

use ratatui::style::{Color, Modifier, Style};

use crate::error::{MarkupError, Result};
use crate::image::InlineImage;

/// Identifies one style attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum AttrKey {
    Family,
    Size,
    SizeScale,
    Weight,
    Width,
    Posture,
    Foreground,
    Background,
    Underline,
    Strikethrough,
    Kerning,
    Ligatures,
    Tracking,
    Superscript,
    Replacement,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Posture {
    #[default]
    Upright,
    Oblique,
}

/// One style attribute together with its value.
#[derive(Debug, Clone, PartialEq)]
pub enum Attribute {
    Family(String),
    /// Absolute size in points.
    Size(f32),
    /// Multiplier applied to the size in effect.
    SizeScale(f32),
    /// CSS-style weight, 100 to 900.
    Weight(f32),
    /// Stretch factor, 1.0 is regular.
    Width(f32),
    Posture(Posture),
    Foreground(Color),
    Background(Color),
    Underline(bool),
    Strikethrough(bool),
    Kerning(bool),
    Ligatures(bool),
    /// Extra letter spacing in ems.
    Tracking(f32),
    /// +1 raises, -1 lowers.
    Superscript(i8),
    Replacement(InlineImage),
}

impl Attribute {
    pub fn key(&self) -> AttrKey {
        match self {
            Self::Family(_) => AttrKey::Family,
            Self::Size(_) => AttrKey::Size,
            Self::SizeScale(_) => AttrKey::SizeScale,
            Self::Weight(_) => AttrKey::Weight,
            Self::Width(_) => AttrKey::Width,
            Self::Posture(_) => AttrKey::Posture,
            Self::Foreground(_) => AttrKey::Foreground,
            Self::Background(_) => AttrKey::Background,
            Self::Underline(_) => AttrKey::Underline,
            Self::Strikethrough(_) => AttrKey::Strikethrough,
            Self::Kerning(_) => AttrKey::Kerning,
            Self::Ligatures(_) => AttrKey::Ligatures,
            Self::Tracking(_) => AttrKey::Tracking,
            Self::Superscript(_) => AttrKey::Superscript,
            Self::Replacement(_) => AttrKey::Replacement,
        }
    }
}

/// An attribute bag. Build it once, then share it behind an `Arc`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TextStyle {
    attributes: BTreeMap<AttrKey, Attribute>,
}

impl TextStyle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns this style with `attribute` added, replacing any previous
    /// value for the same key.
    pub fn with(mut self, attribute: Attribute) -> Self {
        self.insert(attribute);
        self
    }

    pub fn insert(&mut self, attribute: Attribute) {
        self.attributes.insert(attribute.key(), attribute);
    }

    /// Adds every attribute of `other`, overriding shared keys.
    pub fn extend(&mut self, other: &TextStyle) {
        for attribute in other.iter() {
            self.insert(attribute.clone());
        }
    }

    pub fn get(&self, key: AttrKey) -> Option<&Attribute> {
        self.attributes.get(&key)
    }

    pub fn contains(&self, key: AttrKey) -> bool {
        self.attributes.contains_key(&key)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Attribute> {
        self.attributes.values()
    }

    pub fn len(&self) -> usize {
        self.attributes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty()
    }

    /// The inline replacement object, if this style carries one.
    pub fn replacement(&self) -> Option<&InlineImage> {
        match self.get(AttrKey::Replacement) {
            Some(Attribute::Replacement(image)) => Some(image),
            _ => None,
        }
    }
}

fn shared(style: TextStyle) -> Arc<TextStyle> {
    Arc::new(style)
}

pub static PLAIN: LazyLock<Arc<TextStyle>> = LazyLock::new(|| shared(TextStyle::new()));

pub static BOLD: LazyLock<Arc<TextStyle>> =
    LazyLock::new(|| shared(TextStyle::new().with(Attribute::Weight(700.0))));

pub static ITALIC: LazyLock<Arc<TextStyle>> =
    LazyLock::new(|| shared(TextStyle::new().with(Attribute::Posture(Posture::Oblique))));

pub static UNDERLINE: LazyLock<Arc<TextStyle>> =
    LazyLock::new(|| shared(TextStyle::new().with(Attribute::Underline(true))));

pub static STRIKETHROUGH: LazyLock<Arc<TextStyle>> =
    LazyLock::new(|| shared(TextStyle::new().with(Attribute::Strikethrough(true))));

pub static SUPERSCRIPT: LazyLock<Arc<TextStyle>> = LazyLock::new(|| {
    shared(
        TextStyle::new()
            .with(Attribute::Superscript(1))
            .with(Attribute::SizeScale(0.7)),
    )
});

pub static SUBSCRIPT: LazyLock<Arc<TextStyle>> = LazyLock::new(|| {
    shared(
        TextStyle::new()
            .with(Attribute::Superscript(-1))
            .with(Attribute::SizeScale(0.7)),
    )
});

pub static MONOSPACE: LazyLock<Arc<TextStyle>> =
    LazyLock::new(|| shared(TextStyle::new().with(Attribute::Family("Monospaced".into()))));

/// Number of heading levels (`h1` to `h7`).
pub const HEADING_LEVELS: u8 = 7;

/// Returns the default heading style for a level (1–7).
pub fn heading_style(level: u8) -> TextStyle {
    let (color, scale) = match level {
        1 => (Color::LightCyan, 2.0),
        2 => (Color::Green, 1.6),
        3 => (Color::Yellow, 1.35),
        4 => (Color::White, 1.2),
        5 => (Color::White, 1.1),
        6 => (Color::White, 1.0),
        // h7 is a run-in heading slightly below body size
        _ => (Color::White, 0.9),
    };
    TextStyle::new()
        .with(Attribute::Weight(700.0))
        .with(Attribute::Foreground(color))
        .with(Attribute::SizeScale(scale))
}

/// A style with every attribute given a concrete value.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedStyle {
    pub family: String,
    pub size: f32,
    pub weight: f32,
    pub width: f32,
    pub posture: Posture,
    pub foreground: Color,
    pub background: Option<Color>,
    pub underline: bool,
    pub strikethrough: bool,
    pub kerning: bool,
    pub ligatures: bool,
    pub tracking: f32,
    pub superscript: i8,
    pub replacement: Option<InlineImage>,
}

impl Default for ResolvedStyle {
    fn default() -> Self {
        Self {
            family: "Serif".to_string(),
            size: 12.0,
            weight: 400.0,
            width: 1.0,
            posture: Posture::Upright,
            foreground: Color::Reset,
            background: None,
            underline: false,
            strikethrough: false,
            kerning: false,
            ligatures: false,
            tracking: 0.0,
            superscript: 0,
            replacement: None,
        }
    }
}

impl ResolvedStyle {
    /// Resolves `style` over the built-in defaults.
    pub fn from_style(style: &TextStyle) -> Self {
        let mut resolved = Self::default();
        resolved.apply(style);
        resolved
    }

    /// Overrides the attributes named by `style`.
    pub fn apply(&mut self, style: &TextStyle) {
        for attribute in style.iter() {
            match attribute {
                Attribute::Family(family) => self.family.clone_from(family),
                Attribute::Size(size) => self.size = *size,
                Attribute::SizeScale(scale) => self.size *= *scale,
                Attribute::Weight(weight) => self.weight = *weight,
                Attribute::Width(width) => self.width = *width,
                Attribute::Posture(posture) => self.posture = *posture,
                Attribute::Foreground(color) => self.foreground = *color,
                Attribute::Background(color) => self.background = Some(*color),
                Attribute::Underline(on) => self.underline = *on,
                Attribute::Strikethrough(on) => self.strikethrough = *on,
                Attribute::Kerning(on) => self.kerning = *on,
                Attribute::Ligatures(on) => self.ligatures = *on,
                Attribute::Tracking(tracking) => self.tracking = *tracking,
                Attribute::Superscript(shift) => self.superscript = *shift,
                Attribute::Replacement(image) => self.replacement = Some(image.clone()),
            }
        }
    }

    /// The value this style has for `key`, as an attribute.
    ///
    /// Returns `None` only for optional attributes that are unset.
    pub fn attribute(&self, key: AttrKey) -> Option<Attribute> {
        Some(match key {
            AttrKey::Family => Attribute::Family(self.family.clone()),
            AttrKey::Size => Attribute::Size(self.size),
            AttrKey::SizeScale => Attribute::SizeScale(1.0),
            AttrKey::Weight => Attribute::Weight(self.weight),
            AttrKey::Width => Attribute::Width(self.width),
            AttrKey::Posture => Attribute::Posture(self.posture),
            AttrKey::Foreground => Attribute::Foreground(self.foreground),
            AttrKey::Background => Attribute::Background(self.background?),
            AttrKey::Underline => Attribute::Underline(self.underline),
            AttrKey::Strikethrough => Attribute::Strikethrough(self.strikethrough),
            AttrKey::Kerning => Attribute::Kerning(self.kerning),
            AttrKey::Ligatures => Attribute::Ligatures(self.ligatures),
            AttrKey::Tracking => Attribute::Tracking(self.tracking),
            AttrKey::Superscript => Attribute::Superscript(self.superscript),
            AttrKey::Replacement => Attribute::Replacement(self.replacement.clone()?),
        })
    }

    pub fn is_bold(&self) -> bool {
        self.weight >= 600.0
    }

    /// Converts to the closest terminal style.
    pub fn to_ratatui(&self) -> Style {
        let mut style = Style::default().fg(self.foreground);
        if let Some(background) = self.background {
            style = style.bg(background);
        }
        let mut modifier = Modifier::empty();
        if self.is_bold() {
            modifier |= Modifier::BOLD;
        } else if self.weight <= 300.0 {
            modifier |= Modifier::DIM;
        }
        if self.posture == Posture::Oblique {
            modifier |= Modifier::ITALIC;
        }
        if self.underline {
            modifier |= Modifier::UNDERLINED;
        }
        if self.strikethrough {
            modifier |= Modifier::CROSSED_OUT;
        }
        style.add_modifier(modifier)
    }
}

/// A style applied to a byte range of a paragraph's plain text.
#[derive(Debug, Clone, PartialEq)]
pub struct StyleRange {
    pub style: Arc<TextStyle>,
    pub range: Range<usize>,
}

impl StyleRange {
    /// Returns `None` for empty or inverted ranges, which carry no style.
    pub fn new(style: Arc<TextStyle>, start: usize, end: usize) -> Option<Self> {
        (start < end).then(|| Self {
            style,
            range: start..end,
        })
    }
}

/// A maximal run of text sharing one resolved style.
#[derive(Debug, Clone, PartialEq)]
pub struct StyledRun {
    pub range: Range<usize>,
    pub style: ResolvedStyle,
}

/// Plain text with style ranges applied to it.
#[derive(Debug, Clone, Default)]
pub struct StyledText {
    text: String,
    ranges: Vec<StyleRange>,
}

impl StyledText {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ranges: Vec::new(),
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn ranges(&self) -> &[StyleRange] {
        &self.ranges
    }

    /// Applies a range. Later ranges win where they overlap earlier ones.
    pub fn apply(&mut self, range: StyleRange) -> Result<()> {
        let len = self.text.len();
        let Range { start, end } = range.range;
        if start > end || end > len {
            return Err(MarkupError::InvalidRange { start, end, len });
        }
        for offset in [start, end] {
            if !self.text.is_char_boundary(offset) {
                return Err(MarkupError::NotCharBoundary(offset));
            }
        }
        self.ranges.push(range);
        Ok(())
    }

    /// Splits the text into runs of uniform resolved style.
    ///
    /// Replacement objects always get a run of their own.
    pub fn runs(&self, default: &ResolvedStyle) -> Vec<StyledRun> {
        let len = self.text.len();
        if len == 0 {
            return Vec::new();
        }
        let mut bounds = vec![0, len];
        for range in &self.ranges {
            bounds.push(range.range.start);
            bounds.push(range.range.end);
        }
        bounds.sort_unstable();
        bounds.dedup();

        let mut runs: Vec<StyledRun> = Vec::new();
        for pair in bounds.windows(2) {
            let (start, end) = (pair[0], pair[1]);
            let mut style = default.clone();
            for range in &self.ranges {
                if range.range.start <= start && range.range.end >= end {
                    style.apply(&range.style);
                }
            }
            match runs.last_mut() {
                Some(last) if last.style == style && style.replacement.is_none() => {
                    last.range.end = end;
                }
                _ => runs.push(StyledRun {
                    range: start..end,
                    style,
                }),
            }
        }
        runs
    }
}

#[cfg(test)]
#[path = "style_tests.rs"]
mod tests;
