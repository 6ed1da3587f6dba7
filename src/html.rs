//! HTML export: runs markup through the interpreter and writes the result
//! as paragraphs of styled spans.
//!
//! Tags the engine does not know are not dropped here. They are swapped for
//! private-use placeholder characters while interpreting and written back
//! verbatim at the end, so embedded HTML such as links survives the trip.

use std::cell::RefCell;
use std::rc::Rc;

use quick_xml::escape::escape;
use ratatui::style::Color;

use crate::engine::MarkupEngine;
use crate::hooks::{Hooks, UnknownTagHandler};
use crate::interpret::Paragraph;
use crate::layout::Alignment;
use crate::style::{Posture, ResolvedStyle};

/// First placeholder: the start of Supplementary Private Use Area-A.
const PLACEHOLDER_BASE: u32 = 0xF0000;
const PLACEHOLDER_LAST: u32 = 0xFFFFD;

/// Replaces each unknown tag with a placeholder and remembers the tag.
#[derive(Debug, Default)]
struct PlaceholderTags {
    tags: RefCell<Vec<String>>,
}

impl UnknownTagHandler for PlaceholderTags {
    fn handle_unknown_tag(&self, _tag: &str, original: &str) -> Option<String> {
        let mut tags = self.tags.borrow_mut();
        let code = PLACEHOLDER_BASE + tags.len() as u32;
        if code > PLACEHOLDER_LAST {
            tracing::warn!(tag = original, "too many unknown tags to keep, dropping");
            return None;
        }
        let placeholder = char::from_u32(code)?;
        tags.push(original.to_string());
        Some(placeholder.to_string())
    }
}

impl PlaceholderTags {
    /// Writes every placeholder in `html` back as the tag it stood for.
    fn restore(&self, html: &str) -> String {
        let tags = self.tags.borrow();
        let mut out = String::with_capacity(html.len());
        for c in html.chars() {
            let index = (c as u32).checked_sub(PLACEHOLDER_BASE).map(|i| i as usize);
            match index.and_then(|i| tags.get(i)) {
                Some(tag) => {
                    out.push('<');
                    out.push_str(tag);
                    out.push('>');
                }
                None => out.push(c),
            }
        }
        out
    }
}

/// Converts `markup` to HTML using `engine`'s tags, definitions and
/// settings. The engine's own markup and caches are left alone.
pub fn to_html(engine: &MarkupEngine, markup: &str) -> String {
    let placeholders = Rc::new(PlaceholderTags::default());
    let hooks = Hooks {
        unknown_tags: placeholders.clone(),
        ..engine.hooks().clone()
    };
    let document = engine.interpret_with(markup, &hooks);
    let default = engine.default_style();

    let mut html = String::new();
    for paragraph in &document.paragraphs {
        write_paragraph(&mut html, paragraph, default);
    }
    placeholders.restore(&html)
}

fn write_paragraph(out: &mut String, paragraph: &Paragraph, default: &ResolvedStyle) {
    let element = match paragraph.flags.heading {
        Some(level) => format!("h{level}"),
        None => "p".to_string(),
    };
    out.push('<');
    out.push_str(&element);
    if let Some(align) = text_align(paragraph.flags.alignment) {
        out.push_str(&format!(" style=\"text-align:{align}\""));
    }
    out.push('>');

    for run in paragraph.styled_text().runs(default) {
        let text = &paragraph.text[run.range.clone()];
        if let Some(image) = &run.style.replacement {
            out.push_str(&format!(
                "<img src=\"{}\" width=\"{}\" height=\"{}\" alt=\"\">",
                escape(image.id.as_str()),
                image.width.round(),
                image.height.round()
            ));
            continue;
        }
        let css = span_css(&run.style, default);
        let (open, close) = if css.is_empty() {
            (String::new(), "")
        } else {
            (format!("<span style=\"{}\">", escape(css.as_str())), "</span>")
        };
        out.push_str(&open);
        match run.style.superscript {
            s if s > 0 => out.push_str(&format!("<sup>{}</sup>", escape(text))),
            s if s < 0 => out.push_str(&format!("<sub>{}</sub>", escape(text))),
            _ => out.push_str(&escape(text)),
        }
        out.push_str(close);
    }

    out.push_str(&format!("</{element}>\n"));
}

fn text_align(alignment: Alignment) -> Option<&'static str> {
    match alignment {
        Alignment::Left => None,
        Alignment::Center => Some("center"),
        Alignment::Right => Some("right"),
        Alignment::Justify => Some("justify"),
    }
}

fn css_color(color: Color) -> Option<String> {
    match color {
        Color::Reset => None,
        Color::Rgb(r, g, b) => Some(format!("#{r:02x}{g:02x}{b:02x}")),
        other => Some(other.to_string().to_lowercase()),
    }
}

/// CSS declarations for everything `style` changes relative to `default`.
fn span_css(style: &ResolvedStyle, default: &ResolvedStyle) -> String {
    let mut css = Vec::new();
    if style.family != default.family {
        css.push(format!("font-family:'{}'", style.family));
    }
    if style.size != default.size {
        css.push(format!("font-size:{}pt", style.size));
    }
    if style.weight != default.weight {
        css.push(format!("font-weight:{}", style.weight.round()));
    }
    if style.width != default.width {
        css.push(format!("font-stretch:{}%", (style.width * 100.0).round()));
    }
    if style.posture != default.posture {
        let value = match style.posture {
            Posture::Upright => "normal",
            Posture::Oblique => "italic",
        };
        css.push(format!("font-style:{value}"));
    }
    if style.foreground != default.foreground {
        if let Some(color) = css_color(style.foreground) {
            css.push(format!("color:{color}"));
        }
    }
    if style.background != default.background {
        if let Some(color) = style.background.and_then(css_color) {
            css.push(format!("background-color:{color}"));
        }
    }
    let mut decorations = Vec::new();
    if style.underline && !default.underline {
        decorations.push("underline");
    }
    if style.strikethrough && !default.strikethrough {
        decorations.push("line-through");
    }
    if !decorations.is_empty() {
        css.push(format!("text-decoration:{}", decorations.join(" ")));
    }
    if style.tracking != default.tracking {
        css.push(format!("letter-spacing:{}em", style.tracking));
    }
    css.join(";")
}

#[cfg(test)]
#[path = "html_tests.rs"]
mod tests;
