//! Parametric style factories: tags whose style depends on their
//! parameters, such as `<color #ff0000>` or `<size 150%>`.
//!
//! Factories never fail. A missing or malformed parameter falls back to a
//! default value.

use std::fmt::Debug;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;

use ratatui::style::Color;

use crate::image::{
    ASSUMED_DPI, ImageAlignment, ImageResolver, InlineImage, MissingImage, POINTS_PER_INCH,
};
use crate::style::{AttrKey, Attribute, TextStyle};

/// What a factory may ask about the position where its tag appears.
pub trait StyleContext {
    /// The value of `key` from the most recently opened style that sets it,
    /// or from the default style when no open style does.
    fn current(&self, key: AttrKey) -> Option<Attribute>;

    /// The document file that relative resource paths are resolved against.
    fn base_path(&self) -> Option<&Path>;

    fn image_resolver(&self) -> &dyn ImageResolver;
}

/// Builds a style from a tag's parameter list.
pub trait ParametricStyle: Debug + Send + Sync {
    fn create_style(&self, context: &dyn StyleContext, params: &[String]) -> TextStyle;
}

/// Splits a tag's parameter text into tokens.
///
/// Tokens are separated by whitespace. Double quotes group text, including
/// whitespace and `>`, into one token; inside quotes a backslash makes the
/// next character literal, so `\"` and `\\` produce `"` and `\`.
pub fn split_parameters(raw: &str) -> Vec<String> {
    let mut params = Vec::new();
    let mut current = String::new();
    let mut in_token = false;
    let mut quoted = false;
    let mut chars = raw.chars();
    while let Some(c) = chars.next() {
        if quoted {
            match c {
                '\\' => {
                    if let Some(escaped) = chars.next() {
                        current.push(escaped);
                    }
                }
                '"' => quoted = false,
                _ => current.push(c),
            }
        } else if c == '"' {
            quoted = true;
            in_token = true;
        } else if c.is_whitespace() {
            if in_token {
                params.push(std::mem::take(&mut current));
                in_token = false;
            }
        } else {
            current.push(c);
            in_token = true;
        }
    }
    if in_token {
        params.push(current);
    }
    params
}

/// Parses `#rrggbb`, `#aarrggbb`, the same without `#`, or a terminal
/// colour name. A fully transparent colour maps to the terminal default.
pub fn parse_color(text: &str) -> Option<Color> {
    let hex = text.strip_prefix('#').unwrap_or(text);
    if matches!(hex.len(), 6 | 8) && hex.chars().all(|c| c.is_ascii_hexdigit()) {
        let value = u32::from_str_radix(hex, 16).ok()?;
        if hex.len() == 8 && value >> 24 == 0 {
            return Some(Color::Reset);
        }
        let [_, r, g, b] = value.to_be_bytes();
        return Some(Color::Rgb(r, g, b));
    }
    Color::from_str(text).ok()
}

/// Parses a length such as `12`, `12pt`, `0.5in`, `2cm`, `5mm`, or `300px`
/// into points. Pixels assume 150 DPI.
pub fn parse_measure(text: &str) -> Option<f32> {
    let split = text
        .char_indices()
        .find(|&(i, c)| !(c.is_ascii_digit() || c == '.' || (i == 0 && (c == '+' || c == '-'))))
        .map_or(text.len(), |(i, _)| i);
    let (number, unit) = text.split_at(split);
    let value: f32 = number.parse().ok()?;
    let factor = match unit.to_ascii_lowercase().as_str() {
        "" | "pt" => 1.0,
        "in" => POINTS_PER_INCH,
        "cm" => POINTS_PER_INCH / 2.54,
        "mm" => POINTS_PER_INCH / 25.4,
        "px" => POINTS_PER_INCH / ASSUMED_DPI,
        _ => return None,
    };
    value.is_finite().then_some(value * factor)
}

/// Foreground or background colour.
#[derive(Debug, Clone, Copy, Default)]
pub struct ColorStyle {
    pub background: bool,
}

impl ParametricStyle for ColorStyle {
    fn create_style(&self, _context: &dyn StyleContext, params: &[String]) -> TextStyle {
        let color = params
            .first()
            .and_then(|p| parse_color(p))
            .unwrap_or(Color::Reset);
        let attribute = if self.background {
            Attribute::Background(color)
        } else {
            Attribute::Foreground(color)
        };
        TextStyle::new().with(attribute)
    }
}

/// Font size, absolute (`14`) or relative to the current size (`150%`).
#[derive(Debug, Clone, Copy, Default)]
pub struct SizeStyle;

impl ParametricStyle for SizeStyle {
    fn create_style(&self, context: &dyn StyleContext, params: &[String]) -> TextStyle {
        let current = match context.current(AttrKey::Size) {
            Some(Attribute::Size(size)) => size,
            _ => 12.0,
        };
        let size = params
            .first()
            .and_then(|param| match param.strip_suffix('%') {
                Some(percent) => percent.trim().parse::<f32>().ok().map(|p| current * p / 100.0),
                None => parse_measure(param),
            })
            .filter(|size| *size > 0.0)
            .unwrap_or(current);
        TextStyle::new().with(Attribute::Size(size))
    }
}

/// Font family; all parameters are joined with spaces.
#[derive(Debug, Clone, Copy, Default)]
pub struct FamilyStyle;

impl ParametricStyle for FamilyStyle {
    fn create_style(&self, context: &dyn StyleContext, params: &[String]) -> TextStyle {
        let family = params.join(" ");
        let family = if family.trim().is_empty() {
            match context.current(AttrKey::Family) {
                Some(Attribute::Family(current)) => current,
                _ => String::from("Serif"),
            }
        } else {
            family.trim().to_string()
        };
        TextStyle::new().with(Attribute::Family(family))
    }
}

/// Letter spacing in ems.
#[derive(Debug, Clone, Copy, Default)]
pub struct TrackingStyle;

impl ParametricStyle for TrackingStyle {
    fn create_style(&self, _context: &dyn StyleContext, params: &[String]) -> TextStyle {
        let tracking = params
            .first()
            .and_then(|p| p.parse::<f32>().ok())
            .filter(|t| t.is_finite())
            .unwrap_or(0.0);
        TextStyle::new().with(Attribute::Tracking(tracking))
    }
}

/// Named weight presets on the CSS scale.
pub fn weight_preset(name: &str) -> Option<f32> {
    Some(match name.to_ascii_lowercase().replace(['-', '_'], "").as_str() {
        "thin" | "hairline" => 100.0,
        "extralight" | "ultralight" => 200.0,
        "light" => 300.0,
        "regular" | "normal" => 400.0,
        "medium" => 500.0,
        "semibold" | "demibold" => 600.0,
        "bold" => 700.0,
        "extrabold" | "ultrabold" => 800.0,
        "black" | "heavy" => 900.0,
        _ => return None,
    })
}

/// Font weight: a preset name or a number from 1 to 1000.
#[derive(Debug, Clone, Copy, Default)]
pub struct WeightStyle;

impl ParametricStyle for WeightStyle {
    fn create_style(&self, _context: &dyn StyleContext, params: &[String]) -> TextStyle {
        let weight = params
            .first()
            .and_then(|p| {
                weight_preset(p)
                    .or_else(|| p.parse::<f32>().ok().filter(|w| (1.0..=1000.0).contains(w)))
            })
            .unwrap_or(400.0);
        TextStyle::new().with(Attribute::Weight(weight))
    }
}

/// Named width presets as stretch factors.
pub fn width_preset(name: &str) -> Option<f32> {
    Some(match name.to_ascii_lowercase().replace(['-', '_'], "").as_str() {
        "ultracondensed" => 0.5,
        "extracondensed" => 0.625,
        "condensed" => 0.75,
        "semicondensed" => 0.875,
        "regular" | "normal" => 1.0,
        "semiexpanded" | "semiextended" => 1.125,
        "expanded" | "extended" => 1.25,
        "extraexpanded" | "extraextended" => 1.5,
        "ultraexpanded" | "ultraextended" => 2.0,
        _ => return None,
    })
}

/// Font width: a preset name or a positive stretch factor.
#[derive(Debug, Clone, Copy, Default)]
pub struct WidthStyle;

impl ParametricStyle for WidthStyle {
    fn create_style(&self, _context: &dyn StyleContext, params: &[String]) -> TextStyle {
        let width = params
            .first()
            .and_then(|p| width_preset(p).or_else(|| p.parse::<f32>().ok().filter(|w| *w > 0.0)))
            .unwrap_or(1.0);
        TextStyle::new().with(Attribute::Width(width))
    }
}

/// Inline image: `<image id [width] [height] [alignment] [+/-offset]>`.
///
/// Apart from the identifier coming before any plain measure, the tokens may
/// appear in any order. Unsigned measures fill width, then height; a
/// signed measure is a vertical offset; alignment is a keyword.
#[derive(Debug, Clone, Copy, Default)]
pub struct ImageStyle;

impl ImageStyle {
    fn resolve_path(context: &dyn StyleContext, id: &str) -> PathBuf {
        let path = Path::new(id);
        match context.base_path() {
            Some(base) if path.is_relative() => base.parent().unwrap_or(base).join(path),
            _ => path.to_path_buf(),
        }
    }
}

impl ParametricStyle for ImageStyle {
    fn create_style(&self, context: &dyn StyleContext, params: &[String]) -> TextStyle {
        let mut id: Option<&str> = None;
        let mut measures = Vec::new();
        let mut alignment = ImageAlignment::default();
        let mut offset = 0.0;
        for param in params {
            if let Some(keyword) = ImageAlignment::from_keyword(param) {
                alignment = keyword;
            } else if param.starts_with(['+', '-']) && parse_measure(param).is_some() {
                offset = parse_measure(param).unwrap_or(0.0);
            } else if let (Some(_), Some(measure)) = (id, parse_measure(param)) {
                measures.push(measure);
            } else if id.is_none() {
                id = Some(param);
            }
        }

        let id = id.unwrap_or_default();
        let resolved = if id.is_empty() {
            None
        } else {
            context.image_resolver().resolve(&Self::resolve_path(context, id))
        };
        let source = resolved.unwrap_or_else(|| Arc::new(MissingImage));

        let (px_width, px_height) = source.pixel_size();
        let aspect = if px_width > 0 {
            px_height as f32 / px_width as f32
        } else {
            1.0
        };
        let natural_width = px_width as f32 / ASSUMED_DPI * POINTS_PER_INCH;
        let positive = |m: &f32| *m > 0.0;
        let width = measures.first().copied().filter(positive).unwrap_or(natural_width);
        let height = measures
            .get(1)
            .copied()
            .filter(positive)
            .unwrap_or(width * aspect);

        TextStyle::new().with(Attribute::Replacement(InlineImage {
            id: id.to_string(),
            source,
            width,
            height,
            alignment,
            offset,
        }))
    }
}

/// The parametric tags every engine starts with.
pub fn default_parametric_styles() -> Vec<(&'static str, Arc<dyn ParametricStyle>)> {
    vec![
        ("color", Arc::new(ColorStyle { background: false })),
        ("bgcolor", Arc::new(ColorStyle { background: true })),
        ("size", Arc::new(SizeStyle)),
        ("family", Arc::new(FamilyStyle)),
        ("tracking", Arc::new(TrackingStyle)),
        ("weight", Arc::new(WeightStyle)),
        ("width", Arc::new(WidthStyle)),
        ("image", Arc::new(ImageStyle)),
    ]
}

#[cfg(test)]
#[path = "factory_tests.rs"]
mod tests;
