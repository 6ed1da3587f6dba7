//! Inline images: the resolver interface and the replacement object that
//! image tags place into the text.

use std::fmt::Debug;
use std::path::Path;
use std::sync::Arc;

use crate::shape::LayoutRect;
use crate::surface::Surface;

/// Resolution assumed when converting intrinsic pixel sizes to points.
pub const ASSUMED_DPI: f32 = 150.0;

pub const POINTS_PER_INCH: f32 = 72.0;

/// A resolved picture: intrinsic size plus a paint routine.
pub trait ImageSource: Debug + Send + Sync {
    /// Intrinsic size in pixels.
    fn pixel_size(&self) -> (u32, u32);

    /// Paints the picture into `area`.
    fn paint(&self, surface: &mut dyn Surface, area: LayoutRect);
}

/// Turns an image identifier into an [`ImageSource`].
///
/// Base-relative path resolution has already happened by the time this is
/// called.
pub trait ImageResolver: Debug {
    fn resolve(&self, path: &Path) -> Option<Arc<dyn ImageSource>>;
}

/// Resolves identifiers as image files on disk.
#[derive(Debug, Default, Clone, Copy)]
pub struct FileImageResolver;

impl ImageResolver for FileImageResolver {
    fn resolve(&self, path: &Path) -> Option<Arc<dyn ImageSource>> {
        match ::image::image_dimensions(path) {
            Ok(size) => Some(Arc::new(FileImage { size })),
            Err(err) => {
                tracing::debug!(path = %path.display(), %err, "image could not be resolved");
                None
            }
        }
    }
}

#[derive(Debug)]
struct FileImage {
    size: (u32, u32),
}

impl ImageSource for FileImage {
    fn pixel_size(&self) -> (u32, u32) {
        self.size
    }

    fn paint(&self, surface: &mut dyn Surface, area: LayoutRect) {
        surface.fill(area, '▒');
    }
}

/// Stand-in for an image that could not be resolved: one inch square.
#[derive(Debug, Default, Clone, Copy)]
pub struct MissingImage;

impl ImageSource for MissingImage {
    fn pixel_size(&self) -> (u32, u32) {
        (ASSUMED_DPI as u32, ASSUMED_DPI as u32)
    }

    fn paint(&self, surface: &mut dyn Surface, area: LayoutRect) {
        surface.fill(area, '?');
    }
}

/// Vertical placement of an inline image relative to the surrounding text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ImageAlignment {
    /// Bottom edge on the baseline.
    #[default]
    Baseline,
    /// Top edge level with the text ascent.
    Top,
    /// Centred on the middle of the text's ascent/descent band.
    Middle,
    /// Bottom edge level with the text descent.
    Bottom,
}

impl ImageAlignment {
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        match keyword.to_ascii_lowercase().as_str() {
            "baseline" => Some(Self::Baseline),
            "top" => Some(Self::Top),
            "middle" | "center" | "centre" => Some(Self::Middle),
            "bottom" => Some(Self::Bottom),
            _ => None,
        }
    }
}

/// An image standing in for a single replacement character.
#[derive(Debug, Clone)]
pub struct InlineImage {
    pub id: String,
    pub source: Arc<dyn ImageSource>,
    /// Width in points, before text scaling.
    pub width: f32,
    /// Height in points, before text scaling.
    pub height: f32,
    pub alignment: ImageAlignment,
    /// Extra upward shift in points.
    pub offset: f32,
}

impl InlineImage {
    /// Returns `(ascent, descent)` of an image box `height` layout units
    /// tall and raised by `offset` units, given the ascent and descent of
    /// the surrounding font.
    pub fn placement(
        &self,
        height: f32,
        offset: f32,
        font_ascent: f32,
        font_descent: f32,
    ) -> (f32, f32) {
        let (ascent, descent) = match self.alignment {
            ImageAlignment::Baseline => (height, 0.0),
            ImageAlignment::Top => (font_ascent, height - font_ascent),
            ImageAlignment::Middle => {
                let middle = (font_ascent - font_descent) / 2.0;
                (middle + height / 2.0, height / 2.0 - middle)
            }
            ImageAlignment::Bottom => (height - font_descent, font_descent),
        };
        (ascent + offset, descent - offset)
    }
}

impl PartialEq for InlineImage {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
            && self.width == other.width
            && self.height == other.height
            && self.alignment == other.alignment
            && self.offset == other.offset
    }
}
