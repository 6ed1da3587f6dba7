//! markset: a markup-driven rich-text layout engine.
//!
//! Markup with HTML-like tags is split into paragraphs, interpreted into
//! plain text plus style ranges, and laid out line by line inside a
//! rectangle whose margins may follow a [`PageShape`]. Oversized text can
//! be fitted by tightening line spacing or scaling it down.
//!
//! ```
//! use markset::{CellMetrics, LayoutRect, MarkupEngine};
//!
//! let mut engine = MarkupEngine::new(CellMetrics);
//! engine.set_markup_text("<b>Hello</b> world");
//! assert_eq!(engine.paragraphs()[0].text, "Hello world");
//! assert_eq!(engine.measure(LayoutRect::new(0.0, 0.0, 40.0, 10.0)), 1.0);
//! ```

pub mod breaks;
pub mod config;
pub mod engine;
pub mod error;
pub mod factory;
pub mod hooks;
pub mod html;
pub mod image;
pub mod interpret;
pub mod layout;
pub mod measure;
pub mod segment;
pub mod shape;
pub mod style;
pub mod surface;

pub use config::EngineConfig;
pub use engine::MarkupEngine;
pub use error::{MarkupError, Result};
pub use html::to_html;
pub use interpret::{Document, Paragraph};
pub use layout::{Alignment, Fit, FitStrategy, PositionedRun, VerticalAlignment};
pub use measure::{CellMetrics, FixedPitchMetrics, TextMeasurer};
pub use shape::{LayoutRect, PageShape};
pub use style::{ResolvedStyle, TextStyle};
pub use surface::{BufferSurface, Surface};
