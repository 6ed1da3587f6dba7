//! CLI argument definition for markset.
//!
//! Only clap types live here; `main.rs` maps them onto engine settings.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};

/// Fit strategy as accepted on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum FitArg {
    None,
    Tighten,
    Scale,
    Both,
}

/// Markup layout previewer.
#[derive(Parser, Debug)]
#[command(name = "markset", version, about = "Lay out tagged markup in the terminal")]
pub struct Cli {
    /// Markup file to render (use "-" for stdin).
    pub file: String,

    /// JSON file with engine settings.
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Markup parsed only for its definitions before the document.
    #[arg(long, value_name = "FILE")]
    pub library: Vec<PathBuf>,

    /// Layout width in columns (defaults to the terminal width).
    #[arg(long)]
    pub width: Option<u16>,

    /// Target height in rows for fitting (defaults to the terminal height).
    #[arg(long)]
    pub height: Option<u16>,

    /// How to make oversized text fit.
    #[arg(long, value_enum)]
    pub fit: Option<FitArg>,

    /// Outline the target box when text still overflows it.
    #[arg(long)]
    pub bad_box: bool,

    /// Print the document as HTML instead of opening the viewer.
    #[arg(long, conflicts_with = "measure")]
    pub html: bool,

    /// Print the fitted height, tightness and scale, then exit.
    #[arg(long)]
    pub measure: bool,
}
