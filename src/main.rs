//! Entry point: wires CLI → engine → TUI event loop.
//!
//! Handles argument parsing, file I/O, engine configuration, terminal
//! setup, the event loop, and graceful shutdown. `--html` and `--measure`
//! print to stdout and never touch the terminal.

mod app;
mod cli;
mod renderer;

use std::fs;
use std::io::Read;
use std::path::PathBuf;

use clap::Parser;
use markset::layout::FitStrategy;
use markset::{CellMetrics, EngineConfig, LayoutRect, MarkupEngine};
use ratatui::crossterm::event::{self, Event};
use tracing_subscriber::EnvFilter;

use crate::app::App;
use crate::cli::{Cli, FitArg};

/// Width used by `--measure` when neither `--width` nor a terminal is
/// available.
const FALLBACK_WIDTH: u16 = 80;

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;
    init_tracing();

    let cli = Cli::parse();
    let source = read_source(&cli.file)?;
    let mut engine = build_engine(&cli)?;

    if cli.html {
        print!("{}", markset::to_html(&engine, &source));
        return Ok(());
    }

    engine.set_markup_text(source);
    let terminal_size = ratatui::crossterm::terminal::size().ok();

    if cli.measure {
        let width = cli
            .width
            .or(terminal_size.map(|(cols, _)| cols))
            .unwrap_or(FALLBACK_WIDTH);
        let height = cli.height.unwrap_or(u16::MAX);
        let fit = engine.fit(LayoutRect::new(0.0, 0.0, width.into(), height.into()));
        println!("height: {}", fit.height);
        println!("tightness: {}", fit.tightness);
        println!("scale: {}", fit.scale);
        return Ok(());
    }

    // Restore the terminal before the backtrace is printed.
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        ratatui::restore();
        original_hook(info);
    }));

    let filename = if cli.file == "-" {
        "<stdin>".to_string()
    } else {
        cli.file.clone()
    };
    let mut terminal = ratatui::init();
    let size = terminal.size()?;
    let page = renderer::render_page(
        &mut engine,
        cli.width.unwrap_or(size.width),
        cli.height.unwrap_or(size.height.saturating_sub(1)),
    );
    let mut app = App::new(page, filename);

    let result = run_event_loop(&mut terminal, &mut app, &mut engine, &cli);

    ratatui::restore();

    result
}

/// Logging is off unless `RUST_LOG` asks for it, and goes to stderr so it
/// never mixes with `--html` output.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("off"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn read_source(file: &str) -> color_eyre::Result<String> {
    if file == "-" {
        let mut source = String::new();
        std::io::stdin().read_to_string(&mut source)?;
        Ok(source)
    } else {
        Ok(fs::read_to_string(file)?)
    }
}

fn fit_strategy(arg: FitArg) -> FitStrategy {
    match arg {
        FitArg::None => FitStrategy::None,
        FitArg::Tighten => FitStrategy::Tighten,
        FitArg::Scale => FitStrategy::Scale,
        FitArg::Both => FitStrategy::Both,
    }
}

/// Engine with the config file, libraries and flags applied, in that order.
fn build_engine(cli: &Cli) -> color_eyre::Result<MarkupEngine> {
    let mut engine = MarkupEngine::new(CellMetrics);
    if cli.file != "-" {
        engine.set_base_path(Some(PathBuf::from(&cli.file)));
    }
    if let Some(path) = &cli.config {
        let json = fs::read_to_string(path)?;
        EngineConfig::from_json(&json)?.apply(&mut engine)?;
    }
    for path in &cli.library {
        engine.parse_library(&fs::read_to_string(path)?);
    }
    if let Some(fit) = cli.fit {
        engine.set_fit_strategy(fit_strategy(fit));
    }
    if cli.bad_box {
        engine.set_bad_box_diagnostics(true);
    }
    Ok(engine)
}

/// Draws, waits for input, and re-lays the page out on resize, until the
/// user quits. Errors return early; `main` restores the terminal either way.
fn run_event_loop(
    terminal: &mut ratatui::DefaultTerminal,
    app: &mut App,
    engine: &mut MarkupEngine,
    cli: &Cli,
) -> color_eyre::Result<()> {
    loop {
        app.viewport_height = terminal.size()?.height.saturating_sub(1) as usize;

        terminal.draw(|frame| renderer::draw(frame, app))?;

        match event::read()? {
            Event::Key(key) => app.handle_key(key),
            Event::Resize(cols, rows) => {
                // Lay the document out again for the new size.
                app.page = renderer::render_page(
                    engine,
                    cli.width.unwrap_or(cols),
                    cli.height.unwrap_or(rows.saturating_sub(1)),
                );
                let max = app.max_scroll();
                if app.scroll_offset > max {
                    app.scroll_offset = max;
                }
            }
            _ => {}
        }

        if app.quit {
            break;
        }
    }

    Ok(())
}
