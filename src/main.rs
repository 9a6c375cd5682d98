//! bagtris: falling-block puzzle game in the terminal.

mod app;
mod bag;
mod board;
mod game;
mod input;
mod piece;
mod render;
mod scheduler;
mod session;
mod shapes;
mod theme;
mod ui;

use anyhow::{Context, Result};
use app::App;
use clap::{Parser, ValueEnum};
use rand::Rng;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::{Level, info};
use tracing_subscriber::prelude::*;

/// Options derived from CLI that affect game behaviour (board size, fall speed, scoring).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameConfig {
    pub width: usize,
    pub height: usize,
    pub initial_interval_ms: u64,
    pub min_interval_ms: u64,
    pub interval_step_ms: u64,
    pub ramp_every_ms: u64,
    pub line_award: u32,
    pub seed: u64,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            width: board::DEFAULT_WIDTH,
            height: board::DEFAULT_HEIGHT,
            initial_interval_ms: 1000,
            min_interval_ms: 200,
            interval_step_ms: 10,
            ramp_every_ms: 30_000,
            line_award: 100,
            seed: 0,
        }
    }
}

impl GameConfig {
    fn from_args(args: &Args) -> Self {
        Self {
            width: usize::from(args.width),
            height: usize::from(args.height),
            initial_interval_ms: args.interval_ms,
            min_interval_ms: args.min_interval_ms.min(args.interval_ms),
            interval_step_ms: args.interval_step_ms,
            ramp_every_ms: args.ramp_every_ms,
            line_award: args.line_award,
            seed: args.seed.unwrap_or_else(|| rand::rng().random()),
        }
    }
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.log_file.as_deref(), args.verbose)?;

    let theme = theme::Theme::load(args.theme.as_deref(), args.palette)
        .context("failed to load theme")?;
    let config = GameConfig::from_args(&args);
    info!(?config, "starting bagtris");

    App::new(config, theme, args.autostart).run()
}

/// Log to `path` when given. The terminal is in raw mode, so nothing goes to stderr.
fn init_logging(path: Option<&Path>, verbose: u8) -> Result<()> {
    let Some(path) = path else {
        return Ok(());
    };
    let file = std::fs::File::create(path)
        .with_context(|| format!("cannot open log file {}", path.display()))?;
    let level = match verbose {
        0 => Level::INFO,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_ansi(false)
                .with_writer(Mutex::new(file)),
        )
        .with(tracing_subscriber::filter::LevelFilter::from_level(level))
        .init();
    Ok(())
}

/// Falling-block puzzle game in the terminal.
#[derive(Debug, Parser)]
#[command(
    name = "bagtris",
    version,
    about = "Falling-block puzzle in the terminal. Complete rows to clear them; the game ends when the stack reaches the top.",
    long_about = "bagtris is a small falling-block puzzle for the terminal.\n\n\
        Pieces come from a bag holding two of each of the seven shapes. The fall speed \
        increases as play time accumulates, down to a minimum interval.\n\n\
        CONTROLS:\n  Left/Right h/l  Move    Up k  Rotate    Down j  Step down\n  \
        S/Enter  Start    P/Space  Pause/resume    R  Reset    Q/Esc  Quit"
)]
pub struct Args {
    /// Board width in columns.
    #[arg(long, default_value = "10", value_name = "COLS", value_parser = clap::value_parser!(u16).range(board::MIN_WIDTH as i64..=40))]
    width: u16,

    /// Board height in rows.
    #[arg(long, default_value = "20", value_name = "ROWS", value_parser = clap::value_parser!(u16).range(4..=60))]
    height: u16,

    /// Starting fall interval in milliseconds.
    #[arg(long, default_value = "1000", value_name = "MS")]
    interval_ms: u64,

    /// Fastest fall interval in milliseconds.
    #[arg(long, default_value = "200", value_name = "MS")]
    min_interval_ms: u64,

    /// How much the interval shrinks per speed step.
    #[arg(long, default_value = "10", value_name = "MS")]
    interval_step_ms: u64,

    /// Play time between speed steps.
    #[arg(long, default_value = "30000", value_name = "MS")]
    ramp_every_ms: u64,

    /// Points per cleared row.
    #[arg(long, default_value = "100", value_name = "N")]
    line_award: u32,

    /// Seed for the piece bag (random if not set).
    #[arg(long, value_name = "N")]
    seed: Option<u64>,

    /// Start falling immediately instead of waiting for S/Enter.
    #[arg(long)]
    autostart: bool,

    /// Path to theme file (btop-style theme[key]=\"value\"). Uses One Dark if not set.
    #[arg(short, long, value_name = "FILE")]
    theme: Option<PathBuf>,

    /// Colour palette: normal (theme), high-contrast, or colorblind.
    #[arg(long, default_value = "normal")]
    palette: Palette,

    /// Write logs to this file.
    #[arg(long, value_name = "FILE")]
    log_file: Option<PathBuf>,

    /// Increase log verbosity (-v = DEBUG, -vv = TRACE).
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum Palette {
    #[default]
    Normal,

    #[value(alias = "highcontrast", alias = "contrast")]
    HighContrast,

    #[value(alias = "colourblind")]
    Colorblind,
}
