//! ascii-tetris: falling-block puzzle drawn with `[]` glyphs in the terminal.

mod app;
mod board;
mod game;
mod geometry;
mod input;
mod logging;
mod piece;
mod scoring;
mod settings;
mod theme;
mod ui;

use anyhow::Result;
use app::App;
use clap::{Parser, ValueEnum};
use game::{COMPACT_BOARD_SIZE, DEFAULT_BOARD_SIZE, Timing};
use geometry::Vector2D;
use log::{LevelFilter, info, warn};
use settings::Settings;
use std::path::PathBuf;
use std::time::Duration;
use theme::Theme;

/// Options derived from CLI that the game controller sees (board size, timing, seed).
#[derive(Debug, Clone)]
pub struct GameConfig {
    pub board_size: Vector2D,
    pub timing: Timing,
    pub seed: Option<u64>,
}

impl GameConfig {
    fn from_args(args: &Args) -> Self {
        let board_size = if args.compact {
            COMPACT_BOARD_SIZE
        } else {
            Vector2D::new(i32::from(args.width), i32::from(args.height))
        };
        Self {
            board_size,
            timing: Timing {
                drop: Duration::from_millis(args.drop_ms),
                soft_drop: Duration::from_millis(args.soft_drop_ms),
                settle: Duration::from_millis(args.settle_ms),
            },
            seed: args.seed,
        }
    }
}

fn main() -> Result<()> {
    let args = Args::parse();
    if let Some(path) = &args.log_file {
        logging::init_log(args.log_level.into(), path)?;
    }
    let settings = Settings::default();
    let theme = resolve_theme(args.theme.as_deref(), &settings);
    let config = GameConfig::from_args(&args);
    info!(
        "ascii-tetris {} starting: {:?}, theme {}",
        env!("CARGO_PKG_VERSION"),
        config,
        theme.id
    );
    let mut app = App::new(config, theme, settings);
    app.run()?;
    Ok(())
}

/// `--theme` wins over the saved theme; unknown ids fall back to the default.
fn resolve_theme(cli: Option<&str>, settings: &Settings) -> &'static Theme {
    let id = cli.map(str::to_string).or_else(|| settings.theme_id());
    match id.as_deref().map(Theme::by_id) {
        Some(Ok(theme)) => theme,
        Some(Err(e)) => {
            warn!("{e}; using {}", Theme::default_theme().id);
            Theme::default_theme()
        }
        None => Theme::default_theme(),
    }
}

/// Falling-block puzzle in the terminal, drawn with text glyphs.
#[derive(Debug, Parser)]
#[command(
    name = "ascii-tetris",
    version,
    about = "Falling-block puzzle in the terminal, drawn with [] glyphs. Fill rows to clear them and score.",
    long_about = "ascii-tetris is a terminal falling-block puzzle.\n\n\
        Move and rotate the falling piece; full rows are cleared and scored \
        (100/300/500/800 for 1-4 rows).\n\n\
        CONTROLS:\n  Left/Right h/l  Move        Up k x   Rotate      z u     Rotate back\n  \
        Down j         Soft drop   Space    Hard drop   t       Theme\n  \
        r              Restart     q Esc    Quit\n\n\
        The selected theme is saved and restored on the next start."
)]
pub struct Args {
    /// Board width in columns.
    #[arg(long, default_value_t = DEFAULT_BOARD_SIZE.x as u16, value_name = "COLS", value_parser = clap::value_parser!(u16).range(4..=40))]
    pub width: u16,

    /// Board height in rows.
    #[arg(long, default_value_t = DEFAULT_BOARD_SIZE.y as u16, value_name = "ROWS", value_parser = clap::value_parser!(u16).range(4..=40))]
    pub height: u16,

    /// Compact 10x10 board (overrides --width/--height).
    #[arg(long)]
    pub compact: bool,

    /// Time between descent steps in ms.
    #[arg(long, default_value = "300", value_name = "MS")]
    pub drop_ms: u64,

    /// Time between descent steps while soft drop is held, in ms.
    #[arg(long, default_value = "50", value_name = "MS")]
    pub soft_drop_ms: u64,

    /// Pause between a piece locking and the next one spawning, in ms.
    #[arg(long, default_value = "100", value_name = "MS")]
    pub settle_ms: u64,

    /// Seed for the piece sequence (random if not set).
    #[arg(long, value_name = "N")]
    pub seed: Option<u64>,

    /// Colour theme: dark, ocean or electronika. Overrides the saved theme.
    #[arg(short, long, value_name = "ID")]
    pub theme: Option<String>,

    /// Write a log to this file. Nothing is logged without it.
    #[arg(long, value_name = "FILE")]
    pub log_file: Option<PathBuf>,

    /// Log level for --log-file.
    #[arg(long, default_value = "info")]
    pub log_level: LogLevel,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum LogLevel {
    Off,
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Off => Self::Off,
            LogLevel::Error => Self::Error,
            LogLevel::Warn => Self::Warn,
            LogLevel::Info => Self::Info,
            LogLevel::Debug => Self::Debug,
            LogLevel::Trace => Self::Trace,
        }
    }
}
