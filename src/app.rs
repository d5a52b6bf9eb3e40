//! App: terminal init, main loop, tick scheduling and key handling.

use crate::GameConfig;
use crate::game::{Command, Game, Step};
use crate::input::{Action, key_to_action};
use crate::settings::Settings;
use crate::theme::Theme;
use crate::ui::{self, Effects, View};
use anyhow::Result;
use crossterm::event::{self, Event};
use log::{info, warn};
use ratatui::DefaultTerminal;
use std::time::{Duration, Instant};

/// Upper bound on one frame; input is polled at least this often.
const FRAME: Duration = Duration::from_millis(16);
/// Without key-release events, soft drop ends once the key stops repeating for this long.
const SOFT_DROP_RELEASE_GRACE: Duration = Duration::from_millis(550);

pub struct App {
    config: GameConfig,
    theme: &'static Theme,
    settings: Settings,
    game: Game,
    view: View,
    effects: Effects,
    /// When the last tick ran; the next one is due `game.wait()` later.
    last_step: Instant,
    /// Terminal cannot report key releases: soft drop is released by timeout.
    release_fallback: bool,
    /// Last soft-drop press or repeat while the release fallback is active.
    soft_drop_seen: Option<Instant>,
    quit: bool,
}

impl App {
    pub fn new(config: GameConfig, theme: &'static Theme, settings: Settings) -> Self {
        let game = Game::new(&config);
        let view = View::new(config.board_size);
        Self {
            config,
            theme,
            settings,
            game,
            view,
            effects: Effects::default(),
            last_step: Instant::now(),
            release_fallback: false,
            soft_drop_seen: None,
            quit: false,
        }
    }

    fn reset_game(&mut self) {
        info!("restart after score {}", self.game.score());
        self.game = Game::new(&self.config);
        self.view = View::new(self.config.board_size);
        self.effects.reset();
        self.soft_drop_seen = None;
        self.game.start(&mut self.view);
        self.last_step = Instant::now();
    }

    fn apply_action(&mut self, action: Action, now: Instant) {
        match action {
            Action::Game(command) => {
                if self.release_fallback {
                    self.soft_drop_seen = match command {
                        Command::SoftDropOn => Some(now),
                        Command::SoftDropOff => None,
                        _ => self.soft_drop_seen,
                    };
                }
                self.game.handle(command, &mut self.view);
            }
            Action::CycleTheme => {
                self.theme = self.theme.next();
                if let Err(e) = self.settings.save_theme_id(self.theme.id) {
                    warn!(
                        "could not save theme to {}: {e:#}",
                        self.settings.path().display()
                    );
                }
            }
            Action::Restart if self.game.is_game_over() => self.reset_game(),
            Action::Restart | Action::None => {}
            Action::Quit => self.quit = true,
        }
    }

    /// Release soft drop when the key has gone quiet and the terminal never sends releases.
    fn expire_soft_drop(&mut self, now: Instant) {
        let expired = self
            .soft_drop_seen
            .is_some_and(|seen| now.saturating_duration_since(seen) >= SOFT_DROP_RELEASE_GRACE);
        if expired {
            self.soft_drop_seen = None;
            self.game.handle(Command::SoftDropOff, &mut self.view);
        }
    }

    /// Run the next game step if it is due.
    fn tick_if_due(&mut self) {
        let Some(wait) = self.game.wait() else {
            return;
        };
        if self.last_step.elapsed() < wait {
            return;
        }
        let step = self.game.tick(&mut self.view);
        self.last_step = Instant::now();
        if matches!(step, Step::Settled { cleared } if cleared > 0) {
            self.effects.line_clear();
        }
    }

    pub fn run(&mut self) -> Result<()> {
        use crossterm::{
            event::{KeyboardEnhancementFlags, PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags},
            execute,
            terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
        };

        enable_raw_mode()?;
        let mut stdout = std::io::stdout();
        execute!(stdout, EnterAlternateScreen)?;

        // Release events drive soft drop; without them fall back to a timeout.
        self.release_fallback = !crossterm::terminal::supports_keyboard_enhancement().unwrap_or(false);
        if self.release_fallback {
            warn!("terminal does not report key releases; soft drop releases after {SOFT_DROP_RELEASE_GRACE:?}");
        } else {
            let _ = execute!(
                stdout,
                PushKeyboardEnhancementFlags(KeyboardEnhancementFlags::REPORT_EVENT_TYPES)
            );
        }

        let mut terminal = DefaultTerminal::new(ratatui::backend::CrosstermBackend::new(stdout))?;
        let result = self.run_loop(&mut terminal);

        // Restore
        if !self.release_fallback {
            let _ = execute!(std::io::stdout(), PopKeyboardEnhancementFlags);
        }
        execute!(std::io::stdout(), LeaveAlternateScreen)?;
        disable_raw_mode()?;

        info!(
            "quit: score {}, lines {}",
            self.game.score(),
            self.game.lines()
        );
        result
    }

    fn run_loop(&mut self, terminal: &mut DefaultTerminal) -> Result<()> {
        self.game.start(&mut self.view);
        self.last_step = Instant::now();

        while !self.quit {
            let now = Instant::now();
            let rows = ui::board_rows(&self.view.board, self.config.board_size)?;
            let grid = self.config.board_size;
            let lines = self.game.lines();
            let theme = self.theme;
            terminal.draw(|f| {
                ui::draw(f, &self.view, &rows, grid, lines, theme, &mut self.effects, now);
            })?;

            // Sleep until the next step is due, but keep frames coming for effects and input.
            let timeout = self.game.wait().map_or(FRAME, |wait| {
                (self.last_step + wait)
                    .saturating_duration_since(Instant::now())
                    .min(FRAME)
            });
            if event::poll(timeout)? {
                while event::poll(Duration::ZERO)? {
                    if let Event::Key(key) = event::read()? {
                        self.apply_action(key_to_action(key), Instant::now());
                        if self.quit {
                            return Ok(());
                        }
                    }
                }
            }

            self.expire_soft_drop(Instant::now());
            self.tick_if_due();
        }
        Ok(())
    }
}
