//! Layout and drawing: playfield glyphs, next preview, score, controls, game over.

use crate::board::{Board, CellSprite, glyph};
use crate::game::Renderer;
use crate::geometry::Vector2D;
use crate::piece::Piece;
use crate::theme::Theme;
use ratatui::Frame;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::Style;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Widget};
use std::time::{Duration, Instant};
use tachyonfx::{Duration as TfxDuration, Effect, EffectRenderer, Interpolation, fx};
use thiserror::Error;

const SIDEBAR_WIDTH: u16 = 26;
/// Terminal columns per board cell (glyphs are two characters wide).
const CELL_WIDTH: u16 = 2;
/// Fade of the playfield when the game ends.
const GAME_OVER_FADE_MS: u32 = 600;
/// Tint of the playfield after rows were cleared.
const LINE_CLEAR_FLASH_MS: u32 = 180;

const CONTROLS: [(&str, &str); 8] = [
    ("←/→ h/l", "Move"),
    ("↑ k x", "Rotate"),
    ("z u", "Rotate back"),
    ("↓ j", "Soft drop"),
    ("Space", "Hard drop"),
    ("t", "Theme"),
    ("r", "Restart"),
    ("q Esc", "Quit"),
];

/// Board and playfield went out of sync: a screen cell has no board cell behind it.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("no board cell behind screen cell ({x}, {y})")]
    MissingCell { x: i32, y: i32 },
}

/// Latest engine output, filled in through [`Renderer`] and drawn every frame.
#[derive(Debug, Clone)]
pub struct View {
    pub board: Board,
    pub preview: Option<Piece>,
    pub score: u32,
    pub game_over: Option<u32>,
}

impl View {
    pub fn new(size: Vector2D) -> Self {
        Self {
            board: Board::new(size),
            preview: None,
            score: 0,
            game_over: None,
        }
    }
}

impl Renderer for View {
    fn render(&mut self, board: &Board) {
        self.board.clone_from(board);
    }

    fn render_preview(&mut self, next: &Piece) {
        self.preview = Some(next.clone());
    }

    fn render_score(&mut self, score: u32) {
        self.score = score;
    }

    fn render_game_over(&mut self, final_score: u32) {
        self.score = final_score;
        self.game_over = Some(final_score);
    }
}

/// TachyonFX effect state: line-clear flash and game-over fade.
#[derive(Default)]
pub struct Effects {
    flash_requested: bool,
    line_clear: Option<Effect>,
    game_over: Option<Effect>,
    last_process: Option<Instant>,
}

impl Effects {
    /// Flash the playfield on the next frame.
    pub fn line_clear(&mut self) {
        self.flash_requested = true;
        self.line_clear = None;
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Time since the previous frame, as TachyonFX wants it.
    fn delta(&mut self, now: Instant) -> TfxDuration {
        let delta = self
            .last_process
            .map(|t| now.saturating_duration_since(t))
            .unwrap_or(Duration::ZERO);
        self.last_process = Some(now);
        TfxDuration::from_millis(delta.as_millis().min(u32::MAX as u128) as u32)
    }
}

/// Glyph rows for a `grid` sized playfield. Every screen cell must have a board cell behind it.
pub fn board_rows(board: &Board, grid: Vector2D) -> Result<Vec<String>, RenderError> {
    (0..grid.y)
        .map(|y| {
            (0..grid.x)
                .map(|x| {
                    board
                        .sprite_at(Vector2D::new(x, y))
                        .map(glyph)
                        .ok_or(RenderError::MissingCell { x, y })
                })
                .collect()
        })
        .collect()
}

/// Glyph rows for a piece's spawn shape, cropped to its bounding box.
pub fn preview_rows(piece: &Piece) -> Vec<String> {
    let cells = piece.initial_points();
    let (Some(min_x), Some(max_x)) = (
        cells.iter().map(|c| c.x).min(),
        cells.iter().map(|c| c.x).max(),
    ) else {
        return Vec::new();
    };
    let min_y = cells.iter().map(|c| c.y).min().unwrap_or(0);
    let max_y = cells.iter().map(|c| c.y).max().unwrap_or(0);
    (min_y..=max_y)
        .map(|y| {
            (min_x..=max_x)
                .map(|x| {
                    let sprite = if cells.contains(&Vector2D::new(x, y)) {
                        CellSprite::Block
                    } else {
                        CellSprite::Empty
                    };
                    glyph(sprite)
                })
                .collect()
        })
        .collect()
}

/// Outer size (with border) of the playfield for a board of `grid` cells.
fn playfield_size(grid: Vector2D) -> (u16, u16) {
    let cols = grid.x.max(0) as u16;
    let rows = grid.y.max(0) as u16;
    (cols * CELL_WIDTH + 2, rows + 2)
}

/// Draw the game: playfield centred with the sidebar on its right, game-over panel on top.
pub fn draw(
    frame: &mut Frame,
    view: &View,
    rows: &[String],
    grid: Vector2D,
    lines: u32,
    theme: &Theme,
    effects: &mut Effects,
    now: Instant,
) {
    let area = frame.area();
    Block::default()
        .style(Style::default().bg(theme.background))
        .render(area, frame.buffer_mut());

    let (pw, ph) = playfield_size(grid);
    let total_w = pw + SIDEBAR_WIDTH;
    let horiz = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Fill(1),
            Constraint::Length(total_w),
            Constraint::Fill(1),
        ])
        .split(area);
    let vert = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Fill(1),
            Constraint::Length(ph),
            Constraint::Fill(1),
        ])
        .split(horiz[1]);
    let inner = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(pw), Constraint::Length(SIDEBAR_WIDTH)])
        .split(vert[1]);
    let (playfield_area, sidebar_area) = (inner[0], inner[1]);

    draw_playfield(frame, rows, theme, playfield_area);
    draw_sidebar(frame, view, lines, theme, sidebar_area);

    let delta = effects.delta(now);
    apply_line_clear_flash(frame, theme, playfield_area, effects, delta);
    if let Some(final_score) = view.game_over {
        apply_game_over_fade(frame, theme, playfield_area, effects, delta);
        draw_game_over(frame, final_score, theme, playfield_area);
    }
}

fn draw_playfield(frame: &mut Frame, rows: &[String], theme: &Theme, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme.accent).bg(theme.game_background))
        .title(Span::styled(" ASCII Tetris ", Style::default().fg(theme.accent)));
    let lines: Vec<Line> = rows.iter().map(|r| Line::from(r.as_str())).collect();
    Paragraph::new(lines)
        .style(Style::default().fg(theme.block).bg(theme.game_background))
        .block(block)
        .render(area, frame.buffer_mut());
}

fn panel(title: &str, theme: &Theme) -> Block<'static> {
    Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme.text_muted).bg(theme.panel_background))
        .style(Style::default().bg(theme.panel_background))
        .title(Span::styled(
            format!(" {title} "),
            Style::default().fg(theme.accent),
        ))
}

fn draw_sidebar(frame: &mut Frame, view: &View, lines: u32, theme: &Theme, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(6),  // Next (border + up to 4 rows)
            Constraint::Length(5),  // Stats (border + score, lines, theme)
            Constraint::Length(10), // Controls
            Constraint::Fill(1),
        ])
        .split(area);

    let preview: Vec<Line> = view
        .preview
        .as_ref()
        .map(preview_rows)
        .unwrap_or_default()
        .into_iter()
        .map(|r| Line::from(Span::styled(r, Style::default().fg(theme.block))))
        .collect();
    Paragraph::new(preview)
        .alignment(Alignment::Center)
        .block(panel("Next", theme))
        .render(chunks[0], frame.buffer_mut());

    let label = Style::default().fg(theme.text_muted);
    let value = Style::default().fg(theme.text);
    Paragraph::new(vec![
        Line::from(vec![
            Span::styled("Score: ", label),
            Span::styled(view.score.to_string(), value.bold()),
        ]),
        Line::from(vec![
            Span::styled("Lines: ", label),
            Span::styled(lines.to_string(), value),
        ]),
        Line::from(vec![
            Span::styled("Theme: ", label),
            Span::styled(theme.name, value),
        ]),
    ])
    .block(panel("Stats", theme))
    .render(chunks[1], frame.buffer_mut());

    let controls: Vec<Line> = CONTROLS
        .iter()
        .map(|(keys, what)| {
            Line::from(vec![
                Span::styled(format!("{keys:<9}"), value),
                Span::styled(*what, label),
            ])
        })
        .collect();
    Paragraph::new(controls)
        .block(panel("Controls", theme))
        .render(chunks[2], frame.buffer_mut());
}

fn apply_line_clear_flash(
    frame: &mut Frame,
    theme: &Theme,
    area: Rect,
    effects: &mut Effects,
    delta: TfxDuration,
) {
    if std::mem::take(&mut effects.flash_requested) {
        effects.line_clear = Some(
            fx::fade_to(
                theme.accent,
                theme.game_background,
                (LINE_CLEAR_FLASH_MS, Interpolation::Linear),
            )
            .with_area(area),
        );
    }
    let done = match &mut effects.line_clear {
        Some(effect) => {
            frame.render_effect(effect, area, delta);
            effect.done()
        }
        None => false,
    };
    if done {
        effects.line_clear = None;
    }
}

/// Dim the playfield (TachyonFX fade) once the game is over.
fn apply_game_over_fade(
    frame: &mut Frame,
    theme: &Theme,
    area: Rect,
    effects: &mut Effects,
    delta: TfxDuration,
) {
    let effect = effects.game_over.get_or_insert_with(|| {
        fx::fade_to(
            theme.text_muted,
            theme.game_background,
            (GAME_OVER_FADE_MS, Interpolation::Linear),
        )
        .with_area(area)
    });
    frame.render_effect(effect, area, delta);
}

fn draw_game_over(frame: &mut Frame, final_score: u32, theme: &Theme, playfield: Rect) {
    let width = playfield.width.min(22);
    let height = 7u16.min(playfield.height);
    let popup = Rect {
        x: playfield.x + playfield.width.saturating_sub(width) / 2,
        y: playfield.y + playfield.height.saturating_sub(height) / 2,
        width,
        height,
    };
    Clear.render(popup, frame.buffer_mut());
    let text = Style::default().fg(theme.text);
    Paragraph::new(vec![
        Line::from(Span::styled("Game Over", text.bold())),
        Line::from(""),
        Line::from(Span::styled(format!("Score: {final_score}"), text)),
        Line::from(""),
        Line::from(Span::styled(
            "r Restart  q Quit",
            Style::default().fg(theme.text_muted),
        )),
    ])
    .alignment(Alignment::Center)
    .block(panel("ASCII Tetris", theme))
    .render(popup, frame.buffer_mut());
}
