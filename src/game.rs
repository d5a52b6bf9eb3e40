//! Game controller: spawn, descent, input, lock, line clear, score, game over.
//!
//! The controller owns the board and the falling piece. Every change is one uninterrupted
//! erase → move → stamp → render step, so a renderer only ever sees a fully merged board.
//! Time is not tracked here: the driver asks [`Game::wait`] how long to sleep and then calls
//! [`Game::tick`]; input commands arrive through [`Game::handle`] between ticks.

use crate::GameConfig;
use crate::board::Board;
use crate::geometry::{CollisionDirection, Vector2D};
use crate::piece::{Piece, ShapeKind};
use crate::scoring::points_for_lines;
use log::{debug, info, trace};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::time::Duration;

pub const DEFAULT_BOARD_SIZE: Vector2D = Vector2D::new(10, 20);
pub const COMPACT_BOARD_SIZE: Vector2D = Vector2D::new(10, 10);

/// Tick waits for normal gravity, held soft drop, and the pause between lock and line clear.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timing {
    pub drop: Duration,
    pub soft_drop: Duration,
    pub settle: Duration,
}

impl Default for Timing {
    fn default() -> Self {
        Self {
            drop: Duration::from_millis(300),
            soft_drop: Duration::from_millis(50),
            settle: Duration::from_millis(100),
        }
    }
}

/// Output side of the engine: called after every state change.
pub trait Renderer {
    fn render(&mut self, board: &Board);
    fn render_preview(&mut self, next: &Piece);
    fn render_score(&mut self, score: u32);
    fn render_game_over(&mut self, final_score: u32);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Created, first piece not spawned yet.
    Ready,
    /// A piece is falling and input is bound to it.
    Descending,
    /// A piece has locked; rows are cleared on the next tick, then the next piece spawns.
    Settling,
    GameOver,
}

/// Input commands consumed by the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    MoveLeft,
    MoveRight,
    Rotate,
    RotateCounterClockwise,
    SoftDropOn,
    SoftDropOff,
    HardDrop,
}

/// What a call to [`Game::tick`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Spawned,
    Moved,
    Locked,
    Settled { cleared: usize },
    GameOver,
    Idle,
}

#[derive(Debug)]
pub struct Game {
    board: Board,
    /// Falling piece; `None` before the first spawn and between lock and respawn.
    piece: Option<Piece>,
    next: Piece,
    score: u32,
    lines: u32,
    phase: Phase,
    soft_drop: bool,
    hard_drop: bool,
    /// Rows the current piece has descended.
    steps: u32,
    /// Serial of the most recently spawned piece.
    serial: u64,
    /// Piece serial input is bound to, if any.
    bound: Option<u64>,
    timing: Timing,
    rng: StdRng,
}

impl Game {
    pub fn new(config: &GameConfig) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        let mut game = Self {
            board: Board::new(config.board_size),
            piece: None,
            next: ShapeKind::O.spawn(config.board_size.x),
            score: 0,
            lines: 0,
            phase: Phase::Ready,
            soft_drop: false,
            hard_drop: false,
            steps: 0,
            serial: 0,
            bound: None,
            timing: config.timing,
            rng,
        };
        game.next = game.pick();
        game
    }

    #[cfg(test)]
    pub fn board(&self) -> &Board {
        &self.board
    }

    #[cfg(test)]
    pub fn piece(&self) -> Option<&Piece> {
        self.piece.as_ref()
    }

    #[cfg(test)]
    pub fn next(&self) -> &Piece {
        &self.next
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn lines(&self) -> u32 {
        self.lines
    }

    #[cfg(test)]
    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_game_over(&self) -> bool {
        self.phase == Phase::GameOver
    }

    #[cfg(test)]
    pub fn descent_steps(&self) -> u32 {
        self.steps
    }

    #[cfg(test)]
    pub fn input_bound(&self) -> Option<u64> {
        self.bound
    }

    /// Spawn the first piece. No-op once the game is running.
    pub fn start(&mut self, out: &mut impl Renderer) -> Step {
        if self.phase != Phase::Ready {
            return Step::Idle;
        }
        info!(
            "game start: board {}x{}",
            self.board.size().x,
            self.board.size().y
        );
        self.spawn(out)
    }

    /// How long to wait before the next [`Game::tick`]; `None` when no tick is pending.
    pub fn wait(&self) -> Option<Duration> {
        match self.phase {
            Phase::Ready | Phase::GameOver => None,
            Phase::Descending if self.hard_drop || self.steps == 0 => Some(Duration::ZERO),
            Phase::Descending if self.soft_drop => Some(self.timing.soft_drop),
            Phase::Descending => Some(self.timing.drop),
            Phase::Settling => Some(self.timing.settle),
        }
    }

    /// Run one iteration of the game loop.
    pub fn tick(&mut self, out: &mut impl Renderer) -> Step {
        match self.phase {
            Phase::Ready => self.start(out),
            Phase::Descending => self.descend(out),
            Phase::Settling => self.settle(out),
            Phase::GameOver => Step::Idle,
        }
    }

    /// Apply one input command. Returns false when the command was rejected or changed nothing.
    pub fn handle(&mut self, command: Command, out: &mut impl Renderer) -> bool {
        if self.phase == Phase::GameOver {
            return false;
        }
        match command {
            Command::SoftDropOn | Command::SoftDropOff => {
                let held = command == Command::SoftDropOn;
                let changed = self.soft_drop != held;
                self.soft_drop = held;
                changed
            }
            _ if self.bound.is_none() => false,
            Command::MoveLeft => self.shift(Vector2D::LEFT, CollisionDirection::Left, out),
            Command::MoveRight => self.shift(Vector2D::RIGHT, CollisionDirection::Right, out),
            Command::Rotate => self.rotate(true, out),
            Command::RotateCounterClockwise => self.rotate(false, out),
            Command::HardDrop => !std::mem::replace(&mut self.hard_drop, true),
        }
    }

    fn pick(&mut self) -> Piece {
        let kind = ShapeKind::ALL[self.rng.random_range(0..ShapeKind::ALL.len())];
        kind.spawn(self.board.size().x)
    }

    fn can_descend(piece: &Piece, board: &Board) -> bool {
        !piece
            .check_if_out_of_bounds(Vector2D::DOWN, board)
            .contains(&CollisionDirection::Bottom)
            && !piece.check_if_collides(Vector2D::DOWN, board)
    }

    fn spawn(&mut self, out: &mut impl Renderer) -> Step {
        let fresh = self.pick();
        let piece = std::mem::replace(&mut self.next, fresh);
        self.serial += 1;
        self.steps = 0;
        self.hard_drop = false;
        out.render_preview(&self.next);

        if !Self::can_descend(&piece, &self.board) {
            self.piece = None;
            self.phase = Phase::GameOver;
            info!("game over: score {}, lines {}", self.score, self.lines);
            out.render_game_over(self.score);
            return Step::GameOver;
        }

        debug!("spawn piece {} at {:?}", self.serial, piece.cells());
        self.piece = Some(piece);
        self.bind_input();
        self.phase = Phase::Descending;
        Step::Spawned
    }

    fn descend(&mut self, out: &mut impl Renderer) -> Step {
        let Some(piece) = self.piece.as_mut() else {
            return Step::Idle;
        };
        if !Self::can_descend(piece, &self.board) {
            return self.lock();
        }
        self.board.merge(piece, false);
        piece.translate(Vector2D::DOWN);
        self.board.merge(piece, true);
        self.steps += 1;
        out.render(&self.board);
        Step::Moved
    }

    /// The piece's cells are already stamped; drop the piece and wait for the settle tick.
    fn lock(&mut self) -> Step {
        self.unbind_input();
        if let Some(piece) = self.piece.take() {
            debug!(
                "piece {} locked after {} rows at {:?}",
                self.serial,
                self.steps,
                piece.cells()
            );
        }
        self.hard_drop = false;
        self.phase = Phase::Settling;
        Step::Locked
    }

    fn settle(&mut self, out: &mut impl Renderer) -> Step {
        let rows = self.board.find_completed_rows();
        self.board.clear_rows(&rows);
        if !rows.is_empty() {
            let points = points_for_lines(rows.len());
            self.score = self.score.saturating_add(points);
            self.lines += rows.len() as u32;
            info!(
                "cleared rows {:?} for {} points (score {})",
                rows, points, self.score
            );
            out.render_score(self.score);
        }
        out.render(&self.board);

        match self.spawn(out) {
            Step::GameOver => Step::GameOver,
            _ => Step::Settled {
                cleared: rows.len(),
            },
        }
    }

    fn shift(
        &mut self,
        displacement: Vector2D,
        edge: CollisionDirection,
        out: &mut impl Renderer,
    ) -> bool {
        let Some(piece) = self.piece.as_mut() else {
            return false;
        };
        if piece
            .check_if_out_of_bounds(displacement, &self.board)
            .contains(&edge)
            || piece.check_if_collides(displacement, &self.board)
        {
            return false;
        }
        self.board.merge(piece, false);
        piece.translate(displacement);
        self.board.merge(piece, true);
        out.render(&self.board);
        true
    }

    /// Rotation is tried on a throwaway copy first; no kicks.
    fn rotate(&mut self, clockwise: bool, out: &mut impl Renderer) -> bool {
        let Some(piece) = self.piece.as_mut() else {
            return false;
        };
        let mut turned = piece.duplicate();
        turned.rotate(clockwise);
        if !turned
            .check_if_out_of_bounds(Vector2D::ZERO, &self.board)
            .is_empty()
        {
            trace!("rotation rejected: out of bounds");
            return false;
        }

        // Test against locked cells only; the live piece must not block its own rotation.
        self.board.merge(piece, false);
        if turned.overlaps(&self.board) {
            self.board.merge(piece, true);
            trace!("rotation rejected: blocked");
            return false;
        }
        piece.rotate(clockwise);
        self.board.merge(piece, true);
        out.render(&self.board);
        true
    }

    fn bind_input(&mut self) {
        debug_assert!(
            self.bound.is_none(),
            "input still bound to piece {:?}",
            self.bound
        );
        self.bound = Some(self.serial);
    }

    fn unbind_input(&mut self) {
        let released = self.bound.take();
        debug_assert_eq!(released, Some(self.serial), "input was not bound to the locking piece");
    }
}
