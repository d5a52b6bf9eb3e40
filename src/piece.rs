//! Falling piece: a set of absolute grid cells plus rotation, translation and speculative checks.

use crate::board::Board;
use crate::geometry::{CollisionDirection, Vector2D};

/// Shape templates (O, I, S, Z, L, J, T). Cells sit above the top edge (negative y) so a piece
/// slides into view one row per tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShapeKind {
    O,
    I,
    S,
    Z,
    L,
    J,
    T,
}

impl ShapeKind {
    pub const ALL: [Self; 7] = [Self::O, Self::I, Self::S, Self::Z, Self::L, Self::J, Self::T];

    /// Template cells anchored at column 0. The first cell is the rotation pivot.
    pub fn cells(&self) -> &'static [Vector2D; 4] {
        const fn v(x: i32, y: i32) -> Vector2D {
            Vector2D::new(x, y)
        }
        const O: [Vector2D; 4] = [v(0, -1), v(0, -2), v(1, -1), v(1, -2)];
        const I: [Vector2D; 4] = [v(0, -1), v(0, -2), v(0, -3), v(0, -4)];
        const S: [Vector2D; 4] = [v(0, -1), v(1, -1), v(1, -2), v(2, -2)];
        const Z: [Vector2D; 4] = [v(0, -2), v(1, -2), v(1, -1), v(2, -1)];
        const L: [Vector2D; 4] = [v(0, -3), v(0, -2), v(0, -1), v(1, -1)];
        const J: [Vector2D; 4] = [v(0, -1), v(1, -1), v(1, -2), v(1, -3)];
        const T: [Vector2D; 4] = [v(1, -1), v(0, -2), v(1, -2), v(2, -2)];
        match self {
            Self::O => &O,
            Self::I => &I,
            Self::S => &S,
            Self::Z => &Z,
            Self::L => &L,
            Self::J => &J,
            Self::T => &T,
        }
    }

    /// Fresh piece of this shape shifted to the spawn column of a board `board_width` wide.
    pub fn spawn(&self, board_width: i32) -> Piece {
        let offset = Vector2D::new((board_width / 2 - 1).max(0), 0);
        Piece::new(self.cells().iter().map(|&c| c + offset).collect())
    }
}

/// Currently controllable shape. Cells are absolute board coordinates, not piece-local offsets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Piece {
    cells: Vec<Vector2D>,
    /// Snapshot taken at creation, restored by `reset_to_start`.
    initial_points: Vec<Vector2D>,
}

impl Piece {
    pub fn new(cells: Vec<Vector2D>) -> Self {
        Self {
            initial_points: cells.clone(),
            cells,
        }
    }

    pub fn cells(&self) -> &[Vector2D] {
        &self.cells
    }

    /// Cells as they were when the piece was created.
    pub fn initial_points(&self) -> &[Vector2D] {
        &self.initial_points
    }

    /// Shift every cell by `displacement`. Legality is the caller's job.
    pub fn translate(&mut self, displacement: Vector2D) -> &mut Self {
        for cell in &mut self.cells {
            *cell += displacement;
        }
        self
    }

    /// Rotate every cell but the first by 90° around the first. Always succeeds geometrically.
    pub fn rotate(&mut self, clockwise: bool) -> &mut Self {
        let Some((pivot, rest)) = self.cells.split_first_mut() else {
            return self;
        };
        let pivot = *pivot;
        for cell in rest {
            let rel = *cell - pivot;
            let turned = if clockwise {
                Vector2D::new(rel.y, -rel.x)
            } else {
                Vector2D::new(-rel.y, rel.x)
            };
            *cell = pivot + turned;
        }
        self
    }

    /// Edges crossed by the cells after `displacement`, one entry per crossing per cell.
    /// Empty means the displaced piece lies fully inside the board.
    pub fn check_if_out_of_bounds(
        &self,
        displacement: Vector2D,
        board: &Board,
    ) -> Vec<CollisionDirection> {
        let size = board.size();
        let mut crossed = Vec::new();
        for &cell in &self.cells {
            let p = cell + displacement;
            if p.x >= size.x {
                crossed.push(CollisionDirection::Right);
            }
            if p.x < 0 {
                crossed.push(CollisionDirection::Left);
            }
            if p.y >= size.y {
                crossed.push(CollisionDirection::Bottom);
            }
            if p.y < 0 {
                crossed.push(CollisionDirection::Top);
            }
        }
        crossed
    }

    /// True if a displaced cell lands on an occupied board cell that the piece does not itself
    /// occupy right now. Displaced cells outside the board are skipped.
    pub fn check_if_collides(&self, displacement: Vector2D, board: &Board) -> bool {
        self.cells
            .iter()
            .map(|&cell| cell + displacement)
            .filter(|p| board.contains(*p))
            .filter(|p| !self.cells.contains(p))
            .any(|p| board.is_occupied(p))
    }

    /// True if any in-bounds cell of the piece sits on an occupied board cell.
    pub fn overlaps(&self, board: &Board) -> bool {
        self.cells.iter().any(|&p| board.is_occupied(p))
    }

    /// Independent copy whose spawn snapshot is the current cells.
    pub fn duplicate(&self) -> Self {
        Self::new(self.cells.clone())
    }

    #[allow(dead_code)]
    pub fn reset_to_start(&mut self) -> &mut Self {
        self.cells.clone_from(&self.initial_points);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn board() -> Board {
        Board::new(Vector2D::new(10, 20))
    }

    fn piece_at(kind: ShapeKind, x: i32, y: i32) -> Piece {
        let mut p = kind.spawn(0);
        p.translate(Vector2D::new(x, y));
        p
    }

    #[test]
    fn test_every_template_has_four_distinct_cells() {
        for kind in ShapeKind::ALL {
            let cells = kind.cells();
            for (i, a) in cells.iter().enumerate() {
                assert!(a.y < 0, "{kind:?} should start above the board");
                assert!(cells[i + 1..].iter().all(|b| a != b), "{kind:?} repeats a cell");
            }
        }
    }

    #[test]
    fn test_spawn_is_centred() {
        let p = ShapeKind::O.spawn(10);
        let xs: Vec<i32> = p.cells().iter().map(|c| c.x).collect();
        assert_eq!(xs, vec![4, 4, 5, 5]);
        assert_eq!(p.initial_points(), p.cells());
    }

    #[test]
    fn test_translate_moves_every_cell() {
        let mut p = piece_at(ShapeKind::I, 2, 5);
        let before = p.cells().to_vec();
        p.translate(Vector2D::new(1, 2));
        for (a, b) in before.iter().zip(p.cells()) {
            assert_eq!(*a + Vector2D::new(1, 2), *b);
        }
    }

    #[test]
    fn test_rotate_keeps_pivot_and_turns_clockwise() {
        let mut p = Piece::new(vec![
            Vector2D::new(5, 5),
            Vector2D::new(6, 5),
            Vector2D::new(5, 4),
        ]);
        p.rotate(true);
        assert_eq!(p.cells()[0], Vector2D::new(5, 5));
        // (1, 0) -> (0, -1); (0, -1) -> (-1, 0)
        assert_eq!(p.cells()[1], Vector2D::new(5, 4));
        assert_eq!(p.cells()[2], Vector2D::new(4, 5));
    }

    #[test]
    fn test_counter_clockwise_undoes_clockwise() {
        for kind in ShapeKind::ALL {
            let mut p = piece_at(kind, 4, 10);
            let start = p.cells().to_vec();
            p.rotate(true).rotate(false);
            assert_eq!(p.cells(), start.as_slice(), "{kind:?}");
        }
    }

    #[test]
    fn test_four_rotations_are_identity() {
        for kind in ShapeKind::ALL {
            for clockwise in [true, false] {
                let mut p = piece_at(kind, 4, 10);
                let start = p.cells().to_vec();
                for _ in 0..4 {
                    p.rotate(clockwise);
                }
                assert_eq!(p.cells(), start.as_slice(), "{kind:?} clockwise={clockwise}");
            }
        }
    }

    #[test]
    fn test_out_of_bounds_reports_each_crossing() {
        let b = board();
        let p = Piece::new(vec![Vector2D::new(0, 0), Vector2D::new(9, 19)]);
        assert!(p.check_if_out_of_bounds(Vector2D::ZERO, &b).is_empty());
        assert_eq!(
            p.check_if_out_of_bounds(Vector2D::new(-1, -1), &b),
            vec![CollisionDirection::Left, CollisionDirection::Top]
        );
        assert_eq!(
            p.check_if_out_of_bounds(Vector2D::new(1, 1), &b),
            vec![CollisionDirection::Right, CollisionDirection::Bottom]
        );
    }

    #[test]
    fn test_out_of_bounds_keeps_duplicates_across_cells() {
        let b = board();
        let p = piece_at(ShapeKind::I, 0, 0);
        let crossed = p.check_if_out_of_bounds(Vector2D::ZERO, &b);
        assert_eq!(crossed, vec![CollisionDirection::Top; 4]);
    }

    #[test]
    fn test_out_of_bounds_does_not_mutate() {
        let b = board();
        let p = piece_at(ShapeKind::T, 3, 3);
        let before = p.clone();
        let _ = p.check_if_out_of_bounds(Vector2D::new(-20, 40), &b);
        assert_eq!(p, before);
    }

    #[test]
    fn test_no_collision_on_free_cells() {
        let mut b = board();
        b.set(Vector2D::new(0, 19), true);
        b.set(Vector2D::new(9, 0), true);
        for kind in ShapeKind::ALL {
            let p = piece_at(kind, 4, 8);
            for d in [Vector2D::ZERO, Vector2D::DOWN, Vector2D::LEFT, Vector2D::RIGHT] {
                assert!(!p.check_if_collides(d, &b), "{kind:?} {d:?}");
            }
        }
    }

    #[test]
    fn test_collides_with_occupied_cell() {
        let mut b = board();
        let p = piece_at(ShapeKind::O, 4, 10);
        let below = *p.cells().iter().max_by_key(|c| c.y).unwrap() + Vector2D::DOWN;
        b.set(below, true);
        assert!(p.check_if_collides(Vector2D::DOWN, &b));
        assert!(!p.check_if_collides(Vector2D::LEFT, &b));
    }

    #[test]
    fn test_self_overlap_is_not_collision() {
        let mut b = board();
        let p = piece_at(ShapeKind::S, 3, 10);
        b.merge(&p, true);
        assert!(!p.check_if_collides(Vector2D::ZERO, &b));
        // S shifted right overlaps its own cells only.
        assert!(!p.check_if_collides(Vector2D::RIGHT, &b));
    }

    #[test]
    fn test_cells_out_of_bounds_are_not_collisions() {
        let mut b = board();
        b.set(Vector2D::new(0, 0), true);
        let p = piece_at(ShapeKind::I, 0, 0);
        assert!(!p.check_if_collides(Vector2D::LEFT, &b));
        assert!(p.check_if_collides(Vector2D::DOWN, &b));
    }

    #[test]
    fn test_duplicate_is_independent_with_fresh_snapshot() {
        let mut p = piece_at(ShapeKind::L, 2, 2);
        p.translate(Vector2D::DOWN);
        let mut copy = p.duplicate();
        assert_eq!(copy.initial_points(), p.cells());
        copy.rotate(true);
        assert_ne!(copy.cells(), p.cells());
    }

    #[test]
    fn test_reset_to_start_restores_spawn_cells() {
        let mut p = ShapeKind::J.spawn(10);
        let spawn = p.cells().to_vec();
        p.translate(Vector2D::new(2, 7)).rotate(true);
        p.reset_to_start();
        assert_eq!(p.cells(), spawn.as_slice());
    }
}
