//! Board: fixed-size occupancy grid of locked cells, row completion and collapse.

use crate::geometry::Vector2D;
use crate::piece::Piece;
use std::collections::VecDeque;

/// What a single board cell looks like on screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellSprite {
    Empty,
    Block,
}

/// Two-column text glyph for a cell sprite.
pub const fn glyph(sprite: CellSprite) -> &'static str {
    match sprite {
        CellSprite::Empty => "  ",
        CellSprite::Block => "[]",
    }
}

/// Occupancy grid. y=0 is the top row; rows[y][x] is true when the cell is occupied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    width: usize,
    height: usize,
    rows: VecDeque<Vec<bool>>,
}

impl Board {
    /// `size.x` columns by `size.y` rows, all empty. Negative sizes are treated as zero.
    pub fn new(size: Vector2D) -> Self {
        let (width, height) = (size.x.max(0) as usize, size.y.max(0) as usize);
        Self {
            width,
            height,
            rows: (0..height).map(|_| vec![false; width]).collect(),
        }
    }

    pub fn size(&self) -> Vector2D {
        Vector2D::new(self.width as i32, self.height as i32)
    }

    #[inline]
    pub fn contains(&self, p: Vector2D) -> bool {
        p.x >= 0 && (p.x as usize) < self.width && p.y >= 0 && (p.y as usize) < self.height
    }

    /// Occupancy at `p`, or `None` when there is no backing cell.
    #[inline]
    pub fn get(&self, p: Vector2D) -> Option<bool> {
        if !self.contains(p) {
            return None;
        }
        self.rows
            .get(p.y as usize)
            .and_then(|row| row.get(p.x as usize))
            .copied()
    }

    #[inline]
    pub fn is_occupied(&self, p: Vector2D) -> bool {
        self.get(p).unwrap_or(false)
    }

    /// Set occupancy at `p`; points outside the board are ignored.
    pub fn set(&mut self, p: Vector2D, occupied: bool) {
        if !self.contains(p) {
            return;
        }
        if let Some(row) = self.rows.get_mut(p.y as usize) {
            row[p.x as usize] = occupied;
        }
    }

    /// Stamp (`true`) or erase (`false`) the in-bounds cells of `piece`.
    pub fn merge(&mut self, piece: &Piece, occupied: bool) {
        for &p in piece.cells() {
            self.set(p, occupied);
        }
    }

    /// Indices of fully occupied rows, top to bottom.
    pub fn find_completed_rows(&self) -> Vec<usize> {
        self.rows
            .iter()
            .enumerate()
            .filter(|(_, row)| row.iter().all(|&occupied| occupied))
            .map(|(y, _)| y)
            .collect()
    }

    /// Clear each listed row in order: empty it, pull it out and push it back in at the top.
    /// Rows above a cleared row drop by one; pass indices in ascending order.
    pub fn clear_rows(&mut self, rows: &[usize]) {
        for &y in rows {
            let Some(mut row) = self.rows.remove(y) else {
                continue;
            };
            row.fill(false);
            self.rows.push_front(row);
        }
    }

    /// Sprite for the cell at `p`, or `None` when there is no backing cell.
    pub fn sprite_at(&self, p: Vector2D) -> Option<CellSprite> {
        self.get(p)
            .map(|occupied| if occupied { CellSprite::Block } else { CellSprite::Empty })
    }

    /// Occupied cell count (tests and logging).
    #[cfg(test)]
    pub fn occupied_count(&self) -> usize {
        self.rows.iter().flatten().filter(|&&occupied| occupied).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::piece::ShapeKind;

    fn fill_row(board: &mut Board, y: i32) {
        for x in 0..board.size().x {
            board.set(Vector2D::new(x, y), true);
        }
    }

    fn row(board: &Board, y: i32) -> Vec<bool> {
        (0..board.size().x)
            .map(|x| board.is_occupied(Vector2D::new(x, y)))
            .collect()
    }

    #[test]
    fn test_new_board_is_empty() {
        let board = Board::new(Vector2D::new(10, 20));
        assert_eq!(board.size(), Vector2D::new(10, 20));
        assert_eq!(board.occupied_count(), 0);
        assert!(board.find_completed_rows().is_empty());
    }

    #[test]
    fn test_get_outside_is_none() {
        let board = Board::new(Vector2D::new(10, 10));
        assert_eq!(board.get(Vector2D::new(-1, 0)), None);
        assert_eq!(board.get(Vector2D::new(10, 0)), None);
        assert_eq!(board.get(Vector2D::new(0, 10)), None);
        assert_eq!(board.get(Vector2D::new(9, 9)), Some(false));
        assert_eq!(board.sprite_at(Vector2D::new(0, -1)), None);
    }

    #[test]
    fn test_set_outside_is_ignored() {
        let mut board = Board::new(Vector2D::new(4, 4));
        board.set(Vector2D::new(4, 0), true);
        board.set(Vector2D::new(0, -1), true);
        assert_eq!(board.occupied_count(), 0);
    }

    #[test]
    fn test_merge_stamps_and_erases_in_bounds_cells() {
        let mut board = Board::new(Vector2D::new(10, 20));
        let mut piece = ShapeKind::I.spawn(10);
        piece.translate(Vector2D::new(0, 2));
        // Two of the four cells are still above the top edge.
        board.merge(&piece, true);
        assert_eq!(board.occupied_count(), 2);
        assert!(board.is_occupied(Vector2D::new(4, 0)));
        assert!(board.is_occupied(Vector2D::new(4, 1)));
        board.merge(&piece, false);
        assert_eq!(board.occupied_count(), 0);
    }

    #[test]
    fn test_find_completed_rows_in_order() {
        let mut board = Board::new(Vector2D::new(5, 8));
        fill_row(&mut board, 6);
        fill_row(&mut board, 1);
        board.set(Vector2D::new(0, 3), true);
        assert_eq!(board.find_completed_rows(), vec![1, 6]);
    }

    #[test]
    fn test_clear_rows_collapses_and_inserts_empty_rows_on_top() {
        let mut board = Board::new(Vector2D::new(10, 20));
        // Partial rows get a distinct pattern: row y has columns 0..=(y % 9) filled.
        for y in 0..20 {
            if y == 2 || y == 5 {
                fill_row(&mut board, y);
            } else {
                for x in 0..=(y % 9) {
                    board.set(Vector2D::new(x, y), true);
                }
            }
        }
        let before: Vec<Vec<bool>> = (0..20).map(|y| row(&board, y)).collect();

        let completed = board.find_completed_rows();
        assert_eq!(completed, vec![2, 5]);
        board.clear_rows(&completed);

        assert!(row(&board, 0).iter().all(|&c| !c));
        assert!(row(&board, 1).iter().all(|&c| !c));
        assert_eq!(row(&board, 2), before[0]);
        assert_eq!(row(&board, 3), before[1]);
        assert_eq!(row(&board, 4), before[3]);
        assert_eq!(row(&board, 5), before[4]);
        for y in 6..20 {
            assert_eq!(row(&board, y), before[y as usize], "row {y}");
        }
        assert!(board.find_completed_rows().is_empty());
        assert_eq!(board.size(), Vector2D::new(10, 20));
    }

    #[test]
    fn test_clear_rows_ignores_missing_index() {
        let mut board = Board::new(Vector2D::new(3, 3));
        fill_row(&mut board, 2);
        board.clear_rows(&[7]);
        assert_eq!(board.occupied_count(), 3);
    }

    #[test]
    fn test_glyph_lookup() {
        assert_eq!(glyph(CellSprite::Block), "[]");
        assert_eq!(glyph(CellSprite::Empty), "  ");
        assert_eq!(glyph(CellSprite::Empty).len(), glyph(CellSprite::Block).len());
    }
}
