//! Integer grid coordinates and displacements.

use std::ops::{Add, AddAssign, Sub};

/// Grid coordinate or displacement. x grows to the right, y grows downwards (row 0 is the top).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Vector2D {
    pub x: i32,
    pub y: i32,
}

impl Vector2D {
    pub const ZERO: Self = Self::new(0, 0);
    pub const DOWN: Self = Self::new(0, 1);
    pub const LEFT: Self = Self::new(-1, 0);
    pub const RIGHT: Self = Self::new(1, 0);

    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

impl Add for Vector2D {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl AddAssign for Vector2D {
    fn add_assign(&mut self, rhs: Self) {
        self.x += rhs.x;
        self.y += rhs.y;
    }
}

impl Sub for Vector2D {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self::new(self.x - rhs.x, self.y - rhs.y)
    }
}

/// Board edge a point would cross.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CollisionDirection {
    Top,
    Left,
    Right,
    Bottom,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_displacement_arithmetic() {
        let p = Vector2D::new(3, -2);
        assert_eq!(p + Vector2D::DOWN, Vector2D::new(3, -1));
        assert_eq!(p - p, Vector2D::ZERO);
        assert_eq!(Vector2D::LEFT + Vector2D::RIGHT, Vector2D::ZERO);

        let mut q = p;
        q += Vector2D::LEFT;
        assert_eq!(q, Vector2D::new(2, -2));
    }
}
