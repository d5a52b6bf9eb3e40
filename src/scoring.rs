//! Line-clear scoring.

/// Points for rows cleared by a single lock, indexed by row count (0..=4).
pub const LINE_SCORES: [u32; 5] = [0, 100, 300, 500, 800];

/// Points awarded for clearing `lines` rows at once.
pub fn points_for_lines(lines: usize) -> u32 {
    LINE_SCORES
        .get(lines)
        .copied()
        .unwrap_or_else(|| 200u32.saturating_mul(lines as u32))
}
