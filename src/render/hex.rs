//! Infinite hex-grid background lattice
//!
//! The grid is never materialized: given the visible world bounds, cell
//! indices are found by flooring the corner coordinates divided by the cell
//! pitch, and odd rows are staggered by half a pitch.

use glam::Vec2;

use crate::consts::HEX_PITCH;

/// Vertical distance between staggered rows for a hex lattice of the given
/// horizontal pitch
pub fn row_height() -> f32 {
    HEX_PITCH * 3.0f32.sqrt() / 2.0
}

/// World position of the lattice point at (col, row)
pub fn cell_center(col: i32, row: i32) -> Vec2 {
    let stagger = if row.rem_euclid(2) == 1 {
        HEX_PITCH / 2.0
    } else {
        0.0
    };
    Vec2::new(col as f32 * HEX_PITCH + stagger, row as f32 * row_height())
}

/// All lattice points overlapping the given world-space bounds, padded by one
/// cell so staggered points at the edges are included
pub fn cells_in_bounds(min: Vec2, max: Vec2) -> Vec<Vec2> {
    let row_h = row_height();
    let row_start = (min.y / row_h).floor() as i32 - 1;
    let row_end = (max.y / row_h).floor() as i32 + 1;
    let col_start = (min.x / HEX_PITCH).floor() as i32 - 1;
    let col_end = (max.x / HEX_PITCH).floor() as i32 + 1;

    let rows = (row_end - row_start + 1) as usize;
    let cols = (col_end - col_start + 1) as usize;
    let mut cells = Vec::with_capacity(rows * cols);
    for row in row_start..=row_end {
        for col in col_start..=col_end {
            cells.push(cell_center(col, row));
        }
    }
    cells
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cells_cover_the_bounds() {
        let min = Vec2::new(-400.0, -300.0);
        let max = Vec2::new(400.0, 300.0);
        let cells = cells_in_bounds(min, max);
        assert!(!cells.is_empty());

        // Every interior point of the bounds is within one pitch of a cell
        for probe in [
            min,
            max,
            Vec2::ZERO,
            Vec2::new(min.x, max.y),
            Vec2::new(max.x, min.y),
        ] {
            let nearest = cells
                .iter()
                .map(|c| c.distance(probe))
                .fold(f32::INFINITY, f32::min);
            assert!(nearest <= HEX_PITCH, "gap of {nearest} at {probe:?}");
        }
    }

    #[test]
    fn cells_stay_near_the_bounds() {
        let min = Vec2::new(1000.0, 2000.0);
        let max = Vec2::new(1500.0, 2400.0);
        for cell in cells_in_bounds(min, max) {
            assert!(cell.x >= min.x - 2.0 * HEX_PITCH && cell.x <= max.x + 2.0 * HEX_PITCH);
            assert!(cell.y >= min.y - 2.0 * HEX_PITCH && cell.y <= max.y + 2.0 * HEX_PITCH);
        }
    }

    #[test]
    fn odd_rows_are_staggered() {
        let even = cell_center(0, 0);
        let odd = cell_center(0, 1);
        assert!((odd.x - even.x - HEX_PITCH / 2.0).abs() < 1e-5);

        // Negative rows stagger the same way
        let neg = cell_center(0, -1);
        assert!((neg.x - even.x - HEX_PITCH / 2.0).abs() < 1e-5);
    }
}
