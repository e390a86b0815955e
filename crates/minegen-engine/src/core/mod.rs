//! Board data structures and the single-game simulation.
//!
//! - [`BoardConfig`] - Board dimensions and mine count shared by a training run
//! - [`MineLayout`] - Immutable mine bitmap
//! - [`Cell`] / [`CellState`] - Per-cell simulation state
//! - [`Board`] - Mutable Minesweeper instance with reveal/flag and win/loss detection
//!
//! Coordinates are `(x, y)` pairs with `x` growing to the right and `y` growing
//! downward. Cells are stored row-major.

pub use self::{board::*, cell::*, config::*, mine_layout::*};

mod board;
mod cell;
mod config;
mod mine_layout;

/// Iterates over the cells of the `(2·radius+1)²` square centered at `pos`,
/// clipped to the board and excluding `pos` itself.
///
/// The iterator does not borrow the board, so it can drive mutations of it.
pub fn neighborhood(
    width: usize,
    height: usize,
    (x, y): (usize, usize),
    radius: usize,
) -> impl Iterator<Item = (usize, usize)> {
    let x0 = x.saturating_sub(radius);
    let x1 = usize::min(x + radius, width.saturating_sub(1));
    let y0 = y.saturating_sub(radius);
    let y1 = usize::min(y + radius, height.saturating_sub(1));
    (y0..=y1)
        .flat_map(move |ny| (x0..=x1).map(move |nx| (nx, ny)))
        .filter(move |&p| p != (x, y))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_neighborhood_interior_and_corner() {
        assert_eq!(neighborhood(10, 10, (5, 5), 1).count(), 8);
        assert_eq!(neighborhood(10, 10, (5, 5), 2).count(), 24);
        assert_eq!(neighborhood(10, 10, (0, 0), 1).count(), 3);
        assert_eq!(neighborhood(10, 10, (9, 0), 2).count(), 8);
    }

    #[test]
    fn test_neighborhood_is_row_major() {
        let cells: Vec<_> = neighborhood(3, 3, (1, 1), 1).collect();
        assert_eq!(
            cells,
            [(0, 0), (1, 0), (2, 0), (0, 1), (2, 1), (0, 2), (1, 2), (2, 2)]
        );
    }
}
