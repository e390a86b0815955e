use serde::{Deserialize, Serialize};

/// Cells in the guaranteed-safe 3×3 opening around the start cell.
pub const SAFE_ZONE_CELLS: usize = 9;

/// Board dimensions and mine count.
///
/// A single configuration is shared by every scenario of a bank and every board
/// simulated during a training run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardConfig {
    pub width: usize,
    pub height: usize,
    pub mine_count: usize,
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self::CLASSIC
    }
}

/// Invalid board configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum BoardConfigError {
    #[display("board must be at least 3x3, got {width}x{height}")]
    TooSmall { width: usize, height: usize },
    #[display("board of {width}x{height} cells is too large")]
    TooLarge { width: usize, height: usize },
    #[display("{mine_count} mines do not fit outside the safe opening (at most {max})")]
    TooManyMines { mine_count: usize, max: usize },
}

impl BoardConfig {
    /// 10×10 board with 15 mines.
    pub const CLASSIC: Self = Self {
        width: 10,
        height: 10,
        mine_count: 15,
    };

    /// Creates a validated configuration.
    ///
    /// Every mine must fit outside a 3×3 opening, whatever cell the opening is
    /// centered on.
    pub fn new(width: usize, height: usize, mine_count: usize) -> Result<Self, BoardConfigError> {
        if width < 3 || height < 3 {
            return Err(BoardConfigError::TooSmall { width, height });
        }
        let cells = width
            .checked_mul(height)
            .ok_or(BoardConfigError::TooLarge { width, height })?;
        let max = cells - SAFE_ZONE_CELLS;
        if mine_count > max {
            return Err(BoardConfigError::TooManyMines { mine_count, max });
        }
        Ok(Self {
            width,
            height,
            mine_count,
        })
    }

    #[must_use]
    pub const fn cell_count(&self) -> usize {
        self.width * self.height
    }

    /// Number of safe cells that must be revealed to win.
    #[must_use]
    pub const fn safe_cell_count(&self) -> usize {
        self.cell_count() - self.mine_count
    }
}
