use rand::{Rng, seq::IteratorRandom as _};

use super::{Cell, CellState, MineLayout, neighborhood};

/// Terminal status of a [`Board`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::IsVariant)]
pub enum BoardStatus {
    Playing,
    Won,
    Lost,
}

/// A mutable Minesweeper instance.
///
/// Built from a fixed mine layout with [`Board::init_fixed`], which also opens the
/// start cell. The board then only moves forward: cells go from hidden to revealed
/// or flagged and never back.
///
/// # Terminal states
///
/// - **Lost**: a mine cell has been revealed
/// - **Won**: every safe cell has been revealed
///
/// Both flags are sticky. A terminal board still accepts reveals and flags, but
/// callers are expected to stop acting on it.
///
/// # Example
///
/// ```
/// use minegen_engine::{Board, MineLayout};
///
/// let mines = MineLayout::from_positions(4, 4, [(3, 3)]);
/// let board = Board::init_fixed((0, 0), &mines);
///
/// // The opening flood-fills every safe cell.
/// assert!(board.is_won());
/// assert!(!board.is_lost());
/// ```
#[derive(Debug, Clone)]
pub struct Board {
    width: usize,
    height: usize,
    mine_count: usize,
    cells: Vec<Cell>,
    revealed_safe: usize,
    won: bool,
    lost: bool,
}

impl Board {
    /// Installs the mines of `mines`, computes the neighbor counts of every safe
    /// cell and reveals `start`.
    ///
    /// `start` is expected to be a safe cell consistent with the layout; scenario
    /// banks guarantee this.
    #[must_use]
    pub fn init_fixed(start: (usize, usize), mines: &MineLayout) -> Self {
        let (width, height) = (mines.width(), mines.height());
        let cells = (0..height)
            .flat_map(|y| (0..width).map(move |x| (x, y)))
            .map(|pos| {
                if mines.has_mine(pos) {
                    return Cell::new(true, 0);
                }
                let count = neighborhood(width, height, pos, 1)
                    .filter(|p| mines.has_mine(*p))
                    .count();
                Cell::new(false, u8::try_from(count).unwrap_or(u8::MAX))
            })
            .collect();
        let mut board = Self {
            width,
            height,
            mine_count: mines.mine_count(),
            cells,
            revealed_safe: 0,
            won: false,
            lost: false,
        };
        board.reveal(start);
        board
    }

    #[must_use]
    pub const fn width(&self) -> usize {
        self.width
    }

    #[must_use]
    pub const fn height(&self) -> usize {
        self.height
    }

    #[must_use]
    pub const fn mine_count(&self) -> usize {
        self.mine_count
    }

    #[must_use]
    pub const fn contains(&self, (x, y): (usize, usize)) -> bool {
        x < self.width && y < self.height
    }

    const fn index(&self, (x, y): (usize, usize)) -> usize {
        y * self.width + x
    }

    /// Returns the cell at `pos`.
    ///
    /// # Panics
    ///
    /// Panics if `pos` lies outside the board.
    #[must_use]
    pub fn cell(&self, pos: (usize, usize)) -> Cell {
        assert!(self.contains(pos), "cell {pos:?} outside the board");
        self.cells[self.index(pos)]
    }

    /// Iterates over every position in row-major order.
    pub fn positions(&self) -> impl Iterator<Item = (usize, usize)> + use<> {
        let width = self.width;
        (0..self.height).flat_map(move |y| (0..width).map(move |x| (x, y)))
    }

    /// Returns `true` if `pos` lies within 2 cells of any border.
    #[must_use]
    pub const fn is_near_edge(&self, (x, y): (usize, usize)) -> bool {
        x <= 1 || y <= 1 || x + 2 >= self.width || y + 2 >= self.height
    }

    #[must_use]
    pub const fn is_won(&self) -> bool {
        self.won
    }

    #[must_use]
    pub const fn is_lost(&self) -> bool {
        self.lost
    }

    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        self.won || self.lost
    }

    #[must_use]
    pub const fn status(&self) -> BoardStatus {
        if self.won {
            BoardStatus::Won
        } else if self.lost {
            BoardStatus::Lost
        } else {
            BoardStatus::Playing
        }
    }

    /// Reveals the cell at `pos`.
    ///
    /// Does nothing if `pos` is out of bounds or the cell is not hidden. Revealing
    /// a mine loses the game. Revealing a zero cell flood-fills its hidden
    /// neighbors using an explicit worklist, bounded by the number of cells.
    pub fn reveal(&mut self, pos: (usize, usize)) {
        let mut worklist = vec![pos];
        while let Some(pos) = worklist.pop() {
            if !self.contains(pos) {
                continue;
            }
            let index = self.index(pos);
            let cell = &mut self.cells[index];
            if !cell.state().is_hidden() {
                continue;
            }
            cell.set_state(CellState::Revealed);
            if cell.is_mine() {
                self.lost = true;
                continue;
            }
            self.revealed_safe += 1;
            if cell.neighboring_mines() == 0 {
                worklist.extend(neighborhood(self.width, self.height, pos, 1));
            }
        }
        if self.revealed_safe == self.width * self.height - self.mine_count {
            self.won = true;
        }
    }

    /// Flags the cell at `pos` if it is hidden.
    ///
    /// Flags are never removed.
    pub fn flag(&mut self, pos: (usize, usize)) {
        if !self.contains(pos) {
            return;
        }
        let index = self.index(pos);
        let cell = &mut self.cells[index];
        if cell.state().is_hidden() {
            cell.set_state(CellState::Flagged);
        }
    }

    /// Iterates over hidden cell positions in row-major order.
    pub fn hidden_positions(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.positions()
            .filter(|pos| self.cells[self.index(*pos)].state().is_hidden())
    }

    /// Reveals a uniformly chosen hidden cell and returns its position.
    ///
    /// Returns `None` without touching the board if no hidden cell remains.
    pub fn reveal_random_hidden<R>(&mut self, rng: &mut R) -> Option<(usize, usize)>
    where
        R: Rng + ?Sized,
    {
        let pos = self.hidden_positions().choose(rng)?;
        self.reveal(pos);
        Some(pos)
    }

    /// Number of revealed safe cells.
    #[must_use]
    pub const fn revealed_safe_count(&self) -> usize {
        self.revealed_safe
    }

    /// Number of flagged cells that hold a mine.
    #[must_use]
    pub fn correct_flag_count(&self) -> usize {
        self.cells
            .iter()
            .filter(|c| c.is_mine() && c.state().is_flagged())
            .count()
    }

    /// Number of revealed cells that hold a mine.
    #[must_use]
    pub fn revealed_mine_count(&self) -> usize {
        self.cells
            .iter()
            .filter(|c| c.is_mine() && c.state().is_revealed())
            .count()
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng as _;
    use rand_pcg::Pcg32;

    use super::*;

    /// 10×10 board with 15 mines, none inside the 3×3 box centered on (5, 5).
    fn classic_layout() -> MineLayout {
        MineLayout::from_positions(
            10,
            10,
            [
                (0, 0),
                (2, 0),
                (7, 0),
                (9, 1),
                (1, 2),
                (5, 2),
                (8, 3),
                (0, 5),
                (2, 7),
                (9, 6),
                (4, 8),
                (7, 8),
                (0, 9),
                (5, 9),
                (9, 9),
            ],
        )
    }

    #[test]
    fn test_init_fixed_neighbor_counts() {
        let mines = classic_layout();
        let board = Board::init_fixed((5, 5), &mines);

        for pos in board.positions() {
            let cell = board.cell(pos);
            assert_eq!(cell.is_mine(), mines.has_mine(pos));
            if cell.is_mine() {
                continue;
            }
            let expected = neighborhood(10, 10, pos, 1)
                .filter(|p| mines.has_mine(*p))
                .count();
            assert_eq!(usize::from(cell.neighboring_mines()), expected, "at {pos:?}");
        }
    }

    #[test]
    fn test_opening_reveals_center_without_losing() {
        let mines = classic_layout();
        assert_eq!(mines.mine_count(), 15);
        let board = Board::init_fixed((5, 5), &mines);

        assert!(board.cell((5, 5)).state().is_revealed());
        assert!(!board.cell((5, 5)).is_mine());
        assert!(!board.is_lost());
        assert!(board.revealed_safe_count() >= 1);
    }

    #[test]
    fn test_flood_fill_stops_at_numbers() {
        // Single mine in the corner: every other cell is revealed by the opening.
        let mines = MineLayout::from_positions(5, 5, [(4, 4)]);
        let board = Board::init_fixed((0, 0), &mines);

        assert!(board.is_won());
        assert_eq!(board.revealed_safe_count(), 24);
        assert!(board.cell((4, 4)).state().is_hidden());
        assert_eq!(board.cell((3, 3)).revealed_number(), Some(1));
    }

    /// 5×5 board whose bottom-right corner is walled off by two mines.
    fn walled_corner_layout() -> MineLayout {
        MineLayout::from_positions(5, 5, [(3, 4), (4, 3)])
    }

    #[test]
    fn test_reveal_mine_loses() {
        let mines = walled_corner_layout();
        let mut board = Board::init_fixed((0, 0), &mines);
        assert!(!board.is_terminal());
        assert!(board.cell((4, 4)).state().is_hidden());

        board.reveal((3, 4));
        assert!(board.is_lost());
        assert_eq!(board.status(), BoardStatus::Lost);
        assert_eq!(board.revealed_mine_count(), 1);
    }

    #[test]
    fn test_reveal_and_flag_are_noops_on_non_hidden_or_out_of_bounds() {
        let mines = walled_corner_layout();
        let mut board = Board::init_fixed((0, 0), &mines);
        let revealed = board.revealed_safe_count();

        board.reveal((0, 0));
        board.reveal((7, 7));
        board.flag((9, 0));
        board.flag((0, 0));
        assert_eq!(board.revealed_safe_count(), revealed);
        assert!(board.cell((0, 0)).state().is_revealed());

        board.flag((4, 3));
        assert!(board.cell((4, 3)).state().is_flagged());
        assert_eq!(board.correct_flag_count(), 1);
        // Flagged cells cannot be revealed.
        board.reveal((4, 3));
        assert!(!board.is_lost());
    }

    #[test]
    fn test_win_iff_all_safe_cells_revealed_and_never_reverts() {
        let mines = MineLayout::from_positions(3, 3, [(0, 0), (2, 2)]);
        let mut board = Board::init_fixed((1, 1), &mines);
        let safe: Vec<_> = board
            .positions()
            .filter(|p| !mines.has_mine(*p))
            .collect();

        for pos in safe {
            assert_eq!(board.is_won(), board.revealed_safe_count() == 7);
            board.reveal(pos);
        }
        assert!(board.is_won());

        board.reveal((0, 0));
        assert!(board.is_won());
        assert_eq!(board.status(), BoardStatus::Won);
    }

    #[test]
    fn test_reveal_random_hidden_terminates() {
        let mut rng = Pcg32::seed_from_u64(7);
        let mines = classic_layout();
        let mut board = Board::init_fixed((5, 5), &mines);
        let mut steps = 0;
        while !board.is_terminal() {
            let hidden_before = board.hidden_positions().count();
            let pos = board.reveal_random_hidden(&mut rng).unwrap();
            assert!(board.cell(pos).state().is_revealed());
            assert!(board.hidden_positions().count() < hidden_before);
            steps += 1;
        }
        assert!(steps <= 100);
    }

    #[test]
    fn test_reveal_random_hidden_without_hidden_cells() {
        let mut rng = Pcg32::seed_from_u64(1);
        let mines = MineLayout::from_positions(3, 3, [(0, 0)]);
        let mut board = Board::init_fixed((2, 2), &mines);
        board.flag((0, 0));
        assert_eq!(board.reveal_random_hidden(&mut rng), None);
    }

    #[test]
    fn test_near_edge() {
        let board = Board::init_fixed((5, 5), &classic_layout());
        assert!(board.is_near_edge((1, 5)));
        assert!(board.is_near_edge((5, 8)));
        assert!(!board.is_near_edge((2, 2)));
        assert!(!board.is_near_edge((7, 7)));
    }
}
