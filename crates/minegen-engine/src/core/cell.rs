/// Visibility state of a single cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, derive_more::IsVariant)]
pub enum CellState {
    #[default]
    Hidden,
    Revealed,
    Flagged,
}

/// A single cell of a [`Board`](super::Board).
///
/// `neighboring_mines` is only meaningful for non-mine cells; it stays `0` on mine
/// cells and is never computed for them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Cell {
    is_mine: bool,
    neighboring_mines: u8,
    state: CellState,
}

impl Cell {
    pub(crate) const fn new(is_mine: bool, neighboring_mines: u8) -> Self {
        Self {
            is_mine,
            neighboring_mines,
            state: CellState::Hidden,
        }
    }

    #[must_use]
    pub const fn is_mine(self) -> bool {
        self.is_mine
    }

    #[must_use]
    pub const fn neighboring_mines(self) -> u8 {
        self.neighboring_mines
    }

    #[must_use]
    pub const fn state(self) -> CellState {
        self.state
    }

    pub(crate) const fn set_state(&mut self, state: CellState) {
        self.state = state;
    }

    /// Returns the number shown on this cell, if it is a revealed safe cell.
    #[must_use]
    pub const fn revealed_number(self) -> Option<u8> {
        match self.state {
            CellState::Revealed if !self.is_mine => Some(self.neighboring_mines),
            _ => None,
        }
    }
}
