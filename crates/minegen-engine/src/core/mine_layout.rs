/// Row-major mine bitmap of a `width × height` board.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MineLayout {
    width: usize,
    height: usize,
    mines: Vec<bool>,
}

impl MineLayout {
    /// Creates a layout without any mine.
    #[must_use]
    pub fn empty(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            mines: vec![false; width * height],
        }
    }

    /// Creates a layout with mines at the given positions.
    ///
    /// # Panics
    ///
    /// Panics if a position lies outside the board.
    #[must_use]
    pub fn from_positions<I>(width: usize, height: usize, positions: I) -> Self
    where
        I: IntoIterator<Item = (usize, usize)>,
    {
        let mut layout = Self::empty(width, height);
        for pos in positions {
            layout.set_mine(pos);
        }
        layout
    }

    #[must_use]
    pub const fn width(&self) -> usize {
        self.width
    }

    #[must_use]
    pub const fn height(&self) -> usize {
        self.height
    }

    /// Returns `true` if `(x, y)` lies on the board.
    #[must_use]
    pub const fn contains(&self, (x, y): (usize, usize)) -> bool {
        x < self.width && y < self.height
    }

    /// Returns `true` if there is a mine at `(x, y)`. Out-of-bounds cells have none.
    #[must_use]
    pub fn has_mine(&self, (x, y): (usize, usize)) -> bool {
        self.contains((x, y)) && self.mines[y * self.width + x]
    }

    /// Places a mine at `(x, y)`.
    ///
    /// # Panics
    ///
    /// Panics if `(x, y)` lies outside the board.
    pub fn set_mine(&mut self, (x, y): (usize, usize)) {
        assert!(self.contains((x, y)), "mine ({x}, {y}) outside the board");
        self.mines[y * self.width + x] = true;
    }

    #[must_use]
    pub fn mine_count(&self) -> usize {
        self.mines.iter().filter(|m| **m).count()
    }

    /// Iterates over mine flags in row-major order.
    pub fn iter(&self) -> impl Iterator<Item = bool> + '_ {
        self.mines.iter().copied()
    }

    /// Iterates over mine positions in row-major order.
    pub fn mine_positions(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        let width = self.width;
        self.mines
            .iter()
            .enumerate()
            .filter(|(_, m)| **m)
            .map(move |(i, _)| (i % width, i / width))
    }
}
