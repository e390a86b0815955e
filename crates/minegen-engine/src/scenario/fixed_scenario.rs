use rand::{Rng, seq::index};

use crate::{
    BoardConfig,
    codec::{DecodeError, Decoder, Encoder},
    core::{Board, MineLayout},
};

/// Invalid scenario construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum ScenarioError {
    #[display("start cell ({x}, {y}) is outside the board")]
    StartOutOfBounds { x: usize, y: usize },
    #[display("mine at ({x}, {y}) lies inside the safe opening")]
    MineInSafeZone { x: usize, y: usize },
}

/// Returns `true` if `pos` is within Chebyshev distance 1 of `start`.
#[must_use]
pub fn is_in_safe_zone(start: (usize, usize), pos: (usize, usize)) -> bool {
    start.0.abs_diff(pos.0) <= 1 && start.1.abs_diff(pos.1) <= 1
}

/// A fixed board layout with a safe opening.
///
/// No mine lies in the 3×3 square centered on `start`, so opening the start cell
/// always reveals a zero and never loses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FixedScenario {
    start: (usize, usize),
    mines: MineLayout,
}

impl FixedScenario {
    /// Creates a scenario, checking the safe-opening invariant.
    pub fn new(start: (usize, usize), mines: MineLayout) -> Result<Self, ScenarioError> {
        let (x, y) = start;
        if !mines.contains(start) {
            return Err(ScenarioError::StartOutOfBounds { x, y });
        }
        if let Some((x, y)) = mines.mine_positions().find(|p| is_in_safe_zone(start, *p)) {
            return Err(ScenarioError::MineInSafeZone { x, y });
        }
        Ok(Self { start, mines })
    }

    /// Generates a random scenario.
    ///
    /// The start cell is uniform over the board and the mines are a uniform subset
    /// of the cells outside the safe opening.
    pub fn generate<R>(config: &BoardConfig, rng: &mut R) -> Self
    where
        R: Rng + ?Sized,
    {
        let start = (
            rng.random_range(0..config.width),
            rng.random_range(0..config.height),
        );
        let candidates: Vec<_> = (0..config.height)
            .flat_map(|y| (0..config.width).map(move |x| (x, y)))
            .filter(|p| !is_in_safe_zone(start, *p))
            .collect();
        let picked = index::sample(rng, candidates.len(), config.mine_count);
        let mines = MineLayout::from_positions(
            config.width,
            config.height,
            picked.into_iter().map(|i| candidates[i]),
        );
        Self { start, mines }
    }

    #[must_use]
    pub const fn start(&self) -> (usize, usize) {
        self.start
    }

    #[must_use]
    pub const fn mines(&self) -> &MineLayout {
        &self.mines
    }

    /// Builds a fresh board with the start cell already revealed.
    #[must_use]
    pub fn board(&self) -> Board {
        Board::init_fixed(self.start, &self.mines)
    }

    /// Appends `[startX: i32][startY: i32][H·W mine bytes, row-major]`.
    ///
    /// # Panics
    ///
    /// Panics if a start coordinate does not fit in an `i32`.
    pub fn encode(&self, enc: &mut Encoder) {
        let (x, y) = self.start;
        enc.put_i32(i32::try_from(x).expect("start x must fit in i32"));
        enc.put_i32(i32::try_from(y).expect("start y must fit in i32"));
        for mine in self.mines.iter() {
            enc.put_bool(mine);
        }
    }

    /// Reads one record written by [`Self::encode`] for a board of `config`'s size.
    pub fn decode(dec: &mut Decoder<'_>, config: &BoardConfig) -> Result<Self, DecodeError> {
        let x = dec.i32("scenario start x")?;
        let y = dec.i32("scenario start y")?;
        let start = (
            decode_coord(x, config.width, "scenario start x")?,
            decode_coord(y, config.height, "scenario start y")?,
        );

        let mut mines = MineLayout::empty(config.width, config.height);
        for y in 0..config.height {
            for x in 0..config.width {
                if dec.bool("scenario mine flag")? {
                    mines.set_mine((x, y));
                }
            }
        }
        let mine_count = mines.mine_count();
        if mine_count != config.mine_count {
            return Err(DecodeError::Mismatch {
                field: "scenario mine count",
                expected: config.mine_count as u64,
                found: mine_count as u64,
            });
        }
        Self::new(start, mines).map_err(DecodeError::Scenario)
    }
}

fn decode_coord(value: i32, limit: usize, field: &'static str) -> Result<usize, DecodeError> {
    usize::try_from(value)
        .ok()
        .filter(|v| *v < limit)
        .ok_or(DecodeError::InvalidValue {
            field,
            value: i64::from(value),
        })
}
