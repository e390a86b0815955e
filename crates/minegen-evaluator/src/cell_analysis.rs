//! Neighborhood analysis of a revealed cell, matched against rule conditions.
//!
//! A [`CellAnalysis`] is computed for one candidate cell and one rule scope. It
//! records the number shown on the cell, the hidden and flagged cells in its
//! `(2·scope+1)²` neighborhood, and whether the cell sits near a border.

use arrayvec::ArrayVec;
use minegen_engine::{Board, CellState, neighborhood};

use crate::rule::{Rule, SCOPE_RANGE};

/// Cells in the largest supported neighborhood, excluding the center.
pub const MAX_NEIGHBORS: usize = 24;

#[derive(Debug, Clone)]
pub struct CellAnalysis {
    pos: (usize, usize),
    number: u8,
    hidden: ArrayVec<(usize, usize), MAX_NEIGHBORS>,
    flagged: usize,
    near_edge: bool,
}

impl CellAnalysis {
    /// Analyzes the neighborhood of radius `scope` around `pos`.
    ///
    /// Returns `None` unless `pos` is a revealed safe cell.
    ///
    /// # Panics
    ///
    /// Panics if `scope` is outside `1..=2` or `pos` lies outside the board.
    #[must_use]
    pub fn from_board(board: &Board, pos: (usize, usize), scope: u8) -> Option<Self> {
        assert!(SCOPE_RANGE.contains(&scope), "unsupported scope {scope}");
        let number = board.cell(pos).revealed_number()?;

        let mut hidden = ArrayVec::new();
        let mut flagged = 0;
        for p in neighborhood(board.width(), board.height(), pos, usize::from(scope)) {
            match board.cell(p).state() {
                CellState::Hidden => hidden.push(p),
                CellState::Flagged => flagged += 1,
                CellState::Revealed => {}
            }
        }

        Some(Self {
            pos,
            number,
            hidden,
            flagged,
            near_edge: board.is_near_edge(pos),
        })
    }

    #[must_use]
    pub fn pos(&self) -> (usize, usize) {
        self.pos
    }

    #[must_use]
    pub fn number(&self) -> u8 {
        self.number
    }

    /// Hidden neighbors in row-major order.
    #[must_use]
    pub fn hidden(&self) -> &[(usize, usize)] {
        &self.hidden
    }

    #[must_use]
    pub fn flagged_count(&self) -> usize {
        self.flagged
    }

    #[must_use]
    pub fn is_near_edge(&self) -> bool {
        self.near_edge
    }

    /// Returns `true` if the cell shows a `2`, the only recognized pattern.
    #[must_use]
    pub fn has_pattern(&self) -> bool {
        self.number == 2
    }

    /// Checks the condition part of `rule`.
    ///
    /// The scope is not checked; the analysis is expected to be built with the
    /// rule's scope.
    #[must_use]
    pub fn matches(&self, rule: &Rule) -> bool {
        self.number == rule.number_condition
            && self.hidden.len() == usize::from(rule.hidden_condition)
            && self.flagged == usize::from(rule.flagged_condition)
            && (!rule.near_edge || self.near_edge)
            && (!rule.has_pattern || self.has_pattern())
    }
}

#[cfg(test)]
mod tests {
    use minegen_engine::MineLayout;

    use super::*;
    use crate::rule::RuleAction;

    /// 5×5 board with mines at (3, 4) and (4, 3), opened from (0, 0).
    ///
    /// Only the two mines and the corner (4, 4) stay hidden.
    fn walled_corner() -> Board {
        let mines = MineLayout::from_positions(5, 5, [(3, 4), (4, 3)]);
        Board::init_fixed((0, 0), &mines)
    }

    #[test]
    fn test_counts_hidden_and_flagged_neighbors() {
        let mut board = walled_corner();
        let analysis = CellAnalysis::from_board(&board, (3, 3), 1).unwrap();
        assert_eq!(analysis.number(), 2);
        assert_eq!(analysis.hidden(), &[(4, 3), (3, 4), (4, 4)]);
        assert_eq!(analysis.flagged_count(), 0);
        assert!(analysis.is_near_edge());
        assert!(analysis.has_pattern());

        board.flag((4, 3));
        let analysis = CellAnalysis::from_board(&board, (3, 3), 1).unwrap();
        assert_eq!(analysis.hidden(), &[(3, 4), (4, 4)]);
        assert_eq!(analysis.flagged_count(), 1);
    }

    #[test]
    fn test_scope_two_sees_further() {
        let board = walled_corner();
        let narrow = CellAnalysis::from_board(&board, (2, 2), 1).unwrap();
        let wide = CellAnalysis::from_board(&board, (2, 2), 2).unwrap();
        assert!(narrow.hidden().is_empty());
        assert_eq!(wide.hidden().len(), 3);
    }

    #[test]
    fn test_hidden_cell_has_no_analysis() {
        let board = walled_corner();
        assert!(CellAnalysis::from_board(&board, (4, 4), 1).is_none());
    }

    #[test]
    fn test_matches_checks_every_condition() {
        let board = walled_corner();
        let analysis = CellAnalysis::from_board(&board, (3, 3), 1).unwrap();
        let rule = Rule {
            number_condition: 2,
            hidden_condition: 3,
            flagged_condition: 0,
            near_edge: true,
            has_pattern: true,
            scope: 1,
            priority: 1,
            action: RuleAction::Reveal,
        };
        assert!(analysis.matches(&rule));
        assert!(!analysis.matches(&Rule {
            number_condition: 1,
            ..rule
        }));
        assert!(!analysis.matches(&Rule {
            hidden_condition: 2,
            ..rule
        }));
        assert!(!analysis.matches(&Rule {
            flagged_condition: 1,
            ..rule
        }));

        // (1, 1) shows a 0 and sits near the edge, so only the pattern fails.
        let corner = CellAnalysis::from_board(&board, (1, 1), 1).unwrap();
        let zero_rule = Rule {
            number_condition: 0,
            hidden_condition: 0,
            ..rule
        };
        assert!(!corner.matches(&zero_rule));
        assert!(corner.matches(&Rule {
            has_pattern: false,
            ..zero_rule
        }));
    }
}
