//! Applying a genome to a board.
//!
//! One interpreter pass walks the rules in descending priority and, for every
//! rule, scans the board in row-major order. Each revealed cell whose
//! neighborhood satisfies the rule's conditions triggers the rule's action:
//!
//! - [`RuleAction::Reveal`] opens every hidden neighbor, but only once the flags
//!   around the cell already equal its number
//! - [`RuleAction::Flag`] flags the single hidden neighbor, but only when exactly
//!   one flag is missing
//!
//! The pass keeps going after an action fires, so later cells and later rules see
//! the updated board. It stops as soon as the board is won or lost.
//!
//! # Usage
//!
//! ```
//! use minegen_engine::{Board, MineLayout};
//! use minegen_evaluator::{
//!     genome::Genome,
//!     rule::{Rule, RuleAction},
//!     rule_interpreter::RuleInterpreter,
//! };
//!
//! let genome = Genome::new(vec![Rule {
//!     number_condition: 1,
//!     hidden_condition: 1,
//!     flagged_condition: 0,
//!     near_edge: false,
//!     has_pattern: false,
//!     scope: 1,
//!     priority: 10,
//!     action: RuleAction::Flag,
//! }]);
//! let interpreter = RuleInterpreter::new(&genome);
//!
//! let mines = MineLayout::from_positions(5, 5, [(3, 4), (4, 3)]);
//! let mut board = Board::init_fixed((0, 0), &mines);
//! assert!(interpreter.apply(&mut board));
//! assert!(board.cell((3, 4)).state().is_flagged());
//! assert!(board.cell((4, 3)).state().is_flagged());
//! ```

use std::cmp::Reverse;

use minegen_engine::Board;

use crate::{
    cell_analysis::CellAnalysis,
    genome::Genome,
    rule::{Rule, RuleAction},
};

/// A genome with its rules sorted for application.
///
/// Sorting is stable: rules of equal priority keep their genome order.
#[derive(Debug, Clone)]
pub struct RuleInterpreter {
    rules: Vec<Rule>,
}

impl RuleInterpreter {
    #[must_use]
    pub fn new(genome: &Genome) -> Self {
        let mut rules = genome.rules().to_vec();
        rules.sort_by_key(|rule| Reverse(rule.priority));
        Self { rules }
    }

    /// Rules in application order.
    #[must_use]
    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    /// Runs one full pass over `board`.
    ///
    /// Returns `true` if at least one action fired.
    pub fn apply(&self, board: &mut Board) -> bool {
        let mut fired = false;
        for rule in &self.rules {
            for pos in board.positions() {
                if board.is_terminal() {
                    return fired;
                }
                if board.cell(pos).revealed_number() != Some(rule.number_condition) {
                    continue;
                }
                let Some(analysis) = CellAnalysis::from_board(board, pos, rule.scope) else {
                    continue;
                };
                if analysis.matches(rule) {
                    fired |= execute(rule, &analysis, board);
                }
            }
        }
        fired
    }
}

/// Runs one interpreter pass of `genome` over `board`.
pub fn apply_rules(genome: &Genome, board: &mut Board) -> bool {
    RuleInterpreter::new(genome).apply(board)
}

fn execute(rule: &Rule, analysis: &CellAnalysis, board: &mut Board) -> bool {
    let number = usize::from(rule.number_condition);
    let hidden = analysis.hidden();
    match rule.action {
        RuleAction::Reveal => {
            if analysis.flagged_count() != number || hidden.is_empty() {
                return false;
            }
            let mut fired = false;
            for pos in hidden {
                if board.is_terminal() {
                    break;
                }
                board.reveal(*pos);
                fired = true;
            }
            fired
        }
        RuleAction::Flag => {
            if hidden.len() != 1 || analysis.flagged_count() + 1 != number {
                return false;
            }
            board.flag(hidden[0]);
            true
        }
    }
}
