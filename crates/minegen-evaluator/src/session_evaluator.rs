//! Session evaluation: turning playouts into fitness scores.
//!
//! A session is one genome playing one fixed scenario to the end. The playout
//! alternates interpreter passes with a fallback:
//!
//! 1. **Rule pass** - apply every rule once ([`RuleInterpreter::apply`])
//! 2. **Stuck-break** - if nothing fired, reveal a uniformly random hidden cell
//! 3. **Repeat** until the board is won or lost
//!
//! Every pass that fired and every stuck-break counts as one action. Since each
//! stuck-break removes at least one hidden cell, a playout takes at most `W·H`
//! stuck-breaks. A board with no hidden cell left that is neither won nor lost
//! (every remaining unknown cell is wrongly flagged) also ends the playout.
//!
//! # Fitness
//!
//! ```text
//! score = safe_revealed × 1
//!       + correct_flags × 5
//!       - mines_revealed × 50
//!       - actions × 0.1
//!       + (won ? 2000 : 0)
//! ```
//!
//! The fitness of a genome for a generation is the mean score over the sampled
//! scenarios. The win bonus dominates everything else, so the search first looks
//! for rule sets that finish boards and only then for efficient ones.

use minegen_engine::{Board, FixedScenario};
use rand::Rng;

use crate::{genome::Genome, rule_interpreter::RuleInterpreter};

/// Final statistics of a single playout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct GameOutcome {
    pub safe_revealed: usize,
    pub correct_flags: usize,
    pub mines_revealed: usize,
    pub actions: usize,
    pub won: bool,
}

impl GameOutcome {
    /// Collects the outcome of a finished `board` after `actions` actions.
    #[must_use]
    pub fn from_board(board: &Board, actions: usize) -> Self {
        Self {
            safe_revealed: board.revealed_safe_count(),
            correct_flags: board.correct_flag_count(),
            mines_revealed: board.revealed_mine_count(),
            actions,
            won: board.is_won(),
        }
    }
}

/// Coefficients of the fitness formula.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FitnessWeights {
    pub safe_revealed: f64,
    pub correct_flag: f64,
    pub mine_revealed: f64,
    pub action: f64,
    pub win_bonus: f64,
}

impl Default for FitnessWeights {
    fn default() -> Self {
        Self {
            safe_revealed: 1.0,
            correct_flag: 5.0,
            mine_revealed: -50.0,
            action: -0.1,
            win_bonus: 2000.0,
        }
    }
}

impl FitnessWeights {
    /// Scores a single playout.
    #[expect(clippy::cast_precision_loss)]
    #[must_use]
    pub fn score(&self, outcome: &GameOutcome) -> f64 {
        let mut score = outcome.safe_revealed as f64 * self.safe_revealed;
        score += outcome.correct_flags as f64 * self.correct_flag;
        score += outcome.mines_revealed as f64 * self.mine_revealed;
        score += outcome.actions as f64 * self.action;
        if outcome.won {
            score += self.win_bonus;
        }
        score
    }
}

/// Mean fitness of a genome over a set of scenarios.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SessionSummary {
    pub fitness: f64,
    pub wins: usize,
    pub games: usize,
}

/// Plays genomes against scenarios and scores them.
#[derive(Debug, Clone, Default)]
pub struct SessionEvaluator {
    weights: FitnessWeights,
}

impl SessionEvaluator {
    #[must_use]
    pub fn new(weights: FitnessWeights) -> Self {
        Self { weights }
    }

    #[must_use]
    pub fn weights(&self) -> &FitnessWeights {
        &self.weights
    }

    /// Plays `board` to the end and returns its outcome.
    pub fn play_board<R>(
        interpreter: &RuleInterpreter,
        mut board: Board,
        rng: &mut R,
    ) -> GameOutcome
    where
        R: Rng + ?Sized,
    {
        let mut actions = 0;
        while !board.is_terminal() {
            // A pass that fired nothing left the board untouched and non-terminal.
            let fired = interpreter.apply(&mut board);
            if !fired && board.reveal_random_hidden(rng).is_none() {
                break;
            }
            actions += 1;
        }
        GameOutcome::from_board(&board, actions)
    }

    /// Plays a single scenario from its opening.
    pub fn play_session<R>(
        &self,
        interpreter: &RuleInterpreter,
        scenario: &FixedScenario,
        rng: &mut R,
    ) -> GameOutcome
    where
        R: Rng + ?Sized,
    {
        Self::play_board(interpreter, scenario.board(), rng)
    }

    /// Plays every scenario and averages the scores.
    ///
    /// # Panics
    ///
    /// Panics if `scenarios` is empty.
    #[expect(clippy::cast_precision_loss)]
    pub fn play_and_evaluate_sessions<R>(
        &self,
        genome: &Genome,
        scenarios: &[&FixedScenario],
        rng: &mut R,
    ) -> SessionSummary
    where
        R: Rng + ?Sized,
    {
        assert!(!scenarios.is_empty(), "no scenario to evaluate");
        let interpreter = RuleInterpreter::new(genome);
        let mut total = 0.0;
        let mut wins = 0;
        for scenario in scenarios {
            let outcome = self.play_session(&interpreter, scenario, rng);
            total += self.weights.score(&outcome);
            wins += usize::from(outcome.won);
        }
        SessionSummary {
            fitness: total / scenarios.len() as f64,
            wins,
            games: scenarios.len(),
        }
    }
}
