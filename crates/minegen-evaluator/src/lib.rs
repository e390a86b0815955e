//! Rule genomes and their evaluation on Minesweeper boards.
//!
//! This crate implements the agent side of training:
//!
//! 1. **Rules** ([`rule`]) - Condition/action genes with fixed value domains
//! 2. **Genomes** ([`genome`]) - Ordered rule lists with a genetic distance
//! 3. **Interpretation** ([`rule_interpreter`]) - One pass of every rule over a board,
//!    using the neighborhood metrics of [`cell_analysis`]
//! 4. **Session Evaluation** ([`session_evaluator`]) - Full playouts on fixed scenarios
//!    reduced to a fitness score
//!
//! # Architecture
//!
//! ```text
//! Session Evaluation (fitness for training)
//!     ↓ drives
//! Rule Interpreter (one pass over the board)
//!     ↓ uses
//! Cell Analysis (neighborhood of one revealed cell)
//! ```
//!
//! Playouts are pure functions of the genome, the scenario and the random source
//! used for stuck-breaks. Passing a seeded generator makes them reproducible.

pub mod cell_analysis;
pub mod genome;
pub mod rule;
pub mod rule_interpreter;
pub mod session_evaluator;
