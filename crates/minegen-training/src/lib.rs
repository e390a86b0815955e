//! Training system for evolving Minesweeper rule genomes.
//!
//! This crate evolves populations of rule genomes (see `minegen-evaluator`) with a
//! genetic algorithm. Fitness comes from playing a sample of fixed scenarios from
//! a persisted bank (see `minegen-engine`).
//!
//! # How Training Works
//!
//! 1. **Population** - Load a checkpoint or create random genomes ([`checkpoint`])
//! 2. **Sampling** - Draw the generation's scenarios without replacement
//! 3. **Evaluation** - Every individual plays every sampled scenario, in parallel
//!    ([`scheduler`])
//! 4. **Selection & Reproduction** - Elitism, tournaments, multi-point crossover and
//!    per-field mutation ([`genetic`], [`genome_ops`])
//! 5. **Checkpoint** - Periodically persist the population
//! 6. **Repeat**
//!
//! [`trainer::Trainer`] runs steps 2 to 4; the caller decides when to checkpoint
//! and how long to train.
//!
//! # Architecture
//!
//! ```text
//! Trainer (generation loop)
//!     ↓ samples
//! Scenario Bank (minegen-engine)
//!     ↓ played by
//! Parallel Evaluator (one task per individual)
//!     ↓ scores with
//! Session Evaluator (minegen-evaluator)
//!     ↓ fitness guides
//! Population Evolver
//! ```
//!
//! # Reproducibility
//!
//! All randomness flows from the generator handed to the trainer. Per-individual
//! seeds are drawn from it every generation, so a seeded run gives the same result
//! whatever the number of worker threads.

pub mod checkpoint;
pub mod genetic;
pub mod genome_ops;
pub mod scheduler;
pub mod trainer;
