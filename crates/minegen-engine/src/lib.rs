//! Minesweeper simulation and the scenario bank used for evaluation.
//!
//! - [`core`] - Board state, reveal/flag actions and win/loss detection
//! - [`scenario`] - Fixed layouts with a safe opening and their persisted bank
//! - [`codec`] - Little-endian binary encoding shared by persisted files

pub use self::{core::*, scenario::*};

pub mod codec;
pub mod core;
pub mod scenario;
