//! Pre-generated board layouts used for reproducible fitness evaluation.
//!
//! - [`FixedScenario`] - Mine layout plus a guaranteed-safe start cell
//! - [`ScenarioBank`] - Persisted set of scenarios shared by every generation
//!
//! The bank is generated once, written to disk, and reloaded on every later run so
//! that fitness values stay comparable across resumed training sessions.

pub use self::{bank::*, fixed_scenario::*};

mod bank;
mod fixed_scenario;
