//! Population checkpoints.
//!
//! A checkpoint stores every genome and its last fitness so that an interrupted
//! training run can resume where it left off.
//!
//! # File Format
//!
//! ```text
//! "MSGP" | version: u16 | population size: u32
//! then, per individual:
//!   genome length: u32 | rules (8 × u8 each) | fitness: f64
//! ```
//!
//! All integers are little-endian. Booleans are `0`/`1`, the action is
//! `0` (reveal) or `1` (flag), and every rule field is range-checked on load.
//!
//! # Compatibility
//!
//! A checkpoint is only usable with the population size and genome length it was
//! written with. [`load_or_random`] treats any mismatch or corruption as a missing
//! checkpoint: it logs a warning and starts from a random population.

use std::{
    fs, io,
    path::{Path, PathBuf},
};

use minegen_engine::codec::{self, DecodeError, Decoder, Encoder};
use minegen_evaluator::genome::Genome;
use rand::Rng;

use crate::genetic::{Individual, Population};

const CHECKPOINT_MAGIC: [u8; 4] = *b"MSGP";
const CHECKPOINT_VERSION: u16 = 1;

#[derive(Debug, derive_more::Display, derive_more::Error)]
pub enum CheckpointError {
    #[display("failed to access checkpoint {}: {source}", path.display())]
    Io { path: PathBuf, source: io::Error },
    #[display("invalid checkpoint: {_0}")]
    Decode(DecodeError),
}

impl From<DecodeError> for CheckpointError {
    fn from(err: DecodeError) -> Self {
        Self::Decode(err)
    }
}

/// Serializes `population` into the checkpoint format.
#[must_use]
pub fn encode(population: &Population) -> Vec<u8> {
    let mut enc = Encoder::new();
    enc.header(CHECKPOINT_MAGIC, CHECKPOINT_VERSION);
    enc.put_len(population.len());
    for ind in population.individuals() {
        ind.genome().encode(&mut enc);
        enc.put_f64(ind.fitness());
    }
    enc.into_bytes()
}

/// Parses a checkpoint holding exactly `population_size` genomes of `rule_count`
/// rules.
pub fn decode(
    bytes: &[u8],
    population_size: usize,
    rule_count: usize,
) -> Result<Population, DecodeError> {
    let mut dec = Decoder::new(bytes);
    dec.header(CHECKPOINT_MAGIC, CHECKPOINT_VERSION)?;
    dec.expect_len("population size", population_size)?;
    let individuals = (0..population_size)
        .map(|_| {
            let genome = Genome::decode(&mut dec, rule_count)?;
            let fitness = dec.f64("fitness")?;
            Ok(Individual::new(genome, fitness))
        })
        .collect::<Result<_, DecodeError>>()?;
    dec.finish()?;
    Ok(Population::new(individuals))
}

/// Writes `population` to `path`, replacing any previous checkpoint atomically.
pub fn save(population: &Population, path: &Path) -> Result<(), CheckpointError> {
    codec::write_file_atomic(path, &encode(population)).map_err(|source| {
        CheckpointError::Io {
            path: path.to_owned(),
            source,
        }
    })?;
    tracing::info!(
        path = %path.display(),
        individuals = population.len(),
        "saved population checkpoint"
    );
    Ok(())
}

/// Reads the checkpoint at `path`.
pub fn load(
    path: &Path,
    population_size: usize,
    rule_count: usize,
) -> Result<Population, CheckpointError> {
    let bytes = fs::read(path).map_err(|source| CheckpointError::Io {
        path: path.to_owned(),
        source,
    })?;
    Ok(decode(&bytes, population_size, rule_count)?)
}

/// Loads the checkpoint at `path`, or creates a random population if it is
/// missing or unusable.
pub fn load_or_random<R>(
    path: &Path,
    population_size: usize,
    rule_count: usize,
    rng: &mut R,
) -> Population
where
    R: Rng + ?Sized,
{
    match load(path, population_size, rule_count) {
        Ok(population) => {
            tracing::info!(
                path = %path.display(),
                individuals = population.len(),
                "loaded population checkpoint"
            );
            return population;
        }
        Err(CheckpointError::Io { source, .. }) if source.kind() == io::ErrorKind::NotFound => {
            tracing::info!(
                path = %path.display(),
                "no population checkpoint found, starting from a random population"
            );
        }
        Err(err) => {
            tracing::warn!(
                path = %path.display(),
                error = %err,
                "discarding incompatible population checkpoint, starting from a random population"
            );
        }
    }
    Population::random(population_size, rule_count, rng)
}
