use std::{
    fs, io,
    path::{Path, PathBuf},
};

use rand::{Rng, seq::index};

use crate::{
    BoardConfig,
    codec::{self, DecodeError, Decoder, Encoder},
};

use super::FixedScenario;

const BANK_MAGIC: [u8; 4] = *b"MSBK";
const BANK_VERSION: u16 = 1;

/// Failure while loading, saving or sampling a scenario bank.
#[derive(Debug, derive_more::Display, derive_more::Error)]
pub enum ScenarioBankError {
    #[display("failed to access scenario bank {}: {source}", path.display())]
    Io { path: PathBuf, source: io::Error },
    #[display("invalid scenario bank: {_0}")]
    Decode(DecodeError),
    #[display("scenario bank is built for {found:?}, but the run is configured for {expected:?}")]
    ConfigMismatch {
        expected: BoardConfig,
        found: BoardConfig,
    },
    #[display("scenario bank contains no scenario")]
    Empty,
    #[display("requested an empty scenario sample")]
    EmptySample,
    #[display("requested {requested} scenarios but the bank only holds {available}")]
    SampleTooLarge { requested: usize, available: usize },
}

impl From<DecodeError> for ScenarioBankError {
    fn from(err: DecodeError) -> Self {
        Self::Decode(err)
    }
}

/// Immutable set of fixed scenarios shared by every generation of a training run.
///
/// # File format
///
/// ```text
/// "MSBK" | version: u16 | width: u32 | height: u32 | mine_count: u32
/// then, until end of file, one record per scenario:
///   start_x: i32 | start_y: i32 | height × width mine flags (u8 0/1, row-major)
/// ```
///
/// All integers are little-endian.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScenarioBank {
    config: BoardConfig,
    scenarios: Vec<FixedScenario>,
}

impl ScenarioBank {
    /// Generates `count` random scenarios for boards of `config`.
    pub fn generate<R>(config: BoardConfig, count: usize, rng: &mut R) -> Self
    where
        R: Rng + ?Sized,
    {
        let scenarios = (0..count)
            .map(|_| FixedScenario::generate(&config, rng))
            .collect();
        Self { config, scenarios }
    }

    /// Creates a bank from existing scenarios.
    ///
    /// # Panics
    ///
    /// Panics if a scenario does not match `config`.
    #[must_use]
    pub fn from_scenarios(config: BoardConfig, scenarios: Vec<FixedScenario>) -> Self {
        for scenario in &scenarios {
            let mines = scenario.mines();
            assert_eq!(
                (mines.width(), mines.height(), mines.mine_count()),
                (config.width, config.height, config.mine_count),
                "scenario does not match board configuration"
            );
        }
        Self { config, scenarios }
    }

    #[must_use]
    pub const fn config(&self) -> &BoardConfig {
        &self.config
    }

    #[must_use]
    pub fn scenarios(&self) -> &[FixedScenario] {
        &self.scenarios
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.scenarios.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.scenarios.is_empty()
    }

    /// Draws `count` distinct scenarios uniformly at random.
    ///
    /// An empty sample or one larger than the bank is a configuration error: the
    /// fitness average over it would be undefined.
    pub fn sample<R>(
        &self,
        count: usize,
        rng: &mut R,
    ) -> Result<Vec<&FixedScenario>, ScenarioBankError>
    where
        R: Rng + ?Sized,
    {
        if count == 0 {
            return Err(ScenarioBankError::EmptySample);
        }
        if count > self.scenarios.len() {
            return Err(ScenarioBankError::SampleTooLarge {
                requested: count,
                available: self.scenarios.len(),
            });
        }
        Ok(index::sample(rng, self.scenarios.len(), count)
            .into_iter()
            .map(|i| &self.scenarios[i])
            .collect())
    }

    /// Serializes the bank into its file representation.
    ///
    /// # Panics
    ///
    /// Panics if a board dimension does not fit in a `u32`.
    #[must_use]
    pub fn encode(&self) -> Vec<u8> {
        let mut enc = Encoder::new();
        enc.header(BANK_MAGIC, BANK_VERSION);
        enc.put_len(self.config.width);
        enc.put_len(self.config.height);
        enc.put_len(self.config.mine_count);
        for scenario in &self.scenarios {
            scenario.encode(&mut enc);
        }
        enc.into_bytes()
    }

    /// Parses a bank from its file representation.
    pub fn decode(bytes: &[u8]) -> Result<Self, DecodeError> {
        let mut dec = Decoder::new(bytes);
        dec.header(BANK_MAGIC, BANK_VERSION)?;
        let width = dec.u32("board width")? as usize;
        let height = dec.u32("board height")? as usize;
        let mine_count = dec.u32("mine count")? as usize;
        let config =
            BoardConfig::new(width, height, mine_count).map_err(|_| DecodeError::InvalidValue {
                field: "board configuration",
                value: i64::try_from(mine_count).unwrap_or(i64::MAX),
            })?;

        // [startX: i32][startY: i32][one byte per cell]
        let record_len = config
            .cell_count()
            .checked_add(8)
            .ok_or(DecodeError::InvalidValue {
                field: "board cell count",
                value: i64::MAX,
            })?;
        let mut scenarios = vec![];
        while !dec.is_empty() {
            if dec.remaining() < record_len {
                return Err(DecodeError::UnexpectedEof {
                    context: "scenario record",
                });
            }
            scenarios.push(FixedScenario::decode(&mut dec, &config)?);
        }
        Ok(Self { config, scenarios })
    }

    /// Writes the bank to `path`.
    pub fn save(&self, path: &Path) -> Result<(), ScenarioBankError> {
        codec::write_file_atomic(path, &self.encode()).map_err(|source| ScenarioBankError::Io {
            path: path.to_owned(),
            source,
        })?;
        tracing::info!(path = %path.display(), scenarios = self.len(), "saved scenario bank");
        Ok(())
    }

    /// Reads a bank from `path`. An empty bank is an error.
    pub fn load(path: &Path) -> Result<Self, ScenarioBankError> {
        let bytes = fs::read(path).map_err(|source| ScenarioBankError::Io {
            path: path.to_owned(),
            source,
        })?;
        let bank = Self::decode(&bytes)?;
        if bank.is_empty() {
            return Err(ScenarioBankError::Empty);
        }
        tracing::info!(path = %path.display(), scenarios = bank.len(), "loaded scenario bank");
        Ok(bank)
    }

    /// Loads the bank at `path`, or generates and saves `count` scenarios if the
    /// file does not exist yet.
    ///
    /// An existing bank is never regenerated, so fitness values stay comparable
    /// with earlier runs. A bank built for a different board is rejected.
    pub fn load_or_generate<R>(
        path: &Path,
        config: BoardConfig,
        count: usize,
        rng: &mut R,
    ) -> Result<Self, ScenarioBankError>
    where
        R: Rng + ?Sized,
    {
        match Self::load(path) {
            Ok(bank) if *bank.config() != config => Err(ScenarioBankError::ConfigMismatch {
                expected: config,
                found: *bank.config(),
            }),
            Ok(bank) => Ok(bank),
            Err(ScenarioBankError::Io { source, .. })
                if source.kind() == io::ErrorKind::NotFound =>
            {
                tracing::info!(
                    path = %path.display(),
                    count,
                    "scenario bank not found, generating a new one"
                );
                let bank = Self::generate(config, count, rng);
                if bank.is_empty() {
                    return Err(ScenarioBankError::Empty);
                }
                bank.save(path)?;
                Ok(bank)
            }
            Err(err) => Err(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng as _;
    use rand_pcg::Pcg32;

    use super::*;

    fn small_bank(count: usize) -> ScenarioBank {
        let mut rng = Pcg32::seed_from_u64(11);
        ScenarioBank::generate(BoardConfig::CLASSIC, count, &mut rng)
    }

    #[test]
    fn test_encode_layout() {
        let bank = small_bank(3);
        let bytes = bank.encode();
        assert_eq!(&bytes[..4], b"MSBK");
        assert_eq!(bytes.len(), 4 + 2 + 12 + 3 * (8 + 100));
        assert_eq!(ScenarioBank::decode(&bytes).unwrap(), bank);
    }

    #[test]
    fn test_decode_rejects_truncated_record() {
        let bytes = small_bank(2).encode();
        let truncated = &bytes[..bytes.len() - 1];
        assert!(matches!(
            ScenarioBank::decode(truncated),
            Err(DecodeError::UnexpectedEof { .. })
        ));
    }

    #[test]
    fn test_decode_rejects_oversized_board_before_allocating() {
        let mut enc = Encoder::new();
        enc.header(BANK_MAGIC, BANK_VERSION);
        enc.put_u32(u32::MAX);
        enc.put_u32(u32::MAX);
        enc.put_u32(15);
        enc.put_i32(0);
        enc.put_i32(0);
        let bytes = enc.into_bytes();

        assert!(matches!(
            ScenarioBank::decode(&bytes),
            Err(DecodeError::UnexpectedEof { .. } | DecodeError::InvalidValue { .. })
        ));
    }

    #[test]
    fn test_sample_is_distinct_and_validated() {
        let bank = small_bank(20);
        let mut rng = Pcg32::seed_from_u64(5);

        let sample = bank.sample(20, &mut rng).unwrap();
        assert_eq!(sample.len(), 20);
        for (i, a) in sample.iter().enumerate() {
            for b in &sample[i + 1..] {
                assert!(!std::ptr::eq(*a, *b));
            }
        }

        assert!(matches!(
            bank.sample(0, &mut rng),
            Err(ScenarioBankError::EmptySample)
        ));
        assert!(matches!(
            bank.sample(21, &mut rng),
            Err(ScenarioBankError::SampleTooLarge {
                requested: 21,
                available: 20
            })
        ));
    }

    #[test]
    fn test_load_or_generate_keeps_existing_bank() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scenarios.dat");
        let mut rng = Pcg32::seed_from_u64(1);

        let first = ScenarioBank::load_or_generate(&path, BoardConfig::CLASSIC, 10, &mut rng)
            .unwrap();
        assert_eq!(first.len(), 10);
        assert!(path.exists());

        // A second call with a different count must not regenerate.
        let second = ScenarioBank::load_or_generate(&path, BoardConfig::CLASSIC, 50, &mut rng)
            .unwrap();
        assert_eq!(second, first);
    }

    #[test]
    fn test_load_or_generate_rejects_other_board() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scenarios.dat");
        small_bank(4).save(&path).unwrap();

        let mut rng = Pcg32::seed_from_u64(1);
        let config = BoardConfig::new(8, 8, 10).unwrap();
        assert!(matches!(
            ScenarioBank::load_or_generate(&path, config, 4, &mut rng),
            Err(ScenarioBankError::ConfigMismatch { .. })
        ));
    }

    #[test]
    fn test_load_rejects_garbage_and_empty_bank() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scenarios.dat");

        fs::write(&path, b"not a bank").unwrap();
        assert!(matches!(
            ScenarioBank::load(&path),
            Err(ScenarioBankError::Decode(DecodeError::BadMagic))
        ));

        small_bank(0).save(&path).unwrap();
        assert!(matches!(
            ScenarioBank::load(&path),
            Err(ScenarioBankError::Empty)
        ));
    }
}
