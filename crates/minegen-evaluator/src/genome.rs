//! Ordered rule lists and their genetic distance.

use minegen_engine::codec::{DecodeError, Decoder, Encoder};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::rule::{Rule, RuleField};

/// The ordered sequence of rules defining one agent's behavior.
///
/// Order matters only between rules of equal priority: the interpreter applies
/// rules by descending priority and keeps genome order among ties.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Genome {
    rules: Vec<Rule>,
}

impl From<Vec<Rule>> for Genome {
    fn from(rules: Vec<Rule>) -> Self {
        Self { rules }
    }
}

impl Genome {
    #[must_use]
    pub fn new(rules: Vec<Rule>) -> Self {
        Self { rules }
    }

    /// Generates `len` independent random rules.
    pub fn random<R>(len: usize, rng: &mut R) -> Self
    where
        R: Rng + ?Sized,
    {
        Self {
            rules: (0..len).map(|_| Rule::random(rng)).collect(),
        }
    }

    #[must_use]
    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    #[must_use]
    pub fn rules_mut(&mut self) -> &mut [Rule] {
        &mut self.rules
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Hamming-style distance in `[0, 1]`.
    ///
    /// Counts the differing behavioral fields ([`RuleField::BEHAVIORAL`]) at every
    /// rule position and divides by the total field count of the longer genome.
    /// Positions present in only one genome count as fully different. Two empty
    /// genomes are at distance `0`.
    #[expect(clippy::cast_precision_loss)]
    #[must_use]
    pub fn distance(&self, other: &Self) -> f64 {
        let fields = RuleField::BEHAVIORAL.len();
        let longest = self.len().max(other.len());
        if longest == 0 {
            return 0.0;
        }
        let shared = self.len().min(other.len());
        let differing: usize = self
            .rules
            .iter()
            .zip(&other.rules)
            .map(|(a, b)| {
                RuleField::BEHAVIORAL
                    .iter()
                    .filter(|field| !a.same_field(b, **field))
                    .count()
            })
            .sum::<usize>()
            + (longest - shared) * fields;
        differing as f64 / (longest * fields) as f64
    }

    /// Checks every rule with [`Rule::validate`].
    pub fn validate(&self) -> Result<(), DecodeError> {
        self.rules.iter().try_for_each(Rule::validate)
    }

    /// Appends `[rule count: u32][rules]`.
    pub fn encode(&self, enc: &mut Encoder) {
        enc.put_len(self.rules.len());
        for rule in &self.rules {
            rule.encode(enc);
        }
    }

    /// Reads a genome written by [`Self::encode`], requiring exactly `expected_len`
    /// rules.
    pub fn decode(dec: &mut Decoder<'_>, expected_len: usize) -> Result<Self, DecodeError> {
        dec.expect_len("genome length", expected_len)?;
        let rules = (0..expected_len)
            .map(|_| Rule::decode(dec))
            .collect::<Result<_, _>>()?;
        Ok(Self { rules })
    }
}
