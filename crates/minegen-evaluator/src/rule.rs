//! Condition/action rules, the genes of a [`Genome`](crate::genome::Genome).
//!
//! A [`Rule`] matches a revealed numbered cell by looking at its neighborhood and,
//! when every condition holds, either reveals the hidden neighbors or flags the
//! single remaining one. Rules are plain values with no mutable state.
//!
//! # Gene Domains
//!
//! | field | domain |
//! |---|---|
//! | `number_condition` | `0..=8` |
//! | `hidden_condition` | `0..=8` |
//! | `flagged_condition` | `0..=8` |
//! | `near_edge` | `bool` |
//! | `has_pattern` | `bool` |
//! | `scope` | `1..=2` |
//! | `priority` | `1..=10` |
//! | `action` | [`RuleAction`] |
//!
//! Every field of a rule is a separate gene: mutation resamples fields one by one
//! through [`Rule::resample`], and the binary encoding writes one byte per field.

use std::ops::RangeInclusive;

use minegen_engine::codec::{DecodeError, Decoder, Encoder};
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Domain of the number, hidden and flagged conditions.
pub const COUNT_RANGE: RangeInclusive<u8> = 0..=8;
/// Domain of the neighborhood radius.
pub const SCOPE_RANGE: RangeInclusive<u8> = 1..=2;
/// Domain of the rule priority.
pub const PRIORITY_RANGE: RangeInclusive<u8> = 1..=10;

/// What a rule does once its conditions match.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, derive_more::IsVariant,
)]
pub enum RuleAction {
    /// Reveal every hidden neighbor. Fires only when the flags already account for
    /// every mine of the cell.
    Reveal,
    /// Flag the single hidden neighbor. Fires only when exactly one mine of the
    /// cell is left unflagged.
    Flag,
}

impl RuleAction {
    const fn to_byte(self) -> u8 {
        match self {
            Self::Reveal => 0,
            Self::Flag => 1,
        }
    }

    fn random<R>(rng: &mut R) -> Self
    where
        R: Rng + ?Sized,
    {
        if rng.random_bool(0.5) {
            Self::Flag
        } else {
            Self::Reveal
        }
    }
}

/// A single condition/action gene.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rule {
    /// Number shown on the candidate cell.
    pub number_condition: u8,
    /// Hidden cells in the neighborhood.
    pub hidden_condition: u8,
    /// Flagged cells in the neighborhood.
    pub flagged_condition: u8,
    /// Restrict the rule to cells within 2 cells of a border.
    pub near_edge: bool,
    /// Restrict the rule to cells showing a `2`.
    pub has_pattern: bool,
    /// Neighborhood radius.
    pub scope: u8,
    /// Rules with a higher priority are applied first.
    pub priority: u8,
    pub action: RuleAction,
}

/// Identifies one gene field of a [`Rule`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RuleField {
    NumberCondition,
    HiddenCondition,
    FlaggedCondition,
    NearEdge,
    HasPattern,
    Scope,
    Priority,
    Action,
}

impl RuleField {
    /// Every field, in encoding order.
    pub const ALL: [Self; 8] = [
        Self::NumberCondition,
        Self::HiddenCondition,
        Self::FlaggedCondition,
        Self::NearEdge,
        Self::HasPattern,
        Self::Scope,
        Self::Priority,
        Self::Action,
    ];

    /// Fields that describe behavior, compared by genetic distance.
    ///
    /// Priority only orders rules and is left out.
    pub const BEHAVIORAL: [Self; 7] = [
        Self::NumberCondition,
        Self::HiddenCondition,
        Self::FlaggedCondition,
        Self::NearEdge,
        Self::HasPattern,
        Self::Scope,
        Self::Action,
    ];
}

impl Rule {
    /// Samples every field uniformly from its domain.
    pub fn random<R>(rng: &mut R) -> Self
    where
        R: Rng + ?Sized,
    {
        Self {
            number_condition: rng.random_range(COUNT_RANGE),
            hidden_condition: rng.random_range(COUNT_RANGE),
            flagged_condition: rng.random_range(COUNT_RANGE),
            near_edge: rng.random_bool(0.5),
            has_pattern: rng.random_bool(0.5),
            scope: rng.random_range(SCOPE_RANGE),
            priority: rng.random_range(PRIORITY_RANGE),
            action: RuleAction::random(rng),
        }
    }

    /// Replaces `field` with a value drawn uniformly from its domain.
    ///
    /// The new value may equal the old one.
    pub fn resample<R>(&mut self, field: RuleField, rng: &mut R)
    where
        R: Rng + ?Sized,
    {
        match field {
            RuleField::NumberCondition => self.number_condition = rng.random_range(COUNT_RANGE),
            RuleField::HiddenCondition => self.hidden_condition = rng.random_range(COUNT_RANGE),
            RuleField::FlaggedCondition => self.flagged_condition = rng.random_range(COUNT_RANGE),
            RuleField::NearEdge => self.near_edge = rng.random_bool(0.5),
            RuleField::HasPattern => self.has_pattern = rng.random_bool(0.5),
            RuleField::Scope => self.scope = rng.random_range(SCOPE_RANGE),
            RuleField::Priority => self.priority = rng.random_range(PRIORITY_RANGE),
            RuleField::Action => self.action = RuleAction::random(rng),
        }
    }

    /// Returns `true` if `self` and `other` hold the same value for `field`.
    #[must_use]
    pub fn same_field(&self, other: &Self, field: RuleField) -> bool {
        match field {
            RuleField::NumberCondition => self.number_condition == other.number_condition,
            RuleField::HiddenCondition => self.hidden_condition == other.hidden_condition,
            RuleField::FlaggedCondition => self.flagged_condition == other.flagged_condition,
            RuleField::NearEdge => self.near_edge == other.near_edge,
            RuleField::HasPattern => self.has_pattern == other.has_pattern,
            RuleField::Scope => self.scope == other.scope,
            RuleField::Priority => self.priority == other.priority,
            RuleField::Action => self.action == other.action,
        }
    }

    /// Checks that every numeric field lies in its gene domain.
    ///
    /// Rules built outside [`Self::random`] and [`Self::decode`], such as rules
    /// deserialized from JSON, must pass this before being interpreted.
    pub fn validate(&self) -> Result<(), DecodeError> {
        let fields = [
            ("rule number condition", self.number_condition, COUNT_RANGE),
            ("rule hidden condition", self.hidden_condition, COUNT_RANGE),
            ("rule flagged condition", self.flagged_condition, COUNT_RANGE),
            ("rule scope", self.scope, SCOPE_RANGE),
            ("rule priority", self.priority, PRIORITY_RANGE),
        ];
        for (field, value, range) in fields {
            if !range.contains(&value) {
                return Err(DecodeError::InvalidValue {
                    field,
                    value: i64::from(value),
                });
            }
        }
        Ok(())
    }

    /// Appends the 8 fields, one byte each, in [`RuleField::ALL`] order.
    pub fn encode(&self, enc: &mut Encoder) {
        enc.put_u8(self.number_condition);
        enc.put_u8(self.hidden_condition);
        enc.put_u8(self.flagged_condition);
        enc.put_bool(self.near_edge);
        enc.put_bool(self.has_pattern);
        enc.put_u8(self.scope);
        enc.put_u8(self.priority);
        enc.put_u8(self.action.to_byte());
    }

    /// Reads a rule written by [`Self::encode`], range-checking every field.
    pub fn decode(dec: &mut Decoder<'_>) -> Result<Self, DecodeError> {
        let number_condition = dec.u8_in("rule number condition", COUNT_RANGE)?;
        let hidden_condition = dec.u8_in("rule hidden condition", COUNT_RANGE)?;
        let flagged_condition = dec.u8_in("rule flagged condition", COUNT_RANGE)?;
        let near_edge = dec.bool("rule near edge")?;
        let has_pattern = dec.bool("rule pattern")?;
        let scope = dec.u8_in("rule scope", SCOPE_RANGE)?;
        let priority = dec.u8_in("rule priority", PRIORITY_RANGE)?;
        let action = match dec.u8("rule action")? {
            0 => RuleAction::Reveal,
            1 => RuleAction::Flag,
            value => {
                return Err(DecodeError::InvalidValue {
                    field: "rule action",
                    value: i64::from(value),
                });
            }
        };
        Ok(Self {
            number_condition,
            hidden_condition,
            flagged_condition,
            near_edge,
            has_pattern,
            scope,
            priority,
            action,
        })
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng as _;
    use rand_pcg::Pcg32;

    use super::*;

    fn in_domain(rule: &Rule) -> bool {
        COUNT_RANGE.contains(&rule.number_condition)
            && COUNT_RANGE.contains(&rule.hidden_condition)
            && COUNT_RANGE.contains(&rule.flagged_condition)
            && SCOPE_RANGE.contains(&rule.scope)
            && PRIORITY_RANGE.contains(&rule.priority)
    }

    #[test]
    fn test_random_rules_stay_in_domain() {
        let mut rng = Pcg32::seed_from_u64(7);
        let mut seen_actions = [false; 2];
        for _ in 0..1000 {
            let rule = Rule::random(&mut rng);
            assert!(in_domain(&rule), "{rule:?}");
            seen_actions[usize::from(rule.action.to_byte())] = true;
        }
        assert_eq!(seen_actions, [true, true]);
    }

    #[test]
    fn test_resample_touches_only_one_field() {
        let mut rng = Pcg32::seed_from_u64(8);
        for _ in 0..200 {
            let original = Rule::random(&mut rng);
            for field in RuleField::ALL {
                let mut rule = original;
                rule.resample(field, &mut rng);
                assert!(in_domain(&rule));
                for other in RuleField::ALL.into_iter().filter(|f| *f != field) {
                    assert!(rule.same_field(&original, other));
                }
            }
        }
    }

    #[test]
    fn test_encode_writes_one_byte_per_field() {
        let rule = Rule {
            number_condition: 3,
            hidden_condition: 8,
            flagged_condition: 0,
            near_edge: true,
            has_pattern: false,
            scope: 2,
            priority: 10,
            action: RuleAction::Flag,
        };
        let mut enc = Encoder::new();
        rule.encode(&mut enc);
        let bytes = enc.into_bytes();
        assert_eq!(bytes, [3, 8, 0, 1, 0, 2, 10, 1]);
        assert_eq!(Rule::decode(&mut Decoder::new(&bytes)).unwrap(), rule);
    }

    #[test]
    fn test_validate_checks_every_domain() {
        let mut rng = Pcg32::seed_from_u64(9);
        for _ in 0..100 {
            assert_eq!(Rule::random(&mut rng).validate(), Ok(()));
        }

        let rule = Rule::random(&mut rng);
        let cases = [
            (Rule { number_condition: 9, ..rule }, "rule number condition"),
            (Rule { hidden_condition: 9, ..rule }, "rule hidden condition"),
            (Rule { flagged_condition: 9, ..rule }, "rule flagged condition"),
            (Rule { scope: 3, ..rule }, "rule scope"),
            (Rule { scope: 0, ..rule }, "rule scope"),
            (Rule { priority: 11, ..rule }, "rule priority"),
        ];
        for (bad, expected) in cases {
            match bad.validate() {
                Err(DecodeError::InvalidValue { field, .. }) => assert_eq!(field, expected),
                other => panic!("unexpected result for {bad:?}: {other:?}"),
            }
        }
    }

    #[test]
    fn test_decode_rejects_out_of_domain_fields() {
        let cases: [([u8; 8], &str); 4] = [
            ([9, 0, 0, 0, 0, 1, 1, 0], "rule number condition"),
            ([0, 0, 0, 0, 0, 3, 1, 0], "rule scope"),
            ([0, 0, 0, 0, 0, 1, 0, 0], "rule priority"),
            ([0, 0, 0, 0, 0, 1, 1, 2], "rule action"),
        ];
        for (bytes, expected) in cases {
            match Rule::decode(&mut Decoder::new(&bytes)) {
                Err(DecodeError::InvalidValue { field, .. }) => assert_eq!(field, expected),
                other => panic!("unexpected result for {bytes:?}: {other:?}"),
            }
        }
    }
}
