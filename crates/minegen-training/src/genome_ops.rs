//! Genome operations for the genetic algorithm.
//!
//! These are the building blocks used by
//! [`genetic::PopulationEvolver`](crate::genetic::PopulationEvolver):
//!
//! - **Crossover**: [`crossover`] recombines two parents at several cut points
//! - **Mutation**: [`mutate`] resamples individual rule fields
//!
//! # Multi-Point Crossover
//!
//! Rules are discrete genes, so offspring never blend values: every rule of a child
//! is copied from exactly one parent. Between `1` and `R − 1` distinct cut points
//! split the genome into contiguous blocks and the parent of origin alternates at
//! each cut. The two children are complementary.
//!
//! ```text
//! cuts:        |     |        |
//! parent 1:  a a a a a a a a a a
//! parent 2:  b b b b b b b b b b
//! child 1:   a a b b b a a a b b
//! child 2:   b b a a a b b b a a
//! ```
//!
//! # Per-Field Mutation
//!
//! Each of the 8 fields of every rule is resampled independently with probability
//! `rate`, uniformly over its whole domain. With `rate = 0` the genome is left
//! untouched.

use minegen_evaluator::{genome::Genome, rule::RuleField};
use rand::{Rng, seq::index};

/// Recombines two parents into two complementary children.
///
/// Genomes shorter than 2 rules have no cut point and are returned as clones.
///
/// # Panics
///
/// Panics if the parents have different lengths.
pub fn crossover<R>(p1: &Genome, p2: &Genome, rng: &mut R) -> (Genome, Genome)
where
    R: Rng + ?Sized,
{
    assert_eq!(p1.len(), p2.len());
    let len = p1.len();
    if len < 2 {
        return (p1.clone(), p2.clone());
    }

    let cut_count = rng.random_range(1..len);
    let mut cuts: Vec<usize> = index::sample(rng, len - 1, cut_count)
        .into_iter()
        .map(|i| i + 1)
        .collect();
    cuts.sort_unstable();

    let mut c1 = Vec::with_capacity(len);
    let mut c2 = Vec::with_capacity(len);
    let mut cuts = cuts.into_iter().peekable();
    let mut swapped = false;
    for (i, (r1, r2)) in p1.rules().iter().zip(p2.rules()).enumerate() {
        if cuts.next_if_eq(&i).is_some() {
            swapped = !swapped;
        }
        if swapped {
            c1.push(*r2);
            c2.push(*r1);
        } else {
            c1.push(*r1);
            c2.push(*r2);
        }
    }
    (Genome::new(c1), Genome::new(c2))
}

/// Resamples every rule field independently with probability `rate`.
pub fn mutate<R>(genome: &mut Genome, rate: f64, rng: &mut R)
where
    R: Rng + ?Sized,
{
    if rate <= 0.0 {
        return;
    }
    let rate = rate.min(1.0);
    for rule in genome.rules_mut() {
        for field in RuleField::ALL {
            if rng.random_bool(rate) {
                rule.resample(field, rng);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng as _;
    use rand_pcg::Pcg32;

    use super::*;

    #[test]
    fn test_crossover_genes_come_from_one_parent() {
        let mut rng = Pcg32::seed_from_u64(3);
        for _ in 0..200 {
            let p1 = Genome::random(40, &mut rng);
            let p2 = Genome::random(40, &mut rng);
            let (c1, c2) = crossover(&p1, &p2, &mut rng);
            assert_eq!(c1.len(), 40);
            assert_eq!(c2.len(), 40);
            for i in 0..40 {
                let (a, b) = (p1.rules()[i], p2.rules()[i]);
                let (x, y) = (c1.rules()[i], c2.rules()[i]);
                assert!((x == a && y == b) || (x == b && y == a));
            }
        }
    }

    #[test]
    fn test_crossover_always_cuts() {
        let mut rng = Pcg32::seed_from_u64(4);
        let p1 = Genome::random(10, &mut rng);
        let p2 = Genome::random(10, &mut rng);
        assert_ne!(p1, p2);
        for _ in 0..100 {
            let (c1, c2) = crossover(&p1, &p2, &mut rng);
            // The first block always comes from the matching parent.
            assert_eq!(c1.rules()[0], p1.rules()[0]);
            assert_eq!(c2.rules()[0], p2.rules()[0]);
            // At least one cut means at least one swapped rule.
            assert!((1..10).any(|i| c1.rules()[i] == p2.rules()[i]));
        }
    }

    #[test]
    fn test_crossover_of_single_rule_genomes_clones() {
        let mut rng = Pcg32::seed_from_u64(5);
        let p1 = Genome::random(1, &mut rng);
        let p2 = Genome::random(1, &mut rng);
        let children = crossover(&p1, &p2, &mut rng);
        assert_eq!(children, (p1, p2));
    }

    #[test]
    fn test_mutate_with_zero_rate_is_identity() {
        let mut rng = Pcg32::seed_from_u64(6);
        let original = Genome::random(150, &mut rng);
        let mut genome = original.clone();
        mutate(&mut genome, 0.0, &mut rng);
        assert_eq!(genome, original);
    }

    #[test]
    fn test_mutate_with_full_rate_changes_genome() {
        let mut rng = Pcg32::seed_from_u64(7);
        let original = Genome::random(150, &mut rng);
        let mut genome = original.clone();
        mutate(&mut genome, 1.0, &mut rng);
        assert_eq!(genome.len(), original.len());
        assert!(genome.distance(&original) > 0.3);
    }
}
