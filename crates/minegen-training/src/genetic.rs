//! Genetic algorithm over rule genomes.
//!
//! This module implements the population side of training: individuals, their
//! fitness bookkeeping, and the operators that turn one generation into the next.
//!
//! # Algorithm Overview
//!
//! Every generation follows the same cycle:
//!
//! 1. **Evaluate Fitness** - Each individual plays the sampled scenarios
//!    (see [`scheduler`](crate::scheduler))
//! 2. **Sort** - Individuals are ordered by fitness, best first
//! 3. **Elite Selection** - The top individuals are copied unchanged
//! 4. **Tournament Selection** - Two parents are picked for every pair of children
//! 5. **Crossover** - With probability `crossover_rate` the parents are recombined
//!    (see [`genome_ops::crossover`]), otherwise they are cloned
//! 6. **Mutation** - Every rule field of both children is resampled with
//!    probability `mutation_rate`
//!
//! # Key Components
//!
//! - [`Individual`] - A genome and its cached fitness
//! - [`Population`] - Fixed-size collection of individuals, with statistics
//! - [`PopulationEvolver`] - Evolution parameters and the generation step
//!
//! # Diversity
//!
//! [`Population::mean_distance_to_best`] measures how far the population has
//! drifted from its best genome. It is reported for monitoring only: selection is
//! driven by fitness alone.

use rand::{Rng, seq::IndexedRandom as _};

use minegen_evaluator::genome::Genome;

use crate::genome_ops;

/// A genome and the fitness it scored in the last evaluation.
///
/// Fitness is a cached value. It is recomputed every generation and is `0.0` for
/// freshly created individuals.
#[derive(Debug, Clone, PartialEq)]
pub struct Individual {
    genome: Genome,
    fitness: f64,
}

impl Individual {
    #[must_use]
    pub fn new(genome: Genome, fitness: f64) -> Self {
        Self { genome, fitness }
    }

    /// Creates an individual with `rule_count` random rules.
    pub fn random<R>(rule_count: usize, rng: &mut R) -> Self
    where
        R: Rng + ?Sized,
    {
        Self::new(Genome::random(rule_count, rng), 0.0)
    }

    #[must_use]
    pub fn genome(&self) -> &Genome {
        &self.genome
    }

    #[must_use]
    pub fn fitness(&self) -> f64 {
        self.fitness
    }

    pub fn set_fitness(&mut self, fitness: f64) {
        self.fitness = fitness;
    }
}

/// Minimum, maximum and mean fitness of a population.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FitnessStats {
    pub min: f64,
    pub max: f64,
    pub mean: f64,
}

/// An ordered collection of individuals.
#[derive(Debug, Clone, PartialEq)]
pub struct Population {
    individuals: Vec<Individual>,
}

impl Population {
    #[must_use]
    pub fn new(individuals: Vec<Individual>) -> Self {
        Self { individuals }
    }

    /// Creates `count` random individuals of `rule_count` rules each.
    pub fn random<R>(count: usize, rule_count: usize, rng: &mut R) -> Self
    where
        R: Rng + ?Sized,
    {
        let individuals = (0..count)
            .map(|_| Individual::random(rule_count, rng))
            .collect();
        Self { individuals }
    }

    #[must_use]
    pub fn individuals(&self) -> &[Individual] {
        &self.individuals
    }

    pub fn individuals_mut(&mut self) -> &mut [Individual] {
        &mut self.individuals
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.individuals.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.individuals.is_empty()
    }

    /// Sorts individuals by fitness, best first. Ties keep their current order.
    pub fn sort_by_fitness(&mut self) {
        self.individuals.sort_by(|a, b| b.fitness.total_cmp(&a.fitness));
    }

    #[must_use]
    pub fn is_sorted_by_fitness(&self) -> bool {
        self.individuals.is_sorted_by(|a, b| a.fitness >= b.fitness)
    }

    /// Returns the individual with the highest fitness; the first one on ties.
    #[must_use]
    pub fn best(&self) -> Option<&Individual> {
        self.individuals
            .iter()
            .reduce(|best, ind| if ind.fitness > best.fitness { ind } else { best })
    }

    #[expect(clippy::cast_precision_loss)]
    #[must_use]
    pub fn fitness_stats(&self) -> Option<FitnessStats> {
        let first = self.individuals.first()?.fitness;
        let (min, max, sum) = self.individuals.iter().fold(
            (first, first, 0.0),
            |(min, max, sum), ind| (min.min(ind.fitness), max.max(ind.fitness), sum + ind.fitness),
        );
        Some(FitnessStats {
            min,
            max,
            mean: sum / self.individuals.len() as f64,
        })
    }

    /// Mean genetic distance between the best individual and every other one.
    ///
    /// Returns `None` for populations with fewer than two individuals.
    #[expect(clippy::cast_precision_loss)]
    #[must_use]
    pub fn mean_distance_to_best(&self) -> Option<f64> {
        if self.individuals.len() < 2 {
            return None;
        }
        let best = self.best()?;
        let total: f64 = self
            .individuals
            .iter()
            .filter(|ind| !std::ptr::eq(*ind, best))
            .map(|ind| best.genome.distance(&ind.genome))
            .sum();
        Some(total / (self.individuals.len() - 1) as f64)
    }
}

/// Controls how one generation becomes the next.
#[derive(Debug, Clone)]
pub struct PopulationEvolver {
    /// Number of top individuals copied unchanged (elitism)
    pub elite_count: usize,
    /// Individuals drawn, with replacement, for each tournament
    pub tournament_size: usize,
    /// Probability of recombining a pair of parents instead of cloning them
    pub crossover_rate: f64,
    /// Probability of resampling each rule field of a child
    pub mutation_rate: f64,
}

impl Default for PopulationEvolver {
    fn default() -> Self {
        Self {
            elite_count: 2,
            tournament_size: 10,
            crossover_rate: 0.8,
            mutation_rate: 0.02,
        }
    }
}

impl PopulationEvolver {
    /// Creates the next generation.
    ///
    /// Elites keep their fitness; every other individual starts at `0.0`. The
    /// result has the same size as `population`.
    ///
    /// # Panics
    ///
    /// Panics if `population` is not sorted by fitness (best first) or if the
    /// tournament size is zero while children are needed.
    #[must_use]
    pub fn evolve<R>(&self, population: &Population, rng: &mut R) -> Population
    where
        R: Rng + ?Sized,
    {
        assert!(population.is_sorted_by_fitness());
        let size = population.len();
        let individuals = &population.individuals;
        let mut next = Vec::with_capacity(size);

        // elite selection
        next.extend(individuals.iter().take(self.elite_count).cloned());

        while next.len() < size {
            let p1 = tournament_select(individuals, self.tournament_size, rng);
            let p2 = tournament_select(individuals, self.tournament_size, rng);

            let (mut c1, mut c2) = if rng.random_bool(self.crossover_rate.clamp(0.0, 1.0)) {
                genome_ops::crossover(&p1.genome, &p2.genome, rng)
            } else {
                (p1.genome.clone(), p2.genome.clone())
            };
            genome_ops::mutate(&mut c1, self.mutation_rate, rng);
            genome_ops::mutate(&mut c2, self.mutation_rate, rng);

            next.push(Individual::new(c1, 0.0));
            if next.len() < size {
                next.push(Individual::new(c2, 0.0));
            }
        }

        Population::new(next)
    }
}

/// Selects an individual using tournament selection.
///
/// Draws `tournament_size` individuals uniformly with replacement and returns the
/// fittest. The first drawn wins ties.
///
/// # Panics
///
/// Panics if `population` is empty or `tournament_size` is zero.
pub fn tournament_select<'a, R>(
    population: &'a [Individual],
    tournament_size: usize,
    rng: &mut R,
) -> &'a Individual
where
    R: Rng + ?Sized,
{
    assert!(tournament_size > 0);
    (0..tournament_size)
        .filter_map(|_| population.choose(rng))
        .reduce(|best, ind| if ind.fitness > best.fitness { ind } else { best })
        .expect("population must not be empty")
}
