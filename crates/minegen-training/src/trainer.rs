//! The generation loop.
//!
//! A [`Trainer`] owns the population, the scenario bank and the random source of
//! a training run. Each call to [`Trainer::run_generation`]:
//!
//! 1. samples the scenarios every individual plays this generation
//! 2. draws one seed per individual and evaluates the population in parallel
//! 3. sorts by fitness and records a [`GenerationReport`]
//! 4. replaces the population with the evolved next generation
//!
//! Checkpointing and console output are left to the caller.

use std::num::NonZeroUsize;

use minegen_engine::{ScenarioBank, ScenarioBankError};
use minegen_evaluator::session_evaluator::{FitnessWeights, SessionEvaluator};
use rand::Rng;

use crate::{
    genetic::{FitnessStats, Individual, Population, PopulationEvolver},
    scheduler::ParallelEvaluator,
};

const DEFAULT_WORKERS: NonZeroUsize = NonZeroUsize::new(8).unwrap();

/// Parameters of a training run.
#[derive(Debug, Clone)]
pub struct TrainerConfig {
    pub population_size: usize,
    pub rule_count: usize,
    pub games_per_generation: usize,
    pub workers: NonZeroUsize,
    pub evolver: PopulationEvolver,
    pub fitness: FitnessWeights,
}

impl Default for TrainerConfig {
    fn default() -> Self {
        Self {
            population_size: 300,
            rule_count: 150,
            games_per_generation: 20,
            workers: DEFAULT_WORKERS,
            evolver: PopulationEvolver::default(),
            fitness: FitnessWeights::default(),
        }
    }
}

/// Invalid training parameters.
#[derive(Debug, Clone, PartialEq, derive_more::Display, derive_more::Error)]
pub enum TrainerConfigError {
    #[display("population must contain at least one individual")]
    EmptyPopulation,
    #[display("genomes must contain at least one rule")]
    EmptyGenome,
    #[display("tournament size must be at least 1")]
    EmptyTournament,
    #[display("{elite_count} elites do not fit in a population of {population_size}")]
    TooManyElites {
        elite_count: usize,
        population_size: usize,
    },
    #[display("{name} must lie in [0, 1], got {value}")]
    InvalidRate { name: &'static str, value: f64 },
    #[display(
        "population has {found_size} individuals of {found_rules} rules, expected {expected_size} of {expected_rules}"
    )]
    PopulationMismatch {
        expected_size: usize,
        expected_rules: usize,
        found_size: usize,
        found_rules: usize,
    },
}

impl TrainerConfig {
    pub fn validate(&self) -> Result<(), TrainerConfigError> {
        if self.population_size == 0 {
            return Err(TrainerConfigError::EmptyPopulation);
        }
        if self.rule_count == 0 {
            return Err(TrainerConfigError::EmptyGenome);
        }
        if self.evolver.tournament_size == 0 {
            return Err(TrainerConfigError::EmptyTournament);
        }
        if self.evolver.elite_count > self.population_size {
            return Err(TrainerConfigError::TooManyElites {
                elite_count: self.evolver.elite_count,
                population_size: self.population_size,
            });
        }
        for (name, value) in [
            ("crossover rate", self.evolver.crossover_rate),
            ("mutation rate", self.evolver.mutation_rate),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(TrainerConfigError::InvalidRate { name, value });
            }
        }
        Ok(())
    }
}

#[derive(Debug, derive_more::Display, derive_more::Error)]
pub enum TrainerError {
    #[display("invalid training configuration: {_0}")]
    Config(TrainerConfigError),
    #[display("cannot sample scenarios: {_0}")]
    Scenarios(ScenarioBankError),
}

impl From<TrainerConfigError> for TrainerError {
    fn from(err: TrainerConfigError) -> Self {
        Self::Config(err)
    }
}

impl From<ScenarioBankError> for TrainerError {
    fn from(err: ScenarioBankError) -> Self {
        Self::Scenarios(err)
    }
}

/// Summary of one evaluated generation.
#[derive(Debug, Clone)]
pub struct GenerationReport {
    pub generation: usize,
    pub fitness: FitnessStats,
    pub wins: usize,
    pub games: usize,
    /// Mean genetic distance between the best individual and the others.
    pub mean_distance_to_best: Option<f64>,
    /// Best individual of the generation, with its fitness.
    pub best: Individual,
}

impl GenerationReport {
    #[expect(clippy::cast_precision_loss)]
    #[must_use]
    pub fn win_rate(&self) -> f64 {
        if self.games == 0 {
            0.0
        } else {
            self.wins as f64 / self.games as f64
        }
    }
}

/// Drives a training run one generation at a time.
#[derive(Debug)]
pub struct Trainer<R> {
    config: TrainerConfig,
    bank: ScenarioBank,
    population: Population,
    generation: usize,
    scheduler: ParallelEvaluator,
    session_evaluator: SessionEvaluator,
    rng: R,
}

impl<R> Trainer<R>
where
    R: Rng,
{
    /// Creates a trainer starting at generation 1.
    ///
    /// Fails if the configuration is invalid, if `population` does not match it,
    /// or if the bank cannot provide `games_per_generation` distinct scenarios.
    pub fn new(
        config: TrainerConfig,
        bank: ScenarioBank,
        population: Population,
        rng: R,
    ) -> Result<Self, TrainerError> {
        config.validate()?;
        let found_rules = population
            .individuals()
            .iter()
            .map(|ind| ind.genome().len())
            .find(|len| *len != config.rule_count)
            .unwrap_or(config.rule_count);
        if population.len() != config.population_size || found_rules != config.rule_count {
            return Err(TrainerConfigError::PopulationMismatch {
                expected_size: config.population_size,
                expected_rules: config.rule_count,
                found_size: population.len(),
                found_rules,
            }
            .into());
        }
        if config.games_per_generation == 0 {
            return Err(ScenarioBankError::EmptySample.into());
        }
        if config.games_per_generation > bank.len() {
            return Err(ScenarioBankError::SampleTooLarge {
                requested: config.games_per_generation,
                available: bank.len(),
            }
            .into());
        }

        Ok(Self {
            scheduler: ParallelEvaluator::new(config.workers),
            session_evaluator: SessionEvaluator::new(config.fitness),
            config,
            bank,
            population,
            generation: 1,
            rng,
        })
    }

    #[must_use]
    pub fn config(&self) -> &TrainerConfig {
        &self.config
    }

    #[must_use]
    pub fn bank(&self) -> &ScenarioBank {
        &self.bank
    }

    /// The population of the next generation to be evaluated.
    #[must_use]
    pub fn population(&self) -> &Population {
        &self.population
    }

    /// Number of the next generation to be evaluated, starting at 1.
    #[must_use]
    pub fn generation(&self) -> usize {
        self.generation
    }

    /// Evaluates the current population and replaces it with the next generation.
    pub fn run_generation(&mut self) -> Result<GenerationReport, TrainerError> {
        let generation = self.generation;
        let scenarios = self
            .bank
            .sample(self.config.games_per_generation, &mut self.rng)?;
        tracing::debug!(generation, scenarios = scenarios.len(), "sampled scenarios");

        let seeds: Vec<u64> = (0..self.population.len())
            .map(|_| self.rng.random())
            .collect();
        let tally = self.scheduler.evaluate(
            &mut self.population,
            &seeds,
            &scenarios,
            &self.session_evaluator,
        );
        self.population.sort_by_fitness();

        let report = GenerationReport {
            generation,
            fitness: self
                .population
                .fitness_stats()
                .ok_or(TrainerConfigError::EmptyPopulation)?,
            wins: tally.wins(),
            games: tally.games(),
            mean_distance_to_best: self.population.mean_distance_to_best(),
            best: self.population.individuals()[0].clone(),
        };

        self.population = self.config.evolver.evolve(&self.population, &mut self.rng);
        self.generation += 1;
        Ok(report)
    }
}
