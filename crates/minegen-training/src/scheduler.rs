//! Parallel fitness evaluation.
//!
//! Every individual of a generation is an independent task: it reads its own
//! genome and the shared, immutable scenario sample, and owns its simulation state
//! and random source. A fixed number of worker threads pull tasks from a shared
//! counter until none is left. The scope join is the generation barrier: fitness
//! values are written back only after every task has finished.
//!
//! Each task seeds its own [`Pcg32`] from a per-individual seed chosen by the
//! caller, so results do not depend on the worker count or on scheduling order.

use std::{
    num::NonZeroUsize,
    panic,
    sync::atomic::{AtomicUsize, Ordering},
    thread,
};

use minegen_engine::FixedScenario;
use minegen_evaluator::session_evaluator::{SessionEvaluator, SessionSummary};
use rand::SeedableRng as _;
use rand_pcg::Pcg32;

use crate::genetic::Population;

/// Win and game counters shared by the tasks of one generation.
///
/// Used for reporting only.
#[derive(Debug, Default)]
pub struct GenerationTally {
    wins: AtomicUsize,
    games: AtomicUsize,
}

impl GenerationTally {
    pub fn record(&self, summary: &SessionSummary) {
        self.wins.fetch_add(summary.wins, Ordering::Relaxed);
        self.games.fetch_add(summary.games, Ordering::Relaxed);
    }

    #[must_use]
    pub fn wins(&self) -> usize {
        self.wins.load(Ordering::Relaxed)
    }

    #[must_use]
    pub fn games(&self) -> usize {
        self.games.load(Ordering::Relaxed)
    }

    /// Fraction of won games, or `None` if no game was played.
    #[expect(clippy::cast_precision_loss)]
    #[must_use]
    pub fn win_rate(&self) -> Option<f64> {
        let games = self.games();
        (games > 0).then(|| self.wins() as f64 / games as f64)
    }
}

/// Fork-join evaluator with a bounded number of worker threads.
#[derive(Debug, Clone)]
pub struct ParallelEvaluator {
    workers: NonZeroUsize,
}

impl ParallelEvaluator {
    #[must_use]
    pub fn new(workers: NonZeroUsize) -> Self {
        Self { workers }
    }

    #[must_use]
    pub fn workers(&self) -> NonZeroUsize {
        self.workers
    }

    /// Evaluates every individual of `population` on `scenarios` and stores the
    /// resulting fitness.
    ///
    /// `seeds[i]` seeds the random source of individual `i`.
    ///
    /// # Panics
    ///
    /// Panics if `seeds` and `population` differ in length, if `scenarios` is
    /// empty, or if a worker panics.
    pub fn evaluate(
        &self,
        population: &mut Population,
        seeds: &[u64],
        scenarios: &[&FixedScenario],
        session_evaluator: &SessionEvaluator,
    ) -> GenerationTally {
        assert_eq!(seeds.len(), population.len());
        let tally = GenerationTally::default();
        let next_task = AtomicUsize::new(0);
        let individuals = population.individuals();
        let workers = self.workers.get().min(individuals.len()).max(1);

        let results: Vec<(usize, f64)> = thread::scope(|s| {
            let handles: Vec<_> = (0..workers)
                .map(|_| {
                    s.spawn(|| {
                        let mut done = vec![];
                        loop {
                            let i = next_task.fetch_add(1, Ordering::Relaxed);
                            let Some(ind) = individuals.get(i) else {
                                break;
                            };
                            let mut rng = Pcg32::seed_from_u64(seeds[i]);
                            let summary = session_evaluator.play_and_evaluate_sessions(
                                ind.genome(),
                                scenarios,
                                &mut rng,
                            );
                            tally.record(&summary);
                            done.push((i, summary.fitness));
                        }
                        done
                    })
                })
                .collect();
            handles
                .into_iter()
                .flat_map(|handle| handle.join().unwrap_or_else(|err| panic::resume_unwind(err)))
                .collect()
        });

        for (i, fitness) in results {
            population.individuals_mut()[i].set_fitness(fitness);
        }
        tally
    }
}

#[cfg(test)]
mod tests {
    use minegen_engine::{BoardConfig, ScenarioBank};

    use super::*;

    fn workers(n: usize) -> ParallelEvaluator {
        ParallelEvaluator::new(NonZeroUsize::new(n).unwrap())
    }

    #[test]
    fn test_results_do_not_depend_on_worker_count() {
        let mut rng = Pcg32::seed_from_u64(10);
        let bank = ScenarioBank::generate(BoardConfig::CLASSIC, 6, &mut rng);
        let scenarios: Vec<_> = bank.scenarios().iter().collect();
        let population = Population::random(12, 40, &mut rng);
        let seeds: Vec<u64> = (0..12).collect();
        let evaluator = SessionEvaluator::default();

        let mut serial = population.clone();
        let serial_tally = workers(1).evaluate(&mut serial, &seeds, &scenarios, &evaluator);
        let mut parallel = population;
        let parallel_tally = workers(5).evaluate(&mut parallel, &seeds, &scenarios, &evaluator);

        assert_eq!(serial, parallel);
        assert_eq!(serial_tally.games(), 12 * 6);
        assert_eq!(serial_tally.wins(), parallel_tally.wins());
    }

    #[test]
    fn test_every_individual_is_scored() {
        let mut rng = Pcg32::seed_from_u64(11);
        let bank = ScenarioBank::generate(BoardConfig::CLASSIC, 3, &mut rng);
        let scenarios: Vec<_> = bank.scenarios().iter().collect();
        let mut population = Population::random(9, 20, &mut rng);
        for ind in population.individuals_mut() {
            ind.set_fitness(f64::NAN);
        }
        let seeds = vec![7; 9];

        let tally = workers(4).evaluate(
            &mut population,
            &seeds,
            &scenarios,
            &SessionEvaluator::default(),
        );
        assert!(population.individuals().iter().all(|ind| ind.fitness().is_finite()));
        assert_eq!(tally.games(), 27);
        let rate = tally.win_rate().unwrap();
        assert!((0.0..=1.0).contains(&rate));
    }

    #[test]
    fn test_empty_tally_has_no_win_rate() {
        assert!(GenerationTally::default().win_rate().is_none());
    }
}
