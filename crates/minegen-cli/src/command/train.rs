use std::{num::NonZeroUsize, path::PathBuf};

use anyhow::Context as _;
use chrono::Utc;
use minegen_engine::{BoardConfig, ScenarioBank};
use minegen_evaluator::session_evaluator::FitnessWeights;
use minegen_training::{
    checkpoint,
    genetic::PopulationEvolver,
    trainer::{GenerationReport, Trainer, TrainerConfig},
};
use rand::Rng;

use super::BoardArg;
use crate::{model::genome_model::GenomeModel, util};

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct TrainArg {
    #[clap(flatten)]
    board: BoardArg,
    /// Number of individuals in the population
    #[arg(long, default_value_t = 300)]
    population_size: usize,
    /// Number of rules in each genome
    #[arg(long, default_value_t = 150)]
    rules: usize,
    /// Per-field mutation probability
    #[arg(long, default_value_t = 0.02)]
    mutation_rate: f64,
    /// Probability that a parent pair is recombined
    #[arg(long, default_value_t = 0.8)]
    crossover_rate: f64,
    /// Number of contestants per tournament selection
    #[arg(long, default_value_t = 10)]
    tournament_size: usize,
    /// Number of top individuals copied unchanged into the next generation
    #[arg(long, default_value_t = 2)]
    elite_count: usize,
    /// Number of scenarios generated when the bank does not exist yet
    #[arg(long, default_value_t = 200)]
    scenario_count: usize,
    /// Number of scenarios played by each individual per generation
    #[arg(long, default_value_t = 20)]
    games_per_generation: usize,
    /// Number of evaluation worker threads
    #[arg(long, default_value_t = 8)]
    workers: usize,
    /// Save the population every N generations (0 disables periodic saves)
    #[arg(long, default_value_t = 5)]
    checkpoint_interval: usize,
    /// Population checkpoint file
    #[arg(long, default_value = "population.dat")]
    population_file: PathBuf,
    /// Scenario bank file
    #[arg(long, default_value = "scenarios.dat")]
    scenario_file: PathBuf,
    /// Seed for a reproducible run
    #[arg(long)]
    seed: Option<u64>,
    /// Stop after this many generations (runs until interrupted if omitted)
    #[arg(long)]
    generations: Option<usize>,
    /// Best genome export path (stdout if omitted)
    #[arg(long)]
    output: Option<PathBuf>,
}

pub(crate) fn run(arg: &TrainArg) -> anyhow::Result<()> {
    let board = arg.board.to_config()?;
    let workers = NonZeroUsize::new(arg.workers).context("Worker count must be at least 1")?;
    let config = TrainerConfig {
        population_size: arg.population_size,
        rule_count: arg.rules,
        games_per_generation: arg.games_per_generation,
        workers,
        evolver: PopulationEvolver {
            elite_count: arg.elite_count,
            tournament_size: arg.tournament_size,
            crossover_rate: arg.crossover_rate,
            mutation_rate: arg.mutation_rate,
        },
        fitness: FitnessWeights::default(),
    };
    config.validate().context("Invalid training configuration")?;

    let mut rng = util::make_rng(arg.seed);
    let bank =
        ScenarioBank::load_or_generate(&arg.scenario_file, board, arg.scenario_count, &mut rng)
            .with_context(|| {
                format!(
                    "Failed to prepare scenario bank: {}",
                    arg.scenario_file.display()
                )
            })?;
    let population = checkpoint::load_or_random(
        &arg.population_file,
        config.population_size,
        config.rule_count,
        &mut rng,
    );

    eprintln!("Training Configuration:");
    eprintln!(
        "  Board: {}x{} with {} mines",
        board.width, board.height, board.mine_count
    );
    eprintln!(
        "  Population: {} individuals of {} rules",
        config.population_size, config.rule_count
    );
    eprintln!(
        "  Scenarios: {} games per generation from a bank of {}",
        config.games_per_generation,
        bank.len()
    );
    eprintln!("  Workers: {}", config.workers);
    eprintln!();

    let mut trainer = Trainer::new(config, bank, population, rng)
        .context("Failed to initialize the trainer")?;
    let mut last_report = None;
    while arg.generations.is_none_or(|limit| trainer.generation() <= limit) {
        let report = trainer.run_generation()?;
        print_report(&report);

        if arg.checkpoint_interval > 0 && report.generation % arg.checkpoint_interval == 0 {
            save_checkpoint(&trainer, arg)?;
            if arg.output.is_some() {
                export_best(&report, board, arg)?;
            }
        }
        last_report = Some(report);
    }

    // Only bounded runs reach this point.
    save_checkpoint(&trainer, arg)?;
    if let Some(report) = &last_report {
        export_best(report, board, arg)?;
    }
    Ok(())
}

fn print_report(report: &GenerationReport) {
    eprintln!("Generation #{}:", report.generation);
    eprintln!("  Fitness Stats:");
    eprintln!("    Best: {:.3}", report.fitness.max);
    eprintln!("    Mean: {:.3}", report.fitness.mean);
    eprintln!("    Min:  {:.3}", report.fitness.min);
    eprintln!(
        "  Win Rate: {:.2}% ({}/{})",
        report.win_rate() * 100.0,
        report.wins,
        report.games
    );
    if let Some(distance) = report.mean_distance_to_best {
        eprintln!("  Diversity: {distance:.4}");
    }
}

fn save_checkpoint<R>(trainer: &Trainer<R>, arg: &TrainArg) -> anyhow::Result<()>
where
    R: Rng,
{
    checkpoint::save(trainer.population(), &arg.population_file).with_context(|| {
        format!(
            "Failed to save population checkpoint: {}",
            arg.population_file.display()
        )
    })
}

fn export_best(
    report: &GenerationReport,
    board: BoardConfig,
    arg: &TrainArg,
) -> anyhow::Result<()> {
    let model = GenomeModel {
        name: format!("minegen-gen{}", report.generation),
        trained_at: Utc::now(),
        generation: report.generation,
        fitness: report.best.fitness(),
        board,
        rules: report.best.genome().clone(),
    };
    util::save_json(&model, arg.output.as_deref())?;

    if let Some(path) = &arg.output {
        eprintln!("Model saved successfully:");
        eprintln!("  Path: {}", path.display());
        eprintln!("  Name: {}", model.name);
        eprintln!("  Trained at: {}", model.trained_at);
        eprintln!("  Fitness: {:.3}", model.fitness);
    }
    Ok(())
}
