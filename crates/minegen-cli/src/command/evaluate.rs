use std::path::PathBuf;

use anyhow::{Context as _, bail};
use minegen_engine::ScenarioBank;
use minegen_evaluator::{
    genome::Genome,
    session_evaluator::{FitnessWeights, SessionEvaluator, SessionSummary},
};
use minegen_training::checkpoint;

use crate::{model::genome_model::GenomeModel, util};

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct EvaluateArg {
    /// Scenario bank file
    #[arg(long, default_value = "scenarios.dat")]
    scenario_file: PathBuf,
    /// Population checkpoint to take the best individual from
    #[arg(long, default_value = "population.dat")]
    population_file: PathBuf,
    /// Number of individuals in the checkpoint
    #[arg(long, default_value_t = 300)]
    population_size: usize,
    /// Number of rules in each genome of the checkpoint
    #[arg(long, default_value_t = 150)]
    rules: usize,
    /// Exported genome model to evaluate instead of the checkpoint
    #[arg(long, conflicts_with = "population_file")]
    model: Option<PathBuf>,
    /// Seed for the random reveals of stuck games
    #[arg(long)]
    seed: Option<u64>,
}

pub(crate) fn run(arg: &EvaluateArg) -> anyhow::Result<()> {
    let bank = ScenarioBank::load(&arg.scenario_file).with_context(|| {
        format!(
            "Failed to load scenario bank: {}",
            arg.scenario_file.display()
        )
    })?;
    let genome = load_genome(arg, &bank)?;
    if genome.is_empty() {
        bail!("Genome has no rules to evaluate");
    }

    let mut rng = util::make_rng(arg.seed);
    let summary = evaluate_on_bank(&genome, &bank, &mut rng);

    eprintln!("Evaluation Results:");
    eprintln!("  Scenarios: {}", summary.games);
    eprintln!("  Mean Fitness: {:.3}", summary.fitness);
    eprintln!(
        "  Win Rate: {:.2}% ({}/{})",
        win_rate(&summary) * 100.0,
        summary.wins,
        summary.games
    );
    Ok(())
}

fn load_genome(arg: &EvaluateArg, bank: &ScenarioBank) -> anyhow::Result<Genome> {
    if let Some(path) = &arg.model {
        let model = GenomeModel::open(path)?;
        if model.board != *bank.config() {
            tracing::warn!(
                model = %model.name,
                "model was trained on a different board than the scenario bank"
            );
        }
        eprintln!("Evaluating model {} (generation {})", model.name, model.generation);
        return Ok(model.rules);
    }

    let population = checkpoint::load(&arg.population_file, arg.population_size, arg.rules)
        .with_context(|| {
            format!(
                "Failed to load population checkpoint: {}",
                arg.population_file.display()
            )
        })?;
    let best = population
        .individuals()
        .iter()
        .max_by(|a, b| a.fitness().total_cmp(&b.fitness()))
        .context("Population checkpoint is empty")?;
    eprintln!(
        "Evaluating best checkpoint individual (recorded fitness {:.3})",
        best.fitness()
    );
    Ok(best.genome().clone())
}

fn evaluate_on_bank<R>(genome: &Genome, bank: &ScenarioBank, rng: &mut R) -> SessionSummary
where
    R: rand::Rng + ?Sized,
{
    let scenarios: Vec<_> = bank.scenarios().iter().collect();
    SessionEvaluator::new(FitnessWeights::default()).play_and_evaluate_sessions(
        genome,
        &scenarios,
        rng,
    )
}

#[expect(clippy::cast_precision_loss)]
fn win_rate(summary: &SessionSummary) -> f64 {
    if summary.games == 0 {
        return 0.0;
    }
    summary.wins as f64 / summary.games as f64
}
