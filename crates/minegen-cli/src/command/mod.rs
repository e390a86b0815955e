use anyhow::Context as _;
use clap::{Parser, Subcommand};
use minegen_engine::BoardConfig;

use self::{evaluate::EvaluateArg, generate_scenarios::GenerateScenariosArg, train::TrainArg};

mod evaluate;
mod generate_scenarios;
mod train;

#[derive(Debug, Clone, Parser)]
#[command(author, version, about, long_about = None)]
pub struct CommandArgs {
    #[command(subcommand)]
    mode: Mode,
}

#[derive(Debug, Clone, Subcommand)]
enum Mode {
    /// Evolve rule genomes with the genetic algorithm
    Train(#[clap(flatten)] TrainArg),
    /// Generate the fixed scenario bank
    GenerateScenarios(#[clap(flatten)] GenerateScenariosArg),
    /// Play a trained genome against every scenario of the bank
    Evaluate(#[clap(flatten)] EvaluateArg),
}

/// Board dimensions shared by the commands that create boards.
#[derive(Debug, Clone, clap::Args)]
pub(crate) struct BoardArg {
    /// Board width in cells
    #[arg(long, default_value_t = BoardConfig::CLASSIC.width)]
    width: usize,
    /// Board height in cells
    #[arg(long, default_value_t = BoardConfig::CLASSIC.height)]
    height: usize,
    /// Number of mines per board
    #[arg(long, default_value_t = BoardConfig::CLASSIC.mine_count)]
    mines: usize,
}

impl BoardArg {
    pub(crate) fn to_config(&self) -> anyhow::Result<BoardConfig> {
        BoardConfig::new(self.width, self.height, self.mines)
            .context("Invalid board configuration")
    }
}

pub fn run() -> anyhow::Result<()> {
    let args = CommandArgs::parse();
    match args.mode {
        Mode::Train(arg) => train::run(&arg)?,
        Mode::GenerateScenarios(arg) => generate_scenarios::run(&arg)?,
        Mode::Evaluate(arg) => evaluate::run(&arg)?,
    }
    Ok(())
}
