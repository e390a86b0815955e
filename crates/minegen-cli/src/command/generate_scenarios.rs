use std::path::PathBuf;

use anyhow::{Context as _, bail};
use minegen_engine::ScenarioBank;

use super::BoardArg;
use crate::util;

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct GenerateScenariosArg {
    #[clap(flatten)]
    board: BoardArg,
    /// Number of scenarios to generate
    #[arg(long, default_value_t = 200)]
    count: usize,
    /// Scenario bank file
    #[arg(long, default_value = "scenarios.dat")]
    scenario_file: PathBuf,
    /// Replace an existing bank
    #[arg(long)]
    force: bool,
    /// Seed for reproducible generation
    #[arg(long)]
    seed: Option<u64>,
}

pub(crate) fn run(arg: &GenerateScenariosArg) -> anyhow::Result<()> {
    let config = arg.board.to_config()?;
    if arg.count == 0 {
        bail!("Scenario count must be at least 1");
    }
    if arg.scenario_file.exists() && !arg.force {
        bail!(
            "Scenario bank already exists: {} (use --force to replace it)",
            arg.scenario_file.display()
        );
    }

    let mut rng = util::make_rng(arg.seed);
    let bank = ScenarioBank::generate(config, arg.count, &mut rng);
    bank.save(&arg.scenario_file).with_context(|| {
        format!(
            "Failed to save scenario bank: {}",
            arg.scenario_file.display()
        )
    })?;

    eprintln!("Scenario bank saved successfully:");
    eprintln!("  Path: {}", arg.scenario_file.display());
    eprintln!(
        "  Board: {}x{} with {} mines",
        config.width, config.height, config.mine_count
    );
    eprintln!("  Scenarios: {}", bank.len());
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use super::*;

    fn arg(path: &Path, force: bool, seed: u64) -> GenerateScenariosArg {
        GenerateScenariosArg {
            board: BoardArg {
                width: 5,
                height: 5,
                mines: 3,
            },
            count: 4,
            scenario_file: path.to_owned(),
            force,
            seed: Some(seed),
        }
    }

    #[test]
    fn test_refuses_to_overwrite_without_force() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scenarios.dat");

        run(&arg(&path, false, 1)).unwrap();
        let first = std::fs::read(&path).unwrap();

        assert!(run(&arg(&path, false, 2)).is_err());
        assert_eq!(std::fs::read(&path).unwrap(), first);

        run(&arg(&path, true, 2)).unwrap();
        let bank = ScenarioBank::load(&path).unwrap();
        assert_eq!(bank.len(), 4);
        assert_eq!(bank.config().mine_count, 3);
    }
}
