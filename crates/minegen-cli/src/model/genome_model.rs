use std::path::Path;

use anyhow::Context as _;
use chrono::{DateTime, Utc};
use minegen_engine::BoardConfig;
use minegen_evaluator::genome::Genome;
use serde::{Deserialize, Serialize};

use crate::util;

/// A trained genome exported as JSON.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GenomeModel {
    pub name: String,
    pub trained_at: DateTime<Utc>,
    pub generation: usize,
    pub fitness: f64,
    pub board: BoardConfig,
    pub rules: Genome,
}

impl GenomeModel {
    /// Reads a model file and checks that every rule lies in its gene domain.
    pub fn open(path: &Path) -> anyhow::Result<Self> {
        let model: Self = util::read_json_file("genome model", path)?;
        model
            .rules
            .validate()
            .with_context(|| format!("Invalid rule in genome model: {}", path.display()))?;
        Ok(model)
    }
}

#[cfg(test)]
mod tests {
    use minegen_evaluator::rule::{Rule, RuleAction};

    use super::*;

    #[test]
    fn test_open_rejects_out_of_domain_scope() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model.json");
        let mut model = serde_json::to_value(GenomeModel {
            name: "broken".to_owned(),
            trained_at: Utc::now(),
            generation: 1,
            fitness: 0.0,
            board: BoardConfig::CLASSIC,
            rules: Genome::random(3, &mut rand::rng()),
        })
        .unwrap();
        model["rules"][2]["scope"] = 3.into();
        std::fs::write(&path, model.to_string()).unwrap();

        let err = GenomeModel::open(&path).unwrap_err();
        assert!(format!("{err:#}").contains("rule scope"), "{err:#}");
    }

    #[test]
    fn test_save_and_open() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model.json");
        let model = GenomeModel {
            name: "minegen".to_owned(),
            trained_at: Utc::now(),
            generation: 12,
            fitness: 1234.5,
            board: BoardConfig::CLASSIC,
            rules: Genome::new(vec![Rule {
                number_condition: 1,
                hidden_condition: 1,
                flagged_condition: 0,
                near_edge: false,
                has_pattern: false,
                scope: 1,
                priority: 10,
                action: RuleAction::Flag,
            }]),
        };
        util::save_json(&model, Some(&path)).unwrap();

        let loaded = GenomeModel::open(&path).unwrap();
        assert_eq!(loaded.name, model.name);
        assert_eq!(loaded.trained_at, model.trained_at);
        assert_eq!(loaded.generation, 12);
        assert_eq!(loaded.board, BoardConfig::CLASSIC);
        assert_eq!(loaded.rules, model.rules);
    }
}
