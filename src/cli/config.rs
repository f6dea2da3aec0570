//! JSON configuration file accepted by `train --config`

use std::{fs::File, io::BufReader, path::Path};

use serde::{Deserialize, Serialize};

use crate::{
    Error, Result,
    config::{GameConfig, PolicyIterationConfig, QLearningConfig, ValueIterationConfig},
};

/// Every setting `train` understands, one section per algorithm.
///
/// Missing sections and fields take their defaults, so a file can be as
/// small as `{"game": {"opponent": "minimax"}}`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainingFile {
    pub game: GameConfig,
    pub value_iteration: ValueIterationConfig,
    pub policy_iteration: PolicyIterationConfig,
    pub q_learning: QLearningConfig,
}

impl TrainingFile {
    pub fn load(path: &Path) -> Result<Self> {
        let file = File::open(path).map_err(|source| Error::Io {
            operation: format!("open config {}", path.display()),
            source,
        })?;
        Ok(serde_json::from_reader(BufReader::new(file))?)
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use tempfile::TempDir;

    use super::*;
    use crate::{config::StoppingRule, tictactoe::OpponentKind};

    #[test]
    fn partial_file_keeps_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("train.json");
        let mut file = File::create(&path).unwrap();
        write!(
            file,
            r#"{{
                "game": {{"opponent": "minimax", "rewards": {{"living": -0.1}}}},
                "value_iteration": {{"stopping": {{"sweeps": 10}}}},
                "q_learning": {{"episodes": 500, "seed": 4}}
            }}"#
        )
        .unwrap();

        let loaded = TrainingFile::load(&path).unwrap();
        assert_eq!(loaded.game.opponent, OpponentKind::Minimax);
        assert_eq!(loaded.game.rewards.living, -0.1);
        assert_eq!(loaded.game.rewards.win, 10.0);
        assert_eq!(loaded.value_iteration.stopping, StoppingRule::Sweeps(10));
        assert_eq!(loaded.q_learning.episodes, 500);
        assert_eq!(loaded.q_learning.seed, Some(4));
        assert_eq!(loaded.q_learning.learning_rate, 0.1);
        assert_eq!(loaded.policy_iteration.delta, 1e-6);
    }

    #[test]
    fn malformed_file_is_a_serialization_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("broken.json");
        std::fs::write(&path, "{ not json").unwrap();
        assert!(matches!(
            TrainingFile::load(&path),
            Err(Error::Serialization(_))
        ));
    }
}
