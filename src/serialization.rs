//! Saving and loading trained Tic-Tac-Toe policies.
//!
//! Files ending in `.json` are written as pretty JSON; anything else is
//! MessagePack.

use std::{
    collections::BTreeMap,
    fs::File,
    io::{BufReader, BufWriter},
    path::Path,
    time::{SystemTime, UNIX_EPOCH},
};

use serde::{Deserialize, Serialize};

use crate::{
    Error, Result,
    config::{Algorithm, RewardConfig},
    policy::Policy,
    ports::TrainingReport,
    tictactoe::{BoardState, OpponentKind},
};

/// How a policy was trained
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PolicyMetadata {
    pub discount: f64,
    pub rewards: RewardConfig,
    pub opponent: OpponentKind,
    pub seed: Option<u64>,
    /// Seconds since the Unix epoch
    pub saved_at: Option<u64>,
    pub report: Option<TrainingReport>,
}

impl PolicyMetadata {
    pub fn new(discount: f64, rewards: RewardConfig, opponent: OpponentKind) -> Self {
        Self {
            discount,
            rewards,
            opponent,
            seed: None,
            saved_at: None,
            report: None,
        }
    }

    pub fn with_seed(mut self, seed: Option<u64>) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_report(mut self, report: TrainingReport) -> Self {
        self.report = Some(report);
        self
    }
}

/// On-disk form of a trained policy, keyed by board label
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedPolicy {
    pub version: u32,
    pub algorithm: Algorithm,
    pub metadata: PolicyMetadata,
    pub entries: BTreeMap<String, usize>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Json,
    MessagePack,
}

impl Format {
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => Format::Json,
            _ => Format::MessagePack,
        }
    }
}

impl SavedPolicy {
    /// Current save format version
    pub const VERSION: u32 = 1;

    pub fn new(
        algorithm: Algorithm,
        metadata: PolicyMetadata,
        policy: &Policy<BoardState, usize>,
    ) -> Self {
        let entries = policy
            .iter()
            .map(|(state, &action)| (state.encode(), action))
            .collect();
        Self {
            version: Self::VERSION,
            algorithm,
            metadata,
            entries,
        }
    }

    /// Rebuild the policy, checking every entry is a legal move
    pub fn to_policy(&self) -> Result<Policy<BoardState, usize>> {
        if self.version != Self::VERSION {
            return Err(Error::SerializationContext {
                operation: "read saved policy".to_string(),
                message: format!(
                    "unsupported format version {} (expected {})",
                    self.version,
                    Self::VERSION
                ),
            });
        }

        let mut policy = Policy::new();
        for (label, &action) in &self.entries {
            let state = BoardState::from_label(label)?;
            if !state.legal_moves().contains(&action) {
                return Err(Error::invalid_action(&state, &action));
            }
            policy.insert(state, action);
        }
        Ok(policy)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let mut saved = self.clone();
        saved.metadata.saved_at = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .ok()
            .map(|d| d.as_secs());

        let file = File::create(path).map_err(|source| Error::Io {
            operation: format!("create file {}", path.display()),
            source,
        })?;
        let mut writer = BufWriter::new(file);

        match Format::from_path(path) {
            Format::Json => serde_json::to_writer_pretty(&mut writer, &saved)?,
            Format::MessagePack => rmp_serde::encode::write(&mut writer, &saved).map_err(|e| {
                Error::SerializationContext {
                    operation: "serialize policy to MessagePack".to_string(),
                    message: e.to_string(),
                }
            })?,
        }
        log::info!(
            "saved {} policy entries to {}",
            saved.entries.len(),
            path.display()
        );
        Ok(())
    }

    pub fn load(path: &Path) -> Result<Self> {
        let file = File::open(path).map_err(|source| Error::Io {
            operation: format!("open file {}", path.display()),
            source,
        })?;
        let reader = BufReader::new(file);

        let saved = match Format::from_path(path) {
            Format::Json => serde_json::from_reader(reader)?,
            Format::MessagePack => {
                rmp_serde::decode::from_read(reader).map_err(|e| Error::SerializationContext {
                    operation: "deserialize policy from MessagePack".to_string(),
                    message: e.to_string(),
                })?
            }
        };
        Ok(saved)
    }
}
