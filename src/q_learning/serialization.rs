//! Save and load trained grid-world agents.

use std::{
    fs::File,
    io::{BufReader, BufWriter},
    path::Path,
};

use anyhow::{Context, Result, anyhow};
use serde::{Deserialize, Serialize};

use crate::q_learning::{
    agent::{QLearningAgent, QLearningConfig, TrainingSummary},
    grid::{GridWorld, Rewards},
    q_table::QTable,
};

/// MessagePack snapshot of a trained agent
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SavedAgent {
    pub version: u32,
    pub grid: GridWorld,
    pub rewards: Rewards,
    pub config: QLearningConfig,
    pub epsilon: f64,
    pub episodes_trained: usize,
    q_table: QTable,
    pub summary: Option<TrainingSummary>,
}

impl SavedAgent {
    pub const VERSION: u32 = 1;

    pub fn from_agent(agent: &QLearningAgent, summary: Option<TrainingSummary>) -> Self {
        Self {
            version: Self::VERSION,
            grid: agent.grid().clone(),
            rewards: *agent.rewards(),
            config: *agent.config(),
            epsilon: agent.epsilon(),
            episodes_trained: agent.episodes_trained(),
            q_table: agent.q_table().clone(),
            summary,
        }
    }

    pub fn q_table(&self) -> &QTable {
        &self.q_table
    }

    pub fn to_agent(&self) -> Result<QLearningAgent> {
        if self.version != Self::VERSION {
            return Err(anyhow!(
                "Unsupported agent save format version: {}. Expected {}",
                self.version,
                Self::VERSION
            ));
        }

        QLearningAgent::from_parts(
            self.grid.clone(),
            self.rewards,
            self.config,
            self.q_table.clone(),
            self.epsilon,
            self.episodes_trained,
        )
        .context("Saved agent is inconsistent")
    }

    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let file = File::create(path.as_ref())
            .with_context(|| format!("Failed to create file: {}", path.as_ref().display()))?;
        let mut writer = BufWriter::new(file);

        rmp_serde::encode::write(&mut writer, self).context("Failed to serialize agent")?;

        Ok(())
    }

    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path.as_ref())
            .with_context(|| format!("Failed to open file: {}", path.as_ref().display()))?;
        let reader = BufReader::new(file);

        rmp_serde::decode::from_read(reader).context("Failed to deserialize agent")
    }
}
