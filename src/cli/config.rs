//! Shared configuration types for CLI commands

use clap::{ArgAction, Args};
use rand::{SeedableRng, rngs::StdRng};
use serde::{Deserialize, Serialize};

/// Common configuration shared across commands
#[derive(Args, Debug, Clone, Serialize, Deserialize)]
pub struct CommonConfig {
    /// Random seed for reproducibility
    #[arg(long)]
    pub seed: Option<u64>,

    /// Hide progress bars
    #[arg(long = "no-progress", action = ArgAction::SetFalse)]
    pub progress: bool,

    /// Verbose output (debug-level logging)
    #[arg(long, short = 'v')]
    pub verbose: bool,
}

impl Default for CommonConfig {
    fn default() -> Self {
        Self {
            seed: None,
            progress: true,
            verbose: false,
        }
    }
}

impl CommonConfig {
    /// Random source for dataset generation and clustering
    pub fn rng(&self) -> StdRng {
        match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_rng(&mut rand::rng()),
        }
    }
}
