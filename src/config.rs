use clap::{Parser, ValueEnum};

use crate::bracket::TieBreak;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Single-elimination bracket win probabilities from pairwise predictions
#[derive(Parser, Debug, Clone)]
#[command(name = "bracket-odds", version, about)]
pub struct Config {
    /// Team registry CSV (TeamID,TeamName)
    #[arg(long, env = "TEAMS_PATH")]
    pub teams: String,

    /// Pairwise predictions CSV (ID,Pred) with IDs of the form SEASON_LOWID_HIGHID
    #[arg(long, env = "PREDICTIONS_PATH")]
    pub predictions: String,

    /// First-round pairings CSV (Team1ID,Team2ID), one row per game in draw order
    #[arg(long, env = "BRACKET_PATH")]
    pub bracket: String,

    /// Season prefix of the prediction IDs to load
    #[arg(long, env = "SEASON", default_value = "2025")]
    pub season: u32,

    /// Deterministic winner of a game priced at exactly 0.5
    #[arg(long, env = "TIE_BREAK", value_enum, default_value_t = TieBreak::SecondListed)]
    pub tie_break: TieBreak,

    /// Allowed deviation of a win distribution's total from 1.0 before warning
    #[arg(long, env = "NORMALIZATION_TOLERANCE", default_value = "1e-9")]
    pub tolerance: f64,

    /// Output format
    #[arg(long, env = "OUTPUT_FORMAT", value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    /// Monte Carlo runs to cross-check the champion odds (0 disables)
    #[arg(long, env = "SIMULATIONS", default_value = "0")]
    pub simulations: u64,

    /// Seed for the Monte Carlo cross-check
    #[arg(long, env = "SEED", default_value = "42")]
    pub seed: u64,
}

/// Upper bound on simulated tournaments per run.
const MAX_SIMULATIONS: u64 = 10_000_000;

impl Config {
    pub fn validate(&self) -> anyhow::Result<()> {
        if !self.tolerance.is_finite() || self.tolerance <= 0.0 || self.tolerance >= 1.0 {
            anyhow::bail!("tolerance must be a positive number below 1.0");
        }
        if self.simulations > MAX_SIMULATIONS {
            anyhow::bail!("simulations must be at most {}", MAX_SIMULATIONS);
        }
        for (flag, path) in [
            ("--teams", &self.teams),
            ("--predictions", &self.predictions),
            ("--bracket", &self.bracket),
        ] {
            if path.trim().is_empty() {
                anyhow::bail!("{} must not be empty", flag);
            }
        }
        Ok(())
    }
}
