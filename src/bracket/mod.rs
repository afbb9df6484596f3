//! Bracket win-probability engine.
//!
//! Composes pairwise matchup probabilities into the distribution of winners
//! at every node of a single-elimination bracket, including nodes whose
//! participants are themselves undecided.

pub mod builder;
pub mod distribution;
pub mod error;
pub mod evaluate;
pub mod node;
pub mod oracle;
pub mod simulate;
pub mod team;

pub use builder::{build_single_elimination, BracketLayout};
pub use distribution::WinDistribution;
pub use error::BracketError;
pub use evaluate::{Evaluator, NodeOutcome, TieBreak};
pub use node::{Bracket, Matchup, NodeId};
pub use oracle::{PairwiseOracle, ProbabilityTable};
pub use simulate::simulate;
pub use team::{Team, TeamId, TeamRegistry};
