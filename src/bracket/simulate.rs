//! Monte Carlo cross-check: play the bracket out many times and count
//! champions. The analytic root distribution is the answer; this only
//! confirms it.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::BTreeMap;

use super::distribution::WinDistribution;
use super::error::{BracketError, Result};
use super::node::{Bracket, Matchup, NodeId};
use super::oracle::PairwiseOracle;
use super::team::TeamId;

/// Empirical champion frequencies over `runs` simulated tournaments.
pub fn simulate(
    bracket: &Bracket,
    oracle: &dyn PairwiseOracle,
    runs: u64,
    seed: u64,
) -> Result<WinDistribution> {
    let root = bracket.root()?;
    if runs == 0 {
        return Err(BracketError::Structural("simulation needs at least one run".into()));
    }

    let mut rng = StdRng::seed_from_u64(seed);
    let mut winners: Vec<TeamId> = Vec::with_capacity(bracket.len());
    let mut champions: BTreeMap<TeamId, u64> = BTreeMap::new();

    for _ in 0..runs {
        winners.clear();
        for i in 0..bracket.len() {
            let (team1, team2) = match *bracket.get(NodeId(i))? {
                Matchup::Game { team1, team2 } => (team1, team2),
                Matchup::Hypothetical { child1, child2 } => (winners[child1.0], winners[child2.0]),
            };
            let p = oracle.win_probability(team1, team2)?;
            let roll: f64 = rng.gen();
            winners.push(if roll < p { team1 } else { team2 });
        }
        *champions.entry(winners[root.0]).or_insert(0) += 1;
    }

    Ok(WinDistribution::from_counts(&champions, runs))
}
