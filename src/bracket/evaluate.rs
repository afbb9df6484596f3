//! Bottom-up evaluation of bracket nodes.
//!
//! Each node's outcome is computed once from its children's outcomes and the
//! oracle, then kept in a per-node memo. Nothing in the bracket or the oracle
//! changes during evaluation, so memoised outcomes never go stale.

use clap::ValueEnum;
use tracing::{debug, warn};

use super::distribution::WinDistribution;
use super::error::{BracketError, Result};
use super::node::{Bracket, Matchup, NodeId};
use super::oracle::PairwiseOracle;
use super::team::TeamId;

/// Who is named the deterministic winner of a game priced at exactly 0.5.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum TieBreak {
    /// The second-listed team takes a coin-flip game: the first-listed team
    /// is only the winner when strictly favoured.
    #[default]
    SecondListed,
    /// The lower team id takes a coin-flip game.
    LowerId,
}

impl TieBreak {
    /// Deterministic winner of `first` vs `second`, where `first_wins` is
    /// `P(first beats second)`.
    pub fn resolve(self, first: TeamId, second: TeamId, first_wins: f64) -> TeamId {
        if first_wins > 0.5 {
            first
        } else if first_wins < 0.5 {
            second
        } else {
            match self {
                TieBreak::SecondListed => second,
                TieBreak::LowerId => first.min(second),
            }
        }
    }
}

/// Everything known about one bracket node after evaluation.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeOutcome {
    pub node: NodeId,
    /// The two teams that meet if every earlier favourite advances
    /// (for a scheduled game, simply its two teams).
    pub favourites: (TeamId, TeamId),
    /// `P(favourites.0 beats favourites.1)`.
    pub deterministic_win_probability: f64,
    /// Deterministic winner of the favourite-vs-favourite game.
    pub winner: TeamId,
    /// Probability that `winner` beats the other favourite.
    pub win_probability: f64,
    /// Full probability of each reachable team winning this node.
    pub distribution: WinDistribution,
}

pub struct Evaluator<'a> {
    bracket: &'a Bracket,
    oracle: &'a dyn PairwiseOracle,
    tie_break: TieBreak,
    tolerance: f64,
    memo: Vec<Option<NodeOutcome>>,
}

impl<'a> Evaluator<'a> {
    pub fn new(
        bracket: &'a Bracket,
        oracle: &'a dyn PairwiseOracle,
        tie_break: TieBreak,
        tolerance: f64,
    ) -> Self {
        Self {
            bracket,
            oracle,
            tie_break,
            tolerance,
            memo: vec![None; bracket.len()],
        }
    }

    /// Outcome of `id`, evaluating only the part of its subtree that is not
    /// already memoised.
    pub fn outcome(&mut self, id: NodeId) -> Result<&NodeOutcome> {
        self.bracket.get(id)?;

        // Explicit post-order walk: a node is computed once both children are.
        let mut stack = vec![id];
        while let Some(&top) = stack.last() {
            if self.memo[top.0].is_some() {
                stack.pop();
                continue;
            }
            let computed = match *self.bracket.get(top)? {
                Matchup::Game { team1, team2 } => self.game(top, team1, team2)?,
                Matchup::Hypothetical { child1, child2 } => {
                    let pending: Vec<NodeId> = [child1, child2]
                        .into_iter()
                        .filter(|c| self.memo[c.0].is_none())
                        .collect();
                    if !pending.is_empty() {
                        stack.extend(pending);
                        continue;
                    }
                    self.hypothetical(top, child1, child2)?
                }
            };
            self.memo[top.0] = Some(computed);
            stack.pop();
        }

        self.memo[id.0].as_ref().ok_or(BracketError::UnknownNode(id))
    }

    /// Evaluate every node. Arena order already places children first.
    pub fn evaluate_all(&mut self) -> Result<()> {
        for i in 0..self.bracket.len() {
            self.outcome(NodeId(i))?;
        }
        Ok(())
    }

    /// Memoised outcome of `id`, if it has been evaluated.
    pub fn cached(&self, id: NodeId) -> Option<&NodeOutcome> {
        self.memo.get(id.0).and_then(Option::as_ref)
    }

    /// Number of nodes evaluated so far.
    pub fn evaluated_count(&self) -> usize {
        self.memo.iter().filter(|m| m.is_some()).count()
    }

    fn game(&self, node: NodeId, team1: TeamId, team2: TeamId) -> Result<NodeOutcome> {
        let distribution = WinDistribution::from_game(team1, team2, self.oracle)?;
        let first_wins = distribution.get(team1);
        let winner = self.tie_break.resolve(team1, team2, first_wins);
        debug!("Evaluated game {}: {} vs {}", node, team1, team2);
        Ok(NodeOutcome {
            node,
            favourites: (team1, team2),
            deterministic_win_probability: first_wins,
            winner,
            win_probability: distribution.get(winner),
            distribution,
        })
    }

    fn hypothetical(&self, node: NodeId, child1: NodeId, child2: NodeId) -> Result<NodeOutcome> {
        let left = self.cached(child1).ok_or(BracketError::UnknownNode(child1))?;
        let right = self.cached(child2).ok_or(BracketError::UnknownNode(child2))?;

        let (fav1, fav2) = (left.winner, right.winner);
        let first_wins = self.oracle.win_probability(fav1, fav2)?;
        let winner = self.tie_break.resolve(fav1, fav2, first_wins);
        let loser = if winner == fav1 { fav2 } else { fav1 };
        let win_probability = self.oracle.win_probability(winner, loser)?;

        let distribution =
            WinDistribution::combine(&left.distribution, &right.distribution, self.oracle)?;
        if let Some(deviation) = distribution.normalization_error(self.tolerance) {
            warn!(
                "Win distribution at node {} sums to {:.12} (off by {:.3e}, tolerance {:.1e})",
                node,
                distribution.total(),
                deviation,
                self.tolerance
            );
        }
        debug!(
            "Evaluated node {}: {} possible winners",
            node,
            distribution.len()
        );

        Ok(NodeOutcome {
            node,
            favourites: (fav1, fav2),
            deterministic_win_probability: first_wins,
            winner,
            win_probability,
            distribution,
        })
    }
}
