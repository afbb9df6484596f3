//! Pairwise win-probability lookup.
//!
//! Only one direction of each matchup is ever stored: the probability that the
//! lower-id team beats the higher-id team. The reverse direction is always
//! derived as `1 - stored`, so `p(a, b) + p(b, a) == 1.0` holds for every pair
//! and cannot drift through two inconsistent rows.

use std::collections::HashMap;

use super::error::{BracketError, Result};
use super::team::TeamId;

/// Source of truth for "probability that `a` beats `b`".
///
/// Evaluation only ever reads from an oracle, so implementations must be
/// shareable across threads without locking.
pub trait PairwiseOracle: Send + Sync {
    fn win_probability(&self, a: TeamId, b: TeamId) -> Result<f64>;
}

/// Order a pair lower-id first.
pub fn canonical_pair(a: TeamId, b: TeamId) -> (TeamId, TeamId) {
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}

#[derive(Debug, Clone, Copy)]
struct Entry {
    /// P(lower id beats higher id), from the first record seen.
    lower_wins: f64,
    /// Number of records seen for the pair. Anything but 1 is an error on lookup.
    records: usize,
}

/// Sparse table of matchup probabilities keyed by canonical pair.
#[derive(Debug, Clone, Default)]
pub struct ProbabilityTable {
    entries: HashMap<(TeamId, TeamId), Entry>,
}

impl ProbabilityTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `P(low beats high)`.
    ///
    /// The pair must already be canonical. A repeated pair is kept as a
    /// duplicate so that querying it fails instead of picking one row.
    pub fn insert(&mut self, low: TeamId, high: TeamId, lower_wins: f64) -> Result<()> {
        if low == high {
            return Err(BracketError::SameTeam(low));
        }
        if low > high {
            return Err(BracketError::Structural(format!(
                "probability record {}_{} is not ordered lower id first",
                low, high
            )));
        }
        if !lower_wins.is_finite() || !(0.0..=1.0).contains(&lower_wins) {
            return Err(BracketError::InvalidProbability {
                team1: low,
                team2: high,
                value: lower_wins,
            });
        }
        self.entries
            .entry((low, high))
            .and_modify(|e| e.records += 1)
            .or_insert(Entry {
                lower_wins,
                records: 1,
            });
        Ok(())
    }

    /// Number of distinct pairs (duplicates counted once).
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Pairs that were recorded more than once.
    pub fn duplicate_pairs(&self) -> Vec<(TeamId, TeamId)> {
        let mut dups: Vec<_> = self
            .entries
            .iter()
            .filter(|(_, e)| e.records > 1)
            .map(|(k, _)| *k)
            .collect();
        dups.sort();
        dups
    }
}

impl PairwiseOracle for ProbabilityTable {
    fn win_probability(&self, a: TeamId, b: TeamId) -> Result<f64> {
        if a == b {
            return Err(BracketError::SameTeam(a));
        }
        let (low, high) = canonical_pair(a, b);
        let entry = self
            .entries
            .get(&(low, high))
            .ok_or(BracketError::MissingProbability {
                team1: low,
                team2: high,
            })?;
        if entry.records != 1 {
            return Err(BracketError::AmbiguousProbability {
                team1: low,
                team2: high,
                count: entry.records,
            });
        }
        Ok(if a == low {
            entry.lower_wins
        } else {
            1.0 - entry.lower_wins
        })
    }
}
