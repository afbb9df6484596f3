use std::collections::BTreeMap;

use super::error::Result;
use super::oracle::PairwiseOracle;
use super::team::TeamId;

/// Probability mass over the teams that can win a given bracket node.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WinDistribution {
    probs: BTreeMap<TeamId, f64>,
}

impl WinDistribution {
    /// Distribution of a single game between two known teams.
    pub fn from_game(team1: TeamId, team2: TeamId, oracle: &dyn PairwiseOracle) -> Result<Self> {
        let mut probs = BTreeMap::new();
        probs.insert(team1, oracle.win_probability(team1, team2)?);
        probs.insert(team2, oracle.win_probability(team2, team1)?);
        Ok(Self { probs })
    }

    /// Distribution of a game between the winners of two independent
    /// sub-brackets.
    ///
    /// Every pairing `(t1, t2)` from `left × right` happens with probability
    /// `left[t1] * right[t2]`; its mass is then split between the two teams by
    /// the oracle. Both sides must cover disjoint teams.
    pub fn combine(
        left: &WinDistribution,
        right: &WinDistribution,
        oracle: &dyn PairwiseOracle,
    ) -> Result<Self> {
        let mut probs: BTreeMap<TeamId, f64> = BTreeMap::new();
        for (&t1, &p1) in &left.probs {
            for (&t2, &p2) in &right.probs {
                let meet = p1 * p2;
                let t1_wins = oracle.win_probability(t1, t2)?;
                let t2_wins = oracle.win_probability(t2, t1)?;
                *probs.entry(t1).or_insert(0.0) += meet * t1_wins;
                *probs.entry(t2).or_insert(0.0) += meet * t2_wins;
            }
        }
        Ok(Self { probs })
    }

    /// Empirical distribution from win counts out of `total` trials.
    pub fn from_counts(counts: &BTreeMap<TeamId, u64>, total: u64) -> Self {
        let probs = counts
            .iter()
            .map(|(&team, &n)| (team, n as f64 / total as f64))
            .collect();
        Self { probs }
    }

    /// Probability that `team` wins here; 0 for teams that cannot reach the node.
    pub fn get(&self, team: TeamId) -> f64 {
        self.probs.get(&team).copied().unwrap_or(0.0)
    }

    pub fn iter(&self) -> impl Iterator<Item = (TeamId, f64)> + '_ {
        self.probs.iter().map(|(&t, &p)| (t, p))
    }

    pub fn len(&self) -> usize {
        self.probs.len()
    }

    pub fn total(&self) -> f64 {
        self.probs.values().sum()
    }

    /// `Some(deviation)` when the mass is further than `tolerance` from 1.
    pub fn normalization_error(&self, tolerance: f64) -> Option<f64> {
        let deviation = (self.total() - 1.0).abs();
        (deviation > tolerance).then_some(deviation)
    }

    /// Teams by descending probability, ties broken by lower id.
    pub fn ranked(&self) -> Vec<(TeamId, f64)> {
        let mut v: Vec<_> = self.iter().collect();
        v.sort_by(|a, b| b.1.total_cmp(&a.1).then(a.0.cmp(&b.0)));
        v
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bracket::oracle::ProbabilityTable;
    use crate::bracket::BracketError;
    use approx::assert_relative_eq;

    fn four_team_table() -> ProbabilityTable {
        let mut t = ProbabilityTable::new();
        for (a, b, p) in [
            (1, 2, 0.6),
            (3, 4, 0.8),
            (1, 3, 0.55),
            (1, 4, 0.65),
            (2, 3, 0.45),
            (2, 4, 0.5),
        ] {
            t.insert(TeamId(a), TeamId(b), p).unwrap();
        }
        t
    }

    #[test]
    fn single_game_distribution() {
        let t = four_team_table();
        let d = WinDistribution::from_game(TeamId(1), TeamId(2), &t).unwrap();
        assert_eq!(d.len(), 2);
        assert_relative_eq!(d.get(TeamId(1)), 0.6);
        assert_relative_eq!(d.get(TeamId(2)), 0.4, epsilon = 1e-12);
        assert_eq!(d.total(), 1.0);
        assert_eq!(d.get(TeamId(3)), 0.0);
    }

    #[test]
    fn combine_weights_every_pairing() {
        let t = four_team_table();
        let left = WinDistribution::from_game(TeamId(1), TeamId(2), &t).unwrap();
        let right = WinDistribution::from_game(TeamId(3), TeamId(4), &t).unwrap();
        let d = WinDistribution::combine(&left, &right, &t).unwrap();

        let a = 0.6 * 0.8 * 0.55 + 0.6 * 0.2 * 0.65;
        let b = 0.4 * 0.8 * 0.45 + 0.4 * 0.2 * 0.5;
        let c = 0.8 * 0.6 * 0.45 + 0.8 * 0.4 * 0.55;
        let dd = 0.2 * 0.6 * 0.35 + 0.2 * 0.4 * 0.5;

        assert_relative_eq!(d.get(TeamId(1)), a, epsilon = 1e-12);
        assert_relative_eq!(d.get(TeamId(2)), b, epsilon = 1e-12);
        assert_relative_eq!(d.get(TeamId(3)), c, epsilon = 1e-12);
        assert_relative_eq!(d.get(TeamId(4)), dd, epsilon = 1e-12);
        assert_relative_eq!(d.total(), 1.0, epsilon = 1e-9);
        assert!(d.normalization_error(1e-9).is_none());
    }

    #[test]
    fn combine_propagates_missing_records() {
        // 2 vs 4 is the only pairing left out
        let mut t = ProbabilityTable::new();
        for (a, b, p) in [(1, 2, 0.6), (3, 4, 0.8), (1, 3, 0.55), (1, 4, 0.65), (2, 3, 0.45)] {
            t.insert(TeamId(a), TeamId(b), p).unwrap();
        }
        let left = WinDistribution::from_game(TeamId(1), TeamId(2), &t).unwrap();
        let right = WinDistribution::from_game(TeamId(3), TeamId(4), &t).unwrap();
        let err = WinDistribution::combine(&left, &right, &t).unwrap_err();
        assert_eq!(
            err,
            BracketError::MissingProbability {
                team1: TeamId(2),
                team2: TeamId(4)
            }
        );
    }

    #[test]
    fn ranked_breaks_ties_by_lower_id() {
        let mut t = ProbabilityTable::new();
        t.insert(TeamId(5), TeamId(9), 0.5).unwrap();
        let d = WinDistribution::from_game(TeamId(9), TeamId(5), &t).unwrap();
        let ranked: Vec<TeamId> = d.ranked().into_iter().map(|(id, _)| id).collect();
        assert_eq!(ranked, vec![TeamId(5), TeamId(9)]);
    }

    #[test]
    fn normalization_error_reports_deviation() {
        let mut d = WinDistribution::default();
        d.probs.insert(TeamId(1), 0.5);
        d.probs.insert(TeamId(2), 0.4);
        let dev = d.normalization_error(1e-9).unwrap();
        assert_relative_eq!(dev, 0.1, epsilon = 1e-12);
    }
}
