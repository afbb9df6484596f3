use tracing::debug;

use super::error::{BracketError, Result};
use super::node::{Bracket, NodeId};
use super::team::TeamId;

/// A built bracket together with the matchups that make up each round.
///
/// `rounds[0]` holds the first games in draw order; the last round holds only
/// the championship matchup.
#[derive(Debug, Clone)]
pub struct BracketLayout {
    pub bracket: Bracket,
    pub rounds: Vec<Vec<NodeId>>,
}

impl BracketLayout {
    pub fn root(&self) -> Result<NodeId> {
        self.bracket.root()
    }
}

/// Assemble a single-elimination bracket from first-round pairings.
///
/// Pairings must be listed in draw order: the winners of games `2k` and
/// `2k + 1` meet in the next round, and so on up to the final. The number of
/// pairings must be a power of two.
pub fn build_single_elimination(pairings: &[(TeamId, TeamId)]) -> Result<BracketLayout> {
    if pairings.is_empty() {
        return Err(BracketError::Structural("no first-round pairings".into()));
    }
    if !pairings.len().is_power_of_two() {
        return Err(BracketError::Structural(format!(
            "{} first-round games cannot be paired down to a single final",
            pairings.len()
        )));
    }

    let mut bracket = Bracket::new();
    let mut current = Vec::with_capacity(pairings.len());
    for &(team1, team2) in pairings {
        current.push(bracket.add_game(team1, team2)?);
    }

    let mut rounds = vec![current];
    while let Some(prev) = rounds.last().filter(|r| r.len() > 1) {
        let next = prev
            .chunks(2)
            .map(|pair| bracket.add_hypothetical(pair[0], pair[1]))
            .collect::<Result<Vec<_>>>()?;
        rounds.push(next);
    }

    debug!(
        "Built bracket: {} teams, {} rounds, {} matchups",
        pairings.len() * 2,
        rounds.len(),
        bracket.len()
    );
    Ok(BracketLayout { bracket, rounds })
}
