use thiserror::Error;

use super::node::NodeId;
use super::team::TeamId;

/// Failures raised while building or evaluating a bracket.
///
/// None of these are retried or defaulted: a failure anywhere in a subtree
/// aborts evaluation of every ancestor that depends on it.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum BracketError {
    #[error("no win probability recorded for teams {team1} and {team2}")]
    MissingProbability { team1: TeamId, team2: TeamId },

    #[error("{count} win probability records for teams {team1} and {team2}, expected exactly one")]
    AmbiguousProbability {
        team1: TeamId,
        team2: TeamId,
        count: usize,
    },

    #[error("win probability {value} for teams {team1} and {team2} is outside [0, 1]")]
    InvalidProbability {
        team1: TeamId,
        team2: TeamId,
        value: f64,
    },

    #[error("team {0} cannot play against itself")]
    SameTeam(TeamId),

    #[error("team {0} is not in the registry")]
    UnknownTeam(TeamId),

    #[error("node {0} does not exist in this bracket")]
    UnknownNode(NodeId),

    #[error("node {0} already feeds another matchup")]
    NodeAlreadyUsed(NodeId),

    #[error("team {team} appears on both sides of node {node}")]
    OverlappingTeams { node: NodeId, team: TeamId },

    #[error("malformed bracket: {0}")]
    Structural(String),
}

pub type Result<T> = std::result::Result<T, BracketError>;
