//! Bracket tree stored as an arena of matchups.
//!
//! A node only ever refers to nodes created before it, so index order is a
//! valid bottom-up (children first) evaluation order.

use serde::Serialize;
use std::collections::BTreeSet;
use std::fmt;

use super::error::{BracketError, Result};
use super::team::TeamId;

/// Index of a matchup inside its [`Bracket`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct NodeId(pub usize);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Matchup {
    /// Scheduled game between two known teams.
    Game { team1: TeamId, team2: TeamId },
    /// Game between the eventual winners of two earlier matchups.
    Hypothetical { child1: NodeId, child2: NodeId },
}

#[derive(Debug, Clone, Default)]
pub struct Bracket {
    nodes: Vec<Matchup>,
    /// Teams that can reach each node.
    teams: Vec<BTreeSet<TeamId>>,
    /// Whether each node already feeds a hypothetical matchup.
    consumed: Vec<bool>,
}

impl Bracket {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_game(&mut self, team1: TeamId, team2: TeamId) -> Result<NodeId> {
        if team1 == team2 {
            return Err(BracketError::SameTeam(team1));
        }
        Ok(self.push(Matchup::Game { team1, team2 }, [team1, team2].into()))
    }

    /// Add a game between the winners of `child1` and `child2`.
    ///
    /// Fails when either child is unknown or already feeds another matchup, or
    /// when a team could reach both children.
    pub fn add_hypothetical(&mut self, child1: NodeId, child2: NodeId) -> Result<NodeId> {
        for child in [child1, child2] {
            if child.0 >= self.nodes.len() {
                return Err(BracketError::UnknownNode(child));
            }
            if self.consumed[child.0] {
                return Err(BracketError::NodeAlreadyUsed(child));
            }
        }
        if child1 == child2 {
            return Err(BracketError::NodeAlreadyUsed(child1));
        }

        let left = &self.teams[child1.0];
        let right = &self.teams[child2.0];
        if let Some(&team) = left.intersection(right).next() {
            return Err(BracketError::OverlappingTeams {
                node: NodeId(self.nodes.len()),
                team,
            });
        }
        let teams: BTreeSet<TeamId> = left.union(right).copied().collect();

        self.consumed[child1.0] = true;
        self.consumed[child2.0] = true;
        Ok(self.push(Matchup::Hypothetical { child1, child2 }, teams))
    }

    fn push(&mut self, matchup: Matchup, teams: BTreeSet<TeamId>) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(matchup);
        self.teams.push(teams);
        self.consumed.push(false);
        id
    }

    pub fn get(&self, id: NodeId) -> Result<&Matchup> {
        self.nodes.get(id.0).ok_or(BracketError::UnknownNode(id))
    }

    /// Every team that could win `id`.
    pub fn teams(&self, id: NodeId) -> Result<&BTreeSet<TeamId>> {
        self.teams.get(id.0).ok_or(BracketError::UnknownNode(id))
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// The single matchup that feeds nothing else.
    pub fn root(&self) -> Result<NodeId> {
        let mut open = self
            .consumed
            .iter()
            .enumerate()
            .filter(|(_, used)| !**used)
            .map(|(i, _)| NodeId(i));
        match (open.next(), open.next()) {
            (Some(root), None) => Ok(root),
            (None, _) => Err(BracketError::Structural("bracket has no matchups".into())),
            (Some(_), Some(_)) => Err(BracketError::Structural(format!(
                "bracket has {} disconnected final matchups",
                self.consumed.iter().filter(|used| !**used).count()
            ))),
        }
    }
}
