use serde::Serialize;
use std::collections::HashMap;
use std::fmt;

use super::error::{BracketError, Result};

/// Stable integer identifier of a tournament entrant.
///
/// The ordering on ids is the canonical tie-break used by the pairwise
/// probability table (lower id first).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct TeamId(pub u32);

impl fmt::Display for TeamId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A tournament entrant. The engine keys everything by `TeamId`; the name is
/// carried for display.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Team {
    pub id: TeamId,
    pub name: String,
}

impl Team {
    pub fn new(id: TeamId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }
}

/// id → team lookup, supplied once before the bracket is assembled.
#[derive(Debug, Clone, Default)]
pub struct TeamRegistry {
    teams: HashMap<TeamId, Team>,
}

impl TeamRegistry {
    /// Build a registry, rejecting repeated ids.
    pub fn from_teams(teams: impl IntoIterator<Item = Team>) -> Result<Self> {
        let mut map = HashMap::new();
        for team in teams {
            let id = team.id;
            if map.insert(id, team).is_some() {
                return Err(BracketError::Structural(format!(
                    "team {} listed more than once in the registry",
                    id
                )));
            }
        }
        Ok(Self { teams: map })
    }

    /// Look up a team by id. Exactly one entry must exist.
    pub fn get(&self, id: TeamId) -> Result<&Team> {
        self.teams.get(&id).ok_or(BracketError::UnknownTeam(id))
    }

    /// Display name for `id`, falling back to the bare id for unknown teams.
    pub fn name_of(&self, id: TeamId) -> String {
        self.teams
            .get(&id)
            .map(|t| t.name.clone())
            .unwrap_or_else(|| id.to_string())
    }

    pub fn len(&self) -> usize {
        self.teams.len()
    }
}
