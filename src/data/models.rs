use serde::Deserialize;

/// Row of a team registry file (`MTeams.csv` / `WTeams.csv` shape).
/// Extra columns such as season ranges are ignored.
#[derive(Debug, Clone, Deserialize)]
pub struct TeamRecord {
    #[serde(rename = "TeamID")]
    pub team_id: u32,
    #[serde(rename = "TeamName")]
    pub team_name: String,
}

/// Row of a submission-style predictions file.
#[derive(Debug, Clone, Deserialize)]
pub struct PredictionRecord {
    /// `{season}_{lowId}_{highId}`
    #[serde(rename = "ID")]
    pub id: String,
    /// Probability that the lower id wins
    #[serde(rename = "Pred")]
    pub pred: f64,
}

/// One first-round game, listed in draw order.
#[derive(Debug, Clone, Deserialize)]
pub struct PairingRecord {
    #[serde(rename = "Team1ID")]
    pub team1_id: u32,
    #[serde(rename = "Team2ID")]
    pub team2_id: u32,
}

/// Parsed form of a prediction ID.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatchupKey {
    pub season: u32,
    pub low: u32,
    pub high: u32,
}
