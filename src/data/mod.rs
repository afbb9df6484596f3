//! CSV inputs: team registry, pairwise predictions and the first-round draw.

use anyhow::{bail, Context, Result};
use std::fs::File;
use std::io::Read;
use tracing::{debug, info, warn};

use crate::bracket::{ProbabilityTable, Team, TeamId, TeamRegistry};

pub mod models;
use models::*;

fn open(path: &str) -> Result<File> {
    File::open(path).with_context(|| format!("failed to open {}", path))
}

/// Load the id → name registry.
pub fn load_teams(path: &str) -> Result<TeamRegistry> {
    let registry = read_teams(open(path)?).with_context(|| format!("reading teams from {}", path))?;
    info!("Loaded {} teams from {}", registry.len(), path);
    Ok(registry)
}

pub fn read_teams<R: Read>(reader: R) -> Result<TeamRegistry> {
    let mut rdr = csv::Reader::from_reader(reader);
    let mut teams = Vec::new();
    for row in rdr.deserialize::<TeamRecord>() {
        let rec = row?;
        teams.push(Team::new(TeamId(rec.team_id), rec.team_name.trim()));
    }
    Ok(TeamRegistry::from_teams(teams)?)
}

/// Load the pairwise table, keeping only rows for `season`.
pub fn load_predictions(path: &str, season: u32) -> Result<ProbabilityTable> {
    let table = read_predictions(open(path)?, season)
        .with_context(|| format!("reading predictions from {}", path))?;
    info!(
        "Loaded {} matchup probabilities for season {} from {}",
        table.len(),
        season,
        path
    );
    Ok(table)
}

pub fn read_predictions<R: Read>(reader: R, season: u32) -> Result<ProbabilityTable> {
    let mut rdr = csv::Reader::from_reader(reader);
    let mut table = ProbabilityTable::new();
    let mut skipped = 0usize;
    for (i, row) in rdr.deserialize::<PredictionRecord>().enumerate() {
        let rec = row?;
        let key = parse_matchup_id(&rec.id).with_context(|| format!("row {}", i + 1))?;
        if key.season != season {
            skipped += 1;
            continue;
        }
        table
            .insert(TeamId(key.low), TeamId(key.high), rec.pred)
            .with_context(|| format!("row {} ({})", i + 1, rec.id))?;
    }
    if skipped > 0 {
        debug!("Skipped {} prediction rows from other seasons", skipped);
    }
    let dups = table.duplicate_pairs();
    if !dups.is_empty() {
        warn!(
            "{} matchup(s) have more than one prediction row and cannot be queried (first: {}_{})",
            dups.len(),
            dups[0].0,
            dups[0].1
        );
    }
    Ok(table)
}

/// Split `{season}_{lowId}_{highId}` into its parts.
pub fn parse_matchup_id(id: &str) -> Result<MatchupKey> {
    let parts: Vec<&str> = id.trim().split('_').collect();
    if parts.len() != 3 {
        bail!("matchup id '{}' is not of the form SEASON_TEAM1_TEAM2", id);
    }
    let num = |s: &str| -> Result<u32> {
        s.parse::<u32>()
            .with_context(|| format!("matchup id '{}' has non-numeric part '{}'", id, s))
    };
    Ok(MatchupKey {
        season: num(parts[0])?,
        low: num(parts[1])?,
        high: num(parts[2])?,
    })
}

/// Load first-round pairings in draw order.
pub fn load_pairings(path: &str) -> Result<Vec<(TeamId, TeamId)>> {
    let pairings = read_pairings(open(path)?).with_context(|| format!("reading bracket from {}", path))?;
    info!("Loaded {} first-round games from {}", pairings.len(), path);
    Ok(pairings)
}

pub fn read_pairings<R: Read>(reader: R) -> Result<Vec<(TeamId, TeamId)>> {
    let mut rdr = csv::Reader::from_reader(reader);
    let mut pairings = Vec::new();
    for row in rdr.deserialize::<PairingRecord>() {
        let rec = row?;
        pairings.push((TeamId(rec.team1_id), TeamId(rec.team2_id)));
    }
    Ok(pairings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bracket::{BracketError, PairwiseOracle};
    use approx::assert_relative_eq;

    #[test]
    fn teams_ignore_extra_columns() {
        let csv = "TeamID,TeamName,FirstD1Season,LastD1Season\n\
                   1101,Abilene Chr,2014,2025\n\
                   1102,Air Force,1985,2025\n";
        let reg = read_teams(csv.as_bytes()).unwrap();
        assert_eq!(reg.len(), 2);
        assert_eq!(reg.get(TeamId(1102)).unwrap().name, "Air Force");
    }

    #[test]
    fn duplicate_team_ids_fail_to_load() {
        let csv = "TeamID,TeamName\n1,A\n1,B\n";
        assert!(read_teams(csv.as_bytes()).is_err());
    }

    #[test]
    fn predictions_filter_by_season() {
        let csv = "ID,Pred\n\
                   2025_1101_1102,0.62\n\
                   2024_1101_1102,0.10\n\
                   2025_1101_1103,0.40\n";
        let t = read_predictions(csv.as_bytes(), 2025).unwrap();
        assert_eq!(t.len(), 2);
        assert_relative_eq!(t.win_probability(TeamId(1101), TeamId(1102)).unwrap(), 0.62);
        assert_relative_eq!(
            t.win_probability(TeamId(1103), TeamId(1101)).unwrap(),
            0.6,
            epsilon = 1e-12
        );
    }

    #[test]
    fn duplicate_prediction_rows_load_but_do_not_resolve() {
        let csv = "ID,Pred\n2025_1_2,0.6\n2025_1_2,0.7\n";
        let t = read_predictions(csv.as_bytes(), 2025).unwrap();
        assert!(matches!(
            t.win_probability(TeamId(1), TeamId(2)),
            Err(BracketError::AmbiguousProbability { count: 2, .. })
        ));
    }

    #[test]
    fn predictions_must_be_canonical_and_in_range() {
        let reversed = "ID,Pred\n2025_5_2,0.6\n";
        assert!(read_predictions(reversed.as_bytes(), 2025).is_err());
        let out_of_range = "ID,Pred\n2025_2_5,1.5\n";
        assert!(read_predictions(out_of_range.as_bytes(), 2025).is_err());
    }

    #[test]
    fn matchup_id_parsing() {
        assert_eq!(
            parse_matchup_id("2025_1101_1458").unwrap(),
            MatchupKey {
                season: 2025,
                low: 1101,
                high: 1458
            }
        );
        assert!(parse_matchup_id("2025_1101").is_err());
        assert!(parse_matchup_id("2025_abc_1458").is_err());
    }

    #[test]
    fn demo_inputs_evaluate_end_to_end() {
        use crate::bracket::{build_single_elimination, Evaluator, TieBreak};

        let dir = concat!(env!("CARGO_MANIFEST_DIR"), "/demos");
        let registry = load_teams(&format!("{}/teams.csv", dir)).unwrap();
        let table = load_predictions(&format!("{}/predictions.csv", dir), 2025).unwrap();
        let pairings = load_pairings(&format!("{}/bracket.csv", dir)).unwrap();
        assert_eq!(registry.len(), 8);
        assert_eq!(table.len(), 28);

        let layout = build_single_elimination(&pairings).unwrap();
        let mut ev = Evaluator::new(&layout.bracket, &table, TieBreak::default(), 1e-9);
        let root = ev.outcome(layout.root().unwrap()).unwrap();
        assert_relative_eq!(root.distribution.total(), 1.0, epsilon = 1e-9);
        assert_eq!(root.distribution.len(), 8);
        let (fav, _) = root.distribution.ranked()[0];
        assert_eq!(registry.get(fav).unwrap().name, "Duke");
    }

    #[test]
    fn pairings_keep_draw_order() {
        let csv = "Team1ID,Team2ID\n1,16\n8,9\n5,12\n4,13\n";
        let p = read_pairings(csv.as_bytes()).unwrap();
        assert_eq!(
            p,
            vec![
                (TeamId(1), TeamId(16)),
                (TeamId(8), TeamId(9)),
                (TeamId(5), TeamId(12)),
                (TeamId(4), TeamId(13)),
            ]
        );
    }
}
