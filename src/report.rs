//! Round-by-round summary of an evaluated bracket, rendered as text or JSON.

use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt::{self, Write};

use crate::bracket::error::Result;
use crate::bracket::{BracketLayout, Evaluator, NodeId, TeamId, TeamRegistry, WinDistribution};

#[derive(Debug, Clone, Serialize)]
pub struct TeamOdds {
    pub id: TeamId,
    pub name: String,
    pub probability: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct GameSummary {
    pub node: NodeId,
    pub favourites: (String, String),
    pub winner: String,
    pub win_probability: f64,
    pub deterministic_win_probability: f64,
    pub distribution: Vec<TeamOdds>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RoundSummary {
    pub round: usize,
    pub label: String,
    pub games: Vec<GameSummary>,
}

/// Probability of each team winning its game in every round.
#[derive(Debug, Clone, Serialize)]
pub struct AdvancementRow {
    pub id: TeamId,
    pub name: String,
    pub rounds: Vec<f64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SimulationSummary {
    pub runs: u64,
    pub seed: u64,
    /// Largest gap between simulated and analytic champion probability.
    pub max_abs_deviation: f64,
    pub champion: Vec<TeamOdds>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub champion: Vec<TeamOdds>,
    pub rounds: Vec<RoundSummary>,
    pub advancement: Vec<AdvancementRow>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub simulation: Option<SimulationSummary>,
}

/// Column label for a round: the size of the field it is played by,
/// with the last round called the final.
fn round_label(games: usize, is_last: bool) -> String {
    if is_last {
        "Final".to_string()
    } else {
        format!("R{}", games * 2)
    }
}

fn odds(dist: &WinDistribution, registry: &TeamRegistry) -> Vec<TeamOdds> {
    dist.ranked()
        .into_iter()
        .map(|(id, probability)| TeamOdds {
            id,
            name: registry.name_of(id),
            probability,
        })
        .collect()
}

impl Report {
    pub fn build(
        layout: &BracketLayout,
        evaluator: &mut Evaluator<'_>,
        registry: &TeamRegistry,
    ) -> Result<Self> {
        let n_rounds = layout.rounds.len();
        let mut table: BTreeMap<TeamId, Vec<f64>> = BTreeMap::new();
        let mut rounds = Vec::with_capacity(n_rounds);

        for (r, nodes) in layout.rounds.iter().enumerate() {
            let mut games = Vec::with_capacity(nodes.len());
            for &node in nodes {
                let out = evaluator.outcome(node)?;
                for (team, p) in out.distribution.iter() {
                    table.entry(team).or_insert_with(|| vec![0.0; n_rounds])[r] = p;
                }
                games.push(GameSummary {
                    node: out.node,
                    favourites: (
                        registry.name_of(out.favourites.0),
                        registry.name_of(out.favourites.1),
                    ),
                    winner: registry.name_of(out.winner),
                    win_probability: out.win_probability,
                    deterministic_win_probability: out.deterministic_win_probability,
                    distribution: odds(&out.distribution, registry),
                });
            }
            rounds.push(RoundSummary {
                round: r + 1,
                label: round_label(nodes.len(), r + 1 == n_rounds),
                games,
            });
        }

        let mut advancement: Vec<AdvancementRow> = table
            .into_iter()
            .map(|(id, rounds)| AdvancementRow {
                id,
                name: registry.name_of(id),
                rounds,
            })
            .collect();
        advancement.sort_by(|a, b| {
            let last = |row: &AdvancementRow| row.rounds.last().copied().unwrap_or(0.0);
            last(b).total_cmp(&last(a)).then(a.id.cmp(&b.id))
        });

        let root = layout.root()?;
        let champion = odds(&evaluator.outcome(root)?.distribution, registry);

        Ok(Report {
            champion,
            rounds,
            advancement,
            simulation: None,
        })
    }

    /// Attach a Monte Carlo champion distribution for comparison.
    pub fn attach_simulation(
        &mut self,
        sampled: &WinDistribution,
        runs: u64,
        seed: u64,
        registry: &TeamRegistry,
    ) {
        let max_abs_deviation = self
            .champion
            .iter()
            .map(|t| (t.probability - sampled.get(t.id)).abs())
            .fold(0.0, f64::max);
        self.simulation = Some(SimulationSummary {
            runs,
            seed,
            max_abs_deviation,
            champion: odds(sampled, registry),
        });
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    pub fn to_text(&self) -> std::result::Result<String, fmt::Error> {
        let mut out = String::new();
        let name_width = self
            .advancement
            .iter()
            .map(|r| r.name.len())
            .max()
            .unwrap_or(4)
            .max(4);

        writeln!(out, "Round-by-round win probability")?;
        write!(out, "{:<width$}", "Team", width = name_width)?;
        for round in &self.rounds {
            write!(out, " {:>7}", round.label)?;
        }
        writeln!(out)?;
        for row in &self.advancement {
            write!(out, "{:<width$}", row.name, width = name_width)?;
            for p in &row.rounds {
                write!(out, " {:>6.1}%", p * 100.0)?;
            }
            writeln!(out)?;
        }

        writeln!(out)?;
        writeln!(out, "Deterministic bracket")?;
        for round in &self.rounds {
            writeln!(out, "{}", round.label)?;
            for g in &round.games {
                writeln!(
                    out,
                    "  {:<5} {} vs {} -> {} ({:.1}%)",
                    g.node.to_string(),
                    g.favourites.0,
                    g.favourites.1,
                    g.winner,
                    g.win_probability * 100.0
                )?;
            }
        }

        if let Some(sim) = &self.simulation {
            writeln!(out)?;
            writeln!(
                out,
                "Simulation: {} runs (seed {}), max deviation from exact odds {:.2}%",
                sim.runs,
                sim.seed,
                sim.max_abs_deviation * 100.0
            )?;
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bracket::{build_single_elimination, ProbabilityTable, Team, TieBreak};
    use approx::assert_relative_eq;

    fn fixture() -> (BracketLayout, ProbabilityTable, TeamRegistry) {
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
        let registry = TeamRegistry::from_teams(vec![
            Team::new(TeamId(1), "Alpha"),
            Team::new(TeamId(2), "Bravo"),
            Team::new(TeamId(3), "Charlie"),
            Team::new(TeamId(4), "Delta"),
        ])
        .unwrap();
        let layout = build_single_elimination(&[
            (TeamId(1), TeamId(2)),
            (TeamId(3), TeamId(4)),
        ])
        .unwrap();
        (layout, t, registry)
    }

    #[test]
    fn advancement_rows_cover_every_round() {
        let (layout, t, registry) = fixture();
        let mut ev = Evaluator::new(&layout.bracket, &t, TieBreak::default(), 1e-9);
        let report = Report::build(&layout, &mut ev, &registry).unwrap();

        assert_eq!(report.rounds.len(), 2);
        assert_eq!(report.rounds[0].label, "R4");
        assert_eq!(report.rounds[1].label, "Final");
        assert_eq!(report.advancement.len(), 4);

        // Each round's column sums to the number of games played in it.
        for (r, round) in report.rounds.iter().enumerate() {
            let col: f64 = report.advancement.iter().map(|row| row.rounds[r]).sum();
            assert_relative_eq!(col, round.games.len() as f64, epsilon = 1e-9);
        }

        // Sorted by title odds: Charlie 0.392 > Alpha 0.342 > Bravo > Delta
        let order: Vec<&str> = report.advancement.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(order, vec!["Charlie", "Alpha", "Bravo", "Delta"]);
        assert_eq!(report.champion[0].name, "Charlie");
        assert_relative_eq!(report.champion[0].probability, 0.392, epsilon = 1e-12);

        let final_game = &report.rounds[1].games[0];
        assert_eq!(final_game.favourites, ("Alpha".to_string(), "Charlie".to_string()));
        assert_eq!(final_game.winner, "Alpha");
    }

    #[test]
    fn text_and_json_render() {
        let (layout, t, registry) = fixture();
        let mut ev = Evaluator::new(&layout.bracket, &t, TieBreak::default(), 1e-9);
        let mut report = Report::build(&layout, &mut ev, &registry).unwrap();
        let exact = ev.outcome(layout.root().unwrap()).unwrap().distribution.clone();
        report.attach_simulation(&exact, 10, 3, &registry);
        assert_eq!(report.simulation.as_ref().unwrap().max_abs_deviation, 0.0);

        let text = report.to_text().unwrap();
        assert!(text.contains("Charlie"));
        assert!(text.contains("39.2%"));
        assert!(text.contains("Alpha vs Charlie -> Alpha (55.0%)"));

        let json: serde_json::Value = serde_json::from_str(&report.to_json().unwrap()).unwrap();
        assert_eq!(json["champion"][0]["id"], 3);
        assert_eq!(json["rounds"][1]["games"][0]["winner"], "Alpha");
        assert_eq!(json["simulation"]["runs"], 10);
    }
}
