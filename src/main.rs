use anyhow::Result;
use clap::Parser;
use tracing::info;

mod bracket;
mod config;
mod data;
mod report;

use bracket::{build_single_elimination, simulate, Evaluator};
use config::{Config, OutputFormat};
use report::Report;

fn main() -> Result<()> {
    // Initialise tracing / logging. Logs go to stderr so the report on stdout
    // stays machine-readable.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = Config::parse();
    config.validate()?;

    let registry = data::load_teams(&config.teams)?;
    let table = data::load_predictions(&config.predictions, config.season)?;
    let pairings = data::load_pairings(&config.bracket)?;

    // Every drawn team must be a known entrant before anything is built.
    for &(team1, team2) in &pairings {
        registry.get(team1)?;
        registry.get(team2)?;
    }

    let layout = build_single_elimination(&pairings)?;
    info!(
        "Bracket: {} teams over {} rounds (tie-break: {:?})",
        layout.bracket.teams(layout.root()?)?.len(),
        layout.rounds.len(),
        config.tie_break
    );

    let mut evaluator = Evaluator::new(&layout.bracket, &table, config.tie_break, config.tolerance);
    evaluator.evaluate_all()?;
    info!("Evaluated {} matchups", evaluator.evaluated_count());
    let mut report = Report::build(&layout, &mut evaluator, &registry)?;

    if let Some(fav) = report.champion.first() {
        info!("Title favourite: {} ({:.1}%)", fav.name, fav.probability * 100.0);
    }

    if config.simulations > 0 {
        let sampled = simulate(&layout.bracket, &table, config.simulations, config.seed)?;
        report.attach_simulation(&sampled, config.simulations, config.seed, &registry);
        if let Some(sim) = &report.simulation {
            info!(
                "Simulated {} tournaments: max deviation from exact odds {:.3}%",
                sim.runs,
                sim.max_abs_deviation * 100.0
            );
        }
    }

    match config.format {
        OutputFormat::Text => print!("{}", report.to_text()?),
        OutputFormat::Json => println!("{}", report.to_json()?),
    }

    Ok(())
}
