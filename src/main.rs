use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use hundred_sim::dataset;
use hundred_sim::export;
use hundred_sim::params::{self, SimParams};
use hundred_sim::team_ratings::{compute_team_ratings, ratings_map};
use hundred_sim::tournament;

/// Pipeline driver: load the scraped tables, derive team ratings, run the
/// Monte Carlo replays, print a summary, and write the flat exports.
fn main() -> Result<()> {
    let data_dir = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("data"));

    let mut params = load_sim_params(&data_dir)?;
    if let Some(iterations) = env_usize("SIM_ITERATIONS") {
        params.iterations = iterations;
    }
    if let Some(seed) = env_u64("SIM_SEED") {
        params.base_seed = seed;
    }

    let venues = dataset::load_venues(&data_dir.join("venue_stats.csv"))?;
    let players = dataset::load_players(&data_dir.join("player_stats.csv"))?;
    let schedule = dataset::load_schedule(&data_dir.join("schedule.csv"))?;
    let home_rates = dataset::load_home_run_rates(&data_dir.join("teams.csv"), &venues)?;
    println!(
        "Loaded {} players, {} venues, {} fixtures",
        players.len(),
        venues.len(),
        schedule.len()
    );

    let ratings = compute_team_ratings(&players, &home_rates, &params.model)
        .context("compute team ratings")?;
    println!("\nTeam ratings:");
    for r in &ratings {
        println!("  {:<28} bat {:6.1}  bowl {:6.1}", r.team, r.batting, r.bowling);
    }

    println!(
        "\nSimulating {} tournament replays (seed {})...",
        params.iterations, params.base_seed
    );
    let ratings_by_team = ratings_map(ratings.clone());
    let report = tournament::simulate(&schedule, &ratings_by_team, &venues, &params, None)
        .context("run tournament simulation")?;

    println!("\nAggregate standings:");
    for s in &report.standings {
        println!(
            "  {:<28} title {:5.1}%  playoffs {:5.1}%",
            s.team,
            s.win_probability * 100.0,
            s.qualification_probability * 100.0
        );
    }
    if let Some(crucial) = &report.most_crucial {
        println!(
            "\nMost crucial fixture: #{} {} vs {} at {} (on the line in {:.1}% of replays)",
            crucial.fixture_id,
            crucial.team_a,
            crucial.team_b,
            crucial.venue,
            crucial.swing_share * 100.0
        );
    }

    let out_dir = data_dir.join("outputs");
    fs::create_dir_all(&out_dir).with_context(|| format!("create {}", out_dir.display()))?;
    export::write_ratings_csv(&out_dir.join("team_ratings.csv"), &ratings)?;
    export::write_standings_csv(&out_dir.join("tournament_analysis.csv"), &report)?;
    export::write_predictions_csv(
        &out_dir.join("tournament_predictions.csv"),
        &report.sample_results,
    )?;
    export::write_report_json(&out_dir.join("simulation_report.json"), &report)?;
    println!("\nExports written to {}", out_dir.display());

    Ok(())
}

fn load_sim_params(data_dir: &Path) -> Result<SimParams> {
    let path = data_dir.join("params.json");
    if path.exists() {
        params::load_params(&path)
    } else {
        Ok(SimParams::default())
    }
}

fn env_usize(key: &str) -> Option<usize> {
    std::env::var(key).ok().and_then(|v| v.parse().ok())
}

fn env_u64(key: &str) -> Option<u64> {
    std::env::var(key).ok().and_then(|v| v.parse().ok())
}
