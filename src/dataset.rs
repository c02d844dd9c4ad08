//! Loaders for the flat tables the scraping/schedule collaborators produce.
//! Column names follow those files; blank numeric cells load as 0.0 and are
//! filtered out downstream by the rating rules.

use std::collections::HashMap;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::state::{Fixture, Player, Role, Stage, Venue};

#[derive(Debug, Deserialize)]
struct PlayerRow {
    team: String,
    player: String,
    role: String,
    #[serde(default)]
    bat_avg_first: Option<f64>,
    #[serde(default)]
    bat_sr_first: Option<f64>,
    #[serde(default)]
    bowl_econ_first: Option<f64>,
    #[serde(default)]
    bowl_avg_first: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct VenueRow {
    venue: String,
    avg_first_innings_score: f64,
    win_percent_bat_first: f64,
    run_rate: f64,
}

#[derive(Debug, Deserialize)]
struct ScheduleRow {
    #[serde(rename = "Match_ID")]
    match_id: u32,
    #[serde(rename = "Team1", default)]
    team1: String,
    #[serde(rename = "Team2", default)]
    team2: String,
    #[serde(rename = "Venue")]
    venue: String,
    #[serde(rename = "Stage")]
    stage: String,
}

#[derive(Debug, Deserialize)]
struct TeamRow {
    #[serde(rename = "Team")]
    team: String,
    #[serde(rename = "Home_Venue")]
    home_venue: String,
}

pub fn load_players(path: &Path) -> Result<Vec<Player>> {
    let mut reader = csv::Reader::from_path(path)
        .with_context(|| format!("open player table {}", path.display()))?;
    let mut players = Vec::new();
    for row in reader.deserialize::<PlayerRow>() {
        let row = row.with_context(|| format!("parse player row in {}", path.display()))?;
        // Rows with unrecognized roles carry no usable signal; skip them.
        let Some(role) = parse_role(&row.role) else {
            continue;
        };
        players.push(Player {
            name: row.player,
            team: row.team,
            role,
            bat_avg: row.bat_avg_first.unwrap_or(0.0),
            bat_strike_rate: row.bat_sr_first.unwrap_or(0.0),
            bowl_economy: row.bowl_econ_first.unwrap_or(0.0),
            bowl_avg: row.bowl_avg_first.unwrap_or(0.0),
        });
    }
    Ok(players)
}

pub fn load_venues(path: &Path) -> Result<HashMap<String, Venue>> {
    let mut reader = csv::Reader::from_path(path)
        .with_context(|| format!("open venue table {}", path.display()))?;
    let mut venues = HashMap::new();
    for row in reader.deserialize::<VenueRow>() {
        let row = row.with_context(|| format!("parse venue row in {}", path.display()))?;
        let venue = Venue::new(
            row.venue,
            row.avg_first_innings_score,
            row.win_percent_bat_first,
            row.run_rate,
        );
        venues.insert(venue.name.clone(), venue);
    }
    Ok(venues)
}

pub fn load_schedule(path: &Path) -> Result<Vec<Fixture>> {
    let mut reader = csv::Reader::from_path(path)
        .with_context(|| format!("open schedule {}", path.display()))?;
    let mut fixtures = Vec::new();
    for row in reader.deserialize::<ScheduleRow>() {
        let row = row.with_context(|| format!("parse schedule row in {}", path.display()))?;
        let stage = parse_stage(&row.stage)
            .with_context(|| format!("fixture {}: unknown stage {:?}", row.match_id, row.stage))?;
        fixtures.push(Fixture {
            id: row.match_id,
            team_a: row.team1,
            team_b: row.team2,
            venue: row.venue,
            stage,
        });
    }
    Ok(fixtures)
}

/// Team -> historical run rate, taken from each team's home venue. Teams
/// without a resolvable home venue are simply absent; the rating engine
/// falls back to its configured default.
pub fn load_home_run_rates(
    path: &Path,
    venues: &HashMap<String, Venue>,
) -> Result<HashMap<String, f64>> {
    let mut reader = csv::Reader::from_path(path)
        .with_context(|| format!("open team table {}", path.display()))?;
    let mut rates = HashMap::new();
    for row in reader.deserialize::<TeamRow>() {
        let row = row.with_context(|| format!("parse team row in {}", path.display()))?;
        if let Some(venue) = venues.get(&row.home_venue) {
            rates.insert(row.team, venue.run_rate);
        }
    }
    Ok(rates)
}

fn parse_role(raw: &str) -> Option<Role> {
    let s = raw.trim().to_lowercase();
    if s.contains("all") {
        return Some(Role::AllRounder);
    }
    if s.contains("bowl") {
        return Some(Role::Bowler);
    }
    if s.contains("bat") || s.contains("keeper") {
        return Some(Role::Batter);
    }
    None
}

fn parse_stage(raw: &str) -> Option<Stage> {
    let s = raw.trim().to_lowercase();
    match s.as_str() {
        "group" | "league" => Some(Stage::Group),
        "playoff" | "eliminator" | "semi-final" | "semifinal" => Some(Stage::Playoff),
        "final" => Some(Stage::Final),
        _ => None,
    }
}
