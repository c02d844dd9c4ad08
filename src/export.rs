//! Flat tabular exports consumed by the dashboard. One row per team (or per
//! fixture); nothing binary.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;

use crate::state::{MatchResult, SimulationReport, TeamRatings};

#[derive(Debug, Serialize)]
struct RatingRow<'a> {
    #[serde(rename = "Team")]
    team: &'a str,
    #[serde(rename = "Bat_Rating")]
    batting: f64,
    #[serde(rename = "Bowl_Rating")]
    bowling: f64,
}

#[derive(Debug, Serialize)]
struct StandingRow<'a> {
    #[serde(rename = "Team")]
    team: &'a str,
    #[serde(rename = "Win_Probability")]
    win_probability: f64,
    #[serde(rename = "Qualification_Probability")]
    qualification_probability: f64,
    #[serde(rename = "Titles_Won")]
    titles: u64,
    #[serde(rename = "Playoff_Appearances")]
    playoff_appearances: u64,
    #[serde(rename = "Group_Wins")]
    group_wins: u64,
}

#[derive(Debug, Serialize)]
struct PredictionRow<'a> {
    #[serde(rename = "Match_ID")]
    fixture_id: u32,
    #[serde(rename = "Team1")]
    team_a: &'a str,
    #[serde(rename = "Team2")]
    team_b: &'a str,
    #[serde(rename = "Venue")]
    venue: &'a str,
    #[serde(rename = "Sampled_Winner")]
    winner: &'a str,
    #[serde(rename = "Team1_Win_Prob")]
    p_a: f64,
    #[serde(rename = "Team2_Win_Prob")]
    p_b: f64,
    #[serde(rename = "Rating_Gap_Shift")]
    rating_gap: f64,
    #[serde(rename = "Venue_Shift")]
    venue_shift: f64,
    #[serde(rename = "Toss_Shift")]
    toss_shift: f64,
}

pub fn write_ratings_csv(path: &Path, ratings: &[TeamRatings]) -> Result<()> {
    let mut writer =
        csv::Writer::from_path(path).with_context(|| format!("create {}", path.display()))?;
    for r in ratings {
        writer.serialize(RatingRow {
            team: &r.team,
            batting: r.batting,
            bowling: r.bowling,
        })?;
    }
    writer.flush().with_context(|| format!("flush {}", path.display()))?;
    Ok(())
}

pub fn write_standings_csv(path: &Path, report: &SimulationReport) -> Result<()> {
    let mut writer =
        csv::Writer::from_path(path).with_context(|| format!("create {}", path.display()))?;
    for s in &report.standings {
        writer.serialize(StandingRow {
            team: &s.team,
            win_probability: s.win_probability,
            qualification_probability: s.qualification_probability,
            titles: s.titles,
            playoff_appearances: s.playoff_appearances,
            group_wins: s.group_wins,
        })?;
    }
    writer.flush().with_context(|| format!("flush {}", path.display()))?;
    Ok(())
}

pub fn write_predictions_csv(path: &Path, results: &[MatchResult]) -> Result<()> {
    let mut writer =
        csv::Writer::from_path(path).with_context(|| format!("create {}", path.display()))?;
    for m in results {
        writer.serialize(PredictionRow {
            fixture_id: m.fixture_id,
            team_a: &m.team_a,
            team_b: &m.team_b,
            venue: &m.venue,
            winner: &m.winner,
            p_a: m.p_a,
            p_b: m.p_b,
            rating_gap: m.factors.rating_gap,
            venue_shift: m.factors.venue_shift,
            toss_shift: m.factors.toss_shift,
        })?;
    }
    writer.flush().with_context(|| format!("flush {}", path.display()))?;
    Ok(())
}

/// Full run report (standings, sample predictions, crucial fixture) as one
/// JSON document, written atomically via a temp file.
pub fn write_report_json(path: &Path, report: &SimulationReport) -> Result<()> {
    if let Some(parent) = path.parent() {
        let _ = fs::create_dir_all(parent);
    }
    let tmp = path.with_extension("json.tmp");
    let json = serde_json::to_string_pretty(report).context("serialize simulation report")?;
    fs::write(&tmp, json).with_context(|| format!("write {}", tmp.display()))?;
    fs::rename(&tmp, path).with_context(|| format!("swap {}", path.display()))?;
    Ok(())
}
