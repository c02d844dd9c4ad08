use std::collections::HashMap;

use crate::error::ModelError;
use crate::params::ModelParams;
use crate::state::{Player, TeamRatings};

/// How many top performers feed each strength average.
const TOP_PERFORMERS: usize = 5;

/// Derive batting/bowling strengths for every team in the player table.
/// Teams come out in first-seen input order; player rows are never mutated.
pub fn compute_team_ratings(
    players: &[Player],
    home_run_rates: &HashMap<String, f64>,
    params: &ModelParams,
) -> Result<Vec<TeamRatings>, ModelError> {
    let mut order: Vec<&str> = Vec::new();
    for p in players {
        if !order.iter().any(|t| *t == p.team) {
            order.push(&p.team);
        }
    }

    let mut out = Vec::with_capacity(order.len());
    for team in order {
        let roster: Vec<&Player> = players.iter().filter(|p| p.team == team).collect();
        let run_rate = home_run_rates
            .get(team)
            .copied()
            .unwrap_or(params.default_run_rate);
        out.push(TeamRatings {
            team: team.to_string(),
            batting: batting_strength(team, &roster, run_rate)?,
            bowling: bowling_strength(team, &roster)?,
        });
    }
    Ok(out)
}

pub fn ratings_map(ratings: Vec<TeamRatings>) -> HashMap<String, TeamRatings> {
    ratings.into_iter().map(|r| (r.team.clone(), r)).collect()
}

/// AVG(batting average of the top five batters) x (home run rate / 10).
/// Fewer than five usable batters averages over what is there; zero is an
/// error rather than a silent default.
fn batting_strength(team: &str, roster: &[&Player], run_rate: f64) -> Result<f64, ModelError> {
    let mut batters: Vec<&Player> = roster
        .iter()
        .copied()
        .filter(|p| p.role.can_bat() && p.bat_avg > 0.0)
        .collect();
    if batters.is_empty() {
        return Err(ModelError::InsufficientData {
            team: team.to_string(),
            side: "batting",
        });
    }
    // Stable sort: equal averages keep input order, so the top-5 cut is
    // reproducible across runs with identical input ordering.
    batters.sort_by(|a, b| b.bat_avg.total_cmp(&a.bat_avg));
    let top = &batters[..batters.len().min(TOP_PERFORMERS)];
    let avg = top.iter().map(|p| p.bat_avg).sum::<f64>() / top.len() as f64;
    Ok(avg * (run_rate / 10.0))
}

/// (10 - AVG(economy of the five stingiest bowlers)) x 2, floored at zero so
/// an expensive attack cannot go negative.
fn bowling_strength(team: &str, roster: &[&Player]) -> Result<f64, ModelError> {
    let mut bowlers: Vec<&Player> = roster
        .iter()
        .copied()
        .filter(|p| p.role.can_bowl() && p.bowl_economy > 0.0)
        .collect();
    if bowlers.is_empty() {
        return Err(ModelError::InsufficientData {
            team: team.to_string(),
            side: "bowling",
        });
    }
    bowlers.sort_by(|a, b| a.bowl_economy.total_cmp(&b.bowl_economy));
    let top = &bowlers[..bowlers.len().min(TOP_PERFORMERS)];
    let avg = top.iter().map(|p| p.bowl_economy).sum::<f64>() / top.len() as f64;
    Ok(((10.0 - avg) * 2.0).max(0.0))
}
