use std::collections::HashMap;

use crate::error::ModelError;
use crate::params::ModelParams;
use crate::state::{FactorBreakdown, Fixture, TeamRatings, TossOutcome, Venue};

#[derive(Debug, Clone, Copy)]
pub struct WinProb {
    pub p_a: f64,
    pub p_b: f64,
    pub factors: FactorBreakdown,
}

/// Single-match win probability for team A against team B.
///
/// The pipeline: combined-strength differential through a bounded logistic,
/// a venue lean toward the side whose profile matches the ground, an
/// additive toss bonus for the venue-optimal call (then renormalized), and
/// a final clamp that keeps the pair strictly inside (0, 1) so a Bernoulli
/// draw on the result is always well-defined. Pure and total over valid
/// inputs; the only failure is a toss winner who is not playing.
pub fn win_probability(
    a: &TeamRatings,
    b: &TeamRatings,
    venue: &Venue,
    toss: Option<&TossOutcome>,
    params: &ModelParams,
) -> Result<WinProb, ModelError> {
    let diff = a.combined() - b.combined();
    let p_base = clamp(
        logistic(params.strength_scale * diff),
        params.base_floor,
        params.base_ceil,
    );

    // Shift toward the team whose batting/bowling balance suits the ground.
    let profile_gap = a.batting_lean() - b.batting_lean();
    let venue_shift = params.venue_weight * venue.bias * profile_gap;
    let mut p_a = clamp(p_base + venue_shift, params.base_floor, params.base_ceil);
    let venue_shift = p_a - p_base;

    let mut toss_shift = 0.0;
    if let Some(toss) = toss {
        if toss.winner != a.team && toss.winner != b.team {
            return Err(ModelError::InvalidToss {
                winner: toss.winner.clone(),
            });
        }
        if toss.decision == venue.optimal_decision() {
            let before = p_a;
            let mut w_a = p_a;
            let mut w_b = 1.0 - p_a;
            if toss.winner == a.team {
                w_a += params.toss_advantage;
            } else {
                w_b += params.toss_advantage;
            }
            p_a = w_a / (w_a + w_b);
            toss_shift = p_a - before;
        }
    }

    let p_a = clamp(p_a, params.final_floor, params.final_ceil);
    Ok(WinProb {
        p_a,
        p_b: 1.0 - p_a,
        factors: FactorBreakdown {
            rating_gap: p_base - 0.5,
            venue_shift,
            toss_shift,
        },
    })
}

/// Resolve a fixture's references and evaluate it. Team A maps to the
/// fixture's first team.
pub fn win_probability_for_fixture(
    fixture: &Fixture,
    ratings: &HashMap<String, TeamRatings>,
    venues: &HashMap<String, Venue>,
    toss: Option<&TossOutcome>,
    params: &ModelParams,
) -> Result<WinProb, ModelError> {
    let venue = venues
        .get(&fixture.venue)
        .ok_or_else(|| ModelError::UnknownVenue(fixture.venue.clone()))?;
    let a = ratings.get(&fixture.team_a).ok_or_else(|| {
        ModelError::schedule(fixture.id, format!("no ratings for team {:?}", fixture.team_a))
    })?;
    let b = ratings.get(&fixture.team_b).ok_or_else(|| {
        ModelError::schedule(fixture.id, format!("no ratings for team {:?}", fixture.team_b))
    })?;
    win_probability(a, b, venue, toss, params)
}

fn logistic(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}

fn clamp(v: f64, lo: f64, hi: f64) -> f64 {
    v.max(lo).min(hi)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::TossDecision;

    fn ratings(team: &str, batting: f64, bowling: f64) -> TeamRatings {
        TeamRatings {
            team: team.to_string(),
            batting,
            bowling,
        }
    }

    fn neutral_venue() -> Venue {
        Venue::new("Neutral Ground".to_string(), 150.0, 50.0, 8.5)
    }

    fn bat_friendly_venue() -> Venue {
        Venue::new("Flat Track".to_string(), 175.0, 62.0, 9.4)
    }

    #[test]
    fn pair_sums_to_one_inside_bounds() {
        let params = ModelParams::default();
        let a = ratings("A", 41.0, 7.0);
        let b = ratings("B", 28.0, 5.5);
        let toss = TossOutcome {
            winner: "A".to_string(),
            decision: TossDecision::Bat,
        };
        let wp =
            win_probability(&a, &b, &bat_friendly_venue(), Some(&toss), &params).unwrap();
        assert!((wp.p_a + wp.p_b - 1.0).abs() < 1e-12);
        assert!(wp.p_a > 0.02 && wp.p_a < 0.98);
        assert!(wp.p_b > 0.02 && wp.p_b < 0.98);
    }

    #[test]
    fn equal_teams_neutral_venue_no_toss_is_even() {
        let params = ModelParams::default();
        let a = ratings("A", 35.0, 6.0);
        let b = ratings("B", 33.0, 8.0); // same combined strength
        let wp = win_probability(&a, &b, &neutral_venue(), None, &params).unwrap();
        assert!((wp.p_a - 0.5).abs() < 1e-9);
        assert!((wp.p_b - 0.5).abs() < 1e-9);
    }

    #[test]
    fn more_batting_strictly_helps() {
        let params = ModelParams::default();
        let b = ratings("B", 33.0, 7.0);
        let venue = bat_friendly_venue();
        let mut last = 0.0;
        for batting in [30.0, 34.0, 38.0, 42.0] {
            let a = ratings("A", batting, 7.0);
            let wp = win_probability(&a, &b, &venue, None, &params).unwrap();
            assert!(wp.p_a > last, "p_a must rise with batting strength");
            last = wp.p_a;
        }
    }

    #[test]
    fn optimal_toss_call_never_hurts() {
        let params = ModelParams::default();
        let a = ratings("A", 41.0, 7.0);
        let b = ratings("B", 30.0, 6.0);
        let venue = bat_friendly_venue();
        let without = win_probability(&a, &b, &venue, None, &params).unwrap();
        let toss = TossOutcome {
            winner: "A".to_string(),
            decision: TossDecision::Bat, // optimal here
        };
        let with = win_probability(&a, &b, &venue, Some(&toss), &params).unwrap();
        assert!(with.p_a >= without.p_a);
        assert!(with.factors.toss_shift > 0.0);
    }

    #[test]
    fn suboptimal_toss_call_changes_nothing() {
        let params = ModelParams::default();
        let a = ratings("A", 41.0, 7.0);
        let b = ratings("B", 30.0, 6.0);
        let venue = bat_friendly_venue();
        let without = win_probability(&a, &b, &venue, None, &params).unwrap();
        let toss = TossOutcome {
            winner: "A".to_string(),
            decision: TossDecision::Field,
        };
        let with = win_probability(&a, &b, &venue, Some(&toss), &params).unwrap();
        assert_eq!(with.p_a.to_bits(), without.p_a.to_bits());
        assert_eq!(with.factors.toss_shift, 0.0);
    }

    #[test]
    fn toss_winner_must_be_playing() {
        let params = ModelParams::default();
        let a = ratings("A", 41.0, 7.0);
        let b = ratings("B", 30.0, 6.0);
        let toss = TossOutcome {
            winner: "C".to_string(),
            decision: TossDecision::Bat,
        };
        let err = win_probability(&a, &b, &neutral_venue(), Some(&toss), &params).unwrap_err();
        assert!(matches!(err, ModelError::InvalidToss { .. }));
    }

    #[test]
    fn lopsided_strengths_stay_clamped() {
        let params = ModelParams::default();
        let a = ratings("A", 90.0, 10.0);
        let b = ratings("B", 10.0, 1.0);
        let toss = TossOutcome {
            winner: "A".to_string(),
            decision: TossDecision::Bat,
        };
        let wp =
            win_probability(&a, &b, &bat_friendly_venue(), Some(&toss), &params).unwrap();
        assert!(wp.p_a <= 0.98);
        assert!(wp.p_b >= 0.02);
    }

    #[test]
    fn fixture_resolution_flags_unknown_venue() {
        let params = ModelParams::default();
        let fixture = Fixture {
            id: 7,
            team_a: "A".to_string(),
            team_b: "B".to_string(),
            venue: "Nowhere".to_string(),
            stage: crate::state::Stage::Group,
        };
        let ratings = HashMap::from([
            ("A".to_string(), ratings("A", 41.0, 7.0)),
            ("B".to_string(), ratings("B", 30.0, 6.0)),
        ]);
        let err = win_probability_for_fixture(&fixture, &ratings, &HashMap::new(), None, &params)
            .unwrap_err();
        assert!(matches!(err, ModelError::UnknownVenue(v) if v == "Nowhere"));
    }
}
