use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;

use crate::error::ModelError;
use crate::params::SimParams;
use crate::state::{
    AggregateStanding, CrucialFixture, Fixture, MatchResult, SimulationReport, Stage,
    TeamRatings, TossOutcome, Venue,
};
use crate::win_prob::win_probability;

/// Points for a group-stage win. Ties are not modeled.
const WIN_POINTS: i64 = 2;

/// Monte Carlo replay of the full schedule.
///
/// Replays are independent: each owns a ChaCha8 stream seeded with
/// `base_seed + iteration`, so the aggregate is reproducible for a fixed
/// seed and iteration count, and iterations can run on rayon workers with
/// their tallies merged by summing afterwards. The schedule is validated
/// up front; any unresolved reference aborts the whole call with zero
/// partial output. `cancel` is checked once per iteration.
pub fn simulate(
    schedule: &[Fixture],
    ratings: &HashMap<String, TeamRatings>,
    venues: &HashMap<String, Venue>,
    params: &SimParams,
    cancel: Option<&AtomicBool>,
) -> Result<SimulationReport, ModelError> {
    let plan = build_plan(schedule, ratings, venues, params.playoff_slots)?;
    let fresh = || Tally::new(plan.teams.len(), plan.group.len());

    let tally = (0..params.iterations)
        .into_par_iter()
        .try_fold(fresh, |mut acc, iteration| {
            if cancel.is_some_and(|c| c.load(Ordering::Relaxed)) {
                return Err(ModelError::Cancelled);
            }
            acc.absorb(run_replay(&plan, ratings, venues, params, iteration)?);
            Ok(acc)
        })
        .try_reduce(fresh, |mut a, b| {
            a.merge(b);
            Ok(a)
        })?;

    Ok(build_report(&plan, tally, params.iterations))
}

struct Plan<'a> {
    /// First-seen order over the group fixtures; index is the team id used
    /// by every per-replay accumulator.
    teams: Vec<&'a str>,
    group: Vec<&'a Fixture>,
    playoff: Vec<&'a Fixture>,
    last: &'a Fixture,
    slots: usize,
}

fn build_plan<'a>(
    schedule: &'a [Fixture],
    ratings: &HashMap<String, TeamRatings>,
    venues: &HashMap<String, Venue>,
    slots: usize,
) -> Result<Plan<'a>, ModelError> {
    let mut teams: Vec<&str> = Vec::new();
    let mut group = Vec::new();
    let mut playoff = Vec::new();
    let mut finals = Vec::new();

    for fixture in schedule {
        if fixture.venue.is_empty() {
            return Err(ModelError::schedule(fixture.id, "missing venue reference"));
        }
        if !venues.contains_key(&fixture.venue) {
            return Err(ModelError::UnknownVenue(fixture.venue.clone()));
        }
        match fixture.stage {
            Stage::Group => {
                if fixture.team_a.is_empty() || fixture.team_b.is_empty() {
                    return Err(ModelError::schedule(fixture.id, "missing team reference"));
                }
                if fixture.team_a == fixture.team_b {
                    return Err(ModelError::schedule(
                        fixture.id,
                        format!("team {:?} is listed on both sides", fixture.team_a),
                    ));
                }
                for team in [&fixture.team_a, &fixture.team_b] {
                    if !ratings.contains_key(team.as_str()) {
                        return Err(ModelError::schedule(
                            fixture.id,
                            format!("no ratings for team {team:?}"),
                        ));
                    }
                    if !teams.contains(&team.as_str()) {
                        teams.push(team);
                    }
                }
                group.push(fixture);
            }
            Stage::Playoff => playoff.push(fixture),
            Stage::Final => finals.push(fixture),
        }
    }

    let last = match finals.as_slice() {
        [one] => *one,
        [] => return Err(ModelError::schedule(0, "schedule has no final fixture")),
        [_, extra, ..] => {
            return Err(ModelError::schedule(extra.id, "schedule has more than one final"));
        }
    };
    if slots < 2 || slots > teams.len() {
        return Err(ModelError::schedule(
            0,
            format!("{slots} playoff slots for {} teams", teams.len()),
        ));
    }
    // Ladder bracket: every non-final playoff fixture knocks one team out,
    // so reaching a two-team final needs exactly slots - 2 of them.
    if playoff.len() != slots - 2 {
        return Err(ModelError::schedule(
            0,
            format!(
                "{} playoff fixtures cannot reduce {slots} qualifiers to a final",
                playoff.len()
            ),
        ));
    }

    Ok(Plan {
        teams,
        group,
        playoff,
        last,
        slots,
    })
}

struct Replay {
    group_wins: Vec<u64>,
    qualified: Vec<bool>,
    champion: usize,
    /// Per group fixture: near-toss-up odds in a replay whose qualification
    /// line was decided by fewer points than one win.
    swingy: Vec<bool>,
    sample: Option<Vec<MatchResult>>,
}

fn run_replay(
    plan: &Plan<'_>,
    ratings: &HashMap<String, TeamRatings>,
    venues: &HashMap<String, Venue>,
    params: &SimParams,
    iteration: usize,
) -> Result<Replay, ModelError> {
    let mut rng = ChaCha8Rng::seed_from_u64(params.base_seed.wrapping_add(iteration as u64));
    let n = plan.teams.len();
    let mut points = vec![0i64; n];
    let mut wins = vec![0u64; n];
    // Run-differential proxy: the winner banks its pre-match win
    // probability, the loser concedes it.
    let mut net = vec![0.0f64; n];
    let mut tossup = vec![false; plan.group.len()];
    let mut sample = (iteration == 0).then(Vec::new);

    let index = |team: &str| -> usize {
        plan.teams
            .iter()
            .position(|t| *t == team)
            .unwrap_or_default()
    };

    for (gi, fixture) in plan.group.iter().enumerate() {
        let result = play_match(
            fixture,
            &fixture.team_a,
            &fixture.team_b,
            ratings,
            venues,
            params,
            &mut rng,
        )?;
        tossup[gi] = (result.p_a - result.p_b).abs() <= params.tossup_band;

        let (winner, loser, p_winner) = if result.winner == fixture.team_a {
            (index(&fixture.team_a), index(&fixture.team_b), result.p_a)
        } else {
            (index(&fixture.team_b), index(&fixture.team_a), result.p_b)
        };
        points[winner] += WIN_POINTS;
        wins[winner] += 1;
        net[winner] += p_winner;
        net[loser] -= p_winner;

        if let Some(sample) = sample.as_mut() {
            sample.push(result);
        }
    }

    // Rank: points, then the differential proxy, then name so the order is
    // total and reproducible.
    let mut order: Vec<usize> = (0..n).collect();
    order.sort_by(|&x, &y| {
        points[y]
            .cmp(&points[x])
            .then(net[y].total_cmp(&net[x]))
            .then(plan.teams[x].cmp(plan.teams[y]))
    });

    let mut qualified = vec![false; n];
    for &i in &order[..plan.slots] {
        qualified[i] = true;
    }
    let tight_line = n > plan.slots
        && points[order[plan.slots - 1]] - points[order[plan.slots]] < WIN_POINTS;
    let swingy = tossup
        .into_iter()
        .map(|near| near && tight_line)
        .collect();

    // Ladder playoffs: each playoff fixture pairs the two lowest remaining
    // seeds; the loser drops out, the winner keeps the better slot.
    let mut remaining: Vec<&str> = order[..plan.slots].iter().map(|&i| plan.teams[i]).collect();
    for fixture in &plan.playoff {
        let low = remaining.len() - 2;
        let result = play_match(
            fixture,
            remaining[low],
            remaining[low + 1],
            ratings,
            venues,
            params,
            &mut rng,
        )?;
        let winner = if result.winner == remaining[low] {
            remaining[low]
        } else {
            remaining[low + 1]
        };
        remaining.truncate(low);
        remaining.push(winner);
        if let Some(sample) = sample.as_mut() {
            sample.push(result);
        }
    }

    let result = play_match(
        plan.last,
        remaining[0],
        remaining[1],
        ratings,
        venues,
        params,
        &mut rng,
    )?;
    let champion = index(&result.winner);
    if let Some(sample) = sample.as_mut() {
        sample.push(result);
    }

    Ok(Replay {
        group_wins: wins,
        qualified,
        champion,
        swingy,
        sample,
    })
}

/// Sample a toss, assume the captain takes the venue-optimal call, evaluate
/// the model, and draw the outcome.
fn play_match(
    fixture: &Fixture,
    team_a: &str,
    team_b: &str,
    ratings: &HashMap<String, TeamRatings>,
    venues: &HashMap<String, Venue>,
    params: &SimParams,
    rng: &mut ChaCha8Rng,
) -> Result<MatchResult, ModelError> {
    let venue = venues
        .get(&fixture.venue)
        .ok_or_else(|| ModelError::UnknownVenue(fixture.venue.clone()))?;
    let a = ratings
        .get(team_a)
        .ok_or_else(|| ModelError::schedule(fixture.id, format!("no ratings for team {team_a:?}")))?;
    let b = ratings
        .get(team_b)
        .ok_or_else(|| ModelError::schedule(fixture.id, format!("no ratings for team {team_b:?}")))?;

    let toss_winner = if rng.gen_bool(0.5) { team_a } else { team_b };
    let toss = TossOutcome {
        winner: toss_winner.to_string(),
        decision: venue.optimal_decision(),
    };
    let wp = win_probability(a, b, venue, Some(&toss), &params.model)?;
    let a_won = rng.gen_bool(wp.p_a);

    Ok(MatchResult {
        fixture_id: fixture.id,
        team_a: team_a.to_string(),
        team_b: team_b.to_string(),
        venue: fixture.venue.clone(),
        winner: if a_won { team_a } else { team_b }.to_string(),
        p_a: wp.p_a,
        p_b: wp.p_b,
        toss,
        factors: wp.factors,
    })
}

struct Tally {
    group_wins: Vec<u64>,
    qualified: Vec<u64>,
    titles: Vec<u64>,
    swing: Vec<u64>,
    sample: Option<Vec<MatchResult>>,
}

impl Tally {
    fn new(teams: usize, group_fixtures: usize) -> Self {
        Self {
            group_wins: vec![0; teams],
            qualified: vec![0; teams],
            titles: vec![0; teams],
            swing: vec![0; group_fixtures],
            sample: None,
        }
    }

    fn absorb(&mut self, replay: Replay) {
        for (acc, w) in self.group_wins.iter_mut().zip(&replay.group_wins) {
            *acc += w;
        }
        for (acc, q) in self.qualified.iter_mut().zip(&replay.qualified) {
            *acc += u64::from(*q);
        }
        self.titles[replay.champion] += 1;
        for (acc, s) in self.swing.iter_mut().zip(&replay.swingy) {
            *acc += u64::from(*s);
        }
        if self.sample.is_none() {
            self.sample = replay.sample;
        }
    }

    fn merge(&mut self, other: Tally) {
        for (acc, w) in self.group_wins.iter_mut().zip(&other.group_wins) {
            *acc += w;
        }
        for (acc, q) in self.qualified.iter_mut().zip(&other.qualified) {
            *acc += q;
        }
        for (acc, t) in self.titles.iter_mut().zip(&other.titles) {
            *acc += t;
        }
        for (acc, s) in self.swing.iter_mut().zip(&other.swing) {
            *acc += s;
        }
        if self.sample.is_none() {
            self.sample = other.sample;
        }
    }
}

fn build_report(plan: &Plan<'_>, tally: Tally, iterations: usize) -> SimulationReport {
    let runs = iterations.max(1) as f64;
    let mut standings: Vec<AggregateStanding> = plan
        .teams
        .iter()
        .enumerate()
        .map(|(i, team)| AggregateStanding {
            team: team.to_string(),
            group_wins: tally.group_wins[i],
            playoff_appearances: tally.qualified[i],
            titles: tally.titles[i],
            qualification_probability: tally.qualified[i] as f64 / runs,
            win_probability: tally.titles[i] as f64 / runs,
        })
        .collect();
    standings.sort_by(|a, b| {
        b.win_probability
            .total_cmp(&a.win_probability)
            .then_with(|| a.team.cmp(&b.team))
    });

    // Ties go to the earlier fixture in schedule order.
    let most_crucial = tally
        .swing
        .iter()
        .enumerate()
        .filter(|(_, runs)| **runs > 0)
        .max_by(|(xi, x), (yi, y)| x.cmp(y).then(yi.cmp(xi)))
        .map(|(gi, swing_runs)| {
            let fixture = plan.group[gi];
            CrucialFixture {
                fixture_id: fixture.id,
                team_a: fixture.team_a.clone(),
                team_b: fixture.team_b.clone(),
                venue: fixture.venue.clone(),
                swing_runs: *swing_runs,
                swing_share: *swing_runs as f64 / runs,
            }
        });

    SimulationReport {
        iterations,
        standings,
        sample_results: tally.sample.unwrap_or_default(),
        most_crucial,
    }
}
