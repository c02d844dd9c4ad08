use std::collections::HashMap;
use std::hint::black_box;

use criterion::{Criterion, criterion_group, criterion_main};

use hundred_sim::params::{ModelParams, SimParams};
use hundred_sim::state::{Fixture, Player, Role, Stage, TeamRatings, Venue};
use hundred_sim::team_ratings::compute_team_ratings;
use hundred_sim::tournament::simulate;
use hundred_sim::win_prob::win_probability;

fn sample_players() -> Vec<Player> {
    let teams = ["North", "South", "East", "West"];
    let mut players = Vec::new();
    for (t, team) in teams.iter().enumerate() {
        for i in 0..12 {
            let batting = i < 6;
            players.push(Player {
                name: format!("{team} P{i}"),
                team: team.to_string(),
                role: if batting { Role::Batter } else { Role::Bowler },
                bat_avg: if batting { 20.0 + (t + i) as f64 } else { 0.0 },
                bat_strike_rate: 125.0,
                bowl_economy: if batting { 0.0 } else { 7.0 + (i % 4) as f64 * 0.4 },
                bowl_avg: 25.0,
            });
        }
    }
    players
}

fn sample_ratings() -> HashMap<String, TeamRatings> {
    [("North", 40.0, 8.0), ("South", 36.0, 7.5), ("East", 31.0, 6.0), ("West", 27.0, 5.0)]
        .into_iter()
        .map(|(team, batting, bowling)| {
            (
                team.to_string(),
                TeamRatings {
                    team: team.to_string(),
                    batting,
                    bowling,
                },
            )
        })
        .collect()
}

fn sample_schedule() -> (Vec<Fixture>, HashMap<String, Venue>) {
    let venue = Venue::new("Bench Oval".to_string(), 158.0, 54.0, 8.9);
    let venues = HashMap::from([(venue.name.clone(), venue)]);
    let teams = ["North", "South", "East", "West"];
    let mut fixtures = Vec::new();
    let mut id = 0;
    for i in 0..teams.len() {
        for j in (i + 1)..teams.len() {
            id += 1;
            fixtures.push(Fixture {
                id,
                team_a: teams[i].to_string(),
                team_b: teams[j].to_string(),
                venue: "Bench Oval".to_string(),
                stage: Stage::Group,
            });
        }
    }
    fixtures.push(Fixture {
        id: id + 1,
        team_a: String::new(),
        team_b: String::new(),
        venue: "Bench Oval".to_string(),
        stage: Stage::Playoff,
    });
    fixtures.push(Fixture {
        id: id + 2,
        team_a: String::new(),
        team_b: String::new(),
        venue: "Bench Oval".to_string(),
        stage: Stage::Final,
    });
    (fixtures, venues)
}

fn bench_team_ratings(c: &mut Criterion) {
    let players = sample_players();
    let rates: HashMap<String, f64> = HashMap::from([("North".to_string(), 9.1)]);
    let params = ModelParams::default();
    c.bench_function("team_ratings_compute", |b| {
        b.iter(|| {
            let ratings =
                compute_team_ratings(black_box(&players), black_box(&rates), &params).unwrap();
            black_box(ratings.len());
        })
    });
}

fn bench_win_probability(c: &mut Criterion) {
    let ratings = sample_ratings();
    let venue = Venue::new("Bench Oval".to_string(), 158.0, 54.0, 8.9);
    let params = ModelParams::default();
    c.bench_function("win_probability", |b| {
        b.iter(|| {
            let wp = win_probability(
                black_box(&ratings["North"]),
                black_box(&ratings["West"]),
                &venue,
                None,
                &params,
            )
            .unwrap();
            black_box(wp.p_a);
        })
    });
}

fn bench_simulate_100(c: &mut Criterion) {
    let (schedule, venues) = sample_schedule();
    let ratings = sample_ratings();
    let params = SimParams {
        iterations: 100,
        base_seed: 11,
        ..SimParams::default()
    };
    c.bench_function("simulate_100_replays", |b| {
        b.iter(|| {
            let report =
                simulate(black_box(&schedule), &ratings, &venues, &params, None).unwrap();
            black_box(report.standings.len());
        })
    });
}

criterion_group!(perf, bench_team_ratings, bench_win_probability, bench_simulate_100);
criterion_main!(perf);
