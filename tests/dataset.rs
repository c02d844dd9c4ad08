use std::fs;
use std::path::PathBuf;

use hundred_sim::dataset::{load_home_run_rates, load_players, load_schedule, load_venues};
use hundred_sim::export;
use hundred_sim::params::SimParams;
use hundred_sim::state::{Role, Stage};
use hundred_sim::team_ratings::{compute_team_ratings, ratings_map};
use hundred_sim::tournament::simulate;

fn fixture_path(name: &str) -> PathBuf {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("tests");
    path.push("fixtures");
    path.push(name);
    path
}

#[test]
fn tables_load_with_original_headers() {
    let players = load_players(&fixture_path("player_stats.csv")).unwrap();
    // The support-staff row has no recognizable role and is dropped.
    assert_eq!(players.len(), 12);
    assert_eq!(players[0].name, "J Root");
    assert_eq!(players[2].role, Role::AllRounder);
    assert_eq!(players[3].bat_avg, 0.0);

    let venues = load_venues(&fixture_path("venue_stats.csv")).unwrap();
    let trent = &venues["Trent Bridge, Nottingham"];
    assert!(trent.bias > 0.0, "57% bat-first should lean batting");
    let oval = &venues["Kennington Oval, London"];
    assert!(oval.bias < 0.0);

    let schedule = load_schedule(&fixture_path("schedule.csv")).unwrap();
    assert_eq!(schedule.len(), 3);
    assert_eq!(schedule[0].stage, Stage::Group);
    assert_eq!(schedule[2].stage, Stage::Final);
    assert!(schedule[2].team_a.is_empty());

    let rates = load_home_run_rates(&fixture_path("teams.csv"), &venues).unwrap();
    assert_eq!(rates["Trent Rockets"], 9.2);
}

#[test]
fn pipeline_runs_end_to_end_from_the_tables() {
    let venues = load_venues(&fixture_path("venue_stats.csv")).unwrap();
    let players = load_players(&fixture_path("player_stats.csv")).unwrap();
    let schedule = load_schedule(&fixture_path("schedule.csv")).unwrap();
    let rates = load_home_run_rates(&fixture_path("teams.csv"), &venues).unwrap();

    let params = SimParams {
        iterations: 200,
        base_seed: 7,
        playoff_slots: 2,
        ..SimParams::default()
    };
    let ratings = compute_team_ratings(&players, &rates, &params.model).unwrap();
    assert_eq!(ratings.len(), 2);
    assert!(ratings.iter().all(|r| r.batting > 0.0 && r.bowling > 0.0));

    let report = simulate(&schedule, &ratings_map(ratings.clone()), &venues, &params, None)
        .unwrap();
    assert_eq!(report.standings.len(), 2);
    let total: f64 = report.standings.iter().map(|s| s.win_probability).sum();
    assert!((total - 1.0).abs() < 1e-9);
    // Both teams qualify in a two-slot, two-team group.
    assert!(report
        .standings
        .iter()
        .all(|s| (s.qualification_probability - 1.0).abs() < 1e-9));

    // Exports stay flat and tabular.
    let out = std::env::temp_dir().join(format!("hundred_sim_test_{}", std::process::id()));
    fs::create_dir_all(&out).unwrap();
    export::write_ratings_csv(&out.join("team_ratings.csv"), &ratings).unwrap();
    export::write_standings_csv(&out.join("tournament_analysis.csv"), &report).unwrap();
    let standings_csv = fs::read_to_string(out.join("tournament_analysis.csv")).unwrap();
    assert!(standings_csv.starts_with("Team,Win_Probability,Qualification_Probability"));
    assert_eq!(standings_csv.trim_end().lines().count(), 1 + report.standings.len());
    fs::remove_dir_all(&out).ok();
}
