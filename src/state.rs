use serde::{Deserialize, Serialize};

/// What a player is picked for. The scraped tables only use the three
/// labels below; wicket-keepers arrive tagged as batters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    Batter,
    Bowler,
    #[serde(rename = "All-rounder")]
    AllRounder,
}

impl Role {
    pub fn can_bat(self) -> bool {
        matches!(self, Role::Batter | Role::AllRounder)
    }

    pub fn can_bowl(self) -> bool {
        matches!(self, Role::Bowler | Role::AllRounder)
    }
}

/// One row of the scraped player-stats table. Immutable once loaded.
/// Missing stats arrive as 0.0 and are filtered out during rating.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    pub name: String,
    pub team: String,
    pub role: Role,
    pub bat_avg: f64,
    pub bat_strike_rate: f64,
    pub bowl_economy: f64,
    pub bowl_avg: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Venue {
    pub name: String,
    pub avg_first_innings_score: f64,
    /// Percentage of matches won by the side batting first, 0..100.
    pub bat_first_win_pct: f64,
    pub run_rate: f64,
    /// Derived scalar in [-1, 1]; positive means the ground favors batting first.
    pub bias: f64,
}

impl Venue {
    pub fn new(
        name: String,
        avg_first_innings_score: f64,
        bat_first_win_pct: f64,
        run_rate: f64,
    ) -> Self {
        let bias = ((bat_first_win_pct - 50.0) / 50.0).clamp(-1.0, 1.0);
        Self {
            name,
            avg_first_innings_score,
            bat_first_win_pct,
            run_rate,
            bias,
        }
    }

    /// The historically better call for a captain winning the toss here.
    pub fn optimal_decision(&self) -> TossDecision {
        if self.bat_first_win_pct > 50.0 {
            TossDecision::Bat
        } else {
            TossDecision::Field
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Stage {
    Group,
    Playoff,
    Final,
}

/// One scheduled match. Group fixtures name both teams; playoff and final
/// fixtures leave the team fields empty and are filled from the simulated
/// standings each replay.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Fixture {
    pub id: u32,
    pub team_a: String,
    pub team_b: String,
    pub venue: String,
    pub stage: Stage,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TossDecision {
    Bat,
    Field,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TossOutcome {
    pub winner: String,
    pub decision: TossDecision,
}

/// Derived team strengths. Recomputed deterministically from the roster;
/// same inputs in the same order always give the same numbers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TeamRatings {
    pub team: String,
    pub batting: f64,
    pub bowling: f64,
}

impl TeamRatings {
    pub fn combined(&self) -> f64 {
        self.batting + self.bowling
    }

    /// Positive for batting-heavy sides, negative for bowling-heavy ones.
    pub fn batting_lean(&self) -> f64 {
        let total = self.combined();
        if total <= 0.0 {
            0.0
        } else {
            (self.batting - self.bowling) / total
        }
    }
}

/// How the probability was assembled, for explanatory display.
/// All three are signed shifts on team A's probability.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct FactorBreakdown {
    pub rating_gap: f64,
    pub venue_shift: f64,
    pub toss_shift: f64,
}

/// One evaluated (or sampled) match. Transient unless exported.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchResult {
    pub fixture_id: u32,
    pub team_a: String,
    pub team_b: String,
    pub venue: String,
    pub winner: String,
    pub p_a: f64,
    pub p_b: f64,
    pub toss: TossOutcome,
    pub factors: FactorBreakdown,
}

/// Per-team tallies across all replays, normalized to probabilities.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AggregateStanding {
    pub team: String,
    pub group_wins: u64,
    pub playoff_appearances: u64,
    pub titles: u64,
    pub qualification_probability: f64,
    pub win_probability: f64,
}

/// The group fixture whose outcome most often sat on the qualification line:
/// near-toss-up odds in a replay where the cutoff was closer than one win.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrucialFixture {
    pub fixture_id: u32,
    pub team_a: String,
    pub team_b: String,
    pub venue: String,
    pub swing_runs: u64,
    pub swing_share: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationReport {
    pub iterations: usize,
    pub standings: Vec<AggregateStanding>,
    /// MatchResults sampled in the first replay, kept as example predictions.
    pub sample_results: Vec<MatchResult>,
    pub most_crucial: Option<CrucialFixture>,
}
