pub mod dataset;
pub mod error;
pub mod export;
pub mod params;
pub mod state;
pub mod team_ratings;
pub mod tournament;
pub mod win_prob;
