use thiserror::Error;

/// Typed failures of the probabilistic core. Nothing here is retried or
/// papered over with defaults; callers decide what to surface.
#[derive(Debug, Error)]
pub enum ModelError {
    #[error("team {team} has no usable {side} statistics")]
    InsufficientData { team: String, side: &'static str },

    #[error("venue {0:?} is not in the venue table")]
    UnknownVenue(String),

    #[error("toss winner {winner:?} is not playing in this match")]
    InvalidToss { winner: String },

    #[error("malformed schedule at fixture {fixture}: {reason}")]
    MalformedSchedule { fixture: u32, reason: String },

    #[error("simulation cancelled before completion")]
    Cancelled,
}

impl ModelError {
    pub(crate) fn schedule(fixture: u32, reason: impl Into<String>) -> Self {
        ModelError::MalformedSchedule {
            fixture,
            reason: reason.into(),
        }
    }
}
