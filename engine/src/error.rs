use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ArenaError {
    #[error("a battle needs exactly two combatants, got {0}")]
    InvalidRoster(usize),

    #[error("combatants are already engaged in a battle")]
    AlreadyEngaged,

    #[error("previous battle was won by {0}; reset before battling again")]
    NotReset(String),

    #[error("cannot resolve a winner from an empty candidate list")]
    NoCandidates,

    #[error("invalid stat weights: {0}")]
    InvalidWeights(String),

    #[error("invalid combat tuning: {0}")]
    InvalidTuning(String),

    #[error("tick source stopped after {elapsed_ms:.0} ms without a winner")]
    Stalled { elapsed_ms: f64 },

    #[error("battle exceeded the {limit_ms:.0} ms watchdog")]
    TimedOut { limit_ms: f64 },
}

pub type Result<T> = std::result::Result<T, ArenaError>;
