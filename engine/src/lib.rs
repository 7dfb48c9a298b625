use std::f64::consts::TAU;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

pub mod api;
pub mod battle;
pub mod combat;
pub mod combatant;
pub mod config;
pub mod content;
pub mod error;
pub mod geometry;
pub mod life;
pub mod logging;
pub mod resolver;
pub mod stats;
pub mod ticker;
pub mod tournament;

pub use battle::{BattleManager, BattleOutcome, Side, Transition};
pub use combat::damage::{Impact, Strike, DODGE_CHANCE};
pub use combat::state::{CombatState, StateKind};
pub use combatant::{Combatant, CombatantId, StatSource};
pub use config::{ArenaConfig, CombatTuning};
pub use error::{ArenaError, Result};
pub use geometry::Vec2;
pub use life::{Vitals, MAX_HP};
pub use resolver::{resolve_index, resolve_weighted, win_probability, Weighted};
pub use stats::{distribute, distribute_reward, Stat, StatWeights, Stats};
pub use ticker::{FixedTicker, ListenerId, ScriptedTicker, TickSource};

#[derive(Debug, Clone)]
enum Source {
    Seeded(ChaCha8Rng),
    Scripted { values: Vec<f64>, next: usize },
}

/// Every random draw in the simulation goes through here.
#[derive(Debug, Clone)]
pub struct Dice {
    source: Source,
}

impl Dice {
    pub fn from_seed(seed: u64) -> Self {
        Self { source: Source::Seeded(ChaCha8Rng::seed_from_u64(seed)) }
    }

    pub fn from_entropy() -> Self {
        Self { source: Source::Seeded(ChaCha8Rng::from_entropy()) }
    }

    /// Replays `values` as unit draws, wrapping around at the end.
    /// Values outside `[0, 1)` are clamped into it.
    pub fn from_scripted(values: Vec<f64>) -> Self {
        assert!(!values.is_empty(), "scripted dice need at least one value");
        Self { source: Source::Scripted { values, next: 0 } }
    }

    /// Uniform draw in `[0, 1)`.
    pub fn unit(&mut self) -> f64 {
        match &mut self.source {
            Source::Seeded(rng) => rng.gen_range(0.0..1.0),
            Source::Scripted { values, next } => {
                let v = values[*next % values.len()];
                *next += 1;
                if v.is_nan() { 0.0 } else { v.clamp(0.0, 1.0 - f64::EPSILON) }
            }
        }
    }

    /// Uniform draw in `[0, upper)`.
    pub fn uniform(&mut self, upper: f64) -> f64 {
        self.unit() * upper
    }

    /// Uniform integer in `lo..=hi`. Returns `lo` when the range is empty.
    pub fn int_inclusive(&mut self, lo: i32, hi: i32) -> i32 {
        if hi <= lo {
            return lo;
        }
        let span = i64::from(hi) - i64::from(lo) + 1;
        let offset = ((self.unit() * span as f64).floor() as i64).min(span - 1);
        (i64::from(lo) + offset) as i32
    }

    pub fn angle(&mut self) -> f64 {
        self.unit() * TAU
    }
}
