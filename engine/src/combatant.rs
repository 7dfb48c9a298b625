use std::fmt;

use serde::{Deserialize, Serialize};

use crate::battle::Side;
use crate::combat::state::{CombatState, StateKind};
use crate::config::CombatTuning;
use crate::error::Result;
use crate::geometry::Vec2;
use crate::life::Vitals;
use crate::resolver::Weighted;
use crate::stats::{distribute, StatWeights, Stats};
use crate::Dice;

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CombatantId(String);

impl CombatantId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Id for the combatant filling roster slot `index`.
    pub fn slot(index: usize) -> Self {
        Self(format!("slot-{index}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CombatantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The record a combatant is built from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct StatSource {
    pub name: String,
    pub points: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weights: Option<StatWeights>,
}

impl StatSource {
    pub fn new(name: impl Into<String>, points: u32) -> Self {
        Self { name: name.into(), points, id: None, weights: None }
    }
}

/// A simulated fighter. Only its own state transitions and
/// [`Combatant::apply_damage`] change its hp, position and readiness.
#[derive(Debug, Clone)]
pub struct Combatant {
    id: CombatantId,
    name: String,
    stats: Stats,
    weights: StatWeights,
    tuning: CombatTuning,
    pub(crate) vitals: Vitals,
    pub(crate) position: Vec2,
    pub(crate) state: CombatState,
    pub(crate) ready_to_attack: bool,
    pub(crate) enemy: Option<Side>,
    pub(crate) target: Option<Vec2>,
}

impl Combatant {
    /// Build a combatant and spend the source's point budget on its stats.
    /// `fallback_weights` apply when the source carries none.
    pub fn new(
        id: CombatantId,
        source: &StatSource,
        tuning: CombatTuning,
        fallback_weights: StatWeights,
        dice: &mut Dice,
    ) -> Result<Self> {
        tuning.validate()?;
        let weights = source.weights.unwrap_or(fallback_weights);
        weights.validate()?;

        let mut stats = Stats::default();
        distribute(&mut stats, source.points, &weights, dice);

        Ok(Self {
            id,
            name: source.name.clone(),
            stats,
            weights,
            tuning,
            vitals: Vitals::default(),
            position: Vec2::ZERO,
            state: CombatState::Seeking,
            ready_to_attack: false,
            enemy: None,
            target: None,
        })
    }

    pub fn id(&self) -> &CombatantId {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn stats(&self) -> Stats {
        self.stats
    }

    pub fn weights(&self) -> StatWeights {
        self.weights
    }

    pub fn tuning(&self) -> &CombatTuning {
        &self.tuning
    }

    pub fn power(&self) -> u32 {
        self.stats.power()
    }

    pub fn hp(&self) -> i32 {
        self.vitals.hp
    }

    pub fn max_hp(&self) -> i32 {
        self.vitals.max_hp
    }

    pub fn vitals(&self) -> Vitals {
        self.vitals
    }

    pub fn position(&self) -> Vec2 {
        self.position
    }

    pub fn state(&self) -> &CombatState {
        &self.state
    }

    pub fn is_ready(&self) -> bool {
        self.ready_to_attack
    }

    pub fn enemy(&self) -> Option<Side> {
        self.enemy
    }

    pub fn target(&self) -> Option<Vec2> {
        self.target
    }

    /// Grow stats by `points` using this combatant's own weights.
    pub fn grow(&mut self, points: u32, dice: &mut Dice) -> Stats {
        distribute(&mut self.stats, points, &self.weights, dice)
    }

    /// Full hp, back to seeking, no pending attack.
    pub fn reset(&mut self) {
        self.vitals.restore();
        self.state = CombatState::Seeking;
        self.ready_to_attack = false;
        self.target = None;
    }

    /// Switch state. Attacking, receiving damage and rolling all drop the
    /// readiness gate. Returns the kind being left.
    pub(crate) fn enter(&mut self, state: CombatState) -> StateKind {
        let left = self.state.kind();
        if state.clears_readiness() {
            self.ready_to_attack = false;
        }
        self.state = state;
        left
    }
}

impl Weighted for Combatant {
    fn power(&self) -> f64 {
        f64::from(self.stats.power())
    }
}
