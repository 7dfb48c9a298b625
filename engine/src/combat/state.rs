//! Per-combatant state machine.
//!
//! ```text
//! Seeking ──in range──▶ PrepareAttack ──recovery──▶ (ready)
//!    ▲                        │
//!    │        exchange won ───┼──▶ Attacking ──────────────┐
//!    │        hit landed  ────┼──▶ ReceiveDamage ──────────┤
//!    │        hit dodged  ────┴──▶ Rolling ────────────────┤
//!    └─────────────────────────────────────────────────────┘
//! ```
//!
//! [`advance`] is pure: it reads the combatant and the opponent's pre-tick
//! position and returns the [`Step`] the orchestrator commits.

use serde::Serialize;

use crate::combat::damage::Strike;
use crate::combatant::Combatant;
use crate::geometry::{within_reach, Vec2};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StateKind {
    Seeking,
    PrepareAttack,
    Attacking,
    ReceiveDamage,
    Rolling,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CombatState {
    /// Closing in on the opponent.
    Seeking,
    /// In range, winding up; ready once the recovery time has passed.
    PrepareAttack { elapsed_ms: f64 },
    /// Swinging. `damage` was rolled on entry; `struck` once the blow went out.
    Attacking { elapsed_ms: f64, damage: i32, struck: bool },
    /// Knocked back along `away` at `speed` pixels per millisecond.
    ReceiveDamage { elapsed_ms: f64, away: Vec2, speed: f64 },
    /// Dodging from `from` to `to`.
    Rolling { elapsed_ms: f64, from: Vec2, to: Vec2 },
}

impl CombatState {
    pub fn kind(&self) -> StateKind {
        match self {
            CombatState::Seeking => StateKind::Seeking,
            CombatState::PrepareAttack { .. } => StateKind::PrepareAttack,
            CombatState::Attacking { .. } => StateKind::Attacking,
            CombatState::ReceiveDamage { .. } => StateKind::ReceiveDamage,
            CombatState::Rolling { .. } => StateKind::Rolling,
        }
    }

    pub fn clears_readiness(&self) -> bool {
        matches!(
            self,
            CombatState::Attacking { .. }
                | CombatState::ReceiveDamage { .. }
                | CombatState::Rolling { .. }
        )
    }
}

/// One tick's worth of change for a single combatant.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Step {
    pub state: CombatState,
    pub position: Vec2,
    pub ready_to_attack: bool,
    pub target: Option<Vec2>,
    /// A blow that left this tick, to be applied to the opponent.
    pub strike: Option<Strike>,
}

pub fn advance(me: &Combatant, enemy_at: Vec2, delta_ms: f64) -> Step {
    let tuning = me.tuning();
    let here = me.position();
    let mut step = Step {
        state: *me.state(),
        position: here,
        ready_to_attack: me.is_ready(),
        target: me.target(),
        strike: None,
    };

    match *me.state() {
        CombatState::Seeking => {
            step.target = Some(enemy_at);
            if within_reach(here, enemy_at, tuning.attack_range) {
                step.state = CombatState::PrepareAttack { elapsed_ms: 0.0 };
            } else {
                let distance = tuning.move_speed * delta_ms / 1000.0;
                step.position = approach(here, enemy_at, distance, tuning.attack_range);
            }
        }
        CombatState::PrepareAttack { elapsed_ms } => {
            let elapsed_ms = elapsed_ms + delta_ms;
            step.state = CombatState::PrepareAttack { elapsed_ms };
            if elapsed_ms >= tuning.recovery_ms {
                step.ready_to_attack = true;
            }
        }
        CombatState::Attacking { elapsed_ms, damage, struck } => {
            let elapsed_ms = elapsed_ms + delta_ms;
            let mut struck = struck;
            if !struck && elapsed_ms >= tuning.damage_delay_ms {
                struck = true;
                step.strike = Some(Strike {
                    amount: damage,
                    knockback: tuning.knockback_distance,
                    origin: here,
                });
            }
            step.state = if elapsed_ms >= tuning.attack_duration_ms {
                CombatState::Seeking
            } else {
                CombatState::Attacking { elapsed_ms, damage, struck }
            };
        }
        CombatState::ReceiveDamage { elapsed_ms, away, speed } => {
            // clamp so the total push never exceeds the knockback distance
            let moving_ms = delta_ms.min((tuning.damage_received_ms - elapsed_ms).max(0.0));
            step.position = here + away.flattened() * (speed * moving_ms);
            let elapsed_ms = elapsed_ms + delta_ms;
            step.state = if elapsed_ms >= tuning.damage_received_ms {
                CombatState::Seeking
            } else {
                CombatState::ReceiveDamage { elapsed_ms, away, speed }
            };
        }
        CombatState::Rolling { elapsed_ms, from, to } => {
            let elapsed_ms = elapsed_ms + delta_ms;
            let t = if tuning.roll_duration_ms > 0.0 {
                (elapsed_ms / tuning.roll_duration_ms).min(1.0)
            } else {
                1.0
            };
            step.position = from.lerp(to, t);
            step.state = if t >= 1.0 {
                CombatState::Seeking
            } else {
                CombatState::Rolling { elapsed_ms, from, to }
            };
        }
    }

    step
}

/// Walk up to `distance` along the flattened heading toward `enemy_at`,
/// in strides of a quarter reach, stopping at the first stride that lands
/// in range. The walk never passes the enemy's x coordinate.
fn approach(here: Vec2, enemy_at: Vec2, distance: f64, range: f64) -> Vec2 {
    let gap = enemy_at - here;
    let path = gap.normalize_or_zero().flattened();
    let limit = distance.min(gap.length());
    let stride = range / 4.0;
    if stride <= 0.0 {
        return here + path * limit;
    }
    let mut walked = 0.0;
    while walked < limit {
        walked = (walked + stride).min(limit);
        if within_reach(here + path * walked, enemy_at, range) {
            break;
        }
    }
    here + path * walked
}
