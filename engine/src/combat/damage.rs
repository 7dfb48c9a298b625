use serde::Serialize;

use crate::combat::state::CombatState;
use crate::combatant::Combatant;
use crate::config::CombatTuning;
use crate::geometry::Vec2;
use crate::Dice;

/// Chance that a blow is rolled away from instead of landing.
pub const DODGE_CHANCE: f64 = 0.25;

/// A blow on its way to the opponent.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Strike {
    pub amount: i32,
    /// Distance the victim is pushed if the blow lands.
    pub knockback: f64,
    /// Where the attacker stood when the blow left.
    pub origin: Vec2,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Impact {
    /// `downed` is set only on the blow that took hp from above zero to zero or below.
    Hit { amount: i32, hp_before: i32, hp_after: i32, downed: bool },
    Dodged { toward: Vec2 },
}

/// Damage for one attack, uniform over the tuning's inclusive bounds.
pub fn roll_damage(tuning: &CombatTuning, dice: &mut Dice) -> i32 {
    let (lo, hi) = tuning.damage_bounds();
    dice.int_inclusive(lo, hi)
}

impl Combatant {
    /// Resolve an incoming blow: it lands unless the dodge roll comes up at or
    /// under [`DODGE_CHANCE`], in which case the combatant rolls away instead.
    pub fn apply_damage(&mut self, strike: Strike, dice: &mut Dice) -> Impact {
        if dice.unit() > DODGE_CHANCE {
            let hp_before = self.vitals.hp;
            let downed = self.vitals.take(strike.amount);
            let away = (self.position - strike.origin).normalize_or_zero();
            let speed = self.tuning().knockback_speed(strike.knockback);
            self.enter(CombatState::ReceiveDamage { elapsed_ms: 0.0, away, speed });
            Impact::Hit { amount: strike.amount, hp_before, hp_after: self.vitals.hp, downed }
        } else {
            let angle = dice.angle();
            let reach = self.tuning().roll_distance * dice.unit();
            let offset = Vec2::new(angle.cos(), angle.sin()).flattened() * reach;
            let from = self.position;
            let toward = from + offset;
            self.enter(CombatState::Rolling { elapsed_ms: 0.0, from, to: toward });
            Impact::Dodged { toward }
        }
    }
}
