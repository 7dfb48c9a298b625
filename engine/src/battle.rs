//! Battle orchestration.
//!
//! The manager owns both combatants and a single [`Dice`]. Each tick it
//! advances the subscribed combatants against a snapshot of where everybody
//! stood before the tick, hands out the blows that left, checks whether the
//! fight is over and, if both sides are waiting on it, runs an exchange.

use serde::Serialize;
use tracing::{debug, trace, warn};

use crate::combat::damage::{roll_damage, Impact, Strike};
use crate::combat::state::{advance, CombatState, StateKind, Step};
use crate::combatant::{Combatant, CombatantId};
use crate::config::{ArenaConfig, DEFAULT_SPAWN_OFFSET, DEFAULT_WATCHDOG_MS};
use crate::error::{ArenaError, Result};
use crate::geometry::Vec2;
use crate::resolver::pick_by_power;
use crate::stats::distribute_reward;
use crate::ticker::{ListenerId, TickSource};
use crate::Dice;

/// One of the two arena slots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    First,
    Second,
}

impl Side {
    pub const BOTH: [Side; 2] = [Side::First, Side::Second];

    pub fn other(self) -> Side {
        match self {
            Side::First => Side::Second,
            Side::Second => Side::First,
        }
    }

    pub fn index(self) -> usize {
        match self {
            Side::First => 0,
            Side::Second => 1,
        }
    }
}

/// A combatant changed state.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Transition {
    pub side: Side,
    pub combatant: CombatantId,
    pub from: StateKind,
    pub to: StateKind,
    pub at_ms: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct BattleOutcome {
    pub winner: Side,
    pub winner_id: CombatantId,
    pub winner_name: String,
    /// Unclamped, so an overkill shows up as negative hp.
    pub final_hp: [i32; 2],
    pub exchanges: u32,
    pub ticks: u64,
    pub elapsed_ms: f64,
}

#[derive(Debug, Clone, Copy)]
struct Subscriptions {
    fighters: [ListenerId; 2],
    referee: ListenerId,
}

type Observer = Box<dyn FnMut(&Transition)>;

pub struct BattleManager {
    fighters: [Combatant; 2],
    dice: Dice,
    winner: Option<Side>,
    subscriptions: Option<Subscriptions>,
    spawn_offset: f64,
    watchdog_ms: Option<f64>,
    elapsed_ms: f64,
    ticks: u64,
    exchanges: u32,
    observers: Vec<Observer>,
    log: Vec<String>,
}

impl BattleManager {
    /// Exactly two combatants, first slot first.
    pub fn new(combatants: Vec<Combatant>, dice: Dice) -> Result<Self> {
        let fighters: [Combatant; 2] = combatants
            .try_into()
            .map_err(|rest: Vec<Combatant>| ArenaError::InvalidRoster(rest.len()))?;
        Ok(Self {
            fighters,
            dice,
            winner: None,
            subscriptions: None,
            spawn_offset: DEFAULT_SPAWN_OFFSET,
            watchdog_ms: Some(DEFAULT_WATCHDOG_MS),
            elapsed_ms: 0.0,
            ticks: 0,
            exchanges: 0,
            observers: Vec::new(),
            log: Vec::new(),
        })
    }

    /// Take spawn offset and watchdog from `cfg`.
    pub fn with_config(mut self, cfg: &ArenaConfig) -> Self {
        self.spawn_offset = cfg.spawn_offset;
        self.watchdog_ms = cfg.max_elapsed_ms;
        self
    }

    /// `None` lets [`BattleManager::battle`] run for as long as the tick source does.
    pub fn with_watchdog(mut self, limit_ms: Option<f64>) -> Self {
        self.watchdog_ms = limit_ms;
        self
    }

    pub fn combatant(&self, side: Side) -> &Combatant {
        &self.fighters[side.index()]
    }

    pub fn combatants(&self) -> &[Combatant; 2] {
        &self.fighters
    }

    pub fn into_combatants(self) -> [Combatant; 2] {
        self.fighters
    }

    pub fn winner(&self) -> Option<&Combatant> {
        self.winner.map(|side| self.combatant(side))
    }

    pub fn winner_side(&self) -> Option<Side> {
        self.winner
    }

    /// True between `start` and the moment the battle resolves or is stopped.
    pub fn is_engaged(&self) -> bool {
        self.subscriptions.is_some()
    }

    pub fn exchanges(&self) -> u32 {
        self.exchanges
    }

    pub fn elapsed_ms(&self) -> f64 {
        self.elapsed_ms
    }

    pub fn log(&self) -> &[String] {
        &self.log
    }

    pub fn take_log(&mut self) -> Vec<String> {
        std::mem::take(&mut self.log)
    }

    /// Register a callback for every state transition.
    pub fn observe(&mut self, observer: impl FnMut(&Transition) + 'static) {
        self.observers.push(Box::new(observer));
    }

    /// Mirror the combatants around the origin on the horizontal axis.
    pub fn setup_positions(&mut self) {
        let offset = self.spawn_offset;
        self.fighters[0].position = Vec2::new(-offset, 0.0);
        self.fighters[1].position = Vec2::new(offset, 0.0);
        for fighter in &mut self.fighters {
            fighter.target = None;
        }
    }

    /// Engage both combatants and subscribe them, plus the referee, to `ticker`.
    pub fn start(&mut self, ticker: &mut impl TickSource) -> Result<()> {
        if self.subscriptions.is_some() {
            return Err(ArenaError::AlreadyEngaged);
        }
        if let Some(side) = self.winner {
            return Err(ArenaError::NotReset(self.combatant(side).name().to_string()));
        }

        for side in Side::BOTH {
            let fighter = &mut self.fighters[side.index()];
            fighter.enemy = Some(side.other());
            fighter.ready_to_attack = false;
            let from = fighter.enter(CombatState::Seeking);
            self.notify(side, from);
        }

        self.subscriptions = Some(Subscriptions {
            fighters: [ticker.add(), ticker.add()],
            referee: ticker.add(),
        });

        let [first, second] = &self.fighters;
        self.log.push(format!(
            "[START] {} (power {}, HP {}) vs {} (power {}, HP {})",
            first.name(),
            first.power(),
            first.hp(),
            second.name(),
            second.power(),
            second.hp()
        ));
        debug!(
            first = %first.id(),
            second = %second.id(),
            first_power = first.power(),
            second_power = second.power(),
            "battle started"
        );
        Ok(())
    }

    /// Deliver the ticker's current tick. Returns the winner once there is one.
    pub fn on_tick(&mut self, ticker: &mut impl TickSource) -> Option<Side> {
        let Some(subs) = self.subscriptions else {
            return self.winner;
        };
        let delta_ms = ticker.delta_ms();
        self.elapsed_ms += delta_ms;
        self.ticks += 1;

        let seen = [self.fighters[0].position, self.fighters[1].position];
        let mut strikes: [Option<Strike>; 2] = [None, None];
        for side in Side::BOTH {
            if !ticker.is_listening(subs.fighters[side.index()]) {
                continue;
            }
            let step = advance(&self.fighters[side.index()], seen[side.other().index()], delta_ms);
            strikes[side.index()] = step.strike;
            self.commit(side, step);
        }
        // a blow that left is always applied, referee or not
        for side in Side::BOTH {
            if let Some(strike) = strikes[side.index()] {
                self.deliver(side, strike);
            }
        }

        if !ticker.is_listening(subs.referee) {
            return None;
        }

        if let Some(winner) = self.resolve_winner() {
            self.finish(winner, ticker);
            return Some(winner);
        }

        if self.fighters.iter().all(Combatant::is_ready) {
            self.exchange();
        }
        None
    }

    /// Run a whole battle on `ticker`.
    pub fn battle(&mut self, ticker: &mut impl TickSource) -> Result<BattleOutcome> {
        self.start(ticker)?;
        loop {
            if let Some(limit_ms) = self.watchdog_ms {
                if self.elapsed_ms >= limit_ms {
                    self.stop_updates(ticker);
                    self.log.push(format!("[END] no winner after {:.0}ms", self.elapsed_ms));
                    warn!(limit_ms, exchanges = self.exchanges, "battle timed out");
                    return Err(ArenaError::TimedOut { limit_ms });
                }
            }
            if !ticker.advance() {
                self.stop_updates(ticker);
                warn!(elapsed_ms = self.elapsed_ms, "tick source stopped mid-battle");
                return Err(ArenaError::Stalled { elapsed_ms: self.elapsed_ms });
            }
            if let Some(winner) = self.on_tick(ticker) {
                return Ok(self.outcome(winner));
            }
        }
    }

    /// Unsubscribe everything `start` registered. Safe to call at any time,
    /// any number of times; a battle stopped this way has no winner.
    pub fn stop_updates(&mut self, ticker: &mut impl TickSource) {
        if let Some(subs) = self.subscriptions.take() {
            for id in subs.fighters.into_iter().chain([subs.referee]) {
                ticker.remove(id);
            }
        }
    }

    /// Full hp, back to seeking, winner and counters cleared.
    pub fn reset(&mut self) {
        for side in Side::BOTH {
            let fighter = &mut self.fighters[side.index()];
            let from = fighter.state().kind();
            fighter.reset();
            self.notify(side, from);
        }
        self.winner = None;
        self.elapsed_ms = 0.0;
        self.ticks = 0;
        self.exchanges = 0;
        self.log.clear();
    }

    /// Put `combatant` in `side`'s slot and hand back whoever was there.
    pub fn replace(&mut self, side: Side, combatant: Combatant) -> Result<Combatant> {
        if self.subscriptions.is_some() {
            return Err(ArenaError::AlreadyEngaged);
        }
        let mut previous = std::mem::replace(&mut self.fighters[side.index()], combatant);
        previous.enemy = None;
        Ok(previous)
    }

    /// Split `pool` stat points between the combatants on `sides`.
    /// Shares come back in slot order.
    pub fn reward(&mut self, sides: &[Side], pool: u32) -> Vec<u32> {
        let [first, second] = &mut self.fighters;
        let mut recipients: Vec<&mut Combatant> = Vec::with_capacity(2);
        if sides.contains(&Side::First) {
            recipients.push(first);
        }
        if sides.contains(&Side::Second) {
            recipients.push(second);
        }
        let shares = distribute_reward(pool, &mut recipients, &mut self.dice);
        for (fighter, share) in recipients.iter().zip(&shares) {
            self.log.push(format!(
                "[REWARD] {} +{} points (power {})",
                fighter.name(),
                share,
                fighter.power()
            ));
        }
        shares
    }

    /// Once either side is down, the one standing on more hp wins, counting
    /// anything below zero as zero. A tie goes to the first slot.
    pub fn resolve_winner(&self) -> Option<Side> {
        let [first, second] = &self.fighters;
        if !first.vitals.is_down() && !second.vitals.is_down() {
            return None;
        }
        if second.vitals.standing() > first.vitals.standing() {
            Some(Side::Second)
        } else {
            Some(Side::First)
        }
    }

    fn commit(&mut self, side: Side, step: Step) {
        let fighter = &mut self.fighters[side.index()];
        let from = fighter.state.kind();
        fighter.state = step.state;
        fighter.position = step.position;
        fighter.ready_to_attack = step.ready_to_attack;
        fighter.target = step.target;
        self.notify(side, from);
    }

    fn deliver(&mut self, attacker: Side, strike: Strike) {
        let attacker_name = self.combatant(attacker).name().to_string();
        let defender = attacker.other();
        let fighter = &mut self.fighters[defender.index()];
        let from = fighter.state.kind();
        let impact = fighter.apply_damage(strike, &mut self.dice);
        let line = match impact {
            Impact::Hit { amount, hp_before, hp_after, downed } => {
                let down = if downed { " DOWN" } else { "" };
                format!("[HIT][{}] {} -> {} (-{}){}", fighter.name(), hp_before, hp_after, amount, down)
            }
            Impact::Dodged { .. } => {
                format!("[DODGE][{}] rolls clear of {}", fighter.name(), attacker_name)
            }
        };
        trace!(defender = %fighter.id(), ?impact, "strike resolved");
        self.log.push(line);
        self.notify(defender, from);
    }

    fn exchange(&mut self) {
        let powers = self.fighters.each_ref().map(|f| f64::from(f.power()));
        let attacker = Side::BOTH[pick_by_power(&powers, &mut self.dice)];
        self.exchanges += 1;

        let fighter = &mut self.fighters[attacker.index()];
        let damage = roll_damage(fighter.tuning(), &mut self.dice);
        let from = fighter.enter(CombatState::Attacking { elapsed_ms: 0.0, damage, struck: false });
        self.log.push(format!(
            "[EXCHANGE] #{} {} takes the initiative (power {:.0} vs {:.0}) and swings for {}",
            self.exchanges,
            fighter.name(),
            powers[attacker.index()],
            powers[attacker.other().index()],
            damage
        ));
        debug!(exchange = self.exchanges, attacker = %fighter.id(), damage, "exchange");
        self.notify(attacker, from);
    }

    fn finish(&mut self, winner: Side, ticker: &mut impl TickSource) {
        self.winner = Some(winner);
        self.stop_updates(ticker);
        let champion = &self.fighters[winner.index()];
        let [first, second] = &self.fighters;
        self.log.push(format!(
            "[END] winner={} hp={}/{} exchanges={} elapsed={:.0}ms",
            champion.name(),
            first.hp(),
            second.hp(),
            self.exchanges,
            self.elapsed_ms
        ));
        debug!(
            winner = %champion.id(),
            exchanges = self.exchanges,
            elapsed_ms = self.elapsed_ms,
            "battle resolved"
        );
    }

    fn outcome(&self, winner: Side) -> BattleOutcome {
        let champion = self.combatant(winner);
        BattleOutcome {
            winner,
            winner_id: champion.id().clone(),
            winner_name: champion.name().to_string(),
            final_hp: self.fighters.each_ref().map(Combatant::hp),
            exchanges: self.exchanges,
            ticks: self.ticks,
            elapsed_ms: self.elapsed_ms,
        }
    }

    /// Tell observers about `side` leaving `from`, if it actually changed state.
    fn notify(&mut self, side: Side, from: StateKind) {
        let fighter = &self.fighters[side.index()];
        let to = fighter.state.kind();
        if from == to {
            return;
        }
        let transition = Transition {
            side,
            combatant: fighter.id().clone(),
            from,
            to,
            at_ms: self.elapsed_ms,
        };
        trace!(combatant = %transition.combatant, ?from, ?to, at_ms = transition.at_ms, "transition");
        for observer in &mut self.observers {
            observer(&transition);
        }
    }
}
