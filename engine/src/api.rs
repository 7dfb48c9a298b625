use std::path::Path;

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

use crate::battle::{BattleManager, BattleOutcome, Side};
use crate::combatant::{Combatant, CombatantId};
use crate::config::{load_config, ArenaConfig};
use crate::content::{builtin_config, builtin_roster, load_roster, Roster};
use crate::resolver::win_probability;
use crate::stats::Stats;
use crate::ticker::FixedTicker;
use crate::tournament::{auto_resolve_bracket, run_gauntlet, BracketMatch, GauntletReport};
use crate::Dice;

const DEFAULT_ROSTER: &str = "even_match";

/// Where the fighters and settings for a run come from.
///
/// An inline roster wins over `roster_path`, which wins over `roster_id`;
/// with none of them the `even_match` roster is used. Settings resolve the
/// same way: inline, then `config_path`, then `config_id`, then defaults.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "snake_case")]
pub struct BattleConfig {
    pub roster: Option<Roster>,
    pub roster_path: Option<String>,
    pub roster_id: Option<String>,
    pub arena: Option<ArenaConfig>,
    pub config_path: Option<String>,
    pub config_id: Option<String>,
    pub seed: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct FighterSummary {
    pub id: CombatantId,
    pub name: String,
    pub stats: Stats,
    pub power: u32,
    pub hp: i32,
}

impl FighterSummary {
    fn of(c: &Combatant) -> Self {
        Self {
            id: c.id().clone(),
            name: c.name().to_string(),
            stats: c.stats(),
            power: c.power(),
            hp: c.hp(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct BattleReport {
    pub roster: String,
    pub outcome: BattleOutcome,
    pub fighters: Vec<FighterSummary>,
    pub log: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct BattleStats {
    pub roster: String,
    pub samples: u32,
    pub fighters: Vec<FighterSummary>,
    pub first_wins: u32,
    pub second_wins: u32,
    /// Chance the first fighter takes any single exchange.
    pub exchange_odds: f64,
    pub avg_exchanges: f64,
    pub avg_elapsed_ms: f64,
}

impl BattleStats {
    pub fn first_win_rate(&self) -> f64 {
        if self.samples == 0 {
            0.0
        } else {
            f64::from(self.first_wins) / f64::from(self.samples)
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct BracketReport {
    pub roster: String,
    pub entrants: Vec<FighterSummary>,
    pub rounds: Vec<Vec<BracketMatch>>,
    pub champion: FighterSummary,
}

struct Prepared {
    roster: Roster,
    arena: ArenaConfig,
    dice: Dice,
}

impl Prepared {
    fn load(cfg: BattleConfig) -> Result<Self> {
        let roster = match (cfg.roster, &cfg.roster_path, &cfg.roster_id) {
            (Some(roster), _, _) => roster,
            (None, Some(path), _) => load_roster(Path::new(path))?,
            (None, None, Some(id)) => builtin_roster(id)?,
            (None, None, None) => builtin_roster(DEFAULT_ROSTER)?,
        };
        let arena = match (cfg.arena, &cfg.config_path, &cfg.config_id) {
            (Some(arena), _, _) => {
                arena.validate().context("invalid inline arena config")?;
                arena
            }
            (None, Some(path), _) => load_config(Path::new(path))?,
            (None, None, Some(id)) => builtin_config(id)?,
            (None, None, None) => ArenaConfig::default(),
        };
        Ok(Self { roster, arena, dice: Dice::from_seed(cfg.seed) })
    }

    /// Build combatants for the first `limit` roster entries.
    fn fighters(&mut self, limit: usize) -> Result<Vec<Combatant>> {
        let Self { roster, arena, dice } = self;
        roster
            .fighters
            .iter()
            .take(limit)
            .enumerate()
            .map(|(slot, source)| {
                let id = source.id.clone().map(CombatantId::new).unwrap_or_else(|| CombatantId::slot(slot));
                Combatant::new(id, source, arena.tuning, arena.weights, dice)
                    .with_context(|| format!("invalid fighter '{}' in roster '{}'", source.name, roster.name))
            })
            .collect()
    }

    fn duel(mut self) -> Result<(String, BattleManager, FixedTicker)> {
        if self.roster.fighters.len() < 2 {
            bail!("roster '{}' needs at least two fighters for a battle", self.roster.name);
        }
        let fighters = self.fighters(2)?;
        let ticker = FixedTicker::new(self.arena.tick_ms);
        let mut manager = BattleManager::new(fighters, self.dice)?.with_config(&self.arena);
        manager.setup_positions();
        Ok((self.roster.name, manager, ticker))
    }
}

/// One battle between the roster's first two fighters.
pub fn simulate_battle(cfg: BattleConfig) -> Result<BattleReport> {
    let (roster, mut manager, mut ticker) = Prepared::load(cfg)?.duel()?;
    let outcome = manager.battle(&mut ticker)?;
    Ok(BattleReport {
        roster,
        fighters: manager.combatants().iter().map(FighterSummary::of).collect(),
        log: manager.take_log(),
        outcome,
    })
}

/// `samples` battles between the same two fighters, reset in between.
pub fn simulate_battle_many(cfg: BattleConfig, samples: u32) -> Result<BattleStats> {
    let (roster, mut manager, mut ticker) = Prepared::load(cfg)?.duel()?;
    let fighters: Vec<FighterSummary> = manager.combatants().iter().map(FighterSummary::of).collect();

    let mut first_wins = 0;
    let mut total_exchanges = 0u64;
    let mut total_elapsed_ms = 0.0;
    for _ in 0..samples {
        manager.reset();
        manager.setup_positions();
        let outcome = manager.battle(&mut ticker)?;
        if outcome.winner == Side::First {
            first_wins += 1;
        }
        total_exchanges += u64::from(outcome.exchanges);
        total_elapsed_ms += outcome.elapsed_ms;
    }

    let n = f64::from(samples.max(1));
    Ok(BattleStats {
        roster,
        samples,
        exchange_odds: win_probability(f64::from(fighters[0].power), f64::from(fighters[1].power)),
        fighters,
        first_wins,
        second_wins: samples - first_wins,
        avg_exchanges: total_exchanges as f64 / n,
        avg_elapsed_ms: total_elapsed_ms / n,
    })
}

/// Winner-stays-on run through the whole roster.
pub fn simulate_gauntlet(cfg: BattleConfig) -> Result<GauntletReport> {
    let mut prepared = Prepared::load(cfg)?;
    let fighters = prepared.fighters(usize::MAX)?;
    let mut ticker = FixedTicker::new(prepared.arena.tick_ms);
    let report = run_gauntlet(fighters, &prepared.arena, prepared.dice, &mut ticker)
        .with_context(|| format!("gauntlet '{}' failed", prepared.roster.name))?;
    Ok(report)
}

/// Single-elimination bracket over the whole roster, settled on power alone.
pub fn resolve_bracket(cfg: BattleConfig) -> Result<BracketReport> {
    let mut prepared = Prepared::load(cfg)?;
    let fighters = prepared.fighters(usize::MAX)?;
    let bracket = auto_resolve_bracket(&fighters, &mut prepared.dice)?;
    Ok(BracketReport {
        roster: prepared.roster.name,
        champion: FighterSummary::of(&fighters[bracket.champion]),
        entrants: fighters.iter().map(FighterSummary::of).collect(),
        rounds: bracket.rounds,
    })
}
