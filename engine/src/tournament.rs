//! Formats that chain more than one fight.

use serde::Serialize;
use tracing::info;

use crate::battle::{BattleManager, Side};
use crate::combatant::{Combatant, CombatantId};
use crate::config::ArenaConfig;
use crate::error::{ArenaError, Result};
use crate::resolver::{resolve_index, Weighted};
use crate::stats::Stats;
use crate::ticker::TickSource;
use crate::Dice;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GauntletRound {
    pub round: u32,
    pub champion: CombatantId,
    pub challenger: CombatantId,
    pub winner: CombatantId,
    pub winner_hp: i32,
    pub exchanges: u32,
    pub elapsed_ms: f64,
    /// Points the winner absorbed after the bout.
    pub reward: u32,
    pub log: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GauntletReport {
    pub rounds: Vec<GauntletRound>,
    pub champion: CombatantId,
    pub champion_name: String,
    pub champion_stats: Stats,
}

/// Winner stays on. The first two combatants open, then each remaining one
/// challenges whoever won the previous bout. Every winner absorbs
/// `cfg.reward_points` and both sides go back to full hp before the next bout.
pub fn run_gauntlet(
    roster: Vec<Combatant>,
    cfg: &ArenaConfig,
    dice: Dice,
    ticker: &mut impl TickSource,
) -> Result<GauntletReport> {
    if roster.len() < 2 {
        return Err(ArenaError::InvalidRoster(roster.len()));
    }
    let mut queue = roster.into_iter();
    let opening: Vec<Combatant> = queue.by_ref().take(2).collect();
    let mut manager = BattleManager::new(opening, dice)?.with_config(cfg);

    let mut holder = Side::First;
    let mut rounds = Vec::new();
    loop {
        manager.setup_positions();
        let champion = manager.combatant(holder).id().clone();
        let challenger = manager.combatant(holder.other()).id().clone();

        let outcome = manager.battle(ticker)?;
        let reward = manager.reward(&[outcome.winner], cfg.reward_points);
        let round = rounds.len() as u32 + 1;
        info!(round, winner = %outcome.winner_id, exchanges = outcome.exchanges, "gauntlet bout");
        rounds.push(GauntletRound {
            round,
            champion,
            challenger,
            winner: outcome.winner_id.clone(),
            winner_hp: outcome.final_hp[outcome.winner.index()],
            exchanges: outcome.exchanges,
            elapsed_ms: outcome.elapsed_ms,
            reward: reward.iter().sum(),
            log: manager.take_log(),
        });

        holder = outcome.winner;
        let Some(next) = queue.next() else { break };
        manager.replace(holder.other(), next)?;
        manager.reset();
    }

    let champion = manager.combatant(holder);
    Ok(GauntletReport {
        champion: champion.id().clone(),
        champion_name: champion.name().to_string(),
        champion_stats: champion.stats(),
        rounds,
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BracketMatch {
    pub home: usize,
    /// `None` for a bye.
    pub away: Option<usize>,
    pub winner: usize,
}

/// Indices refer to the candidate slice the bracket was drawn from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Bracket {
    pub rounds: Vec<Vec<BracketMatch>>,
    pub champion: usize,
}

/// Single elimination settled by the resolver alone, no combat simulated.
/// Neighbours are paired in order; an odd one out gets a bye.
pub fn auto_resolve_bracket<T: Weighted>(candidates: &[T], dice: &mut Dice) -> Result<Bracket> {
    if candidates.is_empty() {
        return Err(ArenaError::NoCandidates);
    }

    let mut alive: Vec<usize> = (0..candidates.len()).collect();
    let mut rounds = Vec::new();
    while alive.len() > 1 {
        let mut matches = Vec::with_capacity(alive.len().div_ceil(2));
        for pair in alive.chunks(2) {
            let m = match *pair {
                [home, away] => {
                    let powers = [candidates[home].power(), candidates[away].power()];
                    let winner = if resolve_index(&powers, dice)? == 0 { home } else { away };
                    BracketMatch { home, away: Some(away), winner }
                }
                [home] => BracketMatch { home, away: None, winner: home },
                _ => unreachable!("chunks(2) yields one or two entries"),
            };
            matches.push(m);
        }
        alive = matches.iter().map(|m| m.winner).collect();
        rounds.push(matches);
    }

    Ok(Bracket { rounds, champion: alive[0] })
}
