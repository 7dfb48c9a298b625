use std::ops::AddAssign;

use serde::{Deserialize, Serialize};

use crate::combatant::Combatant;
use crate::error::{ArenaError, Result};
use crate::resolver::draw_index;
use crate::Dice;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stat {
    Attack,
    Defense,
    Agility,
}

impl Stat {
    pub const ALL: [Stat; 3] = [Stat::Attack, Stat::Defense, Stat::Agility];
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stats {
    pub attack: u32,
    pub defense: u32,
    pub agility: u32,
}

impl Stats {
    pub fn get(&self, stat: Stat) -> u32 {
        match stat {
            Stat::Attack => self.attack,
            Stat::Defense => self.defense,
            Stat::Agility => self.agility,
        }
    }

    fn get_mut(&mut self, stat: Stat) -> &mut u32 {
        match stat {
            Stat::Attack => &mut self.attack,
            Stat::Defense => &mut self.defense,
            Stat::Agility => &mut self.agility,
        }
    }

    pub fn power(&self) -> u32 {
        self.attack + self.defense + self.agility
    }
}

impl AddAssign for Stats {
    fn add_assign(&mut self, rhs: Stats) {
        self.attack += rhs.attack;
        self.defense += rhs.defense;
        self.agility += rhs.agility;
    }
}

/// Relative odds of each channel receiving a point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StatWeights {
    pub attack: f64,
    pub defense: f64,
    pub agility: f64,
}

impl Default for StatWeights {
    fn default() -> Self {
        Self { attack: 1.0, defense: 1.0, agility: 1.0 }
    }
}

impl StatWeights {
    pub fn new(attack: f64, defense: f64, agility: f64) -> Result<Self> {
        let weights = Self { attack, defense, agility };
        weights.validate()?;
        Ok(weights)
    }

    pub fn validate(&self) -> Result<()> {
        for stat in Stat::ALL {
            let w = self.weight(stat);
            if !w.is_finite() || w < 0.0 {
                return Err(ArenaError::InvalidWeights(format!(
                    "{:?} weight must be a finite non-negative number, got {}",
                    stat, w
                )));
            }
        }
        Ok(())
    }

    pub fn weight(&self, stat: Stat) -> f64 {
        match stat {
            Stat::Attack => self.attack,
            Stat::Defense => self.defense,
            Stat::Agility => self.agility,
        }
    }
}

/// Spend `points` one at a time on channels drawn by weight. Returns the growth.
pub fn distribute(stats: &mut Stats, points: u32, weights: &StatWeights, dice: &mut Dice) -> Stats {
    let table = Stat::ALL.map(|s| weights.weight(s));
    let mut growth = Stats::default();
    for _ in 0..points {
        let stat = Stat::ALL[draw_index(&table, dice)];
        *growth.get_mut(stat) += 1;
    }
    *stats += growth;
    growth
}

/// Deal a pooled reward across `recipients` point by point with equal odds,
/// then grow each recipient by its share using its own weights.
///
/// Returns each recipient's share, in order.
pub fn distribute_reward(pool: u32, recipients: &mut [&mut Combatant], dice: &mut Dice) -> Vec<u32> {
    let mut shares = vec![0u32; recipients.len()];
    if recipients.is_empty() {
        return shares;
    }
    let even = vec![1.0; recipients.len()];
    for _ in 0..pool {
        shares[draw_index(&even, dice)] += 1;
    }
    for (combatant, share) in recipients.iter_mut().zip(&shares) {
        combatant.grow(*share, dice);
    }
    shares
}
