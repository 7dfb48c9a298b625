use std::{fmt, fs, path::Path};

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::error::{ArenaError, Result};
use crate::stats::StatWeights;

/// Per-combatant combat timings and distances. Durations are in milliseconds,
/// distances in arena pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "snake_case")]
pub struct CombatTuning {
    pub base_damage: f64,
    /// Fraction of `base_damage` a single attack may deviate by.
    pub damage_variance: f64,
    pub attack_duration_ms: f64,
    /// When the blow lands inside the attack animation.
    pub damage_delay_ms: f64,
    pub damage_received_ms: f64,
    pub roll_duration_ms: f64,
    /// Wind-up after closing in before the combatant is ready to attack.
    pub recovery_ms: f64,
    /// Pixels per second.
    pub move_speed: f64,
    pub attack_range: f64,
    pub knockback_distance: f64,
    pub roll_distance: f64,
}

impl Default for CombatTuning {
    fn default() -> Self {
        Self {
            base_damage: 60.0,
            damage_variance: 0.15,
            attack_duration_ms: 600.0,
            damage_delay_ms: 250.0,
            damage_received_ms: 400.0,
            roll_duration_ms: 450.0,
            recovery_ms: 500.0,
            move_speed: 220.0,
            attack_range: 90.0,
            knockback_distance: 40.0,
            roll_distance: 70.0,
        }
    }
}

impl CombatTuning {
    pub fn validate(&self) -> Result<()> {
        let fields = [
            ("base_damage", self.base_damage),
            ("damage_variance", self.damage_variance),
            ("attack_duration_ms", self.attack_duration_ms),
            ("damage_delay_ms", self.damage_delay_ms),
            ("damage_received_ms", self.damage_received_ms),
            ("roll_duration_ms", self.roll_duration_ms),
            ("recovery_ms", self.recovery_ms),
            ("move_speed", self.move_speed),
            ("attack_range", self.attack_range),
            ("knockback_distance", self.knockback_distance),
            ("roll_distance", self.roll_distance),
        ];
        for (name, value) in fields {
            if !value.is_finite() || value < 0.0 {
                return Err(ArenaError::InvalidTuning(format!(
                    "{name} must be a finite non-negative number, got {value}"
                )));
            }
        }
        if self.damage_variance > 1.0 {
            return Err(ArenaError::InvalidTuning(format!(
                "damage_variance must be at most 1, got {}",
                self.damage_variance
            )));
        }
        if self.damage_delay_ms > self.attack_duration_ms {
            return Err(ArenaError::InvalidTuning(
                "damage_delay_ms must fit inside attack_duration_ms".to_string(),
            ));
        }
        if self.attack_range <= 0.0 || self.move_speed <= 0.0 {
            return Err(ArenaError::InvalidTuning(
                "attack_range and move_speed must be positive".to_string(),
            ));
        }
        let (lo, _) = self.damage_bounds();
        if lo < 1 {
            return Err(ArenaError::InvalidTuning(format!(
                "every attack must deal damage, but the lowest roll is {lo}"
            )));
        }
        Ok(())
    }

    /// Inclusive damage range of a single attack.
    pub fn damage_bounds(&self) -> (i32, i32) {
        let spread = self.base_damage * self.damage_variance;
        (
            (self.base_damage - spread).round() as i32,
            (self.base_damage + spread).round() as i32,
        )
    }

    /// Knockback speed in pixels per millisecond that covers `distance` over
    /// the damage-received window.
    pub fn knockback_speed(&self, distance: f64) -> f64 {
        if self.damage_received_ms > 0.0 { distance / self.damage_received_ms } else { 0.0 }
    }
}

impl fmt::Display for CombatTuning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (lo, hi) = self.damage_bounds();
        writeln!(
            f,
            "{:<18}{:.0} ±{:.0}% ({}..={})",
            "base damage",
            self.base_damage,
            self.damage_variance * 100.0,
            lo,
            hi
        )?;
        writeln!(
            f,
            "{:<18}{:.0} ms (blow lands at {:.0} ms)",
            "attack", self.attack_duration_ms, self.damage_delay_ms
        )?;
        writeln!(
            f,
            "{:<18}{:.0} ms, knockback {:.0} px",
            "damage received", self.damage_received_ms, self.knockback_distance
        )?;
        writeln!(
            f,
            "{:<18}{:.0} ms, up to {:.0} px",
            "roll", self.roll_duration_ms, self.roll_distance
        )?;
        writeln!(f, "{:<18}{:.0} ms", "recovery", self.recovery_ms)?;
        writeln!(f, "{:<18}{:.0} px/s", "move speed", self.move_speed)?;
        write!(
            f,
            "{:<18}{:.0} px across, {:.0} px deep",
            "attack range",
            self.attack_range,
            self.attack_range / 2.0
        )
    }
}

pub const DEFAULT_TICK_MS: f64 = 1000.0 / 60.0;
pub const DEFAULT_WATCHDOG_MS: f64 = 300_000.0;
pub const DEFAULT_SPAWN_OFFSET: f64 = 300.0;
pub const DEFAULT_REWARD_POINTS: u32 = 10;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "snake_case")]
pub struct ArenaConfig {
    pub tuning: CombatTuning,
    pub weights: StatWeights,
    pub tick_ms: f64,
    /// Virtual time after which a battle is abandoned. `None` disables the watchdog.
    pub max_elapsed_ms: Option<f64>,
    pub spawn_offset: f64,
    pub reward_points: u32,
}

impl Default for ArenaConfig {
    fn default() -> Self {
        Self {
            tuning: CombatTuning::default(),
            weights: StatWeights::default(),
            tick_ms: DEFAULT_TICK_MS,
            max_elapsed_ms: Some(DEFAULT_WATCHDOG_MS),
            spawn_offset: DEFAULT_SPAWN_OFFSET,
            reward_points: DEFAULT_REWARD_POINTS,
        }
    }
}

impl ArenaConfig {
    pub fn validate(&self) -> Result<()> {
        self.tuning.validate()?;
        self.weights.validate()?;
        if !(self.tick_ms > 0.0) || !self.tick_ms.is_finite() {
            return Err(ArenaError::InvalidTuning(format!(
                "tick_ms must be positive, got {}",
                self.tick_ms
            )));
        }
        if let Some(limit) = self.max_elapsed_ms {
            if !(limit > 0.0) {
                return Err(ArenaError::InvalidTuning(format!(
                    "max_elapsed_ms must be positive, got {limit}"
                )));
            }
        }
        if !self.spawn_offset.is_finite() || self.spawn_offset < 0.0 {
            return Err(ArenaError::InvalidTuning(format!(
                "spawn_offset must be a finite non-negative number, got {}",
                self.spawn_offset
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Json,
    Yaml,
}

impl Format {
    pub fn from_path(path: &Path) -> Format {
        match path.extension().and_then(|e| e.to_str()).map(str::to_ascii_lowercase) {
            Some(ext) if ext == "yaml" || ext == "yml" => Format::Yaml,
            _ => Format::Json,
        }
    }
}

/// Deserialize `text` in the given format.
pub fn parse_as<T: serde::de::DeserializeOwned>(text: &str, format: Format) -> anyhow::Result<T> {
    let value = match format {
        Format::Json => serde_json::from_str(text)?,
        Format::Yaml => serde_yaml::from_str(text)?,
    };
    Ok(value)
}

pub fn parse_config(text: &str, format: Format) -> anyhow::Result<ArenaConfig> {
    let cfg: ArenaConfig = parse_as(text, format)?;
    cfg.validate()?;
    Ok(cfg)
}

pub fn load_config(path: &Path) -> anyhow::Result<ArenaConfig> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("failed to read arena config: {}", path.display()))?;
    parse_config(&text, Format::from_path(path))
        .with_context(|| format!("failed to parse arena config: {}", path.display()))
}
