use std::{fs, path::Path};

use anyhow::{anyhow, Context, Result};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::combatant::StatSource;
use crate::config::{parse_as, parse_config, ArenaConfig, Format};

/// A named list of fighters. Battles use the first two.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Roster {
    pub name: String,
    pub fighters: Vec<StatSource>,
}

pub fn builtin_rosters() -> IndexMap<&'static str, (Format, &'static str)> {
    IndexMap::from([
        (
            "even_match",
            (Format::Json, include_str!("../content/rosters/even_match.json")),
        ),
        (
            "mismatch",
            (Format::Json, include_str!("../content/rosters/mismatch.json")),
        ),
        (
            "gauntlet",
            (Format::Yaml, include_str!("../content/rosters/gauntlet.yaml")),
        ),
    ])
}

pub fn builtin_configs() -> IndexMap<&'static str, (Format, &'static str)> {
    IndexMap::from([
        (
            "default",
            (Format::Yaml, include_str!("../content/config/arena.yaml")),
        ),
        (
            "brawl",
            (Format::Json, include_str!("../content/config/brawl.json")),
        ),
    ])
}

pub fn builtin_roster(id: &str) -> Result<Roster> {
    let (format, text) = builtin_rosters()
        .get(id)
        .copied()
        .ok_or_else(|| anyhow!("unknown roster id: {}", id))?;
    parse_roster(text, format).with_context(|| format!("failed to parse builtin roster: {}", id))
}

pub fn builtin_config(id: &str) -> Result<ArenaConfig> {
    let (format, text) = builtin_configs()
        .get(id)
        .copied()
        .ok_or_else(|| anyhow!("unknown config id: {}", id))?;
    parse_config(text, format).with_context(|| format!("failed to parse builtin config: {}", id))
}

pub fn parse_roster(text: &str, format: Format) -> Result<Roster> {
    let roster: Roster = parse_as(text, format)?;
    if roster.fighters.is_empty() {
        return Err(anyhow!("roster '{}' has no fighters", roster.name));
    }
    Ok(roster)
}

pub fn load_roster(path: &Path) -> Result<Roster> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("failed to read roster: {}", path.display()))?;
    parse_roster(&text, Format::from_path(path))
        .with_context(|| format!("failed to parse roster: {}", path.display()))
}
