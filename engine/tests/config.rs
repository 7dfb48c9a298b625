use std::fs;
use std::path::PathBuf;

use arena::config::{load_config, parse_config, Format};
use arena::content::{builtin_config, builtin_configs, builtin_roster, builtin_rosters, load_roster};
use arena::{ArenaConfig, ArenaError, CombatTuning};

fn scratch(name: &str, body: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("arena-config-{}", std::process::id()));
    fs::create_dir_all(&dir).unwrap();
    let path = dir.join(name);
    fs::write(&path, body).unwrap();
    path
}

#[test]
fn default_tuning_table() {
    let table = CombatTuning::default().to_string();
    insta::assert_snapshot!("default_tuning_table", table);
}

#[test]
fn partial_json_keeps_defaults_for_the_rest() {
    let cfg = parse_config(r#"{ "spawn_offset": 150, "tuning": { "base_damage": 30 } }"#, Format::Json).unwrap();
    assert_eq!(cfg.spawn_offset, 150.0);
    assert_eq!(cfg.tuning.base_damage, 30.0);
    assert_eq!(cfg.tuning.recovery_ms, CombatTuning::default().recovery_ms);
    assert_eq!(cfg.reward_points, 10);
}

#[test]
fn yaml_file_loads_by_extension() {
    let path = scratch(
        "quick.yml",
        "max_elapsed_ms: null\ntick_ms: 10\nweights:\n  attack: 2\n",
    );
    let cfg = load_config(&path).unwrap();
    assert_eq!(cfg.max_elapsed_ms, None);
    assert_eq!(cfg.tick_ms, 10.0);
    assert_eq!(cfg.weights.attack, 2.0);
    assert_eq!(cfg.weights.defense, 1.0);
}

#[test]
fn invalid_values_are_rejected_after_parsing() {
    let err = parse_config(r#"{ "weights": { "agility": -2 } }"#, Format::Json).unwrap_err();
    assert!(matches!(err.downcast_ref::<ArenaError>(), Some(ArenaError::InvalidWeights(_))));

    let err = parse_config("tuning:\n  damage_delay_ms: 900\n", Format::Yaml).unwrap_err();
    assert!(matches!(err.downcast_ref::<ArenaError>(), Some(ArenaError::InvalidTuning(_))));

    let err = parse_config("tick_ms: 0\n", Format::Yaml).unwrap_err();
    assert!(err.to_string().contains("tick_ms"));
}

#[test]
fn missing_file_names_the_path() {
    let err = load_config(&PathBuf::from("no/such/arena.yaml")).unwrap_err();
    assert!(err.to_string().contains("no/such/arena.yaml"));
}

#[test]
fn builtin_default_config_matches_the_code_defaults() {
    assert_eq!(builtin_config("default").unwrap(), ArenaConfig::default());
    let brawl = builtin_config("brawl").unwrap();
    assert_eq!(brawl.tuning.damage_bounds(), (30, 50));
    assert!(builtin_config("nope").is_err());
    assert_eq!(builtin_configs().keys().copied().collect::<Vec<_>>(), ["default", "brawl"]);
}

#[test]
fn every_builtin_roster_parses() {
    for id in builtin_rosters().keys() {
        let roster = builtin_roster(id).unwrap();
        assert!(roster.fighters.len() >= 2, "{id}");
    }
    let mismatch = builtin_roster("mismatch").unwrap();
    let points: Vec<u32> = mismatch.fighters.iter().map(|f| f.points).collect();
    assert_eq!(points, [95, 5]);
}

#[test]
fn roster_file_with_no_fighters_is_refused() {
    let path = scratch("empty.json", r#"{ "name": "Nobody", "fighters": [] }"#);
    let err = load_roster(&path).unwrap_err();
    assert!(format!("{err:#}").contains("no fighters"));
}
