use arena::api::{
    resolve_bracket, simulate_battle, simulate_battle_many, simulate_gauntlet, BattleConfig,
};
use arena::content::Roster;
use arena::{ArenaConfig, StatSource};

fn roster_of(points: &[u32]) -> Roster {
    Roster {
        name: "Inline".into(),
        fighters: points
            .iter()
            .enumerate()
            .map(|(i, p)| StatSource::new(format!("Fighter {}", i + 1), *p))
            .collect(),
    }
}

#[test]
fn battle_with_builtins_runs() {
    let cfg = BattleConfig {
        roster_id: Some("mismatch".into()),
        seed: 2025,
        ..BattleConfig::default()
    };
    let report = simulate_battle(cfg).unwrap();
    assert_eq!(report.roster, "Mismatch");
    assert_eq!(report.fighters.len(), 2);
    assert!(report.outcome.exchanges > 0);
    assert!(report.log.iter().any(|l| l.starts_with("[END]")));
}

#[test]
fn same_seed_same_battle() {
    let cfg = || BattleConfig { roster: Some(roster_of(&[40, 45])), seed: 77, ..BattleConfig::default() };
    let a = simulate_battle(cfg()).unwrap();
    let b = simulate_battle(cfg()).unwrap();
    assert_eq!(a.outcome, b.outcome);
    assert_eq!(a.log, b.log);
}

#[test]
fn unnamed_fighters_get_slot_ids() {
    let cfg = BattleConfig { roster: Some(roster_of(&[10, 10])), ..BattleConfig::default() };
    let report = simulate_battle(cfg).unwrap();
    assert_eq!(report.fighters[0].id.as_str(), "slot-0");
    assert_eq!(report.fighters[1].id.as_str(), "slot-1");
}

#[test]
fn single_fighter_roster_cannot_battle() {
    let cfg = BattleConfig { roster: Some(roster_of(&[10])), ..BattleConfig::default() };
    assert!(simulate_battle(cfg).is_err());
}

#[test]
fn unknown_roster_id_is_an_error() {
    let cfg = BattleConfig { roster_id: Some("nobody".into()), ..BattleConfig::default() };
    let err = simulate_battle(cfg).unwrap_err();
    assert!(err.to_string().contains("nobody"));
}

#[test]
fn many_battles_summary_makes_sense() {
    let cfg = BattleConfig { roster_id: Some("even_match".into()), seed: 1, ..BattleConfig::default() };
    let stats = simulate_battle_many(cfg, 50).unwrap();
    assert_eq!(stats.samples, 50);
    assert_eq!(stats.first_wins + stats.second_wins, 50);
    assert!(stats.avg_exchanges >= 2.0);
    assert!(stats.avg_elapsed_ms > 0.0);
}

#[test]
fn inline_config_is_validated() {
    let mut arena = ArenaConfig::default();
    arena.tick_ms = -1.0;
    let cfg = BattleConfig { arena: Some(arena), ..BattleConfig::default() };
    assert!(simulate_battle(cfg).is_err());
}

#[test]
fn gauntlet_runs_through_the_whole_roster() {
    let cfg = BattleConfig { roster_id: Some("gauntlet".into()), seed: 9, ..BattleConfig::default() };
    let report = simulate_gauntlet(cfg).unwrap();
    assert_eq!(report.rounds.len(), 4);
    for (i, round) in report.rounds.iter().enumerate() {
        assert_eq!(round.round as usize, i + 1);
        assert_eq!(round.reward, 10);
        assert!(round.winner == round.champion || round.winner == round.challenger);
        assert!(round.winner_hp > 0);
        assert!(round.log.first().unwrap().starts_with("[START]"));
        assert!(round.log.last().unwrap().starts_with("[REWARD]"));
    }
    for pair in report.rounds.windows(2) {
        assert_eq!(pair[1].champion, pair[0].winner);
    }
    assert_eq!(report.champion, report.rounds[3].winner);
}

#[test]
fn gauntlet_champion_grows_with_every_win() {
    let cfg = BattleConfig { roster: Some(roster_of(&[200, 1, 1, 1])), seed: 3, ..BattleConfig::default() };
    let report = simulate_gauntlet(cfg).unwrap();
    assert_eq!(report.rounds.len(), 3);
    let wins = report.rounds.iter().filter(|r| r.winner == report.champion).count() as u32;
    let starting = if report.champion.as_str() == "slot-0" { 200 } else { 1 };
    assert_eq!(report.champion_stats.power(), starting + wins * 10);
}

#[test]
fn bracket_crowns_one_entrant() {
    let cfg = BattleConfig { roster_id: Some("gauntlet".into()), seed: 5, ..BattleConfig::default() };
    let report = resolve_bracket(cfg).unwrap();
    assert_eq!(report.entrants.len(), 5);
    assert_eq!(report.rounds.len(), 3);
    let last = report.rounds.last().unwrap();
    assert_eq!(last.len(), 1);
    assert_eq!(report.entrants[last[0].winner], report.champion);
}
