use arena::{
    ArenaError, BattleManager, Combatant, CombatTuning, CombatantId, Dice, FixedTicker,
    ScriptedTicker, Side, StatSource, StatWeights, StateKind, TickSource, Vec2,
};
use proptest::prelude::*;

fn fighters(points: &[u32], dice: &mut Dice) -> Vec<Combatant> {
    points
        .iter()
        .enumerate()
        .map(|(i, p)| {
            Combatant::new(
                CombatantId::slot(i),
                &StatSource::new(format!("Lot {}", i + 1), *p),
                CombatTuning::default(),
                StatWeights::default(),
                dice,
            )
            .unwrap()
        })
        .collect()
}

fn manager(points: [u32; 2], seed: u64) -> BattleManager {
    let mut dice = Dice::from_seed(seed);
    let roster = fighters(&points, &mut dice);
    let mut manager = BattleManager::new(roster, dice).unwrap();
    manager.setup_positions();
    manager
}

#[test]
fn roster_must_be_a_pair() {
    let mut dice = Dice::from_seed(1);
    for n in [0usize, 1, 3] {
        let roster = fighters(&vec![10; n], &mut dice);
        let err = BattleManager::new(roster, dice.clone()).err();
        assert_eq!(err, Some(ArenaError::InvalidRoster(n)));
    }
}

#[test]
fn battle_produces_exactly_one_winner() {
    let mut m = manager([50, 50], 7);
    let mut ticker = FixedTicker::sixty_fps();
    let outcome = m.battle(&mut ticker).unwrap();

    let loser = m.combatant(outcome.winner.other());
    let winner = m.combatant(outcome.winner);
    assert!(loser.hp() <= 0);
    assert!(winner.hp().max(0) >= loser.hp().max(0));
    assert_eq!(m.winner_side(), Some(outcome.winner));
    assert_eq!(outcome.winner_id, *winner.id());
    assert!(outcome.exchanges >= 2);
    assert_eq!(outcome.final_hp, [m.combatant(Side::First).hp(), m.combatant(Side::Second).hp()]);
}

#[test]
fn log_is_bracketed_by_start_and_end() {
    let mut m = manager([30, 60], 11);
    let mut ticker = FixedTicker::sixty_fps();
    m.battle(&mut ticker).unwrap();
    let log = m.log();
    assert!(log.first().unwrap().starts_with("[START]"));
    assert!(log.last().unwrap().starts_with("[END]"));
    assert!(log.iter().any(|l| l.starts_with("[EXCHANGE]")));
    assert!(log.iter().any(|l| l.starts_with("[HIT]")));
    assert_eq!(log.iter().filter(|l| l.ends_with(" DOWN")).count(), 1);
}

#[test]
fn resolved_battle_leaves_no_listeners() {
    let mut m = manager([40, 60], 3);
    let mut ticker = FixedTicker::sixty_fps();
    m.battle(&mut ticker).unwrap();
    assert_eq!(ticker.listener_count(), 0);
    assert!(!m.is_engaged());
}

#[test]
fn stalled_ticker_leaves_no_listeners() {
    let mut m = manager([50, 50], 3);
    let mut ticker = FixedTicker::sixty_fps().with_limit(10);
    let err = m.battle(&mut ticker).unwrap_err();
    assert!(matches!(err, ArenaError::Stalled { .. }));
    assert_eq!(ticker.listener_count(), 0);
    assert_eq!(m.winner_side(), None);
}

#[test]
fn watchdog_times_out_and_unsubscribes() {
    let mut m = manager([50, 50], 3).with_watchdog(Some(200.0));
    let mut ticker = FixedTicker::sixty_fps();
    let err = m.battle(&mut ticker).unwrap_err();
    assert_eq!(err, ArenaError::TimedOut { limit_ms: 200.0 });
    assert_eq!(ticker.listener_count(), 0);
}

#[test]
fn one_second_ticks_still_close_and_finish() {
    for seed in 0..20 {
        let mut m = manager([50, 50], seed);
        let mut ticker = FixedTicker::new(1000.0);
        let outcome = m.battle(&mut ticker).unwrap();
        assert!(m.combatant(outcome.winner.other()).hp() <= 0, "seed {seed}");
        assert_eq!(ticker.listener_count(), 0);
    }
}

#[test]
fn coarse_ticks_bring_fighters_into_reach() {
    let mut m = manager([50, 50], 9);
    let mut ticker = ScriptedTicker::new([1000.0, 1000.0]);
    m.start(&mut ticker).unwrap();
    while ticker.advance() {
        m.on_tick(&mut ticker);
    }
    let first = m.combatant(Side::First).position();
    let second = m.combatant(Side::Second).position();
    assert!(first.distance(second) <= 90.0, "{first:?} vs {second:?}");
}

#[test]
#[should_panic(expected = "positive")]
fn zero_step_ticker_is_refused() {
    let _ = FixedTicker::new(0.0);
}

#[test]
fn starting_twice_is_rejected() {
    let mut m = manager([50, 50], 5);
    let mut ticker = FixedTicker::sixty_fps();
    m.start(&mut ticker).unwrap();
    assert_eq!(m.start(&mut ticker), Err(ArenaError::AlreadyEngaged));
    assert_eq!(m.battle(&mut ticker).unwrap_err(), ArenaError::AlreadyEngaged);
    assert_eq!(ticker.listener_count(), 3);
}

#[test]
fn battling_again_without_reset_is_rejected() {
    let mut m = manager([50, 50], 5);
    let mut ticker = FixedTicker::sixty_fps();
    let outcome = m.battle(&mut ticker).unwrap();
    let err = m.battle(&mut ticker).unwrap_err();
    assert_eq!(err, ArenaError::NotReset(outcome.winner_name.clone()));
    assert_eq!(ticker.listener_count(), 0);

    m.reset();
    m.setup_positions();
    assert!(m.battle(&mut ticker).is_ok());
}

#[test]
fn cancelling_mid_battle_freezes_everything() {
    let mut m = manager([50, 50], 9);
    let mut ticker = FixedTicker::sixty_fps();
    m.start(&mut ticker).unwrap();
    for _ in 0..20 {
        ticker.advance();
        m.on_tick(&mut ticker);
    }
    m.stop_updates(&mut ticker);
    m.stop_updates(&mut ticker);
    assert_eq!(ticker.listener_count(), 0);

    let frozen = m.combatant(Side::First).position();
    ticker.advance();
    assert_eq!(m.on_tick(&mut ticker), None);
    assert_eq!(m.combatant(Side::First).position(), frozen);
    assert_eq!(m.winner_side(), None);
}

#[test]
fn stepping_by_hand_matches_the_battle_loop() {
    let mut looped = manager([35, 65], 42);
    let mut ticker = FixedTicker::new(20.0);
    let expected = looped.battle(&mut ticker).unwrap();

    let mut stepped = manager([35, 65], 42);
    let mut ticker = FixedTicker::new(20.0);
    stepped.start(&mut ticker).unwrap();
    let winner = loop {
        assert!(ticker.advance());
        if let Some(side) = stepped.on_tick(&mut ticker) {
            break side;
        }
    };
    assert_eq!(winner, expected.winner);
    assert_eq!(stepped.exchanges(), expected.exchanges);
    assert_eq!(stepped.log(), looped.log());
}

#[test]
fn reset_is_idempotent() {
    let mut m = manager([50, 50], 13);
    let mut ticker = FixedTicker::sixty_fps();
    m.battle(&mut ticker).unwrap();

    m.reset();
    let once: Vec<_> = m.combatants().iter().map(|c| (c.hp(), c.state().kind(), c.is_ready())).collect();
    m.reset();
    let twice: Vec<_> = m.combatants().iter().map(|c| (c.hp(), c.state().kind(), c.is_ready())).collect();

    assert_eq!(once, twice);
    for (hp, kind, ready) in once {
        assert_eq!(hp, 100);
        assert_eq!(kind, StateKind::Seeking);
        assert!(!ready);
    }
    assert_eq!(m.winner_side(), None);
    assert!(m.log().is_empty());
}

#[test]
fn combatants_approach_before_fighting() {
    let mut m = manager([50, 50], 1);
    let mut ticker = ScriptedTicker::new([100.0; 5]);
    m.start(&mut ticker).unwrap();
    while ticker.advance() {
        m.on_tick(&mut ticker);
    }
    // 5 ticks of 100 ms at 220 px/s
    let first = m.combatant(Side::First).position();
    assert!((first.x - (-300.0 + 110.0)).abs() < 1e-9);
    assert_eq!(first.y, 0.0);
    assert_eq!(m.combatant(Side::Second).position(), Vec2::new(300.0 - 110.0, 0.0));
    assert_eq!(m.combatant(Side::First).target(), Some(Vec2::new(300.0 - 88.0, 0.0)));
}

#[test]
fn replace_swaps_a_challenger_in_between_battles() {
    let mut dice = Dice::from_seed(2);
    let mut roster = fighters(&[20, 20, 80], &mut dice);
    let challenger = roster.pop().unwrap();
    let mut m = BattleManager::new(roster, dice).unwrap();
    let mut ticker = FixedTicker::sixty_fps();

    m.start(&mut ticker).unwrap();
    assert!(matches!(
        m.replace(Side::Second, challenger),
        Err(ArenaError::AlreadyEngaged)
    ));
    m.stop_updates(&mut ticker);

    let mut dice = Dice::from_seed(3);
    let fresh = fighters(&[80], &mut dice).pop().unwrap();
    let old = m.replace(Side::Second, fresh).unwrap();
    assert_eq!(old.id().as_str(), "slot-1");
    assert_eq!(old.enemy(), None);
    assert_eq!(m.combatant(Side::Second).power(), 80);
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    #[test]
    fn any_battle_ends_with_one_side_down(a in 0u32..120, b in 0u32..120, seed in any::<u64>()) {
        let mut m = manager([a, b], seed);
        let mut ticker = FixedTicker::sixty_fps();
        let outcome = m.battle(&mut ticker).unwrap();
        let [first, second] = outcome.final_hp;
        prop_assert!(first <= 0 || second <= 0);
        prop_assert_eq!(outcome.winner == Side::Second, second.max(0) > first.max(0));
        prop_assert_eq!(ticker.listener_count(), 0);
    }
}
