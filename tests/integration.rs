// Integration tests (native) for the `noteloop` engine, driven through
// recording ports and virtual timers. No browser APIs are touched.

mod common;

use common::{Game, LogCapture, Setup, today};
use noteloop::clock::day_id;
use noteloop::haptics::{SUCCESS, TAP};
use noteloop::{Action, Command, DayClock, FixedDayClock, GameRules, MemoryStore, Phase, StatusTone, TimerKind};

#[test]
fn boot_waits_for_the_start_gesture() {
    let game = Game::echokeys();
    assert_eq!(game.phase(), Phase::AudioUnlock);
    let view = game.view.borrow();
    assert!(view.unlock_visible);
    assert_eq!(view.symbols, ["Do", "Mi", "Sol"]);
    assert!(!view.enabled);
    assert!(view.actions.is_empty());
    assert_eq!(view.board.level, 1);
    assert!(game.tones.borrow().is_empty());
}

#[test]
fn success_levels_up_and_scores() {
    let mut game = Game::echokeys();
    game.start();
    assert_eq!(game.engine.run().tier.symbol_count(), 3);
    assert_eq!(game.challenge().len(), 1);
    assert!(game.view.borrow().enabled);

    game.answer();
    assert_eq!(game.phase(), Phase::Result { success: true });
    let table = game.engine.rules().scoring;
    let run = game.engine.run();
    assert_eq!((run.level, run.combo), (2, 1));
    assert_eq!(
        run.score,
        table.base_points(1) + table.combo_bonus(1) + table.level_bonus(2)
    );
    assert_eq!(run.score, 15);
    // scored immediately, feedback comes later
    assert_eq!(game.view.borrow().board.score, 15);
    assert_eq!(game.view.borrow().status, "Repeat the 1 note");

    game.settle();
    let view = game.view.borrow();
    assert_eq!(view.status, "✨ Perfect! +15");
    assert_eq!(view.tone, Some(StatusTone::Success));
    assert_eq!(view.actions, [Action::Next, Action::Restart]);
    assert_eq!(view.toasts, ["New best and daily best!"]);
    assert!(game.vibrations.borrow().iter().any(|p| p.as_slice() == SUCCESS));
}

#[test]
fn failure_keeps_level_and_offers_replay_and_retry() {
    let mut game = Game::echokeys();
    game.start();
    game.clear_round();
    let challenge = game.challenge();
    game.answer_wrong();

    assert_eq!(game.phase(), Phase::Result { success: false });
    let run = game.engine.run();
    assert_eq!((run.level, run.score, run.combo), (2, 15, 0));

    game.settle();
    assert_eq!(game.actions(), [Action::Replay, Action::Retry, Action::Restart]);
    assert!(game.view.borrow().status.starts_with('❌'));

    game.send(Command::Retry);
    assert_eq!(game.phase(), Phase::Playback);
    assert!(game.engine.run().input.is_empty());
    assert_eq!(game.challenge(), challenge);
    let first = game.timers.pending_events()[0].1.kind;
    assert_eq!(first, TimerKind::BeginPlayback);

    assert!(game.run_until(|p| p == Phase::Input));
    game.answer();
    assert_eq!(game.engine.run().level, 3);
}

#[test]
fn next_is_the_only_way_forward_after_success() {
    let mut game = Game::echokeys();
    game.start();
    game.answer();
    for command in [Command::Retry, Command::Replay, Command::Select(0)] {
        game.send(command);
        assert_eq!(game.phase(), Phase::Result { success: true });
    }
    game.send(Command::Next);
    assert_eq!(game.phase(), Phase::Playback);
}

#[test]
fn both_records_broken_in_one_round() {
    let store = MemoryStore::with_entries([
        ("echokeys_best", "100"),
        ("echokeys_daily_best", "50"),
        ("echokeys_daily_date", "2026-10-19"),
    ]);
    let rules = GameRules::echokeys()
        .with_overrides(r#"{"scoring": {"per_symbol": 120, "combo_step": 0, "level_step": 0}}"#)
        .unwrap();
    let mut game = Setup::new(rules).store(store.clone()).build();
    assert_eq!(game.view.borrow().board.best, 100);
    game.start();
    game.answer();
    assert_eq!(game.engine.run().score, 120);
    assert_eq!(store.snapshot("echokeys_best").as_deref(), Some("120"));
    assert_eq!(store.snapshot("echokeys_daily_best").as_deref(), Some("120"));
    game.settle();
    assert_eq!(game.toasts(), ["New best and daily best!"]);
}

#[test]
fn daily_only_record_is_reported_as_such() {
    let store = MemoryStore::with_entries([
        ("echokeys_best", "100"),
        ("echokeys_daily_best", "10"),
        ("echokeys_daily_date", "2026-10-19"),
    ]);
    let mut game = Setup::new(GameRules::echokeys()).store(store.clone()).build();
    game.start();
    game.answer();
    game.settle();
    assert_eq!(game.toasts(), ["New daily best!"]);
    assert_eq!(store.snapshot("echokeys_best").as_deref(), Some("100"));
    assert_eq!(store.snapshot("echokeys_daily_best").as_deref(), Some("15"));
}

#[test]
fn selection_during_playback_is_ignored() {
    let mut game = Game::echokeys();
    game.send(Command::Start);
    assert_eq!(game.phase(), Phase::Playback);
    game.send(Command::Select(0));
    game.advance(1100.0);
    assert_eq!(game.phase(), Phase::Playback);
    game.send(Command::Select(1));
    let run = game.engine.run();
    assert!(run.input.is_empty());
    assert_eq!(run.score, 0);
    assert_eq!(game.phase(), Phase::Playback);
    assert!(game.view.borrow().flashes.is_empty());
}

#[test]
fn restart_mid_input_voids_the_old_round() {
    let mut game = Game::echokeys();
    game.start();
    for _ in 0..4 {
        game.clear_round();
    }
    game.answer();
    assert_eq!(game.engine.run().level, 6);
    game.send(Command::Next);
    game.advance(1200.0);
    assert_eq!(game.phase(), Phase::Playback);
    let stale = game.timers.pending_events();
    assert!(!stale.is_empty());

    assert!(game.run_until(|p| p == Phase::Input));
    assert_eq!(game.challenge().len(), 2);
    let first = game.challenge()[0];
    game.send(Command::Select(first));
    assert_eq!(game.view.borrow().status, "1 / 2");

    game.send(Command::Restart);
    let run = game.engine.run();
    assert_eq!((run.level, run.score, run.combo), (1, 0, 0));
    assert_eq!(run.challenge.len(), 1);
    assert!(run.input.is_empty());
    assert_eq!(game.phase(), Phase::Playback);

    let generation = game.engine.generation();
    assert!(
        game.timers
            .pending_events()
            .iter()
            .all(|(_, e)| e.generation == generation)
    );
    let cues = game.view.borrow().cues.len();
    for (_, event) in stale {
        game.engine.on_timer(event);
    }
    assert_eq!(game.phase(), Phase::Playback);
    assert_eq!(game.view.borrow().cues.len(), cues);

    assert!(game.run_until(|p| p == Phase::Input));
    game.answer();
    assert_eq!(game.engine.run().level, 2);
}

#[test]
fn restart_is_refused_before_the_game_starts() {
    let mut game = Game::echokeys();
    game.send(Command::Restart);
    assert_eq!(game.phase(), Phase::AudioUnlock);
    game.send(Command::Next);
    assert_eq!(game.phase(), Phase::AudioUnlock);
}

#[test]
fn replay_mid_input_skips_the_pre_roll() {
    let mut game = Game::echokeys();
    game.start();
    game.send(Command::Replay);
    assert_eq!(game.phase(), Phase::Playback);
    assert_eq!(game.view.borrow().status, "🎵 Listen again...");
    let first = game.timers.pending_events()[0].1.kind;
    assert_eq!(first, TimerKind::Cue { step: 0 });
}

#[test]
fn cues_follow_the_audio_clock() {
    let mut game = Game::echokeys();
    game.send(Command::Start);
    game.advance(1000.0);
    let tones = game.tones.borrow().clone();
    assert_eq!(tones.len(), 1);
    assert!((tones[0].start - 1.1).abs() < 1e-9);
    assert!((tones[0].duration - 0.3).abs() < 1e-9);
    let expected = game.engine.run().tier.symbols[game.challenge()[0]].frequency;
    assert_eq!(tones[0].frequency, expected);

    assert!(game.run_until(|p| p == Phase::Input));
    let view = game.view.borrow();
    assert_eq!(view.cues, [(0, Some(game.challenge()[0]))]);
    assert!(game.vibrations.borrow().iter().any(|p| p.as_slice() == TAP));
}

#[test]
fn missing_audio_degrades_to_visual_playback() {
    let mut game = Setup::new(GameRules::echokeys()).without_audio().build();
    game.start();
    assert_eq!(game.view.borrow().cues.len(), 1);
    game.answer();
    game.settle();
    assert!(game.tones.borrow().is_empty());
    assert_eq!(game.engine.run().level, 2);
}

#[test]
fn sound_and_haptics_settings_gate_feedback() {
    let store = MemoryStore::new();
    let mut game = Setup::new(GameRules::echokeys()).store(store.clone()).build();
    game.send(Command::SetSound(false));
    game.send(Command::SetHaptics(false));
    assert_eq!(store.snapshot("echokeys_sound").as_deref(), Some("false"));
    assert_eq!(store.snapshot("echokeys_vibration").as_deref(), Some("false"));
    let settings = game.view.borrow().settings.unwrap();
    assert!(!settings.sound && !settings.haptics);

    game.start();
    game.answer();
    game.settle();
    assert!(game.tones.borrow().is_empty());
    assert!(game.vibrations.borrow().is_empty());

    game.send(Command::SetHaptics(true));
    assert_eq!(game.vibrations.borrow().as_slice(), [TAP.to_vec()]);
}

#[test]
fn daily_best_resets_across_days() {
    let store = MemoryStore::new();
    let clock = FixedDayClock::new(today());
    let mut game = Setup::new(GameRules::echokeys())
        .store(store.clone())
        .clock(clock.clone())
        .build();
    game.start();
    game.answer();
    drop(game);

    clock.advance_days(1);
    let game = Setup::new(GameRules::echokeys()).store(store.clone()).clock(clock.clone()).build();
    let record = *game.engine.records().record();
    assert_eq!(record.best, 15);
    assert_eq!(record.daily_best, 0);
    assert_eq!(game.view.borrow().board.daily_best, 0);
    assert_eq!(
        store.snapshot("echokeys_daily_date"),
        Some(day_id(clock.today()))
    );
}

#[test]
fn denied_storage_keeps_records_in_memory() {
    let store = MemoryStore::new();
    store.deny_access(true);
    let mut game = Setup::new(GameRules::echokeys()).store(store.clone()).build();
    game.start();
    game.answer();
    game.settle();
    assert_eq!(game.engine.records().record().best, 15);
    assert_eq!(game.toasts(), ["New best and daily best!"]);
    store.deny_access(false);
    assert!(store.is_empty());
}

#[test]
fn failed_storage_writes_are_logged_as_warnings() {
    let store = MemoryStore::new();
    store.deny_access(true);
    let logs = LogCapture::default();
    logs.run(|| {
        let mut game = Setup::new(GameRules::echokeys()).store(store.clone()).build();
        game.start();
        game.answer();
    });
    let warnings = logs.lines_with("storage write failed");
    assert!(!warnings.is_empty(), "no warning in:\n{}", logs.text());
    assert!(warnings.iter().all(|l| l.contains("WARN")));
    assert!(warnings.iter().any(|l| l.contains("echokeys_best")));
    assert!(!logs.lines_with("round solved").is_empty());
}

#[test]
fn key_row_rerenders_only_when_the_table_changes() {
    let mut game = Game::echokeys();
    game.start();
    assert_eq!(game.view.borrow().renders, 1);
    for _ in 0..6 {
        game.clear_round();
    }
    assert_eq!(game.engine.run().level, 7);
    assert_eq!(game.view.borrow().renders, 2);
    assert_eq!(game.view.borrow().symbols.len(), 5);

    game.send(Command::Restart);
    assert_eq!(game.view.borrow().renders, 3);
    assert_eq!(game.view.borrow().symbols, ["Do", "Mi", "Sol"]);
}
