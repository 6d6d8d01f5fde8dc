use std::time::Duration;

use room_crawl_core::{
    Direction, Event, HaltReason, Level, PlayerIntent, RoomPhase, RoomSide,
};
use room_crawl_session::{Session, SessionConfig, SessionError};

fn config(document: &str) -> SessionConfig {
    SessionConfig::from_toml_str(document).expect("valid configuration")
}

const EMPTY_FIRST_ROOM: &str = r#"
seed = 11

[spawn]
hill_count_min = 0
hill_count_max = 0
first_door = 0
levels = [{ grunts = 0 }, { grunts = 2 }]
"#;

#[test]
fn walking_through_the_door_enters_the_next_level() {
    let mut session = Session::new(&config(EMPTY_FIRST_ROOM)).expect("session starts");

    let mut log = Vec::new();
    for _ in 0..7 {
        log.extend(
            session
                .step(PlayerIntent::toward(Direction::Up))
                .expect("session keeps running"),
        );
    }

    assert!(log.contains(&Event::RoomCleared {
        level: Level::FIRST
    }));
    assert!(log.contains(&Event::ExitReached {
        level: Level::FIRST,
        door: RoomSide::Top,
    }));

    let summary = session.snapshot().room.expect("room active");
    assert_eq!(summary.level, Level::new(2));
    assert_eq!(summary.opening, Some(RoomSide::Bottom));
    assert_ne!(summary.door, RoomSide::Bottom);
    assert_eq!(summary.enemies, 2);
    assert_eq!(summary.phase, RoomPhase::Active);
    assert_eq!(session.ticks(), 7);
}

#[test]
fn weapon_leaves_after_its_dwell() {
    let mut session = Session::new(&config(EMPTY_FIRST_ROOM)).expect("session starts");

    let swing = session.step(PlayerIntent::sword()).expect("running");
    assert!(swing
        .iter()
        .any(|event| matches!(event, Event::WeaponSpawned { .. })));

    for _ in 0..4 {
        let events = session.step(PlayerIntent::IDLE).expect("running");
        assert!(!events
            .iter()
            .any(|event| matches!(event, Event::WeaponExpired { .. })));
    }
    assert_eq!(session.snapshot().room.map(|room| room.live_weapons), Some(1));

    let expired = session.step(PlayerIntent::IDLE).expect("running");
    assert!(expired
        .iter()
        .any(|event| matches!(event, Event::WeaponExpired { .. })));
    let summary = session.snapshot().room.expect("room active");
    assert_eq!(summary.live_weapons, 0);
    assert_eq!(summary.clock, Duration::from_millis(600));
}

#[test]
fn same_seed_and_script_replay_identically() {
    let script = [
        PlayerIntent::toward(Direction::Left),
        PlayerIntent::sword(),
        PlayerIntent::toward(Direction::Left),
        PlayerIntent::IDLE,
        PlayerIntent::toward(Direction::Up),
        PlayerIntent::sword(),
        PlayerIntent::toward(Direction::Right),
        PlayerIntent::toward(Direction::Down),
    ];

    let run = || {
        let mut session = Session::new(&config("seed = 99\n")).expect("session starts");
        let mut log = Vec::new();
        for intent in script.iter().cycle().take(60) {
            match session.step(*intent) {
                Ok(events) => log.extend(events),
                Err(SessionError::Halted(_)) => break,
                Err(other) => panic!("unexpected error: {other}"),
            }
        }
        (log, session.snapshot())
    };

    let (first_log, first_snapshot) = run();
    let (second_log, second_snapshot) = run();
    assert_eq!(first_log, second_log);
    assert_eq!(first_snapshot, second_snapshot);
    assert_eq!(first_snapshot.seed, 99);
}

#[test]
fn quitting_stops_further_ticks() {
    let mut session = Session::new(&config(EMPTY_FIRST_ROOM)).expect("session starts");
    let _ = session.step(PlayerIntent::IDLE).expect("running");

    let events = session.quit().expect("first quit is accepted");
    assert!(events.contains(&Event::Halted {
        reason: HaltReason::Quit
    }));
    assert!(!session.is_running());
    assert_eq!(session.halt_reason(), Some(HaltReason::Quit));

    assert!(matches!(
        session.step(PlayerIntent::IDLE),
        Err(SessionError::Halted(HaltReason::Quit))
    ));
    assert!(matches!(
        session.quit(),
        Err(SessionError::Halted(HaltReason::Quit))
    ));
    assert_eq!(session.ticks(), 1);
}

#[test]
fn unusable_configuration_is_refused() {
    let mut config = SessionConfig::default();
    config.grid.columns = 5;

    assert!(matches!(
        Session::new(&config),
        Err(SessionError::Config(_))
    ));
}

#[test]
fn missing_seed_is_drawn_and_reported() {
    let session = Session::new(&SessionConfig::default()).expect("session starts");
    assert_eq!(session.snapshot().seed, session.seed());
    assert!(session.is_running());
    assert_eq!(session.ticks(), 0);
}

#[test]
fn shipped_configuration_matches_the_defaults() {
    let path = concat!(env!("CARGO_MANIFEST_DIR"), "/../config/default.toml");
    let loaded = SessionConfig::load(path).expect("shipped configuration loads");

    assert_eq!(loaded, SessionConfig::default());
}
