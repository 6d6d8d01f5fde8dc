use std::time::Duration;

use room_crawl_core::{
    ActorKind, CellCoord, Command, CommandError, Direction, EnemySpawn, Event, Grid, Level,
    RoomLayout, RoomPhase, RoomSide,
};
use room_crawl_world::{self as world, query, World, DEFAULT_WEAPON_DWELL};

fn first_layout() -> RoomLayout {
    RoomLayout {
        grid: Grid::default(),
        level: Level::FIRST,
        door: RoomSide::Top,
        opening: None,
        hills: vec![CellCoord::new(2, 10), CellCoord::new(10, 2)],
        enemies: vec![EnemySpawn {
            cell: CellCoord::new(7, 6),
            health: 2,
            patrol: Direction::Left,
        }],
    }
}

fn run(world: &mut World, command: Command) -> Vec<Event> {
    let mut events = Vec::new();
    world::apply(world, command, &mut events);
    events
}

#[test]
fn clearing_a_room_and_walking_out_reports_the_exit_once() {
    let mut world = World::new();
    let _ = run(
        &mut world,
        Command::EnterRoom {
            layout: first_layout(),
        },
    );
    let player = query::player(&world).expect("room entered");
    let enemy = query::actor_view(&world)
        .enemies()
        .next()
        .map(|snapshot| snapshot.id)
        .expect("enemy spawned");

    let first_hit = run(&mut world, Command::Swing { actor: player });
    assert!(first_hit.contains(&Event::EnemyDamaged { enemy, health: 1 }));

    let blocked = run(&mut world, Command::Swing { actor: player });
    assert!(matches!(
        blocked.as_slice(),
        [Event::SwingRejected { .. }]
    ));

    let _ = run(
        &mut world,
        Command::Tick {
            dt: DEFAULT_WEAPON_DWELL,
        },
    );
    let second_hit = run(&mut world, Command::Swing { actor: player });
    assert!(second_hit.contains(&Event::EnemyDefeated {
        enemy,
        cell: CellCoord::new(7, 6)
    }));
    assert!(query::actor_view(&world).get(enemy).is_none());

    let cleared = run(&mut world, Command::ResolveTick);
    assert_eq!(
        cleared,
        vec![
            Event::RoomCleared { level: Level::FIRST },
            Event::DoorOpened {
                cell: CellCoord::new(7, 0)
            },
        ]
    );

    let mut exits = 0;
    for _ in 0..7 {
        let moved = run(
            &mut world,
            Command::StepActor {
                actor: player,
                direction: Direction::Up,
            },
        );
        assert!(matches!(moved.as_slice(), [Event::ActorMoved { .. }]));
        exits += run(&mut world, Command::ResolveTick)
            .iter()
            .filter(|event| matches!(event, Event::ExitReached { .. }))
            .count();
    }
    assert_eq!(exits, 1);
    assert!(run(&mut world, Command::ResolveTick).is_empty());

    let snapshot = query::actor_view(&world)
        .player()
        .copied()
        .expect("player");
    assert_eq!(snapshot.cell, CellCoord::new(7, 0));

    let next = RoomLayout {
        level: Level::new(2),
        door: RoomSide::Left,
        opening: Some(RoomSide::Bottom),
        hills: Vec::new(),
        enemies: Vec::new(),
        ..first_layout()
    };
    let entered = run(&mut world, Command::EnterRoom { layout: next });
    assert!(matches!(
        entered.as_slice(),
        [Event::RoomEntered {
            level,
            opening: Some(RoomSide::Bottom),
            ..
        }] if *level == Level::new(2)
    ));
    assert_eq!(query::phase(&world), Some(RoomPhase::Active));
    let opening = query::registry(&world)
        .and_then(|registry| registry.occupant_at(CellCoord::new(7, 14)))
        .map(|actor| actor.kind());
    assert_eq!(opening, Some(ActorKind::Opening));
}

#[test]
fn closed_door_blocks_the_player() {
    let mut world = World::new();
    let _ = run(
        &mut world,
        Command::EnterRoom {
            layout: RoomLayout {
                enemies: vec![EnemySpawn {
                    cell: CellCoord::new(2, 2),
                    health: 2,
                    patrol: Direction::Left,
                }],
                ..first_layout()
            },
        },
    );
    let player = query::player(&world).expect("player");

    let mut last = Vec::new();
    for _ in 0..8 {
        last = run(
            &mut world,
            Command::StepActor {
                actor: player,
                direction: Direction::Up,
            },
        );
    }

    assert!(matches!(
        last.as_slice(),
        [Event::MoveBlocked {
            direction: Direction::Up,
            ..
        }]
    ));
    let snapshot = query::actor_view(&world)
        .player()
        .copied()
        .expect("player");
    assert_eq!(snapshot.cell, CellCoord::new(7, 1));
}

#[test]
fn weapon_is_gone_exactly_one_dwell_after_the_swing() {
    let mut world = World::new();
    let _ = run(
        &mut world,
        Command::EnterRoom {
            layout: RoomLayout {
                enemies: Vec::new(),
                ..first_layout()
            },
        },
    );
    let player = query::player(&world).expect("player");
    let _ = run(
        &mut world,
        Command::Tick {
            dt: Duration::from_millis(100),
        },
    );
    let _ = run(&mut world, Command::Swing { actor: player });

    let weapons = |world: &World| {
        query::actor_view(world)
            .iter()
            .filter(|actor| actor.kind == ActorKind::Weapon)
            .count()
    };
    for _ in 0..4 {
        let _ = run(
            &mut world,
            Command::Tick {
                dt: Duration::from_millis(100),
            },
        );
        assert_eq!(weapons(&world), 1);
    }
    let _ = run(
        &mut world,
        Command::Tick {
            dt: Duration::from_millis(100),
        },
    );
    assert_eq!(weapons(&world), 0);
}

#[test]
fn stepping_a_missing_actor_is_rejected() {
    let mut world = World::new();
    let _ = run(
        &mut world,
        Command::EnterRoom {
            layout: first_layout(),
        },
    );
    let ghost = room_crawl_core::EntityId::new(10_000);

    let events = run(
        &mut world,
        Command::StepActor {
            actor: ghost,
            direction: Direction::Up,
        },
    );

    assert_eq!(
        events,
        vec![Event::CommandRejected {
            reason: CommandError::UnknownActor(ghost)
        }]
    );
}
