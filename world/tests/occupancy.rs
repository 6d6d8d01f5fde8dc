use proptest::prelude::*;
use room_crawl_core::{ActorKind, CellCoord, Direction, Grid};
use room_crawl_world::{attempt_move, EntityRegistry};

const GRID: Grid = Grid::new(7, 7, 45);

#[derive(Clone, Debug)]
enum Operation {
    Insert { kind: ActorKind, cell: CellCoord },
    Step { pick: usize, direction: Direction },
    Remove { pick: usize },
}

fn kind() -> impl Strategy<Value = ActorKind> {
    prop_oneof![
        Just(ActorKind::Player),
        Just(ActorKind::Wall),
        Just(ActorKind::Hill),
        Just(ActorKind::Weapon),
        Just(ActorKind::Opening),
        any::<bool>().prop_map(|open| ActorKind::Door { open }),
        (1_u32..=3).prop_map(|health| ActorKind::Enemy {
            health,
            patrol: Direction::Left,
        }),
    ]
}

fn direction() -> impl Strategy<Value = Direction> {
    prop::sample::select(Direction::ALL.to_vec())
}

fn operation() -> impl Strategy<Value = Operation> {
    prop_oneof![
        3 => (kind(), 0_u32..9, 0_u32..9).prop_map(|(kind, column, row)| Operation::Insert {
            kind,
            cell: CellCoord::new(column, row),
        }),
        5 => (any::<usize>(), direction())
            .prop_map(|(pick, direction)| Operation::Step { pick, direction }),
        1 => any::<usize>().prop_map(|pick| Operation::Remove { pick }),
    ]
}

fn assert_single_obstacle_per_cell(registry: &EntityRegistry) -> Result<(), TestCaseError> {
    for row in 0..GRID.rows() {
        for column in 0..GRID.columns() {
            let cell = CellCoord::new(column, row);
            let obstacles: Vec<_> = registry
                .occupants_at(cell)
                .filter(|actor| actor.flags().obstacle)
                .map(|actor| actor.id())
                .collect();
            prop_assert!(obstacles.len() <= 1, "cell {cell} holds {obstacles:?}");
            prop_assert_eq!(registry.obstacle_at(cell), obstacles.first().copied());
        }
    }
    for actor in registry.iter() {
        prop_assert!(GRID.contains(actor.cell()));
    }
    Ok(())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    #[test]
    fn obstacles_never_share_a_cell(operations in prop::collection::vec(operation(), 1..80)) {
        let mut registry = EntityRegistry::new(GRID);

        for operation in operations {
            match operation {
                Operation::Insert { kind, cell } => {
                    let _ = registry.insert(kind, cell, Direction::Up);
                }
                Operation::Step { pick, direction } => {
                    let ids: Vec<_> = registry
                        .iter()
                        .filter(|actor| actor.kind().is_mobile())
                        .map(|actor| actor.id())
                        .collect();
                    if !ids.is_empty() {
                        let actor = ids[pick % ids.len()];
                        let _ = attempt_move(&mut registry, actor, direction)
                            .expect("registered actor");
                    }
                }
                Operation::Remove { pick } => {
                    let ids: Vec<_> = registry.iter().map(|actor| actor.id()).collect();
                    if !ids.is_empty() {
                        let _ = registry.remove(ids[pick % ids.len()]);
                    }
                }
            }
            assert_single_obstacle_per_cell(&registry)?;
        }
    }

    #[test]
    fn blocked_moves_change_nothing(
        column in 0_u32..7,
        row in 0_u32..7,
        direction in direction(),
    ) {
        let mut registry = EntityRegistry::new(GRID);
        let start = CellCoord::new(column, row);
        let player = registry
            .insert(ActorKind::Player, start, direction)
            .expect("empty grid");
        if let Some(target) = start.neighbor(direction).filter(|cell| GRID.contains(*cell)) {
            let _ = registry
                .insert(ActorKind::Hill, target, Direction::Up)
                .expect("free neighbour");
        }

        let outcome = attempt_move(&mut registry, player, direction).expect("player");

        prop_assert!(matches!(outcome, room_crawl_world::MoveOutcome::Blocked(_)));
        let actor = registry.get(player).expect("player");
        prop_assert_eq!(actor.cell(), start);
        prop_assert_eq!(actor.facing(), direction);
    }
}
