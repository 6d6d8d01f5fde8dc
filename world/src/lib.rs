#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative world state management for Room Crawl.
//!
//! The world owns the active room and the simulated clock. Every mutation
//! arrives as a [`Command`] through [`apply`]; outcomes are broadcast as
//! [`Event`] values. Read access goes through the [`query`] module.

mod combat;
mod movement;
mod registry;
mod room;

use std::time::Duration;

use room_crawl_core::{Command, CommandError, Event, RoomPhase, WELCOME_BANNER};
use tracing::{debug, error};

pub use combat::DEFAULT_WEAPON_DWELL;
pub use movement::{attempt_move, MoveOutcome};
pub use registry::{Actor, EntityRegistry, PlacementError};
pub use room::{validate_layout, BuildError, MAX_GRID_EDGE, MIN_GRID_EDGE};

use room::Room;

/// Represents the authoritative Room Crawl world state.
#[derive(Debug)]
pub struct World {
    banner: &'static str,
    room: Option<Room>,
    clock: Duration,
    weapon_dwell: Duration,
}

impl World {
    /// Creates an empty world waiting for its first room.
    #[must_use]
    pub fn new() -> Self {
        Self {
            banner: WELCOME_BANNER,
            room: None,
            clock: Duration::ZERO,
            weapon_dwell: DEFAULT_WEAPON_DWELL,
        }
    }

    fn room_mut(&mut self) -> Result<&mut Room, CommandError> {
        self.room.as_mut().ok_or(CommandError::NoRoom)
    }

    fn is_terminal(&self) -> bool {
        self.room
            .as_ref()
            .is_some_and(|room| matches!(room.phase(), RoomPhase::Terminal(_)))
    }

    fn accepts_new_room(&self) -> bool {
        self.room.as_ref().map_or(true, Room::exit_reported)
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

/// Applies the provided command to the world, mutating state deterministically.
///
/// Once the room is terminal every command is refused with
/// [`CommandError::InvalidTransition`] and nothing changes.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    if world.is_terminal() {
        reject(CommandError::InvalidTransition, &command, out_events);
        return;
    }

    if let Err(reason) = execute(world, &command, out_events) {
        reject(reason, &command, out_events);
    }
}

fn execute(
    world: &mut World,
    command: &Command,
    out_events: &mut Vec<Event>,
) -> Result<(), CommandError> {
    match command {
        Command::ConfigureWeaponDwell { dwell } => {
            world.weapon_dwell = *dwell;
            Ok(())
        }
        Command::EnterRoom { layout } => {
            if !world.accepts_new_room() {
                return Err(CommandError::InvalidTransition);
            }
            let room = Room::build(layout).map_err(|build_error| {
                error!(error = %build_error, level = layout.level.get(), "room construction failed");
                CommandError::InvalidLayout
            })?;
            out_events.push(Event::RoomEntered {
                level: room.level(),
                door: room.door(),
                opening: room.opening(),
                player: room.player(),
            });
            world.room = Some(room);
            Ok(())
        }
        Command::Tick { dt } => {
            world.clock = world.clock.saturating_add(*dt);
            let now = world.clock;
            if let Some(room) = world.room.as_mut() {
                room.expire_weapons(now, out_events);
            }
            out_events.push(Event::TimeAdvanced { dt: *dt });
            Ok(())
        }
        Command::StepActor { actor, direction } => {
            world.room_mut()?.step(*actor, *direction, out_events)
        }
        Command::SetPatrol { enemy, direction } => {
            world.room_mut()?.set_patrol(*enemy, *direction, out_events)
        }
        Command::Swing { actor } => {
            let now = world.clock;
            let dwell = world.weapon_dwell;
            world.room_mut()?.swing(*actor, now, dwell, out_events)
        }
        Command::ResolveTick => {
            world.room_mut()?.resolve(out_events);
            Ok(())
        }
        Command::Halt { reason } => {
            world.room_mut()?.halt(*reason, out_events);
            Ok(())
        }
    }
}

fn reject(reason: CommandError, command: &Command, out_events: &mut Vec<Event>) {
    debug!(%reason, ?command, "command rejected");
    out_events.push(Event::CommandRejected { reason });
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use std::time::Duration;

    use room_crawl_core::{
        ActorView, CellCoord, EntityId, Grid, Level, OccupancyView, RoomPhase, RoomSide,
    };
    use serde::Serialize;

    use super::World;
    use crate::registry::EntityRegistry;

    /// Retrieves the welcome banner that adapters may display to players.
    #[must_use]
    pub fn welcome_banner(world: &World) -> &'static str {
        world.banner
    }

    /// Simulated time accumulated from every applied tick.
    #[must_use]
    pub fn clock(world: &World) -> Duration {
        world.clock
    }

    /// Lifetime currently assigned to new weapon hitboxes.
    #[must_use]
    pub fn weapon_dwell(world: &World) -> Duration {
        world.weapon_dwell
    }

    /// Lifecycle phase of the active room, if one has been entered.
    #[must_use]
    pub fn phase(world: &World) -> Option<RoomPhase> {
        world.room.as_ref().map(|room| room.phase())
    }

    /// Reports whether ticks are still processed.
    #[must_use]
    pub fn is_running(world: &World) -> bool {
        !world.is_terminal()
    }

    /// Reports whether the active room has been cleared of enemies.
    #[must_use]
    pub fn is_cleared(world: &World) -> bool {
        phase(world) == Some(RoomPhase::Cleared)
    }

    /// Identifier of the player inside the active room.
    #[must_use]
    pub fn player(world: &World) -> Option<EntityId> {
        world.room.as_ref().map(|room| room.player())
    }

    /// Grid of the active room.
    #[must_use]
    pub fn grid(world: &World) -> Option<Grid> {
        world.room.as_ref().map(|room| room.grid())
    }

    /// Read-only access to the registry of the active room.
    #[must_use]
    pub fn registry(world: &World) -> Option<&EntityRegistry> {
        world.room.as_ref().map(|room| room.registry())
    }

    /// Captures every live actor in insertion order; empty before the first room.
    #[must_use]
    pub fn actor_view(world: &World) -> ActorView {
        registry(world)
            .map(EntityRegistry::actor_view)
            .unwrap_or_default()
    }

    /// Exposes the dense obstacle layer of the active room.
    #[must_use]
    pub fn occupancy_view(world: &World) -> Option<OccupancyView<'_>> {
        registry(world).map(EntityRegistry::occupancy_view)
    }

    /// Number of enemies left in the active room.
    #[must_use]
    pub fn enemy_count(world: &World) -> usize {
        registry(world).map_or(0, EntityRegistry::enemy_count)
    }

    /// Summarises the active room.
    #[must_use]
    pub fn room_summary(world: &World) -> Option<RoomSummary> {
        world.room.as_ref().map(|room| RoomSummary {
            level: room.level(),
            door: room.door(),
            opening: room.opening(),
            door_cell: room.door_cell(),
            phase: room.phase(),
            enemies: room.registry().enemy_count(),
            live_weapons: room.live_weapons(),
            exit_reached: room.exit_reported(),
            clock: world.clock,
        })
    }

    /// Headline state of the active room.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
    pub struct RoomSummary {
        /// Difficulty level.
        pub level: Level,
        /// Side holding the exit door.
        pub door: RoomSide,
        /// Side the player entered through.
        pub opening: Option<RoomSide>,
        /// Cell holding the exit door.
        pub door_cell: CellCoord,
        /// Lifecycle phase.
        pub phase: RoomPhase,
        /// Enemies still alive.
        pub enemies: usize,
        /// Weapon hitboxes awaiting expiry.
        pub live_weapons: usize,
        /// Whether the player has reached the open door.
        pub exit_reached: bool,
        /// Simulated time at the moment of the summary.
        pub clock: Duration,
    }
}

#[cfg(test)]
mod tests {
    use room_crawl_core::{
        ActorKind, CellCoord, Direction, EnemySpawn, Grid, HaltReason, Level, RoomLayout,
        RoomSide,
    };

    use super::*;

    fn layout(enemies: Vec<EnemySpawn>) -> RoomLayout {
        RoomLayout {
            grid: Grid::default(),
            level: Level::FIRST,
            door: RoomSide::Top,
            opening: None,
            hills: Vec::new(),
            enemies,
        }
    }

    fn entered(enemies: Vec<EnemySpawn>) -> (World, Vec<Event>) {
        let mut world = World::new();
        let mut events = Vec::new();
        apply(
            &mut world,
            Command::EnterRoom {
                layout: layout(enemies),
            },
            &mut events,
        );
        (world, events)
    }

    #[test]
    fn world_starts_without_a_room() {
        let world = World::new();
        assert_eq!(query::welcome_banner(&world), WELCOME_BANNER);
        assert_eq!(query::phase(&world), None);
        assert!(query::actor_view(&world).is_empty());
        assert!(query::is_running(&world));
    }

    #[test]
    fn room_commands_need_a_room() {
        let mut world = World::new();
        let mut events = Vec::new();

        apply(&mut world, Command::ResolveTick, &mut events);

        assert_eq!(
            events,
            vec![Event::CommandRejected {
                reason: CommandError::NoRoom
            }]
        );
    }

    #[test]
    fn entering_a_room_announces_the_player() {
        let (world, events) = entered(Vec::new());
        let player = query::player(&world).expect("room entered");

        assert_eq!(
            events,
            vec![Event::RoomEntered {
                level: Level::FIRST,
                door: RoomSide::Top,
                opening: None,
                player,
            }]
        );
        let snapshot = query::actor_view(&world)
            .player()
            .copied()
            .expect("player snapshot");
        assert_eq!(snapshot.cell, CellCoord::new(7, 7));
    }

    #[test]
    fn second_room_is_refused_until_exit_is_reached() {
        let (mut world, _) = entered(Vec::new());
        let mut events = Vec::new();

        apply(
            &mut world,
            Command::EnterRoom {
                layout: layout(Vec::new()),
            },
            &mut events,
        );

        assert_eq!(
            events,
            vec![Event::CommandRejected {
                reason: CommandError::InvalidTransition
            }]
        );
    }

    #[test]
    fn invalid_layout_is_rejected_without_a_room() {
        let mut world = World::new();
        let mut events = Vec::new();
        let mut plan = layout(Vec::new());
        plan.grid = Grid::new(4, 4, 45);

        apply(&mut world, Command::EnterRoom { layout: plan }, &mut events);

        assert_eq!(
            events,
            vec![Event::CommandRejected {
                reason: CommandError::InvalidLayout
            }]
        );
        assert_eq!(query::phase(&world), None);
    }

    #[test]
    fn halted_world_rejects_everything() {
        let (mut world, _) = entered(Vec::new());
        let mut events = Vec::new();

        apply(
            &mut world,
            Command::Halt {
                reason: HaltReason::Quit,
            },
            &mut events,
        );
        assert_eq!(
            events,
            vec![Event::Halted {
                reason: HaltReason::Quit
            }]
        );
        assert!(!query::is_running(&world));

        events.clear();
        let before = query::clock(&world);
        apply(
            &mut world,
            Command::Tick {
                dt: Duration::from_millis(100),
            },
            &mut events,
        );
        assert_eq!(
            events,
            vec![Event::CommandRejected {
                reason: CommandError::InvalidTransition
            }]
        );
        assert_eq!(query::clock(&world), before);
    }

    #[test]
    fn tick_expires_weapons_before_announcing_time() {
        let (mut world, _) = entered(Vec::new());
        let player = query::player(&world).expect("player");
        let mut events = Vec::new();

        apply(&mut world, Command::Swing { actor: player }, &mut events);
        assert_eq!(query::enemy_count(&world), 0);
        events.clear();

        apply(
            &mut world,
            Command::Tick {
                dt: DEFAULT_WEAPON_DWELL,
            },
            &mut events,
        );

        assert!(matches!(
            events.as_slice(),
            [
                Event::WeaponExpired { .. },
                Event::TimeAdvanced { .. }
            ]
        ));
        let view = query::actor_view(&world);
        assert!(view.iter().all(|actor| actor.kind != ActorKind::Weapon));
    }

    #[test]
    fn patrol_changes_only_apply_to_enemies() {
        let spawn = EnemySpawn {
            cell: CellCoord::new(2, 2),
            health: 2,
            patrol: Direction::Right,
        };
        let (mut world, _) = entered(vec![spawn]);
        let enemy = query::actor_view(&world)
            .enemies()
            .next()
            .map(|snapshot| snapshot.id)
            .expect("enemy");
        let player = query::player(&world).expect("player");
        let mut events = Vec::new();

        apply(
            &mut world,
            Command::SetPatrol {
                enemy,
                direction: Direction::Left,
            },
            &mut events,
        );
        apply(
            &mut world,
            Command::SetPatrol {
                enemy: player,
                direction: Direction::Left,
            },
            &mut events,
        );

        assert_eq!(
            events,
            vec![
                Event::PatrolChanged {
                    enemy,
                    direction: Direction::Left
                },
                Event::CommandRejected {
                    reason: CommandError::UnsupportedActor(player)
                },
            ]
        );
    }

    #[test]
    fn summary_reflects_the_active_room() {
        let (mut world, _) = entered(Vec::new());
        let mut events = Vec::new();
        apply(&mut world, Command::ResolveTick, &mut events);

        let summary = query::room_summary(&world).expect("room");
        assert_eq!(summary.phase, RoomPhase::Cleared);
        assert_eq!(summary.door_cell, CellCoord::new(7, 0));
        assert!(query::is_cleared(&world));
        assert!(!summary.exit_reached);
        assert_eq!(query::grid(&world), Some(Grid::default()));
        assert_eq!(query::weapon_dwell(&world), DEFAULT_WEAPON_DWELL);
        let occupancy = query::occupancy_view(&world).expect("room");
        assert!(occupancy.can_enter(CellCoord::new(7, 0)));
    }
}
