//! Room construction and the room lifecycle transition function.

use std::time::Duration;

use room_crawl_core::{
    ActorKind, CellCoord, CommandError, Direction, EntityId, Event, Grid, HaltReason, Level,
    RoomLayout, RoomPhase, RoomSide,
};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::{
    combat::Armory,
    movement::{attempt_move, MoveOutcome},
    registry::{EntityRegistry, PlacementError},
};

/// Smallest grid edge a room can be built on.
///
/// Below seven cells the corner spawn offsets collapse onto each other or
/// onto the centre.
pub const MIN_GRID_EDGE: u32 = 7;

/// Largest grid edge a room can be built on.
///
/// Keeps the dense per-cell layers addressable on every target.
pub const MAX_GRID_EDGE: u32 = 1024;

/// Reasons a room layout cannot be constructed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum BuildError {
    /// The grid is narrower or shorter than [`MIN_GRID_EDGE`].
    #[error("grid {columns}x{rows} is smaller than {MIN_GRID_EDGE}x{MIN_GRID_EDGE}")]
    GridTooSmall {
        /// Requested column count.
        columns: u32,
        /// Requested row count.
        rows: u32,
    },
    /// The grid is wider or taller than [`MAX_GRID_EDGE`].
    #[error("grid {columns}x{rows} exceeds {MAX_GRID_EDGE}x{MAX_GRID_EDGE}")]
    GridTooLarge {
        /// Requested column count.
        columns: u32,
        /// Requested row count.
        rows: u32,
    },
    /// Door and opening were assigned the same side.
    #[error("door and opening both sit on side {side}")]
    SharedSide {
        /// Side claimed twice.
        side: RoomSide,
    },
    /// An enemy was planned without any health.
    #[error("enemy at {cell} has no health")]
    LifelessEnemy {
        /// Cell of the offending spawn.
        cell: CellCoord,
    },
    /// A structurally mandatory actor could not be placed.
    #[error("could not place {what} at {cell}")]
    Placement {
        /// Kind of actor that failed.
        what: &'static str,
        /// Cell that was requested.
        cell: CellCoord,
        /// Registry refusal.
        #[source]
        source: PlacementError,
    },
}

/// Checks a layout for problems that would prevent construction.
pub fn validate_layout(layout: &RoomLayout) -> Result<(), BuildError> {
    let grid = layout.grid;
    if grid.columns() < MIN_GRID_EDGE || grid.rows() < MIN_GRID_EDGE {
        return Err(BuildError::GridTooSmall {
            columns: grid.columns(),
            rows: grid.rows(),
        });
    }
    if grid.columns() > MAX_GRID_EDGE || grid.rows() > MAX_GRID_EDGE {
        return Err(BuildError::GridTooLarge {
            columns: grid.columns(),
            rows: grid.rows(),
        });
    }
    if layout.opening == Some(layout.door) {
        return Err(BuildError::SharedSide { side: layout.door });
    }
    if let Some(spawn) = layout.enemies.iter().find(|spawn| spawn.health == 0) {
        return Err(BuildError::LifelessEnemy { cell: spawn.cell });
    }
    Ok(())
}

/// One self-contained room and its exclusively owned registry.
#[derive(Debug)]
pub(crate) struct Room {
    level: Level,
    door: RoomSide,
    opening: Option<RoomSide>,
    door_cell: CellCoord,
    door_id: EntityId,
    player: EntityId,
    registry: EntityRegistry,
    armory: Armory,
    phase: RoomPhase,
    exit_reported: bool,
}

impl Room {
    /// Builds a room in the fixed construction order: door, opening, border
    /// walls, hills, player, enemies.
    pub(crate) fn build(layout: &RoomLayout) -> Result<Self, BuildError> {
        validate_layout(layout)?;

        let grid = layout.grid;
        let mut registry = EntityRegistry::new(grid);

        let door_cell = layout.door.cell(&grid);
        let door_id = place(
            &mut registry,
            "door",
            ActorKind::Door { open: false },
            door_cell,
            layout.door.outward(),
        )?;

        if let Some(side) = layout.opening {
            let _ = place(
                &mut registry,
                "opening",
                ActorKind::Opening,
                side.cell(&grid),
                side.outward(),
            )?;
        }

        for cell in grid.border_cells() {
            if registry.occupant_at(cell).is_some() {
                continue;
            }
            let _ = place(&mut registry, "wall", ActorKind::Wall, cell, Direction::Up)?;
        }

        let center = grid.center();
        for cell in &layout.hills {
            place_optional(&mut registry, "hill", ActorKind::Hill, *cell, Direction::Up, center);
        }

        let player = place(&mut registry, "player", ActorKind::Player, center, Direction::Up)?;

        for spawn in &layout.enemies {
            let kind = ActorKind::Enemy {
                health: spawn.health,
                patrol: spawn.patrol,
            };
            place_optional(&mut registry, "enemy", kind, spawn.cell, spawn.patrol, center);
        }

        info!(
            level = layout.level.get(),
            door = %layout.door,
            opening = ?layout.opening.map(RoomSide::degrees),
            enemies = registry.enemy_count(),
            "room constructed"
        );

        Ok(Self {
            level: layout.level,
            door: layout.door,
            opening: layout.opening,
            door_cell,
            door_id,
            player,
            registry,
            armory: Armory::default(),
            phase: RoomPhase::Active,
            exit_reported: false,
        })
    }

    pub(crate) const fn level(&self) -> Level {
        self.level
    }

    pub(crate) const fn door(&self) -> RoomSide {
        self.door
    }

    pub(crate) const fn opening(&self) -> Option<RoomSide> {
        self.opening
    }

    pub(crate) const fn door_cell(&self) -> CellCoord {
        self.door_cell
    }

    pub(crate) const fn player(&self) -> EntityId {
        self.player
    }

    pub(crate) const fn phase(&self) -> RoomPhase {
        self.phase
    }

    pub(crate) const fn exit_reported(&self) -> bool {
        self.exit_reported
    }

    pub(crate) const fn registry(&self) -> &EntityRegistry {
        &self.registry
    }

    pub(crate) const fn grid(&self) -> Grid {
        self.registry.grid()
    }

    pub(crate) fn live_weapons(&self) -> usize {
        self.armory.live_weapons()
    }

    pub(crate) fn step(
        &mut self,
        actor: EntityId,
        direction: Direction,
        out_events: &mut Vec<Event>,
    ) -> Result<(), CommandError> {
        let kind = self
            .registry
            .get(actor)
            .map(|found| found.kind())
            .ok_or(CommandError::UnknownActor(actor))?;
        if !kind.is_mobile() {
            return Err(CommandError::UnsupportedActor(actor));
        }

        let outcome = attempt_move(&mut self.registry, actor, direction)
            .map_err(|_| CommandError::UnknownActor(actor))?;
        out_events.push(match outcome {
            MoveOutcome::Rotated => Event::ActorRotated {
                actor,
                facing: direction,
            },
            MoveOutcome::Moved { from, to } => Event::ActorMoved { actor, from, to },
            MoveOutcome::Blocked(reason) => Event::MoveBlocked {
                actor,
                direction,
                reason,
            },
        });
        Ok(())
    }

    pub(crate) fn set_patrol(
        &mut self,
        enemy: EntityId,
        direction: Direction,
        out_events: &mut Vec<Event>,
    ) -> Result<(), CommandError> {
        let kind = self
            .registry
            .get(enemy)
            .map(|found| found.kind())
            .ok_or(CommandError::UnknownActor(enemy))?;
        let ActorKind::Enemy { health, patrol } = kind else {
            return Err(CommandError::UnsupportedActor(enemy));
        };
        if patrol == direction {
            return Ok(());
        }

        self.registry
            .replace_kind(
                enemy,
                ActorKind::Enemy {
                    health,
                    patrol: direction,
                },
            )
            .map_err(|_| CommandError::UnknownActor(enemy))?;
        out_events.push(Event::PatrolChanged { enemy, direction });
        Ok(())
    }

    pub(crate) fn swing(
        &mut self,
        actor: EntityId,
        now: Duration,
        dwell: Duration,
        out_events: &mut Vec<Event>,
    ) -> Result<(), CommandError> {
        self.armory
            .swing(&mut self.registry, actor, now, dwell, out_events)
    }

    pub(crate) fn expire_weapons(&mut self, now: Duration, out_events: &mut Vec<Event>) {
        self.armory.expire(&mut self.registry, now, out_events);
    }

    /// Single authoritative lifecycle transition, run once at the end of a tick.
    ///
    /// Deadly contact is checked first. A room clears the first time it holds
    /// no enemies, opening its door in place. A cleared room reports the exit
    /// once, when the player stands on the door cell.
    pub(crate) fn resolve(&mut self, out_events: &mut Vec<Event>) {
        if matches!(self.phase, RoomPhase::Terminal(_)) {
            return;
        }

        let Some(player_cell) = self.registry.get(self.player).map(|actor| actor.cell()) else {
            return;
        };

        if self.registry.is_deadly_at(player_cell) {
            info!(cell = %player_cell, level = self.level.get(), "player killed");
            out_events.push(Event::PlayerKilled {
                player: self.player,
                cell: player_cell,
            });
            self.halt(HaltReason::PlayerKilled, out_events);
            return;
        }

        if self.phase == RoomPhase::Active && self.registry.enemy_count() == 0 {
            self.phase = RoomPhase::Cleared;
            out_events.push(Event::RoomCleared { level: self.level });
            match self
                .registry
                .replace_kind(self.door_id, ActorKind::Door { open: true })
            {
                Ok(()) => {
                    info!(level = self.level.get(), cell = %self.door_cell, "room cleared, door opened");
                    out_events.push(Event::DoorOpened {
                        cell: self.door_cell,
                    });
                }
                Err(error) => warn!(%error, "cleared room lost its door"),
            }
        }

        if self.phase == RoomPhase::Cleared && !self.exit_reported && player_cell == self.door_cell
        {
            self.exit_reported = true;
            debug!(level = self.level.get(), door = %self.door, "exit reached");
            out_events.push(Event::ExitReached {
                level: self.level,
                door: self.door,
            });
        }
    }

    pub(crate) fn halt(&mut self, reason: HaltReason, out_events: &mut Vec<Event>) {
        self.phase = RoomPhase::Terminal(reason);
        info!(%reason, "simulation halted");
        out_events.push(Event::Halted { reason });
    }
}

fn place(
    registry: &mut EntityRegistry,
    what: &'static str,
    kind: ActorKind,
    cell: CellCoord,
    facing: Direction,
) -> Result<EntityId, BuildError> {
    registry
        .insert(kind, cell, facing)
        .map_err(|source| BuildError::Placement { what, cell, source })
}

/// Places a hill or an enemy, skipping cells that are already taken or reserved
/// for the player.
fn place_optional(
    registry: &mut EntityRegistry,
    what: &'static str,
    kind: ActorKind,
    cell: CellCoord,
    facing: Direction,
    center: CellCoord,
) {
    if cell == center || registry.occupant_at(cell).is_some() {
        warn!(what, %cell, "skipping placement on a taken cell");
        return;
    }
    if let Err(error) = registry.insert(kind, cell, facing) {
        warn!(what, %error, "skipping placement");
    }
}
