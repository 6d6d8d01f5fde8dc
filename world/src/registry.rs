//! Entity registry that owns every actor of a room.

use room_crawl_core::{
    ActorFlags, ActorKind, ActorSnapshot, ActorView, CellCoord, Direction, EntityId, Grid,
    OccupancyView,
};
use thiserror::Error;

/// Actor stored in the registry.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Actor {
    id: EntityId,
    cell: CellCoord,
    facing: Direction,
    flags: ActorFlags,
    kind: ActorKind,
}

impl Actor {
    /// Identifier allocated by the registry.
    #[must_use]
    pub const fn id(&self) -> EntityId {
        self.id
    }

    /// Cell the actor occupies.
    #[must_use]
    pub const fn cell(&self) -> CellCoord {
        self.cell
    }

    /// Orientation of the actor.
    #[must_use]
    pub const fn facing(&self) -> Direction {
        self.facing
    }

    /// Collision and combat flags.
    #[must_use]
    pub const fn flags(&self) -> ActorFlags {
        self.flags
    }

    /// Variant of the actor.
    #[must_use]
    pub const fn kind(&self) -> ActorKind {
        self.kind
    }

    /// Immutable copy suitable for views.
    #[must_use]
    pub const fn snapshot(&self) -> ActorSnapshot {
        ActorSnapshot {
            id: self.id,
            kind: self.kind,
            cell: self.cell,
            facing: self.facing,
            flags: self.flags,
        }
    }
}

/// Reasons the registry refuses to place or update an actor.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum PlacementError {
    /// An obstacle already holds the cell.
    #[error("cell {cell} already holds obstacle {occupant:?}")]
    Occupied {
        /// Cell that was requested.
        cell: CellCoord,
        /// Obstacle holding the cell.
        occupant: EntityId,
    },
    /// The cell lies outside the grid.
    #[error("cell {cell} lies outside the grid")]
    OutOfBounds {
        /// Cell that was requested.
        cell: CellCoord,
    },
    /// No actor with the identifier exists.
    #[error("actor {0:?} does not exist")]
    UnknownActor(EntityId),
}

/// Owns all actors in a room and indexes them by cell.
///
/// At most one obstacle actor occupies a cell at any time. Non-obstacle
/// actors may share a cell with anything; per-cell lists keep insertion order
/// so [`EntityRegistry::occupant_at`] returns the earliest inserted actor.
#[derive(Clone, Debug)]
pub struct EntityRegistry {
    grid: Grid,
    actors: Vec<Actor>,
    occupants: Vec<Vec<EntityId>>,
    obstacles: Vec<Option<EntityId>>,
    next_id: u32,
}

impl EntityRegistry {
    /// Creates an empty registry covering the grid.
    #[must_use]
    pub fn new(grid: Grid) -> Self {
        let capacity = grid.cell_count();
        Self {
            grid,
            actors: Vec::new(),
            occupants: vec![Vec::new(); capacity],
            obstacles: vec![None; capacity],
            next_id: 0,
        }
    }

    /// Grid the registry covers.
    #[must_use]
    pub const fn grid(&self) -> Grid {
        self.grid
    }

    /// Reports whether the cell lies inside the grid, regardless of occupancy.
    #[must_use]
    pub const fn in_bounds(&self, cell: CellCoord) -> bool {
        self.grid.contains(cell)
    }

    /// Places a new actor, refusing an obstacle on a cell that already holds one.
    pub fn insert(
        &mut self,
        kind: ActorKind,
        cell: CellCoord,
        facing: Direction,
    ) -> Result<EntityId, PlacementError> {
        let index = self
            .grid
            .index(cell)
            .ok_or(PlacementError::OutOfBounds { cell })?;
        let flags = kind.flags();
        if flags.obstacle {
            if let Some(occupant) = self.obstacle_in(index) {
                return Err(PlacementError::Occupied { cell, occupant });
            }
        }

        let id = EntityId::new(self.next_id);
        self.next_id = self.next_id.saturating_add(1);
        self.actors.push(Actor {
            id,
            cell,
            facing,
            flags,
            kind,
        });
        self.attach(id, index, flags.obstacle);
        Ok(id)
    }

    /// Removes an actor permanently, returning it if it existed.
    pub fn remove(&mut self, id: EntityId) -> Option<Actor> {
        let position = self.position(id)?;
        let actor = self.actors.remove(position);
        if let Some(index) = self.grid.index(actor.cell) {
            self.detach(id, index, actor.flags.obstacle);
        }
        Some(actor)
    }

    /// Actor with the provided identifier.
    #[must_use]
    pub fn get(&self, id: EntityId) -> Option<&Actor> {
        self.position(id).map(|position| &self.actors[position])
    }

    /// Reports whether the actor is still registered.
    #[must_use]
    pub fn contains(&self, id: EntityId) -> bool {
        self.position(id).is_some()
    }

    /// Earliest inserted actor at the cell.
    #[must_use]
    pub fn occupant_at(&self, cell: CellCoord) -> Option<&Actor> {
        self.occupants_at(cell).next()
    }

    /// Every actor at the cell in insertion order.
    pub fn occupants_at(&self, cell: CellCoord) -> impl Iterator<Item = &Actor> + '_ {
        let ids: &[EntityId] = self
            .grid
            .index(cell)
            .and_then(|index| self.occupants.get(index))
            .map(Vec::as_slice)
            .unwrap_or(&[]);
        ids.iter().filter_map(move |id| self.get(*id))
    }

    /// Obstacle actor holding the cell, if any.
    #[must_use]
    pub fn obstacle_at(&self, cell: CellCoord) -> Option<EntityId> {
        self.grid
            .index(cell)
            .and_then(|index| self.obstacle_in(index))
    }

    /// Reports whether an obstacle holds the cell.
    #[must_use]
    pub fn is_obstacle_at(&self, cell: CellCoord) -> bool {
        self.obstacle_at(cell).is_some()
    }

    /// Reports whether any actor at the cell is deadly.
    #[must_use]
    pub fn is_deadly_at(&self, cell: CellCoord) -> bool {
        self.occupants_at(cell).any(|actor| actor.flags.deadly)
    }

    /// Moves an actor to another cell, keeping the obstacle invariant.
    pub fn relocate(&mut self, id: EntityId, to: CellCoord) -> Result<(), PlacementError> {
        let position = self.position(id).ok_or(PlacementError::UnknownActor(id))?;
        let target = self
            .grid
            .index(to)
            .ok_or(PlacementError::OutOfBounds { cell: to })?;
        let Actor { cell, flags, .. } = self.actors[position];
        if flags.obstacle {
            if let Some(occupant) = self.obstacle_in(target) {
                if occupant != id {
                    return Err(PlacementError::Occupied { cell: to, occupant });
                }
            }
        }

        if let Some(source) = self.grid.index(cell) {
            self.detach(id, source, flags.obstacle);
        }
        self.attach(id, target, flags.obstacle);
        self.actors[position].cell = to;
        Ok(())
    }

    /// Turns an actor in place.
    pub fn set_facing(&mut self, id: EntityId, facing: Direction) -> Result<(), PlacementError> {
        let position = self.position(id).ok_or(PlacementError::UnknownActor(id))?;
        self.actors[position].facing = facing;
        Ok(())
    }

    /// Replaces an actor's variant in place, refreshing its flags.
    ///
    /// The actor keeps its identifier, cell and insertion order.
    pub fn replace_kind(&mut self, id: EntityId, kind: ActorKind) -> Result<(), PlacementError> {
        let position = self.position(id).ok_or(PlacementError::UnknownActor(id))?;
        let Actor { cell, flags, .. } = self.actors[position];
        let next_flags = kind.flags();
        if let Some(index) = self.grid.index(cell) {
            if next_flags.obstacle && !flags.obstacle {
                if let Some(occupant) = self.obstacle_in(index) {
                    return Err(PlacementError::Occupied { cell, occupant });
                }
                if let Some(slot) = self.obstacles.get_mut(index) {
                    *slot = Some(id);
                }
            } else if !next_flags.obstacle && flags.obstacle {
                if let Some(slot) = self.obstacles.get_mut(index) {
                    *slot = None;
                }
            }
        }

        let actor = &mut self.actors[position];
        actor.kind = kind;
        actor.flags = next_flags;
        Ok(())
    }

    /// Iterator over every actor in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &Actor> {
        self.actors.iter()
    }

    /// Number of registered actors.
    #[must_use]
    pub fn len(&self) -> usize {
        self.actors.len()
    }

    /// Reports whether the registry holds no actors.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.actors.is_empty()
    }

    /// Number of enemies still registered.
    #[must_use]
    pub fn enemy_count(&self) -> usize {
        self.actors
            .iter()
            .filter(|actor| actor.kind.is_enemy())
            .count()
    }

    /// Captures a read-only view of every actor.
    #[must_use]
    pub fn actor_view(&self) -> ActorView {
        ActorView::from_snapshots(self.actors.iter().map(Actor::snapshot).collect())
    }

    /// Exposes the dense obstacle layer.
    #[must_use]
    pub fn occupancy_view(&self) -> OccupancyView<'_> {
        OccupancyView::new(&self.obstacles, self.grid)
    }

    fn obstacle_in(&self, index: usize) -> Option<EntityId> {
        self.obstacles.get(index).copied().flatten()
    }

    fn position(&self, id: EntityId) -> Option<usize> {
        self.actors.binary_search_by_key(&id, |actor| actor.id).ok()
    }

    fn attach(&mut self, id: EntityId, index: usize, obstacle: bool) {
        if let Some(list) = self.occupants.get_mut(index) {
            let slot = list.binary_search(&id).unwrap_or_else(|slot| slot);
            list.insert(slot, id);
        }
        if obstacle {
            if let Some(slot) = self.obstacles.get_mut(index) {
                *slot = Some(id);
            }
        }
    }

    fn detach(&mut self, id: EntityId, index: usize, obstacle: bool) {
        if let Some(list) = self.occupants.get_mut(index) {
            list.retain(|occupant| *occupant != id);
        }
        if obstacle {
            if let Some(slot) = self.obstacles.get_mut(index) {
                if *slot == Some(id) {
                    *slot = None;
                }
            }
        }
    }
}
