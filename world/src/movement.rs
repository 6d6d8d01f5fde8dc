//! Movement and collision resolution shared by the player and enemies.

use room_crawl_core::{BlockReason, CellCoord, Direction, EntityId};

use crate::registry::{EntityRegistry, PlacementError};

/// Result of a single step request.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MoveOutcome {
    /// The actor faced a new direction and stayed in place.
    Rotated,
    /// The actor advanced one cell.
    Moved {
        /// Cell left behind.
        from: CellCoord,
        /// Cell now occupied.
        to: CellCoord,
    },
    /// Nothing changed.
    Blocked(BlockReason),
}

/// Turns or steps an actor.
///
/// The first request in a new direction only turns the actor. A request in
/// the direction the actor already faces steps one cell, provided the target
/// lies inside the grid and holds no obstacle. A blocked step changes nothing.
pub fn attempt_move(
    registry: &mut EntityRegistry,
    actor: EntityId,
    direction: Direction,
) -> Result<MoveOutcome, PlacementError> {
    let current = registry
        .get(actor)
        .ok_or(PlacementError::UnknownActor(actor))?;
    let from = current.cell();

    if current.facing() != direction {
        registry.set_facing(actor, direction)?;
        return Ok(MoveOutcome::Rotated);
    }

    let Some(target) = from
        .neighbor(direction)
        .filter(|cell| registry.in_bounds(*cell))
    else {
        return Ok(MoveOutcome::Blocked(BlockReason::OutOfBounds));
    };

    if registry.is_obstacle_at(target) {
        return Ok(MoveOutcome::Blocked(BlockReason::Obstacle));
    }

    registry.relocate(actor, target)?;
    Ok(MoveOutcome::Moved { from, to: target })
}
