#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Deterministic enemy patrol system.
//!
//! Every enemy walks in its patrol direction and turns around one step before
//! it would hit an obstacle or the edge of the grid. The system predicts the
//! effect of each step against a scratch copy of the obstacle layer so the
//! reversal can be decided by lookahead in the same tick.

use std::time::Duration;

use room_crawl_core::{
    ActorKind, ActorView, CellCoord, Command, Direction, EntityId, Event, Grid, OccupancyView,
};

/// Configuration parameters required to construct the patrol system.
#[derive(Clone, Copy, Debug)]
pub struct Config {
    step_interval: Duration,
}

impl Config {
    /// Creates a configuration where enemies step once per elapsed interval.
    ///
    /// A zero interval steps every enemy once per tick. Enemies never take
    /// more than one step per tick, whatever the interval.
    #[must_use]
    pub const fn new(step_interval: Duration) -> Self {
        Self { step_interval }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new(Duration::ZERO)
    }
}

/// Pure system that reacts to elapsed time and emits patrol commands.
#[derive(Debug)]
pub struct Patrol {
    step_interval: Duration,
    accumulator: Duration,
    layer: Vec<Option<EntityId>>,
    walkers: Vec<Walker>,
}

#[derive(Clone, Copy, Debug)]
struct Walker {
    id: EntityId,
    cell: CellCoord,
    facing: Direction,
    patrol: Direction,
}

impl Patrol {
    /// Creates a new patrol system using the supplied configuration.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self {
            step_interval: config.step_interval,
            accumulator: Duration::ZERO,
            layer: Vec::new(),
            walkers: Vec::new(),
        }
    }

    /// Consumes events and immutable views to emit step and patrol commands.
    pub fn handle(
        &mut self,
        events: &[Event],
        actors: &ActorView,
        occupancy: OccupancyView<'_>,
        out: &mut Vec<Command>,
    ) {
        let mut accumulated = Duration::ZERO;
        let mut ticked = false;
        for event in events {
            match event {
                Event::RoomEntered { .. } => self.accumulator = Duration::ZERO,
                Event::TimeAdvanced { dt } => {
                    accumulated = accumulated.saturating_add(*dt);
                    ticked = true;
                }
                _ => {}
            }
        }
        if !ticked {
            return;
        }

        if !self.is_due(accumulated) {
            return;
        }

        self.layer.clear();
        self.layer.extend_from_slice(occupancy.cells());
        self.walkers.clear();
        self.walkers
            .extend(actors.enemies().filter_map(|snapshot| match snapshot.kind {
                ActorKind::Enemy { patrol, .. } => Some(Walker {
                    id: snapshot.id,
                    cell: snapshot.cell,
                    facing: snapshot.facing,
                    patrol,
                }),
                _ => None,
            }));
        if self.walkers.is_empty() {
            return;
        }

        let grid = occupancy.grid();
        for walker in &mut self.walkers {
            advance(walker, grid, &mut self.layer, out);
        }
    }

    /// Reports whether enemies step this tick. Intervals missed within one
    /// tick are dropped so a walker can never move past an adjacent cell
    /// before collisions are resolved.
    fn is_due(&mut self, accumulated: Duration) -> bool {
        if self.step_interval.is_zero() {
            return true;
        }

        self.accumulator = self.accumulator.saturating_add(accumulated);
        let mut due = false;
        while self.accumulator >= self.step_interval {
            self.accumulator -= self.step_interval;
            due = true;
        }
        due
    }
}

impl Default for Patrol {
    fn default() -> Self {
        Self::new(Config::default())
    }
}

/// Requests one step for the walker and mirrors the world's movement rules on
/// the scratch layer, reversing the patrol when the following cell is closed.
fn advance(
    walker: &mut Walker,
    grid: Grid,
    layer: &mut [Option<EntityId>],
    out: &mut Vec<Command>,
) {
    out.push(Command::StepActor {
        actor: walker.id,
        direction: walker.patrol,
    });

    if walker.facing != walker.patrol {
        walker.facing = walker.patrol;
    } else if let Some(target) = open_neighbor(walker.cell, walker.patrol, grid, layer) {
        if let (Some(from), Some(to)) = (grid.index(walker.cell), grid.index(target)) {
            layer[from] = None;
            layer[to] = Some(walker.id);
        }
        walker.cell = target;
    }

    if open_neighbor(walker.cell, walker.patrol, grid, layer).is_none() {
        walker.patrol = walker.patrol.opposite();
        out.push(Command::SetPatrol {
            enemy: walker.id,
            direction: walker.patrol,
        });
    }
}

fn open_neighbor(
    cell: CellCoord,
    direction: Direction,
    grid: Grid,
    layer: &[Option<EntityId>],
) -> Option<CellCoord> {
    let target = cell.neighbor(direction)?;
    let index = grid.index(target)?;
    match layer.get(index) {
        Some(None) => Some(target),
        _ => None,
    }
}
