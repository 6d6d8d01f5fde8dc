#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Seeded dungeon progression: plans each room and links it to the last one.
//!
//! The system owns the only random number generator in the simulation. Every
//! random choice (door side, hill count and cells, enemy cells and patrols) is
//! drawn when a room is planned, so a seed fully determines a run.

use rand::{seq::SliceRandom, Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use room_crawl_core::{
    CellCoord, Command, Direction, EnemySpawn, Event, Grid, Level, RoomLayout, RoomSide,
    DEFAULT_ENEMY_HEALTH,
};
use tracing::{debug, info};

/// Interior obstacle candidates on the default grid.
pub const DEFAULT_HILL_CANDIDATES: [(u32, u32); 6] =
    [(2, 10), (2, 9), (10, 2), (3, 9), (10, 3), (10, 4)];

/// Maps a level to the number of plain enemies it spawns.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SpawnTable {
    grunts: Vec<u32>,
}

impl SpawnTable {
    /// Creates a table whose first entry describes level one.
    #[must_use]
    pub fn new(grunts: Vec<u32>) -> Self {
        Self { grunts }
    }

    /// Plain enemies spawned at the level; levels past the table spawn none.
    #[must_use]
    pub fn grunts(&self, level: Level) -> u32 {
        usize::try_from(level.get().saturating_sub(1))
            .ok()
            .and_then(|index| self.grunts.get(index))
            .copied()
            .unwrap_or(0)
    }
}

impl Default for SpawnTable {
    fn default() -> Self {
        Self::new(vec![1, 2])
    }
}

/// Configuration parameters required to construct the progression system.
#[derive(Clone, Debug)]
pub struct Config {
    grid: Grid,
    rng_seed: u64,
    hill_count_min: u32,
    hill_count_max: u32,
    hill_candidates: Vec<CellCoord>,
    enemy_candidates: Vec<CellCoord>,
    enemy_health: u32,
    spawn_table: SpawnTable,
    first_door: Option<RoomSide>,
}

impl Config {
    /// Creates a configuration with the stock candidate tables for the grid.
    #[must_use]
    pub fn new(grid: Grid, rng_seed: u64) -> Self {
        Self {
            grid,
            rng_seed,
            hill_count_min: 2,
            hill_count_max: 5,
            hill_candidates: DEFAULT_HILL_CANDIDATES
                .iter()
                .map(|&(column, row)| CellCoord::new(column, row))
                .collect(),
            enemy_candidates: corner_offsets(grid),
            enemy_health: DEFAULT_ENEMY_HEALTH,
            spawn_table: SpawnTable::default(),
            first_door: None,
        }
    }

    /// Draws the hill count uniformly from the inclusive range.
    #[must_use]
    pub fn with_hill_count(mut self, min: u32, max: u32) -> Self {
        self.hill_count_min = min.min(max);
        self.hill_count_max = max.max(min);
        self
    }

    /// Replaces the cells hills may be placed on.
    #[must_use]
    pub fn with_hill_candidates(mut self, candidates: Vec<CellCoord>) -> Self {
        self.hill_candidates = candidates;
        self
    }

    /// Replaces the cells enemies may spawn on.
    #[must_use]
    pub fn with_enemy_candidates(mut self, candidates: Vec<CellCoord>) -> Self {
        self.enemy_candidates = candidates;
        self
    }

    /// Sets the starting health of every spawned enemy.
    #[must_use]
    pub fn with_enemy_health(mut self, health: u32) -> Self {
        self.enemy_health = health;
        self
    }

    /// Replaces the level spawn table.
    #[must_use]
    pub fn with_spawn_table(mut self, table: SpawnTable) -> Self {
        self.spawn_table = table;
        self
    }

    /// Pins the door of the first room instead of drawing it.
    #[must_use]
    pub fn with_first_door(mut self, side: Option<RoomSide>) -> Self {
        self.first_door = side;
        self
    }
}

/// Pure system that plans rooms and requests the next one when the exit is reached.
#[derive(Debug)]
pub struct Progression {
    config: Config,
    rng: ChaCha8Rng,
}

impl Progression {
    /// Creates a new progression system using the supplied configuration.
    #[must_use]
    pub fn new(config: Config) -> Self {
        let rng = ChaCha8Rng::seed_from_u64(config.rng_seed);
        Self { config, rng }
    }

    /// Plans the first room of a run, which has no opening.
    pub fn first_room(&mut self) -> RoomLayout {
        let door = match self.config.first_door {
            Some(side) => side,
            None => self.draw_side(None),
        };
        self.plan_room(Level::FIRST, door, None)
    }

    /// Plans the room entered through the exit door of the previous room.
    ///
    /// The new opening sits across from the old door and the new door takes
    /// any other side.
    pub fn next_room(&mut self, level: Level, exit: RoomSide) -> RoomLayout {
        let opening = exit.complementary();
        let door = self.draw_side(Some(opening));
        self.plan_room(level, door, Some(opening))
    }

    /// Resolves every random choice of a room with fixed sides.
    pub fn plan_room(
        &mut self,
        level: Level,
        door: RoomSide,
        opening: Option<RoomSide>,
    ) -> RoomLayout {
        let grid = self.config.grid;
        let reserved = |cell: &CellCoord| {
            !grid.contains(*cell) || grid.is_border(*cell) || *cell == grid.center()
        };

        let mut hill_cells = free_candidates(&self.config.hill_candidates, &reserved, &[]);
        let hill_count = self
            .rng
            .gen_range(self.config.hill_count_min..=self.config.hill_count_max);
        let hills = self.draw_cells(&mut hill_cells, hill_count);

        let mut enemy_cells = free_candidates(&self.config.enemy_candidates, &reserved, &hills);
        let grunts = self.config.spawn_table.grunts(level);
        let enemies: Vec<EnemySpawn> = self
            .draw_cells(&mut enemy_cells, grunts)
            .into_iter()
            .map(|cell| EnemySpawn {
                cell,
                health: self.config.enemy_health,
                patrol: Direction::ALL
                    .choose(&mut self.rng)
                    .copied()
                    .unwrap_or(Direction::Up),
            })
            .collect();

        if hills.len() < hill_count as usize || enemies.len() < grunts as usize {
            debug!(
                level = level.get(),
                hills = hills.len(),
                hill_count,
                enemies = enemies.len(),
                grunts,
                "candidate tables exhausted"
            );
        }
        info!(
            level = level.get(),
            door = %door,
            opening = ?opening.map(RoomSide::degrees),
            hills = hills.len(),
            enemies = enemies.len(),
            "room planned"
        );

        RoomLayout {
            grid,
            level,
            door,
            opening,
            hills,
            enemies,
        }
    }

    /// Consumes events and emits `Command::EnterRoom` once an exit is reached.
    pub fn handle(&mut self, events: &[Event], out: &mut Vec<Command>) {
        for event in events {
            if let Event::ExitReached { level, door } = event {
                let layout = self.next_room(level.next(), *door);
                out.push(Command::EnterRoom { layout });
            }
        }
    }

    fn draw_side(&mut self, excluded: Option<RoomSide>) -> RoomSide {
        let sides: Vec<RoomSide> = RoomSide::ALL
            .into_iter()
            .filter(|side| Some(*side) != excluded)
            .collect();
        sides.choose(&mut self.rng).copied().unwrap_or(RoomSide::Top)
    }

    /// Draws up to `count` distinct cells; drawing from the free list is the
    /// same as re-rolling a candidate that collides.
    fn draw_cells(&mut self, free: &mut Vec<CellCoord>, count: u32) -> Vec<CellCoord> {
        let mut drawn = Vec::new();
        for _ in 0..count {
            if free.is_empty() {
                break;
            }
            let index = self.rng.gen_range(0..free.len());
            drawn.push(free.remove(index));
        }
        drawn
    }
}

/// Corner offsets two cells in from each wall.
#[must_use]
pub fn corner_offsets(grid: Grid) -> Vec<CellCoord> {
    let right = grid.columns().saturating_sub(3);
    let bottom = grid.rows().saturating_sub(3);
    vec![
        CellCoord::new(2, 2),
        CellCoord::new(2, bottom),
        CellCoord::new(right, 2),
        CellCoord::new(right, bottom),
    ]
}

fn free_candidates<F>(
    candidates: &[CellCoord],
    reserved: &F,
    taken: &[CellCoord],
) -> Vec<CellCoord>
where
    F: Fn(&CellCoord) -> bool,
{
    let mut free = Vec::with_capacity(candidates.len());
    for cell in candidates {
        if reserved(cell) || taken.contains(cell) || free.contains(cell) {
            continue;
        }
        free.push(*cell);
    }
    free
}
