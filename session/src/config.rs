//! Session configuration loaded from TOML.

use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use room_crawl_core::{CellCoord, Grid, RoomSide, DEFAULT_ENEMY_HEALTH};
use room_crawl_system_progression::{
    corner_offsets, Config as ProgressionConfig, SpawnTable, DEFAULT_HILL_CANDIDATES,
};
use room_crawl_world::{MAX_GRID_EDGE, MIN_GRID_EDGE};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Reasons a configuration cannot be used.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("failed to read configuration at {}", path.display())]
    Io {
        /// File that was requested.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: std::io::Error,
    },
    /// The configuration is not valid TOML or does not match the schema.
    #[error("failed to parse configuration")]
    Parse(#[from] toml::de::Error),
    /// The grid is below the minimum room size.
    #[error("grid {columns}x{rows} is smaller than {MIN_GRID_EDGE}x{MIN_GRID_EDGE}")]
    GridTooSmall {
        /// Configured column count.
        columns: u32,
        /// Configured row count.
        rows: u32,
    },
    /// The grid is above the maximum room size.
    #[error("grid {columns}x{rows} exceeds {MAX_GRID_EDGE}x{MAX_GRID_EDGE}")]
    GridTooLarge {
        /// Configured column count.
        columns: u32,
        /// Configured row count.
        rows: u32,
    },
    /// Cells must have a visible size.
    #[error("cell size must be positive")]
    ZeroCellSize,
    /// Ticks must advance the clock.
    #[error("tick length must be positive")]
    ZeroTick,
    /// The hill count range is empty.
    #[error("hill count range {min}..={max} is empty")]
    HillRange {
        /// Configured minimum.
        min: u32,
        /// Configured maximum.
        max: u32,
    },
    /// Enemies must spawn alive.
    #[error("enemy health must be positive")]
    ZeroEnemyHealth,
}

/// Complete session configuration; every field has a default.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SessionConfig {
    /// Seed for the room planner; a random seed is drawn when absent.
    pub seed: Option<u64>,
    /// Room geometry.
    pub grid: GridConfig,
    /// Simulated time settings.
    pub timing: TimingConfig,
    /// Room population settings.
    pub spawn: SpawnConfig,
}

/// Room geometry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GridConfig {
    /// Number of columns.
    pub columns: u32,
    /// Number of rows.
    pub rows: u32,
    /// Cell edge in pixels.
    pub cell_size: u32,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            columns: Grid::DEFAULT_COLUMNS,
            rows: Grid::DEFAULT_ROWS,
            cell_size: Grid::DEFAULT_CELL_SIZE,
        }
    }
}

/// Simulated time settings, in milliseconds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TimingConfig {
    /// Simulated time per tick.
    pub tick_ms: u64,
    /// Lifetime of a weapon hitbox.
    pub weapon_dwell_ms: u64,
    /// Time between enemy steps; zero steps every tick. Enemies never step
    /// more than once per tick.
    pub patrol_interval_ms: u64,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            tick_ms: 100,
            weapon_dwell_ms: 500,
            patrol_interval_ms: 100,
        }
    }
}

/// Room population settings.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SpawnConfig {
    /// Fewest hills per room.
    pub hill_count_min: u32,
    /// Most hills per room.
    pub hill_count_max: u32,
    /// Starting health of every enemy.
    pub enemy_health: u32,
    /// Cells hills may occupy, as `[column, row]`.
    pub hill_candidates: Vec<[u32; 2]>,
    /// Cells enemies may spawn on; the corner offsets when absent.
    pub enemy_candidates: Option<Vec<[u32; 2]>>,
    /// Door side of the first room in degrees; drawn at random when absent.
    pub first_door: Option<RoomSide>,
    /// Spawn tiers, the first describing level one.
    pub levels: Vec<LevelConfig>,
}

impl Default for SpawnConfig {
    fn default() -> Self {
        Self {
            hill_count_min: 2,
            hill_count_max: 5,
            enemy_health: DEFAULT_ENEMY_HEALTH,
            hill_candidates: DEFAULT_HILL_CANDIDATES
                .iter()
                .map(|&(column, row)| [column, row])
                .collect(),
            enemy_candidates: None,
            first_door: None,
            levels: vec![LevelConfig { grunts: 1 }, LevelConfig { grunts: 2 }],
        }
    }
}

/// One tier of the level spawn table.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LevelConfig {
    /// Plain enemies spawned at this level.
    pub grunts: u32,
}

impl SessionConfig {
    /// Reads, parses and validates a configuration file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&contents)
    }

    /// Parses and validates a configuration document.
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks every field for values the simulation cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let GridConfig {
            columns,
            rows,
            cell_size,
        } = self.grid;
        if columns < MIN_GRID_EDGE || rows < MIN_GRID_EDGE {
            return Err(ConfigError::GridTooSmall { columns, rows });
        }
        if columns > MAX_GRID_EDGE || rows > MAX_GRID_EDGE {
            return Err(ConfigError::GridTooLarge { columns, rows });
        }
        if cell_size == 0 {
            return Err(ConfigError::ZeroCellSize);
        }
        if self.timing.tick_ms == 0 {
            return Err(ConfigError::ZeroTick);
        }
        if self.spawn.hill_count_min > self.spawn.hill_count_max {
            return Err(ConfigError::HillRange {
                min: self.spawn.hill_count_min,
                max: self.spawn.hill_count_max,
            });
        }
        if self.spawn.enemy_health == 0 {
            return Err(ConfigError::ZeroEnemyHealth);
        }
        Ok(())
    }

    /// Room geometry.
    #[must_use]
    pub const fn grid(&self) -> Grid {
        Grid::new(self.grid.columns, self.grid.rows, self.grid.cell_size)
    }

    /// Simulated time per tick.
    #[must_use]
    pub const fn tick(&self) -> Duration {
        Duration::from_millis(self.timing.tick_ms)
    }

    /// Lifetime of a weapon hitbox.
    #[must_use]
    pub const fn weapon_dwell(&self) -> Duration {
        Duration::from_millis(self.timing.weapon_dwell_ms)
    }

    /// Time between enemy steps.
    #[must_use]
    pub const fn patrol_interval(&self) -> Duration {
        Duration::from_millis(self.timing.patrol_interval_ms)
    }

    /// Room planner configuration seeded with `seed`.
    #[must_use]
    pub fn progression(&self, seed: u64) -> ProgressionConfig {
        let grid = self.grid();
        let spawn = &self.spawn;
        let enemy_candidates = spawn
            .enemy_candidates
            .as_deref()
            .map(cells)
            .unwrap_or_else(|| corner_offsets(grid));

        ProgressionConfig::new(grid, seed)
            .with_hill_count(spawn.hill_count_min, spawn.hill_count_max)
            .with_hill_candidates(cells(&spawn.hill_candidates))
            .with_enemy_candidates(enemy_candidates)
            .with_enemy_health(spawn.enemy_health)
            .with_spawn_table(SpawnTable::new(
                spawn.levels.iter().map(|level| level.grunts).collect(),
            ))
            .with_first_door(spawn.first_door)
    }
}

fn cells(pairs: &[[u32; 2]]) -> Vec<CellCoord> {
    pairs
        .iter()
        .map(|&[column, row]| CellCoord::new(column, row))
        .collect()
}
