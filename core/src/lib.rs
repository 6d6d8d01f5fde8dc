#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Room Crawl engine.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative world, and pure systems. Adapters submit [`Command`] values
//! describing desired mutations, the world executes those commands via its
//! `apply` entry point, and then broadcasts [`Event`] values for systems to
//! react to deterministically. Systems consume event streams, query immutable
//! snapshots, and respond exclusively with new command batches.

use std::{fmt, time::Duration};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Canonical banner emitted when the experience boots.
pub const WELCOME_BANNER: &str = "Welcome to Room Crawl.";

/// Health assigned to plain enemies unless configured otherwise.
pub const DEFAULT_ENEMY_HEALTH: u32 = 2;

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    /// Updates how long a weapon hitbox lingers after a swing.
    ConfigureWeaponDwell {
        /// Simulated time a weapon stays in the registry before expiring.
        dwell: Duration,
    },
    /// Discards the current room, if any, and constructs a new one.
    EnterRoom {
        /// Fully resolved description of the room to build.
        layout: RoomLayout,
    },
    /// Advances the simulation clock by the provided delta time.
    Tick {
        /// Duration of simulated time that elapsed since the previous tick.
        dt: Duration,
    },
    /// Requests that a mobile actor turn toward or step in a direction.
    StepActor {
        /// Identifier of the actor attempting to move.
        actor: EntityId,
        /// Direction requested for the turn or step.
        direction: Direction,
    },
    /// Replaces the patrol direction of an enemy.
    SetPatrol {
        /// Identifier of the enemy whose patrol changes.
        enemy: EntityId,
        /// Direction the enemy should patrol from now on.
        direction: Direction,
    },
    /// Requests a melee swing into the cell the actor faces.
    Swing {
        /// Identifier of the actor swinging.
        actor: EntityId,
    },
    /// Runs the room lifecycle transition at the end of a tick.
    ResolveTick,
    /// Stops the simulation permanently.
    Halt {
        /// Why the simulation stops.
        reason: HaltReason,
    },
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Event {
    /// Announces that a freshly constructed room became active.
    RoomEntered {
        /// Difficulty level of the room.
        level: Level,
        /// Side that holds the exit door.
        door: RoomSide,
        /// Side the player entered from, absent for the first room.
        opening: Option<RoomSide>,
        /// Identifier assigned to the player inside the room.
        player: EntityId,
    },
    /// Indicates that the simulation clock advanced.
    TimeAdvanced {
        /// Duration of simulated time that elapsed in the tick.
        dt: Duration,
    },
    /// Confirms that an actor turned in place.
    ActorRotated {
        /// Identifier of the actor that turned.
        actor: EntityId,
        /// Orientation the actor faces after turning.
        facing: Direction,
    },
    /// Confirms that an actor moved between two adjacent cells.
    ActorMoved {
        /// Identifier of the actor that moved.
        actor: EntityId,
        /// Cell the actor occupied before moving.
        from: CellCoord,
        /// Cell the actor occupies after moving.
        to: CellCoord,
    },
    /// Reports that a step was refused without changing any state.
    MoveBlocked {
        /// Identifier of the actor whose step was refused.
        actor: EntityId,
        /// Direction of the refused step.
        direction: Direction,
        /// Why the step was refused.
        reason: BlockReason,
    },
    /// Confirms that an enemy adopted a new patrol direction.
    PatrolChanged {
        /// Identifier of the enemy.
        enemy: EntityId,
        /// Patrol direction now in effect.
        direction: Direction,
    },
    /// Confirms that a weapon hitbox entered the registry.
    WeaponSpawned {
        /// Identifier of the weapon actor.
        weapon: EntityId,
        /// Actor that swung the weapon.
        owner: EntityId,
        /// Cell covered by the weapon.
        cell: CellCoord,
    },
    /// Confirms that a weapon hitbox left the registry after its dwell.
    WeaponExpired {
        /// Identifier of the expired weapon actor.
        weapon: EntityId,
        /// Cell the weapon covered.
        cell: CellCoord,
    },
    /// Reports that a swing struck an enemy that survived.
    EnemyDamaged {
        /// Identifier of the enemy that was struck.
        enemy: EntityId,
        /// Health remaining after the hit.
        health: u32,
    },
    /// Reports that a swing removed an enemy from the room.
    EnemyDefeated {
        /// Identifier of the removed enemy.
        enemy: EntityId,
        /// Cell the enemy occupied.
        cell: CellCoord,
    },
    /// Reports that a swing found nothing to strike.
    SwingMissed {
        /// Identifier of the weapon actor.
        weapon: EntityId,
        /// Cell covered by the weapon.
        cell: CellCoord,
    },
    /// Reports that a swing request was refused.
    SwingRejected {
        /// Identifier of the actor that requested the swing.
        actor: EntityId,
        /// Why the swing was refused.
        reason: SwingError,
    },
    /// Announces that the last enemy left the room.
    RoomCleared {
        /// Level of the cleared room.
        level: Level,
    },
    /// Announces that the exit door became passable.
    DoorOpened {
        /// Cell holding the door.
        cell: CellCoord,
    },
    /// Announces that the player stands on the open exit door.
    ExitReached {
        /// Level of the room being left.
        level: Level,
        /// Side of the room holding the door the player used.
        door: RoomSide,
    },
    /// Announces that the player touched a deadly actor.
    PlayerKilled {
        /// Identifier of the player.
        player: EntityId,
        /// Cell where the contact happened.
        cell: CellCoord,
    },
    /// Announces that the simulation stopped for good.
    Halted {
        /// Why the simulation stopped.
        reason: HaltReason,
    },
    /// Reports that a command was refused by the world.
    CommandRejected {
        /// Why the command was refused.
        reason: CommandError,
    },
}

/// Cardinal orientations shared by facing and movement requests.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Direction {
    /// Toward decreasing row indices.
    Up,
    /// Toward increasing row indices.
    Down,
    /// Toward decreasing column indices.
    Left,
    /// Toward increasing column indices.
    Right,
}

impl Direction {
    /// Every direction in a fixed order.
    pub const ALL: [Direction; 4] = [
        Direction::Up,
        Direction::Down,
        Direction::Left,
        Direction::Right,
    ];

    /// Direction pointing the other way.
    #[must_use]
    pub const fn opposite(self) -> Self {
        match self {
            Self::Up => Self::Down,
            Self::Down => Self::Up,
            Self::Left => Self::Right,
            Self::Right => Self::Left,
        }
    }

    /// Counter-clockwise rotation, in degrees, of a sprite drawn facing up.
    #[must_use]
    pub const fn degrees(self) -> u16 {
        match self {
            Self::Up => 0,
            Self::Left => 90,
            Self::Down => 180,
            Self::Right => 270,
        }
    }
}

/// Unique identifier assigned to an actor within a room.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntityId(u32);

impl EntityId {
    /// Creates a new actor identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Location of a single grid cell expressed as column and row coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellCoord {
    column: u32,
    row: u32,
}

impl CellCoord {
    /// Creates a new grid cell coordinate.
    #[must_use]
    pub const fn new(column: u32, row: u32) -> Self {
        Self { column, row }
    }

    /// Zero-based column index of the cell.
    #[must_use]
    pub const fn column(&self) -> u32 {
        self.column
    }

    /// Zero-based row index of the cell.
    #[must_use]
    pub const fn row(&self) -> u32 {
        self.row
    }

    /// Cell one unit away in the provided direction.
    ///
    /// Returns `None` when the step would leave the non-negative quadrant.
    /// The result is not checked against any grid bounds.
    #[must_use]
    pub fn neighbor(self, direction: Direction) -> Option<CellCoord> {
        match direction {
            Direction::Up => self.row.checked_sub(1).map(|row| Self::new(self.column, row)),
            Direction::Down => self.row.checked_add(1).map(|row| Self::new(self.column, row)),
            Direction::Left => self
                .column
                .checked_sub(1)
                .map(|column| Self::new(column, self.row)),
            Direction::Right => self
                .column
                .checked_add(1)
                .map(|column| Self::new(column, self.row)),
        }
    }
}

impl fmt::Display for CellCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.column, self.row)
    }
}

/// Static coordinate space of a room.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Grid {
    columns: u32,
    rows: u32,
    cell_size: u32,
}

impl Grid {
    /// Number of columns used when no configuration overrides it.
    pub const DEFAULT_COLUMNS: u32 = 15;
    /// Number of rows used when no configuration overrides it.
    pub const DEFAULT_ROWS: u32 = 15;
    /// Cell edge length in pixels used when no configuration overrides it.
    pub const DEFAULT_CELL_SIZE: u32 = 45;

    /// Creates a new grid description.
    #[must_use]
    pub const fn new(columns: u32, rows: u32, cell_size: u32) -> Self {
        Self {
            columns,
            rows,
            cell_size,
        }
    }

    /// Number of columns contained in the grid.
    #[must_use]
    pub const fn columns(&self) -> u32 {
        self.columns
    }

    /// Number of rows contained in the grid.
    #[must_use]
    pub const fn rows(&self) -> u32 {
        self.rows
    }

    /// Edge length of a single cell in pixels.
    #[must_use]
    pub const fn cell_size(&self) -> u32 {
        self.cell_size
    }

    /// Reports whether the cell lies inside the grid.
    #[must_use]
    pub const fn contains(&self, cell: CellCoord) -> bool {
        cell.column() < self.columns && cell.row() < self.rows
    }

    /// Cell in the middle of the grid where the player spawns.
    #[must_use]
    pub const fn center(&self) -> CellCoord {
        CellCoord::new(self.columns / 2, self.rows / 2)
    }

    /// Total number of cells in the grid.
    #[must_use]
    pub fn cell_count(&self) -> usize {
        let count = u64::from(self.columns) * u64::from(self.rows);
        usize::try_from(count).unwrap_or(0)
    }

    /// Dense row-major index of the cell, if it lies inside the grid.
    #[must_use]
    pub fn index(&self, cell: CellCoord) -> Option<usize> {
        if !self.contains(cell) {
            return None;
        }
        let row = usize::try_from(cell.row()).ok()?;
        let column = usize::try_from(cell.column()).ok()?;
        let width = usize::try_from(self.columns).ok()?;
        Some(row * width + column)
    }

    /// Reports whether the cell lies on the outermost ring of the grid.
    #[must_use]
    pub const fn is_border(&self, cell: CellCoord) -> bool {
        self.contains(cell)
            && (cell.column() == 0
                || cell.row() == 0
                || cell.column() + 1 == self.columns
                || cell.row() + 1 == self.rows)
    }

    /// Every border cell, top and bottom rows first, then the side columns.
    #[must_use]
    pub fn border_cells(&self) -> Vec<CellCoord> {
        if self.columns == 0 || self.rows == 0 {
            return Vec::new();
        }

        let mut cells = Vec::new();
        let last_row = self.rows - 1;
        let last_column = self.columns - 1;
        for column in 0..self.columns {
            cells.push(CellCoord::new(column, 0));
            if last_row > 0 {
                cells.push(CellCoord::new(column, last_row));
            }
        }
        for row in 1..last_row {
            cells.push(CellCoord::new(0, row));
            if last_column > 0 {
                cells.push(CellCoord::new(last_column, row));
            }
        }
        cells
    }
}

impl Default for Grid {
    fn default() -> Self {
        Self::new(
            Self::DEFAULT_COLUMNS,
            Self::DEFAULT_ROWS,
            Self::DEFAULT_CELL_SIZE,
        )
    }
}

/// One of the four wall midpoints that can hold a door or an opening.
///
/// Sides are identified on the wire by their angle in degrees.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u16", into = "u16")]
pub enum RoomSide {
    /// Middle of the top wall (0°).
    Top,
    /// Middle of the left wall (90°).
    Left,
    /// Middle of the bottom wall (180°).
    Bottom,
    /// Middle of the right wall (270°).
    Right,
}

impl RoomSide {
    /// Every side in ascending angle order.
    pub const ALL: [RoomSide; 4] = [
        RoomSide::Top,
        RoomSide::Left,
        RoomSide::Bottom,
        RoomSide::Right,
    ];

    /// Resolves a side from its angle, accepting only 0, 90, 180 and 270.
    #[must_use]
    pub const fn from_degrees(degrees: u16) -> Option<Self> {
        match degrees {
            0 => Some(Self::Top),
            90 => Some(Self::Left),
            180 => Some(Self::Bottom),
            270 => Some(Self::Right),
            _ => None,
        }
    }

    /// Angle identifying the side.
    #[must_use]
    pub const fn degrees(self) -> u16 {
        match self {
            Self::Top => 0,
            Self::Left => 90,
            Self::Bottom => 180,
            Self::Right => 270,
        }
    }

    /// Side across the room; an exit on one side is entered from this side.
    #[must_use]
    pub const fn complementary(self) -> Self {
        match self {
            Self::Top => Self::Bottom,
            Self::Bottom => Self::Top,
            Self::Left => Self::Right,
            Self::Right => Self::Left,
        }
    }

    /// Direction pointing out of the room through this side.
    #[must_use]
    pub const fn outward(self) -> Direction {
        match self {
            Self::Top => Direction::Up,
            Self::Left => Direction::Left,
            Self::Bottom => Direction::Down,
            Self::Right => Direction::Right,
        }
    }

    /// Midpoint border cell of this side within the grid.
    #[must_use]
    pub const fn cell(self, grid: &Grid) -> CellCoord {
        let middle_column = grid.columns() / 2;
        let middle_row = grid.rows() / 2;
        match self {
            Self::Top => CellCoord::new(middle_column, 0),
            Self::Left => CellCoord::new(0, middle_row),
            Self::Bottom => CellCoord::new(middle_column, grid.rows().saturating_sub(1)),
            Self::Right => CellCoord::new(grid.columns().saturating_sub(1), middle_row),
        }
    }
}

impl TryFrom<u16> for RoomSide {
    type Error = InvalidSide;

    fn try_from(degrees: u16) -> Result<Self, Self::Error> {
        Self::from_degrees(degrees).ok_or(InvalidSide { degrees })
    }
}

impl From<RoomSide> for u16 {
    fn from(side: RoomSide) -> Self {
        side.degrees()
    }
}

impl fmt::Display for RoomSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}°", self.degrees())
    }
}

/// Angle that does not name one of the four room sides.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
#[error("{degrees} is not a room side; expected 0, 90, 180 or 270")]
pub struct InvalidSide {
    /// Angle that failed to resolve.
    pub degrees: u16,
}

/// Difficulty level of a room, starting at one.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Level(u32);

impl Level {
    /// Level of the first room in a session.
    pub const FIRST: Level = Level(1);

    /// Creates a level, clamping zero up to the first level.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        if value == 0 {
            Self::FIRST
        } else {
            Self(value)
        }
    }

    /// Retrieves the numeric level.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }

    /// Level of the room that follows this one.
    #[must_use]
    pub const fn next(self) -> Self {
        Self(self.0.saturating_add(1))
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Closed set of actor variants that can live in a room.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ActorKind {
    /// The player-controlled actor.
    Player,
    /// A plain patrolling enemy.
    Enemy {
        /// Hits the enemy can still absorb.
        health: u32,
        /// Direction the enemy currently patrols.
        patrol: Direction,
    },
    /// Permanent border wall.
    Wall,
    /// Exit door, passable once the room is cleared.
    Door {
        /// Whether the door has been opened.
        open: bool,
    },
    /// Cell the player entered the room through.
    Opening,
    /// Permanent interior obstacle.
    Hill,
    /// Transient melee hitbox.
    Weapon,
}

impl ActorKind {
    /// Collision and combat flags implied by the variant.
    #[must_use]
    pub const fn flags(&self) -> ActorFlags {
        match self {
            Self::Enemy { .. } => ActorFlags::new(true, true, true),
            Self::Wall | Self::Hill | Self::Door { open: false } => {
                ActorFlags::new(true, false, false)
            }
            Self::Player | Self::Door { open: true } | Self::Opening | Self::Weapon => {
                ActorFlags::new(false, false, false)
            }
        }
    }

    /// Reports whether the actor is an enemy.
    #[must_use]
    pub const fn is_enemy(&self) -> bool {
        matches!(self, Self::Enemy { .. })
    }

    /// Reports whether the actor may request steps.
    #[must_use]
    pub const fn is_mobile(&self) -> bool {
        matches!(self, Self::Player | Self::Enemy { .. })
    }
}

/// Collision and combat flags shared by every actor.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ActorFlags {
    /// Blocks movement into its cell.
    pub obstacle: bool,
    /// Ends the session when the player shares its cell.
    pub deadly: bool,
    /// Can be destroyed by combat.
    pub removable: bool,
}

impl ActorFlags {
    /// Creates a flag set.
    #[must_use]
    pub const fn new(obstacle: bool, deadly: bool, removable: bool) -> Self {
        Self {
            obstacle,
            deadly,
            removable,
        }
    }
}

/// Enemy placement resolved ahead of room construction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EnemySpawn {
    /// Cell the enemy spawns in.
    pub cell: CellCoord,
    /// Starting health.
    pub health: u32,
    /// Initial patrol direction; the enemy also faces this way.
    pub patrol: Direction,
}

/// Fully resolved description of a room, consumed in construction order.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RoomLayout {
    /// Coordinate space of the room.
    pub grid: Grid,
    /// Difficulty level of the room.
    pub level: Level,
    /// Side holding the exit door.
    pub door: RoomSide,
    /// Side the player enters through, absent for the first room.
    pub opening: Option<RoomSide>,
    /// Interior obstacle cells, placed in order.
    pub hills: Vec<CellCoord>,
    /// Enemies, placed in order after the player.
    pub enemies: Vec<EnemySpawn>,
}

/// Action an external input collaborator can request in a tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PlayerAction {
    /// Melee swing into the faced cell.
    Sword,
}

/// Player intent delivered once per tick.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PlayerIntent {
    /// Direction currently held, if any.
    pub direction: Option<Direction>,
    /// Action currently held, if any.
    pub action: Option<PlayerAction>,
}

impl PlayerIntent {
    /// Intent with nothing held.
    pub const IDLE: PlayerIntent = PlayerIntent {
        direction: None,
        action: None,
    };

    /// Intent holding only a direction.
    #[must_use]
    pub const fn toward(direction: Direction) -> Self {
        Self {
            direction: Some(direction),
            action: None,
        }
    }

    /// Intent holding only the sword action.
    #[must_use]
    pub const fn sword() -> Self {
        Self {
            direction: None,
            action: Some(PlayerAction::Sword),
        }
    }
}

/// Reasons the simulation can stop.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HaltReason {
    /// The player touched a deadly actor.
    PlayerKilled,
    /// The external collaborator asked to quit.
    Quit,
}

impl fmt::Display for HaltReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PlayerKilled => f.write_str("player killed"),
            Self::Quit => f.write_str("quit"),
        }
    }
}

/// Lifecycle phase of the active room.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RoomPhase {
    /// Enemies may remain and the door is closed.
    Active,
    /// No enemies remain and the door is open.
    Cleared,
    /// The simulation stopped; no further commands are processed.
    Terminal(HaltReason),
}

/// Why a step request left the actor in place.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BlockReason {
    /// The target cell lies outside the grid.
    OutOfBounds,
    /// The target cell holds an obstacle.
    Obstacle,
}

/// Reasons a swing request may be refused.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Error, Serialize, Deserialize)]
pub enum SwingError {
    /// The actor's previous weapon has not expired yet.
    #[error("previous weapon is still active")]
    WeaponActive,
    /// The faced cell lies outside the grid.
    #[error("faced cell lies outside the grid")]
    OutOfBounds,
}

/// Reasons the world may refuse a command outright.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Error, Serialize, Deserialize)]
pub enum CommandError {
    /// The room is terminal, or the command does not fit the current phase.
    #[error("command is not valid in the current room phase")]
    InvalidTransition,
    /// No room has been entered yet.
    #[error("no room has been entered")]
    NoRoom,
    /// The referenced actor does not exist in the room.
    #[error("actor {0:?} does not exist")]
    UnknownActor(EntityId),
    /// The referenced actor cannot perform the requested action.
    #[error("actor {0:?} cannot perform this action")]
    UnsupportedActor(EntityId),
    /// The room layout could not be constructed.
    #[error("room layout could not be constructed")]
    InvalidLayout,
}

/// Immutable representation of a single actor used for queries and rendering.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ActorSnapshot {
    /// Identifier allocated to the actor.
    pub id: EntityId,
    /// Variant of the actor, including variant-specific state.
    pub kind: ActorKind,
    /// Cell occupied by the actor.
    pub cell: CellCoord,
    /// Orientation of the actor.
    pub facing: Direction,
    /// Collision and combat flags.
    pub flags: ActorFlags,
}

/// Read-only snapshot describing every live actor in insertion order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ActorView {
    snapshots: Vec<ActorSnapshot>,
}

impl ActorView {
    /// Creates a new actor view from the provided snapshots.
    ///
    /// Identifiers grow with insertion, so sorting by identifier restores
    /// insertion order.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<ActorSnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.id);
        Self { snapshots }
    }

    /// Iterator over the captured snapshots in deterministic order.
    pub fn iter(&self) -> impl Iterator<Item = &ActorSnapshot> {
        self.snapshots.iter()
    }

    /// Number of captured actors.
    #[must_use]
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    /// Reports whether the view holds no actors.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    /// Snapshot of the actor with the provided identifier.
    #[must_use]
    pub fn get(&self, id: EntityId) -> Option<&ActorSnapshot> {
        self.snapshots
            .binary_search_by_key(&id, |snapshot| snapshot.id)
            .ok()
            .map(|index| &self.snapshots[index])
    }

    /// Snapshot of the player, if present.
    #[must_use]
    pub fn player(&self) -> Option<&ActorSnapshot> {
        self.snapshots
            .iter()
            .find(|snapshot| snapshot.kind == ActorKind::Player)
    }

    /// Iterator over enemy snapshots.
    pub fn enemies(&self) -> impl Iterator<Item = &ActorSnapshot> {
        self.snapshots
            .iter()
            .filter(|snapshot| snapshot.kind.is_enemy())
    }

    /// Consumes the view, yielding the underlying snapshots.
    #[must_use]
    pub fn into_vec(self) -> Vec<ActorSnapshot> {
        self.snapshots
    }
}

/// Read-only view into the dense obstacle layer of a room.
#[derive(Clone, Copy, Debug)]
pub struct OccupancyView<'a> {
    cells: &'a [Option<EntityId>],
    grid: Grid,
}

impl<'a> OccupancyView<'a> {
    /// Captures a new occupancy view backed by the provided cell slice.
    #[must_use]
    pub fn new(cells: &'a [Option<EntityId>], grid: Grid) -> Self {
        Self { cells, grid }
    }

    /// Returns the obstacle occupying the provided cell, if any.
    #[must_use]
    pub fn obstacle(&self, cell: CellCoord) -> Option<EntityId> {
        self.grid
            .index(cell)
            .and_then(|index| self.cells.get(index).copied().flatten())
    }

    /// Reports whether an actor could step into the cell.
    ///
    /// Cells outside the grid are never enterable.
    #[must_use]
    pub fn can_enter(&self, cell: CellCoord) -> bool {
        self.grid.contains(cell) && self.obstacle(cell).is_none()
    }

    /// Grid the view covers.
    #[must_use]
    pub const fn grid(&self) -> Grid {
        self.grid
    }

    /// Raw row-major obstacle layer.
    #[must_use]
    pub fn cells(&self) -> &'a [Option<EntityId>] {
        self.cells
    }
}
