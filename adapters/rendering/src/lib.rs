#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Shared rendering contracts for Room Crawl adapters.
//!
//! The simulation hands renderers an ordered actor snapshot after every tick.
//! This crate turns that snapshot into a pixel-space [`Scene`]; backends only
//! implement [`Presenter`] and never read anything back into the simulation.

mod sprites;

use anyhow::Result as AnyResult;
use glam::Vec2;
use room_crawl_core::{ActorKind, ActorSnapshot, ActorView, CellCoord, Grid};
use std::{error::Error, fmt};

pub use sprites::SpriteManifest;

/// Pixels between a cell's origin and the sprite drawn inside it.
pub const SPRITE_INSET: f32 = 3.0;

/// Beige floor colour behind every room.
pub const BACKGROUND: Color = Color::from_rgb_u8(252, 216, 169);

/// RGBA color used when presenting frames.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Color {
    /// Red channel intensity in the range 0.0..=1.0.
    pub red: f32,
    /// Green channel intensity in the range 0.0..=1.0.
    pub green: f32,
    /// Blue channel intensity in the range 0.0..=1.0.
    pub blue: f32,
    /// Alpha channel intensity in the range 0.0..=1.0.
    pub alpha: f32,
}

impl Color {
    /// Creates an opaque color from byte RGB values.
    #[must_use]
    pub const fn from_rgb_u8(red: u8, green: u8, blue: u8) -> Self {
        Self {
            red: red as f32 / 255.0,
            green: green as f32 / 255.0,
            blue: blue as f32 / 255.0,
            alpha: 1.0,
        }
    }
}

/// Identifies the image drawn for an actor.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SpriteKey {
    /// The player character.
    Player,
    /// A plain enemy.
    Enemy,
    /// Border wall segment.
    Wall,
    /// Exit door before the room is cleared.
    Door,
    /// Exit door after the room is cleared.
    OpenDoor,
    /// Gap the player entered through.
    Opening,
    /// Interior obstacle.
    Hill,
    /// Melee hitbox.
    Sword,
}

impl SpriteKey {
    /// Every sprite key in drawing-table order.
    pub const ALL: [SpriteKey; 8] = [
        SpriteKey::Player,
        SpriteKey::Enemy,
        SpriteKey::Wall,
        SpriteKey::Door,
        SpriteKey::OpenDoor,
        SpriteKey::Opening,
        SpriteKey::Hill,
        SpriteKey::Sword,
    ];

    /// Sprite drawn for the provided actor variant.
    #[must_use]
    pub const fn for_kind(kind: &ActorKind) -> Self {
        match kind {
            ActorKind::Player => Self::Player,
            ActorKind::Enemy { .. } => Self::Enemy,
            ActorKind::Wall => Self::Wall,
            ActorKind::Door { open: false } => Self::Door,
            ActorKind::Door { open: true } => Self::OpenDoor,
            ActorKind::Opening => Self::Opening,
            ActorKind::Hill => Self::Hill,
            ActorKind::Weapon => Self::Sword,
        }
    }

    /// Stable name used in manifests and asset file names.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Player => "player",
            Self::Enemy => "enemy",
            Self::Wall => "wall",
            Self::Door => "door",
            Self::OpenDoor => "open_door",
            Self::Opening => "opening",
            Self::Hill => "hill",
            Self::Sword => "sword",
        }
    }

    /// Parses a manifest name back into a key.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|key| key.name() == name)
    }
}

/// Grid dimensions and floor colour of the displayed room.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GridPresentation {
    /// Number of columns.
    pub columns: u32,
    /// Number of rows.
    pub rows: u32,
    /// Edge of a cell in pixels.
    pub cell_size: f32,
    /// Floor colour.
    pub background: Color,
}

impl GridPresentation {
    /// Creates a grid presentation, rejecting cells without a visible size.
    pub fn new(grid: Grid, background: Color) -> Result<Self, RenderingError> {
        if grid.cell_size() == 0 {
            return Err(RenderingError::ZeroCellSize);
        }
        Ok(Self {
            columns: grid.columns(),
            rows: grid.rows(),
            cell_size: grid.cell_size() as f32,
            background,
        })
    }

    /// Width of the room in pixels.
    #[must_use]
    pub fn width(&self) -> f32 {
        self.columns as f32 * self.cell_size
    }

    /// Height of the room in pixels.
    #[must_use]
    pub fn height(&self) -> f32 {
        self.rows as f32 * self.cell_size
    }

    /// Top-left pixel of a sprite drawn in `cell`.
    #[must_use]
    pub fn sprite_origin(&self, cell: CellCoord) -> Vec2 {
        Vec2::new(cell.column() as f32, cell.row() as f32) * self.cell_size
            + Vec2::splat(SPRITE_INSET)
    }
}

/// One actor as it should appear on screen.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SpritePresentation {
    /// Image to draw.
    pub key: SpriteKey,
    /// Cell the actor occupies.
    pub cell: CellCoord,
    /// Pixel-space top-left corner of the sprite.
    pub position: Vec2,
    /// Counter-clockwise rotation derived from the actor's facing.
    pub rotation_degrees: f32,
}

impl SpritePresentation {
    /// Places an actor snapshot on the provided grid.
    #[must_use]
    pub fn from_snapshot(grid: &GridPresentation, snapshot: &ActorSnapshot) -> Self {
        Self {
            key: SpriteKey::for_kind(&snapshot.kind),
            cell: snapshot.cell,
            position: grid.sprite_origin(snapshot.cell),
            rotation_degrees: f32::from(snapshot.facing.degrees()),
        }
    }
}

/// Frame description handed to presenters after a tick.
#[derive(Clone, Debug, PartialEq)]
pub struct Scene {
    /// Room geometry and floor.
    pub grid: GridPresentation,
    /// Live actors in snapshot order, so later entries draw on top.
    pub sprites: Vec<SpritePresentation>,
}

impl Scene {
    /// Builds the scene for a room from its actor view.
    pub fn from_view(grid: Grid, actors: &ActorView) -> Result<Self, RenderingError> {
        let grid = GridPresentation::new(grid, BACKGROUND)?;
        let sprites = actors
            .iter()
            .map(|snapshot| SpritePresentation::from_snapshot(&grid, snapshot))
            .collect();
        Ok(Self { grid, sprites })
    }

    /// Topmost sprite drawn in `cell`, if any.
    #[must_use]
    pub fn sprite_at(&self, cell: CellCoord) -> Option<&SpritePresentation> {
        self.sprites.iter().rev().find(|sprite| sprite.cell == cell)
    }
}

/// Implemented by anything that can display a scene.
pub trait Presenter {
    /// Displays the scene produced by the latest tick.
    fn present(&mut self, scene: &Scene) -> AnyResult<()>;
}

/// Errors raised while building scenes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderingError {
    /// Cells must span at least one pixel.
    ZeroCellSize,
}

impl fmt::Display for RenderingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RenderingError::ZeroCellSize => write!(f, "cell size must be positive"),
        }
    }
}

impl Error for RenderingError {}
