#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Player control: held-key tracking and translation of intents into commands.

use room_crawl_core::{ActorSnapshot, Command, Direction, PlayerAction, PlayerIntent};

/// Physical inputs the controller understands.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Key {
    /// One of the four directional keys.
    Direction(Direction),
    /// The sword key.
    Sword,
}

impl Key {
    /// Looks up a key by its keyboard name.
    ///
    /// Arrows, WASD and the Dvorak positions of the same keys (`comma`, `o`,
    /// `a`, `e`) steer the player. Names are case-insensitive.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        let key = match name.to_ascii_lowercase().as_str() {
            "up" | "w" | "comma" => Self::Direction(Direction::Up),
            "down" | "s" | "o" => Self::Direction(Direction::Down),
            "left" | "a" => Self::Direction(Direction::Left),
            "right" | "d" | "e" => Self::Direction(Direction::Right),
            "space" | "sword" => Self::Sword,
            _ => return None,
        };
        Some(key)
    }
}

/// Tracks which keys are held between ticks.
///
/// Pressing a direction releases every other direction, so the most recent
/// press wins. Releasing a direction only clears that direction. The sword is
/// held independently of movement.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct HeldKeys {
    direction: Option<Direction>,
    sword: bool,
}

impl HeldKeys {
    /// Creates a controller with nothing held.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            direction: None,
            sword: false,
        }
    }

    /// Records a key press.
    pub fn press(&mut self, key: Key) {
        match key {
            Key::Direction(direction) => self.direction = Some(direction),
            Key::Sword => self.sword = true,
        }
    }

    /// Records a key release.
    pub fn release(&mut self, key: Key) {
        match key {
            Key::Direction(direction) => {
                if self.direction == Some(direction) {
                    self.direction = None;
                }
            }
            Key::Sword => self.sword = false,
        }
    }

    /// Releases every key.
    pub fn release_all(&mut self) {
        *self = Self::new();
    }

    /// Intent currently held.
    #[must_use]
    pub const fn intent(&self) -> PlayerIntent {
        PlayerIntent {
            direction: self.direction,
            action: if self.sword {
                Some(PlayerAction::Sword)
            } else {
                None
            },
        }
    }
}

/// Pure system that turns the held intent into player commands.
///
/// Movement and actions are emitted separately so the tick pipeline can run
/// enemy patrols between them.
#[derive(Clone, Copy, Debug, Default)]
pub struct PlayerControl;

impl PlayerControl {
    /// Creates a new control system.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Emits a `Command::StepActor` for the held direction, if any.
    pub fn movement(
        &self,
        intent: PlayerIntent,
        player: Option<&ActorSnapshot>,
        out: &mut Vec<Command>,
    ) {
        let (Some(direction), Some(player)) = (intent.direction, player) else {
            return;
        };
        out.push(Command::StepActor {
            actor: player.id,
            direction,
        });
    }

    /// Emits a `Command::Swing` when the sword is held.
    pub fn action(
        &self,
        intent: PlayerIntent,
        player: Option<&ActorSnapshot>,
        out: &mut Vec<Command>,
    ) {
        let Some(player) = player else {
            return;
        };
        if let Some(PlayerAction::Sword) = intent.action {
            out.push(Command::Swing { actor: player.id });
        }
    }
}
