#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Tick pipeline that drives a Room Crawl run.
//!
//! A [`Session`] owns the world and every system. Each call to
//! [`Session::step`] runs one tick in a fixed order: the clock advances and
//! expired weapons leave, the player moves, enemies patrol, the player's
//! action resolves, the room lifecycle runs, and the next room is entered
//! when the exit was reached.

mod config;

use std::time::Duration;

use room_crawl_core::{
    ActorSnapshot, Command, CommandError, Event, HaltReason, PlayerIntent, RoomPhase,
};
use room_crawl_system_control::PlayerControl;
use room_crawl_system_patrol::{Config as PatrolConfig, Patrol};
use room_crawl_system_progression::Progression;
use room_crawl_world::{self as world, query, validate_layout, BuildError, World};
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info};

pub use config::{ConfigError, GridConfig, LevelConfig, SessionConfig, SpawnConfig, TimingConfig};

/// Reasons a session cannot start or advance.
#[derive(Debug, Error)]
pub enum SessionError {
    /// The run has ended; no further ticks are processed.
    #[error("session halted: {0}")]
    Halted(HaltReason),
    /// The configuration is unusable.
    #[error(transparent)]
    Config(#[from] ConfigError),
    /// The first room could not be constructed.
    #[error("first room could not be built")]
    Build(#[from] BuildError),
    /// The world refused to start the run.
    #[error("world refused to start the run: {0}")]
    Rejected(CommandError),
}

/// Serializable picture of the run after a tick.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Snapshot {
    /// Ticks processed so far.
    pub tick: u64,
    /// Seed the room planner was created with.
    pub seed: u64,
    /// Headline state of the active room.
    pub room: Option<query::RoomSummary>,
    /// Every live actor in insertion order.
    pub actors: Vec<ActorSnapshot>,
}

/// One run of the simulation, from the first room until a halt.
#[derive(Debug)]
pub struct Session {
    world: World,
    control: PlayerControl,
    patrol: Patrol,
    progression: Progression,
    tick_length: Duration,
    ticks: u64,
    seed: u64,
}

impl Session {
    /// Validates the configuration and enters the first room.
    pub fn new(config: &SessionConfig) -> Result<Self, SessionError> {
        config.validate()?;
        let seed = config.seed.unwrap_or_else(rand::random);
        let mut progression = Progression::new(config.progression(seed));
        let layout = progression.first_room();
        validate_layout(&layout)?;

        let mut world = World::new();
        let mut events = Vec::new();
        world::apply(
            &mut world,
            Command::ConfigureWeaponDwell {
                dwell: config.weapon_dwell(),
            },
            &mut events,
        );
        world::apply(&mut world, Command::EnterRoom { layout }, &mut events);
        if let Some(reason) = events.iter().find_map(|event| match event {
            Event::CommandRejected { reason } => Some(*reason),
            _ => None,
        }) {
            return Err(SessionError::Rejected(reason));
        }

        info!(seed, banner = query::welcome_banner(&world), "session started");
        Ok(Self {
            world,
            control: PlayerControl::new(),
            patrol: Patrol::new(PatrolConfig::new(config.patrol_interval())),
            progression,
            tick_length: config.tick(),
            ticks: 0,
            seed,
        })
    }

    /// Runs one tick with the intent held during it and returns every event.
    pub fn step(&mut self, intent: PlayerIntent) -> Result<Vec<Event>, SessionError> {
        if let Some(reason) = self.halt_reason() {
            return Err(SessionError::Halted(reason));
        }
        self.ticks = self.ticks.saturating_add(1);

        let mut log = Vec::new();
        let tick_events = self.dispatch(
            vec![Command::Tick {
                dt: self.tick_length,
            }],
            &mut log,
        );

        let mut commands = Vec::new();
        let actors = query::actor_view(&self.world);
        self.control.movement(intent, actors.player(), &mut commands);
        let _ = self.dispatch(commands, &mut log);

        let mut commands = Vec::new();
        let actors = query::actor_view(&self.world);
        if let Some(occupancy) = query::occupancy_view(&self.world) {
            self.patrol
                .handle(&tick_events, &actors, occupancy, &mut commands);
        }
        let _ = self.dispatch(commands, &mut log);

        let mut commands = Vec::new();
        let actors = query::actor_view(&self.world);
        self.control.action(intent, actors.player(), &mut commands);
        let _ = self.dispatch(commands, &mut log);

        let resolved = self.dispatch(vec![Command::ResolveTick], &mut log);
        let mut commands = Vec::new();
        self.progression.handle(&resolved, &mut commands);
        let entered = self.dispatch(commands, &mut log);
        if !entered.is_empty() {
            let mut ignored = Vec::new();
            let actors = query::actor_view(&self.world);
            if let Some(occupancy) = query::occupancy_view(&self.world) {
                self.patrol
                    .handle(&entered, &actors, occupancy, &mut ignored);
            }
        }

        if let Some(reason) = self.halt_reason() {
            info!(tick = self.ticks, %reason, "session halted");
        }
        Ok(log)
    }

    /// Stops the run at the request of the external collaborator.
    pub fn quit(&mut self) -> Result<Vec<Event>, SessionError> {
        if let Some(reason) = self.halt_reason() {
            return Err(SessionError::Halted(reason));
        }
        let mut log = Vec::new();
        let _ = self.dispatch(
            vec![Command::Halt {
                reason: HaltReason::Quit,
            }],
            &mut log,
        );
        Ok(log)
    }

    /// Reports whether further ticks will be processed.
    #[must_use]
    pub fn is_running(&self) -> bool {
        query::is_running(&self.world)
    }

    /// Why the run stopped, if it has.
    #[must_use]
    pub fn halt_reason(&self) -> Option<HaltReason> {
        match query::phase(&self.world) {
            Some(RoomPhase::Terminal(reason)) => Some(reason),
            _ => None,
        }
    }

    /// Ticks processed so far.
    #[must_use]
    pub const fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Seed the room planner was created with.
    #[must_use]
    pub const fn seed(&self) -> u64 {
        self.seed
    }

    /// Read-only access to the authoritative world.
    #[must_use]
    pub const fn world(&self) -> &World {
        &self.world
    }

    /// Captures the state handed to renderers after a tick.
    #[must_use]
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            tick: self.ticks,
            seed: self.seed,
            room: query::room_summary(&self.world),
            actors: query::actor_view(&self.world).into_vec(),
        }
    }

    /// Applies commands in order, returning the events they produced and
    /// appending them to the tick log.
    fn dispatch(&mut self, commands: Vec<Command>, log: &mut Vec<Event>) -> Vec<Event> {
        let mut events = Vec::new();
        for command in commands {
            world::apply(&mut self.world, command, &mut events);
        }
        if !events.is_empty() {
            debug!(tick = self.ticks, count = events.len(), "events dispatched");
        }
        log.extend(events.iter().cloned());
        events
    }
}
