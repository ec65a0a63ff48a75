#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Match controller that sequences player turns, enemy turns and frames.
//!
//! A turn is one player [`Action`] followed by one enemy advance, mirroring
//! the rule that enemies only move when the player does. Frames drain spawn
//! requests and then tick the world so pulses grow and collisions resolve.

mod config;

use std::{io, time::Duration};

use gridpulse_core::{Command, Direction, Event, MatchStatus};
use gridpulse_system_spawning::{SpawnSchedule, Spawner};
use gridpulse_world::{self as world, query, World};

pub use config::{Config, ConfigError};

/// Input the player can submit for a turn.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Action {
    /// Step one cell in the provided direction.
    Move(Direction),
    /// Spend all energy on a pulse.
    Fire,
    /// Skip the move but still let enemies advance.
    Wait,
}

impl Action {
    /// World command expressing the action.
    #[must_use]
    pub const fn command(self) -> Command {
        match self {
            Self::Move(direction) => Command::MovePlayer { direction },
            Self::Fire => Command::FirePulse,
            Self::Wait => Command::Wait,
        }
    }
}

#[derive(Debug)]
enum SpawnSource {
    Threaded(Spawner),
    Scheduled(SpawnSchedule),
}

/// A running match.
#[derive(Debug)]
pub struct Session {
    world: World,
    spawns: SpawnSource,
    pending: Vec<Command>,
}

impl Session {
    /// Starts a match whose spawns come from a background thread.
    pub fn start(config: Config) -> io::Result<Self> {
        let spawner = Spawner::start(config.spawn_config())?;
        Ok(Self {
            world: World::with_options(config.world_options()),
            spawns: SpawnSource::Threaded(spawner),
            pending: Vec::new(),
        })
    }

    /// Starts a match whose spawns follow the simulated frame clock, so two
    /// sessions fed the same inputs stay identical.
    #[must_use]
    pub fn manual(config: Config) -> Self {
        Self::with_world(World::with_options(config.world_options()), config)
    }

    /// Runs a frame-clocked match on a prepared world.
    #[must_use]
    pub fn with_world(world: World, config: Config) -> Self {
        Self {
            world,
            spawns: SpawnSource::Scheduled(SpawnSchedule::new(config.spawn_config())),
            pending: Vec::new(),
        }
    }

    /// Plays one turn: the player's action, then one enemy advance.
    ///
    /// Returns no events once the match has ended.
    pub fn act(&mut self, action: Action) -> Vec<Event> {
        let mut events = Vec::new();
        if !self.status().is_running() {
            log::debug!("ignoring {action:?} after the match ended");
            return events;
        }

        world::apply(&mut self.world, action.command(), &mut events);
        world::apply(&mut self.world, Command::AdvanceEnemies, &mut events);
        log::trace!("turn {action:?} produced {} events", events.len());
        events
    }

    /// Applies pending spawn requests, then advances the frame clock by `dt`.
    pub fn frame(&mut self, dt: Duration) -> Vec<Event> {
        if let SpawnSource::Threaded(spawner) = &self.spawns {
            spawner.drain_into(&mut self.pending);
        }

        let mut events = Vec::new();
        for command in self.pending.drain(..) {
            world::apply(&mut self.world, command, &mut events);
        }
        world::apply(&mut self.world, Command::Tick { dt }, &mut events);

        if let SpawnSource::Scheduled(schedule) = &mut self.spawns {
            schedule.handle(&events, &mut self.pending);
        }
        events
    }

    /// Read-only access to the world.
    #[must_use]
    pub fn world(&self) -> &World {
        &self.world
    }

    /// Lifecycle of the match.
    #[must_use]
    pub fn status(&self) -> MatchStatus {
        query::status(&self.world)
    }

    /// Stops the spawner thread, if any. Pending requests are discarded.
    pub fn shutdown(&mut self) {
        if let SpawnSource::Threaded(spawner) = &mut self.spawns {
            spawner.shutdown();
        }
        self.pending.clear();
    }
}
