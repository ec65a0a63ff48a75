#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Spawning system responsible for emitting enemy spawn commands.
//!
//! Spawns are decided by a seeded [`SpawnRoller`]. The roller is either driven
//! by a background thread ([`Spawner`]) that sends [`Command::SpawnEnemy`]
//! values over a channel, or by the frame clock ([`SpawnSchedule`]) when a run
//! must be replayed exactly. In both cases only the main loop applies the
//! commands, so the enemy registry never needs a lock.

use std::{
    io,
    sync::{
        atomic::{AtomicBool, Ordering},
        mpsc::{self, Receiver, RecvTimeoutError, Sender},
        Arc,
    },
    thread::{self, JoinHandle},
    time::{Duration, Instant},
};

use gridpulse_core::{Command, EnemyKind, Event, SpawnCorner, SPAWN_INTERVAL, WALL_FORMING_ODDS};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Seed used when none is configured.
pub const DEFAULT_SPAWN_SEED: u64 = 0x4d59_5df4_d0f3_3173;

/// Configuration parameters required to construct the spawning system.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Config {
    spawn_interval: Duration,
    rng_seed: u64,
}

impl Config {
    /// Creates a new configuration using the provided spawn cadence and seed.
    /// A zero interval disables spawning.
    #[must_use]
    pub const fn new(spawn_interval: Duration, rng_seed: u64) -> Self {
        Self {
            spawn_interval,
            rng_seed,
        }
    }

    /// Time between two spawn requests.
    #[must_use]
    pub const fn spawn_interval(&self) -> Duration {
        self.spawn_interval
    }

    /// Seed of the corner and kind draws.
    #[must_use]
    pub const fn rng_seed(&self) -> u64 {
        self.rng_seed
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new(SPAWN_INTERVAL, DEFAULT_SPAWN_SEED)
    }
}

/// Seeded source of spawn requests.
#[derive(Clone, Debug)]
pub struct SpawnRoller {
    rng: ChaCha8Rng,
}

impl SpawnRoller {
    /// Creates a roller whose draws are fully determined by `seed`.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    /// Draws a corner uniformly, then a kind from `0..WALL_FORMING_ODDS`.
    pub fn roll(&mut self) -> Command {
        let corner = SpawnCorner::ALL[self.rng.gen_range(0..SpawnCorner::ALL.len())];
        let kind = EnemyKind::from_roll(self.rng.gen_range(0..WALL_FORMING_ODDS));
        Command::SpawnEnemy { corner, kind }
    }
}

/// Frame-driven spawning that accumulates [`Event::TimeAdvanced`] durations.
#[derive(Debug)]
pub struct SpawnSchedule {
    spawn_interval: Duration,
    accumulator: Duration,
    roller: SpawnRoller,
}

impl SpawnSchedule {
    /// Creates a new schedule using the supplied configuration.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self {
            spawn_interval: config.spawn_interval,
            accumulator: Duration::ZERO,
            roller: SpawnRoller::new(config.rng_seed),
        }
    }

    /// Consumes world events and emits one spawn command per elapsed interval.
    pub fn handle(&mut self, events: &[Event], out: &mut Vec<Command>) {
        if self.spawn_interval.is_zero() {
            return;
        }

        let accumulated = events
            .iter()
            .filter_map(|event| match event {
                Event::TimeAdvanced { dt } => Some(*dt),
                _ => None,
            })
            .fold(Duration::ZERO, Duration::saturating_add);
        if accumulated.is_zero() {
            return;
        }

        self.accumulator = self.accumulator.saturating_add(accumulated);
        for _ in 0..self.resolve_spawn_attempts() {
            out.push(self.roller.roll());
        }
    }

    fn resolve_spawn_attempts(&mut self) -> usize {
        if self.spawn_interval.is_zero() {
            return 0;
        }

        let mut attempts = 0;
        while self.accumulator >= self.spawn_interval {
            self.accumulator -= self.spawn_interval;
            attempts += 1;
        }
        attempts
    }
}

/// Background thread that requests a spawn every interval.
#[derive(Debug)]
pub struct Spawner {
    receiver: Receiver<Command>,
    stop: Arc<AtomicBool>,
    thread: Option<JoinHandle<()>>,
}

impl Spawner {
    /// Starts the spawner thread.
    pub fn start(config: Config) -> io::Result<Self> {
        let (sender, receiver) = mpsc::channel();
        let stop = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&stop);
        let roller = SpawnRoller::new(config.rng_seed);
        let interval = config.spawn_interval;

        let thread = thread::Builder::new()
            .name("gridpulse-spawner".to_owned())
            .spawn(move || run(interval, roller, &flag, &sender))?;
        log::debug!("spawner started with interval {interval:?}");

        Ok(Self {
            receiver,
            stop,
            thread: Some(thread),
        })
    }

    /// Moves every pending spawn request into `out` without blocking.
    pub fn drain_into(&self, out: &mut Vec<Command>) {
        out.extend(self.receiver.try_iter());
    }

    /// Waits up to `timeout` for the next spawn request.
    pub fn recv_timeout(&self, timeout: Duration) -> Option<Command> {
        match self.receiver.recv_timeout(timeout) {
            Ok(command) => Some(command),
            Err(RecvTimeoutError::Timeout | RecvTimeoutError::Disconnected) => None,
        }
    }

    /// Reports whether the thread is still alive.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.thread
            .as_ref()
            .is_some_and(|thread| !thread.is_finished())
    }

    /// Stops the thread and waits for it to exit. Calling it again is a no-op.
    pub fn shutdown(&mut self) {
        let Some(thread) = self.thread.take() else {
            return;
        };
        self.stop.store(true, Ordering::Release);
        thread.thread().unpark();
        if thread.join().is_err() {
            log::warn!("spawner thread panicked");
        } else {
            log::debug!("spawner stopped");
        }
    }
}

impl Drop for Spawner {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn run(interval: Duration, mut roller: SpawnRoller, stop: &AtomicBool, sender: &Sender<Command>) {
    if interval.is_zero() {
        log::debug!("spawner disabled by a zero interval");
        return;
    }

    loop {
        let deadline = Instant::now() + interval;
        loop {
            if stop.load(Ordering::Acquire) {
                return;
            }
            let now = Instant::now();
            if now >= deadline {
                break;
            }
            thread::park_timeout(deadline - now);
        }

        let command = roller.roll();
        log::trace!("spawner requests {command:?}");
        if sender.send(command).is_err() {
            log::debug!("spawn receiver dropped, stopping");
            return;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_spawn_attempts_without_interval() {
        let mut schedule = SpawnSchedule::new(Config::new(Duration::ZERO, 1));
        schedule.accumulator = Duration::from_secs(10);
        assert_eq!(schedule.resolve_spawn_attempts(), 0);
    }

    #[test]
    fn keeps_remainder_between_frames() {
        let mut schedule = SpawnSchedule::new(Config::new(Duration::from_secs(2), 1));
        schedule.accumulator = Duration::from_millis(4500);
        assert_eq!(schedule.resolve_spawn_attempts(), 2);
        assert_eq!(schedule.accumulator, Duration::from_millis(500));
    }
}
