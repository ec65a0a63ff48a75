use std::{
    collections::HashSet,
    time::{Duration, Instant},
};

use gridpulse_core::{Command, EnemyKind, Event, SpawnCorner};
use gridpulse_system_spawning::{Config, SpawnRoller, SpawnSchedule, Spawner};
use gridpulse_world::{self as world, query, World};

#[test]
fn rollers_with_equal_seeds_agree() {
    let mut first = SpawnRoller::new(0x1234_5678);
    let mut second = SpawnRoller::new(0x1234_5678);

    for _ in 0..64 {
        assert_eq!(first.roll(), second.roll());
    }
}

#[test]
fn rolls_cover_every_corner_and_favour_plain_enemies() {
    let mut roller = SpawnRoller::new(7);
    let mut corners = HashSet::new();
    let mut wall_forming = 0;
    let total = 800;

    for _ in 0..total {
        match roller.roll() {
            Command::SpawnEnemy { corner, kind } => {
                let _ = corners.insert(corner);
                if kind == EnemyKind::WallForming {
                    wall_forming += 1;
                }
            }
            other => panic!("unexpected command emitted: {other:?}"),
        }
    }

    assert_eq!(corners.len(), SpawnCorner::ALL.len());
    assert!(
        (120..=280).contains(&wall_forming),
        "wall-forming share far from one in four: {wall_forming}/{total}"
    );
}

#[test]
fn emits_multiple_spawn_commands_for_large_dt() {
    let mut schedule = SpawnSchedule::new(Config::new(Duration::from_millis(500), 0x1234_5678));
    let mut commands = Vec::new();

    schedule.handle(
        &[Event::TimeAdvanced {
            dt: Duration::from_secs(2),
        }],
        &mut commands,
    );

    assert_eq!(commands.len(), 4, "expected one spawn per interval");
    let mut roller = SpawnRoller::new(0x1234_5678);
    for command in commands {
        assert_eq!(command, roller.roll());
    }
}

#[test]
fn accumulates_small_frames_until_interval_elapses() {
    let mut schedule = SpawnSchedule::new(Config::default());
    let frame = [Event::TimeAdvanced {
        dt: Duration::from_millis(250),
    }];
    let mut commands = Vec::new();

    for _ in 0..7 {
        schedule.handle(&frame, &mut commands);
    }
    assert!(commands.is_empty());

    schedule.handle(&frame, &mut commands);
    assert_eq!(commands.len(), 1);
}

#[test]
fn ignores_events_without_elapsed_time() {
    let mut schedule = SpawnSchedule::new(Config::new(Duration::from_millis(1), 3));
    let mut commands = Vec::new();

    schedule.handle(&[Event::PulseCompleted, Event::PulseRefused], &mut commands);

    assert!(commands.is_empty());
}

#[test]
fn zero_interval_disables_spawning() {
    let mut schedule = SpawnSchedule::new(Config::new(Duration::ZERO, 3));
    let mut commands = Vec::new();

    schedule.handle(
        &[Event::TimeAdvanced {
            dt: Duration::from_secs(60),
        }],
        &mut commands,
    );

    assert!(commands.is_empty());
}

#[test]
fn spawner_thread_delivers_seeded_requests() {
    let seed = 0x00c0_ffee;
    let mut spawner =
        Spawner::start(Config::new(Duration::from_millis(5), seed)).expect("thread starts");
    let mut roller = SpawnRoller::new(seed);

    for _ in 0..3 {
        let command = spawner
            .recv_timeout(Duration::from_secs(5))
            .expect("spawn request arrives");
        assert_eq!(command, roller.roll());
    }

    spawner.shutdown();
    assert!(!spawner.is_running());
}

#[test]
fn shutdown_interrupts_long_sleep() {
    let mut spawner =
        Spawner::start(Config::new(Duration::from_secs(3600), 1)).expect("thread starts");
    let mut pending = Vec::new();
    spawner.drain_into(&mut pending);
    assert!(pending.is_empty());

    let started = Instant::now();
    spawner.shutdown();

    assert!(started.elapsed() < Duration::from_secs(5));
    assert!(!spawner.is_running());
    spawner.shutdown();
}

#[test]
fn drained_requests_populate_the_world() {
    let mut spawner =
        Spawner::start(Config::new(Duration::from_millis(2), 11)).expect("thread starts");
    let mut commands = Vec::new();
    let deadline = Instant::now() + Duration::from_secs(5);
    while commands.len() < 6 && Instant::now() < deadline {
        std::thread::sleep(Duration::from_millis(5));
        spawner.drain_into(&mut commands);
    }
    spawner.shutdown();
    assert!(commands.len() >= 6, "spawner stalled");

    let mut world = World::new();
    let mut spawned = 0;
    let mut deferred = 0;
    for command in commands {
        let mut events = Vec::new();
        world::apply(&mut world, command, &mut events);
        for event in events {
            match event {
                Event::EnemySpawned { .. } => spawned += 1,
                Event::SpawnDeferred { .. } => deferred += 1,
                other => panic!("unexpected event: {other:?}"),
            }
        }
    }

    assert!(spawned >= 1);
    assert!(spawned <= SpawnCorner::ALL.len());
    assert_eq!(query::enemies(&world).len(), spawned);
    assert_eq!(query::spawn_backlog(&world), deferred);
    assert!(spawned + deferred >= 6);
}
