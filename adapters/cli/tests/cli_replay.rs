use std::process::Command;

fn replay(seed: &str) -> String {
    let output = Command::new(env!("CARGO_BIN_EXE_gridpulse"))
        .args([
            "--replay",
            "--quiet-board",
            "--turns",
            "40",
            "--spawn-interval-ms",
            "100",
            "--seed",
            seed,
        ])
        .env_remove("RUST_LOG")
        .output()
        .expect("failed to run gridpulse binary");

    assert!(output.status.success(), "gridpulse exited with {}", output.status);
    String::from_utf8(output.stdout).expect("utf-8 output")
}

#[test]
fn replay_runs_are_reproducible() {
    let first = replay("42");
    let second = replay("42");

    assert_eq!(first, second);
    assert!(first.starts_with("Welcome to Grid Pulse."));
    assert!(first.lines().any(|line| line.starts_with("match ")));
}

#[test]
fn rejects_zero_spawn_interval() {
    let status = Command::new(env!("CARGO_BIN_EXE_gridpulse"))
        .args(["--replay", "--spawn-interval-ms", "0"])
        .status()
        .expect("failed to run gridpulse binary");

    assert!(!status.success());
}
