use std::{fs, process::Command};

fn pipeflow() -> Command {
    Command::new(env!("CARGO_BIN_EXE_pipeflow"))
}

#[test]
fn seeded_run_reports_an_outcome() {
    let output = pipeflow()
        .args(["--seed", "7", "--tick-ms", "50"])
        .output()
        .expect("failed to run pipeflow");

    assert!(output.status.success(), "pipeflow exited with {}", output.status);
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("seed 7"), "missing seed line:\n{stdout}");
    assert!(
        stdout.contains("won:") || stdout.contains("lost:"),
        "missing outcome line:\n{stdout}"
    );
}

#[test]
fn identical_seeds_print_identical_boards() {
    let run = || {
        pipeflow()
            .args(["--seed", "31", "--tick-ms", "100"])
            .output()
            .expect("failed to run pipeflow")
            .stdout
    };
    assert_eq!(run(), run(), "seeded runs should be reproducible");
}

#[test]
fn invalid_config_fails_with_context() {
    let dir = std::env::temp_dir().join(format!("pipeflow-cli-{}", std::process::id()));
    fs::create_dir_all(&dir).expect("temp dir");
    let path = dir.join("bad.toml");
    fs::write(&path, "[gameplay]\nflow_speed = 9.0\n").expect("write config");

    let output = pipeflow()
        .arg("--config")
        .arg(&path)
        .output()
        .expect("failed to run pipeflow");

    assert!(!output.status.success(), "invalid config must fail");
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("gameplay.flow_speed"),
        "error should name the field:\n{stderr}"
    );
    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn zero_tick_is_rejected() {
    let output = pipeflow()
        .args(["--seed", "1", "--tick-ms", "0"])
        .output()
        .expect("failed to run pipeflow");
    assert!(!output.status.success());
}
