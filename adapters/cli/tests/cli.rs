use std::process::Command;

fn room_crawl() -> Command {
    let mut command = Command::new(env!("CARGO_BIN_EXE_room-crawl"));
    let _ = command.env("RUST_LOG", "off");
    command
}

#[test]
fn json_snapshot_is_printed_on_stdout() {
    let output = room_crawl()
        .args(["--seed", "21", "--ticks", "5", "--script", "u*2 s", "--json"])
        .output()
        .expect("failed to run room-crawl");

    assert!(output.status.success(), "room-crawl should exit cleanly");
    let value: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("stdout holds the json report");
    assert_eq!(value["snapshot"]["tick"], 5);
    assert_eq!(value["snapshot"]["room"]["level"], 1);
}

#[test]
fn invalid_script_fails_with_context() {
    let output = room_crawl()
        .args(["--script", "north"])
        .output()
        .expect("failed to run room-crawl");

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("invalid --script"), "stderr was: {stderr}");
}

#[test]
fn missing_config_file_is_reported() {
    let output = room_crawl()
        .args(["--config", "/nonexistent/room-crawl.toml"])
        .output()
        .expect("failed to run room-crawl");

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("failed to load configuration"), "stderr was: {stderr}");
}
