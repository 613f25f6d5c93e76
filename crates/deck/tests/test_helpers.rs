use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use serde_json::Value;

fn demos_dir() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .ancestors()
        .nth(2)
        .expect("deck crate sits two levels below the workspace")
        .join("demos")
}

/// Absolute path of a fixture under `demos/`, checked to exist.
pub fn demo(name: &str) -> String {
    let path = demos_dir().join(name);
    assert!(path.is_file(), "missing demo fixture {}", path.display());
    path.to_string_lossy().into_owned()
}

/// Run deck with stderr captured and logging pinned to warnings.
pub fn run_deck(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_deck"))
        .args(args)
        .env("RUST_LOG", "warn")
        .output()
        .unwrap_or_else(|e| panic!("cannot spawn deck {}: {e}", args.join(" ")))
}

/// Run deck, assert the exit code, parse stdout as JSON.
pub fn deck_json(args: &[&str], expected_exit: i32) -> Value {
    let out = run_deck(args);
    assert_eq!(
        out.status.code(),
        Some(expected_exit),
        "deck {}\nstderr: {}",
        args.join(" "),
        String::from_utf8_lossy(&out.stderr)
    );
    serde_json::from_slice(&out.stdout).unwrap_or_else(|e| {
        panic!(
            "deck {} printed no JSON ({e}): {}",
            args.join(" "),
            String::from_utf8_lossy(&out.stdout)
        )
    })
}

/// Run deck expecting success; returns stdout.
pub fn deck_ok(args: &[&str]) -> String {
    let out = run_deck(args);
    assert!(
        out.status.success(),
        "deck {} failed\nstderr: {}",
        args.join(" "),
        String::from_utf8_lossy(&out.stderr)
    );
    String::from_utf8_lossy(&out.stdout).into_owned()
}

/// Run deck expecting failure; returns stderr.
pub fn deck_err(args: &[&str]) -> String {
    let out = run_deck(args);
    assert!(
        !out.status.success(),
        "deck {} unexpectedly succeeded",
        args.join(" ")
    );
    String::from_utf8_lossy(&out.stderr).into_owned()
}
