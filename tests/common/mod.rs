use std::{path::PathBuf, sync::Mutex};

use assert_cmd::{assert::Assert, Command};
use once_cell::sync::Lazy;
use tempfile::TempDir;

/// Keeps temp dirs alive until the test binary exits.
static TEST_DIRS: Lazy<Mutex<Vec<TempDir>>> = Lazy::new(|| Mutex::new(Vec::new()));

pub const TODAY: &str = "2024-11-20";

/// Creates an isolated data directory for one test.
pub fn temp_home() -> PathBuf {
    let temp = TempDir::new().expect("create temp dir");
    let path = temp.path().to_path_buf();
    TEST_DIRS.lock().expect("lock temp dir registry").push(temp);
    path
}

/// Runs the shell in script mode with `lines` on stdin and a pinned reference date.
pub fn run_script(home: &PathBuf, lines: &[&str]) -> Assert {
    let mut input = lines.join("\n");
    input.push('\n');
    Command::cargo_bin("installment_core_cli")
        .expect("binary built")
        .env("INSTALLMENT_CORE_CLI_SCRIPT", "1")
        .env("INSTALLMENT_CORE_TODAY", TODAY)
        .env("INSTALLMENT_CORE_HOME", home)
        .env("RUST_LOG", "off")
        .write_stdin(input)
        .assert()
}

pub fn stdout_of(assert: &Assert) -> String {
    String::from_utf8_lossy(&assert.get_output().stdout).into_owned()
}
