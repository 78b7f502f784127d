//! Stand-in container engine for tests

use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Writes a shell script standing in for the engine binary
///
/// The script appends its arguments to `calls.log`, then exits with
/// `build_exit` for `build`, `push_exit` for `push` and 0 otherwise. Run it
/// as `sh <script>` so the file never needs to be executable.
///
/// # Returns
/// The script path and the call log path
pub fn fake_engine_script(dir: &TempDir, build_exit: i32, push_exit: i32) -> (PathBuf, PathBuf) {
    let log = dir.path().join("calls.log");
    let script = dir.path().join("fake-engine.sh");
    fs::write(
        &script,
        format!(
            "printf '%s\\n' \"$*\" >> '{}'\n\
             case \"$1\" in\n  build) exit {} ;;\n  push) exit {} ;;\nesac\nexit 0\n",
            log.display(),
            build_exit,
            push_exit
        ),
    )
    .unwrap();

    (script, log)
}

/// Engine invocations recorded by [`fake_engine_script`], one per line
pub fn calls(log: &Path) -> Vec<String> {
    fs::read_to_string(log)
        .unwrap_or_default()
        .lines()
        .map(str::to_string)
        .collect()
}
