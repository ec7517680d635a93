//! Shared harness for behavioral specs.
//!
//! Each spec gets an isolated `Project`: a temp directory holding the
//! daemon state dir and the socket dir, so concurrent specs never share
//! a daemon. The harness stops the daemon on drop.

use assert_cmd::Command;
use std::path::PathBuf;
use std::time::{Duration, Instant};
use tempfile::TempDir;

/// Upper bound for wait_for polling in specs.
pub const SPEC_WAIT_MAX_MS: u64 = 10_000;

pub struct Project {
    root: TempDir,
}

impl Project {
    pub fn empty() -> Self {
        let root = TempDir::new().expect("create temp project");
        std::fs::create_dir_all(root.path().join("state")).unwrap();
        std::fs::create_dir_all(root.path().join("sock")).unwrap();
        Project { root }
    }

    pub fn state_path(&self) -> PathBuf {
        self.root.path().join("state")
    }

    pub fn socket_dir(&self) -> PathBuf {
        self.root.path().join("sock")
    }

    /// Write a file under the state directory (e.g. "settings.toml").
    pub fn state_file(&self, rel: &str, contents: &str) {
        let path = self.state_path().join(rel);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        std::fs::write(path, contents).unwrap();
    }

    /// Build a `fallow` invocation wired to this project's state.
    pub fn fallow(&self) -> SpecCmd {
        let mut cmd = Command::cargo_bin("fallow").expect("fallow binary");
        cmd.env("FALLOW_STATE_DIR", self.state_path())
            .env("FALLOW_SOCKET_DIR", self.socket_dir())
            .env(
                "FALLOW_DAEMON_BINARY",
                assert_cmd::cargo::cargo_bin("fallowd"),
            )
            .env("FALLOW_TIMEOUT_CONNECT_MS", "5000")
            .env("FALLOW_TIMEOUT_IPC_MS", "5000")
            .env("FALLOW_TIMEOUT_EXIT_MS", "3000")
            .env("FALLOW_POLL_INTERVAL_MS", "25");
        SpecCmd { cmd }
    }
}

impl Drop for Project {
    fn drop(&mut self) {
        // Best effort: tear down any daemon this spec started.
        let _ = self
            .fallow()
            .cmd
            .args(["daemon", "stop"])
            .timeout(Duration::from_secs(10))
            .output();
    }
}

pub struct SpecCmd {
    cmd: Command,
}

impl SpecCmd {
    pub fn args(mut self, args: &[&str]) -> Self {
        self.cmd.args(args);
        self
    }

    pub fn passes(mut self) -> SpecAssert {
        SpecAssert {
            assert: self.cmd.assert().success(),
        }
    }

    pub fn fails(mut self) -> SpecAssert {
        SpecAssert {
            assert: self.cmd.assert().failure(),
        }
    }

}

pub struct SpecAssert {
    assert: assert_cmd::assert::Assert,
}

impl SpecAssert {
    pub fn stdout_has(self, needle: &str) -> Self {
        SpecAssert {
            assert: self
                .assert
                .stdout(predicates::str::contains(needle.to_string())),
        }
    }

    pub fn stderr_has(self, needle: &str) -> Self {
        SpecAssert {
            assert: self
                .assert
                .stderr(predicates::str::contains(needle.to_string())),
        }
    }
}

/// Poll `f` until it returns true or `max_ms` elapses.
pub fn wait_for(max_ms: u64, mut f: impl FnMut() -> bool) -> bool {
    let deadline = Instant::now() + Duration::from_millis(max_ms);
    loop {
        if f() {
            return true;
        }
        if Instant::now() >= deadline {
            return false;
        }
        std::thread::sleep(Duration::from_millis(50));
    }
}
