#![allow(dead_code)]

use std::path::Path;

use assert_cmd::Command;
use chrono::{Duration, NaiveDate, NaiveDateTime};
use taskboard::{Epic, TaskManager};

/// 2024-05-01 at `hour:minute`.
pub fn at(hour: u32, minute: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 5, 1)
        .and_then(|date| date.and_hms_opt(hour, minute, 0))
        .expect("valid time")
}

pub fn minutes(value: i64) -> Duration {
    Duration::minutes(value)
}

/// Adds an epic and returns its stored copy.
pub fn stored_epic(manager: &mut TaskManager, name: &str) -> Epic {
    let id = manager.add_epic(&Epic::new(name, "")).expect("add epic");
    manager.get_epic(id).expect("stored epic")
}

/// CLI command running in `dir`, isolated from the caller's environment.
pub fn taskboard_cmd(dir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("taskboard").expect("binary");
    cmd.current_dir(dir)
        .env_remove("TASKBOARD_FILE")
        .env_remove("TASKBOARD_CONFIG")
        .env_remove("RUST_LOG");
    cmd
}
