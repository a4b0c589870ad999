//! taskboard - task, epic and subtask repository
//!
//! This library provides an in-memory repository for three linked kinds of
//! work items, plus the persistence and CLI layers built on top of it.
//!
//! # Core Concepts
//!
//! - **Tasks**: plain items with an optional start time and duration
//! - **Epics**: own an ordered list of subtasks; status and schedule are derived
//! - **Subtasks**: belong to exactly one epic
//! - **Time index**: scheduled tasks and subtasks may never overlap
//! - **History**: most recently viewed items, deduplicated by id
//!
//! # Module Organization
//!
//! - `model`: entity types and the `WorkItem` trait
//! - `aggregate`: epic status and schedule derivation
//! - `schedule`: time index and overlap detection
//! - `history`: view history tracker
//! - `manager`: the repository enforcing all invariants
//! - `shared`: thread-safe repository handle
//! - `codec`: CSV row encoding and decoding
//! - `file_backed`: repository saved to a snapshot file after every mutation
//! - `storage`: data file access and atomic writes
//! - `lock`: file locking for concurrent savers
//! - `config`: configuration loading from `.taskboard.toml`
//! - `error`: error types and result aliases
//! - `output`: JSON envelope and human output
//! - `cli`: command-line interface using clap

pub mod aggregate;
pub mod cli;
pub mod codec;
pub mod config;
pub mod error;
pub mod file_backed;
pub mod history;
pub mod lock;
pub mod manager;
pub mod model;
pub mod output;
pub mod schedule;
pub mod shared;
pub mod storage;

pub use error::{Error, Result};
pub use file_backed::FileBackedTaskManager;
pub use manager::TaskManager;
pub use model::{Entity, Epic, Status, Subtask, Task, TaskId, TaskKind, TaskPatch, WorkItem};
pub use shared::SharedTaskManager;
