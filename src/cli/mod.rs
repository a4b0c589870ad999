//! Command-line interface for taskboard
//!
//! This module defines the CLI structure using clap derive macros.
//! Each entity kind has its own submodule; `demo` replays reference
//! scenarios against an in-memory repository.

use std::path::{Path, PathBuf};

use chrono::{Duration, NaiveDateTime};
use clap::{Parser, Subcommand};

use crate::config::Config;
use crate::error::{Error, Result};
use crate::file_backed::FileBackedTaskManager;
use crate::model::{parse_date_time, Status, TaskId, TaskKind};
use crate::output::{emit_success, HumanOutput, OutputOptions};

mod demo;
mod epic;
mod render;
mod subtask;
mod task;

/// taskboard - tasks, epics and subtasks with time-slot conflict checks
#[derive(Parser, Debug)]
#[command(name = "taskboard")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Data file (defaults to storage.file from the config)
    #[arg(long, global = true, env = "TASKBOARD_FILE")]
    pub file: Option<PathBuf>,

    /// Config file (defaults to ./.taskboard.toml when present)
    #[arg(long, global = true, env = "TASKBOARD_CONFIG")]
    pub config: Option<PathBuf>,

    /// Output in JSON format
    #[arg(long, global = true)]
    pub json: bool,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Plain tasks
    #[command(subcommand)]
    Task(TaskCommands),

    /// Epics and their derived status
    #[command(subcommand)]
    Epic(EpicCommands),

    /// Subtasks owned by an epic
    #[command(subcommand)]
    Subtask(SubtaskCommands),

    /// Scheduled tasks and subtasks ordered by start time
    Prioritized,

    /// Replay the reference scenarios in memory (the data file is untouched)
    Demo,
}

/// Schedule flags shared by tasks and subtasks
#[derive(clap::Args, Debug, Clone, Default)]
pub struct ScheduleArgs {
    /// Start time, e.g. 2024-05-01T10:00
    #[arg(long)]
    pub start: Option<String>,

    /// Duration in minutes
    #[arg(long)]
    pub duration: Option<u32>,
}

/// Task subcommands
#[derive(Subcommand, Debug)]
pub enum TaskCommands {
    /// Add a task
    Add {
        name: String,

        #[arg(short, long, default_value = "")]
        description: String,

        /// NEW, IN_PROGRESS or DONE
        #[arg(long)]
        status: Option<String>,

        #[command(flatten)]
        schedule: ScheduleArgs,
    },

    /// Change fields of a task
    Update {
        id: TaskId,

        #[arg(long)]
        name: Option<String>,

        #[arg(short, long)]
        description: Option<String>,

        #[arg(long)]
        status: Option<String>,

        #[command(flatten)]
        schedule: ScheduleArgs,

        /// Drop the start time and duration
        #[arg(long, conflicts_with_all = ["start", "duration"])]
        unschedule: bool,
    },

    /// Show one task
    Show { id: TaskId },

    /// List all tasks
    List,

    /// Delete one task
    Delete { id: TaskId },

    /// Delete every task
    Clear,
}

/// Epic subcommands
#[derive(Subcommand, Debug)]
pub enum EpicCommands {
    /// Add an epic
    Add {
        name: String,

        #[arg(short, long, default_value = "")]
        description: String,
    },

    /// Rename or re-describe an epic
    Update {
        id: TaskId,

        #[arg(long)]
        name: Option<String>,

        #[arg(short, long)]
        description: Option<String>,
    },

    /// Show one epic with its subtasks
    Show { id: TaskId },

    /// List all epics
    List,

    /// Delete an epic and its subtasks
    Delete { id: TaskId },

    /// Delete every epic and subtask
    Clear,

    /// List the subtasks of an epic
    Subtasks { id: TaskId },
}

/// Subtask subcommands
#[derive(Subcommand, Debug)]
pub enum SubtaskCommands {
    /// Add a subtask to an epic
    Add {
        /// Owning epic
        epic: TaskId,

        name: String,

        #[arg(short, long, default_value = "")]
        description: String,

        #[arg(long)]
        status: Option<String>,

        #[command(flatten)]
        schedule: ScheduleArgs,
    },

    /// Change fields of a subtask
    Update {
        id: TaskId,

        #[arg(long)]
        name: Option<String>,

        #[arg(short, long)]
        description: Option<String>,

        #[arg(long)]
        status: Option<String>,

        #[command(flatten)]
        schedule: ScheduleArgs,

        #[arg(long, conflicts_with_all = ["start", "duration"])]
        unschedule: bool,
    },

    /// Show one subtask
    Show { id: TaskId },

    /// List all subtasks
    List,

    /// Delete one subtask
    Delete { id: TaskId },

    /// Delete every subtask; epics stay and return to NEW
    Clear,
}

#[derive(serde::Serialize)]
pub(crate) struct DeletedReport {
    pub kind: TaskKind,
    pub id: TaskId,
}

#[derive(serde::Serialize)]
pub(crate) struct ClearedReport {
    pub kind: TaskKind,
    pub removed: usize,
}

/// State shared by every command that touches the data file.
pub(crate) struct Context {
    pub repo: FileBackedTaskManager,
    pub config: Config,
    pub options: OutputOptions,
}

impl Context {
    fn open(file: Option<PathBuf>, config: Option<PathBuf>, options: OutputOptions) -> Result<Self> {
        let (config, base_dir) = match config {
            Some(path) => {
                let base_dir = path
                    .parent()
                    .map(Path::to_path_buf)
                    .unwrap_or_else(|| PathBuf::from("."));
                (Config::load(&path)?, base_dir)
            }
            None => {
                let cwd = std::env::current_dir()?;
                (Config::load_from_dir(&cwd)?, cwd)
            }
        };

        let mut storage = config.storage(&base_dir);
        if let Some(file) = file {
            storage = crate::storage::Storage::new(file)
                .with_lock_timeout(config.storage.lock_timeout_ms);
        }
        tracing::debug!(path = %storage.data_file().display(), "opening data file");

        let repo = FileBackedTaskManager::load_from(storage, config.history_tracker())?;
        Ok(Self {
            repo,
            config,
            options,
        })
    }

    /// Human output pre-filled with rows skipped while loading.
    pub fn human(&self, header: impl Into<String>) -> HumanOutput {
        let mut human = HumanOutput::new(header);
        for err in self.repo.load_errors() {
            human.push_warning(err.to_string());
        }
        human
    }

    pub fn emit<T: serde::Serialize>(&self, command: &str, data: &T, human: &HumanOutput) -> Result<()> {
        emit_success(self.options, command, data, Some(human))
    }

    pub fn date_format(&self) -> &str {
        &self.config.output.date_format
    }
}

pub(crate) fn parse_status(value: Option<&str>) -> Result<Option<Status>> {
    value.map(str::parse).transpose()
}

pub(crate) fn parse_start(value: &str) -> Result<NaiveDateTime> {
    parse_date_time(value).ok_or_else(|| {
        Error::InvalidArgument(format!(
            "invalid start time '{value}' (expected YYYY-MM-DDTHH:MM[:SS])"
        ))
    })
}

impl ScheduleArgs {
    /// Start and duration for a new item. A duration without a start is rejected.
    pub(crate) fn resolve(&self) -> Result<(Option<NaiveDateTime>, Duration)> {
        let start = self.start.as_deref().map(parse_start).transpose()?;
        let duration = Duration::minutes(i64::from(self.duration.unwrap_or(0)));
        if start.is_none() && self.duration.is_some() {
            return Err(Error::InvalidArgument(
                "--duration requires --start".to_string(),
            ));
        }
        Ok((start, duration))
    }

    /// Merge with an existing schedule; omitted flags keep current values.
    pub(crate) fn merge(
        &self,
        start: Option<NaiveDateTime>,
        duration: Duration,
    ) -> Result<(Option<NaiveDateTime>, Duration)> {
        let start = match self.start.as_deref() {
            Some(value) => Some(parse_start(value)?),
            None => start,
        };
        let duration = self
            .duration
            .map(|minutes| Duration::minutes(i64::from(minutes)))
            .unwrap_or(duration);
        if start.is_none() && self.duration.is_some() {
            return Err(Error::InvalidArgument(
                "--duration requires a start time".to_string(),
            ));
        }
        Ok((start, duration))
    }
}

fn run_prioritized(ctx: &Context) -> Result<()> {
    let prioritized = ctx.repo.get_prioritized_tasks();
    let mut human = ctx.human(format!("taskboard prioritized: {} scheduled", prioritized.len()));
    for entity in &prioritized {
        human.push_detail(render::line(entity, ctx.date_format()));
    }
    if prioritized.is_empty() {
        human.push_next_step("taskboard task add <name> --start <time> --duration <minutes>");
    }
    ctx.emit("prioritized", &prioritized, &human)
}

impl Cli {
    /// Execute the CLI command
    pub fn run(self) -> Result<()> {
        let options = OutputOptions {
            json: self.json,
            quiet: self.quiet,
        };
        if let Commands::Demo = self.command {
            return demo::run(options);
        }

        let mut ctx = Context::open(self.file, self.config, options)?;
        match self.command {
            Commands::Task(cmd) => task::run(&mut ctx, cmd),
            Commands::Epic(cmd) => epic::run(&mut ctx, cmd),
            Commands::Subtask(cmd) => subtask::run(&mut ctx, cmd),
            Commands::Prioritized => run_prioritized(&ctx),
            Commands::Demo => demo::run(options),
        }
    }
}
