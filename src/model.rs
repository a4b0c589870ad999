//! Entity model for taskboard.
//!
//! Three kinds of work items share one base record:
//! - [`Task`]: plain schedulable item
//! - [`Epic`]: owns an ordered list of subtasks; its status and schedule are derived
//! - [`Subtask`]: owned by exactly one epic, holds a snapshot of that epic
//!
//! Equality and hashing are id-based for every kind. Values are copied at every
//! repository boundary, so nothing here is shared mutably.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;
use std::sync::Arc;

use chrono::{Duration, NaiveDateTime};
use serde::{Serialize, Serializer};

use crate::aggregate::EpicSummary;
use crate::error::{Error, Result};

/// Repository-assigned identifier. Zero means "not yet assigned".
pub type TaskId = u64;

pub const UNASSIGNED_ID: TaskId = 0;

/// Formats accepted when parsing start times, most specific first.
const DATE_TIME_INPUT_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
];

pub fn parse_date_time(value: &str) -> Option<NaiveDateTime> {
    let trimmed = value.trim();
    DATE_TIME_INPUT_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(trimmed, format).ok())
}

fn serialize_minutes<S: Serializer>(duration: &Duration, serializer: S) -> std::result::Result<S::Ok, S::Error> {
    serializer.serialize_i64(duration.num_minutes())
}

fn serialize_epic_ref<S: Serializer>(
    epic: &Option<Arc<Task>>,
    serializer: S,
) -> std::result::Result<S::Ok, S::Error> {
    match epic {
        Some(epic) => serializer.serialize_some(&epic.id),
        None => serializer.serialize_none(),
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Status {
    #[default]
    New,
    InProgress,
    Done,
}

impl Status {
    pub fn as_str(&self) -> &'static str {
        match self {
            Status::New => "NEW",
            Status::InProgress => "IN_PROGRESS",
            Status::Done => "DONE",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Status {
    type Err = Error;

    fn from_str(value: &str) -> Result<Self> {
        match value.trim().to_ascii_uppercase().replace('-', "_").as_str() {
            "NEW" => Ok(Status::New),
            "IN_PROGRESS" => Ok(Status::InProgress),
            "DONE" => Ok(Status::Done),
            other => Err(Error::InvalidArgument(format!(
                "invalid status '{other}' (expected NEW|IN_PROGRESS|DONE)"
            ))),
        }
    }
}

/// Kind tag shared by the row codec and output.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskKind {
    Task,
    Epic,
    Subtask,
}

impl TaskKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskKind::Task => "TASK",
            TaskKind::Epic => "EPIC",
            TaskKind::Subtask => "SUBTASK",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            TaskKind::Task => "task",
            TaskKind::Epic => "epic",
            TaskKind::Subtask => "subtask",
        }
    }
}

impl fmt::Display for TaskKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for TaskKind {
    type Err = Error;

    fn from_str(value: &str) -> Result<Self> {
        match value.trim() {
            "TASK" => Ok(TaskKind::Task),
            "EPIC" => Ok(TaskKind::Epic),
            "SUBTASK" => Ok(TaskKind::Subtask),
            other => Err(Error::InvalidArgument(format!("unknown task type '{other}'"))),
        }
    }
}

/// Partial update: every `None` keeps the original value.
#[derive(Debug, Clone, Default)]
pub struct TaskPatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub status: Option<Status>,
    pub start_time: Option<NaiveDateTime>,
    pub duration: Option<Duration>,
}

impl TaskPatch {
    pub fn status(status: Status) -> Self {
        Self {
            status: Some(status),
            ..Self::default()
        }
    }
}

/// Common read surface of tasks, epics and subtasks.
pub trait WorkItem {
    fn base(&self) -> &Task;

    fn kind(&self) -> TaskKind;

    fn id(&self) -> TaskId {
        self.base().id
    }

    fn name(&self) -> &str {
        &self.base().name
    }

    fn description(&self) -> &str {
        &self.base().description
    }

    fn status(&self) -> Status {
        self.base().status
    }

    fn start_time(&self) -> Option<NaiveDateTime> {
        self.base().start_time
    }

    fn duration(&self) -> Duration {
        self.base().duration
    }

    fn end_time(&self) -> Option<NaiveDateTime> {
        let base = self.base();
        base.start_time
            .and_then(|start| start.checked_add_signed(base.duration))
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Task {
    id: TaskId,
    name: String,
    description: String,
    status: Status,
    #[serde(skip_serializing_if = "Option::is_none")]
    start_time: Option<NaiveDateTime>,
    #[serde(rename = "duration_minutes", serialize_with = "serialize_minutes")]
    duration: Duration,
}

impl Task {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self::from_parts(
            UNASSIGNED_ID,
            name,
            description,
            Status::New,
            None,
            Duration::zero(),
        )
    }

    pub fn scheduled(
        name: impl Into<String>,
        description: impl Into<String>,
        start_time: NaiveDateTime,
        duration: Duration,
    ) -> Self {
        Self::from_parts(
            UNASSIGNED_ID,
            name,
            description,
            Status::New,
            Some(start_time),
            duration,
        )
    }

    /// Builds a task with every field given, including the id. Used when
    /// replaying persisted rows.
    pub fn from_parts(
        id: TaskId,
        name: impl Into<String>,
        description: impl Into<String>,
        status: Status,
        start_time: Option<NaiveDateTime>,
        duration: Duration,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            description: description.into(),
            status,
            start_time,
            duration,
        }
    }

    pub fn copy(&self) -> Self {
        self.clone()
    }

    pub fn copy_with_id(&self, id: TaskId) -> Self {
        Self { id, ..self.clone() }
    }

    pub fn copy_with(&self, patch: TaskPatch) -> Self {
        Self {
            id: self.id,
            name: patch.name.unwrap_or_else(|| self.name.clone()),
            description: patch.description.unwrap_or_else(|| self.description.clone()),
            status: patch.status.unwrap_or(self.status),
            start_time: patch.start_time.or(self.start_time),
            duration: patch.duration.unwrap_or(self.duration),
        }
    }

    pub fn set_status(&mut self, status: Status) {
        self.status = status;
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    pub fn set_description(&mut self, description: impl Into<String>) {
        self.description = description.into();
    }

    /// Replaces both schedule fields; `None` unschedules the task.
    pub fn set_schedule(&mut self, start_time: Option<NaiveDateTime>, duration: Duration) {
        self.start_time = start_time;
        self.duration = duration;
    }
}

impl WorkItem for Task {
    fn base(&self) -> &Task {
        self
    }

    fn kind(&self) -> TaskKind {
        TaskKind::Task
    }
}

impl PartialEq for Task {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Task {}

impl Hash for Task {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Epic {
    #[serde(flatten)]
    task: Task,
    #[serde(skip_serializing_if = "Option::is_none")]
    end_time: Option<NaiveDateTime>,
    subtasks: Vec<Subtask>,
}

impl Epic {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self::from_parts(UNASSIGNED_ID, name, description)
    }

    pub fn from_parts(id: TaskId, name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            task: Task::from_parts(id, name, description, Status::New, None, Duration::zero()),
            end_time: None,
            subtasks: Vec::new(),
        }
    }

    pub fn copy(&self) -> Self {
        self.clone()
    }

    pub fn copy_with_id(&self, id: TaskId) -> Self {
        let mut copy = self.clone();
        copy.task.id = id;
        copy
    }

    /// Patch-copy of the descriptive fields. Schedule fields in the patch are
    /// ignored because they are derived from subtasks.
    pub fn copy_with(&self, patch: TaskPatch) -> Self {
        let mut copy = self.clone();
        copy.task = self.task.copy_with(TaskPatch {
            start_time: None,
            duration: None,
            ..patch
        });
        copy
    }

    pub fn subtasks(&self) -> &[Subtask] {
        &self.subtasks
    }

    pub fn subtask_ids(&self) -> Vec<TaskId> {
        self.subtasks.iter().map(|subtask| subtask.id()).collect()
    }

    /// Appends a subtask, or replaces the entry with the same id in place.
    pub fn add_subtask(&mut self, subtask: Subtask) {
        match self
            .subtasks
            .iter_mut()
            .find(|existing| existing.id() == subtask.id())
        {
            Some(slot) => *slot = subtask,
            None => self.subtasks.push(subtask),
        }
    }

    pub fn remove_subtask(&mut self, id: TaskId) -> Option<Subtask> {
        let position = self.subtasks.iter().position(|subtask| subtask.id() == id)?;
        Some(self.subtasks.remove(position))
    }

    pub fn clear_subtasks(&mut self) {
        self.subtasks.clear();
    }

    /// Forces the status. The repository overwrites it on the next recompute.
    pub fn set_status(&mut self, status: Status) {
        self.task.status = status;
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.task.name = name.into();
    }

    pub fn set_description(&mut self, description: impl Into<String>) {
        self.task.description = description.into();
    }

    pub(crate) fn apply_summary(&mut self, summary: EpicSummary) {
        self.task.status = summary.status;
        self.task.start_time = summary.start_time;
        self.task.duration = summary.duration;
        self.end_time = summary.end_time;
    }
}

impl WorkItem for Epic {
    fn base(&self) -> &Task {
        &self.task
    }

    fn kind(&self) -> TaskKind {
        TaskKind::Epic
    }

    fn end_time(&self) -> Option<NaiveDateTime> {
        self.end_time
    }
}

impl PartialEq for Epic {
    fn eq(&self, other: &Self) -> bool {
        self.id() == other.id()
    }
}

impl Eq for Epic {}

impl Hash for Epic {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id().hash(state);
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Subtask {
    #[serde(flatten)]
    task: Task,
    #[serde(rename = "epic_id", serialize_with = "serialize_epic_ref")]
    epic: Option<Arc<Task>>,
}

impl Subtask {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            task: Task::new(name, description),
            epic: None,
        }
    }

    pub fn scheduled(
        name: impl Into<String>,
        description: impl Into<String>,
        start_time: NaiveDateTime,
        duration: Duration,
    ) -> Self {
        Self {
            task: Task::scheduled(name, description, start_time, duration),
            epic: None,
        }
    }

    pub fn from_parts(
        id: TaskId,
        name: impl Into<String>,
        description: impl Into<String>,
        status: Status,
        start_time: Option<NaiveDateTime>,
        duration: Duration,
    ) -> Self {
        Self {
            task: Task::from_parts(id, name, description, status, start_time, duration),
            epic: None,
        }
    }

    /// Copies share the epic snapshot instead of cloning it.
    pub fn copy(&self) -> Self {
        self.clone()
    }

    pub fn copy_with_id(&self, id: TaskId) -> Self {
        Self {
            task: self.task.copy_with_id(id),
            epic: self.epic.clone(),
        }
    }

    pub fn copy_with(&self, patch: TaskPatch) -> Self {
        Self {
            task: self.task.copy_with(patch),
            epic: self.epic.clone(),
        }
    }

    /// Snapshot of the owning epic taken when the subtask was last stored.
    pub fn epic(&self) -> Option<&Task> {
        self.epic.as_deref()
    }

    pub fn epic_id(&self) -> Option<TaskId> {
        self.epic.as_ref().map(|epic| epic.id)
    }

    pub(crate) fn link_to(&mut self, epic: &Epic) {
        self.epic = Some(Arc::new(epic.task.clone()));
    }

    pub fn set_status(&mut self, status: Status) {
        self.task.status = status;
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.task.name = name.into();
    }

    pub fn set_description(&mut self, description: impl Into<String>) {
        self.task.description = description.into();
    }

    pub fn set_schedule(&mut self, start_time: Option<NaiveDateTime>, duration: Duration) {
        self.task.set_schedule(start_time, duration);
    }
}

impl WorkItem for Subtask {
    fn base(&self) -> &Task {
        &self.task
    }

    fn kind(&self) -> TaskKind {
        TaskKind::Subtask
    }
}

impl PartialEq for Subtask {
    fn eq(&self, other: &Self) -> bool {
        self.id() == other.id()
    }
}

impl Eq for Subtask {}

impl Hash for Subtask {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id().hash(state);
    }
}

/// Any stored work item. Used by history, prioritization and persistence.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Entity {
    Task(Task),
    Epic(Epic),
    Subtask(Subtask),
}

impl WorkItem for Entity {
    fn base(&self) -> &Task {
        match self {
            Entity::Task(task) => task.base(),
            Entity::Epic(epic) => epic.base(),
            Entity::Subtask(subtask) => subtask.base(),
        }
    }

    fn kind(&self) -> TaskKind {
        match self {
            Entity::Task(_) => TaskKind::Task,
            Entity::Epic(_) => TaskKind::Epic,
            Entity::Subtask(_) => TaskKind::Subtask,
        }
    }

    fn end_time(&self) -> Option<NaiveDateTime> {
        match self {
            Entity::Task(task) => task.end_time(),
            Entity::Epic(epic) => epic.end_time(),
            Entity::Subtask(subtask) => subtask.end_time(),
        }
    }
}

impl PartialEq for Entity {
    fn eq(&self, other: &Self) -> bool {
        self.id() == other.id()
    }
}

impl Eq for Entity {}

impl From<Task> for Entity {
    fn from(task: Task) -> Self {
        Entity::Task(task)
    }
}

impl From<Epic> for Entity {
    fn from(epic: Epic) -> Self {
        Entity::Epic(epic)
    }
}

impl From<Subtask> for Entity {
    fn from(subtask: Subtask) -> Self {
        Entity::Subtask(subtask)
    }
}
