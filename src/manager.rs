//! In-memory task repository.
//!
//! The manager owns one identity map per kind, the time index for scheduled
//! tasks/subtasks, and the view history. Every value crossing its API is
//! copied in or out, so callers never alias stored state.
//!
//! Invariants held between calls:
//! - ids are non-zero and drawn from one counter shared by all kinds
//! - every subtask's owner epic is present, and lists the subtask
//! - epic status/schedule always reflect the epic's current subtasks
//! - no two scheduled tasks/subtasks overlap

use std::collections::BTreeMap;

use chrono::{Duration, Timelike};

use crate::aggregate::{self, EpicSummary};
use crate::error::{Error, Result};
use crate::history::HistoryTracker;
use crate::model::{Entity, Epic, Subtask, Task, TaskId, TaskKind, WorkItem, UNASSIGNED_ID};
use crate::schedule::{Slot, SlotConflict, TimeIndex};

#[derive(Debug)]
pub struct TaskManager {
    tasks: BTreeMap<TaskId, Task>,
    epics: BTreeMap<TaskId, Epic>,
    subtasks: BTreeMap<TaskId, Subtask>,
    timeline: TimeIndex,
    history: HistoryTracker,
    next_id: TaskId,
}

impl Default for TaskManager {
    fn default() -> Self {
        Self::new()
    }
}

impl TaskManager {
    pub fn new() -> Self {
        Self::with_history(HistoryTracker::default())
    }

    pub fn with_history(history: HistoryTracker) -> Self {
        Self {
            tasks: BTreeMap::new(),
            epics: BTreeMap::new(),
            subtasks: BTreeMap::new(),
            timeline: TimeIndex::new(),
            history,
            next_id: 1,
        }
    }

    /// Id the next added entity will receive.
    pub fn next_id(&self) -> TaskId {
        self.next_id
    }

    pub fn len(&self) -> usize {
        self.tasks.len() + self.epics.len() + self.subtasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Kind of the entity stored under `id`, without touching history.
    pub fn kind_of(&self, id: TaskId) -> Option<TaskKind> {
        if self.tasks.contains_key(&id) {
            Some(TaskKind::Task)
        } else if self.epics.contains_key(&id) {
            Some(TaskKind::Epic)
        } else if self.subtasks.contains_key(&id) {
            Some(TaskKind::Subtask)
        } else {
            None
        }
    }

    // =========================================================================
    // Create
    // =========================================================================

    pub fn add_task(&mut self, task: &Task) -> Result<TaskId> {
        validate(task)?;
        let id = self.next_id;
        let stored = task.copy_with_id(id);
        self.reserve_slot(&stored)?;
        self.tasks.insert(id, stored);
        self.next_id += 1;
        tracing::debug!(id, "task added");
        Ok(id)
    }

    pub fn add_epic(&mut self, epic: &Epic) -> Result<TaskId> {
        if !epic.subtasks().is_empty() {
            return Err(Error::InvalidArgument(
                "epic must be added without subtasks; add them with add_subtask".to_string(),
            ));
        }
        let id = self.next_id;
        self.epics
            .insert(id, Epic::from_parts(id, epic.name(), epic.description()));
        self.next_id += 1;
        self.refresh_epic(id);
        tracing::debug!(id, "epic added");
        Ok(id)
    }

    pub fn add_subtask(&mut self, subtask: &Subtask, epic: &Epic) -> Result<TaskId> {
        validate(subtask)?;
        let epic_id = epic.id();
        let owner = self.epics.get(&epic_id).ok_or(Error::EpicNotFound(epic_id))?;
        let id = self.next_id;
        let mut stored = subtask.copy_with_id(id);
        stored.link_to(owner);
        let summary = self.preview_epic(epic_id, &stored)?;
        self.reserve_slot(&stored)?;
        self.attach_subtask(epic_id, stored, summary);
        self.next_id += 1;
        tracing::debug!(id, epic_id, "subtask added");
        Ok(id)
    }

    // =========================================================================
    // Update
    // =========================================================================

    pub fn update_task(&mut self, task: &Task) -> Result<()> {
        validate(task)?;
        if !self.tasks.contains_key(&task.id()) {
            return Err(not_found(TaskKind::Task, task.id()));
        }
        let stored = task.copy();
        self.reserve_slot(&stored)?;
        self.tasks.insert(stored.id(), stored);
        tracing::debug!(id = task.id(), "task updated");
        Ok(())
    }

    /// Replaces the epic's name and description. Subtasks and derived fields
    /// stay under repository control; a forced status is recomputed away.
    pub fn update_epic(&mut self, epic: &Epic) -> Result<()> {
        let id = epic.id();
        let stored = self
            .epics
            .get_mut(&id)
            .ok_or_else(|| not_found(TaskKind::Epic, id))?;
        stored.set_name(epic.name());
        stored.set_description(epic.description());
        self.refresh_epic(id);
        tracing::debug!(id, "epic updated");
        Ok(())
    }

    pub fn update_subtask(&mut self, subtask: &Subtask) -> Result<()> {
        validate(subtask)?;
        let id = subtask.id();
        let current = self
            .subtasks
            .get(&id)
            .ok_or_else(|| not_found(TaskKind::Subtask, id))?;
        let epic_id = current
            .epic_id()
            .ok_or_else(|| Error::InvalidArgument(format!("subtask {id} has no epic")))?;
        if let Some(requested) = subtask.epic_id() {
            if requested != epic_id {
                return Err(Error::InvalidArgument(format!(
                    "subtask {id} belongs to epic {epic_id}, not {requested}"
                )));
            }
        }
        let owner = self.epics.get(&epic_id).ok_or(Error::EpicNotFound(epic_id))?;
        let mut stored = subtask.copy();
        stored.link_to(owner);
        let summary = self.preview_epic(epic_id, &stored)?;
        self.reserve_slot(&stored)?;
        self.attach_subtask(epic_id, stored, summary);
        tracing::debug!(id, epic_id, "subtask updated");
        Ok(())
    }

    // =========================================================================
    // Read
    // =========================================================================

    pub fn get_task(&mut self, id: TaskId) -> Option<Task> {
        let task = self.tasks.get(&id)?.copy();
        self.history.add(&Entity::Task(task.copy()));
        Some(task)
    }

    pub fn get_epic(&mut self, id: TaskId) -> Option<Epic> {
        let epic = self.epics.get(&id)?.copy();
        self.history.add(&Entity::Epic(epic.copy()));
        Some(epic)
    }

    pub fn get_subtask(&mut self, id: TaskId) -> Option<Subtask> {
        let subtask = self.subtasks.get(&id)?.copy();
        self.history.add(&Entity::Subtask(subtask.copy()));
        Some(subtask)
    }

    /// Current copy of the epic owning a stored subtask. Not recorded in history.
    pub fn get_epic_by_subtask(&self, subtask: &Subtask) -> Option<Epic> {
        let epic_id = self.subtasks.get(&subtask.id())?.epic_id()?;
        self.epics.get(&epic_id).map(Epic::copy)
    }

    pub fn get_subtasks_by_epic_id(&self, epic_id: TaskId) -> Vec<Subtask> {
        self.epics
            .get(&epic_id)
            .map(|epic| epic.subtasks().to_vec())
            .unwrap_or_default()
    }

    pub fn tasks(&self) -> Vec<Task> {
        self.tasks.values().map(Task::copy).collect()
    }

    pub fn epics(&self) -> Vec<Epic> {
        self.epics.values().map(Epic::copy).collect()
    }

    pub fn subtasks(&self) -> Vec<Subtask> {
        self.subtasks.values().map(Subtask::copy).collect()
    }

    /// Scheduled tasks and subtasks by start time. Unscheduled items are left out.
    pub fn get_prioritized_tasks(&self) -> Vec<Entity> {
        self.timeline
            .iter()
            .filter_map(|slot| {
                if let Some(task) = self.tasks.get(&slot.id) {
                    return Some(Entity::Task(task.copy()));
                }
                self.subtasks
                    .get(&slot.id)
                    .map(|subtask| Entity::Subtask(subtask.copy()))
            })
            .collect()
    }

    /// Viewed entities, least recent first.
    pub fn get_history(&self) -> Vec<Entity> {
        self.history.history()
    }

    pub fn clear_history(&mut self) {
        self.history.clear();
    }

    /// Every stored entity: tasks, then epics, then subtasks, each by id.
    pub fn snapshot(&self) -> Vec<Entity> {
        let tasks = self.tasks.values().cloned().map(Entity::Task);
        let epics = self.epics.values().cloned().map(Entity::Epic);
        let subtasks = self.subtasks.values().cloned().map(Entity::Subtask);
        tasks.chain(epics).chain(subtasks).collect()
    }

    // =========================================================================
    // Delete
    // =========================================================================

    pub fn delete_task(&mut self, id: TaskId) -> Option<Task> {
        let task = self.tasks.remove(&id)?;
        self.forget(id);
        tracing::debug!(id, "task deleted");
        Some(task)
    }

    /// Removes the epic and every subtask it owns.
    pub fn delete_epic(&mut self, id: TaskId) -> Option<Epic> {
        let epic = self.epics.remove(&id)?;
        for subtask_id in epic.subtask_ids() {
            self.subtasks.remove(&subtask_id);
            self.forget(subtask_id);
        }
        self.forget(id);
        tracing::debug!(id, subtasks = epic.subtasks().len(), "epic deleted");
        Some(epic)
    }

    pub fn delete_subtask(&mut self, id: TaskId) -> Option<Subtask> {
        let subtask = self.subtasks.remove(&id)?;
        self.forget(id);
        if let Some(epic_id) = subtask.epic_id() {
            if let Some(epic) = self.epics.get_mut(&epic_id) {
                epic.remove_subtask(id);
            }
            self.refresh_epic(epic_id);
        }
        tracing::debug!(id, "subtask deleted");
        Some(subtask)
    }

    pub fn delete_tasks(&mut self) {
        let ids: Vec<TaskId> = self.tasks.keys().copied().collect();
        for id in ids {
            self.forget(id);
        }
        self.tasks.clear();
    }

    /// Removes every subtask; each epic is left empty and back to NEW.
    pub fn delete_subtasks(&mut self) {
        let ids: Vec<TaskId> = self.subtasks.keys().copied().collect();
        for id in ids {
            self.forget(id);
        }
        self.subtasks.clear();
        let epic_ids: Vec<TaskId> = self.epics.keys().copied().collect();
        for epic_id in epic_ids {
            if let Some(epic) = self.epics.get_mut(&epic_id) {
                epic.clear_subtasks();
            }
            self.refresh_epic(epic_id);
        }
    }

    pub fn delete_epics(&mut self) {
        self.delete_subtasks();
        let ids: Vec<TaskId> = self.epics.keys().copied().collect();
        for id in ids {
            self.history.remove(id);
        }
        self.epics.clear();
    }

    // =========================================================================
    // Replay (used when loading persisted state)
    // =========================================================================

    /// Store a task under its existing id.
    pub fn restore_task(&mut self, task: &Task) -> Result<TaskId> {
        validate(task)?;
        let id = self.claim_id(task.id())?;
        self.reserve_slot(task)?;
        self.tasks.insert(id, task.copy());
        self.advance_next_id(id);
        Ok(id)
    }

    /// Store an epic under its existing id. Derived fields are recomputed.
    pub fn restore_epic(&mut self, epic: &Epic) -> Result<TaskId> {
        let id = self.claim_id(epic.id())?;
        self.epics
            .insert(id, Epic::from_parts(id, epic.name(), epic.description()));
        self.refresh_epic(id);
        self.advance_next_id(id);
        Ok(id)
    }

    /// Store a subtask under its existing id. The epic must be restored first.
    pub fn restore_subtask(&mut self, subtask: &Subtask, epic_id: TaskId) -> Result<TaskId> {
        validate(subtask)?;
        let id = self.claim_id(subtask.id())?;
        let owner = self.epics.get(&epic_id).ok_or(Error::EpicNotFound(epic_id))?;
        let mut stored = subtask.copy();
        stored.link_to(owner);
        let summary = self.preview_epic(epic_id, &stored)?;
        self.reserve_slot(&stored)?;
        self.attach_subtask(epic_id, stored, summary);
        self.advance_next_id(id);
        Ok(id)
    }

    /// Make sure future ids are issued past `seen`.
    pub fn advance_next_id(&mut self, seen: TaskId) {
        if seen >= self.next_id {
            self.next_id = seen + 1;
        }
    }

    // =========================================================================
    // Internals
    // =========================================================================

    /// Recompute an epic's derived fields from its current subtasks. Callers
    /// only shrink or keep a list that already summarized, so the total fits.
    fn refresh_epic(&mut self, epic_id: TaskId) {
        if let Some(epic) = self.epics.get_mut(&epic_id) {
            match aggregate::summarize(epic.subtasks()) {
                Ok(summary) => epic.apply_summary(summary),
                Err(err) => tracing::warn!(epic_id, error = %err, "epic summary kept"),
            }
        }
    }

    /// Summary the epic would carry with `subtask` added or replaced. Nothing
    /// is changed.
    fn preview_epic(&self, epic_id: TaskId, subtask: &Subtask) -> Result<EpicSummary> {
        let epic = self.epics.get(&epic_id).ok_or(Error::EpicNotFound(epic_id))?;
        let mut subtasks = epic.subtasks().to_vec();
        match subtasks
            .iter_mut()
            .find(|existing| existing.id() == subtask.id())
        {
            Some(existing) => *existing = subtask.copy(),
            None => subtasks.push(subtask.copy()),
        }
        aggregate::summarize(&subtasks)
    }

    fn attach_subtask(&mut self, epic_id: TaskId, subtask: Subtask, summary: EpicSummary) {
        if let Some(epic) = self.epics.get_mut(&epic_id) {
            epic.add_subtask(subtask.copy());
            epic.apply_summary(summary);
        }
        self.subtasks.insert(subtask.id(), subtask);
    }

    /// Place (or unplace) a task/subtask in the time index. Leaves the index
    /// untouched on conflict.
    fn reserve_slot<T: WorkItem>(&mut self, item: &T) -> Result<()> {
        match Slot::of(item) {
            Some(slot) => self
                .timeline
                .schedule(slot)
                .map_err(|conflict| conflict_error(item, conflict)),
            None => {
                self.timeline.remove(item.id());
                Ok(())
            }
        }
    }

    fn forget(&mut self, id: TaskId) {
        self.timeline.remove(id);
        self.history.remove(id);
    }

    fn claim_id(&self, id: TaskId) -> Result<TaskId> {
        if id == UNASSIGNED_ID {
            return Err(Error::InvalidArgument("id must be non-zero".to_string()));
        }
        if self.kind_of(id).is_some() {
            return Err(Error::DuplicateId(id));
        }
        Ok(id)
    }
}

fn validate<T: WorkItem>(item: &T) -> Result<()> {
    if item.duration() < Duration::zero() {
        return Err(Error::InvalidArgument(format!(
            "duration of '{}' must not be negative",
            item.name()
        )));
    }
    if Duration::try_minutes(item.duration().num_minutes()) != Some(item.duration()) {
        return Err(Error::InvalidArgument(format!(
            "duration of '{}' must be whole minutes",
            item.name()
        )));
    }
    if item.start_time().is_some_and(|start| start.nanosecond() != 0) {
        return Err(Error::InvalidArgument(format!(
            "start time of '{}' must be whole seconds",
            item.name()
        )));
    }
    if item.start_time().is_some() && item.end_time().is_none() {
        return Err(Error::InvalidArgument(format!(
            "schedule of '{}' is out of range",
            item.name()
        )));
    }
    Ok(())
}

fn not_found(kind: TaskKind, id: TaskId) -> Error {
    Error::NotFound { kind, id }
}

fn conflict_error<T: WorkItem>(item: &T, conflict: SlotConflict) -> Error {
    Error::ScheduleConflict {
        name: item.name().to_string(),
        conflicting_id: conflict.existing.id,
        start: conflict.candidate.start,
        end: conflict.candidate.end,
    }
}
