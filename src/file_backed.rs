//! Repository persisted as a snapshot file.
//!
//! Every successful mutation rewrites the whole file. Loading tolerates bad
//! rows: they are reported through [`FileBackedTaskManager::load_errors`] and
//! the rest of the file is still applied.

use std::path::PathBuf;

use crate::codec::{self, Record};
use crate::error::{Error, Result};
use crate::history::HistoryTracker;
use crate::manager::TaskManager;
use crate::model::{Entity, Epic, Subtask, Task, TaskId, TaskKind};
use crate::storage::Storage;

#[derive(Debug)]
pub struct FileBackedTaskManager {
    manager: TaskManager,
    storage: Storage,
    load_errors: Vec<Error>,
}

impl FileBackedTaskManager {
    /// Empty repository that will save to `path`. Nothing is read.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self::with_storage(Storage::new(path), HistoryTracker::default())
    }

    pub fn with_storage(storage: Storage, history: HistoryTracker) -> Self {
        Self {
            manager: TaskManager::with_history(history),
            storage,
            load_errors: Vec::new(),
        }
    }

    /// Load `path` with the default history tracker.
    pub fn load(path: impl Into<PathBuf>) -> Result<Self> {
        Self::load_from(Storage::new(path), HistoryTracker::default())
    }

    /// Load the snapshot behind `storage`. A missing file yields an empty
    /// repository; a wrong header is fatal.
    pub fn load_from(storage: Storage, history: HistoryTracker) -> Result<Self> {
        let mut loaded = Self::with_storage(storage, history);
        let Some(content) = loaded.storage.read()? else {
            tracing::debug!(path = %loaded.storage.data_file().display(), "no data file, starting empty");
            return Ok(loaded);
        };

        let decoded = codec::decode(&content)?;
        loaded.load_errors = decoded.errors;

        let (subtasks, others): (Vec<_>, Vec<_>) = decoded
            .records
            .into_iter()
            .partition(|(_, record)| record.kind == TaskKind::Subtask);

        for (line, record) in others.iter().chain(subtasks.iter()) {
            loaded.manager.advance_next_id(record.id);
            if let Err(err) = loaded.restore(record) {
                loaded.load_errors.push(Error::MalformedRecord {
                    line: *line,
                    reason: err.to_string(),
                });
            }
        }

        if !loaded.load_errors.is_empty() {
            tracing::warn!(
                path = %loaded.storage.data_file().display(),
                errors = loaded.load_errors.len(),
                "skipped malformed rows"
            );
        }
        tracing::debug!(entities = loaded.manager.len(), next_id = loaded.manager.next_id(), "loaded");
        Ok(loaded)
    }

    fn restore(&mut self, record: &Record) -> Result<TaskId> {
        match record.kind {
            TaskKind::Task => self.manager.restore_task(&record.to_task()),
            TaskKind::Epic => self.manager.restore_epic(&record.to_epic()),
            TaskKind::Subtask => {
                let epic_id = record.epic_id.ok_or_else(|| {
                    Error::InvalidArgument("subtask without epic id".to_string())
                })?;
                self.manager.restore_subtask(&record.to_subtask(), epic_id)
            }
        }
    }

    /// Rows skipped by the last load, in file order for decode failures
    /// followed by rows rejected on restore.
    pub fn load_errors(&self) -> &[Error] {
        &self.load_errors
    }

    pub fn storage(&self) -> &Storage {
        &self.storage
    }

    /// Read access to the in-memory repository.
    pub fn manager(&self) -> &TaskManager {
        &self.manager
    }

    /// Write the full snapshot.
    pub fn save(&self) -> Result<()> {
        let snapshot = self.manager.snapshot();
        let encoded = codec::encode(&snapshot)?;
        self.storage.write_atomic(encoded.as_bytes())?;
        tracing::debug!(entities = snapshot.len(), "saved");
        Ok(())
    }

    pub fn add_task(&mut self, task: &Task) -> Result<TaskId> {
        let id = self.manager.add_task(task)?;
        self.save()?;
        Ok(id)
    }

    pub fn add_epic(&mut self, epic: &Epic) -> Result<TaskId> {
        let id = self.manager.add_epic(epic)?;
        self.save()?;
        Ok(id)
    }

    pub fn add_subtask(&mut self, subtask: &Subtask, epic: &Epic) -> Result<TaskId> {
        let id = self.manager.add_subtask(subtask, epic)?;
        self.save()?;
        Ok(id)
    }

    pub fn update_task(&mut self, task: &Task) -> Result<()> {
        self.manager.update_task(task)?;
        self.save()
    }

    pub fn update_epic(&mut self, epic: &Epic) -> Result<()> {
        self.manager.update_epic(epic)?;
        self.save()
    }

    pub fn update_subtask(&mut self, subtask: &Subtask) -> Result<()> {
        self.manager.update_subtask(subtask)?;
        self.save()
    }

    pub fn get_task(&mut self, id: TaskId) -> Option<Task> {
        self.manager.get_task(id)
    }

    pub fn get_epic(&mut self, id: TaskId) -> Option<Epic> {
        self.manager.get_epic(id)
    }

    pub fn get_subtask(&mut self, id: TaskId) -> Option<Subtask> {
        self.manager.get_subtask(id)
    }

    pub fn get_epic_by_subtask(&self, subtask: &Subtask) -> Option<Epic> {
        self.manager.get_epic_by_subtask(subtask)
    }

    pub fn get_subtasks_by_epic_id(&self, epic_id: TaskId) -> Vec<Subtask> {
        self.manager.get_subtasks_by_epic_id(epic_id)
    }

    pub fn get_prioritized_tasks(&self) -> Vec<Entity> {
        self.manager.get_prioritized_tasks()
    }

    pub fn get_history(&self) -> Vec<Entity> {
        self.manager.get_history()
    }

    pub fn delete_task(&mut self, id: TaskId) -> Result<Option<Task>> {
        let deleted = self.manager.delete_task(id);
        if deleted.is_some() {
            self.save()?;
        }
        Ok(deleted)
    }

    pub fn delete_epic(&mut self, id: TaskId) -> Result<Option<Epic>> {
        let deleted = self.manager.delete_epic(id);
        if deleted.is_some() {
            self.save()?;
        }
        Ok(deleted)
    }

    pub fn delete_subtask(&mut self, id: TaskId) -> Result<Option<Subtask>> {
        let deleted = self.manager.delete_subtask(id);
        if deleted.is_some() {
            self.save()?;
        }
        Ok(deleted)
    }

    pub fn delete_tasks(&mut self) -> Result<()> {
        self.manager.delete_tasks();
        self.save()
    }

    pub fn delete_subtasks(&mut self) -> Result<()> {
        self.manager.delete_subtasks();
        self.save()
    }

    pub fn delete_epics(&mut self) -> Result<()> {
        self.manager.delete_epics();
        self.save()
    }
}
