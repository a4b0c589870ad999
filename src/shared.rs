//! Thread-safe handle to a [`TaskManager`].
//!
//! One coarse lock guards the whole repository for the duration of each
//! call, so an operation (including epic recomputation) is observed by other
//! threads either entirely or not at all.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::manager::TaskManager;

#[derive(Debug, Clone, Default)]
pub struct SharedTaskManager {
    inner: Arc<Mutex<TaskManager>>,
}

impl SharedTaskManager {
    pub fn new(manager: TaskManager) -> Self {
        Self {
            inner: Arc::new(Mutex::new(manager)),
        }
    }

    /// Run `f` with exclusive access to the repository.
    pub fn with<R>(&self, f: impl FnOnce(&mut TaskManager) -> R) -> R {
        let mut guard = self.lock();
        f(&mut guard)
    }

    fn lock(&self) -> MutexGuard<'_, TaskManager> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Epic, Status, Subtask, WorkItem};
    use std::thread;

    #[test]
    fn concurrent_subtask_updates_keep_epic_consistent() {
        let shared = SharedTaskManager::default();
        let epic_id = shared.with(|manager| manager.add_epic(&Epic::new("E", "")).expect("epic"));

        let handles: Vec<_> = (0..8)
            .map(|n| {
                let shared = shared.clone();
                thread::spawn(move || {
                    shared.with(|manager| {
                        let epic = manager.get_epic(epic_id).expect("epic");
                        let id = manager
                            .add_subtask(&Subtask::new(format!("S{n}"), ""), &epic)
                            .expect("subtask");
                        let mut subtask = manager.get_subtask(id).expect("subtask");
                        subtask.set_status(Status::Done);
                        manager.update_subtask(&subtask).expect("update");
                    })
                })
            })
            .collect();
        for handle in handles {
            handle.join().expect("thread");
        }

        let epic = shared.with(|manager| manager.get_epic(epic_id).expect("epic"));
        assert_eq!(epic.subtasks().len(), 8);
        assert_eq!(epic.status(), Status::Done);
    }
}
