//! The in-memory task collection.
//!
//! `TaskStore` owns every `Task`. Mutations write the complete collection back
//! to the persistence collaborator before returning.

use crate::config::TASKS_KEY;
use crate::error::AppError;
use crate::models::{Filter, Task, TaskStatus};
use crate::storage::Storage;
use log::debug;
use std::sync::Arc;

/// Where the store mirrors its full snapshot.
pub trait Persistence: Send + Sync {
    fn load(&self) -> Result<Vec<Task>, AppError>;
    fn save(&self, tasks: &[Task]) -> Result<(), AppError>;
}

/// Serializes the collection as one JSON array under a fixed storage key.
#[derive(Clone)]
pub struct StoragePersistence {
    storage: Arc<dyn Storage>,
    key: String,
}

impl StoragePersistence {
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self {
            storage,
            key: TASKS_KEY.to_string(),
        }
    }
}

impl Persistence for StoragePersistence {
    fn load(&self) -> Result<Vec<Task>, AppError> {
        match self.storage.get(&self.key)? {
            Some(raw) if !raw.trim().is_empty() => Ok(serde_json::from_str(&raw)?),
            _ => Ok(Vec::new()),
        }
    }

    fn save(&self, tasks: &[Task]) -> Result<(), AppError> {
        self.storage.set(&self.key, &serde_json::to_string(tasks)?)
    }
}

/// Keeps nothing. Used when the server holds the tasks.
#[derive(Debug, Clone, Copy, Default)]
pub struct Ephemeral;

impl Persistence for Ephemeral {
    fn load(&self) -> Result<Vec<Task>, AppError> {
        Ok(Vec::new())
    }

    fn save(&self, _tasks: &[Task]) -> Result<(), AppError> {
        Ok(())
    }
}

pub struct TaskStore {
    tasks: Vec<Task>,
    persistence: Box<dyn Persistence>,
}

impl TaskStore {
    /// Creates a store holding whatever `persistence` already has.
    pub fn open(persistence: impl Persistence + 'static) -> Result<Self, AppError> {
        let tasks = persistence.load()?;
        debug!("Task store opened with {} tasks", tasks.len());
        Ok(Self {
            tasks,
            persistence: Box::new(persistence),
        })
    }

    pub fn in_memory() -> Self {
        Self {
            tasks: Vec::new(),
            persistence: Box::new(Ephemeral),
        }
    }

    /// Saves `next` and only then makes it the current collection, so a
    /// failed write leaves the store as it was.
    fn commit(&mut self, next: Vec<Task>) -> Result<(), AppError> {
        self.persistence.save(&next)?;
        self.tasks = next;
        Ok(())
    }

    pub fn add(&mut self, task: Task) -> Result<(), AppError> {
        let mut next = self.tasks.clone();
        next.push(task);
        self.commit(next)
    }

    /// Removes and returns the task. Unknown ids leave the store untouched.
    pub fn remove(&mut self, id: &str) -> Result<Option<Task>, AppError> {
        let Some(index) = self.position(id) else {
            return Ok(None);
        };
        let mut next = self.tasks.clone();
        let task = next.remove(index);
        self.commit(next)?;
        Ok(Some(task))
    }

    pub fn set_status(&mut self, id: &str, status: TaskStatus) -> Result<bool, AppError> {
        let Some(index) = self.position(id) else {
            return Ok(false);
        };
        let mut next = self.tasks.clone();
        next[index].status = status;
        self.commit(next)?;
        Ok(true)
    }

    pub fn rename(&mut self, id: &str, title: &str) -> Result<bool, AppError> {
        let Some(index) = self.position(id) else {
            return Ok(false);
        };
        let mut next = self.tasks.clone();
        next[index].title = title.to_string();
        self.commit(next)?;
        Ok(true)
    }

    /// Replaces the whole collection, e.g. after fetching from the server.
    pub fn replace_all(&mut self, tasks: Vec<Task>) -> Result<(), AppError> {
        self.commit(tasks)
    }

    pub fn filter(&self, filter: Filter) -> Vec<&Task> {
        self.tasks.iter().filter(|task| filter.matches(task)).collect()
    }

    pub fn get(&self, id: &str) -> Option<&Task> {
        self.tasks.iter().find(|task| task.id == id)
    }

    pub fn count(&self, status: TaskStatus) -> usize {
        self.tasks.iter().filter(|task| task.status == status).count()
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Task> {
        self.tasks.iter()
    }

    fn position(&self, id: &str) -> Option<usize> {
        self.tasks.iter().position(|task| task.id == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStorage;
    use pretty_assertions::assert_eq;
    use std::sync::atomic::{AtomicBool, Ordering};

    /// Persistence whose writes fail once `broken` is set.
    #[derive(Clone, Default)]
    struct BrokenDisk {
        broken: Arc<AtomicBool>,
    }

    impl Persistence for BrokenDisk {
        fn load(&self) -> Result<Vec<Task>, AppError> {
            Ok(Vec::new())
        }

        fn save(&self, _tasks: &[Task]) -> Result<(), AppError> {
            if self.broken.load(Ordering::SeqCst) {
                return Err(AppError::Storage("disk full".into()));
            }
            Ok(())
        }
    }

    fn titles(tasks: &[&Task]) -> Vec<String> {
        tasks.iter().map(|t| t.title.clone()).collect()
    }

    #[test]
    fn test_add_and_filter() {
        let mut store = TaskStore::in_memory();
        store.add(Task::new("X")).unwrap();

        let all = store.filter(Filter::All);
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].title, "X");
        assert_eq!(all[0].status, TaskStatus::Todo);
    }

    #[test]
    fn test_status_filter_is_exact() {
        let mut store = TaskStore::in_memory();
        let milk = Task::new("Buy milk");
        let id = milk.id.clone();
        store.add(milk).unwrap();
        store.add(Task::new("Walk dog")).unwrap();

        assert!(store.set_status(&id, TaskStatus::Done).unwrap());

        assert_eq!(titles(&store.filter(Filter::Status(TaskStatus::Done))), vec!["Buy milk"]);
        assert_eq!(titles(&store.filter(Filter::Status(TaskStatus::Todo))), vec!["Walk dog"]);
        assert_eq!(store.count(TaskStatus::Done), 1);
    }

    #[test]
    fn test_duplicate_titles_keep_order() {
        let mut store = TaskStore::in_memory();
        for title in ["a", "b", "a"] {
            store.add(Task::new(title)).unwrap();
        }
        assert_eq!(titles(&store.filter(Filter::All)), vec!["a", "b", "a"]);
    }

    #[test]
    fn test_unknown_id_is_a_noop() {
        let mut store = TaskStore::in_memory();
        store.add(Task::new("keep")).unwrap();

        assert_eq!(store.remove("missing").unwrap(), None);
        assert!(!store.rename("missing", "x").unwrap());
        assert!(!store.set_status("missing", TaskStatus::Done).unwrap());
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_rename_keeps_identity() {
        let mut store = TaskStore::in_memory();
        let task = Task::new("Draft");
        let id = task.id.clone();
        store.add(task).unwrap();

        assert!(store.rename(&id, "Final").unwrap());
        assert_eq!(store.get(&id).map(|t| t.title.as_str()), Some("Final"));
    }

    #[test]
    fn test_every_mutation_writes_a_snapshot() {
        let storage = MemoryStorage::new();
        let mut store = TaskStore::open(StoragePersistence::new(Arc::new(storage.clone()))).unwrap();

        let task = Task::new("persist me");
        let id = task.id.clone();
        store.add(task).unwrap();
        store.set_status(&id, TaskStatus::Done).unwrap();

        let reopened = TaskStore::open(StoragePersistence::new(Arc::new(storage.clone()))).unwrap();
        assert_eq!(reopened.len(), 1);
        assert_eq!(reopened.get(&id).map(|t| t.status), Some(TaskStatus::Done));

        store.remove(&id).unwrap();
        assert_eq!(storage.get(TASKS_KEY).unwrap().as_deref(), Some("[]"));
    }

    #[test]
    fn test_corrupt_snapshot_is_an_error() {
        let storage = MemoryStorage::new();
        storage.set(TASKS_KEY, "{not json").unwrap();

        let result = TaskStore::open(StoragePersistence::new(Arc::new(storage)));
        assert!(matches!(result, Err(AppError::Storage(_))));
    }

    #[test]
    fn test_failed_write_leaves_store_unchanged() {
        let disk = BrokenDisk::default();
        let mut store = TaskStore::open(disk.clone()).unwrap();
        let keep = Task::new("keep");
        let id = keep.id.clone();
        store.add(keep).unwrap();
        disk.broken.store(true, Ordering::SeqCst);

        assert!(matches!(store.add(Task::new("ghost")), Err(AppError::Storage(_))));
        assert!(store.set_status(&id, TaskStatus::Done).is_err());
        assert!(store.rename(&id, "renamed").is_err());
        assert!(store.remove(&id).is_err());
        assert!(store.replace_all(Vec::new()).is_err());

        assert_eq!(store.len(), 1);
        let task = store.get(&id).unwrap();
        assert_eq!(task.title, "keep");
        assert_eq!(task.status, TaskStatus::Todo);
    }
}
