//! In-memory task repository
//!
//! The repository owns every [`Task`] and is the only place ids are issued.
//! Tasks are kept in a `BTreeMap` keyed by id; ids are assigned from a
//! monotonically increasing counter, so id-ordered iteration equals the
//! insertion order of the tasks still present.
//!
//! The repository is a plain single-threaded structure. It takes `&mut self`
//! for every mutation and adds no internal locking; wrap it in a mutex if it
//! ever needs to cross a thread boundary.

use std::collections::btree_map::Entry;
use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::domain::{Task, TaskError, TaskId, TaskPriority, TaskStatus};

use super::stats::Statistics;

/// First id issued by a fresh (or cleared) repository
const INITIAL_ID: u64 = 1;

#[derive(Debug, Error, PartialEq)]
pub enum RepositoryError {
    #[error("Task not found: {0}")]
    NotFound(TaskId),

    #[error("Task already exists: {0}")]
    Duplicate(TaskId),

    #[error(transparent)]
    Task(#[from] TaskError),
}

/// Collection of tasks keyed by id, with auto-assigned identifiers
#[derive(Debug, Default)]
pub struct TaskRepository {
    tasks: BTreeMap<TaskId, Task>,
    next_id: u64,
}

impl TaskRepository {
    /// Creates an empty repository
    pub fn new() -> Self {
        Self {
            tasks: BTreeMap::new(),
            next_id: INITIAL_ID,
        }
    }

    /// Creates and stores a task under the next free id
    ///
    /// A validation failure propagates without storing anything and without
    /// consuming the id, so issued ids stay gap-free.
    pub fn add_task(
        &mut self,
        title: &str,
        description: &str,
        priority: TaskPriority,
        due_date: Option<DateTime<Utc>>,
    ) -> Result<&Task, RepositoryError> {
        let id = TaskId::new(self.next_id);
        let task = Task::new(id, title, description, priority, due_date)?;

        self.next_id += 1;
        Ok(self.tasks.entry(id).or_insert(task))
    }

    /// Stores an externally constructed task under its own id
    ///
    /// Rejects ids already present. The id counter is bumped past the
    /// inserted id so auto-assigned ids never collide with it.
    pub fn insert(&mut self, task: Task) -> Result<&Task, RepositoryError> {
        match self.tasks.entry(task.id()) {
            Entry::Occupied(entry) => Err(RepositoryError::Duplicate(*entry.key())),
            Entry::Vacant(slot) => {
                self.next_id = self.next_id.max(task.id().value() + 1);
                Ok(slot.insert(task))
            }
        }
    }

    /// Looks up a task by id
    pub fn get_task(&self, id: TaskId) -> Result<&Task, RepositoryError> {
        self.tasks.get(&id).ok_or(RepositoryError::NotFound(id))
    }

    /// Returns all tasks in insertion order
    pub fn all_tasks(&self) -> Vec<&Task> {
        self.tasks.values().collect()
    }

    /// Returns tasks with the given status, preserving overall order
    pub fn tasks_by_status(&self, status: TaskStatus) -> Vec<&Task> {
        self.tasks.values().filter(|t| t.status() == status).collect()
    }

    /// Returns tasks with the given priority, preserving overall order
    pub fn tasks_by_priority(&self, priority: TaskPriority) -> Vec<&Task> {
        self.tasks
            .values()
            .filter(|t| t.priority() == priority)
            .collect()
    }

    /// Returns tasks whose due date has passed, evaluated at call time
    pub fn overdue_tasks(&self) -> Vec<&Task> {
        self.tasks.values().filter(|t| t.is_overdue()).collect()
    }

    /// Applies the provided field updates to a task
    ///
    /// `None` means "leave unchanged". Fields are applied in order through
    /// the entity mutators; a validation failure stops the remaining updates
    /// but keeps the ones already applied.
    pub fn update_task(
        &mut self,
        id: TaskId,
        title: Option<&str>,
        description: Option<&str>,
        priority: Option<TaskPriority>,
    ) -> Result<&Task, RepositoryError> {
        let task = self.tasks.get_mut(&id).ok_or(RepositoryError::NotFound(id))?;

        if let Some(title) = title {
            task.update_title(title)?;
        }
        if let Some(description) = description {
            task.update_description(description);
        }
        if let Some(priority) = priority {
            task.set_priority(priority);
        }

        Ok(task)
    }

    /// Removes a task
    pub fn delete_task(&mut self, id: TaskId) -> Result<(), RepositoryError> {
        self.tasks
            .remove(&id)
            .map(|_| ())
            .ok_or(RepositoryError::NotFound(id))
    }

    /// Marks a task as in progress
    pub fn mark_in_progress(&mut self, id: TaskId) -> Result<&Task, RepositoryError> {
        let task = self.tasks.get_mut(&id).ok_or(RepositoryError::NotFound(id))?;
        task.mark_in_progress()?;
        Ok(task)
    }

    /// Marks a task as completed
    pub fn mark_completed(&mut self, id: TaskId) -> Result<&Task, RepositoryError> {
        let task = self.tasks.get_mut(&id).ok_or(RepositoryError::NotFound(id))?;
        task.mark_completed()?;
        Ok(task)
    }

    /// Marks a task as cancelled
    pub fn mark_cancelled(&mut self, id: TaskId) -> Result<&Task, RepositoryError> {
        let task = self.tasks.get_mut(&id).ok_or(RepositoryError::NotFound(id))?;
        task.mark_cancelled()?;
        Ok(task)
    }

    /// Returns the number of stored tasks
    pub fn task_count(&self) -> usize {
        self.tasks.len()
    }

    /// Aggregates counts over the current tasks
    pub fn statistics(&self) -> Statistics {
        let total = self.tasks.len();
        let completed = self.tasks_by_status(TaskStatus::Completed).len();
        let in_progress = self.tasks_by_status(TaskStatus::InProgress).len();
        let pending = self.tasks_by_status(TaskStatus::Pending).len();
        let cancelled = self.tasks_by_status(TaskStatus::Cancelled).len();
        let overdue = self.overdue_tasks().len();

        Statistics {
            total,
            pending,
            in_progress,
            completed,
            cancelled,
            overdue,
            completion_rate: if total > 0 {
                completed as f64 / total as f64 * 100.0
            } else {
                0.0
            },
        }
    }

    /// Removes every task and resets the id counter
    ///
    /// Ids issued before the clear become available again.
    pub fn clear(&mut self) {
        self.tasks.clear();
        self.next_id = INITIAL_ID;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    /// Adds a backdated task whose due date has already elapsed
    fn insert_overdue(repo: &mut TaskRepository, id: u64) {
        let created = Utc::now() - Duration::days(10);
        let due = Utc::now() - Duration::days(1);
        let task = Task::with_created_at(
            TaskId::new(id),
            "Overdue",
            "",
            TaskPriority::default(),
            created,
            Some(due),
        )
        .unwrap();
        repo.insert(task).unwrap();
    }

    #[test]
    fn new_repository_is_empty() {
        let repo = TaskRepository::new();
        assert_eq!(repo.task_count(), 0);
        assert!(repo.all_tasks().is_empty());
    }

    #[test]
    fn add_task_assigns_sequential_ids() {
        let mut repo = TaskRepository::new();

        let first = repo.add_task("Task 1", "", TaskPriority::default(), None).unwrap().id();
        let second = repo.add_task("Task 2", "", TaskPriority::default(), None).unwrap().id();
        let third = repo.add_task("Task 3", "", TaskPriority::default(), None).unwrap().id();

        assert_eq!(first, TaskId::new(1));
        assert_eq!(second, TaskId::new(2));
        assert_eq!(third, TaskId::new(3));
        assert_eq!(repo.task_count(), 3);
    }

    #[test]
    fn add_task_stores_provided_fields() {
        let mut repo = TaskRepository::new();
        let due = Utc::now() + Duration::days(7);

        let task = repo
            .add_task("Write report", "Quarterly numbers", TaskPriority::High, Some(due))
            .unwrap();

        assert_eq!(task.title(), "Write report");
        assert_eq!(task.description(), "Quarterly numbers");
        assert_eq!(task.priority(), TaskPriority::High);
        assert_eq!(task.due_date(), Some(due));
    }

    #[test]
    fn failed_add_does_not_store_or_consume_an_id() {
        let mut repo = TaskRepository::new();

        assert!(repo.add_task("", "", TaskPriority::default(), None).is_err());
        assert_eq!(repo.task_count(), 0);

        let task = repo.add_task("Valid", "", TaskPriority::default(), None).unwrap();
        assert_eq!(task.id(), TaskId::new(1));
    }

    #[test]
    fn get_task_returns_stored_task() {
        let mut repo = TaskRepository::new();
        repo.add_task("Task", "", TaskPriority::default(), None).unwrap();

        let task = repo.get_task(TaskId::new(1)).unwrap();
        assert_eq!(task.title(), "Task");
    }

    #[test]
    fn get_missing_task_fails_with_not_found() {
        let mut repo = TaskRepository::new();
        for i in 1..=3 {
            repo.add_task(&format!("Task {}", i), "", TaskPriority::default(), None)
                .unwrap();
        }

        let err = repo.get_task(TaskId::new(999)).unwrap_err();
        assert_eq!(err, RepositoryError::NotFound(TaskId::new(999)));
    }

    #[test]
    fn all_tasks_preserves_insertion_order() {
        let mut repo = TaskRepository::new();
        repo.add_task("First", "", TaskPriority::default(), None).unwrap();
        repo.add_task("Second", "", TaskPriority::default(), None).unwrap();
        repo.add_task("Third", "", TaskPriority::default(), None).unwrap();

        let titles: Vec<_> = repo.all_tasks().iter().map(|t| t.title().to_string()).collect();
        assert_eq!(titles, vec!["First", "Second", "Third"]);
    }

    #[test]
    fn order_is_stable_across_deletions() {
        let mut repo = TaskRepository::new();
        repo.add_task("First", "", TaskPriority::default(), None).unwrap();
        repo.add_task("Second", "", TaskPriority::default(), None).unwrap();
        repo.add_task("Third", "", TaskPriority::default(), None).unwrap();

        repo.delete_task(TaskId::new(2)).unwrap();

        let titles: Vec<_> = repo.all_tasks().iter().map(|t| t.title().to_string()).collect();
        assert_eq!(titles, vec!["First", "Third"]);
    }

    #[test]
    fn filters_by_status() {
        let mut repo = TaskRepository::new();
        repo.add_task("Pending", "", TaskPriority::default(), None).unwrap();
        repo.add_task("Started", "", TaskPriority::default(), None).unwrap();
        repo.add_task("Done", "", TaskPriority::default(), None).unwrap();

        repo.mark_in_progress(TaskId::new(2)).unwrap();
        repo.mark_completed(TaskId::new(3)).unwrap();

        assert_eq!(repo.tasks_by_status(TaskStatus::Pending).len(), 1);
        assert_eq!(repo.tasks_by_status(TaskStatus::InProgress).len(), 1);
        assert_eq!(repo.tasks_by_status(TaskStatus::Completed).len(), 1);
        assert!(repo.tasks_by_status(TaskStatus::Cancelled).is_empty());
    }

    #[test]
    fn filters_by_priority() {
        let mut repo = TaskRepository::new();
        repo.add_task("Low", "", TaskPriority::Low, None).unwrap();
        repo.add_task("High 1", "", TaskPriority::High, None).unwrap();
        repo.add_task("High 2", "", TaskPriority::High, None).unwrap();

        let high = repo.tasks_by_priority(TaskPriority::High);
        assert_eq!(high.len(), 2);
        assert_eq!(high[0].title(), "High 1");
        assert_eq!(high[1].title(), "High 2");
    }

    #[test]
    fn overdue_tasks_reports_only_elapsed_open_tasks() {
        let mut repo = TaskRepository::new();
        insert_overdue(&mut repo, 1);
        let future = Utc::now() + Duration::days(7);
        repo.add_task("Future", "", TaskPriority::default(), Some(future)).unwrap();
        repo.add_task("No date", "", TaskPriority::default(), None).unwrap();

        let overdue = repo.overdue_tasks();
        assert_eq!(overdue.len(), 1);
        assert_eq!(overdue[0].id(), TaskId::new(1));
    }

    #[test]
    fn completed_tasks_drop_out_of_overdue() {
        let mut repo = TaskRepository::new();
        insert_overdue(&mut repo, 1);
        assert_eq!(repo.overdue_tasks().len(), 1);

        repo.mark_completed(TaskId::new(1)).unwrap();
        assert!(repo.overdue_tasks().is_empty());
    }

    #[test]
    fn update_task_applies_provided_fields() {
        let mut repo = TaskRepository::new();
        repo.add_task("Old title", "old", TaskPriority::Low, None).unwrap();

        let task = repo
            .update_task(TaskId::new(1), Some("New title"), None, Some(TaskPriority::Critical))
            .unwrap();

        assert_eq!(task.title(), "New title");
        assert_eq!(task.description(), "old");
        assert_eq!(task.priority(), TaskPriority::Critical);
    }

    #[test]
    fn update_task_with_only_title_leaves_other_fields() {
        let mut repo = TaskRepository::new();
        repo.add_task("Old", "details", TaskPriority::High, None).unwrap();

        repo.update_task(TaskId::new(1), Some("X"), None, None).unwrap();

        let task = repo.get_task(TaskId::new(1)).unwrap();
        assert_eq!(task.title(), "X");
        assert_eq!(task.description(), "details");
        assert_eq!(task.priority(), TaskPriority::High);
    }

    #[test]
    fn update_task_stops_at_first_failure() {
        let mut repo = TaskRepository::new();
        repo.add_task("Title", "", TaskPriority::Low, None).unwrap();

        let err = repo
            .update_task(TaskId::new(1), Some(""), None, Some(TaskPriority::Critical))
            .unwrap_err();
        assert!(matches!(err, RepositoryError::Task(TaskError::Validation(_))));

        // the priority after the failing title was never applied
        let task = repo.get_task(TaskId::new(1)).unwrap();
        assert_eq!(task.title(), "Title");
        assert_eq!(task.priority(), TaskPriority::Low);
    }

    #[test]
    fn update_missing_task_fails_with_not_found() {
        let mut repo = TaskRepository::new();
        let err = repo.update_task(TaskId::new(1), Some("X"), None, None).unwrap_err();
        assert_eq!(err, RepositoryError::NotFound(TaskId::new(1)));
    }

    #[test]
    fn delete_task_removes_it() {
        let mut repo = TaskRepository::new();
        repo.add_task("Task", "", TaskPriority::default(), None).unwrap();

        repo.delete_task(TaskId::new(1)).unwrap();

        assert_eq!(repo.task_count(), 0);
        assert!(repo.get_task(TaskId::new(1)).is_err());
    }

    #[test]
    fn delete_missing_task_fails_with_not_found() {
        let mut repo = TaskRepository::new();
        let err = repo.delete_task(TaskId::new(1)).unwrap_err();
        assert_eq!(err, RepositoryError::NotFound(TaskId::new(1)));
    }

    #[test]
    fn mark_operations_transition_the_stored_task() {
        let mut repo = TaskRepository::new();
        repo.add_task("Task", "", TaskPriority::default(), None).unwrap();

        assert_eq!(
            repo.mark_in_progress(TaskId::new(1)).unwrap().status(),
            TaskStatus::InProgress
        );
        assert_eq!(
            repo.mark_completed(TaskId::new(1)).unwrap().status(),
            TaskStatus::Completed
        );
    }

    #[test]
    fn mark_cancelled_on_completed_task_propagates_transition_error() {
        let mut repo = TaskRepository::new();
        repo.add_task("Task", "", TaskPriority::default(), None).unwrap();
        repo.mark_completed(TaskId::new(1)).unwrap();

        let err = repo.mark_cancelled(TaskId::new(1)).unwrap_err();
        assert!(matches!(err, RepositoryError::Task(TaskError::InvalidTransition(_))));
    }

    #[test]
    fn mark_on_missing_task_fails_with_not_found() {
        let mut repo = TaskRepository::new();
        assert!(matches!(
            repo.mark_in_progress(TaskId::new(9)).unwrap_err(),
            RepositoryError::NotFound(_)
        ));
    }

    #[test]
    fn statistics_on_empty_repository_are_all_zero() {
        let repo = TaskRepository::new();
        let stats = repo.statistics();

        assert_eq!(stats.total, 0);
        assert_eq!(stats.pending, 0);
        assert_eq!(stats.in_progress, 0);
        assert_eq!(stats.completed, 0);
        assert_eq!(stats.cancelled, 0);
        assert_eq!(stats.overdue, 0);
        assert_eq!(stats.completion_rate, 0.0);
    }

    #[test]
    fn statistics_counts_by_status() {
        let mut repo = TaskRepository::new();
        for i in 1..=4 {
            repo.add_task(&format!("Task {}", i), "", TaskPriority::default(), None)
                .unwrap();
        }
        repo.mark_completed(TaskId::new(1)).unwrap();
        repo.mark_completed(TaskId::new(2)).unwrap();
        repo.mark_in_progress(TaskId::new(3)).unwrap();

        let stats = repo.statistics();
        assert_eq!(stats.total, 4);
        assert_eq!(stats.completed, 2);
        assert_eq!(stats.in_progress, 1);
        assert_eq!(stats.pending, 1);
        assert_eq!(stats.cancelled, 0);
        assert_eq!(stats.completion_rate, 50.0);
    }

    #[test]
    fn statistics_include_overdue_count() {
        let mut repo = TaskRepository::new();
        insert_overdue(&mut repo, 1);

        assert_eq!(repo.statistics().overdue, 1);
    }

    #[test]
    fn clear_removes_tasks_and_resets_ids() {
        let mut repo = TaskRepository::new();
        repo.add_task("Task 1", "", TaskPriority::default(), None).unwrap();
        repo.add_task("Task 2", "", TaskPriority::default(), None).unwrap();

        repo.clear();
        assert_eq!(repo.task_count(), 0);

        let task = repo.add_task("New", "", TaskPriority::default(), None).unwrap();
        assert_eq!(task.id(), TaskId::new(1));
    }

    #[test]
    fn insert_rejects_duplicate_id() {
        let mut repo = TaskRepository::new();
        repo.add_task("Original", "", TaskPriority::default(), None).unwrap();

        let dup = Task::new(TaskId::new(1), "Impostor", "", TaskPriority::default(), None).unwrap();
        let err = repo.insert(dup).unwrap_err();
        assert_eq!(err, RepositoryError::Duplicate(TaskId::new(1)));

        // the stored task is untouched
        assert_eq!(repo.get_task(TaskId::new(1)).unwrap().title(), "Original");
    }

    #[test]
    fn insert_bumps_the_id_counter_past_the_inserted_id() {
        let mut repo = TaskRepository::new();
        let task = Task::new(TaskId::new(10), "Inserted", "", TaskPriority::default(), None).unwrap();
        repo.insert(task).unwrap();

        let next = repo.add_task("Auto", "", TaskPriority::default(), None).unwrap();
        assert_eq!(next.id(), TaskId::new(11));
    }
}
