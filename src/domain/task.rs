//! Task domain model
//!
//! A task is a validated record with a status lifecycle: it is created
//! `Pending`, may move through `InProgress`, and ends in `Completed` or
//! `Cancelled`. Terminal states accept no further transitions. All
//! construction and mutation goes through validating methods so an invalid
//! task is never observable.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::id::TaskId;

/// Maximum title length, counted in characters after trimming
const MAX_TITLE_LEN: usize = 200;

#[derive(Debug, Error, PartialEq)]
pub enum TaskError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid transition: {0}")]
    InvalidTransition(String),
}

/// Status of a task
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    #[default]
    Pending,
    InProgress,
    Completed,
    Cancelled,
}

impl TaskStatus {
    /// Returns true if no further status transitions are allowed
    pub fn is_terminal(&self) -> bool {
        matches!(self, TaskStatus::Completed | TaskStatus::Cancelled)
    }

    /// Returns all status values, in lifecycle order
    pub fn all() -> &'static [TaskStatus] {
        &[
            TaskStatus::Pending,
            TaskStatus::InProgress,
            TaskStatus::Completed,
            TaskStatus::Cancelled,
        ]
    }
}

impl std::fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TaskStatus::Pending => write!(f, "pending"),
            TaskStatus::InProgress => write!(f, "in_progress"),
            TaskStatus::Completed => write!(f, "completed"),
            TaskStatus::Cancelled => write!(f, "cancelled"),
        }
    }
}

impl std::str::FromStr for TaskStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pending" => Ok(TaskStatus::Pending),
            "in_progress" | "in-progress" => Ok(TaskStatus::InProgress),
            "completed" => Ok(TaskStatus::Completed),
            "cancelled" => Ok(TaskStatus::Cancelled),
            _ => Err(format!("Unknown status: {}", s)),
        }
    }
}

/// Priority of a task
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum TaskPriority {
    Low,
    #[default]
    Medium,
    High,
    Critical,
}

impl TaskPriority {
    /// Returns the numeric rank (1 = low .. 4 = critical) shown in prompts
    pub fn rank(&self) -> u8 {
        match self {
            TaskPriority::Low => 1,
            TaskPriority::Medium => 2,
            TaskPriority::High => 3,
            TaskPriority::Critical => 4,
        }
    }

    /// Looks up a priority by its numeric rank
    pub fn from_rank(rank: u8) -> Option<TaskPriority> {
        match rank {
            1 => Some(TaskPriority::Low),
            2 => Some(TaskPriority::Medium),
            3 => Some(TaskPriority::High),
            4 => Some(TaskPriority::Critical),
            _ => None,
        }
    }

    /// Returns all priority values, lowest first
    pub fn all() -> &'static [TaskPriority] {
        &[
            TaskPriority::Low,
            TaskPriority::Medium,
            TaskPriority::High,
            TaskPriority::Critical,
        ]
    }
}

impl std::fmt::Display for TaskPriority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TaskPriority::Low => write!(f, "low"),
            TaskPriority::Medium => write!(f, "medium"),
            TaskPriority::High => write!(f, "high"),
            TaskPriority::Critical => write!(f, "critical"),
        }
    }
}

impl std::str::FromStr for TaskPriority {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "low" | "1" => Ok(TaskPriority::Low),
            "medium" | "2" => Ok(TaskPriority::Medium),
            "high" | "3" => Ok(TaskPriority::High),
            "critical" | "4" => Ok(TaskPriority::Critical),
            _ => Err(format!("Unknown priority: {}", s)),
        }
    }
}

/// A tracked task
///
/// Fields are private so every mutation passes through validation; read
/// access goes through the accessor methods or [`Task::snapshot`].
#[derive(Debug, Clone, PartialEq)]
pub struct Task {
    id: TaskId,
    title: String,
    description: String,
    status: TaskStatus,
    priority: TaskPriority,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    due_date: Option<DateTime<Utc>>,
}

/// Read-only projection of a task, including the computed overdue flag
#[derive(Debug, Clone, Serialize)]
pub struct TaskSnapshot {
    pub id: TaskId,
    pub title: String,
    pub description: String,
    pub status: TaskStatus,
    pub priority: TaskPriority,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub due_date: Option<DateTime<Utc>>,
    pub is_overdue: bool,
}

fn validate_title(title: &str) -> Result<(), TaskError> {
    let trimmed = title.trim();
    if trimmed.is_empty() {
        return Err(TaskError::Validation("Title cannot be empty".to_string()));
    }
    if trimmed.chars().count() > MAX_TITLE_LEN {
        return Err(TaskError::Validation(format!(
            "Title cannot exceed {} characters",
            MAX_TITLE_LEN
        )));
    }
    Ok(())
}

impl Task {
    /// Creates a new pending task, timestamped now
    pub fn new(
        id: TaskId,
        title: impl Into<String>,
        description: impl Into<String>,
        priority: TaskPriority,
        due_date: Option<DateTime<Utc>>,
    ) -> Result<Self, TaskError> {
        Self::with_created_at(id, title, description, priority, Utc::now(), due_date)
    }

    /// Creates a new pending task with an explicit creation instant
    ///
    /// The due date is validated against the supplied instant, so a task
    /// created in the past may carry a due date that has already elapsed.
    pub fn with_created_at(
        id: TaskId,
        title: impl Into<String>,
        description: impl Into<String>,
        priority: TaskPriority,
        created_at: DateTime<Utc>,
        due_date: Option<DateTime<Utc>>,
    ) -> Result<Self, TaskError> {
        let title = title.into();
        validate_title(&title)?;

        if let Some(due) = due_date {
            if due < created_at {
                return Err(TaskError::Validation(
                    "Due date cannot be before creation date".to_string(),
                ));
            }
        }

        Ok(Self {
            id,
            title,
            description: description.into(),
            status: TaskStatus::Pending,
            priority,
            created_at,
            updated_at: created_at,
            due_date,
        })
    }

    pub fn id(&self) -> TaskId {
        self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn status(&self) -> TaskStatus {
        self.status
    }

    pub fn priority(&self) -> TaskPriority {
        self.priority
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    pub fn due_date(&self) -> Option<DateTime<Utc>> {
        self.due_date
    }

    /// Transitions to in_progress
    ///
    /// Allowed from `Pending`, and redundantly from `InProgress`.
    pub fn mark_in_progress(&mut self) -> Result<(), TaskError> {
        match self.status {
            TaskStatus::Completed => Err(TaskError::InvalidTransition(
                "Cannot modify a completed task".to_string(),
            )),
            TaskStatus::Cancelled => Err(TaskError::InvalidTransition(
                "Cannot modify a cancelled task".to_string(),
            )),
            _ => {
                self.status = TaskStatus::InProgress;
                self.touch();
                Ok(())
            }
        }
    }

    /// Transitions to completed
    ///
    /// Allowed from `Pending` or `InProgress`, and redundantly from
    /// `Completed`.
    pub fn mark_completed(&mut self) -> Result<(), TaskError> {
        if self.status == TaskStatus::Cancelled {
            return Err(TaskError::InvalidTransition(
                "Cannot complete a cancelled task".to_string(),
            ));
        }
        self.status = TaskStatus::Completed;
        self.touch();
        Ok(())
    }

    /// Transitions to cancelled
    pub fn mark_cancelled(&mut self) -> Result<(), TaskError> {
        if self.status == TaskStatus::Completed {
            return Err(TaskError::InvalidTransition(
                "Cannot cancel a completed task".to_string(),
            ));
        }
        self.status = TaskStatus::Cancelled;
        self.touch();
        Ok(())
    }

    /// Replaces the title after re-validating it
    pub fn update_title(&mut self, new_title: impl Into<String>) -> Result<(), TaskError> {
        let new_title = new_title.into();
        validate_title(&new_title)?;
        self.title = new_title;
        self.touch();
        Ok(())
    }

    /// Replaces the description
    pub fn update_description(&mut self, new_description: impl Into<String>) {
        self.description = new_description.into();
        self.touch();
    }

    /// Replaces the priority
    pub fn set_priority(&mut self, priority: TaskPriority) {
        self.priority = priority;
        self.touch();
    }

    /// Returns true if the due date has passed and the task is still open
    ///
    /// Evaluated against the current time on every call; nothing is cached.
    pub fn is_overdue(&self) -> bool {
        match self.due_date {
            Some(due) => Utc::now() > due && !self.status.is_terminal(),
            None => false,
        }
    }

    /// Produces a read-only projection of the current state
    pub fn snapshot(&self) -> TaskSnapshot {
        TaskSnapshot {
            id: self.id,
            title: self.title.clone(),
            description: self.description.clone(),
            status: self.status,
            priority: self.priority,
            created_at: self.created_at,
            updated_at: self.updated_at,
            due_date: self.due_date,
            is_overdue: self.is_overdue(),
        }
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}
