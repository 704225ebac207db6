//! Task Tracker - an interactive in-memory task tracker
//!
//! Tasks are validated records with a status lifecycle (pending,
//! in progress, completed, cancelled), a priority, and an optional due
//! date. A repository owns the tasks, assigns their ids, and answers
//! queries and aggregate statistics. State is held in memory only.

pub mod domain;
pub mod repository;
pub mod cli;

pub use domain::{Task, TaskId, TaskPriority, TaskSnapshot, TaskStatus};
pub use repository::{Statistics, TaskRepository};
