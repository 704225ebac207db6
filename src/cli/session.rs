//! Interactive menu session
//!
//! One session holds one [`TaskRepository`] for the life of the process;
//! nothing survives exit. The loop prints a numbered menu, reads a choice,
//! and dispatches to a handler that prompts for whatever the operation
//! needs. Domain and repository errors are reported and the menu comes
//! back; only I/O failures abort the session. EOF on stdin ends it cleanly.

use std::io::{self, BufRead, Write};

use anyhow::Result;
use chrono::{Duration, Utc};

use super::output::Output;
use super::toggle::{FeatureToggle, EXTENDED_STATS_FLAG};
use crate::domain::{Task, TaskId, TaskPriority, TaskSnapshot, TaskStatus};
use crate::repository::{RepositoryError, TaskRepository};

/// Seeds the sample tasks offered by `--demo`
pub fn seed_demo(repo: &mut TaskRepository) -> Result<(), RepositoryError> {
    repo.add_task(
        "Finish the project report",
        "Wrap up the quarterly write-up",
        TaskPriority::High,
        Some(Utc::now() + Duration::days(3)),
    )?;
    repo.add_task(
        "Study for the exam",
        "Review chapters 1-5",
        TaskPriority::Critical,
        Some(Utc::now() + Duration::days(1)),
    )?;
    repo.add_task("Exercise", "30 minutes of cardio", TaskPriority::Medium, None)?;
    let done = repo
        .add_task("Buy groceries", "Milk, bread, eggs, fruit", TaskPriority::Low, None)?
        .id();
    repo.mark_completed(done)?;
    Ok(())
}

enum Transition {
    Start,
    Complete,
    Cancel,
}

/// Interactive session over one in-memory repository
pub struct Session<'a, R: BufRead> {
    repo: TaskRepository,
    input: R,
    output: &'a Output,
    toggle: &'a dyn FeatureToggle,
}

impl<'a, R: BufRead> Session<'a, R> {
    pub fn new(
        repo: TaskRepository,
        input: R,
        output: &'a Output,
        toggle: &'a dyn FeatureToggle,
    ) -> Self {
        Self {
            repo,
            input,
            output,
            toggle,
        }
    }

    /// Returns the repository backing this session
    pub fn repository(&self) -> &TaskRepository {
        &self.repo
    }

    /// Consumes the session and hands back the repository
    pub fn into_repository(self) -> TaskRepository {
        self.repo
    }

    /// Runs the menu loop until quit or EOF
    pub fn run(&mut self) -> Result<()> {
        if self.output.is_text() {
            println!("{}", "=".repeat(50));
            println!("{:^50}", "TASK TRACKER");
            println!("{}", "=".repeat(50));
        }

        loop {
            self.print_menu();
            let Some(choice) = self.prompt("Select an option (0-11): ")? else {
                break;
            };

            match choice.as_str() {
                "0" => {
                    if self.output.is_text() {
                        println!("Goodbye!");
                    }
                    break;
                }
                "1" => self.add_task()?,
                "2" => self.list_all(),
                "3" => self.list_by_status()?,
                "4" => self.list_by_priority()?,
                "5" => self.transition(Transition::Start)?,
                "6" => self.transition(Transition::Complete)?,
                "7" => self.transition(Transition::Cancel)?,
                "8" => self.update_task()?,
                "9" => self.delete_task()?,
                "10" => self.show_statistics()?,
                "11" => self.show_overdue(),
                _ => self.output.error("Invalid option. Please select 0-11."),
            }
        }

        Ok(())
    }

    fn print_menu(&self) {
        if self.output.is_json() {
            return;
        }
        println!();
        println!("{}", "=".repeat(50));
        println!("TASK TRACKER - MAIN MENU");
        println!("{}", "=".repeat(50));
        println!(" 1. Add a new task");
        println!(" 2. List all tasks");
        println!(" 3. List tasks by status");
        println!(" 4. List tasks by priority");
        println!(" 5. Mark a task as in progress");
        println!(" 6. Mark a task as completed");
        println!(" 7. Mark a task as cancelled");
        println!(" 8. Update a task");
        println!(" 9. Delete a task");
        println!("10. Show statistics");
        println!("11. List overdue tasks");
        println!(" 0. Quit");
        println!();
    }

    /// Prints a prompt label and reads one trimmed line; None on EOF
    fn prompt(&mut self, label: &str) -> Result<Option<String>> {
        if self.output.is_text() {
            print!("{}", label);
            io::stdout().flush()?;
        }
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim().to_string()))
    }

    /// Prompts for a task id; reports a parse failure and returns None
    fn prompt_task_id(&mut self) -> Result<Option<TaskId>> {
        let Some(input) = self.prompt("Task ID: ")? else {
            return Ok(None);
        };
        match input.parse::<TaskId>() {
            Ok(id) => Ok(Some(id)),
            Err(e) => {
                self.output.error(&e.to_string());
                Ok(None)
            }
        }
    }

    fn add_task(&mut self) -> Result<()> {
        let Some(title) = self.prompt("Title (required): ")? else {
            return Ok(());
        };
        if title.is_empty() {
            self.output.error("Title cannot be empty");
            return Ok(());
        }

        let Some(description) = self.prompt("Description (optional): ")? else {
            return Ok(());
        };

        if self.output.is_text() {
            println!("Priorities:");
            for priority in TaskPriority::all() {
                println!("  {}. {}", priority.rank(), priority);
            }
        }
        let Some(priority_input) = self.prompt("Priority (1-4) [2]: ")? else {
            return Ok(());
        };
        // an unrecognised answer falls back to the default, like a blank one
        let priority: TaskPriority = priority_input.parse().unwrap_or_default();

        let Some(due_input) = self.prompt("Due in how many days? (blank for none): ")? else {
            return Ok(());
        };
        let due_date = if due_input.is_empty() {
            None
        } else {
            match due_input.parse::<i64>() {
                Ok(days) => Some(Utc::now() + Duration::days(days)),
                Err(_) => {
                    self.output.error("Invalid number of days, skipping due date");
                    None
                }
            }
        };

        let result = self
            .repo
            .add_task(&title, &description, priority, due_date)
            .map(Task::snapshot);
        match result {
            Ok(snap) => {
                self.output.success(&format!("Created task with ID {}", snap.id));
                self.render(&snap);
            }
            Err(e) => self.output.error(&e.to_string()),
        }
        Ok(())
    }

    fn list_all(&mut self) {
        let snaps: Vec<TaskSnapshot> = self.repo.all_tasks().iter().map(|t| t.snapshot()).collect();
        self.render_list("All tasks", snaps, "No tasks recorded.");
    }

    fn list_by_status(&mut self) -> Result<()> {
        let Some(input) = self.prompt("Status (pending, in_progress, completed, cancelled): ")?
        else {
            return Ok(());
        };
        let status: TaskStatus = match input.parse() {
            Ok(status) => status,
            Err(e) => {
                self.output.error(&e);
                return Ok(());
            }
        };

        let snaps: Vec<TaskSnapshot> = self
            .repo
            .tasks_by_status(status)
            .iter()
            .map(|t| t.snapshot())
            .collect();
        self.render_list(
            &format!("Tasks with status '{}'", status),
            snaps,
            &format!("No tasks with status '{}'.", status),
        );
        Ok(())
    }

    fn list_by_priority(&mut self) -> Result<()> {
        let Some(input) = self.prompt("Priority (1-4 or name): ")? else {
            return Ok(());
        };
        let priority: TaskPriority = match input.parse() {
            Ok(priority) => priority,
            Err(e) => {
                self.output.error(&e);
                return Ok(());
            }
        };

        let snaps: Vec<TaskSnapshot> = self
            .repo
            .tasks_by_priority(priority)
            .iter()
            .map(|t| t.snapshot())
            .collect();
        self.render_list(
            &format!("Tasks with priority '{}'", priority),
            snaps,
            &format!("No tasks with priority '{}'.", priority),
        );
        Ok(())
    }

    fn transition(&mut self, transition: Transition) -> Result<()> {
        let Some(id) = self.prompt_task_id()? else {
            return Ok(());
        };

        let result = match transition {
            Transition::Start => self.repo.mark_in_progress(id),
            Transition::Complete => self.repo.mark_completed(id),
            Transition::Cancel => self.repo.mark_cancelled(id),
        }
        .map(Task::snapshot);

        match result {
            Ok(snap) => {
                let message = match transition {
                    Transition::Start => "Task marked as in progress:",
                    Transition::Complete => "Task marked as completed:",
                    Transition::Cancel => "Task marked as cancelled:",
                };
                self.output.success(message);
                self.render(&snap);
            }
            Err(e) => self.output.error(&e.to_string()),
        }
        Ok(())
    }

    fn update_task(&mut self) -> Result<()> {
        let Some(id) = self.prompt_task_id()? else {
            return Ok(());
        };
        let current = match self.repo.get_task(id) {
            Ok(task) => task.snapshot(),
            Err(e) => {
                self.output.error(&e.to_string());
                return Ok(());
            }
        };

        if self.output.is_text() {
            println!("Current task:");
        }
        self.render(&current);
        if self.output.is_text() {
            println!("Leave a field blank to keep its current value.");
        }

        let Some(title) = self.prompt(&format!("New title [{}]: ", current.title))? else {
            return Ok(());
        };
        let Some(description) = self.prompt("New description: ")? else {
            return Ok(());
        };
        let Some(priority_input) =
            self.prompt(&format!("New priority (1-4) [{}]: ", current.priority.rank()))?
        else {
            return Ok(());
        };

        let result = self
            .repo
            .update_task(
                id,
                (!title.is_empty()).then_some(title.as_str()),
                (!description.is_empty()).then_some(description.as_str()),
                priority_input.parse().ok(),
            )
            .map(Task::snapshot);
        match result {
            Ok(snap) => {
                self.output.success("Task updated:");
                self.render(&snap);
            }
            Err(e) => self.output.error(&e.to_string()),
        }
        Ok(())
    }

    fn delete_task(&mut self) -> Result<()> {
        let Some(id) = self.prompt_task_id()? else {
            return Ok(());
        };
        let snap = match self.repo.get_task(id) {
            Ok(task) => task.snapshot(),
            Err(e) => {
                self.output.error(&e.to_string());
                return Ok(());
            }
        };

        if self.output.is_text() {
            println!("Task to delete:");
        }
        self.render(&snap);

        let Some(confirm) = self.prompt("Are you sure? (y/n): ")? else {
            return Ok(());
        };
        if confirm.eq_ignore_ascii_case("y") {
            match self.repo.delete_task(id) {
                Ok(()) => self.output.success("Task deleted."),
                Err(e) => self.output.error(&e.to_string()),
            }
        } else {
            self.output.success("Deletion cancelled.");
        }
        Ok(())
    }

    fn show_statistics(&mut self) -> Result<()> {
        let stats = self.repo.statistics();
        let extended = self.toggle.is_enabled(EXTENDED_STATS_FLAG);

        if self.output.is_json() {
            let mut value = serde_json::to_value(stats)?;
            if extended {
                value["overdue_rate"] = serde_json::json!(stats.overdue_rate());
                value["health_index"] = serde_json::json!(stats.health_index());
            }
            self.output.data(&value);
        } else {
            println!("Statistics");
            println!("{}", "=".repeat(40));
            println!("Total tasks:     {}", stats.total);
            println!("Pending:         {}", stats.pending);
            println!("In progress:     {}", stats.in_progress);
            println!("Completed:       {}", stats.completed);
            println!("Cancelled:       {}", stats.cancelled);
            println!("Overdue:         {}", stats.overdue);
            println!();
            println!("Completion rate: {:.2}%", stats.completion_rate);
            if extended {
                println!("Overdue rate:    {:.2}%", stats.overdue_rate());
                println!("Health index:    {}", stats.health_index());
            }
        }
        Ok(())
    }

    fn show_overdue(&mut self) {
        let snaps: Vec<TaskSnapshot> = self
            .repo
            .overdue_tasks()
            .iter()
            .map(|t| t.snapshot())
            .collect();
        self.render_list("Overdue tasks", snaps, "No overdue tasks. Nice work!");
    }

    fn render_list(&self, heading: &str, snaps: Vec<TaskSnapshot>, empty_message: &str) {
        if self.output.is_json() {
            self.output.data(&snaps);
        } else if snaps.is_empty() {
            println!("{}", empty_message);
        } else {
            println!("{} ({}):", heading, snaps.len());
            for snap in &snaps {
                self.render(snap);
            }
        }
    }

    fn render(&self, snap: &TaskSnapshot) {
        if self.output.is_json() {
            self.output.data(snap);
            return;
        }
        println!();
        println!("  ID:          {}", snap.id);
        println!("  Title:       {}", snap.title);
        if snap.description.is_empty() {
            println!("  Description: (none)");
        } else {
            println!("  Description: {}", snap.description);
        }
        println!("  Status:      {}", snap.status);
        println!("  Priority:    {}", snap.priority);
        println!("  Created:     {}", snap.created_at.format("%Y-%m-%d %H:%M"));
        if let Some(due) = snap.due_date {
            let marker = if snap.is_overdue { "  [OVERDUE]" } else { "" };
            println!("  Due:         {}{}", due.format("%Y-%m-%d %H:%M"), marker);
        }
        println!("  {}", "-".repeat(44));
    }
}
