use clap::{Parser, Subcommand};
use std::io::Write;
use thiserror::Error;

use crate::archive::{self, ArchiveRow};
use crate::config::TimeFormat;
use crate::controller::InputError;
use crate::database::{Database, DatabaseError};
use crate::models::{InsertPosition, Task};
use crate::ordering;

#[derive(Parser)]
#[command(name = "doneward")]
#[command(about = "A small to-do list with an archive of finished tasks")]
#[command(version)]
pub struct Cli {
    /// Custom config file path
    #[arg(short, long)]
    pub config: Option<String>,

    /// Use development mode (uses separate dev config/database)
    #[arg(long)]
    pub dev: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Launch interactive TUI (default if no subcommand)
    Tui,
    /// Add tasks; each line of TEXT becomes one task
    Add {
        text: String,
        /// Insert at the top of the list
        #[arg(long, conflicts_with = "bottom")]
        top: bool,
        /// Append to the bottom of the list
        #[arg(long)]
        bottom: bool,
    },
    /// Print the active list in order
    List {
        #[arg(long)]
        json: bool,
    },
    /// Print archived tasks grouped by day
    Archive {
        /// Only show tasks containing this text
        #[arg(long)]
        search: Option<String>,
        #[arg(long)]
        json: bool,
    },
    /// Permanently delete every task on the active list
    Clear {
        /// Confirm the deletion
        #[arg(long)]
        yes: bool,
    },
}

#[derive(Debug, Error)]
pub enum CliError {
    #[error("Database error: {0}")]
    DatabaseError(#[from] DatabaseError),
    #[error("{0}")]
    InputError(#[from] InputError),
    #[error("Failed to write JSON: {0}")]
    JsonError(#[from] serde_json::Error),
    #[error("Failed to write output: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Refusing to delete all tasks without --yes")]
    ConfirmationRequired,
}

/// Resolve `--top`/`--bottom` against the configured default
pub fn insert_position_for(top: bool, bottom: bool, default: InsertPosition) -> InsertPosition {
    match (top, bottom) {
        (true, _) => InsertPosition::Top,
        (_, true) => InsertPosition::Bottom,
        _ => default,
    }
}

/// Handle the add command. Returns the number of tasks created.
pub fn handle_add(text: &str, insert: InsertPosition, db: &Database) -> Result<usize, CliError> {
    if text.trim().is_empty() {
        return Err(InputError::EmptyText.into());
    }

    let new_tasks = match insert {
        InsertPosition::Top => {
            let new_tasks = ordering::parse_tasks_from_input(text, 0);
            let existing = db.get_all_active()?;
            db.update_all_tasks(&ordering::shift_positions(&existing, new_tasks.len() as i64))?;
            new_tasks
        }
        InsertPosition::Bottom => {
            let start = db.get_max_active_position()?.map(|p| p + 1).unwrap_or(0);
            ordering::parse_tasks_from_input(text, start)
        }
    };

    for task in &new_tasks {
        let id = db.insert_task(task)?;
        tracing::info!(id, "task added from command line");
    }
    Ok(new_tasks.len())
}

/// Handle the list command
pub fn handle_list(json: bool, db: &Database, out: &mut impl Write) -> Result<(), CliError> {
    let tasks = db.get_all_active()?;
    if json {
        serde_json::to_writer_pretty(&mut *out, &tasks)?;
        writeln!(out)?;
        return Ok(());
    }
    if tasks.is_empty() {
        writeln!(out, "No tasks")?;
    }
    for (index, task) in tasks.iter().enumerate() {
        let mark = if task.is_done { "x" } else { " " };
        writeln!(out, "{:>3}. [{}] {}", index + 1, mark, task.text)?;
    }
    Ok(())
}

/// Handle the archive command
pub fn handle_archive(
    search: Option<&str>,
    json: bool,
    time_format: TimeFormat,
    db: &Database,
    out: &mut impl Write,
) -> Result<(), CliError> {
    let tasks: Vec<Task> = match search.map(str::trim) {
        Some("") => Vec::new(),
        Some(needle) => db.get_all_done_filtered(needle)?,
        None => db.get_all_done()?,
    };

    if json {
        serde_json::to_writer_pretty(&mut *out, &tasks)?;
        writeln!(out)?;
        return Ok(());
    }
    if tasks.is_empty() {
        writeln!(out, "Archive is empty")?;
        return Ok(());
    }

    let local = chrono::Local;
    for row in archive::group_for_display(&tasks, search.is_none()) {
        match row {
            ArchiveRow::WeekHeader { label } => writeln!(out, "== {} ==", label)?,
            ArchiveRow::DayHeader { label, .. } => writeln!(out, "{}", label)?,
            ArchiveRow::Task(task) => writeln!(
                out,
                "  {}  {}  ({}d)",
                archive::finished_time(&local, &task, time_format),
                task.text,
                archive::days_to_finish(&local, &task)
            )?,
        }
    }
    Ok(())
}

/// Handle the clear command. Returns the number of deleted tasks.
pub fn handle_clear(yes: bool, db: &Database) -> Result<usize, CliError> {
    if !yes {
        return Err(CliError::ConfirmationRequired);
    }
    let removed = db.remove_all_active()?;
    tracing::info!(removed, "cleared active tasks from command line");
    Ok(removed)
}
