//! View-models for the two screens.
//!
//! Each list keeps an optimistic copy of what it shows. Mutations update the
//! copy right away and enqueue a store command; the next snapshot from the
//! store replaces the copy wholesale.

use chrono::{Local, NaiveDate, Utc};
use thiserror::Error;

use crate::archive::{self, ArchiveRow};
use crate::models::{InsertPosition, Task};
use crate::ordering;
use crate::store::{Subscription, TaskQuery, TaskStore};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum InputError {
    #[error("Task text cannot be empty")]
    EmptyText,
}

/// Tasks still on the main list
pub struct ActiveList {
    store: TaskStore,
    subscription: Subscription,
    tasks: Vec<Task>,
}

impl ActiveList {
    pub fn new(store: TaskStore) -> Self {
        let subscription = store.subscribe(TaskQuery::Active);
        Self {
            store,
            subscription,
            tasks: Vec::new(),
        }
    }

    /// Adopt the newest store snapshot, if one arrived. Returns true when the cache changed.
    pub fn sync(&mut self) -> bool {
        match self.subscription.latest() {
            Some(snapshot) => {
                self.tasks = snapshot;
                true
            }
            None => false,
        }
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Add one task per non-blank line of `input`. Returns how many were added.
    pub fn add_from_input(&mut self, input: &str, insert: InsertPosition) -> Result<usize, InputError> {
        if input.trim().is_empty() {
            return Err(InputError::EmptyText);
        }

        let added = match insert {
            InsertPosition::Top => {
                let mut new_tasks = ordering::parse_tasks_from_input(input, 0);
                let shifted = ordering::shift_positions(&self.tasks, new_tasks.len() as i64);
                self.store.update_all(saved_only(&shifted));
                let count = new_tasks.len();
                for task in &new_tasks {
                    self.store.insert(task.clone());
                }
                new_tasks.extend(shifted);
                self.tasks = new_tasks;
                count
            }
            InsertPosition::Bottom => {
                let start = ordering::next_end_position(&self.tasks);
                let new_tasks = ordering::parse_tasks_from_input(input, start);
                for task in &new_tasks {
                    self.store.insert(task.clone());
                }
                let count = new_tasks.len();
                self.tasks.extend(new_tasks);
                count
            }
        };

        tracing::debug!(added, ?insert, "tasks added");
        Ok(added)
    }

    pub fn toggle_done(&mut self, index: usize) -> bool {
        let Some(task) = self.saved_task(index) else {
            return false;
        };
        let toggled = task.toggled();
        self.tasks[index] = toggled.clone();
        self.store.update(toggled);
        true
    }

    /// Move the task to the archive
    pub fn archive(&mut self, index: usize) -> bool {
        let Some(task) = self.saved_task(index) else {
            return false;
        };
        let archived = task.archived_at(Utc::now());
        self.tasks.remove(index);
        self.store.update(archived);
        true
    }

    pub fn edit_text(&mut self, index: usize, text: &str) -> Result<bool, InputError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(InputError::EmptyText);
        }
        let Some(task) = self.saved_task(index) else {
            return Ok(false);
        };
        let edited = Task {
            text: text.to_string(),
            ..task.clone()
        };
        self.tasks[index] = edited.clone();
        self.store.update(edited);
        Ok(true)
    }

    /// Drop the task at `from` into slot `to` and persist the renumbered list
    pub fn move_task(&mut self, from: usize, to: usize) -> bool {
        if from == to {
            return from < self.tasks.len();
        }
        let Some(reordered) = ordering::renumber_after_move(&self.tasks, from, to) else {
            tracing::warn!(from, to, len = self.tasks.len(), "ignoring out-of-range move");
            return false;
        };
        self.store.update_all(saved_only(&reordered));
        self.tasks = reordered;
        true
    }

    /// Put an archived task back on the list
    pub fn restore(&mut self, task: Task, insert: InsertPosition) {
        let position = match insert {
            InsertPosition::Top => {
                let shifted = ordering::increase_positions(&self.tasks);
                self.store.update_all(saved_only(&shifted));
                self.tasks = shifted;
                0
            }
            InsertPosition::Bottom => ordering::next_end_position(&self.tasks),
        };
        let restored = Task {
            is_done: false,
            is_removed: false,
            position,
            ..task
        };
        self.store.upsert(restored.clone());
        match insert {
            InsertPosition::Top => self.tasks.insert(0, restored),
            InsertPosition::Bottom => self.tasks.push(restored),
        }
    }

    /// Permanently delete every task on the list
    pub fn clear_all(&mut self) {
        self.tasks.clear();
        self.store.remove_all_active();
    }

    /// Current list index of the task with this id
    pub fn index_of(&self, id: i64) -> Option<usize> {
        self.tasks.iter().position(|t| t.id == Some(id))
    }

    fn saved_task(&self, index: usize) -> Option<&Task> {
        let task = self.tasks.get(index)?;
        if task.id.is_none() {
            tracing::warn!(index, "task has not been saved yet; skipping");
            return None;
        }
        Some(task)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArchiveMode {
    Full,
    Search,
}

/// Archived tasks, optionally narrowed by a search filter
pub struct ArchiveList {
    store: TaskStore,
    mode: ArchiveMode,
    filter: String,
    subscription: Option<Subscription>,
    tasks: Vec<Task>,
}

impl ArchiveList {
    pub fn new(store: TaskStore) -> Self {
        let subscription = Some(store.subscribe(TaskQuery::Done));
        Self {
            store,
            mode: ArchiveMode::Full,
            filter: String::new(),
            subscription,
            tasks: Vec::new(),
        }
    }

    pub fn mode(&self) -> ArchiveMode {
        self.mode
    }

    pub fn filter(&self) -> &str {
        &self.filter
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn sync(&mut self) -> bool {
        match self.subscription.as_ref().and_then(Subscription::latest) {
            Some(snapshot) => {
                self.tasks = snapshot;
                true
            }
            None => false,
        }
    }

    /// Start searching with an empty filter, which shows nothing
    pub fn enter_search(&mut self) {
        self.mode = ArchiveMode::Search;
        self.set_filter("");
    }

    /// Replace the search filter; the previous query stops delivering
    pub fn set_filter(&mut self, filter: &str) {
        self.filter = filter.to_string();
        self.tasks.clear();
        let needle = filter.trim();
        self.subscription = if needle.is_empty() {
            None
        } else {
            Some(self.store.subscribe(TaskQuery::DoneFiltered(needle.to_string())))
        };
    }

    pub fn exit_search(&mut self) {
        self.mode = ArchiveMode::Full;
        self.filter.clear();
        self.tasks.clear();
        self.subscription = Some(self.store.subscribe(TaskQuery::Done));
    }

    /// Display rows using the local timezone
    pub fn rows(&self, today: NaiveDate) -> Vec<ArchiveRow> {
        archive::group_for_display_in(&Local, &self.tasks, today, self.mode == ArchiveMode::Full)
    }

    /// Delete permanently
    pub fn delete(&mut self, task: &Task) {
        self.tasks.retain(|t| t.id != task.id);
        self.store.delete(task);
    }

    /// Take a task out of the archive view so it can be restored to the list
    pub fn take_for_restore(&mut self, task: &Task) -> Option<Task> {
        let index = self.tasks.iter().position(|t| t.id == task.id)?;
        Some(self.tasks.remove(index))
    }
}

fn saved_only(tasks: &[Task]) -> Vec<Task> {
    tasks.iter().filter(|t| t.id.is_some()).cloned().collect()
}
