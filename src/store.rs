//! Live task store.
//!
//! A single writer thread owns the SQLite connection. Every handle sends
//! commands over one channel, so writes are applied strictly in the order
//! they were issued. Subscribers receive the full result of their query
//! whenever a write changes it.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::sync::Arc;
use std::thread;
use std::time::Duration;
use thiserror::Error;

use crate::database::{Database, DatabaseError};
use crate::models::Task;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Task store has shut down")]
    Disconnected,
    #[error("Timed out waiting for the task store")]
    Timeout,
    #[error("Failed to start task store thread: {0}")]
    SpawnError(#[from] std::io::Error),
}

/// A live query over the task table
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskQuery {
    /// Tasks still on the list, by position
    Active,
    /// Archived tasks, most recently finished first
    Done,
    /// Archived tasks containing the given text, ignoring case
    DoneFiltered(String),
}

impl TaskQuery {
    fn run(&self, db: &Database) -> Result<Vec<Task>, DatabaseError> {
        match self {
            TaskQuery::Active => db.get_all_active(),
            TaskQuery::Done => db.get_all_done(),
            TaskQuery::DoneFiltered(text) => db.get_all_done_filtered(text),
        }
    }
}

enum Command {
    Insert(Task),
    Update(Task),
    UpdateAll(Vec<Task>),
    Upsert(Task),
    Delete(i64),
    RemoveAllActive,
    Subscribe {
        query: TaskQuery,
        sink: Sender<Vec<Task>>,
        alive: Arc<AtomicBool>,
    },
    Flush(Sender<()>),
}

impl Command {
    fn name(&self) -> &'static str {
        match self {
            Command::Insert(_) => "insert",
            Command::Update(_) => "update",
            Command::UpdateAll(_) => "update_all",
            Command::Upsert(_) => "upsert",
            Command::Delete(_) => "delete",
            Command::RemoveAllActive => "remove_all_active",
            Command::Subscribe { .. } => "subscribe",
            Command::Flush(_) => "flush",
        }
    }
}

/// Cloneable handle to the store thread. The thread exits once every handle is dropped.
#[derive(Clone)]
pub struct TaskStore {
    commands: Sender<Command>,
}

impl TaskStore {
    /// Move the database onto a dedicated writer thread
    pub fn open(database: Database) -> Result<Self, StoreError> {
        let (tx, rx) = mpsc::channel();
        thread::Builder::new()
            .name("task-store".to_string())
            .spawn(move || Worker::new(database).run(rx))?;
        Ok(Self { commands: tx })
    }

    pub fn insert(&self, task: Task) {
        self.send(Command::Insert(task));
    }

    pub fn update(&self, task: Task) {
        self.send(Command::Update(task));
    }

    /// Persist a batch (typically a reorder) as one write and one emission
    pub fn update_all(&self, tasks: Vec<Task>) {
        if tasks.is_empty() {
            return;
        }
        self.send(Command::UpdateAll(tasks));
    }

    pub fn upsert(&self, task: Task) {
        self.send(Command::Upsert(task));
    }

    pub fn delete(&self, task: &Task) {
        match task.id {
            Some(id) => self.send(Command::Delete(id)),
            None => tracing::warn!(text = %task.text, "skipping delete of unsaved task"),
        }
    }

    pub fn remove_all_active(&self) {
        self.send(Command::RemoveAllActive);
    }

    /// Register a live query. The current result is delivered immediately.
    pub fn subscribe(&self, query: TaskQuery) -> Subscription {
        let (sink, subscription) = Subscription::channel();
        let alive = Arc::clone(&subscription.alive);
        self.send(Command::Subscribe { query, sink, alive });
        subscription
    }

    /// Block until every command sent before this call has been applied
    pub fn flush(&self) -> Result<(), StoreError> {
        let (done_tx, done_rx) = mpsc::channel();
        self.commands
            .send(Command::Flush(done_tx))
            .map_err(|_| StoreError::Disconnected)?;
        done_rx.recv().map_err(|_| StoreError::Disconnected)
    }

    fn send(&self, command: Command) {
        let name = command.name();
        if self.commands.send(command).is_err() {
            tracing::error!(command = name, "task store is gone; dropping command");
        }
    }
}

/// Receiving end of a live query. Dropping it unregisters the query.
pub struct Subscription {
    snapshots: Receiver<Vec<Task>>,
    alive: Arc<AtomicBool>,
}

impl Subscription {
    fn channel() -> (Sender<Vec<Task>>, Self) {
        let (sink, snapshots) = mpsc::channel();
        let subscription = Self {
            snapshots,
            alive: Arc::new(AtomicBool::new(true)),
        };
        (sink, subscription)
    }

    /// Newest pending snapshot, skipping any older ones. Never blocks.
    pub fn latest(&self) -> Option<Vec<Task>> {
        let mut newest = None;
        while let Ok(snapshot) = self.snapshots.try_recv() {
            newest = Some(snapshot);
        }
        newest
    }

    /// Wait for the next snapshot
    pub fn recv_timeout(&self, timeout: Duration) -> Result<Vec<Task>, StoreError> {
        self.snapshots.recv_timeout(timeout).map_err(|e| match e {
            RecvTimeoutError::Timeout => StoreError::Timeout,
            RecvTimeoutError::Disconnected => StoreError::Disconnected,
        })
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.alive.store(false, Ordering::Release);
    }
}

struct Subscriber {
    query: TaskQuery,
    sink: Sender<Vec<Task>>,
    alive: Arc<AtomicBool>,
    last: Vec<Task>,
}

impl Subscriber {
    fn is_alive(&self) -> bool {
        self.alive.load(Ordering::Acquire)
    }
}

struct Worker {
    database: Database,
    subscribers: Vec<Subscriber>,
}

impl Worker {
    fn new(database: Database) -> Self {
        Self {
            database,
            subscribers: Vec::new(),
        }
    }

    fn run(mut self, commands: Receiver<Command>) {
        while let Ok(command) = commands.recv() {
            tracing::debug!(command = command.name(), "applying store command");
            match command {
                Command::Subscribe { query, sink, alive } => self.add_subscriber(query, sink, alive),
                Command::Flush(done) => {
                    let _ = done.send(());
                }
                write => {
                    let name = write.name();
                    match self.apply(write) {
                        Ok(()) => self.publish(),
                        Err(e) => tracing::error!(command = name, error = %e, "task store write failed"),
                    }
                }
            }
        }
        tracing::debug!("task store worker stopped");
    }

    fn apply(&self, command: Command) -> Result<(), DatabaseError> {
        match command {
            Command::Insert(task) => {
                let id = self.database.insert_task(&task)?;
                tracing::debug!(id, "task inserted");
            }
            Command::Update(task) => self.database.update_task(&task)?,
            Command::UpdateAll(tasks) => self.database.update_all_tasks(&tasks)?,
            Command::Upsert(task) => {
                self.database.upsert_task(&task)?;
            }
            Command::Delete(id) => self.database.delete_task(id)?,
            Command::RemoveAllActive => {
                let removed = self.database.remove_all_active()?;
                tracing::info!(removed, "cleared active tasks");
            }
            Command::Subscribe { .. } | Command::Flush(_) => {}
        }
        Ok(())
    }

    fn add_subscriber(&mut self, query: TaskQuery, sink: Sender<Vec<Task>>, alive: Arc<AtomicBool>) {
        // Dropped before the worker got to it
        if !alive.load(Ordering::Acquire) {
            return;
        }
        match query.run(&self.database) {
            Ok(snapshot) => {
                if sink.send(snapshot.clone()).is_ok() {
                    self.subscribers.push(Subscriber {
                        query,
                        sink,
                        alive,
                        last: snapshot,
                    });
                }
            }
            Err(e) => tracing::error!(?query, error = %e, "initial query failed"),
        }
    }

    /// Re-run every live query and push results that changed.
    /// Subscribers whose `Subscription` was dropped are removed first,
    /// whether or not their result changed.
    fn publish(&mut self) {
        let before = self.subscribers.len();
        self.subscribers.retain(Subscriber::is_alive);
        if self.subscribers.len() < before {
            tracing::debug!(pruned = before - self.subscribers.len(), "dropped stale subscribers");
        }

        let database = &self.database;
        self.subscribers.retain_mut(|subscriber| {
            let snapshot = match subscriber.query.run(database) {
                Ok(snapshot) => snapshot,
                Err(e) => {
                    tracing::error!(query = ?subscriber.query, error = %e, "live query failed");
                    return true;
                }
            };
            if snapshot == subscriber.last {
                return true;
            }
            subscriber.last = snapshot.clone();
            subscriber.sink.send(snapshot).is_ok()
        });
    }
}
