use chrono::{DateTime, Utc};
use rusqlite::{Connection, OptionalExtension};
use std::path::PathBuf;
use thiserror::Error;

use crate::models::Task;

#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("SQLite error: {0}")]
    SqliteError(#[from] rusqlite::Error),
    #[error("Failed to create database directory: {0}")]
    DirectoryError(String),
    #[error("Task has no id; it was never stored")]
    MissingId,
}

const TASK_COLUMNS: &str = "id, text, created_at, done_at, is_done, is_removed, position";

pub struct Database {
    conn: Connection,
}

impl Database {
    /// Create a new database connection and initialize the schema
    pub fn new(path: &str) -> Result<Self, DatabaseError> {
        let db_path = PathBuf::from(path);

        // Create parent directory if it doesn't exist
        if let Some(parent) = db_path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent)
                    .map_err(|e| DatabaseError::DirectoryError(e.to_string()))?;
            }
        }

        let conn = Connection::open(&db_path)?;
        let db = Database { conn };
        db.initialize_schema()?;

        tracing::info!(path = %db_path.display(), "database opened");
        Ok(db)
    }

    /// Open a private in-memory database (used by tests)
    pub fn in_memory() -> Result<Self, DatabaseError> {
        let db = Database {
            conn: Connection::open_in_memory()?,
        };
        db.initialize_schema()?;
        Ok(db)
    }

    fn initialize_schema(&self) -> Result<(), DatabaseError> {
        // AUTOINCREMENT keeps ids from being reused after deletes
        self.conn.execute(
            "CREATE TABLE IF NOT EXISTS tasks (
                id              INTEGER PRIMARY KEY AUTOINCREMENT,
                text            TEXT NOT NULL,
                created_at      INTEGER NOT NULL,
                done_at         INTEGER NOT NULL,
                is_done         INTEGER NOT NULL DEFAULT 0,
                is_removed      INTEGER NOT NULL DEFAULT 0,
                position        INTEGER NOT NULL DEFAULT 0
            )",
            [],
        )?;

        self.conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_tasks_active_position ON tasks(is_removed, position)",
            [],
        )?;

        self.conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_tasks_done_at ON tasks(is_removed, done_at)",
            [],
        )?;

        Ok(())
    }

    fn row_to_task(row: &rusqlite::Row) -> Result<Task, rusqlite::Error> {
        Ok(Task {
            id: Some(row.get(0)?),
            text: row.get(1)?,
            created_at: millis_to_datetime(2, row.get(2)?)?,
            done_at: millis_to_datetime(3, row.get(3)?)?,
            is_done: row.get::<_, i64>(4)? != 0,
            is_removed: row.get::<_, i64>(5)? != 0,
            position: row.get(6)?,
        })
    }

    /// Insert a task and return its store-assigned id
    pub fn insert_task(&self, task: &Task) -> Result<i64, DatabaseError> {
        self.conn.execute(
            "INSERT INTO tasks (text, created_at, done_at, is_done, is_removed, position)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            rusqlite::params![
                task.text,
                task.created_at.timestamp_millis(),
                task.done_at.timestamp_millis(),
                task.is_done as i64,
                task.is_removed as i64,
                task.position,
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    /// Replace the stored row with the same id. Unknown ids are a no-op.
    pub fn update_task(&self, task: &Task) -> Result<(), DatabaseError> {
        let tx = self.conn.unchecked_transaction()?;
        Self::update_in(&tx, task)?;
        tx.commit()?;
        Ok(())
    }

    /// Persist a batch of tasks in a single transaction
    pub fn update_all_tasks(&self, tasks: &[Task]) -> Result<(), DatabaseError> {
        let tx = self.conn.unchecked_transaction()?;
        for task in tasks {
            Self::update_in(&tx, task)?;
        }
        tx.commit()?;
        Ok(())
    }

    fn update_in(conn: &Connection, task: &Task) -> Result<usize, DatabaseError> {
        let id = task.id.ok_or(DatabaseError::MissingId)?;
        let changed = conn.execute(
            "UPDATE tasks SET text = ?1, created_at = ?2, done_at = ?3,
             is_done = ?4, is_removed = ?5, position = ?6 WHERE id = ?7",
            rusqlite::params![
                task.text,
                task.created_at.timestamp_millis(),
                task.done_at.timestamp_millis(),
                task.is_done as i64,
                task.is_removed as i64,
                task.position,
                id
            ],
        )?;
        Ok(changed)
    }

    /// Insert the task, or replace it when a row with its id already exists
    pub fn upsert_task(&self, task: &Task) -> Result<i64, DatabaseError> {
        let tx = self.conn.unchecked_transaction()?;
        tx.execute(
            "INSERT INTO tasks (id, text, created_at, done_at, is_done, is_removed, position)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
             ON CONFLICT(id) DO UPDATE SET
                text = excluded.text,
                created_at = excluded.created_at,
                done_at = excluded.done_at,
                is_done = excluded.is_done,
                is_removed = excluded.is_removed,
                position = excluded.position",
            rusqlite::params![
                task.id,
                task.text,
                task.created_at.timestamp_millis(),
                task.done_at.timestamp_millis(),
                task.is_done as i64,
                task.is_removed as i64,
                task.position,
            ],
        )?;
        let id = task.id.unwrap_or_else(|| tx.last_insert_rowid());
        tx.commit()?;
        Ok(id)
    }

    /// Permanently delete a task by id
    pub fn delete_task(&self, id: i64) -> Result<(), DatabaseError> {
        let tx = self.conn.unchecked_transaction()?;
        tx.execute("DELETE FROM tasks WHERE id = ?1", rusqlite::params![id])?;
        tx.commit()?;
        Ok(())
    }

    /// Permanently delete every task still on the active list
    pub fn remove_all_active(&self) -> Result<usize, DatabaseError> {
        let tx = self.conn.unchecked_transaction()?;
        let removed = tx.execute("DELETE FROM tasks WHERE is_removed = 0", [])?;
        tx.commit()?;
        Ok(removed)
    }

    /// Active tasks by ascending position; ties fall back to insertion order
    pub fn get_all_active(&self) -> Result<Vec<Task>, DatabaseError> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {TASK_COLUMNS} FROM tasks WHERE is_removed = 0 ORDER BY position ASC, id ASC"
        ))?;
        let tasks = stmt.query_map([], Self::row_to_task)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(tasks)
    }

    /// Archived tasks, most recently finished first
    pub fn get_all_done(&self) -> Result<Vec<Task>, DatabaseError> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {TASK_COLUMNS} FROM tasks WHERE is_removed = 1 ORDER BY done_at DESC, id DESC"
        ))?;
        let tasks = stmt.query_map([], Self::row_to_task)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(tasks)
    }

    /// Archived tasks whose text contains `needle`, ignoring case.
    /// Matching happens here rather than in SQL because SQLite's LIKE only folds ASCII.
    pub fn get_all_done_filtered(&self, needle: &str) -> Result<Vec<Task>, DatabaseError> {
        let needle = needle.to_lowercase();
        Ok(self
            .get_all_done()?
            .into_iter()
            .filter(|task| task.text.to_lowercase().contains(&needle))
            .collect())
    }

    /// Get a single task by id
    pub fn get_task(&self, id: i64) -> Result<Option<Task>, DatabaseError> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {TASK_COLUMNS} FROM tasks WHERE id = ?1"
        ))?;
        let task = stmt.query_row(rusqlite::params![id], Self::row_to_task).optional()?;
        Ok(task)
    }

    /// Highest position among active tasks, if any
    pub fn get_max_active_position(&self) -> Result<Option<i64>, DatabaseError> {
        let max: Option<i64> = self.conn.query_row(
            "SELECT MAX(position) FROM tasks WHERE is_removed = 0",
            [],
            |row| row.get(0),
        )?;
        Ok(max)
    }
}

fn millis_to_datetime(column: usize, millis: i64) -> Result<DateTime<Utc>, rusqlite::Error> {
    DateTime::from_timestamp_millis(millis)
        .ok_or(rusqlite::Error::IntegralValueOutOfRange(column, millis))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use pretty_assertions::assert_eq;

    fn task(text: &str, position: i64) -> Task {
        Task::new(text.to_string(), position)
    }

    fn texts(tasks: &[Task]) -> Vec<&str> {
        tasks.iter().map(|t| t.text.as_str()).collect()
    }

    #[test]
    fn insert_assigns_increasing_ids() {
        let db = Database::in_memory().unwrap();
        let a = db.insert_task(&task("a", 0)).unwrap();
        let b = db.insert_task(&task("b", 1)).unwrap();
        assert!(b > a);
    }

    #[test]
    fn ids_are_not_reused_after_delete() {
        let db = Database::in_memory().unwrap();
        let first = db.insert_task(&task("a", 0)).unwrap();
        let second = db.insert_task(&task("b", 1)).unwrap();
        db.delete_task(second).unwrap();
        let third = db.insert_task(&task("c", 2)).unwrap();
        assert!(third > second);
        assert!(third > first);
    }

    #[test]
    fn active_and_done_queries_are_disjoint() {
        let db = Database::in_memory().unwrap();
        let id = db.insert_task(&task("keep", 0)).unwrap();
        let gone = db.insert_task(&task("archive me", 1)).unwrap();

        let mut archived = db.get_task(gone).unwrap().unwrap();
        archived = archived.archived_at(Utc::now());
        db.update_task(&archived).unwrap();

        let active = db.get_all_active().unwrap();
        let done = db.get_all_done().unwrap();
        assert_eq!(texts(&active), vec!["keep"]);
        assert_eq!(texts(&done), vec!["archive me"]);
        assert!(active.iter().all(|t| !t.is_removed));
        assert!(done.iter().all(|t| t.is_removed));
        assert_eq!(active[0].id, Some(id));
    }

    #[test]
    fn active_ties_fall_back_to_insertion_order() {
        let db = Database::in_memory().unwrap();
        db.insert_task(&task("first", 0)).unwrap();
        db.insert_task(&task("second", 0)).unwrap();
        db.insert_task(&task("head", -1)).unwrap();
        assert_eq!(texts(&db.get_all_active().unwrap()), vec!["head", "first", "second"]);
    }

    #[test]
    fn update_of_unknown_id_is_a_no_op() {
        let db = Database::in_memory().unwrap();
        let mut ghost = task("ghost", 0);
        ghost.id = Some(42);
        db.update_task(&ghost).unwrap();
        assert!(db.get_all_active().unwrap().is_empty());
    }

    #[test]
    fn update_without_id_is_rejected() {
        let db = Database::in_memory().unwrap();
        let result = db.update_task(&task("unsaved", 0));
        assert!(matches!(result, Err(DatabaseError::MissingId)));
    }

    #[test]
    fn update_all_persists_submitted_order() {
        let db = Database::in_memory().unwrap();
        for (i, name) in ["a", "b", "c"].iter().enumerate() {
            db.insert_task(&task(name, i as i64)).unwrap();
        }
        let mut tasks = db.get_all_active().unwrap();
        tasks.reverse();
        for (i, t) in tasks.iter_mut().enumerate() {
            t.position = i as i64;
        }
        db.update_all_tasks(&tasks).unwrap();
        assert_eq!(texts(&db.get_all_active().unwrap()), vec!["c", "b", "a"]);
    }

    #[test]
    fn upsert_inserts_then_replaces() {
        let db = Database::in_memory().unwrap();
        let id = db.upsert_task(&task("draft", 0)).unwrap();
        let mut stored = db.get_task(id).unwrap().unwrap();
        stored.text = "final".to_string();
        assert_eq!(db.upsert_task(&stored).unwrap(), id);
        let all = db.get_all_active().unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].text, "final");
    }

    #[test]
    fn remove_all_active_keeps_archive() {
        let db = Database::in_memory().unwrap();
        db.insert_task(&task("a", 0)).unwrap();
        db.insert_task(&task("b", 1)).unwrap();
        let mut old = task("old", 2);
        old.is_removed = true;
        db.insert_task(&old).unwrap();

        assert_eq!(db.remove_all_active().unwrap(), 2);
        assert!(db.get_all_active().unwrap().is_empty());
        assert_eq!(texts(&db.get_all_done().unwrap()), vec!["old"]);
    }

    #[test]
    fn done_tasks_are_newest_first_and_filterable() {
        let db = Database::in_memory().unwrap();
        let base = Utc::now();
        for (offset, name) in [(1, "Buy milk"), (3, "Call MOM"), (2, "buy bread")] {
            let mut t = task(name, 0);
            t.is_removed = true;
            t.done_at = base + Duration::minutes(offset);
            db.insert_task(&t).unwrap();
        }

        assert_eq!(
            texts(&db.get_all_done().unwrap()),
            vec!["Call MOM", "buy bread", "Buy milk"]
        );
        assert_eq!(
            texts(&db.get_all_done_filtered("BUY").unwrap()),
            vec!["buy bread", "Buy milk"]
        );
        assert_eq!(texts(&db.get_all_done_filtered("mom").unwrap()), vec!["Call MOM"]);
    }

    #[test]
    fn filter_folds_non_ascii_case() {
        let db = Database::in_memory().unwrap();
        let mut t = task("Ölwechsel machen", 0);
        t.is_removed = true;
        db.insert_task(&t).unwrap();
        assert_eq!(db.get_all_done_filtered("ölw").unwrap().len(), 1);
    }

    #[test]
    fn timestamps_round_trip_at_millisecond_precision() {
        let db = Database::in_memory().unwrap();
        let t = task("ts", 0);
        let id = db.insert_task(&t).unwrap();
        let stored = db.get_task(id).unwrap().unwrap();
        assert_eq!(stored.created_at.timestamp_millis(), t.created_at.timestamp_millis());
    }

    #[test]
    fn fresh_schema_declares_every_column() {
        let db = Database::in_memory().unwrap();
        let mut stmt = db.conn.prepare("SELECT name FROM pragma_table_info('tasks')").unwrap();
        let columns: Vec<String> = stmt
            .query_map([], |row| row.get(0))
            .unwrap()
            .collect::<Result<_, _>>()
            .unwrap();
        assert_eq!(
            columns,
            vec!["id", "text", "created_at", "done_at", "is_done", "is_removed", "position"]
        );
    }

    #[test]
    fn max_active_position_ignores_archive() {
        let db = Database::in_memory().unwrap();
        assert_eq!(db.get_max_active_position().unwrap(), None);
        db.insert_task(&task("a", 4)).unwrap();
        let mut archived = task("b", 9);
        archived.is_removed = true;
        db.insert_task(&archived).unwrap();
        assert_eq!(db.get_max_active_position().unwrap(), Some(4));
    }
}
