//! Pure helpers for building tasks from user input and keeping
//! active-list positions consistent.

use crate::models::Task;

/// Build one new task at `position`
pub fn parse_task_from_input(text: &str, position: i64) -> Task {
    Task::new(text.to_string(), position)
}

/// One task per non-blank line, trimmed, with consecutive positions from `start_position`
pub fn parse_tasks_from_input(input: &str, start_position: i64) -> Vec<Task> {
    input
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .zip(start_position..)
        .map(|(line, position)| parse_task_from_input(line, position))
        .collect()
}

/// Tasks seeded on first launch; the archive hint starts out done so it can be tried right away
pub fn tutorial_tasks() -> Vec<Task> {
    let texts = [
        "Press Space to mark a task done",
        "Press e to edit a task",
        "Press a to archive a finished task",
        "Press m, move with j/k, drop with Enter",
    ];
    texts
        .iter()
        .zip(0..)
        .map(|(text, position)| {
            let mut task = parse_task_from_input(text, position);
            task.is_done = position == 2;
            task
        })
        .collect()
}

/// Copies of `tasks` moved down by one position to free slot 0
pub fn increase_positions(tasks: &[Task]) -> Vec<Task> {
    shift_positions(tasks, 1)
}

/// Copies of `tasks` with `by` added to every position
pub fn shift_positions(tasks: &[Task], by: i64) -> Vec<Task> {
    tasks
        .iter()
        .map(|task| Task {
            position: task.position + by,
            ..task.clone()
        })
        .collect()
}

/// Position for a task appended after `tasks` (which are in display order)
pub fn next_end_position(tasks: &[Task]) -> i64 {
    tasks.last().map(|task| task.position + 1).unwrap_or(0)
}

/// Move the task at `from` to `to` and renumber the whole list `0..n`.
/// Returns `None` when either index is out of range.
pub fn renumber_after_move(tasks: &[Task], from: usize, to: usize) -> Option<Vec<Task>> {
    if from >= tasks.len() || to >= tasks.len() {
        return None;
    }
    let mut reordered = tasks.to_vec();
    let moved = reordered.remove(from);
    reordered.insert(to, moved);
    for (index, task) in reordered.iter_mut().enumerate() {
        task.position = index as i64;
    }
    Some(reordered)
}
