//! Chronological grouping of archived tasks into week and day sections.

use chrono::{Datelike, Local, NaiveDate, TimeZone};

use crate::config::TimeFormat;
use crate::models::Task;

/// One line of the archive view
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArchiveRow {
    WeekHeader { label: String },
    DayHeader { date: NaiveDate, label: String },
    Task(Task),
}

/// Group archived tasks using the local timezone and today's date
pub fn group_for_display(tasks: &[Task], with_week_headers: bool) -> Vec<ArchiveRow> {
    group_for_display_in(&Local, tasks, Local::now().date_naive(), with_week_headers)
}

/// Sort tasks newest first and interleave week/day headers.
///
/// Weeks are ISO weeks (Monday to Sunday) of the task's `done_at` in `tz`.
/// `today` only affects labels: weeks ending in an earlier year get the year appended.
pub fn group_for_display_in<Tz: TimeZone>(
    tz: &Tz,
    tasks: &[Task],
    today: NaiveDate,
    with_week_headers: bool,
) -> Vec<ArchiveRow> {
    let mut sorted: Vec<&Task> = tasks.iter().collect();
    sorted.sort_by(|a, b| b.done_at.cmp(&a.done_at).then(b.id.cmp(&a.id)));

    let mut rows = Vec::with_capacity(sorted.len() * 2);
    let mut current_week = None;
    let mut current_day = None;

    for task in sorted {
        let date = task.done_at.with_timezone(tz).date_naive();
        let iso = date.iso_week();
        let week_key = (iso.year(), iso.week());
        let day_key = (date.year(), date.ordinal());

        if current_week != Some(week_key) {
            current_week = Some(week_key);
            current_day = None;
            if with_week_headers {
                rows.push(ArchiveRow::WeekHeader {
                    label: week_label(date, today),
                });
            }
        }

        if current_day != Some(day_key) {
            current_day = Some(day_key);
            rows.push(ArchiveRow::DayHeader {
                date,
                label: day_label(date),
            });
        }

        rows.push(ArchiveRow::Task(task.clone()));
    }

    rows
}

/// "3 Mar - 9 Mar" for the Monday..Sunday week containing `date`
pub fn week_label(date: NaiveDate, today: NaiveDate) -> String {
    let start = date - chrono::Duration::days(date.weekday().num_days_from_monday() as i64);
    let end = start + chrono::Duration::days(6);
    let label = format!("{} - {}", start.format("%-d %b"), end.format("%-d %b"));
    if end.year() < today.year() {
        format!("{} {}", label, end.year())
    } else {
        label
    }
}

/// "5 Mar, Tuesday"
pub fn day_label(date: NaiveDate) -> String {
    date.format("%-d %b, %A").to_string()
}

/// Time of day the task was finished, in the user's clock format
pub fn finished_time<Tz: TimeZone>(tz: &Tz, task: &Task, format: TimeFormat) -> String
where
    Tz::Offset: std::fmt::Display,
{
    let local = task.done_at.with_timezone(tz);
    match format {
        TimeFormat::H24 => local.format("%H:%M").to_string(),
        TimeFormat::H12 => local.format("%-I:%M %p").to_string(),
    }
}

/// Calendar days from creation to completion, counting both ends
pub fn days_to_finish<Tz: TimeZone>(tz: &Tz, task: &Task) -> i64 {
    let created = task.created_at.with_timezone(tz).date_naive();
    let done = task.done_at.with_timezone(tz).date_naive();
    (done - created).num_days().max(0) + 1
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Utc};
    use pretty_assertions::assert_eq;

    fn done(text: &str, id: i64, at: &str) -> Task {
        let when: DateTime<Utc> = at.parse().unwrap();
        Task {
            id: Some(id),
            text: text.to_string(),
            created_at: when,
            done_at: when,
            is_done: true,
            is_removed: true,
            position: 0,
        }
    }

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn shape(rows: &[ArchiveRow]) -> Vec<String> {
        rows.iter()
            .map(|row| match row {
                ArchiveRow::WeekHeader { label } => format!("W {label}"),
                ArchiveRow::DayHeader { label, .. } => format!("D {label}"),
                ArchiveRow::Task(task) => format!("T {}", task.text),
            })
            .collect()
    }

    #[test]
    fn two_days_in_one_week_share_a_week_header() {
        // Tuesday and Thursday of the same ISO week
        let tasks = vec![
            done("tue early", 1, "2024-03-05T08:00:00Z"),
            done("thu", 2, "2024-03-07T10:00:00Z"),
            done("tue late", 3, "2024-03-05T18:00:00Z"),
        ];
        let rows = group_for_display_in(&Utc, &tasks, day(2024, 3, 10), true);
        assert_eq!(
            shape(&rows),
            vec![
                "W 4 Mar - 10 Mar",
                "D 7 Mar, Thursday",
                "T thu",
                "D 5 Mar, Tuesday",
                "T tue late",
                "T tue early",
            ]
        );
    }

    #[test]
    fn weeks_are_emitted_newest_first() {
        let tasks = vec![
            done("old", 1, "2024-02-26T09:00:00Z"),
            done("new", 2, "2024-03-05T09:00:00Z"),
        ];
        let rows = group_for_display_in(&Utc, &tasks, day(2024, 3, 10), true);
        assert_eq!(
            shape(&rows),
            vec![
                "W 4 Mar - 10 Mar",
                "D 5 Mar, Tuesday",
                "T new",
                "W 26 Feb - 3 Mar",
                "D 26 Feb, Monday",
                "T old",
            ]
        );
    }

    #[test]
    fn search_layout_has_no_week_headers() {
        let tasks = vec![
            done("a", 1, "2024-02-26T09:00:00Z"),
            done("b", 2, "2024-03-05T09:00:00Z"),
        ];
        let rows = group_for_display_in(&Utc, &tasks, day(2024, 3, 10), false);
        assert!(rows.iter().all(|r| !matches!(r, ArchiveRow::WeekHeader { .. })));
        assert_eq!(rows.len(), 4);
    }

    #[test]
    fn weeks_from_an_earlier_year_carry_the_year() {
        assert_eq!(week_label(day(2023, 6, 14), day(2024, 1, 2)), "12 Jun - 18 Jun 2023");
        assert_eq!(week_label(day(2024, 6, 14), day(2024, 7, 1)), "10 Jun - 16 Jun");
    }

    #[test]
    fn year_boundary_week_stays_together() {
        // 2024-12-30 (Mon) and 2025-01-02 (Thu) are both ISO week 1 of 2025
        let tasks = vec![
            done("dec", 1, "2024-12-30T12:00:00Z"),
            done("jan", 2, "2025-01-02T12:00:00Z"),
        ];
        let rows = group_for_display_in(&Utc, &tasks, day(2025, 1, 5), true);
        let weeks = rows.iter().filter(|r| matches!(r, ArchiveRow::WeekHeader { .. })).count();
        assert_eq!(weeks, 1);
    }

    #[test]
    fn empty_archive_has_no_rows() {
        assert!(group_for_display_in(&Utc, &[], day(2024, 1, 1), true).is_empty());
    }

    #[test]
    fn finished_time_respects_clock_format() {
        let task = done("t", 1, "2024-03-05T15:07:00Z");
        assert_eq!(finished_time(&Utc, &task, TimeFormat::H24), "15:07");
        assert_eq!(finished_time(&Utc, &task, TimeFormat::H12), "3:07 PM");
    }

    #[test]
    fn same_day_counts_as_one_day() {
        let mut task = done("t", 1, "2024-03-05T15:00:00Z");
        assert_eq!(days_to_finish(&Utc, &task), 1);
        task.created_at = "2024-02-28T23:00:00Z".parse().unwrap();
        assert_eq!(days_to_finish(&Utc, &task), 7);
    }
}
