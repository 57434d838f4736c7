use chrono::{Local, NaiveDate};
use ratatui::widgets::ListState;
use std::path::PathBuf;
use std::time::Instant;

use crate::archive::ArchiveRow;
use crate::config::{Config, ConfigError, ThemeMode, TimeFormat};
use crate::controller::{ActiveList, ArchiveList, ArchiveMode, InputError};
use crate::models::{InsertPosition, Task};
use crate::ordering;
use crate::store::{StoreError, TaskStore};
use crate::tui::widgets::editor::Editor;
use crate::utils::format_key_binding_for_display;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Tab {
    #[default]
    Tasks,
    Archive,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    #[default]
    View,
    Editor,
    Drag,
    Search,
    Settings,
    Help,
    ConfirmClear,
}

/// What the editor dialog saves into. Edits track the task id, not its row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditorTarget {
    New,
    Edit(i64),
}

#[derive(Debug, Clone)]
pub struct EditorState {
    pub target: EditorTarget,
    pub editor: Editor,
    /// Shown inline in the dialog instead of the key hints
    pub warning: Option<String>,
}

/// A task picked up for reordering. Only the UI knows about it until it is dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DragState {
    pub origin: usize,
    pub current: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettingsField {
    Theme,
    InsertPosition,
    TimeFormat,
}

impl SettingsField {
    pub const ALL: [SettingsField; 3] = [
        SettingsField::Theme,
        SettingsField::InsertPosition,
        SettingsField::TimeFormat,
    ];

    pub fn label(self) -> &'static str {
        match self {
            SettingsField::Theme => "Theme",
            SettingsField::InsertPosition => "Add new tasks to",
            SettingsField::TimeFormat => "Clock",
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct UiState {
    pub current_tab: Tab,
    pub mode: Mode,
    pub selected_index: usize,
    pub list_state: ListState,
    /// Row index into the archive rows; always on a task row when any exist
    pub archive_index: usize,
    pub archive_list_state: ListState,
    /// 0 = Delete, 1 = Cancel
    pub confirm_selection: usize,
}

#[derive(Debug, Clone, Default)]
pub struct SettingsState {
    pub field_index: usize,
}

#[derive(Debug, Clone, Default)]
pub struct StatusState {
    pub message: Option<String>,
    pub message_time: Option<Instant>,
}

pub struct App {
    pub config: Config,
    pub config_path: PathBuf,
    pub database_path: PathBuf,
    store: TaskStore,

    pub active: ActiveList,
    pub archive: ArchiveList,

    pub ui: UiState,
    pub drag: Option<DragState>,
    pub editor: Option<EditorState>,
    pub settings: SettingsState,
    pub status: StatusState,
}

impl App {
    pub fn new(config: Config, config_path: PathBuf, database_path: PathBuf, store: TaskStore) -> Self {
        let active = ActiveList::new(store.clone());
        let archive = ArchiveList::new(store.clone());
        let mut app = Self {
            config,
            config_path,
            database_path,
            store,
            active,
            archive,
            ui: UiState::default(),
            drag: None,
            editor: None,
            settings: SettingsState::default(),
            status: StatusState::default(),
        };
        app.sync_list_state();
        app
    }

    /// Pull the latest snapshots from the store. Called once per event-loop tick.
    pub fn sync(&mut self) {
        let active_changed = self.active.sync();
        let archive_changed = self.archive.sync();

        if active_changed {
            if let Some(drag) = self.drag {
                let len = self.active.len();
                if drag.origin >= len || drag.current >= len {
                    self.drag = None;
                    self.ui.mode = Mode::View;
                    self.set_status_message("List changed, move cancelled".to_string());
                }
            }
        }
        if active_changed || archive_changed {
            self.clamp_selection();
        }
    }

    /// Flush pending writes before exit
    pub fn shutdown(&self) -> Result<(), StoreError> {
        self.store.flush()
    }

    pub fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }

    /// Active tasks in display order, reflecting an in-progress drag
    pub fn visible_tasks(&self) -> Vec<Task> {
        let tasks = self.active.tasks();
        match self.drag {
            Some(drag) => ordering::renumber_after_move(tasks, drag.origin, drag.current)
                .unwrap_or_else(|| tasks.to_vec()),
            None => tasks.to_vec(),
        }
    }

    pub fn archive_rows(&self) -> Vec<ArchiveRow> {
        self.archive.rows(self.today())
    }

    pub fn selected_archived_task(&self) -> Option<Task> {
        match self.archive_rows().into_iter().nth(self.ui.archive_index) {
            Some(ArchiveRow::Task(task)) => Some(task),
            _ => None,
        }
    }

    pub fn sync_list_state(&mut self) {
        self.ui.list_state.select(if self.active.is_empty() {
            None
        } else {
            Some(self.ui.selected_index)
        });
        let on_task = self.selected_archived_task().is_some();
        self.ui
            .archive_list_state
            .select(on_task.then_some(self.ui.archive_index));
    }

    /// Keep both selections inside their lists; archive selection skips headers
    pub fn clamp_selection(&mut self) {
        let len = self.active.len();
        if self.ui.selected_index >= len {
            self.ui.selected_index = len.saturating_sub(1);
        }

        let rows = self.archive_rows();
        let is_task = |i: usize| matches!(rows.get(i), Some(ArchiveRow::Task(_)));
        if !is_task(self.ui.archive_index) {
            let start = self.ui.archive_index.min(rows.len().saturating_sub(1));
            let below = (start..rows.len()).find(|&i| is_task(i));
            let above = (0..start).rev().find(|&i| is_task(i));
            self.ui.archive_index = below.or(above).unwrap_or(0);
        }
        self.sync_list_state();
    }

    pub fn move_selection_up(&mut self) {
        match self.ui.current_tab {
            Tab::Tasks => {
                self.ui.selected_index = self.ui.selected_index.saturating_sub(1);
            }
            Tab::Archive => {
                let rows = self.archive_rows();
                if let Some(i) = (0..self.ui.archive_index)
                    .rev()
                    .find(|&i| matches!(rows.get(i), Some(ArchiveRow::Task(_))))
                {
                    self.ui.archive_index = i;
                }
            }
        }
        self.sync_list_state();
    }

    pub fn move_selection_down(&mut self) {
        match self.ui.current_tab {
            Tab::Tasks => {
                if self.ui.selected_index + 1 < self.active.len() {
                    self.ui.selected_index += 1;
                }
            }
            Tab::Archive => {
                let rows = self.archive_rows();
                if let Some(i) = (self.ui.archive_index + 1..rows.len())
                    .find(|&i| matches!(rows.get(i), Some(ArchiveRow::Task(_))))
                {
                    self.ui.archive_index = i;
                }
            }
        }
        self.sync_list_state();
    }

    pub fn switch_tab(&mut self, new_tab: Tab) {
        if self.drag.is_some() {
            self.cancel_drag();
        }
        self.ui.current_tab = new_tab;
        self.ui.mode = Mode::View;
        self.clamp_selection();
    }

    pub fn set_status_message(&mut self, message: String) {
        self.status.message = Some(message);
        self.status.message_time = Some(Instant::now());
    }

    pub fn clear_status_message(&mut self) {
        self.status.message = None;
        self.status.message_time = None;
    }

    /// Check if status message should be auto-cleared (after 3 seconds)
    pub fn check_status_message_timeout(&mut self) {
        const STATUS_MESSAGE_TIMEOUT_SECS: u64 = 3;
        if let Some(time) = self.status.message_time {
            if time.elapsed().as_secs() >= STATUS_MESSAGE_TIMEOUT_SECS {
                self.clear_status_message();
            }
        }
    }

    // Main list

    pub fn toggle_selected(&mut self) {
        self.active.toggle_done(self.ui.selected_index);
    }

    pub fn archive_selected(&mut self) {
        if self.active.archive(self.ui.selected_index) {
            self.set_status_message("Task archived".to_string());
            self.clamp_selection();
        }
    }

    pub fn enter_create_mode(&mut self) {
        self.editor = Some(EditorState {
            target: EditorTarget::New,
            editor: Editor::new(),
            warning: None,
        });
        self.ui.mode = Mode::Editor;
    }

    pub fn enter_edit_mode(&mut self) {
        let index = self.ui.selected_index;
        let Some(task) = self.active.tasks().get(index) else {
            return;
        };
        let (id, editor) = (task.id, Editor::from_string(&task.text));
        let Some(id) = id else {
            self.set_status_message("Task is still being saved".to_string());
            return;
        };
        self.editor = Some(EditorState {
            target: EditorTarget::Edit(id),
            editor,
            warning: None,
        });
        self.ui.mode = Mode::Editor;
    }

    /// Save the editor contents. Blank input keeps the dialog open with a warning.
    pub fn save_editor(&mut self) {
        let Some(state) = self.editor.as_mut() else {
            return;
        };
        if state.editor.is_blank() {
            state.warning = Some(InputError::EmptyText.to_string());
            return;
        }
        let result = match state.target {
            EditorTarget::New => self
                .active
                .add_from_input(&state.editor.text(), self.config.insert_position)
                .map(|added| {
                    self.ui.selected_index = match self.config.insert_position {
                        InsertPosition::Top => 0,
                        InsertPosition::Bottom => self.active.len().saturating_sub(1),
                    };
                    Some(format!("Added {} task(s)", added))
                }),
            EditorTarget::Edit(id) => match self.active.index_of(id) {
                Some(index) => {
                    let text = state.editor.lines.join(" ");
                    self.active.edit_text(index, &text).map(|_| None)
                }
                None => Ok(Some("Task is no longer on the list".to_string())),
            },
        };

        match result {
            Ok(message) => {
                self.exit_editor();
                if let Some(message) = message {
                    self.set_status_message(message);
                }
                self.sync_list_state();
            }
            Err(e) => state.warning = Some(e.to_string()),
        }
    }

    pub fn exit_editor(&mut self) {
        self.editor = None;
        self.ui.mode = Mode::View;
    }

    pub fn start_drag(&mut self) {
        if self.ui.current_tab != Tab::Tasks || self.active.is_empty() {
            return;
        }
        let index = self.ui.selected_index;
        self.drag = Some(DragState {
            origin: index,
            current: index,
        });
        self.ui.mode = Mode::Drag;
    }

    pub fn drag_up(&mut self) {
        if let Some(drag) = self.drag.as_mut() {
            drag.current = drag.current.saturating_sub(1);
            self.ui.selected_index = drag.current;
            self.sync_list_state();
        }
    }

    pub fn drag_down(&mut self) {
        let len = self.active.len();
        if let Some(drag) = self.drag.as_mut() {
            if drag.current + 1 < len {
                drag.current += 1;
            }
            self.ui.selected_index = drag.current;
            self.sync_list_state();
        }
    }

    /// Commit the drag as one reorder
    pub fn drop_drag(&mut self) {
        if let Some(drag) = self.drag.take() {
            if drag.origin != drag.current {
                self.active.move_task(drag.origin, drag.current);
            }
            self.ui.selected_index = drag.current;
        }
        self.ui.mode = Mode::View;
        self.clamp_selection();
    }

    pub fn cancel_drag(&mut self) {
        if let Some(drag) = self.drag.take() {
            self.ui.selected_index = drag.origin;
        }
        self.ui.mode = Mode::View;
        self.clamp_selection();
    }

    /// Single-step reorder of the selected task
    pub fn move_selected_up(&mut self) {
        let index = self.ui.selected_index;
        if index > 0 && self.active.move_task(index, index - 1) {
            self.ui.selected_index = index - 1;
            self.sync_list_state();
        }
    }

    pub fn move_selected_down(&mut self) {
        let index = self.ui.selected_index;
        if index + 1 < self.active.len() && self.active.move_task(index, index + 1) {
            self.ui.selected_index = index + 1;
            self.sync_list_state();
        }
    }

    pub fn request_clear_all(&mut self) {
        if self.active.is_empty() {
            self.set_status_message("Nothing to clear".to_string());
            return;
        }
        self.ui.confirm_selection = 1;
        self.ui.mode = Mode::ConfirmClear;
    }

    pub fn confirm_clear_all(&mut self) {
        let count = self.active.len();
        self.active.clear_all();
        self.ui.mode = Mode::View;
        self.ui.selected_index = 0;
        self.sync_list_state();
        self.set_status_message(format!("Deleted {} task(s)", count));
    }

    pub fn cancel_clear_all(&mut self) {
        self.ui.mode = Mode::View;
    }

    // Archive

    pub fn restore_selected(&mut self) {
        let Some(selected) = self.selected_archived_task() else {
            return;
        };
        if let Some(task) = self.archive.take_for_restore(&selected) {
            self.active.restore(task, self.config.insert_position);
            self.set_status_message("Task returned to the list".to_string());
            self.clamp_selection();
        }
    }

    pub fn delete_selected_archived(&mut self) {
        let Some(task) = self.selected_archived_task() else {
            return;
        };
        self.archive.delete(&task);
        self.set_status_message("Task deleted".to_string());
        self.clamp_selection();
    }

    /// Add a fresh task with the same text, leaving the archived one in place
    pub fn copy_selected_archived(&mut self) {
        let Some(task) = self.selected_archived_task() else {
            return;
        };
        if self
            .active
            .add_from_input(&task.text, self.config.insert_position)
            .is_ok()
        {
            self.set_status_message("Copied to the list".to_string());
        }
    }

    pub fn enter_search_mode(&mut self) {
        self.archive.enter_search();
        self.ui.archive_index = 0;
        self.ui.mode = Mode::Search;
        self.sync_list_state();
    }

    /// Stop typing but keep the results
    pub fn finish_search_input(&mut self) {
        self.ui.mode = Mode::View;
        self.clamp_selection();
    }

    pub fn exit_search_mode(&mut self) {
        self.archive.exit_search();
        self.ui.archive_index = 0;
        self.ui.mode = Mode::View;
        self.sync_list_state();
    }

    pub fn is_searching(&self) -> bool {
        self.archive.mode() == ArchiveMode::Search
    }

    pub fn add_to_search(&mut self, ch: char) {
        let mut filter = self.archive.filter().to_string();
        filter.push(ch);
        self.archive.set_filter(&filter);
        self.ui.archive_index = 0;
    }

    pub fn remove_from_search(&mut self) {
        let mut filter = self.archive.filter().to_string();
        filter.pop();
        self.archive.set_filter(&filter);
        self.ui.archive_index = 0;
    }

    // Settings and help

    pub fn enter_settings_mode(&mut self) {
        self.settings.field_index = 0;
        self.ui.mode = Mode::Settings;
    }

    pub fn exit_settings_mode(&mut self) {
        self.ui.mode = Mode::View;
    }

    pub fn move_settings_up(&mut self) {
        self.settings.field_index = self.settings.field_index.saturating_sub(1);
    }

    pub fn move_settings_down(&mut self) {
        if self.settings.field_index + 1 < SettingsField::ALL.len() {
            self.settings.field_index += 1;
        }
    }

    pub fn selected_setting(&self) -> SettingsField {
        SettingsField::ALL[self.settings.field_index.min(SettingsField::ALL.len() - 1)]
    }

    /// Current value of a setting, for display
    pub fn setting_value(&self, field: SettingsField) -> &'static str {
        match field {
            SettingsField::Theme => self.config.theme.label(),
            SettingsField::InsertPosition => self.config.insert_position.label(),
            SettingsField::TimeFormat => self.config.time_format.label(),
        }
    }

    /// Step the selected setting to its next value and persist the config
    pub fn cycle_setting(&mut self, forward: bool) -> Result<(), ConfigError> {
        match self.selected_setting() {
            SettingsField::Theme => {
                let all = ThemeMode::ALL;
                let current = all.iter().position(|m| *m == self.config.theme).unwrap_or(0);
                let next = if forward {
                    (current + 1) % all.len()
                } else {
                    (current + all.len() - 1) % all.len()
                };
                self.config.theme = all[next];
            }
            SettingsField::InsertPosition => {
                self.config.insert_position = match self.config.insert_position {
                    InsertPosition::Top => InsertPosition::Bottom,
                    InsertPosition::Bottom => InsertPosition::Top,
                };
            }
            SettingsField::TimeFormat => {
                self.config.time_format = match self.config.time_format {
                    TimeFormat::H24 => TimeFormat::H12,
                    TimeFormat::H12 => TimeFormat::H24,
                };
            }
        }
        self.config.save_to(&self.config_path)
    }

    pub fn enter_help_mode(&mut self) {
        self.ui.mode = Mode::Help;
    }

    pub fn exit_help_mode(&mut self) {
        self.ui.mode = Mode::View;
    }

    /// Hints for the status bar in the current mode
    pub fn key_hints(&self) -> Vec<String> {
        let kb = &self.config.key_bindings;
        let key = |binding: &str| format_key_binding_for_display(binding);
        match (self.ui.mode, self.ui.current_tab) {
            (Mode::Drag, _) => vec![
                "j/k: Move".to_string(),
                "Enter: Drop".to_string(),
                "Esc: Cancel".to_string(),
            ],
            (Mode::Search, _) => vec![
                "Type to search".to_string(),
                "Enter: Browse results".to_string(),
                "Esc: Close search".to_string(),
            ],
            (Mode::View, Tab::Tasks) => vec![
                format!("{}: New", key(&kb.new)),
                format!("{}: Done", key(&kb.toggle_done)),
                format!("{}: Archive", key(&kb.archive)),
                format!("{}: Edit", key(&kb.edit)),
                format!("{}: Move", key(&kb.move_task)),
                format!("{}: Help", key(&kb.help)),
                format!("{}: Quit", key(&kb.quit)),
            ],
            (Mode::View, Tab::Archive) => vec![
                format!("{}: Restore", key(&kb.restore)),
                format!("{}: Copy", key(&kb.copy)),
                format!("{}: Delete", key(&kb.delete)),
                format!("{}: Search", key(&kb.search)),
                format!("{}: Help", key(&kb.help)),
                format!("{}: Quit", key(&kb.quit)),
            ],
            _ => Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::Database;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    struct Harness {
        app: App,
        store: TaskStore,
        _dir: TempDir,
    }

    impl Harness {
        fn new() -> Self {
            let dir = TempDir::new().unwrap();
            let store = TaskStore::open(Database::in_memory().unwrap()).unwrap();
            let mut config = Config::default();
            config.insert_position = InsertPosition::Bottom;
            let app = App::new(
                config,
                dir.path().join("config.toml"),
                dir.path().join("tasks.db"),
                store.clone(),
            );
            Self { app, store, _dir: dir }
        }

        fn settle(&mut self) {
            self.store.flush().unwrap();
            self.app.sync();
        }

        fn add(&mut self, text: &str) {
            self.app.enter_create_mode();
            for ch in text.chars() {
                self.app.editor.as_mut().unwrap().editor.insert_char(ch);
            }
            self.app.save_editor();
            self.settle();
        }

        fn texts(&self) -> Vec<String> {
            self.app.visible_tasks().into_iter().map(|t| t.text).collect()
        }
    }

    #[test]
    fn blank_editor_shows_warning_and_stays_open() {
        let mut h = Harness::new();
        h.app.enter_create_mode();
        h.app.save_editor();
        assert_eq!(h.app.ui.mode, Mode::Editor);
        assert_eq!(
            h.app.editor.as_ref().unwrap().warning.as_deref(),
            Some("Task text cannot be empty")
        );
    }

    #[test]
    fn blank_edit_keeps_dialog_open() {
        let mut h = Harness::new();
        h.add("keep me");
        h.app.ui.selected_index = 0;
        h.app.enter_edit_mode();
        h.app.editor.as_mut().unwrap().editor = Editor::from_string("  \n\t");
        h.app.save_editor();
        h.settle();
        assert_eq!(h.app.ui.mode, Mode::Editor);
        assert!(h.app.editor.as_ref().unwrap().warning.is_some());
        assert_eq!(h.texts(), vec!["keep me"]);
    }

    #[test]
    fn edit_follows_task_when_list_reorders() {
        let mut h = Harness::new();
        h.add("a\nb");
        h.app.ui.selected_index = 0;
        h.app.enter_edit_mode();

        // Another change lands while the dialog is open
        h.app.active.move_task(0, 1);
        h.settle();
        assert_eq!(h.texts(), vec!["b", "a"]);

        h.app.editor.as_mut().unwrap().editor = Editor::from_string("a edited");
        h.app.save_editor();
        h.settle();
        assert_eq!(h.texts(), vec!["b", "a edited"]);
    }

    #[test]
    fn edit_of_removed_task_changes_nothing() {
        let mut h = Harness::new();
        h.add("gone");
        h.app.ui.selected_index = 0;
        h.app.enter_edit_mode();

        // The slot the dialog was opened on now holds a different task
        h.store.remove_all_active();
        h.store.insert(Task::new("other".to_string(), 0));
        h.settle();

        h.app.editor.as_mut().unwrap().editor = Editor::from_string("rewritten");
        h.app.save_editor();
        h.settle();
        assert_eq!(h.app.ui.mode, Mode::View);
        assert_eq!(h.texts(), vec!["other"]);
        assert_eq!(h.app.status.message.as_deref(), Some("Task is no longer on the list"));
    }

    #[test]
    fn editor_adds_one_task_per_line() {
        let mut h = Harness::new();
        h.add("milk\nbread");
        assert_eq!(h.app.ui.mode, Mode::View);
        assert_eq!(h.texts(), vec!["milk", "bread"]);
        assert_eq!(h.app.status.message.as_deref(), Some("Added 2 task(s)"));
    }

    #[test]
    fn drag_previews_then_commits_on_drop() {
        let mut h = Harness::new();
        h.add("a\nb\nc");
        h.app.ui.selected_index = 0;
        h.app.start_drag();
        h.app.drag_down();
        h.app.drag_down();
        assert_eq!(h.texts(), vec!["b", "c", "a"]);
        // nothing persisted until the drop
        assert_eq!(
            h.app.active.tasks().iter().map(|t| t.text.as_str()).collect::<Vec<_>>(),
            vec!["a", "b", "c"]
        );

        h.app.drop_drag();
        h.settle();
        assert_eq!(h.texts(), vec!["b", "c", "a"]);
        assert_eq!(h.app.ui.selected_index, 2);
        assert_eq!(h.app.ui.mode, Mode::View);
    }

    #[test]
    fn cancelled_drag_leaves_order_alone() {
        let mut h = Harness::new();
        h.add("a\nb");
        h.app.start_drag();
        h.app.drag_down();
        h.app.cancel_drag();
        h.settle();
        assert_eq!(h.texts(), vec!["a", "b"]);
        assert_eq!(h.app.ui.selected_index, 0);
    }

    #[test]
    fn single_step_reorder() {
        let mut h = Harness::new();
        h.add("a\nb");
        h.app.ui.selected_index = 1;
        h.app.move_selected_up();
        h.settle();
        assert_eq!(h.texts(), vec!["b", "a"]);
        assert_eq!(h.app.ui.selected_index, 0);
    }

    #[test]
    fn archive_restore_and_selection_skip_headers() {
        let mut h = Harness::new();
        h.add("a\nb");
        h.app.ui.selected_index = 0;
        h.app.archive_selected();
        h.settle();
        assert_eq!(h.texts(), vec!["b"]);

        h.app.switch_tab(Tab::Archive);
        let selected = h.app.selected_archived_task().unwrap();
        assert_eq!(selected.text, "a");

        h.app.restore_selected();
        h.settle();
        assert_eq!(h.texts(), vec!["b", "a"]);
        assert!(h.app.selected_archived_task().is_none());
    }

    #[test]
    fn clear_all_requires_confirmation() {
        let mut h = Harness::new();
        h.add("a");
        h.app.request_clear_all();
        assert_eq!(h.app.ui.mode, Mode::ConfirmClear);
        h.app.cancel_clear_all();
        h.settle();
        assert_eq!(h.texts(), vec!["a"]);

        h.app.request_clear_all();
        h.app.confirm_clear_all();
        h.settle();
        assert!(h.texts().is_empty());
    }

    #[test]
    fn settings_are_saved_when_changed() {
        let mut h = Harness::new();
        h.app.enter_settings_mode();
        h.app.move_settings_down();
        h.app.cycle_setting(true).unwrap();
        assert_eq!(h.app.config.insert_position, InsertPosition::Top);

        let saved = Config::load_from(&h.app.config_path).unwrap();
        assert_eq!(saved.insert_position, InsertPosition::Top);
    }

    #[test]
    fn search_filters_archive() {
        let mut h = Harness::new();
        h.add("Buy milk\nWalk dog");
        h.app.archive_selected();
        h.app.archive_selected();
        h.settle();

        h.app.switch_tab(Tab::Archive);
        h.app.enter_search_mode();
        assert!(h.app.archive_rows().is_empty());
        for ch in "dog".chars() {
            h.app.add_to_search(ch);
        }
        h.settle();
        assert_eq!(h.app.selected_archived_task().unwrap().text, "Walk dog");

        h.app.exit_search_mode();
        h.settle();
        assert!(!h.app.is_searching());
        assert_eq!(h.app.archive.tasks().len(), 2);
    }
}
