use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::execute;
use crossterm::terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen, size as terminal_size};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;
use std::io;
use std::time::Duration;
use tracing::{error, info};

use crate::tui::app::{Mode, Tab};
use crate::tui::error::TuiError;
use crate::tui::widgets::confirm_clear::OPTIONS;
use crate::tui::{App, Layout};
use crate::utils::{has_primary_modifier, matches_key_event, parse_key_binding};

/// Guard that ensures terminal state is restored even on panic.
/// If the terminal is left in raw mode or the alternate screen, the
/// user's shell is unusable.
struct TerminalGuard {
    raw_mode_enabled: bool,
    alternate_screen_enabled: bool,
}

impl TerminalGuard {
    fn new() -> Result<Self, TuiError> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen)?;

        Ok(Self {
            raw_mode_enabled: true,
            alternate_screen_enabled: true,
        })
    }

    /// Restore terminal state on normal exit; drop becomes a no-op afterwards
    fn restore(&mut self) -> Result<(), TuiError> {
        if self.raw_mode_enabled {
            disable_raw_mode()?;
            self.raw_mode_enabled = false;
        }
        if self.alternate_screen_enabled {
            execute!(io::stdout(), LeaveAlternateScreen)?;
            self.alternate_screen_enabled = false;
        }
        Ok(())
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        // Errors are ignored here, we are already cleaning up
        if self.raw_mode_enabled {
            let _ = disable_raw_mode();
        }
        if self.alternate_screen_enabled {
            let _ = execute!(io::stdout(), LeaveAlternateScreen);
        }
    }
}

pub fn run_event_loop(mut app: App) -> Result<(), TuiError> {
    // Check the size before entering the alternate screen so the message stays visible
    let (width, height) = terminal_size()?;
    let min_width_with_border = Layout::MIN_WIDTH + 2;
    let min_height_with_border = Layout::MIN_HEIGHT + 2;

    if width < min_width_with_border || height < min_height_with_border {
        return Err(TuiError::RenderError(format!(
            "Terminal size too small. Current: {}x{}, Minimum required: {}x{}. Please resize your terminal window.",
            width, height, min_width_with_border, min_height_with_border
        )));
    }

    let mut guard = TerminalGuard::new()?;

    let backend = CrosstermBackend::new(io::stdout());
    let mut terminal = Terminal::new(backend)?;
    info!("tui started");

    loop {
        // Pick up whatever the store has published since the last frame
        app.sync();
        app.check_status_message_timeout();

        terminal.draw(|f| {
            let layout = Layout::calculate(f.area());
            crate::tui::render::render(f, &mut app, &layout);
        })?;

        // Only Press events; Windows also reports Release
        if event::poll(Duration::from_millis(16))? {
            match event::read()? {
                Event::Key(key_event) if key_event.kind == KeyEventKind::Press => {
                    if handle_key_event(&mut app, key_event)? {
                        break;
                    }
                }
                _ => {}
            }
        }
    }

    guard.restore()?;

    // Wait for queued writes before the process exits
    app.shutdown()?;
    info!("tui stopped");

    Ok(())
}

fn is_binding(key_event: &KeyEvent, binding: &str) -> Result<bool, TuiError> {
    let parsed = parse_key_binding(binding).map_err(TuiError::KeyBindingError)?;
    Ok(matches_key_event(key_event, &parsed))
}

/// Returns Ok(true) when the app should quit
pub fn handle_key_event(app: &mut App, key_event: KeyEvent) -> Result<bool, TuiError> {
    match app.ui.mode {
        Mode::Editor => handle_editor_mode(app, key_event),
        Mode::Drag => handle_drag_mode(app, key_event),
        Mode::Search => handle_search_mode(app, key_event),
        Mode::Settings => handle_settings_mode(app, key_event),
        Mode::Help => handle_help_mode(app, key_event),
        Mode::ConfirmClear => handle_confirm_clear_mode(app, key_event),
        Mode::View => {
            if let Some(quit) = handle_global_key_bindings(app, key_event)? {
                return Ok(quit);
            }
            match app.ui.current_tab {
                Tab::Tasks => handle_tasks_view(app, key_event),
                Tab::Archive => handle_archive_view(app, key_event),
            }
        }
    }
}

/// Bindings shared by both tabs. `Some` means the key was consumed.
fn handle_global_key_bindings(app: &mut App, key_event: KeyEvent) -> Result<Option<bool>, TuiError> {
    let kb = app.config.key_bindings.clone();

    if is_binding(&key_event, &kb.quit)? {
        return Ok(Some(true));
    }
    if is_binding(&key_event, &kb.tab_left)? {
        app.switch_tab(Tab::Tasks);
        return Ok(Some(false));
    }
    if is_binding(&key_event, &kb.tab_right)? {
        app.switch_tab(Tab::Archive);
        return Ok(Some(false));
    }
    if is_binding(&key_event, &kb.help)? {
        app.enter_help_mode();
        return Ok(Some(false));
    }
    if is_binding(&key_event, &kb.settings)? {
        app.enter_settings_mode();
        return Ok(Some(false));
    }
    Ok(None)
}

fn handle_tasks_view(app: &mut App, key_event: KeyEvent) -> Result<bool, TuiError> {
    let kb = app.config.key_bindings.clone();

    // Ctrl+Up/Down reorders in place, checked before plain navigation
    if has_primary_modifier(key_event.modifiers) {
        match key_event.code {
            KeyCode::Up => {
                app.move_selected_up();
                return Ok(false);
            }
            KeyCode::Down => {
                app.move_selected_down();
                return Ok(false);
            }
            _ => {}
        }
    }

    if key_event.code == KeyCode::Up || is_binding(&key_event, &kb.list_up)? {
        app.move_selection_up();
    } else if key_event.code == KeyCode::Down || is_binding(&key_event, &kb.list_down)? {
        app.move_selection_down();
    } else if is_binding(&key_event, &kb.new)? {
        app.enter_create_mode();
    } else if is_binding(&key_event, &kb.edit)? || key_event.code == KeyCode::Enter {
        app.enter_edit_mode();
    } else if is_binding(&key_event, &kb.toggle_done)? {
        app.toggle_selected();
    } else if is_binding(&key_event, &kb.archive)? {
        app.archive_selected();
    } else if is_binding(&key_event, &kb.move_task)? {
        app.start_drag();
    } else if is_binding(&key_event, &kb.clear_all)? {
        app.request_clear_all();
    } else if key_event.code == KeyCode::Esc {
        app.clear_status_message();
    }
    Ok(false)
}

fn handle_archive_view(app: &mut App, key_event: KeyEvent) -> Result<bool, TuiError> {
    let kb = app.config.key_bindings.clone();

    if key_event.code == KeyCode::Up || is_binding(&key_event, &kb.list_up)? {
        app.move_selection_up();
    } else if key_event.code == KeyCode::Down || is_binding(&key_event, &kb.list_down)? {
        app.move_selection_down();
    } else if is_binding(&key_event, &kb.restore)? {
        app.restore_selected();
    } else if is_binding(&key_event, &kb.copy)? {
        app.copy_selected_archived();
    } else if is_binding(&key_event, &kb.delete)? {
        app.delete_selected_archived();
    } else if is_binding(&key_event, &kb.search)? {
        app.enter_search_mode();
    } else if key_event.code == KeyCode::Esc {
        if app.is_searching() {
            app.exit_search_mode();
        } else {
            app.switch_tab(Tab::Tasks);
        }
    }
    Ok(false)
}

fn handle_editor_mode(app: &mut App, key_event: KeyEvent) -> Result<bool, TuiError> {
    if is_binding(&key_event, &app.config.key_bindings.save)? {
        app.save_editor();
        return Ok(false);
    }

    if key_event.code == KeyCode::Esc {
        app.exit_editor();
        return Ok(false);
    }

    let Some(state) = app.editor.as_mut() else {
        app.ui.mode = Mode::View;
        return Ok(false);
    };
    let editor = &mut state.editor;

    match key_event.code {
        KeyCode::Enter => editor.insert_newline(),
        KeyCode::Backspace => editor.delete_char(),
        KeyCode::Left => editor.move_cursor_left(),
        KeyCode::Right => editor.move_cursor_right(),
        KeyCode::Up => editor.move_cursor_up(),
        KeyCode::Down => editor.move_cursor_down(),
        KeyCode::Home => editor.move_cursor_home(),
        KeyCode::End => editor.move_cursor_end(),
        KeyCode::Tab => editor.insert_char(' '),
        KeyCode::Char(c) if !key_event.modifiers.contains(KeyModifiers::CONTROL) => {
            editor.insert_char(c);
            // Typing clears a stale "empty text" warning
            state.warning = None;
        }
        _ => {}
    }
    Ok(false)
}

fn handle_drag_mode(app: &mut App, key_event: KeyEvent) -> Result<bool, TuiError> {
    let kb = app.config.key_bindings.clone();

    if key_event.code == KeyCode::Up || is_binding(&key_event, &kb.list_up)? {
        app.drag_up();
    } else if key_event.code == KeyCode::Down || is_binding(&key_event, &kb.list_down)? {
        app.drag_down();
    } else if key_event.code == KeyCode::Enter || is_binding(&key_event, &kb.move_task)? {
        app.drop_drag();
    } else if key_event.code == KeyCode::Esc {
        app.cancel_drag();
    }
    Ok(false)
}

fn handle_search_mode(app: &mut App, key_event: KeyEvent) -> Result<bool, TuiError> {
    match key_event.code {
        KeyCode::Esc => app.exit_search_mode(),
        KeyCode::Enter => app.finish_search_input(),
        KeyCode::Backspace => app.remove_from_search(),
        KeyCode::Up => app.move_selection_up(),
        KeyCode::Down => app.move_selection_down(),
        KeyCode::Char(c) if !key_event.modifiers.contains(KeyModifiers::CONTROL) => app.add_to_search(c),
        _ => {}
    }
    Ok(false)
}

fn handle_settings_mode(app: &mut App, key_event: KeyEvent) -> Result<bool, TuiError> {
    if is_binding(&key_event, &app.config.key_bindings.settings)? {
        app.exit_settings_mode();
        return Ok(false);
    }

    let forward = match key_event.code {
        KeyCode::Esc | KeyCode::Char('q') => {
            app.exit_settings_mode();
            return Ok(false);
        }
        KeyCode::Up | KeyCode::Char('k') => {
            app.move_settings_up();
            return Ok(false);
        }
        KeyCode::Down | KeyCode::Char('j') => {
            app.move_settings_down();
            return Ok(false);
        }
        KeyCode::Left | KeyCode::Char('h') => false,
        KeyCode::Right | KeyCode::Char('l') | KeyCode::Enter | KeyCode::Char(' ') => true,
        _ => return Ok(false),
    };

    if let Err(e) = app.cycle_setting(forward) {
        error!(error = %e, "failed to save config");
        app.set_status_message(format!("Failed to save settings: {}", e));
    }
    Ok(false)
}

fn handle_help_mode(app: &mut App, key_event: KeyEvent) -> Result<bool, TuiError> {
    if key_event.code == KeyCode::Esc
        || key_event.code == KeyCode::Char('q')
        || is_binding(&key_event, &app.config.key_bindings.help)?
    {
        app.exit_help_mode();
    }
    Ok(false)
}

fn handle_confirm_clear_mode(app: &mut App, key_event: KeyEvent) -> Result<bool, TuiError> {
    match key_event.code {
        KeyCode::Left | KeyCode::Right | KeyCode::Up | KeyCode::Down | KeyCode::Tab => {
            app.ui.confirm_selection = (app.ui.confirm_selection + 1) % OPTIONS.len();
        }
        KeyCode::Enter => {
            if app.ui.confirm_selection == 0 {
                app.confirm_clear_all();
            } else {
                app.cancel_clear_all();
            }
        }
        KeyCode::Char('y') => app.confirm_clear_all(),
        KeyCode::Esc | KeyCode::Char('n') => app.cancel_clear_all(),
        _ => {}
    }
    Ok(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::database::Database;
    use crate::models::InsertPosition;
    use crate::store::TaskStore;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn ctrl(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::CONTROL)
    }

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

        fn key(&mut self, event: KeyEvent) -> bool {
            let quit = handle_key_event(&mut self.app, event).unwrap();
            self.store.flush().unwrap();
            self.app.sync();
            quit
        }

        fn type_text(&mut self, text: &str) {
            for ch in text.chars() {
                self.key(press(KeyCode::Char(ch)));
            }
        }

        fn texts(&self) -> Vec<String> {
            self.app.active.tasks().iter().map(|t| t.text.clone()).collect()
        }
    }

    #[test]
    fn typing_and_saving_adds_tasks() {
        let mut h = Harness::new();
        h.key(press(KeyCode::Char('n')));
        assert_eq!(h.app.ui.mode, Mode::Editor);

        h.type_text("milk");
        h.key(press(KeyCode::Enter));
        h.type_text("eggs");
        h.key(ctrl(KeyCode::Char('s')));

        assert_eq!(h.app.ui.mode, Mode::View);
        assert_eq!(h.texts(), vec!["milk", "eggs"]);
    }

    #[test]
    fn quit_key_in_editor_is_text() {
        let mut h = Harness::new();
        h.key(press(KeyCode::Char('n')));
        assert!(!h.key(press(KeyCode::Char('q'))));
        assert_eq!(h.app.editor.as_ref().unwrap().editor.text(), "q");
    }

    #[test]
    fn saving_blank_keeps_editor_open() {
        let mut h = Harness::new();
        h.key(press(KeyCode::Char('n')));
        h.key(ctrl(KeyCode::Char('s')));
        assert_eq!(h.app.ui.mode, Mode::Editor);
        assert!(h.app.editor.as_ref().unwrap().warning.is_some());

        h.key(press(KeyCode::Esc));
        assert_eq!(h.app.ui.mode, Mode::View);
        assert!(h.texts().is_empty());
    }

    #[test]
    fn space_toggles_and_a_archives() {
        let mut h = Harness::new();
        h.key(press(KeyCode::Char('n')));
        h.type_text("read");
        h.key(ctrl(KeyCode::Char('s')));

        h.key(press(KeyCode::Char(' ')));
        assert!(h.app.active.tasks()[0].is_done);

        h.key(press(KeyCode::Char('a')));
        assert!(h.texts().is_empty());
        assert_eq!(h.app.archive.tasks().len(), 1);
    }

    #[test]
    fn drag_and_drop_reorders() {
        let mut h = Harness::new();
        h.key(press(KeyCode::Char('n')));
        h.type_text("a");
        h.key(press(KeyCode::Enter));
        h.type_text("b");
        h.key(press(KeyCode::Enter));
        h.type_text("c");
        h.key(ctrl(KeyCode::Char('s')));

        h.app.ui.selected_index = 0;
        h.key(press(KeyCode::Char('m')));
        assert_eq!(h.app.ui.mode, Mode::Drag);
        h.key(press(KeyCode::Char('j')));
        h.key(press(KeyCode::Char('j')));
        h.key(press(KeyCode::Enter));

        assert_eq!(h.app.ui.mode, Mode::View);
        assert_eq!(h.texts(), vec!["b", "c", "a"]);
    }

    #[test]
    fn ctrl_arrow_moves_one_step() {
        let mut h = Harness::new();
        h.key(press(KeyCode::Char('n')));
        h.type_text("a");
        h.key(press(KeyCode::Enter));
        h.type_text("b");
        h.key(ctrl(KeyCode::Char('s')));

        h.app.ui.selected_index = 0;
        h.key(ctrl(KeyCode::Down));
        assert_eq!(h.texts(), vec!["b", "a"]);
        assert_eq!(h.app.ui.selected_index, 1);
    }

    #[test]
    fn clear_all_defaults_to_cancel() {
        let mut h = Harness::new();
        h.key(press(KeyCode::Char('n')));
        h.type_text("x");
        h.key(ctrl(KeyCode::Char('s')));

        h.key(press(KeyCode::Char('X')));
        assert_eq!(h.app.ui.mode, Mode::ConfirmClear);
        h.key(press(KeyCode::Enter));
        assert_eq!(h.texts(), vec!["x"]);

        h.key(press(KeyCode::Char('X')));
        h.key(press(KeyCode::Left));
        h.key(press(KeyCode::Enter));
        assert!(h.texts().is_empty());
    }

    #[test]
    fn tabs_switch_and_esc_returns_from_archive() {
        let mut h = Harness::new();
        h.key(press(KeyCode::Right));
        assert_eq!(h.app.ui.current_tab, Tab::Archive);
        h.key(press(KeyCode::Esc));
        assert_eq!(h.app.ui.current_tab, Tab::Tasks);
    }

    #[test]
    fn search_typing_then_escape() {
        let mut h = Harness::new();
        h.key(press(KeyCode::Right));
        h.key(press(KeyCode::Char('/')));
        assert_eq!(h.app.ui.mode, Mode::Search);

        // q is text while typing a search
        assert!(!h.key(press(KeyCode::Char('q'))));
        assert_eq!(h.app.archive.filter(), "q");

        h.key(press(KeyCode::Esc));
        assert_eq!(h.app.ui.mode, Mode::View);
        assert!(!h.app.is_searching());
    }

    #[test]
    fn help_opens_and_closes() {
        let mut h = Harness::new();
        h.key(press(KeyCode::F(1)));
        assert_eq!(h.app.ui.mode, Mode::Help);
        h.key(press(KeyCode::Esc));
        assert_eq!(h.app.ui.mode, Mode::View);
    }

    #[test]
    fn quit_from_view() {
        let mut h = Harness::new();
        assert!(h.key(press(KeyCode::Char('q'))));
    }

    #[test]
    fn bad_binding_is_reported() {
        let mut h = Harness::new();
        h.app.config.key_bindings.quit = "Ctrl+".to_string();
        let result = handle_key_event(&mut h.app, press(KeyCode::Char('z')));
        assert!(matches!(result, Err(TuiError::KeyBindingError(_))));
    }
}
