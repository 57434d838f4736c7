use ratatui::layout::Alignment;
use ratatui::style::Style;
use ratatui::widgets::{Block, Borders};
use ratatui::Frame;

use crate::tui::app::{EditorTarget, Mode, Tab};
use crate::tui::widgets::{
    archive_list::{render_archive_list, ArchiveSearch},
    color::ThemeColors,
    confirm_clear::render_confirm_clear,
    editor::render_editor_dialog,
    help::render_help,
    settings_view::render_settings_view_modal,
    status_bar::render_status_bar,
    tabs::render_tabs,
    task_list::render_task_list,
};
use crate::tui::{App, Layout};
use crate::utils::format_key_binding_for_display;

pub fn render(f: &mut Frame, app: &mut App, layout: &Layout) {
    let colors = ThemeColors::from_theme(&app.config.get_active_theme());

    let outer_block = Block::default()
        .borders(Borders::ALL)
        .title("doneward")
        .title_alignment(Alignment::Center)
        .style(Style::default().fg(colors.fg).bg(colors.bg));
    f.render_widget(outer_block, f.area());

    render_tabs(
        f,
        layout.tabs_area,
        app.ui.current_tab,
        app.active.len(),
        app.archive.tasks().len(),
        &colors,
    );

    match app.ui.current_tab {
        Tab::Tasks => {
            let tasks = app.visible_tasks();
            let hint = format!(
                "Nothing to do. Press {} to add a task.",
                format_key_binding_for_display(&app.config.key_bindings.new)
            );
            render_task_list(
                f,
                layout.main_area,
                &tasks,
                &mut app.ui.list_state,
                app.drag,
                &hint,
                &colors,
            );
        }
        Tab::Archive => {
            let rows = app.archive_rows();
            let search = app.is_searching().then(|| ArchiveSearch {
                query: app.archive.filter(),
                typing: app.ui.mode == Mode::Search,
            });
            let today = app.today();
            render_archive_list(
                f,
                layout.main_area,
                &rows,
                &mut app.ui.archive_list_state,
                today,
                search,
                app.config.time_format,
                &colors,
            );
        }
    }

    let hints = app.key_hints();
    render_status_bar(f, layout.status_area, app.status.message.as_deref(), &hints, &colors);

    // Overlays go last so they sit on top of the list
    match app.ui.mode {
        Mode::Editor => {
            let save_hint = format_key_binding_for_display(&app.config.key_bindings.save);
            if let Some(state) = app.editor.as_mut() {
                let title = match state.target {
                    EditorTarget::New => "New tasks",
                    EditorTarget::Edit(_) => "Edit task",
                };
                render_editor_dialog(
                    f,
                    layout.inner_area,
                    &mut state.editor,
                    title,
                    state.warning.as_deref(),
                    &save_hint,
                    &colors,
                );
            }
        }
        Mode::Help => render_help(f, layout.inner_area, &app.config.key_bindings, &colors),
        Mode::Settings => render_settings_view_modal(f, layout.inner_area, app, &colors),
        Mode::ConfirmClear => render_confirm_clear(
            f,
            layout.inner_area,
            app.active.len(),
            app.ui.confirm_selection,
            &colors,
        ),
        Mode::View | Mode::Drag | Mode::Search => {}
    }
}
