use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::Style;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, StatefulWidget, Wrap};
use ratatui::Frame;

use crate::tui::app::SettingsField;
use crate::tui::widgets::color::ThemeColors;
use crate::tui::widgets::popup_area;
use crate::tui::App;

/// Settings as a modal popup: one row per setting, file locations below
pub fn render_settings_view_modal(f: &mut Frame, area: Rect, app: &App, colors: &ThemeColors) {
    let popup_area = popup_area(area, 70, 60);
    f.render_widget(Clear, popup_area);

    let style = Style::default().fg(colors.fg).bg(colors.bg);
    let outer_block = Block::default()
        .borders(Borders::ALL)
        .title("Settings")
        .title_alignment(Alignment::Center)
        .title_bottom(Line::from(Span::styled(
            " ←/→ change · Esc close ",
            Style::default().fg(colors.muted),
        )))
        .style(style);
    let inner_area = outer_block.inner(popup_area);
    f.render_widget(outer_block, popup_area);

    let sections = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(SettingsField::ALL.len() as u16 + 2),
            Constraint::Min(0),
        ])
        .split(inner_area);

    let label_width = SettingsField::ALL
        .iter()
        .map(|field| field.label().chars().count())
        .max()
        .unwrap_or(0);

    let items: Vec<ListItem> = SettingsField::ALL
        .iter()
        .map(|&field| {
            ListItem::new(Line::from(vec![
                Span::raw(format!("{:<width$}  ", field.label(), width = label_width)),
                Span::styled(format!("‹ {} ›", app.setting_value(field)), Style::default().fg(colors.accent)),
            ]))
        })
        .collect();

    let list = List::new(items)
        .block(Block::default().borders(Borders::ALL).title("Preferences"))
        .style(style)
        .highlight_style(Style::default().fg(colors.highlight_fg).bg(colors.highlight_bg));

    let mut list_state = ListState::default();
    list_state.select(Some(app.settings.field_index));
    StatefulWidget::render(list, sections[0], f.buffer_mut(), &mut list_state);

    let content = format!(
        "Config File:\n{}\n\nDatabase File:\n{}",
        app.config_path.display(),
        app.database_path.display()
    );
    let paragraph = Paragraph::new(content)
        .block(Block::default().borders(Borders::ALL).title("File Locations"))
        .style(style)
        .wrap(Wrap { trim: true });
    f.render_widget(paragraph, sections[1]);
}
