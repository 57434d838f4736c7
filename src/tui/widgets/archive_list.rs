use chrono::{Local, NaiveDate};
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, List, ListItem, ListState, Paragraph, StatefulWidget};
use ratatui::Frame;

use crate::archive::{self, ArchiveRow};
use crate::config::TimeFormat;
use crate::tui::widgets::color::ThemeColors;
use crate::tui::widgets::task_list::render_scrollbar;

/// Search state passed to the archive view
pub struct ArchiveSearch<'a> {
    pub query: &'a str,
    /// True while keystrokes go to the query
    pub typing: bool,
}

/// Archive screen: today's date (or the search line) above the grouped rows
#[allow(clippy::too_many_arguments)]
pub fn render_archive_list(
    f: &mut Frame,
    area: Rect,
    rows: &[ArchiveRow],
    list_state: &mut ListState,
    today: NaiveDate,
    search: Option<ArchiveSearch>,
    time_format: TimeFormat,
    colors: &ThemeColors,
) {
    let outer = Block::default()
        .borders(Borders::ALL)
        .title("Archive")
        .style(Style::default().fg(colors.fg).bg(colors.bg));
    let inner = outer.inner(area);
    f.render_widget(outer, area);

    let parts = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Min(1)])
        .split(inner);

    let header = match &search {
        Some(search) => {
            let cursor = if search.typing { "▏" } else { "" };
            Line::from(vec![
                Span::styled("Search: ", Style::default().fg(colors.muted)),
                Span::styled(format!("{}{}", search.query, cursor), Style::default().fg(colors.fg)),
            ])
        }
        None => Line::from(vec![
            Span::styled(
                today.format("%-d").to_string(),
                Style::default().fg(colors.accent).add_modifier(Modifier::BOLD),
            ),
            Span::raw(" "),
            Span::styled(today.format("%B").to_string(), Style::default().fg(colors.fg)),
        ]),
    };
    f.render_widget(Paragraph::new(header), parts[0]);

    let list_area = parts[1];
    if rows.is_empty() {
        let hint = match &search {
            Some(s) if s.query.trim().is_empty() => "Type to search finished tasks",
            Some(_) => "No matching tasks",
            None => "Finished tasks you archive show up here",
        };
        f.render_widget(
            Paragraph::new(Span::styled(hint, Style::default().fg(colors.muted))).alignment(Alignment::Center),
            list_area,
        );
        return;
    }

    let local = Local;
    let items: Vec<ListItem> = rows
        .iter()
        .map(|row| match row {
            ArchiveRow::WeekHeader { label } => ListItem::new(Line::from(Span::styled(
                label.clone(),
                Style::default().fg(colors.accent).add_modifier(Modifier::BOLD),
            ))),
            ArchiveRow::DayHeader { label, .. } => ListItem::new(Line::from(Span::styled(
                format!(" {}", label),
                Style::default().fg(colors.muted).add_modifier(Modifier::ITALIC),
            ))),
            ArchiveRow::Task(task) => {
                let days = archive::days_to_finish(&local, task);
                ListItem::new(Line::from(vec![
                    Span::styled(
                        format!("   {:>8}  ", archive::finished_time(&local, task, time_format)),
                        Style::default().fg(colors.muted),
                    ),
                    Span::raw(task.text.clone()),
                    Span::styled(format!("  {}d", days), Style::default().fg(colors.accent)),
                ]))
            }
        })
        .collect();

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Min(1), Constraint::Length(1)])
        .split(list_area);

    let total_items = items.len();
    let list = List::new(items)
        .highlight_style(Style::default().fg(colors.highlight_fg).bg(colors.highlight_bg));
    StatefulWidget::render(list, columns[0], f.buffer_mut(), list_state);

    // The list has no border of its own; widen the area so the scrollbar spans it
    let framed = Rect::new(columns[0].x, columns[0].y.saturating_sub(1), columns[0].width, columns[0].height + 2);
    render_scrollbar(f, framed, columns[1], total_items, list_state.selected());
}
