use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{
    Block, Borders, List, ListItem, ListState, Paragraph, Scrollbar, ScrollbarOrientation,
    ScrollbarState, StatefulWidget,
};
use ratatui::Frame;

use crate::models::Task;
use crate::tui::app::DragState;
use crate::tui::widgets::color::ThemeColors;

/// Main list. Done tasks are struck through; a dragged task is marked until dropped.
pub fn render_task_list(
    f: &mut Frame,
    area: Rect,
    tasks: &[Task],
    list_state: &mut ListState,
    drag: Option<DragState>,
    empty_hint: &str,
    colors: &ThemeColors,
) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title(format!("Tasks ({})", tasks.len()))
        .style(Style::default().fg(colors.fg).bg(colors.bg));

    if tasks.is_empty() {
        let placeholder = Paragraph::new(Line::from(Span::styled(
            empty_hint.to_string(),
            Style::default().fg(colors.muted),
        )))
        .block(block)
        .alignment(ratatui::layout::Alignment::Center);
        f.render_widget(placeholder, area);
        return;
    }

    // 2 for borders, 2 for the marker
    let max_width = area.width.saturating_sub(5) as usize;
    let dragged_index = drag.map(|d| d.current);

    let items: Vec<ListItem> = tasks
        .iter()
        .enumerate()
        .map(|(index, task)| {
            let is_dragged = dragged_index == Some(index);
            let marker = if is_dragged {
                "≡"
            } else if task.is_done {
                "✓"
            } else {
                "○"
            };

            let mut text = task.text.clone();
            if text.chars().count() > max_width {
                text = text.chars().take(max_width.saturating_sub(3)).collect::<String>() + "...";
            }

            let mut text_style = Style::default();
            if task.is_done {
                text_style = text_style.fg(colors.muted).add_modifier(Modifier::CROSSED_OUT);
            }
            if is_dragged {
                text_style = text_style.fg(colors.accent).add_modifier(Modifier::BOLD);
            }

            ListItem::new(Line::from(vec![
                Span::raw(format!("{} ", marker)),
                Span::styled(text, text_style),
            ]))
        })
        .collect();

    let list_areas = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Min(1), Constraint::Length(1)])
        .split(area);
    let list_area = list_areas[0];
    let scrollbar_area = list_areas[1];

    let total_items = items.len();
    let list = List::new(items)
        .block(block)
        .highlight_style(Style::default().fg(colors.highlight_fg).bg(colors.highlight_bg));

    StatefulWidget::render(list, list_area, f.buffer_mut(), list_state);

    render_scrollbar(f, list_area, scrollbar_area, total_items, list_state.selected());
}

/// Vertical scrollbar beside a bordered list, shown only when the list overflows
pub fn render_scrollbar(
    f: &mut Frame,
    list_area: Rect,
    scrollbar_area: Rect,
    total_items: usize,
    selected: Option<usize>,
) {
    let visible_items = list_area.height.saturating_sub(2) as usize;
    if total_items <= visible_items || scrollbar_area.width == 0 || list_area.height <= 2 {
        return;
    }

    let scrollbar_inner_area = Rect::new(
        scrollbar_area.x,
        list_area.y + 1,
        scrollbar_area.width,
        list_area.height.saturating_sub(2),
    );

    let selected_index = selected.unwrap_or(0);
    let scroll_position = selected_index.saturating_sub(visible_items.saturating_sub(1));

    let mut scrollbar_state = ScrollbarState::new(total_items)
        .viewport_content_length(visible_items)
        .position(scroll_position);

    let scrollbar = Scrollbar::default()
        .orientation(ScrollbarOrientation::VerticalRight)
        .begin_symbol(Some("↑"))
        .end_symbol(Some("↓"))
        .track_symbol(Some("│"))
        .thumb_symbol("█");

    f.render_stateful_widget(scrollbar, scrollbar_inner_area, &mut scrollbar_state);
}
