use ratatui::layout::{Alignment, Rect};
use ratatui::style::Style;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};
use ratatui::Frame;

use crate::tui::widgets::color::ThemeColors;
use crate::tui::widgets::popup_area;

pub const OPTIONS: [&str; 2] = ["Delete", "Cancel"];

/// Confirmation before permanently deleting every active task
pub fn render_confirm_clear(f: &mut Frame, area: Rect, count: usize, selection: usize, colors: &ThemeColors) {
    let popup_area = popup_area(area, 50, 35);
    f.render_widget(Clear, popup_area);

    let normal = Style::default().fg(colors.fg).bg(colors.bg);
    let mut lines = vec![
        Line::from(Span::styled(format!("Delete all {} task(s) on the list?", count), normal)),
        Line::from(Span::styled("Archived tasks are kept.", Style::default().fg(colors.muted))),
        Line::from(""),
    ];

    for (index, option) in OPTIONS.iter().enumerate() {
        let is_selected = index == selection;
        let prefix = if is_selected { "> " } else { "  " };
        let style = if is_selected {
            Style::default().fg(colors.highlight_fg).bg(colors.highlight_bg)
        } else {
            normal
        };
        lines.push(Line::from(Span::styled(format!("{}{}", prefix, option), style)));
    }

    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        "Use ↑↓ to choose, Enter to confirm, Esc to cancel",
        Style::default().fg(colors.muted),
    )));

    let paragraph = Paragraph::new(lines)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title("Clear List")
                .title_alignment(Alignment::Center)
                .style(normal),
        )
        .style(normal)
        .wrap(Wrap { trim: true })
        .alignment(Alignment::Center);

    f.render_widget(paragraph, popup_area);
}
