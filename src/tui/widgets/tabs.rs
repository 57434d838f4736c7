use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Tabs;
use ratatui::Frame;

use crate::tui::app::Tab;
use crate::tui::widgets::color::ThemeColors;

pub fn render_tabs(
    f: &mut Frame,
    area: Rect,
    current_tab: Tab,
    active_count: usize,
    archived_count: usize,
    colors: &ThemeColors,
) {
    let title = |name: &str, count: usize| {
        Line::from(vec![
            Span::raw("  "),
            Span::raw(format!("{} ({})", name, count)),
            Span::raw("  "),
        ])
    };
    let titles = vec![title("Tasks", active_count), title("Archive", archived_count)];

    let tab_index = match current_tab {
        Tab::Tasks => 0,
        Tab::Archive => 1,
    };

    let tabs = Tabs::new(titles)
        .select(tab_index)
        .style(Style::default().fg(colors.muted).bg(colors.bg))
        .highlight_style(
            Style::default()
                .fg(colors.highlight_fg)
                .bg(colors.highlight_bg)
                .add_modifier(Modifier::BOLD),
        )
        .divider("  ")
        .padding("", "");

    f.render_widget(tabs, area);
}
