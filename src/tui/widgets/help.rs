use ratatui::layout::{Alignment, Rect};
use ratatui::style::Style;
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};
use ratatui::Frame;

use crate::config::KeyBindings;
use crate::tui::widgets::color::ThemeColors;
use crate::tui::widgets::popup_area;
use crate::utils::format_key_binding_for_display as key;

pub fn render_help(f: &mut Frame, area: Rect, bindings: &KeyBindings, colors: &ThemeColors) {
    let popup_area = popup_area(area, 60, 80);
    f.render_widget(Clear, popup_area);

    let style = Style::default().fg(colors.fg).bg(colors.bg);
    let paragraph = Paragraph::new(build_help_text(bindings))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title("Help - Key Bindings")
                .title_alignment(Alignment::Center)
                .style(style),
        )
        .style(style)
        .wrap(Wrap { trim: false });

    f.render_widget(paragraph, popup_area);
}

fn build_help_text(kb: &KeyBindings) -> String {
    let mut text = String::new();

    text.push_str("Navigation:\n");
    text.push_str(&format!("  {} / {}: Switch tabs\n", key(&kb.tab_left), key(&kb.tab_right)));
    text.push_str(&format!("  {} / {}: Move selection\n", key(&kb.list_up), key(&kb.list_down)));
    text.push('\n');

    text.push_str("Tasks:\n");
    text.push_str(&format!("  {}: Add tasks (one per line)\n", key(&kb.new)));
    text.push_str(&format!("  {}: Mark done / not done\n", key(&kb.toggle_done)));
    text.push_str(&format!("  {}: Move to archive\n", key(&kb.archive)));
    text.push_str(&format!("  {}: Edit text\n", key(&kb.edit)));
    text.push_str(&format!(
        "  {}: Pick up, then {} / {} and Enter to drop\n",
        key(&kb.move_task),
        key(&kb.list_up),
        key(&kb.list_down)
    ));
    text.push_str(&format!("  {} / {}: Move one step\n", key("Ctrl+Up"), key("Ctrl+Down")));
    text.push_str(&format!("  {}: Delete every task on the list\n", key(&kb.clear_all)));
    text.push('\n');

    text.push_str("Archive:\n");
    text.push_str(&format!("  {}: Return to the list\n", key(&kb.restore)));
    text.push_str(&format!("  {}: Copy to the list\n", key(&kb.copy)));
    text.push_str(&format!("  {}: Delete permanently\n", key(&kb.delete)));
    text.push_str(&format!("  {}: Search, Esc to close\n", key(&kb.search)));
    text.push('\n');

    text.push_str("Editor:\n");
    text.push_str(&format!("  {}: Save\n", key(&kb.save)));
    text.push_str("  Enter: New line\n");
    text.push_str("  Esc: Cancel\n");
    text.push('\n');

    text.push_str("General:\n");
    text.push_str(&format!("  {}: Settings\n", key(&kb.settings)));
    text.push_str(&format!("  {}: Show/hide help\n", key(&kb.help)));
    text.push_str(&format!("  {}: Quit\n", key(&kb.quit)));

    text
}
