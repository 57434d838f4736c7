use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};
use std::cmp;

use crate::tui::widgets::color::ThemeColors;

/// Multi-line text buffer used by the add and edit dialogs.
/// Columns count chars, not bytes.
#[derive(Debug, Clone)]
pub struct Editor {
    pub lines: Vec<String>,
    pub cursor_line: usize,
    pub cursor_col: usize,
    pub scroll_offset: usize,
}

impl Default for Editor {
    fn default() -> Self {
        Self::new()
    }
}

impl Editor {
    pub fn new() -> Self {
        Self {
            lines: vec![String::new()],
            cursor_line: 0,
            cursor_col: 0,
            scroll_offset: 0,
        }
    }

    /// Buffer holding `content` with the cursor at its end
    pub fn from_string(content: &str) -> Self {
        let mut lines: Vec<String> = content.lines().map(str::to_string).collect();
        if lines.is_empty() {
            lines.push(String::new());
        }
        let cursor_line = lines.len() - 1;
        let cursor_col = lines[cursor_line].chars().count();
        Self {
            lines,
            cursor_line,
            cursor_col,
            scroll_offset: 0,
        }
    }

    pub fn text(&self) -> String {
        self.lines.join("\n")
    }

    pub fn is_blank(&self) -> bool {
        self.lines.iter().all(|line| line.trim().is_empty())
    }

    fn line_len(&self, line: usize) -> usize {
        self.lines.get(line).map(|l| l.chars().count()).unwrap_or(0)
    }

    fn byte_index(line: &str, col: usize) -> usize {
        line.char_indices().nth(col).map(|(i, _)| i).unwrap_or(line.len())
    }

    pub fn insert_char(&mut self, ch: char) {
        if ch == '\n' {
            self.insert_newline();
            return;
        }
        let col = cmp::min(self.cursor_col, self.line_len(self.cursor_line));
        if let Some(line) = self.lines.get_mut(self.cursor_line) {
            let at = Self::byte_index(line, col);
            line.insert(at, ch);
            self.cursor_col = col + 1;
        }
    }

    /// Backspace: remove the char before the cursor, joining lines at column 0
    pub fn delete_char(&mut self) {
        let col = cmp::min(self.cursor_col, self.line_len(self.cursor_line));
        if col > 0 {
            if let Some(line) = self.lines.get_mut(self.cursor_line) {
                let at = Self::byte_index(line, col - 1);
                line.remove(at);
                self.cursor_col = col - 1;
            }
        } else if self.cursor_line > 0 && self.cursor_line < self.lines.len() {
            let current = self.lines.remove(self.cursor_line);
            self.cursor_line -= 1;
            self.cursor_col = self.line_len(self.cursor_line);
            self.lines[self.cursor_line].push_str(&current);
        }
    }

    pub fn insert_newline(&mut self) {
        let col = cmp::min(self.cursor_col, self.line_len(self.cursor_line));
        let Some(line) = self.lines.get_mut(self.cursor_line) else {
            return;
        };
        let at = Self::byte_index(line, col);
        let remainder = line.split_off(at);
        self.lines.insert(self.cursor_line + 1, remainder);
        self.cursor_line += 1;
        self.cursor_col = 0;
    }

    pub fn move_cursor_up(&mut self) {
        if self.cursor_line > 0 {
            self.cursor_line -= 1;
            self.cursor_col = cmp::min(self.cursor_col, self.line_len(self.cursor_line));
        }
    }

    pub fn move_cursor_down(&mut self) {
        if self.cursor_line + 1 < self.lines.len() {
            self.cursor_line += 1;
            self.cursor_col = cmp::min(self.cursor_col, self.line_len(self.cursor_line));
        }
    }

    pub fn move_cursor_left(&mut self) {
        if self.cursor_col > 0 {
            self.cursor_col -= 1;
        } else if self.cursor_line > 0 {
            self.cursor_line -= 1;
            self.cursor_col = self.line_len(self.cursor_line);
        }
    }

    pub fn move_cursor_right(&mut self) {
        if self.cursor_col < self.line_len(self.cursor_line) {
            self.cursor_col += 1;
        } else if self.cursor_line + 1 < self.lines.len() {
            self.cursor_line += 1;
            self.cursor_col = 0;
        }
    }

    pub fn move_cursor_home(&mut self) {
        self.cursor_col = 0;
    }

    pub fn move_cursor_end(&mut self) {
        self.cursor_col = self.line_len(self.cursor_line);
    }

    pub fn update_scroll(&mut self, viewport_height: usize) {
        let viewport_height = viewport_height.max(1);
        if self.cursor_line < self.scroll_offset {
            self.scroll_offset = self.cursor_line;
        } else if self.cursor_line >= self.scroll_offset + viewport_height {
            self.scroll_offset = self.cursor_line + 1 - viewport_height;
        }
    }

    /// Cursor position inside a bordered `area`, if visible
    pub fn get_cursor_screen_pos(&self, area: Rect) -> Option<(u16, u16)> {
        let inner_height = area.height.saturating_sub(2) as usize;
        let inner_width = area.width.saturating_sub(2) as usize;
        if self.cursor_line < self.scroll_offset || self.cursor_line >= self.scroll_offset + inner_height {
            return None;
        }
        let col = cmp::min(self.cursor_col, self.line_len(self.cursor_line));
        if col >= inner_width {
            return None;
        }
        Some((
            area.x + 1 + col as u16,
            area.y + 1 + (self.cursor_line - self.scroll_offset) as u16,
        ))
    }
}

/// Draw the add/edit dialog centered in `area`
pub fn render_editor_dialog(
    f: &mut Frame,
    area: Rect,
    editor: &mut Editor,
    title: &str,
    warning: Option<&str>,
    save_hint: &str,
    colors: &ThemeColors,
) {
    let width = area.width.saturating_sub(8).clamp(20, 70).min(area.width);
    let height = area.height.saturating_sub(4).clamp(5, 12).min(area.height);
    let popup = Rect::new(
        area.x + (area.width.saturating_sub(width)) / 2,
        area.y + (area.height.saturating_sub(height)) / 2,
        width,
        height,
    );
    f.render_widget(Clear, popup);

    let footer = match warning {
        Some(text) => Line::from(Span::styled(
            format!(" {} ", text),
            Style::default().fg(colors.accent).add_modifier(Modifier::BOLD),
        )),
        None => Line::from(Span::styled(
            format!(" {} save · Esc cancel ", save_hint),
            Style::default().fg(colors.muted),
        )),
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .title(format!(" {} ", title))
        .title_bottom(footer)
        .style(Style::default().fg(colors.fg).bg(colors.bg));

    let inner_height = popup.height.saturating_sub(2) as usize;
    editor.update_scroll(inner_height);

    let visible: Vec<Line> = editor
        .lines
        .iter()
        .skip(editor.scroll_offset)
        .take(inner_height)
        .map(|line| Line::from(line.as_str()))
        .collect();

    f.render_widget(Paragraph::new(visible).block(block), popup);

    if let Some((x, y)) = editor.get_cursor_screen_pos(popup) {
        f.set_cursor_position((x, y));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn typed(text: &str) -> Editor {
        let mut editor = Editor::new();
        for ch in text.chars() {
            editor.insert_char(ch);
        }
        editor
    }

    #[test]
    fn typing_builds_multiple_lines() {
        let editor = typed("milk\nbread");
        assert_eq!(editor.lines, vec!["milk", "bread"]);
        assert_eq!((editor.cursor_line, editor.cursor_col), (1, 5));
        assert_eq!(editor.text(), "milk\nbread");
    }

    #[test]
    fn backspace_at_line_start_joins_lines() {
        let mut editor = typed("ab\ncd");
        editor.move_cursor_home();
        editor.delete_char();
        assert_eq!(editor.lines, vec!["abcd"]);
        assert_eq!(editor.cursor_col, 2);
    }

    #[test]
    fn multibyte_chars_are_edited_by_char() {
        let mut editor = typed("café");
        editor.move_cursor_left();
        editor.insert_char('x');
        assert_eq!(editor.text(), "cafxé");
        editor.move_cursor_end();
        editor.delete_char();
        assert_eq!(editor.text(), "cafx");
    }

    #[test]
    fn from_string_places_cursor_at_end() {
        let editor = Editor::from_string("one\ntwo");
        assert_eq!((editor.cursor_line, editor.cursor_col), (1, 3));
        assert!(Editor::from_string("").is_blank());
        assert!(typed(" \n\t").is_blank());
    }

    #[test]
    fn scroll_follows_cursor() {
        let mut editor = typed("1\n2\n3\n4\n5");
        editor.update_scroll(2);
        assert_eq!(editor.scroll_offset, 3);
        for _ in 0..4 {
            editor.move_cursor_up();
        }
        editor.update_scroll(2);
        assert_eq!(editor.scroll_offset, 0);
    }
}
