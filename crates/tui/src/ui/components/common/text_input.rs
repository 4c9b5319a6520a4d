//! Reusable UTF-8 safe text input state with cursor management.
//!
//! Used by the analysis input and by the free-text parameter fields.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{Frame, layout::Rect, text::Span, widgets::Paragraph};
use unicode_width::UnicodeWidthStr;

use crate::ui::theme::roles::Theme;

#[derive(Clone, Debug, Default)]
pub struct TextInputState {
    /// The underlying text buffer
    input: String,
    /// Cursor byte index into `input` (always on a UTF-8 boundary)
    cursor: usize,
}

impl TextInputState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Replace the text and put the cursor at its end.
    pub fn set_input<S: Into<String>>(&mut self, s: S) {
        self.input = s.into();
        self.cursor = self.input.len();
    }

    pub fn set_cursor(&mut self, cursor: usize) {
        let mut cursor = cursor.min(self.input.len());
        while !self.input.is_char_boundary(cursor) {
            cursor -= 1;
        }
        self.cursor = cursor;
    }

    /// Move cursor one Unicode scalar to the left.
    pub fn move_left(&mut self) {
        if let Some(previous) = self.input[..self.cursor].chars().next_back() {
            self.cursor -= previous.len_utf8();
        }
    }

    /// Move cursor one Unicode scalar to the right.
    pub fn move_right(&mut self) {
        if let Some(next) = self.input[self.cursor..].chars().next() {
            self.cursor += next.len_utf8();
        }
    }

    pub fn insert_char(&mut self, c: char) {
        self.input.insert(self.cursor, c);
        self.cursor += c.len_utf8();
    }

    /// Backspace the char immediately before the cursor.
    pub fn backspace(&mut self) {
        if let Some(previous) = self.input[..self.cursor].chars().next_back() {
            let start = self.cursor - previous.len_utf8();
            self.input.drain(start..self.cursor);
            self.cursor = start;
        }
    }

    /// Delete the char under the cursor.
    pub fn delete(&mut self) {
        if let Some(next) = self.input[self.cursor..].chars().next() {
            self.input.drain(self.cursor..self.cursor + next.len_utf8());
        }
    }

    /// Apply an editing key.
    ///
    /// `Some(changed)` when the key was consumed, `None` for keys left to the
    /// caller.
    pub fn handle_key(&mut self, key: KeyEvent) -> Option<bool> {
        match key.code {
            KeyCode::Char('u') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                let changed = !self.input.is_empty();
                self.set_input(String::new());
                Some(changed)
            }
            KeyCode::Char(c) if !key.modifiers.intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) => {
                self.insert_char(c);
                Some(true)
            }
            KeyCode::Backspace => {
                let before = self.input.len();
                self.backspace();
                Some(before != self.input.len())
            }
            KeyCode::Delete => {
                let before = self.input.len();
                self.delete();
                Some(before != self.input.len())
            }
            KeyCode::Left => {
                self.move_left();
                Some(false)
            }
            KeyCode::Right => {
                self.move_right();
                Some(false)
            }
            KeyCode::Home => {
                self.cursor = 0;
                Some(false)
            }
            KeyCode::End => {
                self.cursor = self.input.len();
                Some(false)
            }
            _ => None,
        }
    }

    /// Byte offset of the first char shown so that the cursor fits in
    /// `width` columns.
    fn visible_start(&self, width: usize) -> usize {
        let mut start = 0;
        while start < self.cursor && self.input[start..self.cursor].width() >= width.max(1) {
            start += self.input[start..].chars().next().map_or(1, char::len_utf8);
        }
        start
    }
}

/// Render a single-line input, scrolled so the cursor stays visible, and
/// place the terminal cursor when `focused`.
pub fn render_text_input(
    frame: &mut Frame,
    area: Rect,
    state: &TextInputState,
    placeholder: &str,
    focused: bool,
    theme: &dyn Theme,
) {
    if area.width == 0 || area.height == 0 {
        return;
    }
    let width = area.width as usize;
    if state.input().is_empty() && !focused {
        frame.render_widget(Paragraph::new(Span::styled(placeholder.to_string(), theme.text_muted_style())), area);
        return;
    }

    let start = state.visible_start(width);
    let visible = &state.input()[start..];
    frame.render_widget(Paragraph::new(Span::styled(visible.to_string(), theme.text_primary_style())), area);

    if focused {
        let offset = state.input()[start..state.cursor()].width() as u16;
        frame.set_cursor_position((area.x + offset.min(area.width.saturating_sub(1)), area.y));
    }
}
