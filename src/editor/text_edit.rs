use super::viewport::ScreenPoint;

/// How an open text editor closes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextEditClose {
    /// Focus left the overlay; the draft is written back.
    Blur,
    /// Ctrl+Enter; the draft is written back.
    Confirm,
    /// Escape; the draft is dropped.
    Cancel,
}

impl TextEditClose {
    pub const fn commits(self) -> bool {
        matches!(self, Self::Blur | Self::Confirm)
    }
}

/// Local edit buffer for one text object. The scene keeps the committed content
/// until the draft is closed with a committing action.
#[derive(Debug, Clone, PartialEq)]
pub struct TextEditDraft {
    target: usize,
    original: String,
    content: String,
    cursor_chars: usize,
    overlay: ScreenPoint,
}

impl TextEditDraft {
    pub fn new(target: usize, content: impl Into<String>, overlay: ScreenPoint) -> Self {
        let content = content.into();
        let cursor_chars = content.chars().count();
        Self {
            target,
            original: content.clone(),
            content,
            cursor_chars,
            overlay,
        }
    }

    pub fn target(&self) -> usize {
        self.target
    }

    pub fn overlay(&self) -> ScreenPoint {
        self.overlay
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn original(&self) -> &str {
        &self.original
    }

    pub fn is_modified(&self) -> bool {
        self.content != self.original
    }

    pub fn set_overlay(&mut self, overlay: ScreenPoint) {
        self.overlay = overlay;
    }

    /// Keeps the draft attached to its object when an earlier object is removed.
    pub(crate) fn retarget(&mut self, target: usize) {
        self.target = target;
    }

    pub fn cursor_chars(&self) -> usize {
        self.cursor_chars.min(self.content.chars().count())
    }

    pub fn set_content(&mut self, content: impl Into<String>) {
        self.content = content.into();
        self.cursor_chars = self.content.chars().count();
    }

    pub fn insert_char(&mut self, c: char) {
        let byte_index = self.byte_index_for_cursor(self.cursor_chars);
        self.content.insert(byte_index, c);
        self.cursor_chars = self.cursor_chars.saturating_add(1);
    }

    pub fn insert_str(&mut self, text: &str) {
        let byte_index = self.byte_index_for_cursor(self.cursor_chars);
        self.content.insert_str(byte_index, text);
        self.cursor_chars = self.cursor_chars.saturating_add(text.chars().count());
    }

    pub fn insert_newline(&mut self) {
        self.insert_char('\n');
    }

    pub fn delete_backward(&mut self) -> bool {
        let cursor = self.cursor_chars();
        if cursor == 0 {
            return false;
        }
        let end = self.byte_index_for_cursor(cursor);
        let start = self.byte_index_for_cursor(cursor - 1);
        self.content.drain(start..end);
        self.cursor_chars = cursor - 1;
        true
    }

    pub fn delete_forward(&mut self) -> bool {
        let cursor = self.cursor_chars();
        if cursor >= self.content.chars().count() {
            return false;
        }
        let start = self.byte_index_for_cursor(cursor);
        let end = self.byte_index_for_cursor(cursor + 1);
        self.content.drain(start..end);
        true
    }

    pub fn move_cursor_left(&mut self) -> bool {
        if self.cursor_chars() == 0 {
            return false;
        }
        self.cursor_chars = self.cursor_chars() - 1;
        true
    }

    pub fn move_cursor_right(&mut self) -> bool {
        if self.cursor_chars() >= self.content.chars().count() {
            return false;
        }
        self.cursor_chars = self.cursor_chars() + 1;
        true
    }

    pub fn move_cursor_up(&mut self) -> bool {
        self.move_cursor_vertically(-1)
    }

    pub fn move_cursor_down(&mut self) -> bool {
        self.move_cursor_vertically(1)
    }

    fn byte_index_for_cursor(&self, cursor_chars: usize) -> usize {
        self.content
            .char_indices()
            .nth(cursor_chars)
            .map(|(index, _)| index)
            .unwrap_or(self.content.len())
    }

    fn cursor_line_column(&self) -> (usize, usize) {
        let before_cursor = self.content.chars().take(self.cursor_chars());
        before_cursor.fold((0, 0), |(line, column), ch| {
            if ch == '\n' {
                (line + 1, 0)
            } else {
                (line, column + 1)
            }
        })
    }

    fn move_cursor_vertically(&mut self, delta_lines: isize) -> bool {
        let lines = self.content.split('\n').collect::<Vec<_>>();
        let (line, column) = self.cursor_line_column();
        let Some(target_line) = line
            .checked_add_signed(delta_lines)
            .filter(|target| *target < lines.len())
        else {
            return false;
        };

        let line_start = lines[..target_line]
            .iter()
            .map(|text| text.chars().count() + 1)
            .sum::<usize>();
        self.cursor_chars = line_start + column.min(lines[target_line].chars().count());
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft(content: &str) -> TextEditDraft {
        TextEditDraft::new(0, content, ScreenPoint { x: 0.0, y: 0.0 })
    }

    #[test]
    fn editing_happens_at_cursor_and_tracks_modification() {
        let mut draft = draft("hello");
        assert!(!draft.is_modified());
        draft.move_cursor_left();
        draft.move_cursor_left();
        draft.insert_char('X');
        assert_eq!(draft.content(), "helXlo");
        assert!(draft.delete_forward());
        assert_eq!(draft.content(), "helXo");
        assert!(draft.delete_backward());
        assert_eq!(draft.content(), "helo");
        assert_eq!(draft.original(), "hello");
        assert!(draft.is_modified());
    }

    #[test]
    fn multibyte_content_edits_by_character() {
        let mut draft = draft("가나다");
        assert!(draft.delete_backward());
        draft.insert_str("라마");
        assert_eq!(draft.content(), "가나라마");
        assert_eq!(draft.cursor_chars(), 4);
    }

    #[test]
    fn vertical_moves_clamp_column_to_target_line() {
        let mut draft = draft("abcdef\nab\nabcd");
        assert!(draft.move_cursor_up());
        assert_eq!(draft.cursor_chars(), 9);
        assert!(draft.move_cursor_up());
        assert_eq!(draft.cursor_chars(), 2);
        assert!(!draft.move_cursor_up());
        assert!(draft.move_cursor_down());
        draft.insert_newline();
        assert_eq!(draft.content(), "abcdef\nab\n\nabcd");
    }

    #[test]
    fn only_blur_and_confirm_commit() {
        assert!(TextEditClose::Blur.commits());
        assert!(TextEditClose::Confirm.commits());
        assert!(!TextEditClose::Cancel.commits());
    }
}
