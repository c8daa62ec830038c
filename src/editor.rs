/// Single-line text input used by the add-task form fields.
///
/// The cursor counts characters, not bytes, so non-ASCII names edit cleanly.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LineEditor {
    chars: Vec<char>,
    pub cursor: usize,
}

impl LineEditor {
    #[cfg(test)]
    pub fn new(content: &str) -> Self {
        let chars: Vec<char> = content.chars().collect();
        let cursor = chars.len();
        LineEditor { chars, cursor }
    }

    pub fn insert_char(&mut self, c: char) {
        if self.cursor > self.chars.len() {
            self.cursor = self.chars.len();
        }
        self.chars.insert(self.cursor, c);
        self.cursor += 1;
    }

    /// Backspace: removes the character before the cursor.
    pub fn delete_char(&mut self) {
        if self.cursor > 0 && self.cursor <= self.chars.len() {
            self.chars.remove(self.cursor - 1);
            self.cursor -= 1;
        }
    }

    /// Delete: removes the character under the cursor.
    pub fn delete_forward(&mut self) {
        if self.cursor < self.chars.len() {
            self.chars.remove(self.cursor);
        }
    }

    pub fn move_cursor_left(&mut self) {
        if self.cursor > 0 {
            self.cursor -= 1;
        }
    }

    pub fn move_cursor_right(&mut self) {
        if self.cursor < self.chars.len() {
            self.cursor += 1;
        }
    }

    pub fn move_to_start(&mut self) {
        self.cursor = 0;
    }

    pub fn move_to_end(&mut self) {
        self.cursor = self.chars.len();
    }

    pub fn is_empty(&self) -> bool {
        self.chars.is_empty()
    }

    pub fn get_content(&self) -> String {
        self.chars.iter().collect()
    }

    /// Text split around the cursor: (before, under cursor, after).
    pub fn split_at_cursor(&self) -> (String, Option<char>, String) {
        let before = self.chars[..self.cursor.min(self.chars.len())].iter().collect();
        let at = self.chars.get(self.cursor).copied();
        let after = if self.cursor < self.chars.len() {
            self.chars[self.cursor + 1..].iter().collect()
        } else {
            String::new()
        };
        (before, at, after)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn typing_appends_at_cursor() {
        let mut editor = LineEditor::default();
        for c in "Alce".chars() {
            editor.insert_char(c);
        }
        editor.move_cursor_left();
        editor.move_cursor_left();
        editor.insert_char('i');
        assert_eq!(editor.get_content(), "Alice");
        assert_eq!(editor.cursor, 3);
    }

    #[test]
    fn backspace_and_delete() {
        let mut editor = LineEditor::new("report");
        editor.delete_char();
        assert_eq!(editor.get_content(), "repor");
        editor.move_to_start();
        editor.delete_char();
        assert_eq!(editor.get_content(), "repor");
        editor.delete_forward();
        assert_eq!(editor.get_content(), "epor");
    }

    #[test]
    fn multibyte_characters_move_as_one() {
        let mut editor = LineEditor::new("Zoë");
        editor.move_cursor_left();
        let (before, at, after) = editor.split_at_cursor();
        assert_eq!(before, "Zo");
        assert_eq!(at, Some('ë'));
        assert_eq!(after, "");
        editor.delete_forward();
        assert_eq!(editor.get_content(), "Zo");
    }

    #[test]
    fn cursor_stays_in_bounds() {
        let mut editor = LineEditor::new("ab");
        editor.move_cursor_right();
        assert_eq!(editor.cursor, 2);
        editor.move_to_start();
        editor.move_cursor_left();
        assert_eq!(editor.cursor, 0);
        editor.move_to_end();
        assert_eq!(editor.split_at_cursor(), ("ab".to_string(), None, String::new()));
    }
}
