use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// What a key did to the edited text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Edit {
    Changed,
    Moved,
    Unhandled,
}

/// Insertion point inside a field value, counted in chars.
///
/// The caret does not own the text. Values can be replaced from outside
/// (clearing, pasting), so the position is clamped on every call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Caret {
    pos: usize,
}

impl Caret {
    pub fn end_of(text: &str) -> Self {
        Self {
            pos: text.chars().count(),
        }
    }

    pub fn position(&self, text: &str) -> usize {
        self.pos.min(text.chars().count())
    }

    pub fn insert_str(&mut self, text: &mut String, s: &str) {
        let pos = self.position(text);
        text.insert_str(byte_offset(text, pos), s);
        self.pos = pos + s.chars().count();
    }

    pub fn handle_key(&mut self, text: &mut String, key: &KeyEvent) -> Edit {
        self.pos = self.position(text);
        let len = text.chars().count();

        match (key.code, key.modifiers) {
            (KeyCode::Backspace, KeyModifiers::ALT) => {
                if self.pos == 0 {
                    return Edit::Moved;
                }
                let start = word_start(text, self.pos);
                text.drain(byte_offset(text, start)..byte_offset(text, self.pos));
                self.pos = start;
                Edit::Changed
            }
            (KeyCode::Backspace, _) => {
                if self.pos == 0 {
                    return Edit::Moved;
                }
                self.pos -= 1;
                text.remove(byte_offset(text, self.pos));
                Edit::Changed
            }
            (KeyCode::Delete, _) => {
                if self.pos >= len {
                    return Edit::Moved;
                }
                text.remove(byte_offset(text, self.pos));
                Edit::Changed
            }
            (KeyCode::Left, _) => {
                self.pos = self.pos.saturating_sub(1);
                Edit::Moved
            }
            (KeyCode::Right, _) => {
                self.pos = (self.pos + 1).min(len);
                Edit::Moved
            }
            (KeyCode::Home, _) | (KeyCode::Char('a'), KeyModifiers::CONTROL) => {
                self.pos = 0;
                Edit::Moved
            }
            (KeyCode::End, _) | (KeyCode::Char('e'), KeyModifiers::CONTROL) => {
                self.pos = len;
                Edit::Moved
            }
            (KeyCode::Char('u'), KeyModifiers::CONTROL) => {
                if text.is_empty() {
                    return Edit::Moved;
                }
                text.clear();
                self.pos = 0;
                Edit::Changed
            }
            (KeyCode::Char(c), KeyModifiers::NONE | KeyModifiers::SHIFT) => {
                text.insert(byte_offset(text, self.pos), c);
                self.pos += 1;
                Edit::Changed
            }
            _ => Edit::Unhandled,
        }
    }
}

fn byte_offset(text: &str, chars: usize) -> usize {
    text.char_indices().nth(chars).map_or(text.len(), |(i, _)| i)
}

fn word_start(text: &str, pos: usize) -> usize {
    let chars: Vec<char> = text.chars().take(pos).collect();
    let mut start = chars.len();
    while start > 0 && chars[start - 1].is_whitespace() {
        start -= 1;
    }
    while start > 0 && !chars[start - 1].is_whitespace() {
        start -= 1;
    }
    start
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn type_str(caret: &mut Caret, text: &mut String, s: &str) {
        for c in s.chars() {
            caret.handle_key(text, &key(KeyCode::Char(c)));
        }
    }

    #[test]
    fn test_typing_and_backspace() {
        let mut text = String::new();
        let mut caret = Caret::default();
        type_str(&mut caret, &mut text, "héllo");
        assert_eq!(text, "héllo");

        assert_eq!(caret.handle_key(&mut text, &key(KeyCode::Backspace)), Edit::Changed);
        assert_eq!(text, "héll");
        assert_eq!(caret.position(&text), 4);
    }

    #[test]
    fn test_insert_in_the_middle() {
        let mut text = "ac".to_string();
        let mut caret = Caret::end_of(&text);
        caret.handle_key(&mut text, &key(KeyCode::Left));
        caret.handle_key(&mut text, &key(KeyCode::Char('b')));
        assert_eq!(text, "abc");
        assert_eq!(caret.position(&text), 2);
    }

    #[test]
    fn test_backspace_at_start_changes_nothing() {
        let mut text = "abc".to_string();
        let mut caret = Caret::default();
        assert_eq!(caret.handle_key(&mut text, &key(KeyCode::Backspace)), Edit::Moved);
        assert_eq!(text, "abc");
    }

    #[test]
    fn test_alt_backspace_deletes_word() {
        let mut text = "book a talk".to_string();
        let mut caret = Caret::end_of(&text);
        let alt = KeyEvent::new(KeyCode::Backspace, KeyModifiers::ALT);
        caret.handle_key(&mut text, &alt);
        assert_eq!(text, "book a ");
        caret.handle_key(&mut text, &alt);
        assert_eq!(text, "book ");
    }

    #[test]
    fn test_caret_clamps_after_external_clear() {
        let mut text = "hello".to_string();
        let mut caret = Caret::end_of(&text);
        text.clear();
        assert_eq!(caret.position(&text), 0);
        caret.handle_key(&mut text, &key(KeyCode::Char('x')));
        assert_eq!(text, "x");
    }

    #[test]
    fn test_control_chords_are_not_typed() {
        let mut text = String::new();
        let mut caret = Caret::default();
        let ctrl_s = KeyEvent::new(KeyCode::Char('s'), KeyModifiers::CONTROL);
        assert_eq!(caret.handle_key(&mut text, &ctrl_s), Edit::Unhandled);
        assert!(text.is_empty());
    }

    #[test]
    fn test_paste_inserts_at_caret() {
        let mut text = "ad".to_string();
        let mut caret = Caret::default();
        caret.handle_key(&mut text, &key(KeyCode::Right));
        caret.insert_str(&mut text, "bc");
        assert_eq!(text, "abcd");
        assert_eq!(caret.position(&text), 3);
    }
}
