use ratatui::crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use tracing::trace;

/// Single-line text input used for the search box.
#[derive(Default)]
pub struct SearchInput {
    text: String,
    cursor: usize, // char offset, 0..=text.chars().count()
    finished: bool,
    canceled: bool,
}

/// Snapshot of the input handed to the model/UI after every keystroke.
#[derive(Default, Clone, Debug, PartialEq)]
pub struct InputState {
    pub text: String,
    pub cursor: usize,
    pub finished: bool,
    pub canceled: bool,
}

impl SearchInput {
    /// Starts a new edit session prefilled with the current query.
    pub fn begin(&mut self, initial: &str) {
        self.text = initial.to_string();
        self.cursor = self.text.chars().count();
        self.finished = false;
        self.canceled = false;
    }

    pub fn state(&self) -> InputState {
        InputState {
            text: self.text.clone(),
            cursor: self.cursor,
            finished: self.finished,
            canceled: self.canceled,
        }
    }

    pub fn read(&mut self, key: KeyEvent) -> InputState {
        match (key.code, key.modifiers) {
            (KeyCode::Enter, KeyModifiers::NONE) => self.finished = true,
            (KeyCode::Esc, KeyModifiers::NONE) => {
                self.finished = true;
                self.canceled = true;
            }
            (KeyCode::Backspace, KeyModifiers::NONE) => self.backspace(),
            (KeyCode::Left, KeyModifiers::NONE) => self.cursor = self.cursor.saturating_sub(1),
            (KeyCode::Right, KeyModifiers::NONE) => {
                if self.cursor < self.text.chars().count() {
                    self.cursor += 1;
                }
            }
            (code, _) => {
                if let Some(chr) = code.as_char() {
                    self.text.insert(self.byte_pos(self.cursor), chr);
                    self.cursor += 1;
                }
            }
        }
        trace!("Input: {:?} => {:?}", key.code, self.text);
        self.state()
    }

    fn backspace(&mut self) {
        if self.cursor > 0 {
            self.cursor -= 1;
            let begin = self.byte_pos(self.cursor);
            self.text.remove(begin);
        }
    }

    fn byte_pos(&self, char_pos: usize) -> usize {
        self.text
            .char_indices()
            .nth(char_pos)
            .map(|(byte_idx, _)| byte_idx)
            .unwrap_or(self.text.len())
    }
}
