//! LineBuffer: the editable input line with character selection.

use crate::navigation::{self, Direction};

/// Input line as characters plus an optional selected character.
///
/// With no selection the caret sits at the end of the line. With a
/// selection, typing inserts before the selected character.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LineBuffer {
    chars: Vec<char>,
    selection: Option<usize>,
}

impl LineBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(&self) -> String {
        self.chars.iter().collect()
    }

    pub fn chars(&self) -> &[char] {
        &self.chars
    }

    pub fn len(&self) -> usize {
        self.chars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chars.is_empty()
    }

    /// Selected character index, if any.
    pub fn selection(&self) -> Option<usize> {
        self.selection
    }

    /// Insert text one character at a time at the caret.
    pub fn insert(&mut self, text: &str) {
        for ch in text.chars() {
            self.insert_char(ch);
        }
    }

    pub fn insert_char(&mut self, ch: char) {
        match self.selection {
            Some(i) => {
                self.chars.insert(i, ch);
                self.selection = Some(i + 1);
            },
            None => self.chars.push(ch),
        }
    }

    /// Delete the character before the caret.
    pub fn remove_char(&mut self) {
        match self.selection {
            Some(0) => {},
            Some(i) => {
                self.chars.remove(i - 1);
                self.selection = Some(i - 1);
            },
            None => {
                self.chars.pop();
            },
        }
    }

    /// Select a character. Out-of-range indices clear the selection.
    pub fn select(&mut self, index: Option<usize>) {
        self.selection = index.filter(|&i| i < self.chars.len());
    }

    /// Move the selection one character left or right.
    pub fn move_selection(&mut self, direction: Direction) {
        let next = navigation::step(self.chars.len(), self.selection, direction);
        self.select(next.apply(self.selection));
    }

    /// Clear text and selection.
    pub fn reset(&mut self) {
        self.chars.clear();
        self.selection = None;
    }

    /// Replace the contents with `text`, caret at the end.
    pub fn set_text(&mut self, text: &str) {
        self.reset();
        self.insert(text);
    }
}
