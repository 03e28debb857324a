//! Host-agnostic input event types.
//!
//! Every host maps its native keyboard, clipboard and drag-and-drop input
//! to these enums. The terminal controller never sees raw host events.

use serde::{Deserialize, Serialize};

/// ETX, produced by some hosts for Ctrl+C instead of a plain `c`.
pub const END_OF_TEXT: char = '\u{3}';

/// A host-agnostic input event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputEvent {
    /// A non-printable key went down.
    KeyDown(Key),
    /// A non-printable key was released.
    KeyUp(Key),
    /// A printable character was typed.
    TextInput(char),
    /// Text pasted from the clipboard.
    Paste(String),
    /// Something was dropped onto the terminal.
    Drop(DropPayload),
}

/// Keys the controller reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Key {
    Enter,
    Backspace,
    Left,
    Right,
    Up,
    Down,
    Control,
    Meta,
}

/// Content of a drop event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DropPayload {
    /// File names, in drop order.
    Files(Vec<String>),
    /// Plain dropped text.
    Text(String),
}

impl DropPayload {
    /// Text to insert into the input line: file names joined by a single
    /// space, or the dropped text.
    pub fn to_input_text(&self) -> String {
        match self {
            Self::Files(names) if !names.is_empty() => names.join(" "),
            Self::Files(_) => String::new(),
            Self::Text(text) => text.clone(),
        }
    }
}
