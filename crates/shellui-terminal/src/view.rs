//! The narrow interface the controller renders through.
//!
//! Hosts implement [`View`] for their output surface (DOM, terminal, GUI).
//! [`RecordingView`] is a headless view that records everything it is asked
//! to show.

use std::cell::RefCell;
use std::rc::Rc;

use crate::buffer::LineBuffer;

/// Output surface of a terminal.
pub trait View {
    /// Append a block of output (may contain newlines).
    fn print(&mut self, text: &str);

    /// Show or hide the prompt prefix. Hidden while a command runs.
    fn set_prompt_visible(&mut self, visible: bool);

    /// Color for the selected character, from `ShellConfig::highlight_color`.
    /// Called once when the terminal is created.
    fn set_highlight_color(&mut self, _color: &str) {}

    /// Redraw the input line.
    fn render_input(&mut self, _buffer: &LineBuffer) {}

    fn scroll_to_bottom(&mut self) {}
}

/// Everything a [`RecordingView`] has been shown.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewLog {
    pub output: Vec<String>,
    pub prompt_visible: bool,
    pub input: String,
    pub selection: Option<usize>,
    pub highlight_color: Option<String>,
    pub renders: usize,
}

impl Default for ViewLog {
    fn default() -> Self {
        Self {
            output: Vec::new(),
            prompt_visible: true,
            input: String::new(),
            selection: None,
            highlight_color: None,
            renders: 0,
        }
    }
}

/// Headless view sharing its [`ViewLog`] with the caller.
#[derive(Debug, Clone, Default)]
pub struct RecordingView {
    log: Rc<RefCell<ViewLog>>,
}

impl RecordingView {
    pub fn new() -> Self {
        Self::default()
    }

    /// Shared handle to the recorded state.
    pub fn log(&self) -> Rc<RefCell<ViewLog>> {
        Rc::clone(&self.log)
    }
}

impl View for RecordingView {
    fn print(&mut self, text: &str) {
        self.log.borrow_mut().output.push(text.to_string());
    }

    fn set_prompt_visible(&mut self, visible: bool) {
        self.log.borrow_mut().prompt_visible = visible;
    }

    fn set_highlight_color(&mut self, color: &str) {
        self.log.borrow_mut().highlight_color = Some(color.to_string());
    }

    fn render_input(&mut self, buffer: &LineBuffer) {
        let mut log = self.log.borrow_mut();
        log.input = buffer.text();
        log.selection = buffer.selection();
        log.renders += 1;
    }
}
