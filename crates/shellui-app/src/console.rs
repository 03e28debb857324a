//! Line-oriented stdout view.

use std::io::Write;

use shellui_terminal::{LineBuffer, View};
use shellui_types::config::ShellConfig;

/// Writes terminal output to stdout.
///
/// The input line is echoed by the terminal on submit, so the line is only
/// redrawn while a character is selected, with that character highlighted.
pub struct ConsoleView {
    prompt: String,
    prompt_visible: bool,
    highlight: Option<(u8, u8, u8)>,
}

impl ConsoleView {
    pub fn new(config: &ShellConfig) -> Self {
        Self {
            prompt: config.prompt.clone(),
            prompt_visible: true,
            highlight: config.highlight_rgb(),
        }
    }

    fn write(&self, text: &str, newline: bool) {
        let mut out = std::io::stdout().lock();
        let res = if newline {
            writeln!(out, "{text}")
        } else {
            write!(out, "{text}").and_then(|()| out.flush())
        };
        if let Err(e) = res {
            log::error!("stdout: {e}");
        }
    }
}

/// `buffer` with the selected character drawn on a 24-bit ANSI background.
fn highlighted_line(buffer: &LineBuffer, (r, g, b): (u8, u8, u8)) -> String {
    let mut line = String::new();
    for (i, ch) in buffer.chars().iter().enumerate() {
        if buffer.selection() == Some(i) {
            line.push_str(&format!("\x1b[48;2;{r};{g};{b}m{ch}\x1b[0m"));
        } else {
            line.push(*ch);
        }
    }
    line
}

impl View for ConsoleView {
    fn print(&mut self, text: &str) {
        self.write(text, true);
    }

    fn set_prompt_visible(&mut self, visible: bool) {
        self.prompt_visible = visible;
    }

    fn set_highlight_color(&mut self, color: &str) {
        if self.highlight.is_none() {
            log::warn!("highlight_color '{color}' is not a hex color; selection is not drawn");
        }
    }

    fn render_input(&mut self, buffer: &LineBuffer) {
        let Some(rgb) = self.highlight else {
            return;
        };
        if buffer.selection().is_none() {
            return;
        }
        let prompt = if self.prompt_visible { self.prompt.as_str() } else { "" };
        let line = format!("\r\x1b[2K{prompt} {}", highlighted_line(buffer, rgb));
        self.write(&line, false);
    }

    fn scroll_to_bottom(&mut self) {
        if let Err(e) = std::io::stdout().flush() {
            log::error!("stdout: {e}");
        }
    }
}
