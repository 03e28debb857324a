//! ShellUI console entry point.
//!
//! Reads lines from stdin and feeds them to a terminal as typed input.
//! A line consisting of Ctrl+C (`^C`, U+0003) cancels the running command.
//! The config file comes from the first CLI arg or `SHELLUI_CONFIG`.

mod commands;
mod console;

use std::path::PathBuf;
use std::rc::Rc;
use std::sync::mpsc::{self, RecvTimeoutError};
use std::time::{Duration, Instant};

use anyhow::{Context, Result};

use shellui_terminal::Terminal;
use shellui_types::config::ShellConfig;
use shellui_types::input::{END_OF_TEXT, InputEvent, Key};

use commands::Timers;
use console::ConsoleView;

const TICK: Duration = Duration::from_millis(20);

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = match config_path() {
        Some(path) => ShellConfig::load(&path)
            .with_context(|| format!("loading {}", path.display()))?,
        None => ShellConfig::default(),
    };
    log::info!("Starting ShellUI (prompt '{}')", config.prompt);

    let view = ConsoleView::new(&config);
    let terminal = Terminal::new(view, config);
    let timers = Rc::new(Timers::default());
    commands::register_demo_commands(&terminal, &timers);

    let lines = spawn_stdin_reader();
    loop {
        match lines.recv_timeout(TICK) {
            Ok(line) => feed_line(&terminal, &line),
            Err(RecvTimeoutError::Timeout) => {},
            Err(RecvTimeoutError::Disconnected) => {
                if timers.is_empty() {
                    break;
                }
                std::thread::sleep(TICK);
            },
        }
        let now = Instant::now();
        timers.fire_due(now);
        terminal.poll(now);
    }

    log::info!("stdin closed, exiting");
    Ok(())
}

fn config_path() -> Option<PathBuf> {
    std::env::args()
        .nth(1)
        .or_else(|| std::env::var("SHELLUI_CONFIG").ok())
        .map(PathBuf::from)
}

/// Type a line into the terminal and press Enter.
fn feed_line(terminal: &Terminal, line: &str) {
    if line == "^C" || line.starts_with(END_OF_TEXT) {
        terminal.handle_input(&InputEvent::TextInput(END_OF_TEXT));
        return;
    }
    for ch in line.chars() {
        terminal.handle_input(&InputEvent::TextInput(ch));
    }
    terminal.handle_input(&InputEvent::KeyDown(Key::Enter));
}

/// Forward stdin lines over a channel so the main loop can keep ticking.
fn spawn_stdin_reader() -> mpsc::Receiver<String> {
    let (tx, rx) = mpsc::channel();
    std::thread::spawn(move || {
        for line in std::io::stdin().lines() {
            match line {
                Ok(line) => {
                    if tx.send(line).is_err() {
                        break;
                    }
                },
                Err(e) => {
                    log::error!("stdin: {e}");
                    break;
                },
            }
        }
    });
    rx
}
