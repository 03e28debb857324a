//! Demo commands registered by the console host.

use std::cell::RefCell;
use std::rc::{Rc, Weak};
use std::time::{Duration, Instant};

use shellui_terminal::{
    ArgumentDefinition, CommandCallback, CommandOptions, Completion, Terminal, Validator,
};

/// Async completions waiting for their deadline.
#[derive(Default)]
pub struct Timers {
    pending: RefCell<Vec<(Instant, Completion, String)>>,
}

impl Timers {
    pub fn schedule(&self, after: Duration, done: Completion, message: String) {
        self.pending
            .borrow_mut()
            .push((Instant::now() + after, done, message));
    }

    /// Finish every completion whose deadline has passed.
    pub fn fire_due(&self, now: Instant) {
        let due: Vec<(Instant, Completion, String)> = {
            let mut pending = self.pending.borrow_mut();
            let (due, rest): (Vec<_>, Vec<_>) = pending.drain(..).partition(|(at, ..)| *at <= now);
            *pending = rest;
            due
        };
        for (_, done, message) in due {
            if done.is_cancelled() {
                continue;
            }
            done.end(Some(message));
        }
    }

    pub fn is_empty(&self) -> bool {
        self.pending.borrow().is_empty()
    }
}

/// Register the demo commands.
pub fn register_demo_commands(terminal: &Rc<Terminal>, timers: &Rc<Timers>) {
    terminal.add_command(
        "echo",
        CommandCallback::sync(|args| Some(args.get("text").unwrap_or_default().to_string())),
        CommandOptions::new()
            .arg_names(["text"])
            .summary("Print [text]."),
    );

    terminal.add_command(
        "greet",
        CommandCallback::sync(|args| args.get("name").map(|name| format!("Hello, {name}!"))),
        CommandOptions::new()
            .arg(
                ArgumentDefinition::new("name")
                    .validator(Validator::required())
                    .alias("n"),
            )
            .summary("Greet someone.")
            .help("Usage: greet <name> or greet --name <name>."),
    );

    terminal.add_command(
        "add",
        CommandCallback::sync(|args| {
            let a: f64 = args.parse("a")?;
            let b: f64 = args.parse("b")?;
            Some((a + b).to_string())
        }),
        CommandOptions::new()
            .arg(
                ArgumentDefinition::new("a")
                    .validators([Validator::required(), Validator::of_type("number")]),
            )
            .arg(
                ArgumentDefinition::new("b")
                    .validator(Validator::of_type("number"))
                    .default_value("0"),
            )
            .summary("Add two numbers."),
    );

    let t = Rc::clone(timers);
    terminal.add_command(
        "sleep",
        CommandCallback::asynchronous(move |args, done| {
            let ms: u64 = args.parse("ms").unwrap_or(1000);
            t.schedule(Duration::from_millis(ms), done, format!("slept {ms} ms"));
        }),
        CommandOptions::new()
            .arg(
                ArgumentDefinition::new("ms")
                    .validator(Validator::of_type("number"))
                    .default_value("1000"),
            )
            .summary("Wait [ms] milliseconds. Ctrl+C cancels."),
    );

    let weak: Weak<Terminal> = Rc::downgrade(terminal);
    terminal.add_command(
        "history",
        CommandCallback::sync(move |_| {
            let term = weak.upgrade()?;
            let lines: Vec<String> = term
                .registry()
                .history()
                .iter()
                .enumerate()
                .map(|(i, line)| format!("{i:>4}  {line}"))
                .collect();
            Some(lines.join("\n"))
        }),
        CommandOptions::new().summary("List previously entered lines."),
    );
}
