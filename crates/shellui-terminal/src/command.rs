//! Commands and their execution lifecycle.
//!
//! A command goes `Idle -> Running -> Complete | Cancelled` on every
//! execution and can be executed again afterwards. Synchronous callbacks
//! complete as soon as they return. Asynchronous callbacks receive a
//! [`Completion`] and finish later by calling [`Completion::end`].
//!
//! Cancellation is cooperative: a `cancel` event on the owning registry
//! marks the running execution cancelled and reports completion with no
//! content. The callback's own work is not interrupted; its eventual result
//! is discarded.

use std::cell::{Cell, OnceCell};
use std::collections::HashMap;
use std::fmt;
use std::rc::{Rc, Weak};

use crate::argument::ArgumentDefinition;
use crate::event::{CANCEL, Event, EventDispatcher, ListenerId};
use crate::locale::MessageSource;

/// The callback run by a command.
pub enum CommandCallback {
    /// Returns its output; completion is immediate.
    Sync(Box<dyn Fn(&Arguments) -> Option<String>>),
    /// Finishes later through the [`Completion`] handle.
    Async(Box<dyn Fn(&Arguments, Completion)>),
}

impl CommandCallback {
    pub fn sync(f: impl Fn(&Arguments) -> Option<String> + 'static) -> Self {
        Self::Sync(Box::new(f))
    }

    pub fn asynchronous(f: impl Fn(&Arguments, Completion) + 'static) -> Self {
        Self::Async(Box::new(f))
    }

    pub fn is_async(&self) -> bool {
        matches!(self, Self::Async(_))
    }
}

/// Registration options for a command.
#[derive(Debug, Clone, Default)]
pub struct CommandOptions {
    /// One-line description, or a locale key.
    pub summary: Option<String>,
    /// Long help text, or a locale key.
    pub help: Option<String>,
    /// Declared arguments in binding order.
    pub args: Vec<ArgumentDefinition>,
}

impl CommandOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn summary(mut self, summary: impl Into<String>) -> Self {
        self.summary = Some(summary.into());
        self
    }

    pub fn help(mut self, help: impl Into<String>) -> Self {
        self.help = Some(help.into());
        self
    }

    pub fn arg(mut self, arg: ArgumentDefinition) -> Self {
        self.args.push(arg);
        self
    }

    /// Declare plain arguments (no validators) by name.
    pub fn arg_names<'a>(mut self, names: impl IntoIterator<Item = &'a str>) -> Self {
        self.args.extend(names.into_iter().map(ArgumentDefinition::new));
        self
    }
}

/// Argument values bound for one execution, in declaration order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Arguments {
    names: Vec<String>,
    values: Vec<Option<String>>,
}

impl Arguments {
    pub(crate) fn new(names: Vec<String>, values: Vec<Option<String>>) -> Self {
        Self { names, values }
    }

    /// Value bound to the argument called `name`.
    pub fn get(&self, name: &str) -> Option<&str> {
        let idx = self.names.iter().position(|n| n == name)?;
        self.values.get(idx)?.as_deref()
    }

    /// Value bound at declaration position `index`.
    pub fn at(&self, index: usize) -> Option<&str> {
        self.values.get(index)?.as_deref()
    }

    /// Parse the value bound to `name`.
    pub fn parse<T: std::str::FromStr>(&self, name: &str) -> Option<T> {
        self.get(name)?.trim().parse().ok()
    }

    pub fn values(&self) -> &[Option<String>] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Lifecycle state of a command's latest execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandState {
    Idle,
    Running,
    Complete,
    Cancelled,
}

/// A named, callable unit with a declared argument schema.
pub struct Command {
    name: String,
    callback: CommandCallback,
    args: HashMap<String, ArgumentDefinition>,
    args_order: Vec<String>,
    summary: Option<String>,
    help: Option<String>,
    events: Rc<EventDispatcher>,
    state: Cell<CommandState>,
    cancelled: Cell<bool>,
    generation: Cell<u64>,
    cancel_listener: Cell<Option<ListenerId>>,
    signature: OnceCell<String>,
    this: Weak<Command>,
}

impl Command {
    /// Build a command that reports to `events`.
    ///
    /// Arguments are declared in `options.args` order; declaring a name twice
    /// replaces the earlier definition and keeps its position.
    pub fn new(
        name: impl Into<String>,
        callback: CommandCallback,
        options: CommandOptions,
        events: Rc<EventDispatcher>,
    ) -> Rc<Self> {
        let mut args = HashMap::new();
        let mut args_order = Vec::new();
        for def in options.args {
            let key = def.name().to_string();
            if args.insert(key.clone(), def).is_none() {
                args_order.push(key);
            }
        }
        Rc::new_cyclic(|this| Self {
            name: name.into(),
            callback,
            args,
            args_order,
            summary: options.summary,
            help: options.help,
            events,
            state: Cell::new(CommandState::Idle),
            cancelled: Cell::new(false),
            generation: Cell::new(0),
            cancel_listener: Cell::new(None),
            signature: OnceCell::new(),
            this: Weak::clone(this),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_async(&self) -> bool {
        self.callback.is_async()
    }

    pub fn summary(&self) -> Option<&str> {
        self.summary.as_deref()
    }

    pub fn help(&self) -> Option<&str> {
        self.help.as_deref()
    }

    pub fn state(&self) -> CommandState {
        self.state.get()
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.get()
    }

    /// Argument names in binding order.
    pub fn args_order(&self) -> &[String] {
        &self.args_order
    }

    pub fn argument(&self, name: &str) -> Option<&ArgumentDefinition> {
        self.args.get(name)
    }

    /// Argument at binding position `index`.
    pub fn argument_at(&self, index: usize) -> Option<&ArgumentDefinition> {
        self.args.get(self.args_order.get(index)?)
    }

    /// Run the callback with already bound and validated arguments.
    pub fn execute(&self, args: Arguments) {
        let generation = self.generation.get() + 1;
        self.generation.set(generation);
        self.cancelled.set(false);
        self.state.set(CommandState::Running);
        self.listen_for_cancel();
        log::debug!("{}: running (execution #{generation})", self.name);

        match &self.callback {
            CommandCallback::Sync(f) => {
                let content = f(&args);
                self.end_command(content);
            },
            CommandCallback::Async(f) => {
                let completion = Completion {
                    command: Weak::clone(&self.this),
                    generation,
                };
                f(&args, completion);
            },
        }
    }

    /// Finish the current execution with `content`.
    ///
    /// Does nothing if the execution was cancelled or already finished.
    pub fn end_command(&self, content: Option<String>) {
        if self.cancelled.get() || self.state.get() != CommandState::Running {
            log::debug!("{}: late completion ignored", self.name);
            return;
        }
        self.state.set(CommandState::Complete);
        self.stop_listening_for_cancel();
        self.events
            .dispatch_event(Event::command_complete(&self.name, content));
    }

    /// `name [arg1] [arg2] ...`, computed once.
    pub fn signature(&self) -> &str {
        self.signature.get_or_init(|| {
            let mut sig = self.name.clone();
            for arg in &self.args_order {
                sig.push_str(&format!(" [{arg}]"));
            }
            sig
        })
    }

    /// Signature followed by the summary; unless `summary_only`, the help
    /// text goes on the next line. Summary and help may be locale keys.
    pub fn get_help(&self, summary_only: bool, messages: &dyn MessageSource) -> String {
        let mut text = self.signature().to_string();
        if let Some(summary) = &self.summary {
            text.push(' ');
            text.push_str(&messages.resolve(summary));
        }
        if summary_only {
            return text;
        }
        if let Some(help) = &self.help {
            text.push('\n');
            text.push_str(&messages.resolve(help));
        }
        text
    }

    /// Replace any previous cancel registration with one for this execution.
    fn listen_for_cancel(&self) {
        self.stop_listening_for_cancel();
        let this = Weak::clone(&self.this);
        let id = self.events.add_event_listener(CANCEL, move |_| {
            if let Some(cmd) = this.upgrade() {
                cmd.cancel();
            }
        });
        self.cancel_listener.set(Some(id));
    }

    fn stop_listening_for_cancel(&self) {
        if let Some(id) = self.cancel_listener.take() {
            self.events.remove_event_listener(CANCEL, id);
        }
    }

    /// Cancel the current execution of this command alone, as a registry
    /// `cancel` event does for every running command. Does nothing unless
    /// the command is running.
    pub fn cancel(&self) {
        if self.state.get() != CommandState::Running {
            return;
        }
        log::debug!("{}: cancelled", self.name);
        self.cancelled.set(true);
        self.state.set(CommandState::Cancelled);
        self.stop_listening_for_cancel();
        self.events
            .dispatch_event(Event::command_complete(&self.name, None));
    }
}

impl fmt::Debug for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Command")
            .field("name", &self.name)
            .field("async", &self.is_async())
            .field("args_order", &self.args_order)
            .field("state", &self.state.get())
            .finish()
    }
}

/// Handle an asynchronous callback uses to finish its execution.
///
/// A handle only finishes the execution it was issued for: once the command
/// has been executed again, older handles do nothing.
#[derive(Debug, Clone)]
pub struct Completion {
    command: Weak<Command>,
    generation: u64,
}

impl Completion {
    /// Report the result of the execution.
    pub fn end(&self, content: Option<String>) {
        let Some(cmd) = self.command.upgrade() else {
            return;
        };
        if cmd.generation.get() != self.generation {
            log::debug!("{}: completion for a superseded execution ignored", cmd.name);
            return;
        }
        cmd.end_command(content);
    }

    /// Whether the execution has been cancelled (or the command is gone).
    pub fn is_cancelled(&self) -> bool {
        self.command
            .upgrade()
            .is_none_or(|cmd| cmd.generation.get() != self.generation || cmd.is_cancelled())
    }
}
