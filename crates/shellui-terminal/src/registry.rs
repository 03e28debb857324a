//! Command registry: the command table, input history, and the
//! parse -> bind -> validate -> run pipeline.
//!
//! Outcomes are reported as events on the registry's dispatcher:
//! `commandNotFound`, `argumentError`, `commandStart`, then
//! `commandComplete` from the command itself. Hosts cancel the running
//! command by dispatching `cancel`.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use crate::command::{Arguments, Command, CommandCallback, CommandOptions};
use crate::event::{Event, EventDispatcher, Issues, ListenerId};
use crate::parser::{self, ParsedCommand};

/// What [`CommandRegistry::execute`] did with a line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecuteStatus {
    /// Empty or whitespace-only input.
    Ignored,
    /// `commandNotFound` was dispatched.
    NotFound,
    /// `argumentError` was dispatched; the callback did not run.
    InvalidArguments,
    /// `commandStart` was dispatched and the command executed.
    Started,
}

/// Registry of commands plus the input history.
pub struct CommandRegistry {
    events: Rc<EventDispatcher>,
    commands: RefCell<HashMap<String, Rc<Command>>>,
    history: RefCell<Vec<String>>,
}

impl CommandRegistry {
    /// Create an empty command registry.
    pub fn new() -> Self {
        Self {
            events: Rc::new(EventDispatcher::new("registry")),
            commands: RefCell::new(HashMap::new()),
            history: RefCell::new(Vec::new()),
        }
    }

    /// Register a command. Replaces any existing command with the same name.
    pub fn add_command(
        &self,
        name: &str,
        callback: CommandCallback,
        options: CommandOptions,
    ) -> Rc<Command> {
        let cmd = Command::new(name, callback, options, Rc::clone(&self.events));
        let replaced = self
            .commands
            .borrow_mut()
            .insert(name.to_string(), Rc::clone(&cmd));
        if replaced.is_some() {
            log::info!("Replaced command '{name}'");
        } else {
            log::debug!("Registered command '{}'", cmd.signature());
        }
        cmd
    }

    /// Look up a command by exact (case-sensitive) name.
    pub fn get_command(&self, name: &str) -> Option<Rc<Command>> {
        self.commands.borrow().get(name).cloned()
    }

    /// All commands, sorted by name.
    pub fn commands(&self) -> Vec<Rc<Command>> {
        let mut cmds: Vec<Rc<Command>> = self.commands.borrow().values().cloned().collect();
        cmds.sort_by(|a, b| a.name().cmp(b.name()));
        cmds
    }

    /// Return completions for a partial command name.
    pub fn completions(&self, partial: &str) -> Vec<String> {
        let mut names: Vec<String> = self
            .commands
            .borrow()
            .keys()
            .filter(|name| name.starts_with(partial))
            .cloned()
            .collect();
        names.sort();
        names
    }

    // -- History API --

    /// Get command history, oldest first.
    pub fn history(&self) -> Vec<String> {
        self.history.borrow().clone()
    }

    pub fn history_len(&self) -> usize {
        self.history.borrow().len()
    }

    /// History entry at `index`, or `None` if out of range.
    pub fn get_command_from_history(&self, index: usize) -> Option<String> {
        self.history.borrow().get(index).cloned()
    }

    // -- Events --

    pub fn events(&self) -> &Rc<EventDispatcher> {
        &self.events
    }

    pub fn add_event_listener(&self, name: &str, callback: impl Fn(&Event) + 'static) -> ListenerId {
        self.events.add_event_listener(name, callback)
    }

    pub fn remove_event_listener(&self, name: &str, id: ListenerId) -> bool {
        self.events.remove_event_listener(name, id)
    }

    pub fn dispatch_event(&self, event: Event) -> usize {
        self.events.dispatch_event(event)
    }

    /// Parse and execute a command line.
    ///
    /// Non-empty lines are appended to the history verbatim before parsing.
    pub fn execute(&self, line: &str) -> ExecuteStatus {
        if line.trim().is_empty() {
            return ExecuteStatus::Ignored;
        }
        self.history.borrow_mut().push(line.to_string());

        let Some(parsed) = parser::parse(line) else {
            return ExecuteStatus::Ignored;
        };
        let Some(cmd) = self.get_command(parsed.command_name()) else {
            log::debug!("command not found: {}", parsed.command_name());
            self.events
                .dispatch_event(Event::command_not_found(parsed.command_name()));
            return ExecuteStatus::NotFound;
        };

        let (args, issues) = bind_arguments(&cmd, &parsed);
        if !issues.is_empty() {
            log::debug!("{}: {} invalid argument(s)", cmd.name(), issues.len());
            self.events
                .dispatch_event(Event::argument_error(cmd.name(), issues));
            return ExecuteStatus::InvalidArguments;
        }

        self.events.dispatch_event(Event::command_start(cmd.name()));
        cmd.execute(args);
        ExecuteStatus::Started
    }
}

impl Default for CommandRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for CommandRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let names: Vec<String> = self.commands().iter().map(|c| c.name().to_string()).collect();
        f.debug_struct("CommandRegistry")
            .field("commands", &names)
            .field("history", &self.history.borrow().len())
            .finish()
    }
}

/// Bind each declared argument, in declaration order, to a named option
/// (by name, then alias), else the next unconsumed positional value, else
/// its default; then validate it.
fn bind_arguments(cmd: &Command, parsed: &ParsedCommand) -> (Arguments, Issues) {
    let mut positional = parsed.positional_args().iter();
    let mut names = Vec::with_capacity(cmd.args_order().len());
    let mut values = Vec::with_capacity(cmd.args_order().len());
    let mut issues = Issues::new();

    for (index, name) in cmd.args_order().iter().enumerate() {
        let Some(def) = cmd.argument(name) else {
            continue;
        };
        let value = parsed
            .named_option(def.name())
            .or_else(|| def.alias_name().and_then(|alias| parsed.named_option(alias)))
            .map(str::to_string)
            .or_else(|| positional.next().cloned())
            .or_else(|| def.default().map(str::to_string));

        if let Err(errors) = def.validate(value.as_deref()) {
            issues.insert(index, errors);
        }
        names.push(name.clone());
        values.push(value);
    }
    (Arguments::new(names, values), issues)
}
