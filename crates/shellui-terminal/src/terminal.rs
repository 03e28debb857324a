//! Terminal controller: turns input events into line edits, history
//! browsing and command execution, and renders registry events through a
//! [`View`].

use std::cell::{Cell, Ref, RefCell};
use std::rc::{Rc, Weak};
use std::time::Instant;

use shellui_types::config::ShellConfig;
use shellui_types::error::Result;
use shellui_types::input::{END_OF_TEXT, InputEvent, Key};

use crate::buffer::LineBuffer;
use crate::builtins;
use crate::command::{Command, CommandCallback, CommandOptions};
use crate::event::{
    ARGUMENT_ERROR, CANCEL, COMMAND_COMPLETE, COMMAND_NOT_FOUND, COMMAND_START, Event, Payload,
};
use crate::locale::{LocaleCatalog, LocaleTable, MessageSource};
use crate::navigation::{self, Direction, Step};
use crate::registry::{CommandRegistry, ExecuteStatus};
use crate::view::View;

/// An interactive shell bound to one view.
pub struct Terminal {
    config: ShellConfig,
    registry: CommandRegistry,
    catalog: RefCell<LocaleCatalog>,
    buffer: RefCell<LineBuffer>,
    view: RefCell<Box<dyn View>>,
    history_index: Cell<Option<usize>>,
    control_pressed: Cell<bool>,
    meta_pressed: Cell<bool>,
    /// Commands between `commandStart` and `commandComplete`, oldest first.
    running: RefCell<Vec<(String, Instant)>>,
}

impl Terminal {
    /// Create a terminal with the embedded locale tables.
    pub fn new(view: impl View + 'static, config: ShellConfig) -> Rc<Self> {
        let catalog = LocaleCatalog::with_builtin(&config.language, &config.fallback_language);
        Self::with_catalog(view, config, catalog)
    }

    /// Create a terminal with a caller-supplied locale catalog.
    pub fn with_catalog(
        view: impl View + 'static,
        config: ShellConfig,
        catalog: LocaleCatalog,
    ) -> Rc<Self> {
        let terminal = Rc::new_cyclic(|weak: &Weak<Terminal>| {
            let registry = CommandRegistry::new();
            wire_events(&registry, weak);
            builtins::register_builtins(&registry, &config, weak);
            Self {
                config,
                registry,
                catalog: RefCell::new(catalog),
                buffer: RefCell::new(LineBuffer::new()),
                view: RefCell::new(Box::new(view)),
                history_index: Cell::new(None),
                control_pressed: Cell::new(false),
                meta_pressed: Cell::new(false),
                running: RefCell::new(Vec::new()),
            }
        });
        terminal
            .view
            .borrow_mut()
            .set_highlight_color(&terminal.config.highlight_color);
        log::info!(
            "Terminal ready (locale '{}', {} built-in command(s))",
            terminal.catalog().locale(),
            terminal.registry.commands().len()
        );
        terminal
    }

    pub fn config(&self) -> &ShellConfig {
        &self.config
    }

    pub fn registry(&self) -> &CommandRegistry {
        &self.registry
    }

    pub fn add_command(
        &self,
        name: &str,
        callback: CommandCallback,
        options: CommandOptions,
    ) -> Rc<Command> {
        self.registry.add_command(name, callback, options)
    }

    pub fn get_command(&self, name: &str) -> Option<Rc<Command>> {
        self.registry.get_command(name)
    }

    /// Execute a line directly, bypassing the input buffer and echo.
    pub fn execute(&self, line: &str) -> ExecuteStatus {
        self.registry.execute(line)
    }

    // -- Locale --

    pub fn catalog(&self) -> Ref<'_, LocaleCatalog> {
        self.catalog.borrow()
    }

    pub fn add_locale(&self, table: LocaleTable) {
        self.catalog.borrow_mut().add_table(table);
    }

    pub fn set_locale(&self, code: &str) -> Result<()> {
        self.catalog.borrow_mut().set_locale(code)
    }

    /// Localized message; the key itself when no table defines it.
    pub fn message(&self, key: &str, args: &[&str]) -> String {
        self.catalog
            .borrow()
            .get_message(key, args)
            .unwrap_or_else(|| key.to_string())
    }

    // -- State --

    /// Current input line.
    pub fn input_text(&self) -> String {
        self.buffer.borrow().text()
    }

    pub fn selection(&self) -> Option<usize> {
        self.buffer.borrow().selection()
    }

    /// History entry being browsed, if any.
    pub fn history_index(&self) -> Option<usize> {
        self.history_index.get()
    }

    /// Whether any command is between `commandStart` and `commandComplete`.
    pub fn is_running(&self) -> bool {
        !self.running.borrow().is_empty()
    }

    /// Names of the running commands, oldest first.
    pub fn running_commands(&self) -> Vec<String> {
        self.running.borrow().iter().map(|(name, _)| name.clone()).collect()
    }

    // -- Input --

    /// Apply one input event.
    pub fn handle_input(&self, event: &InputEvent) {
        match event {
            InputEvent::KeyDown(Key::Control) => self.control_pressed.set(true),
            InputEvent::KeyDown(Key::Meta) => self.meta_pressed.set(true),
            InputEvent::KeyUp(Key::Control) => self.control_pressed.set(false),
            InputEvent::KeyUp(Key::Meta) => self.meta_pressed.set(false),
            InputEvent::KeyUp(_) => return,
            InputEvent::KeyDown(Key::Enter) => self.submit(),
            InputEvent::KeyDown(Key::Backspace) => self.buffer.borrow_mut().remove_char(),
            InputEvent::KeyDown(Key::Left) => self.select_from_keyboard(Direction::Previous),
            InputEvent::KeyDown(Key::Right) => self.select_from_keyboard(Direction::Next),
            InputEvent::KeyDown(Key::Up) => self.select_command_from_history(Direction::Previous),
            InputEvent::KeyDown(Key::Down) => self.select_command_from_history(Direction::Next),
            InputEvent::TextInput(ch) => self.type_char(*ch),
            InputEvent::Paste(text) => self.buffer.borrow_mut().insert(text),
            InputEvent::Drop(payload) => self.buffer.borrow_mut().insert(&payload.to_input_text()),
        }
        self.render_input();
    }

    /// Type `text` followed by Enter.
    pub fn submit_line(&self, text: &str) {
        for ch in text.chars() {
            self.handle_input(&InputEvent::TextInput(ch));
        }
        self.handle_input(&InputEvent::KeyDown(Key::Enter));
    }

    /// Cancel the running command, if any, and clear the input line.
    pub fn cancel(&self) {
        self.buffer.borrow_mut().reset();
        if self.is_running() {
            let notice = self.message("commandCancelled", &[]);
            self.print(&notice);
        }
        self.registry.dispatch_event(Event::named(CANCEL));
    }

    /// Cancel the oldest running command whose timeout has elapsed.
    /// Returns `true` if one was cancelled.
    pub fn poll(&self, now: Instant) -> bool {
        let Some(timeout) = self.config.command_timeout() else {
            return false;
        };
        let expired = self
            .running
            .borrow()
            .iter()
            .find(|(_, started)| now.saturating_duration_since(*started) >= timeout)
            .map(|(name, _)| name.clone());
        let Some(name) = expired else {
            return false;
        };
        log::warn!("Command '{name}' timed out after {timeout:?}");
        let notice = self.message("commandTimeout", &[&name]);
        self.print(&notice);
        if let Some(cmd) = self.registry.get_command(&name) {
            cmd.cancel();
        }
        self.finish(&name);
        true
    }

    fn submit(&self) {
        let line = self.buffer.borrow().text();
        let echo = format!("{} {line}", self.config.prompt);
        self.print(&echo);
        self.buffer.borrow_mut().reset();
        self.render_input();
        self.registry.execute(&line);
        self.view.borrow_mut().scroll_to_bottom();
        self.history_index.set(None);
    }

    fn type_char(&self, ch: char) {
        if self.meta_pressed.get() {
            return;
        }
        if ch == END_OF_TEXT || (self.control_pressed.get() && matches!(ch, 'c' | 'C')) {
            self.cancel();
            return;
        }
        self.buffer.borrow_mut().insert_char(ch);
    }

    fn select_from_keyboard(&self, direction: Direction) {
        self.buffer.borrow_mut().move_selection(direction);
    }

    fn select_command_from_history(&self, direction: Direction) {
        let step = navigation::step(
            self.registry.history_len(),
            self.history_index.get(),
            direction,
        );
        if let Step::MoveTo(index) = step {
            self.repeat_command(index);
        }
    }

    /// Load history entry `index` into the input line.
    fn repeat_command(&self, index: Option<usize>) {
        self.history_index.set(index);
        if let Some(line) = index.and_then(|i| self.registry.get_command_from_history(i)) {
            self.buffer.borrow_mut().set_text(&line);
        }
    }

    fn print(&self, text: &str) {
        self.view.borrow_mut().print(text);
    }

    fn render_input(&self) {
        let buffer = self.buffer.borrow();
        self.view.borrow_mut().render_input(&buffer);
    }

    fn set_prompt_visible(&self, visible: bool) {
        self.view.borrow_mut().set_prompt_visible(visible);
    }

    // -- Registry events --

    fn on_command_not_found(&self, event: &Event) {
        if let Payload::CommandNotFound { command } = event.payload() {
            let text = self.message("commandNotFound", &[command]);
            self.print(&text);
        }
    }

    fn on_argument_error(&self, event: &Event) {
        let Payload::ArgumentError { command, issues } = event.payload() else {
            return;
        };
        let cmd = self.registry.get_command(command);
        let mut text = self.message("argumentError", &[command]);
        for (index, errors) in issues {
            let arg = cmd
                .as_ref()
                .and_then(|c| c.args_order().get(*index).cloned())
                .unwrap_or_default();
            let position = index.to_string();
            text.push('\n');
            text.push_str(&self.message(
                "argumentIssue",
                &[&position, &arg, &errors.join("; ")],
            ));
        }
        self.print(&text);
    }

    fn on_command_start(&self, event: &Event) {
        if let Payload::CommandStart { command } = event.payload() {
            let mut running = self.running.borrow_mut();
            running.retain(|(name, _)| name != command);
            running.push((command.clone(), Instant::now()));
        }
        self.set_prompt_visible(false);
    }

    fn on_command_complete(&self, event: &Event) {
        let Payload::CommandComplete {
            command,
            return_content,
        } = event.payload()
        else {
            return;
        };
        if let Some(content) = return_content
            && !content.is_empty()
        {
            self.print(content);
        }
        self.buffer.borrow_mut().reset();
        self.render_input();
        self.finish(command);
    }

    /// Forget `command` as running; the prompt returns once none are left.
    fn finish(&self, command: &str) {
        let idle = {
            let mut running = self.running.borrow_mut();
            running.retain(|(name, _)| name != command);
            running.is_empty()
        };
        if idle {
            self.set_prompt_visible(true);
        }
    }
}

impl std::fmt::Debug for Terminal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Terminal")
            .field("registry", &self.registry)
            .field("locale", &self.catalog.borrow().locale())
            .field("input", &self.buffer.borrow().text())
            .field("history_index", &self.history_index.get())
            .field("running", &self.is_running())
            .finish()
    }
}

/// Route registry events to the terminal behind `weak`.
fn wire_events(registry: &CommandRegistry, weak: &Weak<Terminal>) {
    let t = Weak::clone(weak);
    registry.add_event_listener(COMMAND_NOT_FOUND, move |e| {
        if let Some(term) = t.upgrade() {
            term.on_command_not_found(e);
        }
    });
    let t = Weak::clone(weak);
    registry.add_event_listener(ARGUMENT_ERROR, move |e| {
        if let Some(term) = t.upgrade() {
            term.on_argument_error(e);
        }
    });
    let t = Weak::clone(weak);
    registry.add_event_listener(COMMAND_START, move |e| {
        if let Some(term) = t.upgrade() {
            term.on_command_start(e);
        }
    });
    let t = Weak::clone(weak);
    registry.add_event_listener(COMMAND_COMPLETE, move |e| {
        if let Some(term) = t.upgrade() {
            term.on_command_complete(e);
        }
    });
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use shellui_types::input::DropPayload;

    use super::*;
    use crate::command::{CommandState, Completion};
    use crate::view::{RecordingView, ViewLog};

    fn terminal() -> (Rc<Terminal>, Rc<RefCell<ViewLog>>) {
        terminal_with(ShellConfig::default())
    }

    fn terminal_with(config: ShellConfig) -> (Rc<Terminal>, Rc<RefCell<ViewLog>>) {
        let view = RecordingView::new();
        let log = view.log();
        (Terminal::new(view, config), log)
    }

    fn type_text(t: &Terminal, text: &str) {
        for ch in text.chars() {
            t.handle_input(&InputEvent::TextInput(ch));
        }
    }

    fn key(t: &Terminal, k: Key) {
        t.handle_input(&InputEvent::KeyDown(k));
    }

    #[test]
    fn view_receives_highlight_color() {
        let config = ShellConfig {
            highlight_color: "#ff8800".into(),
            ..ShellConfig::default()
        };
        let (_t, log) = terminal_with(config);
        assert_eq!(log.borrow().highlight_color.as_deref(), Some("#ff8800"));
    }

    #[test]
    fn typing_renders_input() {
        let (t, log) = terminal();
        type_text(&t, "abc");
        assert_eq!(t.input_text(), "abc");
        assert_eq!(log.borrow().input, "abc");
    }

    #[test]
    fn enter_echoes_and_executes() {
        let (t, log) = terminal();
        t.add_command(
            "echo",
            CommandCallback::sync(|args| args.get("text").map(str::to_string)),
            CommandOptions::new().arg_names(["text"]),
        );
        t.submit_line("echo hi");
        let log = log.borrow();
        assert_eq!(log.output, vec!["$ echo hi", "hi"]);
        assert!(log.prompt_visible);
        assert_eq!(log.input, "");
        assert_eq!(t.registry().history(), vec!["echo hi"]);
    }

    #[test]
    fn not_found_is_printed() {
        let (t, log) = terminal();
        t.submit_line("nope");
        assert_eq!(log.borrow().output, vec!["$ nope", "command not found: nope"]);
    }

    #[test]
    fn argument_error_is_printed() {
        let (t, log) = terminal();
        t.add_command(
            "greet",
            CommandCallback::sync(|_| None),
            CommandOptions::new().arg(
                crate::argument::ArgumentDefinition::new("name")
                    .validator(crate::validator::Validator::required()),
            ),
        );
        t.submit_line("greet");
        let log = log.borrow();
        assert_eq!(log.output[1], "greet: invalid arguments\n  [0] name: a value is required");
    }

    #[test]
    fn empty_output_prints_nothing() {
        let (t, log) = terminal();
        t.add_command("quiet", CommandCallback::sync(|_| Some(String::new())), CommandOptions::new());
        t.submit_line("quiet");
        assert_eq!(log.borrow().output, vec!["$ quiet"]);
    }

    #[test]
    fn backspace_and_selection_editing() {
        let (t, log) = terminal();
        type_text(&t, "helo");
        key(&t, Key::Left);
        type_text(&t, "l");
        assert_eq!(t.input_text(), "hello");
        assert_eq!(t.selection(), Some(4));
        key(&t, Key::Right);
        assert_eq!(t.selection(), None);
        key(&t, Key::Backspace);
        assert_eq!(t.input_text(), "hell");
        assert_eq!(log.borrow().input, "hell");
    }

    #[test]
    fn history_browsing() {
        let (t, _log) = terminal();
        t.submit_line("first");
        t.submit_line("second");
        t.submit_line("third");

        key(&t, Key::Up);
        assert_eq!(t.history_index(), Some(2));
        assert_eq!(t.input_text(), "third");
        key(&t, Key::Up);
        key(&t, Key::Up);
        assert_eq!(t.input_text(), "first");
        key(&t, Key::Up);
        assert_eq!(t.history_index(), Some(0));
        assert_eq!(t.input_text(), "first");
        key(&t, Key::Down);
        assert_eq!(t.input_text(), "second");
        key(&t, Key::Down);
        key(&t, Key::Down);
        assert_eq!(t.history_index(), None);
        assert_eq!(t.input_text(), "third");
    }

    #[test]
    fn enter_leaves_history_browsing() {
        let (t, _log) = terminal();
        t.submit_line("first");
        key(&t, Key::Up);
        key(&t, Key::Enter);
        assert_eq!(t.history_index(), None);
        assert_eq!(t.registry().history(), vec!["first", "first"]);
    }

    #[test]
    fn history_with_no_entries_is_noop() {
        let (t, _log) = terminal();
        type_text(&t, "draft");
        key(&t, Key::Up);
        assert_eq!(t.history_index(), None);
        assert_eq!(t.input_text(), "draft");
    }

    #[test]
    fn meta_blocks_typing_but_not_paste() {
        let (t, _log) = terminal();
        key(&t, Key::Meta);
        type_text(&t, "v");
        assert_eq!(t.input_text(), "");
        t.handle_input(&InputEvent::Paste("pasted".into()));
        assert_eq!(t.input_text(), "pasted");
        t.handle_input(&InputEvent::KeyUp(Key::Meta));
        type_text(&t, "!");
        assert_eq!(t.input_text(), "pasted!");
    }

    #[test]
    fn drop_inserts_file_names() {
        let (t, _log) = terminal();
        type_text(&t, "cat ");
        t.handle_input(&InputEvent::Drop(DropPayload::Files(vec!["a.txt".into(), "b.txt".into()])));
        assert_eq!(t.input_text(), "cat a.txt b.txt");
    }

    #[test]
    fn ctrl_c_clears_line() {
        let (t, log) = terminal();
        type_text(&t, "some text");
        key(&t, Key::Control);
        type_text(&t, "c");
        t.handle_input(&InputEvent::KeyUp(Key::Control));
        assert_eq!(t.input_text(), "");
        assert!(log.borrow().output.is_empty());
        type_text(&t, "c");
        assert_eq!(t.input_text(), "c");
    }

    #[test]
    fn ctrl_c_cancels_async_command() {
        let (t, log) = terminal();
        let pending = Rc::new(RefCell::new(None));
        let pending2 = Rc::clone(&pending);
        t.add_command(
            "wait",
            CommandCallback::asynchronous(move |_, done| *pending2.borrow_mut() = Some(done)),
            CommandOptions::new(),
        );
        t.submit_line("wait");
        assert!(t.is_running());
        assert!(!log.borrow().prompt_visible);

        t.handle_input(&InputEvent::TextInput(END_OF_TEXT));
        assert!(!t.is_running());
        assert!(log.borrow().prompt_visible);

        let done: crate::command::Completion = pending.borrow_mut().take().unwrap();
        done.end(Some("too late".into()));
        assert_eq!(log.borrow().output, vec!["$ wait", "^C"]);
    }

    #[test]
    fn async_completion_prints_result() {
        let (t, log) = terminal();
        let pending = Rc::new(RefCell::new(None));
        let pending2 = Rc::clone(&pending);
        t.add_command(
            "wait",
            CommandCallback::asynchronous(move |_, done| *pending2.borrow_mut() = Some(done)),
            CommandOptions::new(),
        );
        t.submit_line("wait");
        let done: crate::command::Completion = pending.borrow_mut().take().unwrap();
        done.end(Some("finished".into()));
        assert_eq!(log.borrow().output, vec!["$ wait", "finished"]);
        assert!(log.borrow().prompt_visible);
    }

    #[test]
    fn poll_times_out_running_command() {
        let config = ShellConfig {
            command_timeout_ms: Some(100),
            ..ShellConfig::default()
        };
        let (t, log) = terminal_with(config);
        let pending = Rc::new(RefCell::new(None));
        let pending2 = Rc::clone(&pending);
        t.add_command(
            "hang",
            CommandCallback::asynchronous(move |_, done| *pending2.borrow_mut() = Some(done)),
            CommandOptions::new(),
        );
        t.submit_line("hang");
        assert!(!t.poll(Instant::now()));
        assert!(t.poll(Instant::now() + Duration::from_secs(1)));
        assert!(!t.is_running());
        assert_eq!(log.borrow().output, vec!["$ hang", "hang: timed out"]);
        assert!(!t.poll(Instant::now() + Duration::from_secs(2)));
    }

    /// Register async commands that park their completion handles in order.
    fn parked(t: &Terminal, names: &[&str]) -> Rc<RefCell<Vec<Completion>>> {
        let slots = Rc::new(RefCell::new(Vec::new()));
        for name in names {
            let slots = Rc::clone(&slots);
            t.add_command(
                name,
                CommandCallback::asynchronous(move |_, done| slots.borrow_mut().push(done)),
                CommandOptions::new(),
            );
        }
        slots
    }

    #[test]
    fn overlapping_commands_tracked_separately() {
        let config = ShellConfig {
            command_timeout_ms: Some(100),
            ..ShellConfig::default()
        };
        let (t, log) = terminal_with(config);
        let slots = parked(&t, &["a", "b"]);
        t.submit_line("a");
        t.submit_line("b");
        assert_eq!(t.running_commands(), vec!["a", "b"]);

        slots.borrow()[0].end(Some("a done".into()));
        assert!(t.is_running());
        assert_eq!(t.running_commands(), vec!["b"]);
        assert!(!log.borrow().prompt_visible);

        assert!(t.poll(Instant::now() + Duration::from_secs(60)));
        assert_eq!(t.get_command("b").unwrap().state(), CommandState::Cancelled);
        assert!(!t.is_running());
        let log = log.borrow();
        assert_eq!(log.output, vec!["$ a", "$ b", "a done", "b: timed out"]);
        assert!(log.prompt_visible);
    }

    #[test]
    fn poll_cancels_oldest_expired_only() {
        let config = ShellConfig {
            command_timeout_ms: Some(100),
            ..ShellConfig::default()
        };
        let (t, _log) = terminal_with(config);
        let _slots = parked(&t, &["a", "b"]);
        t.submit_line("a");
        t.submit_line("b");

        assert!(t.poll(Instant::now() + Duration::from_secs(60)));
        assert_eq!(t.get_command("a").unwrap().state(), CommandState::Cancelled);
        assert_eq!(t.get_command("b").unwrap().state(), CommandState::Running);
        assert_eq!(t.running_commands(), vec!["b"]);
    }

    #[test]
    fn ctrl_c_notice_while_another_command_pending() {
        let (t, log) = terminal();
        let slots = parked(&t, &["a", "b"]);
        t.submit_line("a");
        t.submit_line("b");
        slots.borrow()[0].end(None);

        t.handle_input(&InputEvent::TextInput(END_OF_TEXT));
        assert!(!t.is_running());
        assert_eq!(log.borrow().output, vec!["$ a", "$ b", "^C"]);
    }

    #[test]
    fn poll_without_timeout_does_nothing() {
        let (t, _log) = terminal();
        assert!(!t.poll(Instant::now() + Duration::from_secs(3600)));
    }

    #[test]
    fn builtins_registered_by_default() {
        let (t, _log) = terminal();
        assert!(t.get_command("help").is_some());
        assert!(t.get_command("setLang").is_some());
    }

    #[test]
    fn builtins_can_be_disabled() {
        let config = ShellConfig {
            help_enabled: false,
            set_lang_enabled: false,
            ..ShellConfig::default()
        };
        let (t, _log) = terminal_with(config);
        assert!(t.registry().commands().is_empty());
    }

    #[test]
    fn help_lists_itself() {
        let (t, log) = terminal();
        t.submit_line("help");
        let log = log.borrow();
        assert!(log.output[1].contains(" - help [command] "));
        assert!(log.output[1].contains(" - setLang [lang] "));
    }

    #[test]
    fn set_lang_switches_messages() {
        let (t, log) = terminal();
        t.submit_line("setLang fr");
        t.submit_line("nope");
        t.submit_line("setLang xx");
        let log = log.borrow();
        assert_eq!(log.output[1], "langue changée en fr");
        assert_eq!(log.output[3], "commande introuvable : nope");
        assert_eq!(log.output[5], "langue non prise en charge : xx");
        assert_eq!(t.catalog().locale(), "fr");
    }

    #[test]
    fn custom_prompt_in_echo() {
        let config = ShellConfig {
            prompt: ">".into(),
            ..ShellConfig::default()
        };
        let (t, log) = terminal_with(config);
        t.submit_line("");
        assert_eq!(log.borrow().output, vec!["> "]);
    }

    #[test]
    fn unknown_message_key_falls_back_to_key() {
        let (t, _log) = terminal();
        assert_eq!(t.message("noSuchKey", &[]), "noSuchKey");
    }
}
