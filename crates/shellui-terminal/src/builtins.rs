//! Built-in `help` and `setLang` commands.

use std::rc::Weak;

use shellui_types::config::ShellConfig;

use crate::command::{CommandCallback, CommandOptions};
use crate::locale::MessageSource;
use crate::registry::CommandRegistry;
use crate::terminal::Terminal;

/// Register the built-ins enabled in `config`.
pub(crate) fn register_builtins(
    registry: &CommandRegistry,
    config: &ShellConfig,
    terminal: &Weak<Terminal>,
) {
    if config.help_enabled {
        let terminal = Weak::clone(terminal);
        registry.add_command(
            "help",
            CommandCallback::sync(move |args| {
                let term = terminal.upgrade()?;
                let catalog = term.catalog();
                Some(help_text(term.registry(), &*catalog, args.get("command")))
            }),
            CommandOptions::new()
                .arg_names(["command"])
                .summary("helpSummary"),
        );
    }

    if config.set_lang_enabled {
        let terminal = Weak::clone(terminal);
        registry.add_command(
            "setLang",
            CommandCallback::sync(move |args| {
                let term = terminal.upgrade()?;
                let lang = args.get("lang").unwrap_or_default();
                match term.set_locale(lang) {
                    Ok(()) => Some(term.message("setLangSuccess", &[lang])),
                    Err(_) => Some(term.message("setLangNotSupported", &[lang])),
                }
            }),
            CommandOptions::new()
                .arg_names(["lang"])
                .summary("setLangSummary"),
        );
    }
}

/// Help output: the full command list, or one command's help.
///
/// The list covers every registered command, `help` included.
pub fn help_text(
    registry: &CommandRegistry,
    messages: &dyn MessageSource,
    command: Option<&str>,
) -> String {
    match command.filter(|name| !name.is_empty()) {
        None => {
            let mut text = messages.resolve("commandListTitle");
            text.push_str("\n\n");
            for cmd in registry.commands() {
                text.push_str(" - ");
                text.push_str(&cmd.get_help(true, messages));
                text.push('\n');
            }
            text.push_str("\n ");
            text.push_str(&messages.resolve("commandHelp"));
            text
        },
        Some(name) => match registry.get_command(name) {
            Some(cmd) => cmd.get_help(false, messages),
            None => messages
                .get_message("commandNotFound", &[name])
                .unwrap_or_else(|| messages.resolve("commandNotFound")),
        },
    }
}
