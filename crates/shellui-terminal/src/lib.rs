//! Command pipeline and terminal controller.
//!
//! Input lines are parsed into a command name, positional values and named
//! options, bound to the command's declared arguments, validated, and run.
//! Every outcome is reported as an event on the registry's dispatcher; the
//! [`Terminal`] controller listens to those events and renders them through
//! a [`View`].

pub mod argument;
pub mod buffer;
pub mod builtins;
pub mod command;
pub mod event;
pub mod locale;
pub mod navigation;
pub mod parser;
pub mod registry;
pub mod terminal;
pub mod validator;
pub mod view;

/// Declared argument of a command (validators, default, alias).
pub use argument::ArgumentDefinition;
/// Editable input line with character selection.
pub use buffer::LineBuffer;
/// Help text for the command list or a single command.
pub use builtins::help_text;
/// Commands, their callbacks, bound arguments and async completion handles.
pub use command::{Arguments, Command, CommandCallback, CommandOptions, CommandState, Completion};
/// Named events and the dispatcher that delivers them.
pub use event::{Event, EventDispatcher, ListenerId, Payload};
/// Localized message tables.
pub use locale::{LocaleCatalog, LocaleTable, MessageSource};
/// Index stepping shared by selection and history browsing.
pub use navigation::{Direction, Step};
/// Tokenized command line.
pub use parser::ParsedCommand;
/// Registry of commands with history and the execution pipeline.
pub use registry::{CommandRegistry, ExecuteStatus};
/// Interactive controller bound to a view.
pub use terminal::Terminal;
/// Argument constraints and value types.
pub use validator::{Constraint, Required, ValueType, Validator};
/// Output surface and its headless recording implementation.
pub use view::{RecordingView, View, ViewLog};
