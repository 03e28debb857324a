//! Named-event publish/subscribe.
//!
//! Components that emit events own an [`EventDispatcher`] and delegate
//! `add_event_listener` / `remove_event_listener` / `dispatch_event` to it.
//! Dispatch is synchronous fan-out on the calling thread.

use std::cell::{Cell, RefCell};
use std::collections::{BTreeMap, HashMap};
use std::rc::Rc;

/// Fired by the registry when a parsed name has no registered command.
pub const COMMAND_NOT_FOUND: &str = "commandNotFound";
/// Fired by the registry when bound arguments fail validation.
pub const ARGUMENT_ERROR: &str = "argumentError";
/// Fired by the registry right before a command runs.
pub const COMMAND_START: &str = "commandStart";
/// Fired by a command when it completes or is cancelled.
pub const COMMAND_COMPLETE: &str = "commandComplete";
/// Fired by the host to cancel the running command.
pub const CANCEL: &str = "cancel";

/// Validation failures keyed by argument index.
pub type Issues = BTreeMap<usize, Vec<String>>;

/// Event payload.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Payload {
    #[default]
    Empty,
    CommandNotFound {
        command: String,
    },
    CommandStart {
        command: String,
    },
    ArgumentError {
        command: String,
        issues: Issues,
    },
    CommandComplete {
        command: String,
        /// `None` when the command was cancelled or returned nothing.
        return_content: Option<String>,
    },
}

/// A named event. `target` is filled in by the dispatcher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
    name: String,
    payload: Payload,
    target: Option<String>,
}

impl Event {
    pub fn new(name: impl Into<String>, payload: Payload) -> Self {
        Self {
            name: name.into(),
            payload,
            target: None,
        }
    }

    /// An event with an empty payload.
    pub fn named(name: impl Into<String>) -> Self {
        Self::new(name, Payload::Empty)
    }

    pub fn command_not_found(command: &str) -> Self {
        Self::new(
            COMMAND_NOT_FOUND,
            Payload::CommandNotFound {
                command: command.to_string(),
            },
        )
    }

    pub fn command_start(command: &str) -> Self {
        Self::new(
            COMMAND_START,
            Payload::CommandStart {
                command: command.to_string(),
            },
        )
    }

    pub fn argument_error(command: &str, issues: Issues) -> Self {
        Self::new(
            ARGUMENT_ERROR,
            Payload::ArgumentError {
                command: command.to_string(),
                issues,
            },
        )
    }

    pub fn command_complete(command: &str, return_content: Option<String>) -> Self {
        Self::new(
            COMMAND_COMPLETE,
            Payload::CommandComplete {
                command: command.to_string(),
                return_content,
            },
        )
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn payload(&self) -> &Payload {
        &self.payload
    }

    /// Label of the dispatcher that delivered this event.
    pub fn target(&self) -> Option<&str> {
        self.target.as_deref()
    }
}

/// Handle returned by [`EventDispatcher::add_event_listener`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

type Listener = Rc<dyn Fn(&Event)>;

/// Publish/subscribe hub for named events.
pub struct EventDispatcher {
    label: String,
    next_id: Cell<u64>,
    listeners: RefCell<HashMap<String, Vec<(ListenerId, Listener)>>>,
}

impl EventDispatcher {
    /// Create a dispatcher. `label` becomes the `target` of dispatched events.
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            next_id: Cell::new(0),
            listeners: RefCell::new(HashMap::new()),
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    /// Register `callback` for events named `name`.
    pub fn add_event_listener(&self, name: &str, callback: impl Fn(&Event) + 'static) -> ListenerId {
        let id = ListenerId(self.next_id.get());
        self.next_id.set(id.0 + 1);
        self.listeners
            .borrow_mut()
            .entry(name.to_string())
            .or_default()
            .push((id, Rc::new(callback)));
        id
    }

    /// Remove a registration. Returns `false` if it was not registered.
    pub fn remove_event_listener(&self, name: &str, id: ListenerId) -> bool {
        let mut listeners = self.listeners.borrow_mut();
        let Some(list) = listeners.get_mut(name) else {
            return false;
        };
        match list.iter().position(|(lid, _)| *lid == id) {
            Some(pos) => {
                list.remove(pos);
                true
            },
            None => false,
        }
    }

    /// Number of listeners registered for `name`.
    pub fn listener_count(&self, name: &str) -> usize {
        self.listeners.borrow().get(name).map_or(0, Vec::len)
    }

    /// Deliver `event` to every listener registered for its name, in
    /// registration order. Returns the number of listeners invoked.
    ///
    /// The listener list is snapshotted first: listeners may add, remove or
    /// dispatch re-entrantly without affecting the current pass.
    pub fn dispatch_event(&self, mut event: Event) -> usize {
        let snapshot: Vec<Listener> = match self.listeners.borrow().get(&event.name) {
            Some(list) => list.iter().map(|(_, l)| Rc::clone(l)).collect(),
            None => return 0,
        };
        event.target = Some(self.label.clone());
        log::debug!(
            "{}: dispatching '{}' to {} listener(s)",
            self.label,
            event.name,
            snapshot.len()
        );
        for listener in &snapshot {
            listener(&event);
        }
        snapshot.len()
    }
}

impl std::fmt::Debug for EventDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let counts: HashMap<String, usize> = self
            .listeners
            .borrow()
            .iter()
            .map(|(k, v)| (k.clone(), v.len()))
            .collect();
        f.debug_struct("EventDispatcher")
            .field("label", &self.label)
            .field("listeners", &counts)
            .finish()
    }
}
