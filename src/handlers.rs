//! Mode scoped handler tables.
//!
//! Each key owns one [`HandlerTable`] per event class. A table maps a mode
//! label to a callback; looking up a mode with nothing registered is a no-op.

use std::collections::HashMap;

use crate::key::Key;

pub const DEFAULT_MODE: &str = "default";

pub type Handler = Box<dyn FnMut(&mut Key)>;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Event {
    Press,
    Release,
    Hold,
}

pub struct HandlerTable {
    handlers: HashMap<String, Handler>,
}

impl HandlerTable {
    pub fn new() -> Self {
        let mut handlers: HashMap<String, Handler> = HashMap::new();
        handlers.insert(DEFAULT_MODE.to_string(), Box::new(|_: &mut Key| {}));
        Self { handlers }
    }

    pub fn insert(&mut self, mode: &str, handler: Handler) -> Option<Handler> {
        self.handlers.insert(mode.to_string(), handler)
    }

    pub fn contains(&self, mode: &str) -> bool {
        self.handlers.contains_key(mode)
    }

    /// Removes the handler for `mode`. The `"default"` entry is reset to a
    /// no-op instead of disappearing.
    pub fn remove(&mut self, mode: &str) -> Option<Handler> {
        let removed = self.handlers.remove(mode);
        if mode == DEFAULT_MODE {
            self.handlers
                .insert(DEFAULT_MODE.to_string(), Box::new(|_: &mut Key| {}));
        }
        removed
    }

    // The handler is lent out while it runs so it can borrow the key mutably.
    pub(crate) fn take(&mut self, mode: &str) -> Option<Handler> {
        self.handlers.remove(mode)
    }

    // A handler registered from inside its own call wins over the one being
    // returned.
    pub(crate) fn put_back(&mut self, mode: &str, handler: Handler) {
        self.handlers.entry(mode.to_string()).or_insert(handler);
    }
}

impl Default for HandlerTable {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Default)]
pub struct Handlers {
    pub press: HandlerTable,
    pub release: HandlerTable,
    pub hold: HandlerTable,
}

impl Handlers {
    pub fn table_mut(&mut self, event: Event) -> &mut HandlerTable {
        match event {
            Event::Press => &mut self.press,
            Event::Release => &mut self.release,
            Event::Hold => &mut self.hold,
        }
    }
}
