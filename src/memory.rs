//! Process-wide key/value store for session values.
//!
//! [`Memory`] holds values of any `'static` type under string keys, such as
//! the signed-in username or a login flag. [`Memory::instance`] hands out the
//! shared store of the current thread; [`Memory::new`] makes an isolated one.

use std::any::Any;
use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use tracing::trace;

thread_local! {
    static INSTANCE: Memory = Memory::new();
}

/// Shared handle to a heterogeneous store. Clones see the same entries.
#[derive(Clone, Default)]
pub struct Memory {
    entries: Rc<RefCell<HashMap<String, Rc<dyn Any>>>>,
}

impl Memory {
    pub fn new() -> Self {
        Self::default()
    }

    /// The shared store of the current thread.
    pub fn instance() -> Self {
        INSTANCE.with(Memory::clone)
    }

    /// Store `value` under `key`, replacing any previous value.
    pub fn set<T: Any>(&self, key: impl Into<String>, value: T) {
        let key = key.into();
        trace!(%key, "memory set");
        self.entries.borrow_mut().insert(key, Rc::new(value));
    }

    /// The value under `key`, if present and of type `T`.
    pub fn get<T: Any + Clone>(&self, key: &str) -> Option<T> {
        self.entries
            .borrow()
            .get(key)
            .and_then(|value| value.downcast_ref::<T>())
            .cloned()
    }

    /// Whether `key` is present, whatever its type.
    pub fn has(&self, key: &str) -> bool {
        self.entries.borrow().contains_key(key)
    }

    /// Remove `key`. Returns whether it was present.
    pub fn remove(&self, key: &str) -> bool {
        self.entries.borrow_mut().remove(key).is_some()
    }

    /// Remove `key` and return its value if it was a `T`.
    pub fn pop<T: Any + Clone>(&self, key: &str) -> Option<T> {
        let value = self.entries.borrow_mut().remove(key)?;
        value.downcast_ref::<T>().cloned()
    }

    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }

    /// Forget every entry.
    pub fn clear(&self) {
        self.entries.borrow_mut().clear();
    }
}

impl fmt::Debug for Memory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let entries = self.entries.borrow();
        let mut keys: Vec<&String> = entries.keys().collect();
        keys.sort();
        f.debug_struct("Memory").field("keys", &keys).finish()
    }
}
