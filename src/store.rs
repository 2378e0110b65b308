//! Request-scoped key/value store.
//!
//! Keys are strings, values are opaque (`Box<dyn Any>`). Exactly one store
//! exists per request, owned by its [`Context`](crate::Context) — nothing
//! here is shared across requests, so there is no cross-request leakage to
//! defend against.

use std::any::Any;
use std::collections::HashMap;

type Value = Box<dyn Any + Send + Sync>;

#[derive(Default)]
pub(crate) struct Store {
    data: HashMap<String, Value>,
}

impl Store {
    /// Stores `value` under `key`, silently overwriting any previous value.
    pub(crate) fn set(&mut self, key: impl Into<String>, value: impl Any + Send + Sync) {
        self.data.insert(key.into(), Box::new(value));
    }

    /// Returns a clone of the stored value, or `None` if the key is absent
    /// or holds a different type.
    pub(crate) fn get<T: Any + Clone>(&self, key: &str) -> Option<T> {
        self.data.get(key).and_then(|v| v.downcast_ref::<T>()).cloned()
    }

    /// Like [`get`](Store::get) but fatal on a miss. Reserved for values a
    /// middleware guarantees are set before downstream links run.
    pub(crate) fn must_get<T: Any + Clone>(&self, key: &str) -> T {
        match self.get(key) {
            Some(value) => value,
            None => panic!("can not get context value by '{key}'"),
        }
    }
}
