//! A value that mirrors itself into a [`KeyValueStore`].
//!
//! Hydrated once on construction, written through on every update. Write
//! failures are logged and otherwise ignored; the in-memory value stays
//! authoritative and the next update tries again.

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::rc::Rc;

use super::{load, save, KeyValueStore};

/// Shared handle to a store. Single-threaded by construction.
pub type SharedStore = Rc<dyn KeyValueStore>;

type Listener<T> = Box<dyn Fn(&T)>;

pub struct Persistent<T> {
    key: &'static str,
    value: T,
    store: SharedStore,
    listeners: Vec<Listener<T>>,
}

impl<T> Persistent<T>
where
    T: Serialize + DeserializeOwned,
{
    /// Read `key` from `store`, falling back to `initial` when nothing usable
    /// is stored.
    pub fn hydrate(store: SharedStore, key: &'static str, initial: T) -> Self {
        let value = match load::<T>(store.as_ref(), key) {
            Some(stored) => {
                tracing::debug!(key, "hydrated from storage");
                stored
            }
            None => initial,
        };
        Self {
            key,
            value,
            store,
            listeners: Vec::new(),
        }
    }

    pub fn key(&self) -> &'static str {
        self.key
    }

    pub fn get(&self) -> &T {
        &self.value
    }

    pub fn set(&mut self, value: T) {
        self.value = value;
        self.commit();
    }

    /// Mutate in place, then write through.
    pub fn update<R>(&mut self, f: impl FnOnce(&mut T) -> R) -> R {
        let r = f(&mut self.value);
        self.commit();
        r
    }

    /// Register a listener called after every update, in registration order.
    pub fn subscribe(&mut self, listener: impl Fn(&T) + 'static) {
        self.listeners.push(Box::new(listener));
    }

    fn commit(&self) {
        save(self.store.as_ref(), self.key, &self.value);
        for listener in &self.listeners {
            listener(&self.value);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;
    use std::cell::RefCell;

    #[test]
    fn hydrate_uses_initial_when_empty() {
        let store: SharedStore = Rc::new(MemoryStore::new());
        let p = Persistent::hydrate(store, "app_count", 7u32);
        assert_eq!(*p.get(), 7);
    }

    #[test]
    fn updates_write_through_and_rehydrate() {
        let store: SharedStore = Rc::new(MemoryStore::new());
        let mut p = Persistent::hydrate(store.clone(), "app_list", Vec::<String>::new());
        p.update(|v| v.push("Maths".into()));

        let again = Persistent::hydrate(store, "app_list", Vec::<String>::new());
        assert_eq!(again.get(), &vec!["Maths".to_string()]);
    }

    #[test]
    fn listeners_see_new_value() {
        let store: SharedStore = Rc::new(MemoryStore::new());
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = seen.clone();

        let mut p = Persistent::hydrate(store, "app_count", 0u32);
        p.subscribe(move |v| sink.borrow_mut().push(*v));
        p.set(1);
        p.update(|v| *v += 1);

        assert_eq!(*seen.borrow(), vec![1, 2]);
    }

    #[test]
    fn unavailable_store_keeps_value_in_memory() {
        let store: SharedStore = Rc::new(MemoryStore::unavailable());
        let mut p = Persistent::hydrate(store, "app_count", 0u32);
        p.set(5);
        assert_eq!(*p.get(), 5);
    }
}
