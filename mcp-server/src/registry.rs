//! Primitive collections (C5, §4.5): name-indexed, change-observable sets
//! of tools and prompts.

use dashmap::DashMap;
use std::sync::Arc;
use std::sync::Mutex;

/// Anything with a stable, unique-within-its-collection name.
pub trait Named {
    fn name(&self) -> &str;
}

/// `Changed` subscribers are called synchronously from the mutating path
/// (§9: "subscribers are called synchronously from the mutating path; the
/// facade's subscriber only enqueues a notification write, which is fast").
pub enum Change<T> {
    Added(Arc<T>),
    Removed(Arc<T>),
}

type Subscriber<T> = Box<dyn Fn(&Change<T>) + Send + Sync>;

/// A concurrent, insertion-ordered, name-indexed set (§4.5). Reads and
/// additions are lock-free with respect to each other; `Snapshot` produces
/// an insertion-order copy so concurrent mutation never yields a torn read.
pub struct PrimitiveCollection<T: Named> {
    by_name: DashMap<String, Arc<T>>,
    order: Mutex<Vec<String>>,
    subscribers: Mutex<Vec<Subscriber<T>>>,
}

impl<T: Named> Default for PrimitiveCollection<T> {
    fn default() -> Self {
        Self {
            by_name: DashMap::new(),
            order: Mutex::new(Vec::new()),
            subscribers: Mutex::new(Vec::new()),
        }
    }
}

impl<T: Named> PrimitiveCollection<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// `TryAdd`: `false` on a duplicate name, otherwise `true`. Same-name
    /// contention is serialized by `DashMap`'s per-shard locking, so exactly
    /// one concurrent caller wins (§8 invariant 6).
    pub fn try_add(&self, item: T) -> bool {
        let name = item.name().to_string();
        let item = Arc::new(item);
        match self.by_name.entry(name.clone()) {
            dashmap::mapref::entry::Entry::Occupied(_) => false,
            dashmap::mapref::entry::Entry::Vacant(slot) => {
                slot.insert(Arc::clone(&item));
                self.order.lock().unwrap().push(name);
                self.notify(&Change::Added(item));
                true
            }
        }
    }

    pub fn remove(&self, name: &str) -> bool {
        match self.by_name.remove(name) {
            Some((_, item)) => {
                self.order.lock().unwrap().retain(|n| n != name);
                self.notify(&Change::Removed(item));
                true
            }
            None => false,
        }
    }

    pub fn try_get(&self, name: &str) -> Option<Arc<T>> {
        self.by_name.get(name).map(|e| Arc::clone(e.value()))
    }

    pub fn names(&self) -> Vec<String> {
        self.order.lock().unwrap().clone()
    }

    /// An insertion-order snapshot of every current entry.
    pub fn snapshot(&self) -> Vec<Arc<T>> {
        self.order
            .lock()
            .unwrap()
            .iter()
            .filter_map(|name| self.try_get(name))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.by_name.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }

    /// Subscribes to `Changed`. No unsubscribe is exposed: subscribers in
    /// this core are the facade's own list-changed notifiers, which live as
    /// long as the collection does (§4.5).
    pub fn on_changed(&self, subscriber: impl Fn(&Change<T>) + Send + Sync + 'static) {
        self.subscribers.lock().unwrap().push(Box::new(subscriber));
    }

    fn notify(&self, change: &Change<T>) {
        for subscriber in self.subscribers.lock().unwrap().iter() {
            subscriber(change);
        }
    }
}
