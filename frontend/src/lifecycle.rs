//! Scoped release of per-row resources.

use std::fmt;

type Disposer = Box<dyn FnOnce() + Send>;

/// An ordered list of release handles.
///
/// `clear` releases everything acquired so far and leaves the store usable,
/// which is how per-bind listeners are dropped on unbind and rebind.
/// `dispose` also retires the store: anything added afterwards is released
/// immediately. Both are idempotent, and dropping the store disposes it.
#[derive(Default)]
pub struct DisposableStore {
    disposers: Vec<Disposer>,
    disposed: bool,
}

impl DisposableStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add<F>(&mut self, disposer: F)
    where
        F: FnOnce() + Send + 'static,
    {
        if self.disposed {
            log::warn!("adding to an already disposed store, releasing immediately");
            disposer();
            return;
        }
        self.disposers.push(Box::new(disposer));
    }

    pub fn clear(&mut self) {
        for disposer in self.disposers.drain(..) {
            disposer();
        }
    }

    pub fn dispose(&mut self) {
        self.disposed = true;
        self.clear();
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    pub fn len(&self) -> usize {
        self.disposers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.disposers.is_empty()
    }
}

impl Drop for DisposableStore {
    fn drop(&mut self) {
        self.dispose();
    }
}

impl fmt::Debug for DisposableStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DisposableStore")
            .field("pending", &self.disposers.len())
            .field("disposed", &self.disposed)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn counter() -> (Arc<AtomicUsize>, impl Fn() -> Box<dyn FnOnce() + Send>) {
        let count = Arc::new(AtomicUsize::new(0));
        let make = {
            let count = Arc::clone(&count);
            move || -> Box<dyn FnOnce() + Send> {
                let count = Arc::clone(&count);
                Box::new(move || {
                    count.fetch_add(1, Ordering::SeqCst);
                })
            }
        };
        (count, make)
    }

    #[test]
    fn test_clear_releases_once_and_stays_usable() {
        let (count, make) = counter();
        let mut store = DisposableStore::new();
        store.add(make());
        store.add(make());

        store.clear();
        store.clear();
        assert_eq!(count.load(Ordering::SeqCst), 2);
        assert!(store.is_empty());

        store.add(make());
        assert_eq!(store.len(), 1);
        assert_eq!(count.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_add_after_dispose_releases_immediately() {
        let (count, make) = counter();
        let mut store = DisposableStore::new();
        store.dispose();
        assert!(store.is_disposed());

        store.add(make());
        assert_eq!(count.load(Ordering::SeqCst), 1);
        assert!(store.is_empty());
    }

    #[test]
    fn test_drop_releases_pending() {
        let (count, make) = counter();
        {
            let mut store = DisposableStore::new();
            store.add(make());
        }
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }
}
