//! Synchronous change notification for state manager subscribers.

use serde::Serialize;

/// Which collection a mutation touched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StoreEvent {
    CartChanged,
    WishlistChanged,
}

/// Handle returned by `subscribe`, used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Callback<S> = Box<dyn Fn(StoreEvent, &S) + Send + Sync>;

/// Ordered list of observers of some state `S`.
///
/// Callbacks run in subscription order on the thread performing the
/// mutation, and receive a read-only view of the state after the change.
pub struct Subscribers<S: ?Sized> {
    next_id: u64,
    callbacks: Vec<(SubscriptionId, Callback<S>)>,
}

impl<S: ?Sized> Default for Subscribers<S> {
    fn default() -> Self {
        Self {
            next_id: 0,
            callbacks: Vec::new(),
        }
    }
}

impl<S: ?Sized> Subscribers<S> {
    /// Register `callback`.
    pub fn subscribe<F>(&mut self, callback: F) -> SubscriptionId
    where
        F: Fn(StoreEvent, &S) + Send + Sync + 'static,
    {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.callbacks.push((id, Box::new(callback)));
        id
    }

    /// Remove a callback. Returns whether it was registered.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.callbacks.len();
        self.callbacks.retain(|(sub, _)| *sub != id);
        self.callbacks.len() != before
    }

    /// Invoke every callback with `event` and `state`.
    pub fn notify(&self, event: StoreEvent, state: &S) {
        for (_, callback) in &self.callbacks {
            callback(event, state);
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.callbacks.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.callbacks.is_empty()
    }
}

impl<S: ?Sized> std::fmt::Debug for Subscribers<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscribers")
            .field("count", &self.callbacks.len())
            .finish()
    }
}
