//! イベント駆動の producer
//!
//! `EventEmitter` は外部のイベント配送の仕組み（クリックなど）の代わりです。
//! `from_events` は subscribe のたびに新しいリスナーを登録し、
//! 自分からは complete しません。dispose するとリスナーを外します。

use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

use crate::domain::ListenerId;
use crate::observable::Observable;

type Listener<E> = Arc<dyn Fn(E) + Send + Sync>;
type Listeners<E> = Mutex<Vec<(ListenerId, Listener<E>)>>;

/// A minimal synchronous event dispatcher.
///
/// Clones share the same listener list.
pub struct EventEmitter<E> {
    listeners: Arc<Listeners<E>>,
}

impl<E> Clone for EventEmitter<E> {
    fn clone(&self) -> Self {
        Self {
            listeners: Arc::clone(&self.listeners),
        }
    }
}

fn lock<E>(listeners: &Listeners<E>) -> MutexGuard<'_, Vec<(ListenerId, Listener<E>)>> {
    listeners.lock().unwrap_or_else(PoisonError::into_inner)
}

impl<E: Clone + Send + 'static> EventEmitter<E> {
    pub fn new() -> Self {
        Self {
            listeners: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn add_listener<F>(&self, listener: F) -> ListenerId
    where
        F: Fn(E) + Send + Sync + 'static,
    {
        let id = ListenerId::generate();
        lock(&self.listeners).push((id, Arc::new(listener)));
        id
    }

    /// Returns `false` if `id` was not attached.
    pub fn remove_listener(&self, id: ListenerId) -> bool {
        let mut listeners = lock(&self.listeners);
        let before = listeners.len();
        listeners.retain(|(lid, _)| *lid != id);
        listeners.len() != before
    }

    pub fn listener_count(&self) -> usize {
        lock(&self.listeners).len()
    }

    /// Deliver `event` to every listener attached right now, in attach order.
    pub fn emit(&self, event: E) {
        // リスナーの中で add/remove されても deadlock しないよう snapshot を取る
        let snapshot: Vec<Listener<E>> = lock(&self.listeners)
            .iter()
            .map(|(_, l)| Arc::clone(l))
            .collect();
        for listener in snapshot {
            (*listener)(event.clone());
        }
    }
}

impl<E: Clone + Send + 'static> Default for EventEmitter<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> std::fmt::Debug for EventEmitter<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventEmitter")
            .field("listeners", &lock(&self.listeners).len())
            .finish()
    }
}

/// Push every event emitted by `emitter`. Never completes on its own.
pub fn from_events<E>(emitter: &EventEmitter<E>) -> Observable<E>
where
    E: Clone + Send + 'static,
{
    let emitter = emitter.clone();
    Observable::new(move |subscriber| {
        let sink = subscriber.clone();
        let id = emitter.add_listener(move |event| sink.next(event));
        tracing::debug!(subscription = %subscriber.subscription().id(), listener = %id, "listener attached");

        let listeners: Weak<Listeners<E>> = Arc::downgrade(&emitter.listeners);
        subscriber.add_teardown(move || {
            if let Some(listeners) = listeners.upgrade() {
                lock(&listeners).retain(|(lid, _)| *lid != id);
            }
        });
    })
}
