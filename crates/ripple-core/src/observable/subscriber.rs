//! Subscriber - producer に渡される observer のラッパー
//!
//! producer は `Subscriber` を通して値を push します。
//! clone しても同じ observer / subscription を共有するので、
//! タイマーやイベントリスナーに持たせても構いません。
//!
//! # 保証
//! - subscription が閉じた後の `next` / `error` / `complete` は捨てる
//! - `error` と `complete` は合わせて 1 回しか届かない
//! - 終端後の `next` は捨てない（`delay` が終端より後に値を届けるため）
//!
//! # 注意
//! observer のコールバックから同じ subscriber へ同期的に push し直すと
//! 内部の Mutex で deadlock します。

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::domain::{Observer, StreamError, Subscription};

struct Inner<T> {
    observer: Mutex<Observer<T>>,
    stopped: AtomicBool,
    subscription: Subscription,
}

/// The producer-side handle of one subscription.
pub struct Subscriber<T> {
    inner: Arc<Inner<T>>,
}

impl<T> Clone for Subscriber<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T> Subscriber<T> {
    pub fn new(observer: Observer<T>, subscription: Subscription) -> Self {
        Self {
            inner: Arc::new(Inner {
                observer: Mutex::new(observer),
                stopped: AtomicBool::new(false),
                subscription,
            }),
        }
    }

    fn observer(&self) -> MutexGuard<'_, Observer<T>> {
        self.inner
            .observer
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    pub fn next(&self, value: T) {
        if self.is_closed() {
            return;
        }
        self.observer().next(value);
    }

    pub fn error(&self, err: StreamError) {
        if self.is_closed() {
            return;
        }
        if self.stop() {
            tracing::trace!(subscription = %self.inner.subscription.id(), %err, "error after terminal ignored");
            return;
        }
        self.observer().error(err);
    }

    pub fn complete(&self) {
        if self.is_closed() {
            return;
        }
        if self.stop() {
            tracing::trace!(subscription = %self.inner.subscription.id(), "complete after terminal ignored");
            return;
        }
        self.observer().complete();
    }

    /// Mark as stopped; returns `true` if it already was.
    fn stop(&self) -> bool {
        self.inner.stopped.swap(true, Ordering::AcqRel)
    }

    /// The subscription has been disposed; producers should stop pushing.
    pub fn is_closed(&self) -> bool {
        self.inner.subscription.is_closed()
    }

    /// A terminal signal (`error` or `complete`) has been delivered.
    pub fn is_stopped(&self) -> bool {
        self.inner.stopped.load(Ordering::Acquire)
    }

    pub fn add_teardown<F>(&self, teardown: F)
    where
        F: FnOnce() + Send + 'static,
    {
        self.inner.subscription.add(teardown);
    }

    pub fn subscription(&self) -> &Subscription {
        &self.inner.subscription
    }
}

impl<T> std::fmt::Debug for Subscriber<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscriber")
            .field("subscription", &self.inner.subscription)
            .field("stopped", &self.is_stopped())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{Notification, Recorder};

    #[test]
    fn only_first_terminal_is_delivered() {
        let recorder = Recorder::new();
        let subscriber = Subscriber::new(recorder.observer(), Subscription::new());

        subscriber.next(1);
        subscriber.complete();
        subscriber.error(StreamError::msg("late"));
        subscriber.complete();

        assert_eq!(
            recorder.notifications(),
            vec![Notification::Next(1), Notification::Complete]
        );
        assert!(subscriber.is_stopped());
    }

    #[test]
    fn closed_subscriber_drops_everything() {
        let recorder = Recorder::new();
        let subscription = Subscription::new();
        let subscriber = Subscriber::new(recorder.observer(), subscription.clone());

        subscriber.next(1);
        subscription.unsubscribe();
        subscriber.next(2);
        subscriber.complete();

        assert!(subscriber.is_closed());
        assert_eq!(recorder.notifications(), vec![Notification::Next(1)]);
    }

    #[test]
    fn next_after_terminal_still_reaches_observer() {
        let recorder = Recorder::new();
        let subscriber = Subscriber::new(recorder.observer(), Subscription::new());

        subscriber.complete();
        subscriber.next(9);

        assert_eq!(
            recorder.notifications(),
            vec![Notification::Complete, Notification::Next(9)]
        );
    }

    #[test]
    fn teardown_runs_on_unsubscribe() {
        let subscription = Subscription::new();
        let subscriber = Subscriber::new(Observer::<()>::new(), subscription.clone());
        let flag = Arc::new(AtomicBool::new(false));
        let f = flag.clone();

        subscriber.add_teardown(move || f.store(true, Ordering::SeqCst));
        subscription.unsubscribe();

        assert!(flag.load(Ordering::SeqCst));
    }
}
