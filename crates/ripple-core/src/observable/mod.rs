//! Observable - cold な push 型ストリームの本体
//!
//! `Observable<T>` は producer 関数を 1 つ包んだ値です。
//! `subscribe` のたびに producer を呼び出し直すので、subscriber 間で状態を共有しません。
//!
//! # フロー
//! 1. 一番外側の `subscribe` が operator の adapter を経由して source まで subscribe を伝える
//! 2. 値は逆向きに source → adapter → 最終 observer へ流れる
//!
//! operator（`map`, `filter`, `delay` など）は [`crate::operators`] で定義しています。

pub mod subscriber;

use std::sync::Arc;

use crate::domain::{Observer, Subscription};

pub use self::subscriber::Subscriber;

type Produce<T> = dyn Fn(Subscriber<T>) + Send + Sync;

/// A not-yet-started production of a sequence of values.
///
/// # 使用例
/// ```
/// use ripple_core::{Observable, Observer};
///
/// let source = Observable::new(|subscriber| {
///     for x in [10, 20, 30] {
///         subscriber.next(x);
///     }
///     subscriber.complete();
/// });
///
/// source
///     .map(|x| x / 10)
///     .filter(|x| *x != 2)
///     .subscribe(Observer::from_next(|x: i32| println!("{x}")));
/// ```
pub struct Observable<T> {
    produce: Arc<Produce<T>>,
}

impl<T> Clone for Observable<T> {
    fn clone(&self) -> Self {
        Self {
            produce: Arc::clone(&self.produce),
        }
    }
}

impl<T: Send + 'static> Observable<T> {
    /// Wrap a production function.
    ///
    /// The function runs once per `subscribe`, synchronously on the caller's thread.
    /// A panic inside it is not caught.
    pub fn new<F>(produce: F) -> Self
    where
        F: Fn(Subscriber<T>) + Send + Sync + 'static,
    {
        Self {
            produce: Arc::new(produce),
        }
    }

    /// Start a new, independent production for `observer`.
    pub fn subscribe<O>(&self, observer: O) -> Subscription
    where
        O: Into<Observer<T>>,
    {
        let subscription = Subscription::new();
        tracing::debug!(subscription = %subscription.id(), "subscribe");
        self.subscribe_with(observer.into(), subscription.clone());
        subscription
    }

    /// Subscribe under an existing subscription.
    ///
    /// Operators use this to tie the upstream production to a child of the
    /// downstream subscription.
    pub fn subscribe_with(&self, observer: Observer<T>, subscription: Subscription) {
        if subscription.is_closed() {
            return;
        }
        (self.produce)(Subscriber::new(observer, subscription));
    }
}

impl<T> std::fmt::Debug for Observable<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Observable").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::StreamError;
    use crate::testing::{Notification, Recorder};
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn ten_twenty_thirty() -> Observable<i32> {
        Observable::new(|subscriber| {
            for x in [10, 20, 30] {
                subscriber.next(x);
            }
            subscriber.complete();
        })
    }

    #[test]
    fn subscribe_runs_producer_synchronously() {
        let recorder = Recorder::new();
        ten_twenty_thirty().subscribe(recorder.observer());

        assert_eq!(
            recorder.notifications(),
            vec![
                Notification::Next(10),
                Notification::Next(20),
                Notification::Next(30),
                Notification::Complete,
            ]
        );
    }

    #[test]
    fn nothing_runs_until_subscribe() {
        let calls = Arc::new(AtomicUsize::new(0));
        let c = calls.clone();
        let source = Observable::<()>::new(move |_| {
            c.fetch_add(1, Ordering::SeqCst);
        });
        assert_eq!(calls.load(Ordering::SeqCst), 0);

        source.subscribe(Observer::<()>::new());
        source.subscribe(Observer::<()>::new());
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn each_subscription_is_independent() {
        let source = ten_twenty_thirty();
        let first = Recorder::new();
        let second = Recorder::new();

        source.subscribe(first.observer());
        source.subscribe(second.observer());

        assert_eq!(first.values(), vec![10, 20, 30]);
        assert_eq!(second.values(), vec![10, 20, 30]);
        assert!(first.is_completed());
        assert!(second.is_completed());
    }

    #[test]
    fn next_only_observer_tolerates_terminals() {
        let ok = Observable::new(|s: Subscriber<i32>| {
            s.next(1);
            s.complete();
        });
        let failing = Observable::new(|s: Subscriber<i32>| s.error(StreamError::msg("boom")));

        let seen = Arc::new(AtomicUsize::new(0));
        let c = seen.clone();
        ok.subscribe(move |_: i32| {
            c.fetch_add(1, Ordering::SeqCst);
        });
        failing.subscribe(|_: i32| {});

        assert_eq!(seen.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn producer_error_is_relayed() {
        let recorder = Recorder::<i32>::new();
        Observable::new(|s: Subscriber<i32>| s.error(StreamError::msg("no data")))
            .subscribe(recorder.observer());

        assert_eq!(recorder.errors(), vec!["producer failed: no data".to_string()]);
    }

    #[test]
    fn subscribe_with_closed_subscription_does_nothing() {
        let calls = Arc::new(AtomicUsize::new(0));
        let c = calls.clone();
        let source = Observable::<()>::new(move |_| {
            c.fetch_add(1, Ordering::SeqCst);
        });
        let subscription = Subscription::new();
        subscription.unsubscribe();

        source.subscribe_with(Observer::<()>::new(), subscription);
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }
}
