//! 固定シーケンスの producer

use crate::domain::StreamError;
use crate::observable::Observable;

/// Push every item of `items`, then complete.
///
/// `items` は subscribe のたびに clone して最初から流し直します（cold）。
/// 途中で dispose されたら残りは流しません。
pub fn from_iter<I>(items: I) -> Observable<I::Item>
where
    I: IntoIterator + Clone + Send + Sync + 'static,
    I::Item: Send + 'static,
{
    Observable::new(move |subscriber| {
        for item in items.clone() {
            if subscriber.is_closed() {
                return;
            }
            subscriber.next(item);
        }
        subscriber.complete();
    })
}

/// Fail every subscription immediately with `err`.
pub fn fail<T: Send + 'static>(err: StreamError) -> Observable<T> {
    Observable::new(move |subscriber| subscriber.error(err.clone()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Observer;
    use crate::testing::{Notification, Recorder};
    use std::sync::{Arc, Mutex};

    #[test]
    fn pushes_all_then_completes() {
        let recorder = Recorder::new();
        from_iter(vec![10, 20, 30]).subscribe(recorder.observer());

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
    fn every_subscription_replays_the_sequence() {
        let source = from_iter(1..=3);
        let a = Recorder::new();
        let b = Recorder::new();

        source.subscribe(a.observer());
        source.subscribe(b.observer());

        assert_eq!(a.values(), vec![1, 2, 3]);
        assert_eq!(b.values(), vec![1, 2, 3]);
    }

    #[test]
    fn stops_when_observer_unsubscribes_midway() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let handle = Arc::new(Mutex::new(None::<crate::domain::Subscription>));

        let sink = seen.clone();
        let h = handle.clone();
        let observer = Observer::from_next(move |x: i32| {
            sink.lock().unwrap().push(x);
            if x == 2 {
                if let Some(sub) = h.lock().unwrap().as_ref() {
                    sub.unsubscribe();
                }
            }
        });

        // subscribe 前に handle を渡せないので、subscribe_with で先に用意する
        let subscription = crate::domain::Subscription::new();
        *handle.lock().unwrap() = Some(subscription.clone());
        from_iter(vec![1, 2, 3, 4]).subscribe_with(observer, subscription);

        assert_eq!(*seen.lock().unwrap(), vec![1, 2]);
    }

    #[test]
    fn fail_errors_each_subscriber() {
        let source = fail::<i32>(StreamError::msg("offline"));
        let a = Recorder::new();
        let b = Recorder::new();

        source.subscribe(a.observer());
        source.subscribe(b.observer());

        assert_eq!(a.errors(), vec!["producer failed: offline".to_string()]);
        assert_eq!(b.errors(), a.errors());
    }
}
