//! Testing helpers - 受け取った通知をすべて記録する observer
//!
//! 通知ごとに tokio の `Instant` で時刻を記録します。
//! `#[tokio::test(start_paused = true)]` と組み合わせると `delay` のタイミングを検証できます。

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::time::Instant;

use crate::domain::Observer;

/// One recorded notification. Errors are kept as their display string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notification<T> {
    Next(T),
    Error(String),
    Complete,
}

type Log<T> = Vec<(Duration, Notification<T>)>;

/// Recording observer factory. Clones share the same log.
pub struct Recorder<T> {
    started: Instant,
    log: Arc<Mutex<Log<T>>>,
}

impl<T> Clone for Recorder<T> {
    fn clone(&self) -> Self {
        Self {
            started: self.started,
            log: Arc::clone(&self.log),
        }
    }
}

impl<T: Send + 'static> Recorder<T> {
    pub fn new() -> Self {
        Self {
            started: Instant::now(),
            log: Arc::new(Mutex::new(Vec::new())),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Log<T>> {
        self.log.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// An observer that appends to this recorder.
    pub fn observer(&self) -> Observer<T> {
        let (on_next, on_error, on_complete) = (self.clone(), self.clone(), self.clone());
        Observer::new()
            .on_next(move |x| on_next.push(Notification::Next(x)))
            .on_error(move |e| on_error.push(Notification::Error(e.to_string())))
            .on_complete(move || on_complete.push(Notification::Complete))
    }

    fn push(&self, notification: Notification<T>) {
        let at = self.started.elapsed();
        self.lock().push((at, notification));
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    pub fn is_completed(&self) -> bool {
        self.lock()
            .iter()
            .any(|(_, n)| matches!(n, Notification::Complete))
    }

    pub fn errors(&self) -> Vec<String> {
        self.lock()
            .iter()
            .filter_map(|(_, n)| match n {
                Notification::Error(e) => Some(e.clone()),
                _ => None,
            })
            .collect()
    }
}

impl<T: Clone + Send + 'static> Recorder<T> {
    pub fn notifications(&self) -> Vec<Notification<T>> {
        self.lock().iter().map(|(_, n)| n.clone()).collect()
    }

    /// Notifications with the time elapsed since the recorder was created.
    pub fn timeline(&self) -> Vec<(Duration, Notification<T>)> {
        self.lock().clone()
    }

    pub fn values(&self) -> Vec<T> {
        self.lock()
            .iter()
            .filter_map(|(_, n)| match n {
                Notification::Next(x) => Some(x.clone()),
                _ => None,
            })
            .collect()
    }
}

impl<T: Send + 'static> Default for Recorder<T> {
    fn default() -> Self {
        Self::new()
    }
}
