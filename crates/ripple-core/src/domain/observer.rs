//! Observer - 3 つのコールバックを持つ受け手
//!
//! ロジックを持たない純粋なデータ契約です。
//! `error` / `complete` は省略可能で、省略時は no-op になります。

use super::errors::StreamError;

type NextFn<T> = Box<dyn FnMut(T) + Send>;
type ErrorFn = Box<dyn FnMut(StreamError) + Send>;
type CompleteFn = Box<dyn FnMut() + Send>;

/// A passive sink with three optional callback slots.
///
/// # 使用例
/// ```
/// use ripple_core::Observer;
///
/// let observer = Observer::new()
///     .on_next(|x: i32| println!("{x}"))
///     .on_error(|e| eprintln!("{e}"))
///     .on_complete(|| println!("done"));
/// # drop(observer);
/// ```
pub struct Observer<T> {
    next: Option<NextFn<T>>,
    error: Option<ErrorFn>,
    complete: Option<CompleteFn>,
}

impl<T> Observer<T> {
    /// An observer that ignores everything.
    pub fn new() -> Self {
        Self {
            next: None,
            error: None,
            complete: None,
        }
    }

    /// Shorthand for an observer with only a `next` handler.
    pub fn from_next<F>(f: F) -> Self
    where
        F: FnMut(T) + Send + 'static,
    {
        Self::new().on_next(f)
    }

    pub fn on_next<F>(mut self, f: F) -> Self
    where
        F: FnMut(T) + Send + 'static,
    {
        self.next = Some(Box::new(f));
        self
    }

    pub fn on_error<F>(mut self, f: F) -> Self
    where
        F: FnMut(StreamError) + Send + 'static,
    {
        self.error = Some(Box::new(f));
        self
    }

    pub fn on_complete<F>(mut self, f: F) -> Self
    where
        F: FnMut() + Send + 'static,
    {
        self.complete = Some(Box::new(f));
        self
    }

    pub fn next(&mut self, value: T) {
        if let Some(f) = self.next.as_mut() {
            f(value);
        }
    }

    pub fn error(&mut self, err: StreamError) {
        if let Some(f) = self.error.as_mut() {
            f(err);
        }
    }

    pub fn complete(&mut self) {
        if let Some(f) = self.complete.as_mut() {
            f();
        }
    }
}

impl<T> Default for Observer<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T, F> From<F> for Observer<T>
where
    F: FnMut(T) + Send + 'static,
{
    fn from(f: F) -> Self {
        Self::from_next(f)
    }
}

impl<T> std::fmt::Debug for Observer<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Observer")
            .field("next", &self.next.is_some())
            .field("error", &self.error.is_some())
            .field("complete", &self.complete.is_some())
            .finish()
    }
}
