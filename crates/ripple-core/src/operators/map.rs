//! map / try_map
//!
//! 上流の `next` ごとに変換関数を 1 回だけ、受け取った順に呼びます。
//! 変換が panic したら `StreamError::Panicked` を下流の `error` に流し、上流を dispose します。

use std::error::Error;

use super::Step;
use crate::domain::StreamError;
use crate::observable::Observable;

impl<T: Send + 'static> Observable<T> {
    /// Transform every value with `transform`.
    pub fn map<U, F>(&self, transform: F) -> Observable<U>
    where
        U: Send + 'static,
        F: Fn(T) -> U + Send + Sync + 'static,
    {
        self.lift("map", move |x| Ok(Step::Emit(transform(x))))
    }

    /// Like [`map`](Self::map), but an `Err` from `transform` ends the stream
    /// with `StreamError::Operator`.
    pub fn try_map<U, E, F>(&self, transform: F) -> Observable<U>
    where
        U: Send + 'static,
        E: Error + Send + Sync + 'static,
        F: Fn(T) -> Result<U, E> + Send + Sync + 'static,
    {
        self.lift("try_map", move |x| {
            transform(x)
                .map(Step::Emit)
                .map_err(|err| StreamError::operator("try_map", err))
        })
    }
}
