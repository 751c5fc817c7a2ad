//! filter / try_filter
//!
//! 述語を満たさない値は黙って捨てます（`next` も `error` も出さない）。
//! 残った値の順序は保たれます。

use std::error::Error;

use super::Step;
use crate::domain::StreamError;
use crate::observable::Observable;

impl<T: Send + 'static> Observable<T> {
    /// Keep only the values for which `predicate` holds.
    pub fn filter<F>(&self, predicate: F) -> Observable<T>
    where
        F: Fn(&T) -> bool + Send + Sync + 'static,
    {
        self.lift("filter", move |x| {
            Ok(if predicate(&x) { Step::Emit(x) } else { Step::Skip })
        })
    }

    /// Like [`filter`](Self::filter), but an `Err` from `predicate` ends the
    /// stream with `StreamError::Operator`.
    pub fn try_filter<E, F>(&self, predicate: F) -> Observable<T>
    where
        E: Error + Send + Sync + 'static,
        F: Fn(&T) -> Result<bool, E> + Send + Sync + 'static,
    {
        self.lift("try_filter", move |x| match predicate(&x) {
            Ok(true) => Ok(Step::Emit(x)),
            Ok(false) => Ok(Step::Skip),
            Err(err) => Err(StreamError::operator("try_filter", err)),
        })
    }
}
