//! Operators - Observable を包んで新しい Observable を返すファクトリ
//!
//! 各 operator は上流の Observable を clone してクロージャに持ち、
//! subscribe されたときに adapter observer で上流を subscribe します。
//!
//! # 共通ルール
//! - 上流は下流 subscription の子 subscription で subscribe する（dispose が上流へ伝わる）
//! - ユーザーのコールバックは unwind 境界で包み、panic は `error` に変換する
//! - fault を出した段は上流を dispose して以後何も流さない

pub mod delay;
pub mod filter;
pub mod map;

use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;

use crate::domain::{Observer, StreamError, Subscription};
use crate::observable::{Observable, Subscriber};

pub use self::delay::DelayPolicy;

/// What a synchronous stage decided for one upstream value.
pub(crate) enum Step<U> {
    Emit(U),
    Skip,
}

/// Run a user callback, turning a panic into a `StreamError::Panicked`.
pub(crate) fn guard<R>(operator: &'static str, f: impl FnOnce() -> R) -> Result<R, StreamError> {
    catch_unwind(AssertUnwindSafe(f)).map_err(|payload| StreamError::panicked(operator, payload))
}

/// Terminate a stage: dispose its upstream, then report `err` downstream.
pub(crate) fn fault<U>(downstream: &Subscriber<U>, upstream: &Subscription, err: StreamError) {
    tracing::warn!(subscription = %downstream.subscription().id(), %err, "operator fault");
    upstream.unsubscribe();
    downstream.error(err);
}

/// Adapter observer that forwards `error` / `complete` unchanged.
pub(crate) fn forwarding<T, U>(
    downstream: &Subscriber<U>,
    next: impl FnMut(T) + Send + 'static,
) -> Observer<T>
where
    U: Send + 'static,
{
    let on_error = downstream.clone();
    let on_complete = downstream.clone();
    Observer::new()
        .on_next(next)
        .on_error(move |err| on_error.error(err))
        .on_complete(move || on_complete.complete())
}

impl<T: Send + 'static> Observable<T> {
    /// Shared body of the synchronous operators (`map`, `filter`, and their
    /// fallible forms).
    pub(crate) fn lift<U, F>(&self, operator: &'static str, step: F) -> Observable<U>
    where
        U: Send + 'static,
        F: Fn(T) -> Result<Step<U>, StreamError> + Send + Sync + 'static,
    {
        let upstream = self.clone();
        let step = Arc::new(step);
        Observable::new(move |downstream: Subscriber<U>| {
            let upstream_sub = downstream.subscription().child();
            let step = Arc::clone(&step);
            let sink = downstream.clone();
            let stage_sub = upstream_sub.clone();
            let adapter = forwarding(&downstream, move |x: T| {
                match guard(operator, || (*step)(x)).and_then(|r| r) {
                    Ok(Step::Emit(y)) => sink.next(y),
                    Ok(Step::Skip) => {}
                    Err(err) => fault(&sink, &stage_sub, err),
                }
            });
            upstream.subscribe_with(adapter, upstream_sub);
        })
    }
}
