//! delay - 値を一定時間遅らせて下流へ流す
//!
//! パイプライン中で唯一の中断点です。`next` ごとに Scheduler へコールバックを登録し、
//! 呼び出し元には即座に制御を返します。
//!
//! # 終端の扱い（DelayPolicy）
//! - `Eager`（デフォルト）: `error` / `complete` は遅らせずに即座に流す。
//!   そのため `complete` が保留中の値より先に届くことがある。
//! - `FlushBeforeComplete`: `complete` は保留中の値がすべて届いてから流す。
//!   `error` は即座に流し、保留中の値は破棄する。
//!
//! # 順序
//! 同じ期間のタイマー同士でも、`TokioScheduler` では発火順が入れ替わることがある。
//! 値の到着順を保証したい場合は `ManualScheduler` のような決定的な Scheduler を使う。
//!
//! dispose されると保留中のタイマーはすべてキャンセルされる。

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use super::{fault, forwarding};
use crate::domain::{Observer, StreamError};
use crate::impls::TokioScheduler;
use crate::observable::{Observable, Subscriber};
use crate::ports::{Scheduler, TimerHandle};

/// How `delay` treats terminal signals relative to values still in flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DelayPolicy {
    /// Forward `error` / `complete` immediately.
    #[default]
    Eager,
    /// Hold `complete` until every pending value has been delivered.
    FlushBeforeComplete,
}

/// Timers of one delay stage.
#[derive(Default)]
struct Pending {
    next_key: u64,
    /// `None` until `schedule` has returned the handle.
    timers: HashMap<u64, Option<TimerHandle>>,
    /// Values scheduled but not yet returned from downstream `next`.
    in_flight: usize,
    complete_deferred: bool,
}

type SharedPending = Arc<Mutex<Pending>>;

fn lock(pending: &SharedPending) -> MutexGuard<'_, Pending> {
    pending.lock().unwrap_or_else(PoisonError::into_inner)
}

fn cancel_all(pending: &SharedPending) {
    let handles: Vec<TimerHandle> = {
        let mut p = lock(pending);
        p.complete_deferred = false;
        p.in_flight = 0;
        p.timers.drain().filter_map(|(_, h)| h).collect()
    };
    for handle in handles {
        handle.cancel();
    }
}

impl<T: Send + 'static> Observable<T> {
    /// Re-emit every value after `period`, using the tokio runtime's timers.
    pub fn delay(&self, period: Duration) -> Observable<T> {
        self.delay_on(period, TokioScheduler::new())
    }

    /// Re-emit every value after `period` on `scheduler`.
    pub fn delay_on<S>(&self, period: Duration, scheduler: S) -> Observable<T>
    where
        S: Scheduler + 'static,
    {
        self.delay_with(period, scheduler, DelayPolicy::Eager)
    }

    pub fn delay_with<S>(&self, period: Duration, scheduler: S, policy: DelayPolicy) -> Observable<T>
    where
        S: Scheduler + 'static,
    {
        let upstream = self.clone();
        let scheduler: Arc<dyn Scheduler> = Arc::new(scheduler);
        Observable::new(move |downstream: Subscriber<T>| {
            let upstream_sub = downstream.subscription().child();
            let pending: SharedPending = Arc::default();

            {
                let pending = Arc::clone(&pending);
                downstream.add_teardown(move || cancel_all(&pending));
            }

            let on_next = {
                let scheduler = Arc::clone(&scheduler);
                let pending = Arc::clone(&pending);
                let sink = downstream.clone();
                let stage_sub = upstream_sub.clone();
                move |x: T| {
                    let key = {
                        let mut p = lock(&pending);
                        let key = p.next_key;
                        p.next_key += 1;
                        p.in_flight += 1;
                        p.timers.insert(key, None);
                        key
                    };

                    let fire = {
                        let pending = Arc::clone(&pending);
                        let sink = sink.clone();
                        Box::new(move || {
                            lock(&pending).timers.remove(&key);
                            sink.next(x);
                            // complete は最後に next を返し終えた callback だけが流す
                            let flush = {
                                let mut p = lock(&pending);
                                p.in_flight = p.in_flight.saturating_sub(1);
                                let flush = p.in_flight == 0 && p.complete_deferred;
                                if flush {
                                    p.complete_deferred = false;
                                }
                                flush
                            };
                            if flush {
                                sink.complete();
                            }
                        })
                    };

                    tracing::trace!(subscription = %sink.subscription().id(), ?period, "delay scheduled");
                    match scheduler.schedule(period, fire) {
                        Ok(handle) => {
                            let stale = match lock(&pending).timers.get_mut(&key) {
                                Some(slot) => {
                                    *slot = Some(handle);
                                    None
                                }
                                // 発火済みか cancel_all 済み。発火済みなら cancel は何もしない
                                None => Some(handle),
                            };
                            if let Some(handle) = stale {
                                handle.cancel();
                            }
                        }
                        Err(err) => {
                            cancel_all(&pending);
                            fault(&sink, &stage_sub, StreamError::from(err));
                        }
                    }
                }
            };

            let adapter = match policy {
                DelayPolicy::Eager => forwarding(&downstream, on_next),
                DelayPolicy::FlushBeforeComplete => {
                    let on_error = downstream.clone();
                    let on_complete = downstream.clone();
                    let error_pending = Arc::clone(&pending);
                    let complete_pending = Arc::clone(&pending);
                    Observer::new()
                        .on_next(on_next)
                        .on_error(move |err| {
                            cancel_all(&error_pending);
                            on_error.error(err);
                        })
                        .on_complete(move || {
                            let now = {
                                let mut p = lock(&complete_pending);
                                if p.in_flight == 0 {
                                    true
                                } else {
                                    p.complete_deferred = true;
                                    false
                                }
                            };
                            if now {
                                on_complete.complete();
                            }
                        })
                }
            };

            upstream.subscribe_with(adapter, upstream_sub);
        })
    }
}
