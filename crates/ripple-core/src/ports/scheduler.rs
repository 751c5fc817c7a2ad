//! Scheduler port - 遅延コールバックの抽象化
//!
//! `delay` operator が使う唯一の中断点です。
//! trait にしておくことで、本番は tokio のタイマー、テストは仮想時計に差し替えられます。
//!
//! # 実装
//! - **TokioScheduler**: `tokio::spawn` + `sleep`（本番用）
//! - **ManualScheduler**: `advance()` で進める仮想時計（テスト用）

use std::time::Duration;

use crate::domain::errors::SchedulerError;

/// A deferred callback.
pub type Task = Box<dyn FnOnce() + Send + 'static>;

/// Scheduler runs a callback once `after` has elapsed.
///
/// # 順序
/// 同じ `after` で登録されたコールバック同士の実行順は実装依存です。
/// `TokioScheduler` ではタイマー粒度次第で入れ替わり得ます。
pub trait Scheduler: Send + Sync {
    fn schedule(&self, after: Duration, task: Task) -> Result<TimerHandle, SchedulerError>;
}

/// Cancels a pending callback. Dropping the handle leaves the callback scheduled.
pub struct TimerHandle {
    cancel: Option<Box<dyn FnOnce() + Send>>,
}

impl TimerHandle {
    pub fn new<F>(cancel: F) -> Self
    where
        F: FnOnce() + Send + 'static,
    {
        Self {
            cancel: Some(Box::new(cancel)),
        }
    }

    /// Abort the callback if it has not run yet.
    pub fn cancel(mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}

impl std::fmt::Debug for TimerHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TimerHandle").finish_non_exhaustive()
    }
}
