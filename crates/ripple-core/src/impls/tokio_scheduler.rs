//! TokioScheduler - tokio のタイマーで遅延実行する Scheduler
//!
//! コールバック 1 つにつき 1 タスクを spawn し、`sleep` 後に実行します。
//! キャンセルは `JoinHandle::abort()`。

use std::time::Duration;

use tokio::runtime::Handle;

use crate::domain::errors::SchedulerError;
use crate::ports::{Scheduler, Task, TimerHandle};

/// Scheduler backed by the tokio runtime of the calling thread.
///
/// `schedule` は呼び出し時点の runtime に spawn します。
/// runtime の外から呼ぶと `SchedulerError::NoRuntime` になります。
#[derive(Debug, Clone, Default)]
pub struct TokioScheduler {
    handle: Option<Handle>,
}

impl TokioScheduler {
    /// Spawn onto whichever runtime is current at `schedule` time.
    pub fn new() -> Self {
        Self { handle: None }
    }

    /// Always spawn onto `handle`, even from threads outside the runtime.
    pub fn with_handle(handle: Handle) -> Self {
        Self {
            handle: Some(handle),
        }
    }

    fn runtime(&self) -> Result<Handle, SchedulerError> {
        match &self.handle {
            Some(handle) => Ok(handle.clone()),
            None => Handle::try_current().map_err(|_| SchedulerError::NoRuntime),
        }
    }
}

impl Scheduler for TokioScheduler {
    fn schedule(&self, after: Duration, task: Task) -> Result<TimerHandle, SchedulerError> {
        let runtime = self.runtime()?;
        let join = runtime.spawn(async move {
            tokio::time::sleep(after).await;
            task();
        });
        Ok(TimerHandle::new(move || join.abort()))
    }
}
