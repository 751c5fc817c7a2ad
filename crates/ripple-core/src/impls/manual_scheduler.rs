//! ManualScheduler - テスト用の仮想時計 Scheduler
//!
//! # 学習ポイント
//! - BinaryHeap を min-heap として使う（Reverse 順の Ord 実装）
//! - コールバック実行中はロックを外す（コールバックから schedule されても deadlock しない）
//!
//! 同じ期限のコールバックは登録順に実行されるので、
//! tokio のタイマーと違って結果が決定的になります。

use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashSet};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use crate::domain::errors::SchedulerError;
use crate::ports::{Scheduler, Task, TimerHandle};

struct Entry {
    due: Duration,
    seq: u64,
    task: Task,
}

impl PartialEq for Entry {
    fn eq(&self, other: &Self) -> bool {
        self.due == other.due && self.seq == other.seq
    }
}

impl Eq for Entry {}

impl PartialOrd for Entry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Entry {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reverse ordering: earliest deadline (then earliest seq) first
        other
            .due
            .cmp(&self.due)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

#[derive(Default)]
struct State {
    now: Duration,
    next_seq: u64,
    queue: BinaryHeap<Entry>,
    cancelled: HashSet<u64>,
    shut_down: bool,
}

/// Virtual-time scheduler driven by [`ManualScheduler::advance`].
#[derive(Clone, Default)]
pub struct ManualScheduler {
    state: Arc<Mutex<State>>,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Virtual time elapsed since creation.
    pub fn now(&self) -> Duration {
        self.lock().now
    }

    /// Number of callbacks still waiting (cancelled ones excluded).
    pub fn pending(&self) -> usize {
        let state = self.lock();
        state
            .queue
            .iter()
            .filter(|e| !state.cancelled.contains(&e.seq))
            .count()
    }

    /// Move the clock forward by `by`, running every callback that falls due.
    ///
    /// Callbacks scheduled while advancing run too if their deadline is within range.
    pub fn advance(&self, by: Duration) {
        let target = self.lock().now + by;
        loop {
            let task = {
                let mut state = self.lock();
                match state.queue.peek() {
                    Some(entry) if entry.due <= target => {}
                    _ => break,
                }
                let Some(entry) = state.queue.pop() else {
                    break;
                };
                state.now = entry.due;
                if state.cancelled.remove(&entry.seq) {
                    continue;
                }
                entry.task
            };
            task();
        }
        self.lock().now = target;
    }

    /// Drop every waiting callback and refuse new ones with
    /// [`SchedulerError::Shutdown`].
    pub fn shutdown(&self) {
        let dropped = {
            let mut state = self.lock();
            state.shut_down = true;
            state.cancelled.clear();
            std::mem::take(&mut state.queue)
        };
        tracing::debug!(dropped = dropped.len(), "manual scheduler shut down");
    }
}

impl Scheduler for ManualScheduler {
    fn schedule(&self, after: Duration, task: Task) -> Result<TimerHandle, SchedulerError> {
        let seq = {
            let mut state = self.lock();
            if state.shut_down {
                return Err(SchedulerError::Shutdown);
            }
            let seq = state.next_seq;
            state.next_seq += 1;
            let due = state.now + after;
            state.queue.push(Entry { due, seq, task });
            seq
        };

        let state = Arc::downgrade(&self.state);
        Ok(TimerHandle::new(move || {
            if let Some(state) = state.upgrade() {
                let mut state = state.lock().unwrap_or_else(PoisonError::into_inner);
                if state.queue.iter().any(|e| e.seq == seq) {
                    state.cancelled.insert(seq);
                }
            }
        }))
    }
}

impl std::fmt::Debug for ManualScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ManualScheduler")
            .field("now", &self.now())
            .field("pending", &self.pending())
            .finish()
    }
}
