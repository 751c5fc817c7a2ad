//! Subscription - subscribe の結果として返るキャンセル用ハンドル
//!
//! # 設計
//! - `unsubscribe()` は冪等。teardown は登録順に 1 回だけ実行される
//! - 閉じた後に `add()` された teardown は即座に実行される
//! - operator は上流用の子 subscription を作り、下流の teardown として登録する
//!   （下流を閉じると上流も閉じる）
//! - complete / error では閉じない。閉じるのは unsubscribe と operator の fault のみ

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use super::ids::SubscriptionId;

type Teardown = Box<dyn FnOnce() + Send>;

struct Inner {
    id: SubscriptionId,
    closed: AtomicBool,
    teardowns: Mutex<Vec<Teardown>>,
}

/// Handle to one active subscription. Clones share the same state.
#[derive(Clone)]
pub struct Subscription {
    inner: Arc<Inner>,
}

impl Subscription {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Inner {
                id: SubscriptionId::generate(),
                closed: AtomicBool::new(false),
                teardowns: Mutex::new(Vec::new()),
            }),
        }
    }

    pub fn id(&self) -> SubscriptionId {
        self.inner.id
    }

    pub fn is_closed(&self) -> bool {
        self.inner.closed.load(Ordering::Acquire)
    }

    /// Register a teardown to run on `unsubscribe`.
    ///
    /// If the subscription is already closed the teardown runs right away.
    pub fn add<F>(&self, teardown: F)
    where
        F: FnOnce() + Send + 'static,
    {
        {
            let mut teardowns = self
                .inner
                .teardowns
                .lock()
                .unwrap_or_else(PoisonError::into_inner);
            if !self.is_closed() {
                teardowns.push(Box::new(teardown));
                return;
            }
        }
        teardown();
    }

    /// Close `child` whenever this subscription is closed.
    pub fn add_child(&self, child: &Subscription) {
        let child = child.clone();
        self.add(move || child.unsubscribe());
    }

    /// A fresh subscription that is closed together with this one.
    pub fn child(&self) -> Subscription {
        let child = Subscription::new();
        self.add_child(&child);
        child
    }

    /// Close the subscription and run every registered teardown.
    pub fn unsubscribe(&self) {
        if self.inner.closed.swap(true, Ordering::AcqRel) {
            return;
        }
        tracing::debug!(subscription = %self.inner.id, "unsubscribe");

        // teardown の中で add() されても deadlock しないよう、ロックを外してから実行
        let teardowns = std::mem::take(
            &mut *self
                .inner
                .teardowns
                .lock()
                .unwrap_or_else(PoisonError::into_inner),
        );
        for teardown in teardowns {
            teardown();
        }
    }
}

impl Default for Subscription {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("id", &self.inner.id)
            .field("closed", &self.is_closed())
            .finish()
    }
}
