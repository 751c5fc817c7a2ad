//! Impls - ports の実装
//!
//! # 含まれる実装
//! - **TokioScheduler**: tokio runtime 上のタイマー
//! - **ManualScheduler**: テスト用の仮想時計

pub mod manual_scheduler;
pub mod tokio_scheduler;

pub use self::manual_scheduler::ManualScheduler;
pub use self::tokio_scheduler::TokioScheduler;
