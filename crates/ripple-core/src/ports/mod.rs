//! Ports - 抽象化レイヤー
//!
//! ストリームのコアが外部の仕組み（タイマー）に依存する箇所を trait で切り出します。

pub mod scheduler;

pub use self::scheduler::{Scheduler, Task, TimerHandle};
