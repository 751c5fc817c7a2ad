//! ripple-core
//!
//! Cold, unicast, push-based reactive streams.
//!
//! # モジュール構成
//! - **domain**: ドメインモデル（ids, errors, observer, subscription）
//! - **ports**: 抽象化レイヤー（Scheduler）
//! - **impls**: ports の実装（TokioScheduler, ManualScheduler）
//! - **observable**: Observable 本体と producer 側ハンドル（Subscriber）
//! - **operators**: map / filter / delay と、その fallible 版
//! - **sources**: from_iter / from_events / fail
//! - **testing**: 記録用 observer（Recorder）
//!
//! # 使用例
//! ```
//! use ripple_core::sources::from_iter;
//! use ripple_core::testing::{Notification, Recorder};
//!
//! let recorder = Recorder::new();
//! from_iter(vec![10, 20, 30])
//!     .map(|x| x / 10)
//!     .filter(|x| *x != 2)
//!     .subscribe(recorder.observer());
//!
//! assert_eq!(
//!     recorder.notifications(),
//!     vec![Notification::Next(1), Notification::Next(3), Notification::Complete]
//! );
//! ```

pub mod domain;
pub mod impls;
pub mod observable;
pub mod operators;
pub mod ports;
pub mod sources;
pub mod testing;

pub use domain::{Observer, StreamError, Subscription};
pub use observable::{Observable, Subscriber};
pub use operators::DelayPolicy;
