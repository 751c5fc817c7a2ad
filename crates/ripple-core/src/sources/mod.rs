//! Sources - ストリームの起点になる producer
//!
//! - **from_iter**: 固定シーケンスを流して complete
//! - **from_events**: `EventEmitter` のイベントを流し続ける（complete しない）
//! - **fail**: 即座に error

pub mod events;
pub mod iter;

pub use self::events::{EventEmitter, from_events};
pub use self::iter::{fail, from_iter};
