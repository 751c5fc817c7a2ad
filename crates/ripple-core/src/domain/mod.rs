//! Domain model (ids, errors, observer, subscription).

pub mod errors;
pub mod ids;
pub mod observer;
pub mod subscription;

pub use self::errors::{SchedulerError, SharedError, StreamError};
pub use self::ids::{ListenerId, SubscriptionId};
pub use self::observer::Observer;
pub use self::subscription::Subscription;
