//! Errors - ストリームを流れるエラー型
//!
//! `StreamError` は observer の `error` チャネルで配送される値です。
//! 1 つの subscription の中だけで完結し、プロセス全体に波及しません。

use std::error::Error;
use std::sync::Arc;

/// Boxed source error shared between clones of a [`StreamError`].
pub type SharedError = Arc<dyn Error + Send + Sync + 'static>;

/// A terminal fault delivered through an observer's `error` slot.
///
/// # 分類
/// - `Producer`: producer が自分で `error` を呼んだ
/// - `Operator`: `try_map` / `try_filter` のコールバックが `Err` を返した
/// - `Panicked`: operator のコールバックが panic した（adapter で捕捉済み）
/// - `Schedule`: `delay` がタイマーを登録できなかった
#[derive(Debug, Clone, thiserror::Error)]
pub enum StreamError {
    #[error("producer failed: {0}")]
    Producer(SharedError),

    #[error("{operator} callback failed: {source}")]
    Operator {
        operator: &'static str,
        #[source]
        source: SharedError,
    },

    #[error("{operator} callback panicked: {message}")]
    Panicked {
        operator: &'static str,
        message: String,
    },

    #[error("delay could not schedule a timer: {0}")]
    Schedule(#[from] SchedulerError),
}

impl StreamError {
    /// Wrap any error raised by a producer.
    pub fn producer<E>(err: E) -> Self
    where
        E: Error + Send + Sync + 'static,
    {
        Self::Producer(Arc::new(err))
    }

    /// Producer error carrying only a message.
    pub fn msg(message: impl Into<String>) -> Self {
        Self::Producer(Arc::new(Message(message.into())))
    }

    pub(crate) fn operator<E>(operator: &'static str, err: E) -> Self
    where
        E: Error + Send + Sync + 'static,
    {
        Self::Operator {
            operator,
            source: Arc::new(err),
        }
    }

    /// Build a `Panicked` error from a `catch_unwind` payload.
    pub(crate) fn panicked(operator: &'static str, payload: Box<dyn std::any::Any + Send>) -> Self {
        let message = if let Some(s) = payload.downcast_ref::<&'static str>() {
            (*s).to_string()
        } else if let Some(s) = payload.downcast_ref::<String>() {
            s.clone()
        } else {
            "non-string panic payload".to_string()
        };
        Self::Panicked { operator, message }
    }
}

/// SchedulerError はタイマー登録の失敗
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SchedulerError {
    #[error("no tokio runtime is running on this thread")]
    NoRuntime,

    #[error("scheduler has been shut down")]
    Shutdown,
}

#[derive(Debug)]
struct Message(String);

impl std::fmt::Display for Message {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl Error for Message {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn msg_displays_the_message() {
        let err = StreamError::msg("disk on fire");
        assert_eq!(err.to_string(), "producer failed: disk on fire");
    }

    #[test]
    fn panicked_extracts_str_and_string_payloads() {
        let err = StreamError::panicked("map", Box::new("boom"));
        assert!(matches!(
            err,
            StreamError::Panicked { operator: "map", ref message } if message == "boom"
        ));

        let err = StreamError::panicked("filter", Box::new(String::from("bang")));
        assert_eq!(err.to_string(), "filter callback panicked: bang");

        let err = StreamError::panicked("map", Box::new(42_u8));
        assert!(err.to_string().contains("non-string"));
    }

    #[test]
    fn operator_error_keeps_its_source() {
        let parse = "x".parse::<i32>().unwrap_err();
        let err = StreamError::operator("try_map", parse);
        assert!(err.source().is_some());
        assert!(err.to_string().starts_with("try_map callback failed"));
    }

    #[test]
    fn scheduler_error_converts() {
        let err: StreamError = SchedulerError::NoRuntime.into();
        assert!(matches!(err, StreamError::Schedule(SchedulerError::NoRuntime)));
    }
}
