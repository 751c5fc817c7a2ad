mod config;

use std::fmt::Display;
use std::path::PathBuf;

use tokio::time::{Duration, sleep};
use tracing_subscriber::EnvFilter;

use ripple_core::impls::TokioScheduler;
use ripple_core::sources::{EventEmitter, from_events, from_iter};
use ripple_core::{DelayPolicy, Observer};

use crate::config::{ConfigError, PipelineConfig};

#[derive(Debug, Clone)]
struct Click {
    client_x: i64,
}

#[derive(Debug, thiserror::Error)]
#[error("{value} / {divisor} overflows i64")]
struct DivideOverflow {
    value: i64,
    divisor: i64,
}

/// `i64::MIN / -1` は panic せずに error として流す
fn divide(value: i64, divisor: i64) -> Result<i64, DivideOverflow> {
    value.checked_div(divisor).ok_or(DivideOverflow { value, divisor })
}

/// 受け取った通知を標準出力に出すだけの observer
fn printer<T: Display + Send + 'static>(label: &'static str) -> Observer<T> {
    Observer::new()
        .on_next(move |x: T| println!("[{label}] {x}"))
        .on_error(move |e| eprintln!("[{label}] error: {e}"))
        .on_complete(move || println!("[{label}] done"))
}

#[tokio::main]
async fn main() -> Result<(), ConfigError> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let path = std::env::args_os().nth(1).map(PathBuf::from);
    let config = PipelineConfig::load(path.as_deref())?;
    tracing::info!(?config, "pipeline config loaded");

    // (A) 固定シーケンス → map → filter（同期的に流れきる）
    let source = from_iter(config.values.clone());
    let (divisor, exclude) = (config.divisor, config.exclude);
    source
        .try_map(move |x| divide(x, divisor))
        .filter(move |x| *x != exclude)
        .subscribe(printer("map/filter"));

    // (B) 同じ source を delay。complete は値より先に届く
    source.delay(config.delay()).subscribe(printer("delay"));

    // (B') complete を保留中の値の後ろに回す版
    source
        .delay_with(config.delay(), TokioScheduler::new(), DelayPolicy::FlushBeforeComplete)
        .subscribe(printer("delay/flush"));

    // (C) クリックイベント → map → filter → delay（自分からは complete しない）
    let emitter = EventEmitter::new();
    let max_x = config.max_click_x;
    let clicks = from_events(&emitter)
        .map(|ev: Click| ev.client_x)
        .filter(move |x| *x < max_x)
        .delay(config.delay())
        .subscribe(printer("clicks"));

    for &client_x in &config.clicks {
        emitter.emit(Click { client_x });
    }

    // (D) 遅延分を待ってから dispose（リスナーも外れる）
    sleep(config.delay() + Duration::from_millis(100)).await;
    clicks.unsubscribe();
    tracing::info!(listeners = emitter.listener_count(), "click subscription disposed");

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use ripple_core::testing::{Notification, Recorder};

    #[test]
    fn divide_reports_overflow_instead_of_panicking() {
        assert_eq!(divide(30, 10).unwrap(), 3);
        let err = divide(i64::MIN, -1).unwrap_err();
        assert_eq!(err.to_string(), format!("{} / -1 overflows i64", i64::MIN));
    }

    #[test]
    fn overflowing_value_ends_the_pipeline_with_an_error() {
        let recorder = Recorder::new();
        from_iter(vec![10, i64::MIN, 30])
            .try_map(|x| divide(x, -1))
            .subscribe(recorder.observer());

        assert_eq!(recorder.values(), vec![-10]);
        assert_eq!(recorder.errors().len(), 1);
        assert!(!recorder.notifications().contains(&Notification::Complete));
    }
}
