use std::env;

use anyhow::anyhow;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt as _};

const LOG_LEVEL_VAR: &str = "TEXT_REPLAY_LOG_LEVEL";
const LOG_DIR_VAR: &str = "TEXT_REPLAY_LOG_DIR";
const LOG_UNBUFFERED_VAR: &str = "TEXT_REPLAY_LOG_UNBUFFERED";

pub fn get_envvar_flag(key: &str) -> bool {
    env::var(key).is_ok_and(|v| {
        matches!(
            v.to_lowercase().as_str(),
            "true" | "t" | "1" | "yes" | "y"
        )
    })
}

/// Install the global subscriber.
///
/// Logging is off unless `TEXT_REPLAY_LOG_LEVEL` is set. With
/// `TEXT_REPLAY_LOG_DIR` the log goes to a daily rolling file, otherwise to
/// stderr. Keep the returned guard alive until exit so buffered lines are
/// flushed.
pub fn init_logger() -> anyhow::Result<Option<WorkerGuard>> {
    let level = env::var(LOG_LEVEL_VAR).unwrap_or_else(|_| "off".to_string());
    if level.eq_ignore_ascii_case("off") {
        return Ok(None);
    }

    let env_filter = EnvFilter::try_new(&level).unwrap_or_else(|_| EnvFilter::new("info"));
    let timer = fmt::time::UtcTime::rfc_3339();

    let (make_writer, guard) = match env::var(LOG_DIR_VAR) {
        Ok(log_dir) => {
            std::fs::create_dir_all(&log_dir)
                .map_err(|e| anyhow!("Failed to create {LOG_DIR_VAR} '{log_dir}': {e}"))?;
            let appender = tracing_appender::rolling::daily(&log_dir, "text-replay.log");
            if get_envvar_flag(LOG_UNBUFFERED_VAR) {
                (fmt::writer::BoxMakeWriter::new(appender), None)
            } else {
                let (nb, guard) = tracing_appender::non_blocking(appender);
                (fmt::writer::BoxMakeWriter::new(nb), Some(guard))
            }
        }
        Err(_) => (fmt::writer::BoxMakeWriter::new(std::io::stderr), None),
    };

    let subscriber = tracing_subscriber::registry().with(env_filter).with(
        fmt::layer()
            .with_timer(timer)
            .with_ansi(false)
            .with_writer(make_writer)
            .with_level(true)
            .with_target(true),
    );
    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| anyhow!("Failed to set global tracing subscriber: {e}"))?;

    tracing::info!("START: {}", env::args().skip(1).collect::<Vec<_>>().join(" "));
    Ok(guard)
}
