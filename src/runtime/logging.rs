use serde_json::Value;
use tracing_subscriber::EnvFilter;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LogLevel {
    Debug,
    Info,
    Warn,
    Error,
}

/// Emits a leveled `[Analyzer]` event. `context`, when given, is attached as
/// a JSON field.
pub fn log_event(level: LogLevel, message: &str, context: Option<Value>) {
    let context = context.map(|c| c.to_string()).unwrap_or_default();
    match level {
        LogLevel::Debug => tracing::debug!(context = %context, "[Analyzer] {}", message),
        LogLevel::Info => tracing::info!(context = %context, "[Analyzer] {}", message),
        LogLevel::Warn => tracing::warn!(context = %context, "[Analyzer] {}", message),
        LogLevel::Error => tracing::error!(context = %context, "[Analyzer] {}", message),
    }
}

/// fmt subscriber on stderr filtered by `RUST_LOG`, `info` when unset.
/// Stdout stays free for reports.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}
