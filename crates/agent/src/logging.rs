//! Process-wide tracing subscriber for the agent runtime. Unlike the
//! coordinator, the agent usually runs unattended on a managed host, so it
//! can be pointed at a rotating log file instead of stderr.

use tracing_subscriber::EnvFilter;

use crate::config::AgentConfig;

/// Returns the rolling-file guard when file logging is configured; the
/// caller must keep it alive for the life of the process or buffered writes
/// are lost on exit.
pub fn init(config: &AgentConfig) -> Option<tracing_appender::non_blocking::WorkerGuard> {
    let filter = EnvFilter::try_from_env("RCD_LOG")
        .unwrap_or_else(|_| EnvFilter::new(config.log_level.clone()));

    match &config.log_file {
        Some(path) => {
            let path = std::path::Path::new(path);
            let dir = path.parent().filter(|p| !p.as_os_str().is_empty()).unwrap_or_else(|| std::path::Path::new("."));
            let file_name = path.file_name().and_then(|n| n.to_str()).unwrap_or("rcd-agent.log").to_string();
            let appender = tracing_appender::rolling::RollingFileAppender::new(
                tracing_appender::rolling::Rotation::DAILY,
                dir,
                file_name,
            );
            let (non_blocking, guard) = tracing_appender::non_blocking(appender);
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(non_blocking)
                .with_ansi(false)
                .init();
            Some(guard)
        }
        None => {
            tracing_subscriber::fmt().with_env_filter(filter).init();
            None
        }
    }
}
