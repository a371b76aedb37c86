//! Process-wide tracing subscriber, initialized once. The Design Notes
//! permit exactly this kind of static: "an initialized-once clock if
//! needed" applies equally to a process-wide logger.

use tracing_subscriber::EnvFilter;

pub fn init() {
    let filter = EnvFilter::try_from_env("RCD_LOG").unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).with_target(true).init();
}
