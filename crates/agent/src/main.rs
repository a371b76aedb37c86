// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

mod client;
mod config;
mod executor;
mod logging;

use std::path::PathBuf;

use clap::Parser;
use config::AgentConfig;

#[derive(Parser, Debug)]
#[command(name = "rcd-agentd", about = "Remote command dispatch fabric agent")]
struct Args {
    /// Path to a TOML config file. Defaults to `$RCD_AGENT_CONFIG`, if set.
    #[arg(long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    let config_path = args.config.or_else(|| std::env::var("RCD_AGENT_CONFIG").ok().map(PathBuf::from));
    let config = AgentConfig::load(config_path.as_deref())?;

    let _log_guard = logging::init(&config);

    if config.token.is_empty() {
        tracing::error!("no token configured; set RCD_AGENT_TOKEN or config.token");
        std::process::exit(1);
    }

    client::run(config).await;
    Ok(())
}
