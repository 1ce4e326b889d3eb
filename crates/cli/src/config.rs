//! Command-line configuration.

use crate::commands::{self, Command};
use clap::Parser;
use std::time::Duration;
use tracing::Level;

/// Inspect and call a demo service through the typed dispatch layer.
#[derive(Debug, Parser)]
#[command(name = "qi", version, about)]
pub struct CliConfig {
    /// Maximum log level written to stderr.
    #[arg(long, global = true, env = "QI_LOG_LEVEL", default_value = "warn")]
    pub log_level: Level,

    /// How long a call may run before it is reported as timed out.
    #[arg(long, global = true, env = "QI_CALL_TIMEOUT_MS", default_value_t = 5000)]
    pub timeout_ms: u64,

    #[command(subcommand)]
    pub command: Command,
}

impl CliConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Install the global subscriber. A second call is a no-op.
    pub fn init_logging(&self) {
        let _ = tracing_subscriber::fmt()
            .with_max_level(self.log_level)
            .with_writer(std::io::stderr)
            .try_init();
    }

    pub async fn run(self) -> anyhow::Result<()> {
        self.init_logging();
        let result = commands::execute(&self.command, self.timeout()).await?;
        println!("{}", result);
        Ok(())
    }
}
