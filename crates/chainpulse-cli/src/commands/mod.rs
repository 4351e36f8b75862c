mod dapps;
mod news;
mod stats;
mod wallet;
mod watch;

use chainpulse_core::{Settings, SourceHealth};
use serde_json::Value;

use crate::cli::{Cli, Command};
use crate::error::CliError;

pub struct CommandResult {
    pub data: Value,
    /// Number of values served from fallback, or recorded errors.
    pub degraded: usize,
    /// Output was already written incrementally.
    pub streamed: bool,
}

impl CommandResult {
    pub fn ok(data: Value) -> Self {
        Self {
            data,
            degraded: 0,
            streamed: false,
        }
    }

    pub fn streamed(degraded: usize) -> Self {
        Self {
            data: Value::Null,
            degraded,
            streamed: true,
        }
    }

    pub fn with_degraded(mut self, degraded: usize) -> Self {
        self.degraded = degraded;
        self
    }
}

pub async fn run(cli: &Cli) -> Result<CommandResult, CliError> {
    match &cli.command {
        Command::Stats(args) => stats::run(args, Settings::from_env()?).await,
        Command::Watch(args) => watch::run(args, Settings::from_env()?, cli.pretty).await,
        Command::News(args) => news::run(args),
        Command::Dapps(args) => dapps::run(args),
        Command::Wallet(args) => wallet::run(args, Settings::from_env()?).await,
    }
}

fn count_degraded(healths: &[SourceHealth]) -> usize {
    healths
        .iter()
        .filter(|health| **health == SourceHealth::Degraded)
        .count()
}
