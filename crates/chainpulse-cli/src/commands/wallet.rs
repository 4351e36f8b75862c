use std::sync::Arc;
use std::time::Duration;

use chainpulse_core::{Settings, SimulatedConnector, WalletConnection};

use crate::cli::WalletArgs;
use crate::error::CliError;

use super::CommandResult;

pub async fn run(args: &WalletArgs, settings: Settings) -> Result<CommandResult, CliError> {
    let connector = SimulatedConnector::new()
        .with_delay(Duration::from_millis(args.delay_ms))
        .with_chain_id(settings.chain_id)
        .with_project_id(settings.walletconnect_project_id.clone());
    let connection = WalletConnection::new(Arc::new(connector));

    connection.connect(&args.connector).await;
    let state = connection.state();

    let degraded = usize::from(state.error.is_some());
    Ok(CommandResult::ok(serde_json::to_value(&state)?).with_degraded(degraded))
}
