use chainpulse_core::{Dashboard, Settings};

use crate::cli::StatsArgs;
use crate::error::CliError;

use super::{count_degraded, CommandResult};

pub async fn run(args: &StatsArgs, settings: Settings) -> Result<CommandResult, CliError> {
    let mut dashboard = Dashboard::builder(settings).build();
    if let Some(address) = &args.account {
        dashboard.track_account(address.clone());
    }

    let snapshot = dashboard.settled().await;
    dashboard.shutdown();

    let mut healths = vec![
        snapshot.gas_price.health,
        snapshot.block_number.health,
        snapshot.network_stats.health,
        snapshot.gas_price_history.health,
        snapshot.news.health,
        snapshot.dapps.health,
    ];
    if let Some(account) = &snapshot.account {
        healths.push(account.transactions.health);
        healths.push(account.token_balances.health);
    }

    let data = serde_json::to_value(&snapshot)?;
    Ok(CommandResult::ok(data).with_degraded(count_degraded(&healths)))
}
