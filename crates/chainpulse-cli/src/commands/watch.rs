use chainpulse_core::{Dashboard, NetworkStatus, Settings, SourceSnapshot};
use serde::Serialize;
use tracing::info;

use crate::cli::WatchArgs;
use crate::error::CliError;
use crate::output;

use super::{count_degraded, CommandResult};

#[derive(Debug, Serialize)]
struct WatchUpdate {
    network_status: NetworkStatus,
    gas_price: SourceSnapshot<String>,
    block_number: SourceSnapshot<String>,
}

impl WatchUpdate {
    fn from_dashboard(dashboard: &Dashboard) -> Self {
        Self {
            network_status: dashboard.network_status(),
            gas_price: dashboard.gas_price.snapshot(),
            block_number: dashboard.block_number.snapshot(),
        }
    }

    fn degraded(&self) -> usize {
        count_degraded(&[self.gas_price.health, self.block_number.health])
    }
}

pub async fn run(
    args: &WatchArgs,
    settings: Settings,
    pretty: bool,
) -> Result<CommandResult, CliError> {
    let dashboard = Dashboard::builder(settings).build();
    let result =
        stream_updates(&dashboard, args.updates, |update| output::render(update, pretty)).await;
    dashboard.shutdown();

    let degraded = result?;
    Ok(CommandResult::streamed(degraded))
}

/// Emits chain figures each time they settle, until `limit` updates were
/// emitted, the sources stop, or the process is interrupted. Returns the
/// highest number of degraded figures seen in one update.
async fn stream_updates<F>(
    dashboard: &Dashboard,
    limit: Option<u64>,
    mut emit: F,
) -> Result<usize, CliError>
where
    F: FnMut(&WatchUpdate) -> Result<(), CliError>,
{
    let mut gas_price = dashboard.gas_price.subscribe();
    let mut block_number = dashboard.block_number.subscribe();
    let refreshing =
        dashboard.gas_price.interval().is_some() || dashboard.block_number.interval().is_some();

    dashboard.settled().await;
    gas_price.borrow_and_update();
    block_number.borrow_and_update();

    let mut emitted = 0_u64;
    let mut degraded = 0_usize;
    loop {
        if limit.is_some_and(|limit| emitted >= limit) {
            break;
        }

        let update = WatchUpdate::from_dashboard(dashboard);
        if update.network_status != NetworkStatus::Loading {
            emit(&update)?;
            emitted += 1;
            degraded = degraded.max(update.degraded());
        }

        if !refreshing {
            info!("chain figures are fixed fallbacks; nothing further to watch");
            break;
        }
        if limit.is_some_and(|limit| emitted >= limit) {
            break;
        }

        tokio::select! {
            changed = gas_price.changed() => {
                if changed.is_err() {
                    break;
                }
            }
            changed = block_number.changed() => {
                if changed.is_err() {
                    break;
                }
            }
            _ = tokio::signal::ctrl_c() => {
                info!("interrupted");
                break;
            }
        }
    }

    Ok(degraded)
}
