//! Consumer-facing facade that owns one polling source per data kind.
//!
//! The dashboard wires settings to fetchers: node-backed kinds get an
//! [`RpcFetcher`](crate::rpc::RpcFetcher) when an API key is configured and a
//! permanent fallback otherwise; catalog kinds are served by
//! [`StaticFetcher`]s.

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use time::OffsetDateTime;
use tracing::{info, warn};

use crate::catalog::{self, DApp, GasPricePoint, NetworkStats, NewsItem, TokenBalance, Transaction};
use crate::config::Settings;
use crate::error::FetchError;
use crate::fallback::{self, DataKind};
use crate::http_client::{HttpClient, ReqwestHttpClient};
use crate::polling::{PollingSource, RefreshOutcome, SourceHealth, SourceSnapshot};
use crate::rpc::{block_number_fetcher, gas_price_fetcher, RpcEndpoint, StaticFetcher, ValueFetcher};

/// Summary shown next to the live chain figures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NetworkStatus {
    Loading,
    Healthy,
    IssuesDetected,
}

/// Sources scoped to one connected account.
pub struct AccountSources {
    address: String,
    pub transactions: PollingSource<Vec<Transaction>>,
    pub token_balances: PollingSource<Vec<TokenBalance>>,
}

impl AccountSources {
    pub fn address(&self) -> &str {
        &self.address
    }

    pub fn snapshot(&self) -> AccountSnapshot {
        AccountSnapshot {
            address: self.address.clone(),
            transactions: self.transactions.snapshot(),
            token_balances: self.token_balances.snapshot(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AccountSnapshot {
    pub address: String,
    pub transactions: SourceSnapshot<Vec<Transaction>>,
    pub token_balances: SourceSnapshot<Vec<TokenBalance>>,
}

/// Serializable view of every source at one instant.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardSnapshot {
    #[serde(with = "time::serde::rfc3339")]
    pub taken_at: OffsetDateTime,
    pub chain_id: u64,
    pub network_status: NetworkStatus,
    pub gas_price: SourceSnapshot<String>,
    pub block_number: SourceSnapshot<String>,
    pub network_stats: SourceSnapshot<NetworkStats>,
    pub gas_price_history: SourceSnapshot<Vec<GasPricePoint>>,
    pub news: SourceSnapshot<Vec<NewsItem>>,
    pub dapps: SourceSnapshot<Vec<DApp>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub account: Option<AccountSnapshot>,
}

/// Builder for [`Dashboard`].
pub struct DashboardBuilder {
    settings: Settings,
    http_client: Option<Arc<dyn HttpClient>>,
    feed_latency: Duration,
}

impl DashboardBuilder {
    pub fn new(settings: Settings) -> Self {
        Self {
            settings,
            http_client: None,
            feed_latency: Duration::ZERO,
        }
    }

    /// Transport shared by the node-backed fetchers. Defaults to reqwest.
    pub fn with_http_client(mut self, http_client: Arc<dyn HttpClient>) -> Self {
        self.http_client = Some(http_client);
        self
    }

    /// Artificial latency applied to catalog-backed fetches.
    pub fn with_feed_latency(mut self, latency: Duration) -> Self {
        self.feed_latency = latency;
        self
    }

    /// Starts every source. Must be called from within a tokio runtime.
    pub fn build(self) -> Dashboard {
        let Self {
            settings,
            http_client,
            feed_latency,
        } = self;

        let http_client = http_client
            .unwrap_or_else(|| Arc::new(ReqwestHttpClient::new()) as Arc<dyn HttpClient>);
        let endpoint = RpcEndpoint::from_settings(&settings);

        if !endpoint.has_credential() {
            warn!(
                rpc_url = %settings.rpc_url,
                "no node provider API key configured; chain figures will show fallback values"
            );
        }
        if settings.walletconnect_project_id.is_none() {
            warn!("no WalletConnect project id configured; walletconnect is unavailable");
        }

        let gas_price = rpc_source(
            DataKind::GasPrice,
            fallback::gas_price(),
            settings.chain_interval,
            &endpoint,
            gas_price_fetcher(endpoint.clone(), Arc::clone(&http_client)),
        );
        let block_number = rpc_source(
            DataKind::BlockNumber,
            fallback::block_number(),
            settings.chain_interval,
            &endpoint,
            block_number_fetcher(endpoint.clone(), Arc::clone(&http_client)),
        );

        let network_stats = catalog_source(
            DataKind::NetworkStats,
            fallback::network_stats(),
            settings.chain_interval,
            feed_latency,
            || Ok(catalog::network_stats()),
        );
        let gas_price_history = catalog_source(
            DataKind::GasPriceHistory,
            fallback::gas_price_history(),
            settings.chain_interval,
            feed_latency,
            || Ok(catalog::gas_price_history(OffsetDateTime::now_utc())),
        );
        let news = catalog_source(
            DataKind::News,
            Vec::new(),
            settings.feed_interval,
            feed_latency,
            || Ok(catalog::news(OffsetDateTime::now_utc().date())),
        );
        let dapps = catalog_source(
            DataKind::DApps,
            Vec::new(),
            settings.feed_interval,
            feed_latency,
            || Ok(catalog::dapps()),
        );

        info!(chain_id = settings.chain_id, "dashboard started");

        Dashboard {
            settings,
            feed_latency,
            gas_price,
            block_number,
            network_stats,
            gas_price_history,
            news,
            dapps,
            account: None,
        }
    }
}

fn rpc_source(
    kind: DataKind,
    fallback: String,
    interval: Duration,
    endpoint: &RpcEndpoint,
    fetcher: impl ValueFetcher<String> + 'static,
) -> PollingSource<String> {
    if endpoint.has_credential() {
        PollingSource::spawn(kind.as_str(), fallback, interval, Arc::new(fetcher))
    } else {
        PollingSource::permanent_fallback(
            kind.as_str(),
            fallback,
            FetchError::missing_config(format!("no API key configured for {kind}")),
        )
    }
}

fn catalog_source<T, F>(
    kind: DataKind,
    fallback: T,
    interval: Duration,
    latency: Duration,
    producer: F,
) -> PollingSource<T>
where
    T: Clone + Send + Sync + 'static,
    F: Fn() -> Result<T, FetchError> + Send + Sync + 'static,
{
    let fetcher = StaticFetcher::new(kind.as_str(), producer).with_latency(latency);
    PollingSource::spawn(kind.as_str(), fallback, interval, Arc::new(fetcher))
}

/// Live dashboard state.
pub struct Dashboard {
    settings: Settings,
    feed_latency: Duration,
    pub gas_price: PollingSource<String>,
    pub block_number: PollingSource<String>,
    pub network_stats: PollingSource<NetworkStats>,
    pub gas_price_history: PollingSource<Vec<GasPricePoint>>,
    pub news: PollingSource<Vec<NewsItem>>,
    pub dapps: PollingSource<Vec<DApp>>,
    account: Option<AccountSources>,
}

impl Dashboard {
    pub fn builder(settings: Settings) -> DashboardBuilder {
        DashboardBuilder::new(settings)
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Loading until both chain figures have settled once, then healthy
    /// unless either of them is serving its fallback.
    pub fn network_status(&self) -> NetworkStatus {
        let gas = self.gas_price.snapshot();
        let block = self.block_number.snapshot();
        if gas.is_loading || block.is_loading {
            NetworkStatus::Loading
        } else if gas.health == SourceHealth::Degraded || block.health == SourceHealth::Degraded {
            NetworkStatus::IssuesDetected
        } else {
            NetworkStatus::Healthy
        }
    }

    /// Starts transaction and balance sources for `address`, replacing (and
    /// disposing) any previously tracked account.
    pub fn track_account(&mut self, address: impl Into<String>) -> &AccountSources {
        let address = address.into();
        let interval = self.settings.chain_interval;
        let transactions = catalog_source(
            DataKind::Transactions,
            fallback::transactions(),
            interval,
            self.feed_latency,
            || Ok(catalog::transactions(OffsetDateTime::now_utc())),
        );
        let token_balances = catalog_source(
            DataKind::TokenBalances,
            fallback::token_balances(),
            interval,
            self.feed_latency,
            || Ok(catalog::token_balances()),
        );
        info!(%address, "tracking account");

        self.account.insert(AccountSources {
            address,
            transactions,
            token_balances,
        })
    }

    pub fn account(&self) -> Option<&AccountSources> {
        self.account.as_ref()
    }

    pub fn untrack_account(&mut self) {
        if let Some(account) = self.account.take() {
            info!(address = %account.address, "stopped tracking account");
        }
    }

    pub fn snapshot(&self) -> DashboardSnapshot {
        DashboardSnapshot {
            taken_at: OffsetDateTime::now_utc(),
            chain_id: self.settings.chain_id,
            network_status: self.network_status(),
            gas_price: self.gas_price.snapshot(),
            block_number: self.block_number.snapshot(),
            network_stats: self.network_stats.snapshot(),
            gas_price_history: self.gas_price_history.snapshot(),
            news: self.news.snapshot(),
            dapps: self.dapps.snapshot(),
            account: self.account.as_ref().map(AccountSources::snapshot),
        }
    }

    /// Refreshes every source concurrently.
    pub async fn refresh_all(&self) -> Vec<(DataKind, RefreshOutcome)> {
        let (gas, block, stats, history, news, dapps) = tokio::join!(
            self.gas_price.refresh_now(),
            self.block_number.refresh_now(),
            self.network_stats.refresh_now(),
            self.gas_price_history.refresh_now(),
            self.news.refresh_now(),
            self.dapps.refresh_now(),
        );
        let mut outcomes = vec![
            (DataKind::GasPrice, gas),
            (DataKind::BlockNumber, block),
            (DataKind::NetworkStats, stats),
            (DataKind::GasPriceHistory, history),
            (DataKind::News, news),
            (DataKind::DApps, dapps),
        ];

        if let Some(account) = &self.account {
            let (transactions, balances) = tokio::join!(
                account.transactions.refresh_now(),
                account.token_balances.refresh_now(),
            );
            outcomes.push((DataKind::Transactions, transactions));
            outcomes.push((DataKind::TokenBalances, balances));
        }
        outcomes
    }

    /// Waits until no source has a fetch in flight.
    pub async fn settled(&self) -> DashboardSnapshot {
        tokio::join!(
            self.gas_price.settled(),
            self.block_number.settled(),
            self.network_stats.settled(),
            self.gas_price_history.settled(),
            self.news.settled(),
            self.dapps.settled(),
        );
        if let Some(account) = &self.account {
            tokio::join!(account.transactions.settled(), account.token_balances.settled());
        }
        self.snapshot()
    }

    /// Disposes every source. Later fetch completions are discarded.
    pub fn shutdown(&self) {
        self.gas_price.dispose();
        self.block_number.dispose();
        self.network_stats.dispose();
        self.gas_price_history.dispose();
        self.news.dispose();
        self.dapps.dispose();
        if let Some(account) = &self.account {
            account.transactions.dispose();
            account.token_balances.dispose();
        }
        info!("dashboard shut down");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http_client::{HttpError, HttpRequest, HttpResponse};

    struct Unreachable;

    impl HttpClient for Unreachable {
        fn execute<'a>(
            &'a self,
            _request: HttpRequest,
        ) -> std::pin::Pin<
            Box<dyn std::future::Future<Output = Result<HttpResponse, HttpError>> + Send + 'a>,
        > {
            Box::pin(async { Err(HttpError::new("connection refused")) })
        }
    }

    #[tokio::test(start_paused = true)]
    async fn missing_key_reports_issues_once_feeds_settle() {
        let dashboard = Dashboard::builder(Settings::default())
            .with_http_client(Arc::new(Unreachable))
            .build();

        let snapshot = dashboard.settled().await;
        assert_eq!(snapshot.gas_price.value, "25.00");
        assert_eq!(snapshot.block_number.value, "18245367");
        assert_eq!(snapshot.network_status, NetworkStatus::IssuesDetected);
        assert_eq!(snapshot.dapps.value.len(), 9);
        assert_eq!(dashboard.gas_price.attempts(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn transport_failures_degrade_chain_figures() {
        let dashboard = Dashboard::builder(Settings::default().with_api_key("k"))
            .with_http_client(Arc::new(Unreachable))
            .build();

        let snapshot = dashboard.settled().await;
        assert_eq!(snapshot.gas_price.health, SourceHealth::Degraded);
        assert_eq!(snapshot.gas_price.value, "25.00");
        assert!(snapshot.gas_price.last_error_message.is_some());
        assert_eq!(snapshot.network_stats.health, SourceHealth::Fresh);
    }

    #[tokio::test(start_paused = true)]
    async fn tracked_account_joins_snapshot_and_shutdown() {
        let mut dashboard = Dashboard::builder(Settings::default())
            .with_http_client(Arc::new(Unreachable))
            .build();
        dashboard.track_account("0xabc");

        let snapshot = dashboard.settled().await;
        let account = snapshot.account.expect("tracked account");
        assert_eq!(account.address, "0xabc");
        assert_eq!(account.token_balances.value.len(), 2);

        dashboard.shutdown();
        assert!(dashboard.account().is_some_and(|a| a.transactions.is_disposed()));
        assert!(dashboard.news.is_disposed());
    }
}
