//! Wallet connection state.
//!
//! The wallet connector itself is an external collaborator behind the
//! [`WalletConnector`] trait. [`WalletConnection`] owns the resulting
//! connection state and publishes it to interested components through a
//! `watch` channel; components receive it by reference instead of reading
//! ambient global state.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tokio::sync::watch;
use tracing::{debug, error, info, warn};

use crate::error::WalletError;
use crate::units::format_token_amount;

/// Boxed future returned by connector operations.
pub type WalletFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, WalletError>> + Send + 'a>>;

/// Supported wallet connectors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectorKind {
    /// Browser-injected provider such as MetaMask.
    Injected,
    WalletConnect,
    Coinbase,
}

impl ConnectorKind {
    /// Maps a connector id to a kind. Unknown ids use the injected connector.
    pub fn from_id(id: &str) -> Self {
        match id.trim().to_ascii_lowercase().as_str() {
            "walletconnect" => Self::WalletConnect,
            "coinbase" => Self::Coinbase,
            _ => Self::Injected,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Injected => "injected",
            Self::WalletConnect => "walletconnect",
            Self::Coinbase => "coinbase",
        }
    }
}

/// An established wallet session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WalletSession {
    pub address: String,
    pub chain_id: u64,
}

/// External wallet-connector contract.
pub trait WalletConnector: Send + Sync {
    fn connect(&self, kind: ConnectorKind) -> WalletFuture<'_, WalletSession>;

    fn disconnect(&self) -> WalletFuture<'_, ()>;

    /// Native balance of `address`, formatted in whole tokens.
    fn balance(&self, address: String, chain_id: u64) -> WalletFuture<'_, Option<String>>;
}

/// Connector that fabricates a session after a fixed delay.
#[derive(Debug, Clone)]
pub struct SimulatedConnector {
    delay: Duration,
    chain_id: u64,
    walletconnect_project_id: Option<String>,
    balance_wei: u128,
    failure: Option<WalletError>,
}

impl Default for SimulatedConnector {
    fn default() -> Self {
        Self {
            delay: Duration::from_millis(1_500),
            chain_id: 1,
            walletconnect_project_id: None,
            balance_wei: 1_000_000_000_000_000_000,
            failure: None,
        }
    }
}

impl SimulatedConnector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn with_chain_id(mut self, chain_id: u64) -> Self {
        self.chain_id = chain_id;
        self
    }

    pub fn with_project_id(mut self, project_id: Option<String>) -> Self {
        self.walletconnect_project_id = project_id;
        self
    }

    pub fn with_balance_wei(mut self, balance_wei: u128) -> Self {
        self.balance_wei = balance_wei;
        self
    }

    /// Every connect attempt fails with `error`.
    pub fn failing(mut self, error: WalletError) -> Self {
        self.failure = Some(error);
        self
    }
}

fn random_address() -> String {
    let digits: String = (0..40)
        .map(|_| char::from_digit(fastrand::u32(0..16), 16).unwrap_or('0'))
        .collect();
    format!("0x{digits}")
}

impl WalletConnector for SimulatedConnector {
    fn connect(&self, kind: ConnectorKind) -> WalletFuture<'_, WalletSession> {
        Box::pin(async move {
            if !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }
            if let Some(error) = &self.failure {
                return Err(error.clone());
            }
            if kind == ConnectorKind::WalletConnect && self.walletconnect_project_id.is_none() {
                return Err(WalletError::MissingProjectId);
            }
            Ok(WalletSession {
                address: random_address(),
                chain_id: self.chain_id,
            })
        })
    }

    fn disconnect(&self) -> WalletFuture<'_, ()> {
        Box::pin(async { Ok(()) })
    }

    fn balance(&self, address: String, chain_id: u64) -> WalletFuture<'_, Option<String>> {
        Box::pin(async move {
            debug!(%address, chain_id, "reading simulated balance");
            format_token_amount(&self.balance_wei.to_string(), 18)
                .map(Some)
                .map_err(|e| WalletError::Connector(e.to_string()))
        })
    }
}

/// Connection state observed by the UI.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct WalletState {
    pub address: Option<String>,
    pub connector: Option<ConnectorKind>,
    pub is_connecting: bool,
    pub is_connected: bool,
    pub chain_id: Option<u64>,
    pub balance: Option<String>,
    pub error: Option<String>,
}

/// Owned wallet connection with subscription semantics.
pub struct WalletConnection {
    connector: Arc<dyn WalletConnector>,
    state: watch::Sender<WalletState>,
}

impl WalletConnection {
    pub fn new(connector: Arc<dyn WalletConnector>) -> Self {
        let (state, _) = watch::channel(WalletState::default());
        Self { connector, state }
    }

    pub fn state(&self) -> WalletState {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<WalletState> {
        self.state.subscribe()
    }

    /// Connects through the connector named by `connector_id`. Failures are
    /// recorded in [`WalletState::error`] rather than returned.
    pub async fn connect(&self, connector_id: &str) {
        let kind = ConnectorKind::from_id(connector_id);

        let mut already_connecting = false;
        self.state.send_if_modified(|state| {
            if state.is_connecting {
                already_connecting = true;
                return false;
            }
            state.error = None;
            state.is_connecting = true;
            true
        });
        if already_connecting {
            debug!(connector = kind.as_str(), "connection already in progress");
            return;
        }

        match self.connector.connect(kind).await {
            Ok(session) => {
                let balance = match self
                    .connector
                    .balance(session.address.clone(), session.chain_id)
                    .await
                {
                    Ok(balance) => balance,
                    Err(e) => {
                        warn!(address = %session.address, error = %e, "balance lookup failed");
                        None
                    }
                };

                info!(
                    connector = kind.as_str(),
                    address = %session.address,
                    chain_id = session.chain_id,
                    "wallet connected"
                );
                self.state.send_modify(|state| {
                    state.address = Some(session.address);
                    state.connector = Some(kind);
                    state.chain_id = Some(session.chain_id);
                    state.balance = balance;
                    state.is_connected = true;
                    state.is_connecting = false;
                });
            }
            Err(e) => {
                error!(connector = kind.as_str(), error = %e, "failed to connect wallet");
                self.state.send_modify(|state| {
                    state.is_connecting = false;
                    state.error = Some(e.to_string());
                });
            }
        }
    }

    pub async fn disconnect(&self) {
        match self.connector.disconnect().await {
            Ok(()) => {
                info!("wallet disconnected");
                self.state.send_replace(WalletState::default());
            }
            Err(e) => {
                error!(error = %e, "failed to disconnect wallet");
                self.state.send_modify(|state| state.error = Some(e.to_string()));
            }
        }
    }
}
