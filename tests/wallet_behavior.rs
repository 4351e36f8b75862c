//! Behaviour tests for wallet connection state.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chainpulse_core::wallet::WalletFuture;
use chainpulse_core::{
    ConnectorKind, SimulatedConnector, WalletConnection, WalletConnector, WalletError,
    WalletSession,
};

/// Rejects the first connection request, then accepts.
struct RejectOnce {
    attempts: AtomicUsize,
}

impl WalletConnector for RejectOnce {
    fn connect(&self, _kind: ConnectorKind) -> WalletFuture<'_, WalletSession> {
        Box::pin(async move {
            if self.attempts.fetch_add(1, Ordering::SeqCst) == 0 {
                return Err(WalletError::Rejected(String::from("user rejected the request")));
            }
            Ok(WalletSession {
                address: String::from("0x00000000000000000000000000000000000000aa"),
                chain_id: 5,
            })
        })
    }

    fn disconnect(&self) -> WalletFuture<'_, ()> {
        Box::pin(async { Ok(()) })
    }

    fn balance(&self, _address: String, _chain_id: u64) -> WalletFuture<'_, Option<String>> {
        Box::pin(async { Err(WalletError::Connector(String::from("balance unavailable"))) })
    }
}

#[tokio::test(start_paused = true)]
async fn when_connecting_state_reports_progress_then_connection() {
    // Given: the default simulated connector with its 1.5s delay
    let connection = Arc::new(WalletConnection::new(Arc::new(SimulatedConnector::new())));
    let mut updates = connection.subscribe();

    // When: a connection starts
    let connecting = Arc::clone(&connection);
    let task = tokio::spawn(async move { connecting.connect("metamask").await });
    updates.changed().await.expect("connection alive");

    // Then: subscribers first see the connecting state
    assert!(updates.borrow_and_update().is_connecting);
    assert!(!connection.state().is_connected);

    task.await.expect("connect task");
    let state = connection.state();
    assert!(state.is_connected);
    assert!(!state.is_connecting);
    assert_eq!(state.connector, Some(ConnectorKind::Injected));
    assert_eq!(state.chain_id, Some(1));
    let address = state.address.expect("address assigned");
    assert_eq!(address.len(), 42);
    assert!(address.starts_with("0x"));
}

#[tokio::test]
async fn when_connector_rejects_error_is_recorded_and_cleared_on_retry() {
    let connection = WalletConnection::new(Arc::new(RejectOnce {
        attempts: AtomicUsize::new(0),
    }));

    connection.connect("coinbase").await;
    let failed = connection.state();
    assert!(!failed.is_connected);
    assert!(!failed.is_connecting);
    assert_eq!(
        failed.error.as_deref(),
        Some("connection request rejected: user rejected the request")
    );

    connection.connect("coinbase").await;
    let connected = connection.state();
    assert!(connected.is_connected);
    assert_eq!(connected.error, None);
    assert_eq!(connected.chain_id, Some(5));
    assert_eq!(connected.balance, None);
}

#[tokio::test]
async fn when_walletconnect_has_project_id_connection_succeeds() {
    let connector = SimulatedConnector::new()
        .with_delay(Duration::ZERO)
        .with_project_id(Some(String::from("project-123")))
        .with_balance_wei(2_500_000_000_000_000_000);
    let connection = WalletConnection::new(Arc::new(connector));

    connection.connect("walletconnect").await;

    let state = connection.state();
    assert!(state.is_connected);
    assert_eq!(state.connector, Some(ConnectorKind::WalletConnect));
    assert_eq!(state.balance.as_deref(), Some("2.5000"));
}

#[tokio::test]
async fn when_simulated_connector_fails_state_keeps_no_address() {
    let connector = SimulatedConnector::new()
        .with_delay(Duration::ZERO)
        .failing(WalletError::Connector(String::from("extension not found")));
    let connection = WalletConnection::new(Arc::new(connector));

    connection.connect("unknown-wallet").await;

    let state = connection.state();
    assert_eq!(state.address, None);
    assert_eq!(
        state.error.as_deref(),
        Some("connector failure: extension not found")
    );
}
