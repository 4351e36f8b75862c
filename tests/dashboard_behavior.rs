//! Behaviour tests for the dashboard facade.

use std::sync::Arc;

use chainpulse_core::{
    DataKind, Dashboard, HttpError, NetworkStatus, RefreshOutcome, Settings, SourceHealth,
};
use chainpulse_tests::{rpc_result, ScriptedHttpClient};

fn healthy_provider() -> Arc<ScriptedHttpClient> {
    Arc::new(
        ScriptedHttpClient::new()
            .on("eth_gasPrice", Ok(rpc_result("0x4a817c800")))
            .on("eth_blockNumber", Ok(rpc_result("0x112a880"))),
    )
}

#[tokio::test(start_paused = true)]
async fn when_api_key_missing_dashboard_shows_fallbacks_without_network_calls() {
    // Given: settings without a provider key
    let client = healthy_provider();
    let dashboard = Dashboard::builder(Settings::default())
        .with_http_client(client.clone())
        .build();

    // When: every source settles
    let snapshot = dashboard.settled().await;

    // Then: chain figures are the documented defaults and nothing was sent
    assert_eq!(client.calls(), 0);
    assert_eq!(snapshot.gas_price.value, "25.00");
    assert_eq!(snapshot.block_number.value, "18245367");
    assert_eq!(snapshot.gas_price.health, SourceHealth::Degraded);
    assert!(snapshot
        .block_number
        .last_error_message
        .as_deref()
        .is_some_and(|message| message.starts_with("missing configuration")));
    assert_eq!(snapshot.network_status, NetworkStatus::IssuesDetected);

    // Catalog-backed sources are unaffected by the missing key
    assert_eq!(snapshot.network_stats.health, SourceHealth::Fresh);
    assert_eq!(snapshot.news.value.len(), 6);
}

#[tokio::test(start_paused = true)]
async fn when_sources_have_not_settled_status_is_loading() {
    let dashboard = Dashboard::builder(Settings::default().with_api_key("test-key"))
        .with_http_client(healthy_provider())
        .build();

    assert_eq!(dashboard.network_status(), NetworkStatus::Loading);
    assert_eq!(dashboard.gas_price.current_value(), "25.00");

    dashboard.settled().await;
    assert_eq!(dashboard.network_status(), NetworkStatus::Healthy);
}

#[tokio::test(start_paused = true)]
async fn when_provider_is_healthy_snapshot_serializes_live_values() {
    let dashboard = Dashboard::builder(Settings::default().with_api_key("test-key"))
        .with_http_client(healthy_provider())
        .build();

    let snapshot = dashboard.settled().await;
    let json = serde_json::to_value(&snapshot).expect("snapshot serializes");

    assert_eq!(json["network_status"], "healthy");
    assert_eq!(json["chain_id"], 1);
    assert_eq!(json["gas_price"]["value"], "20.00");
    assert_eq!(json["gas_price"]["health"], "fresh");
    assert_eq!(json["gas_price"]["last_error_message"], serde_json::Value::Null);
    assert_eq!(json["block_number"]["value"], "18000000");
    assert!(json["block_number"]["last_updated"].is_string());
    assert_eq!(json["gas_price_history"]["value"].as_array().map(Vec::len), Some(24));
    assert!(json.get("account").is_none());
}

#[tokio::test(start_paused = true)]
async fn when_provider_fails_after_success_refresh_shows_fallback_not_last_value() {
    let client = healthy_provider();
    let dashboard = Dashboard::builder(Settings::default().with_api_key("test-key"))
        .with_http_client(client.clone())
        .build();
    assert_eq!(dashboard.settled().await.gas_price.value, "20.00");

    client.set("eth_gasPrice", Err(HttpError::new("connection reset")));
    let outcomes = dashboard.refresh_all().await;

    assert!(outcomes.contains(&(
        DataKind::GasPrice,
        RefreshOutcome::Applied(SourceHealth::Degraded)
    )));
    assert_eq!(dashboard.gas_price.current_value(), "25.00");
    assert_eq!(dashboard.block_number.current_value(), "18000000");
    assert_eq!(dashboard.network_status(), NetworkStatus::IssuesDetected);
}

#[tokio::test(start_paused = true)]
async fn when_shut_down_every_refresh_reports_disposed() {
    let client = healthy_provider();
    let mut dashboard = Dashboard::builder(Settings::default().with_api_key("test-key"))
        .with_http_client(client.clone())
        .build();
    dashboard.track_account("0x1234567890abcdef1234567890abcdef12345678");
    dashboard.settled().await;
    let calls_before = client.calls();

    dashboard.shutdown();
    let outcomes = dashboard.refresh_all().await;

    assert_eq!(outcomes.len(), 8);
    assert!(outcomes
        .iter()
        .all(|(_, outcome)| *outcome == RefreshOutcome::Disposed));
    assert_eq!(client.calls(), calls_before);
}

#[tokio::test(start_paused = true)]
async fn when_account_is_tracked_snapshot_includes_activity() {
    let mut dashboard = Dashboard::builder(Settings::default())
        .with_http_client(healthy_provider())
        .build();

    let account = dashboard.track_account("0xabc");
    assert_eq!(account.address(), "0xabc");
    assert!(account.transactions.current_value().is_empty());

    let snapshot = dashboard.settled().await;
    let activity = snapshot.account.expect("tracked account");
    assert_eq!(activity.transactions.value.len(), 2);
    assert_eq!(
        activity.token_balances.value[0]
            .display_balance()
            .expect("valid balance"),
        "1.0000"
    );

    dashboard.untrack_account();
    assert!(dashboard.snapshot().account.is_none());
}
