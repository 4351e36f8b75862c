//! Core contracts for chainpulse.
//!
//! chainpulse reads a handful of chain figures from a JSON-RPC node provider
//! and keeps them, along with curated feeds, permanently renderable: every
//! value starts at a known-safe default, refreshes on a fixed schedule, and
//! falls back to that default whenever the upstream misbehaves.
//!
//! # Modules
//!
//! | Module | Contents |
//! |--------|----------|
//! | [`http_client`] | Transport seam and the reqwest implementation |
//! | [`rpc`] | JSON-RPC endpoint, wire types and value fetchers |
//! | [`units`] | Hex quantity decoding and unit formatting |
//! | [`fallback`] | Data kinds and their default values |
//! | [`catalog`] | Curated network, news and dApp content |
//! | [`polling`] | Resilient polling sources |
//! | [`dashboard`] | One source per data kind behind a single facade |
//! | [`wallet`] | Wallet connection state |
//! | [`config`] | Environment-driven settings |
//! | [`error`] | Error taxonomy |
//!
//! # Architecture
//!
//! ```text
//! Settings ──► Dashboard ──► PollingSource<T> ──► ValueFetcher<T>
//!                                 │                   ├─ RpcFetcher ──► HttpClient
//!                                 │                   └─ StaticFetcher ──► catalog
//!                                 └─► watch::Receiver<PollingState<T>> (consumers)
//! ```

pub mod catalog;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod fallback;
pub mod http_client;
pub mod polling;
pub mod rpc;
pub mod units;
pub mod wallet;

pub use catalog::{
    DApp, DAppFilter, GasPricePoint, NetworkStats, NewsItem, TokenBalance, Transaction,
};
pub use config::Settings;
pub use dashboard::{
    AccountSnapshot, AccountSources, Dashboard, DashboardBuilder, DashboardSnapshot, NetworkStatus,
};
pub use error::{ConfigError, FetchError, FetchErrorKind, FetchResult, WalletError};
pub use fallback::DataKind;
pub use http_client::{
    HttpAuth, HttpClient, HttpError, HttpRequest, HttpResponse, ReqwestHttpClient,
};
pub use polling::{PollingSource, PollingState, RefreshOutcome, SourceHealth, SourceSnapshot};
pub use rpc::{
    block_number_fetcher, gas_price_fetcher, CredentialPlacement, RpcCall, RpcEndpoint, RpcFetcher,
    StaticFetcher, ValueFetcher,
};
pub use units::{
    decode_block_number, decode_gas_price, format_token_amount, parse_hex_quantity,
    wei_to_gwei_string,
};
pub use wallet::{
    ConnectorKind, SimulatedConnector, WalletConnection, WalletConnector, WalletSession,
    WalletState,
};
