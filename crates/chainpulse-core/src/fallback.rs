//! Data kinds and their known-safe default values.

use std::fmt::{Display, Formatter};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::catalog::{GasPricePoint, NetworkStats, TokenBalance, Transaction};
use crate::config::{DEFAULT_CHAIN_INTERVAL, DEFAULT_FEED_INTERVAL};

pub const FALLBACK_GAS_PRICE_GWEI: &str = "25.00";
pub const FALLBACK_BLOCK_NUMBER: &str = "18245367";

/// Every kind of data the dashboard polls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataKind {
    GasPrice,
    BlockNumber,
    NetworkStats,
    GasPriceHistory,
    Transactions,
    TokenBalances,
    News,
    DApps,
}

impl DataKind {
    pub const ALL: [DataKind; 8] = [
        Self::GasPrice,
        Self::BlockNumber,
        Self::NetworkStats,
        Self::GasPriceHistory,
        Self::Transactions,
        Self::TokenBalances,
        Self::News,
        Self::DApps,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::GasPrice => "gas_price",
            Self::BlockNumber => "block_number",
            Self::NetworkStats => "network_stats",
            Self::GasPriceHistory => "gas_price_history",
            Self::Transactions => "transactions",
            Self::TokenBalances => "token_balances",
            Self::News => "news",
            Self::DApps => "dapps",
        }
    }

    /// Poll interval used when no override is configured.
    pub const fn default_interval(self) -> Duration {
        match self {
            Self::News | Self::DApps => DEFAULT_FEED_INTERVAL,
            _ => DEFAULT_CHAIN_INTERVAL,
        }
    }

    /// Whether values of this kind come from the node provider.
    pub const fn is_rpc_backed(self) -> bool {
        matches!(self, Self::GasPrice | Self::BlockNumber)
    }

    /// Literal fallback for scalar kinds.
    pub const fn fallback_literal(self) -> Option<&'static str> {
        match self {
            Self::GasPrice => Some(FALLBACK_GAS_PRICE_GWEI),
            Self::BlockNumber => Some(FALLBACK_BLOCK_NUMBER),
            _ => None,
        }
    }
}

impl Display for DataKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

pub fn gas_price() -> String {
    String::from(FALLBACK_GAS_PRICE_GWEI)
}

pub fn block_number() -> String {
    String::from(FALLBACK_BLOCK_NUMBER)
}

pub fn network_stats() -> NetworkStats {
    NetworkStats {
        tps: String::from("15.2"),
        difficulty: String::from("8500"),
        hashrate: String::from("750"),
    }
}

pub fn transactions() -> Vec<Transaction> {
    Vec::new()
}

pub fn token_balances() -> Vec<TokenBalance> {
    Vec::new()
}

/// History has no fixed literal; a fresh synthetic series stands in.
pub fn gas_price_history() -> Vec<GasPricePoint> {
    crate::catalog::gas_price_history(time::OffsetDateTime::now_utc())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_chain_scalars_are_rpc_backed() {
        let rpc: Vec<_> = DataKind::ALL
            .into_iter()
            .filter(|kind| kind.is_rpc_backed())
            .collect();
        assert_eq!(rpc, vec![DataKind::GasPrice, DataKind::BlockNumber]);
    }

    #[test]
    fn feeds_refresh_every_five_minutes() {
        assert_eq!(DataKind::News.default_interval(), Duration::from_secs(300));
        assert_eq!(DataKind::GasPrice.default_interval(), Duration::from_secs(30));
    }

    #[test]
    fn scalar_literals_match_helpers() {
        assert_eq!(DataKind::GasPrice.fallback_literal(), Some(gas_price().as_str()));
        assert_eq!(DataKind::BlockNumber.fallback_literal(), Some("18245367"));
        assert_eq!(DataKind::News.fallback_literal(), None);
    }
}
