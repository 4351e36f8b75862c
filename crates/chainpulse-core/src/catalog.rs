//! Curated content served by the catalog-backed sources.
//!
//! Network stats, gas history, account activity, news and the dApp directory
//! are not read from the node provider; they are produced here and flow through
//! the same polling machinery as live values.

use serde::{Deserialize, Serialize};
use time::{Duration as TimeDuration, OffsetDateTime};

use crate::error::FetchResult;
use crate::units::format_token_amount;

pub const DAPP_CATEGORIES: [&str; 6] = [
    "defi",
    "nft",
    "gaming",
    "social",
    "metaverse",
    "infrastructure",
];

const HISTORY_POINTS: i64 = 24;

/// Headline network figures.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkStats {
    pub tps: String,
    pub difficulty: String,
    pub hashrate: String,
}

/// One hourly gas price sample.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GasPricePoint {
    /// Local clock label, `HH:MM`.
    pub time: String,
    /// Gwei with two decimals.
    pub price: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub hash: String,
    pub from: String,
    pub to: String,
    pub value: String,
    #[serde(with = "time::serde::rfc3339")]
    pub timestamp: OffsetDateTime,
    pub asset: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenBalance {
    pub token_name: String,
    pub token_symbol: String,
    /// Integer amount in the token's base unit.
    pub balance: String,
    pub token_decimal: u8,
}

impl TokenBalance {
    pub fn display_balance(&self) -> FetchResult<String> {
        format_token_amount(&self.balance, self.token_decimal)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewsItem {
    pub id: String,
    pub title: String,
    pub description: String,
    pub url: String,
    pub image_url: String,
    pub source: String,
    pub date: String,
    pub category: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DApp {
    pub id: String,
    pub name: String,
    pub description: String,
    pub category: String,
    pub users: String,
    pub rating: f64,
    pub image_url: String,
    pub url: String,
    pub featured: bool,
}

/// Directory filter: free-text query plus optional category.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DAppFilter {
    pub query: String,
    /// `None` or `"all"` matches every category.
    pub category: Option<String>,
    pub featured_only: bool,
}

impl DAppFilter {
    pub fn matches(&self, dapp: &DApp) -> bool {
        let query = self.query.trim().to_lowercase();
        let matches_query = query.is_empty()
            || dapp.name.to_lowercase().contains(&query)
            || dapp.description.to_lowercase().contains(&query);

        let matches_category = match self.category.as_deref() {
            None | Some("all") => true,
            Some(category) => dapp.category.eq_ignore_ascii_case(category),
        };

        matches_query && matches_category && (!self.featured_only || dapp.featured)
    }

    pub fn apply<'a>(&self, dapps: &'a [DApp]) -> Vec<&'a DApp> {
        dapps.iter().filter(|dapp| self.matches(dapp)).collect()
    }
}

pub fn featured(dapps: &[DApp]) -> Vec<&DApp> {
    dapps.iter().filter(|dapp| dapp.featured).collect()
}

pub fn news_by_category<'a>(news: &'a [NewsItem], category: &str) -> Vec<&'a NewsItem> {
    news.iter()
        .filter(|item| item.category.eq_ignore_ascii_case(category))
        .collect()
}

pub fn network_stats() -> NetworkStats {
    crate::fallback::network_stats()
}

/// Twenty-four hourly samples ending at `now`, oldest first, each within 20..100 gwei.
pub fn gas_price_history(now: OffsetDateTime) -> Vec<GasPricePoint> {
    (0..HISTORY_POINTS)
        .rev()
        .map(|hours_ago| {
            let at = now - TimeDuration::hours(hours_ago);
            GasPricePoint {
                time: format!("{:02}:{:02}", at.hour(), at.minute()),
                price: format!("{:.2}", fastrand::f64() * 80.0 + 20.0),
            }
        })
        .collect()
}

/// Recent transfers for an account.
pub fn transactions(now: OffsetDateTime) -> Vec<Transaction> {
    vec![
        Transaction {
            hash: String::from(
                "0x1234567890abcdef1234567890abcdef1234567890abcdef1234567890abcdef",
            ),
            from: String::from("0x1234567890abcdef1234567890abcdef12345678"),
            to: String::from("0xabcdef1234567890abcdef1234567890abcdef12"),
            value: String::from("1.0000"),
            timestamp: now,
            asset: String::from("ETH"),
        },
        Transaction {
            hash: String::from(
                "0xabcdef1234567890abcdef1234567890abcdef1234567890abcdef1234567890",
            ),
            from: String::from("0xabcdef1234567890abcdef1234567890abcdef12"),
            to: String::from("0x1234567890abcdef1234567890abcdef12345678"),
            value: String::from("0.5000"),
            timestamp: now - TimeDuration::hours(1),
            asset: String::from("ETH"),
        },
    ]
}

pub fn token_balances() -> Vec<TokenBalance> {
    vec![
        TokenBalance {
            token_name: String::from("Ethereum"),
            token_symbol: String::from("ETH"),
            balance: String::from("1000000000000000000"),
            token_decimal: 18,
        },
        TokenBalance {
            token_name: String::from("USD Coin"),
            token_symbol: String::from("USDC"),
            balance: String::from("1000000000"),
            token_decimal: 6,
        },
    ]
}

pub fn news(today: time::Date) -> Vec<NewsItem> {
    let date = today.to_string();
    vec![
        NewsItem {
            id: String::from("1"),
            title: String::from("Ethereum's Dencun Upgrade Successfully Activated on Mainnet"),
            description: String::from(
                "Ethereum's Dencun upgrade has been successfully activated on the mainnet, bringing proto-danksharding to reduce transaction costs for layer-2 solutions.",
            ),
            url: String::from("https://example.com/news/ethereum-dencun"),
            image_url: String::from(
                "https://ethereum.org/static/28214bb68eb5445dcb063a72535bc90c/9019e/hero.png",
            ),
            source: String::from("Ethereum Foundation"),
            date: date.clone(),
            category: String::from("Ethereum"),
        },
        NewsItem {
            id: String::from("2"),
            title: String::from("Uniswap Launches V4 with New Gas Optimization Features"),
            description: String::from(
                "Uniswap has launched its V4 protocol with significant gas optimizations and new features for liquidity providers.",
            ),
            url: String::from("https://example.com/news/uniswap-v4"),
            image_url: String::from("https://uniswap.org/images/twitter-card.jpg"),
            source: String::from("DeFi Pulse"),
            date: date.clone(),
            category: String::from("DeFi"),
        },
        NewsItem {
            id: String::from("3"),
            title: String::from("Bored Ape Yacht Club Announces New Metaverse Integration"),
            description: String::from(
                "Yuga Labs has announced a new metaverse integration for Bored Ape Yacht Club NFT holders, expanding the utility of the popular collection.",
            ),
            url: String::from("https://example.com/news/bayc-metaverse"),
            image_url: String::from(
                "https://boredapeyachtclub.com/0d090e2a894a45a5e1ce2741e4bfd778.png",
            ),
            source: String::from("NFT Evening"),
            date: date.clone(),
            category: String::from("NFTs"),
        },
        NewsItem {
            id: String::from("4"),
            title: String::from(
                "Polygon Launches zkEVM Mainnet, Bringing Ethereum Scaling Solution",
            ),
            description: String::from(
                "Polygon has launched its zkEVM mainnet, providing a zero-knowledge scaling solution compatible with existing Ethereum smart contracts.",
            ),
            url: String::from("https://example.com/news/polygon-zkevm"),
            image_url: String::from("https://polygon.technology/assets/images/polygon-logo.svg"),
            source: String::from("Polygon"),
            date: date.clone(),
            category: String::from("Infrastructure"),
        },
        NewsItem {
            id: String::from("5"),
            title: String::from("Axie Infinity Releases Land Gameplay Alpha"),
            description: String::from(
                "Sky Mavis has released the alpha version of land gameplay for Axie Infinity, allowing players to build and develop virtual land plots.",
            ),
            url: String::from("https://example.com/news/axie-land"),
            image_url: String::from("https://axieinfinity.com/images/axie-share.jpg"),
            source: String::from("GameFi Report"),
            date: date.clone(),
            category: String::from("Gaming"),
        },
        NewsItem {
            id: String::from("6"),
            title: String::from("SEC Approves Spot Bitcoin ETFs in Historic Decision"),
            description: String::from(
                "The U.S. Securities and Exchange Commission has approved spot Bitcoin ETFs, marking a historic milestone for cryptocurrency adoption.",
            ),
            url: String::from("https://example.com/news/bitcoin-etf"),
            image_url: String::from("https://bitcoin.org/img/icons/opengraph.png"),
            source: String::from("Crypto Briefing"),
            date: date.clone(),
            category: String::from("Regulation"),
        },
    ]
}

pub fn dapps() -> Vec<DApp> {
    vec![
        DApp {
            id: String::from("1"),
            name: String::from("Uniswap"),
            description: String::from("Leading decentralized crypto trading protocol"),
            category: String::from("defi"),
            users: String::from("2.4M+"),
            rating: 4.8,
            image_url: String::from("https://cryptologos.cc/logos/uniswap-uni-logo.png"),
            url: String::from("https://uniswap.org"),
            featured: true,
        },
        DApp {
            id: String::from("2"),
            name: String::from("OpenSea"),
            description: String::from("The world's first and largest NFT marketplace"),
            category: String::from("nft"),
            users: String::from("1.8M+"),
            rating: 4.7,
            image_url: String::from(
                "https://storage.googleapis.com/opensea-static/Logomark/OpenSea-Full-Logo%20(light).png",
            ),
            url: String::from("https://opensea.io"),
            featured: true,
        },
        DApp {
            id: String::from("3"),
            name: String::from("Aave"),
            description: String::from(
                "Open source liquidity protocol for earning interest and borrowing assets",
            ),
            category: String::from("defi"),
            users: String::from("1.2M+"),
            rating: 4.6,
            image_url: String::from("https://cryptologos.cc/logos/aave-aave-logo.png"),
            url: String::from("https://aave.com"),
            featured: false,
        },
        DApp {
            id: String::from("4"),
            name: String::from("Axie Infinity"),
            description: String::from("Blockchain-based battling and trading game"),
            category: String::from("gaming"),
            users: String::from("3M+"),
            rating: 4.5,
            image_url: String::from("https://cryptologos.cc/logos/axie-infinity-axs-logo.png"),
            url: String::from("https://axieinfinity.com"),
            featured: true,
        },
        DApp {
            id: String::from("5"),
            name: String::from("Compound"),
            description: String::from("Algorithmic, autonomous interest rate protocol"),
            category: String::from("defi"),
            users: String::from("950K+"),
            rating: 4.4,
            image_url: String::from("https://cryptologos.cc/logos/compound-comp-logo.png"),
            url: String::from("https://compound.finance"),
            featured: false,
        },
        DApp {
            id: String::from("6"),
            name: String::from("Decentraland"),
            description: String::from(
                "Virtual reality platform powered by the Ethereum blockchain",
            ),
            category: String::from("metaverse"),
            users: String::from("1.5M+"),
            rating: 4.3,
            image_url: String::from("https://cryptologos.cc/logos/decentraland-mana-logo.png"),
            url: String::from("https://decentraland.org"),
            featured: false,
        },
        DApp {
            id: String::from("7"),
            name: String::from("Lens Protocol"),
            description: String::from("Web3 social graph on Polygon"),
            category: String::from("social"),
            users: String::from("800K+"),
            rating: 4.7,
            image_url: String::from("https://lens.xyz/static/images/lens-logo.svg"),
            url: String::from("https://lens.xyz"),
            featured: true,
        },
        DApp {
            id: String::from("8"),
            name: String::from("ENS"),
            description: String::from("Decentralized naming for wallets, websites, & more"),
            category: String::from("infrastructure"),
            users: String::from("2.1M+"),
            rating: 4.9,
            image_url: String::from(
                "https://cryptologos.cc/logos/ethereum-name-service-ens-logo.png",
            ),
            url: String::from("https://ens.domains"),
            featured: false,
        },
        DApp {
            id: String::from("9"),
            name: String::from("The Sandbox"),
            description: String::from(
                "Community-driven platform where creators can monetize voxel assets",
            ),
            category: String::from("metaverse"),
            users: String::from("1.3M+"),
            rating: 4.2,
            image_url: String::from("https://cryptologos.cc/logos/the-sandbox-sand-logo.png"),
            url: String::from("https://sandbox.game"),
            featured: false,
        },
    ]
}
