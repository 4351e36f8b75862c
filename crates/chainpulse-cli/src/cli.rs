//! CLI argument definitions.
//!
//! # Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `stats` | Settle every source once and print the dashboard snapshot |
//! | `watch` | Stream chain figures as they refresh |
//! | `news` | List news items, optionally by category |
//! | `dapps` | Search the dApp directory |
//! | `wallet` | Connect a simulated wallet and print its state |
//!
//! # Global Options
//!
//! | Option | Default | Description |
//! |--------|---------|-------------|
//! | `--pretty` | `false` | Pretty-print JSON output |
//! | `--strict` | `false` | Exit with code 5 when any value is degraded |
//!
//! Node provider settings come from `CHAINPULSE_*` environment variables.

use clap::{Args, Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(
    name = "chainpulse",
    author,
    version,
    about = "Chain figures and curated feeds that never go blank"
)]
pub struct Cli {
    /// Pretty-print JSON output with indentation.
    #[arg(long, global = true, default_value_t = false)]
    pub pretty: bool,

    /// Treat degraded values as failures (exit code 5).
    #[arg(long, global = true, default_value_t = false)]
    pub strict: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Fetch every source once and print the dashboard snapshot.
    ///
    ///   chainpulse stats --pretty
    ///   chainpulse stats --account 0xabc...
    Stats(StatsArgs),

    /// Print gas price and block number each time either refreshes.
    ///
    ///   chainpulse watch --updates 5
    Watch(WatchArgs),

    /// List news items.
    ///
    ///   chainpulse news --category defi
    News(NewsArgs),

    /// Search the dApp directory.
    ///
    ///   chainpulse dapps --query swap --category defi
    ///   chainpulse dapps --featured
    Dapps(DappsArgs),

    /// Connect a simulated wallet and print the resulting state.
    ///
    ///   chainpulse wallet metamask
    Wallet(WalletArgs),
}

#[derive(Debug, Args)]
pub struct StatsArgs {
    /// Also load transactions and balances for this address.
    #[arg(long)]
    pub account: Option<String>,
}

#[derive(Debug, Args)]
pub struct WatchArgs {
    /// Stop after this many updates. Runs until interrupted when omitted.
    #[arg(long)]
    pub updates: Option<u64>,
}

#[derive(Debug, Args)]
pub struct NewsArgs {
    /// Restrict to one category (e.g. defi, nft, regulation).
    #[arg(long)]
    pub category: Option<String>,
}

#[derive(Debug, Args)]
pub struct DappsArgs {
    /// Case-insensitive match against name and description.
    #[arg(long, default_value = "")]
    pub query: String,

    /// Category filter; `all` matches every category.
    #[arg(long)]
    pub category: Option<String>,

    /// Only featured dApps.
    #[arg(long, default_value_t = false)]
    pub featured: bool,
}

#[derive(Debug, Args)]
pub struct WalletArgs {
    /// Connector id: metamask, walletconnect or coinbase.
    #[arg(default_value = "metamask")]
    pub connector: String,

    /// Simulated connection delay in milliseconds.
    #[arg(long, default_value_t = 1500)]
    pub delay_ms: u64,
}
