use thiserror::Error;

/// Outcome of a single upstream fetch.
pub type FetchResult<T> = Result<T, FetchError>;

/// Failure classification for one fetch attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchErrorKind {
    MissingConfig,
    Transport,
    Upstream,
    Decode,
}

/// Errors produced by fetchers. None of them reach source consumers; they are
/// logged, recorded as `last_error`, and replaced by the fallback value.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FetchError {
    #[error("missing configuration: {0}")]
    MissingConfig(String),

    #[error("transport error: {message}")]
    Transport { message: String, timed_out: bool },

    #[error("upstream error: {0}")]
    Upstream(String),

    #[error("decode error: {0}")]
    Decode(String),
}

impl FetchError {
    pub fn missing_config(message: impl Into<String>) -> Self {
        Self::MissingConfig(message.into())
    }

    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
            timed_out: false,
        }
    }

    pub fn timeout(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
            timed_out: true,
        }
    }

    pub fn upstream(message: impl Into<String>) -> Self {
        Self::Upstream(message.into())
    }

    pub fn decode(message: impl Into<String>) -> Self {
        Self::Decode(message.into())
    }

    pub const fn kind(&self) -> FetchErrorKind {
        match self {
            Self::MissingConfig(_) => FetchErrorKind::MissingConfig,
            Self::Transport { .. } => FetchErrorKind::Transport,
            Self::Upstream(_) => FetchErrorKind::Upstream,
            Self::Decode(_) => FetchErrorKind::Decode,
        }
    }

    pub const fn code(&self) -> &'static str {
        match self.kind() {
            FetchErrorKind::MissingConfig => "fetch.missing_config",
            FetchErrorKind::Transport => "fetch.transport",
            FetchErrorKind::Upstream => "fetch.upstream",
            FetchErrorKind::Decode => "fetch.decode",
        }
    }

    pub fn message(&self) -> &str {
        match self {
            Self::MissingConfig(message)
            | Self::Upstream(message)
            | Self::Decode(message)
            | Self::Transport { message, .. } => message,
        }
    }

    pub const fn timed_out(&self) -> bool {
        matches!(self, Self::Transport { timed_out: true, .. })
    }
}

/// Invalid process configuration.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{name} must be {expected}, got '{value}'")]
    InvalidValue {
        name: &'static str,
        expected: &'static str,
        value: String,
    },

    #[error("{name} must be greater than zero")]
    ZeroValue { name: &'static str },

    #[error("rpc url must start with http:// or https://: '{value}'")]
    InvalidRpcUrl { value: String },
}

/// Failures raised by a wallet connector.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum WalletError {
    #[error("connection request rejected: {0}")]
    Rejected(String),

    #[error("walletconnect project id is not configured")]
    MissingProjectId,

    #[error("connector failure: {0}")]
    Connector(String),
}
