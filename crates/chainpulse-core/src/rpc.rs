//! Single-shot upstream fetchers.
//!
//! A [`ValueFetcher`] performs exactly one upstream call per invocation and
//! reports every outcome as a [`FetchResult`]. Fetchers never cache and never
//! retry; both concerns belong to the polling layer.
//!
//! | Fetcher | Upstream | Used for |
//! |---------|----------|----------|
//! | [`RpcFetcher`] | JSON-RPC 2.0 over HTTPS POST | gas price, block number |
//! | [`StaticFetcher`] | in-process producer | catalog-backed kinds (news, dApps, ...) |

use std::fmt::{Debug, Formatter};
use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::config::{duration_millis, Settings};
use crate::error::{FetchError, FetchResult};
use crate::http_client::{HttpAuth, HttpClient, HttpRequest};
use crate::units::{decode_block_number, decode_gas_price};

/// Boxed future returned by [`ValueFetcher::fetch`].
pub type FetchFuture<'a, T> = Pin<Box<dyn Future<Output = FetchResult<T>> + Send + 'a>>;

/// Maps a raw JSON-RPC `result` to the target type.
pub type Decoder<T> = Arc<dyn Fn(&Value) -> FetchResult<T> + Send + Sync>;

/// One upstream call producing a typed value.
pub trait ValueFetcher<T>: Send + Sync {
    /// Short label used in logs, e.g. `rpc:eth_gasPrice`.
    fn describe(&self) -> String;

    fn fetch(&self) -> FetchFuture<'_, T>;
}

/// Where the provider credential travels in the request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CredentialPlacement {
    /// Appended to the base URL as the final path segment (Alchemy style).
    PathSegment,
    Bearer,
    Header(String),
}

/// Immutable upstream endpoint configuration.
#[derive(Clone, PartialEq, Eq)]
pub struct RpcEndpoint {
    base_url: String,
    credential: Option<String>,
    placement: CredentialPlacement,
    timeout: Duration,
}

impl Debug for RpcEndpoint {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RpcEndpoint")
            .field("base_url", &self.base_url)
            .field("credential", &self.credential.as_ref().map(|_| "<redacted>"))
            .field("placement", &self.placement)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl RpcEndpoint {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            credential: None,
            placement: CredentialPlacement::PathSegment,
            timeout: Duration::from_millis(crate::config::DEFAULT_TIMEOUT_MS),
        }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(settings.rpc_url.clone())
            .with_credential(settings.api_key.clone())
            .with_timeout(settings.request_timeout)
    }

    pub fn with_credential(mut self, credential: Option<String>) -> Self {
        self.credential = credential.filter(|value| !value.is_empty());
        self
    }

    pub fn with_placement(mut self, placement: CredentialPlacement) -> Self {
        self.placement = placement;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn has_credential(&self) -> bool {
        self.credential.is_some()
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Request URL, or `None` when the credential is missing.
    pub fn url(&self) -> Option<String> {
        let credential = self.credential.as_ref()?;
        Some(match self.placement {
            CredentialPlacement::PathSegment => {
                format!("{}/{}", self.base_url, urlencoding::encode(credential))
            }
            CredentialPlacement::Bearer | CredentialPlacement::Header(_) => self.base_url.clone(),
        })
    }

    fn auth(&self) -> HttpAuth {
        match (&self.placement, &self.credential) {
            (CredentialPlacement::Bearer, Some(token)) => HttpAuth::BearerToken(token.clone()),
            (CredentialPlacement::Header(name), Some(value)) => HttpAuth::Header {
                name: name.clone(),
                value: value.clone(),
            },
            _ => HttpAuth::None,
        }
    }
}

/// Method and parameters of a JSON-RPC call.
#[derive(Debug, Clone, PartialEq)]
pub struct RpcCall {
    pub method: String,
    pub params: Vec<Value>,
}

impl RpcCall {
    pub fn new(method: impl Into<String>, params: Vec<Value>) -> Self {
        Self {
            method: method.into(),
            params,
        }
    }

    pub fn eth_gas_price() -> Self {
        Self::new("eth_gasPrice", Vec::new())
    }

    pub fn eth_block_number() -> Self {
        Self::new("eth_blockNumber", Vec::new())
    }
}

/// JSON-RPC 2.0 request body.
#[derive(Debug, Serialize)]
pub struct RpcRequest<'a> {
    pub jsonrpc: &'static str,
    pub id: u64,
    pub method: &'a str,
    pub params: &'a [Value],
}

/// JSON-RPC 2.0 response body.
#[derive(Debug, Clone, Deserialize)]
pub struct RpcResponse {
    #[serde(default)]
    pub id: Option<Value>,
    #[serde(default)]
    pub result: Option<Value>,
    #[serde(default)]
    pub error: Option<RpcErrorObject>,
}

/// Application-level error reported by the provider.
#[derive(Debug, Clone, Deserialize)]
pub struct RpcErrorObject {
    #[serde(default)]
    pub code: i64,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub data: Option<Value>,
}

impl RpcErrorObject {
    fn describe(&self) -> String {
        if self.message.is_empty() {
            format!("provider error code {}", self.code)
        } else {
            self.message.clone()
        }
    }
}

/// Fetcher issuing one JSON-RPC call per invocation.
pub struct RpcFetcher<T> {
    endpoint: RpcEndpoint,
    call: RpcCall,
    decode: Decoder<T>,
    http_client: Arc<dyn HttpClient>,
    next_id: AtomicU64,
}

impl<T> RpcFetcher<T> {
    pub fn new(
        endpoint: RpcEndpoint,
        call: RpcCall,
        decode: Decoder<T>,
        http_client: Arc<dyn HttpClient>,
    ) -> Self {
        Self {
            endpoint,
            call,
            decode,
            http_client,
            next_id: AtomicU64::new(1),
        }
    }

    pub fn endpoint(&self) -> &RpcEndpoint {
        &self.endpoint
    }

    async fn execute(&self) -> FetchResult<T> {
        let Some(url) = self.endpoint.url() else {
            return Err(FetchError::missing_config(format!(
                "no API key configured for {}",
                self.call.method
            )));
        };

        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let payload = RpcRequest {
            jsonrpc: "2.0",
            id,
            method: &self.call.method,
            params: &self.call.params,
        };

        let timeout = self.endpoint.timeout();
        let request = HttpRequest::post(url)
            .with_json_body(&payload)
            .map_err(|e| {
                FetchError::transport(format!("failed to encode {} request: {e}", self.call.method))
            })?
            .with_auth(&self.endpoint.auth())
            .with_timeout_ms(duration_millis(timeout));

        debug!(method = %self.call.method, id, "sending rpc request");

        let response = match tokio::time::timeout(timeout, self.http_client.execute(request)).await
        {
            Err(_) => {
                return Err(FetchError::timeout(format!(
                    "{} did not complete within {}ms",
                    self.call.method,
                    timeout.as_millis()
                )))
            }
            Ok(Err(error)) if error.timed_out() => {
                return Err(FetchError::timeout(error.message()))
            }
            Ok(Err(error)) => return Err(FetchError::transport(error.message())),
            Ok(Ok(response)) => response,
        };

        match serde_json::from_str::<RpcResponse>(&response.body) {
            Ok(RpcResponse {
                error: Some(error), ..
            }) => Err(FetchError::upstream(error.describe())),
            Ok(_) | Err(_) if !response.is_success() => Err(FetchError::transport(format!(
                "{} returned http status {}",
                self.call.method, response.status
            ))),
            Ok(RpcResponse {
                result: Some(result),
                ..
            }) => (self.decode)(&result),
            Ok(_) => Err(FetchError::decode(format!(
                "{} response carried neither result nor error",
                self.call.method
            ))),
            Err(e) => Err(FetchError::decode(format!(
                "{} response is not valid json-rpc: {e}",
                self.call.method
            ))),
        }
    }
}

impl<T: Send + 'static> ValueFetcher<T> for RpcFetcher<T> {
    fn describe(&self) -> String {
        format!("rpc:{}", self.call.method)
    }

    fn fetch(&self) -> FetchFuture<'_, T> {
        Box::pin(self.execute())
    }
}

/// `eth_gasPrice` fetcher yielding gwei with two decimals.
pub fn gas_price_fetcher(
    endpoint: RpcEndpoint,
    http_client: Arc<dyn HttpClient>,
) -> RpcFetcher<String> {
    RpcFetcher::new(
        endpoint,
        RpcCall::eth_gas_price(),
        Arc::new(decode_gas_price),
        http_client,
    )
}

/// `eth_blockNumber` fetcher yielding the decimal block height.
pub fn block_number_fetcher(
    endpoint: RpcEndpoint,
    http_client: Arc<dyn HttpClient>,
) -> RpcFetcher<String> {
    RpcFetcher::new(
        endpoint,
        RpcCall::eth_block_number(),
        Arc::new(decode_block_number),
        http_client,
    )
}

/// Fetcher backed by an in-process producer, optionally after a fixed latency.
pub struct StaticFetcher<T> {
    label: String,
    latency: Duration,
    producer: Arc<dyn Fn() -> FetchResult<T> + Send + Sync>,
}

impl<T> StaticFetcher<T> {
    pub fn new<F>(label: impl Into<String>, producer: F) -> Self
    where
        F: Fn() -> FetchResult<T> + Send + Sync + 'static,
    {
        Self {
            label: label.into(),
            latency: Duration::ZERO,
            producer: Arc::new(producer),
        }
    }

    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }
}

impl<T: Send + 'static> ValueFetcher<T> for StaticFetcher<T> {
    fn describe(&self) -> String {
        format!("static:{}", self.label)
    }

    fn fetch(&self) -> FetchFuture<'_, T> {
        Box::pin(async move {
            if !self.latency.is_zero() {
                tokio::time::sleep(self.latency).await;
            }
            (self.producer)()
        })
    }
}
