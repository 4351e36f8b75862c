//! Shared fakes for the behaviour suites.

use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub use chainpulse_core::{
    FetchError, FetchResult, HttpClient, HttpError, HttpRequest, HttpResponse, ValueFetcher,
};
use chainpulse_core::rpc::FetchFuture;
use serde_json::{json, Value};
use tokio::sync::Semaphore;

/// JSON-RPC success body carrying `result`.
pub fn rpc_result(result: &str) -> HttpResponse {
    HttpResponse::ok_json(json!({ "jsonrpc": "2.0", "id": 1, "result": result }).to_string())
}

/// JSON-RPC body carrying an `error` object.
pub fn rpc_error(code: i64, message: &str) -> HttpResponse {
    HttpResponse::ok_json(
        json!({ "jsonrpc": "2.0", "id": 1, "error": { "code": code, "message": message } })
            .to_string(),
    )
}

/// Transport that answers by JSON-RPC method and counts every call.
#[derive(Default)]
pub struct ScriptedHttpClient {
    replies: Mutex<HashMap<String, Result<HttpResponse, HttpError>>>,
    requests: Mutex<Vec<HttpRequest>>,
    calls: AtomicUsize,
    latency: Duration,
}

impl ScriptedHttpClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    pub fn on(self, method: &str, reply: Result<HttpResponse, HttpError>) -> Self {
        self.set(method, reply);
        self
    }

    /// Replaces the reply for `method`.
    pub fn set(&self, method: &str, reply: Result<HttpResponse, HttpError>) {
        self.replies
            .lock()
            .expect("replies lock")
            .insert(method.to_string(), reply);
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().expect("requests lock").clone()
    }

    fn reply_for(&self, request: &HttpRequest) -> Result<HttpResponse, HttpError> {
        let method = request
            .body
            .as_deref()
            .and_then(|body| serde_json::from_str::<Value>(body).ok())
            .and_then(|body| body.get("method").and_then(Value::as_str).map(str::to_string))
            .unwrap_or_default();

        self.replies
            .lock()
            .expect("replies lock")
            .get(&method)
            .cloned()
            .unwrap_or_else(|| Err(HttpError::new(format!("no scripted reply for '{method}'"))))
    }
}

impl HttpClient for ScriptedHttpClient {
    fn execute<'a>(
        &'a self,
        request: HttpRequest,
    ) -> Pin<Box<dyn Future<Output = Result<HttpResponse, HttpError>> + Send + 'a>> {
        Box::pin(async move {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let reply = self.reply_for(&request);
            self.requests.lock().expect("requests lock").push(request);
            if !self.latency.is_zero() {
                tokio::time::sleep(self.latency).await;
            }
            reply
        })
    }
}

/// Fetcher that blocks until released, for exercising in-flight behaviour.
pub struct GatedFetcher {
    value: String,
    gate: Arc<Semaphore>,
    calls: AtomicUsize,
}

impl GatedFetcher {
    /// `open_calls` fetches complete immediately; later ones wait for
    /// [`GatedFetcher::release`].
    pub fn new(value: &str, open_calls: usize) -> Self {
        Self {
            value: value.to_string(),
            gate: Arc::new(Semaphore::new(open_calls)),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn release(&self) {
        self.gate.add_permits(1);
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl ValueFetcher<String> for GatedFetcher {
    fn describe(&self) -> String {
        String::from("gated")
    }

    fn fetch(&self) -> FetchFuture<'_, String> {
        Box::pin(async move {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let permit = self
                .gate
                .acquire()
                .await
                .map_err(|_| FetchError::transport("gate closed"))?;
            permit.forget();
            Ok(self.value.clone())
        })
    }
}
