#![allow(dead_code)]

use std::{
    sync::{Arc, Mutex},
    time::Duration,
};

use async_trait::async_trait;
use motorinci::{
    client::RawResponse, error::Result, ApiClient, ApiRequest, AuthSession, Credentials,
    MemoryTokenStore, Transport,
};
use reqwest::{Method, StatusCode};
use serde_json::{json, Value};

/// One request as the fake backend saw it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Call {
    pub method: Method,
    pub path: String,
    pub query: Vec<(String, String)>,
    pub token: Option<String>,
}

type Handler = dyn Fn(&Call) -> RawResponse + Send + Sync;

/// In-process backend answering from a closure and logging every call.
pub struct FakeBackend {
    handler: Box<Handler>,
    calls: Mutex<Vec<Call>>,
    delay: Option<Duration>,
}

impl FakeBackend {
    pub fn new(handler: impl Fn(&Call) -> RawResponse + Send + Sync + 'static) -> Arc<Self> {
        Arc::new(Self {
            handler: Box::new(handler),
            calls: Mutex::new(Vec::new()),
            delay: None,
        })
    }

    pub fn slow(
        delay: Duration,
        handler: impl Fn(&Call) -> RawResponse + Send + Sync + 'static,
    ) -> Arc<Self> {
        Arc::new(Self {
            handler: Box::new(handler),
            calls: Mutex::new(Vec::new()),
            delay: Some(delay),
        })
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn count(&self, method: Method, path: &str) -> usize {
        self.calls()
            .iter()
            .filter(|c| c.method == method && c.path == path)
            .count()
    }
}

#[async_trait]
impl Transport for FakeBackend {
    async fn send(&self, request: &ApiRequest, token: Option<&str>) -> Result<RawResponse> {
        let call = Call {
            method: request.method.clone(),
            path: request.path.clone(),
            query: request.query.clone(),
            token: token.map(str::to_string),
        };
        self.calls.lock().unwrap().push(call.clone());
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        Ok((self.handler)(&call))
    }
}

pub fn credentials() -> Credentials {
    Credentials {
        login: "admin".into(),
        password: "secret".into(),
    }
}

pub fn client(backend: &Arc<FakeBackend>) -> ApiClient {
    ApiClient::new(backend.clone(), AuthSession::in_memory(credentials()))
}

pub fn client_with_token(backend: &Arc<FakeBackend>, token: &str) -> ApiClient {
    let session = AuthSession::new(credentials(), Arc::new(MemoryTokenStore::with_token(token)));
    ApiClient::new(backend.clone(), session)
}

pub fn ok(value: Value) -> RawResponse {
    RawResponse::json(StatusCode::OK, &value)
}

pub fn login_ok(token: &str) -> RawResponse {
    ok(json!({ "token": token }))
}

pub fn status(status: StatusCode, message: &str) -> RawResponse {
    RawResponse::json(status, &json!({ "message": message }))
}

pub fn brand(id: u64) -> Value {
    json!({ "id": id, "name": format!("Brand {id}") })
}

/// A `{data: {data, current_page, last_page}}` brand page.
pub fn brand_page(ids: &[u64], current_page: u32, last_page: u32) -> RawResponse {
    let data: Vec<Value> = ids.iter().copied().map(brand).collect();
    ok(json!({
        "data": { "data": data, "current_page": current_page, "last_page": last_page }
    }))
}

pub fn page_param(call: &Call) -> Option<&str> {
    call.query
        .iter()
        .find(|(k, _)| k == "page")
        .map(|(_, v)| v.as_str())
}
