//! Authenticated access to the backend.
//!
//! [`ApiClient::fetch`] attaches the session's bearer token (logging in first
//! when none is cached), re-authenticates exactly once when the backend
//! answers `401`, and unwraps the `{ "data": ... }` envelope.

mod request;
mod transport;

use std::sync::Arc;

use reqwest::StatusCode;
use serde::{de::DeserializeOwned, Deserialize};
use serde_json::json;
use tracing::{debug, info, warn};

pub use request::{ApiRequest, Body, FileUpload, Multipart, Part, RawResponse};
pub use transport::{HttpTransport, Transport};

use crate::{
    abort::AbortSignal,
    config::Config,
    error::{ApiError, Result},
    session::{AuthSession, TokenStore},
};

pub const LOGIN_PATH: &str = "/login";

#[derive(Deserialize)]
struct Envelope<T> {
    data: Option<T>,
}

#[derive(Deserialize)]
struct LoginResponse {
    token: Option<String>,
    data: Option<LoginData>,
}

#[derive(Deserialize)]
struct LoginData {
    token: Option<String>,
}

#[derive(Clone)]
pub struct ApiClient {
    transport: Arc<dyn Transport>,
    session: AuthSession,
}

impl ApiClient {
    pub fn new(transport: Arc<dyn Transport>, session: AuthSession) -> Self {
        Self { transport, session }
    }

    /// Builds a client that talks HTTP to the configured backend.
    pub fn from_config(config: &Config, store: Arc<dyn TokenStore>) -> Result<Self> {
        let transport = HttpTransport::new(config.api_url.clone(), config.timeout)?;
        let session = AuthSession::new(config.credentials.clone(), store);
        Ok(Self::new(Arc::new(transport), session))
    }

    pub fn session(&self) -> &AuthSession {
        &self.session
    }

    /// Sends `request` with auth and returns the envelope's `data`.
    /// `204 No Content` and empty bodies yield `None`.
    pub async fn fetch<T: DeserializeOwned>(
        &self,
        request: ApiRequest,
        signal: Option<&AbortSignal>,
    ) -> Result<Option<T>> {
        decode_envelope(self.send(&request, signal).await?)
    }

    /// Like [`fetch`](Self::fetch) but treats a missing `data` as an error.
    pub async fn fetch_data<T: DeserializeOwned>(
        &self,
        request: ApiRequest,
        signal: Option<&AbortSignal>,
    ) -> Result<T> {
        let path = request.path.clone();
        self.fetch(request, signal)
            .await?
            .ok_or_else(|| ApiError::Decode(format!("response from {path} has no data")))
    }

    /// Sends `request` with auth and decodes the whole body, for the few
    /// endpoints that answer without the `data` envelope.
    pub async fn fetch_body<T: DeserializeOwned>(
        &self,
        request: ApiRequest,
        signal: Option<&AbortSignal>,
    ) -> Result<T> {
        let response = self.send(&request, signal).await?;
        if !response.status.is_success() {
            return Err(ApiError::from_response(response.status, &response.body));
        }
        Ok(serde_json::from_slice(&response.body)?)
    }

    async fn send(&self, request: &ApiRequest, signal: Option<&AbortSignal>) -> Result<RawResponse> {
        let Some(signal) = signal else {
            return self.send_authorized(request).await;
        };
        if signal.is_aborted() {
            return Err(ApiError::Aborted);
        }
        tokio::select! {
            biased;
            _ = signal.aborted() => {
                debug!(path = %request.path, "request aborted");
                Err(ApiError::Aborted)
            }
            result = self.send_authorized(request) => result,
        }
    }

    async fn send_authorized(&self, request: &ApiRequest) -> Result<RawResponse> {
        let token = match self.session.token()? {
            Some(token) => token,
            None => self.login(None).await?,
        };

        let response = self.transport.send(request, Some(&token)).await?;
        if response.status != StatusCode::UNAUTHORIZED {
            return Ok(response);
        }

        warn!(path = %request.path, "token rejected, re-authenticating");
        let token = self.login(Some(&token)).await?;
        let retry = self.transport.send(request, Some(&token)).await?;
        if !retry.status.is_success() {
            warn!(path = %request.path, status = %retry.status, "request failed after re-authentication");
        }
        Ok(retry)
    }

    /// Logs in and stores the new token. If another caller already replaced
    /// `stale` while we waited for the gate, their token is reused.
    async fn login(&self, stale: Option<&str>) -> Result<String> {
        let _guard = self.session.login_guard().await;
        if let Some(current) = self.session.token()? {
            if stale != Some(current.as_str()) {
                debug!("reusing token refreshed by a concurrent request");
                return Ok(current);
            }
        }

        let credentials = self.session.credentials();
        let request = ApiRequest::post(LOGIN_PATH).body(Body::Json(json!({
            "login": credentials.login,
            "password": credentials.password,
        })));

        let response = match self.transport.send(&request, None).await {
            Ok(response) => response,
            Err(e) => {
                warn!("login request failed: {e}");
                return Err(ApiError::Unauthenticated);
            }
        };
        if !response.status.is_success() {
            warn!(status = %response.status, "login rejected");
            return Err(ApiError::Unauthenticated);
        }

        let token = serde_json::from_slice::<LoginResponse>(&response.body)
            .ok()
            .and_then(|body| body.token.or_else(|| body.data.and_then(|data| data.token)))
            .filter(|token| !token.is_empty())
            .ok_or_else(|| {
                warn!("login response carried no token");
                ApiError::Unauthenticated
            })?;

        self.session.set_token(&token)?;
        info!("authenticated with backend");
        Ok(token)
    }
}

fn decode_envelope<T: DeserializeOwned>(response: RawResponse) -> Result<Option<T>> {
    if !response.status.is_success() {
        return Err(ApiError::from_response(response.status, &response.body));
    }
    if response.is_empty() {
        return Ok(None);
    }
    let envelope: Envelope<T> = serde_json::from_slice(&response.body)?;
    Ok(envelope.data)
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("session", &self.session)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn envelope_unwraps_data() {
        let response = RawResponse::new(StatusCode::OK, r#"{"data":{"id":3}}"#);
        let value: Option<serde_json::Value> = decode_envelope(response).unwrap();
        assert_eq!(value, Some(json!({"id": 3})));
    }

    #[test]
    fn no_content_is_none() {
        let response = RawResponse::new(StatusCode::NO_CONTENT, Vec::new());
        let value: Option<serde_json::Value> = decode_envelope(response).unwrap();
        assert!(value.is_none());
    }

    #[test]
    fn non_success_becomes_http_error() {
        let response = RawResponse::new(StatusCode::NOT_FOUND, r#"{"message":"Brand not found"}"#);
        let error = decode_envelope::<serde_json::Value>(response).unwrap_err();
        assert_eq!(error.status(), Some(StatusCode::NOT_FOUND));
        assert!(error.to_string().contains("Brand not found"));
    }

    #[test]
    fn missing_data_field_is_none() {
        let response = RawResponse::new(StatusCode::OK, r#"{"message":"deleted"}"#);
        let value: Option<serde_json::Value> = decode_envelope(response).unwrap();
        assert!(value.is_none());
    }
}
