use std::time::Duration;

use async_trait::async_trait;
use reqwest::{multipart, Client};
use tracing::debug;

use super::request::{ApiRequest, Body, Part, RawResponse};
use crate::error::Result;

/// Sends a single request and hands back the raw response. No auth or
/// envelope handling happens at this layer.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: &ApiRequest, token: Option<&str>) -> Result<RawResponse>;
}

/// `reqwest`-backed transport against a fixed base URL.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    base_url: String,
    client: Client,
}

impl HttpTransport {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .default_headers(crate::build_headers())
            .timeout(timeout)
            .build()?;
        Ok(Self {
            base_url: base_url.into(),
            client,
        })
    }

    fn endpoint(&self, path: &str) -> String {
        let path = path.trim();
        if path.starts_with('/') {
            format!("{}{}", self.base_url, path)
        } else {
            format!("{}/{}", self.base_url, path)
        }
    }
}

fn build_form(form: &super::request::Multipart) -> Result<multipart::Form> {
    let mut out = multipart::Form::new();
    for (name, part) in &form.parts {
        out = match part {
            Part::Text(value) => out.text(name.clone(), value.clone()),
            Part::File(file) => {
                let mut part =
                    multipart::Part::bytes(file.bytes.clone()).file_name(file.file_name.clone());
                if let Some(mime) = &file.mime {
                    part = part.mime_str(mime)?;
                }
                out.part(name.clone(), part)
            }
        };
    }
    Ok(out)
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, request: &ApiRequest, token: Option<&str>) -> Result<RawResponse> {
        let url = self.endpoint(&request.path);
        debug!(method = %request.method, %url, "sending request");

        let mut builder = self.client.request(request.method.clone(), &url);
        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(token) = token {
            builder = builder.bearer_auth(token);
        }
        builder = match &request.body {
            Body::Empty => builder,
            Body::Json(value) => builder.json(value),
            Body::Multipart(form) => builder.multipart(build_form(form)?),
        };

        let response = builder.send().await?;
        let status = response.status();
        let body = response.bytes().await?;
        debug!(%status, bytes = body.len(), "response received");
        Ok(RawResponse::new(status, body.to_vec()))
    }
}
