//! Motorinci AI: free-form questions answered by the backend.

use serde::Deserialize;
use serde_json::json;
use tracing::warn;

use super::NAMESPACE;
use crate::{
    abort::AbortSignal,
    client::{ApiClient, ApiRequest, Body},
    error::{ApiError, Result},
};

/// Application code the endpoint uses for a successful answer.
const CODE_OK: i64 = 200;

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AiReply {
    pub code: i64,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub data: String,
}

impl AiReply {
    /// The answer text, or [`ApiError::Rejected`] when `code` is not 200.
    pub fn into_answer(self) -> Result<String> {
        if self.code != CODE_OK {
            let message = if self.message.trim().is_empty() {
                "the assistant is unavailable".to_string()
            } else {
                self.message
            };
            return Err(ApiError::Rejected {
                code: self.code,
                message,
            });
        }
        Ok(self.data)
    }
}

pub fn path() -> String {
    format!("{NAMESPACE}/ai")
}

/// Sends `prompt` and returns the answer. A blank prompt is rejected
/// without a request.
pub async fn ask(client: &ApiClient, prompt: &str, signal: Option<&AbortSignal>) -> Result<String> {
    let prompt = prompt.trim();
    if prompt.is_empty() {
        return Err(ApiError::Validation("prompt is required".into()));
    }
    let request = ApiRequest::post(path()).body(Body::Json(json!({ "prompt": prompt })));
    let reply: AiReply = client.fetch_body(request, signal).await?;
    if reply.code != CODE_OK {
        warn!(code = reply.code, "assistant rejected the prompt");
    }
    reply.into_answer()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ok_code_yields_answer() {
        let reply: AiReply =
            serde_json::from_str(r#"{"code":200,"message":"ok","data":"Vario 160 uses 156.9 cc."}"#)
                .unwrap();
        assert_eq!(reply.into_answer().unwrap(), "Vario 160 uses 156.9 cc.");
    }

    #[test]
    fn other_codes_are_rejected_with_message() {
        let reply: AiReply =
            serde_json::from_str(r#"{"code":503,"message":"quota exceeded","data":""}"#).unwrap();
        match reply.into_answer() {
            Err(ApiError::Rejected { code, message }) => {
                assert_eq!(code, 503);
                assert_eq!(message, "quota exceeded");
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn missing_message_gets_a_default() {
        let reply: AiReply = serde_json::from_str(r#"{"code":500}"#).unwrap();
        assert!(reply.into_answer().unwrap_err().to_string().contains("unavailable"));
    }
}
