use std::{env, time::Duration};

use serde_json::Value;
use tracing::info;
use url::Url;

use crate::error::{ApiError, Result};

pub const ENV_API_URL: &str = "MOTORINCI_API_URL";
pub const ENV_API_USERNAME: &str = "MOTORINCI_API_USERNAME";
pub const ENV_API_PASSWORD: &str = "MOTORINCI_API_PASSWORD";
pub const ENV_PUBLIC_URL: &str = "MOTORINCI_PUBLIC_URL";
pub const ENV_TIMEOUT_SECS: &str = "MOTORINCI_TIMEOUT_SECS";

pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Fixed credentials used for the backend login call.
#[derive(Clone)]
pub struct Credentials {
    pub login: String,
    pub password: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("login", &self.login)
            .field("password", &"<redacted>")
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL of the REST backend, without a trailing slash.
    pub api_url: String,
    /// Base URL used to resolve relative image paths.
    pub public_url: String,
    pub credentials: Credentials,
    pub timeout: Duration,
}

impl Config {
    pub fn new(api_url: &str, credentials: Credentials) -> Result<Self> {
        let api_url = normalize_base_url(api_url)?;
        Ok(Self {
            public_url: api_url.clone(),
            api_url,
            credentials,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        })
    }

    pub fn with_public_url(mut self, public_url: &str) -> Result<Self> {
        self.public_url = normalize_base_url(public_url)?;
        Ok(self)
    }

    pub fn from_env() -> Result<Self> {
        let api_url = required(ENV_API_URL)?;
        let credentials = Credentials {
            login: required(ENV_API_USERNAME)?,
            password: required(ENV_API_PASSWORD)?,
        };
        let mut config = Self::new(&api_url, credentials)?;

        match non_empty(ENV_PUBLIC_URL) {
            Some(public_url) => config = config.with_public_url(&public_url)?,
            None => info!("{ENV_PUBLIC_URL} not set, using {}", config.api_url),
        }

        if let Some(raw) = non_empty(ENV_TIMEOUT_SECS) {
            let secs = raw
                .parse::<u64>()
                .map_err(|e| ApiError::Config(format!("invalid {ENV_TIMEOUT_SECS} value: {e}")))?;
            config.timeout = Duration::from_secs(secs.max(1));
        } else {
            info!("{ENV_TIMEOUT_SECS} not set, using default: {DEFAULT_TIMEOUT_SECS}");
        }

        Ok(config)
    }

    /// Resolves an image path returned by the backend. Absolute URLs pass
    /// through; anything else is joined onto the public base URL.
    pub fn resolve_image_url(&self, path: &str) -> String {
        let path = path.trim();
        if Url::parse(path).is_ok() {
            return path.to_string();
        }
        if path.starts_with('/') {
            format!("{}{}", self.public_url, path)
        } else {
            format!("{}/{}", self.public_url, path)
        }
    }

    /// Rewrites every non-empty `icon`, `image` and `image_url` string in a
    /// serialized payload with [`resolve_image_url`](Self::resolve_image_url).
    pub fn resolve_image_fields(&self, value: &mut Value) {
        match value {
            Value::Object(map) => {
                for (key, field) in map.iter_mut() {
                    match field {
                        Value::String(path)
                            if IMAGE_FIELDS.contains(&key.as_str()) && !path.trim().is_empty() =>
                        {
                            *path = self.resolve_image_url(path);
                        }
                        other => self.resolve_image_fields(other),
                    }
                }
            }
            Value::Array(items) => items.iter_mut().for_each(|item| self.resolve_image_fields(item)),
            _ => {}
        }
    }
}

const IMAGE_FIELDS: &[&str] = &["icon", "image", "image_url"];

pub fn normalize_base_url(raw: &str) -> Result<String> {
    let trimmed = raw.trim().trim_end_matches('/');
    if trimmed.is_empty() {
        return Err(ApiError::Config("base url must not be empty".into()));
    }
    let url = Url::parse(trimmed).map_err(|e| ApiError::Config(format!("invalid base url: {e}")))?;
    if !matches!(url.scheme(), "http" | "https") || url.host_str().is_none() {
        return Err(ApiError::Config(
            "base url must use http:// or https:// and include a host".into(),
        ));
    }
    Ok(trimmed.to_string())
}

fn non_empty(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn required(key: &str) -> Result<String> {
    non_empty(key).ok_or_else(|| ApiError::Config(format!("{key} must be set")))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> Config {
        Config::new(
            "https://api.example.com/",
            Credentials {
                login: "admin".into(),
                password: "secret".into(),
            },
        )
        .unwrap()
        .with_public_url("https://cdn.example.com/storage/")
        .unwrap()
    }

    #[test]
    fn base_url_drops_trailing_slash() {
        assert_eq!(
            normalize_base_url(" https://api.example.com/ ").unwrap(),
            "https://api.example.com"
        );
    }

    #[test]
    fn base_url_requires_http_scheme() {
        assert!(matches!(
            normalize_base_url("ftp://api.example.com"),
            Err(ApiError::Config(_))
        ));
        assert!(matches!(normalize_base_url("   "), Err(ApiError::Config(_))));
    }

    #[test]
    fn relative_images_resolve_against_public_url() {
        let config = config();
        assert_eq!(
            config.resolve_image_url("/brands/honda.png"),
            "https://cdn.example.com/storage/brands/honda.png"
        );
        assert_eq!(
            config.resolve_image_url("brands/honda.png"),
            "https://cdn.example.com/storage/brands/honda.png"
        );
        assert_eq!(
            config.resolve_image_url("https://img.example.com/a.png"),
            "https://img.example.com/a.png"
        );
    }

    #[test]
    fn image_fields_resolve_in_nested_payloads() {
        let mut payload = serde_json::json!({
            "id": 1,
            "name": "/not/an/image",
            "icon": "/brands/honda.png",
            "image": null,
            "images": [{ "image_url": "motors/vario.png" }],
            "brand": { "icon": "https://img.example.com/h.png", "image": "" }
        });
        config().resolve_image_fields(&mut payload);
        assert_eq!(payload["name"], "/not/an/image");
        assert_eq!(payload["icon"], "https://cdn.example.com/storage/brands/honda.png");
        assert!(payload["image"].is_null());
        assert_eq!(
            payload["images"][0]["image_url"],
            "https://cdn.example.com/storage/motors/vario.png"
        );
        assert_eq!(payload["brand"]["icon"], "https://img.example.com/h.png");
        assert_eq!(payload["brand"]["image"], "");
    }

    #[test]
    fn debug_hides_password() {
        let rendered = format!("{:?}", config().credentials);
        assert!(!rendered.contains("secret"));
    }
}
