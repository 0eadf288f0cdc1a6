use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;
use url::form_urlencoded;

use crate::error::PublishError;
use crate::params::PublishRequest;

const TUMBLR_API_BASE: &str = "https://api.tumblr.com/v2";

/// The one operation the pipeline needs from a publishing service.
#[async_trait]
pub trait Publisher {
    async fn publish(&self, request: &PublishRequest, target: &str) -> Result<(), PublishError>;
}

pub struct TumblrPublisher {
    client: Client,
    api_base: String,
    token: String,
}

impl TumblrPublisher {
    pub fn new(token: String) -> Result<Self> {
        Self::with_api_base(token, TUMBLR_API_BASE)
    }

    pub fn with_api_base(token: String, api_base: &str) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(60))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            api_base: api_base.trim_end_matches('/').to_string(),
            token,
        })
    }

    fn post_url(&self, target: &str) -> String {
        format!("{}/blog/{}/post", self.api_base, target)
    }
}

#[async_trait]
impl Publisher for TumblrPublisher {
    async fn publish(&self, request: &PublishRequest, target: &str) -> Result<(), PublishError> {
        let body = form_urlencoded::Serializer::new(String::new())
            .extend_pairs(request.params())
            .finish();

        let response = self
            .client
            .post(self.post_url(target))
            .bearer_auth(&self.token)
            .header("content-type", "application/x-www-form-urlencoded")
            .body(body)
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }

        let error_text = response
            .text()
            .await
            .unwrap_or_else(|_| String::from("unknown error"));
        Err(PublishError::rejected(status.as_u16(), error_detail(&error_text)))
    }
}

/// Pull `meta.msg` and any `errors` out of an API error body, falling back
/// to the raw text.
fn error_detail(body: &str) -> String {
    let Ok(json) = serde_json::from_str::<Value>(body) else {
        return body.trim().to_string();
    };

    let mut parts = Vec::new();
    if let Some(msg) = json.pointer("/meta/msg").and_then(Value::as_str) {
        parts.push(msg.to_string());
    }

    let errors = json
        .pointer("/response/errors")
        .or_else(|| json.get("errors"))
        .and_then(Value::as_array);
    for error in errors.into_iter().flatten() {
        match error {
            Value::String(s) => parts.push(s.clone()),
            other => {
                let text = other
                    .get("detail")
                    .or_else(|| other.get("title"))
                    .and_then(Value::as_str)
                    .map(str::to_string)
                    .unwrap_or_else(|| other.to_string());
                parts.push(text);
            }
        }
    }

    if parts.is_empty() {
        body.trim().to_string()
    } else {
        parts.join("; ")
    }
}
