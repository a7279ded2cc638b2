//! HTTP client for the studio backend resource API.

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use studio_core::error::{Result, StudioError};
use studio_core::resource::{HttpMethod, ResourceApi};

/// `ResourceApi` over HTTP with JSON bodies.
#[derive(Clone)]
pub struct HttpResourceApi {
    client: Client,
    base_url: String,
}

impl HttpResourceApi {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }
}

#[async_trait]
impl ResourceApi for HttpResourceApi {
    async fn call(&self, path: &str, method: HttpMethod, payload: Option<Value>) -> Result<Value> {
        let url = self.url(path);
        let builder = match method {
            HttpMethod::Get => self.client.get(&url),
            HttpMethod::Post => self.client.post(&url),
        };
        let builder = match payload {
            Some(body) => builder.json(&body),
            None => builder,
        };

        let response = builder
            .send()
            .await
            .map_err(|e| StudioError::backend(format!("Request to {url} failed: {e}")))?;

        if !response.status().is_success() {
            return Err(StudioError::backend(format!(
                "API error {}",
                response.status().as_u16()
            )));
        }

        response
            .json::<Value>()
            .await
            .map_err(|e| StudioError::backend(format!("Invalid JSON from {url}: {e}")))
    }
}
