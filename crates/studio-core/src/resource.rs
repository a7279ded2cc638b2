//! Backend resource API capability.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::error::Result;

/// HTTP verb for a resource call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HttpMethod {
    Get,
    Post,
}

/// Given a resource path and payload, returns the parsed result or fails.
#[async_trait]
pub trait ResourceApi: Send + Sync {
    async fn call(&self, path: &str, method: HttpMethod, payload: Option<Value>) -> Result<Value>;

    /// Installs a marketplace module.
    async fn install_module(&self, module_id: &str) -> Result<Value> {
        self.call(
            "/modules/install",
            HttpMethod::Post,
            Some(json!({ "id": module_id })),
        )
        .await
    }
}
