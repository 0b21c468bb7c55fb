//! Hosted API transport

use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use tracing::{debug, warn};

use crate::config::SdkConfig;
use crate::error::{Error, Result};
use super::endpoints::ApiOperation;

const API_KEY_HEADER: &str = "x-api-key";

/// The hosted blockchain API
#[async_trait]
pub trait HostedApi: Send + Sync {
    /// Perform `operation` with an optional JSON body, returning the JSON response
    async fn call(&self, operation: &ApiOperation, body: Option<&Value>) -> Result<Value>;
}

/// reqwest implementation of [`HostedApi`]
pub struct HttpHostedApi {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl HttpHostedApi {
    pub fn new(config: &SdkConfig) -> Result<Self> {
        config.validate()?;

        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = config.timeout() {
            builder = builder.timeout(timeout);
        } else {
            builder = builder.timeout(Duration::from_secs(30));
        }
        let client = builder
            .build()
            .map_err(|e| Error::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: config.url.as_str().trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl HostedApi for HttpHostedApi {
    async fn call(&self, operation: &ApiOperation, body: Option<&Value>) -> Result<Value> {
        let url = format!("{}{}", self.base_url, operation.path);
        debug!(method = %operation.method, path = %operation.path, "hosted api request");

        let mut request = self
            .client
            .request(operation.method.clone(), &url)
            .header(API_KEY_HEADER, &self.api_key);
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request
            .send()
            .await
            .map_err(|e| Error::Network(format!("Failed to reach hosted API: {}", e)))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| Error::Network(format!("Failed to read hosted API response: {}", e)))?;
        let json = parse_body(&text);

        if !status.is_success() {
            let error = api_error(status.as_u16(), &json, &text);
            warn!(path = %operation.path, status = status.as_u16(), "hosted api call failed");
            return Err(error);
        }

        Ok(json)
    }
}

fn parse_body(text: &str) -> Value {
    if text.trim().is_empty() {
        return Value::Null;
    }
    serde_json::from_str(text).unwrap_or_else(|_| Value::String(text.to_string()))
}

/// Map an error response to `Error::Api`, keeping the API's `errorCode` and `message`
pub(crate) fn api_error(status: u16, json: &Value, text: &str) -> Error {
    let error_code = json
        .get("errorCode")
        .and_then(Value::as_str)
        .map(str::to_string);
    let message = json
        .get("message")
        .and_then(Value::as_str)
        .map(str::to_string)
        .unwrap_or_else(|| text.to_string());

    Error::Api {
        status,
        error_code,
        message,
    }
}
