//! HTTP client for the diagram generation service.
//!
//! `POST {base}/uml/generator/` with `{"description": ...}` answers
//! `{"payload": ...}`, where the payload is base64 image bytes or raw PlantUML
//! source. Every call carries the `X-API-Key` header.

use reqwest::Method;
use serde::{Deserialize, Serialize};

use crate::config::ClientConfig;
use crate::error::GenerateError;

pub const API_KEY_HEADER: &str = "X-API-Key";
const GENERATE_PATH: &str = "/uml/generator/";
const HEALTH_PATH: &str = "/health";

pub struct GeneratorClient {
    http: reqwest::Client,
    base_url: Option<String>,
    api_key: String,
}

#[derive(Serialize)]
struct GenerateRequest<'a> {
    description: &'a str,
}

#[derive(Deserialize)]
struct GenerateResponse {
    payload: String,
}

impl GeneratorClient {
    pub fn new(http: reqwest::Client, base_url: Option<String>, api_key: String) -> Self {
        Self { http, base_url, api_key }
    }

    pub fn from_config(cfg: &ClientConfig) -> Result<Self, reqwest::Error> {
        let mut builder = reqwest::Client::builder()
            .user_agent(format!("umlforge/{}", env!("CARGO_PKG_VERSION")));
        if let Some(timeout) = cfg.request_timeout {
            builder = builder.timeout(timeout);
        }
        Ok(Self::new(builder.build()?, cfg.base_url.clone(), cfg.api_key.clone()))
    }

    pub fn base_url(&self) -> Option<&str> {
        self.base_url.as_deref()
    }

    fn request(
        &self,
        method: Method,
        path: &str,
    ) -> Result<reqwest::RequestBuilder, GenerateError> {
        let base = self.base_url.as_deref().ok_or(GenerateError::MissingBaseUrl)?;
        Ok(self
            .http
            .request(method, format!("{}{}", base, path))
            .header(API_KEY_HEADER, &self.api_key))
    }

    /// Ask the service for a diagram. Returns the raw payload string.
    pub async fn generate(&self, description: &str) -> Result<String, GenerateError> {
        let resp = self
            .request(Method::POST, GENERATE_PATH)?
            .json(&GenerateRequest { description })
            .send()
            .await
            .map_err(GenerateError::Transport)?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(GenerateError::Status { status, body });
        }

        let body: GenerateResponse = resp.json().await.map_err(GenerateError::Body)?;
        Ok(body.payload)
    }

    /// `true` when `GET {base}/health` answers 2xx.
    pub async fn health(&self) -> bool {
        let req = match self.request(Method::GET, HEALTH_PATH) {
            Ok(r) => r,
            Err(_) => return false,
        };
        match req.send().await {
            Ok(r) => r.status().is_success(),
            Err(e) => {
                tracing::debug!(error = %e, "generator health probe failed");
                false
            }
        }
    }
}
