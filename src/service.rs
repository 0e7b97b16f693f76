//! Cart service client.
//!
//! The cart service owns the cart; every call returns its raw JSON reply and
//! leaves interpretation to [`crate::api::parse_result`].

use async_trait::async_trait;
use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderValue};
use std::time::Duration;

use crate::api::CartPayload;
use crate::config::{Endpoints, Service};
use crate::error::SyncError;
use crate::model::{ActionKind, CartActionRequest};

pub const CSRF_HEADER: &str = "x-csrftoken";
pub const REQUESTED_WITH_HEADER: &str = "x-requested-with";
pub const REQUESTED_WITH_VALUE: &str = "XMLHttpRequest";

#[async_trait]
pub trait CartService: Send + Sync {
    async fn execute(&self, request: &CartActionRequest, csrf_token: &str) -> Result<serde_json::Value, SyncError>;
}

#[derive(Clone)]
pub struct HttpCartService {
    client: reqwest::Client,
    base_url: String,
    endpoints: Endpoints,
}

impl HttpCartService {
    pub fn new(cfg: &Service) -> Result<Self, SyncError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(cfg.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            base_url: cfg.base_url.trim_end_matches('/').to_string(),
            endpoints: cfg.endpoints.clone(),
        })
    }

    fn url_for(&self, kind: ActionKind) -> String {
        let path = match kind {
            ActionKind::Add => &self.endpoints.add,
            ActionKind::Remove => &self.endpoints.remove,
            ActionKind::Update => &self.endpoints.update,
            ActionKind::Count => &self.endpoints.count,
        };
        format!("{}{}", self.base_url, path)
    }

    fn headers(csrf_token: &str) -> Result<HeaderMap, SyncError> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(
            CSRF_HEADER,
            HeaderValue::from_str(csrf_token).map_err(|e| SyncError::Transport(format!("invalid csrf token: {}", e)))?,
        );
        headers.insert(REQUESTED_WITH_HEADER, HeaderValue::from_static(REQUESTED_WITH_VALUE));
        Ok(headers)
    }
}

#[async_trait]
impl CartService for HttpCartService {
    async fn execute(&self, request: &CartActionRequest, csrf_token: &str) -> Result<serde_json::Value, SyncError> {
        let url = self.url_for(request.kind);
        let headers = Self::headers(csrf_token)?;

        let builder = match request.kind {
            ActionKind::Count => self.client.get(&url),
            _ => self.client.post(&url).json(&CartPayload::from(request)),
        };

        tracing::debug!(action = %request.kind, product_id = %request.product_id, url = %url, "sending cart request");
        let response = builder.headers(headers).send().await?;

        // The service answers rejections with 400/404 and a JSON body, so the
        // status alone decides nothing.
        let status = response.status();
        let body = response.bytes().await?;
        let payload: serde_json::Value = serde_json::from_slice(&body).map_err(|e| {
            SyncError::MalformedResponse(format!("status {}: {}", status, e))
        })?;

        tracing::debug!(action = %request.kind, status = %status, "cart service replied");
        Ok(payload)
    }
}
