use crate::config::BackendConfig;
use anyhow::{Context, Result};
use async_trait::async_trait;
use cliploop_common::{CacheStatus, ClipDescriptor, SessionId, TreeNode};
use reqwest::{header, Client, Url};

use super::types::{RandomResponse, SessionRequest};
use super::{ClipError, ClipRequest, ClipSource};

/// Bytes requested when warming a video; enough to make the backend open
/// and cache the file without streaming all of it.
const WARM_RANGE: &str = "bytes=0-65535";

/// HTTP client for the clip backend.
#[derive(Clone)]
pub struct HttpBackend {
    client: Client,
    base_url: String,
}

impl HttpBackend {
    pub fn new(config: &BackendConfig) -> Self {
        let client = Client::builder()
            .timeout(config.request_timeout())
            .build()
            .unwrap_or_else(|e| {
                tracing::warn!("Failed to build HTTP client with timeout: {}", e);
                Client::new()
            });

        Self {
            client,
            base_url: config.url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// URL of the media stream for `file`, one path segment per component.
    pub fn video_url(&self, file: &str) -> Result<Url> {
        let mut url = Url::parse(&self.base_url)
            .with_context(|| format!("Invalid backend URL: {}", self.base_url))?;
        url.path_segments_mut()
            .map_err(|_| anyhow::anyhow!("Backend URL cannot carry a path: {}", self.base_url))?
            .pop_if_empty()
            .push("video")
            .extend(file.split('/').filter(|s| !s.is_empty()));
        Ok(url)
    }

    /// Fetch the library listing.
    pub async fn tree(&self) -> Result<Vec<TreeNode>> {
        let response = self
            .client
            .get(self.url("/tree"))
            .send()
            .await
            .context("Failed to GET /tree")?;

        if !response.status().is_success() {
            anyhow::bail!("Library tree request failed ({})", response.status());
        }

        response
            .json()
            .await
            .context("Failed to decode library tree")
    }

    /// Fetch the backend's caching progress.
    pub async fn cache_status(&self) -> Result<CacheStatus> {
        let response = self
            .client
            .get(self.url("/cache/status"))
            .send()
            .await
            .context("Failed to GET /cache/status")?;

        if !response.status().is_success() {
            anyhow::bail!("Cache status request failed ({})", response.status());
        }

        response
            .json()
            .await
            .context("Failed to decode cache status")
    }

    pub async fn start_session(&self, id: SessionId) -> Result<()> {
        self.post_session("/session/start", id).await
    }

    pub async fn end_session(&self, id: SessionId) -> Result<()> {
        self.post_session("/session/end", id).await
    }

    async fn post_session(&self, path: &str, id: SessionId) -> Result<()> {
        let response = self
            .client
            .post(self.url(path))
            .json(&SessionRequest { id })
            .send()
            .await
            .with_context(|| format!("Failed to POST {}", path))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("POST {} failed ({}): {}", path, status, body);
        }
        Ok(())
    }
}

#[async_trait]
impl ClipSource for HttpBackend {
    async fn fetch_clip(&self, request: &ClipRequest) -> Result<ClipDescriptor, ClipError> {
        let mut query: Vec<(&str, String)> = Vec::with_capacity(3);
        if let Some(target) = request.scope.target() {
            query.push(("target", target.to_string()));
        }
        if let Some(duration) = request.duration {
            query.push(("duration", duration.to_string()));
        }
        if request.preview {
            query.push(("preview", "1".to_string()));
        }

        let response = self
            .client
            .get(self.url("/random"))
            .query(&query)
            .send()
            .await
            .map_err(|e| ClipError::Transport(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| ClipError::Transport(e.to_string()))?;

        // An `error` body wins over the status code: backends report an
        // empty scope both as 200 and as 404.
        match serde_json::from_str::<RandomResponse>(&body) {
            Ok(parsed) if parsed.error.is_some() || status.is_success() => parsed.into_clip(),
            Ok(_) => Err(ClipError::Transport(format!("HTTP {}", status))),
            Err(_) if !status.is_success() => Err(ClipError::Transport(format!("HTTP {}", status))),
            Err(e) => Err(ClipError::Malformed(e.to_string())),
        }
    }

    async fn warm(&self, file: &str) -> Result<(), ClipError> {
        let url = self
            .video_url(file)
            .map_err(|e| ClipError::Malformed(e.to_string()))?;

        let response = self
            .client
            .get(url)
            .header(header::RANGE, WARM_RANGE)
            .send()
            .await
            .map_err(|e| ClipError::Transport(e.to_string()))?;

        if !response.status().is_success() {
            return Err(ClipError::Transport(format!("HTTP {}", response.status())));
        }
        Ok(())
    }
}
